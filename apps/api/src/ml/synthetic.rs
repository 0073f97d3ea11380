//! Seeded generator of labelled synthetic CVs for bootstrapping the model.

use std::path::Path;

use chrono::{Datelike, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::ml::storage::{read_json, write_json_atomic};
use crate::models::cv::CvRecord;

pub const TRAINING_FILE: &str = "training_data.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSample {
    pub cv: CvRecord,
    pub sector: String,
    pub expected_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quality {
    Low,
    Medium,
    High,
}

impl Quality {
    fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            Quality::High
        } else if score >= 40.0 {
            Quality::Medium
        } else {
            Quality::Low
        }
    }
}

struct SectorTemplate {
    sector: &'static str,
    subjects: &'static [&'static str],
    qualifications: &'static [&'static str],
    companies: &'static [&'static str],
    roles: &'static [&'static str],
    skills: &'static [&'static str],
    activities: &'static [&'static str],
    personality: &'static [&'static str],
}

// ────────────────────────────────────────────────────────────────────────────
// Value pools
// ────────────────────────────────────────────────────────────────────────────

const FIRST_NAMES: &[&str] = &[
    "James", "Emma", "Michael", "Sophia", "William", "Olivia", "Lucas", "Mia", "Henry",
    "Amelia", "Daniel", "Evelyn", "Chen", "Wei", "Yuki", "Priya", "Raj", "Fatima", "Maria",
    "Carlos", "Anna", "Erik", "Ingrid", "Ivan",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Brown", "Garcia", "Miller", "Davis", "Martinez", "Wilson", "Taylor",
    "Lee", "Harris", "Clark", "Chen", "Wang", "Kim", "Patel", "Singh", "Schmidt", "Weber",
    "Rossi", "Romano",
];

const CITIES: &[&str] = &[
    "London", "Berlin", "Paris", "Tokyo", "Toronto", "Amsterdam", "Munich", "Barcelona",
    "Singapore", "Boston", "Seattle", "Stockholm", "Vienna", "Zurich", "Dublin",
];

const COUNTRIES: &[&str] = &[
    "UK", "Germany", "France", "Japan", "Canada", "Netherlands", "Spain", "Singapore", "USA",
    "Sweden", "Austria", "Switzerland", "Ireland", "Italy",
];

const NATIONALITIES: &[&str] = &[
    "British", "German", "French", "Japanese", "Canadian", "Dutch", "Spanish", "American",
    "Swedish", "Austrian", "Swiss", "Irish", "Italian", "Indian", "Chinese", "Polish",
];

/// (name, prestige) with prestige 3 = top tier, 1 = generic.
const UNIVERSITIES: &[(&str, u8)] = &[
    ("MIT", 3),
    ("Stanford University", 3),
    ("Harvard University", 3),
    ("University of Cambridge", 3),
    ("University of Oxford", 3),
    ("ETH Zurich", 3),
    ("Imperial College London", 2),
    ("University of Toronto", 2),
    ("Technical University of Munich", 2),
    ("University of Amsterdam", 2),
    ("State University", 1),
    ("City College", 1),
    ("Regional University", 1),
    ("Technical Institute", 1),
];

const LANGUAGES: &[&str] = &[
    "English", "German", "French", "Spanish", "Mandarin", "Japanese", "Portuguese", "Russian",
    "Arabic", "Italian",
];
const LANGUAGE_LEVELS: &[&str] = &["A1", "A2", "B1", "B2", "C1", "C2", "Native", "Fluent"];

const MBTI_TYPES: &[&str] = &[
    "INTJ", "INTP", "ENTJ", "ENTP", "INFJ", "INFP", "ENFJ", "ENFP", "ISTJ", "ISFJ", "ESTJ",
    "ESFJ", "ISTP", "ISFP", "ESTP", "ESFP",
];

const HOBBIES: &[&str] = &[
    "reading", "sports", "travel", "music", "cooking", "photography", "gaming", "hiking",
    "programming", "art", "volunteering", "languages",
];

/// Description adjectives per MBTI letter.
const TRAITS: &[(char, &[&str])] = &[
    ('I', &["thoughtful", "reserved", "analytical", "focused"]),
    ('E', &["outgoing", "energetic", "social", "enthusiastic"]),
    ('S', &["practical", "detail-oriented", "reliable", "grounded"]),
    ('N', &["innovative", "creative", "visionary", "intuitive"]),
    ('T', &["logical", "objective", "analytical", "systematic"]),
    ('F', &["empathetic", "caring", "collaborative", "supportive"]),
    ('J', &["organized", "structured", "decisive", "methodical"]),
    ('P', &["flexible", "adaptable", "spontaneous", "open-minded"]),
];

const TEMPLATES: &[SectorTemplate] = &[
    SectorTemplate {
        sector: "Computers_ICT",
        subjects: &["Computer Science", "Software Engineering", "Information Technology", "Data Science", "Cybersecurity"],
        qualifications: &["BSc Computer Science", "MSc Software Engineering", "PhD Computer Science", "BSc Information Systems"],
        companies: &["Google", "Microsoft", "Amazon", "IBM", "Oracle", "SAP", "TechCorp", "DataSystems Inc"],
        roles: &["Software Engineer", "Data Scientist", "DevOps Engineer", "System Administrator", "Backend Developer", "Machine Learning Engineer"],
        skills: &["Python", "Java", "JavaScript", "SQL", "AWS", "Docker", "Kubernetes", "Git", "Linux", "React", "Machine Learning", "Cloud Computing"],
        activities: &["Developed web applications", "Built scalable APIs", "Implemented CI/CD pipelines", "Managed cloud infrastructure", "Led development team"],
        personality: &["INTJ", "INTP", "ENTJ", "ISTJ"],
    },
    SectorTemplate {
        sector: "Biological_Chemical_Pharmaceutical_Science",
        subjects: &["Biology", "Chemistry", "Biochemistry", "Pharmacology", "Molecular Biology", "Biotechnology"],
        qualifications: &["BSc Biology", "MSc Biochemistry", "PhD Pharmacology", "BSc Chemistry"],
        companies: &["Pfizer", "Roche", "Novartis", "Merck", "AstraZeneca", "BioLab", "Research Institute"],
        roles: &["Research Scientist", "Lab Technician", "Quality Analyst", "R&D Manager", "Clinical Research Associate"],
        skills: &["PCR", "HPLC", "Mass Spectrometry", "Cell Culture", "Statistical Analysis", "GMP", "Laboratory Safety", "Research Methods"],
        activities: &["Conducted research experiments", "Analyzed data using statistical methods", "Published research papers", "Managed laboratory operations"],
        personality: &["INTJ", "ISTJ", "INTP", "INFJ"],
    },
    SectorTemplate {
        sector: "Banking_Finance_Insurance",
        subjects: &["Finance", "Economics", "Accounting", "Business Administration", "Mathematics"],
        qualifications: &["BSc Finance", "MBA", "MSc Economics", "CFA", "BSc Accounting"],
        companies: &["Goldman Sachs", "JP Morgan", "Deutsche Bank", "HSBC", "Barclays", "BlackRock", "Fidelity"],
        roles: &["Financial Analyst", "Investment Banker", "Risk Manager", "Portfolio Manager", "Compliance Officer", "Accountant"],
        skills: &["Financial Modeling", "Excel", "Bloomberg", "Risk Analysis", "Valuation", "SQL", "Python", "Financial Reporting"],
        activities: &["Analyzed financial statements", "Managed investment portfolios", "Conducted risk assessments", "Prepared financial reports"],
        personality: &["ENTJ", "ESTJ", "INTJ", "ISTJ"],
    },
    SectorTemplate {
        sector: "Healthcare",
        subjects: &["Medicine", "Nursing", "Public Health", "Healthcare Administration", "Biomedical Science"],
        qualifications: &["MD", "BSN", "MSc Public Health", "PhD Medicine", "RN License"],
        companies: &["Mayo Clinic", "Johns Hopkins Hospital", "Cleveland Clinic", "City Hospital", "Regional Medical Center"],
        roles: &["Doctor", "Nurse", "Healthcare Administrator", "Medical Researcher", "Clinical Specialist"],
        skills: &["Patient Care", "Medical Diagnosis", "Clinical Research", "Healthcare Management", "EMR Systems", "Medical Documentation"],
        activities: &["Provided patient care", "Conducted clinical research", "Managed healthcare operations", "Implemented health policies"],
        personality: &["ISFJ", "INFJ", "ESFJ", "ENFJ"],
    },
];

const DEFAULT_TEMPLATE: SectorTemplate = SectorTemplate {
    sector: "",
    subjects: &["Business", "Management", "General Studies"],
    qualifications: &["Bachelor's Degree", "Master's Degree", "Diploma"],
    companies: &["Corporation", "Company Inc", "Business Ltd", "Organization"],
    roles: &["Manager", "Specialist", "Coordinator", "Analyst", "Officer"],
    skills: &["Communication", "Problem Solving", "Team Work", "Microsoft Office", "Time Management"],
    activities: &["Managed projects", "Coordinated teams", "Analyzed data", "Prepared reports"],
    personality: MBTI_TYPES,
};

/// Sectors with a dedicated template; the default sector list for training.
pub fn template_sectors() -> Vec<String> {
    TEMPLATES.iter().map(|t| t.sector.to_string()).collect()
}

fn template_for(sector: &str) -> (&'static SectorTemplate, bool) {
    match TEMPLATES.iter().find(|t| t.sector == sector) {
        Some(t) => (t, true),
        None => (&DEFAULT_TEMPLATE, false),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

pub struct SyntheticGenerator {
    rng: StdRng,
    current_year: i32,
}

impl SyntheticGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            current_year: Utc::now().year(),
        }
    }

    fn pick<'a>(&mut self, pool: &[&'a str]) -> &'a str {
        pool.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn pick_many(&mut self, pool: &[&str], amount: usize) -> Vec<String> {
        pool.choose_multiple(&mut self.rng, amount)
            .map(|s| s.to_string())
            .collect()
    }

    /// `n` samples spread over `sectors` with a 30/40/30 low/medium/high mix.
    pub fn generate(&mut self, n: usize, sectors: &[String]) -> Vec<TrainingSample> {
        let fallback = template_sectors();
        let sectors = if sectors.is_empty() { &fallback[..] } else { sectors };

        (0..n)
            .map(|_| {
                let sector = sectors
                    .choose(&mut self.rng)
                    .cloned()
                    .unwrap_or_default();
                let roll: f64 = self.rng.gen();
                let expected_score = if roll < 0.3 {
                    self.rng.gen_range(10.0..40.0)
                } else if roll < 0.7 {
                    self.rng.gen_range(40.0..70.0)
                } else {
                    self.rng.gen_range(70.0..95.0)
                };
                let cv = self.cv_for(&sector, expected_score);
                TrainingSample {
                    cv,
                    sector,
                    expected_score: (expected_score * 10.0).round() / 10.0,
                }
            })
            .collect()
    }

    /// A CV whose richness tracks `expected_score`.
    pub fn cv_for(&mut self, sector: &str, expected_score: f64) -> CvRecord {
        let quality = Quality::from_score(expected_score);
        let (template, known) = template_for(sector);
        let mut cv = CvRecord {
            first_name: self.pick(FIRST_NAMES).to_string(),
            last_name: self.pick(LAST_NAMES).to_string(),
            sex: self.pick(&["M", "F"]).to_string(),
            nationality: self.pick(NATIONALITIES).to_string(),
            city: self.pick(CITIES).to_string(),
            country: self.pick(COUNTRIES).to_string(),
            house_number: self.rng.gen_range(1..200).to_string(),
            ..Default::default()
        };
        cv.street_name = format!(
            "{} {} Street",
            self.rng.gen_range(1..999),
            self.pick(&["Main", "Oak", "Park", "Lake", "Hill"])
        );
        cv.telephone_number = format!(
            "+{}-{}-{}",
            self.rng.gen_range(1..99),
            self.rng.gen_range(100..999),
            self.rng.gen_range(1_000_000..9_999_999)
        );
        cv.email_address = format!(
            "{}.{}@email.com",
            cv.first_name.to_lowercase(),
            cv.last_name.to_lowercase()
        );

        let age = match quality {
            Quality::High => self.rng.gen_range(30..=50),
            Quality::Medium => self.rng.gen_range(25..=40),
            Quality::Low => self.rng.gen_range(22..=35),
        };
        cv.date_of_birth = format!(
            "{:02}.{:02}.{}",
            self.rng.gen_range(1..=28),
            self.rng.gen_range(1..=12),
            self.current_year - age
        );

        self.fill_work(&mut cv, template, quality);
        self.fill_education(&mut cv, template, quality);
        self.fill_skills(&mut cv, template, quality);
        self.fill_languages(&mut cv, quality);
        self.fill_additional(&mut cv, template, quality);

        let label = if known && self.rng.gen_bool(0.7) {
            self.pick(template.personality)
        } else {
            self.pick(MBTI_TYPES)
        };
        cv.short_description = self.describe(label);
        cv.personality_type_mb = label.to_string();
        cv.hobbies = self.pick_many(HOBBIES, 3).join(", ");
        cv
    }

    fn fill_work(&mut self, cv: &mut CvRecord, template: &SectorTemplate, quality: Quality) {
        let positions = match quality {
            Quality::High => 3,
            Quality::Medium => 2,
            Quality::Low => 1,
        };
        let year = self.current_year;
        let mut jobs = Vec::with_capacity(positions);
        for i in 1..=positions as i32 {
            let company = self.pick(template.companies).to_string();
            let mut role = self.pick(template.roles).to_string();
            let dates = if i == 1 {
                let start = year - self.rng.gen_range(1..=3);
                let end = if self.rng.gen_bool(0.7) {
                    "current".to_string()
                } else {
                    format!("01.12.{year}")
                };
                if quality == Quality::High {
                    role = format!("Senior {role}");
                }
                format!("01.01.{start} - {end}")
            } else {
                let start = year - self.rng.gen_range((3 + i * 2)..=(5 + i * 3));
                let end = start + self.rng.gen_range(1..=3);
                format!("01.01.{start} - 01.12.{end}")
            };
            let activities = self.pick_many(template.activities, 2).join(", ");
            jobs.push((company, dates, role, activities));
        }

        let mut jobs = jobs.into_iter();
        if let Some((company, dates, role, activities)) = jobs.next() {
            cv.workplace1 = company;
            cv.dates1 = dates;
            cv.occupation1 = role;
            cv.main_activities1 = activities;
        }
        if let Some((company, dates, role, activities)) = jobs.next() {
            cv.workplace2 = company;
            cv.dates2 = dates;
            cv.occupation2 = role;
            cv.main_activities2 = activities;
        }
        if let Some((company, dates, role, activities)) = jobs.next() {
            cv.workplace3 = company;
            cv.dates3 = dates;
            cv.occupation3 = role;
            cv.main_activities3 = activities;
        }
    }

    fn fill_education(&mut self, cv: &mut CvRecord, template: &SectorTemplate, quality: Quality) {
        let min_prestige = match quality {
            Quality::High => 2,
            Quality::Medium => 1,
            Quality::Low => 0,
        };
        let universities: Vec<&str> = UNIVERSITIES
            .iter()
            .filter(|(_, prestige)| *prestige >= min_prestige)
            .map(|(name, _)| *name)
            .collect();

        cv.high_school = format!("{} High School", self.pick(CITIES));
        cv.college_university = self.pick(&universities).to_string();
        cv.subjects_studied = self.pick_many(template.subjects, 2).join(", ");
        cv.years_studied = self.rng.gen_range(3..=5).to_string();
        cv.qualifications_awarded = self.pick(template.qualifications).to_string();

        let has_masters = match quality {
            Quality::High => self.rng.gen_bool(0.7),
            Quality::Medium => self.rng.gen_bool(0.4),
            Quality::Low => false,
        };
        if has_masters {
            cv.master1 = format!("MSc {}", self.pick(template.subjects));
            if quality == Quality::High && self.rng.gen_bool(0.2) {
                cv.master2 = "MBA".to_string();
            }
        }
    }

    fn fill_skills(&mut self, cv: &mut CvRecord, template: &SectorTemplate, quality: Quality) {
        let count = match quality {
            Quality::High => 6,
            Quality::Medium => 4,
            Quality::Low => 2,
        };
        let skills = self.pick_many(template.skills, count);
        cv.computer_skills = skills.iter().take(4).cloned().collect::<Vec<_>>().join(", ");
        cv.job_related_skills = skills.iter().skip(2).cloned().collect::<Vec<_>>().join(", ");
        cv.communication_skills = self
            .pick(&["Team collaboration", "Presentation skills", "Written communication", "Client relations"])
            .to_string();
        cv.organizational_managerial_skills = self
            .pick(&["Project management", "Team leadership", "Agile methodologies", "Strategic planning"])
            .to_string();
        cv.other_skills = self
            .pick(&["Problem solving", "Critical thinking", "Analytical skills", "Creativity"])
            .to_string();
        cv.driving_license = self.pick(&["B", "B", "B", "A, B", ""]).to_string();
    }

    fn fill_languages(&mut self, cv: &mut CvRecord, quality: Quality) {
        cv.mother_language = self.pick(&LANGUAGES[..5]).to_string();
        cv.modern_language1 = if cv.mother_language == "English" {
            "German".to_string()
        } else {
            "English".to_string()
        };
        cv.level1 = match quality {
            Quality::High => self.pick(&LANGUAGE_LEVELS[3..]),
            _ => self.pick(&LANGUAGE_LEVELS[1..5]),
        }
        .to_string();

        if quality != Quality::Low && self.rng.gen_bool(0.6) {
            let others: Vec<&str> = LANGUAGES
                .iter()
                .copied()
                .filter(|l| *l != cv.mother_language && *l != cv.modern_language1)
                .collect();
            cv.modern_language2 = self.pick(&others).to_string();
            cv.level2 = self.pick(&LANGUAGE_LEVELS[..5]).to_string();
        }
    }

    fn fill_additional(&mut self, cv: &mut CvRecord, template: &SectorTemplate, quality: Quality) {
        match quality {
            Quality::High => {
                cv.publications = format!("Paper on {}, 2022", self.pick(template.subjects));
                cv.honours_and_awards = self
                    .pick(&["Best Graduate", "Dean's List", "Excellence Award", "Industry Recognition"])
                    .to_string();
                cv.projects =
                    format!("Led {} project", self.pick(&["innovation", "research", "development"]));
            }
            Quality::Medium => {
                if self.rng.gen_bool(0.3) {
                    cv.publications = format!("Article on {}", self.pick(template.subjects));
                }
                if self.rng.gen_bool(0.5) {
                    cv.honours_and_awards = "Academic Achievement".to_string();
                }
                cv.projects = "Personal projects, hackathon participation".to_string();
            }
            Quality::Low => return,
        }
        cv.presentations = self.pick(&["", "Conference presentation", "Workshop"]).to_string();
        cv.conferences = self.pick(&["", "Industry conference 2023", ""]).to_string();
        cv.memberships = self.pick(&["", "Professional Association", ""]).to_string();
    }

    fn describe(&mut self, label: &str) -> String {
        let pools: Vec<&[&str]> = label
            .chars()
            .take(3)
            .filter_map(|letter| TRAITS.iter().find(|(l, _)| *l == letter))
            .map(|(_, pool)| *pool)
            .collect();
        let words: Vec<&str> = pools.into_iter().map(|pool| self.pick(pool)).collect();
        format!("{} professional with strong work ethic", words.join(", "))
    }
}

pub fn save_samples(dir: &Path, samples: &[TrainingSample]) -> Result<(), AppError> {
    let path = dir.join(TRAINING_FILE);
    write_json_atomic(&path, &samples)?;
    info!(path = %path.display(), samples = samples.len(), "Training data saved");
    Ok(())
}

pub fn load_samples(dir: &Path) -> Result<Vec<TrainingSample>, AppError> {
    read_json(&dir.join(TRAINING_FILE))
}
