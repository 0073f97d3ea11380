//! The six category scorers and the personality bonus.
//!
//! Every scorer is total: missing or malformed CV fields contribute nothing,
//! and each result lies in `[0, ceiling]`.

use std::collections::HashSet;

use crate::models::cv::CvRecord;
use crate::models::sector::SectorProfile;
use crate::scoring::lookup;
use crate::scoring::tenure::tenure_years;

/// Ceiling of each category. A perfect CV reaches 100 before the bonus.
#[derive(Debug, Clone, Copy)]
pub struct CategoryWeights {
    pub education: f64,
    pub work_experience: f64,
    pub skills: f64,
    pub languages: f64,
    pub soft_skills: f64,
    pub additional: f64,
    pub personality_bonus: f64,
}

pub const WEIGHTS: CategoryWeights = CategoryWeights {
    education: 25.0,
    work_experience: 30.0,
    skills: 20.0,
    languages: 10.0,
    soft_skills: 10.0,
    additional: 5.0,
    personality_bonus: 5.0,
};

const NO_LICENSE: &[&str] = &["no", "none", "n/a"];

fn lower(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Qualification level, field match and university prestige.
pub fn education_score(cv: &CvRecord, sector: &SectorProfile) -> f64 {
    let max = WEIGHTS.education;

    let qualifications = lower(&cv.qualifications_awarded);
    let master1 = lower(&cv.master1);
    let master2 = lower(&cv.master2);

    let mut level = lookup::qualification_level(&qualifications);
    if !master1.is_empty() || !master2.is_empty() {
        level = level.max(5);
    }
    let mut raw = f64::from(level) / 6.0 * 10.0;

    // A keyword counts once, in the first source that mentions it.
    let subjects = lower(&cv.subjects_studied);
    let masters = format!("{master1} {master2}");
    let mut matched: HashSet<&str> = HashSet::new();
    let mut field_match = 0.0;
    for (text, points) in [(&subjects, 2.0), (&qualifications, 1.5), (&masters, 2.0)] {
        for kw in &sector.education {
            if text.contains(kw.as_str()) && matched.insert(kw.as_str()) {
                field_match += points;
            }
        }
    }
    raw += f64::min(10.0, field_match);

    raw += lookup::university_bonus(&lower(&cv.college_university));

    f64::min(max, raw / 25.0 * max)
}

/// Tenure, seniority and sector relevance over the three work slots.
pub fn work_score(cv: &CvRecord, sector: &SectorProfile) -> f64 {
    let max = WEIGHTS.work_experience;

    let mut total_years = 0.0;
    let mut max_seniority = 0u8;
    let mut relevance = 0.0;
    let mut matched: HashSet<&str> = HashSet::new();

    for entry in cv.work_entries().iter().filter(|e| !e.is_empty()) {
        total_years += tenure_years(entry.dates);
        max_seniority = max_seniority.max(lookup::seniority_level(&lower(entry.occupation)));

        let text = format!(
            "{} {} {}",
            entry.workplace.trim(),
            entry.occupation.trim(),
            entry.main_activities.trim()
        )
        .to_lowercase();
        for kw in &sector.work_experience {
            if text.contains(kw.as_str()) && matched.insert(kw.as_str()) {
                relevance += 2.5;
            }
        }
    }

    let raw = f64::min(12.0, total_years * 1.2)
        + f64::from(max_seniority) / 6.0 * 8.0
        + f64::min(10.0, relevance);

    f64::min(max, raw / 30.0 * max)
}

fn match_ratio(keywords: &[String], text: &str) -> f64 {
    let matched = keywords.iter().filter(|kw| text.contains(kw.as_str())).count();
    matched as f64 / keywords.len().max(1) as f64
}

/// Required/extra skill coverage plus the driving-license point.
pub fn skills_score(cv: &CvRecord, sector: &SectorProfile) -> f64 {
    let max = WEIGHTS.skills;
    let text = cv.skills_text();

    let required = match_ratio(&sector.skills, &text);
    let extra = match_ratio(&sector.extra_skills, &text);
    let mut raw = (required * 0.7 + extra * 0.3) * max;

    let license = lower(&cv.driving_license);
    if !license.is_empty() && !NO_LICENSE.contains(&license.as_str()) {
        raw += 1.0;
    }

    f64::min(max, raw)
}

/// Mother tongue tier plus each modern language weighted by proficiency.
pub fn language_score(cv: &CvRecord) -> f64 {
    let max = WEIGHTS.languages;

    let mut raw = f64::from(lookup::language_tier(&lower(&cv.mother_language)));
    for (language, level) in [
        (&cv.modern_language1, &cv.level1),
        (&cv.modern_language2, &cv.level2),
    ] {
        let language = lower(language);
        if language.is_empty() {
            continue;
        }
        raw += f64::from(lookup::language_tier(&language))
            * lookup::level_multiplier(&lower(level))
            * 0.5;
    }

    // A trilingual CV in top-tier languages reaches ~12 raw points.
    f64::min(max, raw / 12.0 * max)
}

pub(crate) fn soft_skills_text(cv: &CvRecord) -> String {
    [
        cv.short_description.as_str(),
        cv.communication_skills.as_str(),
        cv.organizational_managerial_skills.as_str(),
        cv.main_activities1.as_str(),
        cv.main_activities2.as_str(),
        cv.main_activities3.as_str(),
    ]
    .join(" ")
    .to_lowercase()
}

/// Share of soft-skill categories evidenced in the descriptive fields.
pub fn soft_skills_score(cv: &CvRecord) -> f64 {
    let matched = lookup::soft_skill_categories(&soft_skills_text(cv)).len();
    matched as f64 / lookup::SOFT_SKILLS.len().max(1) as f64 * WEIGHTS.soft_skills
}

fn item_count(field: &str) -> usize {
    (field.matches(',').count() + 1).min(3)
}

/// Publications, awards, projects and professional activity.
pub fn additional_score(cv: &CvRecord) -> f64 {
    let max = WEIGHTS.additional;
    let mut raw = 0.0;

    for (field, points) in [
        (&cv.publications, 0.5),
        (&cv.honours_and_awards, 0.6),
        (&cv.projects, 0.3),
    ] {
        let field = field.trim();
        if !field.is_empty() {
            raw += item_count(field) as f64 * points;
        }
    }
    for (field, points) in [
        (&cv.presentations, 0.4),
        (&cv.conferences, 0.3),
        (&cv.memberships, 0.4),
    ] {
        if !field.trim().is_empty() {
            raw += points;
        }
    }

    f64::min(max, raw)
}

/// Full bonus for a preferred label, half when the first two letters agree
/// with any preferred label.
pub fn personality_bonus(label: &str, sector: &SectorProfile) -> f64 {
    let label = label.trim().to_uppercase();
    if label.is_empty() {
        return 0.0;
    }
    if sector.personality.iter().any(|p| *p == label) {
        return WEIGHTS.personality_bonus;
    }
    let partial = label.len() >= 2
        && sector
            .personality
            .iter()
            .any(|p| p.len() >= 2 && p.get(..2) == label.get(..2));
    if partial {
        WEIGHTS.personality_bonus * 0.5
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_sector() -> SectorProfile {
        let words = |ws: &[&str]| ws.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        SectorProfile {
            education: words(&["computer science", "software", "data"]),
            work_experience: words(&["software", "developer", "engineer", "cloud"]),
            skills: words(&["python", "sql", "teamwork", "linux"]),
            extra_skills: words(&["docker", "kubernetes"]),
            personality: words(&["INTJ", "ISTJ"]),
        }
    }

    #[test]
    fn test_empty_cv_scores_zero_everywhere() {
        let cv = CvRecord::default();
        let sector = make_sector();
        assert_eq!(education_score(&cv, &sector), 0.0);
        assert_eq!(work_score(&cv, &sector), 0.0);
        assert_eq!(skills_score(&cv, &sector), 0.0);
        assert_eq!(language_score(&cv), 0.0);
        assert_eq!(soft_skills_score(&cv), 0.0);
        assert_eq!(additional_score(&cv), 0.0);
        assert_eq!(personality_bonus("", &sector), 0.0);
    }

    #[test]
    fn test_education_masters_floor_and_field_match() {
        let cv = CvRecord {
            qualifications_awarded: "BSc Computer Science".to_string(),
            subjects_studied: "Computer Science, Data Structures".to_string(),
            master1: "MSc Software Engineering".to_string(),
            college_university: "Stanford University".to_string(),
            ..Default::default()
        };
        // level 5 → 8.33, field: subjects "computer science"+"data" = 4, masters "software" = 2 → 6,
        // university 5 → raw 19.33
        let score = education_score(&cv, &make_sector());
        assert!((score - 19.33).abs() < 0.01, "got {score}");
    }

    #[test]
    fn test_education_keyword_counted_once() {
        let sector = make_sector();
        let cv = CvRecord {
            subjects_studied: "software".to_string(),
            qualifications_awarded: "software".to_string(),
            ..Default::default()
        };
        // level 0, "software" once at 2 points
        assert!((education_score(&cv, &sector) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_work_skips_empty_workplace() {
        let sector = make_sector();
        let cv = CvRecord {
            dates1: "2010 - 2020".to_string(),
            occupation1: "Software Engineer".to_string(),
            ..Default::default()
        };
        assert_eq!(work_score(&cv, &sector), 0.0);
    }

    #[test]
    fn test_work_combines_years_seniority_relevance() {
        let sector = make_sector();
        let cv = CvRecord {
            workplace1: "Acme".to_string(),
            dates1: "2010 - 2020".to_string(),
            occupation1: "Engineering Manager".to_string(),
            main_activities1: "software delivery".to_string(),
            ..Default::default()
        };
        // years ≈10 → 12, seniority 2 → 2.67, relevance "software"+"engineer" = 5
        let score = work_score(&cv, &sector);
        assert!((score - 19.67).abs() < 0.05, "got {score}");
        assert!(score <= WEIGHTS.work_experience);
    }

    #[test]
    fn test_skills_ratio_and_license() {
        let sector = make_sector();
        let cv = CvRecord {
            computer_skills: "Python, SQL, Docker".to_string(),
            driving_license: "B".to_string(),
            ..Default::default()
        };
        // required 2/4 → 0.35, extra 1/2 → 0.15 → 10 + 1
        assert!((skills_score(&cv, &sector) - 11.0).abs() < 1e-9);

        let no_license = CvRecord {
            driving_license: "None".to_string(),
            ..cv
        };
        assert!((skills_score(&no_license, &sector) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_skills_empty_sets_do_not_divide_by_zero() {
        let cv = CvRecord {
            computer_skills: "python".to_string(),
            ..Default::default()
        };
        assert_eq!(skills_score(&cv, &SectorProfile::default()), 0.0);
    }

    #[test]
    fn test_language_score() {
        let cv = CvRecord {
            mother_language: "Spanish".to_string(),
            modern_language1: "English".to_string(),
            level1: "C2".to_string(),
            modern_language2: "German".to_string(),
            level2: "B1".to_string(),
            ..Default::default()
        };
        // 3 + 3*1.0*0.5 + 2*0.5*0.5 = 5.0 → 5/12*10
        let score = language_score(&cv);
        assert!((score - 50.0 / 12.0).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn test_unknown_mother_tongue_is_tier_one() {
        let cv = CvRecord {
            mother_language: "Esperanto".to_string(),
            ..Default::default()
        };
        assert!((language_score(&cv) - 10.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_soft_skills_ratio() {
        let cv = CvRecord {
            short_description: "Strong communication, natural leadership".to_string(),
            communication_skills: "team player".to_string(),
            ..Default::default()
        };
        let expected = 3.0 / lookup::SOFT_SKILLS.len() as f64 * 10.0;
        assert!((soft_skills_score(&cv) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_additional_counts_and_cap() {
        let cv = CvRecord {
            publications: "a, b, c, d, e".to_string(),
            honours_and_awards: "x, y, z".to_string(),
            projects: "p".to_string(),
            presentations: "talk".to_string(),
            conferences: "conf".to_string(),
            memberships: "ieee".to_string(),
            ..Default::default()
        };
        // 1.5 + 1.8 + 0.3 + 0.4 + 0.3 + 0.4 = 4.7
        assert!((additional_score(&cv) - 4.7).abs() < 1e-9);
    }

    #[test]
    fn test_personality_bonus_exact_partial_none() {
        let sector = make_sector();
        assert_eq!(personality_bonus("INTJ", &sector), 5.0);
        assert_eq!(personality_bonus("intj", &sector), 5.0);
        assert_eq!(personality_bonus("INFP", &sector), 2.5);
        assert_eq!(personality_bonus("ESFP", &sector), 0.0);
    }
}
