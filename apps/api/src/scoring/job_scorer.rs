//! Job scorer: combines the category scorers into a 0–105 fit score for a
//! (CV, sector) pair, and derives rankings, breakdowns and skill gaps.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::cv::{split_list, CvRecord};
use crate::models::sector::{SectorCatalog, SectorProfile};
use crate::scoring::categories::{self, WEIGHTS};
use crate::scoring::tenure::{parse_date, tenure_years};

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Per-category points and ceilings for one (CV, sector) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub education: f64,
    pub work_experience: f64,
    pub skills: f64,
    pub languages: f64,
    pub soft_skills: f64,
    pub additional: f64,
    pub personality_bonus: f64,
    pub max_education: f64,
    pub max_work_experience: f64,
    pub max_skills: f64,
    pub max_languages: f64,
    pub max_soft_skills: f64,
    pub max_additional: f64,
    pub max_personality_bonus: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.education
            + self.work_experience
            + self.skills
            + self.languages
            + self.soft_skills
            + self.additional
            + self.personality_bonus
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorScore {
    pub sector: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGapReport {
    pub missing_required: Vec<String>,
    pub missing_extra: Vec<String>,
    pub matched: Vec<String>,
}

/// A numeric criterion as sent by the client: a JSON number or a string
/// such as `"30"`. Anything unreadable is ignored when filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericCriterion {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl NumericCriterion {
    pub fn value(&self) -> Option<f64> {
        match self {
            NumericCriterion::Number(n) => Some(*n),
            NumericCriterion::Text(s) => s.trim().parse::<f64>().ok(),
            NumericCriterion::Other(_) => None,
        }
        .filter(|v| v.is_finite())
    }
}

impl From<&str> for NumericCriterion {
    fn from(s: &str) -> Self {
        NumericCriterion::Text(s.to_string())
    }
}

/// Optional screening criteria. Unset fields do not filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateCriteria {
    pub nationality: Option<String>,
    pub age_min: Option<NumericCriterion>,
    pub age_max: Option<NumericCriterion>,
    pub sex: Option<String>,
    pub experience_years: Option<NumericCriterion>,
    /// Comma-separated; every skill must appear in the skill fields.
    pub skills: Option<String>,
    /// Comma-separated; every language must be spoken.
    pub languages: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// JobScorer
// ────────────────────────────────────────────────────────────────────────────

/// Rule-based scorer over a read-only sector catalog.
pub struct JobScorer<'a> {
    catalog: &'a SectorCatalog,
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn breakdown_for(cv: &CvRecord, profile: &SectorProfile, label: &str) -> ScoreBreakdown {
    ScoreBreakdown {
        education: categories::education_score(cv, profile),
        work_experience: categories::work_score(cv, profile),
        skills: categories::skills_score(cv, profile),
        languages: categories::language_score(cv),
        soft_skills: categories::soft_skills_score(cv),
        additional: categories::additional_score(cv),
        personality_bonus: categories::personality_bonus(label, profile),
        max_education: WEIGHTS.education,
        max_work_experience: WEIGHTS.work_experience,
        max_skills: WEIGHTS.skills,
        max_languages: WEIGHTS.languages,
        max_soft_skills: WEIGHTS.soft_skills,
        max_additional: WEIGHTS.additional,
        max_personality_bonus: WEIGHTS.personality_bonus,
    }
}

impl<'a> JobScorer<'a> {
    pub fn new(catalog: &'a SectorCatalog) -> Self {
        Self { catalog }
    }

    /// Fit score in `[0, 105]`, rounded to one decimal. Unknown sectors score 0.
    /// The personality bonus uses the CV's own label.
    pub fn score(&self, cv: &CvRecord, sector: &str) -> f64 {
        self.score_with_label(cv, sector, &cv.personality_type_mb)
    }

    /// Same as [`score`](Self::score) with a precomputed MBTI label.
    pub fn score_with_label(&self, cv: &CvRecord, sector: &str, label: &str) -> f64 {
        match self.catalog.get(sector) {
            Some(profile) => round1(breakdown_for(cv, profile, label).total()),
            None => 0.0,
        }
    }

    /// Unrounded per-category points; `None` for an unknown sector.
    pub fn breakdown(&self, cv: &CvRecord, sector: &str) -> Option<ScoreBreakdown> {
        self.catalog
            .get(sector)
            .map(|profile| breakdown_for(cv, profile, &cv.personality_type_mb))
    }

    /// Scores every catalog sector, best first. Ties keep catalog order.
    pub fn rank_all_sectors(&self, cv: &CvRecord) -> Vec<SectorScore> {
        let mut ranking: Vec<SectorScore> = self
            .catalog
            .iter()
            .map(|(name, profile)| SectorScore {
                sector: name.to_string(),
                score: round1(breakdown_for(cv, profile, &cv.personality_type_mb).total()),
            })
            .collect();
        ranking.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranking
    }

    /// Required and extra skills the CV does not mention.
    pub fn skill_gaps(&self, cv: &CvRecord, sector: &str) -> SkillGapReport {
        let Some(profile) = self.catalog.get(sector) else {
            return SkillGapReport::default();
        };
        let text = cv.skills_text();
        let mut report = SkillGapReport::default();

        for skill in &profile.skills {
            if text.contains(skill.as_str()) {
                report.matched.push(skill.clone());
            } else {
                report.missing_required.push(skill.clone());
            }
        }
        for skill in &profile.extra_skills {
            if text.contains(skill.as_str()) {
                report.matched.push(skill.clone());
            } else {
                report.missing_extra.push(skill.clone());
            }
        }
        report
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Candidate filtering
// ────────────────────────────────────────────────────────────────────────────

fn age_in_years(date_of_birth: &str) -> Option<i64> {
    let born = parse_date(date_of_birth)?;
    Some((Utc::now().date_naive() - born).num_days() / 365)
}

/// Reads a numeric criterion; an unreadable one drops out of the filter.
fn criterion_value(name: &str, criterion: Option<&NumericCriterion>) -> Option<f64> {
    let criterion = criterion?;
    let value = criterion.value();
    if value.is_none() {
        debug!(criterion = name, value = ?criterion, "Ignoring unparsable filter criterion");
    }
    value
}

fn matches_criteria(cv: &CvRecord, criteria: &CandidateCriteria) -> bool {
    if let Some(nationality) = criteria.nationality.as_deref() {
        let required = nationality.trim().to_lowercase();
        if !required.is_empty() && !cv.nationality.to_lowercase().contains(&required) {
            return false;
        }
    }

    // Candidates without a readable birth date are not excluded by age.
    let age_min = criterion_value("age_min", criteria.age_min.as_ref());
    let age_max = criterion_value("age_max", criteria.age_max.as_ref());
    if age_min.is_some() || age_max.is_some() {
        if let Some(age) = age_in_years(&cv.date_of_birth).map(|a| a as f64) {
            if age_min.is_some_and(|min| age < min) {
                return false;
            }
            if age_max.is_some_and(|max| age > max) {
                return false;
            }
        }
    }

    if let Some(sex) = criteria.sex.as_deref() {
        let required = sex.trim().to_uppercase();
        if !required.is_empty() && required != cv.sex.trim().to_uppercase() {
            return false;
        }
    }

    if let Some(min_years) = criterion_value("experience_years", criteria.experience_years.as_ref()) {
        let total: f64 = cv.work_entries().iter().map(|e| tenure_years(e.dates)).sum();
        if total < min_years {
            return false;
        }
    }

    if let Some(skills) = criteria.skills.as_deref() {
        let text = cv.skills_text();
        let required = skills.to_lowercase();
        if !split_list(&required).iter().all(|s| text.contains(s)) {
            return false;
        }
    }

    if let Some(languages) = criteria.languages.as_deref() {
        let spoken = cv.languages().join(" ").to_lowercase();
        let required = languages.to_lowercase();
        if !split_list(&required).iter().all(|l| spoken.contains(l)) {
            return false;
        }
    }

    true
}

/// Candidates satisfying every set criterion, in input order.
pub fn filter_candidates<'c>(
    candidates: &'c [CvRecord],
    criteria: &CandidateCriteria,
) -> Vec<&'c CvRecord> {
    candidates
        .iter()
        .filter(|cv| matches_criteria(cv, criteria))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_catalog() -> SectorCatalog {
        SectorCatalog::builtin().unwrap()
    }

    fn make_ict_cv() -> CvRecord {
        CvRecord {
            first_name: "Test".to_string(),
            last_name: "Candidate".to_string(),
            workplace1: "Tech Corp".to_string(),
            dates1: "01.01.2018 - current".to_string(),
            occupation1: "Senior Software Engineer".to_string(),
            main_activities1: "Developed web applications and cloud APIs".to_string(),
            college_university: "Stanford University".to_string(),
            subjects_studied: "Computer Science".to_string(),
            qualifications_awarded: "BSc Computer Science".to_string(),
            communication_skills: "Excellent communication and team player".to_string(),
            computer_skills: "Python, Java, SQL, Linux, Docker, Git".to_string(),
            job_related_skills: "Programming, problem solving, machine learning".to_string(),
            mother_language: "English".to_string(),
            modern_language1: "German".to_string(),
            level1: "B2".to_string(),
            short_description: "Analytical and logical problem solver".to_string(),
            personality_type_mb: "INTJ".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_sector_scores_zero() {
        let catalog = make_catalog();
        let scorer = JobScorer::new(&catalog);
        assert_eq!(scorer.score(&make_ict_cv(), "Underwater_Basket_Weaving"), 0.0);
        assert!(scorer.breakdown(&make_ict_cv(), "Underwater_Basket_Weaving").is_none());
    }

    #[test]
    fn test_score_matches_breakdown_total() {
        let catalog = make_catalog();
        let scorer = JobScorer::new(&catalog);
        let cv = make_ict_cv();
        let score = scorer.score(&cv, "Computers_ICT");
        let breakdown = scorer.breakdown(&cv, "Computers_ICT").unwrap();
        assert!((score - breakdown.total()).abs() <= 0.05);
        assert_eq!(breakdown.personality_bonus, 5.0);
        assert!(score > 0.0 && score <= 105.0);
    }

    #[test]
    fn test_ict_candidate_beats_empty_sector() {
        let mut catalog = make_catalog();
        catalog.insert("Empty", SectorProfile::default());
        let scorer = JobScorer::new(&catalog);
        let cv = make_ict_cv();
        assert!(scorer.score(&cv, "Computers_ICT") > scorer.score(&cv, "Empty"));
    }

    #[test]
    fn test_ict_ranks_first_for_ict_candidate() {
        let catalog = make_catalog();
        let scorer = JobScorer::new(&catalog);
        let ranking = scorer.rank_all_sectors(&make_ict_cv());
        assert_eq!(ranking.len(), catalog.len());
        assert_eq!(ranking[0].sector, "Computers_ICT");
        assert!(ranking.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let catalog = make_catalog();
        let scorer = JobScorer::new(&catalog);
        let cv = make_ict_cv();
        assert_eq!(
            scorer.score(&cv, "Computers_ICT"),
            scorer.score(&cv, "Computers_ICT")
        );
    }

    #[test]
    fn test_structural_floor_from_education_and_languages() {
        // No keyword overlap with the sector still earns structural points.
        let catalog = make_catalog();
        let scorer = JobScorer::new(&catalog);
        let cv = CvRecord {
            qualifications_awarded: "PhD".to_string(),
            mother_language: "English".to_string(),
            ..Default::default()
        };
        let breakdown = scorer.breakdown(&cv, "Food_Beverages").unwrap();
        assert!(breakdown.education > 0.0);
        assert!(breakdown.languages > 0.0);
    }

    #[test]
    fn test_precomputed_label_overrides_cv_label() {
        let catalog = make_catalog();
        let scorer = JobScorer::new(&catalog);
        let cv = make_ict_cv();
        let with_cv_label = scorer.score(&cv, "Computers_ICT");
        let with_other = scorer.score_with_label(&cv, "Computers_ICT", "ESFP");
        assert!((with_cv_label - with_other - 5.0).abs() < 0.11);
    }

    #[test]
    fn test_skill_gaps() {
        let catalog = make_catalog();
        let scorer = JobScorer::new(&catalog);
        let report = scorer.skill_gaps(&make_ict_cv(), "Computers_ICT");
        assert!(report.matched.contains(&"python".to_string()));
        assert!(report.matched.contains(&"docker".to_string()));
        assert!(report.missing_required.contains(&"cryptography".to_string()));
        assert!(report.missing_extra.contains(&"kubernetes".to_string()));

        let empty = scorer.skill_gaps(&make_ict_cv(), "Nope");
        assert_eq!(empty, SkillGapReport::default());
    }

    /// Every keyword of every sector, in every field that scoring reads.
    fn make_maximal_cv(catalog: &SectorCatalog) -> CvRecord {
        let mut keywords: Vec<String> = Vec::new();
        for (_, profile) in catalog.iter() {
            keywords.extend(profile.education.iter().cloned());
            keywords.extend(profile.work_experience.iter().cloned());
            keywords.extend(profile.skills.iter().cloned());
            keywords.extend(profile.extra_skills.iter().cloned());
        }
        let all = keywords.join(", ");
        let many = (0..40).map(|i| format!("item {i}")).collect::<Vec<_>>().join(", ");
        CvRecord {
            first_name: "Max".to_string(),
            last_name: "Imal".to_string(),
            workplace1: "Global Corp".to_string(),
            dates1: "01.01.1980 - current".to_string(),
            occupation1: format!("Chief Executive Director Senior Manager {all}"),
            main_activities1: all.clone(),
            workplace2: "Second Corp".to_string(),
            dates2: "01.01.1970 - 01.01.1980".to_string(),
            occupation2: format!("Head of {all}"),
            main_activities2: all.clone(),
            workplace3: "Third Corp".to_string(),
            dates3: "01.01.1960 - 01.01.1970".to_string(),
            occupation3: format!("Lead {all}"),
            main_activities3: all.clone(),
            high_school: "High School".to_string(),
            college_university: "Stanford University, MIT, Oxford, Cambridge".to_string(),
            subjects_studied: all.clone(),
            years_studied: "12".to_string(),
            qualifications_awarded: "PhD, Doctorate".to_string(),
            master1: "MSc".to_string(),
            master2: "MBA".to_string(),
            communication_skills: format!("leadership, communication, teamwork, {all}"),
            organizational_managerial_skills: format!("management, organization, {all}"),
            job_related_skills: all.clone(),
            computer_skills: all.clone(),
            other_skills: all.clone(),
            driving_license: "A, B, C, D".to_string(),
            mother_language: "English".to_string(),
            modern_language1: "German, French, Spanish".to_string(),
            level1: "C2".to_string(),
            modern_language2: "Chinese, Arabic, Russian".to_string(),
            level2: "C2".to_string(),
            publications: many.clone(),
            presentations: many.clone(),
            projects: many.clone(),
            conferences: many.clone(),
            honours_and_awards: many.clone(),
            memberships: many,
            short_description: all,
            hobbies: "reading, chess, football, volunteering, travel".to_string(),
            personality_type_mb: "INTJ".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_category_bounds_hold_for_every_sector() {
        let catalog = make_catalog();
        let scorer = JobScorer::new(&catalog);
        let maximal = make_maximal_cv(&catalog);
        let empty = CvRecord::default();

        for sector in catalog.names() {
            for (which, cv) in [("maximal", &maximal), ("empty", &empty)] {
                let b = scorer.breakdown(cv, sector).unwrap();
                let pairs = [
                    ("education", b.education, b.max_education),
                    ("work_experience", b.work_experience, b.max_work_experience),
                    ("skills", b.skills, b.max_skills),
                    ("languages", b.languages, b.max_languages),
                    ("soft_skills", b.soft_skills, b.max_soft_skills),
                    ("additional", b.additional, b.max_additional),
                    ("personality_bonus", b.personality_bonus, b.max_personality_bonus),
                ];
                for (category, points, max) in pairs {
                    assert!(
                        points >= 0.0 && points <= max,
                        "{which} CV, {sector}/{category}: {points} not in [0, {max}]"
                    );
                }
                let score = scorer.score(cv, sector);
                assert!((score - b.total()).abs() <= 0.05, "{which} CV, {sector}");
                assert!((0.0..=105.0).contains(&score), "{which} CV, {sector}: {score}");
            }
        }

        // The maximal CV reaches well into every sector's range.
        for sector in catalog.names() {
            assert!(scorer.score(&maximal, sector) > scorer.score(&empty, sector), "{sector}");
        }
    }

    #[test]
    fn test_filter_candidates() {
        let mut older = make_ict_cv();
        older.nationality = "British".to_string();
        older.date_of_birth = "01.01.1970".to_string();
        older.sex = "M".to_string();

        let mut younger = make_ict_cv();
        younger.nationality = "German".to_string();
        younger.date_of_birth = "01.01.2000".to_string();
        younger.sex = "F".to_string();
        younger.computer_skills = "Excel".to_string();

        let candidates = vec![older, younger];

        let by_nationality = filter_candidates(
            &candidates,
            &CandidateCriteria {
                nationality: Some("brit".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(by_nationality.len(), 1);
        assert_eq!(by_nationality[0].nationality, "British");

        let by_age = filter_candidates(
            &candidates,
            &CandidateCriteria {
                age_max: Some(NumericCriterion::Number(40.0)),
                ..Default::default()
            },
        );
        assert_eq!(by_age.len(), 1);
        assert_eq!(by_age[0].nationality, "German");

        let by_skills = filter_candidates(
            &candidates,
            &CandidateCriteria {
                skills: Some("python, sql".to_string()),
                languages: Some("english".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(by_skills.len(), 1);

        let by_sex = filter_candidates(
            &candidates,
            &CandidateCriteria {
                sex: Some("f".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(by_sex.len(), 1);

        let by_experience = filter_candidates(
            &candidates,
            &CandidateCriteria {
                experience_years: Some("50".into()),
                ..Default::default()
            },
        );
        assert!(by_experience.is_empty());

        assert_eq!(
            filter_candidates(&candidates, &CandidateCriteria::default()).len(),
            2
        );
    }

    #[test]
    fn test_unparsable_numeric_criteria_are_ignored() {
        let mut british = make_ict_cv();
        british.nationality = "British".to_string();
        british.date_of_birth = "01.01.1970".to_string();
        let mut german = make_ict_cv();
        german.nationality = "German".to_string();
        let candidates = vec![british, german];

        let criteria = CandidateCriteria {
            nationality: Some("brit".to_string()),
            age_min: Some("thirty".into()),
            age_max: Some(NumericCriterion::Other(serde_json::json!(true))),
            experience_years: Some("".into()),
            ..Default::default()
        };
        let matched = filter_candidates(&candidates, &criteria);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].nationality, "British");

        let younger_than_forty = CandidateCriteria {
            age_max: Some(" 40 ".into()),
            ..Default::default()
        };
        assert!(filter_candidates(&candidates, &younger_than_forty)
            .iter()
            .all(|cv| cv.nationality != "British"));
    }

    #[test]
    fn test_numeric_criteria_accept_numbers_and_strings() {
        let criteria: CandidateCriteria =
            serde_json::from_value(serde_json::json!({"age_min": 30, "age_max": "45", "experience_years": [1]}))
                .unwrap();
        assert_eq!(criteria.age_min.and_then(|c| c.value()), Some(30.0));
        assert_eq!(criteria.age_max.and_then(|c| c.value()), Some(45.0));
        assert_eq!(criteria.experience_years.and_then(|c| c.value()), None);
    }
}
