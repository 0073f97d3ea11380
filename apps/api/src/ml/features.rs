//! CV → fixed-order numeric feature vector for the scoring model.
//!
//! Uses the same lookup tables and tenure logic as the rule-based scorer but
//! reports raw, capped quantities instead of weighted points.

use tracing::debug;

use crate::models::cv::{split_list, CvRecord};
use crate::models::sector::{SectorCatalog, SectorProfile};
use crate::scoring::lookup;
use crate::scoring::tenure::{is_open_ended, tenure_years};

pub const FEATURE_COUNT: usize = 31;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    // education
    "education_level",
    "education_field_match",
    "university_prestige",
    "years_studied",
    "has_masters",
    // work
    "total_work_years",
    "num_positions",
    "max_seniority",
    "work_field_match",
    "current_employment",
    "avg_tenure",
    // skills
    "required_skills_match",
    "extra_skills_match",
    "has_driving_license",
    "computer_skills_count",
    "total_skills_words",
    // languages
    "num_languages",
    "has_english",
    "max_language_level",
    "mother_tongue_tier",
    // soft skills
    "soft_skills_categories",
    "has_leadership",
    "has_communication",
    // additional
    "publications_count",
    "awards_count",
    "projects_count",
    "professional_memberships",
    // personality
    "personality_match",
    "personality_partial_match",
    "introversion_score",
    "thinking_score",
];

/// Feature groups in vector order, used to aggregate importances.
pub const FEATURE_GROUPS: [(&str, usize); 7] = [
    ("education", 5),
    ("work_experience", 6),
    ("skills", 5),
    ("languages", 4),
    ("soft_skills", 3),
    ("additional", 4),
    ("personality", 4),
];

const NO_LICENSE: &[&str] = &["no", "none", "n/a"];

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn match_ratio(text: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let matched = keywords.iter().filter(|kw| text.contains(kw.as_str())).count();
    matched as f64 / keywords.len() as f64
}

fn capped_count(field: &str, cap: f64) -> f64 {
    f64::min(split_list(field).len() as f64, cap)
}

pub struct FeatureExtractor<'a> {
    catalog: &'a SectorCatalog,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(catalog: &'a SectorCatalog) -> Self {
        Self { catalog }
    }

    /// Always returns [`FEATURE_COUNT`] values. An unknown sector zeroes the
    /// sector-relative features.
    pub fn extract(&self, cv: &CvRecord, sector: &str) -> Vec<f64> {
        let empty = SectorProfile::default();
        let profile = self.catalog.get(sector).unwrap_or(&empty);

        let mut features = Vec::with_capacity(FEATURE_COUNT);
        education_features(cv, profile, &mut features);
        work_features(cv, profile, &mut features);
        skills_features(cv, profile, &mut features);
        language_features(cv, &mut features);
        soft_skills_features(cv, &mut features);
        additional_features(cv, &mut features);
        personality_features(cv, profile, &mut features);
        debug_assert_eq!(features.len(), FEATURE_COUNT);
        features
    }
}

fn education_features(cv: &CvRecord, profile: &SectorProfile, out: &mut Vec<f64>) {
    let has_masters = !cv.master1.trim().is_empty() || !cv.master2.trim().is_empty();
    let mut level = lookup::qualification_level(&cv.qualifications_awarded.to_lowercase());
    if has_masters {
        level = level.max(5);
    }

    let years_studied = match cv.years_studied.trim() {
        "" => 0.0,
        raw => raw.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or_else(|| {
            debug!(years_studied = raw, "Unparsable YearsStudied, using 0");
            0.0
        }),
    };

    out.push(f64::from(level));
    out.push(match_ratio(&cv.subjects_studied.to_lowercase(), &profile.education));
    out.push(f64::from(lookup::university_tier(&cv.college_university.to_lowercase())));
    out.push(years_studied.clamp(0.0, 10.0));
    out.push(flag(has_masters));
}

fn work_features(cv: &CvRecord, profile: &SectorProfile, out: &mut Vec<f64>) {
    let mut total_years = 0.0;
    let mut positions = 0usize;
    let mut max_seniority = 0u8;
    let mut current = false;
    let mut tenures = Vec::new();
    let mut text = String::new();

    for entry in cv.work_entries().iter().filter(|e| !e.is_empty()) {
        positions += 1;
        text.push_str(&format!(
            " {} {} {}",
            entry.workplace, entry.occupation, entry.main_activities
        ));

        let tenure = tenure_years(entry.dates);
        if tenure > 0.0 {
            tenures.push(tenure);
            total_years += tenure;
        }
        current |= is_open_ended(entry.dates);
        max_seniority = max_seniority.max(lookup::seniority_level(&entry.occupation.to_lowercase()));
    }

    let avg_tenure = if tenures.is_empty() {
        0.0
    } else {
        tenures.iter().sum::<f64>() / tenures.len() as f64
    };

    out.push(f64::min(total_years, 20.0));
    out.push(positions as f64);
    out.push(f64::from(max_seniority));
    out.push(match_ratio(&text.to_lowercase(), &profile.work_experience));
    out.push(flag(current));
    out.push(f64::min(avg_tenure, 10.0));
}

fn skills_features(cv: &CvRecord, profile: &SectorProfile, out: &mut Vec<f64>) {
    let text = cv.skills_text();
    let license = cv.driving_license.trim().to_lowercase();

    out.push(match_ratio(&text, &profile.skills));
    out.push(match_ratio(&text, &profile.extra_skills));
    out.push(flag(!license.is_empty() && !NO_LICENSE.contains(&license.as_str())));
    out.push(capped_count(&cv.computer_skills, 15.0));
    out.push(f64::min(text.split_whitespace().count() as f64, 100.0));
}

fn language_features(cv: &CvRecord, out: &mut Vec<f64>) {
    let modern = [&cv.modern_language1, &cv.modern_language2]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .count();
    let has_english = cv
        .languages()
        .iter()
        .any(|l| l.to_lowercase().contains("english"));
    let max_level = lookup::cefr_rank(&cv.level1.to_lowercase())
        .max(lookup::cefr_rank(&cv.level2.to_lowercase()));

    out.push((1 + modern) as f64);
    out.push(flag(has_english));
    out.push(f64::from(max_level));
    out.push(f64::from(lookup::language_tier(&cv.mother_language.to_lowercase())));
}

fn soft_skills_features(cv: &CvRecord, out: &mut Vec<f64>) {
    let text = format!(
        "{} {} {}",
        cv.short_description, cv.communication_skills, cv.organizational_managerial_skills
    )
    .to_lowercase();
    let categories = lookup::soft_skill_categories(&text);

    out.push(categories.len() as f64);
    out.push(flag(categories.contains(&"leadership")));
    out.push(flag(categories.contains(&"communication")));
}

fn additional_features(cv: &CvRecord, out: &mut Vec<f64>) {
    out.push(capped_count(&cv.publications, 10.0));
    out.push(capped_count(&cv.honours_and_awards, 10.0));
    out.push(capped_count(&cv.projects, 10.0));
    out.push(flag(!cv.memberships.trim().is_empty()));
}

fn personality_features(cv: &CvRecord, profile: &SectorProfile, out: &mut Vec<f64>) {
    let label = cv.personality_type_mb.trim().to_uppercase();
    let exact = !label.is_empty() && profile.personality.contains(&label);
    let partial = label.len() >= 2
        && profile
            .personality
            .iter()
            .any(|p| p.len() >= 2 && p.get(..2) == label.get(..2));

    let letter_score = |index: usize, expected: char| match label.chars().nth(index) {
        Some(c) if c == expected => 1.0,
        Some(_) => 0.0,
        None => 0.5,
    };

    out.push(flag(exact));
    out.push(flag(partial));
    out.push(letter_score(0, 'I'));
    out.push(letter_score(2, 'T'));
}
