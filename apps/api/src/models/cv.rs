use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::AppError;

/// A structured résumé. Every field is always present; an absent value is the
/// empty string. JSON keys keep the labels used by the CV files
/// (`FirstName`, `College/University`, `PersonalityTypeMB`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CvRecord {
    // Identity
    pub first_name: String,
    pub last_name: String,
    pub sex: String,
    pub date_of_birth: String,
    pub nationality: String,
    pub email_address: String,
    pub telephone_number: String,

    // Address
    pub street_name: String,
    pub house_number: String,
    pub city: String,
    pub country: String,

    // Work experience
    pub workplace1: String,
    pub dates1: String,
    pub occupation1: String,
    pub main_activities1: String,
    pub workplace2: String,
    pub dates2: String,
    pub occupation2: String,
    pub main_activities2: String,
    pub workplace3: String,
    pub dates3: String,
    pub occupation3: String,
    pub main_activities3: String,

    // Education
    pub high_school: String,
    #[serde(rename = "College/University")]
    pub college_university: String,
    pub subjects_studied: String,
    pub years_studied: String,
    pub qualifications_awarded: String,
    pub master1: String,
    pub master2: String,

    // Skills
    pub communication_skills: String,
    pub organizational_managerial_skills: String,
    pub job_related_skills: String,
    pub computer_skills: String,
    pub other_skills: String,
    pub driving_license: String,

    // Languages
    pub mother_language: String,
    pub modern_language1: String,
    pub level1: String,
    pub modern_language2: String,
    pub level2: String,

    // Additional information
    pub publications: String,
    pub presentations: String,
    pub projects: String,
    pub conferences: String,
    pub honours_and_awards: String,
    pub memberships: String,

    pub short_description: String,
    pub hobbies: String,

    /// Inferred MBTI label, written back by the personality classifier.
    #[serde(rename = "PersonalityTypeMB")]
    pub personality_type_mb: String,
    /// Best sector score, written back by the analysis endpoint.
    pub score: f64,
}

/// Borrowed view of one of the three work slots.
#[derive(Debug, Clone, Copy)]
pub struct WorkEntry<'a> {
    pub workplace: &'a str,
    pub dates: &'a str,
    pub occupation: &'a str,
    pub main_activities: &'a str,
}

impl<'a> WorkEntry<'a> {
    pub fn is_empty(&self) -> bool {
        self.workplace.trim().is_empty()
    }
}

impl CvRecord {
    /// Rejects records without the identity fields every CV file carries.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.first_name.trim().is_empty() {
            return Err(AppError::Validation("FirstName cannot be empty".to_string()));
        }
        if self.last_name.trim().is_empty() {
            return Err(AppError::Validation("LastName cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn work_entries(&self) -> [WorkEntry<'_>; 3] {
        [
            WorkEntry {
                workplace: &self.workplace1,
                dates: &self.dates1,
                occupation: &self.occupation1,
                main_activities: &self.main_activities1,
            },
            WorkEntry {
                workplace: &self.workplace2,
                dates: &self.dates2,
                occupation: &self.occupation2,
                main_activities: &self.main_activities2,
            },
            WorkEntry {
                workplace: &self.workplace3,
                dates: &self.dates3,
                occupation: &self.occupation3,
                main_activities: &self.main_activities3,
            },
        ]
    }

    /// The five skill blobs concatenated and lowercased.
    pub fn skills_text(&self) -> String {
        [
            self.communication_skills.as_str(),
            self.organizational_managerial_skills.as_str(),
            self.job_related_skills.as_str(),
            self.computer_skills.as_str(),
            self.other_skills.as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }

    /// Mother tongue followed by the two modern languages, empty slots skipped.
    pub fn languages(&self) -> Vec<&str> {
        [
            self.mother_language.as_str(),
            self.modern_language1.as_str(),
            self.modern_language2.as_str(),
        ]
        .into_iter()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
    }

    /// Stable identity hash used to correlate feedback with a candidate
    /// without storing the full record.
    pub fn identity_hash(&self) -> String {
        let key = format!(
            "{}|{}|{}|{}",
            self.first_name.trim(),
            self.last_name.trim(),
            self.email_address.trim(),
            self.date_of_birth.trim()
        );
        let digest = Sha256::digest(key.as_bytes());
        digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
    }
}

/// Splits a comma-separated CV field into trimmed, non-empty items.
pub fn split_list(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_cv_labels() {
        let cv: CvRecord = serde_json::from_str(
            r#"{
                "FirstName": "Ada",
                "LastName": "Lovelace",
                "College/University": "University of London",
                "PersonalityTypeMB": "INTJ",
                "Workplace1": "Analytical Engines Ltd"
            }"#,
        )
        .unwrap();
        assert_eq!(cv.first_name, "Ada");
        assert_eq!(cv.college_university, "University of London");
        assert_eq!(cv.personality_type_mb, "INTJ");
        assert_eq!(cv.workplace1, "Analytical Engines Ltd");
        assert_eq!(cv.hobbies, "", "missing fields default to empty");
        assert_eq!(cv.score, 0.0);
    }

    #[test]
    fn test_serializes_with_original_keys() {
        let cv = CvRecord {
            first_name: "Ada".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&cv).unwrap();
        assert_eq!(value["FirstName"], "Ada");
        assert!(value.get("College/University").is_some());
        assert!(value.get("PersonalityTypeMB").is_some());
        assert!(value.get("HonoursAndAwards").is_some());
    }

    #[test]
    fn test_validate_requires_names() {
        let mut cv = CvRecord::default();
        assert!(cv.validate().is_err());
        cv.first_name = "Ada".to_string();
        assert!(cv.validate().is_err());
        cv.last_name = "Lovelace".to_string();
        assert!(cv.validate().is_ok());
    }

    #[test]
    fn test_work_entries_order() {
        let cv = CvRecord {
            workplace1: "A".to_string(),
            workplace3: "C".to_string(),
            ..Default::default()
        };
        let entries = cv.work_entries();
        assert_eq!(entries[0].workplace, "A");
        assert!(entries[1].is_empty());
        assert_eq!(entries[2].workplace, "C");
    }

    #[test]
    fn test_identity_hash_is_stable_and_short() {
        let cv = CvRecord {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            ..Default::default()
        };
        let h1 = cv.identity_hash();
        let h2 = cv.clone().identity_hash();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 16);

        let other = CvRecord {
            first_name: "Grace".to_string(),
            ..cv
        };
        assert_ne!(other.identity_hash(), h1);
    }

    #[test]
    fn test_split_list_skips_blanks() {
        assert_eq!(split_list("a, b,,  c ,"), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}
