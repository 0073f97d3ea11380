//! Normalization tables shared by the category scorers and the feature extractor.
//!
//! All matching is lowercase substring matching, so `"Senior Software Engineer"`
//! hits the `engineer` seniority keyword. Callers pass lowercase text.

/// Seniority tier (0–6) → occupation keywords.
const FUNCTIONS: &[(u8, &[&str])] = &[
    (0, &["assistant", "intern", "trainee", "apprentice", "worker", "labourer", "employee"]),
    (
        1,
        &[
            "representative", "specialist", "coordinator", "analyst", "administrator",
            "generalist", "consultant", "associate", "technician", "agent", "surveyor",
            "engineer",
        ],
    ),
    (2, &["manager", "head", "hod"]),
    (3, &["director", "vp"]),
    (4, &["coo", "cfo", "cto", "cmo", "chro", "cpo", "chief", "vice president", "officer"]),
    (5, &["chief executive officer", "ceo", "president"]),
    (6, &["chairman"]),
];

/// Qualification level (1–6) → qualification keywords.
const QUALIFICATIONS: &[(u8, &[&str])] = &[
    (
        1,
        &[
            "gcse", "grades d-g", "l1", "level 1", "foundation", "entry level", "traineeship",
            "nvq level 1",
        ],
    ),
    (2, &["grades a-c", "l2", "level 2", "intermediate apprenticeship", "nvq level 2"]),
    (
        3,
        &[
            "a-level", "a2", "as", "t-level", "l3", "level 3", "certificate",
            "advanced apprenticeship", "nvq level 3",
        ],
    ),
    (
        4,
        &[
            "bachelor", "university degree", "undergraduate degree", "ba", "bsc",
            "foundation degree", "fda", "fdsc", "hnd", "hnc", "higher national",
            "higher apprenticeship", "nvq level 4",
        ],
    ),
    (5, &["master", "ma", "msc", "mphil", "nvq level 5", "degree apprenticeship"]),
    (6, &["phd", "doctorate"]),
];

/// Business-value tier of a language. Unlisted languages are tier 1.
const LANGUAGES: &[(u8, &[&str])] = &[
    (3, &["english", "mandarin", "chinese", "spanish"]),
    (
        2,
        &[
            "hindi", "bengali", "arabic", "french", "german", "russian", "portuguese",
            "punjabi", "japanese", "italian", "latin", "telugu",
        ],
    ),
    (
        1,
        &[
            "romanian", "bulgarian", "hungarian", "korean", "javanese", "tamil", "turkish",
            "vietnamese", "marathi", "egyptian", "iranian", "polish", "indonesian", "gujarati",
            "malayalam", "yoruba", "hausa", "ukrainian", "igbo", "sindhi", "dutch", "amharic",
            "thai", "somali", "sinhalese", "greek", "kazakh", "zulu", "czech", "kannada",
            "tagalog", "cebuano", "khmer", "turkmen", "croatian", "kurdish", "hmong",
            "belarusian",
        ],
    ),
];

/// Descriptive proficiency level → score out of 10 and CEFR rank (0–6).
/// Order matters for partial matching: `upper intermediate` before `intermediate`.
const LANGUAGE_LEVELS: &[(&str, f64, u8)] = &[
    ("native", 10.0, 6),
    ("mother tongue", 10.0, 6),
    ("bilingual", 10.0, 6),
    ("fluent", 9.0, 5),
    ("proficient", 8.0, 5),
    ("advanced", 8.0, 4),
    ("upper intermediate", 7.0, 4),
    ("intermediate", 5.0, 3),
    ("conversational", 4.0, 3),
    ("elementary", 3.0, 2),
    ("basic", 2.0, 2),
    ("beginner", 2.0, 1),
];

/// CEFR code → (multiplier, rank).
const CEFR_LEVELS: &[(&str, f64, u8)] = &[
    ("a1", 0.2, 1),
    ("a2", 0.3, 2),
    ("b1", 0.5, 3),
    ("b2", 0.7, 4),
    ("c1", 0.9, 5),
    ("c2", 1.0, 6),
];

const DEFAULT_LEVEL_MULTIPLIER: f64 = 0.3;

const TOP_50_UNIVERSITIES: &[&str] = &[
    "harvard", "stanford", "massachusetts institute of technology", "university of oxford",
    "university of cambridge", "eth zurich", "caltech", "california institute of technology",
    "princeton", "imperial college", "yale", "university of chicago", "university college london",
    "university of pennsylvania", "columbia university", "uc berkeley", "johns hopkins",
    "cornell", "tsinghua", "peking university", "university of tokyo", "epfl",
    "national university of singapore", "university of toronto", "university of edinburgh",
];

const TOP_100_UNIVERSITIES: &[&str] = &[
    "technical university of munich", "university of amsterdam", "university of sydney",
    "university of melbourne", "duke university", "new york university", "nyu", "ucla",
    "mcgill", "university of manchester", "king's college london", "ku leuven",
    "kth royal institute", "delft university", "heidelberg", "lmu munich",
    "university of copenhagen", "seoul national", "university of hong kong",
    "university of british columbia",
];

/// Soft-skill categories and their keyword markers.
pub const SOFT_SKILLS: &[(&str, &[&str])] = &[
    (
        "communication",
        &["communication", "presentation", "public speaking", "negotiation", "writing", "listening"],
    ),
    ("leadership", &["leadership", "led ", "lead ", "mentor", "supervis", "managed"]),
    ("teamwork", &["team", "collaborat", "cooperat", "interpersonal"]),
    (
        "problem_solving",
        &["problem solving", "problem-solving", "analytical", "critical thinking", "troubleshoot"],
    ),
    ("adaptability", &["adaptab", "flexib", "resilien", "fast learner", "quick learner"]),
    (
        "organization",
        &["organiz", "organis", "planning", "time management", "prioriti", "detail-oriented"],
    ),
    ("creativity", &["creativ", "innovat", "initiative", "ideas"]),
    ("work_ethic", &["reliab", "dedicat", "motivated", "hard-working", "hardworking", "work ethic"]),
];

fn highest_tier(text: &str, table: &[(u8, &[&str])]) -> u8 {
    if text.is_empty() {
        return 0;
    }
    table
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(tier, _)| *tier)
        .max()
        .unwrap_or(0)
}

/// Highest seniority tier (0–6) mentioned in an occupation title.
pub fn seniority_level(occupation: &str) -> u8 {
    highest_tier(occupation, FUNCTIONS)
}

/// Highest qualification level (0–6) mentioned in a qualifications text.
pub fn qualification_level(qualifications: &str) -> u8 {
    highest_tier(qualifications, QUALIFICATIONS)
}

/// Tier 1–3 for a language name; 0 when empty, 1 when unknown.
pub fn language_tier(language: &str) -> u8 {
    let language = language.trim();
    if language.is_empty() {
        return 0;
    }
    LANGUAGES
        .iter()
        .find(|(_, names)| names.contains(&language))
        .map(|(tier, _)| *tier)
        .unwrap_or(1)
}

/// Proficiency multiplier in (0, 1] for a level string.
pub fn level_multiplier(level: &str) -> f64 {
    let level = level.trim();
    if level.is_empty() {
        return DEFAULT_LEVEL_MULTIPLIER;
    }
    if let Some((_, score, _)) = LANGUAGE_LEVELS.iter().find(|(key, _, _)| *key == level) {
        return score / 10.0;
    }
    if let Some((_, score, _)) = LANGUAGE_LEVELS
        .iter()
        .find(|(key, _, _)| level.contains(key) || key.contains(level))
    {
        return score / 10.0;
    }
    CEFR_LEVELS
        .iter()
        .find(|(code, _, _)| level.contains(code))
        .map(|(_, multiplier, _)| *multiplier)
        .unwrap_or(DEFAULT_LEVEL_MULTIPLIER)
}

/// Proficiency on the CEFR 0–6 scale (0 unknown, 6 native/C2).
pub fn cefr_rank(level: &str) -> u8 {
    let level = level.trim();
    if level.is_empty() {
        return 0;
    }
    if let Some((_, _, rank)) = CEFR_LEVELS.iter().find(|(code, _, _)| level.contains(code)) {
        return *rank;
    }
    LANGUAGE_LEVELS
        .iter()
        .find(|(key, _, _)| level.contains(key))
        .map(|(_, _, rank)| *rank)
        .unwrap_or(0)
}

/// University prestige tier: 3 top-50, 2 top-100, 1 any university/college, 0 none.
pub fn university_tier(college: &str) -> u8 {
    if college.is_empty() {
        return 0;
    }
    if TOP_50_UNIVERSITIES.iter().any(|u| college.contains(u)) {
        3
    } else if TOP_100_UNIVERSITIES.iter().any(|u| college.contains(u)) {
        2
    } else if college.contains("university") || college.contains("college") {
        1
    } else {
        0
    }
}

/// Education points for the university tier.
pub fn university_bonus(college: &str) -> f64 {
    match university_tier(college) {
        3 => 5.0,
        2 => 3.5,
        1 => 2.0,
        _ => 0.0,
    }
}

/// Names of the soft-skill categories with at least one marker in `text`.
pub fn soft_skill_categories(text: &str) -> Vec<&'static str> {
    SOFT_SKILLS
        .iter()
        .filter(|(_, markers)| markers.iter().any(|m| text.contains(m)))
        .map(|(name, _)| *name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seniority_takes_highest_hit() {
        assert_eq!(seniority_level("software engineer"), 1);
        assert_eq!(seniority_level("engineering manager"), 2);
        assert_eq!(seniority_level("chief executive officer"), 5);
        assert_eq!(seniority_level("chairman of the board"), 6);
        assert_eq!(seniority_level(""), 0);
    }

    #[test]
    fn test_qualification_levels() {
        assert_eq!(qualification_level("phd in physics"), 6);
        assert_eq!(qualification_level("bsc"), 4);
        assert_eq!(qualification_level("gcse"), 1);
        assert_eq!(qualification_level(""), 0);
    }

    #[test]
    fn test_language_tier() {
        assert_eq!(language_tier("english"), 3);
        assert_eq!(language_tier("german"), 2);
        assert_eq!(language_tier("romanian"), 1);
        assert_eq!(language_tier("klingon"), 1, "unknown languages default to tier 1");
        assert_eq!(language_tier(""), 0);
    }

    #[test]
    fn test_level_multiplier() {
        assert_eq!(level_multiplier(""), 0.3);
        assert_eq!(level_multiplier("native"), 1.0);
        assert_eq!(level_multiplier("upper intermediate"), 0.7);
        assert_eq!(level_multiplier("very fluent"), 0.9);
        assert_eq!(level_multiplier("c1"), 0.9);
        assert_eq!(level_multiplier("b2"), 0.7);
        assert_eq!(level_multiplier("???"), 0.3);
    }

    #[test]
    fn test_cefr_rank() {
        assert_eq!(cefr_rank("c2"), 6);
        assert_eq!(cefr_rank("a1"), 1);
        assert_eq!(cefr_rank("native"), 6);
        assert_eq!(cefr_rank("intermediate"), 3);
        assert_eq!(cefr_rank(""), 0);
    }

    #[test]
    fn test_university_bonus() {
        assert_eq!(university_bonus("stanford university"), 5.0);
        assert_eq!(university_bonus("university of amsterdam"), 3.5);
        assert_eq!(university_bonus("state university"), 2.0);
        assert_eq!(university_bonus("technical institute"), 0.0);
        assert_eq!(university_bonus(""), 0.0);
    }

    #[test]
    fn test_soft_skill_categories() {
        let found = soft_skill_categories("excellent communication and team player");
        assert_eq!(found, vec!["communication", "teamwork"]);
        assert!(soft_skill_categories("").is_empty());
    }
}
