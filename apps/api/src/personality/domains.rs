//! Static MBTI keyword data: facet word lists per letter, the hobby map,
//! sports, Big-Five indicators and the sixteen type names.

/// One facet of an MBTI letter with the words that evidence it.
#[derive(Debug, Clone, Copy)]
pub struct Facet {
    pub letter: char,
    pub name: &'static str,
    pub words: &'static [&'static str],
}

const fn facet(letter: char, name: &'static str, words: &'static [&'static str]) -> Facet {
    Facet {
        letter,
        name,
        words,
    }
}

/// The four dichotomies; the first letter of each pair wins ties.
pub const PAIRS: [(char, char); 4] = [('I', 'E'), ('S', 'N'), ('T', 'F'), ('J', 'P')];

pub const FACETS: &[Facet] = &[
    // I
    facet(
        'I',
        "introverted",
        &[
            "introverted", "shy", "quiet", "reticent", "introspective", "reclusive", "thinker",
            "anxious", "reserved",
        ],
    ),
    facet('I', "loneliness", &["lonely", "independent", "isolated", "desolate", "reclusive"]),
    facet(
        'I',
        "listener",
        &["listener", "open-minded", "observer", "perceptive", "compassionate", "empathic"],
    ),
    facet('I', "reserved", &["reserved", "quiet", "anxious", "antisocial"]),
    // E
    facet('E', "extroverted", &["extroverted", "outgoing", "sociable", "talkative", "friendly"]),
    facet('E', "outgoing", &["outgoing", "out-going", "affectionate", "demonstrative"]),
    facet(
        'E',
        "sociable",
        &["sociable", "talkative", "friendly", "companionable", "approachable", "cordial"],
    ),
    facet(
        'E',
        "enthusiastic",
        &["enthusiastic", "keen", "eager", "passionate", "avid", "energetic", "feeling"],
    ),
    // S
    facet('S', "analytical", &["analytical", "logical", "scientific", "methodical"]),
    facet(
        'S',
        "realistic",
        &["realistic", "practical", "pragmatic", "truthful", "rational", "real"],
    ),
    facet(
        'S',
        "systematic",
        &["systematic", "structured", "organized", "planned", "well-ordered"],
    ),
    facet(
        'S',
        "practical",
        &[
            "practical", "empirical", "actual", "active", "applied", "experiential", "effective",
            "qualified",
        ],
    ),
    // N
    facet(
        'N',
        "creative",
        &["creative", "artistic", "visionary", "imaginative", "inspired", "talented", "original"],
    ),
    facet(
        'N',
        "idealistic",
        &["idealistic", "utopian", "romantic", "unrealistic", "optimistic", "idealized", "dreamer"],
    ),
    facet(
        'N',
        "visionary",
        &[
            "visionary", "imaginative", "inventive", "ingenious", "insightful", "introspective",
            "ambitious",
        ],
    ),
    facet(
        'N',
        "inventive",
        &["inventive", "creative", "original", "skilful", "innovative", "ingenious", "artistic"],
    ),
    // T
    facet('T', "intellectual", &["smart", "clever", "wise", "intelligent"]),
    facet(
        'T',
        "logical",
        &[
            "logical", "smart", "analytical", "rational", "intelligent", "valid", "coherent",
            "organized",
        ],
    ),
    facet(
        'T',
        "rational",
        &[
            "rational", "reasoned", "logical", "coherent", "sensible", "deliberate", "balanced",
            "judicious",
        ],
    ),
    facet(
        'T',
        "judgemental",
        &["judgemental", "narrow-minded", "judgy", "critical", "negative", "subjective"],
    ),
    // F
    facet(
        'F',
        "empathetic",
        &[
            "affectionate", "understanding", "intuitive", "spiritual", "open", "listener",
            "comprehensive",
        ],
    ),
    facet(
        'F',
        "considerate",
        &[
            "considerate", "attentive", "thoughtful", "mindful", "obliging", "amiable", "generous",
            "discreet", "solicitous", "alert", "careful", "cautious",
        ],
    ),
    facet('F', "sensitive", &["sensitive", "afraid", "emotive", "anxious", "influenceable"]),
    facet(
        'F',
        "conscientious",
        &[
            "conscientious", "considerate", "attentive", "thoughtful", "mindful", "obliging",
            "amiable", "generous", "discreet", "solicitous", "alert", "careful", "cautious",
        ],
    ),
    // J
    facet('J', "reserved", &["reserved", "restrained", "reticent", "private", "cautious"]),
    facet(
        'J',
        "organized",
        &[
            "organized", "organizer", "systematic", "arranged", "coordinated", "oriented",
            "disciplined", "precise", "regular", "meticulous", "controlled", "reasonable",
        ],
    ),
    facet(
        'J',
        "logical",
        &[
            "logical", "smart", "analytical", "rational", "intelligent", "valid", "coherent",
            "organized",
        ],
    ),
    facet(
        'J',
        "stubborn",
        &["stubborn", "headstrong", "subjective", "firm", "determined", "inflexible"],
    ),
    // P
    facet('P', "flexible", &["adaptable", "open", "fearless", "brave", "creative", "innovator"]),
    facet(
        'P',
        "spontaneous",
        &["unpredictable", "impulsive", "spontaneous", "happy", "flexible"],
    ),
    facet(
        'P',
        "action-oriented",
        &[
            "action-oriented", "active", "applied", "practical", "proactive", "enterprising",
            "pragmatist", "advanced", "interactive",
        ],
    ),
    facet(
        'P',
        "open-minded",
        &["curious", "non-judgemental", "open", "respectable", "lovable", "appreciative"],
    ),
];

/// Hobby keyword → (letter, facet) it evidences.
pub const HOBBIES: &[(&str, char, &str)] = &[
    ("reading", 'I', "introverted"),
    ("travelling", 'P', "open-minded"),
    ("animal", 'F', "empathetic"),
    ("gardening", 'S', "practical"),
    ("board games", 'E', "sociable"),
    ("knitting", 'I', "reserved"),
    ("embroidery", 'J', "organized"),
    ("upcycling", 'N', "inventive"),
    ("drawing", 'N', "creative"),
    ("painting", 'N', "creative"),
    ("writing", 'I', "introverted"),
    ("photography", 'N', "creative"),
    ("graphic design", 'N', "inventive"),
    ("volunteer", 'F', "considerate"),
    ("cooking", 'S', "practical"),
    ("baking", 'J', "organized"),
    ("watching", 'I', "reserved"),
    ("films", 'N', "idealistic"),
    ("documentaries", 'T', "intellectual"),
    ("walking", 'I', "loneliness"),
    ("pet", 'F', "empathetic"),
    ("dancing", 'E', "outgoing"),
    ("wood crafting", 'S', "practical"),
    ("pottery", 'S', "practical"),
    ("sculpting", 'N', "creative"),
    ("chess", 'T', "logical"),
    ("language learning", 'T', "intellectual"),
    ("acting", 'E', "outgoing"),
    ("squash", 'E', "enthusiastic"),
    ("blog", 'N', "visionary"),
    ("social media", 'E', "sociable"),
    ("sing", 'E', "outgoing"),
    ("card games", 'E', "sociable"),
    ("listening to music", 'I', "listener"),
    ("going out", 'E', "extroverted"),
];

pub const SPORTS: &[&str] = &[
    "basketball", "golf", "running", "walking", "soccer", "volleyball", "badminton", "yoga",
    "pilates", "swimming", "skating", "rugby", "darts", "football", "barre", "tai chi",
    "stretching", "bowling", "hockey", "surfing", "tennis", "baseball", "gymnastics", "climbing",
    "karate", "horse", "snowboarding", "cycling", "archery", "boxing",
];

/// Facets nudged by any sport.
pub const SPORT_FACETS: &[(char, &str)] = &[('E', "enthusiastic"), ('S', "practical")];

/// Big-Five trait → (high indicators, low indicators).
pub const BIG_FIVE: &[(&str, &[&str], &[&str])] = &[
    (
        "openness",
        &[
            "creative", "curious", "imaginative", "innovative", "artistic", "open-minded",
            "travel", "original", "inventive",
        ],
        &["conventional", "traditional", "routine", "conservative", "narrow-minded"],
    ),
    (
        "conscientiousness",
        &[
            "organized", "organised", "disciplined", "reliable", "meticulous", "responsible",
            "methodical", "punctual", "dedicated", "detail",
        ],
        &["careless", "disorganized", "impulsive", "unreliable", "lazy"],
    ),
    (
        "extroversion",
        &[
            "outgoing", "sociable", "talkative", "energetic", "enthusiastic", "friendly",
            "team", "going out", "dancing",
        ],
        &["quiet", "reserved", "shy", "introverted", "solitary", "reading"],
    ),
    (
        "agreeableness",
        &[
            "empathetic", "kind", "cooperative", "considerate", "generous", "helpful",
            "compassionate", "volunteer", "supportive",
        ],
        &["critical", "stubborn", "competitive", "argumentative", "judgemental"],
    ),
    (
        "neuroticism",
        &["anxious", "nervous", "sensitive", "moody", "insecure", "afraid"],
        &["calm", "stable", "resilient", "relaxed", "confident", "composed"],
    ),
];

const TYPE_NAMES: &[(&str, &str)] = &[
    ("ISTJ", "Logistician"),
    ("ISFJ", "Defender"),
    ("INFJ", "Advocate"),
    ("INTJ", "Architect"),
    ("ISTP", "Virtuoso"),
    ("ISFP", "Adventurer"),
    ("INFP", "Mediator"),
    ("INTP", "Logician"),
    ("ESTP", "Entrepreneur"),
    ("ESFP", "Entertainer"),
    ("ENFP", "Campaigner"),
    ("ENTP", "Debater"),
    ("ESTJ", "Executive"),
    ("ESFJ", "Consul"),
    ("ENFJ", "Protagonist"),
    ("ENTJ", "Commander"),
];

pub fn type_name(label: &str) -> Option<&'static str> {
    TYPE_NAMES
        .iter()
        .find(|(code, _)| *code == label)
        .map(|(_, name)| *name)
}

/// Index of a facet in [`FACETS`].
pub fn facet_index(letter: char, name: &str) -> Option<usize> {
    FACETS
        .iter()
        .position(|f| f.letter == letter && f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_letter_has_four_facets() {
        for (a, b) in PAIRS {
            for letter in [a, b] {
                let count = FACETS.iter().filter(|f| f.letter == letter).count();
                assert_eq!(count, 4, "letter {letter}");
            }
        }
    }

    #[test]
    fn test_hobby_and_sport_targets_exist() {
        for (hobby, letter, name) in HOBBIES {
            assert!(facet_index(*letter, name).is_some(), "hobby {hobby} → {letter}/{name}");
        }
        for (letter, name) in SPORT_FACETS {
            assert!(facet_index(*letter, name).is_some());
        }
    }

    #[test]
    fn test_sixteen_type_names() {
        assert_eq!(TYPE_NAMES.len(), 16);
        assert_eq!(type_name("INTJ"), Some("Architect"));
        assert_eq!(type_name("XXXX"), None);
    }
}
