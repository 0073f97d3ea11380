//! Keyword-driven MBTI inference over the free-text CV fields.
//!
//! Each call builds its own zeroed accumulator, so results never depend on
//! earlier calls.

use std::collections::BTreeMap;

use crate::models::cv::{split_list, CvRecord};
use crate::personality::domains::{
    facet_index, BIG_FIVE, FACETS, HOBBIES, PAIRS, SPORTS, SPORT_FACETS,
};

const DESCRIPTION_WEIGHT: f64 = 1.0;
const SKILLS_WEIGHT: f64 = 0.5;
const HOBBY_WEIGHT: f64 = 1.0;
const SPORT_WEIGHT: f64 = 0.5;

/// Per-facet scores for one CV.
struct Accumulator {
    scores: Vec<f64>,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            scores: vec![0.0; FACETS.len()],
        }
    }

    fn add(&mut self, letter: char, facet: &str, weight: f64) {
        if let Some(i) = facet_index(letter, facet) {
            self.scores[i] += weight;
        }
    }

    /// A token counts once per facet, on equality or when it contains a facet word.
    fn score_words<'a>(&mut self, words: impl Iterator<Item = &'a str>, weight: f64) {
        for word in words {
            for (i, facet) in FACETS.iter().enumerate() {
                if facet.words.iter().any(|w| word == *w || word.contains(w)) {
                    self.scores[i] += weight;
                }
            }
        }
    }

    fn score_hobbies(&mut self, hobbies: &[&str]) {
        for hobby in hobbies {
            if let Some((_, letter, facet)) = HOBBIES
                .iter()
                .find(|(h, _, _)| hobby.contains(h) || h.contains(hobby))
            {
                self.add(*letter, facet, HOBBY_WEIGHT);
            }
        }
        for hobby in hobbies {
            if SPORTS.iter().any(|sport| hobby.contains(sport)) {
                for (letter, facet) in SPORT_FACETS {
                    self.add(*letter, facet, SPORT_WEIGHT);
                }
            }
        }
    }

    fn letter(&self, letter: char) -> f64 {
        FACETS
            .iter()
            .zip(&self.scores)
            .filter(|(f, _)| f.letter == letter)
            .map(|(_, s)| s)
            .sum()
    }
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|w| !w.is_empty())
}

fn accumulate(cv: &CvRecord) -> Accumulator {
    let mut acc = Accumulator::new();

    let description = cv.short_description.to_lowercase();
    acc.score_words(tokens(&description), DESCRIPTION_WEIGHT);

    let hobbies = cv.hobbies.to_lowercase();
    acc.score_hobbies(&split_list(&hobbies));

    let skills = cv.skills_text();
    acc.score_words(tokens(&skills), SKILLS_WEIGHT);

    acc
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Four-letter MBTI label. Ties resolve to I, S, T and J.
pub fn classify(cv: &CvRecord) -> String {
    let acc = accumulate(cv);
    PAIRS
        .iter()
        .map(|&(a, b)| if acc.letter(a) >= acc.letter(b) { a } else { b })
        .collect()
}

/// Classifies and stores the label on the record.
pub fn classify_and_record(cv: &mut CvRecord) -> String {
    let label = classify(cv);
    cv.personality_type_mb = label.clone();
    label
}

/// Each letter as `score / (pair_sum + 1) × 100`, one decimal.
pub fn percentages(cv: &CvRecord) -> BTreeMap<String, f64> {
    let acc = accumulate(cv);
    let mut out = BTreeMap::new();
    for (a, b) in PAIRS {
        let (sa, sb) = (acc.letter(a), acc.letter(b));
        let total = sa + sb + 1.0;
        out.insert(a.to_string(), round1(sa / total * 100.0));
        out.insert(b.to_string(), round1(sb / total * 100.0));
    }
    out
}

/// OCEAN traits on `[-100, 100]` from high/low indicator counts.
pub fn big_five(cv: &CvRecord) -> BTreeMap<String, f64> {
    let text = format!(
        "{} {} {}",
        cv.short_description.to_lowercase(),
        cv.hobbies.to_lowercase(),
        cv.skills_text()
    );
    BIG_FIVE
        .iter()
        .map(|(trait_name, high, low)| {
            let h = high.iter().filter(|w| text.contains(*w)).count() as f64;
            let l = low.iter().filter(|w| text.contains(*w)).count() as f64;
            (trait_name.to_string(), round1((h - l) / (h + l + 1.0) * 100.0))
        })
        .collect()
}
