// Keyword-driven personality inference: MBTI label, per-letter percentages and
// a Big-Five profile. Deterministic; not a psychometric instrument.

pub mod classifier;
pub mod domains;
pub mod handlers;
