// Rule-based job scoring: lookup tables, tenure arithmetic, the six category
// scorers and the orchestrating JobScorer. Scoring never fails; malformed
// input degrades to zero points.

pub mod categories;
pub mod handlers;
pub mod job_scorer;
pub mod lookup;
pub mod tenure;

pub use job_scorer::{JobScorer, SectorScore};
