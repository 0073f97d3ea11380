pub mod cv;
pub mod sector;
