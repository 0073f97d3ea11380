use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::ml::ModelBackend;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Overrides the built-in sector catalog when set.
    pub sector_catalog_path: Option<PathBuf>,
    pub model_dir: PathBuf,
    pub feedback_dir: PathBuf,
    pub training_dir: PathBuf,
    /// Root for `/ml/export` and `/ml/import`; requests name a directory below it.
    pub export_dir: PathBuf,
    /// Apply the ML adjustment in score responses.
    pub ml_enabled: bool,
    pub ml_backend: ModelBackend,
    pub min_samples_for_training: usize,
    pub retrain_threshold: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            sector_catalog_path: std::env::var("SECTOR_CATALOG_PATH").ok().map(PathBuf::from),
            model_dir: path_env("MODEL_DIR", "data/models"),
            feedback_dir: path_env("FEEDBACK_DIR", "data/feedback"),
            training_dir: path_env("TRAINING_DIR", "data/training"),
            export_dir: path_env("EXPORT_DIR", "data/exports"),
            ml_enabled: bool_env("ML_ENABLED", false)?,
            ml_backend: match std::env::var("ML_BACKEND") {
                Ok(raw) => raw.parse::<ModelBackend>().map_err(|e| anyhow!(e))?,
                Err(_) => ModelBackend::BoostedTrees,
            },
            min_samples_for_training: parse_env("MIN_SAMPLES_FOR_TRAINING", 50)?,
            retrain_threshold: parse_env("RETRAIN_THRESHOLD", 15.0)?,
        })
    }
}

fn path_env(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn bool_env(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(raw) => parse_bool(&raw)
            .with_context(|| format!("Environment variable '{key}' must be a boolean, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_parse_env_defaults_and_errors() {
        // Keys are unique to this test so parallel tests don't interfere.
        std::env::remove_var("PERSONA_TEST_UNSET_PORT");
        assert_eq!(parse_env::<u16>("PERSONA_TEST_UNSET_PORT", 8080).unwrap(), 8080);

        std::env::set_var("PERSONA_TEST_BAD_THRESHOLD", "fifteen");
        assert!(parse_env::<f64>("PERSONA_TEST_BAD_THRESHOLD", 15.0).is_err());

        std::env::set_var("PERSONA_TEST_GOOD_SAMPLES", " 12 ");
        assert_eq!(parse_env::<usize>("PERSONA_TEST_GOOD_SAMPLES", 50).unwrap(), 12);
    }
}
