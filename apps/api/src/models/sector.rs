use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const BUILTIN_CATALOG: &str = include_str!("../../data/sectors.json");

/// Keyword profile of one job sector. Read-only at scoring time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorProfile {
    /// Education field terms.
    #[serde(rename = "School/College", default)]
    pub education: Vec<String>,
    #[serde(rename = "WorkExperience", default)]
    pub work_experience: Vec<String>,
    #[serde(rename = "Skills", default)]
    pub skills: Vec<String>,
    #[serde(rename = "ExtraSkills", default)]
    pub extra_skills: Vec<String>,
    /// Preferred MBTI labels.
    #[serde(rename = "Personality", default)]
    pub personality: Vec<String>,
}

/// Sector name → profile. Ordered so ranking ties resolve by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectorCatalog {
    sectors: BTreeMap<String, SectorProfile>,
}

impl SectorCatalog {
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG).context("Built-in sector catalog is malformed")
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let mut catalog: SectorCatalog = serde_json::from_str(raw)?;
        catalog.normalize();
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sector catalog {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Failed to parse sector catalog {}", path.display()))
    }

    pub fn get(&self, sector: &str) -> Option<&SectorProfile> {
        self.sectors.get(sector)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sectors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SectorProfile)> {
        self.sectors.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    /// Career suggestions for an MBTI label: the sectors listing it as a
    /// preferred type, or failing that, sectors preferring a type with the
    /// same first two letters.
    pub fn sectors_for_personality(&self, label: &str) -> Vec<&str> {
        let label = label.trim().to_uppercase();
        if label.chars().count() != 4 {
            return Vec::new();
        }
        let exact: Vec<&str> = self
            .iter()
            .filter(|(_, p)| p.personality.iter().any(|l| *l == label))
            .map(|(name, _)| name)
            .collect();
        if !exact.is_empty() {
            return exact;
        }
        let prefix = label.get(..2);
        self.iter()
            .filter(|(_, p)| p.personality.iter().any(|l| l.get(..2) == prefix))
            .map(|(name, _)| name)
            .collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, mut profile: SectorProfile) {
        profile.normalize();
        self.sectors.insert(name.into(), profile);
    }

    fn normalize(&mut self) {
        for profile in self.sectors.values_mut() {
            profile.normalize();
        }
    }
}

impl SectorProfile {
    /// Keywords are matched lowercase; labels uppercase.
    fn normalize(&mut self) {
        for list in [
            &mut self.education,
            &mut self.work_experience,
            &mut self.skills,
            &mut self.extra_skills,
        ] {
            for kw in list.iter_mut() {
                *kw = kw.trim().to_lowercase();
            }
            list.retain(|kw| !kw.is_empty());
        }
        for label in self.personality.iter_mut() {
            *label = label.trim().to_uppercase();
        }
        self.personality.retain(|l| !l.is_empty());
    }
}
