//! Run configuration loaded from YAML.
//!
//! Every key is optional; missing keys fall back to the defaults below, and
//! unknown keys are ignored so older config files keep working.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Whether the location signal stops at the first preferred match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationPolicy {
    #[default]
    First,
    Each,
}

/// Per-signal weights for the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub title_bonus: i64,
    pub senior_bonus: i64,
    /// Subtracted when a junior marker appears.
    pub junior_penalty: i64,
    /// Weight of the first entry in `location_priority`.
    pub location_bonus: i64,
    /// Amount removed per list position.
    pub location_step: i64,
    /// Lowest weight any matching location can contribute.
    pub location_floor: i64,
    pub sponsor_bonus: i64,
    pub product_strict_bonus: i64,
    pub product_neutral_bonus: i64,
    pub low_applicants_bonus: i64,
    pub base_bonus: i64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            title_bonus: 40,
            senior_bonus: 25,
            junior_penalty: 30,
            location_bonus: 20,
            location_step: 5,
            location_floor: 5,
            sponsor_bonus: 20,
            product_strict_bonus: 15,
            product_neutral_bonus: 5,
            low_applicants_bonus: 10,
            base_bonus: 2,
        }
    }
}

/// A skill term and the points it adds when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillWeight {
    pub term: String,
    pub weight: i64,
}

impl SkillWeight {
    pub fn new(term: impl Into<String>, weight: i64) -> Self {
        Self {
            term: term.into(),
            weight,
        }
    }
}

fn default_skills() -> Vec<SkillWeight> {
    [
        ("azure", 20),
        ("databricks", 18),
        ("data factory", 16),
        ("synapse", 14),
        ("delta lake", 12),
        ("pyspark", 14),
        ("spark", 12),
        ("python", 8),
        ("sql", 8),
        ("etl", 8),
        ("ci/cd", 4),
        ("lakehouse", 6),
    ]
    .into_iter()
    .map(|(term, weight)| SkillWeight::new(term, weight))
    .collect()
}

/// Which job sources a run collects from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceToggles {
    pub search_engine: bool,
    pub listing_site: bool,
    pub company_pages: bool,
}

impl Default for SourceToggles {
    fn default() -> Self {
        Self {
            search_engine: true,
            listing_site: true,
            company_pages: true,
        }
    }
}

/// Outgoing mail server. Credentials come from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 465,
        }
    }
}

/// Immutable settings for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub score_threshold: i64,
    /// Recipient of the result emails.
    pub email: String,
    pub location_priority: Vec<String>,
    /// When non-empty, at least one must appear for a job to qualify.
    pub required_keywords: Vec<String>,
    pub global_allow_visa_sponsor: bool,
    pub product_company_only: bool,
    pub max_applicants_for_low: u32,
    pub min_years_experience: u32,
    pub product_companies: Vec<String>,
    pub location_policy: LocationPolicy,
    pub query: String,
    pub location: String,
    pub sender_name: String,
    pub output_dir: PathBuf,
    pub company_delay_ms: u64,
    pub email_delay_ms: u64,
    pub sources: SourceToggles,
    pub smtp: SmtpSettings,
    pub weights: Weights,
    pub skills: Vec<SkillWeight>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            score_threshold: 30,
            email: String::new(),
            location_priority: vec!["Hyderabad".to_string()],
            required_keywords: Vec::new(),
            global_allow_visa_sponsor: true,
            product_company_only: false,
            max_applicants_for_low: 50,
            min_years_experience: 5,
            product_companies: Vec::new(),
            location_policy: LocationPolicy::First,
            query: "Azure Data Engineer".to_string(),
            location: "Hyderabad".to_string(),
            sender_name: "JobBot".to_string(),
            output_dir: PathBuf::from("."),
            company_delay_ms: 1000,
            email_delay_ms: 2000,
            sources: SourceToggles::default(),
            smtp: SmtpSettings::default(),
            weights: Weights::default(),
            skills: default_skills(),
        }
    }
}

impl Settings {
    /// Parse settings from YAML text. An empty document yields the defaults.
    pub fn from_yaml_str(raw: &str) -> Result<Self, AppError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|e| AppError::ConfigError(format!("Invalid YAML: {e}")))
    }

    /// Read and parse a YAML config file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;
        let settings = Self::from_yaml_str(&raw)?;
        tracing::debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Checks that only matter when mail is actually going out.
    pub fn validate_for_sending(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() {
            return Err(AppError::ConfigError(
                "`email` must be set to a recipient address".into(),
            ));
        }
        if !self.email.contains('@') {
            return Err(AppError::ConfigError(format!(
                "Invalid recipient address '{}'",
                self.email
            )));
        }
        Ok(())
    }

    pub fn company_delay(&self) -> Duration {
        Duration::from_millis(self.company_delay_ms)
    }

    pub fn email_delay(&self) -> Duration {
        Duration::from_millis(self.email_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let settings = Settings::from_yaml_str("   \n").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.score_threshold, 30);
        assert_eq!(settings.skills.len(), 12);
        assert_eq!(settings.skills[0], SkillWeight::new("azure", 20));
    }

    #[test]
    fn test_partial_document_overrides_only_given_keys() {
        let yaml = r#"
score_threshold: 45
email: me@example.com
location_priority: [Hyderabad, Bengaluru, Remote]
global_allow_visa_sponsor: false
product_company_only: true
max_applicants_for_low: 25
location_policy: each
weights:
  title_bonus: 50
sources:
  search_engine: false
some_future_key: ignored
"#;
        let settings = Settings::from_yaml_str(yaml).unwrap();
        assert_eq!(settings.score_threshold, 45);
        assert_eq!(settings.email, "me@example.com");
        assert_eq!(settings.location_priority.len(), 3);
        assert!(!settings.global_allow_visa_sponsor);
        assert!(settings.product_company_only);
        assert_eq!(settings.max_applicants_for_low, 25);
        assert_eq!(settings.location_policy, LocationPolicy::Each);
        assert_eq!(settings.weights.title_bonus, 50);
        assert_eq!(settings.weights.senior_bonus, 25);
        assert!(!settings.sources.search_engine);
        assert!(settings.sources.listing_site);
        assert_eq!(settings.smtp.port, 465);
    }

    #[test]
    fn test_custom_skill_list_replaces_defaults() {
        let yaml = "skills:\n  - term: kafka\n    weight: 9\n";
        let settings = Settings::from_yaml_str(yaml).unwrap();
        assert_eq!(settings.skills, vec![SkillWeight::new("kafka", 9)]);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = Settings::from_yaml_str("score_threshold: [unclosed").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "score_threshold: 12\n").unwrap();
        assert_eq!(Settings::load(&path).unwrap().score_threshold, 12);

        let missing = Settings::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(missing.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_validate_for_sending() {
        let mut settings = Settings::default();
        assert!(settings.validate_for_sending().is_err());
        settings.email = "not-an-address".into();
        assert!(settings.validate_for_sending().is_err());
        settings.email = "me@example.com".into();
        assert!(settings.validate_for_sending().is_ok());
    }
}
