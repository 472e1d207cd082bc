//! Hard accept/reject rules applied after scoring.
//!
//! The score expresses preference; these gates are disqualifiers no score
//! can override. Checks run in a fixed order and the first failure wins.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::Settings;
use crate::models::JobRecord;
use crate::scoring::{JUNIOR_KEYWORDS, contains_any};

static YEARS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})\+?\s*(?:years|yrs|year)").expect("valid experience regex")
});

/// Why a job did not qualify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    NotRelevant,
    MissingRequiredKeyword,
    JuniorRole,
    InsufficientExperience { years: u32, minimum: u32 },
    Unscored,
    BelowThreshold { score: i64, threshold: i64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotRelevant => write!(f, "not azure+data"),
            Rejection::MissingRequiredKeyword => write!(f, "no required keyword"),
            Rejection::JuniorRole => write!(f, "junior role"),
            Rejection::InsufficientExperience { years, minimum } => {
                write!(f, "experience {years} < {minimum} years")
            }
            Rejection::Unscored => write!(f, "not scored"),
            Rejection::BelowThreshold { score, threshold } => {
                write!(f, "low score {score} < {threshold}")
            }
        }
    }
}

/// Mandatory relevance: "data engineer", or "azure" with "data"/"engineer".
pub fn looks_like_azure_data(haystack: &str) -> bool {
    if haystack.contains("data engineer") {
        return true;
    }
    haystack.contains("azure") && (haystack.contains("data") || haystack.contains("engineer"))
}

pub fn contains_junior_marker(haystack: &str) -> bool {
    contains_any(haystack, JUNIOR_KEYWORDS)
}

/// First "N years" / "N+ yrs" figure in the text, if any.
pub fn parse_years(text: &str) -> Option<u32> {
    let lowered = text.to_lowercase();
    YEARS_PATTERN
        .captures(&lowered)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Decide whether a scored job qualifies for tailoring and email.
pub fn evaluate(job: &JobRecord, settings: &Settings) -> Result<(), Rejection> {
    let haystack = job.haystack();

    if !looks_like_azure_data(&haystack) {
        return Err(Rejection::NotRelevant);
    }

    let required: Vec<String> = settings
        .required_keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if !required.is_empty() && !required.iter().any(|k| haystack.contains(k.as_str())) {
        return Err(Rejection::MissingRequiredKeyword);
    }

    if contains_junior_marker(&haystack) {
        return Err(Rejection::JuniorRole);
    }

    if let Some(years) = parse_years(&haystack) {
        if years < settings.min_years_experience {
            return Err(Rejection::InsufficientExperience {
                years,
                minimum: settings.min_years_experience,
            });
        }
    }

    match job.score() {
        None => Err(Rejection::Unscored),
        Some(score) if score < settings.score_threshold => Err(Rejection::BelowThreshold {
            score,
            threshold: settings.score_threshold,
        }),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobSource;
    use crate::scoring::Scorer;

    fn scored(title: &str, snippet: &str, location: &str) -> JobRecord {
        let mut job = JobRecord::new(JobSource::ListingSite, title, "Acme", "https://acme.io/1")
            .with_snippet(snippet)
            .with_location(location);
        Scorer::from_settings(&Settings::default())
            .score(&mut job)
            .unwrap();
        job
    }

    #[test]
    fn senior_azure_data_engineer_is_accepted() {
        let job = scored(
            "Senior Azure Data Engineer",
            "Azure Databricks Data Factory PySpark ETL SQL",
            "Hyderabad",
        );
        assert!(job.score().unwrap() > 30);
        assert_eq!(evaluate(&job, &Settings::default()), Ok(()));
    }

    #[test]
    fn intern_is_rejected_regardless_of_score() {
        let job = scored("Data Engineer Intern", "Azure internship program", "");
        assert!(job.score().unwrap() >= 30);
        assert_eq!(evaluate(&job, &Settings::default()), Err(Rejection::JuniorRole));
    }

    #[test]
    fn backend_developer_is_not_relevant() {
        let job = scored("Backend Developer", "Java Spring Boot", "");
        assert_eq!(evaluate(&job, &Settings::default()), Err(Rejection::NotRelevant));
    }

    #[test]
    fn short_experience_is_rejected() {
        let job = scored(
            "Senior Azure Data Engineer",
            "Databricks PySpark. 3 years experience required",
            "Hyderabad",
        );
        assert_eq!(
            evaluate(&job, &Settings::default()),
            Err(Rejection::InsufficientExperience {
                years: 3,
                minimum: 5
            })
        );
    }

    #[test]
    fn enough_experience_passes() {
        let job = scored("Senior Azure Data Engineer", "7+ yrs Databricks", "Hyderabad");
        assert_eq!(evaluate(&job, &Settings::default()), Ok(()));
    }

    #[test]
    fn below_threshold_is_rejected() {
        let job = scored("Azure Data Engineer", "", "");
        let mut settings = Settings::default();
        settings.score_threshold = 500;
        assert_eq!(
            evaluate(&job, &settings),
            Err(Rejection::BelowThreshold {
                score: job.score().unwrap(),
                threshold: 500
            })
        );
    }

    #[test]
    fn unscored_job_is_rejected() {
        let job = JobRecord::new(JobSource::ListingSite, "Azure Data Engineer", "Acme", "x");
        assert_eq!(evaluate(&job, &Settings::default()), Err(Rejection::Unscored));
    }

    #[test]
    fn required_keywords_gate() {
        let job = scored("Senior Azure Data Engineer", "Databricks", "Hyderabad");
        let mut settings = Settings::default();
        settings.required_keywords = vec!["Synapse".into(), "Kafka".into()];
        assert_eq!(evaluate(&job, &settings), Err(Rejection::MissingRequiredKeyword));

        settings.required_keywords = vec!["databricks".into()];
        assert_eq!(evaluate(&job, &settings), Ok(()));
    }

    #[test]
    fn relevance_predicate() {
        assert!(looks_like_azure_data("senior data engineer"));
        assert!(looks_like_azure_data("azure platform engineer"));
        assert!(looks_like_azure_data("azure data steward"));
        assert!(!looks_like_azure_data("azure administrator"));
        assert!(!looks_like_azure_data("data analyst"));
    }

    #[test]
    fn parse_years_patterns() {
        assert_eq!(parse_years("5+ years of experience"), Some(5));
        assert_eq!(parse_years("3 Years"), Some(3));
        assert_eq!(parse_years("minimum 6yrs"), Some(6));
        assert_eq!(parse_years("1 year"), Some(1));
        assert_eq!(parse_years("8 to 10 years"), Some(10));
        assert_eq!(parse_years("no numbers here"), None);
    }

    #[test]
    fn gating_is_deterministic() {
        let job = scored("Senior Azure Data Engineer", "Databricks 4 years", "Hyderabad");
        let settings = Settings::default();
        let first = evaluate(&job, &settings);
        for _ in 0..10 {
            assert_eq!(evaluate(&job, &settings), first);
        }
    }

    #[test]
    fn rejection_display() {
        assert_eq!(Rejection::JuniorRole.to_string(), "junior role");
        assert_eq!(
            Rejection::BelowThreshold {
                score: 12,
                threshold: 30
            }
            .to_string(),
            "low score 12 < 30"
        );
    }
}
