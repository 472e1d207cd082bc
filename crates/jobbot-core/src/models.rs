use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::scoring::ScoreCard;

/// Where a job record was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSource {
    /// Indirect discovery through search-engine results.
    SearchEngine,
    /// Direct scrape of a job-listing site.
    ListingSite,
    /// Heuristic scrape of a company careers page.
    CompanyPage,
}

impl JobSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobSource::SearchEngine => "search_engine",
            JobSource::ListingSite => "listing_site",
            JobSource::CompanyPage => "company_page",
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "search_engine" => Ok(JobSource::SearchEngine),
            "listing_site" => Ok(JobSource::ListingSite),
            "company_page" => Ok(JobSource::CompanyPage),
            _ => Err(format!("Unknown job source: {}", s)),
        }
    }
}

/// One unit of collection work for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRequest {
    SearchEngine { query: String, location: String },
    ListingSite { query: String, location: String },
    CompanyPage { url: String },
}

impl SourceRequest {
    pub fn kind(&self) -> JobSource {
        match self {
            SourceRequest::SearchEngine { .. } => JobSource::SearchEngine,
            SourceRequest::ListingSite { .. } => JobSource::ListingSite,
            SourceRequest::CompanyPage { .. } => JobSource::CompanyPage,
        }
    }

    /// Short human-readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            SourceRequest::SearchEngine { query, location }
            | SourceRequest::ListingSite { query, location } => {
                format!("{} '{}' in {}", self.kind(), query, location)
            }
            SourceRequest::CompanyPage { url } => format!("{} {}", self.kind(), url),
        }
    }
}

/// A single job posting as collected by a fetcher.
///
/// `score` and `matched_signals` stay empty until the scorer runs, and
/// are frozen afterwards (see [`JobRecord::apply_score`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub source: JobSource,
    pub title: String,
    pub company: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    /// Applicant count exactly as scraped; may be malformed.
    #[serde(default)]
    pub applicant_count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<i64>,
    #[serde(default)]
    matched_signals: Vec<String>,
}

impl JobRecord {
    pub fn new(
        source: JobSource,
        title: impl Into<String>,
        company: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            source,
            title: title.into(),
            company: company.into(),
            link: link.into(),
            snippet: String::new(),
            posted_at: None,
            location: None,
            applicant_count: None,
            score: None,
            matched_signals: Vec::new(),
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        self.location = if location.is_empty() {
            None
        } else {
            Some(location)
        };
        self
    }

    pub fn with_posted_at(mut self, posted_at: DateTime<Utc>) -> Self {
        self.posted_at = Some(posted_at);
        self
    }

    pub fn with_applicant_count(mut self, count: impl Into<String>) -> Self {
        self.applicant_count = Some(count.into());
        self
    }

    /// Lower-cased title, snippet, company and location joined by spaces.
    ///
    /// All keyword matching (scoring and gating) runs against this text.
    pub fn haystack(&self) -> String {
        [
            self.title.as_str(),
            self.snippet.as_str(),
            self.company.as_str(),
            self.location.as_deref().unwrap_or_default(),
        ]
        .join(" ")
        .to_lowercase()
    }

    /// Identity used for deduplication: (title, company) lower-cased, link verbatim.
    pub fn dedup_key(&self) -> (String, String, String) {
        (
            self.title.to_lowercase(),
            self.company.to_lowercase(),
            self.link.clone(),
        )
    }

    /// Whether the record carries a link it can be acted upon with.
    pub fn is_actionable(&self) -> bool {
        !self.link.trim().is_empty()
    }

    pub fn score(&self) -> Option<i64> {
        self.score
    }

    pub fn matched_signals(&self) -> &[String] {
        &self.matched_signals
    }

    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }

    /// Attach a score card. Fails without modifying the record if it was
    /// already scored.
    pub fn apply_score(&mut self, card: ScoreCard) -> Result<(), AppError> {
        if self.score.is_some() {
            return Err(AppError::AlreadyScored(self.title.clone()));
        }
        self.score = Some(card.total);
        self.matched_signals = card.signals;
        Ok(())
    }
}
