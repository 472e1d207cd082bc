use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use jobbot_core::error::AppError;
use jobbot_core::models::{JobRecord, JobSource};
use percent_encoding::percent_decode_str;
use scraper::{Html, Selector};
use url::Url;

use super::element_text;

const SEARCH_BASE: &str = "https://www.google.com/search";

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Search-engine query restricted to LinkedIn job pages.
pub fn search_url(query: &str, location: &str) -> Result<Url, AppError> {
    let q = format!("site:linkedin.com/jobs {query} {location}");
    Url::parse_with_params(SEARCH_BASE, &[("q", q.as_str()), ("num", "10")])
        .map_err(|e| AppError::ParseError(format!("Invalid search URL: {e}")))
}

/// Extract LinkedIn job links from a results page.
///
/// Results are `/url?q=<target>&...` redirect anchors; the decoded target
/// must point below `linkedin.com/jobs`. Each target is kept once.
pub fn parse_search_results(html: &str, location: &str, now: DateTime<Utc>) -> Vec<JobRecord> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut jobs = Vec::new();

    for anchor in doc.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(target) = redirect_target(href) else {
            continue;
        };
        if !target.contains("linkedin.com/jobs") || !seen.insert(target.clone()) {
            continue;
        }

        let text = element_text(anchor);
        let title = if text.is_empty() {
            "LinkedIn Job".to_string()
        } else {
            text
        };

        jobs.push(
            JobRecord::new(JobSource::SearchEngine, title, "LinkedIn", target)
                .with_snippet("Found via Google search")
                .with_location(location)
                .with_posted_at(now),
        );
    }

    tracing::debug!(count = jobs.len(), "Parsed search results");
    jobs
}

/// Decoded `q` parameter of a `/url?q=` redirect href.
fn redirect_target(href: &str) -> Option<String> {
    let rest = href.strip_prefix("/url?q=")?;
    let encoded = rest.split('&').next().unwrap_or_default();
    let decoded = percent_decode_str(encoded).decode_utf8_lossy().into_owned();
    (!decoded.is_empty()).then_some(decoded)
}
