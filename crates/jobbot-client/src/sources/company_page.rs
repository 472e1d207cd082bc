use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use jobbot_core::models::{JobRecord, JobSource};
use jobbot_core::scoring::contains_any;
use scraper::{Html, Selector};
use url::Url;

use super::element_text;

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Path fragments that mark a link as a job posting or job list.
const JOB_PATH_MARKERS: &[&str] = &[
    "job", "jobs", "careers", "career", "openings", "positions", "role", "apply", "vacancy",
    "opportunity", "posting",
];

const TITLE_MARKERS: &[&str] = &[
    "data",
    "engineer",
    "analytics",
    "analyst",
    "scientist",
    "databricks",
    "azure",
    "etl",
    "spark",
];

/// Fallback markers checked in `aria-label` and `title` attributes.
const ATTRIBUTE_MARKERS: &[&str] = &["data", "engineer", "azure"];

/// Heuristically pick data-engineering job links off a careers page.
pub fn parse_company_page(html: &str, page: &Url, now: DateTime<Utc>) -> Vec<JobRecord> {
    let doc = Html::parse_document(html);
    let company = page.host_str().unwrap_or_default().to_string();
    let mut seen = HashSet::new();
    let mut jobs = Vec::new();

    for anchor in doc.select(&ANCHOR) {
        let href = anchor.value().attr("href").unwrap_or_default().trim();
        if href.is_empty() {
            continue;
        }
        let Ok(link) = page.join(href) else {
            continue;
        };
        if !matches!(link.scheme(), "http" | "https") {
            continue;
        }

        let path = link.path().to_lowercase();
        if !contains_any(&path, JOB_PATH_MARKERS) {
            continue;
        }

        let text = element_text(anchor);
        let title = if text.is_empty() {
            title_from_path(link.path())
        } else {
            text.clone()
        };

        if !contains_any(&title.to_lowercase(), TITLE_MARKERS) {
            let attrs = format!(
                "{} {}",
                anchor.value().attr("aria-label").unwrap_or_default(),
                anchor.value().attr("title").unwrap_or_default()
            )
            .to_lowercase();
            if !contains_any(&attrs, ATTRIBUTE_MARKERS) {
                continue;
            }
        }

        let link = String::from(link);
        let key = link.split('?').next().unwrap_or_default().to_string();
        if !seen.insert(key) {
            continue;
        }

        jobs.push(
            JobRecord::new(JobSource::CompanyPage, title, company.as_str(), link)
                .with_snippet(text)
                .with_posted_at(now),
        );
    }

    tracing::debug!(page = %page, count = jobs.len(), "Parsed company page");
    jobs
}

fn title_from_path(path: &str) -> String {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .replace(['-', '_'], " ")
}
