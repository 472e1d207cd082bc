use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use jobbot_core::error::AppError;
use jobbot_core::models::{JobRecord, JobSource};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::element_text;

pub const LISTING_BASE: &str = "https://in.indeed.com";

fn selectors(list: &[&str]) -> Vec<Selector> {
    list.iter()
        .map(|s| Selector::parse(s).expect("valid selector"))
        .collect()
}

/// Card layouts, newest last. The first one that matches anything wins.
static CARD: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[".jobsearch-SerpJobCard", ".result", "a.tapItem"]));
static TITLE: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&["h2.jobTitle", ".jobTitle", ".title"]));
static COMPANY: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[".companyName", ".company"]));
static SNIPPET: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[".job-snippet", ".summary", ".jobCardShelfContainer"])
});
static APPLICANTS: LazyLock<Vec<Selector>> = LazyLock::new(|| selectors(&[".applicantCount"]));
static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid selector"));

pub fn listing_url(query: &str, location: &str) -> Result<Url, AppError> {
    Url::parse_with_params(&format!("{LISTING_BASE}/jobs"), &[("q", query), ("l", location)])
        .map_err(|e| AppError::ParseError(format!("Invalid listing URL: {e}")))
}

/// Text of the first descendant matching any selector, in order.
fn first_text(card: ElementRef<'_>, candidates: &[Selector]) -> Option<String> {
    candidates
        .iter()
        .find_map(|sel| card.select(sel).next())
        .map(element_text)
}

fn card_link(card: ElementRef<'_>) -> String {
    let href = card
        .select(&ANCHOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .or_else(|| {
            (card.value().name() == "a")
                .then(|| card.value().attr("href"))
                .flatten()
        })
        .map(str::trim)
        .unwrap_or_default();

    if href.is_empty() {
        return String::new();
    }
    if href.starts_with("http") {
        return href.to_string();
    }
    Url::parse(LISTING_BASE)
        .and_then(|base| base.join(href))
        .map(String::from)
        .unwrap_or_default()
}

/// Parse a listing-site results page into job cards.
pub fn parse_listing_page(html: &str, location: &str, now: DateTime<Utc>) -> Vec<JobRecord> {
    let doc = Html::parse_document(html);
    let cards: Vec<ElementRef<'_>> = CARD
        .iter()
        .map(|sel| doc.select(sel).collect::<Vec<_>>())
        .find(|found| !found.is_empty())
        .unwrap_or_default();

    let jobs: Vec<JobRecord> = cards
        .into_iter()
        .map(|card| {
            let mut job = JobRecord::new(
                JobSource::ListingSite,
                first_text(card, &TITLE).unwrap_or_default(),
                first_text(card, &COMPANY).unwrap_or_default(),
                card_link(card),
            )
            .with_snippet(first_text(card, &SNIPPET).unwrap_or_default())
            .with_location(location)
            .with_posted_at(now);
            if let Some(count) = first_text(card, &APPLICANTS).filter(|c| !c.is_empty()) {
                job = job.with_applicant_count(count);
            }
            job
        })
        .collect();

    tracing::debug!(count = jobs.len(), "Parsed listing page");
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSIC: &str = r#"
        <div id="results">
          <div class="jobsearch-SerpJobCard">
            <h2 class="jobTitle"><a href="/rc/clk?jk=abc">Senior Azure Data Engineer</a></h2>
            <span class="companyName">Contoso</span>
            <div class="job-snippet"><ul><li>Azure Data Factory</li><li>PySpark</li></ul></div>
            <span class="applicantCount">25 applicants</span>
          </div>
          <div class="jobsearch-SerpJobCard">
            <h2 class="jobTitle"><a href="https://example.org/apply/1">Data Analyst</a></h2>
            <span class="company">Fabrikam</span>
          </div>
          <div class="result"><span class="title">Ignored layout</span></div>
        </div>
    "#;

    const MOBILE: &str = r#"
        <a class="tapItem" href="/viewjob?jk=m1">
          <span class="jobTitle">Data Engineer</span>
          <span class="companyName">Northwind</span>
          <div class="summary">Build pipelines</div>
        </a>
    "#;

    #[test]
    fn test_listing_url_encodes_params() {
        let url = listing_url("Azure Data Engineer", "Hyderabad").unwrap();
        assert_eq!(
            url.as_str(),
            "https://in.indeed.com/jobs?q=Azure+Data+Engineer&l=Hyderabad"
        );
    }

    #[test]
    fn test_first_matching_card_layout_wins() {
        let jobs = parse_listing_page(CLASSIC, "Hyderabad", Utc::now());
        assert_eq!(jobs.len(), 2);

        assert_eq!(jobs[0].title, "Senior Azure Data Engineer");
        assert_eq!(jobs[0].company, "Contoso");
        assert_eq!(jobs[0].snippet, "Azure Data Factory PySpark");
        assert_eq!(jobs[0].link, "https://in.indeed.com/rc/clk?jk=abc");
        assert_eq!(jobs[0].applicant_count.as_deref(), Some("25 applicants"));
        assert_eq!(jobs[0].location.as_deref(), Some("Hyderabad"));

        assert_eq!(jobs[1].company, "Fabrikam");
        assert_eq!(jobs[1].link, "https://example.org/apply/1");
        assert_eq!(jobs[1].snippet, "");
        assert!(jobs[1].applicant_count.is_none());
    }

    #[test]
    fn test_anchor_card_uses_own_href() {
        let jobs = parse_listing_page(MOBILE, "Pune", Utc::now());
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Data Engineer");
        assert_eq!(jobs[0].company, "Northwind");
        assert_eq!(jobs[0].snippet, "Build pipelines");
        assert_eq!(jobs[0].link, "https://in.indeed.com/viewjob?jk=m1");
    }

    #[test]
    fn test_blocked_page_yields_nothing() {
        let html = "<html><body><h1>Verify you are human</h1></body></html>";
        assert!(parse_listing_page(html, "Hyderabad", Utc::now()).is_empty());
    }
}
