//! Job sources: URL construction and HTML parsing per source kind.
//!
//! Parsers are pure functions over an HTML string so they can be tested
//! against fixtures; [`ScrapingDiscoverer`] wires them to a [`Fetcher`].

mod company_page;
mod listing_site;
mod search_engine;

pub use company_page::parse_company_page;
pub use listing_site::{LISTING_BASE, listing_url, parse_listing_page};
pub use search_engine::{parse_search_results, search_url};

use chrono::Utc;
use jobbot_core::error::AppError;
use jobbot_core::models::{JobRecord, SourceRequest};
use jobbot_core::traits::{Discoverer, Fetcher};
use scraper::ElementRef;
use url::Url;

/// Discovers jobs by fetching and scraping each source's HTML.
#[derive(Clone)]
pub struct ScrapingDiscoverer<F: Fetcher> {
    fetcher: F,
}

impl<F: Fetcher> ScrapingDiscoverer<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }
}

impl<F: Fetcher> Discoverer for ScrapingDiscoverer<F> {
    async fn discover(&self, request: &SourceRequest) -> Result<Vec<JobRecord>, AppError> {
        let now = Utc::now();
        match request {
            SourceRequest::SearchEngine { query, location } => {
                let url = search_url(query, location)?;
                let html = self.fetcher.fetch(url.as_str()).await?;
                Ok(parse_search_results(&html, location, now))
            }
            SourceRequest::ListingSite { query, location } => {
                let url = listing_url(query, location)?;
                let html = self.fetcher.fetch(url.as_str()).await?;
                Ok(parse_listing_page(&html, location, now))
            }
            SourceRequest::CompanyPage { url } => {
                let page = match Url::parse(url) {
                    Ok(page) => page,
                    Err(e) => {
                        tracing::warn!(%url, error = %e, "Skipping invalid company URL");
                        return Ok(Vec::new());
                    }
                };
                let html = self.fetcher.fetch(page.as_str()).await?;
                Ok(parse_company_page(&html, &page, now))
            }
        }
    }
}

/// Whitespace-normalized text content of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
