pub mod fetcher;
pub mod mailer;
pub mod pdf;
pub mod sources;

pub use fetcher::ReqwestFetcher;
pub use mailer::SmtpMailer;
pub use pdf::PdfRenderer;
pub use sources::ScrapingDiscoverer;
