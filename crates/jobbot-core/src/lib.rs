pub mod config;
pub mod dedup;
pub mod error;
pub mod gate;
pub mod layout;
pub mod mail;
pub mod models;
pub mod pipeline;
pub mod retry;
pub mod scoring;
pub mod tailor;
pub mod traits;
pub mod util;

#[cfg(test)]
pub mod testutil;

pub use config::Settings;
pub use error::AppError;
pub use mail::OutgoingEmail;
pub use models::{JobRecord, JobSource, SourceRequest};
pub use pipeline::{RunOptions, RunReporter, RunService, RunSummary, TracingRunReporter};
pub use retry::{RetryPolicy, RetryingFetcher};
pub use scoring::Scorer;
pub use traits::{Discoverer, DocumentRenderer, Fetcher, Mailer};
