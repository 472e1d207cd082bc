use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::mail::OutgoingEmail;
use crate::models::{JobRecord, SourceRequest};

/// Fetches raw HTML content from a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Turns a source request into job records.
pub trait Discoverer: Send + Sync {
    fn discover(
        &self,
        request: &SourceRequest,
    ) -> impl Future<Output = Result<Vec<JobRecord>, AppError>> + Send;
}

/// Renders tailored resume text to a document file.
pub trait DocumentRenderer: Send + Sync {
    /// Writes the document to `out_path` and returns the path written.
    fn render(&self, text: &str, out_path: &Path) -> Result<PathBuf, AppError>;
}

/// Delivers a composed email.
pub trait Mailer: Send + Sync {
    fn send(&self, email: &OutgoingEmail) -> impl Future<Output = Result<(), AppError>> + Send;
}
