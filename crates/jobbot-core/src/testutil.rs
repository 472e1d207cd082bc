//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::mail::OutgoingEmail;
use crate::models::{JobRecord, JobSource, SourceRequest};
use crate::pipeline::{RunEvent, RunReporter};
use crate::traits::{Discoverer, DocumentRenderer, Fetcher, Mailer};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that returns queued responses.
#[derive(Clone)]
pub struct MockFetcher {
    /// Queue of responses. Each call pops the first element.
    /// If empty, returns a default HTML string.
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(url.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("<html><body>default</body></html>".to_string())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockDiscoverer
// ---------------------------------------------------------------------------

/// Mock discoverer returning a canned result per source kind.
///
/// Each configured result is handed out once; unconfigured or exhausted
/// kinds return an empty list.
#[derive(Clone, Default)]
pub struct MockDiscoverer {
    results: Arc<Mutex<HashMap<JobSource, Result<Vec<JobRecord>, AppError>>>>,
    pub calls: Arc<Mutex<Vec<SourceRequest>>>,
}

impl MockDiscoverer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(self, kind: JobSource, result: Result<Vec<JobRecord>, AppError>) -> Self {
        self.results.lock().unwrap().insert(kind, result);
        self
    }
}

impl Discoverer for MockDiscoverer {
    async fn discover(&self, request: &SourceRequest) -> Result<Vec<JobRecord>, AppError> {
        self.calls.lock().unwrap().push(request.clone());
        self.results
            .lock()
            .unwrap()
            .remove(&request.kind())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ---------------------------------------------------------------------------
// MockRenderer
// ---------------------------------------------------------------------------

/// Mock renderer that records the text it was given and writes nothing.
#[derive(Clone, Default)]
pub struct MockRenderer {
    pub rendered: Arc<Mutex<Vec<String>>>,
    error: Option<String>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error(message: &str) -> Self {
        Self {
            rendered: Arc::default(),
            error: Some(message.to_string()),
        }
    }
}

impl DocumentRenderer for MockRenderer {
    fn render(&self, text: &str, out_path: &Path) -> Result<PathBuf, AppError> {
        if let Some(message) = &self.error {
            return Err(AppError::RenderError(message.clone()));
        }
        self.rendered.lock().unwrap().push(text.to_string());
        Ok(out_path.to_path_buf())
    }
}

// ---------------------------------------------------------------------------
// MockMailer
// ---------------------------------------------------------------------------

/// Mock mailer that records successfully "sent" messages.
#[derive(Clone, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    attempts: Arc<Mutex<usize>>,
    /// Zero-based attempt numbers that fail.
    fail_on: Vec<usize>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(attempts: &[usize]) -> Self {
        Self {
            fail_on: attempts.to_vec(),
            ..Self::default()
        }
    }
}

impl Mailer for MockMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let current = *attempts;
            *attempts += 1;
            current
        };
        if self.fail_on.contains(&attempt) {
            return Err(AppError::EmailError("connection refused".into()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockReporter
// ---------------------------------------------------------------------------

/// Mock run reporter that records event names.
#[derive(Default)]
pub struct MockReporter {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RunReporter for MockReporter {
    fn report(&self, event: RunEvent<'_>) {
        let label = match &event {
            RunEvent::Started { .. } => "Started",
            RunEvent::SourceCollected { .. } => "SourceCollected",
            RunEvent::SourceFailed { .. } => "SourceFailed",
            RunEvent::Deduplicated { .. } => "Deduplicated",
            RunEvent::JobRejected { .. } => "JobRejected",
            RunEvent::JobRendered { .. } => "JobRendered",
            RunEvent::JobEmailed { .. } => "JobEmailed",
            RunEvent::JobFailed { .. } => "JobFailed",
            RunEvent::SampleRendered { .. } => "SampleRendered",
            RunEvent::Finished { .. } => "Finished",
        };
        self.events.lock().unwrap().push(label.to_string());
    }
}
