use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::config::Settings;
use crate::dedup::deduplicate;
use crate::error::AppError;
use crate::gate::{self, Rejection};
use crate::mail::compose_job_email;
use crate::models::{JobRecord, SourceRequest};
use crate::scoring::Scorer;
use crate::tailor::{Tailor, sample_job};
use crate::traits::{Discoverer, DocumentRenderer, Mailer};

/// Events emitted during a run for monitoring/logging.
#[derive(Debug, Clone)]
pub enum RunEvent<'a> {
    Started {
        run_id: Uuid,
        sources: usize,
    },
    SourceCollected {
        request: &'a SourceRequest,
        count: usize,
    },
    SourceFailed {
        request: &'a SourceRequest,
        error: &'a str,
    },
    Deduplicated {
        before: usize,
        after: usize,
    },
    JobRejected {
        job: &'a JobRecord,
        rejection: &'a Rejection,
    },
    JobRendered {
        job: &'a JobRecord,
        path: &'a Path,
    },
    JobEmailed {
        job: &'a JobRecord,
    },
    JobFailed {
        job: &'a JobRecord,
        error: &'a str,
    },
    SampleRendered {
        path: &'a Path,
    },
    Finished {
        summary: &'a RunSummary,
    },
}

/// Trait for receiving run events (decoupled logging).
pub trait RunReporter: Send + Sync {
    fn report(&self, event: RunEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRunReporter;

impl RunReporter for TracingRunReporter {
    fn report(&self, event: RunEvent<'_>) {
        match event {
            RunEvent::Started { run_id, sources } => {
                tracing::info!(%run_id, %sources, "Run started");
            }
            RunEvent::SourceCollected { request, count } => {
                tracing::info!(source = %request.describe(), %count, "Collected jobs");
            }
            RunEvent::SourceFailed { request, error } => {
                tracing::warn!(source = %request.describe(), %error, "Source failed");
            }
            RunEvent::Deduplicated { before, after } => {
                tracing::info!(%before, %after, "Deduplicated jobs");
            }
            RunEvent::JobRejected { job, rejection } => {
                tracing::info!(
                    title = %job.title,
                    company = %job.company,
                    score = ?job.score(),
                    reason = %rejection,
                    "Skipping job"
                );
            }
            RunEvent::JobRendered { job, path } => {
                tracing::info!(title = %job.title, path = %path.display(), "Rendered resume");
            }
            RunEvent::JobEmailed { job } => {
                tracing::info!(
                    title = %job.title,
                    company = %job.company,
                    score = ?job.score(),
                    "Emailed job"
                );
            }
            RunEvent::JobFailed { job, error } => {
                tracing::warn!(
                    title = %job.title,
                    company = %job.company,
                    %error,
                    "Failed to process job"
                );
            }
            RunEvent::SampleRendered { path } => {
                tracing::info!(path = %path.display(), "No emails sent, created sample resume");
            }
            RunEvent::Finished { summary } => {
                tracing::info!(
                    run_id = %summary.run_id,
                    fetched = %summary.fetched,
                    unique = %summary.unique,
                    accepted = %summary.accepted,
                    emailed = %summary.emailed,
                    rejected = %summary.rejected,
                    failed = %summary.failed,
                    "Run complete"
                );
            }
        }
    }
}

/// Per-invocation switches that are not part of the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Render documents but do not send email.
    pub dry_run: bool,
    /// Render a sample document when nothing was emailed.
    pub sample_on_empty: bool,
}

/// What happened to a single job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Rejected { rejection: Rejection },
    /// Rendered but not sent (dry run).
    Rendered { path: PathBuf },
    Emailed { path: PathBuf },
    Failed { error: String },
}

impl Decision {
    pub fn label(&self) -> String {
        match self {
            Decision::Rejected { rejection } => format!("rejected: {rejection}"),
            Decision::Rendered { .. } => "rendered".to_string(),
            Decision::Emailed { .. } => "emailed".to_string(),
            Decision::Failed { error } => format!("failed: {error}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub job: JobRecord,
    pub decision: Decision,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub fetched: usize,
    pub unique: usize,
    pub accepted: usize,
    pub emailed: usize,
    pub rejected: usize,
    pub failed: usize,
    pub sample_path: Option<PathBuf>,
    pub outcomes: Vec<JobOutcome>,
}

/// Sources for a run, in collection order.
pub fn build_requests(settings: &Settings, company_pages: &[String]) -> Vec<SourceRequest> {
    let mut requests = Vec::new();
    if settings.sources.search_engine {
        requests.push(SourceRequest::SearchEngine {
            query: settings.query.clone(),
            location: settings.location.clone(),
        });
    }
    if settings.sources.listing_site {
        requests.push(SourceRequest::ListingSite {
            query: settings.query.clone(),
            location: settings.location.clone(),
        });
    }
    if settings.sources.company_pages {
        requests.extend(
            company_pages
                .iter()
                .map(|url| SourceRequest::CompanyPage { url: url.clone() }),
        );
    }
    requests
}

/// Runs fetch → dedupe → score → gate → tailor → render → email once.
///
/// Generic over discovery, rendering and delivery so tests run without
/// network or SMTP. Every step is sequential; a failing source or job is
/// reported and skipped.
pub struct RunService<D, R, M>
where
    D: Discoverer,
    R: DocumentRenderer,
    M: Mailer,
{
    discoverer: D,
    renderer: R,
    mailer: M,
    settings: Settings,
    scorer: Scorer,
    tailor: Tailor,
}

impl<D, R, M> RunService<D, R, M>
where
    D: Discoverer,
    R: DocumentRenderer,
    M: Mailer,
{
    pub fn new(
        discoverer: D,
        renderer: R,
        mailer: M,
        settings: Settings,
        master_resume: String,
    ) -> Self {
        let scorer = Scorer::from_settings(&settings);
        let tailor = Tailor::new(master_resume, settings.output_dir.clone());
        Self {
            discoverer,
            renderer,
            mailer,
            settings,
            scorer,
            tailor,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn run<RR: RunReporter>(
        &self,
        company_pages: &[String],
        options: &RunOptions,
        reporter: &RR,
    ) -> RunSummary {
        let run_id = Uuid::new_v4();
        let requests = build_requests(&self.settings, company_pages);
        reporter.report(RunEvent::Started {
            run_id,
            sources: requests.len(),
        });

        // 1. Collect
        let collected = self.collect(&requests, reporter).await;
        let fetched = collected.len();

        // 2. Dedupe
        let unique_jobs = deduplicate(collected);
        reporter.report(RunEvent::Deduplicated {
            before: fetched,
            after: unique_jobs.len(),
        });

        // 3. Score
        let scored = self.scorer.score_all(unique_jobs);

        if let Err(e) = std::fs::create_dir_all(self.tailor.output_dir()) {
            tracing::warn!(
                dir = %self.tailor.output_dir().display(),
                error = %e,
                "Could not create output directory"
            );
        }

        // 4. Gate, tailor, render, email
        let mut summary = RunSummary {
            run_id,
            fetched,
            unique: scored.len(),
            accepted: 0,
            emailed: 0,
            rejected: 0,
            failed: 0,
            sample_path: None,
            outcomes: Vec::with_capacity(scored.len()),
        };

        for job in scored {
            let decision = self.process_job(&job, options, reporter).await;
            match &decision {
                Decision::Rejected { .. } => summary.rejected += 1,
                Decision::Rendered { .. } => summary.accepted += 1,
                Decision::Emailed { .. } => {
                    summary.accepted += 1;
                    summary.emailed += 1;
                }
                Decision::Failed { .. } => {
                    summary.accepted += 1;
                    summary.failed += 1;
                }
            }
            summary.outcomes.push(JobOutcome { job, decision });
        }

        // 5. Verification sample
        if summary.emailed == 0 && options.sample_on_empty {
            summary.sample_path = self.render_sample(reporter);
        }

        reporter.report(RunEvent::Finished { summary: &summary });
        summary
    }

    async fn collect<RR: RunReporter>(
        &self,
        requests: &[SourceRequest],
        reporter: &RR,
    ) -> Vec<JobRecord> {
        let mut jobs = Vec::new();
        for request in requests {
            match self.discoverer.discover(request).await {
                Ok(found) => {
                    reporter.report(RunEvent::SourceCollected {
                        request,
                        count: found.len(),
                    });
                    jobs.extend(found);
                }
                Err(e) => {
                    let error = e.to_string();
                    reporter.report(RunEvent::SourceFailed {
                        request,
                        error: &error,
                    });
                }
            }
            if matches!(request, SourceRequest::CompanyPage { .. }) {
                pause(self.settings.company_delay()).await;
            }
        }
        jobs
    }

    async fn process_job<RR: RunReporter>(
        &self,
        job: &JobRecord,
        options: &RunOptions,
        reporter: &RR,
    ) -> Decision {
        if let Err(rejection) = gate::evaluate(job, &self.settings) {
            reporter.report(RunEvent::JobRejected {
                job,
                rejection: &rejection,
            });
            return Decision::Rejected { rejection };
        }

        match self.deliver(job, options, reporter).await {
            Ok(decision) => decision,
            Err(e) => {
                let error = e.to_string();
                reporter.report(RunEvent::JobFailed { job, error: &error });
                Decision::Failed { error }
            }
        }
    }

    async fn deliver<RR: RunReporter>(
        &self,
        job: &JobRecord,
        options: &RunOptions,
        reporter: &RR,
    ) -> Result<Decision, AppError> {
        let resume = self.tailor.tailor(job, Utc::now());
        let path = self.renderer.render(&resume.text, &resume.output_path)?;
        reporter.report(RunEvent::JobRendered { job, path: &path });

        if options.dry_run {
            return Ok(Decision::Rendered { path });
        }

        let email = compose_job_email(job, &resume.text, &self.settings.email, path.clone());
        self.mailer.send(&email).await?;
        reporter.report(RunEvent::JobEmailed { job });
        pause(self.settings.email_delay()).await;

        Ok(Decision::Emailed { path })
    }

    fn render_sample<RR: RunReporter>(&self, reporter: &RR) -> Option<PathBuf> {
        let resume = self.tailor.tailor(&sample_job(), Utc::now());
        match self.renderer.render(&resume.text, &resume.output_path) {
            Ok(path) => {
                reporter.report(RunEvent::SampleRendered { path: &path });
                Some(path)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to create sample resume");
                None
            }
        }
    }
}

async fn pause(duration: std::time::Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
