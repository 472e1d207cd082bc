mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use jobbot_client::{PdfRenderer, ReqwestFetcher, ScrapingDiscoverer, SmtpMailer};
use jobbot_core::error::AppError;
use jobbot_core::gate::{self, Rejection};
use jobbot_core::models::{JobRecord, JobSource};
use jobbot_core::pipeline::{RunOptions, RunService, TracingRunReporter};
use jobbot_core::retry::{RetryPolicy, RetryingFetcher};
use jobbot_core::scoring::Scorer;
use jobbot_core::util::{SmtpCredentials, load_company_pages};
use jobbot_core::{Mailer, OutgoingEmail, Settings};

#[derive(Parser)]
#[command(name = "jobbot", version, about = "Job search automation: scrape, score, tailor, email")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one collection cycle
    Run {
        /// YAML settings file
        #[arg(short, long, default_value = "jobbot/config.yaml")]
        config: PathBuf,

        /// Company careers pages, one URL per line
        #[arg(long, default_value = "jobbot/company_list.txt")]
        companies: PathBuf,

        /// Plain-text master resume
        #[arg(long, default_value = "jobbot/master_resume.txt")]
        master_resume: PathBuf,

        /// PDF whose first page receives the tailored text
        #[arg(long, env = "JOBBOT_TEMPLATE")]
        template: Option<PathBuf>,

        /// Overrides `output_dir` from the settings file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Render documents but do not send email
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Render a sample resume when nothing was emailed
        #[arg(long, default_value_t = false)]
        sample_on_empty: bool,

        /// Write a CSV row per scored job
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Score a single job description and print the decision as JSON
    Score {
        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        snippet: String,

        #[arg(long, default_value = "")]
        company: String,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(long, default_value = "")]
        link: String,

        /// Applicant count as shown on the listing, e.g. "25 applicants"
        #[arg(long)]
        applicants: Option<String>,

        #[arg(short, long, default_value = "jobbot/config.yaml")]
        config: PathBuf,
    },

    /// Print the effective settings as YAML
    CheckConfig {
        #[arg(short, long, default_value = "jobbot/config.yaml")]
        config: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jobbot=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            companies,
            master_resume,
            template,
            output_dir,
            dry_run,
            sample_on_empty,
            report,
        } => {
            let args = RunArgs {
                config,
                companies,
                master_resume,
                template,
                output_dir,
                options: RunOptions {
                    dry_run,
                    sample_on_empty,
                },
                report,
            };
            // A run never fails the process; problems are logged.
            if let Err(e) = cmd_run(&args, SmtpCredentials::from_env).await {
                tracing::error!("Run aborted: {e:#}");
            }
        }
        Commands::Score {
            title,
            snippet,
            company,
            location,
            link,
            applicants,
            config,
        } => {
            let mut job = JobRecord::new(JobSource::ListingSite, title, company, link)
                .with_snippet(snippet)
                .with_location(location.unwrap_or_default());
            if let Some(applicants) = applicants {
                job = job.with_applicant_count(applicants);
            }
            cmd_score(job, &load_settings(&config)?)?;
        }
        Commands::CheckConfig { config } => {
            let settings = load_settings(&config)?;
            print!("{}", serde_yaml::to_string(&settings)?);
        }
    }

    Ok(())
}

struct RunArgs {
    config: PathBuf,
    companies: PathBuf,
    master_resume: PathBuf,
    template: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    options: RunOptions,
    report: Option<PathBuf>,
}

/// Settings from `path`, or the defaults when the file does not exist.
fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(Settings::default());
    }
    Settings::load(path).map_err(|e| anyhow::anyhow!(e))
}

async fn cmd_run(
    args: &RunArgs,
    credentials: impl FnOnce() -> Result<SmtpCredentials, AppError>,
) -> Result<()> {
    let mut settings = load_settings(&args.config)?;
    if let Some(dir) = &args.output_dir {
        settings.output_dir = dir.clone();
    }

    let master = std::fs::read_to_string(&args.master_resume).with_context(|| {
        format!(
            "Failed to read master resume: {}",
            args.master_resume.display()
        )
    })?;
    let company_pages = load_company_pages(&args.companies).map_err(|e| anyhow::anyhow!(e))?;

    let fetcher = RetryingFetcher::new(
        ReqwestFetcher::new().context("Failed to create HTTP client")?,
        RetryPolicy::default(),
    );
    let discoverer = ScrapingDiscoverer::new(fetcher);
    let renderer = match &args.template {
        Some(template) => PdfRenderer::new().with_template(template),
        None => PdfRenderer::new(),
    };

    if args.options.dry_run {
        tracing::info!("Dry run: documents are rendered, nothing is sent");
        let service = RunService::new(discoverer, renderer, DryRunMailer, settings, master);
        return execute(&service, &company_pages, args).await;
    }

    let credentials = credentials().map_err(|e| anyhow::anyhow!(e))?;
    settings
        .validate_for_sending()
        .map_err(|e| anyhow::anyhow!(e))?;
    let mailer = SmtpMailer::new(
        settings.smtp.clone(),
        credentials,
        settings.sender_name.clone(),
    );
    let service = RunService::new(discoverer, renderer, mailer, settings, master);
    execute(&service, &company_pages, args).await
}

async fn execute<D, R, M>(
    service: &RunService<D, R, M>,
    company_pages: &[String],
    args: &RunArgs,
) -> Result<()>
where
    D: jobbot_core::Discoverer,
    R: jobbot_core::DocumentRenderer,
    M: Mailer,
{
    let summary = service
        .run(company_pages, &args.options, &TracingRunReporter)
        .await;

    if let Some(path) = &args.report {
        report::write_report(path, &summary.outcomes)?;
        tracing::info!(path = %path.display(), rows = summary.outcomes.len(), "Wrote report");
    }
    Ok(())
}

/// Stand-in used for dry runs, where the pipeline never sends.
struct DryRunMailer;

impl Mailer for DryRunMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        tracing::info!(to = %email.to, subject = %email.subject, "Dry run, not sending");
        Ok(())
    }
}

#[derive(Serialize)]
struct ScoreOutput<'a> {
    job: &'a JobRecord,
    accepted: bool,
    rejection: Option<Rejection>,
}

fn cmd_score(mut job: JobRecord, settings: &Settings) -> Result<()> {
    Scorer::from_settings(settings)
        .score(&mut job)
        .map_err(|e| anyhow::anyhow!(e))?;
    let rejection = gate::evaluate(&job, settings).err();
    let output = ScoreOutput {
        job: &job,
        accepted: rejection.is_none(),
        rejection,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
