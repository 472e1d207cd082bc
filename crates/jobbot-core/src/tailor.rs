//! Tailored resume text for a single job.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::models::{JobRecord, JobSource};

/// Terms looked for in a posting's title and snippet, in report order.
pub const TERMS: &[&str] = &[
    "azure",
    "databricks",
    "data factory",
    "synapse",
    "delta lake",
    "pyspark",
    "python",
    "sql",
    "ci/cd",
    "etl",
    "spark",
    "data lake",
    "data engineering",
    "lakehouse",
];

const GENERIC_BULLETS: &[&str] = &[
    "- Automated data validation, reconciliation and monitoring for reliable data quality.",
    "- Collaborated with analytics, data science, and architecture teams to deliver production-grade data platforms.",
];

/// Bullets keyed by the terms that trigger them.
const KEYED_BULLETS: &[(&[&str], &str)] = &[
    (
        &["azure", "data factory"],
        "- Built and maintained enterprise Azure Data Factory pipelines for ingestion and orchestration.",
    ),
    (
        &["databricks", "delta lake"],
        "- Designed Databricks notebooks and Delta Lake tables to support ACID transactions and efficient queries.",
    ),
    (
        &["pyspark", "spark"],
        "- Implemented PySpark transformations to process large datasets with performance tuning and partitioning.",
    ),
    (
        &["ci/cd"],
        "- Implemented CI/CD for data pipelines using GitHub Actions for reliable deployments.",
    ),
];

/// Vocabulary terms present in the job's title and snippet.
pub fn extract_keywords(job: &JobRecord) -> Vec<&'static str> {
    let text = format!("{} {}", job.title, job.snippet).to_lowercase();
    TERMS.iter().copied().filter(|t| text.contains(t)).collect()
}

/// Highlight bullets for the detected keywords, followed by the generic ones.
pub fn select_bullets(keywords: &[&str]) -> Vec<&'static str> {
    KEYED_BULLETS
        .iter()
        .filter(|(triggers, _)| triggers.iter().any(|t| keywords.contains(t)))
        .map(|(_, bullet)| *bullet)
        .chain(GENERIC_BULLETS.iter().copied())
        .collect()
}

/// Master resume followed by the per-job tailoring block.
pub fn build_text_resume(
    master: &str,
    job: &JobRecord,
    keywords: &[&str],
    generated_at: DateTime<Utc>,
) -> String {
    let mut lines = vec![
        master.trim().to_string(),
        "\n--- TAILORED FOR ---".to_string(),
        format!("Role: {}", job.title),
        format!("Company: {}", job.company),
        format!("Job Link: {}", job.link),
        format!("Match Score: {}", job.score().unwrap_or(0)),
    ];
    if !keywords.is_empty() {
        lines.push(format!("Matched Keywords: {}", keywords.join(", ")));
    }
    lines.push("\nTailored highlights:".to_string());
    lines.extend(select_bullets(keywords).into_iter().map(String::from));
    lines.push(format!(
        "\nGenerated: {} UTC",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    lines.join("\n")
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Filesystem-safe PDF name: `resume_<title>_<company>_<timestamp>_<link tag>.pdf`.
///
/// The tag keeps postings with the same title and company apart within one second.
pub fn resume_file_name(job: &JobRecord, generated_at: DateTime<Utc>) -> String {
    let title = truncate_chars(&job.title.trim().replace(' ', "_"), 40);
    let company = truncate_chars(&job.company.trim().replace(' ', "_"), 30);
    let stamp = generated_at.format("%Y%m%d%H%M%S");
    let tag = link_tag(&job.link);
    format!("resume_{title}_{company}_{stamp}_{tag}.pdf")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn link_tag(link: &str) -> String {
    let id = Uuid::new_v5(&Uuid::NAMESPACE_URL, link.as_bytes());
    id.simple().to_string().chars().take(8).collect()
}

/// A tailored resume ready to be rendered.
#[derive(Debug, Clone)]
pub struct TailoredResume {
    pub text: String,
    pub keywords: Vec<&'static str>,
    pub output_path: PathBuf,
}

/// Builds tailored resume text from a master resume.
#[derive(Debug, Clone)]
pub struct Tailor {
    master: String,
    output_dir: PathBuf,
}

impl Tailor {
    pub fn new(master: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            master: master.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn tailor(&self, job: &JobRecord, generated_at: DateTime<Utc>) -> TailoredResume {
        let keywords = extract_keywords(job);
        let text = build_text_resume(&self.master, job, &keywords, generated_at);
        let output_path = self.output_dir.join(resume_file_name(job, generated_at));
        TailoredResume {
            text,
            keywords,
            output_path,
        }
    }
}

/// Canned posting used to produce a verification PDF when a run emails nothing.
pub fn sample_job() -> JobRecord {
    let mut job = JobRecord::new(
        JobSource::CompanyPage,
        "Senior Azure Data Engineer (Test)",
        "TestCompany",
        "https://example.com/test-job",
    )
    .with_snippet("Azure Databricks Data Factory PySpark ETL SQL")
    .with_location("Hyderabad");
    // Fresh record, cannot already be scored.
    let _ = job.apply_score(crate::scoring::ScoreCard {
        total: 99,
        signals: vec!["sample".to_string()],
    });
    job
}
