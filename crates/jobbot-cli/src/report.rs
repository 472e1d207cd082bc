use std::path::Path;

use anyhow::{Context, Result};
use jobbot_core::pipeline::JobOutcome;
use serde::Serialize;

/// One CSV row per scored job.
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    source: &'a str,
    title: &'a str,
    company: &'a str,
    link: &'a str,
    score: Option<i64>,
    signals: String,
    decision: String,
}

impl<'a> From<&'a JobOutcome> for ReportRow<'a> {
    fn from(outcome: &'a JobOutcome) -> Self {
        let job = &outcome.job;
        Self {
            source: job.source.as_str(),
            title: &job.title,
            company: &job.company,
            link: &job.link,
            score: job.score(),
            signals: job.matched_signals().join(";"),
            decision: outcome.decision.label(),
        }
    }
}

pub fn write_report(path: &Path, outcomes: &[JobOutcome]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    for outcome in outcomes {
        writer.serialize(ReportRow::from(outcome))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobbot_core::gate::Rejection;
    use jobbot_core::models::{JobRecord, JobSource};
    use jobbot_core::pipeline::Decision;
    use jobbot_core::scoring::Scorer;
    use jobbot_core::Settings;

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");

        let mut job = JobRecord::new(
            JobSource::ListingSite,
            "Senior Data Engineer",
            "Acme, Inc.",
            "https://acme.io/jobs/1",
        );
        Scorer::from_settings(&Settings::default())
            .score(&mut job)
            .unwrap();
        let outcomes = vec![
            JobOutcome {
                job: job.clone(),
                decision: Decision::Emailed {
                    path: "out/r.pdf".into(),
                },
            },
            JobOutcome {
                job,
                decision: Decision::Rejected {
                    rejection: Rejection::NotRelevant,
                },
            },
        ];

        write_report(&path, &outcomes).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["source", "title", "company", "link", "score", "signals", "decision"]
        );
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "listing_site");
        assert_eq!(&rows[0][2], "Acme, Inc.");
        assert!(rows[0][5].contains("title:data engineer"));
        assert_eq!(&rows[0][6], "emailed");
        assert_eq!(&rows[1][6], "rejected: not azure+data");
    }
}
