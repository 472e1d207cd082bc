use std::path::PathBuf;

use crate::models::JobRecord;

/// A message ready for a [`Mailer`](crate::traits::Mailer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<PathBuf>,
}

pub fn job_subject(job: &JobRecord) -> String {
    format!(
        "[JobBot] {} @ {}  Score:{}",
        job.title,
        job.company,
        job.score().unwrap_or(0)
    )
}

pub fn job_body(job: &JobRecord, text_resume: &str) -> String {
    format!(
        "Role: {}\nCompany: {}\nLink: {}\n\nMatch Score: {}\n\nTailored Resume (text summary):\n\n{}\n",
        job.title,
        job.company,
        job.link,
        job.score().unwrap_or(0),
        text_resume
    )
}

/// Result email for one qualifying job.
pub fn compose_job_email(
    job: &JobRecord,
    text_resume: &str,
    to: &str,
    attachment: PathBuf,
) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: job_subject(job),
        body: job_body(job, text_resume),
        attachments: vec![attachment],
    }
}
