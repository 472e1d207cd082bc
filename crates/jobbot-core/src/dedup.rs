use std::collections::HashSet;

use crate::models::JobRecord;

/// Drop records whose (title, company, link) identity was already seen.
///
/// The first occurrence wins and input order is preserved, so running this
/// on its own output is a no-op.
pub fn deduplicate(jobs: Vec<JobRecord>) -> Vec<JobRecord> {
    let mut seen = HashSet::new();
    jobs.into_iter()
        .filter(|job| seen.insert(job.dedup_key()))
        .collect()
}
