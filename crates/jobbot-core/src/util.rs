use std::path::Path;

use crate::error::AppError;

/// Read the company careers-page list.
///
/// One URL per line; blank lines and `#` comments are ignored.
/// A missing file yields an empty list.
pub fn load_company_pages(path: &Path) -> Result<Vec<String>, AppError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Company list not found, skipping company pages");
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(parse_company_pages(&raw))
}

pub fn parse_company_pages(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// SMTP login taken from `SMTP_USER` / `SMTP_PASS`.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub user: String,
    pub pass: String,
}

impl std::fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("user", &self.user)
            .field("pass", &"***")
            .finish()
    }
}

impl SmtpCredentials {
    pub const USER_VAR: &'static str = "SMTP_USER";
    pub const PASS_VAR: &'static str = "SMTP_PASS";

    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Both values must be present and non-empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        match (get(Self::USER_VAR), get(Self::PASS_VAR)) {
            (Some(user), Some(pass)) => Ok(Self { user, pass }),
            _ => Err(AppError::MissingCredentials(format!(
                "{} and {} must be set in the environment",
                Self::USER_VAR,
                Self::PASS_VAR
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_company_pages() {
        let raw = "# careers\nhttps://a.io/careers\n\n   https://b.io/jobs  \n#https://c.io\n";
        assert_eq!(
            parse_company_pages(raw),
            vec!["https://a.io/careers", "https://b.io/jobs"]
        );
    }

    #[test]
    fn test_missing_company_list_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pages = load_company_pages(&dir.path().join("nope.txt")).unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn test_load_company_pages_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companies.txt");
        std::fs::write(&path, "https://a.io/careers\n").unwrap();
        assert_eq!(load_company_pages(&path).unwrap(), vec!["https://a.io/careers"]);
    }

    #[test]
    fn test_credentials_present() {
        let creds =
            SmtpCredentials::from_lookup(lookup(&[("SMTP_USER", "bot@x.io"), ("SMTP_PASS", "pw")]))
                .unwrap();
        assert_eq!(creds.user, "bot@x.io");
        assert_eq!(creds.pass, "pw");
        assert!(!format!("{creds:?}").contains("pw\""));
    }

    #[test]
    fn test_credentials_missing_or_blank() {
        let err = SmtpCredentials::from_lookup(lookup(&[("SMTP_USER", "bot@x.io")])).unwrap_err();
        assert!(matches!(err, AppError::MissingCredentials(_)));

        let err = SmtpCredentials::from_lookup(lookup(&[("SMTP_USER", " "), ("SMTP_PASS", "pw")]))
            .unwrap_err();
        assert!(matches!(err, AppError::MissingCredentials(_)));
    }
}
