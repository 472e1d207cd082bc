use jobbot_core::config::SmtpSettings;
use jobbot_core::error::AppError;
use jobbot_core::mail::OutgoingEmail;
use jobbot_core::traits::Mailer;
use jobbot_core::util::SmtpCredentials;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

fn email_err(e: impl std::fmt::Display) -> AppError {
    AppError::EmailError(e.to_string())
}

/// SMTP delivery over implicit TLS.
///
/// lettre's transport is blocking; each send runs on tokio's blocking pool.
#[derive(Clone)]
pub struct SmtpMailer {
    smtp: SmtpSettings,
    credentials: SmtpCredentials,
    sender_name: String,
}

impl SmtpMailer {
    pub fn new(
        smtp: SmtpSettings,
        credentials: SmtpCredentials,
        sender_name: impl Into<String>,
    ) -> Self {
        Self {
            smtp,
            credentials,
            sender_name: sender_name.into(),
        }
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, AppError> {
        let from = Mailbox::new(
            Some(self.sender_name.clone()),
            self.credentials.user.parse().map_err(email_err)?,
        );
        let to: Mailbox = email.to.parse().map_err(email_err)?;

        let mut body = MultiPart::mixed().singlepart(SinglePart::plain(email.body.clone()));
        for path in &email.attachments {
            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping unreadable attachment"
                    );
                    continue;
                }
            };
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "resume.pdf".to_string());
            let content_type = ContentType::parse("application/pdf").map_err(email_err)?;
            body = body.singlepart(Attachment::new(name).body(bytes, content_type));
        }

        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.clone())
            .multipart(body)
            .map_err(email_err)
    }

    fn transport(&self) -> Result<SmtpTransport, AppError> {
        let credentials =
            Credentials::new(self.credentials.user.clone(), self.credentials.pass.clone());
        Ok(SmtpTransport::relay(&self.smtp.host)
            .map_err(email_err)?
            .port(self.smtp.port)
            .credentials(credentials)
            .build())
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        let message = self.build_message(email)?;
        let transport = self.transport()?;
        let to = email.to.clone();

        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| AppError::EmailError(format!("Send task failed: {e}")))?
            .map_err(email_err)?;

        tracing::debug!(%to, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn mailer() -> SmtpMailer {
        SmtpMailer::new(
            SmtpSettings::default(),
            SmtpCredentials {
                user: "bot@example.com".into(),
                pass: "secret".into(),
            },
            "JobBot",
        )
    }

    fn email(attachments: Vec<PathBuf>) -> OutgoingEmail {
        OutgoingEmail {
            to: "me@example.com".into(),
            subject: "[JobBot] Data Engineer @ Acme  Score:42".into(),
            body: "Role: Data Engineer".into(),
            attachments,
        }
    }

    #[test]
    fn test_message_with_pdf_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("resume_Data_Engineer.pdf");
        std::fs::write(&pdf, b"%PDF-1.5 test").unwrap();

        let message = mailer().build_message(&email(vec![pdf])).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(
            raw.contains("From: JobBot <bot@example.com>")
                || raw.contains("From: \"JobBot\" <bot@example.com>")
        );
        assert!(raw.contains("To: me@example.com"));
        assert!(raw.contains("Subject: [JobBot] Data Engineer @ Acme"));
        assert!(raw.contains("Content-Type: application/pdf"));
        assert!(raw.contains("filename=\"resume_Data_Engineer.pdf\""));
        assert!(raw.contains("Role: Data Engineer"));
    }

    #[test]
    fn test_unreadable_attachment_is_skipped() {
        let message = mailer()
            .build_message(&email(vec![PathBuf::from("/nonexistent/resume.pdf")]))
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(!raw.contains("application/pdf"));
        assert!(raw.contains("Role: Data Engineer"));
    }

    #[test]
    fn test_invalid_recipient_is_email_error() {
        let mut bad = email(vec![]);
        bad.to = "not an address".into();
        let err = mailer().build_message(&bad).unwrap_err();
        assert!(matches!(err, AppError::EmailError(_)));
    }
}
