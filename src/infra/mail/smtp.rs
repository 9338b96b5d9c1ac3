//! Mail transports: SMTP relays via lettre and a logging stand-in.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{Email, MailTransport};
use crate::config::{SmtpSettings, SMTP_IMPLICIT_TLS_PORT};
use crate::errors::{AppError, AppResult};

/// One authenticated SMTP relay
pub struct SmtpTransport {
    host: String,
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Port 465 uses implicit TLS, every other port STARTTLS.
    pub fn new(settings: &SmtpSettings, from: &str) -> AppResult<Self> {
        let from = parse_mailbox(from)?;

        let builder = if settings.port == SMTP_IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| AppError::internal(format!("Invalid SMTP relay {}: {}", settings.host, e)))?
        .port(settings.port);

        let builder = if settings.username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                settings.username.clone(),
                settings.password().to_string(),
            ))
        };

        Ok(Self {
            host: settings.host.clone(),
            from,
            transport: builder.build(),
        })
    }

    fn message(&self, email: &Email) -> AppResult<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN);

        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }

        builder
            .body(email.body.clone())
            .map_err(|e| AppError::mail(format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    fn name(&self) -> String {
        format!("smtp:{}", self.host)
    }

    async fn send(&self, email: &Email) -> AppResult<()> {
        let message = self.message(email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::mail(format!("{}: {}", self.host, e)))?;
        Ok(())
    }
}

/// Writes the message to the log instead of sending it
pub struct LogTransport {
    from: String,
}

impl LogTransport {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl MailTransport for LogTransport {
    fn name(&self) -> String {
        "log".to_string()
    }

    async fn send(&self, email: &Email) -> AppResult<()> {
        tracing::info!(
            "=== EMAIL (not sent) ===\n\
             From: {}\n\
             To: {}\n\
             Subject: {}\n\
             Body:\n{}\n\
             ========================",
            self.from,
            email.to,
            email.subject,
            email.body
        );
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> AppResult<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| AppError::validation(format!("Invalid email address '{}': {}", address, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relay(port: u16) -> SmtpSettings {
        SmtpSettings::new("smtp.example.com", port, "mailer", "secret")
    }

    #[tokio::test]
    async fn test_smtp_transport_builds_for_both_tls_modes() {
        for port in [587, 465] {
            let transport = SmtpTransport::new(&relay(port), "BitBeheer <noreply@bitbeheer.nl>")
                .unwrap();
            assert_eq!(transport.name(), "smtp:smtp.example.com");
        }
    }

    #[test]
    fn test_invalid_sender_is_rejected() {
        assert!(SmtpTransport::new(&relay(587), "not an address").is_err());
    }

    #[tokio::test]
    async fn test_message_carries_reply_to() {
        let transport = SmtpTransport::new(&relay(587), "noreply@bitbeheer.nl").unwrap();
        let email = Email::new("info@bitbeheer.nl", "Contact", "Hallo")
            .with_reply_to("klant@example.com");

        let formatted = String::from_utf8(transport.message(&email).unwrap().formatted()).unwrap();
        assert!(formatted.contains("Reply-To: klant@example.com"));
        assert!(formatted.contains("Subject: Contact"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_fails_before_sending() {
        let transport = SmtpTransport::new(&relay(587), "noreply@bitbeheer.nl").unwrap();
        let err = transport
            .send(&Email::new("nope", "Subject", "Body"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_log_transport_always_succeeds() {
        let transport = LogTransport::new("noreply@bitbeheer.nl");
        assert!(transport.send(&Email::new("a@b.nl", "s", "b")).await.is_ok());
        assert_eq!(transport.name(), "log");
    }
}
