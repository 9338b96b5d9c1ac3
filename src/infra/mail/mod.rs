//! Outgoing mail.
//!
//! A [`Mailer`] owns an ordered chain of transports. Each message is offered
//! to the first transport; when it fails the next one is tried, and the send
//! only fails when every transport did.

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::{AppError, AppResult};

mod smtp;
pub mod templates;

pub use smtp::{LogTransport, SmtpTransport};
pub use templates::{EmailTemplate, RenderedEmail};

/// A plain text message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub reply_to: Option<String>,
}

impl Email {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            reply_to: None,
        }
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Build from a rendered template.
    pub fn from_rendered(to: impl Into<String>, rendered: RenderedEmail) -> Self {
        Self::new(to, rendered.subject, rendered.body)
    }
}

/// Something that can deliver an [`Email`]
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Name used in logs
    fn name(&self) -> String;

    async fn send(&self, email: &Email) -> AppResult<()>;
}

/// Sends mail through the first transport that accepts it.
#[derive(Clone)]
pub struct Mailer {
    transports: Vec<Arc<dyn MailTransport>>,
}

impl Mailer {
    pub fn new(transports: Vec<Arc<dyn MailTransport>>) -> Self {
        Self { transports }
    }

    /// One SMTP transport per configured relay, or a logging transport when
    /// no relay is configured.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let mut transports: Vec<Arc<dyn MailTransport>> = Vec::new();
        for relay in &config.smtp_relays {
            transports.push(Arc::new(SmtpTransport::new(relay, &config.mail_from)?));
        }

        if transports.is_empty() {
            tracing::warn!("No SMTP relay configured - mail will be logged instead of sent");
            transports.push(Arc::new(LogTransport::new(&config.mail_from)));
        }

        Ok(Self::new(transports))
    }

    pub fn transport_names(&self) -> Vec<String> {
        self.transports.iter().map(|t| t.name()).collect()
    }

    /// Deliver `email`, returning the name of the transport that took it.
    pub async fn send(&self, email: &Email) -> AppResult<String> {
        let mut last_error = None;

        for transport in &self.transports {
            match transport.send(email).await {
                Ok(()) => {
                    tracing::info!(
                        transport = %transport.name(),
                        to = %email.to,
                        subject = %email.subject,
                        "Mail sent"
                    );
                    return Ok(transport.name());
                }
                Err(e) => {
                    tracing::warn!(
                        transport = %transport.name(),
                        to = %email.to,
                        error = %e,
                        "Mail transport failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        tracing::error!(to = %email.to, "All mail transports failed");
        Err(match last_error {
            Some(e) => AppError::mail(format!("All mail transports failed: {}", e)),
            None => AppError::mail("No mail transport configured"),
        })
    }
}
