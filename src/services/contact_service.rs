//! Contact service - public contact form.
//!
//! A submission is rate limited per client IP, logged, routed to the
//! category mailbox (or the general contact address) and confirmed to the
//! sender.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, TEMPLATE_CONTACT_CONFIRMATION, TEMPLATE_CONTACT_NOTIFICATION};
use crate::domain::{Category, ClientInfo, FormSubmission};
use crate::errors::{AppError, AppResult};
use crate::infra::mail::templates;
use crate::infra::{Email, Mailer, RateLimitStore, UnitOfWork};

/// Form identifier stored with each submission
pub const CONTACT_FORM: &str = "contact";

/// A message posted through the contact form
#[derive(Debug, Clone, Default)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    /// Category tag
    pub category: Option<String>,
    /// Values of the category's extra form fields
    pub fields: HashMap<String, String>,
}

/// What happened to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactReceipt {
    /// Mailbox the notification went to
    pub notified: String,
    pub confirmation_sent: bool,
}

#[async_trait]
pub trait ContactService: Send + Sync {
    async fn submit(&self, message: ContactMessage, client: ClientInfo) -> AppResult<ContactReceipt>;
}

pub struct ContactDesk<U: UnitOfWork> {
    uow: Arc<U>,
    mailer: Mailer,
    rate_limits: Arc<dyn RateLimitStore>,
    config: Config,
}

impl<U: UnitOfWork> ContactDesk<U> {
    pub fn new(
        uow: Arc<U>,
        mailer: Mailer,
        rate_limits: Arc<dyn RateLimitStore>,
        config: Config,
    ) -> Self {
        Self {
            uow,
            mailer,
            rate_limits,
            config,
        }
    }

    async fn check_rate_limit(&self, client: &ClientInfo) -> AppResult<()> {
        let decision = self
            .rate_limits
            .hit(
                &format!("{}:{}", CONTACT_FORM, client.ip),
                self.config.rate_limit_requests,
                self.config.rate_limit_window_seconds,
            )
            .await?;

        if decision.allowed {
            Ok(())
        } else {
            tracing::warn!(client = %client.ip, count = decision.count, "Contact rate limit exceeded");
            Err(AppError::TooManyRequests {
                retry_after: decision.retry_after,
            })
        }
    }

    /// Active category for `tag`, if any. Unknown tags fall back to general contact.
    async fn resolve_category(&self, tag: Option<&str>) -> AppResult<Option<Category>> {
        let Some(tag) = tag.filter(|t| !t.trim().is_empty()) else {
            return Ok(None);
        };

        let category = self.uow.categories().find_by_tag(tag).await?;
        if category.is_none() {
            tracing::debug!(tag, "Contact form posted with unknown category");
        }
        Ok(category.filter(|c| c.active))
    }
}

fn validate(message: &ContactMessage) -> AppResult<()> {
    let mut missing = Vec::new();
    if message.name.trim().is_empty() {
        missing.push("name");
    }
    if message.email.trim().is_empty() {
        missing.push("email");
    }
    if message.message.trim().is_empty() {
        missing.push("message");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Extra fields as `label: value` lines, in form order for known fields.
fn format_fields(category: Option<&Category>, fields: &HashMap<String, String>) -> String {
    let mut lines = Vec::new();
    let mut rest: BTreeMap<&str, &str> = fields
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    if let Some(category) = category {
        for field in &category.form_fields {
            if let Some(value) = rest.remove(field.name.as_str()) {
                lines.push(format!("{}: {}", field.label, value));
            }
        }
    }
    lines.extend(rest.into_iter().map(|(k, v)| format!("{}: {}", k, v)));

    lines.join("\n")
}

#[async_trait]
impl<U: UnitOfWork> ContactService for ContactDesk<U> {
    async fn submit(&self, message: ContactMessage, client: ClientInfo) -> AppResult<ContactReceipt> {
        validate(&message)?;
        self.check_rate_limit(&client).await?;

        let category = self.resolve_category(message.category.as_deref()).await?;
        if let Some(category) = &category {
            let missing = category.missing_fields(&message.fields);
            if !missing.is_empty() {
                return Err(AppError::validation(format!(
                    "Missing required fields: {}",
                    missing.join(", ")
                )));
            }
        }

        if let Err(e) = self
            .uow
            .submissions()
            .record(FormSubmission::new(&client, CONTACT_FORM))
            .await
        {
            tracing::error!(error = %e, "Failed to log contact submission");
        }

        let recipient = category
            .as_ref()
            .and_then(|c| c.notification_target())
            .unwrap_or(&self.config.contact_email)
            .to_string();

        let vars = HashMap::from([
            ("name".to_string(), message.name.trim().to_string()),
            ("email".to_string(), message.email.trim().to_string()),
            ("message".to_string(), message.message.trim().to_string()),
            (
                "category".to_string(),
                category
                    .as_ref()
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| "Algemeen".to_string()),
            ),
            (
                "fields".to_string(),
                format_fields(category.as_ref(), &message.fields),
            ),
        ]);

        let notification = templates::render(TEMPLATE_CONTACT_NOTIFICATION, &vars)?;
        self.mailer
            .send(&Email::from_rendered(&recipient, notification).with_reply_to(message.email.trim()))
            .await?;

        let confirmation = templates::render(TEMPLATE_CONTACT_CONFIRMATION, &vars)?;
        let confirmation_sent = match self
            .mailer
            .send(&Email::from_rendered(message.email.trim(), confirmation))
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Contact confirmation not sent");
                false
            }
        };

        tracing::info!(
            client = %client.ip,
            category = ?category.as_ref().map(|c| c.tag.as_str()),
            "Contact request handled"
        );

        Ok(ContactReceipt {
            notified: recipient,
            confirmation_sent,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::domain::{FieldKind, FormField};
    use crate::infra::{
        CategoryRepository, MockCategoryRepository, MockMailTransport, MockRateLimitStore,
        MockSubmissionRepository, MockUnitOfWork, RateLimitDecision, SubmissionRepository,
    };

    fn allow_all() -> Arc<dyn RateLimitStore> {
        let mut store = MockRateLimitStore::new();
        store.expect_hit().returning(|_, limit, _| {
            Ok(RateLimitDecision {
                count: 1,
                allowed: true,
                remaining: limit - 1,
                retry_after: 0,
            })
        });
        Arc::new(store)
    }

    fn uow(category: Option<Category>) -> MockUnitOfWork {
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_by_tag()
            .returning(move |_| Ok(category.clone()));
        let categories: Arc<dyn CategoryRepository> = Arc::new(categories);

        let mut submissions = MockSubmissionRepository::new();
        submissions.expect_record().returning(|_| Ok(()));
        let submissions: Arc<dyn SubmissionRepository> = Arc::new(submissions);

        let mut uow = MockUnitOfWork::new();
        uow.expect_categories().returning(move || categories.clone());
        uow.expect_submissions().returning(move || submissions.clone());
        uow
    }

    /// Transport that records recipients and fails for the given addresses
    fn transport(fail_for: &'static [&'static str], sent: Arc<std::sync::Mutex<Vec<String>>>) -> Mailer {
        let mut transport = MockMailTransport::new();
        transport.expect_name().returning(|| "mock".to_string());
        transport.expect_send().returning(move |email| {
            if fail_for.contains(&email.to.as_str()) {
                return Err(AppError::mail("rejected"));
            }
            sent.lock().unwrap().push(email.to.clone());
            Ok(())
        });
        Mailer::new(vec![Arc::new(transport)])
    }

    fn desk(
        uow: MockUnitOfWork,
        mailer: Mailer,
        rate_limits: Arc<dyn RateLimitStore>,
    ) -> ContactDesk<MockUnitOfWork> {
        ContactDesk::new(
            Arc::new(uow),
            mailer,
            rate_limits,
            Config::with_secret("test-secret-key-that-is-long-enough"),
        )
    }

    fn message(category: Option<&str>) -> ContactMessage {
        ContactMessage {
            name: "Sanne de Vries".to_string(),
            email: "sanne@example.com".to_string(),
            message: "Ik wil graag advies over zelf bewaren.".to_string(),
            category: category.map(str::to_string),
            fields: HashMap::new(),
        }
    }

    fn client() -> ClientInfo {
        ClientInfo {
            ip: "203.0.113.7".to_string(),
            user_agent: Some("test".to_string()),
            fingerprint: Some("fp-1".to_string()),
        }
    }

    fn advies(required_budget: bool) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: "Advies".to_string(),
            tag: "advies".to_string(),
            active: true,
            notification_email: Some("advies@bitbeheer.nl".to_string()),
            form_fields: vec![FormField {
                name: "budget".to_string(),
                label: "Budget".to_string(),
                kind: FieldKind::Number,
                required: required_budget,
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_general_contact_goes_to_contact_email() {
        let sent = Arc::new(std::sync::Mutex::new(Vec::new()));
        let receipt = desk(uow(None), transport(&[], sent.clone()), allow_all())
            .submit(message(None), client())
            .await
            .unwrap();

        assert_eq!(receipt.notified, "info@bitbeheer.nl");
        assert!(receipt.confirmation_sent);
        assert_eq!(
            *sent.lock().unwrap(),
            vec!["info@bitbeheer.nl".to_string(), "sanne@example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_category_mailbox_receives_notification() {
        let sent = Arc::new(std::sync::Mutex::new(Vec::new()));
        let receipt = desk(uow(Some(advies(false))), transport(&[], sent), allow_all())
            .submit(message(Some("advies")), client())
            .await
            .unwrap();
        assert_eq!(receipt.notified, "advies@bitbeheer.nl");
    }

    #[tokio::test]
    async fn test_inactive_category_falls_back() {
        let mut category = advies(false);
        category.active = false;
        let sent = Arc::new(std::sync::Mutex::new(Vec::new()));

        let receipt = desk(uow(Some(category)), transport(&[], sent), allow_all())
            .submit(message(Some("advies")), client())
            .await
            .unwrap();
        assert_eq!(receipt.notified, "info@bitbeheer.nl");
    }

    #[tokio::test]
    async fn test_missing_required_category_field() {
        let sent = Arc::new(std::sync::Mutex::new(Vec::new()));
        let err = desk(uow(Some(advies(true))), transport(&[], sent.clone()), allow_all())
            .submit(message(Some("advies")), client())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(ref m) if m.contains("budget")));
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_base_fields_are_rejected_before_rate_limit() {
        let mut store = MockRateLimitStore::new();
        store.expect_hit().never();

        let mut input = message(None);
        input.email = " ".to_string();
        input.message = String::new();

        let sent = Arc::new(std::sync::Mutex::new(Vec::new()));
        let err = desk(MockUnitOfWork::new(), transport(&[], sent), Arc::new(store))
            .submit(input, client())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: email, message");
    }

    #[tokio::test]
    async fn test_rate_limited_submission() {
        let mut store = MockRateLimitStore::new();
        store
            .expect_hit()
            .withf(|key, _, _| key == "contact:203.0.113.7")
            .returning(|_, limit, _| {
                Ok(RateLimitDecision {
                    count: limit + 1,
                    allowed: false,
                    remaining: 0,
                    retry_after: 1200,
                })
            });

        let sent = Arc::new(std::sync::Mutex::new(Vec::new()));
        let err = desk(MockUnitOfWork::new(), transport(&[], sent), Arc::new(store))
            .submit(message(None), client())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TooManyRequests { retry_after: 1200 }));
    }

    #[tokio::test]
    async fn test_notification_failure_is_an_error() {
        let sent = Arc::new(std::sync::Mutex::new(Vec::new()));
        let err = desk(uow(None), transport(&["info@bitbeheer.nl"], sent), allow_all())
            .submit(message(None), client())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Mail(_)));
    }

    #[tokio::test]
    async fn test_confirmation_failure_is_tolerated() {
        let sent = Arc::new(std::sync::Mutex::new(Vec::new()));
        let receipt = desk(uow(None), transport(&["sanne@example.com"], sent), allow_all())
            .submit(message(None), client())
            .await
            .unwrap();
        assert!(!receipt.confirmation_sent);
    }

    #[test]
    fn test_format_fields_uses_labels_in_form_order() {
        let category = advies(false);
        let fields = HashMap::from([
            ("zz_extra".to_string(), "ja".to_string()),
            ("budget".to_string(), "25000".to_string()),
        ]);
        assert_eq!(
            format_fields(Some(&category), &fields),
            "Budget: 25000\nzz_extra: ja"
        );
    }

    #[tokio::test]
    async fn test_submission_is_logged_with_client_info() {
        let mut submissions = MockSubmissionRepository::new();
        submissions
            .expect_record()
            .withf(|s| s.ip == "203.0.113.7" && s.fingerprint.as_deref() == Some("fp-1") && s.form == "contact")
            .times(1)
            .returning(|_| Ok(()));
        let submissions: Arc<dyn SubmissionRepository> = Arc::new(submissions);

        let mut uow = MockUnitOfWork::new();
        uow.expect_submissions().returning(move || submissions.clone());

        let sent = Arc::new(std::sync::Mutex::new(Vec::new()));
        desk(uow, transport(&[], sent), allow_all())
            .submit(message(None), client())
            .await
            .unwrap();
    }
}
