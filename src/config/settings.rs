//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;

use super::constants::{
    DEFAULT_CONTACT_EMAIL, DEFAULT_DATABASE_URL, DEFAULT_EXPLORER_API_URL,
    DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_MAIL_FROM, DEFAULT_PRICE_API_URL, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, DEFAULT_SMTP_PORT, MIN_JWT_SECRET_LENGTH, RATE_LIMIT_REQUESTS,
    RATE_LIMIT_WINDOW_SECONDS,
};
use crate::errors::{AppError, AppResult};

const DEV_JWT_SECRET: &str = "dev-secret-key-minimum-32-chars!!";

/// Connection settings for one SMTP relay
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    password: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl SmtpSettings {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read `{prefix}_HOST`, `{prefix}_PORT`, `{prefix}_USER`, `{prefix}_PASS`.
    /// Returns `None` when the host is not set.
    fn from_lookup<F>(prefix: &str, lookup: &F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{}_{}", prefix, suffix));
        Some(Self {
            host: var("HOST")?,
            port: var("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            username: var("USER").unwrap_or_default(),
            password: var("PASS").unwrap_or_default(),
        })
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key).and_then(|v| v.parse().ok())
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    jwt_secret: Option<String>,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub mail_from: String,
    pub contact_email: String,
    /// Relays in the order they are tried
    pub smtp_relays: Vec<SmtpSettings>,
    pub price_api_url: String,
    pub explorer_api_url: String,
    pub rate_limit_requests: u64,
    pub rate_limit_window_seconds: u64,
    pub admin_email: Option<String>,
    admin_password: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &self.redis_url.as_ref().map(|_| "[REDACTED]"))
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("mail_from", &self.mail_from)
            .field("contact_email", &self.contact_email)
            .field("smtp_relays", &self.smtp_relays)
            .field("price_api_url", &self.price_api_url)
            .field("explorer_api_url", &self.explorer_api_url)
            .field("rate_limit_requests", &self.rate_limit_requests)
            .field("rate_limit_window_seconds", &self.rate_limit_window_seconds)
            .field("admin_email", &self.admin_email)
            .finish()
    }
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    ///
    /// A missing or short `JWT_SECRET` does not fail here; the server
    /// checks it with [`Config::require_jwt_secret`] before it starts.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok(), cfg!(debug_assertions))
    }

    /// Build the configuration from any key lookup. With `dev_secret` an
    /// unset `JWT_SECRET` falls back to an insecure development key.
    pub fn from_lookup<F>(lookup: F, dev_secret: bool) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET").or_else(|| {
            dev_secret.then(|| {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                DEV_JWT_SECRET.to_string()
            })
        });

        let smtp_relays = ["SMTP_PRIMARY", "SMTP_FALLBACK"]
            .iter()
            .filter_map(|prefix| SmtpSettings::from_lookup(prefix, &lookup))
            .collect();

        Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            redis_url: lookup("REDIS_URL").filter(|v| !v.is_empty()),
            jwt_secret,
            jwt_expiration_hours: parse_var(&lookup, "JWT_EXPIRATION_HOURS")
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_var(&lookup, "SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            mail_from: lookup("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            contact_email: lookup("CONTACT_EMAIL")
                .unwrap_or_else(|| DEFAULT_CONTACT_EMAIL.to_string()),
            smtp_relays,
            price_api_url: lookup("PRICE_API_URL")
                .unwrap_or_else(|| DEFAULT_PRICE_API_URL.to_string()),
            explorer_api_url: lookup("EXPLORER_API_URL")
                .unwrap_or_else(|| DEFAULT_EXPLORER_API_URL.to_string()),
            rate_limit_requests: parse_var(&lookup, "RATE_LIMIT_REQUESTS")
                .unwrap_or(RATE_LIMIT_REQUESTS),
            rate_limit_window_seconds: parse_var(&lookup, "RATE_LIMIT_WINDOW_SECONDS")
                .unwrap_or(RATE_LIMIT_WINDOW_SECONDS),
            admin_email: lookup("ADMIN_EMAIL"),
            admin_password: lookup("ADMIN_PASSWORD"),
        }
    }

    /// Fails unless a signing secret of at least `MIN_JWT_SECRET_LENGTH` is set.
    pub fn require_jwt_secret(&self) -> AppResult<()> {
        match self.jwt_secret.as_deref() {
            None => Err(AppError::config("JWT_SECRET must be set")),
            Some(secret) if secret.len() < MIN_JWT_SECRET_LENGTH => Err(AppError::config(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            ))),
            Some(_) => Ok(()),
        }
    }

    /// Configuration with defaults and the given secret. Used by tests and tooling.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: None,
            jwt_secret: Some(jwt_secret.into()),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            contact_email: DEFAULT_CONTACT_EMAIL.to_string(),
            smtp_relays: Vec::new(),
            price_api_url: DEFAULT_PRICE_API_URL.to_string(),
            explorer_api_url: DEFAULT_EXPLORER_API_URL.to_string(),
            rate_limit_requests: RATE_LIMIT_REQUESTS,
            rate_limit_window_seconds: RATE_LIMIT_WINDOW_SECONDS,
            admin_email: None,
            admin_password: None,
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_deref().unwrap_or_default().as_bytes()
    }

    /// Bootstrap admin credentials, if both are configured.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = Config::with_secret("a-very-long-secret-for-testing-purposes");
        config
            .smtp_relays
            .push(SmtpSettings::new("smtp.example.com", 587, "mailer", "hunter22"));

        let output = format!("{:?}", config);
        assert!(!output.contains("a-very-long-secret"));
        assert!(!output.contains("hunter22"));
        assert!(output.contains("smtp.example.com"));
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_loads_without_jwt_secret() {
        let config = Config::from_lookup(
            lookup(&[("PRICE_API_URL", "http://prices.test"), ("SERVER_PORT", "8080")]),
            false,
        );
        assert_eq!(config.price_api_url, "http://prices.test");
        assert_eq!(config.server_port, 8080);
        assert!(matches!(config.require_jwt_secret(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_short_jwt_secret_is_rejected_by_serve_check() {
        let config = Config::from_lookup(lookup(&[("JWT_SECRET", "short")]), false);
        assert!(config.require_jwt_secret().is_err());

        let config = Config::from_lookup(
            lookup(&[("JWT_SECRET", "a-very-long-secret-for-testing-purposes")]),
            false,
        );
        assert!(config.require_jwt_secret().is_ok());
    }

    #[test]
    fn test_dev_secret_fallback() {
        let config = Config::from_lookup(lookup(&[]), true);
        assert!(config.require_jwt_secret().is_ok());
    }

    #[test]
    fn test_smtp_relays_in_order() {
        let config = Config::from_lookup(
            lookup(&[
                ("SMTP_FALLBACK_HOST", "smtp.backup.nl"),
                ("SMTP_PRIMARY_HOST", "smtp.main.nl"),
                ("SMTP_PRIMARY_PORT", "2525"),
                ("SMTP_PRIMARY_PASS", "geheim"),
            ]),
            false,
        );
        let hosts: Vec<_> = config.smtp_relays.iter().map(|r| r.host.as_str()).collect();
        assert_eq!(hosts, ["smtp.main.nl", "smtp.backup.nl"]);
        assert_eq!(config.smtp_relays[0].port, 2525);
        assert_eq!(config.smtp_relays[0].password(), "geheim");
        assert_eq!(config.smtp_relays[1].port, DEFAULT_SMTP_PORT);
    }

    #[test]
    fn test_admin_credentials_require_both_values() {
        let mut config = Config::with_secret("a-very-long-secret-for-testing-purposes");
        config.admin_email = Some("admin@bitbeheer.nl".to_string());
        assert!(config.admin_credentials().is_none());

        config.admin_password = Some("changeme123".to_string());
        assert_eq!(
            config.admin_credentials(),
            Some(("admin@bitbeheer.nl", "changeme123"))
        );
    }
}
