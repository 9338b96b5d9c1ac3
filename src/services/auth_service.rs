//! Authentication service - registration, logins and token verification.
//!
//! Website users and staff accounts log in separately; both receive a
//! bearer token whose `kind` claim says which table the subject lives in.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, ROLE_USER, SECONDS_PER_HOUR, TEMPLATE_WELCOME, TOKEN_TYPE_BEARER};
use crate::domain::password::DUMMY_HASH;
use crate::domain::{required_name, NewUser, Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::mail::templates;
use crate::infra::{Email, Mailer, UnitOfWork};

/// Which kind of principal a token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    User,
    Account,
}

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub kind: PrincipalKind,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a website user and send the welcome mail
    async fn register(&self, new_user: NewUser) -> AppResult<User>;

    /// Log in a website user
    async fn login_user(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Log in a staff account
    async fn login_account(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

fn generate_token(
    id: Uuid,
    email: &str,
    role: &str,
    kind: PrincipalKind,
    config: &Config,
) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: id,
        email: email.to_string(),
        role: role.to_string(),
        kind,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Verify `password` against the stored hash, or against a dummy hash when
/// there is none so unknown emails take as long as wrong passwords.
pub(crate) fn credentials_match(stored_hash: Option<&str>, password: &str) -> bool {
    let valid = Password::from_hash(stored_hash.unwrap_or(DUMMY_HASH)).verify(password);
    stored_hash.is_some() && valid
}

pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    mailer: Mailer,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, mailer: Mailer, config: Config) -> Self {
        Self {
            uow,
            mailer,
            config,
        }
    }

    async fn send_welcome(&self, user: &User) {
        let vars = HashMap::from([
            ("name".to_string(), user.name.clone()),
            ("email".to_string(), user.email.clone()),
        ]);

        let result = match templates::render(TEMPLATE_WELCOME, &vars) {
            Ok(rendered) => self
                .mailer
                .send(&Email::from_rendered(&user.email, rendered))
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::warn!(user_id = %user.id, error = %e, "Welcome mail not sent");
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, new_user: NewUser) -> AppResult<User> {
        let email = new_user.email.trim().to_lowercase();
        let name = required_name(&new_user.name)?;

        if let Some(tag) = &new_user.category {
            let known = self.uow.categories().find_by_tag(tag).await?;
            if !known.map(|c| c.active).unwrap_or(false) {
                return Err(AppError::validation(format!("Unknown category: {}", tag)));
            }
        }

        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&new_user.password)?.into_string();
        let user = self
            .uow
            .users()
            .create(User::new(
                email,
                password_hash,
                name,
                new_user.category,
            ))
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        self.send_welcome(&user).await;

        Ok(user)
    }

    async fn login_user(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let email = email.trim().to_lowercase();
        let user = self.uow.users().find_by_email(&email).await?;

        if !credentials_match(user.as_ref().map(|u| u.password_hash.as_str()), &password) {
            return Err(AppError::InvalidCredentials);
        }
        let user = user.ok_or(AppError::InvalidCredentials)?;

        self.uow.users().record_login(user.id).await?;
        generate_token(user.id, &user.email, ROLE_USER, PrincipalKind::User, &self.config)
    }

    async fn login_account(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let email = email.trim().to_lowercase();
        let account = self.uow.accounts().find_by_email(&email).await?;

        if !credentials_match(account.as_ref().map(|a| a.password_hash.as_str()), &password) {
            return Err(AppError::InvalidCredentials);
        }
        let account = account.ok_or(AppError::InvalidCredentials)?;

        self.uow.accounts().record_login(account.id).await?;
        tracing::info!(account_id = %account.id, role = %account.role, "Account logged in");

        generate_token(
            account.id,
            &account.email,
            account.role.as_str(),
            PrincipalKind::Account,
            &self.config,
        )
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}
