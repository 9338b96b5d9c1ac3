//! OpenAPI documentation configuration.
//!
//! Served through Swagger UI at `/swagger-ui`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    account_handler, category_handler, contact_handler, portfolio_handler, rate_limit_handler,
    template_handler, user_handler,
};
use crate::domain::{
    AccountResponse, AccountRole, Category, FieldKind, FormField, Portfolio, UserResponse,
    WalletValue,
};
use crate::services::{PrincipalKind, TokenResponse};
use crate::types::PaginationMeta;

/// OpenAPI documentation for the BitBeheer API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "BitBeheer API",
        version = "0.1.0",
        description = "Website backend: accounts, service categories, contact mail and wallet valuation",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "BitBeheer", email = "info@bitbeheer.nl")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        user_handler::register,
        user_handler::login,
        user_handler::get_current_user,
        user_handler::list_users,
        user_handler::delete_user,
        account_handler::login,
        account_handler::get_current_account,
        account_handler::list_accounts,
        account_handler::create_account,
        category_handler::list_categories,
        category_handler::get_category,
        category_handler::create_category,
        category_handler::update_category,
        category_handler::delete_category,
        template_handler::list_templates,
        template_handler::get_template,
        template_handler::preview_template,
        contact_handler::submit_contact,
        rate_limit_handler::check_rate_limit,
        portfolio_handler::get_portfolio,
    ),
    components(
        schemas(
            UserResponse,
            AccountRole,
            AccountResponse,
            FieldKind,
            FormField,
            Category,
            WalletValue,
            Portfolio,
            PrincipalKind,
            TokenResponse,
            PaginationMeta,
            user_handler::RegisterRequest,
            user_handler::LoginRequest,
            user_handler::UserListResponse,
            account_handler::CreateAccountRequest,
            category_handler::CreateCategoryRequest,
            category_handler::UpdateCategoryRequest,
            template_handler::TemplateSummary,
            template_handler::TemplateResponse,
            template_handler::PreviewRequest,
            template_handler::PreviewResponse,
            contact_handler::ContactRequest,
            contact_handler::ContactResponse,
            rate_limit_handler::RateLimitRequest,
            rate_limit_handler::RateLimitResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Website user registration, login and management"),
        (name = "Accounts", description = "Staff accounts"),
        (name = "Categories", description = "Service categories and their contact forms"),
        (name = "Email templates", description = "Built-in email texts"),
        (name = "Contact", description = "Public contact form"),
        (name = "Rate limit", description = "Form submission budget"),
        (name = "Portfolio", description = "Wallet valuation")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "JWT from /api/users/login or /api/accounts/login",
                        ))
                        .build(),
                ),
            );
        }
    }
}
