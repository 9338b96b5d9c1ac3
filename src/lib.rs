//! BitBeheer - Website backend and price tooling
//!
//! REST API for the BitBeheer website: user and staff accounts, service
//! categories with dynamic contact forms, contact mail with SMTP fallback,
//! form rate limiting and Bitcoin wallet valuation. The `prices` command
//! maintains historical price CSV files.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and logic
//! - **services**: Application use cases
//! - **infra**: Database, Redis, SMTP and outbound HTTP
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! bitbeheer serve
//! bitbeheer migrate up
//! bitbeheer prices upsert --file eur.csv --date 2024-01-01 --price 38512,34
//! bitbeheer prices merge --output all.csv a.csv b.csv
//! bitbeheer prices fetch-daily --file eur.csv --currency eur
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

pub use api::AppState;
pub use config::Config;
pub use domain::{Account, Category, Password, User};
pub use errors::{AppError, AppResult};
