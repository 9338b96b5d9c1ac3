//! Domain layer - Core business entities and logic
//!
//! Plain data types and the rules that do not need any infrastructure:
//! password hashing, category validation, price series merging and
//! wallet valuation.

pub mod account;
pub mod category;
pub mod password;
pub mod portfolio;
pub mod price;
pub mod submission;
pub mod user;

pub use account::{Account, AccountResponse, AccountRole, NewAccount};
pub use category::{Category, CategoryChanges, FieldKind, FormField, NewCategory};
pub use password::Password;
pub use portfolio::{Portfolio, WalletValue};
pub use price::{PriceHistory, PricePoint, UpsertOutcome};
pub use submission::{ClientInfo, FormSubmission};
pub use user::{NewUser, User, UserResponse};

use crate::errors::{AppError, AppResult};

/// Trimmed display name of a user, account or category. Blank names are rejected.
pub fn required_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    Ok(name.to_string())
}
