//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod account;
pub mod category;
pub mod form_submission;
pub mod user;
