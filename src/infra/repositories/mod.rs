//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod account_repository;
mod category_repository;
pub(crate) mod entities;
mod submission_repository;
mod user_repository;

pub use account_repository::{AccountRepository, AccountStore};
pub use category_repository::{CategoryRepository, CategoryStore};
pub use submission_repository::{SubmissionRepository, SubmissionStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(test)]
pub use account_repository::MockAccountRepository;
#[cfg(test)]
pub use category_repository::MockCategoryRepository;
#[cfg(test)]
pub use submission_repository::MockSubmissionRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
