//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Rate limit counters (Redis or in-memory)
//! - SMTP mail with fallback relays
//! - Price index and blockchain explorer clients

pub mod db;
pub mod mail;
pub mod market;
pub mod rate_limit;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use mail::{Email, LogTransport, MailTransport, Mailer, SmtpTransport};
pub use market::{ExplorerClient, HttpExplorerClient, HttpPriceSource, PriceSource};
pub use rate_limit::{
    MemoryRateLimitStore, RateLimitDecision, RateLimitStore, RedisRateLimitStore,
};
pub use repositories::{
    AccountRepository, AccountStore, CategoryRepository, CategoryStore, SubmissionRepository,
    SubmissionStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(test)]
pub use market::{MockExplorerClient, MockPriceSource};
#[cfg(test)]
pub use mail::MockMailTransport;
#[cfg(test)]
pub use rate_limit::MockRateLimitStore;
#[cfg(test)]
pub use repositories::{
    MockAccountRepository, MockCategoryRepository, MockSubmissionRepository, MockUserRepository,
};
#[cfg(test)]
pub use unit_of_work::MockUnitOfWork;
