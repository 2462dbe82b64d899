//! Repositories for database operations

pub mod account;
pub mod analytics;
pub mod profile;

// Re-export for convenience
pub use account::AccountRepository;
pub use analytics::AnalyticsRepository;
pub use profile::ProfileRepository;
