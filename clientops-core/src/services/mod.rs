//! Service layer - operator use cases
//!
//! Each service borrows a store handle for one operation; none of them
//! keeps a connection between calls.

pub mod credentials;
pub mod hashing;
mod inspect;
pub mod logging;
pub mod login_check;
mod report;
pub mod row_migration;

pub use credentials::{CredentialVerifier, VerifyOutcome};
pub use hashing::PasswordHashing;
pub use inspect::SchemaInspector;
pub use logging::{LogEntry, LogEvent, LogFilter, LogStats, LoggingService, Outcome};
pub use login_check::{LoginCheck, LoginCheckResult};
pub use report::ReportService;
pub use row_migration::{MigrationReport, RowMigrator};
