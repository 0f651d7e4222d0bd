//! Core domain entities
//!
//! Plain data structures with validation logic - no I/O.

mod catalog;
pub mod hashing;
pub mod mapping;
pub mod result;
mod user;
mod value;

pub use catalog::{ColumnInfo, TableInfo};
pub use hashing::{Argon2Params, HashScheme, HashingConfig};
pub use mapping::ColumnMapping;
pub use user::{ClientSummary, UserClientRow, UserClients, UserSummary};
pub use value::{FieldValue, Row};
