//! Profile persistence.

pub mod libsql_store;
pub mod traits;

pub use libsql_store::LibSqlStore;
pub use traits::{Profile, ProfileStore, UserId};
