//! Resolves, binds and dispatches named and stored queries.
mod core;
mod info;

pub use self::core::QueryExecutor;
pub use info::ServiceStatus;
