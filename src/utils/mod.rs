//! Shared helpers: JSON/BSON conversion and the execution trace sink.
pub mod devlog;
pub mod json;
