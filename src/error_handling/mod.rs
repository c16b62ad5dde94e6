//! Error types and lookup-failure classification.

mod classify;
mod types;

// Re-export public API
pub use classify::{classify_lookup_error, classify_response_code};
pub use types::{ErrorCode, InitializationError, LookupError, WhoisError};
