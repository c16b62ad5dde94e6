//! Lookup-failure classification.
//!
//! Maps raw resolver failures onto the closed [`ErrorCode`] taxonomy.
//! Structured error information from the resolver is consulted first;
//! message substrings are only a fallback for transports that surface
//! free-form errors.

use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;

use super::types::{ErrorCode, LookupError};

/// Classifies a raw lookup failure into its stable error code.
pub fn classify_lookup_error(err: &LookupError) -> ErrorCode {
    match err {
        LookupError::Timeout => ErrorCode::Timeout,
        LookupError::Cancelled => ErrorCode::LookupFailed,
        LookupError::Resolve(e) => classify_resolve_error(e),
        LookupError::Other(msg) => classify_message(msg),
    }
}

/// Classifies a DNS response code observed on a failed lookup.
pub fn classify_response_code(code: ResponseCode) -> ErrorCode {
    match code {
        ResponseCode::NXDomain => ErrorCode::NxDomain,
        ResponseCode::ServFail => ErrorCode::ServFail,
        ResponseCode::Refused => ErrorCode::Refused,
        // An upstream answered cleanly but had nothing for us.
        _ => ErrorCode::NoRecords,
    }
}

fn classify_resolve_error(err: &ResolveError) -> ErrorCode {
    match err.kind() {
        ResolveErrorKind::Timeout => ErrorCode::Timeout,
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            classify_response_code(*response_code)
        }
        _ => classify_message(&err.to_string()),
    }
}

fn classify_message(msg: &str) -> ErrorCode {
    let msg = msg.to_lowercase();
    if msg.contains("no such host") {
        ErrorCode::NxDomain
    } else if msg.contains("server misbehaving") {
        ErrorCode::ServFail
    } else if msg.contains("refused") {
        ErrorCode::Refused
    } else if msg.contains("i/o timeout") {
        ErrorCode::Timeout
    } else {
        ErrorCode::LookupFailed
    }
}
