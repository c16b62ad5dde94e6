//! Error type definitions.

use std::fmt;
use std::time::Duration;

use hickory_resolver::error::ResolveError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed classification of lookup failures, visible to API consumers.
///
/// The serialized form of each variant is stable; callers match on these
/// exact strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The lookup exceeded its time budget.
    #[serde(rename = "timeout")]
    Timeout,
    /// The queried name does not exist.
    #[serde(rename = "nxdomain")]
    NxDomain,
    /// The upstream failed to process the query.
    #[serde(rename = "servfail")]
    ServFail,
    /// The upstream refused the query.
    #[serde(rename = "refused")]
    Refused,
    /// The name exists but returned no usable addresses.
    #[serde(rename = "no_records")]
    NoRecords,
    /// Anything else: transport failures, malformed input, cancellation.
    #[serde(rename = "lookup_failed")]
    LookupFailed,
}

impl ErrorCode {
    /// The stable wire representation of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Timeout => "timeout",
            ErrorCode::NxDomain => "nxdomain",
            ErrorCode::ServFail => "servfail",
            ErrorCode::Refused => "refused",
            ErrorCode::NoRecords => "no_records",
            ErrorCode::LookupFailed => "lookup_failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw forward-lookup failure, before classification.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The per-host time budget elapsed before an answer arrived.
    #[error("lookup timed out")]
    Timeout,

    /// The batch was cancelled while this lookup was in flight.
    #[error("lookup cancelled")]
    Cancelled,

    /// The underlying resolver reported a failure.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A failure described only by a message (used by test doubles and
    /// transports without structured errors).
    #[error("{0}")]
    Other(String),
}

/// Failures while building long-lived resources at startup.
#[derive(Debug, Error)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("logger initialization error: {0}")]
    Logger(#[from] log::SetLoggerError),

    /// A configured DNS upstream did not parse as `host:port`.
    #[error("invalid DNS upstream {0:?}: {1}")]
    Upstream(String, std::net::AddrParseError),

    /// No DNS upstreams were configured.
    #[error("no DNS servers configured")]
    NoUpstreams,
}

/// Failures of the external WHOIS helper tool.
#[derive(Debug, Error)]
pub enum WhoisError {
    /// No tool path was configured.
    #[error("whois tool path is empty")]
    EmptyToolPath,

    /// The tool path failed validation.
    #[error("invalid tool path: {0}")]
    ToolPath(String),

    /// The interpreter path failed validation.
    #[error("invalid python path: {0}")]
    PythonPath(String),

    /// The helper exited unsuccessfully without usable output.
    #[error("whois tool failed: {0}")]
    ToolFailed(String),

    /// The helper produced no output at all.
    #[error("whois tool output was empty")]
    EmptyOutput,

    /// The helper's stdout was not the expected JSON document.
    #[error("whois tool output parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The helper outlived its deadline and was killed.
    #[error("whois tool timed out after {0:?}")]
    Timeout(Duration),

    /// The helper process could not be started.
    #[error("failed to run whois tool: {0}")]
    Spawn(#[from] std::io::Error),
}
