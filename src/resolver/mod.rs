//! Forward DNS resolution.
//!
//! The engine talks to upstream DNS servers through the [`Resolve`] trait so
//! the batch orchestrator can be exercised against test doubles. The
//! production implementation is [`RoundRobinResolver`], which rotates across
//! the configured upstreams.

mod round_robin;

// Re-export public API
pub use round_robin::RoundRobinResolver;

use std::net::IpAddr;

use async_trait::async_trait;

use crate::config::{DEFAULT_DNS_PORT, DEFAULT_DNS_SERVERS};
use crate::error_handling::LookupError;

/// Outcome of one forward lookup.
///
/// `server` names the upstream that handled the query, also on failures
/// where the query was actually dispatched; it stays `None` when no upstream
/// was ever contacted. `addrs` preserves wire order.
#[derive(Debug, Default)]
pub struct LookupOutcome {
    /// Resolved addresses in wire order
    pub addrs: Vec<IpAddr>,
    /// `host:port` of the upstream that served the answer
    pub server: Option<String>,
    /// Raw failure, if the lookup did not complete cleanly
    pub error: Option<LookupError>,
}

/// Forward resolution of a hostname to its addresses.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Looks up A (and, depending on configuration, AAAA) records for `host`.
    async fn lookup_ips(&self, host: &str) -> LookupOutcome;
}

/// Parses a comma-separated upstream list into `host:port` strings.
///
/// Entries are trimmed, empty entries dropped, and entries without a port
/// get `:53` appended. A blank input yields the default public resolvers.
pub fn parse_servers(csv: &str) -> Vec<String> {
    if csv.trim().is_empty() {
        return DEFAULT_DNS_SERVERS.iter().map(|s| s.to_string()).collect();
    }
    csv.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            if part.contains(':') {
                part.to_string()
            } else {
                format!("{part}:{DEFAULT_DNS_PORT}")
            }
        })
        .collect()
}
