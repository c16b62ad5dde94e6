//! Round-robin stub resolver.
//!
//! Maintains one stub resolver per configured upstream, each pinned to that
//! single server so host-OS resolver configuration never leaks in. Queries
//! go over UDP with automatic TCP retry on truncation. Upstream selection is
//! an atomic post-increment modulo the pool size: deterministic distribution
//! under burst, no allocation on the hot path, and the chosen server can be
//! reported back for debugging.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{
    LookupIpStrategy, NameServerConfigGroup, ResolverConfig, ResolverOpts,
};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::TokioAsyncResolver;

use super::{LookupOutcome, Resolve};
use crate::config::{DEFAULT_DNS_SERVERS, DEFAULT_LOOKUP_TIMEOUT, DNS_LOOKUP_ATTEMPTS};
use crate::error_handling::InitializationError;

#[derive(Debug)]
struct Upstream {
    addr: String,
    resolver: TokioAsyncResolver,
}

/// Stub resolver rotating across a fixed pool of upstream DNS servers.
#[derive(Debug)]
pub struct RoundRobinResolver {
    upstreams: Vec<Upstream>,
    next: AtomicUsize,
}

impl RoundRobinResolver {
    /// Builds a resolver pool from `host:port` strings.
    ///
    /// An empty slice falls back to the default public resolvers; a zero
    /// timeout falls back to the default lookup timeout. AAAA queries are
    /// only issued when `prefer_ipv6` is set.
    ///
    /// # Errors
    ///
    /// Returns [`InitializationError::Upstream`] when an entry does not
    /// parse as a socket address.
    pub fn new(
        servers: &[String],
        timeout: Duration,
        prefer_ipv6: bool,
    ) -> Result<Self, InitializationError> {
        let defaults: Vec<String>;
        let servers = if servers.is_empty() {
            defaults = DEFAULT_DNS_SERVERS.iter().map(|s| s.to_string()).collect();
            &defaults
        } else {
            servers
        };
        let timeout = if timeout.is_zero() {
            DEFAULT_LOOKUP_TIMEOUT
        } else {
            timeout
        };

        let mut upstreams = Vec::with_capacity(servers.len());
        for server in servers {
            let addr: SocketAddr = server
                .parse()
                .map_err(|e| InitializationError::Upstream(server.clone(), e))?;

            // UDP first with a TCP entry for truncated responses.
            let group = NameServerConfigGroup::from_ips_clear(&[addr.ip()], addr.port(), true);
            let config = ResolverConfig::from_parts(None, Vec::new(), group);

            let mut opts = ResolverOpts::default();
            opts.timeout = timeout;
            opts.attempts = DNS_LOOKUP_ATTEMPTS;
            // ndots = 0 keeps search domains from being appended.
            opts.ndots = 0;
            opts.ip_strategy = if prefer_ipv6 {
                LookupIpStrategy::Ipv4AndIpv6
            } else {
                LookupIpStrategy::Ipv4Only
            };

            upstreams.push(Upstream {
                addr: server.clone(),
                resolver: TokioAsyncResolver::tokio(config, opts),
            });
        }

        Ok(Self {
            upstreams,
            next: AtomicUsize::new(0),
        })
    }

    /// Number of upstreams in the pool.
    pub fn pool_size(&self) -> usize {
        self.upstreams.len()
    }

    fn next_index(&self) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed) % self.upstreams.len()
    }
}

#[async_trait]
impl Resolve for RoundRobinResolver {
    async fn lookup_ips(&self, host: &str) -> LookupOutcome {
        let upstream = &self.upstreams[self.next_index()];
        match upstream.resolver.lookup_ip(host).await {
            Ok(lookup) => LookupOutcome {
                addrs: lookup.iter().collect(),
                server: Some(upstream.addr.clone()),
                error: None,
            },
            Err(err) => {
                // A clean answer with an empty answer section is not a
                // transport failure; hand the caller an empty list and let
                // it decide what that means.
                if let ResolveErrorKind::NoRecordsFound {
                    response_code: ResponseCode::NoError,
                    ..
                } = err.kind()
                {
                    return LookupOutcome {
                        addrs: Vec::new(),
                        server: Some(upstream.addr.clone()),
                        error: None,
                    };
                }
                LookupOutcome {
                    addrs: Vec::new(),
                    server: Some(upstream.addr.clone()),
                    error: Some(err.into()),
                }
            }
        }
    }
}
