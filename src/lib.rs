//! dnsweep library: bulk DNS resolution and IP enrichment.
//!
//! This library resolves batches of hostnames and IP literals against a
//! rotating pool of upstream DNS servers, enriches every resulting address
//! with geographic and autonomous-system metadata from local MMDB databases,
//! optionally checks domains against Quad9 threat intelligence, and
//! optionally attaches WHOIS/RDAP registration data gathered by an external
//! helper tool.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use dnsweep::{resolve_and_enrich_batch, Config, GeoReaders, IpCache, RoundRobinResolver};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let resolver = Arc::new(RoundRobinResolver::new(
//!     &config.dns_servers,
//!     config.lookup_timeout,
//!     config.prefer_ipv6,
//! )?);
//! let readers = Arc::new(GeoReaders::open(&config)?);
//! let cache = Arc::new(IpCache::new(config.ip_cache_size, config.ip_cache_ttl));
//!
//! let inputs = vec!["example.com".to_string(), "8.8.8.8".to_string()];
//! let results = resolve_and_enrich_batch(
//!     resolver,
//!     &inputs,
//!     &config,
//!     readers,
//!     cache,
//!     CancellationToken::new(),
//! )
//! .await;
//! println!("{}", serde_json::to_string_pretty(&results)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

pub mod batch;
pub mod cache;
pub mod config;
pub mod error_handling;
pub mod geoip;
pub mod initialization;
pub mod resolver;
pub mod threat;
pub mod updater;
pub mod whois;

// Re-export public API
pub use batch::{resolve_and_enrich_batch, HostResult};
pub use cache::IpCache;
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{classify_lookup_error, ErrorCode, LookupError};
pub use geoip::{enrich_ip, AsnInfo, GeoInfo, GeoReaders, IpEnriched, IpFamily};
pub use resolver::{parse_servers, LookupOutcome, Resolve, RoundRobinResolver};
pub use threat::check_malicious_domain;
pub use whois::{run_whois_psl_private_list, run_whois_tool, PslPrivateEntry, WhoisRecord};
