//! Configuration constants.

use std::time::Duration;

/// Upstream DNS servers used when none are configured.
pub const DEFAULT_DNS_SERVERS: [&str; 2] = ["8.8.8.8:53", "8.8.4.4:53"];

/// Port appended to upstream entries that carry no port.
pub const DEFAULT_DNS_PORT: u16 = 53;

/// Per-host lookup timeout used when the configured value is zero.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Number of lookup attempts per upstream before the resolver gives up.
pub const DNS_LOOKUP_ATTEMPTS: usize = 2;

/// Maximum number of simultaneously outstanding lookups.
pub const DEFAULT_PARALLELISM: usize = 64;

/// Bounded size of the IP enrichment cache.
pub const DEFAULT_IP_CACHE_SIZE: usize = 10_000;

/// How long an enriched IP stays valid in the cache.
pub const DEFAULT_IP_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Quad9 threat-intelligence resolver. Blocked domains are signalled by
/// NXDOMAIN responses with the recursion-available flag cleared.
pub const THREAT_INTEL_RESOLVER: &str = "9.9.9.9:53";

/// Default timeout for the WHOIS helper tool, per invocation.
pub const DEFAULT_WHOIS_TIMEOUT: Duration = Duration::from_secs(20);

/// Floor for the per-domain WHOIS budget when no explicit timeout is set.
pub const MIN_WHOIS_PER_DOMAIN: Duration = Duration::from_secs(8);

/// Hard cap on a single WHOIS helper invocation, however many domains it
/// was handed.
pub const WHOIS_TOTAL_TIMEOUT_CAP: Duration = Duration::from_secs(5 * 60);

/// Budget for the `--version` probe that confirms an interpreter is Python.
pub const PYTHON_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Interpreter used for the WHOIS helper when none is configured.
pub const DEFAULT_WHOIS_PYTHON: &str = "python3";

/// Conventional location of the WHOIS helper script, picked up automatically
/// when it exists and no explicit path was given.
pub const DEFAULT_WHOIS_TOOL: &str = "./tools/whois_rdap.py";

/// HTTP timeout for a single GeoLite2 edition download.
pub const DB_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(2 * 60);

/// Overall budget for the pre-batch database refresh.
pub const DB_UPDATE_TIMEOUT: Duration = Duration::from_secs(5 * 60);
