//! Configuration types.
//!
//! This module defines the library `Config` struct and the logging enums
//! shared with the command-line interface.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_DNS_SERVERS, DEFAULT_IP_CACHE_SIZE, DEFAULT_IP_CACHE_TTL, DEFAULT_LOOKUP_TIMEOUT,
    DEFAULT_PARALLELISM, DEFAULT_WHOIS_PYTHON, DEFAULT_WHOIS_TIMEOUT,
};

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// Immutable after construction. Zero values for the timeout, parallelism,
/// and cache fields are clamped to their defaults at batch start, so a
/// partially filled struct still behaves sensibly.
///
/// # Examples
///
/// ```
/// use dnsweep::Config;
///
/// let config = Config {
///     parallelism: 128,
///     prefer_ipv6: false,
///     ..Default::default()
/// };
/// assert_eq!(config.dns_servers.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream DNS servers as `host:port` strings, tried round-robin
    pub dns_servers: Vec<String>,

    /// Per-host lookup timeout
    pub lookup_timeout: Duration,

    /// Maximum number of simultaneously outstanding lookups
    pub parallelism: usize,

    /// Also query AAAA records and keep IPv6 addresses in results
    pub prefer_ipv6: bool,

    /// Check resolved domains against Quad9 threat intelligence
    pub check_malicious: bool,

    /// Attach WHOIS/RDAP data gathered by the external helper tool
    pub enable_whois: bool,

    /// Path to the WHOIS helper script (`.py`)
    pub whois_tool_path: Option<PathBuf>,

    /// Python interpreter used to run the WHOIS helper
    pub whois_python: String,

    /// Per-invocation timeout handed to the WHOIS helper
    pub whois_timeout: Duration,

    /// Path to a GeoLite2/DB-IP City `.mmdb` database
    pub city_db_path: Option<PathBuf>,

    /// Path to a GeoLite2 ASN `.mmdb` database
    pub asn_db_path: Option<PathBuf>,

    /// Capacity of the IP enrichment cache
    pub ip_cache_size: usize,

    /// Time-to-live of IP enrichment cache entries
    pub ip_cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dns_servers: DEFAULT_DNS_SERVERS.iter().map(|s| s.to_string()).collect(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            parallelism: DEFAULT_PARALLELISM,
            prefer_ipv6: true,
            check_malicious: true,
            enable_whois: false,
            whois_tool_path: None,
            whois_python: DEFAULT_WHOIS_PYTHON.to_string(),
            whois_timeout: DEFAULT_WHOIS_TIMEOUT,
            city_db_path: None,
            asn_db_path: None,
            ip_cache_size: DEFAULT_IP_CACHE_SIZE,
            ip_cache_ttl: DEFAULT_IP_CACHE_TTL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.dns_servers, vec!["8.8.8.8:53", "8.8.4.4:53"]);
        assert_eq!(config.lookup_timeout, Duration::from_secs(2));
        assert_eq!(config.parallelism, 64);
        assert!(config.prefer_ipv6);
        assert!(config.check_malicious);
        assert!(!config.enable_whois);
        assert_eq!(config.whois_python, "python3");
        assert_eq!(config.ip_cache_size, 10_000);
        assert_eq!(config.ip_cache_ttl, Duration::from_secs(600));
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }
}
