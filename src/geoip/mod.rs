//! GeoIP lookup against local MaxMind-format databases.
//!
//! Two independent, optional databases are supported: a City database for
//! geographic data and an ASN database for autonomous-system data. Readers
//! are opened once per batch and shared read-only across workers; the
//! underlying MMDB reader is safe for concurrent lookups.

mod enrich;
mod types;

// Re-export public API
pub use enrich::enrich_ip;
pub use types::{AsnInfo, GeoInfo, IpEnriched, IpFamily};

use anyhow::{Context, Result};
use maxminddb::Reader;

use crate::config::Config;

/// Handles on the optional City and ASN databases.
///
/// Either reader may be absent; a missing database just means the
/// corresponding enrichment fields stay unset. A database that is configured
/// but fails to open is an error, surfaced before any batch work starts.
#[derive(Debug)]
pub struct GeoReaders {
    pub(crate) city: Option<Reader<Vec<u8>>>,
    pub(crate) asn: Option<Reader<Vec<u8>>>,
}

impl GeoReaders {
    /// Opens the databases named by the configuration, City first.
    ///
    /// Any reader opened before a failure is dropped again before the error
    /// is returned.
    pub fn open(config: &Config) -> Result<Self> {
        let city = match &config.city_db_path {
            Some(path) => Some(
                Reader::open_readfile(path)
                    .with_context(|| format!("failed to open city database {}", path.display()))?,
            ),
            None => None,
        };
        let asn = match &config.asn_db_path {
            Some(path) => Some(
                Reader::open_readfile(path)
                    .with_context(|| format!("failed to open ASN database {}", path.display()))?,
            ),
            None => None,
        };
        Ok(Self { city, asn })
    }

    /// A facade with no databases; lookups yield no enrichment data.
    pub fn disabled() -> Self {
        Self {
            city: None,
            asn: None,
        }
    }

    /// True when the City database is loaded.
    pub fn has_city(&self) -> bool {
        self.city.is_some()
    }

    /// True when the ASN database is loaded.
    pub fn has_asn(&self) -> bool {
        self.asn.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_without_configured_paths() {
        let readers = GeoReaders::open(&Config::default()).expect("no databases is valid");
        assert!(!readers.has_city());
        assert!(!readers.has_asn());
    }

    #[test]
    fn test_open_missing_city_database_fails() {
        let config = Config {
            city_db_path: Some("/nonexistent/GeoLite2-City.mmdb".into()),
            ..Default::default()
        };
        let err = GeoReaders::open(&config).unwrap_err();
        assert!(err.to_string().contains("city database"));
    }

    #[test]
    fn test_open_missing_asn_database_fails() {
        let config = Config {
            asn_db_path: Some("/nonexistent/GeoLite2-ASN.mmdb".into()),
            ..Default::default()
        };
        let err = GeoReaders::open(&config).unwrap_err();
        assert!(err.to_string().contains("ASN database"));
    }

    #[test]
    fn test_open_rejects_garbage_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.mmdb");
        std::fs::write(&path, b"definitely not an mmdb file").unwrap();

        let config = Config {
            city_db_path: Some(path),
            ..Default::default()
        };
        assert!(GeoReaders::open(&config).is_err());
    }
}
