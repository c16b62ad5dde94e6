//! Batch result types.

use serde::{Deserialize, Serialize};

use crate::error_handling::ErrorCode;
use crate::geoip::IpEnriched;
use crate::whois::WhoisRecord;

fn none_or_empty(value: &Option<String>) -> bool {
    match value {
        Some(s) => s.is_empty(),
        None => true,
    }
}

/// Per-input result record.
///
/// Exactly one of these is produced for every input, in input order. Fields
/// that did not apply to this input are omitted from the JSON form entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostResult {
    /// The input, trimmed of whitespace and one trailing dot
    pub domain: String,
    /// Whether the input yielded at least one address
    pub resolved: bool,
    /// Upstream that served the answer; absent for IP-literal inputs
    #[serde(default, skip_serializing_if = "none_or_empty")]
    pub dns_server: Option<String>,
    /// Threat-intel verdict; present only when the probe ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub malicious: Option<bool>,
    /// Deduplicated, enriched addresses in wire order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ips: Vec<IpEnriched>,
    /// Registration data for this domain, when the WHOIS helper had it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whois: Option<WhoisRecord>,
    /// Batch-wide WHOIS failure, attached to rows without a record
    #[serde(default, skip_serializing_if = "none_or_empty")]
    pub whois_error: Option<String>,
    /// Classified lookup failure; absent on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_row_serializes_two_fields() {
        let row = HostResult {
            domain: "example.com".to_string(),
            resolved: false,
            error: Some(ErrorCode::NxDomain),
            ..Default::default()
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "domain": "example.com",
                "resolved": false,
                "error": "nxdomain",
            })
        );
    }

    #[test]
    fn test_empty_strings_are_omitted_like_missing_values() {
        let row = HostResult {
            domain: "example.com".to_string(),
            resolved: true,
            dns_server: Some(String::new()),
            whois_error: Some(String::new()),
            ..Default::default()
        };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("dns_server").is_none());
        assert!(json.get("whois_error").is_none());
    }

    #[test]
    fn test_populated_row_keeps_fields() {
        let row = HostResult {
            domain: "example.com".to_string(),
            resolved: true,
            dns_server: Some("8.8.8.8:53".to_string()),
            malicious: Some(false),
            ..Default::default()
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["dns_server"], "8.8.8.8:53");
        assert_eq!(json["malicious"], false);
    }
}
