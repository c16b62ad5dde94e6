//! GeoIP data structures.

use serde::{Deserialize, Serialize};

/// Geographic attributes of a single address. Every field is optional;
/// absent database entries simply leave fields unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoInfo {
    /// ISO 3166-1 country code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_iso: Option<String>,
    /// English country name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    /// English name of the first subdivision (state, province)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// English city name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Autonomous-system attributes of a single address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AsnInfo {
    /// AS number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    /// AS organization name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// Address family tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpFamily {
    /// IPv4, including IPv4-mapped IPv6 addresses
    #[serde(rename = "v4")]
    V4,
    /// IPv6
    #[serde(rename = "v6")]
    V6,
}

/// One resolved address together with its optional enrichment data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpEnriched {
    /// Canonical textual form of the address
    pub ip: String,
    /// Address family
    pub family: IpFamily,
    /// Geographic data, when the city database knows the address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoInfo>,
    /// Autonomous-system data, when the ASN database knows the address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asn: Option<AsnInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_serializes_as_short_tag() {
        assert_eq!(serde_json::to_string(&IpFamily::V4).unwrap(), "\"v4\"");
        assert_eq!(serde_json::to_string(&IpFamily::V6).unwrap(), "\"v6\"");
    }

    #[test]
    fn test_bare_record_omits_enrichment_fields() {
        let info = IpEnriched {
            ip: "1.2.3.4".to_string(),
            family: IpFamily::V4,
            geo: None,
            asn: None,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["ip"], "1.2.3.4");
        assert_eq!(json["family"], "v4");
        assert!(json.get("geo").is_none());
        assert!(json.get("asn").is_none());
    }

    #[test]
    fn test_geo_info_omits_unset_fields() {
        let geo = GeoInfo {
            country_iso: Some("US".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&geo).unwrap();
        assert_eq!(json["country_iso"], "US");
        assert!(json.get("latitude").is_none());
        assert!(json.get("city").is_none());
    }
}
