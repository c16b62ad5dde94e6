//! WHOIS helper data structures.
//!
//! These mirror the JSON records produced by the external `whois_rdap.py`
//! helper. Unknown fields are ignored and absent fields deserialize to their
//! defaults, so the helper can evolve independently.

use serde::{Deserialize, Serialize};

fn is_false(b: &bool) -> bool {
    !*b
}

/// One WHOIS/RDAP record as emitted by the helper tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhoisRecord {
    /// Domain the record belongs to; records without one are dropped
    #[serde(default)]
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrar_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrant_org: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrant_address: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name_servers: Vec<String>,
    /// Whether any nameserver points at afraid.org infrastructure
    #[serde(default)]
    pub is_afraid_hosted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psl_registrable_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psl_public_registrable_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psl_private_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psl_public_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psl_private_owner: Option<String>,
    /// Whether the registrable domain sits under a PSL PRIVATE suffix
    #[serde(default)]
    pub psl_is_private: bool,
    /// Dynamic-DNS provider inferred from the suffix; empty when none
    #[serde(default)]
    pub ddns_provider_by_suffix: String,
    /// Dynamic-DNS providers inferred from the nameservers
    #[serde(default)]
    pub ddns_providers_by_ns: Vec<String>,
    /// Union of all dynamic-DNS provider signals
    #[serde(default)]
    pub ddns_providers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rdap_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rdap_created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rdap_status: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rdap_events: Vec<RdapEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whois_created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whois_expiration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whois_updated_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whois_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rdap_error: Option<String>,
    /// Whether the helper served this record from its own cache
    #[serde(default, skip_serializing_if = "is_false")]
    pub cache_hit: bool,
}

/// One lifecycle event from an RDAP response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RdapEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// One PRIVATE-section entry of the Public Suffix List.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PslPrivateEntry {
    /// The private suffix itself, e.g. `duckdns.org`
    pub suffix: String,
    /// Operator of the namespace, when the PSL records one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}
