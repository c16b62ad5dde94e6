//! WHOIS/RDAP enrichment via the external helper tool.
//!
//! Registration data comes from a Python helper (`whois_rdap.py`) invoked in
//! batch mode: one subprocess per batch, a comma-joined domain list in, a
//! JSON array out. The helper owns RDAP bootstrap, WHOIS fallback, and its
//! own caching; this module owns path validation, process control, and
//! output interpretation.

mod invoke;
mod types;
mod validate;

// Re-export public API
pub use invoke::{run_whois_psl_private_list, run_whois_tool};
pub use types::{PslPrivateEntry, RdapEvent, WhoisRecord};
