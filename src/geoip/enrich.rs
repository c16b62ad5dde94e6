//! IP enrichment.
//!
//! Builds an [`IpEnriched`] record for a single address: cache lookup first,
//! then at most one City and one ASN database query. Database errors are
//! swallowed; partial enrichment is more useful than none, so an address the
//! databases don't know simply carries no `geo`/`asn` fields.

use std::net::IpAddr;

use maxminddb::{geoip2, Reader};

use super::types::{AsnInfo, GeoInfo, IpEnriched, IpFamily};
use super::GeoReaders;
use crate::cache::IpCache;

/// Enriches one address, consulting the cache before the databases.
///
/// The address is canonicalized first (IPv4-mapped IPv6 becomes plain IPv4),
/// so the same underlying address always lands on the same cache key and
/// family tag.
pub fn enrich_ip(ip: IpAddr, readers: &GeoReaders, cache: &IpCache) -> IpEnriched {
    let ip = ip.to_canonical();
    let key = ip.to_string();
    if let Some(hit) = cache.get(&key) {
        return hit;
    }

    let family = if ip.is_ipv4() {
        IpFamily::V4
    } else {
        IpFamily::V6
    };
    let info = IpEnriched {
        ip: key.clone(),
        family,
        geo: readers.city.as_ref().and_then(|r| lookup_city(r, ip)),
        asn: readers.asn.as_ref().and_then(|r| lookup_asn(r, ip)),
    };

    cache.insert(key, info.clone());
    info
}

fn lookup_city(reader: &Reader<Vec<u8>>, ip: IpAddr) -> Option<GeoInfo> {
    let lookup = reader.lookup(ip).ok()?;
    if !lookup.has_data() {
        return None;
    }
    let city: geoip2::City = lookup.decode().ok()??;

    let mut geo = GeoInfo::default();
    geo.country_iso = city.country.iso_code.and_then(nonempty);
    geo.country_name = city.country.names.english.and_then(nonempty);
    if let Some(subdivision) = city.subdivisions.first() {
        geo.region = subdivision.names.english.and_then(nonempty);
    }
    geo.city = city.city.names.english.and_then(nonempty);
    geo.latitude = city.location.latitude.filter(|v| *v != 0.0);
    geo.longitude = city.location.longitude.filter(|v| *v != 0.0);
    Some(geo)
}

fn lookup_asn(reader: &Reader<Vec<u8>>, ip: IpAddr) -> Option<AsnInfo> {
    let lookup = reader.lookup(ip).ok()?;
    if !lookup.has_data() {
        return None;
    }
    let asn: geoip2::Asn = lookup.decode().ok()??;
    Some(AsnInfo {
        number: asn.autonomous_system_number.filter(|n| *n != 0),
        organization: asn
            .autonomous_system_organization
            .and_then(nonempty),
    })
}

fn nonempty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn cache() -> IpCache {
        IpCache::new(16, Duration::from_secs(60))
    }

    #[test]
    fn test_enrich_without_databases_sets_family_only() {
        let readers = GeoReaders::disabled();
        let cache = cache();

        let v4 = enrich_ip("93.184.216.34".parse().unwrap(), &readers, &cache);
        assert_eq!(v4.ip, "93.184.216.34");
        assert_eq!(v4.family, IpFamily::V4);
        assert!(v4.geo.is_none());
        assert!(v4.asn.is_none());

        let v6 = enrich_ip("2606:2800:220:1::".parse().unwrap(), &readers, &cache);
        assert_eq!(v6.family, IpFamily::V6);
    }

    #[test]
    fn test_v4_mapped_v6_is_canonicalized() {
        let readers = GeoReaders::disabled();
        let cache = cache();

        let mapped = enrich_ip("::ffff:1.2.3.4".parse().unwrap(), &readers, &cache);
        assert_eq!(mapped.ip, "1.2.3.4");
        assert_eq!(mapped.family, IpFamily::V4);
    }

    #[test]
    fn test_second_enrichment_is_served_from_cache() {
        let readers = GeoReaders::disabled();
        let cache = cache();
        let ip: IpAddr = "8.8.8.8".parse().unwrap();

        let first = enrich_ip(ip, &readers, &cache);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("8.8.8.8").is_some(), "record should be cached");

        let second = enrich_ip(ip, &readers, &cache);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_enrichment_survives_shared_cache_across_families() {
        let readers = GeoReaders::disabled();
        let cache = cache();

        enrich_ip("8.8.8.8".parse().unwrap(), &readers, &cache);
        enrich_ip("::1".parse().unwrap(), &readers, &cache);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("::1").unwrap().family, IpFamily::V6);
    }
}
