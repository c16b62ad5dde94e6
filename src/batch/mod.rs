//! Batch orchestration.
//!
//! `resolve_and_enrich_batch` fans a list of inputs out over a bounded pool
//! of workers: each input is normalized, resolved (or taken as an IP
//! literal), enriched, optionally checked against threat intelligence, and
//! written to its own slot of the output. The output is always index-aligned
//! with the input; failures are encoded per row and never abort the batch.

mod types;

// Re-export public API
pub use types::HostResult;

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, warn};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::cache::IpCache;
use crate::config::{Config, DEFAULT_LOOKUP_TIMEOUT, DEFAULT_PARALLELISM, MIN_WHOIS_PER_DOMAIN, WHOIS_TOTAL_TIMEOUT_CAP};
use crate::error_handling::{classify_lookup_error, ErrorCode, LookupError};
use crate::geoip::{enrich_ip, GeoReaders};
use crate::resolver::{LookupOutcome, Resolve};
use crate::threat::check_malicious_domain;
use crate::whois::{run_whois_tool, WhoisRecord};

/// Shared, read-only state handed to every worker.
struct BatchContext<R> {
    resolver: Arc<R>,
    readers: Arc<GeoReaders>,
    cache: Arc<IpCache>,
    cancel: CancellationToken,
    lookup_timeout: Duration,
    prefer_ipv6: bool,
    check_malicious: bool,
    whois_by_domain: Option<HashMap<String, WhoisRecord>>,
    whois_error: Option<String>,
}

/// Resolves and enriches a batch of hostnames and IP literals.
///
/// Returns one [`HostResult`] per input, at the same position. Per-input
/// failures are carried in the rows; the batch itself always completes, also
/// when `cancel` fires mid-flight (in-flight lookups are interrupted and
/// classified, everything else finishes its current step).
pub async fn resolve_and_enrich_batch<R>(
    resolver: Arc<R>,
    inputs: &[String],
    config: &Config,
    readers: Arc<GeoReaders>,
    cache: Arc<IpCache>,
    cancel: CancellationToken,
) -> Vec<HostResult>
where
    R: Resolve + 'static,
{
    let lookup_timeout = if config.lookup_timeout.is_zero() {
        DEFAULT_LOOKUP_TIMEOUT
    } else {
        config.lookup_timeout
    };
    let parallelism = if config.parallelism == 0 {
        DEFAULT_PARALLELISM
    } else {
        config.parallelism
    };

    // Pre-filled so that a panicked worker still leaves a classified row at
    // its slot.
    let mut results: Vec<HostResult> = inputs
        .iter()
        .map(|raw| HostResult {
            domain: normalize_host(raw).to_string(),
            resolved: false,
            error: Some(ErrorCode::LookupFailed),
            ..Default::default()
        })
        .collect();

    let (whois_by_domain, whois_error) = gather_whois(inputs, config, lookup_timeout).await;

    let ctx = Arc::new(BatchContext {
        resolver,
        readers,
        cache,
        cancel,
        lookup_timeout,
        prefer_ipv6: config.prefer_ipv6,
        check_malicious: config.check_malicious,
        whois_by_domain,
        whois_error,
    });

    let semaphore = Arc::new(Semaphore::new(parallelism));
    let mut tasks = FuturesUnordered::new();

    for (idx, raw) in inputs.iter().enumerate() {
        // Acquire before spawning so outstanding work never exceeds the
        // parallelism ceiling.
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        let ctx = Arc::clone(&ctx);
        let raw = raw.clone();
        tasks.push(tokio::spawn(async move {
            let _permit = permit;
            process_input(ctx, idx, raw).await
        }));
    }

    while let Some(joined) = tasks.next().await {
        match joined {
            Ok((idx, row)) => results[idx] = row,
            Err(join_error) => warn!("batch worker panicked: {join_error:?}"),
        }
    }

    results
}

/// Runs the WHOIS helper once for the whole batch, when enabled.
///
/// Returns the domain-keyed record map on success, or the error string that
/// gets attached to every row that ends up without a record.
async fn gather_whois(
    inputs: &[String],
    config: &Config,
    lookup_timeout: Duration,
) -> (Option<HashMap<String, WhoisRecord>>, Option<String>) {
    if !config.enable_whois {
        return (None, None);
    }
    let Some(tool) = config.whois_tool_path.as_deref() else {
        return (None, None);
    };

    let domains = unique_hostnames(inputs);
    if domains.is_empty() {
        return (None, None);
    }

    let per_domain = if config.whois_timeout.is_zero() {
        lookup_timeout.max(MIN_WHOIS_PER_DOMAIN)
    } else {
        config.whois_timeout
    };
    let tool_timeout = per_domain
        .saturating_mul(domains.len() as u32)
        .min(WHOIS_TOTAL_TIMEOUT_CAP);

    match run_whois_tool(&config.whois_python, tool, &domains, tool_timeout).await {
        Ok(map) => {
            debug!("whois helper returned {} record(s)", map.len());
            (Some(map), None)
        }
        Err(err) => {
            warn!("whois helper failed: {err}");
            (None, Some(err.to_string()))
        }
    }
}

async fn process_input<R: Resolve>(
    ctx: Arc<BatchContext<R>>,
    idx: usize,
    raw: String,
) -> (usize, HostResult) {
    let host = normalize_host(&raw);
    if host.is_empty() {
        return (
            idx,
            HostResult {
                domain: String::new(),
                resolved: false,
                error: Some(ErrorCode::LookupFailed),
                ..Default::default()
            },
        );
    }

    // IP literals skip resolution entirely; note that they also bypass the
    // IPv6 suppression applied to lookup results.
    if let Ok(ip) = host.parse::<IpAddr>() {
        let info = enrich_ip(ip, &ctx.readers, &ctx.cache);
        return (
            idx,
            HostResult {
                domain: host.to_string(),
                resolved: true,
                ips: vec![info],
                ..Default::default()
            },
        );
    }

    let outcome = tokio::select! {
        res = tokio::time::timeout(ctx.lookup_timeout, ctx.resolver.lookup_ips(host)) => {
            match res {
                Ok(outcome) => outcome,
                Err(_) => LookupOutcome {
                    error: Some(LookupError::Timeout),
                    ..Default::default()
                },
            }
        }
        _ = ctx.cancel.cancelled() => LookupOutcome {
            error: Some(LookupError::Cancelled),
            ..Default::default()
        },
    };

    let mut error = outcome.error.as_ref().map(classify_lookup_error);
    if error.is_none() && outcome.addrs.is_empty() {
        error = Some(ErrorCode::NoRecords);
    }

    let ips: Vec<_> = dedup_addrs(&outcome.addrs, ctx.prefer_ipv6)
        .into_iter()
        .map(|ip| enrich_ip(ip, &ctx.readers, &ctx.cache))
        .collect();

    // Gated on the surviving address list: a verdict is present exactly
    // when the row carries addresses. The probe deliberately runs outside
    // the per-host budget: it reuses the timeout as a duration but answers
    // to the batch lifetime, so a tight per-host budget cannot silently
    // suppress threat signals.
    let malicious = if ctx.check_malicious && !ips.is_empty() {
        Some(check_malicious_domain(host, true, ctx.lookup_timeout).await)
    } else {
        None
    };

    let mut row = HostResult {
        domain: host.to_string(),
        resolved: !ips.is_empty(),
        dns_server: outcome.server,
        malicious,
        ips,
        error,
        ..Default::default()
    };

    match &ctx.whois_by_domain {
        Some(map) => match map.get(host) {
            Some(record) => row.whois = Some(record.clone()),
            None => row.whois_error = ctx.whois_error.clone(),
        },
        None => row.whois_error = ctx.whois_error.clone(),
    }

    (idx, row)
}

/// Strips one trailing dot, then surrounding whitespace.
fn normalize_host(raw: &str) -> &str {
    raw.strip_suffix('.').unwrap_or(raw).trim()
}

/// The distinct non-IP hostnames of a batch, in first-seen order.
fn unique_hostnames(inputs: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(inputs.len());
    let mut out = Vec::new();
    for raw in inputs {
        let host = normalize_host(raw);
        if host.is_empty() || host.parse::<IpAddr>().is_ok() {
            continue;
        }
        if seen.insert(host.to_string()) {
            out.push(host.to_string());
        }
    }
    out
}

/// Deduplicates addresses by canonical string form, keeping first
/// occurrences in order and dropping IPv6 when it is not wanted.
fn dedup_addrs(addrs: &[IpAddr], prefer_ipv6: bool) -> Vec<IpAddr> {
    let mut seen = HashSet::with_capacity(addrs.len());
    let mut out = Vec::with_capacity(addrs.len());
    for addr in addrs {
        let addr = addr.to_canonical();
        if addr.is_ipv6() && !prefer_ipv6 {
            continue;
        }
        if seen.insert(addr.to_string()) {
            out.push(addr);
        }
    }
    out
}
