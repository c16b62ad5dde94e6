//! dnsweep command-line interface.
//!
//! Resolves the hosts given on the command line (or via `--list`), enriches
//! them, and prints one JSON array to stdout or `--output`. Settings come
//! from the command line first, then an optional key=value config file, then
//! built-in defaults. Usage errors exit 2; batch-fatal errors exit 1;
//! per-host failures are encoded in the output and exit 0.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use tokio_util::sync::CancellationToken;

use dnsweep::config::{
    parse_config_bool, resolve_config_file, ConfigFileError, DB_UPDATE_TIMEOUT,
    DEFAULT_WHOIS_PYTHON, DEFAULT_WHOIS_TOOL,
};
use dnsweep::initialization::init_logger_with;
use dnsweep::updater::maybe_update_geolite_databases;
use dnsweep::{
    parse_servers, resolve_and_enrich_batch, run_whois_psl_private_list, Config, GeoReaders,
    IpCache, LogFormat, LogLevel, RoundRobinResolver,
};

#[derive(Parser, Debug)]
#[command(
    name = "dnsweep",
    version,
    about = "Bulk DNS resolution with GeoIP/ASN enrichment",
    after_help = "Boolean options take an explicit value, e.g. --prefer-ipv6 false."
)]
struct Cli {
    /// Hostnames or IP literals to resolve
    hosts: Vec<String>,

    /// Comma-separated list of hostnames or IPs
    #[arg(long)]
    list: Option<String>,

    /// Comma-separated DNS servers (host:port)
    #[arg(long)]
    dns: Option<String>,

    /// Per-host lookup timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<i64>,

    /// Max concurrent lookups
    #[arg(long)]
    parallel: Option<i64>,

    /// Also query AAAA (IPv6) addresses
    #[arg(long, value_name = "BOOL")]
    prefer_ipv6: Option<bool>,

    /// Path to GeoLite2-City.mmdb (or DB-IP City mmdb)
    #[arg(long, env = "GEOLITE2_CITY_DB")]
    city_db: Option<PathBuf>,

    /// Path to GeoLite2-ASN.mmdb
    #[arg(long, env = "GEOLITE2_ASN_DB")]
    asn_db: Option<PathBuf>,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,

    /// Check domains against Quad9 threat intelligence
    #[arg(long, value_name = "BOOL")]
    check_malicious: Option<bool>,

    /// Include WHOIS/RDAP data via the external helper
    #[arg(long, value_name = "BOOL")]
    whois: Option<bool>,

    /// Path to whois_rdap.py (used with --whois)
    #[arg(long)]
    whois_tool: Option<PathBuf>,

    /// Python executable for whois_rdap.py
    #[arg(long)]
    whois_python: Option<String>,

    /// Timeout for whois_rdap.py in milliseconds
    #[arg(long)]
    whois_timeout_ms: Option<i64>,

    /// Output the PSL private suffix list via the WHOIS helper and exit
    #[arg(long)]
    psl_private_list: bool,

    /// Output file path (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Optional config file path (key=value format). CLI args override file
    /// values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// MaxMind license key for GeoLite2 auto-updates
    #[arg(long, env = "MAXMIND_LICENSE_KEY")]
    maxmind_license_key: Option<String>,

    /// Refresh GeoLite2 DBs when older than this many hours (0 disables)
    #[arg(long)]
    db_update_hours: Option<i64>,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,
}

/// Fully resolved settings: CLI over config file over defaults.
#[derive(Debug)]
struct Settings {
    dns_servers: Vec<String>,
    lookup_timeout: Duration,
    parallelism: usize,
    prefer_ipv6: bool,
    check_malicious: bool,
    enable_whois: bool,
    whois_tool_path: Option<PathBuf>,
    whois_python: String,
    whois_timeout: Duration,
    city_db_path: Option<PathBuf>,
    asn_db_path: Option<PathBuf>,
    pretty: bool,
    output: Option<PathBuf>,
    maxmind_license_key: String,
    db_update_hours: i64,
}

const USAGE: &str = "Usage: dnsweep [--config file] [--list host1,host2] [--dns servers] \
[--timeout-ms N] [--parallel N] [--prefer-ipv6 BOOL] [--city-db path] [--asn-db path] \
[--check-malicious BOOL] [--whois BOOL --whois-tool path] [--pretty] [hosts...]";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("failed to initialize logger")?;

    let file = match resolve_config_file(cli.config.as_deref()) {
        Ok(file) => file,
        Err(e) => {
            let source = cli
                .config
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            eprintln!("Config error ({source}): {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    let (values, source) = file
        .map(|(values, path)| (values, Some(path)))
        .unwrap_or_default();

    let mut settings = match merge_settings(&cli, &values) {
        Ok(settings) => settings,
        Err(e) => {
            let source = source
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            eprintln!("Config parse error ({source}): {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    // Fall back to the conventional helper location when it exists.
    if settings.whois_tool_path.is_none() && Path::new(DEFAULT_WHOIS_TOOL).is_file() {
        settings.whois_tool_path = Some(PathBuf::from(DEFAULT_WHOIS_TOOL));
    }

    if cli.psl_private_list {
        return psl_private_list_mode(&settings).await;
    }

    let mut inputs = Vec::new();
    if let Some(list) = &cli.list {
        inputs.extend(
            list.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        );
    }
    inputs.extend(cli.hosts.iter().cloned());

    if inputs.is_empty() {
        eprintln!("{USAGE}");
        return Ok(ExitCode::from(2));
    }

    if settings.db_update_hours < 0 {
        eprintln!("--db-update-hours cannot be negative");
        return Ok(ExitCode::from(2));
    }
    if settings.db_update_hours > 0 {
        if settings.city_db_path.is_none() && settings.asn_db_path.is_none() {
            warn!("db-update-hours is set but no GeoLite2 DB paths were provided; skipping auto-update");
        } else {
            let max_age = Duration::from_secs(settings.db_update_hours as u64 * 3600);
            tokio::time::timeout(
                DB_UPDATE_TIMEOUT,
                maybe_update_geolite_databases(
                    &settings.maxmind_license_key,
                    max_age,
                    settings.city_db_path.as_deref(),
                    settings.asn_db_path.as_deref(),
                ),
            )
            .await
            .context("DB auto-update timed out")?
            .context("DB auto-update error")?;
        }
    }

    let config = Config {
        dns_servers: settings.dns_servers.clone(),
        lookup_timeout: settings.lookup_timeout,
        parallelism: settings.parallelism,
        prefer_ipv6: settings.prefer_ipv6,
        check_malicious: settings.check_malicious,
        enable_whois: settings.enable_whois,
        whois_tool_path: settings.whois_tool_path.clone(),
        whois_python: settings.whois_python.clone(),
        whois_timeout: settings.whois_timeout,
        city_db_path: settings.city_db_path.clone(),
        asn_db_path: settings.asn_db_path.clone(),
        ..Default::default()
    };

    let resolver = Arc::new(
        RoundRobinResolver::new(&config.dns_servers, config.lookup_timeout, config.prefer_ipv6)
            .context("failed to initialize DNS resolver")?,
    );
    let readers = Arc::new(GeoReaders::open(&config).context("DB error")?);
    let cache = Arc::new(IpCache::new(config.ip_cache_size, config.ip_cache_ttl));

    let results = resolve_and_enrich_batch(
        resolver,
        &inputs,
        &config,
        readers,
        cache,
        CancellationToken::new(),
    )
    .await;

    let out = if settings.pretty {
        serde_json::to_vec_pretty(&results)
    } else {
        serde_json::to_vec(&results)
    }
    .context("failed to serialize results")?;

    write_output(settings.output.as_deref(), &out)?;
    Ok(ExitCode::SUCCESS)
}

async fn psl_private_list_mode(settings: &Settings) -> Result<ExitCode> {
    let Some(tool) = settings.whois_tool_path.as_deref() else {
        eprintln!("psl-private-list requires whois-rdap tool path; use --whois-tool");
        return Ok(ExitCode::from(2));
    };

    let entries = run_whois_psl_private_list(&settings.whois_python, tool, settings.whois_timeout)
        .await
        .context("PSL private list error")?;

    let out = if settings.pretty {
        serde_json::to_vec_pretty(&entries)
    } else {
        serde_json::to_vec(&entries)
    }
    .context("failed to serialize PSL entries")?;

    write_output(settings.output.as_deref(), &out)?;
    Ok(ExitCode::SUCCESS)
}

fn write_output(path: Option<&Path>, out: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, out)
            .with_context(|| format!("failed to write output file {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(out).context("failed to write output")?;
            stdout.write_all(b"\n").context("failed to write output")?;
        }
    }
    Ok(())
}

fn merge_settings(cli: &Cli, file: &HashMap<String, String>) -> Result<Settings, ConfigFileError> {
    let dns_csv = cli
        .dns
        .clone()
        .or_else(|| file.get("dns").cloned())
        .unwrap_or_default();

    // Non-positive numbers mean "use the default", matching the engine's
    // own clamping.
    let timeout_ms = num_setting(cli.timeout_ms, file, "timeout-ms", "an integer")?.unwrap_or(2000);
    let timeout_ms = if timeout_ms <= 0 { 2000 } else { timeout_ms };
    let parallel = num_setting(cli.parallel, file, "parallel", "an integer")?.unwrap_or(64);
    let parallel = if parallel <= 0 { 64 } else { parallel };
    let whois_timeout_ms =
        num_setting(cli.whois_timeout_ms, file, "whois-timeout-ms", "an integer")?.unwrap_or(20_000);
    let whois_timeout_ms = if whois_timeout_ms <= 0 { 20_000 } else { whois_timeout_ms };
    let db_update_hours =
        num_setting(cli.db_update_hours, file, "db-update-hours", "an integer")?.unwrap_or(0);

    let prefer_ipv6 = bool_setting(cli.prefer_ipv6, file, "prefer-ipv6")?.unwrap_or(true);
    let check_malicious = bool_setting(cli.check_malicious, file, "check-malicious")?.unwrap_or(true);
    let enable_whois = bool_setting(cli.whois, file, "whois")?.unwrap_or(true);
    let pretty = if cli.pretty {
        true
    } else {
        bool_setting(None, file, "pretty")?.unwrap_or(false)
    };

    let whois_tool_path = cli
        .whois_tool
        .clone()
        .or_else(|| file.get("whois-tool").map(PathBuf::from));
    let city_db_path = cli
        .city_db
        .clone()
        .or_else(|| file.get("city-db").map(PathBuf::from));
    let asn_db_path = cli
        .asn_db
        .clone()
        .or_else(|| file.get("asn-db").map(PathBuf::from));
    let output = cli
        .output
        .clone()
        .or_else(|| file.get("output").map(PathBuf::from));

    Ok(Settings {
        dns_servers: parse_servers(&dns_csv),
        lookup_timeout: Duration::from_millis(timeout_ms as u64),
        parallelism: parallel as usize,
        prefer_ipv6,
        check_malicious,
        enable_whois,
        whois_tool_path,
        whois_python: cli
            .whois_python
            .clone()
            .or_else(|| file.get("whois-python").cloned())
            .unwrap_or_else(|| DEFAULT_WHOIS_PYTHON.to_string()),
        whois_timeout: Duration::from_millis(whois_timeout_ms as u64),
        city_db_path,
        asn_db_path,
        pretty,
        output,
        maxmind_license_key: cli
            .maxmind_license_key
            .clone()
            .or_else(|| file.get("maxmind-license-key").cloned())
            .unwrap_or_default(),
        db_update_hours,
    })
}

fn num_setting<T: std::str::FromStr>(
    cli: Option<T>,
    file: &HashMap<String, String>,
    key: &str,
    expected: &'static str,
) -> Result<Option<T>, ConfigFileError> {
    if cli.is_some() {
        return Ok(cli);
    }
    match file.get(key) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigFileError::InvalidValue {
                key: key.to_string(),
                expected,
                value: value.clone(),
            }),
        None => Ok(None),
    }
}

fn bool_setting(
    cli: Option<bool>,
    file: &HashMap<String, String>,
    key: &str,
) -> Result<Option<bool>, ConfigFileError> {
    if cli.is_some() {
        return Ok(cli);
    }
    match file.get(key) {
        Some(value) => parse_config_bool(key, value).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("args should parse")
    }

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults_merge_to_settings_defaults() {
        let cli = parse(&["dnsweep", "example.com"]);
        let settings = merge_settings(&cli, &HashMap::new()).unwrap();
        assert_eq!(settings.dns_servers, vec!["8.8.8.8:53", "8.8.4.4:53"]);
        assert_eq!(settings.lookup_timeout, Duration::from_millis(2000));
        assert_eq!(settings.parallelism, 64);
        assert!(settings.prefer_ipv6);
        assert!(settings.check_malicious);
        assert!(settings.enable_whois);
        assert!(!settings.pretty);
        assert_eq!(settings.whois_python, "python3");
        assert_eq!(settings.db_update_hours, 0);
    }

    #[test]
    fn test_cli_overrides_file() {
        let cli = parse(&["dnsweep", "--parallel", "4", "--prefer-ipv6", "false", "x.test"]);
        let mut file = HashMap::new();
        file.insert("parallel".to_string(), "99".to_string());
        file.insert("prefer-ipv6".to_string(), "true".to_string());
        file.insert("timeout-ms".to_string(), "500".to_string());

        let settings = merge_settings(&cli, &file).unwrap();
        assert_eq!(settings.parallelism, 4);
        assert!(!settings.prefer_ipv6);
        // Untouched by CLI, so the file value applies.
        assert_eq!(settings.lookup_timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_file_values_apply_when_cli_is_silent() {
        let cli = parse(&["dnsweep", "x.test"]);
        let mut file = HashMap::new();
        file.insert("dns".to_string(), "1.1.1.1".to_string());
        file.insert("whois".to_string(), "false".to_string());
        file.insert("whois-tool".to_string(), "/opt/whois_rdap.py".to_string());
        file.insert("pretty".to_string(), "1".to_string());

        let settings = merge_settings(&cli, &file).unwrap();
        assert_eq!(settings.dns_servers, vec!["1.1.1.1:53"]);
        assert!(!settings.enable_whois);
        assert_eq!(
            settings.whois_tool_path.as_deref(),
            Some(Path::new("/opt/whois_rdap.py"))
        );
        assert!(settings.pretty);
    }

    #[test]
    fn test_non_positive_numbers_clamp_to_defaults() {
        let cli = parse(&["dnsweep", "--timeout-ms=-5", "--parallel", "0", "x.test"]);
        let settings = merge_settings(&cli, &HashMap::new()).unwrap();
        assert_eq!(settings.lookup_timeout, Duration::from_millis(2000));
        assert_eq!(settings.parallelism, 64);
    }

    #[test]
    fn test_bad_file_number_is_an_error() {
        let cli = parse(&["dnsweep", "x.test"]);
        let mut file = HashMap::new();
        file.insert("timeout-ms".to_string(), "soon".to_string());
        let err = merge_settings(&cli, &file).unwrap_err();
        assert!(err.to_string().contains("timeout-ms"));
    }

    #[test]
    fn test_bad_file_bool_is_an_error() {
        let cli = parse(&["dnsweep", "x.test"]);
        let mut file = HashMap::new();
        file.insert("check-malicious".to_string(), "maybe".to_string());
        assert!(merge_settings(&cli, &file).is_err());
    }
}
