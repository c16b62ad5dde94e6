//! Key=value configuration file loader.
//!
//! Configuration files use one `key = value` pair per line. Blank lines and
//! lines starting with `#` or `;` are ignored, values may be single- or
//! double-quoted, and keys are case-insensitive with `_` and `-` treated as
//! equivalent. Command-line arguments always override file values.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors produced while locating or parsing a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file could not be opened or read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// A non-comment line had no `=` separator.
    #[error("invalid config line {line}: {content:?}")]
    InvalidLine {
        /// 1-based line number
        line: usize,
        /// the offending line, trimmed
        content: String,
    },

    /// The key side of a pair was empty.
    #[error("invalid config key on line {line}")]
    InvalidKey {
        /// 1-based line number
        line: usize,
    },

    /// A value failed to parse as the expected type.
    #[error("{key} must be {expected}: {value:?}")]
    InvalidValue {
        /// canonical key name
        key: String,
        /// human description of the expected type
        expected: &'static str,
        /// the raw value
        value: String,
    },
}

/// Locates and parses the effective configuration file.
///
/// With an explicit path, that file must exist and parse. Without one, the
/// default search paths are tried in order and missing files are skipped;
/// the first file found wins. Returns the parsed key/value map together with
/// the path it came from, or `None` when no file exists anywhere.
pub fn resolve_config_file(
    explicit: Option<&Path>,
) -> Result<Option<(HashMap<String, String>, PathBuf)>, ConfigFileError> {
    if let Some(path) = explicit {
        let values = parse_config_path(path)?;
        return Ok(Some((values, path.to_path_buf())));
    }

    for path in default_config_paths() {
        match parse_config_path(&path) {
            Ok(values) => return Ok(Some((values, path))),
            Err(ConfigFileError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(None)
}

/// Default configuration file locations, most specific first.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(3);
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join("dnsweep").join("dnsweep.conf"));
    }
    paths.push(PathBuf::from("/usr/local/etc/dnsweep.conf"));
    paths.push(PathBuf::from("/etc/dnsweep.conf"));
    paths
}

fn parse_config_path(path: &Path) -> Result<HashMap<String, String>, ConfigFileError> {
    let file = std::fs::File::open(path)?;
    parse_config(std::io::BufReader::new(file))
}

/// Parses `key = value` pairs from a reader into a canonical-keyed map.
pub fn parse_config<R: BufRead>(reader: R) -> Result<HashMap<String, String>, ConfigFileError> {
    let mut result = HashMap::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            return Err(ConfigFileError::InvalidLine {
                line: line_number,
                content: line.to_string(),
            });
        };

        let key = canonical_key(raw_key);
        if key.is_empty() {
            return Err(ConfigFileError::InvalidKey { line: line_number });
        }

        result.insert(key, unquote(raw_value.trim()).to_string());
    }

    Ok(result)
}

/// Parses a boolean config value the permissive way: `1`/`t`/`true` and
/// `0`/`f`/`false`, case-insensitively.
pub fn parse_config_bool(key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Ok(true),
        "0" | "f" | "false" => Ok(false),
        _ => Err(ConfigFileError::InvalidValue {
            key: key.to_string(),
            expected: "a boolean",
            value: value.to_string(),
        }),
    }
}

fn canonical_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('_', "-")
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 {
        let bytes = value.as_bytes();
        if (bytes[0] == b'"' && bytes[value.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[value.len() - 1] == b'\'')
        {
            return &value[1..value.len() - 1];
        }
    }
    value
}
