//! WHOIS helper invocation.
//!
//! The helper is invoked at most once per batch, over the whole deduplicated
//! domain list; process spawn dominates the cost, and the helper dedups its
//! own network traffic. The child is killed when the invocation deadline
//! passes. Its stdout must be a JSON array; a non-zero exit alone is not a
//! failure as long as usable JSON arrived.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use log::debug;
use tokio::process::Command;

use super::types::{PslPrivateEntry, WhoisRecord};
use super::validate::{validate_python_path, validate_tool_path};
use crate::config::DEFAULT_WHOIS_PYTHON;
use crate::error_handling::WhoisError;

/// Runs the WHOIS helper over `domains` and returns its records keyed by
/// domain.
///
/// `timeout` bounds the whole invocation and is also forwarded to the helper
/// (in whole seconds) as its own internal budget. Records without a domain
/// are dropped.
pub async fn run_whois_tool(
    python: &str,
    tool: &Path,
    domains: &[String],
    timeout: Duration,
) -> Result<HashMap<String, WhoisRecord>, WhoisError> {
    let python = effective_python(python);
    validate_tool_path(tool)?;
    validate_python_path(python).await?;

    if domains.is_empty() {
        return Ok(HashMap::new());
    }

    let joined = domains.join(",");
    let args = [
        tool.as_os_str().to_os_string(),
        "--list".into(),
        joined.into(),
        "--timeout".into(),
        timeout_seconds(timeout).to_string().into(),
    ];
    debug!(
        "running whois helper for {} domain(s), budget {:?}",
        domains.len(),
        timeout
    );
    let output = capture_tool_output(python, &args, timeout).await?;
    let records: Vec<WhoisRecord> = interpret_output(output)?;

    let mut by_domain = HashMap::with_capacity(records.len());
    for record in records {
        if record.domain.is_empty() {
            continue;
        }
        by_domain.insert(record.domain.clone(), record);
    }
    Ok(by_domain)
}

/// Fetches the Public Suffix List PRIVATE-section entries via the helper.
pub async fn run_whois_psl_private_list(
    python: &str,
    tool: &Path,
    timeout: Duration,
) -> Result<Vec<PslPrivateEntry>, WhoisError> {
    let python = effective_python(python);
    validate_tool_path(tool)?;
    validate_python_path(python).await?;

    let args = [
        tool.as_os_str().to_os_string(),
        "--psl-private-list".into(),
        "--timeout".into(),
        timeout_seconds(timeout).to_string().into(),
    ];
    let output = capture_tool_output(python, &args, timeout).await?;
    interpret_output(output)
}

fn effective_python(python: &str) -> &str {
    if python.is_empty() {
        DEFAULT_WHOIS_PYTHON
    } else {
        python
    }
}

fn timeout_seconds(timeout: Duration) -> u64 {
    let secs = timeout.as_secs();
    if secs == 0 {
        8
    } else {
        secs
    }
}

async fn capture_tool_output(
    python: &str,
    args: &[std::ffi::OsString],
    timeout: Duration,
) -> Result<std::process::Output, WhoisError> {
    let mut command = Command::new(python);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(WhoisError::Spawn(e)),
        Err(_) => Err(WhoisError::Timeout(timeout)),
    }
}

/// Applies the helper's output contract.
///
/// Empty stdout is a failure (with stderr as the message when the exit was
/// also unsuccessful). Unparseable stdout from a failed run reports the run
/// failure; from a clean run it reports the parse error. Parseable stdout is
/// a success regardless of exit status.
fn interpret_output<T: serde::de::DeserializeOwned>(
    output: std::process::Output,
) -> Result<T, WhoisError> {
    let failed = !output.status.success();

    if output.stdout.is_empty() {
        if failed {
            return Err(tool_failure(&output));
        }
        return Err(WhoisError::EmptyOutput);
    }

    match serde_json::from_slice(&output.stdout) {
        Ok(parsed) => Ok(parsed),
        Err(parse_err) => {
            if failed {
                return Err(tool_failure(&output));
            }
            Err(WhoisError::Parse(parse_err))
        }
    }
}

fn tool_failure(output: &std::process::Output) -> WhoisError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        WhoisError::ToolFailed(output.status.to_string())
    } else {
        WhoisError::ToolFailed(stderr.to_string())
    }
}
