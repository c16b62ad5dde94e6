//! Path validation for the WHOIS helper.
//!
//! The helper runs as a subprocess with caller-supplied paths, so both the
//! interpreter and the script are validated before anything is executed. The
//! interpreter must be a well-known Python name or an absolute executable
//! that actually identifies itself as Python; the script must be a real
//! `.py` file referenced by path, never a bare command name.

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;

use crate::config::PYTHON_PROBE_TIMEOUT;
use crate::error_handling::WhoisError;

/// Interpreters that are trusted without further inspection.
const PYTHON_ALLOWLIST: [&str; 6] = [
    "python3",
    "python",
    "/usr/bin/python3",
    "/usr/bin/python",
    "/usr/local/bin/python3",
    "/usr/local/bin/python",
];

/// Validates the Python interpreter used to run the helper.
pub(crate) async fn validate_python_path(python: &str) -> Result<(), WhoisError> {
    if PYTHON_ALLOWLIST.contains(&python) {
        return Ok(());
    }

    let path = Path::new(python);
    if !path.is_absolute() {
        return Err(WhoisError::PythonPath(format!(
            "{python:?} must be absolute or in allowlist (python3, python, /usr/bin/python3, ...)"
        )));
    }

    let meta = std::fs::metadata(path)
        .map_err(|e| WhoisError::PythonPath(format!("python path not found: {e}")))?;
    if meta.is_dir() {
        return Err(WhoisError::PythonPath("python path is a directory".to_string()));
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.permissions().mode() & 0o111 == 0 {
            return Err(WhoisError::PythonPath(
                "python path is not executable".to_string(),
            ));
        }
    }

    // Confirm it really is Python by checking the version banner.
    let output = run_version_probe(python, PYTHON_PROBE_TIMEOUT).await?;
    let mut banner = String::from_utf8_lossy(&output.stdout).into_owned();
    banner.push_str(&String::from_utf8_lossy(&output.stderr));
    if !banner.to_lowercase().contains("python") {
        return Err(WhoisError::PythonPath(format!(
            "executable is not Python (version output: {})",
            banner.trim()
        )));
    }

    Ok(())
}

async fn run_version_probe(
    python: &str,
    timeout: Duration,
) -> Result<std::process::Output, WhoisError> {
    let mut command = Command::new(python);
    command.arg("--version").kill_on_drop(true);
    match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(WhoisError::PythonPath(format!(
            "not a valid python executable: {e}"
        ))),
        Err(_) => Err(WhoisError::PythonPath(
            "version probe timed out".to_string(),
        )),
    }
}

/// Validates the helper script path.
pub(crate) fn validate_tool_path(tool: &Path) -> Result<(), WhoisError> {
    if tool.as_os_str().is_empty() {
        return Err(WhoisError::EmptyToolPath);
    }

    let display = tool.to_string_lossy();
    if !display.contains('/') && !display.contains('\\') {
        return Err(WhoisError::ToolPath(
            "tool path must be a file path, not a command name".to_string(),
        ));
    }

    let meta = std::fs::metadata(tool)
        .map_err(|e| WhoisError::ToolPath(format!("tool path not found: {e}")))?;
    if meta.is_dir() {
        return Err(WhoisError::ToolPath("tool path is a directory".to_string()));
    }

    let is_python_script = tool
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("py"))
        .unwrap_or(false);
    if !is_python_script {
        return Err(WhoisError::ToolPath(
            "tool path must be a Python script (.py)".to_string(),
        ));
    }

    Ok(())
}
