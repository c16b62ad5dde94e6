//! GeoLite2 database auto-refresh.
//!
//! Before a batch opens its readers, configured `.mmdb` files older than the
//! requested maximum age are re-downloaded from MaxMind. Each edition ships
//! as a tar.gz archive with the database somewhere inside; the archive is
//! unpacked in memory and the `.mmdb` member is written next to its final
//! destination, then atomically renamed into place so a concurrent reader
//! never observes a torn file.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use flate2::read::GzDecoder;
use log::info;
use tar::Archive;

use crate::config::DB_DOWNLOAD_TIMEOUT;

const GEOLITE_DOWNLOAD_ENDPOINT: &str = "https://download.maxmind.com/app/geoip_download";

/// Refreshes the configured GeoLite2 databases that are older than
/// `max_age`.
///
/// A zero `max_age` disables refreshing entirely. A missing file counts as
/// stale. Requires a MaxMind license key.
pub async fn maybe_update_geolite_databases(
    license_key: &str,
    max_age: Duration,
    city_path: Option<&Path>,
    asn_path: Option<&Path>,
) -> Result<()> {
    if max_age.is_zero() {
        return Ok(());
    }
    if license_key.trim().is_empty() {
        bail!("maxmind license key is required when db-update-hours is set");
    }

    let targets = [
        (city_path, "GeoLite2-City", "GeoLite2 City"),
        (asn_path, "GeoLite2-ASN", "GeoLite2 ASN"),
    ];

    for (path, edition, label) in targets {
        let Some(path) = path else { continue };

        let needs_refresh = file_needs_refresh(path, max_age)
            .with_context(|| format!("check {label} freshness"))?;
        if !needs_refresh {
            continue;
        }

        info!("refreshing {label} database (target: {})", path.display());
        download_geolite_edition(license_key, edition, path)
            .await
            .with_context(|| format!("refresh {label} database"))?;
    }

    Ok(())
}

/// True when the file is missing or its mtime is at least `max_age` old.
fn file_needs_refresh(path: &Path, max_age: Duration) -> Result<bool> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e.into()),
    };
    let modified = meta.modified()?;
    let age = modified.elapsed().unwrap_or_default();
    Ok(age >= max_age)
}

async fn download_geolite_edition(license_key: &str, edition_id: &str, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).context("create destination directory")?;
    }

    let client = reqwest::Client::builder()
        .timeout(DB_DOWNLOAD_TIMEOUT)
        .build()
        .context("build download client")?;
    let response = client
        .get(GEOLITE_DOWNLOAD_ENDPOINT)
        .query(&[
            ("edition_id", edition_id),
            ("license_key", license_key),
            ("suffix", "tar.gz"),
        ])
        .send()
        .await
        .with_context(|| format!("download {edition_id} archive"))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(1024).collect();
        bail!(
            "download {edition_id} archive: unexpected status {status}: {}",
            snippet.trim()
        );
    }

    let archive = response
        .bytes()
        .await
        .with_context(|| format!("read {edition_id} archive"))?;
    let mmdb = extract_mmdb_from_tar_gz(&archive)
        .with_context(|| format!("extract {edition_id} database"))?;
    write_mmdb_atomically(&mmdb, dest)
}

/// Pulls the first `.mmdb` member out of a gzipped tar archive.
fn extract_mmdb_from_tar_gz(tar_gz_bytes: &[u8]) -> Result<Vec<u8>> {
    let gz_decoder = GzDecoder::new(tar_gz_bytes);
    let mut tar_archive = Archive::new(gz_decoder);

    let entries = tar_archive
        .entries()
        .context("failed to read tar archive entries")?;

    for entry_result in entries {
        let mut entry = entry_result.context("failed to read tar entry")?;
        let path = entry.path().context("failed to get entry path")?;
        if entry.header().entry_type().is_dir() {
            continue;
        }
        let is_mmdb = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("mmdb"))
            .unwrap_or(false);
        if !is_mmdb {
            continue;
        }

        let mut mmdb_bytes = Vec::new();
        entry
            .read_to_end(&mut mmdb_bytes)
            .context("failed to read .mmdb member")?;
        return Ok(mmdb_bytes);
    }

    Err(anyhow!("no .mmdb file found in archive"))
}

fn write_mmdb_atomically(bytes: &[u8], dest: &Path) -> Result<()> {
    use std::io::Write;

    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).context("create temp file")?;
    tmp.write_all(bytes).context("write mmdb")?;
    tmp.flush().context("flush mmdb")?;
    tmp.persist(dest).context("rename mmdb into place")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(dest, std::fs::Permissions::from_mode(0o644))
            .context("chmod mmdb")?;
    }

    Ok(())
}
