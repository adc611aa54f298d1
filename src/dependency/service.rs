//! Dependency delivery
//!
//! Fetches a resolved dependency (over HTTP, or from disk for `file://`
//! URIs), verifies its SHA-256 and unpacks the tarball into the target layer.
//! Platform operators can redirect downloads with `dependency-mapping`
//! bindings under `<platform>/bindings`.

use crate::bom::BomEntry;
use crate::dependency::catalog::BuildpackToml;
use crate::dependency::{bill_of_materials, Dependency, DependencyManager};
use crate::error::{BomError, BomResult};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Upper bound on a downloaded artifact
const MAX_DOWNLOAD_BYTES: u64 = 512 * 1024 * 1024;

/// Leading bytes of a gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Binding type that maps dependency checksums to replacement URIs
const DEPENDENCY_MAPPING_TYPE: &str = "dependency-mapping";

/// Catalog-backed dependency manager
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyService;

impl DependencyService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DependencyManager for DependencyService {
    async fn resolve(
        &self,
        catalog_path: &Path,
        id: &str,
        version: &str,
        stack: &str,
    ) -> BomResult<Dependency> {
        let catalog = BuildpackToml::load(catalog_path)
            .await
            .map_err(|e| BomError::Resolution {
                id: id.to_string(),
                version: version.to_string(),
                stack: stack.to_string(),
                reason: e.to_string(),
            })?;

        catalog.resolve(id, version, stack)
    }

    async fn deliver(
        &self,
        dependency: &Dependency,
        cnb_path: &Path,
        layer_path: &Path,
        platform_path: &Path,
    ) -> BomResult<()> {
        let uri = match mapped_uri(dependency, platform_path).await? {
            Some(mapped) => {
                info!("    Using dependency mapping {} for {}", mapped, dependency.id);
                mapped
            }
            None => dependency.uri.clone(),
        };

        let bytes = fetch(dependency, &uri, cnb_path).await?;
        verify_checksum(dependency, &bytes)?;

        fs::create_dir_all(layer_path).await.map_err(|e| {
            BomError::provision(
                &dependency.id,
                format!("creating {}: {}", layer_path.display(), e),
            )
        })?;

        let target = layer_path.to_path_buf();
        let strip_components = dependency.strip_components as usize;
        let unpacked =
            tokio::task::spawn_blocking(move || unpack(&bytes, &target, strip_components))
                .await
                .map_err(|e| {
                    BomError::provision(&dependency.id, format!("unpack task failed: {}", e))
                })?;

        unpacked.map_err(|e| {
            BomError::provision(&dependency.id, format!("extracting archive: {}", e))
        })
    }

    fn generate_bill_of_materials(&self, dependencies: &[Dependency]) -> Vec<BomEntry> {
        bill_of_materials(dependencies)
    }
}

/// Look up a replacement URI for the dependency's sha256 in the platform
/// bindings
async fn mapped_uri(
    dependency: &Dependency,
    platform_path: &Path,
) -> BomResult<Option<String>> {
    let bindings = platform_path.join("bindings");
    let unreadable = |e: std::io::Error| {
        BomError::provision(
            &dependency.id,
            format!("reading {}: {}", bindings.display(), e),
        )
    };

    let mut entries = match fs::read_dir(&bindings).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(unreadable(e)),
    };

    while let Some(entry) = entries.next_entry().await.map_err(&unreadable)? {
        let binding = entry.path();
        let kind = match fs::read_to_string(binding.join("type")).await {
            Ok(kind) => kind,
            Err(_) => continue,
        };
        if kind.trim() != DEPENDENCY_MAPPING_TYPE {
            continue;
        }

        if let Ok(uri) = fs::read_to_string(binding.join(&dependency.sha256)).await {
            debug!("Binding {} maps {}", binding.display(), dependency.sha256);
            return Ok(Some(uri.trim().to_string()));
        }
    }

    Ok(None)
}

/// Local path for a `file://` URI or a bare path; relative paths are under
/// the buildpack root
fn local_path(uri: &str, cnb_path: &Path) -> Option<PathBuf> {
    match uri.strip_prefix("file://") {
        Some(rest) => Some(cnb_path.join(rest)),
        None if !uri.contains("://") => Some(cnb_path.join(uri)),
        None => None,
    }
}

async fn fetch(dependency: &Dependency, uri: &str, cnb_path: &Path) -> BomResult<Vec<u8>> {
    if let Some(path) = local_path(uri, cnb_path) {
        debug!("Reading {} from {}", dependency.id, path.display());
        return fs::read(&path).await.map_err(|e| {
            BomError::provision(&dependency.id, format!("reading {}: {}", path.display(), e))
        });
    }

    if !(uri.starts_with("https://") || uri.starts_with("http://")) {
        return Err(BomError::provision(
            &dependency.id,
            format!("unsupported URI scheme: {}", uri),
        ));
    }

    debug!("Downloading {} from {}", dependency.id, uri);
    let url = uri.to_string();
    let downloaded = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, String> {
        let mut response = ureq::get(url.as_str()).call().map_err(|e| e.to_string())?;
        response
            .body_mut()
            .with_config()
            .limit(MAX_DOWNLOAD_BYTES)
            .read_to_vec()
            .map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| BomError::provision(&dependency.id, format!("download task failed: {}", e)))?;

    downloaded.map_err(|reason| {
        BomError::provision(&dependency.id, format!("downloading {}: {}", uri, reason))
    })
}

fn verify_checksum(dependency: &Dependency, bytes: &[u8]) -> BomResult<()> {
    let actual = hex::encode(Sha256::digest(bytes));
    let expected = dependency
        .sha256
        .trim_start_matches("sha256:")
        .to_ascii_lowercase();

    if actual != expected {
        return Err(BomError::provision(
            &dependency.id,
            format!("checksum mismatch: expected {}, got {}", expected, actual),
        ));
    }
    Ok(())
}

/// Unpack a tarball (gzip-compressed or plain) into `layer_path`, dropping
/// the first `strip_components` components of every entry path
fn unpack(bytes: &[u8], layer_path: &Path, strip_components: usize) -> std::io::Result<()> {
    let reader: Box<dyn Read + '_> = if bytes.starts_with(&GZIP_MAGIC) {
        Box::new(GzDecoder::new(bytes))
    } else {
        Box::new(bytes)
    };
    let mut archive = tar::Archive::new(reader);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();

        let mut relative = PathBuf::new();
        for component in path.components().skip(strip_components) {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("entry escapes the layer: {}", path.display()),
                    ))
                }
            }
        }
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = layer_path.join(&relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        entry.unpack(&target)?;
    }

    Ok(())
}
