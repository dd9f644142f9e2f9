//! Face-mesh asset location.

use std::path::{Path, PathBuf};

use liveness_core::ports::{AssetLocator, CdnAssetLocator, FACE_MESH_ASSETS};
use serde::Serialize;
use tracing::debug;

/// Returns the local assets directory.
///
/// Uses `XDG_DATA_HOME/liveness/assets` or `~/.local/share/liveness/assets`.
#[must_use]
pub fn assets_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("liveness")
        .join("assets")
}

/// Resolves assets to files in a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirAssetLocator {
    dir: PathBuf,
}

impl DirAssetLocator {
    /// Creates a locator rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl AssetLocator for DirAssetLocator {
    fn locate(&self, file: &str) -> String {
        self.dir.join(file).to_string_lossy().into_owned()
    }
}

/// Picks a locator: a local directory wins over a base URL, and with neither
/// the public CDN is used.
#[must_use]
pub fn locator_for(base_url: Option<&str>, dir: Option<&Path>) -> Box<dyn AssetLocator> {
    match (dir, base_url) {
        (Some(dir), _) => {
            debug!("Resolving assets from {}", dir.display());
            Box::new(DirAssetLocator::new(dir))
        }
        (None, Some(url)) => {
            debug!("Resolving assets against {url}");
            Box::new(CdnAssetLocator::new(url))
        }
        (None, None) => Box::new(CdnAssetLocator::default()),
    }
}

/// Resolution of one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetEntry {
    /// Asset file name.
    pub file: String,
    /// Where it resolves to.
    pub location: String,
    /// For local locations, whether the file exists. `None` for remote ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub present: Option<bool>,
}

/// Resolves every known face-mesh asset.
#[must_use]
pub fn list_assets(locator: &dyn AssetLocator) -> Vec<AssetEntry> {
    FACE_MESH_ASSETS
        .iter()
        .map(|file| {
            let location = locator.locate(file);
            let present = if location.starts_with("http://") || location.starts_with("https://") {
                None
            } else {
                Some(Path::new(&location).exists())
            };
            AssetEntry {
                file: (*file).to_string(),
                location,
                present,
            }
        })
        .collect()
}

/// Checks if every asset is present in `dir`.
#[must_use]
pub fn all_assets_installed(dir: &Path) -> bool {
    FACE_MESH_ASSETS.iter().all(|f| dir.join(f).exists())
}
