//! Landmark inference port and model asset resolution.

use crate::domain::{FaceMeshOptions, LandmarkSet};

/// Base URL the default locator resolves face-mesh assets against.
pub const DEFAULT_ASSET_BASE_URL: &str = "https://cdn.jsdelivr.net/npm/@mediapipe/face_mesh";

/// Files the face-mesh runtime requests through the asset locator.
pub const FACE_MESH_ASSETS: &[&str] = &[
    "face_mesh.binarypb",
    "face_mesh_solution_packed_assets.data",
    "face_mesh_solution_packed_assets_loader.js",
    "face_mesh_solution_simd_wasm_bin.js",
    "face_mesh_solution_simd_wasm_bin.wasm",
    "face_mesh_solution_wasm_bin.js",
    "face_mesh_solution_wasm_bin.wasm",
];

/// Resolves a model asset file name to the location it is loaded from.
pub trait AssetLocator: Send + Sync {
    /// Returns the URL or path for `file`.
    fn locate(&self, file: &str) -> String;
}

impl<T> AssetLocator for T
where
    T: Fn(&str) -> String + Send + Sync,
{
    fn locate(&self, file: &str) -> String {
        self(file)
    }
}

/// Resolves assets against a URL prefix, the public CDN by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdnAssetLocator {
    base_url: String,
}

impl CdnAssetLocator {
    /// Creates a locator for the given base URL. A trailing slash is ignored.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }
}

impl Default for CdnAssetLocator {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET_BASE_URL)
    }
}

impl AssetLocator for CdnAssetLocator {
    fn locate(&self, file: &str) -> String {
        format!("{}/{file}", self.base_url)
    }
}

/// Port for the facial-landmark model.
///
/// `F` is the frame type the capture source produces.
pub trait LandmarkInference<F>: Send + Sync {
    /// Configures the model for a new attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the model or its assets cannot be loaded.
    fn configure(&self, options: &FaceMeshOptions, assets: &dyn AssetLocator) -> anyhow::Result<()>;

    /// Runs the model on one frame, returning every candidate face.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    fn infer(&self, frame: &F) -> anyhow::Result<Vec<LandmarkSet>>;
}
