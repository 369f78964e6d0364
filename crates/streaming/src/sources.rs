use std::path::{Path, PathBuf};

use reqwest::Url;
use scene::{TileAddress, mesh_max_error_param};
use serde::{Deserialize, Serialize};

use crate::FetchError;

pub const DEFAULT_MESH_URL: &str = "https://us-east-1-lambda.kylebarron.dev/dem/mesh";
pub const DEFAULT_MESH_MOSAIC: &str = "terrarium";
pub const DEFAULT_IMAGERY_URL: &str = "https://us-west-2-lambda.kylebarron.dev/naip";
pub const DEFAULT_IMAGERY_MOSAIC: &str =
    "dynamodb://us-west-2/94c61bd217e1211db47cf7f8b95bbc8e5e7d68a26cd9099319cf15f9";

/// Server-side meshing algorithm used to build terrain tiles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MeshAlgorithm {
    #[default]
    #[serde(rename = "pydelatin")]
    Delatin,
    #[serde(rename = "pymartini")]
    Martini,
}

impl MeshAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            MeshAlgorithm::Delatin => "pydelatin",
            MeshAlgorithm::Martini => "pymartini",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeshAlgorithm::Delatin => "Delatin",
            MeshAlgorithm::Martini => "Martini",
        }
    }
}

impl std::fmt::Display for MeshAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MeshAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pydelatin" | "delatin" => Ok(MeshAlgorithm::Delatin),
            "pymartini" | "martini" => Ok(MeshAlgorithm::Martini),
            other => Err(format!("unknown mesh algorithm: {other}")),
        }
    }
}

/// On-disk location of a mesh tile: `{root}/{algorithm}/{z}/{x}/{y}.terrain`.
///
/// Tiles meshed by different algorithms never share a file.
pub fn tile_cache_path(root: &Path, algorithm: MeshAlgorithm, tile: TileAddress) -> PathBuf {
    root.join(algorithm.as_str())
        .join(tile.z.to_string())
        .join(tile.x.to_string())
        .join(format!("{}.terrain", tile.y))
}

fn tile_url(base_url: &str, tile: TileAddress, ext: &str) -> Result<Url, FetchError> {
    let raw = format!(
        "{}/{}/{}/{}.{ext}",
        base_url.trim_end_matches('/'),
        tile.z,
        tile.x,
        tile.y
    );
    Url::parse(&raw).map_err(|e| FetchError::InvalidUrl {
        url: raw,
        reason: e.to_string(),
    })
}

/// Dynamic quantized-mesh endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSource {
    pub base_url: String,
    pub mosaic_url: String,
    pub mesh_algorithm: MeshAlgorithm,
}

impl Default for TerrainSource {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MESH_URL.to_string(),
            mosaic_url: DEFAULT_MESH_MOSAIC.to_string(),
            mesh_algorithm: MeshAlgorithm::default(),
        }
    }
}

impl TerrainSource {
    pub fn with_algorithm(mut self, mesh_algorithm: MeshAlgorithm) -> Self {
        self.mesh_algorithm = mesh_algorithm;
        self
    }

    /// `{base}/{z}/{x}/{y}.terrain?url=..&mesh_max_error=..&mesh_algorithm=..`
    pub fn tile_url(&self, tile: TileAddress) -> Result<Url, FetchError> {
        let mut url = tile_url(&self.base_url, tile, "terrain")?;
        url.query_pairs_mut()
            .append_pair("url", &self.mosaic_url)
            .append_pair("mesh_max_error", &mesh_max_error_param(tile.z))
            .append_pair("mesh_algorithm", self.mesh_algorithm.as_str());
        Ok(url)
    }
}

/// Imagery endpoint draped over the terrain as a texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagerySource {
    pub base_url: String,
    pub mosaic_url: String,
}

impl Default for ImagerySource {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_IMAGERY_URL.to_string(),
            mosaic_url: DEFAULT_IMAGERY_MOSAIC.to_string(),
        }
    }
}

impl ImagerySource {
    /// `{base}/{z}/{x}/{y}.jpg?url=..`
    pub fn tile_url(&self, tile: TileAddress) -> Result<Url, FetchError> {
        let mut url = tile_url(&self.base_url, tile, "jpg")?;
        url.query_pairs_mut().append_pair("url", &self.mosaic_url);
        Ok(url)
    }
}
