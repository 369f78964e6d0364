use bytes::Bytes;
use reqwest::{Client, StatusCode, Url};
use scene::TileAddress;
use tracing::{debug, warn};

use crate::{ImagerySource, TerrainMesh, TerrainSource, Texture, TileData, assemble_tile_data};

#[derive(Debug)]
pub enum FetchError {
    InvalidUrl { url: String, reason: String },
    Http { url: String, source: String },
    Status { url: String, status: u16 },
    NotFound { url: String },
    InvalidMesh { url: String, reason: String },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::InvalidUrl { url, reason } => write!(f, "invalid URL {url}: {reason}"),
            FetchError::Http { url, source } => write!(f, "request to {url} failed: {source}"),
            FetchError::Status { url, status } => write!(f, "{url} returned HTTP {status}"),
            FetchError::NotFound { url } => write!(f, "{url} not found"),
            FetchError::InvalidMesh { url, reason } => {
                write!(f, "{url} is not a quantized-mesh tile: {reason}")
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// Fetches a URL and returns its body, mapping non-success statuses to errors.
pub async fn fetch_bytes(client: &Client, url: Url) -> Result<(Bytes, Option<String>), FetchError> {
    let label = url.to_string();
    let resp = client.get(url).send().await.map_err(|e| FetchError::Http {
        url: label.clone(),
        source: e.to_string(),
    })?;

    if resp.status() == StatusCode::NOT_FOUND {
        return Err(FetchError::NotFound { url: label });
    }
    if !resp.status().is_success() {
        return Err(FetchError::Status {
            url: label,
            status: resp.status().as_u16(),
        });
    }

    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = resp.bytes().await.map_err(|e| FetchError::Http {
        url: label,
        source: e.to_string(),
    })?;
    Ok((body, content_type))
}

/// Fetches a `.terrain` body from `source` without parsing it.
pub async fn fetch_mesh_bytes(
    client: &Client,
    source: &TerrainSource,
    tile: TileAddress,
) -> Result<Bytes, FetchError> {
    let url = source.tile_url(tile)?;
    fetch_bytes(client, url).await.map(|(body, _)| body)
}

/// Loads terrain tiles, optionally with draped imagery.
#[derive(Debug, Clone)]
pub struct TileClient {
    http: Client,
    terrain: TerrainSource,
    imagery: ImagerySource,
    load_texture: bool,
}

impl TileClient {
    pub fn new(terrain: TerrainSource, imagery: ImagerySource) -> Self {
        Self::with_client(Client::new(), terrain, imagery)
    }

    pub fn with_client(http: Client, terrain: TerrainSource, imagery: ImagerySource) -> Self {
        Self {
            http,
            terrain,
            imagery,
            load_texture: false,
        }
    }

    pub fn with_texture(mut self, load_texture: bool) -> Self {
        self.load_texture = load_texture;
        self
    }

    pub fn terrain(&self) -> &TerrainSource {
        &self.terrain
    }

    pub fn loads_texture(&self) -> bool {
        self.load_texture
    }

    pub async fn fetch_mesh(&self, tile: TileAddress) -> Result<TerrainMesh, FetchError> {
        let url = self.terrain.tile_url(tile)?;
        let label = url.to_string();
        let (body, _) = fetch_bytes(&self.http, url).await?;
        TerrainMesh::from_bytes(body).map_err(|e| FetchError::InvalidMesh {
            url: label,
            reason: e.to_string(),
        })
    }

    /// `Ok(None)` when the texture overlay is off.
    pub async fn fetch_texture(&self, tile: TileAddress) -> Result<Option<Texture>, FetchError> {
        if !self.load_texture {
            return Ok(None);
        }
        let url = self.imagery.tile_url(tile)?;
        let (bytes, content_type) = fetch_bytes(&self.http, url).await?;
        Ok(Some(Texture {
            bytes,
            content_type,
        }))
    }

    /// Requests mesh and texture concurrently; `None` when the mesh failed.
    pub async fn fetch_tile(&self, tile: TileAddress) -> Option<TileData> {
        let (mesh, texture) = futures_util::join!(self.fetch_mesh(tile), self.fetch_texture(tile));
        if let Err(err) = &mesh {
            warn!(%tile, "terrain fetch failed: {err}");
        }
        if let Err(err) = &texture {
            debug!(%tile, "texture fetch failed, drawing untextured: {err}");
        }
        assemble_tile_data(mesh, texture)
    }

    /// Loads every tile of a viewport, preserving order. Failed tiles are holes.
    pub async fn fetch_viewport(&self, tiles: &[TileAddress]) -> Vec<Option<TileData>> {
        futures_util::future::join_all(tiles.iter().map(|&t| self.fetch_tile(t))).await
    }
}
