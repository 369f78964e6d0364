use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::extract::{Path as AxumPath, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bytes::Bytes;
use formats::QuantizedMeshHeader;
use scene::TileAddress;
use serde::Deserialize;
use streaming::{FetchError, MeshAlgorithm, TerrainSource, fetch_mesh_bytes, tile_cache_path};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use viewer::ViewerConfig;

const MESH_CONTENT_TYPE: &str = "application/vnd.quantized-mesh";

#[derive(Clone)]
struct AppState {
    terrain_root: PathBuf,
    upstream: Option<TerrainSource>,
    viewer: ViewerConfig,
    http: reqwest::Client,
}

#[derive(Debug, Default, Deserialize)]
struct MeshQuery {
    mesh_algorithm: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let terrain_root = env::var("TERRAIN_ROOT").unwrap_or_else(|_| "data/terrain".to_string());
    let addr: SocketAddr = env::var("TERRAIN_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:9100".to_string())
        .parse()?;
    let upstream = env::var("UPSTREAM_MESH_URL").ok().map(|base_url| TerrainSource {
        base_url,
        mosaic_url: env::var("UPSTREAM_MOSAIC_URL")
            .unwrap_or_else(|_| streaming::DEFAULT_MESH_MOSAIC.to_string()),
        ..TerrainSource::default()
    });
    let viewer = match env::var("VIEWER_CONFIG") {
        Ok(path) => ViewerConfig::load(path)?,
        Err(_) => ViewerConfig::default(),
    };

    if let Some(up) = &upstream {
        info!("proxying missing tiles to {}", up.base_url);
    }

    let state = AppState {
        terrain_root: PathBuf::from(terrain_root),
        upstream,
        viewer,
        http: reqwest::Client::new(),
    };

    info!("terrain server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/config", get(get_config))
        .route("/mesh/:z/:x/:file", get(get_mesh))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_config(State(state): State<AppState>) -> Json<ViewerConfig> {
    Json(state.viewer.clone())
}

/// `{z}/{x}/{y}.terrain` from `{root}/{algorithm}/...` on disk, falling back to
/// the upstream mesh API.
async fn get_mesh(
    State(state): State<AppState>,
    AxumPath((z, x, file)): AxumPath<(u8, u32, String)>,
    Query(query): Query<MeshQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(y) = file
        .strip_suffix(".terrain")
        .and_then(|y| y.parse::<u32>().ok())
    else {
        return (StatusCode::BAD_REQUEST, "expected {y}.terrain").into_response();
    };
    let tile = TileAddress::new(x, y, z);
    if !tile.is_valid() {
        return (StatusCode::BAD_REQUEST, "tile out of range").into_response();
    }

    let algorithm = match query.mesh_algorithm.as_deref() {
        Some(raw) => match raw.parse::<MeshAlgorithm>() {
            Ok(alg) => alg,
            Err(msg) => return (StatusCode::BAD_REQUEST, msg).into_response(),
        },
        None => state
            .upstream
            .as_ref()
            .map(|up| up.mesh_algorithm)
            .unwrap_or_default(),
    };

    let path = tile_cache_path(&state.terrain_root, algorithm, tile);
    match tokio::fs::read(&path).await {
        Ok(data) => return mesh_response(Bytes::from(data), &headers),
        Err(err) if err.kind() != std::io::ErrorKind::NotFound => {
            error!("tile read failed: {path:?} -> {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "read failed").into_response();
        }
        Err(_) => {}
    }

    let Some(upstream) = &state.upstream else {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    };
    let source = TerrainSource {
        mesh_algorithm: algorithm,
        ..upstream.clone()
    };

    match fetch_mesh_bytes(&state.http, &source, tile).await {
        Ok(body) => {
            if let Err(err) = QuantizedMeshHeader::from_bytes(&body) {
                warn!(%tile, "upstream returned a non-mesh body: {err}");
                return (StatusCode::BAD_GATEWAY, "invalid upstream tile").into_response();
            }
            if let Err(err) = store_tile(&path, &body).await {
                warn!("caching {path:?} failed: {err}");
            }
            mesh_response(body, &headers)
        }
        Err(FetchError::NotFound { .. }) => (StatusCode::NOT_FOUND, "not found").into_response(),
        Err(err) => {
            error!(%tile, "upstream fetch failed: {err}");
            (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response()
        }
    }
}

async fn store_tile(path: &Path, body: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, body).await
}

fn etag_for(data: &[u8]) -> String {
    format!("\"{}\"", blake3::hash(data).to_hex())
}

fn mesh_response(data: Bytes, request_headers: &HeaderMap) -> Response {
    let etag = etag_for(&data);
    let mut headers = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_str(&etag) {
        headers.insert(http::header::ETAG, v);
    }

    let not_modified = request_headers
        .get(http::header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.split(',').any(|tag| tag.trim() == etag || tag.trim() == "*"));
    if not_modified {
        return (StatusCode::NOT_MODIFIED, headers).into_response();
    }

    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static(MESH_CONTENT_TYPE),
    );
    (StatusCode::OK, headers, Body::from(data)).into_response()
}
