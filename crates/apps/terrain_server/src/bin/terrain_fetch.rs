use std::path::{Path, PathBuf};

use clap::Parser;
use formats::QuantizedMeshHeader;
use futures_util::StreamExt;
use reqwest::Client;
use scene::{MAX_ZOOM, TileAddress};
use streaming::{MeshAlgorithm, TerrainSource, fetch_mesh_bytes, tile_cache_path};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Seeds a local terrain directory from the dynamic mesh API.
#[derive(Parser, Debug)]
#[command(author, version, about = "Download quantized-mesh tiles for a bbox")]
struct Args {
    /// Bounding box: minLon,minLat,maxLon,maxLat
    #[arg(long)]
    bbox: String,

    #[arg(long, default_value_t = 0)]
    min_zoom: u8,

    #[arg(long, default_value_t = 10)]
    max_zoom: u8,

    /// Output directory, laid out as {algorithm}/{z}/{x}/{y}.terrain
    #[arg(long, default_value = "data/terrain")]
    out: PathBuf,

    /// Mesh API base URL (defaults to UPSTREAM_MESH_URL or the public endpoint)
    #[arg(long)]
    mesh_url: Option<String>,

    #[arg(long, default_value = streaming::DEFAULT_MESH_MOSAIC)]
    mosaic: String,

    #[arg(long, default_value = "pydelatin")]
    algorithm: MeshAlgorithm,

    /// Concurrent requests
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Re-download tiles that already exist
    #[arg(long)]
    overwrite: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let bbox = parse_bbox(&args.bbox)?;
    check_zoom_range(args.min_zoom, args.max_zoom)?;

    let source = TerrainSource {
        base_url: args
            .mesh_url
            .or_else(|| std::env::var("UPSTREAM_MESH_URL").ok())
            .unwrap_or_else(|| streaming::DEFAULT_MESH_URL.to_string()),
        mosaic_url: args.mosaic,
        mesh_algorithm: args.algorithm,
    };

    let tiles: Vec<TileAddress> = (args.min_zoom..=args.max_zoom)
        .flat_map(|z| TileAddress::covering(bbox, z))
        .collect();
    info!("{} tiles in zoom {}..={}", tiles.len(), args.min_zoom, args.max_zoom);

    let client = Client::new();
    let out = args.out.as_path();
    let overwrite = args.overwrite;
    let results: Vec<Outcome> = futures_util::stream::iter(tiles)
        .map(|tile| {
            let client = &client;
            let source = &source;
            async move { seed_tile(client, source, out, tile, overwrite).await }
        })
        .buffer_unordered(args.concurrency.max(1))
        .collect()
        .await;

    let written = results.iter().filter(|o| **o == Outcome::Written).count();
    let skipped = results.iter().filter(|o| **o == Outcome::Skipped).count();
    let failed = results.len() - written - skipped;
    info!("done: {written} written, {skipped} already present, {failed} failed");
    if failed > 0 {
        return Err(format!("{failed} tiles failed").into());
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Written,
    Skipped,
    Failed,
}

async fn seed_tile(
    client: &Client,
    source: &TerrainSource,
    out: &Path,
    tile: TileAddress,
    overwrite: bool,
) -> Outcome {
    let path = tile_cache_path(out, source.mesh_algorithm, tile);
    if !overwrite && tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Outcome::Skipped;
    }

    let body = match fetch_mesh_bytes(client, source, tile).await {
        Ok(body) => body,
        Err(err) => {
            error!(%tile, "download failed: {err}");
            return Outcome::Failed;
        }
    };
    if let Err(err) = QuantizedMeshHeader::from_bytes(&body) {
        warn!(%tile, "not a quantized-mesh tile: {err}");
        return Outcome::Failed;
    }

    if let Some(dir) = path.parent() {
        if let Err(err) = tokio::fs::create_dir_all(dir).await {
            error!("mkdir {dir:?} failed: {err}");
            return Outcome::Failed;
        }
    }
    match tokio::fs::write(&path, &body).await {
        Ok(()) => {
            info!(%tile, bytes = body.len(), "wrote tile");
            Outcome::Written
        }
        Err(err) => {
            error!("write {path:?} failed: {err}");
            Outcome::Failed
        }
    }
}

fn check_zoom_range(min_zoom: u8, max_zoom: u8) -> Result<(), Box<dyn std::error::Error>> {
    if max_zoom > MAX_ZOOM {
        return Err(format!("max zoom {max_zoom} above {MAX_ZOOM}").into());
    }
    if min_zoom > max_zoom {
        return Err(format!("min zoom {min_zoom} above max zoom {max_zoom}").into());
    }
    Ok(())
}

fn parse_bbox(raw: &str) -> Result<[f64; 4], Box<dyn std::error::Error>> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()?;
    let [min_lon, min_lat, max_lon, max_lat] = parts[..] else {
        return Err(format!("bbox needs 4 numbers, got {}", parts.len()).into());
    };
    if min_lon > max_lon || min_lat > max_lat {
        return Err("bbox min must not exceed max".into());
    }
    Ok([min_lon, min_lat, max_lon, max_lat])
}
