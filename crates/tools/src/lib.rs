//! Helpers behind the `qmesh` command line tool.

use formats::{EncodeError, EncodeOptions, Extension, QuantizedMeshHeader, SphereMethod};
use foundation::math::{Ecef, Ellipsoid, Vec3, ecef_to_geodetic};
use scene::{TileAddress, compute_tile_transform};
use serde::{Deserialize, Serialize};

/// Mesh to encode, as read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshInput {
    /// Flat `[lon, lat, height, ...]`.
    pub positions: Vec<f64>,
    /// Flat triangle list.
    #[serde(alias = "triangles")]
    pub indices: Vec<u32>,
    #[serde(default)]
    pub bounds: Option<[f64; 4]>,
}

#[derive(Debug)]
pub enum ToolError {
    Io { path: String, source: String },
    Json { source: String },
    Bounds { input: String },
    Encode(EncodeError),
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolError::Io { path, source } => write!(f, "{path}: {source}"),
            ToolError::Json { source } => write!(f, "invalid mesh JSON: {source}"),
            ToolError::Bounds { input } => {
                write!(f, "bounds must be minx,miny,maxx,maxy, got {input:?}")
            }
            ToolError::Encode(e) => write!(f, "encode failed: {e}"),
        }
    }
}

impl std::error::Error for ToolError {}

impl From<EncodeError> for ToolError {
    fn from(e: EncodeError) -> Self {
        ToolError::Encode(e)
    }
}

pub fn parse_bounds(input: &str) -> Result<[f64; 4], ToolError> {
    let err = || ToolError::Bounds {
        input: input.to_string(),
    };
    let values: Vec<f64> = input
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|_| err()))
        .collect::<Result<_, _>>()?;
    match values[..] {
        [minx, miny, maxx, maxy] if minx <= maxx && miny <= maxy => Ok([minx, miny, maxx, maxy]),
        _ => Err(err()),
    }
}

pub fn parse_mesh_input(json: &str) -> Result<MeshInput, ToolError> {
    serde_json::from_str(json).map_err(|e| ToolError::Json {
        source: e.to_string(),
    })
}

/// Encodes `mesh`; `bounds` overrides any bounds carried in the input.
pub fn encode_mesh(
    mesh: &MeshInput,
    bounds: Option<[f64; 4]>,
    sphere_method: SphereMethod,
    normals: bool,
) -> Result<Vec<u8>, ToolError> {
    let options = EncodeOptions {
        bounds: bounds.or(mesh.bounds),
        sphere_method,
        extensions: if normals {
            vec![Extension::VertexNormals]
        } else {
            Vec::new()
        },
        ..EncodeOptions::default()
    };
    Ok(formats::encode_to_vec(&mesh.positions, &mesh.indices, &options)?)
}

/// Header plus values derived from it for humans reading `qmesh header`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderReport {
    pub header: QuantizedMeshHeader,
    /// Tile center as `[lon°, lat°, height m]`.
    pub center_lon_lat: [f64; 3],
    /// Occlusion point scaled back to ECEF meters.
    pub horizon_occlusion_point_ecef: [f64; 3],
}

pub fn header_report(header: QuantizedMeshHeader) -> HeaderReport {
    let center = ecef_to_geodetic(Ecef::new(header.center_x, header.center_y, header.center_z));
    let occlusion = Ellipsoid::WGS84.from_scaled_space(Vec3::new(
        header.horizon_occlusion_point_x,
        header.horizon_occlusion_point_y,
        header.horizon_occlusion_point_z,
    ));
    HeaderReport {
        header,
        center_lon_lat: [
            center.lon_rad.to_degrees(),
            center.lat_rad.to_degrees(),
            center.alt_m,
        ],
        horizon_occlusion_point_ecef: occlusion.as_array(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformReport {
    pub tile: String,
    /// Column-major 4×4.
    pub matrix: [f64; 16],
    /// World position of the tile's local (0,0) and (1,1) corners.
    pub origin: [f64; 3],
    pub far_corner: [f64; 3],
}

pub fn transform_report(tile: TileAddress) -> TransformReport {
    let t = compute_tile_transform(tile);
    TransformReport {
        tile: tile.to_string(),
        matrix: t.to_cols_array(),
        origin: t.apply(Vec3::ZERO).as_array(),
        far_corner: t.apply(Vec3::new(1.0, 1.0, 0.0)).as_array(),
    }
}
