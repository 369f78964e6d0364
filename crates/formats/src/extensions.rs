use serde_json::Value;
use std::io::Write;

pub const EXT_OCT_VERTEX_NORMALS: u8 = 1;
pub const EXT_WATER_MASK: u8 = 2;
pub const EXT_METADATA: u8 = 4;

/// Side length of a gridded water mask.
pub const WATER_MASK_SIZE: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum WaterMask {
    /// Whole tile is land (`0`) or water (`255`).
    Uniform(u8),
    /// 256×256 row-major grid, north to south.
    Grid(Vec<u8>),
}

impl WaterMask {
    pub fn land() -> Self {
        WaterMask::Uniform(0)
    }

    pub fn water() -> Self {
        WaterMask::Uniform(255)
    }

    pub fn payload(&self) -> &[u8] {
        match self {
            WaterMask::Uniform(v) => std::slice::from_ref(v),
            WaterMask::Grid(cells) => cells,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            WaterMask::Uniform(_) => true,
            WaterMask::Grid(cells) => cells.len() == WATER_MASK_SIZE * WATER_MASK_SIZE,
        }
    }
}

/// Optional trailing sections of a tile, written in the order given.
#[derive(Debug, Clone, PartialEq)]
pub enum Extension {
    /// Oct-encoded per-vertex normals, derived from the mesh at encode time.
    VertexNormals,
    WaterMask(WaterMask),
    Metadata(Value),
}

impl Extension {
    pub fn id(&self) -> u8 {
        match self {
            Extension::VertexNormals => EXT_OCT_VERTEX_NORMALS,
            Extension::WaterMask(_) => EXT_WATER_MASK,
            Extension::Metadata(_) => EXT_METADATA,
        }
    }
}

/// Writes `id`, the `u32` payload length and the payload.
pub(crate) fn write_extension<W: Write>(w: &mut W, id: u8, payload: &[u8]) -> std::io::Result<()> {
    w.write_all(&[id])?;
    w.write_all(&(payload.len() as u32).to_le_bytes())?;
    w.write_all(payload)
}

/// Metadata payload: `u32` JSON length followed by the JSON text.
pub(crate) fn metadata_payload(value: &Value) -> Vec<u8> {
    let json = value.to_string();
    let mut out = Vec::with_capacity(4 + json.len());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(json.as_bytes());
    out
}
