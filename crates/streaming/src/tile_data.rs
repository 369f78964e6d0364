use bytes::Bytes;
use formats::{HeaderError, QuantizedMeshHeader};
use scene::ElevationBound;

/// A loaded `.terrain` tile: raw body plus its parsed header.
///
/// The body past the header is handed as is to whatever decodes the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMesh {
    bytes: Bytes,
    header: QuantizedMeshHeader,
}

impl TerrainMesh {
    pub fn from_bytes(bytes: Bytes) -> Result<Self, HeaderError> {
        let header = QuantizedMeshHeader::from_bytes(&bytes)?;
        Ok(Self { bytes, header })
    }

    pub fn header(&self) -> &QuantizedMeshHeader {
        &self.header
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn elevation_bound(&self) -> ElevationBound {
        let (min, max) = self.header.height_range();
        ElevationBound::new(min, max)
    }
}

/// Encoded imagery for one tile (JPEG from the imagery source).
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

impl Texture {
    pub fn new(bytes: Bytes) -> Self {
        Self {
            bytes,
            content_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileData {
    pub mesh: TerrainMesh,
    pub texture: Option<Texture>,
}

impl TileData {
    pub fn elevation_bound(&self) -> ElevationBound {
        self.mesh.elevation_bound()
    }
}

/// Combines the two halves of a tile load.
///
/// A failed mesh means there is no tile. A failed texture still yields the
/// tile, drawn untextured.
pub fn assemble_tile_data<E1, E2>(
    mesh: Result<TerrainMesh, E1>,
    texture: Result<Option<Texture>, E2>,
) -> Option<TileData> {
    let mesh = mesh.ok()?;
    Some(TileData {
        mesh,
        texture: texture.ok().flatten(),
    })
}
