//! Tiled quantized-mesh terrain layer.

use foundation::math::Vec3;
use scene::{TileAddress, TileTransform, ZRange, compute_tile_transform};
use streaming::{MeshAlgorithm, TerrainMesh, Texture, TileData};

use crate::layer::{Layer, LayerId};
use crate::symbology::LayerStyle;

pub const LAYER_ID_PREFIX: &str = "quantized-mesh-tile";

/// How parent and child tiles are shown while children load.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RefinementStrategy {
    /// Ancestors stay visible only where no loaded descendant covers them.
    #[default]
    NoOverlap,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum CoordinateSystem {
    /// Positions are already in world units; the model matrix places them.
    #[default]
    Cartesian,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainLayerProps {
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub z_range: Option<ZRange>,
    pub refinement: RefinementStrategy,
    pub mesh_algorithm: MeshAlgorithm,
    pub load_texture: bool,
    pub style: LayerStyle,
}

impl Default for TerrainLayerProps {
    fn default() -> Self {
        Self {
            min_zoom: 0,
            max_zoom: 15,
            z_range: None,
            refinement: RefinementStrategy::NoOverlap,
            mesh_algorithm: MeshAlgorithm::default(),
            load_texture: false,
            style: LayerStyle::default(),
        }
    }
}

impl Layer for TerrainLayerProps {
    /// `quantized-mesh-tile-{algorithm}` with a `-texture` suffix when imagery
    /// is draped.
    fn id(&self) -> LayerId {
        let mut id = format!("{LAYER_ID_PREFIX}-{}", self.mesh_algorithm.as_str());
        if self.load_texture {
            id.push_str("-texture");
        }
        LayerId(id)
    }
}

impl TerrainLayerProps {
    pub fn covers_zoom(&self, z: u8) -> bool {
        (self.min_zoom..=self.max_zoom).contains(&z)
    }

    /// Draw descriptor for one tile, or `None` while it has no data.
    pub fn render_tile<'a>(
        &self,
        tile: TileAddress,
        data: Option<&'a TileData>,
    ) -> Option<MeshSubLayer<'a>> {
        render_tile(tile, data, &self.style)
    }
}

/// One simple-mesh draw per tile.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSubLayer<'a> {
    pub id: String,
    pub tile: TileAddress,
    pub mesh: &'a TerrainMesh,
    pub texture: Option<&'a Texture>,
    pub model_matrix: TileTransform,
    pub coordinate_system: CoordinateSystem,
    /// Used when `texture` is absent.
    pub color: [u8; 3],
    pub position: Vec3,
    pub polygon_offset: Option<[f32; 2]>,
    pub wireframe: bool,
}

/// `None` for a hidden layer or a tile without data.
pub fn render_tile<'a>(
    tile: TileAddress,
    data: Option<&'a TileData>,
    style: &LayerStyle,
) -> Option<MeshSubLayer<'a>> {
    if !style.visible {
        return None;
    }
    let data = data?;
    Some(MeshSubLayer {
        id: format!("{LAYER_ID_PREFIX}-{tile}"),
        tile,
        mesh: &data.mesh,
        texture: data.texture.as_ref(),
        model_matrix: compute_tile_transform(tile),
        coordinate_system: CoordinateSystem::Cartesian,
        color: style.color,
        position: Vec3::ZERO,
        polygon_offset: None,
        wireframe: style.wireframe,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbology::UNTEXTURED_COLOR;
    use bytes::Bytes;
    use formats::QuantizedMeshHeader;
    use pretty_assertions::assert_eq;

    fn tile_data(texture: bool) -> TileData {
        let header = QuantizedMeshHeader::default();
        TileData {
            mesh: TerrainMesh::from_bytes(Bytes::copy_from_slice(&header.to_bytes())).unwrap(),
            texture: texture.then(|| Texture::new(Bytes::from_static(b"jpg"))),
        }
    }

    #[test]
    fn id_tracks_algorithm_and_texture() {
        let mut props = TerrainLayerProps::default();
        assert_eq!(props.id().as_str(), "quantized-mesh-tile-pydelatin");
        props.mesh_algorithm = MeshAlgorithm::Martini;
        props.load_texture = true;
        assert_eq!(props.id().as_str(), "quantized-mesh-tile-pymartini-texture");
    }

    #[test]
    fn no_data_no_sublayer() {
        let props = TerrainLayerProps::default();
        assert!(props.render_tile(TileAddress::new(0, 0, 0), None).is_none());
    }

    #[test]
    fn sublayer_uses_tile_transform_and_fallback_color() {
        let data = tile_data(false);
        let tile = TileAddress::new(3, 5, 4);
        let sub = TerrainLayerProps::default()
            .render_tile(tile, Some(&data))
            .unwrap();
        assert_eq!(sub.model_matrix, compute_tile_transform(tile));
        assert_eq!(sub.color, UNTEXTURED_COLOR);
        assert_eq!(sub.coordinate_system, CoordinateSystem::Cartesian);
        assert_eq!(sub.polygon_offset, None);
        assert!(sub.texture.is_none());
        assert_eq!(sub.id, "quantized-mesh-tile-4/3/5");
    }

    #[test]
    fn texture_is_passed_through() {
        let data = tile_data(true);
        let sub = render_tile(TileAddress::new(0, 0, 1), Some(&data), &LayerStyle::default()).unwrap();
        assert_eq!(sub.texture.map(|t| t.bytes.as_ref()), Some(&b"jpg"[..]));
    }

    #[test]
    fn hidden_layer_draws_nothing() {
        let data = tile_data(true);
        let mut props = TerrainLayerProps::default();
        props.style.visible = false;
        assert!(props.render_tile(TileAddress::new(0, 0, 1), Some(&data)).is_none());

        props.style.visible = true;
        assert!(props.render_tile(TileAddress::new(0, 0, 1), Some(&data)).is_some());
    }

    #[test]
    fn zoom_window_is_inclusive() {
        let props = TerrainLayerProps::default();
        assert!(props.covers_zoom(0));
        assert!(props.covers_zoom(15));
        assert!(!props.covers_zoom(16));
    }
}
