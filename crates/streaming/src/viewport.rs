use scene::ElevationBound;

use crate::TileData;

/// The tiles of one viewport-load notification, in request order.
///
/// `None` marks a tile that failed or has not finished loading.
#[derive(Debug, Clone, Copy)]
pub struct ViewportLoad<'a> {
    tiles: &'a [Option<TileData>],
}

impl<'a> ViewportLoad<'a> {
    pub fn new(tiles: &'a [Option<TileData>]) -> Self {
        Self { tiles }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn loaded(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }

    pub fn tiles(self) -> impl Iterator<Item = Option<&'a TileData>> + 'a {
        self.tiles.iter().map(Option::as_ref)
    }

    /// One entry per tile, absent where the tile has no data.
    pub fn elevation_bounds(self) -> impl Iterator<Item = Option<ElevationBound>> + 'a {
        self.tiles
            .iter()
            .map(|t| t.as_ref().map(TileData::elevation_bound))
    }
}
