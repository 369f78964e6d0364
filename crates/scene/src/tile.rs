use serde::{Deserialize, Serialize};

/// Deepest zoom level addressable with `u32` tile columns/rows.
pub const MAX_ZOOM: u8 = 31;

/// Web-mercator latitude limit (degrees).
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Tile coordinate in the ZXY quadtree scheme (row 0 at the north edge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileAddress {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileAddress {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Tiles along one axis at zoom `z` (2^z), with `z` clamped to [`MAX_ZOOM`].
    pub fn tiles_per_side(z: u8) -> u64 {
        1u64 << z.min(MAX_ZOOM)
    }

    /// `z` within range and `x, y` inside `[0, 2^z)`.
    pub fn is_valid(&self) -> bool {
        if self.z > MAX_ZOOM {
            return false;
        }
        let n = Self::tiles_per_side(self.z);
        (self.x as u64) < n && (self.y as u64) < n
    }

    pub fn parent(&self) -> Option<Self> {
        if self.z == 0 {
            return None;
        }
        Some(Self::new(self.x / 2, self.y / 2, self.z - 1))
    }

    /// Tile containing a WGS84 position at zoom `z`.
    ///
    /// Latitude is clamped to the web-mercator limit, longitude wraps into
    /// `[-180, 180)` and `z` is clamped to [`MAX_ZOOM`].
    pub fn from_lon_lat(lon_deg: f64, lat_deg: f64, z: u8) -> Self {
        let z = z.min(MAX_ZOOM);
        let n = Self::tiles_per_side(z) as f64;
        let lon = (lon_deg + 180.0).rem_euclid(360.0) - 180.0;
        let lat = lat_deg.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();

        let fx = (lon + 180.0) / 360.0 * n;
        let fy = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * n;

        let max = n - 1.0;
        Self::new(fx.floor().clamp(0.0, max) as u32, fy.floor().clamp(0.0, max) as u32, z)
    }

    /// Geographic bounds in WGS84 degrees: `(lon_min, lat_min, lon_max, lat_max)`.
    pub fn bounds_wgs84(&self) -> (f64, f64, f64, f64) {
        let n = Self::tiles_per_side(self.z) as f64;
        let lon_min = (self.x as f64 / n) * 360.0 - 180.0;
        let lon_max = ((self.x as f64 + 1.0) / n) * 360.0 - 180.0;

        // Web Mercator Y flip
        let lat_max = tile_y_to_lat(self.y as f64, n);
        let lat_min = tile_y_to_lat(self.y as f64 + 1.0, n);

        (lon_min, lat_min, lon_max, lat_max)
    }

    /// Every tile at zoom `z` intersecting the bbox `[min_lon, min_lat, max_lon, max_lat]`,
    /// in row-major order. Empty when `z` exceeds [`MAX_ZOOM`].
    ///
    /// An east edge at or past 180 ends at the last column instead of wrapping.
    pub fn covering(bbox: [f64; 4], z: u8) -> Vec<Self> {
        if z > MAX_ZOOM {
            return Vec::new();
        }
        let [min_lon, min_lat, max_lon, max_lat] = bbox;
        let top_left = Self::from_lon_lat(min_lon, max_lat, z);
        let bottom_right = Self::from_lon_lat(max_lon, min_lat, z);
        let last_x = if max_lon >= 180.0 {
            (Self::tiles_per_side(z) - 1) as u32
        } else {
            bottom_right.x
        };

        let mut tiles = Vec::new();
        for y in top_left.y..=bottom_right.y {
            for x in top_left.x..=last_x {
                tiles.push(Self::new(x, y, z));
            }
        }
        tiles
    }
}

impl std::fmt::Display for TileAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

fn tile_y_to_lat(y: f64, n: f64) -> f64 {
    let m = std::f64::consts::PI - 2.0 * std::f64::consts::PI * y / n;
    m.sinh().atan().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::TileAddress;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn validity_follows_zoom_extent() {
        assert!(TileAddress::new(0, 0, 0).is_valid());
        assert!(!TileAddress::new(1, 0, 0).is_valid());
        assert!(TileAddress::new(3, 3, 2).is_valid());
        assert!(!TileAddress::new(3, 4, 2).is_valid());
        assert!(!TileAddress::new(0, 0, 40).is_valid());
    }

    #[test]
    fn parent_halves_coordinates() {
        assert_eq!(
            TileAddress::new(5, 7, 3).parent(),
            Some(TileAddress::new(2, 3, 2))
        );
        assert_eq!(TileAddress::new(0, 0, 0).parent(), None);
    }

    #[test]
    fn from_lon_lat_grand_canyon() {
        // Standard slippy-map tile for (-112.0093, 36.0709) at z=13.
        let t = TileAddress::from_lon_lat(-112.009_348, 36.070_918, 13);
        assert_eq!(t, TileAddress::new(1547, 3214, 13));
    }

    #[test]
    fn bounds_contain_source_point() {
        let (lon, lat) = (6.861_778, 45.863_061);
        let t = TileAddress::from_lon_lat(lon, lat, 11);
        let (lon_min, lat_min, lon_max, lat_max) = t.bounds_wgs84();
        assert!(lon >= lon_min && lon < lon_max);
        assert!(lat >= lat_min && lat < lat_max);
    }

    #[test]
    fn world_tile_spans_mercator_limits() {
        let (lon_min, lat_min, lon_max, lat_max) = TileAddress::new(0, 0, 0).bounds_wgs84();
        assert_close(lon_min, -180.0, 1e-9);
        assert_close(lon_max, 180.0, 1e-9);
        assert_close(lat_max, super::MAX_LATITUDE, 1e-9);
        assert_close(lat_min, -super::MAX_LATITUDE, 1e-9);
    }

    #[test]
    fn covering_enumerates_rows_then_columns() {
        let tiles = TileAddress::covering([-10.0, -10.0, 10.0, 10.0], 1);
        assert_eq!(
            tiles,
            vec![
                TileAddress::new(0, 0, 1),
                TileAddress::new(1, 0, 1),
                TileAddress::new(0, 1, 1),
                TileAddress::new(1, 1, 1),
            ]
        );
    }

    #[test]
    fn covering_to_antimeridian_keeps_east_column() {
        let tiles = TileAddress::covering([0.0, -10.0, 180.0, 10.0], 1);
        assert_eq!(tiles, vec![TileAddress::new(1, 0, 1), TileAddress::new(1, 1, 1)]);

        let world = TileAddress::covering([-180.0, -85.0, 180.0, 85.0], 2);
        assert_eq!(world.len(), 16);
    }

    #[test]
    fn zoom_beyond_limit_does_not_overflow() {
        assert_eq!(TileAddress::tiles_per_side(64), 1u64 << super::MAX_ZOOM);
        assert_eq!(TileAddress::from_lon_lat(10.0, 10.0, 200).z, super::MAX_ZOOM);
        assert!(TileAddress::covering([0.0, 0.0, 1.0, 1.0], 64).is_empty());
    }

    #[test]
    fn displays_as_zxy_path() {
        assert_eq!(TileAddress::new(4, 9, 5).to_string(), "5/4/9");
    }
}
