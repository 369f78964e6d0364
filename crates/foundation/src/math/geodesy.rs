use super::{Ecef, Vec3};

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);
/// WGS84 second eccentricity squared.
pub const WGS84_EP2: f64 = (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);

/// Geodetic coordinates in radians and meters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Geodetic {
    pub lat_rad: f64,
    pub lon_rad: f64,
    pub alt_m: f64,
}

impl Geodetic {
    pub fn new(lat_rad: f64, lon_rad: f64, alt_m: f64) -> Self {
        Self {
            lat_rad,
            lon_rad,
            alt_m,
        }
    }

    /// Builds from longitude/latitude in degrees, the order terrain meshes use.
    pub fn from_lon_lat_deg(lon_deg: f64, lat_deg: f64, alt_m: f64) -> Self {
        Self::new(lat_deg.to_radians(), lon_deg.to_radians(), alt_m)
    }
}

/// Biaxial reference ellipsoid (equatorial radius `a`, polar radius `b`).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ellipsoid {
    pub a: f64,
    pub b: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: WGS84_A,
        b: WGS84_B,
    };

    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        1.0 - (self.b * self.b) / (self.a * self.a)
    }

    pub fn radii(&self) -> Vec3 {
        Vec3::new(self.a, self.a, self.b)
    }

    pub fn geodetic_to_ecef(&self, geo: Geodetic) -> Ecef {
        let e2 = self.e2();
        let sin_lat = geo.lat_rad.sin();
        let cos_lat = geo.lat_rad.cos();
        let sin_lon = geo.lon_rad.sin();
        let cos_lon = geo.lon_rad.cos();

        let n = self.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let x = (n + geo.alt_m) * cos_lat * cos_lon;
        let y = (n + geo.alt_m) * cos_lat * sin_lon;
        let z = (n * (1.0 - e2) + geo.alt_m) * sin_lat;

        Ecef::new(x, y, z)
    }

    /// Maps an ECEF point into the space where this ellipsoid is the unit sphere.
    pub fn to_scaled_space(&self, p: Vec3) -> Vec3 {
        p.div_elem(self.radii())
    }

    pub fn from_scaled_space(&self, p: Vec3) -> Vec3 {
        p.mul_elem(self.radii())
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

pub fn geodetic_to_ecef(geo: Geodetic) -> Ecef {
    Ellipsoid::WGS84.geodetic_to_ecef(geo)
}

pub fn ecef_to_geodetic(ecef: Ecef) -> Geodetic {
    let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
    let lon = ecef.y.atan2(ecef.x);

    let theta = (ecef.z * WGS84_A).atan2(p * WGS84_B);
    let sin_theta = theta.sin();
    let cos_theta = theta.cos();

    let lat = (ecef.z + WGS84_EP2 * WGS84_B * sin_theta * sin_theta * sin_theta)
        .atan2(p - WGS84_E2 * WGS84_A * cos_theta * cos_theta * cos_theta);

    let sin_lat = lat.sin();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    let alt = p / lat.cos() - n;

    Geodetic::new(lat, lon, alt)
}
