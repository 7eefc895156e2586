//! Geodetic (latitude/longitude) coordinates on a spherical planet.

use glam::DVec3;

/// A latitude/longitude pair in radians.
///
/// Latitude is in `[-PI/2, PI/2]`, longitude in `[-PI, PI]`. Neither is
/// clamped by the constructor; callers are expected to stay in range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geodetic {
    /// Latitude in radians.
    pub lat: f64,
    /// Longitude in radians.
    pub lon: f64,
}

impl Geodetic {
    /// Create from radians.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Create from degrees.
    pub fn from_degrees(lat_deg: f64, lon_deg: f64) -> Self {
        Self {
            lat: lat_deg.to_radians(),
            lon: lon_deg.to_radians(),
        }
    }

    /// Latitude in degrees.
    pub fn lat_degrees(&self) -> f64 {
        self.lat.to_degrees()
    }

    /// Longitude in degrees.
    pub fn lon_degrees(&self) -> f64 {
        self.lon.to_degrees()
    }

    /// Unit direction vector from the planet center toward this coordinate.
    ///
    /// Uses the convention x = cos(lat)·cos(lon), y = cos(lat)·sin(lon),
    /// z = sin(lat), so +z is the north pole and lon 0 lies on the +x axis.
    pub fn to_unit(&self) -> DVec3 {
        let (sin_lat, cos_lat) = self.lat.sin_cos();
        let (sin_lon, cos_lon) = self.lon.sin_cos();
        DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    /// Project onto a sphere of the given radius, centered at the origin.
    ///
    /// The direction is re-normalized before scaling so the result lies on
    /// the sphere to f64 accuracy even for inputs assembled from averaged
    /// components.
    pub fn to_cartesian(&self, radius: f64) -> DVec3 {
        self.to_unit().normalize() * radius
    }

    /// Recover a geodetic coordinate from a cartesian point (any radius).
    pub fn from_cartesian(p: DVec3) -> Self {
        let lat = p.z.atan2((p.x * p.x + p.y * p.y).sqrt());
        let lon = p.y.atan2(p.x);
        Self { lat, lon }
    }

    /// Great-circle-aware midpoint of two coordinates.
    ///
    /// Computed as the normalized chord midpoint of the two unit vectors,
    /// which lies on the great circle between them. Two degenerate inputs
    /// are handled explicitly:
    /// - near-antipodal pairs, where the chord midpoint vanishes, fall back
    ///   to the component-wise lat/lon average;
    /// - results at a pole, where longitude is numerically meaningless,
    ///   take the circular mean of the input longitudes so that midpoints
    ///   along a polar edge still partition it in lat/lon space.
    pub fn midpoint(&self, other: &Geodetic) -> Geodetic {
        const CHORD_EPS: f64 = 1e-9;
        const POLE_EPS: f64 = 1e-12;

        let sum = self.to_unit() + other.to_unit();
        if sum.length_squared() < CHORD_EPS * CHORD_EPS {
            return Geodetic::new((self.lat + other.lat) * 0.5, (self.lon + other.lon) * 0.5);
        }

        let mid = Geodetic::from_cartesian(sum);
        if (mid.lat.abs() - std::f64::consts::FRAC_PI_2).abs() < POLE_EPS
            || mid.lat.abs() > std::f64::consts::FRAC_PI_2
        {
            let lon = circular_mean(self.lon, other.lon);
            return Geodetic::new(mid.lat.clamp(
                -std::f64::consts::FRAC_PI_2,
                std::f64::consts::FRAC_PI_2,
            ), lon);
        }
        mid
    }
}

/// Mean of two angles that respects wrap-around at ±PI.
fn circular_mean(a: f64, b: f64) -> f64 {
    let x = a.cos() + b.cos();
    let y = a.sin() + b.sin();
    if x.abs() < 1e-12 && y.abs() < 1e-12 {
        // Opposite directions; the plain average is as good as any.
        return (a + b) * 0.5;
    }
    y.atan2(x)
}
