//! Map projections from geographic coordinates to the plane.

use crate::{Vec2, Vec3};

/// A (longitude, latitude) pair in degrees.
///
/// Deserializes from a two-element array `[lon, lat]`,
/// which is the coordinate order used by GeoJSON.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(from = "[f64; 2]")]
pub struct GeoPoint {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl GeoPoint {
    /// Create a point from a longitude and latitude in degrees.
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

/// A deterministic mapping from geographic coordinates to planar coordinates.
pub trait Projection {
    /// Project a single point.
    fn project(&self, p: GeoPoint) -> Vec2;
}

/// Spherical Mercator projection.
///
/// The y axis points south (downwards on a screen),
/// so north ends up at negative y.
#[derive(Clone, Copy, Debug)]
pub struct Mercator {
    /// Planar units per radian. Default: 50.
    pub scale: f64,
    /// Offset added after scaling. Default: (480, 250).
    ///
    /// This has no effect after [`project_path`]'s origin normalization
    /// but is kept so that single projected points
    /// match conventional web map coordinates.
    pub translate: Vec2,
}

impl Default for Mercator {
    fn default() -> Self {
        Self {
            scale: 50.,
            translate: Vec2::new(480., 250.),
        }
    }
}

impl Mercator {
    /// Create a Mercator projection with the given scale and the default translation.
    pub fn with_scale(scale: f64) -> Self {
        Self {
            scale,
            ..Default::default()
        }
    }
}

impl Projection for Mercator {
    fn project(&self, p: GeoPoint) -> Vec2 {
        let lambda = p.lon.to_radians();
        let phi = p.lat.to_radians();
        let y = f64::ln(f64::tan(std::f64::consts::FRAC_PI_4 + phi / 2.));
        Vec2::new(
            self.scale * lambda + self.translate.x,
            -self.scale * y + self.translate.y,
        )
    }
}

/// Equirectangular (plate carrée) projection.
#[derive(Clone, Copy, Debug)]
pub struct Equirectangular {
    /// Planar units per radian. Default: 50.
    pub scale: f64,
    /// Offset added after scaling. Default: (480, 250).
    pub translate: Vec2,
}

impl Default for Equirectangular {
    fn default() -> Self {
        Self {
            scale: 50.,
            translate: Vec2::new(480., 250.),
        }
    }
}

impl Projection for Equirectangular {
    fn project(&self, p: GeoPoint) -> Vec2 {
        Vec2::new(
            self.scale * p.lon.to_radians() + self.translate.x,
            -self.scale * p.lat.to_radians() + self.translate.y,
        )
    }
}

/// Project a path of geographic points,
/// translating the result so that the first point lies at the origin.
///
/// The output has the same length and order as the input.
pub fn project_path<P: Projection + ?Sized>(projection: &P, points: &[GeoPoint]) -> Vec<Vec2> {
    let mut projected: Vec<Vec2> = points.iter().map(|&p| projection.project(p)).collect();
    if let Some(&origin) = projected.first() {
        for p in &mut projected {
            *p -= origin;
        }
    }
    projected
}

/// Place a projected point on the horizontal XZ plane of 3D space.
///
/// The vertical Y axis is held at zero.
#[inline]
pub fn embed(p: Vec2) -> Vec3 {
    Vec3::new(p.x, 0., p.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{abs_diff_eq, relative_eq};

    fn unit_square() -> Vec<GeoPoint> {
        [[0., 0.], [1., 0.], [1., 1.], [0., 1.]]
            .into_iter()
            .map(GeoPoint::from)
            .collect()
    }

    #[test]
    fn first_point_is_origin() {
        let paths = [
            unit_square(),
            vec![GeoPoint::new(116.39, 39.91), GeoPoint::new(121.47, 31.23)],
            vec![GeoPoint::new(-73.9, 40.7)],
        ];
        for path in &paths {
            for projected in [
                project_path(&Mercator::default(), path),
                project_path(&Equirectangular::default(), path),
            ] {
                assert_eq!(projected.len(), path.len());
                assert_eq!(projected[0], Vec2::zeros());
            }
        }
        assert!(project_path(&Mercator::default(), &[]).is_empty());
    }

    #[test]
    fn mercator_values() {
        let merc = Mercator::with_scale(50.);
        let projected = project_path(&merc, &unit_square());

        let one_degree = 50. * 1f64.to_radians();
        // y of 1 degree north in mercator is slightly more than 1 degree
        let one_degree_north = -50. * f64::ln(f64::tan(
            std::f64::consts::FRAC_PI_4 + 0.5f64.to_radians(),
        ));
        let expected = [
            Vec2::new(0., 0.),
            Vec2::new(one_degree, 0.),
            Vec2::new(one_degree, one_degree_north),
            Vec2::new(0., one_degree_north),
        ];
        for (p, e) in projected.iter().zip(&expected) {
            assert!(relative_eq!(p, e, epsilon = 1e-12), "{p} != {e}");
        }
        // north is towards negative y, and mercator stretches latitudes
        assert!(one_degree_north < 0.);
        assert!(-one_degree_north > one_degree);
    }

    #[test]
    fn translate_does_not_affect_normalized_path() {
        let a = project_path(&Mercator::default(), &unit_square());
        let b = project_path(
            &Mercator {
                scale: 50.,
                translate: Vec2::new(-12., 3000.),
            },
            &unit_square(),
        );
        for (pa, pb) in a.iter().zip(&b) {
            assert!(abs_diff_eq!(pa, pb, epsilon = 1e-9));
        }
    }

    #[test]
    fn embed_on_horizontal_plane() {
        let p = embed(Vec2::new(0.5, -2.));
        assert_eq!(p, Vec3::new(0.5, 0., -2.));
    }

    #[test]
    fn deserialize_pairs() {
        let points: Vec<GeoPoint> = serde_json::from_str("[[116.4, 39.9], [-0.1, 51.5]]").unwrap();
        assert_eq!(
            points,
            vec![GeoPoint::new(116.4, 39.9), GeoPoint::new(-0.1, 51.5)]
        );
    }
}
