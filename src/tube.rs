//! Triangle meshes extruded along a curve.

use std::f64::consts::TAU;

use crate::{curve::CatmullRomCurve, Vec2, Vec3};

/// Parameters for the construction of a [`TubeMesh`].
#[derive(Clone, Copy, Debug)]
pub struct TubeParams {
    /// Number of segments along the length of the tube. Default: 64.
    pub tubular_segments: usize,
    /// Radius of the tube's cross-section. Default: 1.0.
    pub radius: f64,
    /// Number of subdivisions around the circumference. Default: 8.
    pub radial_segments: usize,
    /// Whether the tube connects back to its start. Default: false.
    ///
    /// This should match the closedness of the curve
    /// for the ends of the tube to meet seamlessly.
    pub closed: bool,
}

impl Default for TubeParams {
    fn default() -> Self {
        Self {
            tubular_segments: 64,
            radius: 1.,
            radial_segments: 8,
            closed: false,
        }
    }
}

/// Default number of tubular segments per path point.
pub const DEFAULT_SEGMENT_RATIO: f64 = 0.5;

/// Number of tubular segments to use for a path with the given number of points,
/// so that mesh density tracks the input resolution.
pub fn segments_for_path(point_count: usize, segment_ratio: f64) -> usize {
    (point_count as f64 * segment_ratio).round() as usize
}

/// A vertex of a [`TubeMesh`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TubeVertex {
    /// Position on the surface of the tube.
    pub position: Vec3,
    /// Outward unit normal, pointing away from the curve.
    pub normal: Vec3,
    /// Texture coordinates.
    ///
    /// `uv.x` is the length coordinate `u` in `[0, 1]`, running along the tube,
    /// and `uv.y` runs around the circumference.
    pub uv: Vec2,
}

impl TubeVertex {
    /// The normalized position of this vertex along the length of the tube.
    #[inline]
    pub fn u(&self) -> f64 {
        self.uv.x
    }
}

/// A tube surface around a curve.
///
/// Vertices are laid out in rings of `radial_segments + 1`,
/// one ring per segment boundary along the curve.
/// The first vertex of each ring is repeated at the end of the ring,
/// and for closed tubes the first ring is repeated at the end with `u = 1`,
/// so that texture coordinates can wrap without a discontinuity.
#[derive(Clone, Debug)]
pub struct TubeMesh {
    /// Vertices ring by ring.
    pub vertices: Vec<TubeVertex>,
    /// Counterclockwise triangles as indices into `vertices`.
    pub indices: Vec<[u32; 3]>,
    tubular_segments: usize,
    radial_segments: usize,
    closed: bool,
}

impl TubeMesh {
    /// Extrude a circular cross-section along a curve.
    pub fn new(curve: &CatmullRomCurve, params: &TubeParams) -> Self {
        let segs = params.tubular_segments;
        let radial = params.radial_segments;
        let frames = curve.frenet_frames(segs, params.closed);

        let ring_count = segs + 1;
        let ring_size = radial + 1;
        let mut vertices = Vec::with_capacity(ring_count * ring_size);

        for ring_idx in 0..ring_count {
            // the last ring of a closed tube duplicates the first one's geometry
            let frame_idx = if params.closed && ring_idx == segs {
                0
            } else {
                ring_idx
            };
            let center = curve.point_at(frame_idx as f64 / segs as f64);
            let n = frames.normals[frame_idx];
            let b = frames.binormals[frame_idx];
            let u = ring_idx as f64 / segs as f64;

            vertices.extend((0..ring_size).map(|j| {
                let v = j as f64 / radial as f64 * TAU;
                let normal = (-v.cos() * n + v.sin() * b).normalize();
                TubeVertex {
                    position: center + params.radius * normal,
                    normal,
                    uv: Vec2::new(u, j as f64 / radial as f64),
                }
            }));
        }

        let ring_size = ring_size as u32;
        let indices = (1..ring_count as u32)
            .flat_map(|j| {
                (1..ring_size).flat_map(move |i| {
                    let a = ring_size * (j - 1) + (i - 1);
                    let b = ring_size * j + (i - 1);
                    let c = ring_size * j + i;
                    let d = ring_size * (j - 1) + i;
                    [[a, b, d], [b, c, d]]
                })
            })
            .collect();

        log::debug!(
            "built tube mesh with {} vertices and {} triangles",
            vertices.len(),
            segs * radial * 2,
        );

        Self {
            vertices,
            indices,
            tubular_segments: segs,
            radial_segments: radial,
            closed: params.closed,
        }
    }

    /// Number of segments along the tube.
    #[inline]
    pub fn tubular_segments(&self) -> usize {
        self.tubular_segments
    }

    /// Number of subdivisions around the tube.
    #[inline]
    pub fn radial_segments(&self) -> usize {
        self.radial_segments
    }

    /// Number of stored vertices, including the ones duplicated at seams.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of geometrically distinct vertices, not counting seam duplicates.
    pub fn unique_vertex_count(&self) -> usize {
        let rings = if self.closed {
            self.tubular_segments
        } else {
            self.tubular_segments + 1
        };
        rings * self.radial_segments
    }

    /// Number of triangles in the mesh.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Axis-aligned bounds of the vertex positions as `(min, max)` corners.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.vertices.iter().fold(
            (Vec3::repeat(f64::MAX), Vec3::repeat(f64::MIN)),
            |(min, max), v| (min.inf(&v.position), max.sup(&v.position)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveType;
    use approx::relative_eq;

    fn circle_curve(point_count: usize) -> CatmullRomCurve {
        let points = (0..point_count)
            .map(|i| {
                let angle = i as f64 / point_count as f64 * TAU;
                Vec3::new(angle.cos(), 0., angle.sin())
            })
            .collect();
        CatmullRomCurve::new(points, true, CurveType::Centripetal)
    }

    /// Count positions that differ by more than a tolerance.
    fn distinct_positions(mesh: &TubeMesh) -> usize {
        let mut distinct: Vec<Vec3> = Vec::new();
        for v in &mesh.vertices {
            if !distinct.iter().any(|d| (d - v.position).norm() < 1e-9) {
                distinct.push(v.position);
            }
        }
        distinct.len()
    }

    #[test]
    fn segment_count_from_points() {
        let ratio = DEFAULT_SEGMENT_RATIO;
        assert_eq!(segments_for_path(4, ratio), 2);
        // halves round up
        assert_eq!(segments_for_path(5, ratio), 3);
        assert_eq!(segments_for_path(1, ratio), 1);
        assert_eq!(segments_for_path(120, ratio), 60);
        assert_eq!(segments_for_path(120, 1.), 120);
    }

    #[test]
    fn element_counts() {
        let curve = circle_curve(12);
        for (segs, radial) in [(3, 3), (2, 8), (24, 8), (7, 5)] {
            let mesh = TubeMesh::new(
                &curve,
                &TubeParams {
                    tubular_segments: segs,
                    radius: 0.1,
                    radial_segments: radial,
                    closed: true,
                },
            );
            assert_eq!(mesh.vertex_count(), (segs + 1) * (radial + 1));
            assert_eq!(mesh.unique_vertex_count(), segs * radial);
            assert_eq!(distinct_positions(&mesh), segs * radial);
            assert_eq!(mesh.triangle_count(), 2 * segs * radial);
            let max_idx = mesh.indices.iter().flatten().max().copied();
            assert_eq!(max_idx, Some(mesh.vertex_count() as u32 - 1));
        }
    }

    #[test]
    fn open_tube_counts() {
        let curve = CatmullRomCurve::new(
            vec![Vec3::zeros(), Vec3::new(1., 0., 0.), Vec3::new(2., 0., 1.)],
            false,
            CurveType::Centripetal,
        );
        let mesh = TubeMesh::new(
            &curve,
            &TubeParams {
                tubular_segments: 4,
                radius: 0.1,
                radial_segments: 6,
                closed: false,
            },
        );
        assert_eq!(mesh.unique_vertex_count(), 5 * 6);
        assert_eq!(distinct_positions(&mesh), 5 * 6);
        assert_eq!(mesh.triangle_count(), 2 * 4 * 6);
    }

    #[test]
    fn vertices_on_tube_surface() {
        let curve = circle_curve(16);
        let radius = 0.05;
        let segs = 20;
        let mesh = TubeMesh::new(
            &curve,
            &TubeParams {
                tubular_segments: segs,
                radius,
                radial_segments: 8,
                closed: true,
            },
        );

        for (ring_idx, ring) in mesh.vertices.chunks(9).enumerate() {
            let u = ring_idx as f64 / segs as f64;
            let center = curve.point_at(if ring_idx == segs { 0. } else { u });
            for v in ring {
                assert!(relative_eq!(v.u(), u));
                assert!(relative_eq!(v.normal.norm(), 1., epsilon = 1e-9));
                assert!(relative_eq!(
                    (v.position - center).norm(),
                    radius,
                    epsilon = 1e-9
                ));
                // normals point away from the curve
                assert!(relative_eq!(
                    v.position,
                    center + radius * v.normal,
                    epsilon = 1e-12
                ));
            }
            // ring closes on itself
            assert!(relative_eq!(ring[0].position, ring[8].position, epsilon = 1e-12));
        }
    }

    #[test]
    fn length_coordinate_spans_tube() {
        let mesh = TubeMesh::new(
            &circle_curve(8),
            &TubeParams {
                tubular_segments: 10,
                radius: 0.01,
                radial_segments: 4,
                closed: true,
            },
        );
        let us: Vec<f64> = mesh.vertices.iter().map(TubeVertex::u).collect();
        assert_eq!(us.first(), Some(&0.));
        assert_eq!(us.last(), Some(&1.));
        assert!(us.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn bounds_contain_curve() {
        let mesh = TubeMesh::new(
            &circle_curve(16),
            &TubeParams {
                tubular_segments: 32,
                radius: 0.1,
                radial_segments: 8,
                closed: true,
            },
        );
        let (min, max) = mesh.bounds();
        assert!(min.x < -1. && max.x > 1.);
        assert!(min.z < -1. && max.z > 1.);
        assert!(relative_eq!(max.y, 0.1, epsilon = 1e-6));
    }
}
