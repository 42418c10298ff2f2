//! Building the renderable tube for a geographic path in one go.

use crate::{
    curve::{CatmullRomCurve, CurveType},
    projection::{embed, project_path, Mercator, Projection},
    tube::{segments_for_path, TubeMesh, TubeParams, DEFAULT_SEGMENT_RATIO},
    GeoPoint, Vec2,
};

/// Parameters for building a [`Route`].
#[derive(Clone, Copy, Debug)]
pub struct RouteParams<P: Projection = Mercator> {
    /// Map projection applied to the input. Default: Mercator at scale 50.
    pub projection: P,
    /// Interpolation used for the curve.
    /// Default: `CurveType::CatmullRom { tension: 0.0 }`.
    pub curve_type: CurveType,
    /// Whether the path loops back to its start. Default: true.
    pub closed: bool,
    /// Tube segments per input point. Default: 0.5.
    ///
    /// The segment count is `round(point_count * segment_ratio)`.
    pub segment_ratio: f64,
    /// Radius of the tube. Default: 0.003.
    pub tube_radius: f64,
    /// Subdivisions around the tube. Default: 8.
    pub radial_segments: usize,
}

impl Default for RouteParams {
    fn default() -> Self {
        Self {
            projection: Mercator::default(),
            curve_type: CurveType::CatmullRom { tension: 0. },
            closed: true,
            segment_ratio: DEFAULT_SEGMENT_RATIO,
            tube_radius: 0.003,
            radial_segments: 8,
        }
    }
}

impl<P: Projection> RouteParams<P> {
    /// Tube parameters for a path with the given number of points.
    pub fn tube_params(&self, point_count: usize) -> TubeParams {
        TubeParams {
            tubular_segments: segments_for_path(point_count, self.segment_ratio),
            radius: self.tube_radius,
            radial_segments: self.radial_segments,
            closed: self.closed,
        }
    }
}

/// A projected path together with its curve and tube mesh.
///
/// Everything here is computed once and not modified afterwards.
#[derive(Clone, Debug)]
pub struct Route {
    /// Path points after projection, starting at the origin.
    pub projected: Vec<Vec2>,
    /// Curve through the projected points on the XZ plane.
    pub curve: CatmullRomCurve,
    /// Tube around the curve.
    pub mesh: TubeMesh,
}

impl Route {
    /// Project the points, fit a curve through them and build a tube around it.
    pub fn build<P: Projection>(points: &[GeoPoint], params: &RouteParams<P>) -> Self {
        let projected = project_path(&params.projection, points);
        let curve = CatmullRomCurve::new(
            projected.iter().copied().map(embed).collect(),
            params.closed,
            params.curve_type,
        );
        let mesh = TubeMesh::new(&curve, &params.tube_params(points.len()));
        log::info!(
            "built route: {} points, curve length {:.4}, {} tube segments, {} vertices, {} triangles",
            projected.len(),
            curve.length(),
            mesh.tubular_segments(),
            mesh.vertex_count(),
            mesh.triangle_count(),
        );

        Self {
            projected,
            curve,
            mesh,
        }
    }
}
