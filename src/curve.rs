//! Interpolating Catmull-Rom splines and the frames used to extrude along them.

use itertools::Itertools;
use nalgebra as na;
use std::cell::OnceCell;

use crate::Vec3;

/// Number of samples used to approximate arc length.
const ARC_LENGTH_DIVISIONS: usize = 200;
/// Step used for finite difference tangents.
const TANGENT_DELTA: f64 = 1e-4;

/// Parameterization of a [`CatmullRomCurve`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CurveType {
    /// Uniform parameterization with tangents scaled by `tension`.
    ///
    /// A tension of 0 gives zero tangents at the control points,
    /// easing in and out of every one of them.
    CatmullRom {
        /// Scaling factor for the tangents.
        tension: f64,
    },
    /// Knot intervals proportional to the square root of the distance
    /// between control points. Avoids cusps and self-intersections.
    Centripetal,
    /// Knot intervals proportional to the distance between control points.
    Chordal,
}

impl Default for CurveType {
    fn default() -> Self {
        Self::CatmullRom { tension: 0.5 }
    }
}

/// A piecewise cubic spline passing through every control point in order.
#[derive(Clone, Debug)]
pub struct CatmullRomCurve {
    points: Vec<Vec3>,
    closed: bool,
    curve_type: CurveType,
    /// cumulative lengths at evenly spaced parameter values,
    /// computed lazily on the first arc-length query
    arc_lengths: OnceCell<Vec<f64>>,
}

/// Rotation-minimizing frames sampled at evenly spaced arc-length positions.
///
/// All three vectors are unit length and mutually orthogonal at each sample.
#[derive(Clone, Debug)]
pub struct FrenetFrames {
    /// Unit tangents of the curve.
    pub tangents: Vec<Vec3>,
    /// Normals, used together with binormals to span the cross-section plane.
    pub normals: Vec<Vec3>,
    /// Binormals, `tangent × normal`.
    pub binormals: Vec<Vec3>,
}

impl CatmullRomCurve {
    /// Create a curve through the given points.
    ///
    /// A closed curve continues from the last point back to the first.
    pub fn new(points: Vec<Vec3>, closed: bool, curve_type: CurveType) -> Self {
        Self {
            points,
            closed,
            curve_type,
            arc_lengths: OnceCell::new(),
        }
    }

    /// The control points of the curve.
    #[inline]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Whether the curve wraps back to its start.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Get the point at parameter `t` in `[0, 1]`.
    ///
    /// Each span between consecutive control points
    /// takes an equal share of the parameter range,
    /// so this is not proportional to distance along the curve.
    /// See [`point_at`][Self::point_at] for that.
    pub fn point(&self, t: f64) -> Vec3 {
        let len = self.points.len();
        let span_count = if self.closed { len } else { len - 1 };
        let p = span_count as f64 * t;
        let mut span = p.floor() as isize;
        let mut weight = p - p.floor();

        if !self.closed && weight == 0. && span == len as isize - 1 {
            span = len as isize - 2;
            weight = 1.;
        }

        let wrapped = |i: isize| self.points[i.rem_euclid(len as isize) as usize];

        let p0 = if self.closed || span > 0 {
            wrapped(span - 1)
        } else {
            // extrapolate before the first point
            2. * self.points[0] - self.points[1]
        };
        let p1 = wrapped(span);
        let p2 = wrapped(span + 1);
        let p3 = if self.closed || span + 2 < len as isize {
            wrapped(span + 2)
        } else {
            // and after the last
            2. * self.points[len - 1] - self.points[len - 2]
        };

        let poly = match self.curve_type {
            CurveType::CatmullRom { tension } => {
                CubicPoly::hermite(p1, p2, tension * (p2 - p0), tension * (p3 - p1))
            }
            CurveType::Centripetal => CubicPoly::nonuniform(p0, p1, p2, p3, 0.25),
            CurveType::Chordal => CubicPoly::nonuniform(p0, p1, p2, p3, 0.5),
        };
        poly.eval(weight)
    }

    /// Get the unit tangent at parameter `t` in `[0, 1]`.
    pub fn tangent(&self, t: f64) -> Vec3 {
        let t1 = (t - TANGENT_DELTA).max(0.);
        let t2 = (t + TANGENT_DELTA).min(1.);
        (self.point(t2) - self.point(t1)).normalize()
    }

    /// Cumulative arc lengths at `ARC_LENGTH_DIVISIONS + 1` evenly spaced parameter values.
    pub fn arc_lengths(&self) -> &[f64] {
        self.arc_lengths.get_or_init(|| {
            let samples = (0..=ARC_LENGTH_DIVISIONS)
                .map(|d| self.point(d as f64 / ARC_LENGTH_DIVISIONS as f64));
            std::iter::once(0.)
                .chain(samples.tuple_windows().scan(0., |sum, (prev, curr)| {
                    *sum += (curr - prev).norm();
                    Some(*sum)
                }))
                .collect()
        })
    }

    /// Approximate total length of the curve.
    pub fn length(&self) -> f64 {
        *self.arc_lengths().last().unwrap_or(&0.)
    }

    /// Map a fraction `u` of the total arc length to the curve parameter `t`.
    pub fn u_to_t(&self, u: f64) -> f64 {
        let lengths = self.arc_lengths();
        let last = lengths.len() - 1;
        let target = u * lengths[last];

        // last sample at or before the target length
        let i = lengths
            .partition_point(|&l| l <= target)
            .saturating_sub(1)
            .min(last);
        if lengths[i] == target || i == last {
            return i as f64 / last as f64;
        }

        let segment_length = lengths[i + 1] - lengths[i];
        let segment_fraction = (target - lengths[i]) / segment_length;
        (i as f64 + segment_fraction) / last as f64
    }

    /// Get the point at fraction `u` of the total arc length.
    #[inline]
    pub fn point_at(&self, u: f64) -> Vec3 {
        self.point(self.u_to_t(u))
    }

    /// Get the unit tangent at fraction `u` of the total arc length.
    #[inline]
    pub fn tangent_at(&self, u: f64) -> Vec3 {
        self.tangent(self.u_to_t(u))
    }

    /// Compute `segments + 1` frames at evenly spaced arc-length positions.
    ///
    /// Frames are propagated along the curve with minimal rotation.
    /// If `closed` is set, the twist left between the first and last frame
    /// is spread evenly over the whole curve so that the ends line up.
    pub fn frenet_frames(&self, segments: usize, closed: bool) -> FrenetFrames {
        let tangents: Vec<Vec3> = (0..=segments)
            .map(|i| self.tangent_at(i as f64 / segments as f64).normalize())
            .collect();
        let mut normals = Vec::with_capacity(segments + 1);
        let mut binormals = Vec::with_capacity(segments + 1);

        // initial normal along the axis the first tangent is least aligned with
        let t0 = tangents[0];
        let mut min = f64::MAX;
        let mut axis = Vec3::zeros();
        for (i, component) in t0.iter().enumerate() {
            if component.abs() <= min {
                min = component.abs();
                axis = Vec3::ith(i, 1.);
            }
        }
        let side = t0.cross(&axis).normalize();
        let mut normal = t0.cross(&side);
        normals.push(normal);
        binormals.push(t0.cross(&normal));

        for (prev_t, curr_t) in tangents.iter().tuple_windows() {
            let rot_axis = prev_t.cross(curr_t);
            if rot_axis.norm() > f64::EPSILON {
                let theta = prev_t.dot(curr_t).clamp(-1., 1.).acos();
                let rot =
                    na::Rotation3::from_axis_angle(&na::Unit::new_normalize(rot_axis), theta);
                normal = rot * normal;
            }
            binormals.push(curr_t.cross(&normal));
            normals.push(normal);
        }

        if closed {
            let mut theta =
                normals[0].dot(&normals[segments]).clamp(-1., 1.).acos() / segments as f64;
            if t0.dot(&normals[0].cross(&normals[segments])) > 0. {
                theta = -theta;
            }
            for i in 1..=segments {
                let rot = na::Rotation3::from_axis_angle(
                    &na::Unit::new_normalize(tangents[i]),
                    theta * i as f64,
                );
                normals[i] = rot * normals[i];
                binormals[i] = tangents[i].cross(&normals[i]);
            }
        }

        FrenetFrames {
            tangents,
            normals,
            binormals,
        }
    }
}

/// Cubic polynomial `c0 + c1 t + c2 t² + c3 t³` over a span of the curve.
struct CubicPoly {
    c: [Vec3; 4],
}

impl CubicPoly {
    /// Hermite form from end points and end tangents.
    fn hermite(x0: Vec3, x1: Vec3, t0: Vec3, t1: Vec3) -> Self {
        Self {
            c: [
                x0,
                t0,
                -3. * x0 + 3. * x1 - 2. * t0 - t1,
                2. * x0 - 2. * x1 + t0 + t1,
            ],
        }
    }

    /// Non-uniform Catmull-Rom span from `x1` to `x2`,
    /// with knot intervals given by squared distances raised to `pow`.
    fn nonuniform(x0: Vec3, x1: Vec3, x2: Vec3, x3: Vec3, pow: f64) -> Self {
        let mut dt0 = (x1 - x0).norm_squared().powf(pow);
        let mut dt1 = (x2 - x1).norm_squared().powf(pow);
        let mut dt2 = (x3 - x2).norm_squared().powf(pow);

        // safety check for repeated points
        if dt1 < 1e-4 {
            dt1 = 1.;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        let t1 = (x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1;
        let t2 = (x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2;
        // rescale tangents for parameterization in [0, 1]
        Self::hermite(x1, x2, t1 * dt1, t2 * dt1)
    }

    fn eval(&self, t: f64) -> Vec3 {
        let [c0, c1, c2, c3] = self.c;
        c0 + t * (c1 + t * (c2 + t * c3))
    }
}
