//! The traveling highlight effect.
//!
//! The effect is a pure per-vertex function of the vertex attributes
//! and a handful of uniforms, of which only `time` changes between frames.
//! Vertices whose length coordinate lies within `half_width` of `time`
//! are pushed outward along their normal and recolored.
//! Nothing on the host side is rebuilt as the highlight moves;
//! an animation frame is a single uniform update.
//!
//! The same logic runs on the GPU in `geotube-visuals`' `highlight.wgsl`.
//! The functions here are its reference implementation.
//!
//! The window is a plain interval on `u` and does not wrap around.
//! On a closed tube a vertex at `u ≈ 0` does not light up when `time ≈ 1`
//! even though the two are next to each other in space.

use palette::{LinSrgb, Srgb};

use crate::{tube::TubeMesh, tube::TubeVertex, Vec3};

/// Whether a vertex at length coordinate `u` is inside the highlight window.
#[inline]
pub fn is_highlighted(u: f64, time: f64, half_width: f64) -> bool {
    (u - time).abs() < half_width
}

/// Constant parameters of the highlight effect, fixed when the material is created.
#[derive(Clone, Copy, Debug)]
pub struct HighlightMaterial {
    /// Half of the highlight window's extent in the length coordinate.
    /// Default: 0.05.
    pub half_width: f64,
    /// Distance that highlighted vertices are pushed out along their normal.
    /// Default: 0.001.
    pub displacement: f64,
    /// Color of the tube outside the highlight. Default: white.
    pub base_color: LinSrgb,
    /// Color inside the highlight. Default: `#BFE3DD`.
    pub highlight_color: LinSrgb,
}

impl Default for HighlightMaterial {
    fn default() -> Self {
        Self {
            half_width: 0.05,
            displacement: 0.001,
            base_color: srgb_hex(0xffffff),
            highlight_color: srgb_hex(0xbfe3dd),
        }
    }
}

impl HighlightMaterial {
    /// Combine the material with the current animation time
    /// into the full set of shader inputs for a frame.
    #[inline]
    pub fn uniforms(&self, time: f64) -> HighlightUniforms {
        HighlightUniforms {
            time,
            half_width: self.half_width,
            displacement: self.displacement,
            base_color: self.base_color,
            highlight_color: self.highlight_color,
        }
    }
}

/// Convert a color given as a sRGB hexadecimal code in 0xRRGGBB format
/// to linear sRGB.
pub fn srgb_hex(val: u32) -> LinSrgb {
    let srgb_u8: Srgb<u8> = Srgb::from(val);
    srgb_u8.into_format::<f32>().into_linear()
}

/// Everything the highlight shader reads for one frame.
#[derive(Clone, Copy, Debug)]
pub struct HighlightUniforms {
    /// Current animation time in `[0, 1)`, the center of the highlight window.
    pub time: f64,
    /// See [`HighlightMaterial::half_width`].
    pub half_width: f64,
    /// See [`HighlightMaterial::displacement`].
    pub displacement: f64,
    /// See [`HighlightMaterial::base_color`].
    pub base_color: LinSrgb,
    /// See [`HighlightMaterial::highlight_color`].
    pub highlight_color: LinSrgb,
}

/// Output of the vertex stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadedVertex {
    /// Possibly displaced position, before the view-projection transform.
    pub position: Vec3,
    /// Color passed on to the fragment stage.
    pub color: LinSrgb,
}

impl HighlightUniforms {
    /// Vertex stage: displace and recolor a vertex inside the window.
    pub fn shade_vertex(&self, v: &TubeVertex) -> ShadedVertex {
        if is_highlighted(v.u(), self.time, self.half_width) {
            ShadedVertex {
                position: v.position + v.normal * self.displacement,
                color: self.highlight_color,
            }
        } else {
            ShadedVertex {
                position: v.position,
                color: self.base_color,
            }
        }
    }

    /// Fragment stage: the interpolated color, fully opaque.
    #[inline]
    pub fn shade_fragment(&self, color: LinSrgb) -> [f32; 4] {
        [color.red, color.green, color.blue, 1.]
    }

    /// Run the vertex stage over every vertex of a mesh.
    pub fn shade_mesh(&self, mesh: &TubeMesh) -> Vec<ShadedVertex> {
        mesh.vertices.iter().map(|v| self.shade_vertex(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{curve::CatmullRomCurve, curve::CurveType, tube::TubeParams, Vec2};
    use approx::relative_eq;

    fn vertex_at(u: f64) -> TubeVertex {
        TubeVertex {
            position: Vec3::new(1., 2., 3.),
            normal: Vec3::y(),
            uv: Vec2::new(u, 0.),
        }
    }

    #[test]
    fn window_membership() {
        let w = 0.05;
        for time in [0., 0.2, 0.5, 0.97] {
            for i in 0..100 {
                let u = i as f64 / 100.;
                assert_eq!(is_highlighted(u, time, w), (u - time).abs() < w);
            }
        }
        assert!(is_highlighted(0.5, 0.5, w));
        assert!(is_highlighted(0.46, 0.5, w));
        assert!(!is_highlighted(0.56, 0.5, w));
        // the window is open at its ends
        assert!(!is_highlighted(0.75, 0.5, 0.25));
    }

    #[test]
    fn window_does_not_wrap() {
        // next to each other on a closed tube, but not in u
        assert!(!is_highlighted(0.01, 0.99, 0.05));
        assert!(!is_highlighted(0.99, 0.01, 0.05));
    }

    #[test]
    fn displaces_and_recolors_inside_window() {
        let material = HighlightMaterial {
            displacement: 0.25,
            ..Default::default()
        };
        let uniforms = material.uniforms(0.5);

        let inside = uniforms.shade_vertex(&vertex_at(0.52));
        assert_eq!(inside.position, Vec3::new(1., 2.25, 3.));
        assert_eq!(inside.color, material.highlight_color);

        let outside = uniforms.shade_vertex(&vertex_at(0.3));
        assert_eq!(outside.position, Vec3::new(1., 2., 3.));
        assert_eq!(outside.color, material.base_color);
    }

    #[test]
    fn fragment_is_opaque() {
        let uniforms = HighlightMaterial::default().uniforms(0.);
        let [r, g, b, a] = uniforms.shade_fragment(LinSrgb::new(0.1, 0.2, 0.3));
        assert_eq!((r, g, b, a), (0.1, 0.2, 0.3, 1.));
    }

    #[test]
    fn default_colors() {
        let material = HighlightMaterial::default();
        assert_eq!(material.base_color, LinSrgb::new(1., 1., 1.));
        // 0xbf = 191 in sRGB is about 0.521 in linear space
        assert!(relative_eq!(
            material.highlight_color.red,
            0.521,
            epsilon = 1e-3
        ));
        assert!(material.highlight_color.green > material.highlight_color.red);
    }

    #[test]
    fn mesh_shading_matches_per_vertex() {
        let curve = CatmullRomCurve::new(
            vec![
                Vec3::zeros(),
                Vec3::new(1., 0., 0.),
                Vec3::new(1., 0., 1.),
                Vec3::new(0., 0., 1.),
            ],
            true,
            CurveType::CatmullRom { tension: 0. },
        );
        let mesh = TubeMesh::new(
            &curve,
            &TubeParams {
                tubular_segments: 40,
                radius: 0.01,
                radial_segments: 6,
                closed: true,
            },
        );
        let uniforms = HighlightMaterial::default().uniforms(0.31);
        let shaded = uniforms.shade_mesh(&mesh);
        assert_eq!(shaded.len(), mesh.vertex_count());

        let mut highlighted = 0;
        for (v, s) in mesh.vertices.iter().zip(&shaded) {
            if is_highlighted(v.u(), 0.31, 0.05) {
                highlighted += 1;
                assert_eq!(s.color, uniforms.highlight_color);
                assert!(relative_eq!(
                    (s.position - v.position).norm(),
                    0.001,
                    epsilon = 1e-12
                ));
            } else {
                assert_eq!(s.color, uniforms.base_color);
                assert_eq!(s.position, v.position);
            }
        }
        // rings at u = 0.275, 0.3, 0.325 and 0.35, each with 7 vertices
        assert_eq!(highlighted, 4 * 7);
    }
}
