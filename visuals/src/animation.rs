//! Parameters for animated visuals.

use geotube::{highlight::srgb_hex, HighlightMaterial, TubeMesh};

use crate::{
    camera::{CameraParams, OrbitParams},
    pipelines::helpers::{AxesParams, GridParams},
};

/// A tube with a highlight traveling along it.
///
/// To display the animation in a window,
/// use [`RenderWindow::run_animation`][crate::RenderWindow::run_animation].
/// The mesh is uploaded to the GPU once;
/// each frame only moves the highlight and the camera.
pub struct Animation<'mesh> {
    /// The tube to draw, typically [`Route::mesh`][geotube::Route::mesh].
    pub mesh: &'mesh TubeMesh,
    /// Control parameters.
    pub params: AnimationParams,
}

/// Parameters to control aspects of an [`Animation`].
#[derive(Clone, Copy, Debug)]
pub struct AnimationParams {
    /// Amount the highlight moves along the tube per frame,
    /// as a fraction of the tube's length. Default: 0.005.
    pub step: f64,
    /// Shape and colors of the highlight.
    pub material: HighlightMaterial,
    /// Color the frame is cleared to. Default: `#BFE3DD`.
    pub background: palette::LinSrgb,
    /// Reference grid on the ground plane. Default: `Some(GridParams::default())`.
    pub grid: Option<GridParams>,
    /// Coordinate axes at the origin. Default: `Some(AxesParams::default())`.
    pub axes: Option<AxesParams>,
    /// Initial camera placement.
    pub camera: CameraParams,
    /// Mouse control settings.
    pub orbit: OrbitParams,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            step: 0.005,
            material: HighlightMaterial::default(),
            background: srgb_hex(0xbfe3dd),
            grid: Some(GridParams::default()),
            axes: Some(AxesParams::default()),
            camera: CameraParams::default(),
            orbit: OrbitParams::default(),
        }
    }
}
