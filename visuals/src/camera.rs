//! Perspective camera and mouse controls for orbiting around a point.

use std::f32::consts::{PI, TAU};

use nalgebra as na;

/// Parameters for the initial placement of a [`Camera`].
#[derive(Clone, Copy, Debug)]
pub struct CameraParams {
    /// Position of the camera. Default: (0, 1, 1).
    pub position: na::Point3<f32>,
    /// Point the camera looks at and orbits around. Default: the origin.
    pub target: na::Point3<f32>,
    /// Vertical field of view in degrees. Default: 70.
    pub fov_y_degrees: f32,
    /// Distance to the near clipping plane. Default: 0.1.
    pub z_near: f32,
    /// Distance to the far clipping plane. Default: 1000.
    pub z_far: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            position: na::Point3::new(0., 1., 1.),
            target: na::Point3::origin(),
            fov_y_degrees: 70.,
            z_near: 0.1,
            z_far: 1000.,
        }
    }
}

/// A camera determines where the viewer of a visualization is in 3D space.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// Position of the viewer.
    pub eye: na::Point3<f32>,
    /// Point in the center of the view.
    pub target: na::Point3<f32>,
    /// World-space up direction.
    pub up: na::Vector3<f32>,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Distance to the near clipping plane.
    pub z_near: f32,
    /// Distance to the far clipping plane.
    pub z_far: f32,
    /// Width divided by height of the viewport.
    pub aspect: f32,
}

/// Maps OpenGL-style clip space depth in [-1, 1]
/// (which is what `na::Perspective3` produces)
/// to the [0, 1] range wgpu expects.
#[rustfmt::skip]
fn opengl_to_wgpu() -> na::Matrix4<f32> {
    na::Matrix4::new(
        1., 0., 0., 0.,
        0., 1., 0., 0.,
        0., 0., 0.5, 0.5,
        0., 0., 0., 1.,
    )
}

impl Camera {
    /// Create a camera for a viewport with the given aspect ratio.
    pub fn new(params: &CameraParams, aspect: f32) -> Self {
        Self {
            eye: params.position,
            target: params.target,
            up: na::Vector3::y(),
            fov_y: params.fov_y_degrees.to_radians(),
            z_near: params.z_near,
            z_far: params.z_far,
            aspect,
        }
    }

    /// Update the aspect ratio to match a viewport size in pixels.
    ///
    /// Zero-sized viewports (e.g. a minimized window) are ignored.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    /// Transformation from world space to view space.
    pub fn view_matrix(&self) -> na::Matrix4<f32> {
        na::Isometry3::look_at_rh(&self.eye, &self.target, &self.up).to_homogeneous()
    }

    /// Transformation from view space to wgpu clip space.
    pub fn projection_matrix(&self) -> na::Matrix4<f32> {
        let persp = na::Perspective3::new(self.aspect, self.fov_y, self.z_near, self.z_far);
        opengl_to_wgpu() * persp.to_homogeneous()
    }

    pub(crate) fn view_projection_matrix(&self) -> na::Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Unit vectors pointing right and up on the screen, in world space.
    fn screen_axes(&self) -> (na::Vector3<f32>, na::Vector3<f32>) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(&self.up).normalize();
        let up = right.cross(&forward);
        (right, up)
    }
}

//
// orbit controls
//

/// What dragging the mouse does to an [`OrbitControls`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
    /// Rotate the camera around its target.
    Rotate,
    /// Move the camera and its target parallel to the screen.
    Pan,
}

/// Parameters to configure [`OrbitControls`].
#[derive(Clone, Copy, Debug)]
pub struct OrbitParams {
    /// Whether movement continues smoothly after input stops. Default: true.
    pub enable_damping: bool,
    /// Fraction of the remaining movement applied each frame
    /// when damping is enabled. Default: 0.05.
    pub damping_factor: f32,
    /// Default: 1.
    pub rotate_speed: f32,
    /// Default: 1.
    pub pan_speed: f32,
    /// Default: 1.
    pub zoom_speed: f32,
    /// Closest allowed distance to the target. Default: 0.
    pub min_distance: f32,
    /// Farthest allowed distance to the target. Default: infinity.
    pub max_distance: f32,
    /// Smallest angle between the up axis and the view offset, in radians.
    /// Default: 0.
    pub min_polar_angle: f32,
    /// Largest angle between the up axis and the view offset, in radians.
    /// Default: π.
    pub max_polar_angle: f32,
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.,
            pan_speed: 1.,
            zoom_speed: 1.,
            min_distance: 0.,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.,
            max_polar_angle: PI,
        }
    }
}

// keeps the camera from flipping over at the poles
const POLE_EPSILON: f32 = 1e-3;

/// Mouse controls that orbit a [`Camera`] around its target.
///
/// Input is accumulated as it arrives
/// and applied to the camera in [`update`][Self::update],
/// which should be called once per frame.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    params: OrbitParams,
    drag: Option<DragMode>,
    last_cursor: Option<na::Vector2<f32>>,
    // accumulated input not yet applied to the camera
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: na::Vector3<f32>,
}

impl OrbitControls {
    /// Create controls with no pending input.
    pub fn new(params: OrbitParams) -> Self {
        Self {
            params,
            drag: None,
            last_cursor: None,
            theta_delta: 0.,
            phi_delta: 0.,
            scale: 1.,
            pan_offset: na::Vector3::zeros(),
        }
    }

    /// Start interpreting cursor movement as the given kind of drag.
    pub fn begin_drag(&mut self, mode: DragMode) {
        self.drag = Some(mode);
    }

    /// Stop a drag started with [`begin_drag`][Self::begin_drag].
    pub fn end_drag(&mut self, mode: DragMode) {
        if self.drag == Some(mode) {
            self.drag = None;
        }
    }

    /// Track the cursor, rotating or panning if a drag is in progress.
    pub fn cursor_moved(
        &mut self,
        position: na::Vector2<f32>,
        viewport_height: f32,
        camera: &Camera,
    ) {
        let delta = self.last_cursor.map(|last| position - last);
        self.last_cursor = Some(position);
        let Some(delta) = delta else {
            return;
        };
        match self.drag {
            Some(DragMode::Rotate) => self.rotate(delta, viewport_height),
            Some(DragMode::Pan) => self.pan(delta, viewport_height, camera),
            None => {}
        }
    }

    /// Forget the last cursor position, e.g. when it leaves the window.
    pub fn cursor_left(&mut self) {
        self.last_cursor = None;
    }

    /// Rotate by a cursor movement in pixels.
    ///
    /// Dragging across the full height of the viewport is one full turn.
    pub fn rotate(&mut self, delta: na::Vector2<f32>, viewport_height: f32) {
        if viewport_height <= 0. {
            return;
        }
        let speed = self.params.rotate_speed;
        self.theta_delta -= TAU * delta.x / viewport_height * speed;
        self.phi_delta -= TAU * delta.y / viewport_height * speed;
    }

    /// Pan by a cursor movement in pixels.
    ///
    /// The point under the cursor on the plane through the target
    /// follows the cursor.
    pub fn pan(&mut self, delta: na::Vector2<f32>, viewport_height: f32, camera: &Camera) {
        if viewport_height <= 0. {
            return;
        }
        let target_distance = (camera.eye - camera.target).norm() * (camera.fov_y / 2.).tan();
        let scale = 2. * target_distance / viewport_height * self.params.pan_speed;
        let (right, up) = camera.screen_axes();
        self.pan_offset += -right * delta.x * scale + up * delta.y * scale;
    }

    /// Zoom in for positive scroll amounts and out for negative ones.
    ///
    /// Each scroll event moves by a fixed ratio regardless of its magnitude.
    pub fn scroll(&mut self, amount: f32) {
        let zoom_scale = 0.95f32.powf(self.params.zoom_speed);
        if amount > 0. {
            self.scale *= zoom_scale;
        } else if amount < 0. {
            self.scale /= zoom_scale;
        }
    }

    /// Apply pending input to the camera.
    ///
    /// With damping enabled, only a fraction of the pending rotation and panning
    /// is applied and the rest decays over the following frames.
    pub fn update(&mut self, camera: &mut Camera) {
        let p = &self.params;
        let offset = camera.eye - camera.target;

        // spherical coordinates around the y axis
        let mut radius = offset.norm();
        let (mut theta, mut phi) = if radius == 0. {
            (0., 0.)
        } else {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1., 1.).acos(),
            )
        };

        let factor = if p.enable_damping {
            p.damping_factor
        } else {
            1.
        };
        theta += self.theta_delta * factor;
        phi += self.phi_delta * factor;
        phi = phi
            .clamp(p.min_polar_angle, p.max_polar_angle)
            .clamp(POLE_EPSILON, PI - POLE_EPSILON);
        radius = (radius * self.scale).clamp(p.min_distance, p.max_distance);

        camera.target += self.pan_offset * factor;
        let sin_phi_r = phi.sin() * radius;
        let offset = na::Vector3::new(
            sin_phi_r * theta.sin(),
            phi.cos() * radius,
            sin_phi_r * theta.cos(),
        );
        camera.eye = camera.target + offset;

        if p.enable_damping {
            self.theta_delta *= 1. - factor;
            self.phi_delta *= 1. - factor;
            self.pan_offset *= 1. - factor;
        } else {
            self.theta_delta = 0.;
            self.phi_delta = 0.;
            self.pan_offset = na::Vector3::zeros();
        }
        self.scale = 1.;
    }
}
