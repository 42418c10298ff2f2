//! Real-time rendering of routes built with [`geotube`].
//!
//! The tube mesh is uploaded to the GPU once
//! and a highlight travels along it, driven by a single uniform
//! updated every frame.
//! The camera orbits the scene with the mouse.
//!
//! To show a route,
//! first create a [`RenderWindow`],
//! then call [`run_animation`][`RenderWindow::run_animation`] on it
//! with an [`Animation`] referencing the route's mesh.
//! The `geotube` binary in this crate does exactly that for a bundled dataset.

#![warn(missing_docs)]

mod animation;
#[doc(inline)]
pub use animation::{Animation, AnimationParams};

mod camera;
#[doc(inline)]
pub use camera::{Camera, CameraParams, DragMode, OrbitControls, OrbitParams};

pub(crate) mod pipelines;
#[doc(inline)]
pub use pipelines::helpers::{AxesParams, GridParams};

mod render_window;
#[doc(inline)]
pub use render_window::{RenderWindow, WindowInitError, WindowParams};

pub use palette;
