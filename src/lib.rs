//! Geometry and animation core for rendering a geographic path
//! as a tube with a traveling highlight.
//!
//! The pipeline runs once at startup:
//! geographic coordinates are projected onto a plane ([`projection`]),
//! a closed spline is fitted through them ([`curve`]),
//! and a tube is extruded along the spline ([`tube`]).
//! [`route`] strings these together.
//! The animation itself is a single scalar advanced every frame ([`animation`])
//! and consumed by the highlight kernel ([`highlight`]),
//! which the `geotube-visuals` crate runs on the GPU.

#![warn(missing_docs)]

pub mod projection;
#[doc(inline)]
pub use projection::{project_path, Equirectangular, GeoPoint, Mercator, Projection};

pub mod curve;
#[doc(inline)]
pub use curve::{CatmullRomCurve, CurveType, FrenetFrames};

pub mod tube;
#[doc(inline)]
pub use tube::{TubeMesh, TubeParams, TubeVertex};

pub mod highlight;
#[doc(inline)]
pub use highlight::{HighlightMaterial, HighlightUniforms, ShadedVertex};

pub mod animation;
#[doc(inline)]
pub use animation::AnimationState;

pub mod dataset;
#[doc(inline)]
pub use dataset::DatasetError;

pub mod route;
#[doc(inline)]
pub use route::{Route, RouteParams};

// nalgebra re-exports of common types for convenience

pub use nalgebra as na;
/// Type alias for a 2D `nalgebra` vector.
pub type Vec2 = na::Vector2<f64>;
/// Type alias for a 3D `nalgebra` vector.
pub type Vec3 = na::Vector3<f64>;
