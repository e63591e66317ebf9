//! Camera module: a position/orientation camera producing the view and
//! projection matrices uploaded through `CameraBinding`.
//!
//! Conventions: right-handed, +Y up, OpenGL clip-space depth (-1..1).

mod camera;

pub use camera::{Camera, DEFAULT_FAR, DEFAULT_NEAR};
