//! CPU software rasterizer
//!
//! Features:
//! - Frustum clipping (Sutherland-Hodgman against six view-space planes)
//! - Perspective-correct texture mapping
//! - Reciprocal-w depth buffer
//! - Flat Lambert shading from a single directional light
//! - Wireframe and vertex-marker debug modes

mod camera;
mod clip;
mod math;
mod pipeline;
mod render;
mod types;

pub use camera::*;
pub use clip::*;
pub use math::*;
pub use pipeline::*;
pub use render::*;
pub use types::*;

/// Default framebuffer dimensions
pub const WIDTH: usize = 800;
pub const HEIGHT: usize = 600;
