//! Grayscale - a CPU software rasterizer
//!
//! `rasterizer` turns meshes, a camera and a light into a packed color
//! buffer; `world` loads the scenes that feed it.

pub mod rasterizer;
pub mod world;
