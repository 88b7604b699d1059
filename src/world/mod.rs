//! World module - scene files and the assets they reference
//!
//! - RON scene descriptions (camera, light, projection, render settings)
//! - OBJ meshes and image textures
//! - Live scene state with per-mesh spin animation

mod assets;
mod scene;
mod state;

pub use assets::*;
pub use scene::*;
pub use state::*;
