//! Scene files
//!
//! Uses RON (Rusty Object Notation) for human-readable scene descriptions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rasterizer::{MeshError, Projection, RenderConfig, Vec3};

/// Error type for scene loading
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("OBJ error: {0}")]
    Obj(#[from] obj::ObjError),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),
    #[error("mesh {mesh} uses texture {texture}, but only {count} textures are defined")]
    MissingTexture { mesh: usize, texture: usize, count: usize },
    #[error("invalid projection: need 0 < z_near < z_far and 0 < fov_y < pi, got z {z_near}..{z_far}, fov_y {fov_y}")]
    InvalidProjection { fov_y: f32, z_near: f32, z_far: f32 },
}

/// Starting camera pose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    /// Radians around Y
    pub yaw: f32,
    /// Radians around X
    pub pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

/// Where a texture's texels come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TextureSource {
    /// PNG, JPEG or BMP file
    File(PathBuf),
    Checkerboard { size: usize, cell: usize, even: u32, odd: u32 },
}

/// Where a mesh's geometry comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeshSource {
    Cube,
    Obj(PathBuf),
}

/// One mesh instance in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub source: MeshSource,
    pub scale: Vec3,
    pub rotation: Vec3,
    pub translation: Vec3,
    /// Rotation speed in radians per second
    pub spin: Vec3,
    /// Index into `SceneConfig::textures`
    pub texture: Option<usize>,
    /// Overrides every face's base color
    pub color: Option<u32>,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            source: MeshSource::Cube,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            translation: Vec3::ZERO,
            spin: Vec3::ZERO,
            texture: None,
            color: None,
        }
    }
}

/// Complete scene description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    /// Direction the light travels in
    pub light: Vec3,
    pub projection: Projection,
    pub render: RenderConfig,
    pub textures: Vec<TextureSource>,
    pub meshes: Vec<MeshConfig>,
}

impl Default for SceneConfig {
    /// A spinning checkerboard cube five units in front of the camera
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            light: Vec3::new(0.0, 0.0, 1.0),
            projection: Projection::default(),
            render: RenderConfig::default(),
            textures: vec![TextureSource::Checkerboard {
                size: 64,
                cell: 8,
                even: 0xFFFF_FFFF,
                odd: 0xFF40_4040,
            }],
            meshes: vec![MeshConfig {
                translation: Vec3::new(0.0, 0.0, 5.0),
                spin: Vec3::new(0.3, 0.5, 0.1),
                texture: Some(0),
                ..MeshConfig::default()
            }],
        }
    }
}

impl SceneConfig {
    /// Make relative file paths relative to `base` instead of the working directory
    pub fn resolve_paths(&mut self, base: &Path) {
        for texture in &mut self.textures {
            if let TextureSource::File(path) = texture {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
        for mesh in &mut self.meshes {
            if let MeshSource::Obj(path) = &mut mesh.source {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }

    /// Check the projection bounds and that every mesh texture index points
    /// at a defined texture
    pub fn validate(&self) -> Result<(), SceneError> {
        let Projection { fov_y, z_near, z_far } = self.projection;
        let depth_ok = z_near > 0.0 && z_near < z_far && z_far.is_finite();
        let fov_ok = fov_y > 0.0 && fov_y < std::f32::consts::PI;
        if !depth_ok || !fov_ok {
            return Err(SceneError::InvalidProjection { fov_y, z_near, z_far });
        }

        let count = self.textures.len();
        for (mesh, config) in self.meshes.iter().enumerate() {
            if let Some(texture) = config.texture {
                if texture >= count {
                    return Err(SceneError::MissingTexture { mesh, texture, count });
                }
            }
        }
        Ok(())
    }
}

/// Load a scene from a RON file. Relative asset paths resolve against the
/// file's directory.
pub fn load_scene_config<P: AsRef<Path>>(path: P) -> Result<SceneConfig, SceneError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let mut config: SceneConfig = ron::from_str(&contents)?;

    if let Some(dir) = path.parent() {
        config.resolve_paths(dir);
    }
    config.validate()?;

    log::info!(
        "loaded scene {}: {} meshes, {} textures",
        path.display(),
        config.meshes.len(),
        config.textures.len()
    );
    Ok(config)
}

/// Save a scene to a RON file
pub fn save_scene_config<P: AsRef<Path>>(config: &SceneConfig, path: P) -> Result<(), SceneError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load a scene from a RON string (for embedded scenes or testing).
/// Paths are left as written.
pub fn load_scene_config_from_str(s: &str) -> Result<SceneConfig, SceneError> {
    let config: SceneConfig = ron::from_str(s)?;
    config.validate()?;
    Ok(config)
}
