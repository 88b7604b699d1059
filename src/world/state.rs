//! Live scene state built from a `SceneConfig`

use super::assets::{load_obj_mesh, texture_from_source};
use super::scene::{MeshSource, SceneConfig, SceneError};
use crate::rasterizer::{Camera, Light, Mesh, Projection, RenderConfig, Scene, Vec3};

/// Everything needed to render and animate a loaded scene
pub struct World {
    pub scene: Scene,
    pub camera: Camera,
    pub projection: Projection,
    pub render: RenderConfig,
    /// Per-mesh rotation speed, radians per second
    spins: Vec<Vec3>,
}

impl World {
    /// Load every mesh and texture the config names
    pub fn from_config(config: &SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;

        let textures = config
            .textures
            .iter()
            .map(texture_from_source)
            .collect::<Result<Vec<_>, _>>()?;

        let mut meshes = Vec::with_capacity(config.meshes.len());
        let mut spins = Vec::with_capacity(config.meshes.len());
        for mesh_config in &config.meshes {
            let mut mesh = match &mesh_config.source {
                MeshSource::Cube => Mesh::cube(),
                MeshSource::Obj(path) => load_obj_mesh(path)?,
            };
            mesh.scale = mesh_config.scale;
            mesh.rotation = mesh_config.rotation;
            mesh.translation = mesh_config.translation;
            mesh.texture = mesh_config.texture;
            if let Some(color) = mesh_config.color {
                for face in &mut mesh.faces {
                    face.color = color;
                }
            }
            meshes.push(mesh);
            spins.push(mesh_config.spin);
        }

        let camera = Camera::with_angles(config.camera.position, config.camera.yaw, config.camera.pitch);

        Ok(Self {
            scene: Scene {
                meshes,
                textures,
                light: Light::new(config.light),
            },
            camera,
            projection: config.projection,
            render: config.render.clone(),
            spins,
        })
    }

    /// Advance mesh spin by `dt` seconds
    pub fn animate(&mut self, dt: f32) {
        for (mesh, spin) in self.scene.meshes.iter_mut().zip(&self.spins) {
            mesh.rotation = mesh.rotation + *spin * dt;
        }
    }
}
