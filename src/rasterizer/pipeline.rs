//! Per-frame geometry pipeline
//!
//! world/view transform -> face normal -> backface cull -> frustum clip ->
//! fan triangulate -> project to screen -> rasterize.

use serde::{Deserialize, Serialize};

use super::clip::{ClipVertex, Frustum, Polygon};
use super::math::{Mat4, Vec3, Vec4};
use super::render::{rasterize_triangle, Framebuffer, Triangle};
use super::types::{shade_argb, CullMode, Light, Mesh, RenderConfig, Texture};

/// Capacity of the per-frame triangle arena
pub const MAX_TRIANGLES: usize = 10_000;

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projection {
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: std::f32::consts::FRAC_PI_3,
            z_near: 0.1,
            z_far: 100.0,
        }
    }
}

impl Projection {
    /// Horizontal field of view for a `width` x `height` target
    pub fn fov_x(&self, width: usize, height: usize) -> f32 {
        let aspect_x = width as f32 / height as f32;
        ((self.fov_y / 2.0).tan() * aspect_x).atan() * 2.0
    }
}

/// Everything the renderer draws in one frame
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub textures: Vec<Texture>,
    pub light: Light,
}

/// Counters for one `Renderer::render` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub faces: usize,
    pub invalid: usize,
    pub degenerate: usize,
    pub culled: usize,
    pub clipped: usize,
    pub triangles: usize,
    pub dropped: usize,
}

/// Face normal of a view-space triangle, `None` for degenerate faces
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Option<Vec3> {
    let ab = (b - a).try_normalize()?;
    let ac = (c - a).try_normalize()?;
    ab.cross(ac).try_normalize()
}

/// Owns the framebuffer, render settings and per-frame scratch storage
pub struct Renderer {
    framebuffer: Framebuffer,
    pub config: RenderConfig,
    projection: Projection,
    proj_matrix: Mat4,
    frustum: Frustum,
    triangles: Vec<Triangle>,
}

impl Renderer {
    pub fn new(width: usize, height: usize, projection: Projection, config: RenderConfig) -> Self {
        let aspect_y = height as f32 / width as f32;
        let fov_x = projection.fov_x(width, height);
        log::info!(
            "renderer {}x{}, fov {:.3} x {:.3} rad, z {}..{}",
            width,
            height,
            fov_x,
            projection.fov_y,
            projection.z_near,
            projection.z_far
        );

        Self {
            framebuffer: Framebuffer::new(width, height),
            config,
            projection,
            proj_matrix: Mat4::perspective(projection.fov_y, aspect_y, projection.z_near, projection.z_far),
            frustum: Frustum::new(fov_x, projection.fov_y, projection.z_near, projection.z_far),
            triangles: Vec::with_capacity(MAX_TRIANGLES),
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Triangles produced by the last frame
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Project a view-space point to screen space. Keeps view depth in `w`.
    pub fn project(&self, p: Vec3) -> Vec4 {
        let half_w = self.framebuffer.width as f32 / 2.0;
        let half_h = self.framebuffer.height as f32 / 2.0;

        let mut projected = self.proj_matrix.mul_vec4_project(Vec4::from_point(p));
        // Screen y grows downward
        projected.y = -projected.y;
        projected.x = projected.x * half_w + half_w;
        projected.y = projected.y * half_h + half_h;
        projected
    }

    /// Render one frame: clear, build triangles for every visible face, rasterize
    pub fn render(&mut self, scene: &Scene, view: &Mat4) -> FrameStats {
        let stats = self.build_triangles(scene, view);

        if self.config.grid {
            self.framebuffer.draw_grid(self.config.grid_color, self.config.clear_color);
        } else {
            self.framebuffer.clear(self.config.clear_color);
        }
        self.framebuffer.clear_depth();

        for tri in &self.triangles {
            rasterize_triangle(&mut self.framebuffer, tri, &scene.textures, &self.config);
        }

        log::debug!(
            "frame: {} faces, {} culled, {} clipped, {} triangles, {} dropped",
            stats.faces,
            stats.culled,
            stats.clipped,
            stats.triangles,
            stats.dropped
        );
        stats
    }

    /// Fill the triangle arena for this frame without touching the framebuffer
    pub fn build_triangles(&mut self, scene: &Scene, view: &Mat4) -> FrameStats {
        let mut stats = FrameStats::default();
        self.triangles.clear();

        for (mesh_index, mesh) in scene.meshes.iter().enumerate() {
            let world = Mat4::world(mesh.scale, mesh.rotation, mesh.translation);
            let world_view = view.mul_mat4(&world);
            let invalid_before = stats.invalid;

            for face in &mesh.faces {
                stats.faces += 1;

                let Some(corners) = mesh.face_vertices(face) else {
                    stats.invalid += 1;
                    continue;
                };
                let [a, b, c] = corners.map(|v| world_view.transform_point(v));

                let Some(normal) = face_normal(a, b, c) else {
                    stats.degenerate += 1;
                    continue;
                };

                // Camera sits at the view-space origin
                if self.config.cull == CullMode::Backface && normal.dot(Vec3::ZERO - a) < 0.0 {
                    stats.culled += 1;
                    continue;
                }

                let [a_uv, b_uv, c_uv] = face.uvs();
                let polygon = Polygon::from_triangle(
                    ClipVertex::new(a, a_uv),
                    ClipVertex::new(b, b_uv),
                    ClipVertex::new(c, c_uv),
                );
                let clipped = self.frustum.clip(&polygon);
                if clipped.is_empty() {
                    stats.clipped += 1;
                    continue;
                }

                let light = scene.light.intensity(normal);
                let color = shade_argb(face.color, light);

                for [v0, v1, v2] in clipped.triangles() {
                    if self.triangles.len() >= MAX_TRIANGLES {
                        stats.dropped += 1;
                        continue;
                    }
                    let tri = Triangle {
                        points: [self.project(v0.position), self.project(v1.position), self.project(v2.position)],
                        uvs: [v0.uv, v1.uv, v2.uv],
                        color,
                        light,
                        texture: mesh.texture,
                    };
                    log::trace!("mesh {} triangle {:?}", mesh_index, tri.points);
                    self.triangles.push(tri);
                }
            }

            if stats.invalid > invalid_before {
                log::warn!(
                    "mesh {}: skipped {} faces with out-of-range vertex indices",
                    mesh_index,
                    stats.invalid - invalid_before
                );
            }
        }

        if stats.dropped > 0 {
            log::debug!("triangle arena full, dropped {}", stats.dropped);
        }
        stats.triangles = self.triangles.len();
        stats
    }
}
