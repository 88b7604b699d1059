//! Core types for the rasterizer

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::math::{Vec2, Vec3};

/// RGBA color (0-255 per channel).
///
/// Buffers store colors packed as `0xAARRGGBB`; this struct is the unpacked
/// form used for shading and presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GRAY: Color = Color { r: 0x99, g: 0x99, b: 0x99, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    pub fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Apply shading (multiply RGB by intensity 0.0-1.0, alpha untouched)
    pub fn shade(self, intensity: f32) -> Self {
        let i = intensity.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * i).round() as u8,
            g: (self.g as f32 * i).round() as u8,
            b: (self.b as f32 * i).round() as u8,
            a: self.a,
        }
    }

    /// Convert to [u8; 4] RGBA for presentation
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Scale the RGB channels of a packed `0xAARRGGBB` color
pub fn shade_argb(argb: u32, intensity: f32) -> u32 {
    Color::from_argb(argb).shade(intensity).to_argb()
}

/// Single directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub direction: Vec3,
}

impl Light {
    pub fn new(direction: Vec3) -> Self {
        Self {
            direction: direction.normalize(),
        }
    }

    /// Lambert factor for a face normal, clamped to [0, 1].
    /// Faces turned towards the light (normal against its direction) get 1.
    pub fn intensity(&self, normal: Vec3) -> f32 {
        (-normal.dot(self.direction)).clamp(0.0, 1.0)
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 1.0))
    }
}

/// Texture as a flat buffer of packed `0xAARRGGBB` texels
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub texels: Vec<u32>,
    pub name: String,
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            texels: vec![Color::WHITE.to_argb(); width * height],
            name: String::new(),
        }
    }

    pub fn from_texels(width: usize, height: usize, texels: Vec<u32>, name: String) -> Self {
        debug_assert_eq!(texels.len(), width * height);
        Self {
            width,
            height,
            texels,
            name,
        }
    }

    /// Create a checkerboard test texture with `cell`-pixel squares
    pub fn checkerboard(width: usize, height: usize, cell: usize, even: u32, odd: u32) -> Self {
        let cell = cell.max(1);
        let mut texels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / cell) + (y / cell)) % 2 == 0;
                texels.push(if checker { even } else { odd });
            }
        }
        Self { width, height, texels, name: "checkerboard".to_string() }
    }

    /// Texel coordinates for a UV pair: `|floor(u * w)| mod w`, `|floor(v * h)| mod h`.
    ///
    /// Interpolation can overshoot [0, 1]; the absolute value and modulo keep
    /// every result inside the texture.
    pub fn texel_coords(&self, u: f32, v: f32) -> (usize, usize) {
        let wrap = |t: f32, size: usize| -> usize {
            let i = (t * size as f32).floor() as i64;
            (i.unsigned_abs() % size as u64) as usize
        };
        (wrap(u, self.width), wrap(v, self.height))
    }

    /// Nearest-neighbour sample with wraparound
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        if self.width == 0 || self.height == 0 {
            return 0;
        }
        let (tx, ty) = self.texel_coords(u, v);
        self.texels[ty * self.width + tx]
    }
}

/// A triangle face: vertex indices, per-corner texture coordinates and base color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub a_uv: Vec2,
    pub b_uv: Vec2,
    pub c_uv: Vec2,
    pub color: u32,
}

impl Face {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Self {
            a,
            b,
            c,
            a_uv: Vec2::ZERO,
            b_uv: Vec2::ZERO,
            c_uv: Vec2::ZERO,
            color: Color::WHITE.to_argb(),
        }
    }

    pub fn with_uvs(mut self, a_uv: Vec2, b_uv: Vec2, c_uv: Vec2) -> Self {
        self.a_uv = a_uv;
        self.b_uv = b_uv;
        self.c_uv = c_uv;
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn indices(&self) -> [usize; 3] {
        [self.a, self.b, self.c]
    }

    pub fn uvs(&self) -> [Vec2; 3] {
        [self.a_uv, self.b_uv, self.c_uv]
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        face: usize,
        index: usize,
        vertex_count: usize,
    },
}

/// Triangle mesh with a per-instance transform
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<Face>,
    /// Index into the scene's texture list
    pub texture: Option<usize>,
    pub scale: Vec3,
    pub rotation: Vec3,
    pub translation: Vec3,
}

impl Mesh {
    /// Build a mesh, rejecting faces that index outside the vertex list
    pub fn new(vertices: Vec<Vec3>, faces: Vec<Face>) -> Result<Self, MeshError> {
        let mesh = Self {
            vertices,
            faces,
            texture: None,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            translation: Vec3::ZERO,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        let vertex_count = self.vertices.len();
        for (face_idx, face) in self.faces.iter().enumerate() {
            if let Some(&index) = face.indices().iter().find(|&&i| i >= vertex_count) {
                return Err(MeshError::FaceIndexOutOfRange {
                    face: face_idx,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// The three corner positions of a face, `None` if an index is out of range
    pub fn face_vertices(&self, face: &Face) -> Option<[Vec3; 3]> {
        Some([
            *self.vertices.get(face.a)?,
            *self.vertices.get(face.b)?,
            *self.vertices.get(face.c)?,
        ])
    }

    /// Unit cube centred on the origin, two clockwise triangles per side
    pub fn cube() -> Self {
        let vertices = vec![
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
        ];

        let uv = Vec2::new;
        let first = (uv(0.0, 1.0), uv(0.0, 0.0), uv(1.0, 0.0));
        let second = (uv(0.0, 1.0), uv(1.0, 0.0), uv(1.0, 1.0));

        // (a, b, c) per side: front, right, back, left, top, bottom
        let quads: [[(usize, usize, usize); 2]; 6] = [
            [(0, 1, 2), (0, 2, 3)],
            [(3, 2, 4), (3, 4, 5)],
            [(5, 4, 6), (5, 6, 7)],
            [(7, 6, 1), (7, 1, 0)],
            [(1, 6, 4), (1, 4, 2)],
            [(5, 7, 0), (5, 0, 3)],
        ];

        let mut faces = Vec::with_capacity(12);
        for [(a0, b0, c0), (a1, b1, c1)] in quads {
            faces.push(Face::new(a0, b0, c0).with_uvs(first.0, first.1, first.2));
            faces.push(Face::new(a1, b1, c1).with_uvs(second.0, second.1, second.2));
        }

        Self {
            vertices,
            faces,
            texture: None,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            translation: Vec3::ZERO,
        }
    }
}

/// How triangles are drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    Wireframe,
    WireframeVertices,
    Filled,
    FilledWireframe,
    #[default]
    Textured,
    TexturedWireframe,
}

impl RenderMode {
    pub const ALL: [RenderMode; 6] = [
        RenderMode::Wireframe,
        RenderMode::WireframeVertices,
        RenderMode::Filled,
        RenderMode::FilledWireframe,
        RenderMode::Textured,
        RenderMode::TexturedWireframe,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RenderMode::Wireframe => "Wireframe",
            RenderMode::WireframeVertices => "Wireframe + Vertices",
            RenderMode::Filled => "Filled",
            RenderMode::FilledWireframe => "Filled + Wireframe",
            RenderMode::Textured => "Textured",
            RenderMode::TexturedWireframe => "Textured + Wireframe",
        }
    }

    pub fn draws_filled(&self) -> bool {
        matches!(self, RenderMode::Filled | RenderMode::FilledWireframe)
    }

    pub fn draws_textured(&self) -> bool {
        matches!(self, RenderMode::Textured | RenderMode::TexturedWireframe)
    }

    pub fn draws_wireframe(&self) -> bool {
        matches!(
            self,
            RenderMode::Wireframe
                | RenderMode::WireframeVertices
                | RenderMode::FilledWireframe
                | RenderMode::TexturedWireframe
        )
    }

    pub fn draws_vertices(&self) -> bool {
        matches!(self, RenderMode::WireframeVertices)
    }
}

/// Face culling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CullMode {
    None,
    #[default]
    Backface,
}

/// Per-frame rasterizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub mode: RenderMode,
    pub cull: CullMode,
    /// Packed color the color buffer is cleared to
    pub clear_color: u32,
    /// Clear to a 10-pixel grid instead of a flat color
    pub grid: bool,
    pub grid_color: u32,
    pub wire_color: u32,
    pub vertex_color: u32,
    /// Modulate texels by the face light factor
    pub shade_textures: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::default(),
            cull: CullMode::default(),
            clear_color: 0xFF00_0000,
            grid: false,
            grid_color: 0xFF33_3333,
            wire_color: 0xFF99_9999,
            vertex_color: 0xFFFF_0000,
            shade_textures: false,
        }
    }
}
