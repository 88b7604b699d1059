//! Mesh and texture loading
//!
//! OBJ geometry through `obj-rs`, images through `image`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use obj::raw::object::Polygon as ObjPolygon;
use obj::raw::{parse_obj, RawObj};

use super::scene::{SceneError, TextureSource};
use crate::rasterizer::{Face, Mesh, Texture, Vec2, Vec3};

/// Load an OBJ file into a mesh
pub fn load_obj_mesh<P: AsRef<Path>>(path: P) -> Result<Mesh, SceneError> {
    let path = path.as_ref();
    let mesh = parse_obj_mesh(BufReader::new(File::open(path)?))?;
    log::info!(
        "loaded mesh {}: {} vertices, {} faces",
        path.display(),
        mesh.vertices.len(),
        mesh.faces.len()
    );
    Ok(mesh)
}

/// Parse OBJ text into a mesh.
///
/// Polygons with more than three corners are fan-triangulated. Texture `v` is
/// flipped so that 0 is the top row of the image.
pub fn parse_obj_mesh<R: BufRead>(input: R) -> Result<Mesh, SceneError> {
    let raw: RawObj = parse_obj(input)?;

    let vertices: Vec<Vec3> = raw.positions.iter().map(|&(x, y, z, _)| Vec3::new(x, y, z)).collect();

    let uv = |index: Option<usize>| -> Vec2 {
        index
            .and_then(|i| raw.tex_coords.get(i))
            .map_or(Vec2::ZERO, |&(u, v, _)| Vec2::new(u, 1.0 - v))
    };

    let mut faces = Vec::with_capacity(raw.polygons.len());
    for polygon in &raw.polygons {
        let corners: Vec<(usize, Option<usize>)> = match polygon {
            ObjPolygon::P(ps) => ps.iter().map(|&p| (p, None)).collect(),
            ObjPolygon::PT(pts) => pts.iter().map(|&(p, t)| (p, Some(t))).collect(),
            ObjPolygon::PN(pns) => pns.iter().map(|&(p, _)| (p, None)).collect(),
            ObjPolygon::PTN(ptns) => ptns.iter().map(|&(p, t, _)| (p, Some(t))).collect(),
        };

        for i in 1..corners.len().saturating_sub(1) {
            let (a, ta) = corners[0];
            let (b, tb) = corners[i];
            let (c, tc) = corners[i + 1];
            faces.push(Face::new(a, b, c).with_uvs(uv(ta), uv(tb), uv(tc)));
        }
    }

    Ok(Mesh::new(vertices, faces)?)
}

/// Convert a decoded image to packed `0xAARRGGBB` texels
pub fn texture_from_image(image: &image::DynamicImage, name: &str) -> Texture {
    let rgba = image.to_rgba8();
    let texels = rgba
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
        })
        .collect();
    Texture::from_texels(rgba.width() as usize, rgba.height() as usize, texels, name.to_string())
}

/// Load a PNG, JPEG or BMP file as a texture
pub fn load_texture<P: AsRef<Path>>(path: P) -> Result<Texture, SceneError> {
    let path = path.as_ref();
    let image = image::open(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let texture = texture_from_image(&image, &name);
    log::info!("loaded texture {}: {}x{}", path.display(), texture.width, texture.height);
    Ok(texture)
}

/// Build the texture a scene entry describes
pub fn texture_from_source(source: &TextureSource) -> Result<Texture, SceneError> {
    match source {
        TextureSource::File(path) => load_texture(path),
        TextureSource::Checkerboard { size, cell, even, odd } => {
            Ok(Texture::checkerboard(*size, *size, *cell, *even, *odd))
        }
    }
}
