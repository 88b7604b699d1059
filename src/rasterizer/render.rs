//! Core rendering functions
//! Scanline triangle rasterization with a reciprocal-w depth buffer

use super::math::{barycentric_weights, Vec2, Vec4};
use super::types::{shade_argb, RenderConfig, Texture};

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub color: Vec<u32>, // 0xAARRGGBB, one per pixel
    pub depth: Vec<f32>, // 1 - 1/w, 1.0 = far
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    /// Value the depth buffer is reset to; nothing is farther
    pub const FAR: f32 = 1.0;

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            color: vec![0xFF00_0000; width * height],
            depth: vec![Self::FAR; width * height],
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: u32) {
        self.color.fill(color);
    }

    pub fn clear_depth(&mut self) {
        self.depth.fill(Self::FAR);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    /// Write a pixel; coordinates outside the buffer are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if let Some(idx) = self.index(x, y) {
            self.color[idx] = color;
        }
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|idx| self.color[idx])
    }

    /// Stored depth, `FAR` outside the buffer
    pub fn depth_at(&self, x: i32, y: i32) -> f32 {
        self.index(x, y).map_or(Self::FAR, |idx| self.depth[idx])
    }

    /// Write color and depth if `z` is strictly nearer than what is stored
    pub fn set_pixel_with_depth(&mut self, x: i32, y: i32, z: f32, color: u32) -> bool {
        if let Some(idx) = self.index(x, y) {
            if z < self.depth[idx] {
                self.depth[idx] = z;
                self.color[idx] = color;
                return true;
            }
        }
        false
    }

    /// Fill the buffer with a background and a line every 10 pixels
    pub fn draw_grid(&mut self, line: u32, background: u32) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.color[y * self.width + x] = if x % 10 == 0 || y % 10 == 0 { line } else { background };
            }
        }
    }

    /// Filled axis-aligned rectangle with its top-left corner at (x, y)
    pub fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: u32) {
        let x_end = x.saturating_add(width).min(self.width as i32);
        let y_end = y.saturating_add(height).min(self.height as i32);
        for py in y.max(0)..y_end {
            for px in x.max(0)..x_end {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm.
    ///
    /// The segment is first clipped to the buffer, so far off-screen
    /// endpoints cost no more than the visible part.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let Some((x0, y0, x1, y1)) = self.clip_segment(x0, y0, x1, y1) else {
            return;
        };

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel(x as i32, y as i32, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Liang-Barsky clip of a segment to the buffer rectangle, widened to i64
    fn clip_segment(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> Option<(i64, i64, i64, i64)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let (fx0, fy0) = (x0 as f64, y0 as f64);
        let (dx, dy) = (x1 as f64 - fx0, y1 as f64 - fy0);
        let (max_x, max_y) = ((self.width - 1) as f64, (self.height - 1) as f64);

        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;
        for (p, q) in [(-dx, fx0), (dx, max_x - fx0), (-dy, fy0), (dy, max_y - fy0)] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
        }
        if t0 > t1 {
            return None;
        }

        let point = |t: f64| ((fx0 + t * dx).round() as i64, (fy0 + t * dy).round() as i64);
        // Untouched endpoints keep their exact integer values
        let (ax, ay) = if t0 == 0.0 { (x0 as i64, y0 as i64) } else { point(t0) };
        let (bx, by) = if t1 == 1.0 { (x1 as i64, y1 as i64) } else { point(t1) };
        Some((ax, ay, bx, by))
    }

    /// Pack into RGBA bytes for presentation. `out` must hold 4 bytes per pixel.
    pub fn write_rgba(&self, out: &mut [u8]) {
        for (dst, &argb) in out.chunks_exact_mut(4).zip(&self.color) {
            dst[0] = (argb >> 16) as u8;
            dst[1] = (argb >> 8) as u8;
            dst[2] = argb as u8;
            dst[3] = (argb >> 24) as u8;
        }
    }

    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0; self.width * self.height * 4];
        self.write_rgba(&mut bytes);
        bytes
    }
}

/// Projected triangle ready for rasterization.
///
/// `points` hold screen x/y, normalized depth z and the view-space depth in w.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub points: [Vec4; 3],
    pub uvs: [Vec2; 3],
    /// Face color with flat shading applied
    pub color: u32,
    /// Light factor the color was shaded with
    pub light: f32,
    pub texture: Option<usize>,
}

/// Screen-space corner with attributes divided by w
#[derive(Debug, Clone, Copy)]
struct Corner {
    x: i32,
    y: i32,
    inv_w: f32,
    u_over_w: f32,
    v_over_w: f32,
}

impl Corner {
    fn new(point: Vec4, uv: Vec2) -> Self {
        let inv_w = if point.w != 0.0 { 1.0 / point.w } else { 0.0 };
        Self {
            x: point.x as i32,
            y: point.y as i32,
            inv_w,
            u_over_w: uv.x * inv_w,
            v_over_w: uv.y * inv_w,
        }
    }

    fn pos(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Scan-convert a triangle, calling `shade(u, v)` for every pixel that passes
/// the depth test. `u`, `v` are perspective-correct.
///
/// Vertices are sorted by y; the upper (flat-bottom) half runs from the top
/// vertex to the middle one, the lower (flat-top) half from the middle to the
/// bottom, so a general triangle is split at the middle vertex's scanline.
fn scan_triangle<F>(fb: &mut Framebuffer, points: &[Vec4; 3], uvs: &[Vec2; 3], mut shade: F)
where
    F: FnMut(f32, f32) -> u32,
{
    let mut corners = [
        Corner::new(points[0], uvs[0]),
        Corner::new(points[1], uvs[1]),
        Corner::new(points[2], uvs[2]),
    ];
    corners.sort_by_key(|c| c.y);
    let [c0, c1, c2] = corners;

    let (a, b, c) = (c0.pos(), c1.pos(), c2.pos());
    if (b - a).cross(c - a) == 0.0 {
        return;
    }

    let max_y = fb.height as i32 - 1;
    let max_x = fb.width as i32;

    let mut span = |fb: &mut Framebuffer, y: i32, mut x_start: i32, mut x_end: i32| {
        if x_end < x_start {
            std::mem::swap(&mut x_start, &mut x_end);
        }
        for x in x_start.max(0)..x_end.min(max_x) {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let Some(w) = barycentric_weights(a, b, c, p) else {
                continue;
            };

            let inv_w = w.x * c0.inv_w + w.y * c1.inv_w + w.z * c2.inv_w;
            if inv_w <= 0.0 {
                continue;
            }

            // Larger 1/w is nearer, so nearer geometry stores a smaller value
            let depth = 1.0 - inv_w;
            if depth < fb.depth_at(x, y) {
                let u = (w.x * c0.u_over_w + w.y * c1.u_over_w + w.z * c2.u_over_w) / inv_w;
                let v = (w.x * c0.v_over_w + w.y * c1.v_over_w + w.z * c2.v_over_w) / inv_w;
                let color = shade(u, v);
                fb.set_pixel_with_depth(x, y, depth, color);
            }
        }
    };

    let inv_slope = |from: &Corner, to: &Corner| -> f32 {
        if to.y != from.y {
            (to.x - from.x) as f32 / (to.y - from.y) as f32
        } else {
            0.0
        }
    };

    // Upper half (flat-bottom)
    if c1.y != c0.y {
        let slope_short = inv_slope(&c0, &c1);
        let slope_long = inv_slope(&c0, &c2);
        for y in c0.y.max(0)..=c1.y.min(max_y) {
            let x_start = (c1.x as f32 + (y - c1.y) as f32 * slope_short) as i32;
            let x_end = (c0.x as f32 + (y - c0.y) as f32 * slope_long) as i32;
            span(fb, y, x_start, x_end);
        }
    }

    // Lower half (flat-top); the middle scanline was already covered above
    if c2.y != c1.y {
        let slope_short = inv_slope(&c1, &c2);
        let slope_long = inv_slope(&c0, &c2);
        let first = if c1.y != c0.y { c1.y + 1 } else { c1.y };
        for y in first.max(0)..=c2.y.min(max_y) {
            let x_start = (c1.x as f32 + (y - c1.y) as f32 * slope_short) as i32;
            let x_end = (c0.x as f32 + (y - c0.y) as f32 * slope_long) as i32;
            span(fb, y, x_start, x_end);
        }
    }
}

/// Depth-tested solid triangle
pub fn fill_triangle(fb: &mut Framebuffer, points: &[Vec4; 3], color: u32) {
    scan_triangle(fb, points, &[Vec2::ZERO; 3], |_, _| color);
}

/// Depth-tested, perspective-correct textured triangle.
/// `light` scales the sampled texels when given.
pub fn fill_textured_triangle(
    fb: &mut Framebuffer,
    points: &[Vec4; 3],
    uvs: &[Vec2; 3],
    texture: &Texture,
    light: Option<f32>,
) {
    match light {
        Some(intensity) => scan_triangle(fb, points, uvs, |u, v| shade_argb(texture.sample(u, v), intensity)),
        None => scan_triangle(fb, points, uvs, |u, v| texture.sample(u, v)),
    }
}

/// Unfilled triangle outline, no depth test
pub fn draw_triangle_wire(fb: &mut Framebuffer, points: &[Vec4; 3], color: u32) {
    for i in 0..3 {
        let p0 = points[i];
        let p1 = points[(i + 1) % 3];
        fb.draw_line(p0.x as i32, p0.y as i32, p1.x as i32, p1.y as i32, color);
    }
}

/// 6x6 squares centred on each vertex, no depth test
pub fn draw_vertex_markers(fb: &mut Framebuffer, points: &[Vec4; 3], color: u32) {
    for p in points {
        fb.draw_rect((p.x as i32).saturating_sub(3), (p.y as i32).saturating_sub(3), 6, 6, color);
    }
}

/// Rasterize a single triangle according to the render mode.
///
/// Textured modes fall back to the shaded solid color when the triangle has
/// no texture or its id is not in `textures`.
pub fn rasterize_triangle(fb: &mut Framebuffer, tri: &Triangle, textures: &[Texture], config: &RenderConfig) {
    let mode = config.mode;

    if mode.draws_textured() {
        match tri.texture.and_then(|id| textures.get(id)) {
            Some(texture) => {
                let light = config.shade_textures.then_some(tri.light);
                fill_textured_triangle(fb, &tri.points, &tri.uvs, texture, light);
            }
            None => fill_triangle(fb, &tri.points, tri.color),
        }
    } else if mode.draws_filled() {
        fill_triangle(fb, &tri.points, tri.color);
    }

    if mode.draws_wireframe() {
        draw_triangle_wire(fb, &tri.points, config.wire_color);
    }

    if mode.draws_vertices() {
        draw_vertex_markers(fb, &tri.points, config.vertex_color);
    }
}
