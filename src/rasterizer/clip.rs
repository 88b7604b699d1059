//! View-space frustum clipping
//!
//! Each face becomes a polygon that is clipped against the six frustum planes
//! in turn (Sutherland-Hodgman), then fanned back into triangles. Each plane
//! can add at most one vertex, so storage is a fixed-size array.

use super::math::{Vec2, Vec3};

/// Upper bound on polygon vertices: 3 original + one per clip plane, rounded up
pub const MAX_POLY_VERTICES: usize = 10;
/// Upper bound on triangles produced by fanning a clipped polygon
pub const MAX_POLY_TRIANGLES: usize = MAX_POLY_VERTICES - 2;

/// A plane given by a point on it and a normal pointing into the visible side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal }
    }

    /// Positive inside, negative outside
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        (p - self.point).dot(self.normal)
    }
}

/// Vertex carried through clipping: view-space position plus texture coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClipVertex {
    pub position: Vec3,
    pub uv: Vec2,
}

impl ClipVertex {
    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self { position, uv }
    }

    pub fn lerp(self, other: ClipVertex, t: f32) -> ClipVertex {
        ClipVertex {
            position: self.position.lerp(other.position, t),
            uv: self.uv.lerp(other.uv, t),
        }
    }
}

/// Convex polygon with bounded vertex storage
#[derive(Debug, Clone, Copy)]
pub struct Polygon {
    vertices: [ClipVertex; MAX_POLY_VERTICES],
    len: usize,
}

impl Polygon {
    pub fn from_triangle(a: ClipVertex, b: ClipVertex, c: ClipVertex) -> Self {
        let mut vertices = [ClipVertex::default(); MAX_POLY_VERTICES];
        vertices[0] = a;
        vertices[1] = b;
        vertices[2] = c;
        Self { vertices, len: 3 }
    }

    pub fn vertices(&self) -> &[ClipVertex] {
        &self.vertices[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Fewer than three vertices: nothing left to draw
    pub fn is_empty(&self) -> bool {
        self.len < 3
    }

    fn push(&mut self, v: ClipVertex) {
        // Each plane adds at most one vertex
        if self.len < MAX_POLY_VERTICES {
            self.vertices[self.len] = v;
            self.len += 1;
        }
    }

    /// Clip against a single plane, keeping vertices with distance >= 0
    pub fn clip_against_plane(&self, plane: &Plane) -> Polygon {
        let mut output = Polygon {
            vertices: [ClipVertex::default(); MAX_POLY_VERTICES],
            len: 0,
        };
        if self.len == 0 {
            return output;
        }

        let mut previous = self.vertices[self.len - 1];
        let mut previous_dist = plane.signed_distance(previous.position);

        for &current in self.vertices() {
            let current_dist = plane.signed_distance(current.position);

            // Edge crosses the plane: emit the intersection
            if (current_dist >= 0.0) != (previous_dist >= 0.0) {
                let t = previous_dist / (previous_dist - current_dist);
                output.push(previous.lerp(current, t));
            }

            if current_dist >= 0.0 {
                output.push(current);
            }

            previous = current;
            previous_dist = current_dist;
        }

        output
    }

    /// Fan triangulation from vertex 0: `n - 2` triangles, winding preserved
    pub fn triangles(&self) -> impl Iterator<Item = [ClipVertex; 3]> + '_ {
        let v = self.vertices();
        (1..self.len.saturating_sub(1)).map(move |i| [v[0], v[i], v[i + 1]])
    }
}

/// The six view-space frustum planes
#[derive(Debug, Clone)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Build the frustum for horizontal/vertical fields of view (radians)
    /// and near/far distances along +Z.
    pub fn new(fov_x: f32, fov_y: f32, z_near: f32, z_far: f32) -> Self {
        let (sin_x, cos_x) = (fov_x / 2.0).sin_cos();
        let (sin_y, cos_y) = (fov_y / 2.0).sin_cos();
        let origin = Vec3::ZERO;

        Self {
            planes: [
                // Near
                Plane::new(Vec3::new(0.0, 0.0, z_near), Vec3::new(0.0, 0.0, 1.0)),
                // Far
                Plane::new(Vec3::new(0.0, 0.0, z_far), Vec3::new(0.0, 0.0, -1.0)),
                // Left
                Plane::new(origin, Vec3::new(cos_x, 0.0, sin_x)),
                // Right
                Plane::new(origin, Vec3::new(-cos_x, 0.0, sin_x)),
                // Top
                Plane::new(origin, Vec3::new(0.0, -cos_y, sin_y)),
                // Bottom
                Plane::new(origin, Vec3::new(0.0, cos_y, sin_y)),
            ],
        }
    }

    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Clip against every plane; the result may be empty
    pub fn clip(&self, polygon: &Polygon) -> Polygon {
        let mut result = *polygon;
        for plane in &self.planes {
            if result.is_empty() {
                break;
            }
            result = result.clip_against_plane(plane);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOV: f32 = std::f32::consts::FRAC_PI_2;

    fn frustum() -> Frustum {
        Frustum::new(FOV, FOV, 1.0, 100.0)
    }

    fn cv(x: f32, y: f32, z: f32) -> ClipVertex {
        ClipVertex::new(Vec3::new(x, y, z), Vec2::new(x, y))
    }

    fn area(t: &[ClipVertex; 3]) -> f32 {
        let ab = t[1].position - t[0].position;
        let ac = t[2].position - t[0].position;
        ab.cross(ac).len() / 2.0
    }

    #[test]
    fn test_inside_triangle_unchanged() {
        let a = cv(-1.0, -1.0, 10.0);
        let b = cv(0.0, 1.0, 10.0);
        let c = cv(1.0, -1.0, 10.0);
        let clipped = frustum().clip(&Polygon::from_triangle(a, b, c));

        assert_eq!(clipped.vertices(), &[a, b, c]);
        let tris: Vec<_> = clipped.triangles().collect();
        assert_eq!(tris, vec![[a, b, c]]);
    }

    #[test]
    fn test_behind_near_plane_is_dropped() {
        let poly = Polygon::from_triangle(cv(-1.0, 0.0, 0.5), cv(0.0, 0.1, 0.2), cv(1.0, 0.0, 0.5));
        let clipped = frustum().clip(&poly);
        assert!(clipped.is_empty());
        assert_eq!(clipped.triangles().count(), 0);
    }

    #[test]
    fn test_outside_side_plane_is_dropped() {
        // Entirely left of the 90 degree frustum (x < -z)
        let poly = Polygon::from_triangle(cv(-20.0, 0.0, 5.0), cv(-30.0, 1.0, 5.0), cv(-25.0, -1.0, 6.0));
        assert!(frustum().clip(&poly).is_empty());
    }

    #[test]
    fn test_outside_each_remaining_side_plane_is_dropped() {
        let right = Polygon::from_triangle(cv(20.0, 0.0, 5.0), cv(30.0, 1.0, 5.0), cv(25.0, -1.0, 6.0));
        let top = Polygon::from_triangle(cv(0.0, 20.0, 5.0), cv(1.0, 30.0, 5.0), cv(-1.0, 25.0, 6.0));
        let bottom = Polygon::from_triangle(cv(0.0, -20.0, 5.0), cv(1.0, -30.0, 5.0), cv(-1.0, -25.0, 6.0));
        for poly in [right, top, bottom] {
            let clipped = frustum().clip(&poly);
            assert!(clipped.is_empty());
            assert_eq!(clipped.triangles().count(), 0);
        }
    }

    #[test]
    fn test_beyond_far_plane_is_dropped() {
        let poly = Polygon::from_triangle(cv(0.0, 0.0, 150.0), cv(1.0, 1.0, 150.0), cv(1.0, 0.0, 200.0));
        assert!(frustum().clip(&poly).is_empty());
    }

    #[test]
    fn test_straddling_near_plane_gives_two_triangles() {
        // Triangles lie in the y = 0 plane, well inside the side planes
        let near = 1.0;
        let frustum = Frustum::new(FOV, FOV, near, 100.0);

        let a = cv(0.0, 0.0, 3.0);
        let b = cv(0.5, 0.0, 0.0);
        let c = cv(-0.5, 0.0, 0.0);
        let clipped = frustum.clip(&Polygon::from_triangle(a, b, c));

        // One vertex in front: the cut leaves a smaller triangle
        assert_eq!(clipped.len(), 3);
        assert_eq!(clipped.triangles().count(), 1);

        let a = cv(0.5, 0.0, 3.0);
        let b = cv(-0.5, 0.0, 3.0);
        let c = cv(0.0, 0.0, 0.0);
        let clipped = frustum.clip(&Polygon::from_triangle(a, b, c));
        // Two vertices in front: the cut leaves a quad
        let tris: Vec<_> = clipped.triangles().collect();
        assert_eq!(tris.len(), 2);

        // Analytic area of the part with z >= near:
        // full triangle area 1.5, the cut-off tip is similar with ratio 1/3.
        let full = 0.5 * 1.0 * 3.0;
        let tip = full * (1.0f32 / 3.0).powi(2);
        let expected = full - tip;
        let total: f32 = tris.iter().map(area).sum();
        assert!((total - expected).abs() < 1e-4, "got {} expected {}", total, expected);

        // Every surviving vertex is on or in front of the near plane
        for v in clipped.vertices() {
            assert!(v.position.z >= near - 1e-5);
        }
    }

    #[test]
    fn test_intersection_interpolates_uv() {
        let plane = Plane::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 1.0));
        let a = ClipVertex::new(Vec3::new(0.0, 0.0, 3.0), Vec2::new(0.0, 0.0));
        let b = ClipVertex::new(Vec3::new(1.0, 0.0, 3.0), Vec2::new(1.0, 0.0));
        let c = ClipVertex::new(Vec3::new(0.0, 0.0, 0.0), Vec2::new(0.0, 1.0));
        let clipped = Polygon::from_triangle(a, b, c).clip_against_plane(&plane);

        assert_eq!(clipped.len(), 4);
        // Edge c -> a crosses z = 1 a third of the way from c
        let hit = clipped
            .vertices()
            .iter()
            .find(|v| (v.position.z - 1.0).abs() < 1e-5 && v.position.x.abs() < 1e-5)
            .copied()
            .unwrap();
        assert!((hit.uv.y - 2.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_fan_preserves_first_vertex() {
        let mut poly = Polygon::from_triangle(cv(0.0, 0.0, 1.0), cv(1.0, 0.0, 1.0), cv(1.0, 1.0, 1.0));
        poly.push(cv(0.0, 1.0, 1.0));
        poly.push(cv(-0.5, 0.5, 1.0));
        let tris: Vec<_> = poly.triangles().collect();
        assert_eq!(tris.len(), 3);
        for t in &tris {
            assert_eq!(t[0], poly.vertices()[0]);
        }
        assert_eq!(tris[2][2], poly.vertices()[4]);
    }

    #[test]
    fn test_corner_clip_stays_bounded() {
        // Large triangle crossing several planes at once
        let poly = Polygon::from_triangle(cv(-500.0, -500.0, 0.5), cv(0.0, 500.0, 200.0), cv(500.0, -500.0, 50.0));
        let clipped = frustum().clip(&poly);
        assert!(clipped.len() <= MAX_POLY_VERTICES);
        assert!(clipped.triangles().count() <= MAX_POLY_TRIANGLES);
        for v in clipped.vertices() {
            for plane in frustum().planes() {
                assert!(plane.signed_distance(v.position) >= -1e-2);
            }
        }
    }
}
