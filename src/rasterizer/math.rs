//! Vector and matrix math for the 3D pipeline
//!
//! Row-major 4x4 matrices multiplied against column vectors. Every matrix
//! constructor starts from identity (or zero, for the projection) and only
//! touches the entries its transform needs.

use std::ops::{Add, Mul, Sub};
use serde::{Deserialize, Serialize};

/// 2D Vector (screen points and texture coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Z component of the 3D cross product (twice the signed triangle area)
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        self + (other - self) * t
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector, or `ZERO` for a zero-length input
    pub fn normalize(self) -> Vec3 {
        self.try_normalize().unwrap_or(Vec3::ZERO)
    }

    /// Unit vector, `None` when the length is zero or not finite
    pub fn try_normalize(self) -> Option<Vec3> {
        let l = self.len();
        if l == 0.0 || !l.is_finite() {
            return None;
        }
        Some(self.scale(1.0 / l))
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn lerp(self, other: Vec3, t: f32) -> Vec3 {
        self + (other - self) * t
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

/// Homogeneous 4D vector. After projection `w` holds the view-space depth.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Point with `w = 1`
    pub fn from_point(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z, w: 1.0 }
    }

    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Divide x, y, z by w. A zero `w` leaves the point unprojected.
    pub fn perspective_divide(self) -> Vec4 {
        if self.w == 0.0 {
            return self;
        }
        Vec4 {
            x: self.x / self.w,
            y: self.y / self.w,
            z: self.z / self.w,
            w: self.w,
        }
    }
}

/// 4x4 row-major matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub const ZERO: Mat4 = Mat4 { m: [[0.0; 4]; 4] };

    pub fn scale(sx: f32, sy: f32, sz: f32) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        matrix.m[0][0] = sx;
        matrix.m[1][1] = sy;
        matrix.m[2][2] = sz;
        matrix
    }

    pub fn translation(tx: f32, ty: f32, tz: f32) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        matrix.m[0][3] = tx;
        matrix.m[1][3] = ty;
        matrix.m[2][3] = tz;
        matrix
    }

    pub fn rotation_x(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        let mut matrix = Mat4::IDENTITY;
        matrix.m[1][1] = c;
        matrix.m[1][2] = -s;
        matrix.m[2][1] = s;
        matrix.m[2][2] = c;
        matrix
    }

    /// Rotation about Y. The sine signs are mirrored relative to X and Z so
    /// that all three axes turn in the same screen direction; face winding and
    /// culling depend on it.
    pub fn rotation_y(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        let mut matrix = Mat4::IDENTITY;
        matrix.m[0][0] = c;
        matrix.m[0][2] = s;
        matrix.m[2][0] = -s;
        matrix.m[2][2] = c;
        matrix
    }

    pub fn rotation_z(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        let mut matrix = Mat4::IDENTITY;
        matrix.m[0][0] = c;
        matrix.m[0][1] = -s;
        matrix.m[1][0] = s;
        matrix.m[1][1] = c;
        matrix
    }

    /// Perspective projection.
    ///
    /// `aspect` is height / width. Only five entries are populated; `m[3][2] = 1`
    /// copies the incoming view-space z into the output w for the later divide.
    /// After the divide, z = near maps to 0 and z = far maps to 1.
    pub fn perspective(fov: f32, aspect: f32, znear: f32, zfar: f32) -> Mat4 {
        let f = 1.0 / (fov / 2.0).tan();
        let mut matrix = Mat4::ZERO;
        matrix.m[0][0] = aspect * f;
        matrix.m[1][1] = f;
        matrix.m[2][2] = zfar / (zfar - znear);
        matrix.m[2][3] = (-zfar * znear) / (zfar - znear);
        matrix.m[3][2] = 1.0;
        matrix
    }

    /// View matrix looking from `eye` towards `target`.
    ///
    /// `eye == target` or `up` parallel to the view direction collapse the
    /// basis to zero vectors; callers keep the camera orientation non-degenerate.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let z = (target - eye).normalize();
        let x = up.cross(z).normalize();
        let y = z.cross(x);

        Mat4 {
            m: [
                [x.x, x.y, x.z, -x.dot(eye)],
                [y.x, y.y, y.z, -y.dot(eye)],
                [z.x, z.y, z.z, -z.dot(eye)],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// World matrix `T * Rz * Ry * Rx * S`: scale first, translate last
    pub fn world(scale: Vec3, rotation: Vec3, translation: Vec3) -> Mat4 {
        let mut world = Mat4::IDENTITY;
        world = Mat4::scale(scale.x, scale.y, scale.z).mul_mat4(&world);
        world = Mat4::rotation_z(rotation.z).mul_mat4(&world);
        world = Mat4::rotation_y(rotation.y).mul_mat4(&world);
        world = Mat4::rotation_x(rotation.x).mul_mat4(&world);
        Mat4::translation(translation.x, translation.y, translation.z).mul_mat4(&world)
    }

    pub fn mul_mat4(&self, other: &Mat4) -> Mat4 {
        let mut result = Mat4::ZERO;
        for i in 0..4 {
            for j in 0..4 {
                result.m[i][j] = self.m[i][0] * other.m[0][j]
                    + self.m[i][1] * other.m[1][j]
                    + self.m[i][2] * other.m[2][j]
                    + self.m[i][3] * other.m[3][j];
            }
        }
        result
    }

    pub fn mul_vec4(&self, v: Vec4) -> Vec4 {
        let m = &self.m;
        Vec4 {
            x: m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z + m[0][3] * v.w,
            y: m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z + m[1][3] * v.w,
            z: m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z + m[2][3] * v.w,
            w: m[3][0] * v.x + m[3][1] * v.y + m[3][2] * v.z + m[3][3] * v.w,
        }
    }

    /// Project then perspective-divide
    pub fn mul_vec4_project(&self, v: Vec4) -> Vec4 {
        self.mul_vec4(v).perspective_divide()
    }

    /// Transform a point (w = 1) and drop w
    pub fn transform_point(&self, v: Vec3) -> Vec3 {
        self.mul_vec4(Vec4::from_point(v)).xyz()
    }
}

/// Barycentric weights (alpha, beta, gamma) of `p` in triangle (a, b, c).
///
/// Computed from 2D cross-product areas. Weights sum to 1 and go negative
/// outside the triangle. Returns `None` for a zero-area triangle.
pub fn barycentric_weights(a: Vec2, b: Vec2, c: Vec2, p: Vec2) -> Option<Vec3> {
    let ab = b - a;
    let bc = c - b;
    let ac = c - a;
    let ap = p - a;
    let bp = p - b;

    let area_abc = ab.cross(ac);
    if area_abc == 0.0 {
        return None;
    }

    let alpha = bc.cross(bp) / area_abc;
    let beta = ap.cross(ac) / area_abc;
    let gamma = 1.0 - alpha - beta;

    Some(Vec3::new(alpha, beta, gamma))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn approx_vec3(a: Vec3, b: Vec3) -> bool {
        approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
    }

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < 0.001);
    }

    #[test]
    fn test_vec3_cross() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        let c = a.cross(b);
        assert!((c.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_try_normalize_zero() {
        assert_eq!(Vec3::ZERO.try_normalize(), None);
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
    }

    #[test]
    fn test_rotation_y_sign_convention() {
        // +X rotated a quarter turn about Y lands on -Z
        let p = Mat4::rotation_y(std::f32::consts::FRAC_PI_2).transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!(approx_vec3(p, Vec3::new(0.0, 0.0, -1.0)));

        // +Y about X lands on +Z, +X about Z lands on +Y
        let p = Mat4::rotation_x(std::f32::consts::FRAC_PI_2).transform_point(Vec3::new(0.0, 1.0, 0.0));
        assert!(approx_vec3(p, Vec3::new(0.0, 0.0, 1.0)));
        let p = Mat4::rotation_z(std::f32::consts::FRAC_PI_2).transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!(approx_vec3(p, Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_perspective_sparse_pattern() {
        let p = Mat4::perspective(std::f32::consts::FRAC_PI_3, 0.75, 0.1, 100.0);
        let populated = [(0, 0), (1, 1), (2, 2), (2, 3), (3, 2)];
        for i in 0..4 {
            for j in 0..4 {
                if !populated.contains(&(i, j)) {
                    assert_eq!(p.m[i][j], 0.0, "entry ({}, {}) should be zero", i, j);
                }
            }
        }
        assert_eq!(p.m[3][2], 1.0);
    }

    #[test]
    fn test_perspective_depth_range() {
        let (near, far) = (0.1, 100.0);
        let p = Mat4::perspective(std::f32::consts::FRAC_PI_3, 0.75, near, far);

        let at_near = p.mul_vec4_project(Vec4::new(0.0, 0.0, near, 1.0));
        let at_far = p.mul_vec4_project(Vec4::new(0.0, 0.0, far, 1.0));

        assert!(approx(at_near.z, 0.0));
        assert!(approx(at_far.z, 1.0));
        // w keeps the view-space depth
        assert!(approx(at_near.w, near));
        assert!(approx(at_far.w, far));
    }

    #[test]
    fn test_perspective_divide_skips_zero_w() {
        let v = Vec4::new(3.0, 4.0, 5.0, 0.0);
        assert_eq!(v.perspective_divide(), v);
    }

    #[test]
    fn test_world_matrix_order() {
        // Scale, then rotate, then translate
        let world = Mat4::world(
            Vec3::new(2.0, 2.0, 2.0),
            Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2),
            Vec3::new(10.0, 0.0, 0.0),
        );
        let p = world.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!(approx_vec3(p, Vec3::new(10.0, 2.0, 0.0)));
    }

    #[test]
    fn test_look_at_identity_from_origin() {
        let view = Mat4::look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), Vec3::UP);
        for i in 0..4 {
            for j in 0..4 {
                assert!(approx(view.m[i][j], Mat4::IDENTITY.m[i][j]));
            }
        }
    }

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Vec3::new(1.0, 2.0, -5.0);
        let view = Mat4::look_at(eye, Vec3::new(1.0, 2.0, 0.0), Vec3::UP);
        assert!(approx_vec3(view.transform_point(eye), Vec3::ZERO));
        // A point straight ahead ends up on +Z
        let ahead = view.transform_point(Vec3::new(1.0, 2.0, 0.0));
        assert!(approx_vec3(ahead, Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn test_barycentric_vertices_and_centroid() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        let c = Vec2::new(5.0, 10.0);

        let wa = barycentric_weights(a, b, c, a).unwrap();
        let wb = barycentric_weights(a, b, c, b).unwrap();
        let wc = barycentric_weights(a, b, c, c).unwrap();
        assert!(approx_vec3(wa, Vec3::new(1.0, 0.0, 0.0)));
        assert!(approx_vec3(wb, Vec3::new(0.0, 1.0, 0.0)));
        assert!(approx_vec3(wc, Vec3::new(0.0, 0.0, 1.0)));

        let centroid = Vec2::new(5.0, 10.0 / 3.0);
        let w = barycentric_weights(a, b, c, centroid).unwrap();
        let third = 1.0 / 3.0;
        assert!(approx_vec3(w, Vec3::new(third, third, third)));
    }

    #[test]
    fn test_barycentric_degenerate() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(5.0, 5.0);
        let c = Vec2::new(10.0, 10.0);
        assert!(barycentric_weights(a, b, c, Vec2::new(1.0, 2.0)).is_none());
    }

    proptest! {
        #[test]
        fn rotation_x_inverse(
            theta in -10.0f32..10.0,
            x in -100.0f32..100.0,
            y in -100.0f32..100.0,
            z in -100.0f32..100.0,
        ) {
            let p = Vec3::new(x, y, z);
            let back = Mat4::rotation_x(-theta).transform_point(Mat4::rotation_x(theta).transform_point(p));
            prop_assert!((back.x - p.x).abs() < 1e-3);
            prop_assert!((back.y - p.y).abs() < 1e-3);
            prop_assert!((back.z - p.z).abs() < 1e-3);
        }

        #[test]
        fn rotation_y_z_inverse(theta in -10.0f32..10.0, x in -50.0f32..50.0, z in -50.0f32..50.0) {
            let p = Vec3::new(x, 1.0, z);
            let y_back = Mat4::rotation_y(-theta).transform_point(Mat4::rotation_y(theta).transform_point(p));
            let z_back = Mat4::rotation_z(-theta).transform_point(Mat4::rotation_z(theta).transform_point(p));
            prop_assert!((y_back - p).len() < 1e-3);
            prop_assert!((z_back - p).len() < 1e-3);
        }
    }
}
