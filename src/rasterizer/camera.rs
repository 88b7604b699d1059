//! First-person camera

use super::math::{Mat4, Vec3, Vec4};

/// Camera state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,   // Rotation around Y
    pub pitch: f32, // Rotation around X

    // Computed from yaw and pitch
    pub direction: Vec3,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        let mut cam = Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            direction: Vec3::new(0.0, 0.0, 1.0),
        };
        cam.update_direction();
        cam
    }

    /// Camera with a starting yaw and pitch (radians)
    pub fn with_angles(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut cam = Self::new(position);
        cam.yaw = yaw;
        cam.pitch = pitch;
        cam.update_direction();
        cam
    }

    /// Rotate +Z by pitch, then yaw
    pub fn update_direction(&mut self) {
        let rotation = Mat4::rotation_y(self.yaw).mul_mat4(&Mat4::rotation_x(self.pitch));
        self.direction = rotation.mul_vec4(Vec4::new(0.0, 0.0, 1.0, 0.0)).xyz();
    }

    /// Point one unit ahead of the camera
    pub fn look_at_target(&self) -> Vec3 {
        self.position + self.direction
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.look_at_target(), Vec3::UP)
    }

    /// Move along the view direction; negative moves back
    pub fn move_forward(&mut self, distance: f32) {
        self.position = self.position + self.direction * distance;
    }

    pub fn move_vertical(&mut self, distance: f32) {
        self.position.y += distance;
    }

    pub fn rotate_yaw(&mut self, angle: f32) {
        self.yaw += angle;
        self.update_direction();
    }

    pub fn rotate_pitch(&mut self, angle: f32) {
        self.pitch += angle;
        self.update_direction();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}
