//! Keyboard-driven fly camera and its uniform

use std::f32::consts::PI;

use cgmath::Vector3;
use winit::keyboard::KeyCode;

use crate::{gfx::scene::Pose, input::InputState};

const BASE_SPEED: f32 = 0.25;
const BASE_TURN: f32 = 0.05;

/// Camera uniform as read by the render shader.
///
/// The shader builds its view matrix from the translation and Euler
/// rotation directly; the padding lanes of both vec3s carry the projection
/// parameters.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub translation: [f32; 3],
    pub aspect: f32,
    pub rotation: [f32; 3],
    pub fov_y: f32,
}

/// Camera steered from the keyboard state mirror.
///
/// - W / S: forward / back along the heading in the XZ plane
/// - R / F: up / down
/// - D / A: yaw right / left
/// - `=` held: ×10 speed, ×5 turn rate. `-` held: ÷10 both.
///
/// The camera is not part of the scene graph and never collides.
pub struct MovableCamera {
    pub pose: Pose,
    pub fov_y: f32,
    pub aspect: f32,
}

impl Default for MovableCamera {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.5, 15.0), Vector3::new(0.0, PI, 0.0))
    }
}

impl MovableCamera {
    pub fn new(loc: Vector3<f32>, rot: Vector3<f32>) -> Self {
        Self {
            pose: Pose::new(loc, rot, Vector3::new(1.0, 1.0, 1.0)),
            fov_y: PI / 3.0,
            aspect: 1.0,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Reads the key mirror and moves one tick.
    pub fn update(&mut self, input: &InputState) {
        let (mut speed, mut turn) = (BASE_SPEED, BASE_TURN);
        if input.is_pressed(KeyCode::Equal) {
            speed *= 10.0;
            turn *= 5.0;
        } else if input.is_pressed(KeyCode::Minus) {
            speed /= 10.0;
            turn /= 10.0;
        }

        let heading = self.pose.rot().y;
        let forward = axis(input, KeyCode::KeyW, KeyCode::KeyS);
        let vertical = axis(input, KeyCode::KeyR, KeyCode::KeyF);
        let yaw = axis(input, KeyCode::KeyD, KeyCode::KeyA);

        self.pose.velocity = Vector3::new(
            forward * speed * heading.sin(),
            vertical * speed,
            forward * speed * heading.cos(),
        );
        self.pose.ang_velocity = Vector3::new(0.0, yaw * turn, 0.0);
        self.pose.integrate(true);
    }

    pub fn uniform(&self) -> CameraUniform {
        let loc = self.pose.loc();
        let rot = self.pose.rot();
        CameraUniform {
            translation: [loc.x, loc.y, loc.z],
            aspect: self.aspect,
            rotation: [rot.x, rot.y, rot.z],
            fov_y: self.fov_y,
        }
    }
}

/// +1 when only `positive` is held, -1 when only `negative` is, else 0.
fn axis(input: &InputState, positive: KeyCode, negative: KeyCode) -> f32 {
    match (input.is_pressed(positive), input.is_pressed(negative)) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}
