//! Application state and input mapping
//!
//! Keyboard input is turned into `Action`s so that the state changes can be
//! exercised without a window.

use grayscale::rasterizer::{CullMode, RenderMode, Renderer};
use grayscale::world::World;
use macroquad::prelude::{is_key_down, is_key_pressed, KeyCode};

/// Camera speed in units per second
pub const MOVE_SPEED: f32 = 5.0;
pub const VERTICAL_SPEED: f32 = 3.0;
/// Turn speed in radians per second
pub const TURN_SPEED: f32 = 1.0;

/// Something the user asked for this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    SetRenderMode(RenderMode),
    SetCullMode(CullMode),
    /// +1 forward, -1 back
    Move(f32),
    /// +1 up, -1 down
    Rise(f32),
    /// +1 right, -1 left
    Yaw(f32),
    /// +1 up, -1 down
    Pitch(f32),
    Quit,
}

/// Keys that act once per press
const PRESS_BINDINGS: [(KeyCode, Action); 9] = [
    (KeyCode::Key1, Action::SetRenderMode(RenderMode::Wireframe)),
    (KeyCode::Key2, Action::SetRenderMode(RenderMode::WireframeVertices)),
    (KeyCode::Key3, Action::SetRenderMode(RenderMode::Filled)),
    (KeyCode::Key4, Action::SetRenderMode(RenderMode::FilledWireframe)),
    (KeyCode::Key5, Action::SetRenderMode(RenderMode::Textured)),
    (KeyCode::Key6, Action::SetRenderMode(RenderMode::TexturedWireframe)),
    (KeyCode::Key7, Action::SetCullMode(CullMode::Backface)),
    (KeyCode::Key8, Action::SetCullMode(CullMode::None)),
    (KeyCode::Escape, Action::Quit),
];

/// Keys that act every frame while held
const HOLD_BINDINGS: [(KeyCode, Action); 8] = [
    (KeyCode::W, Action::Move(1.0)),
    (KeyCode::S, Action::Move(-1.0)),
    (KeyCode::Up, Action::Rise(1.0)),
    (KeyCode::Down, Action::Rise(-1.0)),
    (KeyCode::A, Action::Yaw(-1.0)),
    (KeyCode::D, Action::Yaw(1.0)),
    (KeyCode::E, Action::Pitch(1.0)),
    (KeyCode::Q, Action::Pitch(-1.0)),
];

/// Read the keyboard into a list of actions
pub fn poll_actions(out: &mut Vec<Action>) {
    out.clear();
    for (key, action) in PRESS_BINDINGS {
        if is_key_pressed(key) {
            out.push(action);
        }
    }
    for (key, action) in HOLD_BINDINGS {
        if is_key_down(key) {
            out.push(action);
        }
    }
}

/// Main application state
pub struct AppState {
    pub world: World,
    pub renderer: Renderer,
    pub running: bool,
    /// Scratch RGBA buffer for presentation
    pub rgba: Vec<u8>,
}

impl AppState {
    pub fn new(world: World, width: usize, height: usize) -> Self {
        let renderer = Renderer::new(width, height, world.projection, world.render.clone());
        Self {
            world,
            renderer,
            running: true,
            rgba: vec![0; width * height * 4],
        }
    }

    /// Apply one action scaled by the frame time
    pub fn apply(&mut self, action: Action, dt: f32) {
        let camera = &mut self.world.camera;
        match action {
            Action::SetRenderMode(mode) => {
                log::info!("render mode: {}", mode.label());
                self.renderer.config.mode = mode;
            }
            Action::SetCullMode(cull) => {
                log::info!("cull mode: {:?}", cull);
                self.renderer.config.cull = cull;
            }
            Action::Move(dir) => camera.move_forward(dir * MOVE_SPEED * dt),
            Action::Rise(dir) => camera.move_vertical(dir * VERTICAL_SPEED * dt),
            Action::Yaw(dir) => camera.rotate_yaw(dir * TURN_SPEED * dt),
            Action::Pitch(dir) => camera.rotate_pitch(dir * TURN_SPEED * dt),
            Action::Quit => self.running = false,
        }
    }

    /// Advance animation and draw one frame into `rgba`
    pub fn update(&mut self, dt: f32) {
        self.world.animate(dt);
        let view = self.world.camera.view_matrix();
        self.renderer.render(&self.world.scene, &view);
        self.renderer.framebuffer().write_rgba(&mut self.rgba);
    }
}
