//! Grayscale: CPU software rasterizer viewer
//!
//! Loads a RON scene, renders it with the software pipeline every frame and
//! blits the color buffer to the window.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use app::{poll_actions, AppState};
use clap::Parser;
use grayscale::rasterizer::{HEIGHT, WIDTH};
use grayscale::world::{load_scene_config, SceneConfig, World};
use macroquad::prelude::*;

/// Command line options
#[derive(Parser, Debug)]
#[command(name = "grayscale", version, about = "CPU software rasterizer")]
struct Args {
    /// Scene file (RON); the built-in scene is used when omitted
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Framebuffer width in pixels
    #[arg(long, default_value_t = WIDTH as u16, value_parser = clap::value_parser!(u16).range(1..))]
    width: u16,

    /// Framebuffer height in pixels
    #[arg(long, default_value_t = HEIGHT as u16, value_parser = clap::value_parser!(u16).range(1..))]
    height: u16,

    /// Window pixels per framebuffer pixel
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=MAX_WINDOW_SCALE))]
    window_scale: u32,
}

const MAX_WINDOW_SCALE: i64 = 8;

static ARGS: OnceLock<Args> = OnceLock::new();

fn args() -> &'static Args {
    ARGS.get_or_init(Args::parse)
}

fn window_conf() -> Conf {
    let args = args();
    Conf {
        window_title: format!("Grayscale v{}", VERSION),
        window_width: window_extent(args.width, args.window_scale),
        window_height: window_extent(args.height, args.window_scale),
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Window size along one axis, saturating instead of overflowing
fn window_extent(pixels: u16, scale: u32) -> i32 {
    i32::try_from(u32::from(pixels).saturating_mul(scale)).unwrap_or(i32::MAX)
}

/// Load the requested scene, falling back to the built-in one on any error
fn load_world(path: Option<&Path>) -> Option<World> {
    let config = match path {
        Some(path) => match load_scene_config(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load scene {}: {}", path.display(), e);
                SceneConfig::default()
            }
        },
        None => SceneConfig::default(),
    };

    match World::from_config(&config) {
        Ok(world) => Some(world),
        Err(e) => {
            log::error!("Failed to build scene: {}, using the built-in scene", e);
            World::from_config(&SceneConfig::default())
                .map_err(|e| log::error!("Built-in scene failed: {}", e))
                .ok()
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = args();
    log::info!("=== Grayscale v{} ===", VERSION);

    let Some(world) = load_world(args.scene.as_deref()) else {
        return;
    };
    let (fb_width, fb_height) = (args.width.max(1), args.height.max(1));
    let mut app = AppState::new(world, usize::from(fb_width), usize::from(fb_height));

    let fb_texture = Texture2D::from_rgba8(fb_width, fb_height, &app.rgba);
    fb_texture.set_filter(FilterMode::Nearest);

    let mut actions = Vec::new();

    while app.running {
        let dt = get_frame_time();

        poll_actions(&mut actions);
        for &action in &actions {
            app.apply(action, dt);
        }

        app.update(dt);
        fb_texture.update_from_bytes(u32::from(fb_width), u32::from(fb_height), &app.rgba);

        clear_background(BLACK);
        draw_texture_ex(
            &fb_texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );
        draw_text(
            &format!("{} | {} fps", app.renderer.config.mode.label(), get_fps()),
            8.0,
            20.0,
            20.0,
            WHITE,
        );

        next_frame().await;
    }

    log::info!("Exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults_and_ranges() {
        let args = Args::try_parse_from(["grayscale"]).unwrap();
        assert_eq!((usize::from(args.width), usize::from(args.height)), (WIDTH, HEIGHT));
        assert_eq!(args.window_scale, 1);

        assert!(Args::try_parse_from(["grayscale", "--width", "0"]).is_err());
        assert!(Args::try_parse_from(["grayscale", "--width", "70000"]).is_err());
        assert!(Args::try_parse_from(["grayscale", "--height", "65535"]).is_ok());
        assert!(Args::try_parse_from(["grayscale", "--window-scale", "0"]).is_err());
        assert!(Args::try_parse_from(["grayscale", "--window-scale", "9"]).is_err());
    }

    #[test]
    fn test_window_extent_fits_i32() {
        assert_eq!(window_extent(800, 2), 1600);
        assert_eq!(window_extent(u16::MAX, 8), 524_280);
        assert_eq!(window_extent(u16::MAX, u32::MAX), i32::MAX);
    }
}
