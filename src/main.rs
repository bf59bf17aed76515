//! Snowglobe: a snowman in falling snow
//!
//! A small 3D scene assembled from primitive meshes (spheres, cylinders,
//! cones, tori, boxes and a ground plane), lit by an ambient and a point
//! light, with a loop of snowflakes falling around it. Drag with the left
//! mouse button to orbit, scroll to zoom.
//!
//! Usage:
//!   `snowglobe [scene.ron]`              run with a scene config
//!   `snowglobe --write-config <path>`    write the default config and exit

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod camera;
mod config;
mod frame;
mod geometry;
mod particles;
mod render;
mod scene;
mod snowman;
mod viewport;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use macroquad::prelude::{get_frame_time, next_frame};
use rand::rngs::StdRng;
use rand::SeedableRng;
use camera::{OrbitControl, OrbitInput, SceneCamera};
use config::SceneConfig;
use frame::FrameLoop;
use particles::ParticleField;
use render::MacroquadRenderer;
use scene::SceneGraph;
use viewport::{MacroquadSurface, ViewportController};

/// What the command line asked for
#[derive(Debug, Clone, PartialEq)]
enum Command {
    /// Open the window with an optional config path
    Run(Option<PathBuf>),
    /// Write the built-in defaults to a file, no window
    WriteConfig(PathBuf),
}

fn parse_command(args: &[String]) -> Command {
    match args {
        [flag, path, ..] if flag == "--write-config" => Command::WriteConfig(PathBuf::from(path)),
        [path, ..] => Command::Run(Some(PathBuf::from(path))),
        [] => Command::Run(None),
    }
}

fn write_default_config(path: &Path) -> i32 {
    match config::save_config(&SceneConfig::default(), path) {
        Ok(()) => {
            println!("Wrote default scene config to {}", path.display());
            0
        }
        Err(e) => {
            eprintln!("Failed to write scene config {}: {}", path.display(), e);
            1
        }
    }
}

/// Loaded once; the window is configured before `main` runs
static SCENE_CONFIG: OnceLock<SceneConfig> = OnceLock::new();

fn scene_config(explicit: Option<&Path>) -> &'static SceneConfig {
    SCENE_CONFIG.get_or_init(|| config::startup_config(explicit))
}

fn window_conf() -> macroquad::conf::Conf {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let explicit = match parse_command(&args) {
        Command::WriteConfig(path) => std::process::exit(write_default_config(&path)),
        Command::Run(path) => path,
    };

    let window = &scene_config(explicit.as_deref()).window;
    let mut conf = macroquad::conf::Conf::from(macroquad::window::Conf {
        window_title: format!("{} v{}", window.title, VERSION),
        window_width: window.width,
        window_height: window.height,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    });
    // The default per-call capacity clamps the larger snowman meshes
    conf.draw_call_vertex_capacity = render::DRAW_CALL_VERTEX_CAPACITY;
    conf.draw_call_index_capacity = render::DRAW_CALL_INDEX_CAPACITY;
    conf
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    // Already loaded by window_conf
    let config = scene_config(None);

    let mut scene = SceneGraph::new();
    let figure = snowman::build(&mut scene);
    println!("Built snowman: {} meshes, {} lights", figure.meshes, figure.lights);

    let seed = config
        .snow
        .seed
        .unwrap_or_else(|| (macroquad::miniquad::date::now() * 1000.0) as u64);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut snow = ParticleField::from_config(&mut scene, &mut rng, &config.snow);
    println!("Spawned {} snowflakes (seed {})", snow.len(), seed);

    let mut camera = SceneCamera::from_config(&config.camera);
    let mut orbit = OrbitControl::from_camera(&camera, &config.camera);
    let mut orbit_input = OrbitInput::default();

    let mut renderer = MacroquadRenderer::new(&config.render);
    let surface = MacroquadSurface;
    let mut viewport = ViewportController::new();
    viewport.handle_resize(&surface, &mut renderer, &mut camera);

    let mut frame_loop = FrameLoop::new(config.render.render_twice);

    loop {
        viewport.poll(&surface, &mut renderer, &mut camera);
        orbit_input.update(&mut orbit, &mut camera);

        frame_loop.tick(&mut renderer, &mut scene, &mut snow, &camera, get_frame_time());

        next_frame().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(&[]), Command::Run(None));
        assert_eq!(
            parse_command(&args(&["winter.ron"])),
            Command::Run(Some(PathBuf::from("winter.ron")))
        );
        assert_eq!(
            parse_command(&args(&["--write-config", "out.ron"])),
            Command::WriteConfig(PathBuf::from("out.ron"))
        );
    }

    #[test]
    fn test_write_default_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scene.ron");

        assert_eq!(write_default_config(&path), 0);
        assert_eq!(config::load_config(&path).unwrap(), SceneConfig::default());
        assert_eq!(write_default_config(&dir.path().join("missing/scene.ron")), 1);
    }
}
