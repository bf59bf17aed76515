//! Scene configuration
//!
//! Uses RON (Rusty Object Notation) for a human-readable config file.
//! Every field has a default, so a config file only needs the values it
//! overrides. Files are validated after parsing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use crate::geometry::palette;

/// Default config location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "assets/scene.ron";

/// Validation limits for config values
pub mod limits {
    /// Maximum number of snowflakes in the field
    pub const MAX_SNOWFLAKES: usize = 100_000;
    /// Maximum coordinate magnitude
    pub const MAX_COORD: f32 = 1_000_000.0;
    /// Maximum window dimension in pixels
    pub const MAX_WINDOW_DIM: i32 = 16_384;
}

/// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    ValidationError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            ConfigError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Complete scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub snow: SnowConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: i32,
    pub height: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Snowglobe".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Particle field parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowConfig {
    /// Number of snowflakes (fixed for the process lifetime)
    pub count: usize,
    /// Spawn bounds, half-open [min, max)
    pub x_range: [f32; 2],
    pub y_range: [f32; 2],
    pub z_range: [f32; 2],
    /// Distance units per second
    pub fall_speed: f32,
    /// A flake that falls below this height is reset
    pub floor: f32,
    /// Height a reset flake restarts from
    pub ceiling: f32,
    pub flake_radius: f32,
    /// Palette name, see `geometry::palette::named`
    pub flake_color: String,
    /// Fixed RNG seed; None seeds from the clock
    pub seed: Option<u64>,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            x_range: [-5.0, 5.0],
            y_range: [5.0, 10.0],
            z_range: [-5.0, 5.0],
            fall_speed: 1.0,
            floor: -1.0,
            ceiling: 5.0,
            flake_radius: 0.01,
            flake_color: "White".to_string(),
            seed: None,
        }
    }
}

/// Camera and orbit control parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees
    pub fovy_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Radians per pixel of mouse drag
    pub orbit_rotate_speed: f32,
    /// Fraction of distance per wheel step
    pub orbit_zoom_speed: f32,
    pub orbit_min_distance: f32,
    pub orbit_max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, -1.0, 5.0],
            target: [0.0, 0.0, 0.0],
            fovy_degrees: 30.0,
            near: 0.01,
            far: 1000.0,
            orbit_rotate_speed: 0.005,
            orbit_zoom_speed: 0.1,
            orbit_min_distance: 1.0,
            orbit_max_distance: 50.0,
        }
    }
}

/// Frame rendering parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// RGB, 0.0-1.0
    pub clear_color: [f32; 3],
    /// Render both before and after advancing the snow
    pub render_twice: bool,
    pub show_axes: bool,
    pub axes_size: f32,
    /// Overlay text drawn in the top-left corner
    pub banner: Option<String>,
    pub banner_font_size: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.2],
            render_twice: true,
            show_axes: true,
            axes_size: 0.5,
            banner: Some("Merry Christmas".to_string()),
            banner_font_size: 24.0,
        }
    }
}

/// Check if a float is valid (not NaN or Inf, within coordinate limits)
fn is_valid_float(f: f32) -> bool {
    f.is_finite() && f.abs() <= limits::MAX_COORD
}

fn validate_range(range: [f32; 2], context: &str) -> Result<(), String> {
    if !is_valid_float(range[0]) || !is_valid_float(range[1]) {
        return Err(format!("{}: invalid bounds {:?}", context, range));
    }
    if range[0] >= range[1] {
        return Err(format!("{}: min {} must be below max {}", context, range[0], range[1]));
    }
    Ok(())
}

fn validate_vec3(v: [f32; 3], context: &str) -> Result<(), String> {
    if v.iter().all(|c| is_valid_float(*c)) {
        Ok(())
    } else {
        Err(format!("{}: invalid coordinates {:?}", context, v))
    }
}

fn validate_positive(value: f32, context: &str) -> Result<(), String> {
    if is_valid_float(value) && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{}: must be positive, got {}", context, value))
    }
}

impl SceneConfig {
    /// Check all values, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_inner().map_err(ConfigError::ValidationError)
    }

    fn validate_inner(&self) -> Result<(), String> {
        let window = &self.window;
        if window.width <= 0 || window.height <= 0
            || window.width > limits::MAX_WINDOW_DIM || window.height > limits::MAX_WINDOW_DIM
        {
            return Err(format!("window: invalid size {}x{}", window.width, window.height));
        }

        let snow = &self.snow;
        if snow.count > limits::MAX_SNOWFLAKES {
            return Err(format!("snow: too many flakes ({} > {})", snow.count, limits::MAX_SNOWFLAKES));
        }
        validate_range(snow.x_range, "snow.x_range")?;
        validate_range(snow.y_range, "snow.y_range")?;
        validate_range(snow.z_range, "snow.z_range")?;
        if !is_valid_float(snow.fall_speed) || snow.fall_speed < 0.0 {
            return Err(format!("snow.fall_speed: invalid value {}", snow.fall_speed));
        }
        validate_range([snow.floor, snow.ceiling], "snow floor/ceiling")?;
        validate_positive(snow.flake_radius, "snow.flake_radius")?;
        if palette::named(&snow.flake_color).is_none() {
            return Err(format!("snow.flake_color: unknown colour {:?}", snow.flake_color));
        }

        let camera = &self.camera;
        validate_vec3(camera.position, "camera.position")?;
        validate_vec3(camera.target, "camera.target")?;
        if !(camera.fovy_degrees > 0.0 && camera.fovy_degrees < 180.0) {
            return Err(format!("camera.fovy_degrees: out of range ({})", camera.fovy_degrees));
        }
        validate_positive(camera.near, "camera.near")?;
        validate_range([camera.near, camera.far], "camera near/far")?;
        validate_positive(camera.orbit_rotate_speed, "camera.orbit_rotate_speed")?;
        validate_positive(camera.orbit_zoom_speed, "camera.orbit_zoom_speed")?;
        validate_positive(camera.orbit_min_distance, "camera.orbit_min_distance")?;
        validate_range([camera.orbit_min_distance, camera.orbit_max_distance], "camera orbit distance")?;

        let render = &self.render;
        if !render.clear_color.iter().all(|c| (0.0..=1.0).contains(c)) {
            return Err(format!("render.clear_color: channels must be 0.0-1.0, got {:?}", render.clear_color));
        }
        validate_positive(render.axes_size, "render.axes_size")?;
        validate_positive(render.banner_font_size, "render.banner_font_size")?;

        Ok(())
    }
}

/// Parse and validate a config from a RON string
pub fn load_config_from_str(contents: &str) -> Result<SceneConfig, ConfigError> {
    let config: SceneConfig = ron::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a config file
pub fn load_config(path: &Path) -> Result<SceneConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Save a config to a RON file
pub fn save_config(config: &SceneConfig, path: &Path) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("    ".to_string());
    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Resolve the startup config: an explicit path, then the default path, then built-in defaults.
/// Load failures are reported and fall back to the defaults.
pub fn startup_config(explicit: Option<&Path>) -> SceneConfig {
    let path = match explicit {
        Some(path) => path,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if !default_path.exists() {
                println!("No scene config found, using defaults");
                return SceneConfig::default();
            }
            default_path
        }
    };

    match load_config(path) {
        Ok(config) => {
            println!("Loaded scene config from {}", path.display());
            config
        }
        Err(e) => {
            eprintln!("Failed to load scene config {}: {}, using defaults", path.display(), e);
            SceneConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_defaults_are_valid() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn test_save_and_load_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.ron");

        let mut config = SceneConfig::default();
        config.snow.count = 250;
        config.snow.seed = Some(42);
        config.render.banner = None;

        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = load_config_from_str("(snow: (count: 10, seed: Some(7)))").unwrap();

        assert_eq!(config.snow.count, 10);
        assert_eq!(config.snow.seed, Some(7));
        assert_eq!(config.snow.ceiling, 5.0);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn test_load_invalid_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "not valid ron data").unwrap();

        let result = load_config(temp_file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = load_config(&dir.path().join("missing.ron"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_rejects_inverted_floor_and_ceiling() {
        let result = load_config_from_str("(snow: (floor: 5.0, ceiling: -1.0))");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = SceneConfig::default();
        config.snow.count = limits::MAX_SNOWFLAKES + 1;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.snow.x_range = [1.0, 1.0];
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.window.height = 0;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.camera.position = [f32::NAN, 0.0, 0.0];
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.render.clear_color = [0.0, 0.0, 2.0];
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.snow.flake_color = "Chartreuse".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_flake_color_by_name() {
        let config = load_config_from_str("(snow: (flake_color: \"red\"))").unwrap();
        assert_eq!(config.snow.flake_color, "red");
        assert_eq!(SceneConfig::default().snow.flake_color, "White");
    }

    #[test]
    fn test_default_banner() {
        let config = SceneConfig::default();
        assert_eq!(config.render.banner.as_deref(), Some("Merry Christmas"));
    }

    #[test]
    fn test_startup_config_falls_back_on_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "(snow: (count: 0, fall_speed: -3.0))").unwrap();

        let config = startup_config(Some(temp_file.path()));
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let contents = include_str!("../assets/scene.ron");
        assert!(load_config_from_str(contents).is_ok());
    }
}
