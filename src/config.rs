//! TOML configuration.
//!
//! Every tunable constant of the demos lives here with its default. All
//! sections use `#[serde(default)]`, so a partial file overrides only what
//! it names:
//!
//! ```toml
//! [animation]
//! reveal_speed = 4.0
//! clamp_opacity = false
//!
//! [post_process.bloom]
//! strength = 1.2
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geo::GeoPoint;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoglowConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub animation: AnimationConfig,
    pub post_process: PostProcessConfig,
    pub assets: AssetConfig,
    pub route: RouteConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Overrides the demo's own window title.
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Upper bound applied to the display scale factor.
    pub max_pixel_ratio: f64,
    /// RGBA clear color. Alpha 0 keeps the canvas transparent.
    pub clear_color: [f64; 4],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: None,
            width: 1280,
            height: 720,
            max_pixel_ratio: 2.0,
            clear_color: [0.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Perspective projection parameters, fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 100.0,
            position: [0.0, 0.0, 3.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    /// Fraction of the remaining rotation applied each frame.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.1,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 1.2,
            max_distance: 50.0,
        }
    }
}

/// Per-frame animation constants.
///
/// Spin values are radians added every frame, not scaled by frame time, so
/// apparent speed follows the display refresh rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Seconds the reveal progress takes to reach 1.0.
    pub reveal_duration: f32,
    /// Multiplier applied to progress when computing the draw range.
    pub reveal_speed: f32,
    /// Seconds after loop start when markers and curve begin to fade.
    pub fade_start_time: f32,
    /// Seconds the fade takes to go from opaque to invisible.
    pub fade_duration: f32,
    /// Clamp faded opacity at zero instead of letting it go negative.
    pub clamp_opacity: bool,
    /// Per-frame (x, y) rotation increment of the earth group.
    pub earth_spin: [f32; 2],
    /// Per-frame (x, y) rotation increment of the starfield.
    pub star_spin: [f32; 2],
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            reveal_duration: 2.5,
            reveal_speed: 3.0,
            fade_start_time: 4.0,
            fade_duration: 1.0,
            clamp_opacity: true,
            earth_spin: [0.0005, 0.0005],
            star_spin: [0.001, 0.001],
        }
    }
}

/// Post-processing chain configuration. Pass order is fixed; these only
/// toggle and parameterize passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessConfig {
    pub enabled: bool,
    pub film_grain: FilmGrainConfig,
    pub bloom: BloomConfig,
    pub anti_alias: ToggleConfig,
    pub gamma_correct: ToggleConfig,
    pub color_grade: ColorGradeConfig,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            film_grain: FilmGrainConfig::default(),
            bloom: BloomConfig::default(),
            anti_alias: ToggleConfig { enabled: true },
            gamma_correct: ToggleConfig { enabled: true },
            color_grade: ColorGradeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleConfig {
    pub enabled: bool,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilmGrainConfig {
    pub enabled: bool,
    pub noise_intensity: f32,
    pub scanline_intensity: f32,
    pub scanline_count: f32,
    pub grayscale: bool,
}

impl Default for FilmGrainConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            noise_intensity: 1.0,
            scanline_intensity: 0.4,
            scanline_count: 1024.0,
            grayscale: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    pub enabled: bool,
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 1.0,
            radius: 0.5,
            threshold: 0.2,
        }
    }
}

/// The custom color-grade pass. Brightness and offset are live-tunable
/// from the parameter panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorGradeConfig {
    pub enabled: bool,
    pub brightness: f32,
    pub offset: [f32; 2],
}

impl Default for ColorGradeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            brightness: 1.0,
            offset: [0.0, 0.0],
        }
    }
}

/// Asset paths. Missing files are reported and replaced by flat colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub earth_texture: Option<PathBuf>,
    pub star_sprite: Option<PathBuf>,
    /// Cube faces in +X, -X, +Y, -Y, +Z, -Z order.
    pub environment: Option<Vec<PathBuf>>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            earth_texture: Some(PathBuf::from("assets/earth-night.jpg")),
            star_sprite: Some(PathBuf::from("assets/particle.png")),
            environment: None,
        }
    }
}

/// Endpoints of the animated flight curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub from: GeoPoint,
    pub to: GeoPoint,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            // Seoul
            from: GeoPoint::new(37.5665, 126.978),
            // Guam
            to: GeoPoint::new(13.4443, 144.7937),
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_from_path(path: &Path) -> Result<GeoglowConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: GeoglowConfig = toml::from_str(&content)?;
    validate(&config)?;

    log::info!("loaded config from {}", path.display());
    Ok(config)
}

/// Reject values that would produce NaNs or a degenerate projection.
pub fn validate(config: &GeoglowConfig) -> Result<(), ConfigError> {
    let camera = &config.camera;
    if !(camera.fov > 0.0 && camera.fov < 180.0) {
        return Err(ConfigError::Invalid(format!(
            "camera.fov must be in (0, 180), got {}",
            camera.fov
        )));
    }
    if !(camera.near > 0.0 && camera.near < camera.far) {
        return Err(ConfigError::Invalid(format!(
            "camera.near must be positive and below camera.far ({} / {})",
            camera.near, camera.far
        )));
    }

    let controls = &config.controls;
    if !(controls.damping_factor > 0.0 && controls.damping_factor <= 1.0) {
        return Err(ConfigError::Invalid(format!(
            "controls.damping_factor must be in (0, 1], got {}",
            controls.damping_factor
        )));
    }
    if controls.min_distance > controls.max_distance {
        return Err(ConfigError::Invalid(
            "controls.min_distance exceeds controls.max_distance".to_string(),
        ));
    }

    let animation = &config.animation;
    if animation.reveal_duration <= 0.0 || animation.fade_duration <= 0.0 {
        return Err(ConfigError::Invalid(
            "animation durations must be positive".to_string(),
        ));
    }

    if config.window.max_pixel_ratio < 1.0 {
        return Err(ConfigError::Invalid(format!(
            "window.max_pixel_ratio must be at least 1, got {}",
            config.window.max_pixel_ratio
        )));
    }

    if let Some(faces) = &config.assets.environment
        && faces.len() != 6
    {
        return Err(ConfigError::Invalid(format!(
            "assets.environment needs 6 faces, got {}",
            faces.len()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_hoist_demo_constants() {
        let config = GeoglowConfig::default();
        assert_eq!(config.controls.damping_factor, 0.1);
        assert_eq!(config.animation.reveal_duration, 2.5);
        assert_eq!(config.animation.reveal_speed, 3.0);
        assert_eq!(config.animation.fade_start_time, 4.0);
        assert_eq!(config.camera.fov, 75.0);
        assert_eq!(config.window.max_pixel_ratio, 2.0);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: GeoglowConfig = toml::from_str(
            r#"
            [animation]
            reveal_speed = 4.0

            [post_process.bloom]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.animation.reveal_speed, 4.0);
        assert_eq!(config.animation.reveal_duration, 2.5);
        assert!(!config.post_process.bloom.enabled);
        assert!(config.post_process.film_grain.enabled);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn rejects_bad_damping() {
        let mut config = GeoglowConfig::default();
        config.controls.damping_factor = 0.0;
        assert!(matches!(validate(&config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_inverted_clip_planes() {
        let mut config = GeoglowConfig::default();
        config.camera.near = 200.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_wrong_face_count() {
        let mut config = GeoglowConfig::default();
        config.assets.environment = Some(vec![PathBuf::from("px.png")]);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn load_from_missing_path() {
        let err = load_from_path(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[controls]\ndamping_factor = 0.25").unwrap();

        let config = load_from_path(file.path()).unwrap();
        assert_eq!(config.controls.damping_factor, 0.25);
    }

    #[test]
    fn load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[controls\ndamping_factor = ").unwrap();

        let err = load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
