//! # geoglow
//!
//! **A progressive wgpu scene: a lit earth, a starfield, a geo-located
//! flight curve that reveals and fades, and a post-processing chain.**
//!
//! ## Quick Start
//!
//! ```no_run
//! use geoglow::{Demo, GeoglowConfig};
//!
//! fn main() -> geoglow::Result<()> {
//!     geoglow::init_logging(Default::default());
//!     geoglow::run(Demo::PostFx, GeoglowConfig::default())
//! }
//! ```
//!
//! ## Demos
//!
//! Each demo adds to the one before:
//!
//! | Demo | Adds |
//! |------|------|
//! | `plane` | a green unit plane and orbit controls |
//! | `earth` | lights, a textured globe and an additive atmosphere shell |
//! | `stars` | a deterministic starfield spinning on its own |
//! | `flight` | route markers and a flight curve revealed over time, then faded |
//! | `post-fx` | film grain, bloom, FXAA, gamma and a tunable color grade |
//! | `raw-shader` | two hand-compiled shader stages and one draw, no scene |
//!
//! ## Placing things on the globe
//!
//! ```
//! use geoglow::{GeoPoint, lat_lon_to_position};
//!
//! let seoul = lat_lon_to_position(GeoPoint::new(37.5665, 126.978), 1.3);
//! assert!((seoul.length() - 1.3).abs() < 1e-5);
//! ```
//!
//! ## Driving frames yourself
//!
//! [`RenderLoop`] takes any [`FrameScheduler`] and [`Clock`], and draws
//! through any [`SceneRenderer`], so a loop can run without a window.
//!
//! ## Controls
//!
//! - Left drag orbits, scroll zooms
//! - `=` / `-` brightness, arrow keys color offset, `P` toggles post (post-fx)

mod animation;
mod app;
mod camera;
mod config;
mod error;
mod geo;
mod geometry;
mod gpu;
mod input;
mod logging;
mod material;
mod mesh;
mod mesh_pass;
mod orbit_controls;
mod panel;
mod post_process;
mod raw_shader;
mod render_loop;
mod renderer;
pub mod scene;
mod session;
mod texture;
mod viewport;

pub use animation::{apply_spin, apply_timeline, fade_opacity, reveal_count, reveal_fraction};
pub use app::{Demo, run};
pub use camera::Camera;
pub use config::{
    AnimationConfig, AssetConfig, BloomConfig, CameraConfig, ColorGradeConfig, ControlsConfig,
    FilmGrainConfig, GeoglowConfig, PostProcessConfig, RouteConfig, ToggleConfig, WindowConfig,
    load_from_path, validate,
};
pub use error::{ConfigError, Error, Result};
pub use geo::{CubicBezier, GeoPoint, flight_curve, lat_lon_to_position};
pub use geometry::{Geometry, PointCloud, plane, sphere, star_field, torus, tube};
pub use gpu::{GpuContext, SurfaceErrorAction};
pub use input::Input;
pub use logging::{LoggingConfig, init_logging};
pub use material::{Blending, Material, PointsMaterial, Shading, Side, hex};
pub use mesh::{Mesh, Transform, Vertex3d};
pub use mesh_pass::{DrawItem, DrawKind, DrawList, MeshPass, PipelineKey};
pub use orbit_controls::OrbitControls;
pub use panel::{PanelChange, TuningPanel};
pub use post_process::{
    DepthTarget, EffectPass, PassChain, PassKind, PassUniforms, PostProcessPipeline, RenderTarget,
    Slot, Stage, StageKind,
};
pub use raw_shader::RawShaderDemo;
pub use render_loop::{
    Clock, Frame, FrameScheduler, LoopState, RenderLoop, SceneRenderer, SystemClock, Tick,
};
pub use renderer::GpuRenderer;
pub use scene::{AnimatedHandles, Assembly, Handle, NodeId, SceneGraph, SceneKind, assemble};
pub use session::Session;
pub use texture::{CubeFaces, Texture, TextureData};
pub use viewport::{Viewport, handle_resize};

pub use glam::{Mat4, Quat, Vec2, Vec3};

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
