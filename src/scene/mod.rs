//! Scene graph, animated handles, and per-demo assembly.
//!
//! ```
//! use geoglow::scene::{assemble, Handle, SceneKind};
//! use geoglow::GeoglowConfig;
//!
//! let assembly = assemble(SceneKind::Flight, &GeoglowConfig::default());
//! let earth = assembly.handles.first(Handle::Earth).unwrap();
//! assert!(assembly.scene.is_reachable(earth));
//! ```

mod assemble;
mod graph;
mod handles;

pub use assemble::{
    ATMOSPHERE_RADIUS, Assembly, CURVE_RADIAL_SEGMENTS, CURVE_TUBULAR_SEGMENTS, EARTH_RADIUS,
    STAR_COUNT, STAR_SPREAD, SceneKind, assemble,
};
pub use graph::{Light, Node, NodeId, Payload, PointsRenderable, Renderable, SceneGraph};
pub use handles::{AnimatedHandles, Handle};
