//! Post-processing: base render, then film grain, bloom, FXAA, gamma
//! correction and color grade, each reading the previous stage's output.

mod chain;
mod pass;
mod pipeline;
mod target;

pub use chain::{PassChain, PassKind, PassUniforms, Slot, Stage, StageKind};
pub use pass::EffectPass;
pub use pipeline::PostProcessPipeline;
pub use target::{DepthTarget, RenderTarget};
