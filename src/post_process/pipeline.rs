use crate::config::PostProcessConfig;
use crate::error::Result;
use crate::gpu::GpuContext;

use super::chain::{PassChain, PassKind, Slot, StageKind};
use super::pass::EffectPass;
use super::target::RenderTarget;

/// GPU executor for a [`PassChain`].
///
/// Owns the two ping-pong targets and one compiled [`EffectPass`] per
/// [`PassKind`], so toggling a pass only replans the chain.
///
/// ```text
/// Scene       -> Target A
/// Film Grain  A -> B
/// Bloom       B -> A
/// ...
/// Color Grade   -> Screen
/// ```
pub struct PostProcessPipeline {
    chain: PassChain,
    passes: Vec<EffectPass>,
    target_a: RenderTarget,
    target_b: RenderTarget,
}

impl PostProcessPipeline {
    /// Compiles every pass and allocates targets at the surface size.
    pub fn new(gpu: &GpuContext, config: &PostProcessConfig) -> Result<Self> {
        let (width, height) = (gpu.width(), gpu.height());
        let chain = PassChain::build(config, width, height);

        let passes = PassKind::ORDER
            .into_iter()
            .map(|kind| EffectPass::new(gpu, kind))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            chain,
            passes,
            target_a: RenderTarget::new(gpu, "Post Target A", width, height),
            target_b: RenderTarget::new(gpu, "Post Target B", width, height),
        })
    }

    pub fn chain(&self) -> &PassChain {
        &self.chain
    }

    pub fn set_config(&mut self, config: &PostProcessConfig) {
        self.chain.set_config(config);
    }

    /// Resizes the chain and both targets before the next frame.
    pub fn resize(&mut self, gpu: &GpuContext, width: u32, height: u32) {
        self.chain.resize(width, height);
        let (w, h) = self.chain.extent();
        let resized =
            self.target_a.ensure_size(gpu, w, h) | self.target_b.ensure_size(gpu, w, h);
        if resized {
            log::debug!("post targets resized to {w}x{h}");
        }
    }

    fn pass(&self, kind: PassKind) -> &EffectPass {
        // `passes` is built from ORDER, so the index always matches.
        &self.passes[kind as usize]
    }

    /// Records the whole chain. `render_scene` draws the base scene into the
    /// view it is given; every later stage reads the previous output.
    pub fn execute<F>(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        screen: &wgpu::TextureView,
        time: f32,
        render_scene: F,
    ) where
        F: FnOnce(&mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let view = |slot: Slot| match slot {
            Slot::TargetA => &self.target_a.view,
            Slot::TargetB => &self.target_b.view,
            Slot::Screen => screen,
        };

        let mut render_scene = Some(render_scene);
        for stage in self.chain.stages() {
            let output = view(stage.output);
            match (stage.kind, stage.input) {
                (StageKind::Scene, _) => {
                    if let Some(render) = render_scene.take() {
                        render(encoder, output);
                    }
                }
                (StageKind::Effect(kind), Some(input)) => {
                    let uniforms = self.chain.uniforms_for(kind, time);
                    self.pass(kind)
                        .render(gpu, encoder, &uniforms, view(input), output);
                }
                (StageKind::Effect(kind), None) => {
                    log::warn!("{} has no input; skipped", kind.label());
                }
            }
        }
    }
}
