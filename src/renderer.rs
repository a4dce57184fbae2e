//! wgpu-backed [`SceneRenderer`].

use std::sync::Arc;

use winit::window::Window;

use crate::config::{PostProcessConfig, WindowConfig};
use crate::error::Result;
use crate::gpu::GpuContext;
use crate::mesh_pass::{DrawList, MeshPass};
use crate::post_process::{DepthTarget, PostProcessPipeline};
use crate::render_loop::{Frame, SceneRenderer};
use crate::viewport::Viewport;

/// Draws scenes into a window surface, optionally through the post chain.
pub struct GpuRenderer {
    gpu: GpuContext,
    mesh_pass: MeshPass,
    depth: DepthTarget,
    post: Option<PostProcessPipeline>,
    clear: wgpu::Color,
}

impl GpuRenderer {
    /// Creates the surface and every pipeline up front, so shader errors are
    /// reported before the window shows its first frame.
    ///
    /// `post` compiles the chain; a renderer without one always draws
    /// directly.
    pub fn new(
        window: Arc<Window>,
        config: &WindowConfig,
        viewport: &Viewport,
        post: Option<&PostProcessConfig>,
    ) -> Result<Self> {
        let gpu = GpuContext::new(window)?;
        let mesh_pass = MeshPass::new(&gpu)?;
        let render_size = viewport.render_size();

        let post = match post {
            Some(config) => {
                let mut pipeline = PostProcessPipeline::new(&gpu, config)?;
                pipeline.resize(&gpu, render_size.0, render_size.1);
                Some(pipeline)
            }
            None => None,
        };

        let [r, g, b, a] = config.clear_color;
        Ok(Self {
            depth: DepthTarget::new(&gpu, gpu.width(), gpu.height()),
            gpu,
            mesh_pass,
            post,
            clear: wgpu::Color { r, g, b, a },
        })
    }
}

impl SceneRenderer for GpuRenderer {
    fn render(&mut self, frame: &Frame) -> Result<()> {
        let Self {
            gpu,
            mesh_pass,
            depth,
            post,
            clear,
            ..
        } = self;

        let Some(output) = gpu.acquire()? else {
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let chain = match (frame.post, post.as_mut()) {
            (Some(config), Some(pipeline)) => {
                pipeline.set_config(config);
                Some(&*pipeline)
            }
            (Some(_), None) => {
                log::debug!("post requested but no chain was compiled; drawing directly");
                None
            }
            (None, _) => None,
        };

        let draws = DrawList::collect(frame.scene);
        // The gamma pass encodes when the chain runs; otherwise the scene
        // shaders do, unless the surface does it in hardware.
        let encode_srgb = chain.is_none() && !gpu.format().is_srgb();
        mesh_pass.prepare(gpu, frame.scene, frame.camera, &draws, encode_srgb)?;

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        match chain {
            Some(pipeline) => {
                let (w, h) = pipeline.chain().scene_extent((gpu.width(), gpu.height()));
                depth.ensure_size(gpu, w, h);
                pipeline.execute(gpu, &mut encoder, &view, frame.elapsed, |encoder, target| {
                    mesh_pass.render(encoder, target, depth, *clear, &draws);
                });
            }
            None => {
                depth.ensure_size(gpu, gpu.width(), gpu.height());
                mesh_pass.render(&mut encoder, &view, depth, *clear, &draws);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn resize(&mut self, viewport: &Viewport) {
        self.gpu.resize(viewport.width, viewport.height);
        let screen = (self.gpu.width(), self.gpu.height());

        let (w, h) = match &mut self.post {
            Some(pipeline) => {
                let (w, h) = viewport.render_size();
                pipeline.resize(&self.gpu, w, h);
                pipeline.chain().scene_extent(screen)
            }
            None => screen,
        };
        self.depth.ensure_size(&self.gpu, w, h);
    }
}
