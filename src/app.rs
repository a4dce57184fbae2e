//! winit host for the demos.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::{GeoglowConfig, WindowConfig};
use crate::error::{Error, Result};
use crate::gpu::GpuContext;
use crate::raw_shader::{self, RawShaderDemo};
use crate::render_loop::{FrameScheduler, RenderLoop, SystemClock};
use crate::renderer::GpuRenderer;
use crate::scene::SceneKind;
use crate::session::Session;
use crate::viewport::Viewport;

/// The progressive demos, in the order they build on each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Demo {
    Plane,
    Earth,
    Stars,
    Flight,
    /// The flight scene through the post-processing chain.
    PostFx,
    /// Two hand-compiled shader stages and a single draw.
    RawShader,
}

impl Demo {
    /// Scene to assemble; `None` for the raw shader demo.
    pub fn scene_kind(self) -> Option<SceneKind> {
        match self {
            Demo::Plane => Some(SceneKind::Plane),
            Demo::Earth => Some(SceneKind::Earth),
            Demo::Stars => Some(SceneKind::Stars),
            Demo::Flight | Demo::PostFx => Some(SceneKind::Flight),
            Demo::RawShader => None,
        }
    }

    pub fn post_processing(self) -> bool {
        self == Demo::PostFx
    }

    /// Window title, unless the config sets one.
    pub fn window_title(self, window: &WindowConfig) -> &str {
        window.title.as_deref().unwrap_or(self.title())
    }

    pub fn title(self) -> &'static str {
        match self {
            Demo::Plane => "geoglow: plane",
            Demo::Earth => "geoglow: earth",
            Demo::Stars => "geoglow: stars",
            Demo::Flight => "geoglow: flight",
            Demo::PostFx => "geoglow: post-fx",
            Demo::RawShader => "geoglow: raw shader",
        }
    }
}

/// Opens a window and runs `demo` until it is closed.
pub fn run(demo: Demo, config: GeoglowConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    // Frames are requested by the render loop itself.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = GeoglowApp::Pending { demo, config };
    event_loop.run_app(&mut app)?;

    match app {
        GeoglowApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

/// [`FrameScheduler`] that asks winit for another `RedrawRequested`.
struct WindowScheduler {
    window: Arc<Window>,
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) {
        self.window.request_redraw();
    }
}

enum GeoglowApp {
    Pending {
        demo: Demo,
        config: GeoglowConfig,
    },
    Scene {
        window: Arc<Window>,
        session: Box<Session>,
        renderer: GpuRenderer,
        render_loop: RenderLoop<WindowScheduler, SystemClock>,
    },
    Raw {
        window: Arc<Window>,
        gpu: GpuContext,
        demo: RawShaderDemo,
    },
    Failed(Error),
}

impl GeoglowApp {
    fn start(event_loop: &ActiveEventLoop, demo: Demo, config: &GeoglowConfig) -> Result<Self> {
        let Some(kind) = demo.scene_kind() else {
            let attrs = WindowAttributes::default()
                .with_title(demo.window_title(&config.window))
                .with_inner_size(LogicalSize::new(raw_shader::WINDOW_SIZE, raw_shader::WINDOW_SIZE))
                .with_resizable(false);
            let window = Arc::new(event_loop.create_window(attrs)?);
            let gpu = GpuContext::new(window.clone())?;
            let raw = RawShaderDemo::new(&gpu)?;
            window.request_redraw();
            return Ok(Self::Raw {
                window,
                gpu,
                demo: raw,
            });
        };

        let attrs = WindowAttributes::default()
            .with_title(demo.window_title(&config.window))
            .with_inner_size(LogicalSize::new(config.window.width, config.window.height))
            .with_transparent(config.window.clear_color[3] < 1.0);
        let window = Arc::new(event_loop.create_window(attrs)?);

        let size = window.inner_size();
        let viewport = Viewport::new(
            size.width,
            size.height,
            window.scale_factor(),
            config.window.max_pixel_ratio,
        );

        let session = Session::new(kind, config, demo.post_processing(), viewport);
        let renderer = GpuRenderer::new(
            window.clone(),
            &config.window,
            &viewport,
            session.post.as_ref(),
        )?;

        let mut render_loop = RenderLoop::new(
            WindowScheduler {
                window: window.clone(),
            },
            SystemClock::default(),
        );
        render_loop.start();
        log::info!("running {demo:?}");

        Ok(Self::Scene {
            window,
            session: Box::new(session),
            renderer,
            render_loop,
        })
    }
}

impl ApplicationHandler for GeoglowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let GeoglowApp::Pending { demo, config } = self else {
            return;
        };

        *self = match Self::start(event_loop, *demo, config) {
            Ok(app) => app,
            Err(err) => {
                log::error!("{err}");
                event_loop.exit();
                GeoglowApp::Failed(err)
            }
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let WindowEvent::CloseRequested = event {
            event_loop.exit();
            return;
        }

        match self {
            GeoglowApp::Scene {
                window,
                session,
                renderer,
                render_loop,
            } => {
                session.input.handle_event(&event);

                match event {
                    WindowEvent::Resized(size) => {
                        let viewport = Viewport::new(
                            size.width,
                            size.height,
                            window.scale_factor(),
                            session.viewport.max_pixel_ratio,
                        );
                        render_loop.resize(session, renderer, viewport);
                    }
                    WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                        let size = window.inner_size();
                        let viewport = Viewport::new(
                            size.width,
                            size.height,
                            scale_factor,
                            session.viewport.max_pixel_ratio,
                        );
                        render_loop.resize(session, renderer, viewport);
                    }
                    WindowEvent::RedrawRequested => {
                        if let Err(err) = render_loop.tick(session, renderer) {
                            event_loop.exit();
                            *self = GeoglowApp::Failed(err);
                        }
                    }
                    _ => {}
                }
            }
            GeoglowApp::Raw { gpu, demo, .. } => match event {
                WindowEvent::Resized(size) => gpu.resize(size.width, size.height),
                WindowEvent::RedrawRequested => {
                    if let Err(err) = demo.render(gpu) {
                        log::error!("{err}");
                        if err.is_fatal() {
                            event_loop.exit();
                            *self = GeoglowApp::Failed(err);
                        }
                    }
                }
                _ => {}
            },
            GeoglowApp::Pending { .. } | GeoglowApp::Failed(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[test]
    fn demos_parse_from_kebab_case() {
        assert_eq!(Demo::from_str("post-fx", false), Ok(Demo::PostFx));
        assert_eq!(Demo::from_str("raw-shader", false), Ok(Demo::RawShader));
        assert_eq!(Demo::from_str("plane", false), Ok(Demo::Plane));
    }

    #[test]
    fn only_post_fx_uses_the_chain() {
        for demo in Demo::value_variants() {
            assert_eq!(demo.post_processing(), *demo == Demo::PostFx);
        }
        assert_eq!(Demo::PostFx.scene_kind(), Demo::Flight.scene_kind());
        assert_eq!(Demo::RawShader.scene_kind(), None);
    }

    #[test]
    fn configured_title_overrides_the_demo_title() {
        let mut window = WindowConfig::default();
        assert_eq!(Demo::Earth.window_title(&window), "geoglow: earth");

        window.title = Some("night flight".to_string());
        assert_eq!(Demo::Earth.window_title(&window), "night flight");
    }
}
