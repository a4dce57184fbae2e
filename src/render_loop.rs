//! The animated render loop.
//!
//! The loop never sleeps or spins on its own. Each [`RenderLoop::tick`] does
//! one frame of work and then asks the injected [`FrameScheduler`] for the
//! next callback; under winit that is `Window::request_redraw`, in tests it
//! is a counter.
//!
//! Frame order:
//!
//! 1. controls (panel keys, orbit drag and zoom, one damped step)
//! 2. per-frame spin of the `earth` and `star` handles
//! 3. timeline: curve reveal and marker/curve fade from elapsed time
//! 4. render, directly or through the post chain
//! 5. request the next frame

use std::time::Instant;

use crate::camera::Camera;
use crate::config::PostProcessConfig;
use crate::error::Result;
use crate::scene::SceneGraph;
use crate::session::Session;
use crate::viewport::Viewport;

/// Requests the next loop iteration.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Source of wall-clock seconds. Only differences are used.
pub trait Clock {
    fn now(&self) -> f64;
}

/// [`Clock`] backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// What a renderer needs to draw one frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub scene: &'a SceneGraph,
    pub camera: &'a Camera,
    /// `None` renders straight to the screen.
    pub post: Option<&'a PostProcessConfig>,
    /// Seconds since the loop started.
    pub elapsed: f32,
}

/// Draws frames and follows viewport changes.
pub trait SceneRenderer {
    fn render(&mut self, frame: &Frame) -> Result<()>;

    /// Resizes every size-dependent resource. Called synchronously on each
    /// viewport change, before the next frame.
    fn resize(&mut self, viewport: &Viewport);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LoopState {
    Idle,
    Animating { started_at: f64, frames: u64 },
}

/// Result of one iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    pub elapsed: f32,
    pub rendered: bool,
}

/// Drives a [`Session`] one frame at a time.
pub struct RenderLoop<S, C> {
    scheduler: S,
    clock: C,
    state: LoopState,
}

impl<S: FrameScheduler, C: Clock> RenderLoop<S, C> {
    pub fn new(scheduler: S, clock: C) -> Self {
        Self {
            scheduler,
            clock,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Starts the clock and requests the first frame. No-op once animating.
    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            self.state = LoopState::Animating {
                started_at: self.clock.now(),
                frames: 0,
            };
            log::debug!("render loop started");
            self.scheduler.request_frame();
        }
    }

    /// Runs one frame.
    ///
    /// Render errors are logged and the loop keeps going; only fatal ones
    /// (the device ran out of memory) are returned, and then no further
    /// frame is requested.
    pub fn tick<R: SceneRenderer>(&mut self, session: &mut Session, renderer: &mut R) -> Result<Tick> {
        let (started_at, frames) = match self.state {
            LoopState::Animating { started_at, frames } => (started_at, frames),
            LoopState::Idle => {
                log::debug!("render loop started");
                (self.clock.now(), 0)
            }
        };
        let elapsed = (self.clock.now() - started_at) as f32;

        session.update_controls();
        session.animate(elapsed);

        let frame = Frame {
            scene: &session.scene,
            camera: &session.camera,
            post: session.active_post(),
            elapsed,
        };
        let rendered = match renderer.render(&frame) {
            Ok(()) => true,
            Err(err) if err.is_fatal() => {
                log::error!("{err}; stopping");
                return Err(err);
            }
            Err(err) => {
                log::warn!("frame {frames} failed: {err}");
                false
            }
        };
        session.end_frame();

        self.state = LoopState::Animating {
            started_at,
            frames: frames + 1,
        };
        self.scheduler.request_frame();

        Ok(Tick { elapsed, rendered })
    }

    /// Applies a viewport change to the camera and the renderer at once.
    /// Zero-sized viewports are ignored.
    pub fn resize<R: SceneRenderer>(&mut self, session: &mut Session, renderer: &mut R, viewport: Viewport) {
        if session.resize(viewport) {
            renderer.resize(&viewport);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::config::GeoglowConfig;
    use crate::error::Error;
    use crate::scene::{Handle, SceneKind};

    #[derive(Default)]
    struct ManualScheduler {
        requests: usize,
    }

    impl FrameScheduler for ManualScheduler {
        fn request_frame(&mut self) {
            self.requests += 1;
        }
    }

    #[derive(Clone, Default)]
    struct ManualClock(Rc<Cell<f64>>);

    impl ManualClock {
        fn advance(&self, seconds: f64) {
            self.0.set(self.0.get() + seconds);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> f64 {
            self.0.get()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Recorded {
        elapsed: f32,
        post: bool,
        curve_range: Option<u32>,
        aspect: f32,
    }

    #[derive(Default)]
    struct RecordingRenderer {
        frames: Vec<Recorded>,
        resizes: Vec<(u32, u32)>,
        fail_with: Option<fn() -> Error>,
    }

    impl SceneRenderer for RecordingRenderer {
        fn render(&mut self, frame: &Frame) -> Result<()> {
            if let Some(make) = self.fail_with {
                return Err(make());
            }
            let curve_range = frame
                .scene
                .find("curve")
                .and_then(|id| frame.scene.node(id).renderable())
                .and_then(|r| r.draw_range);
            self.frames.push(Recorded {
                elapsed: frame.elapsed,
                post: frame.post.is_some(),
                curve_range,
                aspect: frame.camera.aspect(),
            });
            Ok(())
        }

        fn resize(&mut self, viewport: &Viewport) {
            self.resizes.push((viewport.width, viewport.height));
        }
    }

    fn setup(post: bool) -> (RenderLoop<ManualScheduler, ManualClock>, ManualClock, Session) {
        let clock = ManualClock::default();
        let render_loop = RenderLoop::new(ManualScheduler::default(), clock.clone());
        let session = Session::new(
            SceneKind::Flight,
            &GeoglowConfig::default(),
            post,
            Viewport::new(800, 600, 1.0, 2.0),
        );
        (render_loop, clock, session)
    }

    #[test]
    fn idle_until_first_tick_then_animating() {
        let (mut render_loop, _clock, mut session) = setup(false);
        let mut renderer = RecordingRenderer::default();
        assert_eq!(render_loop.state(), LoopState::Idle);

        render_loop.tick(&mut session, &mut renderer).unwrap();
        assert!(matches!(
            render_loop.state(),
            LoopState::Animating { frames: 1, .. }
        ));
    }

    #[test]
    fn every_tick_requests_the_next_frame() {
        let (mut render_loop, clock, mut session) = setup(false);
        let mut renderer = RecordingRenderer::default();
        render_loop.start();
        assert_eq!(render_loop.scheduler().requests, 1);

        for _ in 0..5 {
            clock.advance(1.0 / 60.0);
            render_loop.tick(&mut session, &mut renderer).unwrap();
        }
        assert_eq!(render_loop.scheduler().requests, 6);
        assert_eq!(renderer.frames.len(), 5);
    }

    #[test]
    fn elapsed_time_drives_the_reveal() {
        let (mut render_loop, clock, mut session) = setup(false);
        let mut renderer = RecordingRenderer::default();
        render_loop.start();

        clock.advance(0.5);
        let tick = render_loop.tick(&mut session, &mut renderer).unwrap();
        assert_eq!(tick.elapsed, 0.5);
        assert_eq!(renderer.frames[0].curve_range, Some(576));

        clock.advance(1.0);
        render_loop.tick(&mut session, &mut renderer).unwrap();
        assert_eq!(renderer.frames[1].curve_range, Some(960));
    }

    #[test]
    fn spin_is_per_frame_not_per_second() {
        let (mut render_loop, clock, mut session) = setup(false);
        let mut renderer = RecordingRenderer::default();
        let earth = session.handles.first(Handle::Earth).unwrap();

        for _ in 0..10 {
            clock.advance(1.0);
            render_loop.tick(&mut session, &mut renderer).unwrap();
        }
        let spin = session.animation.earth_spin[1];
        let rotation = session.scene.node(earth).transform.rotation;
        assert!((rotation.y - 10.0 * spin).abs() < 1e-6);
    }

    #[test]
    fn render_errors_are_logged_and_the_loop_continues() {
        let (mut render_loop, _clock, mut session) = setup(false);
        let mut renderer = RecordingRenderer {
            fail_with: Some(|| Error::EnvironmentMap("broken".to_string())),
            ..Default::default()
        };

        let tick = render_loop.tick(&mut session, &mut renderer).unwrap();
        assert!(!tick.rendered);
        assert_eq!(render_loop.scheduler().requests, 1);
    }

    #[test]
    fn out_of_memory_stops_the_loop() {
        let (mut render_loop, _clock, mut session) = setup(false);
        let mut renderer = RecordingRenderer {
            fail_with: Some(|| Error::Surface(wgpu::SurfaceError::OutOfMemory)),
            ..Default::default()
        };

        assert!(render_loop.tick(&mut session, &mut renderer).is_err());
        assert_eq!(render_loop.scheduler().requests, 0);
    }

    #[test]
    fn resize_reaches_camera_and_renderer_before_the_next_frame() {
        let (mut render_loop, _clock, mut session) = setup(true);
        let mut renderer = RecordingRenderer::default();

        render_loop.resize(&mut session, &mut renderer, Viewport::new(1920, 1080, 1.0, 2.0));
        render_loop.resize(&mut session, &mut renderer, Viewport::new(0, 0, 1.0, 2.0));
        render_loop.tick(&mut session, &mut renderer).unwrap();

        assert_eq!(renderer.resizes, [(1920, 1080)]);
        assert_eq!(renderer.frames[0].aspect, 1920.0 / 1080.0);
        assert!(renderer.frames[0].post);
    }
}
