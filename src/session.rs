//! Per-session state handed to the render loop.

use crate::animation::{apply_spin, apply_timeline};
use crate::camera::Camera;
use crate::config::{AnimationConfig, GeoglowConfig, PostProcessConfig};
use crate::input::Input;
use crate::orbit_controls::OrbitControls;
use crate::panel::TuningPanel;
use crate::scene::{AnimatedHandles, SceneGraph, SceneKind, assemble};
use crate::viewport::{Viewport, handle_resize};

/// Everything one running demo mutates between frames.
///
/// Created once before the first frame; the render loop borrows it mutably
/// for each iteration.
#[derive(Debug)]
pub struct Session {
    pub viewport: Viewport,
    pub camera: Camera,
    pub controls: OrbitControls,
    pub scene: SceneGraph,
    pub handles: AnimatedHandles,
    pub animation: AnimationConfig,
    /// Present only for demos that render through the post chain.
    pub post: Option<PostProcessConfig>,
    /// Tunes `post`; present whenever `post` is.
    pub panel: Option<TuningPanel>,
    pub input: Input,
}

impl Session {
    pub fn new(kind: SceneKind, config: &GeoglowConfig, post: bool, viewport: Viewport) -> Self {
        let assembly = assemble(kind, config);
        let aspect = if viewport.is_empty() {
            1.0
        } else {
            viewport.aspect()
        };

        let post = post.then(|| config.post_process.clone());
        let panel = post
            .as_ref()
            .map(|p| TuningPanel::new(&p.color_grade, p.enabled));

        Self {
            viewport,
            camera: Camera::from_config(&config.camera, aspect),
            controls: OrbitControls::new(&config.controls),
            scene: assembly.scene,
            handles: assembly.handles,
            animation: config.animation.clone(),
            post,
            panel,
            input: Input::new(),
        }
    }

    /// Post config to render with this frame, `None` to draw directly.
    pub fn active_post(&self) -> Option<&PostProcessConfig> {
        self.post.as_ref().filter(|p| p.enabled)
    }

    /// Consumes this frame's input: panel keys, then orbit drag and zoom,
    /// then one damped controls step. Returns true if the camera moved.
    pub fn update_controls(&mut self) -> bool {
        if let (Some(panel), Some(post)) = (&mut self.panel, &mut self.post) {
            let change = panel.handle_input(&self.input);
            if change.params {
                panel.apply(&mut post.color_grade);
            }
            if change.post_toggled {
                post.enabled = panel.post_enabled;
            }
        }

        self.controls
            .handle_input(&self.input, self.viewport.height as f32);
        self.controls.update(&mut self.camera)
    }

    /// Spin and timeline for one frame at `elapsed` seconds.
    pub fn animate(&mut self, elapsed: f32) {
        apply_spin(&mut self.scene, &self.handles, &self.animation);
        apply_timeline(&mut self.scene, &self.handles, elapsed, &self.animation);
    }

    /// Camera side of a resize. See [`handle_resize`].
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        handle_resize(&mut self.viewport, &mut self.camera, viewport)
    }

    /// Clears per-frame input once a frame has consumed it.
    pub fn end_frame(&mut self) {
        self.input.begin_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    fn viewport() -> Viewport {
        Viewport::new(800, 600, 1.0, 2.0)
    }

    #[test]
    fn post_is_only_present_for_post_demos() {
        let config = GeoglowConfig::default();
        let direct = Session::new(SceneKind::Flight, &config, false, viewport());
        assert!(direct.active_post().is_none());
        assert!(direct.panel.is_none());

        let post = Session::new(SceneKind::Flight, &config, true, viewport());
        assert!(post.active_post().is_some());
        assert!(post.panel.is_some());
    }

    #[test]
    fn panel_keys_reach_the_color_grade() {
        let mut session = Session::new(SceneKind::Flight, &GeoglowConfig::default(), true, viewport());

        session.input.press_key(KeyCode::Equal);
        session.update_controls();
        session.end_frame();

        let brightness = session.post.as_ref().map(|p| p.color_grade.brightness);
        assert!(brightness.is_some_and(|b| (b - 1.05).abs() < 1e-6));

        session.input.release_key(KeyCode::Equal);
        session.input.press_key(KeyCode::KeyP);
        session.update_controls();
        assert!(session.active_post().is_none());
    }

    #[test]
    fn camera_starts_with_viewport_aspect() {
        let session = Session::new(SceneKind::Plane, &GeoglowConfig::default(), false, viewport());
        assert_eq!(session.camera.aspect(), 800.0 / 600.0);
    }
}
