use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use winit::event::MouseButton;

use crate::camera::Camera;
use crate::config::ControlsConfig;
use crate::input::Input;

/// Keeps the polar angle off the exact poles where `look_at` degenerates.
const POLE_EPSILON: f32 = 1e-3;

/// Orbit controls with exponential damping.
///
/// Pointer drags accumulate a pending rotation in spherical coordinates
/// around the camera target. Each [`OrbitControls::update`] applies
/// `damping_factor` of the pending rotation and keeps the rest, scaled by
/// `1 - damping_factor`, for later frames. The camera keeps gliding after
/// the pointer is released and decelerates instead of stopping.
///
/// ```
/// use geoglow::{Camera, ControlsConfig, OrbitControls, Vec2, Vec3};
///
/// let mut camera = Camera::new(75.0, 1.0, 0.1, 100.0).at(Vec3::new(0.0, 0.0, 3.0));
/// let mut controls = OrbitControls::new(&ControlsConfig::default());
///
/// controls.rotate_by_pixels(Vec2::new(40.0, 0.0), 720.0);
/// controls.update(&mut camera);
/// assert!(camera.position.x != 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Pending (azimuth, polar) rotation in radians.
    delta: Vec2,
    /// Pending radius multiplier from zooming.
    scale: f32,
}

impl OrbitControls {
    pub fn new(config: &ControlsConfig) -> Self {
        Self {
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            delta: Vec2::ZERO,
            scale: 1.0,
        }
    }

    /// Rotation still waiting to be applied.
    pub fn remaining(&self) -> Vec2 {
        self.delta
    }

    /// Queues a drag of `pixels`; a drag across the full viewport height
    /// turns the camera one full revolution.
    pub fn rotate_by_pixels(&mut self, pixels: Vec2, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.delta.x -= TAU * pixels.x / height * self.rotate_speed;
        self.delta.y -= TAU * pixels.y / height * self.rotate_speed;
    }

    /// Queues a zoom; positive `lines` moves toward the target.
    pub fn zoom(&mut self, lines: f32) {
        let step = 0.95f32.powf(self.zoom_speed);
        self.scale *= step.powf(lines);
    }

    /// Consumes this frame's pointer input.
    pub fn handle_input(&mut self, input: &Input, viewport_height: f32) {
        if input.mouse_down(MouseButton::Left) {
            self.rotate_by_pixels(input.mouse_delta(), viewport_height);
        }

        let scroll = input.scroll_delta().y;
        if scroll != 0.0 {
            self.zoom(scroll);
        }
    }

    /// Moves the camera by the damped share of the pending rotation.
    ///
    /// Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let offset = camera.position - camera.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return false;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let step = if self.enable_damping {
            self.delta * self.damping_factor
        } else {
            self.delta
        };
        theta += step.x;
        phi = (phi + step.y).clamp(POLE_EPSILON, PI - POLE_EPSILON);

        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let sin_phi = phi.sin();
        let new_offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        let moved = (new_offset - offset).length_squared() > 1e-10;
        camera.position = camera.target + new_offset;

        if self.enable_damping {
            self.delta *= 1.0 - self.damping_factor;
        } else {
            self.delta = Vec2::ZERO;
        }
        self.scale = 1.0;

        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(75.0, 1.0, 0.1, 100.0).at(Vec3::new(0.0, 0.0, 3.0))
    }

    #[test]
    fn damping_decays_remaining_delta_geometrically() {
        let mut controls = OrbitControls::new(&ControlsConfig::default());
        let mut camera = camera();
        controls.rotate_by_pixels(Vec2::new(100.0, 30.0), 720.0);

        for _ in 0..20 {
            let before = controls.remaining();
            controls.update(&mut camera);
            assert_eq!(controls.remaining(), before * (1.0 - 0.1));
            assert!(controls.remaining().length() < before.length());
        }
    }

    #[test]
    fn motion_continues_after_input_stops() {
        let mut controls = OrbitControls::new(&ControlsConfig::default());
        let mut camera = camera();
        controls.rotate_by_pixels(Vec2::new(50.0, 0.0), 720.0);

        let mut steps = Vec::new();
        let mut last = camera.position;
        for _ in 0..5 {
            assert!(controls.update(&mut camera));
            steps.push((camera.position - last).length());
            last = camera.position;
        }
        assert!(steps.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn without_damping_delta_applies_at_once() {
        let config = ControlsConfig {
            enable_damping: false,
            ..Default::default()
        };
        let mut controls = OrbitControls::new(&config);
        let mut camera = camera();
        controls.rotate_by_pixels(Vec2::new(180.0, 0.0), 720.0);

        assert!(controls.update(&mut camera));
        assert_eq!(controls.remaining(), Vec2::ZERO);
        assert!(!controls.update(&mut camera));
        // A quarter-height drag is a quarter turn.
        assert!((camera.position - Vec3::new(-3.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn orbit_preserves_distance() {
        let mut controls = OrbitControls::new(&ControlsConfig::default());
        let mut camera = camera();
        controls.rotate_by_pixels(Vec2::new(300.0, -200.0), 720.0);
        for _ in 0..50 {
            controls.update(&mut camera);
        }
        assert!((camera.position.length() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_stays_off_the_pole() {
        let mut controls = OrbitControls::new(&ControlsConfig {
            enable_damping: false,
            ..Default::default()
        });
        let mut camera = camera();
        controls.rotate_by_pixels(Vec2::new(0.0, 5000.0), 720.0);
        controls.update(&mut camera);

        assert!(camera.position.is_finite());
        assert!(camera.position.y > 2.99);
        let p = camera.position;
        assert!(Vec2::new(p.x, p.z).length() > 0.0);
    }

    #[test]
    fn zoom_respects_distance_limits() {
        let mut controls = OrbitControls::new(&ControlsConfig::default());
        let mut camera = camera();
        controls.zoom(500.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 1.2).abs() < 1e-4);
    }
}
