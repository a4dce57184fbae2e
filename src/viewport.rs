//! Viewport size, pixel ratio and the camera side of a resize.

use crate::camera::Camera;

/// The drawable area in physical pixels plus the display scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
    /// Cap applied to `scale_factor` when sizing off-screen targets.
    pub max_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale_factor: f64, max_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            scale_factor,
            max_pixel_ratio,
        }
    }

    /// A minimized window reports a zero dimension.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Effective device pixel ratio: `min(scale_factor, max_pixel_ratio)`.
    pub fn pixel_ratio(&self) -> f64 {
        self.scale_factor.min(self.max_pixel_ratio)
    }

    /// Size of off-screen render targets. Equal to the window size unless
    /// the display scale exceeds the pixel ratio cap.
    ///
    /// ```
    /// use geoglow::Viewport;
    ///
    /// // 3x display, capped at 2x
    /// let viewport = Viewport::new(1500, 900, 3.0, 2.0);
    /// assert_eq!(viewport.render_size(), (1000, 600));
    /// ```
    pub fn render_size(&self) -> (u32, u32) {
        let k = if self.scale_factor > 0.0 {
            self.pixel_ratio() / self.scale_factor
        } else {
            1.0
        };
        let scale = |v: u32| ((v as f64 * k).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

/// Applies `next` to the camera: aspect recomputed, projection reapplied.
///
/// Zero-sized viewports are ignored and leave both `current` and the camera
/// untouched. Returns true if the resize was applied.
pub fn handle_resize(current: &mut Viewport, camera: &mut Camera, next: Viewport) -> bool {
    if next.is_empty() {
        log::debug!("ignoring zero-sized viewport {}x{}", next.width, next.height);
        return false;
    }

    *current = next;
    camera.set_aspect(next.width as f32 / next.height as f32);
    camera.update_projection_matrix();
    log::debug!(
        "viewport {}x{} (pixel ratio {})",
        next.width,
        next.height,
        next.pixel_ratio()
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(75.0, 1.0, 0.1, 100.0)
    }

    #[test]
    fn resize_sets_exact_aspect() {
        let mut viewport = Viewport::new(800, 600, 1.0, 2.0);
        let mut camera = camera();
        for (w, h) in [(1920, 1080), (333, 777), (1, 4096)] {
            assert!(handle_resize(
                &mut viewport,
                &mut camera,
                Viewport::new(w, h, 1.0, 2.0)
            ));
            assert_eq!(camera.aspect(), w as f32 / h as f32);
            assert_eq!((viewport.width, viewport.height), (w, h));
        }
    }

    #[test]
    fn resize_refreshes_the_cached_projection() {
        let mut viewport = Viewport::new(800, 800, 1.0, 2.0);
        let mut camera = camera();
        let before = camera.projection_matrix();
        handle_resize(&mut viewport, &mut camera, Viewport::new(1600, 800, 1.0, 2.0));
        let after = camera.projection_matrix();
        assert_ne!(before, after);
        assert!((before.x_axis.x / after.x_axis.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn zero_size_is_ignored() {
        let mut viewport = Viewport::new(800, 600, 1.0, 2.0);
        let mut camera = Camera::new(75.0, viewport.aspect(), 0.1, 100.0);
        assert!(!handle_resize(
            &mut viewport,
            &mut camera,
            Viewport::new(0, 600, 1.0, 2.0)
        ));
        assert_eq!(viewport.width, 800);
        assert_eq!(camera.aspect(), 800.0 / 600.0);
    }

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(Viewport::new(10, 10, 1.5, 2.0).pixel_ratio(), 1.5);
        assert_eq!(Viewport::new(10, 10, 3.0, 2.0).pixel_ratio(), 2.0);
        assert_eq!(Viewport::new(800, 600, 1.5, 2.0).render_size(), (800, 600));
    }
}
