//! Keyboard-driven tuning panel for the color-grade pass.
//!
//! | Key        | Effect                      |
//! |------------|-----------------------------|
//! | `=` / `-`  | brightness up / down        |
//! | arrows     | nudge the 2D offset         |
//! | `P`        | toggle the post chain       |

use glam::Vec2;
use winit::keyboard::KeyCode;

use crate::config::ColorGradeConfig;
use crate::input::Input;

pub const BRIGHTNESS_RANGE: (f32, f32) = (0.0, 2.0);
pub const BRIGHTNESS_STEP: f32 = 0.05;
pub const OFFSET_RANGE: (f32, f32) = (-1.0, 1.0);
pub const OFFSET_STEP: f32 = 0.01;

/// Live values exposed for manual inspection.
#[derive(Clone, Debug, PartialEq)]
pub struct TuningPanel {
    pub brightness: f32,
    pub offset: Vec2,
    pub post_enabled: bool,
}

/// What a frame of input changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelChange {
    pub params: bool,
    pub post_toggled: bool,
}

impl TuningPanel {
    pub fn new(grade: &ColorGradeConfig, post_enabled: bool) -> Self {
        Self {
            brightness: grade.brightness,
            offset: Vec2::from(grade.offset),
            post_enabled,
        }
    }

    /// Applies this frame's key presses, clamped to slider ranges.
    pub fn handle_input(&mut self, input: &Input) -> PanelChange {
        let mut change = PanelChange::default();
        let before = (self.brightness, self.offset);

        if input.key_pressed(KeyCode::Equal) {
            self.brightness += BRIGHTNESS_STEP;
        }
        if input.key_pressed(KeyCode::Minus) {
            self.brightness -= BRIGHTNESS_STEP;
        }

        let mut nudge = Vec2::ZERO;
        if input.key_pressed(KeyCode::ArrowLeft) {
            nudge.x -= OFFSET_STEP;
        }
        if input.key_pressed(KeyCode::ArrowRight) {
            nudge.x += OFFSET_STEP;
        }
        if input.key_pressed(KeyCode::ArrowUp) {
            nudge.y += OFFSET_STEP;
        }
        if input.key_pressed(KeyCode::ArrowDown) {
            nudge.y -= OFFSET_STEP;
        }
        self.offset += nudge;

        self.brightness = self.brightness.clamp(BRIGHTNESS_RANGE.0, BRIGHTNESS_RANGE.1);
        self.offset = self
            .offset
            .clamp(Vec2::splat(OFFSET_RANGE.0), Vec2::splat(OFFSET_RANGE.1));

        if (self.brightness, self.offset) != before {
            change.params = true;
            log::info!(
                "color grade: brightness {:.2}, offset ({:.2}, {:.2})",
                self.brightness,
                self.offset.x,
                self.offset.y
            );
        }

        if input.key_pressed(KeyCode::KeyP) {
            self.post_enabled = !self.post_enabled;
            change.post_toggled = true;
            log::info!(
                "post-processing {}",
                if self.post_enabled { "on" } else { "off" }
            );
        }

        change
    }

    /// Writes the panel values back into a color-grade config.
    pub fn apply(&self, grade: &mut ColorGradeConfig) {
        grade.brightness = self.brightness;
        grade.offset = self.offset.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut Input, key: KeyCode) {
        input.begin_frame();
        input.release_key(key);
        input.press_key(key);
    }

    #[test]
    fn brightness_steps_and_clamps() {
        let mut panel = TuningPanel::new(&ColorGradeConfig::default(), true);
        let mut input = Input::new();

        press(&mut input, KeyCode::Equal);
        assert!(panel.handle_input(&input).params);
        assert!((panel.brightness - 1.05).abs() < 1e-6);

        for _ in 0..100 {
            press(&mut input, KeyCode::Equal);
            panel.handle_input(&input);
        }
        assert_eq!(panel.brightness, BRIGHTNESS_RANGE.1);

        // Already at the limit: nothing changes.
        press(&mut input, KeyCode::Equal);
        assert!(!panel.handle_input(&input).params);
    }

    #[test]
    fn arrows_move_offset() {
        let mut panel = TuningPanel::new(&ColorGradeConfig::default(), true);
        let mut input = Input::new();

        press(&mut input, KeyCode::ArrowRight);
        panel.handle_input(&input);
        press(&mut input, KeyCode::ArrowDown);
        panel.handle_input(&input);

        assert!((panel.offset - Vec2::new(0.01, -0.01)).length() < 1e-6);

        let mut grade = ColorGradeConfig::default();
        panel.apply(&mut grade);
        assert_eq!(grade.offset, [panel.offset.x, panel.offset.y]);
    }

    #[test]
    fn p_toggles_post_chain() {
        let mut panel = TuningPanel::new(&ColorGradeConfig::default(), true);
        let mut input = Input::new();

        press(&mut input, KeyCode::KeyP);
        let change = panel.handle_input(&input);
        assert!(change.post_toggled);
        assert!(!change.params);
        assert!(!panel.post_enabled);
    }
}
