//! Per-frame animation of the scene handles.
//!
//! Two kinds of motion run every frame:
//!
//! - **Spin**: fixed angular increments added to the `earth` and `star`
//!   handles. Increments are per frame, not per second, so on a 144 Hz
//!   display everything turns faster than at 60 Hz.
//! - **Timeline**: wall-clock time since the loop started drives the curve
//!   reveal and, after `fade_start_time`, a linear fade of markers and curve.

use crate::config::AnimationConfig;
use crate::scene::{AnimatedHandles, Handle, SceneGraph};

/// Reveal progress in `[0, 1]`: 1.0 once `elapsed` reaches
/// `reveal_duration / reveal_speed`.
pub fn reveal_fraction(elapsed: f32, config: &AnimationConfig) -> f32 {
    let progress = elapsed.max(0.0) / config.reveal_duration;
    (progress * config.reveal_speed).min(1.0)
}

/// Number of curve indices to draw after `elapsed` seconds.
pub fn reveal_count(elapsed: f32, total: u32, config: &AnimationConfig) -> u32 {
    let progress = elapsed.max(0.0) / config.reveal_duration;
    let count = (progress * config.reveal_speed * total as f32) as u32;
    count.min(total)
}

/// Opacity of markers and curve, or `None` before the fade begins.
///
/// Past the fade window the linear ramp goes below zero unless
/// `clamp_opacity` is set.
pub fn fade_opacity(elapsed: f32, config: &AnimationConfig) -> Option<f32> {
    if elapsed <= config.fade_start_time {
        return None;
    }
    let opacity = 1.0 - (elapsed - config.fade_start_time) / config.fade_duration;
    Some(if config.clamp_opacity {
        opacity.max(0.0)
    } else {
        opacity
    })
}

/// Adds one frame's spin to the `earth` and `star` handles.
pub fn apply_spin(scene: &mut SceneGraph, handles: &AnimatedHandles, config: &AnimationConfig) {
    for (handle, [dx, dy]) in [
        (Handle::Earth, config.earth_spin),
        (Handle::Star, config.star_spin),
    ] {
        for &id in handles.get(handle) {
            let rotation = &mut scene.node_mut(id).transform.rotation;
            rotation.x += dx;
            rotation.y += dy;
        }
    }
}

/// Updates the curve draw range and the marker/curve fade for `elapsed`.
pub fn apply_timeline(
    scene: &mut SceneGraph,
    handles: &AnimatedHandles,
    elapsed: f32,
    config: &AnimationConfig,
) {
    for &id in handles.get(Handle::Curve) {
        if let Some(renderable) = scene.node_mut(id).renderable_mut() {
            let total = renderable.geometry.index_count();
            renderable.draw_range = Some(reveal_count(elapsed, total, config));
        }
    }

    let Some(opacity) = fade_opacity(elapsed, config) else {
        return;
    };
    for handle in [Handle::Marker, Handle::Curve] {
        for &id in handles.get(handle) {
            if let Some(renderable) = scene.node_mut(id).renderable_mut() {
                renderable.material.opacity = opacity;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeoglowConfig;
    use crate::scene::{SceneKind, assemble};

    #[test]
    fn reveal_follows_progress_formula() {
        let config = AnimationConfig::default();
        assert_eq!(reveal_count(0.0, 960, &config), 0);
        // progress = 0.5 / 2.5 = 0.2; 0.2 * 3 * 960 = 576
        assert_eq!(reveal_count(0.5, 960, &config), 576);
        // Full length arrives at reveal_duration / reveal_speed (~0.833s).
        assert!(reveal_count(0.8, 960, &config) < 960);
        assert_eq!(reveal_count(0.84, 960, &config), 960);
        assert_eq!(reveal_count(10.0, 960, &config), 960);
    }

    #[test]
    fn reveal_is_non_decreasing() {
        let config = AnimationConfig::default();
        let mut last = 0;
        for step in 0..200 {
            let count = reveal_count(step as f32 * 0.01, 960, &config);
            assert!(count >= last);
            last = count;
        }
        assert_eq!(last, 960);
        assert_eq!(reveal_fraction(1.0, &config), 1.0);
    }

    #[test]
    fn fade_is_five_minus_t() {
        let config = AnimationConfig::default();
        assert_eq!(fade_opacity(3.9, &config), None);
        assert_eq!(fade_opacity(4.0, &config), None);
        for t in [4.25_f32, 4.5, 4.75] {
            let opacity = fade_opacity(t, &config).unwrap();
            assert!((opacity - (5.0 - t)).abs() < 1e-6);
        }
    }

    #[test]
    fn fade_clamps_at_zero_when_configured() {
        let clamped = AnimationConfig::default();
        assert_eq!(fade_opacity(6.0, &clamped), Some(0.0));

        let unclamped = AnimationConfig {
            clamp_opacity: false,
            ..Default::default()
        };
        let opacity = fade_opacity(6.0, &unclamped).unwrap();
        assert!((opacity + 1.0).abs() < 1e-6);
    }

    #[test]
    fn spin_is_a_fixed_increment_per_call() {
        let config = GeoglowConfig::default();
        let mut assembly = assemble(SceneKind::Stars, &config);
        let earth = assembly.handles.first(Handle::Earth).unwrap();
        let star = assembly.handles.first(Handle::Star).unwrap();

        for _ in 0..10 {
            apply_spin(&mut assembly.scene, &assembly.handles, &config.animation);
        }
        let earth_rot = assembly.scene.node(earth).transform.rotation;
        let star_rot = assembly.scene.node(star).transform.rotation;
        assert!((earth_rot.y - 0.005).abs() < 1e-6);
        assert!((star_rot.x - 0.01).abs() < 1e-6);
    }

    #[test]
    fn timeline_reveals_then_fades_route() {
        let config = GeoglowConfig::default();
        let mut assembly = assemble(SceneKind::Flight, &config);
        let curve = assembly.handles.first(Handle::Curve).unwrap();
        let marker = assembly.handles.first(Handle::Marker).unwrap();

        apply_timeline(&mut assembly.scene, &assembly.handles, 0.5, &config.animation);
        let r = assembly.scene.node(curve).renderable().unwrap();
        assert_eq!(r.draw_range, Some(576));
        assert_eq!(r.material.opacity, 1.0);

        apply_timeline(&mut assembly.scene, &assembly.handles, 4.5, &config.animation);
        let r = assembly.scene.node(curve).renderable().unwrap();
        assert_eq!(r.draw_range, Some(960));
        assert!((r.material.opacity - 0.5).abs() < 1e-6);
        let m = assembly.scene.node(marker).renderable().unwrap();
        assert!((m.material.opacity - 0.5).abs() < 1e-6);
    }
}
