//! Stage planning for the post-processing chain.
//!
//! The chain is planned on the CPU: which passes run, in which order, and
//! which target each stage reads and writes. The GPU side only follows the
//! plan, so ordering and resize behavior are testable without a device.

use crate::config::PostProcessConfig;

/// An image-space pass. Declaration order is execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PassKind {
    FilmGrain,
    Bloom,
    AntiAlias,
    GammaCorrect,
    ColorGrade,
}

impl PassKind {
    /// Fixed execution order after the base render.
    pub const ORDER: [PassKind; 5] = [
        PassKind::FilmGrain,
        PassKind::Bloom,
        PassKind::AntiAlias,
        PassKind::GammaCorrect,
        PassKind::ColorGrade,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PassKind::FilmGrain => "Film Grain",
            PassKind::Bloom => "Bloom",
            PassKind::AntiAlias => "FXAA",
            PassKind::GammaCorrect => "Gamma Correct",
            PassKind::ColorGrade => "Color Grade",
        }
    }

    pub fn is_enabled(self, config: &PostProcessConfig) -> bool {
        match self {
            PassKind::FilmGrain => config.film_grain.enabled,
            PassKind::Bloom => config.bloom.enabled,
            PassKind::AntiAlias => config.anti_alias.enabled,
            PassKind::GammaCorrect => config.gamma_correct.enabled,
            PassKind::ColorGrade => config.color_grade.enabled,
        }
    }
}

/// Where a stage reads from or writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    TargetA,
    TargetB,
    /// The visible framebuffer.
    Screen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Render the scene itself.
    Scene,
    Effect(PassKind),
}

/// One step of the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Stage {
    pub kind: StageKind,
    /// `None` for the scene stage.
    pub input: Option<Slot>,
    pub output: Slot,
}

/// Uniform block shared by every effect shader.
///
/// ```wgsl
/// struct Uniforms {
///     resolution: vec2f,
///     time: f32,
///     _padding: f32,
///     params: vec4f,
/// }
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PassUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub _padding: f32,
    pub params: [f32; 4],
}

/// The planned chain: base render, then every enabled pass in fixed order,
/// ping-ponging between two off-screen targets. Exactly one stage, the
/// last, writes the screen.
#[derive(Clone, Debug, PartialEq)]
pub struct PassChain {
    config: PostProcessConfig,
    extent: (u32, u32),
    stages: Vec<Stage>,
}

impl PassChain {
    pub fn build(config: &PostProcessConfig, width: u32, height: u32) -> Self {
        let mut chain = Self {
            config: config.clone(),
            extent: (width.max(1), height.max(1)),
            stages: Vec::new(),
        };
        chain.plan();
        chain
    }

    fn plan(&mut self) {
        let kinds: Vec<StageKind> = std::iter::once(StageKind::Scene)
            .chain(
                PassKind::ORDER
                    .into_iter()
                    .filter(|k| k.is_enabled(&self.config))
                    .map(StageKind::Effect),
            )
            .collect();

        let last = kinds.len() - 1;
        let mut input = None;
        self.stages = kinds
            .into_iter()
            .enumerate()
            .map(|(i, kind)| {
                let output = if i == last {
                    Slot::Screen
                } else if i % 2 == 0 {
                    Slot::TargetA
                } else {
                    Slot::TargetB
                };
                let stage = Stage {
                    kind,
                    input,
                    output,
                };
                input = Some(output);
                stage
            })
            .collect();

        log::debug!(
            "post chain: {}",
            self.effects()
                .map(PassKind::label)
                .collect::<Vec<_>>()
                .join(" -> ")
        );
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Enabled effect passes in execution order.
    pub fn effects(&self) -> impl Iterator<Item = PassKind> + '_ {
        self.stages.iter().filter_map(|s| match s.kind {
            StageKind::Effect(kind) => Some(kind),
            StageKind::Scene => None,
        })
    }

    pub fn config(&self) -> &PostProcessConfig {
        &self.config
    }

    /// Replaces the configuration and replans the stages.
    pub fn set_config(&mut self, config: &PostProcessConfig) {
        if *config != self.config {
            self.config = config.clone();
            self.plan();
        }
    }

    pub fn extent(&self) -> (u32, u32) {
        self.extent
    }

    /// Size of the attachment the scene stage draws into. With every effect
    /// disabled the scene writes the screen directly, so depth must match
    /// the surface rather than the capped render size.
    pub fn scene_extent(&self, screen: (u32, u32)) -> (u32, u32) {
        match self.stages.first().map(|s| s.output) {
            Some(Slot::Screen) | None => screen,
            Some(_) => self.extent,
        }
    }

    /// Records the new render size. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.extent = (width, height);
        }
    }

    /// Uniforms for `kind` at `time`, computed only from config and extent.
    pub fn uniforms_for(&self, kind: PassKind, time: f32) -> PassUniforms {
        let c = &self.config;
        let params = match kind {
            PassKind::FilmGrain => [
                c.film_grain.noise_intensity,
                c.film_grain.scanline_intensity,
                c.film_grain.scanline_count,
                if c.film_grain.grayscale { 1.0 } else { 0.0 },
            ],
            PassKind::Bloom => [c.bloom.strength, c.bloom.radius, c.bloom.threshold, 0.0],
            PassKind::AntiAlias | PassKind::GammaCorrect => [0.0; 4],
            PassKind::ColorGrade => [
                c.color_grade.brightness,
                c.color_grade.offset[0],
                c.color_grade.offset[1],
                0.0,
            ],
        };

        PassUniforms {
            resolution: [self.extent.0 as f32, self.extent.1 as f32],
            time,
            _padding: 0.0,
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chain_runs_all_passes_in_declared_order() {
        let chain = PassChain::build(&PostProcessConfig::default(), 800, 600);
        let kinds: Vec<_> = chain.stages().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [
                StageKind::Scene,
                StageKind::Effect(PassKind::FilmGrain),
                StageKind::Effect(PassKind::Bloom),
                StageKind::Effect(PassKind::AntiAlias),
                StageKind::Effect(PassKind::GammaCorrect),
                StageKind::Effect(PassKind::ColorGrade),
            ]
        );
    }

    #[test]
    fn each_stage_reads_the_previous_output() {
        let chain = PassChain::build(&PostProcessConfig::default(), 800, 600);
        let stages = chain.stages();
        assert_eq!(stages[0].input, None);
        for pair in stages.windows(2) {
            assert_eq!(pair[1].input, Some(pair[0].output));
            assert_ne!(pair[1].output, pair[0].output);
        }
    }

    #[test]
    fn exactly_one_stage_writes_the_screen_and_it_is_last() {
        let mut config = PostProcessConfig::default();
        for disabled in 0..=PassKind::ORDER.len() {
            let chain = PassChain::build(&config, 640, 480);
            let screens: Vec<_> = chain
                .stages()
                .iter()
                .enumerate()
                .filter(|(_, s)| s.output == Slot::Screen)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(screens, [chain.stages().len() - 1]);

            if let Some(kind) = PassKind::ORDER.get(disabled) {
                match kind {
                    PassKind::FilmGrain => config.film_grain.enabled = false,
                    PassKind::Bloom => config.bloom.enabled = false,
                    PassKind::AntiAlias => config.anti_alias.enabled = false,
                    PassKind::GammaCorrect => config.gamma_correct.enabled = false,
                    PassKind::ColorGrade => config.color_grade.enabled = false,
                }
            }
        }
    }

    #[test]
    fn scene_depth_matches_the_screen_when_every_pass_is_off() {
        let mut config = PostProcessConfig::default();
        config.film_grain.enabled = false;
        config.bloom.enabled = false;
        config.anti_alias.enabled = false;
        config.gamma_correct.enabled = false;
        config.color_grade.enabled = false;

        // 3x display capped to 2x: targets are smaller than the surface.
        let chain = PassChain::build(&config, 2000, 1000);
        assert_eq!(
            chain.stages(),
            [Stage {
                kind: StageKind::Scene,
                input: None,
                output: Slot::Screen,
            }]
        );
        assert_eq!(chain.scene_extent((3000, 1500)), (3000, 1500));

        let full = PassChain::build(&PostProcessConfig::default(), 2000, 1000);
        assert_eq!(full.scene_extent((3000, 1500)), (2000, 1000));
    }

    #[test]
    fn disabling_a_pass_keeps_the_rest_in_order() {
        let mut config = PostProcessConfig::default();
        config.bloom.enabled = false;
        let chain = PassChain::build(&config, 800, 600);
        let effects: Vec<_> = chain.effects().collect();
        assert_eq!(
            effects,
            [
                PassKind::FilmGrain,
                PassKind::AntiAlias,
                PassKind::GammaCorrect,
                PassKind::ColorGrade,
            ]
        );
    }

    #[test]
    fn resize_updates_extent_and_resolution() {
        let mut chain = PassChain::build(&PostProcessConfig::default(), 800, 600);
        chain.resize(1920, 1080);
        assert_eq!(chain.extent(), (1920, 1080));
        assert_eq!(
            chain.uniforms_for(PassKind::AntiAlias, 0.0).resolution,
            [1920.0, 1080.0]
        );

        chain.resize(0, 1080);
        assert_eq!(chain.extent(), (1920, 1080));
    }

    #[test]
    fn identical_inputs_give_identical_bytes() {
        let a = PassChain::build(&PostProcessConfig::default(), 800, 600);
        let b = PassChain::build(&PostProcessConfig::default(), 800, 600);
        assert_eq!(a.stages(), b.stages());

        for kind in PassKind::ORDER {
            let ua = a.uniforms_for(kind, 1.25);
            let ub = b.uniforms_for(kind, 1.25);
            assert_eq!(bytemuck::bytes_of(&ua), bytemuck::bytes_of(&ub));
        }
    }

    #[test]
    fn color_grade_uniforms_carry_panel_values() {
        let mut config = PostProcessConfig::default();
        config.color_grade.brightness = 1.4;
        config.color_grade.offset = [0.1, -0.2];
        let chain = PassChain::build(&config, 800, 600);
        assert_eq!(
            chain.uniforms_for(PassKind::ColorGrade, 0.0).params,
            [1.4, 0.1, -0.2, 0.0]
        );
    }

    #[test]
    fn uniforms_are_32_bytes() {
        assert_eq!(std::mem::size_of::<PassUniforms>(), 32);
    }
}
