//! Surface descriptions attached to scene nodes.
//!
//! Materials are plain data. The renderer turns them into pipeline keys and
//! uniforms each frame, so the render loop can fade a material by writing
//! its `opacity` field directly.

use std::path::PathBuf;

use glam::Vec3;

/// Converts a `0xRRGGBB` sRGB color to linear RGB.
pub fn hex(rgb: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((rgb >> shift) & 0xff) as f32 / 255.0);
    Vec3::new(channel(16), channel(8), channel(0))
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Which faces of a triangle are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

impl Side {
    pub fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        }
    }
}

/// How fragments combine with what is already in the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Blending {
    #[default]
    Normal,
    Additive,
}

impl Blending {
    pub fn state(self, transparent: bool) -> Option<wgpu::BlendState> {
        match (self, transparent) {
            (Blending::Additive, _) => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent::OVER,
            }),
            (Blending::Normal, true) => Some(wgpu::BlendState::ALPHA_BLENDING),
            (Blending::Normal, false) => Some(wgpu::BlendState::REPLACE),
        }
    }
}

/// Lighting model of a triangle mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Shading {
    /// Flat color or texture, ignores lights.
    #[default]
    Basic,
    /// Lambert diffuse from the scene's lights.
    Standard,
}

/// Material of a triangle mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub shading: Shading,
    /// Linear RGB.
    pub color: Vec3,
    pub opacity: f32,
    pub transparent: bool,
    pub side: Side,
    pub blending: Blending,
    /// Color map, multiplied with `color`.
    pub map: Option<PathBuf>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            shading: Shading::Basic,
            color: Vec3::ONE,
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
            blending: Blending::Normal,
            map: None,
        }
    }
}

impl Material {
    pub fn basic(color: Vec3) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn standard(color: Vec3) -> Self {
        Self {
            shading: Shading::Standard,
            color,
            ..Default::default()
        }
    }

    pub fn map(mut self, path: impl Into<PathBuf>) -> Self {
        self.map = Some(path.into());
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self.transparent = true;
        self
    }

    pub fn side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn blending(mut self, blending: Blending) -> Self {
        self.blending = blending;
        self
    }

    pub fn is_blended(&self) -> bool {
        self.transparent || self.blending != Blending::Normal
    }
}

/// Material of a point cloud, drawn as camera-facing sprites.
#[derive(Clone, Debug, PartialEq)]
pub struct PointsMaterial {
    pub color: Vec3,
    /// Sprite size in world units at distance 1.
    pub size: f32,
    pub opacity: f32,
    pub blending: Blending,
    pub sprite: Option<PathBuf>,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            size: 0.01,
            opacity: 1.0,
            blending: Blending::Additive,
            sprite: None,
        }
    }
}
