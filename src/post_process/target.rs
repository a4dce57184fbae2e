use crate::gpu::GpuContext;

/// An off-screen color target for intermediate pass results.
///
/// Targets are both render attachments and sampled textures, so one pass
/// writes target A while the next reads it and writes target B.
pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    label: &'static str,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Creates a target in the surface format at `width` × `height`.
    pub fn new(gpu: &GpuContext, label: &'static str, width: u32, height: u32) -> Self {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: gpu.format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            label,
            width,
            height,
        }
    }

    /// Reallocates if the size differs. Returns true if it did.
    pub fn ensure_size(&mut self, gpu: &GpuContext, width: u32, height: u32) -> bool {
        if self.width != width || self.height != height {
            *self = Self::new(gpu, self.label, width, height);
            true
        } else {
            false
        }
    }
}

/// A depth buffer matching the color attachments.
pub struct DepthTarget {
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl DepthTarget {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(gpu: &GpuContext, width: u32, height: u32) -> Self {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            view,
            width,
            height,
        }
    }

    pub fn ensure_size(&mut self, gpu: &GpuContext, width: u32, height: u32) {
        if self.width != width || self.height != height {
            *self = Self::new(gpu, width, height);
        }
    }
}
