//! Image loading and GPU textures.
//!
//! Decoding is split from upload: [`TextureData`] and [`CubeFaces`] are
//! plain pixel buffers produced by the `image` crate, so load failures are
//! reported before any GPU work happens and can be tested without a device.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::gpu::GpuContext;

/// Decoded RGBA8 pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub label: String,
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureData {
    /// Decodes an image file into RGBA8.
    pub fn load(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .map_err(|source| Error::TextureLoad {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        log::debug!("loaded texture {} ({width}x{height})", path.display());

        Ok(Self {
            label: path.display().to_string(),
            rgba: img.into_raw(),
            width,
            height,
        })
    }

    /// Rejects images the device cannot hold in one texture.
    pub fn check_size(&self, max_dimension: u32) -> Result<()> {
        if self.width <= max_dimension && self.height <= max_dimension {
            return Ok(());
        }
        log::debug!(
            "{} is {}x{}, device limit is {max_dimension}",
            self.label,
            self.width,
            self.height
        );
        Err(Error::TextureLoad {
            path: PathBuf::from(&self.label),
            source: image::ImageError::Limits(image::error::LimitError::from_kind(
                image::error::LimitErrorKind::DimensionError,
            )),
        })
    }

    /// A 1×1 opaque white texture, bound when a material has no map.
    pub fn white() -> Self {
        Self {
            label: "White Texture".to_string(),
            rgba: vec![255; 4],
            width: 1,
            height: 1,
        }
    }

    /// A radial falloff disc used as the default point sprite.
    pub fn soft_disc(size: u32) -> Self {
        let mut rgba = vec![0u8; (size * size * 4) as usize];
        let center = (size as f32 - 1.0) * 0.5;

        for y in 0..size {
            for x in 0..size {
                let dx = (x as f32 - center) / center.max(1.0);
                let dy = (y as f32 - center) / center.max(1.0);
                let falloff = (1.0 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);

                let idx = ((y * size + x) * 4) as usize;
                rgba[idx..idx + 3].fill(255);
                rgba[idx + 3] = (falloff * falloff * 255.0) as u8;
            }
        }

        Self {
            label: "Soft Disc Sprite".to_string(),
            rgba,
            width: size,
            height: size,
        }
    }
}

/// Six decoded cube faces in +X, -X, +Y, -Y, +Z, -Z order.
#[derive(Clone, Debug, PartialEq)]
pub struct CubeFaces {
    pub faces: Vec<TextureData>,
    pub size: u32,
}

impl CubeFaces {
    /// Loads and validates six square faces of equal size.
    pub fn load(paths: &[PathBuf]) -> Result<Self> {
        if paths.len() != 6 {
            return Err(Error::EnvironmentMap(format!(
                "expected 6 faces, got {}",
                paths.len()
            )));
        }

        let faces = paths
            .iter()
            .map(|p| TextureData::load(p))
            .collect::<Result<Vec<_>>>()?;

        let size = faces[0].width;
        for face in &faces {
            if face.width != face.height || face.width != size {
                return Err(Error::EnvironmentMap(format!(
                    "face {} is {}x{}, expected {size}x{size}",
                    face.label, face.width, face.height
                )));
            }
        }

        Ok(Self { faces, size })
    }

    pub fn check_size(&self, max_dimension: u32) -> Result<()> {
        if self.size > max_dimension {
            return Err(Error::EnvironmentMap(format!(
                "faces are {0}x{0}, device limit is {max_dimension}",
                self.size
            )));
        }
        Ok(())
    }
}

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Uploads decoded pixels as an sRGB 2D texture.
    pub fn from_data(gpu: &GpuContext, data: &TextureData) -> Self {
        Self::from_rgba(gpu, &data.rgba, data.width, data.height, &data.label)
    }

    /// Creates a texture from raw RGBA data.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = linear_sampler(gpu, label, wgpu::AddressMode::Repeat);

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// Uploads six faces as a cube texture for the scene background.
    pub fn cube(gpu: &GpuContext, faces: &CubeFaces) -> Self {
        use wgpu::util::DeviceExt;

        let data: Vec<u8> = faces
            .faces
            .iter()
            .flat_map(|f| f.rgba.iter().copied())
            .collect();

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some("Environment Cube"),
                size: wgpu::Extent3d {
                    width: faces.size,
                    height: faces.size,
                    depth_or_array_layers: 6,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Environment Cube View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = linear_sampler(gpu, "Environment Cube", wgpu::AddressMode::ClampToEdge);

        Self {
            texture,
            view,
            sampler,
            width: faces.size,
            height: faces.size,
        }
    }
}

fn linear_sampler(gpu: &GpuContext, label: &str, address_mode: wgpu::AddressMode) -> wgpu::Sampler {
    gpu.device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(&format!("{label} Sampler")),
        address_mode_u: address_mode,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: address_mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = TextureData::load(Path::new("/no/such/earth.jpg")).unwrap_err();
        assert!(matches!(err, Error::TextureLoad { .. }));
    }

    #[test]
    fn loads_rgba_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 3, 2);

        let data = TextureData::load(&path).unwrap();
        assert_eq!((data.width, data.height), (3, 2));
        assert_eq!(data.rgba.len(), 3 * 2 * 4);
        assert_eq!(&data.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn oversized_image_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "wide.png", 16, 8);
        let data = TextureData::load(&path).unwrap();

        assert!(data.check_size(16).is_ok());
        let err = data.check_size(8).unwrap_err();
        assert!(matches!(
            err,
            Error::TextureLoad {
                source: image::ImageError::Limits(_),
                ..
            }
        ));
    }

    #[test]
    fn oversized_cube_is_an_environment_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..6)
            .map(|i| write_png(dir.path(), &format!("{i}.png"), 4, 4))
            .collect();
        let cube = CubeFaces::load(&paths).unwrap();

        assert!(cube.check_size(4).is_ok());
        assert!(matches!(cube.check_size(2), Err(Error::EnvironmentMap(_))));
    }

    #[test]
    fn cube_requires_six_faces() {
        let err = CubeFaces::load(&[PathBuf::from("px.png")]).unwrap_err();
        assert!(matches!(err, Error::EnvironmentMap(_)));
    }

    #[test]
    fn cube_rejects_mismatched_faces() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths: Vec<PathBuf> = (0..5)
            .map(|i| write_png(dir.path(), &format!("{i}.png"), 4, 4))
            .collect();
        paths.push(write_png(dir.path(), "odd.png", 8, 8));

        assert!(matches!(
            CubeFaces::load(&paths),
            Err(Error::EnvironmentMap(_))
        ));
    }

    #[test]
    fn cube_loads_matching_faces() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..6)
            .map(|i| write_png(dir.path(), &format!("{i}.png"), 4, 4))
            .collect();

        let cube = CubeFaces::load(&paths).unwrap();
        assert_eq!(cube.size, 4);
        assert_eq!(cube.faces.len(), 6);
    }

    #[test]
    fn soft_disc_fades_to_edges() {
        let disc = TextureData::soft_disc(16);
        let alpha = |x: u32, y: u32| disc.rgba[((y * 16 + x) * 4 + 3) as usize];
        assert_eq!(alpha(0, 0), 0);
        assert!(alpha(8, 8) > 200);
    }
}
