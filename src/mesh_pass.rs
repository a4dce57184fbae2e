//! Scene rendering: triangle meshes, point sprites and the environment
//! background, drawn with depth testing into one color target.
//!
//! # Architecture
//!
//! Drawing a frame is split in two:
//!
//! - [`DrawList::collect`] walks the scene graph on the CPU and produces the
//!   ordered list of draws and the packed lights. Opaque draws come first,
//!   blended ones after, each group in scene order.
//! - [`MeshPass`] uploads whatever the list needs that is not resident yet
//!   (meshes, point buffers, textures, pipelines), writes uniforms, then
//!   records one render pass.
//!
//! Bind groups:
//! - **Group 0**: scene uniforms (camera matrices, lights, sRGB flag)
//! - **Group 1**: model uniforms, one 256-byte slot per draw, dynamic offset
//! - **Group 2**: color map or sprite and its sampler (skybox: the cube)

use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::error::Result;
use crate::gpu::GpuContext;
use crate::material::{Blending, Shading, Side};
use crate::mesh::{Mesh, Vertex3d, clamp_draw_range};
use crate::post_process::DepthTarget;
use crate::scene::{Light, NodeId, Payload, SceneGraph};
use crate::texture::{CubeFaces, Texture, TextureData};

/// Lights beyond this count are ignored.
pub const MAX_LIGHTS: usize = 4;

/// Distance between model uniform slots; the default
/// `min_uniform_buffer_offset_alignment`.
const MODEL_STRIDE: u64 = 256;

const SCENE_COMMON: &str = include_str!("shaders/scene_common.wgsl");

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// `w` is 0 for directional lights, 1 for point lights.
    pub position: [f32; 4],
    pub color: [f32; 4],
}

/// Per-frame uniforms shared by every draw.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    /// 1.0 when shaders must encode sRGB themselves.
    pub encode_srgb: f32,
    pub ambient: [f32; 4],
    pub lights: [LightUniform; MAX_LIGHTS],
    pub light_count: u32,
    pub _padding: [u32; 3],
}

impl SceneUniforms {
    pub fn new(camera: &Camera, lights: &LightSet, encode_srgb: bool) -> Self {
        let view = camera.view_matrix();
        let proj = camera.projection_matrix();
        let view_proj = proj * view;

        let mut packed = [LightUniform::default(); MAX_LIGHTS];
        for (slot, light) in packed.iter_mut().zip(&lights.lights) {
            *slot = *light;
        }

        Self {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            camera_pos: camera.position.to_array(),
            encode_srgb: if encode_srgb { 1.0 } else { 0.0 },
            ambient: lights.ambient.extend(1.0).to_array(),
            lights: packed,
            light_count: lights.lights.len() as u32,
            _padding: [0; 3],
        }
    }
}

/// Per-draw uniforms.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for normals under non-uniform scale.
    pub normal_matrix: [[f32; 4]; 4],
    /// Linear RGB and opacity.
    pub color: [f32; 4],
    /// x: 1.0 when lit. y: point sprite size.
    pub params: [f32; 4],
}

/// Ambient light summed into one color, plus up to [`MAX_LIGHTS`] others.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LightSet {
    pub ambient: Vec3,
    pub lights: Vec<LightUniform>,
}

impl LightSet {
    fn add(&mut self, light: &Light, world: Mat4) {
        let position = world.w_axis.truncate();
        let (color, w) = match *light {
            Light::Ambient { color, intensity } => {
                self.ambient += color * intensity;
                return;
            }
            Light::Directional { color, intensity } => (color * intensity, 0.0),
            Light::Point { color, intensity } => (color * intensity, 1.0),
        };

        if self.lights.len() == MAX_LIGHTS {
            log::debug!("more than {MAX_LIGHTS} lights; extra ignored");
            return;
        }
        self.lights.push(LightUniform {
            position: position.extend(w).to_array(),
            color: color.extend(1.0).to_array(),
        });
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawKind {
    Mesh,
    Points,
}

/// Everything about a draw that selects a pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub kind: DrawKind,
    pub side: Side,
    pub blending: Blending,
    pub transparent: bool,
}

impl PipelineKey {
    pub fn is_blended(&self) -> bool {
        self.transparent || self.blending != Blending::Normal
    }
}

/// One visible mesh or point cloud.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub world: Mat4,
    pub key: PipelineKey,
    /// Index range for meshes, instance range for point clouds.
    pub range: Range<u32>,
    pub uniforms: ModelUniforms,
    /// Color map or sprite; `None` uses the kind's default.
    pub texture: Option<PathBuf>,
}

/// Ordered draws for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    pub lights: LightSet,
    pub items: Vec<DrawItem>,
}

impl DrawList {
    /// Walks the visible scene. Empty draw ranges are skipped; blended draws
    /// are moved after opaque ones, keeping scene order inside each group.
    pub fn collect(scene: &SceneGraph) -> Self {
        let mut lights = LightSet::default();
        let mut opaque = Vec::new();
        let mut blended = Vec::new();

        scene.traverse_visible(|node_id, node, world| {
            let item = match &node.payload {
                None => return,
                Some(Payload::Light(light)) => {
                    lights.add(light, world);
                    return;
                }
                Some(Payload::Mesh(r)) => {
                    let m = &r.material;
                    DrawItem {
                        node: node_id,
                        world,
                        key: PipelineKey {
                            kind: DrawKind::Mesh,
                            side: m.side,
                            blending: m.blending,
                            transparent: m.transparent,
                        },
                        range: clamp_draw_range(r.draw_range, r.geometry.index_count()),
                        uniforms: model_uniforms(
                            world,
                            m.color,
                            m.opacity,
                            [lit(m.shading), 0.0, 0.0, 0.0],
                        ),
                        texture: m.map.clone(),
                    }
                }
                Some(Payload::Points(p)) => {
                    let m = &p.material;
                    DrawItem {
                        node: node_id,
                        world,
                        key: PipelineKey {
                            kind: DrawKind::Points,
                            side: Side::Double,
                            blending: m.blending,
                            transparent: true,
                        },
                        range: 0..p.cloud.len() as u32,
                        uniforms: model_uniforms(world, m.color, m.opacity, [0.0, m.size, 0.0, 0.0]),
                        texture: m.sprite.clone(),
                    }
                }
            };

            if item.range.is_empty() {
                return;
            }
            if item.key.is_blended() {
                blended.push(item);
            } else {
                opaque.push(item);
            }
        });

        opaque.extend(blended);
        Self {
            lights,
            items: opaque,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn lit(shading: Shading) -> f32 {
    match shading {
        Shading::Basic => 0.0,
        Shading::Standard => 1.0,
    }
}

fn model_uniforms(world: Mat4, color: Vec3, opacity: f32, params: [f32; 4]) -> ModelUniforms {
    ModelUniforms {
        model: world.to_cols_array_2d(),
        normal_matrix: world.inverse().transpose().to_cols_array_2d(),
        color: color.extend(opacity).to_array(),
        params,
    }
}

const POINT_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &[wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    }],
};

/// Uploaded geometry for one node.
enum Resident {
    Mesh(Mesh),
    Points(wgpu::Buffer),
}

/// GPU side of scene rendering.
///
/// Geometry is uploaded the first time a node is drawn and kept for the
/// life of the pass; nodes never change their geometry after assembly.
/// Textures are cached by path; a path that failed to load is remembered
/// and drawn with the flat material color.
pub struct MeshPass {
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    model_capacity: u64,
    texture_layout: wgpu::BindGroupLayout,
    cube_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    mesh_shader: wgpu::ShaderModule,
    points_shader: wgpu::ShaderModule,
    skybox_pipeline: wgpu::RenderPipeline,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    resident: HashMap<NodeId, Resident>,
    textures: HashMap<PathBuf, Option<wgpu::BindGroup>>,
    white: wgpu::BindGroup,
    soft_disc: wgpu::BindGroup,
    environment: Option<Vec<PathBuf>>,
    skybox: Option<wgpu::BindGroup>,
}

impl MeshPass {
    pub fn new(gpu: &GpuContext) -> Result<Self> {
        let device = &gpu.device;

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ModelUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let model_capacity = 16;
        let (model_buffer, model_bind_group) =
            Self::create_model_buffer(gpu, &model_layout, model_capacity);

        let texture_layout = texture_bind_group_layout(gpu, wgpu::TextureViewDimension::D2);
        let cube_layout = texture_bind_group_layout(gpu, wgpu::TextureViewDimension::Cube);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&scene_layout, &model_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let mesh_shader = gpu.compile_shader(
            "Mesh Shader",
            &format!("{SCENE_COMMON}\n{}", include_str!("shaders/mesh.wgsl")),
        )?;
        let points_shader = gpu.compile_shader(
            "Points Shader",
            &format!("{SCENE_COMMON}\n{}", include_str!("shaders/points.wgsl")),
        )?;
        let skybox_shader = gpu.compile_shader(
            "Skybox Shader",
            &format!("{SCENE_COMMON}\n{}", include_str!("shaders/skybox.wgsl")),
        )?;

        let skybox_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skybox Pipeline Layout"),
            bind_group_layouts: &[&scene_layout, &cube_layout],
            push_constant_ranges: &[],
        });

        let skybox_pipeline = gpu.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Skybox Pipeline"),
            layout: Some(&skybox_layout),
            vertex: wgpu::VertexState {
                module: &skybox_shader,
                entry_point: Some("vs"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &skybox_shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthTarget::FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })?;

        let white = texture_bind_group(
            gpu,
            &texture_layout,
            &Texture::from_data(gpu, &TextureData::white()),
        );
        let soft_disc = texture_bind_group(
            gpu,
            &texture_layout,
            &Texture::from_data(gpu, &TextureData::soft_disc(32)),
        );

        Ok(Self {
            scene_buffer,
            scene_bind_group,
            model_layout,
            model_buffer,
            model_bind_group,
            model_capacity,
            texture_layout,
            cube_layout,
            pipeline_layout,
            mesh_shader,
            points_shader,
            skybox_pipeline,
            pipelines: HashMap::new(),
            resident: HashMap::new(),
            textures: HashMap::new(),
            white,
            soft_disc,
            environment: None,
            skybox: None,
        })
    }

    fn create_model_buffer(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        capacity: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniforms"),
            size: capacity * MODEL_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ModelUniforms>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Uploads anything `draws` needs and writes this frame's uniforms.
    pub fn prepare(
        &mut self,
        gpu: &GpuContext,
        scene: &SceneGraph,
        camera: &Camera,
        draws: &DrawList,
        encode_srgb: bool,
    ) -> Result<()> {
        self.prepare_environment(gpu, scene);

        for item in &draws.items {
            self.upload_node(gpu, scene, item.node);
            if let Some(path) = &item.texture {
                self.load_texture(gpu, path);
            }
            if !self.pipelines.contains_key(&item.key) {
                let pipeline = self.create_pipeline(gpu, item.key)?;
                self.pipelines.insert(item.key, pipeline);
            }
        }

        let uniforms = SceneUniforms::new(camera, &draws.lights, encode_srgb);
        gpu.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&uniforms));

        let needed = draws.len() as u64;
        if needed > self.model_capacity {
            self.model_capacity = needed.next_power_of_two();
            let (buffer, bind_group) =
                Self::create_model_buffer(gpu, &self.model_layout, self.model_capacity);
            self.model_buffer = buffer;
            self.model_bind_group = bind_group;
            log::debug!("model uniform capacity grown to {}", self.model_capacity);
        }

        if !draws.is_empty() {
            let mut bytes = vec![0u8; draws.len() * MODEL_STRIDE as usize];
            for (i, item) in draws.items.iter().enumerate() {
                let start = i * MODEL_STRIDE as usize;
                let model = bytemuck::bytes_of(&item.uniforms);
                bytes[start..start + model.len()].copy_from_slice(model);
            }
            gpu.queue.write_buffer(&self.model_buffer, 0, &bytes);
        }

        Ok(())
    }

    /// Records the scene into `target`, clearing it to `clear` first.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        depth: &DepthTarget,
        clear: wgpu::Color,
        draws: &DrawList,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.scene_bind_group, &[]);

        if let Some(skybox) = &self.skybox {
            render_pass.set_pipeline(&self.skybox_pipeline);
            render_pass.set_bind_group(1, skybox, &[]);
            render_pass.draw(0..3, 0..1);
        }

        for (i, item) in draws.items.iter().enumerate() {
            let (Some(pipeline), Some(resident)) =
                (self.pipelines.get(&item.key), self.resident.get(&item.node))
            else {
                continue;
            };

            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(1, &self.model_bind_group, &[(i as u64 * MODEL_STRIDE) as u32]);
            render_pass.set_bind_group(2, self.texture_for(item), &[]);

            match resident {
                Resident::Mesh(mesh) => {
                    render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    render_pass
                        .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(item.range.clone(), 0, 0..1);
                }
                Resident::Points(buffer) => {
                    render_pass.set_vertex_buffer(0, buffer.slice(..));
                    render_pass.draw(0..6, item.range.clone());
                }
            }
        }
    }

    fn texture_for(&self, item: &DrawItem) -> &wgpu::BindGroup {
        let fallback = match item.key.kind {
            DrawKind::Mesh => &self.white,
            DrawKind::Points => &self.soft_disc,
        };
        item.texture
            .as_ref()
            .and_then(|path| self.textures.get(path))
            .and_then(Option::as_ref)
            .unwrap_or(fallback)
    }

    fn upload_node(&mut self, gpu: &GpuContext, scene: &SceneGraph, id: NodeId) {
        if self.resident.contains_key(&id) {
            return;
        }
        let node = scene.node(id);
        let resident = match &node.payload {
            Some(Payload::Mesh(r)) => Resident::Mesh(r.geometry.upload(gpu, &node.name)),
            Some(Payload::Points(p)) => {
                use wgpu::util::DeviceExt;
                let positions: Vec<[f32; 3]> =
                    p.cloud.positions.iter().map(|v| v.to_array()).collect();
                Resident::Points(gpu.device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{} Points", node.name)),
                        contents: bytemuck::cast_slice(&positions),
                        usage: wgpu::BufferUsages::VERTEX,
                    },
                ))
            }
            _ => return,
        };
        log::debug!("uploaded '{}'", node.name);
        self.resident.insert(id, resident);
    }

    fn load_texture(&mut self, gpu: &GpuContext, path: &Path) {
        if self.textures.contains_key(path) {
            return;
        }
        let max = gpu.device.limits().max_texture_dimension_2d;
        let loaded = TextureData::load(path).and_then(|data| {
            data.check_size(max)?;
            Ok(data)
        });
        let bind_group = match loaded {
            Ok(data) => Some(texture_bind_group(
                gpu,
                &self.texture_layout,
                &Texture::from_data(gpu, &data),
            )),
            Err(err) => {
                log::warn!("{err}; drawing flat color instead");
                None
            }
        };
        self.textures.insert(path.to_path_buf(), bind_group);
    }

    fn prepare_environment(&mut self, gpu: &GpuContext, scene: &SceneGraph) {
        if self.environment == scene.environment {
            return;
        }
        self.environment = scene.environment.clone();
        let max = gpu.device.limits().max_texture_dimension_2d;
        self.skybox = self.environment.as_deref().and_then(|paths| {
            let loaded = CubeFaces::load(paths).and_then(|faces| {
                faces.check_size(max)?;
                Ok(faces)
            });
            match loaded {
                Ok(faces) => {
                    let cube = Texture::cube(gpu, &faces);
                    Some(texture_bind_group(gpu, &self.cube_layout, &cube))
                }
                Err(err) => {
                    log::warn!("{err}; no background");
                    None
                }
            }
        });
    }

    fn create_pipeline(&self, gpu: &GpuContext, key: PipelineKey) -> Result<wgpu::RenderPipeline> {
        let (label, module, buffers, cull_mode) = match key.kind {
            DrawKind::Mesh => (
                "Mesh Pipeline",
                &self.mesh_shader,
                [Vertex3d::LAYOUT],
                key.side.cull_mode(),
            ),
            DrawKind::Points => ("Points Pipeline", &self.points_shader, [POINT_LAYOUT], None),
        };
        log::debug!("creating {label} for {key:?}");

        gpu.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs"),
                buffers: &buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.format(),
                    blend: key.blending.state(key.transparent),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode,
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthTarget::FORMAT,
                depth_write_enabled: !key.is_blended(),
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

fn texture_bind_group_layout(
    gpu: &GpuContext,
    dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayout {
    gpu.device
        .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: dimension,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
}

fn texture_bind_group(
    gpu: &GpuContext,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
) -> wgpu::BindGroup {
    gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Texture Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}
