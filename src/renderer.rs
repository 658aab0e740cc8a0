//! wgpu implementation of the [`Renderer`](crate::render::Renderer) seams.
//!
//! The scene binder works like an immediate-mode API: it writes uniforms and then
//! asks for a draw. [`WgpuRenderer`] stages those writes in CPU-side uniform
//! structs, snapshots the per-object block on every `draw_mesh`, and replays the
//! recorded draws in a single render pass when [`WgpuRenderer::render`] is called.
//! Per-object blocks live in one uniform buffer addressed with dynamic offsets.

use std::{
    collections::{HashMap, HashSet},
    iter,
    num::NonZeroU64,
};

use cgmath::{Matrix4, Vector3};
use image::RgbaImage;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{model::Mesh, texture::Texture},
    pipelines::{
        basic::{globals_layout, mk_scene_pipeline, object_layout, texture_layout},
        light::{LightUniform, MAX_LIGHTS},
    },
    render::{MeshKind, MeshLibrary},
    resources::texture::{MAX_TEXTURE_SLOTS, TextureBackend},
    shader::{LightField, MaterialField, ShaderProgram, Uniform, UniformValue},
};

/// Queue length at which unflushed draws start being reported.
pub const PENDING_DRAW_WARN_LIMIT: usize = 4096;

/// Uniforms shared by every draw of a frame.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_position: [f32; 3],
    pub use_lighting: u32,
    pub lights: [LightUniform; MAX_LIGHTS],
}

/// Uniforms of a single draw.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    // mat3x3 columns are padded to vec4 in WGSL
    pub normal: [[f32; 4]; 3],
    pub object_color: [f32; 4],
    pub uv_scale: [f32; 2],
    pub use_texture: u32,
    pub _padding: u32,
    pub ambient_color: [f32; 3],
    pub ambient_strength: f32,
    pub diffuse_color: [f32; 3],
    pub shininess: f32,
    pub specular_color: [f32; 3],
    pub _padding2: u32,
}

impl Default for GlobalUniform {
    fn default() -> Self {
        let identity: [[f32; 4]; 4] = Matrix4::from_scale(1.0).into();
        Self {
            view: identity,
            projection: identity,
            ..bytemuck::Zeroable::zeroed()
        }
    }
}

impl Default for ObjectUniform {
    fn default() -> Self {
        let mut object = Self {
            object_color: [1.0; 4],
            uv_scale: [1.0; 2],
            ..bytemuck::Zeroable::zeroed()
        };
        object.set_model(Matrix4::from_scale(1.0));
        object
    }
}

impl ObjectUniform {
    fn set_model(&mut self, model: Matrix4<f32>) {
        self.model = model.into();
        self.normal = normal_matrix(&model);
    }
}

/// Columns of the cofactor matrix of the model's upper 3x3.
///
/// Proportional to the inverse transpose, but still defined for flattened
/// objects with a zero scale axis. The shader normalizes the result.
fn normal_matrix(model: &Matrix4<f32>) -> [[f32; 4]; 3] {
    let a = model.x.truncate();
    let b = model.y.truncate();
    let c = model.z.truncate();
    let pad = |v: Vector3<f32>| [v.x, v.y, v.z, 0.0];
    [pad(b.cross(c)), pad(c.cross(a)), pad(a.cross(b))]
}

struct SlotBinding {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct PendingDraw {
    mesh: MeshKind,
    object: ObjectUniform,
    slot: Option<usize>,
}

pub struct WgpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    globals: GlobalUniform,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    object: ObjectUniform,
    sampler_slot: i32,
    object_layout: wgpu::BindGroupLayout,
    object_stride: u64,
    object_capacity: usize,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    slots: Vec<Option<SlotBinding>>,
    fallback: wgpu::BindGroup,
    meshes: HashMap<MeshKind, Mesh>,
    loaded: HashSet<MeshKind>,
    pending: Vec<PendingDraw>,
}

impl WgpuRenderer {
    const INITIAL_OBJECT_CAPACITY: usize = 16;

    /// `color_format` must match the render target later passed to [`render`](Self::render).
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, color_format: wgpu::TextureFormat) -> Self {
        let object_size = std::mem::size_of::<ObjectUniform>() as u64;
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let object_stride = object_size.div_ceil(alignment) * alignment;

        let globals_layout = globals_layout(device);
        let object_layout = object_layout(device, object_size);
        let texture_layout = texture_layout(device);
        let pipeline = mk_scene_pipeline(
            device,
            color_format,
            &globals_layout,
            &object_layout,
            &texture_layout,
        );

        let globals = GlobalUniform::default();
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Globals Buffer"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
            label: Some("scene_globals_bind_group"),
        });

        let (object_buffer, object_bind_group) = mk_object_buffer(
            device,
            &object_layout,
            object_stride,
            Self::INITIAL_OBJECT_CAPACITY,
        );

        let white = Texture::create_solid(device, queue, [255; 4], "fallback texture");
        let fallback = mk_texture_bind_group(device, &texture_layout, &white);

        Self {
            device: device.clone(),
            queue: queue.clone(),
            pipeline,
            globals,
            globals_buffer,
            globals_bind_group,
            object: ObjectUniform::default(),
            sampler_slot: 0,
            object_layout,
            object_stride,
            object_capacity: Self::INITIAL_OBJECT_CAPACITY,
            object_buffer,
            object_bind_group,
            texture_layout,
            slots: (0..MAX_TEXTURE_SLOTS).map(|_| None).collect(),
            fallback,
            meshes: HashMap::new(),
            loaded: HashSet::new(),
            pending: Vec::new(),
        }
    }

    /// Supply the geometry drawn for `kind`. Replaces any earlier mesh of that kind.
    pub fn insert_mesh(&mut self, kind: MeshKind, mesh: Mesh) {
        self.meshes.insert(kind, mesh);
    }

    pub fn globals(&self) -> &GlobalUniform {
        &self.globals
    }

    /// Number of draws recorded since the last [`render`](Self::render).
    pub fn pending_draws(&self) -> usize {
        self.pending.len()
    }

    /// Replay the recorded draws into `target` and submit them.
    ///
    /// Drains the draw queue. Call once per frame after recording, otherwise
    /// the queue keeps growing. Returns the number of draws encoded.
    pub fn render(
        &mut self,
        target: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        clear_colour: wgpu::Color,
    ) -> usize {
        let draws = std::mem::take(&mut self.pending);

        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&self.globals));
        self.reserve_objects(draws.len());
        if !draws.is_empty() {
            let stride = self.object_stride as usize;
            let mut data = vec![0u8; stride * draws.len()];
            for (i, draw) in draws.iter().enumerate() {
                let bytes = bytemuck::bytes_of(&draw.object);
                data[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
            }
            self.queue.write_buffer(&self.object_buffer, 0, &data);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Render Encoder"),
            });
        let mut encoded = 0;
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for (i, draw) in draws.iter().enumerate() {
                let Some(mesh) = self.meshes.get(&draw.mesh) else {
                    continue;
                };
                let texture_group = draw
                    .slot
                    .and_then(|slot| self.slots[slot].as_ref())
                    .map_or(&self.fallback, |binding| &binding.bind_group);
                let offset = (i as u64 * self.object_stride) as u32;
                render_pass.set_bind_group(1, &self.object_bind_group, &[offset]);
                render_pass.set_bind_group(2, texture_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.num_elements, 0, 0..1);
                encoded += 1;
            }
        }
        self.queue.submit(iter::once(encoder.finish()));
        encoded
    }

    fn reserve_objects(&mut self, count: usize) {
        if count <= self.object_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        log::debug!("Growing object uniform buffer to {} draws", capacity);
        let (buffer, bind_group) =
            mk_object_buffer(&self.device, &self.object_layout, self.object_stride, capacity);
        self.object_buffer = buffer;
        self.object_bind_group = bind_group;
        self.object_capacity = capacity;
    }

    /// Slot sampled by the next draw, if texturing is on and the slot holds a texture.
    fn active_slot(&self) -> Option<usize> {
        if self.object.use_texture == 0 {
            return None;
        }
        let slot = usize::try_from(self.sampler_slot).ok()?;
        match self.slots.get(slot) {
            Some(Some(_)) => Some(slot),
            _ => {
                log::debug!("Sampler slot {} holds no texture, using fallback", self.sampler_slot);
                None
            }
        }
    }

    fn set_material_field(&mut self, field: MaterialField, value: UniformValue) -> bool {
        let object = &mut self.object;
        match (field, value) {
            (MaterialField::AmbientColor, UniformValue::Vec3(v)) => object.ambient_color = v.into(),
            (MaterialField::AmbientStrength, UniformValue::Float(f)) => object.ambient_strength = f,
            (MaterialField::DiffuseColor, UniformValue::Vec3(v)) => object.diffuse_color = v.into(),
            (MaterialField::SpecularColor, UniformValue::Vec3(v)) => object.specular_color = v.into(),
            (MaterialField::Shininess, UniformValue::Float(f)) => object.shininess = f,
            _ => return false,
        }
        true
    }

    fn set_light_field(&mut self, slot: usize, field: LightField, value: UniformValue) -> bool {
        let Some(light) = self.globals.lights.get_mut(slot) else {
            return false;
        };
        match (field, value) {
            (LightField::Position, UniformValue::Vec3(v)) => light.position = v.into(),
            (LightField::Direction, UniformValue::Vec3(v)) => light.direction = v.into(),
            (LightField::AmbientColor, UniformValue::Vec3(v)) => light.ambient_color = v.into(),
            (LightField::DiffuseColor, UniformValue::Vec3(v)) => light.diffuse_color = v.into(),
            (LightField::SpecularColor, UniformValue::Vec3(v)) => light.specular_color = v.into(),
            (LightField::FocalStrength, UniformValue::Float(f)) => light.focal_strength = f,
            (LightField::SpecularIntensity, UniformValue::Float(f)) => light.specular_intensity = f,
            _ => return false,
        }
        true
    }
}

impl ShaderProgram for WgpuRenderer {
    fn set_uniform(&mut self, uniform: Uniform, value: UniformValue) {
        let accepted = match (uniform, value) {
            (Uniform::Model, UniformValue::Mat4(m)) => {
                self.object.set_model(m);
                true
            }
            (Uniform::View, UniformValue::Mat4(m)) => {
                self.globals.view = m.into();
                true
            }
            (Uniform::Projection, UniformValue::Mat4(m)) => {
                self.globals.projection = m.into();
                true
            }
            (Uniform::ViewPosition, UniformValue::Vec3(v)) => {
                self.globals.view_position = v.into();
                true
            }
            (Uniform::ObjectColor, UniformValue::Vec4(v)) => {
                self.object.object_color = v.into();
                true
            }
            (Uniform::ObjectTexture, UniformValue::Sampler(slot) | UniformValue::Int(slot)) => {
                self.sampler_slot = slot;
                true
            }
            (Uniform::UseTexture, UniformValue::Bool(on)) => {
                self.object.use_texture = u32::from(on);
                true
            }
            (Uniform::UseTexture, UniformValue::Int(on)) => {
                self.object.use_texture = u32::from(on != 0);
                true
            }
            (Uniform::UseLighting, UniformValue::Bool(on)) => {
                self.globals.use_lighting = u32::from(on);
                true
            }
            (Uniform::UseLighting, UniformValue::Int(on)) => {
                self.globals.use_lighting = u32::from(on != 0);
                true
            }
            (Uniform::UvScale, UniformValue::Vec2(v)) => {
                self.object.uv_scale = v.into();
                true
            }
            (Uniform::Material(field), value) => self.set_material_field(field, value),
            (Uniform::Light(slot, field), value) => self.set_light_field(slot, field, value),
            _ => false,
        };
        if !accepted {
            log::warn!("Ignoring write of {:?} to uniform {}", value, uniform);
        }
    }
}

impl MeshLibrary for WgpuRenderer {
    fn load_mesh(&mut self, kind: MeshKind) {
        if self.meshes.contains_key(&kind) {
            self.loaded.insert(kind);
        } else {
            log::warn!("No geometry supplied for the {} mesh, draws of it are skipped", kind);
        }
    }

    /// Records the draw; nothing reaches the GPU until [`WgpuRenderer::render`]
    /// drains the queue, so every frame must be flushed.
    fn draw_mesh(&mut self, kind: MeshKind) {
        if !self.loaded.contains(&kind) {
            log::warn!("The {} mesh is not loaded, skipping draw", kind);
            return;
        }
        let slot = self.active_slot();
        self.pending.push(PendingDraw {
            mesh: kind,
            object: self.object,
            slot,
        });
        if self.pending.len() % PENDING_DRAW_WARN_LIMIT == 0 {
            log::warn!(
                "{} draws recorded without a render, frames are not being flushed",
                self.pending.len()
            );
        }
    }
}

impl TextureBackend for WgpuRenderer {
    type Texture = Texture;

    fn create_texture(&mut self, label: &str, image: &RgbaImage) -> Texture {
        Texture::from_image(&self.device, &self.queue, image, label)
    }

    fn bind_texture(&mut self, slot: usize, texture: &Texture) {
        if slot >= self.slots.len() {
            log::warn!("Texture slot {} is out of range, not binding", slot);
            return;
        }
        let bind_group = mk_texture_bind_group(&self.device, &self.texture_layout, texture);
        self.slots[slot] = Some(SlotBinding {
            texture: texture.texture.clone(),
            bind_group,
        });
    }

    fn destroy_texture(&mut self, texture: Texture) {
        for slot in self.slots.iter_mut() {
            if slot
                .as_ref()
                .is_some_and(|binding| binding.texture == texture.texture)
            {
                *slot = None;
            }
        }
        texture.texture.destroy();
    }
}

fn mk_object_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Object Buffer"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<ObjectUniform>() as u64),
            }),
        }],
        label: Some("scene_object_bind_group"),
    });
    (buffer, bind_group)
}

fn mk_texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
) -> wgpu::BindGroup {
    let default_sampler;
    let sampler = match &texture.sampler {
        Some(sampler) => sampler,
        None => {
            default_sampler = crate::data_structures::texture::create_default_sampler(device);
            &default_sampler
        }
    };
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some("scene_texture_bind_group"),
    })
}
