#![allow(dead_code)]

use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

use cgmath::{Matrix4, SquareMatrix, Vector2, Vector3, Vector4};
use desk_scene::{
    render::{MeshKind, MeshLibrary},
    resources::texture::TextureBackend,
    shader::{MaterialField, ShaderProgram, Uniform, UniformValue},
};
use image::RgbaImage;

/// One call a [`RecordingRenderer`] received.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Uniform(Uniform, UniformValue),
    LoadMesh(MeshKind),
    DrawMesh(MeshKind),
    CreateTexture { label: String, width: u32, height: u32 },
    BindTexture { slot: usize, handle: u32 },
    DestroyTexture(u32),
}

/// Shared call log. Outlives the renderer, so drops can be observed.
#[derive(Clone, Debug, Default)]
pub(crate) struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub(crate) fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub(crate) fn uniforms(&self) -> Vec<(Uniform, UniformValue)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Uniform(uniform, value) => Some((*uniform, *value)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn draws(&self) -> Vec<MeshKind> {
        self.0
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::DrawMesh(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn destroyed(&self) -> Vec<u32> {
        self.0
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::DestroyTexture(handle) => Some(*handle),
                _ => None,
            })
            .collect()
    }

    /// Replays the log and captures the shader state at every draw.
    pub(crate) fn snapshots(&self) -> Vec<DrawSnapshot> {
        let mut state = DrawSnapshot::default();
        let mut snapshots = Vec::new();
        for call in self.0.borrow().iter() {
            match call {
                Call::Uniform(uniform, value) => state.apply(*uniform, *value),
                Call::DrawMesh(kind) => {
                    state.mesh = Some(*kind);
                    snapshots.push(state.clone());
                }
                _ => {}
            }
        }
        snapshots
    }

    fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }
}

/// Shader state as seen by one draw.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DrawSnapshot {
    pub(crate) mesh: Option<MeshKind>,
    pub(crate) model: Matrix4<f32>,
    pub(crate) use_texture: Option<bool>,
    pub(crate) sampler: Option<i32>,
    pub(crate) object_color: Option<Vector4<f32>>,
    pub(crate) ambient_color: Option<Vector3<f32>>,
    pub(crate) ambient_strength: Option<f32>,
    pub(crate) diffuse_color: Option<Vector3<f32>>,
    pub(crate) specular_color: Option<Vector3<f32>>,
    pub(crate) shininess: Option<f32>,
    pub(crate) uv_scale: Option<Vector2<f32>>,
}

impl Default for DrawSnapshot {
    fn default() -> Self {
        Self {
            mesh: None,
            model: Matrix4::identity(),
            use_texture: None,
            sampler: None,
            object_color: None,
            ambient_color: None,
            ambient_strength: None,
            diffuse_color: None,
            specular_color: None,
            shininess: None,
            uv_scale: None,
        }
    }
}

impl DrawSnapshot {
    fn apply(&mut self, uniform: Uniform, value: UniformValue) {
        match (uniform, value) {
            (Uniform::Model, UniformValue::Mat4(m)) => self.model = m,
            (Uniform::UseTexture, UniformValue::Bool(b)) => self.use_texture = Some(b),
            (Uniform::ObjectTexture, UniformValue::Sampler(s)) => self.sampler = Some(s),
            (Uniform::ObjectColor, UniformValue::Vec4(v)) => self.object_color = Some(v),
            (Uniform::UvScale, UniformValue::Vec2(v)) => self.uv_scale = Some(v),
            (Uniform::Material(MaterialField::AmbientColor), UniformValue::Vec3(v)) => {
                self.ambient_color = Some(v)
            }
            (Uniform::Material(MaterialField::AmbientStrength), UniformValue::Float(f)) => {
                self.ambient_strength = Some(f)
            }
            (Uniform::Material(MaterialField::DiffuseColor), UniformValue::Vec3(v)) => {
                self.diffuse_color = Some(v)
            }
            (Uniform::Material(MaterialField::SpecularColor), UniformValue::Vec3(v)) => {
                self.specular_color = Some(v)
            }
            (Uniform::Material(MaterialField::Shininess), UniformValue::Float(f)) => {
                self.shininess = Some(f)
            }
            _ => {}
        }
    }
}

/// Renderer double that records every call and hands out `u32` texture handles.
#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    log: CallLog,
    next_handle: u32,
}

impl RecordingRenderer {
    pub(crate) fn new() -> (Self, CallLog) {
        let renderer = Self::default();
        let log = renderer.log.clone();
        (renderer, log)
    }
}

impl ShaderProgram for RecordingRenderer {
    fn set_uniform(&mut self, uniform: Uniform, value: UniformValue) {
        self.log.push(Call::Uniform(uniform, value));
    }
}

impl MeshLibrary for RecordingRenderer {
    fn load_mesh(&mut self, kind: MeshKind) {
        self.log.push(Call::LoadMesh(kind));
    }

    fn draw_mesh(&mut self, kind: MeshKind) {
        self.log.push(Call::DrawMesh(kind));
    }
}

impl TextureBackend for RecordingRenderer {
    type Texture = u32;

    fn create_texture(&mut self, label: &str, image: &RgbaImage) -> u32 {
        self.log.push(Call::CreateTexture {
            label: label.to_string(),
            width: image.width(),
            height: image.height(),
        });
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn bind_texture(&mut self, slot: usize, texture: &u32) {
        self.log.push(Call::BindTexture {
            slot,
            handle: *texture,
        });
    }

    fn destroy_texture(&mut self, texture: u32) {
        self.log.push(Call::DestroyTexture(texture));
    }
}

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Fresh directory under the system temp dir, unique per test.
pub(crate) fn scratch_dir(name: &str) -> PathBuf {
    let n = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "desk-scene-{}-{}-{}",
        name,
        std::process::id(),
        n
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn prepare_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create image dir");
    }
}

/// RGB image whose top row is red and every other row blue.
pub(crate) fn write_rgb(path: &Path, width: u32, height: u32) {
    prepare_parent(path);
    let img = image::RgbImage::from_fn(width, height, |_, y| {
        if y == 0 {
            image::Rgb([255, 0, 0])
        } else {
            image::Rgb([0, 0, 255])
        }
    });
    img.save(path).expect("write rgb image");
}

pub(crate) fn write_rgba(path: &Path, width: u32, height: u32) {
    prepare_parent(path);
    let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 128]));
    img.save(path).expect("write rgba image");
}

pub(crate) fn write_gray(path: &Path, width: u32, height: u32) {
    prepare_parent(path);
    let img = image::GrayImage::from_pixel(width, height, image::Luma([90]));
    img.save(path).expect("write gray image");
}

pub(crate) fn write_gray_alpha(path: &Path, width: u32, height: u32) {
    prepare_parent(path);
    let img = image::GrayAlphaImage::from_pixel(width, height, image::LumaA([90, 200]));
    img.save(path).expect("write gray alpha image");
}

pub(crate) fn write_garbage(path: &Path) {
    prepare_parent(path);
    std::fs::write(path, b"definitely not a png").expect("write garbage file");
}

/// Runs an async GPU test body against a fresh headless context.
#[cfg(feature = "integration-tests")]
#[macro_export]
macro_rules! headless_test {
    ($width:expr, $height:expr, $body:expr) => {{
        desk_scene::init_logging();
        let ctx = futures::executor::block_on(desk_scene::context::Context::headless(
            $width, $height,
        ))
        .expect("Failed to create a headless context for integration test.");
        futures::executor::block_on($body(ctx));
    }};
}
