//! Scene description and the binder that pushes it to a renderer.
//!
//! [`Scene`] is plain data: materials, lights, texture files, the meshes to load
//! and the ordered draw list. [`SceneBinder`] owns a [`Renderer`] together with
//! the texture registry, material table and light rig, and drives them through
//! a two-phase lifecycle:
//!
//! 1. [`SceneBinder::prepare_scene`] once: materials, lights, textures, meshes
//! 2. [`SceneBinder::render_scene`] every frame: for each draw call set the
//!    transform, surface, material and UV scale, then draw
//!
//! Missing textures and materials never abort a frame. They are logged and the
//! object is drawn with whatever state the shader already holds.

use std::path::PathBuf;

use cgmath::{Vector2, Vector4};

use crate::{
    config::SceneConfig,
    data_structures::{
        material::{Material, MaterialTable},
        transform::Transform,
    },
    pipelines::light::{LightRig, LightSource},
    render::{DrawCall, MeshKind, Renderer, Surface},
    resources::{
        asset_path,
        texture::{TextureBackend, TextureRegistry},
    },
    shader::{MaterialField, Uniform},
};

/// An image file to load and the tag it is registered under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureSource {
    pub file: PathBuf,
    pub tag: String,
}

impl TextureSource {
    pub fn new(file: impl Into<PathBuf>, tag: &str) -> Self {
        Self {
            file: file.into(),
            tag: tag.to_string(),
        }
    }
}

/// Everything needed to prepare and render one static scene.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub materials: Vec<Material>,
    /// Lights in shader slot order.
    pub lights: Vec<LightSource>,
    pub textures: Vec<TextureSource>,
    pub meshes: Vec<MeshKind>,
    pub draws: Vec<DrawCall>,
}

impl Scene {
    /// The desk monitor setup: a wooden desk against a dark wall, a monitor on a
    /// stand, a mini PC, a console and a drink can.
    pub fn desk() -> Self {
        let materials = vec![
            Material::new("cement", [0.2, 0.2, 0.2], 0.2, [0.5, 0.5, 0.5], [0.4, 0.4, 0.4], 0.5),
            Material::new("glass", [0.4, 0.4, 0.4], 0.3, [0.3, 0.3, 0.3], [0.6, 0.6, 0.6], 90.0),
            Material::new("clay", [0.2, 0.2, 0.3], 0.3, [0.4, 0.4, 0.5], [0.2, 0.2, 0.4], 0.5),
        ];

        let lights = vec![
            // warm sunlight from a window front-left, above the desk
            LightSource::tinted([-5.0, 10.0, 5.0], [0.5, -1.0, -0.5], [1.5, 1.4, 0.9]),
            // cool fill from the right
            LightSource::tinted([5.0, 10.0, 5.0], [-0.5, -1.0, -0.5], [0.2, 0.6, 1.0]),
        ];

        let textures = vec![
            TextureSource::new("textures/static3.jpg", "static"),
            TextureSource::new("textures/blackxbox4.jpg", "xbox"),
            TextureSource::new("textures/monster2.jpg", "monster"),
            TextureSource::new("textures/rusticwood.jpg", "rusticwood"),
            TextureSource::new("textures/blackwall.jpg", "wall"),
            TextureSource::new("textures/stainless.jpg", "stainless"),
        ];

        let draws = vec![
            DrawCall::new(
                "desk",
                MeshKind::Plane,
                Transform::new([20.0, 0.0, 10.0], [0.0, 0.0, 0.0], [0.0, 0.0, -10.0]),
            )
            .textured("rusticwood")
            .with_material("clay"),
            DrawCall::new(
                "wall",
                MeshKind::Plane,
                Transform::new([20.0, 0.0, 8.0], [90.0, 0.0, 0.0], [0.0, 8.0, -10.0]),
            )
            .textured("wall")
            .with_material("cement"),
            DrawCall::new(
                "screen",
                MeshKind::Box,
                Transform::new([9.0, 4.0, 1.0], [0.0, 0.0, 0.0], [0.0, 4.5, -9.0]),
            )
            .textured("static"),
            DrawCall::new(
                "mini pc",
                MeshKind::Box,
                Transform::new([2.0, 1.0, 1.0], [0.0, 0.0, 0.0], [4.0, 0.5, -7.0]),
            )
            .textured("stainless"),
            DrawCall::new(
                "console",
                MeshKind::Box,
                Transform::new([2.0, 5.0, 1.0], [180.0, 0.0, 0.0], [-7.0, 0.5, -8.0]),
            )
            .textured("xbox"),
            DrawCall::new(
                "bezel",
                MeshKind::Box,
                Transform::new([10.0, 5.0, 1.0], [0.0, 0.0, 0.0], [0.0, 4.5, -9.0]),
            )
            .colored([0.0, 0.0, 0.0, 1.0]),
            DrawCall::new(
                "stand neck",
                MeshKind::TaperedCylinder,
                Transform::new([0.7, 2.0, 0.2], [-10.0, 0.0, 0.0], [0.0, 0.0, -9.0]),
            )
            .textured("wall")
            .with_material("cement"),
            DrawCall::new(
                "stand foot left",
                MeshKind::Prism,
                Transform::new([6.0, 0.8, 0.3], [0.0, 130.0, 0.0], [0.1, 0.4, -9.5]),
            )
            .textured("wall")
            .with_material("cement"),
            DrawCall::new(
                "stand foot right",
                MeshKind::Prism,
                Transform::new([6.0, 0.8, 0.3], [0.0, -130.0, 0.0], [-0.1, 0.4, -9.5]),
            )
            .textured("wall")
            .with_material("cement"),
            DrawCall::new(
                "can",
                MeshKind::Cylinder,
                Transform::new([0.5, 1.8, 0.5], [-1.0, 90.0, 0.0], [-4.7, 0.0, -6.0]),
            )
            .textured("monster")
            .with_material("glass"),
        ];

        Self {
            materials,
            lights,
            textures,
            meshes: MeshKind::ALL.to_vec(),
            draws,
        }
    }
}

/// Binds a [`Scene`] to a [`Renderer`].
///
/// The binder exclusively owns every texture it loads and frees them in
/// [`release`](Self::release), which also runs on drop.
pub struct SceneBinder<R: Renderer> {
    renderer: R,
    scene: Scene,
    config: SceneConfig,
    textures: TextureRegistry<<R as TextureBackend>::Texture>,
    materials: MaterialTable,
    lights: LightRig,
    prepared: bool,
}

impl<R: Renderer> SceneBinder<R> {
    pub fn new(renderer: R, scene: Scene, config: SceneConfig) -> Self {
        let textures = TextureRegistry::new(config.flip_vertically);
        Self {
            renderer,
            scene,
            config,
            textures,
            materials: MaterialTable::new(),
            lights: LightRig::new(),
            prepared: false,
        }
    }

    /// Load everything the scene needs. Runs once; later calls are ignored.
    ///
    /// Textures that fail to load are logged and left out of the registry. Draws
    /// referring to them later sample an invalid slot instead of failing.
    pub fn prepare_scene(&mut self) {
        if self.prepared {
            log::warn!("Scene is already prepared, ignoring repeated preparation");
            return;
        }

        for material in &self.scene.materials {
            self.materials.define(material.clone());
        }

        self.lights.set_lighting(&mut self.renderer, true);
        for (slot, light) in self.scene.lights.iter().enumerate() {
            if let Err(e) = self.lights.configure(&mut self.renderer, slot, *light) {
                log::warn!("Skipping light: {}", e);
            }
        }

        for source in &self.scene.textures {
            let path = asset_path(&self.config.asset_root, &source.file);
            match self.textures.load(&mut self.renderer, &path, &source.tag) {
                Ok(slot) => log::debug!("Texture '{}' registered in slot {}", source.tag, slot),
                Err(e) => log::error!("Texture '{}' unavailable: {}", source.tag, e),
            }
        }
        self.textures.bind_all(&mut self.renderer);

        self.set_uv_scale(1.0, 1.0);

        for kind in &self.scene.meshes {
            self.renderer.load_mesh(*kind);
        }

        self.prepared = true;
        log::info!(
            "Scene prepared: {} materials, {} lights, {} textures, {} draw calls",
            self.materials.len(),
            self.lights.len(),
            self.textures.len(),
            self.scene.draws.len()
        );
    }

    /// Issue every draw call of the scene in order.
    pub fn render_scene(&mut self) {
        if !self.prepared {
            log::warn!("render_scene called before prepare_scene, nothing drawn");
            return;
        }
        // Draw calls are borrowed from the scene while the binder writes uniforms.
        let draws = std::mem::take(&mut self.scene.draws);
        for call in &draws {
            self.draw(call);
        }
        self.scene.draws = draws;
    }

    /// Bind one record's state and draw it.
    pub fn draw(&mut self, call: &DrawCall) {
        log::trace!("Drawing {} ({})", call.label, call.mesh);
        self.set_transform(&call.transform);
        match &call.surface {
            Surface::Keep => {}
            Surface::Color(rgba) => self.set_color_override(*rgba),
            Surface::Texture(tag) => self.set_texture(tag),
        }
        if let Some(tag) = &call.material {
            self.set_material(tag);
        }
        if let Some((u, v)) = call.uv_scale {
            self.set_uv_scale(u, v);
        }
        self.renderer.draw_mesh(call.mesh);
    }

    pub fn set_transform(&mut self, transform: &Transform) {
        self.renderer.set_mat4(Uniform::Model, transform.to_matrix());
    }

    /// Paint with a flat colour. Texturing stays off until the next [`set_texture`](Self::set_texture).
    pub fn set_color_override(&mut self, rgba: Vector4<f32>) {
        self.renderer.set_bool(Uniform::UseTexture, false);
        self.renderer.set_vec4(Uniform::ObjectColor, rgba);
    }

    /// Sample the texture registered under `tag`.
    ///
    /// An unknown tag still turns texturing on and points the sampler at slot
    /// `-1`; the renderer decides what an invalid slot looks like.
    pub fn set_texture(&mut self, tag: &str) {
        self.renderer.set_bool(Uniform::UseTexture, true);
        let slot = match self.textures.find_slot(tag) {
            Some(slot) => slot as i32,
            None => {
                log::warn!("No texture registered under '{}', sampling slot -1", tag);
                -1
            }
        };
        self.renderer.set_sampler2d(Uniform::ObjectTexture, slot);
    }

    /// Push the material registered under `tag`.
    ///
    /// Returns false and writes nothing when the tag is unknown, so the previous
    /// material stays in effect.
    pub fn set_material(&mut self, tag: &str) -> bool {
        let Some(material) = self.materials.find(tag) else {
            log::warn!("No material defined under '{}', keeping the previous one", tag);
            return false;
        };
        let shader = &mut self.renderer;
        shader.set_vec3(Uniform::Material(MaterialField::AmbientColor), material.ambient_color);
        shader.set_float(
            Uniform::Material(MaterialField::AmbientStrength),
            material.ambient_strength,
        );
        shader.set_vec3(Uniform::Material(MaterialField::DiffuseColor), material.diffuse_color);
        shader.set_vec3(Uniform::Material(MaterialField::SpecularColor), material.specular_color);
        shader.set_float(Uniform::Material(MaterialField::Shininess), material.shininess);
        true
    }

    pub fn set_uv_scale(&mut self, u: f32, v: f32) {
        self.renderer.set_vec2(Uniform::UvScale, Vector2::new(u, v));
    }

    /// Free every loaded texture. Safe to call more than once.
    pub fn release(&mut self) {
        self.textures.release_all(&mut self.renderer);
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn textures(&self) -> &TextureRegistry<<R as TextureBackend>::Texture> {
        &self.textures
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access for the frame loop, e.g. to write view/projection uniforms.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

impl<R: Renderer> Drop for SceneBinder<R> {
    fn drop(&mut self) {
        self.release();
    }
}
