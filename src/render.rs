//! Draw call records and the renderer seams they are issued against.
//!
//! A scene is a list of [`DrawCall`]s. Each record says which primitive to draw,
//! where to put it and what to paint it with; [`crate::scene::SceneBinder`]
//! turns every record into uniform writes followed by one mesh draw.
//!
//! # Key types
//!
//! - [`MeshKind`] names one of the primitive shapes every renderer provides
//! - [`MeshLibrary`] loads and draws those shapes
//! - [`Renderer`] bundles the shader, mesh and texture seams into one bound
//! - [`DrawCall`] / [`Surface`] describe one object of the scene
//!

use std::fmt;

use cgmath::Vector4;

use crate::{data_structures::transform::Transform, resources::texture::TextureBackend, shader::ShaderProgram};

/// The catalog of primitive shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKind {
    Plane,
    Box,
    TaperedCylinder,
    Prism,
    Cylinder,
}

impl MeshKind {
    pub const ALL: [MeshKind; 5] = [
        MeshKind::Plane,
        MeshKind::Box,
        MeshKind::TaperedCylinder,
        MeshKind::Prism,
        MeshKind::Cylinder,
    ];
}

impl fmt::Display for MeshKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeshKind::Plane => "plane",
            MeshKind::Box => "box",
            MeshKind::TaperedCylinder => "tapered cylinder",
            MeshKind::Prism => "prism",
            MeshKind::Cylinder => "cylinder",
        };
        f.write_str(name)
    }
}

/// Primitive meshes, loaded once and drawn many times.
///
/// `draw_mesh` uses whatever uniforms were last written to the shader.
pub trait MeshLibrary {
    fn load_mesh(&mut self, kind: MeshKind);
    fn draw_mesh(&mut self, kind: MeshKind);
}

/// Everything the scene binder needs from a graphics backend.
pub trait Renderer: ShaderProgram + MeshLibrary + TextureBackend {}

impl<T> Renderer for T where T: ShaderProgram + MeshLibrary + TextureBackend {}

/// What the object is painted with.
#[derive(Clone, Debug, PartialEq)]
pub enum Surface {
    /// Leave the colour/texture state of the previous draw in place.
    Keep,
    /// Flat RGBA colour; turns texturing off until the next textured draw.
    Color(Vector4<f32>),
    /// Texture registered under this tag.
    Texture(String),
}

/// One object of the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    /// Human-readable name, only used in logs.
    pub label: String,
    pub mesh: MeshKind,
    pub transform: Transform,
    pub surface: Surface,
    /// Material tag. `None` keeps the material of the previous draw.
    pub material: Option<String>,
    /// Texture tiling. `None` keeps the previous scale.
    pub uv_scale: Option<(f32, f32)>,
}

impl DrawCall {
    pub fn new(label: &str, mesh: MeshKind, transform: Transform) -> Self {
        Self {
            label: label.to_string(),
            mesh,
            transform,
            surface: Surface::Keep,
            material: None,
            uv_scale: None,
        }
    }

    pub fn textured(mut self, tag: &str) -> Self {
        self.surface = Surface::Texture(tag.to_string());
        self
    }

    pub fn colored(mut self, rgba: impl Into<Vector4<f32>>) -> Self {
        self.surface = Surface::Color(rgba.into());
        self
    }

    pub fn with_material(mut self, tag: &str) -> Self {
        self.material = Some(tag.to_string());
        self
    }

    pub fn with_uv_scale(mut self, u: f32, v: f32) -> Self {
        self.uv_scale = Some((u, v));
        self
    }
}
