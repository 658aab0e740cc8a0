//! Shader uniform interface.
//!
//! Every component of the binding layer talks to the active shader through
//! [`ShaderProgram`], a write-only sink of named uniform values. Names are typed
//! ([`Uniform`]) so a typo becomes a compile error instead of a silently ignored
//! write, while [`std::fmt::Display`] still renders the flat shader-side name
//! (e.g. `lights[1].diffuse_color`) for logs.

use std::fmt;

use cgmath::{Matrix4, Vector2, Vector3, Vector4};

/// Field of the `material` uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialField {
    AmbientColor,
    AmbientStrength,
    DiffuseColor,
    SpecularColor,
    Shininess,
}

impl MaterialField {
    fn name(self) -> &'static str {
        match self {
            MaterialField::AmbientColor => "ambient_color",
            MaterialField::AmbientStrength => "ambient_strength",
            MaterialField::DiffuseColor => "diffuse_color",
            MaterialField::SpecularColor => "specular_color",
            MaterialField::Shininess => "shininess",
        }
    }
}

/// Field of one entry of the `lights` uniform array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightField {
    Position,
    Direction,
    AmbientColor,
    DiffuseColor,
    SpecularColor,
    FocalStrength,
    SpecularIntensity,
}

impl LightField {
    fn name(self) -> &'static str {
        match self {
            LightField::Position => "position",
            LightField::Direction => "direction",
            LightField::AmbientColor => "ambient_color",
            LightField::DiffuseColor => "diffuse_color",
            LightField::SpecularColor => "specular_color",
            LightField::FocalStrength => "focal_strength",
            LightField::SpecularIntensity => "specular_intensity",
        }
    }
}

/// A named uniform of the scene shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uniform {
    /// Model matrix of the next draw.
    Model,
    View,
    Projection,
    ViewPosition,
    /// Flat colour used while texturing is off.
    ObjectColor,
    /// Sampler slot index. May be `-1` when a texture tag did not resolve.
    ObjectTexture,
    UseTexture,
    UseLighting,
    UvScale,
    Material(MaterialField),
    Light(usize, LightField),
}

impl fmt::Display for Uniform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uniform::Model => f.write_str("model"),
            Uniform::View => f.write_str("view"),
            Uniform::Projection => f.write_str("projection"),
            Uniform::ViewPosition => f.write_str("view_position"),
            Uniform::ObjectColor => f.write_str("object_color"),
            Uniform::ObjectTexture => f.write_str("object_texture"),
            Uniform::UseTexture => f.write_str("use_texture"),
            Uniform::UseLighting => f.write_str("use_lighting"),
            Uniform::UvScale => f.write_str("uv_scale"),
            Uniform::Material(field) => write!(f, "material.{}", field.name()),
            Uniform::Light(slot, field) => write!(f, "lights[{}].{}", slot, field.name()),
        }
    }
}

/// A value written to a [`Uniform`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vector2<f32>),
    Vec3(Vector3<f32>),
    Vec4(Vector4<f32>),
    Mat4(Matrix4<f32>),
    Sampler(i32),
}

/// Write-only sink for shader uniforms.
///
/// Implementors only need [`set_uniform`](Self::set_uniform); the typed helpers
/// wrap the value and forward to it. Writes are immediate: a later write to the
/// same uniform replaces the earlier one for every draw issued afterwards.
pub trait ShaderProgram {
    fn set_uniform(&mut self, uniform: Uniform, value: UniformValue);

    fn set_bool(&mut self, uniform: Uniform, value: bool) {
        self.set_uniform(uniform, UniformValue::Bool(value));
    }

    fn set_int(&mut self, uniform: Uniform, value: i32) {
        self.set_uniform(uniform, UniformValue::Int(value));
    }

    fn set_float(&mut self, uniform: Uniform, value: f32) {
        self.set_uniform(uniform, UniformValue::Float(value));
    }

    fn set_vec2(&mut self, uniform: Uniform, value: Vector2<f32>) {
        self.set_uniform(uniform, UniformValue::Vec2(value));
    }

    fn set_vec3(&mut self, uniform: Uniform, value: Vector3<f32>) {
        self.set_uniform(uniform, UniformValue::Vec3(value));
    }

    fn set_vec4(&mut self, uniform: Uniform, value: Vector4<f32>) {
        self.set_uniform(uniform, UniformValue::Vec4(value));
    }

    fn set_mat4(&mut self, uniform: Uniform, value: Matrix4<f32>) {
        self.set_uniform(uniform, UniformValue::Mat4(value));
    }

    fn set_sampler2d(&mut self, uniform: Uniform, slot: i32) {
        self.set_uniform(uniform, UniformValue::Sampler(slot));
    }
}
