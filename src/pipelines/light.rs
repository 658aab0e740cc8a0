//! Scene lights.
//!
//! Lights are written to the shader once during scene preparation and never
//! touched again. Nothing is lit until the `use_lighting` flag is switched on;
//! with the flag off the shader's light sum is zero and geometry renders black.

use cgmath::{ElementWise, InnerSpace, Vector3, Zero};

use crate::{
    data_structures::material::Material,
    shader::{LightField, ShaderProgram, Uniform},
};

/// Number of entries in the shader's `lights` array.
pub const MAX_LIGHTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LightError {
    #[error("light slot {0} is out of range, the shader has {MAX_LIGHTS} light slots")]
    SlotOutOfRange(usize),
}

/// Parameters of one light source.
///
/// A non-zero `direction` makes the light directional; `position` is then only
/// informative. A zero direction lights from `position` instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    pub position: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub ambient_color: Vector3<f32>,
    pub diffuse_color: Vector3<f32>,
    pub specular_color: Vector3<f32>,
    /// Exponent of the specular highlight.
    pub focal_strength: f32,
    pub specular_intensity: f32,
}

impl LightSource {
    /// A light of a single colour: ambient is a fifth of it, diffuse and specular
    /// use it unchanged, with a tight (100) highlight at full intensity.
    pub fn tinted(
        position: impl Into<Vector3<f32>>,
        direction: impl Into<Vector3<f32>>,
        color: impl Into<Vector3<f32>>,
    ) -> Self {
        let color = color.into();
        Self {
            position: position.into(),
            direction: direction.into(),
            ambient_color: color * 0.2,
            diffuse_color: color,
            specular_color: color,
            focal_strength: 100.0,
            specular_intensity: 1.0,
        }
    }
}

/// The set of configured lights, indexed by shader slot.
#[derive(Clone, Debug, Default)]
pub struct LightRig {
    lights: [Option<LightSource>; MAX_LIGHTS],
}

impl LightRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch the shader's lighting on or off.
    pub fn set_lighting<S: ShaderProgram + ?Sized>(&self, shader: &mut S, enabled: bool) {
        shader.set_bool(Uniform::UseLighting, enabled);
    }

    /// Write every field of `light` into `lights[slot]`.
    pub fn configure<S: ShaderProgram + ?Sized>(
        &mut self,
        shader: &mut S,
        slot: usize,
        light: LightSource,
    ) -> Result<(), LightError> {
        if slot >= MAX_LIGHTS {
            return Err(LightError::SlotOutOfRange(slot));
        }
        shader.set_vec3(Uniform::Light(slot, LightField::Position), light.position);
        shader.set_vec3(Uniform::Light(slot, LightField::Direction), light.direction);
        shader.set_vec3(Uniform::Light(slot, LightField::AmbientColor), light.ambient_color);
        shader.set_vec3(Uniform::Light(slot, LightField::DiffuseColor), light.diffuse_color);
        shader.set_vec3(Uniform::Light(slot, LightField::SpecularColor), light.specular_color);
        shader.set_float(Uniform::Light(slot, LightField::FocalStrength), light.focal_strength);
        shader.set_float(
            Uniform::Light(slot, LightField::SpecularIntensity),
            light.specular_intensity,
        );
        self.lights[slot] = Some(light);
        Ok(())
    }

    pub fn get(&self, slot: usize) -> Option<&LightSource> {
        self.lights.get(slot).and_then(Option::as_ref)
    }

    /// Configured lights in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &LightSource> {
        self.lights.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// GPU layout of one entry of the WGSL `lights` array.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub focal_strength: f32,
    pub direction: [f32; 3],
    pub specular_intensity: f32,
    pub ambient_color: [f32; 3],
    // vec3 members are 16 byte aligned in WGSL
    pub _padding: u32,
    pub diffuse_color: [f32; 3],
    pub _padding2: u32,
    pub specular_color: [f32; 3],
    pub _padding3: u32,
}

impl From<&LightSource> for LightUniform {
    fn from(light: &LightSource) -> Self {
        Self {
            position: light.position.into(),
            focal_strength: light.focal_strength,
            direction: light.direction.into(),
            specular_intensity: light.specular_intensity,
            ambient_color: light.ambient_color.into(),
            diffuse_color: light.diffuse_color.into(),
            specular_color: light.specular_color.into(),
            ..Default::default()
        }
    }
}

/// Surface point being shaded.
#[derive(Clone, Copy, Debug)]
pub struct Fragment {
    pub position: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub view_position: Vector3<f32>,
}

/// Summed light reaching `fragment`, before it is multiplied with the base colour.
///
/// CPU counterpart of `lighting()` in `scene.wgsl`; keep the two in step.
pub fn light_contribution<'a>(
    fragment: &Fragment,
    material: &Material,
    lights: impl IntoIterator<Item = &'a LightSource>,
    use_lighting: bool,
) -> Vector3<f32> {
    if !use_lighting {
        return Vector3::zero();
    }
    let normal = normalize_or_zero(fragment.normal);
    let to_view = normalize_or_zero(fragment.view_position - fragment.position);
    let gloss = material.shininess / (material.shininess + 1.0);

    lights.into_iter().fold(Vector3::zero(), |sum, light| {
        let to_light = if light.direction.magnitude2() > 0.0 {
            normalize_or_zero(-light.direction)
        } else {
            normalize_or_zero(light.position - fragment.position)
        };

        let ambient = mul(light.ambient_color, material.ambient_color) * material.ambient_strength;

        let lambert = normal.dot(to_light).max(0.0);
        let diffuse = mul(light.diffuse_color, material.diffuse_color) * lambert;

        let reflected = reflect(-to_light, normal);
        let facing = to_view.dot(reflected).max(0.0);
        let highlight = if facing > 0.0 { facing.powf(light.focal_strength) } else { 0.0 };
        let specular = mul(light.specular_color, material.specular_color)
            * (highlight * light.specular_intensity * gloss);

        sum + ambient + diffuse + specular
    })
}

fn mul(a: Vector3<f32>, b: Vector3<f32>) -> Vector3<f32> {
    a.mul_element_wise(b)
}

fn reflect(incident: Vector3<f32>, normal: Vector3<f32>) -> Vector3<f32> {
    incident - normal * (2.0 * normal.dot(incident))
}

fn normalize_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    if v.magnitude2() > 0.0 { v.normalize() } else { v }
}
