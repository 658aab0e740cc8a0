//! Scene data structures: materials, transforms, meshes and textures.
//!
//! - `material` contains material presets and the tag-addressed material table
//! - `model` contains the vertex layout and GPU mesh buffers
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `transform` composes per-draw model matrices

pub mod material;
pub mod model;
pub mod texture;
pub mod transform;
