//! Render pipeline construction and the lighting model.
//!
//! - `basic` builds the scene pipeline and its bind group layouts
//! - `light` holds light descriptors, the light rig and the CPU lighting mirror

pub mod basic;
pub mod light;
