//! desk-scene
//!
//! Texture, material, light and transform binding for a small static scene: a
//! desk with a monitor, a mini PC, a game console and a drink can. The binding
//! layer only talks to the graphics backend through a few narrow traits, so the
//! same scene description drives the wgpu renderer in this crate or any other
//! implementation of those traits.
//!
//! High-level modules
//! - `config`: asset root and image loading options
//! - `context`: headless GPU context with an offscreen target and readback
//! - `data_structures`: materials, transforms, meshes and GPU textures
//! - `pipelines`: bind group layouts, the scene pipeline and the light rig
//! - `render`: draw call records and the renderer seams
//! - `renderer`: the wgpu implementation of those seams
//! - `resources`: asset paths and the slot-based texture registry
//! - `scene`: the desk scene and the binder that issues it
//! - `shader`: typed uniform names and values
//!

pub mod config;
pub mod context;
pub mod data_structures;
pub mod pipelines;
pub mod render;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod shader;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use config::SceneConfig;
pub use scene::{Scene, SceneBinder};
pub use wgpu;

/// Install the `env_logger` backend for the `log` macros used across the crate.
///
/// Filtering follows `RUST_LOG`. Calling this more than once is harmless.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
