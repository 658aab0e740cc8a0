//! Loading scene inputs from disk.
//!
//! Paths handed to the loaders are relative to the configured asset root
//! (see [`crate::config::SceneConfig`]) unless they are already absolute.

use std::path::{Path, PathBuf};

pub mod texture;

/// Resolve `file_name` against `asset_root`. Absolute paths are returned unchanged.
pub fn asset_path(asset_root: &Path, file_name: impl AsRef<Path>) -> PathBuf {
    let file_name = file_name.as_ref();
    if file_name.is_absolute() {
        file_name.to_path_buf()
    } else {
        asset_root.join(file_name)
    }
}

pub fn load_binary(path: &Path) -> std::io::Result<Vec<u8>> {
    std::fs::read(path)
}
