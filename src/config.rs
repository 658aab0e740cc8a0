//! Scene configuration.

use std::path::PathBuf;

/// Environment variable overriding [`SceneConfig::asset_root`].
pub const ASSET_ROOT_ENV: &str = "DESK_SCENE_ASSETS";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneConfig {
    /// Directory texture files are resolved against.
    pub asset_root: PathBuf,
    /// Flip decoded images so their first row lands at texture coordinate v = 0.
    pub flip_vertically: bool,
}

impl SceneConfig {
    /// Defaults, with the asset root taken from `DESK_SCENE_ASSETS` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(root) = std::env::var_os(ASSET_ROOT_ENV).filter(|root| !root.is_empty()) {
            config.asset_root = PathBuf::from(root);
        }
        config
    }

    pub fn with_asset_root(mut self, asset_root: impl Into<PathBuf>) -> Self {
        self.asset_root = asset_root.into();
        self
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("./assets"),
            flip_vertically: true,
        }
    }
}
