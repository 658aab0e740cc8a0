//! Texture registry: image files in, tagged GPU texture slots out.
//!
//! The registry decodes image files, hands the pixels to a [`TextureBackend`] for
//! upload and remembers the returned handle under a human-readable tag. Slots are
//! assigned in registration order, so after [`TextureRegistry::bind_all`] the
//! shader sampler index `i` addresses the `i`-th loaded texture.

use std::path::{Path, PathBuf};

use image::{ImageError, ImageFormat, RgbaImage};

use crate::resources::load_binary;

/// Number of texture units the scene shader can address.
pub const MAX_TEXTURE_SLOTS: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not decode image {}: {source}", path.display())]
    DecodeFailed {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error(
        "image {} has {channels} colour channels, only RGB and RGBA are supported",
        path.display()
    )]
    UnsupportedChannels { path: PathBuf, channels: u8 },
    #[error("cannot load {}: all {MAX_TEXTURE_SLOTS} texture slots are taken", path.display())]
    RegistryFull { path: PathBuf },
}

/// Creates, binds and frees GPU textures on behalf of the registry.
pub trait TextureBackend {
    type Texture;

    /// Upload `image` as a mip-mapped, repeat-wrapped, linearly filtered 2D texture.
    fn create_texture(&mut self, label: &str, image: &RgbaImage) -> Self::Texture;

    /// Make `texture` the one sampled through texture unit `slot`.
    fn bind_texture(&mut self, slot: usize, texture: &Self::Texture);

    fn destroy_texture(&mut self, texture: Self::Texture);
}

#[derive(Clone, Debug)]
pub struct TextureEntry<H> {
    pub tag: String,
    pub handle: H,
}

/// Append-only, tag-addressed list of loaded textures.
#[derive(Debug)]
pub struct TextureRegistry<H> {
    entries: Vec<TextureEntry<H>>,
    flip_vertically: bool,
}

impl<H> TextureRegistry<H> {
    /// `flip_vertically` puts the first image row at the bottom, matching texture
    /// coordinates whose origin is the lower-left corner.
    pub fn new(flip_vertically: bool) -> Self {
        Self {
            entries: Vec::new(),
            flip_vertically,
        }
    }

    /// Decode `path`, upload it and register it under `tag`.
    ///
    /// Returns the slot the texture will occupy. On any error the registry is
    /// left untouched and nothing is uploaded.
    pub fn load<B>(&mut self, backend: &mut B, path: &Path, tag: &str) -> Result<usize, LoadError>
    where
        B: TextureBackend<Texture = H>,
    {
        if self.entries.len() >= MAX_TEXTURE_SLOTS {
            return Err(LoadError::RegistryFull {
                path: path.to_path_buf(),
            });
        }
        if self.find_slot(tag).is_some() {
            log::warn!(
                "Texture tag '{}' is already registered; lookups keep resolving to the first one",
                tag
            );
        }

        let image = decode_image(path, self.flip_vertically)?;
        let handle = backend.create_texture(tag, &image);
        let slot = self.entries.len();
        self.entries.push(TextureEntry {
            tag: tag.to_string(),
            handle,
        });
        Ok(slot)
    }

    /// Bind every registered texture to the slot matching its registration order.
    pub fn bind_all<B>(&self, backend: &mut B)
    where
        B: TextureBackend<Texture = H>,
    {
        for (slot, entry) in self.entries.iter().enumerate() {
            backend.bind_texture(slot, &entry.handle);
        }
    }

    pub fn find_slot(&self, tag: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.tag == tag)
    }

    pub fn find_handle(&self, tag: &str) -> Option<&H> {
        self.entries
            .iter()
            .find(|entry| entry.tag == tag)
            .map(|entry| &entry.handle)
    }

    /// Free every texture. Entries are drained, so calling this again frees nothing.
    pub fn release_all<B>(&mut self, backend: &mut B)
    where
        B: TextureBackend<Texture = H>,
    {
        for entry in self.entries.drain(..) {
            log::debug!("Releasing texture '{}'", entry.tag);
            backend.destroy_texture(entry.handle);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &TextureEntry<H>> {
        self.entries.iter()
    }
}

impl<H> Default for TextureRegistry<H> {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Read and decode an RGB or RGBA image file into RGBA8 pixels.
///
/// The format is taken from the file extension when it names one, otherwise it
/// is sniffed from the content.
pub fn decode_image(path: &Path, flip_vertically: bool) -> Result<RgbaImage, LoadError> {
    let decode_failed = |source: ImageError| LoadError::DecodeFailed {
        path: path.to_path_buf(),
        source,
    };

    let bytes = load_binary(path).map_err(|e| decode_failed(ImageError::IoError(e)))?;
    let img = match ImageFormat::from_path(path) {
        Ok(format) => image::load_from_memory_with_format(&bytes, format),
        Err(_) => image::load_from_memory(&bytes),
    }
    .map_err(decode_failed)?;

    let channels = img.color().channel_count();
    if channels != 3 && channels != 4 {
        log::warn!(
            "Not loading {}: {} channel images are not supported",
            path.display(),
            channels
        );
        return Err(LoadError::UnsupportedChannels {
            path: path.to_path_buf(),
            channels,
        });
    }
    log::info!(
        "Loaded image {}: {}x{}, {} channels",
        path.display(),
        img.width(),
        img.height(),
        channels
    );

    let mut rgba = img.to_rgba8();
    if flip_vertically {
        image::imageops::flip_vertical_in_place(&mut rgba);
    }
    Ok(rgba)
}
