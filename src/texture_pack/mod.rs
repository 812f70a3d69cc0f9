//! Texture pack loading into a block palette.
//!
//! This module reads Minecraft texture packs (ZIP files or directories) and
//! extracts every full-cube block that shows a single static texture on all
//! faces, together with the mean color of that texture.

pub mod loader;
pub mod model;
pub mod texture;

pub use model::BlockModel;

use crate::error::{VoxelizerError, Result};
use crate::types::{Lab, Rgb};
use image::RgbImage;

/// The block palette of a texture pack.
///
/// All four per-block vectors have the same length and share index order:
/// index `i` refers to the same block in each of them.
#[derive(Debug, Clone, Default)]
pub struct TexturePack {
    /// Block names (texture leaf names, e.g. "stone").
    pub block_names: Vec<String>,
    /// Mean L*a*b* color of each block texture.
    pub block_colors_lab: Vec<Lab>,
    /// Mean sRGB color of each block texture, channels in [0, 255].
    pub block_colors_rgb: Vec<Rgb>,
    /// Block textures, all square with side [`TexturePack::texture_size`].
    pub block_textures: Vec<RgbImage>,
    texture_size: u32,
}

impl TexturePack {
    /// Load a texture pack from a ZIP file or an extracted directory.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        loader::load_from_path(path)
    }

    /// Load a texture pack from the bytes of a ZIP archive.
    pub fn from_zip_bytes(data: &[u8]) -> Result<Self> {
        loader::load_from_bytes(data)
    }

    /// Build a palette from named textures, computing their mean colors.
    ///
    /// Every texture must be square and the same size as the first one.
    pub fn from_textures<I>(blocks: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, RgbImage)>,
    {
        let mut pack = TexturePack::default();
        for (name, texture) in blocks {
            pack.push_block(name, texture)?;
        }
        Ok(pack)
    }

    fn push_block(&mut self, name: String, texture: RgbImage) -> Result<()> {
        let (width, height) = texture.dimensions();
        if width != height || width == 0 {
            return Err(VoxelizerError::InvalidTexturePack(format!(
                "texture for '{}' is {}x{}, expected a non-empty square",
                name, width, height
            )));
        }
        if self.block_textures.is_empty() {
            self.texture_size = width;
        } else if width != self.texture_size {
            return Err(VoxelizerError::InvalidTexturePack(format!(
                "texture for '{}' is {}px, other blocks are {}px",
                name, width, self.texture_size
            )));
        }

        let (lab, rgb) = texture::mean_colors(&texture);
        self.block_names.push(name);
        self.block_colors_lab.push(lab);
        self.block_colors_rgb.push(rgb);
        self.block_textures.push(texture);
        Ok(())
    }

    /// Number of blocks in the palette.
    pub fn len(&self) -> usize {
        self.block_names.len()
    }

    /// Whether the palette has no blocks.
    pub fn is_empty(&self) -> bool {
        self.block_names.is_empty()
    }

    /// Side length in pixels shared by all block textures (0 when empty).
    pub fn texture_size(&self) -> u32 {
        self.texture_size
    }

    /// Palette index of the first block with the given name.
    pub fn block_index(&self, name: &str) -> Option<usize> {
        self.block_names.iter().position(|n| n == name)
    }
}

/// Parse a resource location into namespace and path.
/// "minecraft:block/stone" -> ("minecraft", "block/stone")
/// "block/stone" -> ("minecraft", "block/stone")
pub(crate) fn parse_resource_location(resource_location: &str) -> (&str, &str) {
    if let Some((namespace, path)) = resource_location.split_once(':') {
        (namespace, path)
    } else {
        ("minecraft", resource_location)
    }
}
