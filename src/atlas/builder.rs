//! Vertical-strip atlas of used block textures.

use super::AtlasFilter;
use crate::error::{Result, VoxelizerError};
use crate::texture_pack::TexturePack;
use image::{ImageEncoder, Rgb, RgbImage};

const PLACEHOLDER_SIZE: u32 = 16;

/// An atlas of block textures stacked top to bottom.
///
/// Slot `k` holds the texture of `block_names()[k]` and covers pixel rows
/// `[k * H / M, (k + 1) * H / M)` of the image, where `M` is the tile count.
#[derive(Debug, Clone)]
pub struct BlockAtlas {
    image: RgbImage,
    tile_count: usize,
    block_names: Vec<String>,
}

impl BlockAtlas {
    /// Stack the textures of `used_blocks` (palette indices, in slot order)
    /// and resize the strip to `target_height` pixels, keeping its aspect.
    ///
    /// With no used blocks this returns [`BlockAtlas::placeholder`].
    pub fn assemble(
        pack: &TexturePack,
        used_blocks: &[usize],
        target_height: u32,
        filter: AtlasFilter,
    ) -> Result<Self> {
        if used_blocks.is_empty() {
            log::warn!("No blocks used; emitting a placeholder atlas");
            return Ok(Self::placeholder());
        }
        if target_height == 0 {
            return Err(VoxelizerError::AtlasBuild(
                "atlas target height must be positive".to_string(),
            ));
        }
        if let Some(&bad) = used_blocks.iter().find(|&&b| b >= pack.len()) {
            return Err(VoxelizerError::Mismatch(format!(
                "block index {} is outside a palette of {} blocks",
                bad,
                pack.len()
            )));
        }

        let size = pack.texture_size();
        let tiles = used_blocks.len() as u32;
        let stacked_height = size.checked_mul(tiles).ok_or_else(|| {
            VoxelizerError::AtlasBuild(format!("{} tiles of {}px overflow", tiles, size))
        })?;

        let mut stacked = RgbImage::new(size, stacked_height);
        for (slot, &block) in used_blocks.iter().enumerate() {
            image::imageops::replace(
                &mut stacked,
                &pack.block_textures[block],
                0,
                slot as i64 * size as i64,
            );
        }

        let width = ((target_height as u64 * size as u64) / stacked_height as u64).max(1) as u32;
        let image = if (width, target_height) == stacked.dimensions() {
            stacked
        } else {
            image::imageops::resize(&stacked, width, target_height, filter.into())
        };

        log::debug!(
            "Assembled atlas: {} tiles of {}px resized to {}x{}",
            tiles,
            size,
            width,
            target_height
        );

        Ok(Self {
            image,
            tile_count: used_blocks.len(),
            block_names: used_blocks
                .iter()
                .map(|&b| pack.block_names[b].clone())
                .collect(),
        })
    }

    /// A 16x16 white image with no tiles, used when nothing was matched.
    pub fn placeholder() -> Self {
        Self {
            image: RgbImage::from_pixel(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, Rgb([255, 255, 255])),
            tile_count: 0,
            block_names: Vec::new(),
        }
    }

    /// Whether this atlas carries no block tiles.
    pub fn is_placeholder(&self) -> bool {
        self.tile_count == 0
    }

    /// Number of block tiles (`M`).
    pub fn tile_count(&self) -> usize {
        self.tile_count
    }

    /// Height of one tile in normalized V (`1 / M`), or 1 for the placeholder.
    pub fn tile_height(&self) -> f32 {
        if self.tile_count == 0 {
            1.0
        } else {
            1.0 / self.tile_count as f32
        }
    }

    /// Names of the blocks in slot order.
    pub fn block_names(&self) -> &[String] {
        &self.block_names
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Export the atlas as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let cursor = std::io::Cursor::new(&mut bytes);
        let encoder = image::codecs::png::PngEncoder::new(cursor);

        encoder
            .write_image(
                self.image.as_raw(),
                self.image.width(),
                self.image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| VoxelizerError::AtlasBuild(format!("Failed to encode PNG: {}", e)))?;

        Ok(bytes)
    }
}
