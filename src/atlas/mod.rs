//! Block texture atlases.
//!
//! This module stacks the textures of the blocks a sample actually uses into
//! a single vertical strip and resizes it to a fixed target height.

mod builder;

pub use builder::BlockAtlas;

use image::imageops::FilterType;

/// Default height of an assembled atlas in pixels.
pub const DEFAULT_ATLAS_HEIGHT: u32 = 16384;

/// Resampling filter used when resizing the stacked atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum AtlasFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl From<AtlasFilter> for FilterType {
    fn from(filter: AtlasFilter) -> Self {
        match filter {
            AtlasFilter::Nearest => FilterType::Nearest,
            AtlasFilter::Triangle => FilterType::Triangle,
            AtlasFilter::CatmullRom => FilterType::CatmullRom,
            AtlasFilter::Gaussian => FilterType::Gaussian,
            AtlasFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}
