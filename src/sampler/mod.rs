//! Voxel color sampling and block matching.
//!
//! A [`VoxelColorSample`] runs the whole pipeline for one mesh and its voxel
//! grid: nearest-surface query, color extraction, dithering, nearest-block
//! matching in L*a*b* and atlas assembly. Every stage produces a new value;
//! nothing is updated in place. Use [`VoxelColorSample::rematch`] to redo the
//! stages after color extraction with another texture pack or dither setting.

pub mod strategy;

pub use strategy::{barycentric, sample_colors, sample_flat, sample_texture, sample_vertex};

use crate::atlas::{AtlasFilter, BlockAtlas, DEFAULT_ATLAS_HEIGHT};
use crate::error::{Result, VoxelizerError};
use crate::proximity::{ClosestPointQuery, SurfaceHits, SurfaceQuery};
use crate::source::{ColorType, SourceMesh};
use crate::texture_pack::TexturePack;
use crate::types::{lab_distance_squared, Lab};
use crate::voxel::VoxelGrid;
use image::RgbImage;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;
use std::sync::Arc;

/// Sampling configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    /// Standard deviation of the Gaussian noise added to each L*a*b* channel.
    /// Zero disables dithering.
    pub dither: f32,
    /// Seed for the dither noise. `None` draws a fresh seed per run.
    pub seed: Option<u64>,
    /// Height of the assembled atlas in pixels.
    pub atlas_height: u32,
    /// Filter used to resize the atlas.
    pub atlas_filter: AtlasFilter,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            dither: 0.0,
            seed: None,
            atlas_height: DEFAULT_ATLAS_HEIGHT,
            atlas_filter: AtlasFilter::default(),
        }
    }
}

impl SampleConfig {
    pub fn with_dither(mut self, dither: f32) -> Self {
        self.dither = dither;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_atlas_height(mut self, height: u32) -> Self {
        self.atlas_height = height;
        self
    }

    pub fn with_atlas_filter(mut self, filter: AtlasFilter) -> Self {
        self.atlas_filter = filter;
        self
    }
}

/// Block assignment for every voxel of a grid.
///
/// All per-voxel vectors follow the order of the grid's sparse indices.
#[derive(Debug, Clone)]
pub struct VoxelColorSample {
    color_type: ColorType,
    surface_lab_colors: Vec<Lab>,
    voxel_lab_colors: Vec<Lab>,
    closest_block_indexes: Vec<usize>,
    used_blocks: Vec<usize>,
    transposed_block_indexes: Vec<usize>,
    atlas: Arc<BlockAtlas>,
    config: SampleConfig,
}

impl VoxelColorSample {
    /// Sample `mesh` at the points of `grid`, which must have been voxelized
    /// from that mesh.
    pub fn new(
        mesh: &SourceMesh,
        grid: &VoxelGrid,
        pack: &TexturePack,
        config: SampleConfig,
    ) -> Result<Self> {
        let query = ClosestPointQuery::new(mesh)?;
        Self::with_query(mesh, grid, pack, config, &query)
    }

    /// Like [`VoxelColorSample::new`] with a caller-provided surface query.
    pub fn with_query<Q: SurfaceQuery + ?Sized>(
        mesh: &SourceMesh,
        grid: &VoxelGrid,
        pack: &TexturePack,
        config: SampleConfig,
        query: &Q,
    ) -> Result<Self> {
        mesh.validate()?;

        let hits = if grid.is_empty() {
            SurfaceHits::default()
        } else {
            query.on_surface(grid.points())?
        };
        check_hits(mesh, grid, &hits)?;

        let color_type = mesh.color_type();
        let surface_lab_colors = sample_colors(color_type, mesh, &hits);
        log::debug!(
            "{}: sampled {} voxels as {:?}",
            mesh.name,
            surface_lab_colors.len(),
            color_type
        );

        Self::from_surface_colors(color_type, surface_lab_colors, pack, config)
    }

    /// Redo dithering, matching and atlas assembly against another pack or
    /// config, reusing the sampled surface colors.
    pub fn rematch(&self, pack: &TexturePack, config: SampleConfig) -> Result<Self> {
        Self::from_surface_colors(self.color_type, self.surface_lab_colors.clone(), pack, config)
    }

    fn from_surface_colors(
        color_type: ColorType,
        surface_lab_colors: Vec<Lab>,
        pack: &TexturePack,
        config: SampleConfig,
    ) -> Result<Self> {
        if pack.is_empty() {
            return Err(VoxelizerError::EmptyPalette);
        }

        let voxel_lab_colors = dither(&surface_lab_colors, config.dither, config.seed)?;
        let closest_block_indexes = match_blocks(&voxel_lab_colors, &pack.block_colors_lab);
        let (used_blocks, transposed_block_indexes) =
            transpose(&closest_block_indexes, pack.len());
        let atlas = BlockAtlas::assemble(
            pack,
            &used_blocks,
            config.atlas_height,
            config.atlas_filter,
        )?;

        log::debug!(
            "Matched {} voxels to {} of {} blocks",
            closest_block_indexes.len(),
            used_blocks.len(),
            pack.len()
        );

        Ok(Self {
            color_type,
            surface_lab_colors,
            voxel_lab_colors,
            closest_block_indexes,
            used_blocks,
            transposed_block_indexes,
            atlas: Arc::new(atlas),
            config,
        })
    }

    /// Number of sampled voxels.
    pub fn len(&self) -> usize {
        self.closest_block_indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closest_block_indexes.is_empty()
    }

    /// Strategy used to extract colors from the source mesh.
    pub fn color_type(&self) -> ColorType {
        self.color_type
    }

    /// Sampled colors before dithering.
    pub fn surface_lab_colors(&self) -> &[Lab] {
        &self.surface_lab_colors
    }

    /// Colors the blocks were matched against (after dithering).
    pub fn voxel_lab_colors(&self) -> &[Lab] {
        &self.voxel_lab_colors
    }

    /// Palette index of the block matched to each voxel.
    pub fn closest_block_indexes(&self) -> &[usize] {
        &self.closest_block_indexes
    }

    /// Distinct matched palette indices, ascending.
    pub fn used_blocks(&self) -> &[usize] {
        &self.used_blocks
    }

    /// Atlas slot of each voxel's block: its rank within `used_blocks`.
    pub fn transposed_block_indexes(&self) -> &[usize] {
        &self.transposed_block_indexes
    }

    pub fn atlas(&self) -> &Arc<BlockAtlas> {
        &self.atlas
    }

    /// The packed atlas image.
    pub fn texture_image(&self) -> &RgbImage {
        self.atlas.image()
    }

    pub fn config(&self) -> &SampleConfig {
        &self.config
    }
}

fn check_hits(mesh: &SourceMesh, grid: &VoxelGrid, hits: &SurfaceHits) -> Result<()> {
    let n = grid.len();
    if hits.closest_points.len() != n || hits.face_indexes.len() != n || hits.distances.len() != n
    {
        return Err(VoxelizerError::Mismatch(format!(
            "surface query returned {} points, {} faces, {} distances for {} voxels",
            hits.closest_points.len(),
            hits.face_indexes.len(),
            hits.distances.len(),
            n
        )));
    }
    if let Some(&face) = hits.face_indexes.iter().find(|&&f| f >= mesh.faces.len()) {
        return Err(VoxelizerError::Mismatch(format!(
            "surface hit on face {} but the mesh has {} faces",
            face,
            mesh.faces.len()
        )));
    }
    Ok(())
}

/// Add N(0, magnitude) noise to every channel of every color.
///
/// A magnitude of zero returns the colors unchanged and draws no randomness.
pub fn dither(colors: &[Lab], magnitude: f32, seed: Option<u64>) -> Result<Vec<Lab>> {
    if magnitude == 0.0 {
        return Ok(colors.to_vec());
    }
    if !magnitude.is_finite() || magnitude < 0.0 {
        return Err(VoxelizerError::InvalidDither(magnitude));
    }
    let normal =
        Normal::new(0.0f32, magnitude).map_err(|_| VoxelizerError::InvalidDither(magnitude))?;

    let mut rng = match seed {
        Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
        None => Xoshiro256Plus::from_rng(&mut rand::rng()),
    };
    Ok(colors
        .iter()
        .map(|color| color.map(|channel| channel + normal.sample(&mut rng)))
        .collect())
}

/// Index of the nearest palette color for each color, by Euclidean L*a*b*
/// distance. Ties go to the lowest index.
pub fn match_blocks(colors: &[Lab], palette: &[Lab]) -> Vec<usize> {
    colors
        .par_iter()
        .map(|color| {
            let mut best = 0;
            let mut best_distance = f32::INFINITY;
            for (index, block) in palette.iter().enumerate() {
                let distance = lab_distance_squared(color, block);
                if distance < best_distance {
                    best = index;
                    best_distance = distance;
                }
            }
            best
        })
        .collect()
}

/// Sorted distinct block indices and each entry's rank among them.
fn transpose(block_indexes: &[usize], palette_len: usize) -> (Vec<usize>, Vec<usize>) {
    let mut used = vec![false; palette_len];
    for &block in block_indexes {
        used[block] = true;
    }

    let mut used_blocks = Vec::new();
    let mut slot_of = vec![0usize; palette_len];
    for (block, _) in used.iter().enumerate().filter(|&(_, &u)| u) {
        slot_of[block] = used_blocks.len();
        used_blocks.push(block);
    }

    let transposed = block_indexes.iter().map(|&block| slot_of[block]).collect();
    (used_blocks, transposed)
}
