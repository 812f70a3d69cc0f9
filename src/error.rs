//! Error types for the block voxelizer.

use thiserror::Error;

/// Result type alias using VoxelizerError.
pub type Result<T> = std::result::Result<T, VoxelizerError>;

/// Main error type for voxelization, sampling and export.
#[derive(Error, Debug)]
pub enum VoxelizerError {
    /// Failed to read or parse a ZIP archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read or process an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Failed to import a glTF or GLB document.
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource referenced by the texture pack was not found.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Invalid texture pack structure.
    #[error("Invalid texture pack: {0}")]
    InvalidTexturePack(String),

    /// The block palette has no entries to match against.
    #[error("Texture pack contains no usable cube_all blocks")]
    EmptyPalette,

    /// Source mesh data is inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Source mesh uses a feature this crate does not read.
    #[error("Unsupported mesh data: {0}")]
    UnsupportedMesh(String),

    /// Voxel pitch is zero, negative or not finite.
    #[error("Invalid voxel pitch: {0}")]
    InvalidPitch(f32),

    /// Dither magnitude is negative or not finite.
    #[error("Invalid dither magnitude: {0}")]
    InvalidDither(f32),

    /// Two inputs that must describe the same voxels do not.
    #[error("Input mismatch: {0}")]
    Mismatch(String),

    /// Failed to build the block atlas.
    #[error("Atlas building error: {0}")]
    AtlasBuild(String),

    /// Failed to export mesh.
    #[error("Export error: {0}")]
    Export(String),
}
