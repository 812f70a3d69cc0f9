//! Block Voxelizer CLI
//!
//! Convert glTF/GLB meshes into voxel structures textured with Minecraft blocks.

use block_voxelizer::{
    export_glb, load_meshes, load_texture_pack, AtlasFilter, ObjExport, SampleConfig,
    TexturedVoxelMesh, VoxelColorSample, VoxelGrid,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "block-voxelizer")]
#[command(author, version, about = "Convert 3D meshes into Minecraft-block voxel structures", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Voxelize a glTF/GLB mesh and texture it with blocks
    Convert {
        /// Input mesh (.gltf or .glb)
        #[arg(short, long)]
        input: PathBuf,

        /// Path to texture pack (ZIP or directory)
        #[arg(short, long)]
        texture_pack: PathBuf,

        /// Output file path (extension added if missing)
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "glb")]
        format: OutputFormat,

        /// Voxel edge length in mesh units
        #[arg(short, long, default_value = "1.0")]
        pitch: f32,

        /// Standard deviation of L*a*b* noise added before matching
        #[arg(short, long, default_value = "0.0")]
        dither: f32,

        /// Seed for the dither noise
        #[arg(long)]
        seed: Option<u64>,

        /// Height of the block atlas in pixels
        #[arg(long, default_value = "16384")]
        atlas_height: u32,

        /// Filter used to resize the atlas
        #[arg(long, value_enum, default_value = "lanczos3")]
        atlas_filter: AtlasFilter,

        /// Keep voxels enclosed on all six sides
        #[arg(long)]
        no_hollow: bool,
    },

    /// Show the block palette of a texture pack
    Info {
        /// Path to texture pack (ZIP or directory)
        #[arg(short, long)]
        texture_pack: PathBuf,

        /// List every block with its mean color
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Binary glTF format
    Glb,
    /// Wavefront OBJ format
    Obj,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            texture_pack,
            output,
            format,
            pitch,
            dither,
            seed,
            atlas_height,
            atlas_filter,
            no_hollow,
        } => {
            let mut config = SampleConfig::default()
                .with_dither(dither)
                .with_atlas_height(atlas_height)
                .with_atlas_filter(atlas_filter);
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            convert(&input, &texture_pack, &output, format, pitch, !no_hollow, config)?;
        }
        Commands::Info {
            texture_pack,
            verbose,
        } => {
            show_pack_info(&texture_pack, verbose)?;
        }
    }

    Ok(())
}

fn convert(
    input_path: &Path,
    texture_pack_path: &Path,
    output_path: &Path,
    format: OutputFormat,
    pitch: f32,
    hollow: bool,
    config: SampleConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading texture pack from {:?}...", texture_pack_path);
    let pack = load_texture_pack(texture_pack_path)?;
    println!("  Found {} blocks", pack.len());

    println!("Loading meshes from {:?}...", input_path);
    let meshes = load_meshes(input_path)?;
    println!("  Loaded {} meshes", meshes.len());

    println!("Voxelizing with config:");
    println!("  - Pitch: {}", pitch);
    println!("  - Hollow: {}", hollow);
    println!("  - Dither: {}", config.dither);
    if let Some(seed) = config.seed {
        println!("  - Seed: {}", seed);
    }
    println!("  - Atlas height: {}", config.atlas_height);

    for (index, mesh) in meshes.iter().enumerate() {
        let mut grid = VoxelGrid::voxelize_surface(mesh, pitch)?;
        if hollow {
            grid = grid.hollow();
        }
        let sample = VoxelColorSample::new(mesh, &grid, &pack, config.clone())?;
        let output = TexturedVoxelMesh::build(&grid, &sample)?;

        println!(
            "  {}: {} voxels ({:?} colors), {} blocks used",
            mesh.name,
            grid.len(),
            sample.color_type(),
            sample.used_blocks().len()
        );
        if output.is_empty() {
            println!("  {}: nothing to export", mesh.name);
            continue;
        }

        let path = if meshes.len() == 1 {
            output_path.to_path_buf()
        } else {
            numbered_path(output_path, index)
        };
        export_output(&output, &path, format)?;
    }

    Ok(())
}

fn show_pack_info(texture_pack_path: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading texture pack from {:?}...", texture_pack_path);
    let pack = load_texture_pack(texture_pack_path)?;

    println!("\nTexture Pack Info:");
    println!("  Blocks: {}", pack.len());
    println!("  Texture size: {}px", pack.texture_size());

    if verbose {
        for i in 0..pack.len() {
            let [r, g, b] = pack.block_colors_rgb[i];
            let [l, a, bb] = pack.block_colors_lab[i];
            println!(
                "  {:<32} rgb({:>3.0}, {:>3.0}, {:>3.0})  lab({:>6.2}, {:>7.2}, {:>7.2})",
                pack.block_names[i], r, g, b, l, a, bb
            );
        }
    }

    Ok(())
}

/// `out/model.glb` -> `out/model_2.glb`
fn numbered_path(path: &Path, index: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "voxels".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}_{}", stem, index),
    };
    path.with_file_name(name)
}

fn export_output(
    output: &TexturedVoxelMesh,
    path: &Path,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Glb => {
            let glb_path = if path.extension().is_some() {
                path.to_path_buf()
            } else {
                path.with_extension("glb")
            };
            let glb_data = export_glb(output)?;
            fs::write(&glb_path, &glb_data)?;
            println!("Exported GLB ({} bytes) to {:?}", glb_data.len(), glb_path);
        }
        OutputFormat::Obj => {
            let obj_path = if path.extension().is_some() {
                path.to_path_buf()
            } else {
                path.with_extension("obj")
            };
            let name = obj_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "voxels".to_string());
            let obj_export = ObjExport::from_output(output, &name)?;

            let mtl_path = obj_path.with_extension("mtl");
            let png_path = obj_path.with_file_name(ObjExport::texture_filename(&name));

            fs::write(&obj_path, &obj_export.obj)?;
            fs::write(&mtl_path, &obj_export.mtl)?;
            fs::write(&png_path, &obj_export.texture_png)?;

            println!("Exported OBJ to {:?}", obj_path);
            println!("  Material: {:?}", mtl_path);
            println!("  Texture: {:?}", png_path);
        }
    }

    Ok(())
}
