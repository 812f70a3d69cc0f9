//! Texture pack loading from ZIP files and directories.

use super::model::BlockModel;
use super::texture::decode_block_texture;
use super::{parse_resource_location, TexturePack};
use crate::error::{Result, VoxelizerError};
use std::collections::HashSet;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

/// Load a texture pack from a file path.
///
/// Supports both ZIP files and directories.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<TexturePack> {
    let path = path.as_ref();

    if path.is_dir() {
        let mut archive = DirectoryArchive::open(path)?;
        collect_palette(&mut archive)
    } else {
        let data = std::fs::read(path)?;
        load_from_bytes(&data)
    }
}

/// Load a texture pack from bytes (ZIP data).
pub fn load_from_bytes(data: &[u8]) -> Result<TexturePack> {
    let cursor = std::io::Cursor::new(data);
    let mut archive = ZipPackArchive(zip::ZipArchive::new(cursor)?);
    collect_palette(&mut archive)
}

/// Read access to the files of a texture pack, addressed by
/// slash-separated paths relative to the pack root.
trait PackArchive {
    /// All file paths (no directories).
    fn entry_names(&self) -> Vec<String>;

    /// Read a file, or None when it does not exist.
    fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>>;
}

struct ZipPackArchive<R>(zip::ZipArchive<R>);

impl<R: Read + Seek> PackArchive for ZipPackArchive<R> {
    fn entry_names(&self) -> Vec<String> {
        self.0
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(String::from)
            .collect()
    }

    fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        match self.0.by_name(name) {
            Ok(mut file) => {
                let mut data = Vec::new();
                file.read_to_end(&mut data)?;
                Ok(Some(data))
            }
            Err(zip::result::ZipError::FileNotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

struct DirectoryArchive {
    root: PathBuf,
    names: Vec<String>,
}

impl DirectoryArchive {
    fn open(root: &Path) -> Result<Self> {
        let assets_path = root.join("assets");
        if !assets_path.exists() {
            return Err(VoxelizerError::InvalidTexturePack(
                "No assets directory found".to_string(),
            ));
        }

        let mut names = Vec::new();
        list_files_recursive(root, &assets_path, &mut names)?;
        Ok(Self {
            root: root.to_path_buf(),
            names,
        })
    }
}

impl PackArchive for DirectoryArchive {
    fn entry_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.root.join(name);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(path)?))
    }
}

/// List files recursively, as slash-separated paths relative to `base`.
fn list_files_recursive(base: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            list_files_recursive(base, &path, out)?;
        } else if let Ok(relative) = path.strip_prefix(base) {
            out.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}

/// Parse an asset path.
/// Returns (namespace, asset_type, asset_path) if valid.
fn parse_asset_path(file_path: &str) -> Option<(&str, &str, &str)> {
    // Expected format: assets/{namespace}/{type}/{path}
    let parts: Vec<&str> = file_path.splitn(4, '/').collect();

    if parts.len() >= 4 && parts[0] == "assets" {
        Some((parts[1], parts[2], parts[3]))
    } else {
        None
    }
}

/// Walk the block models of a pack and build the palette of static cube_all blocks.
fn collect_palette<A: PackArchive>(archive: &mut A) -> Result<TexturePack> {
    let names = archive.entry_names();
    let present: HashSet<&str> = names.iter().map(|s| s.as_str()).collect();

    let mut model_paths: Vec<&str> = names
        .iter()
        .map(|s| s.as_str())
        .filter(|name| {
            matches!(
                parse_asset_path(name),
                Some((_, "models", path)) if path.starts_with("block/") && path.ends_with(".json")
            )
        })
        .collect();
    model_paths.sort_unstable();

    let mut blocks = Vec::new();
    let mut animated = 0usize;

    for model_path in model_paths {
        let Some(contents) = archive.read_entry(model_path)? else {
            continue;
        };
        let model = match serde_json::from_slice::<BlockModel>(&contents) {
            Ok(model) => model,
            Err(e) => {
                log::warn!("Failed to parse block model {}: {}", model_path, e);
                continue;
            }
        };
        if !model.is_cube_all() {
            continue;
        }
        let Some(texture_ref) = model.all_texture() else {
            log::warn!("cube_all model {} has no resolvable 'all' texture", model_path);
            continue;
        };

        let (namespace, texture_path) = parse_resource_location(texture_ref);
        let texture_file = format!("assets/{}/textures/{}.png", namespace, texture_path);

        if present.contains(format!("{}.mcmeta", texture_file).as_str()) {
            animated += 1;
            log::debug!("Skipping animated texture {}", texture_file);
            continue;
        }

        let data = archive
            .read_entry(&texture_file)?
            .ok_or_else(|| VoxelizerError::ResourceNotFound(texture_file.clone()))?;
        let texture = decode_block_texture(&data)?;
        let block_name = texture_path
            .rsplit('/')
            .next()
            .unwrap_or(texture_path)
            .to_string();

        blocks.push((block_name, texture));
    }

    let pack = TexturePack::from_textures(blocks)?;
    log::info!(
        "Loaded {} cube_all blocks ({}px textures, {} animated skipped)",
        pack.len(),
        pack.texture_size(),
        animated
    );
    Ok(pack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn png_bytes(color: [u8; 3], size: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(size, size, image::Rgb(color));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn build_zip(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut buffer));
            let options = zip::write::SimpleFileOptions::default();
            for (name, data) in entries {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
            writer.finish().unwrap();
        }
        buffer
    }

    fn cube_all(texture: &str) -> Vec<u8> {
        format!(
            r#"{{"parent": "minecraft:block/cube_all", "textures": {{"all": "{}"}}}}"#,
            texture
        )
        .into_bytes()
    }

    #[test]
    fn test_parse_asset_path() {
        assert_eq!(
            parse_asset_path("assets/minecraft/models/block/stone.json"),
            Some(("minecraft", "models", "block/stone.json"))
        );
        assert_eq!(
            parse_asset_path("assets/mymod/textures/block/custom.png"),
            Some(("mymod", "textures", "block/custom.png"))
        );
        assert_eq!(parse_asset_path("pack.mcmeta"), None);
    }

    #[test]
    fn test_loads_cube_all_blocks_in_model_order() {
        let zip = build_zip(&[
            ("assets/minecraft/models/block/stone.json", cube_all("minecraft:block/stone")),
            ("assets/minecraft/models/block/dirt.json", cube_all("block/dirt")),
            (
                "assets/minecraft/models/block/oak_log.json",
                br#"{"parent": "minecraft:block/cube_column", "textures": {"end": "block/oak_log_top"}}"#.to_vec(),
            ),
            ("assets/minecraft/textures/block/stone.png", png_bytes([128, 128, 128], 4)),
            ("assets/minecraft/textures/block/dirt.png", png_bytes([120, 80, 40], 4)),
        ]);

        let pack = load_from_bytes(&zip).unwrap();
        assert_eq!(pack.block_names, vec!["dirt", "stone"]);
        assert_eq!(pack.texture_size(), 4);
        assert_eq!(pack.block_colors_rgb[0], [120.0, 80.0, 40.0]);
    }

    #[test]
    fn test_animated_textures_skipped() {
        let zip = build_zip(&[
            ("assets/minecraft/models/block/magma_block.json", cube_all("block/magma")),
            ("assets/minecraft/models/block/stone.json", cube_all("block/stone")),
            ("assets/minecraft/textures/block/magma.png", png_bytes([200, 60, 0], 4)),
            (
                "assets/minecraft/textures/block/magma.png.mcmeta",
                br#"{"animation": {}}"#.to_vec(),
            ),
            ("assets/minecraft/textures/block/stone.png", png_bytes([128, 128, 128], 4)),
        ]);

        let pack = load_from_bytes(&zip).unwrap();
        assert_eq!(pack.block_names, vec!["stone"]);
    }

    #[test]
    fn test_missing_texture_is_fatal() {
        let zip = build_zip(&[(
            "assets/minecraft/models/block/stone.json",
            cube_all("block/stone"),
        )]);

        let result = load_from_bytes(&zip);
        assert!(matches!(result, Err(VoxelizerError::ResourceNotFound(_))));
    }

    #[test]
    fn test_broken_model_json_skipped() {
        let zip = build_zip(&[
            ("assets/minecraft/models/block/broken.json", b"{ not json".to_vec()),
            ("assets/minecraft/models/block/stone.json", cube_all("block/stone")),
            ("assets/minecraft/textures/block/stone.png", png_bytes([128, 128, 128], 4)),
        ]);

        let pack = load_from_bytes(&zip).unwrap();
        assert_eq!(pack.len(), 1);
    }

    #[test]
    fn test_directory_pack() {
        let dir = tempfile::tempdir().unwrap();
        let models = dir.path().join("assets/minecraft/models/block");
        let textures = dir.path().join("assets/minecraft/textures/block");
        std::fs::create_dir_all(&models).unwrap();
        std::fs::create_dir_all(&textures).unwrap();
        std::fs::write(models.join("gold_block.json"), cube_all("block/gold_block")).unwrap();
        std::fs::write(textures.join("gold_block.png"), png_bytes([250, 210, 60], 2)).unwrap();

        let pack = load_from_path(dir.path()).unwrap();
        assert_eq!(pack.block_names, vec!["gold_block"]);
        assert_eq!(pack.texture_size(), 2);
    }

    #[test]
    fn test_directory_without_assets_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_from_path(dir.path()),
            Err(VoxelizerError::InvalidTexturePack(_))
        ));
    }
}
