//! Mesh export formats.
//!
//! This module provides GLB and OBJ exporters for textured voxel meshes.

pub mod gltf;
pub mod obj;

pub use self::gltf::export_glb;
pub use obj::{export_obj, ObjExport};
