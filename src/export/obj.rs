//! Wavefront OBJ export.
//!
//! OBJ shares the mesh's bottom-left UV origin, so coordinates are written
//! unchanged. The atlas is referenced from the `.mtl` as `<name>_atlas.png`.

use crate::error::{Result, VoxelizerError};
use crate::mesher::TexturedVoxelMesh;
use std::fmt::Write;

/// Export a voxel mesh to OBJ format.
/// Returns (obj_content, mtl_content) as strings.
pub fn export_obj(output: &TexturedVoxelMesh, name: &str) -> Result<(String, String)> {
    let mut obj = String::with_capacity(256 + output.mesh.vertex_count() * 100);
    let mut mtl = String::with_capacity(256);
    write_obj(&mut obj, output, name)
        .and_then(|_| write_mtl(&mut mtl, name))
        .map_err(|e| VoxelizerError::Export(format!("Failed to format OBJ: {}", e)))?;
    Ok((obj, mtl))
}

fn write_obj(obj: &mut String, output: &TexturedVoxelMesh, name: &str) -> std::fmt::Result {
    let mesh = &output.mesh;

    writeln!(obj, "# Block Voxelizer OBJ Export")?;
    writeln!(obj, "# Voxels: {}", output.voxel_count())?;
    writeln!(obj, "# Blocks: {}", output.atlas.block_names().join(", "))?;
    writeln!(obj)?;
    writeln!(obj, "mtllib {}.mtl", name)?;
    writeln!(obj, "o {}", name)?;
    writeln!(obj)?;

    for vertex in &mesh.vertices {
        let [x, y, z] = vertex.position;
        writeln!(obj, "v {} {} {}", x, y, z)?;
    }
    for vertex in &mesh.vertices {
        writeln!(obj, "vt {} {}", vertex.uv[0], vertex.uv[1])?;
    }
    for vertex in &mesh.vertices {
        let [x, y, z] = vertex.normal;
        writeln!(obj, "vn {} {} {}", x, y, z)?;
    }
    writeln!(obj)?;

    writeln!(obj, "usemtl {}_material", name)?;
    for triangle in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0] + 1, triangle[1] + 1, triangle[2] + 1];
        writeln!(obj, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
    }
    Ok(())
}

fn write_mtl(mtl: &mut String, name: &str) -> std::fmt::Result {
    writeln!(mtl, "# Block Voxelizer Material")?;
    writeln!(mtl)?;
    writeln!(mtl, "newmtl {}_material", name)?;
    writeln!(mtl, "Ka 1.0 1.0 1.0")?;
    writeln!(mtl, "Kd 1.0 1.0 1.0")?;
    writeln!(mtl, "Ks 0.0 0.0 0.0")?;
    writeln!(mtl, "Ns 10.0")?;
    writeln!(mtl, "d 1.0")?;
    writeln!(mtl, "illum 1")?;
    writeln!(mtl, "map_Kd {}_atlas.png", name)?;
    Ok(())
}

/// OBJ, MTL and atlas PNG contents ready to be written side by side.
pub struct ObjExport {
    pub obj: String,
    pub mtl: String,
    pub texture_png: Vec<u8>,
}

impl ObjExport {
    pub fn from_output(output: &TexturedVoxelMesh, name: &str) -> Result<Self> {
        let (obj, mtl) = export_obj(output, name)?;
        let texture_png = output.atlas.to_png()?;
        Ok(Self {
            obj,
            mtl,
            texture_png,
        })
    }

    /// File name of the atlas referenced by the MTL.
    pub fn texture_filename(name: &str) -> String {
        format!("{}_atlas.png", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::BlockAtlas;
    use crate::mesher::{Mesh, Vertex};
    use std::sync::Arc;

    #[test]
    fn test_export_simple_obj() {
        let mut mesh = Mesh::new();
        let v0 = mesh.add_vertex(Vertex::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]));
        let v1 = mesh.add_vertex(Vertex::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]));
        let v2 = mesh.add_vertex(Vertex::new([0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 0.5]));
        mesh.add_triangle(v0, v1, v2);
        let bounds = mesh.bounds();
        let output = TexturedVoxelMesh {
            mesh,
            atlas: Arc::new(BlockAtlas::placeholder()),
            bounds,
        };

        let (obj, mtl) = export_obj(&output, "test").unwrap();

        assert!(obj.contains("mtllib test.mtl"));
        assert!(obj.contains("v 0 0 0"));
        assert!(obj.contains("vt 0 0.5"));
        assert!(obj.contains("vn 0 1 0"));
        assert!(obj.contains("f 1/1/1 2/2/2 3/3/3"));
        assert!(mtl.contains("newmtl test_material"));
        assert!(mtl.contains(&format!("map_Kd {}", ObjExport::texture_filename("test"))));

        let export = ObjExport::from_output(&output, "test").unwrap();
        assert!(export.texture_png.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
