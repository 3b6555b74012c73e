//! STL export from RenderMesh, binary and ASCII, for inspecting machined
//! meshes in an external viewer.

use mesh_kernel::RenderMesh;

use crate::helpers::HarnessError;

/// Triangles with their facet normals, after index validation.
fn facets(mesh: &RenderMesh) -> Result<Vec<([f32; 3], [[f32; 3]; 3])>, HarnessError> {
    if mesh.triangle_count() == 0 {
        return Err(HarnessError::StlError {
            reason: "mesh has no triangles".to_string(),
        });
    }
    let vertex_count = mesh.vertices.len() / 3;
    if let Some(&idx) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(HarnessError::StlError {
            reason: format!("index {idx} out of range (vertex count = {vertex_count})"),
        });
    }

    let vertex = |idx: u32| {
        let i = idx as usize * 3;
        [mesh.vertices[i], mesh.vertices[i + 1], mesh.vertices[i + 2]]
    };
    Ok(mesh
        .indices
        .chunks_exact(3)
        .map(|tri| {
            let [a, b, c] = [vertex(tri[0]), vertex(tri[1]), vertex(tri[2])];
            let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let n = [
                u[1] * v[2] - u[2] * v[1],
                u[2] * v[0] - u[0] * v[2],
                u[0] * v[1] - u[1] * v[0],
            ];
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            let normal = if len > 1e-12 {
                [n[0] / len, n[1] / len, n[2] / len]
            } else {
                [0.0, 0.0, 1.0]
            };
            (normal, [a, b, c])
        })
        .collect())
}

/// Export a RenderMesh as a binary STL file.
///
/// Layout: 80-byte header, u32 triangle count, then per triangle the normal,
/// three vertices (all little-endian f32) and a u16 attribute.
pub fn export_binary_stl(mesh: &RenderMesh, name: &str) -> Result<Vec<u8>, HarnessError> {
    let facets = facets(mesh)?;
    let mut buf = Vec::with_capacity(84 + facets.len() * 50);

    let header = format!("binary STL: {name}");
    let header_bytes = header.as_bytes();
    buf.extend_from_slice(&header_bytes[..header_bytes.len().min(80)]);
    buf.resize(80, 0u8);
    buf.extend_from_slice(&(facets.len() as u32).to_le_bytes());

    for (normal, corners) in &facets {
        for value in normal.iter().chain(corners.iter().flatten()) {
            buf.extend_from_slice(&value.to_le_bytes());
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
    }
    Ok(buf)
}

/// Export a RenderMesh as an ASCII STL string.
pub fn export_ascii_stl(mesh: &RenderMesh, name: &str) -> Result<String, HarnessError> {
    let facets = facets(mesh)?;
    let mut out = String::with_capacity(facets.len() * 300);
    out.push_str(&format!("solid {name}\n"));
    for (n, corners) in &facets {
        out.push_str(&format!("  facet normal {} {} {}\n", n[0], n[1], n[2]));
        out.push_str("    outer loop\n");
        for p in corners {
            out.push_str(&format!("      vertex {} {} {}\n", p[0], p[1], p[2]));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }
    out.push_str(&format!("endsolid {name}\n"));
    Ok(out)
}
