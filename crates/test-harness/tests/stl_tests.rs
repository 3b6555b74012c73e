//! Tests for STL export functionality.

use mesh_kernel::RenderMesh;
use test_harness::helpers::{self, mesh_volume};
use test_harness::stl::{export_ascii_stl, export_binary_stl};
use test_harness::{HarnessError, MachiningJob};

fn make_triangle_mesh() -> RenderMesh {
    RenderMesh {
        vertices: vec![
            0.0, 0.0, 0.0, // v0
            1.0, 0.0, 0.0, // v1
            0.0, 1.0, 0.0, // v2
        ],
        normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        indices: vec![0, 1, 2],
    }
}

#[test]
fn binary_stl_layout() {
    let stl = export_binary_stl(&make_triangle_mesh(), "test").unwrap();
    assert_eq!(stl.len(), 80 + 4 + 50);
    let header = String::from_utf8_lossy(&stl[..80]);
    assert!(header.contains("test"));
    assert_eq!(u32::from_le_bytes([stl[80], stl[81], stl[82], stl[83]]), 1);
    // Facet normal z component.
    assert_eq!(f32::from_le_bytes([stl[92], stl[93], stl[94], stl[95]]), 1.0);
}

#[test]
fn ascii_stl_structure() {
    let stl = export_ascii_stl(&make_triangle_mesh(), "tri").unwrap();
    assert!(stl.starts_with("solid tri\n"));
    assert!(stl.ends_with("endsolid tri\n"));
    assert_eq!(stl.matches("facet normal").count(), 1);
    assert_eq!(stl.matches("vertex ").count(), 3);
}

#[test]
fn empty_and_broken_meshes_are_rejected() {
    let err = export_binary_stl(&RenderMesh::default(), "empty").unwrap_err();
    assert!(matches!(err, HarnessError::StlError { .. }));

    let mut broken = make_triangle_mesh();
    broken.indices[2] = 7;
    let err = export_ascii_stl(&broken, "broken").unwrap_err();
    assert!(err.to_string().contains("out of range"));
}

#[test]
fn machined_plate_exports_with_matching_volume() {
    let mut job = MachiningJob::new(helpers::plate().unwrap()).unwrap();
    job.through("P1", "v", 120.0, 150.0, 30.0).unwrap();
    let result = job.run();
    assert!(result.is_success());

    let render = result.mesh.to_render_mesh();
    let stl = job.export_stl(&result, "plate").unwrap();
    assert_eq!(stl.len(), 84 + 50 * render.triangle_count());

    // f32 buffers lose some precision against the f64 mesh.
    let relative = (mesh_volume(&render) - result.mesh.volume()).abs() / result.mesh.volume();
    assert!(relative < 1e-5, "relative volume error {relative}");
}
