//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail instead of
//! panicking, so a test can collect every failure in one pass.

use feature_engine::BatchResult;
use machining_ops::DepthResolver;
use mesh_kernel::{BoundaryMesh, RenderMesh};
use profile_types::{AppliedFeature, ProfileDimensions};

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn pass_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: Some(value),
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn fail_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: Some(value),
        }
    }
}

// ── Volume Oracles ──────────────────────────────────────────────────────────

/// Check that `after` is `expected` smaller than `before`.
pub fn check_volume_removed(
    before: &BoundaryMesh,
    after: &BoundaryMesh,
    expected: f64,
    tolerance: f64,
) -> OracleVerdict {
    let removed = before.volume() - after.volume();
    if (removed - expected).abs() <= tolerance {
        OracleVerdict::pass_val(
            "volume_removed",
            format!("removed {removed:.6} (expected {expected:.6})"),
            removed,
        )
    } else {
        OracleVerdict::fail_val(
            "volume_removed",
            format!("removed {removed:.6}, expected {expected:.6} (tol={tolerance})"),
            removed,
        )
    }
}

/// Machining only ever removes material.
pub fn check_volume_not_increased(before: &BoundaryMesh, after: &BoundaryMesh) -> OracleVerdict {
    let (v0, v1) = (before.volume(), after.volume());
    if v1 <= v0 * (1.0 + 1e-9) {
        OracleVerdict::pass_val("volume_not_increased", format!("{v0:.3} -> {v1:.3}"), v1)
    } else {
        OracleVerdict::fail_val(
            "volume_not_increased",
            format!("volume grew from {v0:.6} to {v1:.6}"),
            v1,
        )
    }
}

/// Two meshes enclose the same volume.
pub fn check_volume_equivalent(
    a: &BoundaryMesh,
    b: &BoundaryMesh,
    tolerance: f64,
) -> OracleVerdict {
    let (va, vb) = (a.volume(), b.volume());
    let delta = (va - vb).abs();
    if delta <= tolerance {
        OracleVerdict::pass_val("volume_equivalent", format!("{va:.6} ≈ {vb:.6}"), delta)
    } else {
        OracleVerdict::fail_val(
            "volume_equivalent",
            format!("{va:.6} vs {vb:.6} differ by {delta:.3e} (tol={tolerance})"),
            delta,
        )
    }
}

// ── Mesh Oracles ────────────────────────────────────────────────────────────

/// Structural problems reported by [`BoundaryMesh::validate`].
pub fn check_mesh_valid(mesh: &BoundaryMesh) -> OracleVerdict {
    let problems = mesh.validate();
    if problems.is_empty() {
        OracleVerdict::pass(
            "mesh_valid",
            format!("{} polygons, no problems", mesh.polygon_count()),
        )
    } else {
        OracleVerdict::fail(
            "mesh_valid",
            format!(
                "{} problems, first: {:?}",
                problems.len(),
                &problems[..problems.len().min(3)]
            ),
        )
    }
}

/// Mesh stays inside the stock envelope `[-L/2, L/2] × [-H/2, H/2] × [-W/2, W/2]`.
pub fn check_within_stock(mesh: &BoundaryMesh, dims: &ProfileDimensions) -> OracleVerdict {
    let Some(bbox) = mesh.bounding_box() else {
        return OracleVerdict::fail("within_stock", "mesh is empty".to_string());
    };
    let half = dims.half_extents();
    let outside = (0..3).find(|&i| bbox.min[i] < -half[i] - 1e-6 || bbox.max[i] > half[i] + 1e-6);
    match outside {
        None => OracleVerdict::pass("within_stock", format!("bbox inside ±{half:?}")),
        Some(axis) => OracleVerdict::fail(
            "within_stock",
            format!(
                "axis {axis}: [{:.3}, {:.3}] exceeds ±{:.3}",
                bbox.min[axis], bbox.max[axis], half[axis]
            ),
        ),
    }
}

/// Check that all index values are within bounds.
pub fn check_valid_indices(mesh: &RenderMesh) -> OracleVerdict {
    let vertex_count = mesh.vertices.len() / 3;
    let bad: Vec<(usize, u32)> = mesh
        .indices
        .iter()
        .enumerate()
        .filter(|(_, &idx)| idx as usize >= vertex_count)
        .map(|(i, &idx)| (i, idx))
        .collect();

    if bad.is_empty() {
        OracleVerdict::pass("valid_indices", format!("all indices < {}", vertex_count))
    } else {
        OracleVerdict::fail(
            "valid_indices",
            format!(
                "{} out-of-bounds indices (vertex_count={}): {:?}",
                bad.len(),
                vertex_count,
                &bad[..bad.len().min(5)]
            ),
        )
    }
}

/// Check that all stored normals have approximately unit length.
pub fn check_unit_normals(mesh: &RenderMesh) -> OracleVerdict {
    let bad = mesh
        .normals
        .chunks_exact(3)
        .filter(|n| ((n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt() - 1.0).abs() > 0.01)
        .count();
    let total = mesh.normals.len() / 3;
    if bad == 0 {
        OracleVerdict::pass("unit_normals", format!("all {total} normals are unit length"))
    } else {
        OracleVerdict::fail("unit_normals", format!("{bad} of {total} normals are not unit"))
    }
}

// ── Feature Oracles ─────────────────────────────────────────────────────────

/// The applied position lies inside the stock envelope.
pub fn check_position_in_envelope(
    applied: &AppliedFeature,
    dims: &ProfileDimensions,
    tolerance: f64,
) -> OracleVerdict {
    let half = dims.half_extents();
    let p = applied.position;
    match (0..3).find(|&i| p[i].abs() > half[i] + tolerance) {
        None => OracleVerdict::pass("position_in_envelope", format!("{} at {p:?}", applied.id)),
        Some(axis) => OracleVerdict::fail_val(
            "position_in_envelope",
            format!(
                "{}: axis {axis} at {:.3} beyond ±{:.3}",
                applied.id, p[axis], half[axis]
            ),
            p[axis],
        ),
    }
}

/// Through holes penetrate at least twice the nominal wall.
pub fn check_through_depth(applied: &AppliedFeature, dims: &ProfileDimensions) -> OracleVerdict {
    if !applied.is_through {
        return OracleVerdict::pass("through_depth", format!("{} is blind", applied.id));
    }
    let nominal = DepthResolver.nominal_thickness(applied.face, dims);
    if applied.depth >= 2.0 * nominal - 1e-9 {
        OracleVerdict::pass_val(
            "through_depth",
            format!("{}: depth {} ≥ 2 × {}", applied.id, applied.depth, nominal),
            applied.depth,
        )
    } else {
        OracleVerdict::fail_val(
            "through_depth",
            format!("{}: depth {} < 2 × {}", applied.id, applied.depth, nominal),
            applied.depth,
        )
    }
}

/// Applied and failed ids partition the submitted ids.
pub fn check_batch_accounting(result: &BatchResult, submitted: &[&str]) -> OracleVerdict {
    let mut seen: Vec<&str> = result
        .applied
        .iter()
        .map(|a| a.id.as_str())
        .chain(result.errors.iter().map(|e| e.feature_id.as_str()))
        .collect();
    let mut expected = submitted.to_vec();
    seen.sort_unstable();
    expected.sort_unstable();
    if seen == expected && result.applied_count == result.applied.len() {
        OracleVerdict::pass(
            "batch_accounting",
            format!("{} applied, {} failed", result.applied_count, result.errors.len()),
        )
    } else {
        OracleVerdict::fail(
            "batch_accounting",
            format!("expected ids {expected:?}, batch reported {seen:?}"),
        )
    }
}

// ── Composite ───────────────────────────────────────────────────────────────

/// Every structural and per-feature check on a finished batch.
pub fn run_batch_checks(
    stock: &BoundaryMesh,
    result: &BatchResult,
    dims: &ProfileDimensions,
) -> Vec<OracleVerdict> {
    let render = result.mesh.to_render_mesh();
    let mut verdicts = vec![
        check_mesh_valid(&result.mesh),
        check_volume_not_increased(stock, &result.mesh),
        check_within_stock(&result.mesh, dims),
        check_valid_indices(&render),
        check_unit_normals(&render),
    ];
    for applied in &result.applied {
        verdicts.push(check_position_in_envelope(applied, dims, 1e-6));
        verdicts.push(check_through_depth(applied, dims));
    }
    verdicts
}
