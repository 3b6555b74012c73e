//! Helper functions: error type, profile fixtures, feature builders, mesh math.

use feature_engine::ApplyError;
use mesh_kernel::{KernelError, RenderMesh};
use profile_types::{
    DimensionError, HoleFeature, MachineCoordinate, ProfileDimensions, ProfileFamily,
};

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("invalid fixture dimensions: {0}")]
    Dimension(#[from] DimensionError),

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("feature {id} failed: {source}")]
    Apply {
        id: String,
        #[source]
        source: ApplyError,
    },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("STL error: {reason}")]
    StlError { reason: String },

    #[error("duplicate feature id: {id}")]
    DuplicateId { id: String },
}

// ── Profile Fixtures ────────────────────────────────────────────────────────

/// IPE-like beam: 1000 long, 200 high, 100 wide, tf = 15, tw = 8.
pub fn i_beam() -> Result<ProfileDimensions, HarnessError> {
    Ok(ProfileDimensions::new(ProfileFamily::IProfile, 1000.0, 200.0, 100.0)?
        .with_flange_thickness(15.0)?
        .with_web_thickness(8.0)?)
}

/// Flat plate 400 × 300, 10 thick.
pub fn plate() -> Result<ProfileDimensions, HarnessError> {
    Ok(ProfileDimensions::new(ProfileFamily::Plate, 400.0, 300.0, 10.0)?
        .with_web_thickness(10.0)?)
}

/// Channel 600 long, 160 high, 70 wide.
pub fn channel() -> Result<ProfileDimensions, HarnessError> {
    Ok(ProfileDimensions::new(ProfileFamily::UProfile, 600.0, 160.0, 70.0)?
        .with_web_thickness(7.0)?
        .with_flange_thickness(10.0)?)
}

/// Equal-leg angle 500 long, 80 × 80 × 8.
pub fn angle() -> Result<ProfileDimensions, HarnessError> {
    Ok(ProfileDimensions::new(ProfileFamily::LProfile, 500.0, 80.0, 80.0)?
        .with_web_thickness(8.0)?
        .with_flange_thickness(8.0)?)
}

/// Rectangular hollow section 500 long, 100 × 60, wall 4.
pub fn rect_tube() -> Result<ProfileDimensions, HarnessError> {
    Ok(ProfileDimensions::new(ProfileFamily::TubeRect, 500.0, 100.0, 60.0)?
        .with_wall_thickness(4.0)?)
}

/// Circular hollow section 500 long, Ø100, wall 5.
pub fn round_tube() -> Result<ProfileDimensions, HarnessError> {
    Ok(ProfileDimensions::new(ProfileFamily::TubeRound, 500.0, 100.0, 100.0)?
        .with_wall_thickness(5.0)?)
}

// ── Feature Builders ────────────────────────────────────────────────────────

pub fn through(id: &str, face: &str, x: f64, y: f64, diameter: f64) -> HoleFeature {
    HoleFeature::through(id, MachineCoordinate::new(face, x, y, 0.0), diameter)
}

pub fn blind(id: &str, face: &str, x: f64, y: f64, diameter: f64, depth: f64) -> HoleFeature {
    HoleFeature::blind(id, MachineCoordinate::new(face, x, y, 0.0), diameter, depth)
}

/// `count` through holes on `face`, evenly spaced along X starting at `x0`.
pub fn hole_row(
    prefix: &str,
    face: &str,
    x0: f64,
    pitch: f64,
    y: f64,
    diameter: f64,
    count: usize,
) -> Vec<HoleFeature> {
    (0..count)
        .map(|i| through(&format!("{prefix}{i}"), face, x0 + pitch * i as f64, y, diameter))
        .collect()
}

// ── Mesh Math Utilities ─────────────────────────────────────────────────────

/// Axis-aligned bounding box of a RenderMesh, or `None` when it has no
/// vertices.
pub fn mesh_bounding_box(mesh: &RenderMesh) -> Option<([f32; 3], [f32; 3])> {
    if mesh.vertices.len() < 3 {
        return None;
    }
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for chunk in mesh.vertices.chunks(3) {
        for i in 0..3 {
            min[i] = min[i].min(chunk[i]);
            max[i] = max[i].max(chunk[i]);
        }
    }
    Some((min, max))
}

/// Enclosed volume of a closed triangle mesh (divergence theorem).
pub fn mesh_volume(mesh: &RenderMesh) -> f64 {
    let verts = &mesh.vertices;
    let vertex = |idx: u32| -> Option<[f64; 3]> {
        let i = idx as usize * 3;
        verts
            .get(i..i + 3)
            .map(|v| [v[0] as f64, v[1] as f64, v[2] as f64])
    };

    let mut volume = 0.0f64;
    for tri in mesh.indices.chunks_exact(3) {
        let (Some(a), Some(b), Some(c)) = (vertex(tri[0]), vertex(tri[1]), vertex(tri[2])) else {
            continue;
        };
        // Signed volume of the tetrahedron spanned with the origin
        volume += a[0] * (b[1] * c[2] - c[1] * b[2]) + b[0] * (c[1] * a[2] - a[1] * c[2])
            + c[0] * (a[1] * b[2] - b[1] * a[2]);
    }
    (volume / 6.0).abs()
}
