use serde::{Deserialize, Serialize};

/// Errors from building kernel geometry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("{parameter} must be positive, got {value}")]
    InvalidDimension { parameter: &'static str, value: f64 },

    #[error("section is not constructible: {reason}")]
    InvalidSection { reason: String },

    #[error("need at least {required} segments, got {provided}")]
    InsufficientSegments { required: usize, provided: usize },

    #[error("polygon is degenerate: {reason}")]
    DegeneratePolygon { reason: String },
}

/// Tolerances used by the mesh kernel (millimetres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelTolerance {
    /// Points closer than this to a plane are treated as lying on it.
    pub plane_epsilon: f64,
    /// Polygons with less area than this are dropped.
    pub min_area: f64,
    /// A subtraction removing less than this fraction of the target volume
    /// is treated as having removed nothing.
    pub min_removed_fraction: f64,
    /// Allowed relative volume growth before a subtraction is rejected.
    pub volume_growth: f64,
}

impl Default for KernelTolerance {
    fn default() -> Self {
        Self {
            plane_epsilon: 1e-5,
            min_area: 1e-12,
            min_removed_fraction: 1e-9,
            volume_growth: 1e-9,
        }
    }
}

/// Tessellated triangle mesh for the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderMesh {
    /// Flat array of vertex positions [x0, y0, z0, x1, y1, z1, ...].
    pub vertices: Vec<f32>,
    /// Flat array of vertex normals, parallel to `vertices`.
    pub normals: Vec<f32>,
    /// Triangle indices into the vertex array.
    pub indices: Vec<u32>,
}

impl RenderMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
