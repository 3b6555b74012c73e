use profile_types::{Axis, Face, ProfileDimensions};
use serde::{Deserialize, Serialize};

/// Legal rectangle of face-local coordinates in the face-centred frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub normal: [f64; 3],
    pub depth_axis: Axis,
}

impl FaceBounds {
    pub fn contains(&self, x: f64, y: f64, tolerance: f64) -> bool {
        x >= self.x_min - tolerance
            && x <= self.x_max + tolerance
            && y >= self.y_min - tolerance
            && y <= self.y_max + tolerance
    }

    pub fn x_span(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn y_span(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.x_span() > 0.0 && self.y_span() > 0.0)
    }
}

/// Computes [`FaceBounds`] from the face and profile dimensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceBoundsCalculator;

impl FaceBoundsCalculator {
    /// Long faces run `x ∈ [0, L]` from the profile start; the end faces are
    /// centred in both directions.
    pub fn bounds(&self, face: Face, dims: &ProfileDimensions) -> FaceBounds {
        let (l, h, w) = (dims.length(), dims.height(), dims.section_width());
        let (x_min, x_max, y_min, y_max) = match face {
            Face::Top | Face::Bottom => (0.0, l, -0.5 * w, 0.5 * w),
            Face::Left | Face::Right => (0.0, l, -0.5 * h, 0.5 * h),
            Face::Front | Face::Back => (-0.5 * w, 0.5 * w, -0.5 * h, 0.5 * h),
        };
        FaceBounds {
            x_min,
            x_max,
            y_min,
            y_max,
            normal: face.normal(),
            depth_axis: face.depth_axis(),
        }
    }
}
