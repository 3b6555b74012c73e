use profile_types::{Face, ProfileFamily};

/// A face token or profile code that could not be resolved exactly.
///
/// Never fatal: a default is substituted and the ambiguity is reported as a
/// warning.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformAmbiguity {
    #[error("face token '{token}' is not defined for {family}, using {fallback}")]
    UnknownToken {
        token: String,
        family: ProfileFamily,
        fallback: Face,
    },

    #[error("profile family is unknown, face token '{token}' resolved to {face} without context")]
    UnknownFamily { token: String, face: Face },

    #[error("profile code '{code}' is not recognised, treating profile as UNKNOWN")]
    UnrecognisedProfileCode { code: String },
}

/// One reason a feature is rejected before any geometry is touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
    #[error("non-positive diameter {value}")]
    NonPositiveDiameter { value: f64 },

    #[error("non-positive blind depth ({})", describe_depth(.value))]
    NonPositiveBlindDepth { value: Option<f64> },

    #[error("hole of radius {radius} at offset {offset} does not pass through the wall")]
    ChordAlongWall { offset: f64, radius: f64 },

    #[error("negative coordinate depth {value}")]
    NegativeCoordinateDepth { value: f64 },

    #[error("{field} is not finite")]
    NonFinite { field: &'static str },

    #[error(
        "position ({x}, {y}) outside {face} face bounds x [{x_min}, {x_max}], y [{y_min}, {y_max}]"
    )]
    OutOfBounds {
        face: Face,
        x: f64,
        y: f64,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    },
}

fn describe_depth(value: &Option<f64>) -> String {
    match value {
        Some(v) => format!("got {v}"),
        None => "missing".to_string(),
    }
}

/// Errors from resolving a penetration depth.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DepthError {
    #[error("non-positive blind depth ({})", describe_depth(.value))]
    NonPositiveBlindDepth { value: Option<f64> },

    #[error("hole of radius {radius} at offset {offset} does not pass through the wall")]
    ChordAlongWall { offset: f64, radius: f64 },
}

impl From<DepthError> for Violation {
    fn from(err: DepthError) -> Self {
        match err {
            DepthError::NonPositiveBlindDepth { value } => Violation::NonPositiveBlindDepth { value },
            DepthError::ChordAlongWall { offset, radius } => {
                Violation::ChordAlongWall { offset, radius }
            }
        }
    }
}
