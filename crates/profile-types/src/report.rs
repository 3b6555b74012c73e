//! Records handed to the rendering side once a batch has run.

use serde::{Deserialize, Serialize};

use crate::face::Face;

/// Metadata for one hole that was cut into the mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFeature {
    pub id: String,
    pub face: Face,
    pub position: [f64; 3],
    pub diameter: f64,
    pub is_through: bool,
    /// Resolved penetration depth used to size the tool.
    pub depth: f64,
}

/// Why a feature was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rejected before any geometry was touched.
    Validation,
    /// The boolean evaluator could not cut the tool; the mesh was rolled back.
    Subtraction,
}

/// A rejected or failed feature with human-readable reasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFailure {
    pub feature_id: String,
    pub reasons: Vec<String>,
    pub kind: FailureKind,
}

impl FeatureFailure {
    pub fn validation(feature_id: impl Into<String>, reasons: Vec<String>) -> Self {
        Self {
            feature_id: feature_id.into(),
            reasons,
            kind: FailureKind::Validation,
        }
    }

    pub fn subtraction(feature_id: impl Into<String>, reason: String) -> Self {
        Self {
            feature_id: feature_id.into(),
            reasons: vec![reason],
            kind: FailureKind::Subtraction,
        }
    }
}
