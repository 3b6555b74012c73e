use machining_ops::{DepthError, Violation};
use mesh_kernel::{BooleanFailure, BoundaryMesh, KernelError};
use profile_types::{AppliedFeature, FeatureFailure};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    /// Session opened, no feature in progress.
    Pending,
    /// Validating, transforming and sizing a feature.
    Transforming,
    /// Handing a tool to the boolean engine.
    Subtracting,
    /// Every feature was applied.
    Done,
    /// At least one feature was skipped.
    PartialFailure,
}

impl BatchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, BatchState::Done | BatchState::PartialFailure)
    }
}

/// Why a single feature could not be applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApplyError {
    #[error("{}", join_violations(.0))]
    Validation(Vec<Violation>),

    #[error(transparent)]
    Depth(#[from] DepthError),

    #[error("tool construction failed: {0}")]
    Tool(#[from] KernelError),

    #[error("subtraction failed: {0}")]
    Subtraction(#[from] BooleanFailure),
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ApplyError {
    /// Convert into the per-feature record reported to callers.
    pub fn into_failure(self, feature_id: impl Into<String>) -> FeatureFailure {
        match self {
            ApplyError::Validation(violations) => FeatureFailure::validation(
                feature_id,
                violations.iter().map(ToString::to_string).collect(),
            ),
            ApplyError::Depth(err) => FeatureFailure::validation(feature_id, vec![err.to_string()]),
            err @ (ApplyError::Tool(_) | ApplyError::Subtraction(_)) => {
                FeatureFailure::subtraction(feature_id, err.to_string())
            }
        }
    }
}

/// Outcome of a finished batch. The mesh is always returned, with only the
/// successfully applied subset cut into it.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub batch_id: Uuid,
    pub mesh: BoundaryMesh,
    pub applied_count: usize,
    pub applied: Vec<AppliedFeature>,
    pub errors: Vec<FeatureFailure>,
    pub warnings: Vec<String>,
    pub state: BatchState,
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Ids of features that were skipped, in batch order.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.feature_id.as_str()).collect()
    }

    pub fn report(&self) -> BatchReport {
        BatchReport {
            batch_id: self.batch_id,
            state: self.state,
            applied_count: self.applied_count,
            applied: self.applied.clone(),
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
        }
    }
}

/// Serialisable summary of a batch for the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub state: BatchState,
    pub applied_count: usize,
    pub applied: Vec<AppliedFeature>,
    pub errors: Vec<FeatureFailure>,
    pub warnings: Vec<String>,
}

impl BatchReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
