//! Assertion helpers with diagnostic output.
//!
//! Every failure names the expected and actual values plus the batch's
//! error list, so a failing scenario explains itself.

use feature_engine::BatchResult;
use profile_types::AppliedFeature;

use crate::helpers::HarnessError;
use crate::oracle::OracleVerdict;

fn error_summary(result: &BatchResult) -> String {
    result
        .errors
        .iter()
        .map(|e| format!("{}: {}", e.feature_id, e.reasons.join("; ")))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// The batch applied `id` and return its metadata.
pub fn assert_applied<'r>(
    result: &'r BatchResult,
    id: &str,
    ctx: &str,
) -> Result<&'r AppliedFeature, HarnessError> {
    result
        .applied
        .iter()
        .find(|a| a.id == id)
        .ok_or_else(|| HarnessError::AssertionFailed {
            detail: format!(
                "[{ctx}] feature {id} was not applied; errors: {}",
                error_summary(result)
            ),
        })
}

/// The batch rejected `id` with a reason containing `needle`.
pub fn assert_failed_with(
    result: &BatchResult,
    id: &str,
    needle: &str,
    ctx: &str,
) -> Result<(), HarnessError> {
    let failure = result
        .errors
        .iter()
        .find(|e| e.feature_id == id)
        .ok_or_else(|| HarnessError::AssertionFailed {
            detail: format!("[{ctx}] feature {id} did not fail"),
        })?;
    if failure.reasons.iter().any(|r| r.contains(needle)) {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{ctx}] feature {id} failed without '{needle}': {:?}",
                failure.reasons
            ),
        })
    }
}

/// The batch error list holds exactly `ids`, in order.
pub fn assert_error_ids(result: &BatchResult, ids: &[&str], ctx: &str) -> Result<(), HarnessError> {
    let actual = result.failed_ids();
    if actual == ids {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{ctx}] expected errors for {ids:?}, got {actual:?} ({})",
                error_summary(result)
            ),
        })
    }
}

/// A point matches the expected one component-wise within `tol`.
pub fn assert_position(
    actual: [f64; 3],
    expected: [f64; 3],
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    for i in 0..3 {
        if (actual[i] - expected[i]).abs() > tol {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{ctx}] position[{i}]: expected {:.6}, got {:.6} (tol={tol})",
                    expected[i], actual[i]
                ),
            });
        }
    }
    Ok(())
}

/// Turn the first failing verdict into an error.
pub fn assert_verdicts(verdicts: &[OracleVerdict]) -> Result<(), HarnessError> {
    match verdicts.iter().find(|v| !v.passed) {
        None => Ok(()),
        Some(v) => Err(HarnessError::OracleFailure {
            oracle: v.oracle_name.clone(),
            detail: v.detail.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::BatchState;
    use mesh_kernel::BoundaryMesh;
    use profile_types::{Face, FeatureFailure};
    use uuid::Uuid;

    fn result() -> BatchResult {
        BatchResult {
            batch_id: Uuid::new_v4(),
            mesh: BoundaryMesh::default(),
            applied_count: 1,
            applied: vec![AppliedFeature {
                id: "A".into(),
                face: Face::Top,
                position: [0.0, 100.0, 0.0],
                diameter: 20.0,
                is_through: true,
                depth: 30.0,
            }],
            errors: vec![FeatureFailure::validation("B", vec!["non-positive diameter 0".into()])],
            warnings: Vec::new(),
            state: BatchState::PartialFailure,
        }
    }

    #[test]
    fn applied_and_failed_lookups() {
        let r = result();
        assert_eq!(assert_applied(&r, "A", "t").unwrap().depth, 30.0);
        assert!(assert_applied(&r, "B", "t").is_err());
        assert!(assert_failed_with(&r, "B", "diameter", "t").is_ok());
        assert!(assert_failed_with(&r, "B", "depth", "t").is_err());
        assert!(assert_error_ids(&r, &["B"], "t").is_ok());
    }

    #[test]
    fn position_tolerance() {
        assert!(assert_position([0.0, 100.0, 0.0], [0.0, 100.0, 1e-9], 1e-6, "t").is_ok());
        let err = assert_position([0.0, 99.0, 0.0], [0.0, 100.0, 0.0], 1e-6, "t").unwrap_err();
        assert!(err.to_string().contains("position[1]"));
    }
}
