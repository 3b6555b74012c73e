//! Boolean (CSG) evaluation on boundary meshes.

use tracing::{debug, instrument, warn};

use crate::bsp::Node;
use crate::mesh::BoundaryMesh;
use crate::types::KernelTolerance;

/// The three set operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    Union,
    Difference,
    Intersection,
}

/// Why a boolean evaluation produced no usable solid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BooleanFailure {
    #[error("bounding boxes don't intersect, no boolean interaction")]
    NoOverlap,

    #[error("degenerate result (empty solid)")]
    DegenerateResult,

    #[error("result contains non-finite coordinates")]
    InvalidGeometry,

    #[error("volume increased from {before:.6} to {after:.6}")]
    VolumeIncreased { before: f64, after: f64 },

    #[error("tool removed no material (removed {removed:.3e})")]
    NoMaterialRemoved { removed: f64 },
}

/// Boolean operations on boundary meshes.
///
/// Implement this trait to provide alternative backends or test doubles.
pub trait BooleanEngine: Send + Sync {
    /// Compute the union of two solids.
    fn union(&self, a: &BoundaryMesh, b: &BoundaryMesh) -> Result<BoundaryMesh, BooleanFailure>;

    /// Subtract `tool` from `target`.
    fn subtract(
        &self,
        target: &BoundaryMesh,
        tool: &BoundaryMesh,
    ) -> Result<BoundaryMesh, BooleanFailure>;

    /// Compute the intersection of two solids.
    fn intersect(&self, a: &BoundaryMesh, b: &BoundaryMesh)
        -> Result<BoundaryMesh, BooleanFailure>;
}

/// BSP-tree evaluator over convex polygons.
#[derive(Debug, Clone, Default)]
pub struct BspBooleanEngine {
    pub tolerance: KernelTolerance,
}

impl BspBooleanEngine {
    pub fn new(tolerance: KernelTolerance) -> Self {
        Self { tolerance }
    }

    fn evaluate(&self, a: &BoundaryMesh, b: &BoundaryMesh, op: BoolOp) -> BoundaryMesh {
        let eps = self.tolerance.plane_epsilon;
        let mut na = Node::new(a.polygons.clone(), eps);
        let mut nb = Node::new(b.polygons.clone(), eps);

        match op {
            BoolOp::Union => {
                na.clip_to(&nb);
                nb.clip_to(&na);
                nb.invert();
                nb.clip_to(&na);
                nb.invert();
                na.build(nb.all_polygons());
            }
            BoolOp::Difference => {
                na.invert();
                na.clip_to(&nb);
                nb.clip_to(&na);
                nb.invert();
                nb.clip_to(&na);
                nb.invert();
                na.build(nb.all_polygons());
                na.invert();
            }
            BoolOp::Intersection => {
                na.invert();
                nb.clip_to(&na);
                nb.invert();
                na.clip_to(&nb);
                nb.clip_to(&na);
                na.build(nb.all_polygons());
                na.invert();
            }
        }

        let min_area = self.tolerance.min_area;
        let polygons = na
            .all_polygons()
            .into_iter()
            .filter(|p| p.area() > min_area)
            .collect();
        BoundaryMesh {
            polygons,
            metadata: a.metadata.clone(),
        }
    }
}

impl BooleanEngine for BspBooleanEngine {
    #[instrument(skip_all, fields(a = a.polygon_count(), b = b.polygon_count()))]
    fn union(&self, a: &BoundaryMesh, b: &BoundaryMesh) -> Result<BoundaryMesh, BooleanFailure> {
        let result = self.evaluate(a, b, BoolOp::Union);
        if !result.is_finite() {
            return Err(BooleanFailure::InvalidGeometry);
        }
        if result.is_empty() {
            return Err(BooleanFailure::DegenerateResult);
        }
        Ok(result)
    }

    #[instrument(skip_all, fields(target = target.polygon_count(), tool = tool.polygon_count()))]
    fn subtract(
        &self,
        target: &BoundaryMesh,
        tool: &BoundaryMesh,
    ) -> Result<BoundaryMesh, BooleanFailure> {
        let (Some(bb_target), Some(bb_tool)) = (target.bounding_box(), tool.bounding_box()) else {
            return Err(BooleanFailure::DegenerateResult);
        };
        if !bb_target.intersects(&bb_tool, 0.0) {
            warn!("tool does not overlap target");
            return Err(BooleanFailure::NoOverlap);
        }

        let before = target.volume();
        let result = self.evaluate(target, tool, BoolOp::Difference);

        if !result.is_finite() {
            return Err(BooleanFailure::InvalidGeometry);
        }
        if result.is_empty() {
            return Err(BooleanFailure::DegenerateResult);
        }
        let after = result.volume();
        if after <= 0.0 {
            return Err(BooleanFailure::DegenerateResult);
        }
        if after > before * (1.0 + self.tolerance.volume_growth) {
            return Err(BooleanFailure::VolumeIncreased { before, after });
        }
        let removed = before - after;
        if removed <= before * self.tolerance.min_removed_fraction {
            return Err(BooleanFailure::NoMaterialRemoved { removed });
        }

        debug!(before, after, polygons = result.polygon_count(), "subtraction complete");
        Ok(result)
    }

    #[instrument(skip_all, fields(a = a.polygon_count(), b = b.polygon_count()))]
    fn intersect(
        &self,
        a: &BoundaryMesh,
        b: &BoundaryMesh,
    ) -> Result<BoundaryMesh, BooleanFailure> {
        match (a.bounding_box(), b.bounding_box()) {
            (Some(ba), Some(bb)) if ba.intersects(&bb, 0.0) => {}
            _ => return Err(BooleanFailure::NoOverlap),
        }
        let result = self.evaluate(a, b, BoolOp::Intersection);
        if !result.is_finite() {
            return Err(BooleanFailure::InvalidGeometry);
        }
        if result.is_empty() || result.volume() <= 0.0 {
            return Err(BooleanFailure::DegenerateResult);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod trait_tests {
    use super::*;
    use crate::primitives::make_box;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn cube(min: f64, max: f64) -> BoundaryMesh {
        make_box(Point3::new(min, min, min), Point3::new(max, max, max)).unwrap()
    }

    #[test]
    fn test_boolean_engine_trait_union() {
        let engine = BspBooleanEngine::default();
        let result = engine.union(&cube(0.0, 2.0), &cube(1.0, 3.0)).unwrap();
        assert_relative_eq!(result.volume(), 8.0 + 8.0 - 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_boolean_engine_trait_subtract() {
        let engine = BspBooleanEngine::default();
        let result = engine.subtract(&cube(0.0, 2.0), &cube(1.0, 3.0)).unwrap();
        assert_relative_eq!(result.volume(), 7.0, epsilon = 1e-9);
    }

    #[test]
    fn test_boolean_engine_trait_intersect() {
        let engine = BspBooleanEngine::default();
        let result = engine.intersect(&cube(0.0, 2.0), &cube(1.0, 3.0)).unwrap();
        assert_relative_eq!(result.volume(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn subtract_disjoint_tool_is_no_overlap() {
        let engine = BspBooleanEngine::default();
        let err = engine.subtract(&cube(0.0, 1.0), &cube(5.0, 6.0)).unwrap_err();
        assert_eq!(err, BooleanFailure::NoOverlap);
    }

    #[test]
    fn subtract_everything_is_degenerate() {
        let engine = BspBooleanEngine::default();
        let err = engine.subtract(&cube(1.0, 2.0), &cube(0.0, 3.0)).unwrap_err();
        assert_eq!(err, BooleanFailure::DegenerateResult);
    }

    #[test]
    fn subtract_keeps_target_metadata() {
        let engine = BspBooleanEngine::default();
        let target = cube(0.0, 2.0).with_label("stock");
        let result = engine.subtract(&target, &cube(1.0, 3.0)).unwrap();
        assert_eq!(result.metadata.label.as_deref(), Some("stock"));
    }
}
