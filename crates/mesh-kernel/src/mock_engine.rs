//! Deterministic test double implementing BooleanEngine.
//!
//! Records every call and returns the target unchanged, or a scripted
//! failure for selected subtraction calls. Used by feature-engine tests to
//! exercise batching and rollback without real geometry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::boolean::{BooleanEngine, BooleanFailure};
use crate::mesh::BoundaryMesh;

#[derive(Debug, Default)]
pub struct MockBooleanEngine {
    subtract_calls: AtomicUsize,
    union_calls: AtomicUsize,
    intersect_calls: AtomicUsize,
    /// Zero-based subtraction call index → failure to return.
    scripted: HashMap<usize, BooleanFailure>,
}

impl MockBooleanEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `call`-th subtraction (zero-based) fail with `failure`.
    pub fn failing_on(mut self, call: usize, failure: BooleanFailure) -> Self {
        self.scripted.insert(call, failure);
        self
    }

    pub fn subtract_calls(&self) -> usize {
        self.subtract_calls.load(Ordering::SeqCst)
    }

    pub fn union_calls(&self) -> usize {
        self.union_calls.load(Ordering::SeqCst)
    }

    pub fn intersect_calls(&self) -> usize {
        self.intersect_calls.load(Ordering::SeqCst)
    }
}

impl BooleanEngine for MockBooleanEngine {
    fn union(&self, a: &BoundaryMesh, _b: &BoundaryMesh) -> Result<BoundaryMesh, BooleanFailure> {
        self.union_calls.fetch_add(1, Ordering::SeqCst);
        Ok(a.clone())
    }

    fn subtract(
        &self,
        target: &BoundaryMesh,
        _tool: &BoundaryMesh,
    ) -> Result<BoundaryMesh, BooleanFailure> {
        let call = self.subtract_calls.fetch_add(1, Ordering::SeqCst);
        match self.scripted.get(&call) {
            Some(failure) => Err(failure.clone()),
            None => Ok(target.clone()),
        }
    }

    fn intersect(
        &self,
        a: &BoundaryMesh,
        _b: &BoundaryMesh,
    ) -> Result<BoundaryMesh, BooleanFailure> {
        self.intersect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(a.clone())
    }
}
