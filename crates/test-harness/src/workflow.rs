//! MachiningJob: a fluent API for scripting machining batches in tests.
//!
//! Features are referred to by their string ids. The stock mesh is built
//! once and every run works on a fresh clone of it.

use feature_engine::{BatchResult, FeatureApplicator};
use machining_ops::MachiningConfig;
use mesh_kernel::{BooleanEngine, BoundaryMesh, BspBooleanEngine, MockBooleanEngine};
use profile_types::{AppliedFeature, HoleFeature, ProfileDimensions};

use crate::helpers::{self, HarnessError};
use crate::oracle;
use crate::stl;

/// A profile, its stock mesh and an ordered list of features to cut.
pub struct MachiningJob<E: BooleanEngine = BspBooleanEngine> {
    applicator: FeatureApplicator<E>,
    dims: ProfileDimensions,
    stock: BoundaryMesh,
    features: Vec<HoleFeature>,
}

impl MachiningJob<BspBooleanEngine> {
    /// Real geometry with the default configuration.
    pub fn new(dims: ProfileDimensions) -> Result<Self, HarnessError> {
        Self::with_config(dims, MachiningConfig::default())
    }

    pub fn with_config(
        dims: ProfileDimensions,
        config: MachiningConfig,
    ) -> Result<Self, HarnessError> {
        Self::with_applicator(dims, FeatureApplicator::with_default_engine(config))
    }
}

impl MachiningJob<MockBooleanEngine> {
    /// Mock engine: every subtraction succeeds and leaves the mesh as is.
    pub fn mock(dims: ProfileDimensions) -> Result<Self, HarnessError> {
        Self::with_applicator(
            dims,
            FeatureApplicator::new(MachiningConfig::preview(), MockBooleanEngine::new()),
        )
    }
}

impl<E: BooleanEngine> MachiningJob<E> {
    pub fn with_applicator(
        dims: ProfileDimensions,
        applicator: FeatureApplicator<E>,
    ) -> Result<Self, HarnessError> {
        let stock = applicator.stock(&dims)?;
        Ok(Self {
            applicator,
            dims,
            stock,
            features: Vec::new(),
        })
    }

    pub fn dims(&self) -> &ProfileDimensions {
        &self.dims
    }

    pub fn stock(&self) -> &BoundaryMesh {
        &self.stock
    }

    pub fn applicator(&self) -> &FeatureApplicator<E> {
        &self.applicator
    }

    pub fn features(&self) -> &[HoleFeature] {
        &self.features
    }

    /// Queue a feature. Ids must be unique within a job.
    pub fn feature(&mut self, feature: HoleFeature) -> Result<&mut Self, HarnessError> {
        if self.features.iter().any(|f| f.id == feature.id) {
            return Err(HarnessError::DuplicateId { id: feature.id });
        }
        self.features.push(feature);
        Ok(self)
    }

    pub fn through(
        &mut self,
        id: &str,
        face: &str,
        x: f64,
        y: f64,
        diameter: f64,
    ) -> Result<&mut Self, HarnessError> {
        self.feature(helpers::through(id, face, x, y, diameter))
    }

    pub fn blind(
        &mut self,
        id: &str,
        face: &str,
        x: f64,
        y: f64,
        diameter: f64,
        depth: f64,
    ) -> Result<&mut Self, HarnessError> {
        self.feature(helpers::blind(id, face, x, y, diameter, depth))
    }

    // ── Running ─────────────────────────────────────────────────────────

    /// Apply every queued feature, in order, to a copy of the stock.
    pub fn run(&self) -> BatchResult {
        self.run_features(&self.features)
    }

    /// Apply the queued features in reverse order.
    pub fn run_reversed(&self) -> BatchResult {
        let reversed: Vec<HoleFeature> = self.features.iter().rev().cloned().collect();
        self.run_features(&reversed)
    }

    /// Apply only the features whose ids are listed, keeping queue order.
    pub fn run_only(&self, ids: &[&str]) -> BatchResult {
        let subset: Vec<HoleFeature> = self
            .features
            .iter()
            .filter(|f| ids.contains(&f.id.as_str()))
            .cloned()
            .collect();
        self.run_features(&subset)
    }

    pub fn run_features(&self, features: &[HoleFeature]) -> BatchResult {
        self.applicator
            .apply_batch(self.stock.clone(), &self.dims, features)
    }

    /// Cut a single queued feature into fresh stock, failing loudly.
    pub fn apply_one(&self, id: &str) -> Result<AppliedFeature, HarnessError> {
        let feature = self
            .features
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| HarnessError::AssertionFailed {
                detail: format!("no queued feature {id}"),
            })?;
        let mut session = self.applicator.begin(self.stock.clone(), &self.dims);
        session
            .apply_feature(feature)
            .map_err(|source| HarnessError::Apply {
                id: id.to_string(),
                source,
            })
    }

    /// Run and require every batch oracle to pass.
    pub fn run_checked(&self) -> Result<BatchResult, HarnessError> {
        let result = self.run();
        let verdicts = oracle::run_batch_checks(&self.stock, &result, &self.dims);
        crate::assertions::assert_verdicts(&verdicts)?;
        Ok(result)
    }

    /// Binary STL of a batch's mesh, for debugging.
    pub fn export_stl(&self, result: &BatchResult, name: &str) -> Result<Vec<u8>, HarnessError> {
        stl::export_binary_stl(&result.mesh.to_render_mesh(), name)
    }
}
