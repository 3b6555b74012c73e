use machining_ops::{
    CoordinateTransformPipeline, DepthResolver, FaceResolver, FeatureValidator, MachiningConfig,
};
use mesh_kernel::{make_profile_solid, BooleanEngine, BoundaryMesh, BspBooleanEngine, KernelError};
use profile_types::{AppliedFeature, FeatureFailure, FeatureRecord, HoleFeature, ProfileDimensions};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::tool::ToolPlacement;
use crate::types::{ApplyError, BatchResult, BatchState};

/// Cuts hole features into a boundary mesh.
///
/// Immutable once built; one applicator can drive any number of batches,
/// including from several threads at once.
pub struct FeatureApplicator<E: BooleanEngine = BspBooleanEngine> {
    config: MachiningConfig,
    resolver: FaceResolver,
    validator: FeatureValidator,
    pipeline: CoordinateTransformPipeline,
    engine: E,
}

impl<E: BooleanEngine> std::fmt::Debug for FeatureApplicator<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureApplicator")
            .field("config", &self.config)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl FeatureApplicator<BspBooleanEngine> {
    pub fn with_default_engine(config: MachiningConfig) -> Self {
        Self::new(config, BspBooleanEngine::default())
    }
}

impl Default for FeatureApplicator<BspBooleanEngine> {
    fn default() -> Self {
        Self::with_default_engine(MachiningConfig::default())
    }
}

impl<E: BooleanEngine> FeatureApplicator<E> {
    pub fn new(config: MachiningConfig, engine: E) -> Self {
        Self {
            resolver: FaceResolver::new(config.face_rules.clone()),
            validator: FeatureValidator::new(&config),
            pipeline: CoordinateTransformPipeline::from_config(&config),
            config,
            engine,
        }
    }

    pub fn config(&self) -> &MachiningConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn pipeline(&self) -> &CoordinateTransformPipeline {
        &self.pipeline
    }

    /// Unmachined stock for `dims`, tessellated like the tools.
    pub fn stock(&self, dims: &ProfileDimensions) -> Result<BoundaryMesh, KernelError> {
        make_profile_solid(dims, self.config.tool.cylinder_segments)
    }

    /// Open a batch. The session owns `mesh` until [`BatchSession::finish`].
    pub fn begin<'a>(
        &'a self,
        mesh: BoundaryMesh,
        dims: &'a ProfileDimensions,
    ) -> BatchSession<'a, E> {
        let id = Uuid::new_v4();
        info!(batch = %id, family = %dims.family(), "batch opened");
        BatchSession {
            applicator: self,
            dims,
            id,
            mesh,
            state: BatchState::Pending,
            applied: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Apply `features` in order and return the finished batch.
    pub fn apply_batch(
        &self,
        mesh: BoundaryMesh,
        dims: &ProfileDimensions,
        features: &[HoleFeature],
    ) -> BatchResult {
        let mut session = self.begin(mesh, dims);
        session.apply_all(features);
        session.finish()
    }

    /// Like [`apply_batch`](Self::apply_batch) for raw parser records.
    pub fn apply_records(
        &self,
        mesh: BoundaryMesh,
        dims: &ProfileDimensions,
        records: &[FeatureRecord],
    ) -> BatchResult {
        let features: Vec<HoleFeature> = records.iter().cloned().map(HoleFeature::from).collect();
        self.apply_batch(mesh, dims, &features)
    }
}

/// One batch in flight. Features are applied strictly in sequence, each
/// subtraction seeing the result of the previous one.
#[derive(Debug)]
pub struct BatchSession<'a, E: BooleanEngine = BspBooleanEngine> {
    applicator: &'a FeatureApplicator<E>,
    dims: &'a ProfileDimensions,
    id: Uuid,
    mesh: BoundaryMesh,
    state: BatchState,
    applied: Vec<AppliedFeature>,
    errors: Vec<FeatureFailure>,
    warnings: Vec<String>,
}

impl<'a, E: BooleanEngine> BatchSession<'a, E> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// The mesh as it stands after the features applied so far.
    pub fn mesh(&self) -> &BoundaryMesh {
        &self.mesh
    }

    pub fn applied(&self) -> &[AppliedFeature] {
        &self.applied
    }

    pub fn errors(&self) -> &[FeatureFailure] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Apply one feature. On failure the error is recorded, the mesh is left
    /// as it was before this feature and the session stays usable.
    #[instrument(skip_all, fields(batch = %self.id, feature = %feature.id))]
    pub fn apply_feature(&mut self, feature: &HoleFeature) -> Result<AppliedFeature, ApplyError> {
        let outcome = self.cut(feature);
        self.state = BatchState::Pending;
        match &outcome {
            Ok(applied) => self.applied.push(applied.clone()),
            Err(err) => {
                warn!(error = %err, "feature skipped");
                self.errors.push(err.clone().into_failure(feature.id.clone()));
            }
        }
        outcome
    }

    pub fn apply_all(&mut self, features: &[HoleFeature]) {
        for feature in features {
            // Failures are already recorded on the session.
            let _ = self.apply_feature(feature);
        }
    }

    fn cut(&mut self, feature: &HoleFeature) -> Result<AppliedFeature, ApplyError> {
        let applicator = self.applicator;
        let dims = self.dims;
        self.state = BatchState::Transforming;

        let resolution = applicator
            .resolver
            .resolve(&feature.coordinate.face, dims.family());
        if let Some(ambiguity) = resolution.ambiguity {
            self.warnings.push(format!("{}: {ambiguity}", feature.id));
        }
        let face = resolution.face;

        let violations = applicator.validator.validate_resolved(feature, face, dims);
        if !violations.is_empty() {
            return Err(ApplyError::Validation(violations));
        }

        let position = applicator.pipeline.transform(&feature.coordinate, face, dims);
        let surface = applicator.pipeline.rules().rule(dims.family(), face).surface;
        let [_, offset] = applicator.pipeline.centred(&feature.coordinate, face, dims);
        let depth = DepthResolver.resolve_feature(feature, face, dims, surface, offset)?;
        let tool_config = &applicator.config.tool;
        let placement = if depth.through {
            ToolPlacement::through(&position, &depth, feature.radius())
        } else {
            ToolPlacement::blind(&position, &depth, feature.radius(), tool_config.tool_clearance)
        };
        let tool = placement.build(tool_config.cylinder_segments)?;

        self.state = BatchState::Subtracting;
        // The running mesh is only replaced once the engine succeeds.
        self.mesh = applicator.engine.subtract(&self.mesh, &tool)?;

        Ok(AppliedFeature {
            id: feature.id.clone(),
            face,
            position: position.position,
            diameter: feature.diameter,
            is_through: feature.is_through,
            depth: depth.value,
        })
    }

    /// Close the batch, attaching applied-feature metadata to the mesh.
    pub fn finish(mut self) -> BatchResult {
        self.state = if self.errors.is_empty() {
            BatchState::Done
        } else {
            BatchState::PartialFailure
        };
        self.mesh
            .metadata
            .applied_features
            .extend(self.applied.iter().cloned());
        info!(
            batch = %self.id,
            applied = self.applied.len(),
            failed = self.errors.len(),
            warnings = self.warnings.len(),
            state = ?self.state,
            "batch finished"
        );
        BatchResult {
            batch_id: self.id,
            mesh: self.mesh,
            applied_count: self.applied.len(),
            applied: self.applied,
            errors: self.errors,
            warnings: self.warnings,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_kernel::{make_box, BooleanFailure, MockBooleanEngine};
    use nalgebra::Point3;
    use profile_types::{FailureKind, MachineCoordinate, ProfileFamily};

    fn ipe() -> ProfileDimensions {
        ProfileDimensions::new(ProfileFamily::IProfile, 1000.0, 200.0, 100.0)
            .unwrap()
            .with_flange_thickness(15.0)
            .unwrap()
            .with_web_thickness(8.0)
            .unwrap()
    }

    fn dummy_mesh() -> BoundaryMesh {
        make_box(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)).unwrap()
    }

    fn mock(engine: MockBooleanEngine) -> FeatureApplicator<MockBooleanEngine> {
        FeatureApplicator::new(MachiningConfig::preview(), engine)
    }

    fn hole(id: &str, x: f64) -> HoleFeature {
        HoleFeature::through(id, MachineCoordinate::new("o", x, 0.0, 0.0), 20.0)
    }

    #[test]
    fn invalid_features_never_reach_the_engine() {
        let applicator = mock(MockBooleanEngine::new());
        let features = vec![
            hole("A", 100.0),
            HoleFeature::through("BAD", MachineCoordinate::new("o", 200.0, 0.0, 0.0), 0.0),
            hole("C", 300.0),
        ];
        let result = applicator.apply_batch(dummy_mesh(), &ipe(), &features);

        assert_eq!(applicator.engine().subtract_calls(), 2);
        assert_eq!(result.applied_count, 2);
        assert_eq!(result.failed_ids(), vec!["BAD"]);
        assert_eq!(result.errors[0].kind, FailureKind::Validation);
        assert_eq!(result.state, BatchState::PartialFailure);
    }

    #[test]
    fn engine_failure_rolls_back_and_continues() {
        let applicator = mock(MockBooleanEngine::new().failing_on(1, BooleanFailure::NoOverlap));
        let features = vec![hole("A", 100.0), hole("B", 200.0), hole("C", 300.0)];
        let original = dummy_mesh();
        let result = applicator.apply_batch(original.clone(), &ipe(), &features);

        assert_eq!(applicator.engine().subtract_calls(), 3);
        assert_eq!(result.failed_ids(), vec!["B"]);
        assert_eq!(result.errors[0].kind, FailureKind::Subtraction);
        assert_eq!(result.mesh.polygons, original.polygons);
        let ids: Vec<_> = result.applied.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
    }

    #[test]
    fn metadata_is_attached_on_finish() {
        let applicator = mock(MockBooleanEngine::new());
        let dims = ipe();
        let mut session = applicator.begin(dummy_mesh(), &dims);
        assert_eq!(session.state(), BatchState::Pending);

        let applied = session.apply_feature(&hole("A", 500.0)).unwrap();
        assert_eq!(applied.depth, 30.0);
        assert!(session.mesh().metadata.applied_features.is_empty());

        let result = session.finish();
        assert!(result.is_success());
        assert_eq!(result.state, BatchState::Done);
        assert_eq!(result.mesh.metadata.applied_features, vec![applied]);
    }

    #[test]
    fn ambiguous_tokens_become_warnings() {
        let applicator = mock(MockBooleanEngine::new());
        let feature = HoleFeature::through("Q", MachineCoordinate::new("x", 500.0, 0.0, 0.0), 10.0);
        let result = applicator.apply_batch(dummy_mesh(), &ipe(), &[feature]);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("Q: "));
    }

    #[test]
    fn every_feature_failing_returns_the_stock() {
        let applicator = mock(MockBooleanEngine::new());
        let coordinate = MachineCoordinate::new("u", 100.0, -30.0, 0.0);
        let bad = HoleFeature::blind("B2", coordinate, 16.0, 0.0);
        let original = dummy_mesh();
        let result = applicator.apply_batch(original.clone(), &ipe(), &[bad]);
        assert_eq!(result.mesh, original);
        assert_eq!(result.applied_count, 0);
        assert!(result.errors[0].reasons[0].contains("non-positive blind depth"));
    }

    #[test]
    fn batch_ids_are_unique() {
        let applicator = mock(MockBooleanEngine::new());
        let dims = ipe();
        let a = applicator.begin(dummy_mesh(), &dims).id();
        let b = applicator.begin(dummy_mesh(), &dims).id();
        assert_ne!(a, b);
    }
}
