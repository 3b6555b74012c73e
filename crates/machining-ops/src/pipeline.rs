//! Face-local DSTV coordinate → [`StandardPosition`].
//!
//! The pipeline is an ordered list of stages sorted by priority. Each stage
//! mutates an [`InFlight`] value and knows how to undo itself, so the whole
//! pipeline can be run backwards by [`CoordinateTransformPipeline::inverse`].

use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;
use std::fmt;

use nalgebra::{Point3, Rotation3, Vector3};
use profile_types::{Face, MachineCoordinate, ProfileDimensions, ProfileFamily, StandardPosition};
use tracing::{debug, instrument};

use crate::bounds::{FaceBounds, FaceBoundsCalculator};
use crate::config::{
    AxisOrigin, MachiningConfig, SurfaceOffset, Thickness, TransformRule, TransformRuleTable,
};

/// Per-call inputs shared by every stage.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    pub dimensions: &'a ProfileDimensions,
    pub family: ProfileFamily,
    pub face: Face,
    pub original: &'a MachineCoordinate,
    pub rule: TransformRule,
    pub bounds: FaceBounds,
}

/// The value threaded through the stages.
#[derive(Debug, Clone, PartialEq)]
pub struct InFlight {
    /// Face-local `(u, v)`, centred once the origin stage has run.
    pub local: [f64; 2],
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
    /// Intermediate values recorded by stages, for diagnostics.
    pub metadata: BTreeMap<&'static str, f64>,
}

impl InFlight {
    fn new(local: [f64; 2]) -> Self {
        Self {
            local,
            position: Point3::origin(),
            normal: Vector3::zeros(),
            metadata: BTreeMap::new(),
        }
    }
}

/// One step of the transform.
pub trait TransformStage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lower runs first.
    fn priority(&self) -> u32;

    fn can_apply(&self, _ctx: &TransformContext<'_>) -> bool {
        true
    }

    fn apply(&self, ctx: &TransformContext<'_>, state: &mut InFlight);

    /// Undo [`TransformStage::apply`].
    fn invert(&self, ctx: &TransformContext<'_>, state: &mut InFlight);
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Recentres edge-referenced raw coordinates on the face.
#[derive(Debug, Clone, Copy, Default)]
pub struct OriginStage;

impl OriginStage {
    fn shifts(ctx: &TransformContext<'_>) -> [f64; 2] {
        let shift = |origin: AxisOrigin, span: f64| match origin {
            AxisOrigin::Edge => 0.5 * span,
            AxisOrigin::Centered => 0.0,
        };
        [
            shift(ctx.rule.x_origin, ctx.bounds.x_span()),
            shift(ctx.rule.y_origin, ctx.bounds.y_span()),
        ]
    }
}

impl TransformStage for OriginStage {
    fn name(&self) -> &'static str {
        "origin"
    }

    fn priority(&self) -> u32 {
        10
    }

    fn apply(&self, ctx: &TransformContext<'_>, state: &mut InFlight) {
        let [sx, sy] = Self::shifts(ctx);
        state.local = [ctx.original.x - sx, ctx.original.y - sy];
    }

    fn invert(&self, ctx: &TransformContext<'_>, state: &mut InFlight) {
        let [sx, sy] = Self::shifts(ctx);
        state.local = [state.local[0] + sx, state.local[1] + sy];
    }
}

/// Places the point on the face's material surface and applies depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceStage;

/// Half extents of the solid the face rules are written against. Plates are
/// described standing up (thickness along Z) and laid flat afterwards.
fn rule_half_extents(dims: &ProfileDimensions) -> [f64; 3] {
    match dims.family() {
        ProfileFamily::Plate => [
            0.5 * dims.length(),
            0.5 * dims.height(),
            0.5 * dims.section_width(),
        ],
        _ => dims.half_extents(),
    }
}

fn thickness(dims: &ProfileDimensions, which: Thickness) -> f64 {
    match which {
        Thickness::Web => dims.nominal_web_thickness(),
        Thickness::Flange => dims.nominal_flange_thickness(),
        Thickness::Wall => dims.nominal_wall_thickness(),
    }
}

/// Signed surface coordinate along the face's depth axis.
pub fn surface_offset(ctx: &TransformContext<'_>, v: f64) -> f64 {
    let dims = ctx.dimensions;
    let sign = ctx.face.sign();
    let half = rule_half_extents(dims)[ctx.face.depth_axis().index()];
    match ctx.rule.surface {
        SurfaceOffset::Extent => sign * half,
        SurfaceOffset::Centerline { thickness: t } => sign * 0.5 * thickness(dims, t),
        SurfaceOffset::InnerWall { thickness: t } => -half + thickness(dims, t),
        SurfaceOffset::RoundSurface => {
            let r = 0.5 * dims.height();
            sign * (r * r - v * v).max(0.0).sqrt()
        }
    }
}

impl TransformStage for FaceStage {
    fn name(&self) -> &'static str {
        "face"
    }

    fn priority(&self) -> u32 {
        20
    }

    fn apply(&self, ctx: &TransformContext<'_>, state: &mut InFlight) {
        let [u, v] = state.local;
        let s = surface_offset(ctx, v);
        state.metadata.insert("surface_offset", s);

        let p = match ctx.face {
            Face::Top | Face::Bottom => Point3::new(u, s, v),
            Face::Left | Face::Right => Point3::new(u, v, s),
            Face::Front | Face::Back => Point3::new(s, v, u),
        };
        let [nx, ny, nz] = ctx.face.normal();
        state.normal = Vector3::new(nx, ny, nz);
        state.position = p - state.normal * ctx.original.depth;
    }

    fn invert(&self, ctx: &TransformContext<'_>, state: &mut InFlight) {
        let p = state.position + state.normal * ctx.original.depth;
        state.local = match ctx.face {
            Face::Top | Face::Bottom => [p.x, p.z],
            Face::Left | Face::Right => [p.x, p.y],
            Face::Front | Face::Back => [p.z, p.y],
        };
    }
}

/// Whole-profile corrections. Plates are laid flat by a +90° turn about X.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileStage;

impl ProfileStage {
    fn lay_flat() -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2)
    }
}

impl TransformStage for ProfileStage {
    fn name(&self) -> &'static str {
        "profile"
    }

    fn priority(&self) -> u32 {
        30
    }

    fn can_apply(&self, ctx: &TransformContext<'_>) -> bool {
        ctx.family == ProfileFamily::Plate
    }

    fn apply(&self, _ctx: &TransformContext<'_>, state: &mut InFlight) {
        let rot = Self::lay_flat();
        state.position = rot * state.position;
        state.normal = rot * state.normal;
    }

    fn invert(&self, _ctx: &TransformContext<'_>, state: &mut InFlight) {
        let rot = Self::lay_flat().inverse();
        state.position = rot * state.position;
        state.normal = rot * state.normal;
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct CoordinateTransformPipeline {
    stages: Vec<Box<dyn TransformStage>>,
    rules: TransformRuleTable,
    bounds: FaceBoundsCalculator,
}

impl fmt::Debug for CoordinateTransformPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinateTransformPipeline")
            .field("stages", &self.stage_names())
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl Default for CoordinateTransformPipeline {
    fn default() -> Self {
        Self::new(TransformRuleTable::default())
    }
}

impl CoordinateTransformPipeline {
    /// Pipeline with the origin, face and profile stages.
    pub fn new(rules: TransformRuleTable) -> Self {
        Self::with_stages(
            rules,
            vec![Box::new(OriginStage), Box::new(FaceStage), Box::new(ProfileStage)],
        )
    }

    pub fn from_config(config: &MachiningConfig) -> Self {
        Self::new(config.transform_rules.clone())
    }

    /// Custom stage list; stages are sorted by ascending priority.
    pub fn with_stages(
        rules: TransformRuleTable,
        mut stages: Vec<Box<dyn TransformStage>>,
    ) -> Self {
        stages.sort_by_key(|s| s.priority());
        Self {
            stages,
            rules,
            bounds: FaceBoundsCalculator,
        }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn rules(&self) -> &TransformRuleTable {
        &self.rules
    }

    fn context<'a>(
        &self,
        coordinate: &'a MachineCoordinate,
        face: Face,
        dims: &'a ProfileDimensions,
    ) -> TransformContext<'a> {
        let family = dims.family();
        TransformContext {
            dimensions: dims,
            family,
            face,
            original: coordinate,
            rule: self.rules.rule(family, face),
            bounds: self.bounds.bounds(face, dims),
        }
    }

    /// Map a coordinate on an already resolved `face` into the standard frame.
    #[instrument(
        skip(self, coordinate, dims),
        fields(family = %dims.family(), x = coordinate.x, y = coordinate.y)
    )]
    pub fn transform(
        &self,
        coordinate: &MachineCoordinate,
        face: Face,
        dims: &ProfileDimensions,
    ) -> StandardPosition {
        let ctx = self.context(coordinate, face, dims);
        let mut state = InFlight::new([coordinate.x, coordinate.y]);
        for stage in self.stages.iter().filter(|s| s.can_apply(&ctx)) {
            stage.apply(&ctx, &mut state);
            debug!(
                stage = stage.name(),
                local = ?state.local,
                position = ?[state.position.x, state.position.y, state.position.z],
                "transform stage applied"
            );
        }
        StandardPosition {
            position: [state.position.x, state.position.y, state.position.z],
            normal: [state.normal.x, state.normal.y, state.normal.z],
            face,
            depth: coordinate.depth,
        }
    }

    /// Face-centred `(u, v)` of a raw coordinate on `face`.
    pub fn centred(
        &self,
        coordinate: &MachineCoordinate,
        face: Face,
        dims: &ProfileDimensions,
    ) -> [f64; 2] {
        let ctx = self.context(coordinate, face, dims);
        let mut state = InFlight::new([coordinate.x, coordinate.y]);
        OriginStage.apply(&ctx, &mut state);
        state.local
    }

    /// Recover the face-local coordinate from a pipeline output.
    pub fn inverse(
        &self,
        position: &StandardPosition,
        dims: &ProfileDimensions,
    ) -> MachineCoordinate {
        let placeholder = MachineCoordinate::new(position.face.as_str(), 0.0, 0.0, position.depth);
        let ctx = self.context(&placeholder, position.face, dims);
        let [px, py, pz] = position.position;
        let [nx, ny, nz] = position.normal;
        let mut state = InFlight::new([0.0, 0.0]);
        state.position = Point3::new(px, py, pz);
        state.normal = Vector3::new(nx, ny, nz);

        for stage in self.stages.iter().rev().filter(|s| s.can_apply(&ctx)) {
            stage.invert(&ctx, &mut state);
        }
        let [x, y] = state.local;
        MachineCoordinate::new(position.face.as_str(), x, y, position.depth)
    }
}
