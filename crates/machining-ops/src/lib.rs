//! Face resolution, bounds, coordinate transforms, depth resolution and
//! validation for DSTV machining features.

pub mod bounds;
pub mod config;
pub mod depth;
pub mod face_resolver;
pub mod pipeline;
pub mod types;
pub mod validate;

pub use bounds::{FaceBounds, FaceBoundsCalculator};
pub use config::{
    AxisOrigin, ConfigError, FaceRuleTable, FaceTokenRule, MachiningConfig, SurfaceOffset,
    Thickness, Tolerance, ToolConfig, TransformRule, TransformRuleEntry, TransformRuleTable,
};
pub use depth::{DepthResolver, ResolvedDepth, THROUGH_PENETRATION_FACTOR};
pub use face_resolver::{resolve_family, FaceResolution, FaceResolver};
pub use pipeline::{
    CoordinateTransformPipeline, FaceStage, InFlight, OriginStage, ProfileStage, TransformContext,
    TransformStage,
};
pub use types::*;
pub use validate::FeatureValidator;
