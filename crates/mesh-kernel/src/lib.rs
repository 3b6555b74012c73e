//! Polygonal boundary-mesh kernel: stock solids, cylinder tools and a
//! BSP-tree boolean evaluator.

pub mod boolean;
pub mod bsp;
pub mod mesh;
pub mod mock_engine;
pub mod primitives;
pub mod section;
pub mod types;

pub use boolean::{BoolOp, BooleanEngine, BooleanFailure, BspBooleanEngine};
pub use mesh::{BoundaryMesh, BoundingBox, MeshMetadata, Plane, Polygon};
pub use mock_engine::MockBooleanEngine;
pub use primitives::{faceted_cylinder_volume, make_box, make_cylinder, make_profile_solid};
pub use section::CrossSection;
pub use types::*;
