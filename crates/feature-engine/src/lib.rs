//! Applies machining features to a profile's boundary mesh.
//!
//! A [`FeatureApplicator`] validates, transforms and sizes each hole, builds a
//! cylindrical tool for it and subtracts the tool through a
//! [`BooleanEngine`](mesh_kernel::BooleanEngine). Batches run through a
//! [`BatchSession`] that owns the mesh until it is finished.

pub mod applicator;
pub mod tool;
pub mod types;

pub use applicator::{BatchSession, FeatureApplicator};
pub use tool::{dominant_axis, ToolPlacement};
pub use types::{ApplyError, BatchReport, BatchResult, BatchState};
