//! Test harness for the machining core.
//!
//! Provides programmatic tools for scripting machining batches, verifying
//! the resulting meshes and exporting them for inspection.
//!
//! # Key Components
//!
//! - [`MachiningJob`]: fluent API for queuing and running hole batches
//! - [`oracle`]: verification functions returning pass/fail verdicts
//! - [`stl`]: STL export from RenderMesh
//! - [`helpers`]: profile fixtures, feature builders, mesh math
//! - [`assertions`]: assertion helpers with diagnostics

pub mod assertions;
pub mod helpers;
pub mod oracle;
pub mod stl;
pub mod workflow;

pub use helpers::HarnessError;
pub use oracle::OracleVerdict;
pub use workflow::MachiningJob;
