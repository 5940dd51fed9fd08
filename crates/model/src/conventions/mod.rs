//! Naming and schema conventions
//!
//! Pure name derivation, the convention options, and the per-type
//! configuration step that applies both at schema-build time.

pub mod configurator;
pub mod naming;
pub mod options;

// Re-export for convenience
pub use configurator::*;
pub use naming::*;
pub use options::*;
