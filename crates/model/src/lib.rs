//! # arbor-model: Model layer for the Arbor framework
//!
//! Convention-driven model engine: derives table and column names from
//! declared entity types, synthesizes always-on soft-delete filters at
//! schema-build time, and runs the before/after lifecycle callback
//! protocol around every persistence commit.
//!
//! This crate provides the model conventions, the change tracker, and the
//! commit orchestration for the Arbor framework. Routing, rendering, and
//! connection management live in their own crates.

pub mod callback_error;
pub mod context;
pub mod conventions;
pub mod error;
pub mod model;
pub mod schema;
pub mod store;


// Re-export core traits and types
pub use callback_error::*;
pub use context::*;
pub use conventions::*;
pub use error::*;
pub use model::*;
pub use schema::*;
pub use store::*;
