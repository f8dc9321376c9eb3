//! Parameter model
//!
//! A tool declares typed parameters ([`ParameterDefinition`]); callers bind
//! loosely typed values ([`ParameterValue`]) which are validated and
//! normalized per kind before the tool runs.
//!
//! ```text
//! ParameterValues ──▶ ParameterBinder ──▶ BoundParameters
//!                         │
//!                         └─ behavior table: kind → validate / parse / describe
//! ```
//!
//! Kind-specific behavior lives in one lookup table (see [`behavior`]) keyed
//! by [`ParameterKindTag`], so adding a kind is a table entry rather than a
//! new branch in every caller.

pub mod behavior;
pub mod binding;
pub mod definition;
pub mod error;
pub mod kind;
pub mod value;

pub use behavior::{LayerLookup, NoLayers};
pub use binding::{BoundParameters, ParameterBinder, ParameterValues};
pub use definition::{
    ControlMode, ControlVariant, ParameterDefinition, ParameterDescription, ParameterRole,
};
pub use error::ValidationError;
pub use kind::{DataKind, DataSourceType, DistanceUnit, ParameterKind, ParameterKindTag};
pub use value::{MEMORY_OUTPUT_PREFIX, OutputRequest, ParameterValue};
