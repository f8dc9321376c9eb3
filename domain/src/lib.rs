//! Domain layer for geotools
//!
//! This crate contains the tool and parameter model. It has no
//! dependencies on storage backends or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Parameter**: a typed, named value slot declared by a tool
//!   ([`ParameterDefinition`]) and bound to a [`ParameterValue`] per run
//! - **Datasource**: an opened vector or raster dataset; a
//!   [`DatasourcePointer`] reopens it later
//! - **Tool**: a [`GisTool`] body plus its cached [`ToolDescriptor`],
//!   catalogued in the [`ToolRegistry`]
//! - **Execution**: one run of a tool body, tracked by [`ToolExecution`]
//!   and reported as an [`ExecutionResult`]

pub mod datasource;
pub mod execution;
pub mod parameter;
pub mod tool;

pub use datasource::{
    Datasource, DatasourceError, DatasourceInput, DatasourcePointer, DatasourceProvider,
    FieldInfo, FieldType, InputSet, MEMORY_SCHEME, OutputTarget, Ownership, ProducedOutput,
};
pub use execution::{
    BatchReport, BatchSummary, ErrorKind, ExecutionError, ExecutionResult, ExecutionState,
    ExecutionStatus, ToolExecution,
};
pub use parameter::{
    BoundParameters, ControlMode, ControlVariant, DataKind, DataSourceType, DistanceUnit,
    LayerLookup, NoLayers, OutputRequest, ParameterBinder, ParameterDefinition, ParameterDescription,
    ParameterKind, ParameterKindTag, ParameterRole, ParameterValue, ParameterValues,
    ValidationError,
};
pub use tool::{
    ConfigurationError, ExecutionFailure, GisTool, RegisteredTool, ToolContext, ToolDescriptor,
    ToolRegistry,
};
