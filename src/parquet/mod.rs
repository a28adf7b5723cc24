//! Parquet export module
//!
//! Writes each parsed profile to its own Parquet file.
//!
//! # Module Structure
//!
//! - `schema`: Canonical Arrow schema definition (30 columns)
//! - `convert`: Profile → Parquet conversion and the manifest

pub mod convert;
pub mod schema;

pub use convert::{
    profile_to_batch, write_manifest, ExportConfig, Manifest, ParquetSink, RestFormat,
    UnknownTransitions, MANIFEST_FILENAME, UNKNOWN_TRANSITION_SENTINEL,
};
pub use schema::{file_stem_for, profile_schema};
