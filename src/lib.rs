//! hmm2parquet - HMMER3 Profile HMM to Parquet Converter
//!
//! Parses HMMER3 ASCII profile files (`.hmm`) and writes every profile as its
//! own columnar table, one row per match, insert and delete state.
//!
//! # Features
//!
//! - **Line-oriented Parser**: A two-mode state machine (header / score table)
//!   that tracks the match → insert → delete row cycle of each position.
//!
//! - **Streaming Export**: Profiles can be written as soon as their `//`
//!   terminator is read, so only one profile is held in memory at a time.
//!
//! - **Parquet Output**: ZSTD-compressed files with a fixed 30-column schema;
//!   the profile header is kept in the file's schema metadata.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │     Pfam-A.hmm       │
//! └──────────┬───────────┘
//!            │ lines
//!            ▼
//! ┌──────────────────────────────────────────────┐
//! │              ProfileParser                    │
//! │  header mode ──HMM──▶ table mode ──//──▶ reset│
//! │              match → insert → delete          │
//! └──────────┬───────────────────────────────────┘
//!            │ finalized Profile
//!            ▼
//! ┌──────────────────────┐   batch    ┌──────────────────────┐
//! │    ProfileReader     │──────────▶ │  ProfileCollection   │
//! └──────────┬───────────┘            └──────────┬───────────┘
//!            │ streaming                         │ export
//!            ▼                                   ▼
//! ┌──────────────────────────────────────────────┐
//! │     ParquetSink (one file per profile)       │
//! │  - temp file + rename                        │
//! │  - manifest.json                             │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Convert every profile of a Pfam release
//! hmm2parquet Pfam-A.hmm -o pfam/ --streaming
//!
//! # Query results
//! duckdb -c "SELECT state, \"m->m\" FROM 'pfam/fn3.parquet' WHERE mode = 'delete'"
//! ```

pub mod config;
pub mod error;
pub mod hmm;
pub mod parquet;
pub mod pipeline;
pub mod progress;

pub use config::{CliArgs, ConvertConfig};
pub use error::{ConvertError, ExportError, Location, ParseError, Result};
pub use hmm::{parse, Profile, ProfileCollection, ProfileReader, ProfileSink};
pub use pipeline::{convert_streaming, export, export_with, Converter, RunSummary};
