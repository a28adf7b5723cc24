//! Profile to Parquet conversion
//!
//! Lays a finalized profile's rows out into the canonical column order and
//! writes one ZSTD-compressed Parquet file per profile. Files are written
//! under a temporary name and renamed into place once the footer is on
//! disk, so a failed export never leaves a truncated `<name>.parquet`.

use crate::error::{ExportError, ExportResult};
use crate::hmm::collection::{ExportedProfile, ProfileSink};
use crate::hmm::model::{Profile, Row, EMISSION_COUNT, TRANSITION_COUNT};
use crate::parquet::schema::{file_stem_for, profile_schema_with_header, COLUMN_COUNT};
use arrow::array::{ArrayRef, Float64Builder, StringBuilder, UInt32Builder};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Extension of exported profile tables
pub const PARQUET_EXTENSION: &str = "parquet";

/// Manifest written alongside the exported tables
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Value written for an unparsable transition in sentinel mode
pub const UNKNOWN_TRANSITION_SENTINEL: f64 = -1.0;

/// How unparsable delete-row transitions are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum UnknownTransitions {
    /// Write -1, the legacy marker
    #[default]
    Sentinel,
    /// Write null
    Null,
}

/// How trailing annotation tokens are joined into `rest`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RestFormat {
    /// Concatenate with no separator (legacy layout)
    #[default]
    Concat,
    /// Join with single spaces so columns can be split back apart
    Delimited,
}

impl RestFormat {
    pub fn separator(&self) -> &'static str {
        match self {
            RestFormat::Concat => "",
            RestFormat::Delimited => " ",
        }
    }
}

/// Configuration for Parquet export
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Maximum rows per row group
    pub row_group_size: usize,
    /// ZSTD compression level (1-22)
    pub compression_level: i32,
    pub unknown_transitions: UnknownTransitions,
    pub rest_format: RestFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            row_group_size: 100_000,
            compression_level: 3,
            unknown_transitions: UnknownTransitions::default(),
            rest_format: RestFormat::default(),
        }
    }
}

/// Column builders for one profile table
pub struct ProfileBatchBuilder {
    state: UInt32Builder,
    mode: StringBuilder,
    emissions: Vec<Float64Builder>,
    transitions: Vec<Float64Builder>,
    rest: StringBuilder,
    unknown_transitions: UnknownTransitions,
    rest_separator: &'static str,
}

impl ProfileBatchBuilder {
    pub fn new(config: &ExportConfig, capacity: usize) -> Self {
        Self {
            state: UInt32Builder::with_capacity(capacity),
            mode: StringBuilder::with_capacity(capacity, capacity * 6),
            emissions: (0..EMISSION_COUNT)
                .map(|_| Float64Builder::with_capacity(capacity))
                .collect(),
            transitions: (0..TRANSITION_COUNT)
                .map(|_| Float64Builder::with_capacity(capacity))
                .collect(),
            rest: StringBuilder::with_capacity(capacity, capacity * 8),
            unknown_transitions: config.unknown_transitions,
            rest_separator: config.rest_format.separator(),
        }
    }

    pub fn append(&mut self, row: &Row) {
        self.state.append_value(row.state);
        self.mode.append_value(row.mode().as_str());

        match row.emissions() {
            Some(scores) => {
                for (builder, score) in self.emissions.iter_mut().zip(scores) {
                    builder.append_value(*score);
                }
            }
            None => self.emissions.iter_mut().for_each(|b| b.append_null()),
        }

        match row.transitions() {
            Some(cells) => {
                for (builder, cell) in self.transitions.iter_mut().zip(cells) {
                    match (cell.value(), self.unknown_transitions) {
                        (Some(v), _) => builder.append_value(v),
                        (None, UnknownTransitions::Sentinel) => {
                            builder.append_value(UNKNOWN_TRANSITION_SENTINEL)
                        }
                        (None, UnknownTransitions::Null) => builder.append_null(),
                    }
                }
            }
            None => self.transitions.iter_mut().for_each(|b| b.append_null()),
        }

        self.rest.append_option(row.rest(self.rest_separator));
    }

    /// Convert the builders into a RecordBatch, leaving them empty
    pub fn finish(&mut self, schema: Arc<Schema>) -> ExportResult<RecordBatch> {
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(COLUMN_COUNT);
        columns.push(Arc::new(self.state.finish()));
        columns.push(Arc::new(self.mode.finish()));
        for builder in self.emissions.iter_mut() {
            columns.push(Arc::new(builder.finish()));
        }
        for builder in self.transitions.iter_mut() {
            columns.push(Arc::new(builder.finish()));
        }
        columns.push(Arc::new(self.rest.finish()));

        Ok(RecordBatch::try_new(schema, columns)?)
    }
}

/// Lay a profile's rows out as a single RecordBatch with its header in the
/// schema metadata.
pub fn profile_to_batch(profile: &Profile, config: &ExportConfig) -> ExportResult<RecordBatch> {
    let mut builder = ProfileBatchBuilder::new(config, profile.row_count());
    for row in profile.rows() {
        builder.append(row);
    }
    builder.finish(profile_schema_with_header(profile.header()))
}

/// Build Parquet writer properties with ZSTD compression and column statistics.
fn writer_properties(config: &ExportConfig) -> ExportResult<WriterProperties> {
    let zstd_level = ZstdLevel::try_new(config.compression_level)?;

    Ok(WriterProperties::builder()
        .set_compression(Compression::ZSTD(zstd_level))
        .set_statistics_enabled(EnabledStatistics::Chunk)
        .set_max_row_group_size(config.row_group_size)
        .set_created_by(format!("hmm2parquet {}", env!("CARGO_PKG_VERSION")))
        .build())
}

/// Fail unless `dir` is an existing directory we can create files in.
pub fn ensure_writable_dir(dir: &Path) -> ExportResult<()> {
    let unwritable = |reason: String| ExportError::UnwritableDirectory {
        path: dir.to_path_buf(),
        reason,
    };

    let meta = fs::metadata(dir).map_err(|e| unwritable(e.to_string()))?;
    if !meta.is_dir() {
        return Err(unwritable("not a directory".to_string()));
    }

    let probe = dir.join(format!(".hmm2parquet-probe-{}", std::process::id()));
    File::create(&probe).map_err(|e| unwritable(e.to_string()))?;
    fs::remove_file(&probe).map_err(|e| unwritable(e.to_string()))?;
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Hidden sibling used while a file is being written
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Write `batch` to `path` via a temporary file and rename.
fn write_parquet_atomic(
    path: &Path,
    batch: &RecordBatch,
    props: WriterProperties,
) -> ExportResult<()> {
    let tmp_path = temp_path_for(path);

    let result = (|| -> ExportResult<()> {
        let file = File::create(&tmp_path).map_err(|e| io_error(&tmp_path, e))?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(batch)?;
        writer.close()?;
        fs::rename(&tmp_path, path).map_err(|e| io_error(path, e))
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Sink writing `<output_dir>/<name>.parquet` for each profile
pub struct ParquetSink {
    output_dir: PathBuf,
    config: ExportConfig,
    props: WriterProperties,
    /// Files written so far, with the profile each one holds
    written: HashMap<PathBuf, String>,
}

impl ParquetSink {
    /// Create a sink; fails if the directory is missing or not writable.
    pub fn new(output_dir: impl Into<PathBuf>, config: ExportConfig) -> ExportResult<Self> {
        let output_dir = output_dir.into();
        ensure_writable_dir(&output_dir)?;
        let props = writer_properties(&config)?;
        Ok(Self {
            output_dir,
            config,
            props,
            written: HashMap::new(),
        })
    }

    /// Destination file for a profile name
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", file_stem_for(name), PARQUET_EXTENSION))
    }
}

impl ProfileSink for ParquetSink {
    fn write_profile(&mut self, profile: &Profile) -> ExportResult<ExportedProfile> {
        // Rows are fully materialized before the output file is opened
        let batch = profile_to_batch(profile, &self.config)?;
        let path = self.path_for(profile.name());

        match self.written.get(&path) {
            Some(existing) if existing != profile.name() => {
                return Err(ExportError::FileNameCollision {
                    name: profile.name().to_string(),
                    existing: existing.clone(),
                    path,
                });
            }
            Some(_) => warn!(
                profile = profile.name(),
                "Profile exported twice, overwriting {}",
                path.display()
            ),
            None => {}
        }

        write_parquet_atomic(&path, &batch, self.props.clone())?;
        self.written.insert(path.clone(), profile.name().to_string());

        let bytes = match fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                debug!(error = %e, "Could not stat {}", path.display());
                0
            }
        };
        info!(
            profile = profile.name(),
            rows = batch.num_rows(),
            "Wrote {}",
            path.display()
        );

        Ok(ExportedProfile {
            name: profile.name().to_string(),
            file: Some(path),
            rows: batch.num_rows(),
            positions: profile.positions(),
            bytes,
        })
    }
}

/// Per-input section of the manifest
#[derive(Debug, Clone, Serialize)]
pub struct SourceManifest {
    pub source: PathBuf,
    pub profiles: Vec<ExportedProfile>,
}

/// Description of one export run, written as `manifest.json`
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub created_at: DateTime<Utc>,
    pub tool_version: &'static str,
    pub unknown_transition_value: Option<f64>,
    pub rest_separator: &'static str,
    pub sources: Vec<SourceManifest>,
}

impl Manifest {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            created_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION"),
            unknown_transition_value: match config.unknown_transitions {
                UnknownTransitions::Sentinel => Some(UNKNOWN_TRANSITION_SENTINEL),
                UnknownTransitions::Null => None,
            },
            rest_separator: config.rest_format.separator(),
            sources: Vec::new(),
        }
    }

    pub fn add_source(&mut self, source: impl Into<PathBuf>, profiles: Vec<ExportedProfile>) {
        self.sources.push(SourceManifest {
            source: source.into(),
            profiles,
        });
    }

    pub fn profile_count(&self) -> usize {
        self.sources.iter().map(|s| s.profiles.len()).sum()
    }
}

/// Write `manifest.json` into the output directory.
pub fn write_manifest(output_dir: &Path, manifest: &Manifest) -> ExportResult<PathBuf> {
    let path = output_dir.join(MANIFEST_FILENAME);
    let tmp_path = temp_path_for(&path);

    let file = File::create(&tmp_path).map_err(|e| io_error(&tmp_path, e))?;
    if let Err(e) = serde_json::to_writer_pretty(file, manifest) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    fs::rename(&tmp_path, &path).map_err(|e| io_error(&path, e))?;

    debug!(profiles = manifest.profile_count(), "Wrote {}", path.display());
    Ok(path)
}
