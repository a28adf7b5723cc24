//! End-to-end conversion of `.hmm` files
//!
//! Two modes are offered:
//!
//! - **Batch**: [`parse`] the whole file into a [`ProfileCollection`], then
//!   [`export`] it. A parse failure writes nothing for that file.
//! - **Streaming**: [`convert_streaming`] exports each profile as soon as its
//!   terminator is read. A parse failure stops the file; profiles exported
//!   before the failing line stay on disk and are listed in the report.
//!
//! [`Converter`] runs either mode over every configured input and collects a
//! [`RunSummary`].

use crate::config::ConvertConfig;
use crate::error::{ConvertError, Result};
use crate::hmm::collection::{ExportedProfile, ProfileCollection, ProfileSink};
use crate::hmm::reader::{parse, ProfileReader};
use crate::parquet::convert::{write_manifest, ExportConfig, Manifest, ParquetSink};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Progress callback: called after each profile with its name and the
/// number of profiles handled so far in the current file.
pub type ProgressCallback = Box<dyn Fn(&str, usize) + Send>;

/// Export every profile of a collection with default settings.
pub fn export(
    collection: &ProfileCollection,
    output_dir: impl AsRef<Path>,
) -> Result<Vec<ExportedProfile>> {
    export_with(collection, output_dir, ExportConfig::default())
}

/// Export every profile of a collection into `output_dir`.
///
/// Fails before writing anything if the directory is not writable.
pub fn export_with(
    collection: &ProfileCollection,
    output_dir: impl AsRef<Path>,
    config: ExportConfig,
) -> Result<Vec<ExportedProfile>> {
    let mut sink = ParquetSink::new(output_dir.as_ref(), config)?;
    Ok(collection.export_all(&mut sink)?)
}

/// Parse `path` and export each profile the moment it is finalized.
pub fn convert_streaming(
    path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: ExportConfig,
) -> Result<Vec<ExportedProfile>> {
    let mut sink = ParquetSink::new(output_dir.as_ref(), config)?;
    let mut exported = Vec::new();
    stream_into(path.as_ref(), &mut sink, &mut exported, None)?;
    Ok(exported)
}

/// Drive a reader into a sink, appending receipts as profiles are written.
fn stream_into<S: ProfileSink + ?Sized>(
    path: &Path,
    sink: &mut S,
    exported: &mut Vec<ExportedProfile>,
    progress: Option<&ProgressCallback>,
) -> Result<()> {
    let mut seen = HashSet::new();

    for profile in ProfileReader::open(path)? {
        let profile = profile?;
        if !seen.insert(profile.name().to_string()) {
            warn!(
                profile = profile.name(),
                "Duplicate profile name, overwriting the earlier export"
            );
            exported.retain(|e| e.name != profile.name());
        }

        exported.push(sink.write_profile(&profile)?);
        if let Some(cb) = progress {
            cb(profile.name(), exported.len());
        }
    }
    Ok(())
}

/// Outcome for one input file
#[derive(Debug)]
pub struct FileReport {
    pub source: PathBuf,
    /// Profiles handled, including those written before a failure
    pub exported: Vec<ExportedProfile>,
    pub error: Option<ConvertError>,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn rows(&self) -> usize {
        self.exported.iter().map(|p| p.rows).sum()
    }

    pub fn bytes(&self) -> u64 {
        self.exported.iter().map(|p| p.bytes).sum()
    }
}

/// Totals for a whole run
#[derive(Debug)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
    pub manifest: Option<PathBuf>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn failed_count(&self) -> usize {
        self.files.iter().filter(|f| !f.is_success()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn profile_count(&self) -> usize {
        self.files.iter().map(|f| f.exported.len()).sum()
    }

    pub fn total_rows(&self) -> usize {
        self.files.iter().map(FileReport::rows).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(FileReport::bytes).sum()
    }
}

/// Runs the configured conversion over every input file
pub struct Converter {
    config: ConvertConfig,
    progress: Option<ProgressCallback>,
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Convert every input. Per-file failures are recorded in the summary;
    /// only an unusable output directory or manifest write aborts the run.
    pub fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();

        let mut sink = if self.config.dry_run {
            None
        } else {
            Some(ParquetSink::new(
                &self.config.output_dir,
                self.config.export.clone(),
            )?)
        };

        let mut files: Vec<FileReport> = Vec::with_capacity(self.config.inputs.len());
        // Profile name -> index of the input that last exported it
        let mut owners: HashMap<String, usize> = HashMap::new();

        for input in &self.config.inputs {
            info!("Converting {}", input.display());
            let report = match sink.as_mut() {
                Some(sink) => self.convert_file(input, sink),
                None => self.validate_file(input),
            };

            match &report.error {
                Some(e) => error!("{}", e),
                None => debug!(
                    profiles = report.exported.len(),
                    rows = report.rows(),
                    "Finished {}",
                    input.display()
                ),
            }

            let index = files.len();
            for receipt in &report.exported {
                match owners.insert(receipt.name.clone(), index) {
                    Some(previous) if previous != index => {
                        warn!(
                            profile = receipt.name.as_str(),
                            "Profile also exported from {}, keeping the later one",
                            files[previous].source.display()
                        );
                        files[previous].exported.retain(|e| e.name != receipt.name);
                    }
                    _ => {}
                }
            }
            files.push(report);
        }

        let mut manifest = Manifest::new(&self.config.export);
        if sink.is_some() {
            for report in files.iter().filter(|f| !f.exported.is_empty()) {
                manifest.add_source(report.source.clone(), report.exported.clone());
            }
        }

        let wants_manifest = sink.is_some() && self.config.write_manifest;
        let manifest = if wants_manifest && manifest.profile_count() > 0 {
            Some(write_manifest(&self.config.output_dir, &manifest)?)
        } else {
            None
        };

        Ok(RunSummary {
            files,
            manifest,
            duration: start.elapsed(),
        })
    }

    fn convert_file(&self, input: &Path, sink: &mut ParquetSink) -> FileReport {
        let mut exported = Vec::new();
        let result = if self.config.streaming {
            stream_into(input, sink, &mut exported, self.progress.as_ref())
        } else {
            self.batch_into(input, sink, &mut exported)
        };

        FileReport {
            source: input.to_path_buf(),
            exported,
            error: result.err(),
        }
    }

    fn batch_into(
        &self,
        input: &Path,
        sink: &mut ParquetSink,
        exported: &mut Vec<ExportedProfile>,
    ) -> Result<()> {
        let collection = parse(input)?;
        for profile in collection.iter() {
            exported.push(sink.write_profile(profile)?);
            self.report_progress(profile.name(), exported.len());
        }
        Ok(())
    }

    /// Dry run: parse only
    fn validate_file(&self, input: &Path) -> FileReport {
        let (exported, error) = match parse(input) {
            Ok(collection) => {
                let receipts: Vec<_> =
                    collection.iter().map(ExportedProfile::unwritten).collect();
                for (i, p) in receipts.iter().enumerate() {
                    self.report_progress(&p.name, i + 1);
                }
                (receipts, None)
            }
            Err(e) => (Vec::new(), Some(e)),
        };

        FileReport {
            source: input.to_path_buf(),
            exported,
            error,
        }
    }

    fn report_progress(&self, name: &str, done: usize) {
        if let Some(cb) = &self.progress {
            cb(name, done);
        }
    }
}
