//! Configuration types for hmm2parquet
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use crate::parquet::convert::{ExportConfig, RestFormat, UnknownTransitions};
use clap::Parser;
use std::path::PathBuf;

/// ZSTD compression level limits
const MIN_COMPRESSION_LEVEL: i32 = 1;
const MAX_COMPRESSION_LEVEL: i32 = 22;

/// Convert HMMER3 profile HMM files to per-profile Parquet tables
#[derive(Parser, Debug, Clone)]
#[command(
    name = "hmm2parquet",
    version,
    about = "Convert HMMER3 profile HMM files to per-profile Parquet tables",
    long_about = "Parses HMMER3 ASCII profile files (.hmm) and writes one Parquet file \
                  per profile.\n\n\
                  Each table has one row per match, insert and delete state: the state index, \
                  the row mode, 20 amino-acid emission scores, 7 transition scores and the \
                  trailing annotation columns. The profile header is kept in the file metadata.",
    after_help = "EXAMPLES:\n    \
        hmm2parquet Pfam-A.hmm -o pfam/\n    \
        hmm2parquet Pfam-A.hmm -o pfam/ --streaming\n    \
        hmm2parquet fn3.hmm kinase.hmm --unknown-transitions null --rest-format delimited\n    \
        hmm2parquet Pfam-A.hmm --dry-run  # Validate only"
)]
pub struct CliArgs {
    /// Profile files to convert (must end in .hmm)
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory receiving <name>.parquet files
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Export each profile as soon as its terminator is read
    #[arg(short, long)]
    pub streaming: bool,

    /// ZSTD compression level (1-22)
    #[arg(long, default_value = "3", value_name = "LEVEL")]
    pub compression_level: i32,

    /// Rows per row group
    #[arg(long, default_value = "100000", value_name = "NUM")]
    pub row_group_size: usize,

    /// How unparsable transition scores are written
    #[arg(long, value_enum, default_value_t = UnknownTransitions::Sentinel)]
    pub unknown_transitions: UnknownTransitions,

    /// How trailing annotation columns are joined into `rest`
    #[arg(long, value_enum, default_value_t = RestFormat::Concat)]
    pub rest_format: RestFormat,

    /// Do not write manifest.json
    #[arg(long)]
    pub no_manifest: bool,

    /// Parse and validate only, write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Input profile files, in command-line order
    pub inputs: Vec<PathBuf>,

    /// Output directory
    pub output_dir: PathBuf,

    /// Export per profile while parsing instead of after the whole file
    pub streaming: bool,

    /// Parquet layout settings
    pub export: ExportConfig,

    pub write_manifest: bool,

    pub dry_run: bool,

    /// Show progress
    pub show_progress: bool,

    pub verbose: bool,
}

impl ConvertConfig {
    /// Create configuration from CLI arguments with validation
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.inputs.is_empty() {
            return Err(ConfigError::NoInputs);
        }

        if !(MIN_COMPRESSION_LEVEL..=MAX_COMPRESSION_LEVEL).contains(&args.compression_level) {
            return Err(ConfigError::InvalidCompressionLevel {
                level: args.compression_level,
                min: MIN_COMPRESSION_LEVEL,
                max: MAX_COMPRESSION_LEVEL,
            });
        }

        if args.row_group_size == 0 {
            return Err(ConfigError::InvalidRowGroupSize {
                size: args.row_group_size,
            });
        }

        // Writability is probed when the sink is created
        if !args.dry_run {
            if !args.output_dir.exists() {
                return Err(ConfigError::InvalidOutputDir {
                    path: args.output_dir.clone(),
                    reason: "Directory does not exist".to_string(),
                });
            }
            if !args.output_dir.is_dir() {
                return Err(ConfigError::InvalidOutputDir {
                    path: args.output_dir.clone(),
                    reason: "Not a directory".to_string(),
                });
            }
        }

        Ok(Self {
            inputs: args.inputs,
            output_dir: args.output_dir,
            streaming: args.streaming,
            export: ExportConfig {
                row_group_size: args.row_group_size,
                compression_level: args.compression_level,
                unknown_transitions: args.unknown_transitions,
                rest_format: args.rest_format,
            },
            write_manifest: !args.no_manifest,
            dry_run: args.dry_run,
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["hmm2parquet"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let dir = tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let config = ConvertConfig::from_args(args(&["Pfam-A.hmm", "-o", out])).unwrap();

        assert_eq!(config.inputs, vec![PathBuf::from("Pfam-A.hmm")]);
        assert!(!config.streaming);
        assert!(config.write_manifest);
        assert!(config.show_progress);
        assert_eq!(config.export.compression_level, 3);
        assert_eq!(config.export.row_group_size, 100_000);
        assert_eq!(config.export.unknown_transitions, UnknownTransitions::Sentinel);
        assert_eq!(config.export.rest_format, RestFormat::Concat);
    }

    #[test]
    fn test_value_enums() {
        let dir = tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let config = ConvertConfig::from_args(args(&[
            "a.hmm",
            "b.hmm",
            "-o",
            out,
            "-s",
            "--unknown-transitions",
            "null",
            "--rest-format",
            "delimited",
            "--no-manifest",
            "-q",
        ]))
        .unwrap();

        assert_eq!(config.inputs.len(), 2);
        assert!(config.streaming);
        assert!(!config.write_manifest);
        assert!(!config.show_progress);
        assert_eq!(config.export.unknown_transitions, UnknownTransitions::Null);
        assert_eq!(config.export.rest_format, RestFormat::Delimited);
    }

    #[test]
    fn test_input_required() {
        assert!(CliArgs::try_parse_from(["hmm2parquet"]).is_err());
    }

    #[test]
    fn test_no_inputs() {
        let mut a = args(&["x.hmm"]);
        a.inputs.clear();
        assert!(matches!(
            ConvertConfig::from_args(a),
            Err(ConfigError::NoInputs)
        ));
    }

    #[test]
    fn test_invalid_compression_level() {
        let result = ConvertConfig::from_args(args(&["x.hmm", "--compression-level", "23"]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidCompressionLevel { level: 23, .. })
        ));
    }

    #[test]
    fn test_invalid_row_group_size() {
        let result = ConvertConfig::from_args(args(&["x.hmm", "--row-group-size", "0"]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRowGroupSize { size: 0 })
        ));
    }

    #[test]
    fn test_missing_output_dir() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let result =
            ConvertConfig::from_args(args(&["x.hmm", "-o", missing.to_str().unwrap()]));
        assert!(matches!(result, Err(ConfigError::InvalidOutputDir { .. })));
    }

    #[test]
    fn test_output_dir_is_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, b"").unwrap();
        let result = ConvertConfig::from_args(args(&["x.hmm", "-o", file.to_str().unwrap()]));
        assert!(matches!(result, Err(ConfigError::InvalidOutputDir { .. })));
    }

    #[test]
    fn test_dry_run_skips_output_dir_check() {
        let config =
            ConvertConfig::from_args(args(&["x.hmm", "-o", "/nonexistent/out", "--dry-run"]))
                .unwrap();
        assert!(config.dry_run);
    }
}
