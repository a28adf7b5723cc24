//! Error types for hmm2parquet
//!
//! This module defines the error hierarchy that covers:
//! - Line-level parse failures raised by the profile state machine
//! - Input file problems (wrong extension, unreadable stream)
//! - Parquet export failures
//! - Configuration and CLI errors
//!
//! Parse errors always carry the line (or end of input) and the profile in
//! progress; [`ConvertError`] adds the file path on top.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the hmm2parquet application
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Input file does not carry the `.hmm` extension
    #[error("Input file '{}' must have a .hmm extension", .path.display())]
    Extension { path: PathBuf },

    /// Grammar violation while parsing an input file
    #[error("Failed to parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// Input file could not be opened or read
    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parquet export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ConvertError {
    /// The line-level parse error, if this error came from the grammar
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            ConvertError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Position in the input stream where a parse error was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// 1-based line number
    Line(usize),
    /// The stream ended before the grammar was satisfied
    EndOfInput,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line(n) => write!(f, "line {}", n),
            Location::EndOfInput => f.write_str("end of input"),
        }
    }
}

/// Errors raised by the line-oriented profile parser
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A line arrived in a state where the grammar does not allow it
    #[error("{location}: {reason} (profile: {})", .profile.as_deref().unwrap_or("<none>"))]
    Structural {
        location: Location,
        profile: Option<String>,
        reason: String,
    },

    /// A required field could not be parsed
    #[error("{location}: {reason} (profile: {})", .profile.as_deref().unwrap_or("<none>"))]
    Format {
        location: Location,
        profile: Option<String>,
        reason: String,
    },
}

impl ParseError {
    /// Where the error was detected
    pub fn location(&self) -> Location {
        match self {
            ParseError::Structural { location, .. } | ParseError::Format { location, .. } => {
                *location
            }
        }
    }

    /// Name of the profile being parsed when the error occurred
    pub fn profile(&self) -> Option<&str> {
        match self {
            ParseError::Structural { profile, .. } | ParseError::Format { profile, .. } => {
                profile.as_deref()
            }
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, ParseError::Structural { .. })
    }

    pub fn is_format(&self) -> bool {
        matches!(self, ParseError::Format { .. })
    }
}

/// Parquet export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet writer error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// File operation on an output artifact failed
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Output directory cannot receive files
    #[error("Output directory '{}' is not writable: {reason}", .path.display())]
    UnwritableDirectory { path: PathBuf, reason: String },

    /// Requested profile is not in the collection
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Two different profile names sanitize to the same output file
    #[error(
        "Profile '{name}' maps to '{}', already written for profile '{existing}'",
        .path.display()
    )]
    FileNameCollision {
        name: String,
        existing: String,
        path: PathBuf,
    },
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No input files were given
    #[error("At least one input .hmm file is required")]
    NoInputs,

    /// Output directory error
    #[error("Invalid output directory '{}': {reason}", .path.display())]
    InvalidOutputDir { path: PathBuf, reason: String },

    /// ZSTD level out of range
    #[error("Invalid compression level {level}: must be between {min} and {max}")]
    InvalidCompressionLevel { level: i32, min: i32, max: i32 },

    /// Row group size must be positive
    #[error("Invalid row group size {size}: must be at least 1")]
    InvalidRowGroupSize { size: usize },
}

/// Result type alias for ConvertError
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Result type alias for ParseError
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Result type alias for ExportError
pub type ExportResult<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_includes_context() {
        let err = ParseError::Format {
            location: Location::Line(12),
            profile: Some("fn3".into()),
            reason: "invalid emission score 'abc' for column A".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 12"));
        assert!(msg.contains("fn3"));
        assert!(msg.contains("column A"));
    }

    #[test]
    fn test_end_of_input_display() {
        let err = ParseError::Structural {
            location: Location::EndOfInput,
            profile: None,
            reason: "unterminated profile".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("end of input"));
        assert!(msg.contains("<none>"));
        assert!(err.is_structural());
        assert_eq!(err.location(), Location::EndOfInput);
    }

    #[test]
    fn test_error_conversion() {
        let cfg_err = ConfigError::InvalidRowGroupSize { size: 0 };
        let top: ConvertError = cfg_err.into();
        assert!(matches!(top, ConvertError::Config(_)));
    }

    #[test]
    fn test_convert_error_carries_path() {
        let err = ConvertError::Parse {
            path: PathBuf::from("/data/pfam.hmm"),
            source: ParseError::Structural {
                location: Location::Line(3),
                profile: Some("fn3".into()),
                reason: "header line before NAME".into(),
            },
        };
        assert!(err.to_string().contains("/data/pfam.hmm"));
        assert_eq!(err.parse_error().map(|e| e.location()), Some(Location::Line(3)));
    }
}
