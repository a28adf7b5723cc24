//! Streaming access to the profiles of an HMMER3 file
//!
//! [`ProfileReader`] drives a [`ProfileParser`] over any `BufRead` source and
//! yields each profile as soon as its terminator is read, so callers can
//! export profile N before profile N+1 is parsed.

use crate::error::{ConvertError, Result};
use crate::hmm::collection::ProfileCollection;
use crate::hmm::model::Profile;
use crate::hmm::parser::ProfileParser;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Required input file extension
pub const HMM_EXTENSION: &str = "hmm";

/// Reject paths that do not end in `.hmm`
pub fn check_extension(path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(HMM_EXTENSION) => Ok(()),
        _ => Err(ConvertError::Extension {
            path: path.to_path_buf(),
        }),
    }
}

/// Iterator over the finalized profiles of a line stream
pub struct ProfileReader<R: BufRead> {
    lines: Lines<R>,
    parser: Option<ProfileParser>,
    path: PathBuf,
}

impl ProfileReader<BufReader<File>> {
    /// Open an `.hmm` file for streaming
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        check_extension(path)?;
        let file = File::open(path).map_err(|e| ConvertError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(BufReader::new(file), path))
    }
}

impl<R: BufRead> ProfileReader<R> {
    /// Wrap a reader; `path` is only used for error context
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            lines: reader.lines(),
            parser: Some(ProfileParser::new()),
            path: path.into(),
        }
    }

    fn parse_failure(&mut self, source: crate::error::ParseError) -> ConvertError {
        self.parser = None;
        ConvertError::Parse {
            path: self.path.clone(),
            source,
        }
    }
}

impl<R: BufRead> Iterator for ProfileReader<R> {
    type Item = Result<Profile>;

    fn next(&mut self) -> Option<Self::Item> {
        // A failed or exhausted reader yields nothing further
        self.parser.as_ref()?;

        loop {
            match self.lines.next() {
                Some(Ok(line)) => {
                    let fed = self.parser.as_mut()?.feed_line(&line);
                    match fed {
                        Ok(Some(profile)) => return Some(Ok(profile)),
                        Ok(None) => continue,
                        Err(e) => return Some(Err(self.parse_failure(e))),
                    }
                }
                Some(Err(e)) => {
                    self.parser = None;
                    return Some(Err(ConvertError::Read {
                        path: self.path.clone(),
                        source: e,
                    }));
                }
                None => {
                    let parser = self.parser.take()?;
                    return match parser.finish() {
                        Ok(()) => None,
                        Err(e) => Some(Err(ConvertError::Parse {
                            path: self.path.clone(),
                            source: e,
                        })),
                    };
                }
            }
        }
    }
}

/// Parse every profile of a stream into a collection.
///
/// Any error aborts the whole stream; no partial collection is returned.
pub fn parse_reader<R: BufRead>(reader: R, path: impl Into<PathBuf>) -> Result<ProfileCollection> {
    let mut collection = ProfileCollection::new();
    for profile in ProfileReader::new(reader, path) {
        let profile = profile?;
        if let Some(previous) = collection.register(profile) {
            warn!(
                profile = previous.name(),
                "Duplicate profile name, keeping the later definition"
            );
        }
    }
    Ok(collection)
}

/// Parse an `.hmm` file into a collection of profiles
pub fn parse(path: impl AsRef<Path>) -> Result<ProfileCollection> {
    let path = path.as_ref();
    check_extension(path)?;
    let file = File::open(path).map_err(|e| ConvertError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let collection = parse_reader(BufReader::new(file), path)?;
    info!(
        "Parsed {} profiles ({} rows) from {}",
        collection.len(),
        collection.total_rows(),
        path.display()
    );
    Ok(collection)
}
