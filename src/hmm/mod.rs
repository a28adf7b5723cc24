//! HMMER3 ASCII profile parsing
//!
//! # Module Structure
//!
//! - `model`: rows, headers and profiles
//! - `parser`: the per-line header/table state machine
//! - `reader`: iterator of profiles over a `BufRead` source
//! - `collection`: named profile set and the export sink trait

pub mod collection;
pub mod model;
pub mod parser;
pub mod reader;

pub use collection::{ExportedProfile, ProfileCollection, ProfileSink};
pub use model::{
    Emissions, Profile, ProfileHeader, Row, RowKind, RowMode, TransitionScore, AMINO_SYMBOLS,
    TRANSITION_NAMES,
};
pub use parser::ProfileParser;
pub use reader::{check_extension, parse, parse_reader, ProfileReader};
