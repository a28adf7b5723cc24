//! Canonical Arrow schema for profile tables
//!
//! Single source of truth for the 30-column layout of every exported
//! profile: `state`, `mode`, 20 emission columns, 7 transition columns and
//! `rest`.

use crate::hmm::model::{ProfileHeader, AMINO_SYMBOLS, EMISSION_COUNT, TRANSITION_NAMES};
use arrow::datatypes::{DataType, Field, Schema};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

pub const STATE_COLUMN: usize = 0;
pub const MODE_COLUMN: usize = 1;
pub const EMISSION_OFFSET: usize = 2;
pub const TRANSITION_OFFSET: usize = EMISSION_OFFSET + EMISSION_COUNT;
pub const REST_COLUMN: usize = TRANSITION_OFFSET + TRANSITION_NAMES.len();
pub const COLUMN_COUNT: usize = REST_COLUMN + 1;

/// Prefix for header fields stored in the schema metadata
pub const HEADER_METADATA_PREFIX: &str = "hmm.";

/// Characters allowed in an output file stem
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("Invalid filename regex"));

/// Build the canonical Arrow schema for profile rows.
pub fn profile_schema() -> Schema {
    let mut fields = Vec::with_capacity(COLUMN_COUNT);
    fields.push(Field::new("state", DataType::UInt32, false));
    fields.push(Field::new("mode", DataType::Utf8, false));
    for symbol in AMINO_SYMBOLS {
        fields.push(Field::new(symbol, DataType::Float64, true));
    }
    for name in TRANSITION_NAMES {
        fields.push(Field::new(name, DataType::Float64, true));
    }
    fields.push(Field::new("rest", DataType::Utf8, true));
    Schema::new(fields)
}

/// Schema for one profile, carrying its header as key/value metadata.
pub fn profile_schema_with_header(header: &ProfileHeader) -> Arc<Schema> {
    Arc::new(profile_schema().with_metadata(header_metadata(header)))
}

/// Map header fields to `hmm.<key>` metadata entries.
pub fn header_metadata(header: &ProfileHeader) -> HashMap<String, String> {
    header
        .iter()
        .map(|(k, v)| (format!("{}{}", HEADER_METADATA_PREFIX, k), v.to_string()))
        .collect()
}

/// File stem for a profile name: anything outside `[A-Za-z0-9._-]` becomes `_`.
pub fn file_stem_for(name: &str) -> String {
    let stem = UNSAFE_FILENAME_CHARS.replace_all(name, "_");
    match &*stem {
        "" | "." | ".." => format!("_{}", stem),
        _ => stem.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_has_30_fields() {
        let schema = profile_schema();
        assert_eq!(schema.fields().len(), 30);
        assert_eq!(COLUMN_COUNT, 30);
    }

    #[test]
    fn test_schema_field_order() {
        let schema = profile_schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names[STATE_COLUMN], "state");
        assert_eq!(names[MODE_COLUMN], "mode");
        assert_eq!(names[EMISSION_OFFSET], "A");
        assert_eq!(names[TRANSITION_OFFSET - 1], "Y");
        assert_eq!(names[TRANSITION_OFFSET], "m->m");
        assert_eq!(names[REST_COLUMN - 1], "d->d");
        assert_eq!(names[REST_COLUMN], "rest");
    }

    #[test]
    fn test_schema_nullable_fields() {
        let schema = profile_schema();
        for field in schema.fields() {
            let expected = !matches!(field.name().as_str(), "state" | "mode");
            assert_eq!(
                field.is_nullable(),
                expected,
                "Field '{}' nullable={}, expected={}",
                field.name(),
                field.is_nullable(),
                expected
            );
        }
    }

    #[test]
    fn test_header_metadata() {
        let mut header = ProfileHeader::new("fn3");
        header.set("ACC", "PF00041.13");
        let schema = profile_schema_with_header(&header);
        assert_eq!(schema.metadata().get("hmm.name").map(String::as_str), Some("fn3"));
        assert_eq!(
            schema.metadata().get("hmm.acc").map(String::as_str),
            Some("PF00041.13")
        );
    }

    #[test]
    fn test_file_stem_for() {
        assert_eq!(file_stem_for("fn3"), "fn3");
        assert_eq!(file_stem_for("Pkinase_Tyr"), "Pkinase_Tyr");
        assert_eq!(file_stem_for("7tm_1.v2"), "7tm_1.v2");
        assert_eq!(file_stem_for("../etc/passwd"), ".._etc_passwd");
        assert_eq!(file_stem_for("a b/c"), "a_b_c");
        assert_eq!(file_stem_for(".."), "_..");
    }
}
