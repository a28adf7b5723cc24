//! Profile HMM data model
//!
//! One [`Profile`] holds the header key/value pairs and the ordered row
//! sequence of a single `NAME` … `//` block. Every alignment position
//! contributes a match, an insert and a delete row, in that order.

use std::fmt;

/// Amino-acid symbols in the column order used by HMMER3 protein profiles
pub const AMINO_SYMBOLS: [&str; 20] = [
    "A", "C", "D", "E", "F", "G", "H", "I", "K", "L", "M", "N", "P", "Q", "R", "S", "T", "V",
    "W", "Y",
];

/// Transition columns in the order they appear on a delete line
pub const TRANSITION_NAMES: [&str; 7] = ["m->m", "m->i", "m->d", "i->m", "i->i", "d->m", "d->d"];

pub const EMISSION_COUNT: usize = AMINO_SYMBOLS.len();
pub const TRANSITION_COUNT: usize = TRANSITION_NAMES.len();

/// Token HMMER writes in place of the node index on the composition line
pub const COMPO_TOKEN: &str = "COMPO";

/// Row type within a position triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowMode {
    Match,
    Insert,
    Delete,
}

impl RowMode {
    /// String tag stored in the `mode` column
    pub fn as_str(&self) -> &'static str {
        match self {
            RowMode::Match => "match",
            RowMode::Insert => "insert",
            RowMode::Delete => "delete",
        }
    }

    /// The mode of the line that follows this one
    pub fn next(self) -> Self {
        match self {
            RowMode::Match => RowMode::Insert,
            RowMode::Insert => RowMode::Delete,
            RowMode::Delete => RowMode::Match,
        }
    }
}

impl fmt::Display for RowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse the leading token of a match line into a node index.
///
/// `COMPO` is node 0; any other token must be a non-negative integer.
pub fn parse_state_index(token: &str) -> Option<u32> {
    if token == COMPO_TOKEN {
        return Some(0);
    }
    token.parse::<u32>().ok()
}

/// One transition cell of a delete row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionScore {
    /// Parsed score
    Value(f64),
    /// Token was absent or not a number (HMMER writes `*` for zero probability)
    Unknown,
}

impl TransitionScore {
    /// Lenient parse: anything that is not a float becomes `Unknown`
    pub fn from_token(token: Option<&str>) -> Self {
        token
            .and_then(|t| t.parse::<f64>().ok())
            .map(TransitionScore::Value)
            .unwrap_or(TransitionScore::Unknown)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            TransitionScore::Value(v) => Some(*v),
            TransitionScore::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TransitionScore::Unknown)
    }
}

/// Emission scores plus trailing annotation tokens of a match/insert line
#[derive(Debug, Clone, PartialEq)]
pub struct Emissions {
    pub scores: [f64; EMISSION_COUNT],
    /// Tokens after the 20 scores (MAP, CONS, RF, MM, CS columns), verbatim
    pub annotations: Vec<String>,
}

/// Mode-specific payload of a row
#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    Match(Emissions),
    Insert(Emissions),
    Delete([TransitionScore; TRANSITION_COUNT]),
}

/// One structured record of the score table
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Node index shared by the match/insert/delete triple
    pub state: u32,
    pub kind: RowKind,
}

impl Row {
    pub fn new_match(state: u32, emissions: Emissions) -> Self {
        Self {
            state,
            kind: RowKind::Match(emissions),
        }
    }

    pub fn new_insert(state: u32, emissions: Emissions) -> Self {
        Self {
            state,
            kind: RowKind::Insert(emissions),
        }
    }

    pub fn new_delete(state: u32, transitions: [TransitionScore; TRANSITION_COUNT]) -> Self {
        Self {
            state,
            kind: RowKind::Delete(transitions),
        }
    }

    pub fn mode(&self) -> RowMode {
        match self.kind {
            RowKind::Match(_) => RowMode::Match,
            RowKind::Insert(_) => RowMode::Insert,
            RowKind::Delete(_) => RowMode::Delete,
        }
    }

    /// Emission scores; `None` for delete rows
    pub fn emissions(&self) -> Option<&[f64; EMISSION_COUNT]> {
        match &self.kind {
            RowKind::Match(e) | RowKind::Insert(e) => Some(&e.scores),
            RowKind::Delete(_) => None,
        }
    }

    /// Transition scores; `None` for match/insert rows
    pub fn transitions(&self) -> Option<&[TransitionScore; TRANSITION_COUNT]> {
        match &self.kind {
            RowKind::Delete(t) => Some(t),
            _ => None,
        }
    }

    /// Trailing annotation tokens; `None` for delete rows
    pub fn annotations(&self) -> Option<&[String]> {
        match &self.kind {
            RowKind::Match(e) | RowKind::Insert(e) => Some(&e.annotations),
            RowKind::Delete(_) => None,
        }
    }

    /// Annotation tokens joined with `separator` (`""` reproduces the legacy
    /// concatenated `rest` column)
    pub fn rest(&self, separator: &str) -> Option<String> {
        self.annotations().map(|a| a.join(separator))
    }
}

/// Ordered header of a profile, keyed by lower-cased keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileHeader {
    name: String,
    fields: Vec<(String, String)>,
}

impl ProfileHeader {
    /// A fresh header for a profile opened by `NAME <name>`
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            fields: vec![("name".to_string(), name.clone())],
            name,
        }
    }

    /// Profile identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or overwrite a field. Keys are lower-cased; position of an
    /// existing key is kept.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let key = key.to_lowercase();
        let value = value.into();
        if key == "name" {
            self.name = value.clone();
        }
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Fields in file order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Declared model length (`LENG`)
    pub fn length(&self) -> Option<usize> {
        self.get("leng").and_then(|v| v.trim().parse().ok())
    }

    /// Declared alphabet (`ALPH`)
    pub fn alphabet(&self) -> Option<&str> {
        self.get("alph")
    }
}

/// A finalized profile: header plus rows in file order
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    header: ProfileHeader,
    rows: Vec<Row>,
}

impl Profile {
    pub fn new(header: ProfileHeader, rows: Vec<Row>) -> Self {
        Self { header, rows }
    }

    pub fn name(&self) -> &str {
        self.header.name()
    }

    pub fn header(&self) -> &ProfileHeader {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of match rows with a non-zero node index
    pub fn positions(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.mode() == RowMode::Match && r.state > 0)
            .count()
    }

    /// Number of rows in the given mode
    pub fn count_mode(&self, mode: RowMode) -> usize {
        self.rows.iter().filter(|r| r.mode() == mode).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emissions(base: f64) -> Emissions {
        let mut scores = [0.0; EMISSION_COUNT];
        for (i, s) in scores.iter_mut().enumerate() {
            *s = base + i as f64;
        }
        Emissions {
            scores,
            annotations: vec!["7".into(), "p".into(), "-".into()],
        }
    }

    #[test]
    fn test_row_mode_cycle() {
        assert_eq!(RowMode::Match.next(), RowMode::Insert);
        assert_eq!(RowMode::Insert.next(), RowMode::Delete);
        assert_eq!(RowMode::Delete.next(), RowMode::Match);
        assert_eq!(RowMode::Delete.to_string(), "delete");
    }

    #[test]
    fn test_parse_state_index() {
        assert_eq!(parse_state_index("COMPO"), Some(0));
        assert_eq!(parse_state_index("42"), Some(42));
        assert_eq!(parse_state_index("-1"), None);
        assert_eq!(parse_state_index("2.70"), None);
    }

    #[test]
    fn test_transition_from_token() {
        assert_eq!(
            TransitionScore::from_token(Some("0.0023")),
            TransitionScore::Value(0.0023)
        );
        assert!(TransitionScore::from_token(Some("*")).is_unknown());
        assert!(TransitionScore::from_token(None).is_unknown());
        assert_eq!(TransitionScore::Value(1.5).value(), Some(1.5));
    }

    #[test]
    fn test_row_accessors_follow_mode() {
        let m = Row::new_match(3, emissions(1.0));
        assert_eq!(m.mode(), RowMode::Match);
        assert!(m.emissions().is_some());
        assert!(m.transitions().is_none());
        assert_eq!(m.rest("").as_deref(), Some("7p-"));
        assert_eq!(m.rest(" ").as_deref(), Some("7 p -"));

        let d = Row::new_delete(3, [TransitionScore::Unknown; TRANSITION_COUNT]);
        assert_eq!(d.mode(), RowMode::Delete);
        assert!(d.emissions().is_none());
        assert!(d.transitions().is_some());
        assert!(d.rest("").is_none());
    }

    #[test]
    fn test_header_is_ordered_and_case_insensitive() {
        let mut header = ProfileHeader::new("fn3");
        header.set("ACC", "PF00041.13");
        header.set("LENG", "86");
        header.set("STATS", "LOCAL MSV -9.4043 0.71847");
        header.set("STATS", "LOCAL FORWARD -3.8341 0.71847");

        let keys: Vec<&str> = header.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["name", "acc", "leng", "stats"]);
        assert_eq!(header.get("Stats"), Some("LOCAL FORWARD -3.8341 0.71847"));
        assert_eq!(header.length(), Some(86));
        assert_eq!(header.name(), "fn3");
    }

    #[test]
    fn test_fresh_header_per_profile() {
        let mut a = ProfileHeader::new("a");
        a.set("desc", "first");
        let b = ProfileHeader::new("b");
        assert_eq!(b.get("desc"), None);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_profile_counts() {
        let rows = vec![
            Row::new_match(0, emissions(0.0)),
            Row::new_insert(0, emissions(0.0)),
            Row::new_delete(0, [TransitionScore::Value(0.1); TRANSITION_COUNT]),
            Row::new_match(1, emissions(1.0)),
            Row::new_insert(1, emissions(1.0)),
            Row::new_delete(1, [TransitionScore::Value(0.2); TRANSITION_COUNT]),
        ];
        let profile = Profile::new(ProfileHeader::new("p"), rows);
        assert_eq!(profile.row_count(), 6);
        assert_eq!(profile.positions(), 1);
        assert_eq!(profile.count_mode(RowMode::Delete), 2);
    }
}
