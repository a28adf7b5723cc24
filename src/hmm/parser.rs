//! Line-oriented HMMER3 profile parser
//!
//! The parser is a small state machine fed one line at a time:
//!
//! ```text
//!            NAME / key value            HMM
//!  ┌────────────────────────────┐  ───────────────▶  ┌──────────────────────┐
//!  │        header mode         │                    │      table mode      │
//!  └────────────────────────────┘  ◀───────────────  │ match → insert →     │
//!                                         //          │ delete → match …     │
//!                                                     └──────────────────────┘
//! ```
//!
//! Score lines carry no row tag, so the row type is purely the position in
//! the match/insert/delete cycle. Insert and delete lines carry no node
//! index either; they inherit it from the preceding match line.

use crate::error::{Location, ParseError, ParseResult};
use crate::hmm::model::{
    parse_state_index, Emissions, Profile, ProfileHeader, Row, RowMode, TransitionScore,
    AMINO_SYMBOLS, EMISSION_COUNT, TRANSITION_COUNT,
};
use tracing::{debug, warn};

const FORMAT_MAGIC: &str = "HMMER3";
const NAME_KEYWORD: &str = "NAME";
const TABLE_KEYWORD: &str = "HMM";
const TERMINATOR: &str = "//";
const MODEL_TRANSITION_MARKER: &str = "m->m";
const AMINO_ALPHABET: &str = "amino";

/// Accumulator for the profile currently being read
#[derive(Debug)]
struct ProfileBuilder {
    header: ProfileHeader,
    rows: Vec<Row>,
}

impl ProfileBuilder {
    fn new(name: &str) -> Self {
        Self {
            header: ProfileHeader::new(name),
            rows: Vec::new(),
        }
    }

    fn finish(self) -> Profile {
        Profile::new(self.header, self.rows)
    }
}

/// Per-line HMMER3 state machine
#[derive(Debug)]
pub struct ProfileParser {
    header_mode: bool,
    row_cycle: RowMode,
    current: Option<ProfileBuilder>,
    /// Node index of the most recent match line
    current_state: Option<u32>,
    line_number: usize,
}

impl Default for ProfileParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileParser {
    pub fn new() -> Self {
        Self {
            header_mode: true,
            row_cycle: RowMode::Match,
            current: None,
            current_state: None,
            line_number: 0,
        }
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Name of the open profile, if any
    pub fn current_profile(&self) -> Option<&str> {
        self.current.as_ref().map(|b| b.header.name())
    }

    pub fn in_header_mode(&self) -> bool {
        self.header_mode
    }

    /// Mode the next score line will be parsed as
    pub fn expected_row(&self) -> RowMode {
        self.row_cycle
    }

    /// Consume the next line. Returns the finalized profile when the line
    /// is a terminator.
    pub fn feed_line(&mut self, line: &str) -> ParseResult<Option<Profile>> {
        self.line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        if self.header_mode {
            self.header_line(line)?;
            Ok(None)
        } else {
            self.table_line(line)
        }
    }

    /// Signal end of input. Fails if a profile is still open.
    pub fn finish(self) -> ParseResult<()> {
        match self.current {
            Some(builder) => Err(ParseError::Structural {
                location: Location::EndOfInput,
                profile: Some(builder.header.name().to_string()),
                reason: format!("unterminated profile (missing '{}')", TERMINATOR),
            }),
            None => Ok(()),
        }
    }

    fn header_line(&mut self, line: &str) -> ParseResult<()> {
        if line.starts_with(FORMAT_MAGIC) {
            return Ok(());
        }
        if line == TERMINATOR {
            return Err(self.structural_error(format!(
                "'{}' before the score table (missing HMM line)",
                TERMINATOR
            )));
        }

        let mut tokens = line.split_whitespace();
        let keyword = tokens.next().unwrap_or_default();

        if keyword == NAME_KEYWORD {
            let name = tokens
                .next()
                .ok_or_else(|| self.format_error("NAME line without a profile name"))?;
            if let Some(open) = self.current_profile() {
                return Err(self.structural_error(format!(
                    "NAME '{}' while profile '{}' is still open",
                    name, open
                )));
            }
            debug!(profile = name, line = self.line_number, "Opening profile");
            self.current = Some(ProfileBuilder::new(name));
            return Ok(());
        }

        if keyword == TABLE_KEYWORD {
            let alphabet = match &self.current {
                Some(builder) => builder.header.alphabet().map(str::to_string),
                None => return Err(self.structural_error("score table header before NAME")),
            };
            if let Some(alph) = alphabet {
                if !alph.eq_ignore_ascii_case(AMINO_ALPHABET) {
                    return Err(self.format_error(format!(
                        "unsupported alphabet '{}': only amino profiles carry {} emission columns",
                        alph, EMISSION_COUNT
                    )));
                }
            }
            self.header_mode = false;
            self.row_cycle = RowMode::Match;
            self.current_state = None;
            return Ok(());
        }

        let value = tokens.collect::<Vec<_>>().join(" ");
        let line_number = self.line_number;
        match self.current.as_mut() {
            Some(builder) => {
                debug!(key = keyword, line = line_number, "Header field");
                builder.header.set(keyword, value);
                Ok(())
            }
            None => Err(self.structural_error(format!(
                "header line '{}' before NAME",
                keyword
            ))),
        }
    }

    fn table_line(&mut self, line: &str) -> ParseResult<Option<Profile>> {
        if line == TERMINATOR {
            return self.terminate().map(Some);
        }

        if line.starts_with(MODEL_TRANSITION_MARKER) {
            return Ok(None);
        }

        let row = match self.row_cycle {
            RowMode::Match => self.emission_row(line, RowMode::Match)?,
            RowMode::Insert => self.emission_row(line, RowMode::Insert)?,
            RowMode::Delete => self.delete_row(line)?,
        };

        match self.current.as_mut() {
            Some(builder) => builder.rows.push(row),
            None => return Err(self.structural_error("score line with no open profile")),
        }
        self.row_cycle = self.row_cycle.next();
        Ok(None)
    }

    fn terminate(&mut self) -> ParseResult<Profile> {
        if self.row_cycle != RowMode::Match {
            return Err(self.structural_error(format!(
                "profile terminated mid-position: expected {} line",
                self.row_cycle
            )));
        }

        let builder = self
            .current
            .take()
            .ok_or_else(|| self.structural_error("terminator with no open profile"))?;
        let profile = builder.finish();

        if let Some(declared) = profile.header().length() {
            let parsed = profile.positions();
            if declared != parsed {
                warn!(
                    profile = profile.name(),
                    declared,
                    parsed,
                    "LENG does not match the number of positions"
                );
            }
        }

        debug!(
            profile = profile.name(),
            rows = profile.row_count(),
            line = self.line_number,
            "Profile finalized"
        );

        self.header_mode = true;
        self.row_cycle = RowMode::Match;
        self.current_state = None;
        Ok(profile)
    }

    /// Parse a match or insert line: `[index] 20×score [annotations…]`
    fn emission_row(&mut self, line: &str, mode: RowMode) -> ParseResult<Row> {
        let mut tokens = line.split_whitespace();

        let state = if mode == RowMode::Match {
            let token = tokens.next().unwrap_or_default();
            let state = parse_state_index(token)
                .ok_or_else(|| self.format_error(format!("invalid state index '{}'", token)))?;
            self.current_state = Some(state);
            state
        } else {
            self.inherited_state()?
        };

        let mut scores = [0.0f64; EMISSION_COUNT];
        for (i, symbol) in AMINO_SYMBOLS.iter().enumerate() {
            let token = tokens.next().ok_or_else(|| {
                self.format_error(format!(
                    "{} line has {} emission scores, expected {}",
                    mode, i, EMISSION_COUNT
                ))
            })?;
            scores[i] = token.parse::<f64>().map_err(|_| {
                self.format_error(format!(
                    "invalid emission score '{}' for column {}",
                    token, symbol
                ))
            })?;
        }

        let emissions = Emissions {
            scores,
            annotations: tokens.map(str::to_string).collect(),
        };

        Ok(match mode {
            RowMode::Match => Row::new_match(state, emissions),
            _ => Row::new_insert(state, emissions),
        })
    }

    /// Parse a transition line: 7 positional scores, unparsable cells kept
    /// as [`TransitionScore::Unknown`]
    fn delete_row(&self, line: &str) -> ParseResult<Row> {
        let state = self.inherited_state()?;
        let mut tokens = line.split_whitespace();

        let mut transitions = [TransitionScore::Unknown; TRANSITION_COUNT];
        for cell in transitions.iter_mut() {
            *cell = TransitionScore::from_token(tokens.next());
        }

        let extra = tokens.count();
        if extra > 0 {
            debug!(line = self.line_number, extra, "Ignoring trailing transition tokens");
        }

        Ok(Row::new_delete(state, transitions))
    }

    fn inherited_state(&self) -> ParseResult<u32> {
        self.current_state
            .ok_or_else(|| self.structural_error("insert or delete line before any match line"))
    }

    fn structural_error(&self, reason: impl Into<String>) -> ParseError {
        ParseError::Structural {
            location: Location::Line(self.line_number),
            profile: self.current_profile().map(str::to_string),
            reason: reason.into(),
        }
    }

    fn format_error(&self, reason: impl Into<String>) -> ParseError {
        ParseError::Format {
            location: Location::Line(self.line_number),
            profile: self.current_profile().map(str::to_string),
            reason: reason.into(),
        }
    }
}
