//! Diagnostics: the recoverable [`ParseError`] and the fatal [`RecursionError`].
//!
//! The crate distinguishes two failure channels on purpose (see the [crate root docs][crate] for
//! why): a plain mismatch reduces to one `ParseError` at the farthest position reached, while a
//! grammar that repeats without making progress aborts the whole parse with `RecursionError`
//! instead of looping forever.

use std::fmt;

use crate::reader::Position;

/// A structured parse failure: the farthest position any branch of the grammar reached, and the
/// deduplicated, insertion-ordered list of things that were expected there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub(crate) farthest: Position,
    pub(crate) expected: Vec<String>,
}

impl ParseError {
    /// The farthest position reached by any branch of the grammar.
    pub fn farthest(&self) -> &Position {
        &self.farthest
    }

    /// The deduplicated, insertion-ordered set of descriptions expected at [`Self::farthest`].
    pub fn expected(&self) -> &[String] {
        &self.expected
    }
}

fn expected_list(expected: &[String]) -> String {
    match expected.len() {
        0 => "something".to_string(),
        1 => expected[0].clone(),
        _ => {
            let (last, rest) = expected.split_last().expect("non-empty");
            format!("{} or {last}", rest.join(", "))
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let found = self
            .farthest
            .line_text
            .as_deref()
            .and_then(|line| line.get(self.farthest.col.saturating_sub(1)..))
            .filter(|s| !s.is_empty())
            .map_or_else(|| "end of source".to_string(), |s| s.chars().next().unwrap().to_string());
        writeln!(f, "Expected {} but found {found}", expected_list(&self.expected))?;
        if self.farthest.line > 0 {
            writeln!(f, "At line {}, column {}:", self.farthest.line, self.farthest.col)?;
            if let Some(text) = &self.farthest.line_text {
                writeln!(f, "{text}")?;
                write!(f, "{}", self.farthest.caret_line())?;
            }
        } else {
            write!(f, "At position {}", self.farthest.offset)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// A fatal grammar defect: a repetition combinator observed zero progress across one iteration.
///
/// Unlike [`ParseError`], this is never produced by ordinary input mismatches and is never caught
/// by `first`/`longest`/`opt` - it is a bug in the grammar, not in the input, so it bubbles all
/// the way out of [`Parser::parse`][crate::parser::Parser::parse].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursionError {
    pub(crate) repr: String,
    pub(crate) position: Position,
}

impl RecursionError {
    /// The canonical textual form of the combinator that stalled.
    pub fn repr(&self) -> &str {
        &self.repr
    }

    /// The position at which the stall was detected.
    pub fn position(&self) -> &Position {
        &self.position
    }
}

impl fmt::Display for RecursionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} made no progress at offset {} - this repeats forever and is a grammar bug, not an input error",
            self.repr, self.position.offset
        )
    }
}

impl std::error::Error for RecursionError {}

/// The recoverable outcome of a parse: either the typed value, or a [`ParseError`] pointing at
/// the farthest position the grammar reached.
///
/// This is deliberately a thin wrapper, not a monad with its own combinators - chaining belongs on
/// [`Parser`][crate::parser::Parser], before `parse` is ever called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<T> {
    /// The grammar matched the entire input and produced `T`.
    Success(T),
    /// The grammar failed; see the carried [`ParseError`] for where and why.
    Failure(ParseError),
}

impl<T> Parsed<T> {
    /// Whether this is [`Parsed::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Parsed::Success(_))
    }

    /// Converts to a [`Result`], for interop with `?` and the rest of the ecosystem.
    pub fn into_result(self) -> Result<T, ParseError> {
        match self {
            Parsed::Success(v) => Ok(v),
            Parsed::Failure(e) => Err(e),
        }
    }

    /// Returns the success value, panicking with the rendered diagnostic on failure.
    pub fn or_die(self) -> T {
        match self {
            Parsed::Success(v) => v,
            Parsed::Failure(e) => panic!("{e}"),
        }
    }
}
