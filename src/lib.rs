//! # husk, a memoized parser combinator engine
//!
//! `husk` builds parsers out of small, composable pieces and runs them with packrat memoization:
//! every `(parser, position)` pair is evaluated at most once per parse, which is what lets a
//! grammar be written with ordinary (even left-recursive-looking) combinators without the
//! exponential blowup naive backtracking would otherwise incur.
//!
//! ## Example
//!
//! ```rust
//! use husk::prelude::*;
//! use husk::primitive::reg;
//!
//! let digits = reg(r"[0-9]+").map(|s| s.parse::<i64>().unwrap());
//! let sum = (digits.clone() << lit("+") & digits).map(|(a, b)| a + b);
//!
//! assert_eq!(sum.parse("12+30").unwrap().into_result().unwrap(), 42);
//! ```
//!
//! ## Two failure channels
//!
//! An ordinary mismatch - the input didn't look like what the grammar wanted - is recoverable: it
//! surfaces as [`error::Parsed::Failure`], and alternatives (`|`, `opt`) backtrack past it freely.
//! A repetition combinator ([`combinator::rep`] and friends) that observes itself making zero
//! progress is a different kind of problem - the grammar itself is malformed and would loop
//! forever - so it raises [`error::RecursionError`] instead, a fatal error that bypasses
//! memoization and `first`/`longest`/`opt` entirely and propagates straight out of
//! [`parser::Parser::parse`] via `?`.
//!
//! ## Alternative strategy
//!
//! The `|` operator binds to [`combinator::first`] (return the first successful alternative), not
//! [`combinator::longest`] (try every alternative, keep whichever consumed the most). Both are
//! provided as named combinators; reach for `longest` explicitly wherever a grammar's alternatives
//! can overlap and the longer match is the intended one (the classic case is keyword-vs-identifier
//! lexing, where `longest` gets `ifx` parsed as one identifier rather than the keyword `if` plus a
//! dangling `x`).
//!
//! ## Module map
//!
//! - [`reader`] - immutable cursors over `&str` and `&[T]` input.
//! - [`error`] - [`error::ParseError`], [`error::RecursionError`], [`error::Parsed`].
//! - [`state`] - per-parse scratch state (the farthest-failure tracker, the packrat memo table).
//! - [`parser`] - the [`parser::Parser`] type and its combinator methods and operator overloads.
//! - [`primitive`] - leaf parsers: `lit`, `reg`, `any`, `eof`, `success`, `failure`, `elem`.
//! - [`combinator`] - `first`, `longest`, `seq`, `rep`, `rep1`, `repsep`, `rep1sep`, `until`, `debug`.
//! - [`forward`] - `fwd`, for recursive and mutually-recursive grammars.
//! - `grammar` - the [`grammar!`] macro, the naming/binding facility for grammar rules.

pub mod combinator;
pub mod error;
pub mod forward;
#[macro_use]
mod grammar;
pub mod parser;
pub mod primitive;
pub mod reader;
pub mod state;
#[cfg(feature = "debug")]
mod trace;

pub use combinator::{debug, first, longest, pred, rep, rep1, rep1sep, repsep, seq, until};
pub use error::{ParseError, Parsed, RecursionError};
pub use forward::fwd;
pub use parser::{Parser, ParserId};
pub use primitive::{any, elem, eof, failure, lit, lit_ws, reg, reg_ws, success};
pub use reader::{Position, Reader, SliceReader, StrReader};
pub use state::State;

/// Glob-importable surface for grammar authors: the [`Parser`] type, the constructors, and the
/// [`grammar!`] macro's supporting trait methods.
pub mod prelude {
    pub use crate::combinator::{debug, first, longest, pred, rep, rep1, rep1sep, repsep, seq, until};
    pub use crate::forward::fwd;
    pub use crate::parser::Parser;
    pub use crate::primitive::{any, elem, eof, failure, lit, lit_ws, reg, reg_ws, success};
    pub use crate::reader::{Reader, SliceReader, StrReader};
}
