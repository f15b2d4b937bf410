//! Per-parse scratch state: the farthest-failure tracker and the packrat memo table.

use std::any::Any;

use rustc_hash::FxHashMap;

use crate::reader::Position;

pub(crate) enum MemoEntry {
    /// Written before `_consume` runs, so a recursive re-entry at the same position fails fast
    /// instead of looping - this is what turns naive left recursion into a (cached) failure.
    InProgress,
    /// The resolved outcome, type-erased because a single memo table is shared by every parser in
    /// the grammar regardless of its output type.
    Done(Box<dyn Any>),
}

/// Scratch state owned by a single [`Parser::parse`][crate::parser::Parser::parse] call.
///
/// Never shared across parses and never mutated by anything outside the engine - grammars stay
/// immutable and reusable across threads because all of the per-run bookkeeping lives here.
pub struct State {
    pub(crate) farthest: Option<Position>,
    pub(crate) expected: Vec<String>,
    pub(crate) memo: FxHashMap<(usize, usize), MemoEntry>,
}

impl State {
    pub(crate) fn new() -> Self {
        State { farthest: None, expected: Vec::new(), memo: FxHashMap::default() }
    }

    /// Records that `expected` was required at `position` and wasn't found.
    ///
    /// Only the failure(s) at the farthest position reached by *any* branch survive: a closer
    /// failure is silently dropped, a tying failure is appended (without duplicating a
    /// description already present), and a farther failure replaces the set entirely.
    pub(crate) fn register_failure(&mut self, expected: &str, position: &Position) {
        match &self.farthest {
            None => {
                self.farthest = Some(position.clone());
                self.expected = vec![expected.to_string()];
            }
            Some(farthest) if position.offset > farthest.offset => {
                self.farthest = Some(position.clone());
                self.expected = vec![expected.to_string()];
            }
            Some(farthest) if position.offset == farthest.offset => {
                if !self.expected.iter().any(|e| e == expected) {
                    self.expected.push(expected.to_string());
                }
            }
            _ => {}
        }
    }
}
