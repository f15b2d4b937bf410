//! Immutable cursors over input.
//!
//! A [`Reader`] never mutates in place: every "advance" operation (`rest`, `drop`) returns a new,
//! cheap-to-clone reader that shares the underlying source by reference. This is what lets a
//! grammar be replayed at arbitrary positions for packrat memoization and backtracking without
//! ever copying the input.

use std::fmt;
use std::rc::Rc;

/// A single point in the source, captured eagerly so a diagnostic can outlive the [`Reader`] it
/// was produced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// 0-based offset into the source (chars for [`StrReader`], elements for [`SliceReader`]).
    pub offset: usize,
    /// 1-based line number, or `0` when the source has no line structure (non-string readers).
    pub line: usize,
    /// 1-based column number, or `0` when the source has no line structure.
    pub col: usize,
    /// The full text of the offending line, for string sources.
    pub line_text: Option<String>,
}

impl Position {
    pub(crate) fn start() -> Self {
        Position { offset: 0, line: 1, col: 1, line_text: None }
    }

    /// Renders the caret line used in diagnostics: spaces up to `col`, then a `^`.
    pub fn caret_line(&self) -> String {
        let mut s = String::with_capacity(self.col);
        for _ in 1..self.col {
            s.push(' ');
        }
        s.push('^');
        s
    }
}

/// An immutable cursor over a linear input.
///
/// Implemented for strings ([`StrReader`]) and for arbitrary indexable sequences
/// ([`SliceReader`]). Combinators are written against this trait, not against either concrete
/// reader, so the same grammar shape works over text and over token streams.
pub trait Reader: Clone {
    /// The element type yielded by [`Reader::first`].
    type Item: Clone;
    /// A contiguous span of already-consumed input, as produced by `until`.
    type Span: Clone;
    /// The type of the whole underlying source, as returned by [`Reader::source`] - `str` for
    /// [`StrReader`], `[T]` for [`SliceReader<T>`].
    type Source: ?Sized;

    /// The current 0-based offset into the source.
    fn position(&self) -> usize;

    /// The entire underlying source, independent of the reader's current position - the same
    /// reference every reader produced by `drop`/`rest` from this one shares.
    fn source(&self) -> &Self::Source;

    /// The element at the current position, or `None` at end of source.
    fn first(&self) -> Option<Self::Item>;

    /// A reader advanced by one element.
    fn rest(&self) -> Self;

    /// Whether the reader has reached the end of the source.
    fn finished(&self) -> bool {
        self.first().is_none()
    }

    /// A reader advanced by `n` elements (saturating at the end of source).
    fn drop(&self, n: usize) -> Self {
        let mut r = self.clone();
        for _ in 0..n {
            if r.finished() {
                break;
            }
            r = r.rest();
        }
        r
    }

    /// A short, human-readable preview of what comes next, for diagnostics only.
    fn next_token(&self) -> String;

    /// Captures the current position as a self-contained [`Position`] for error reporting.
    fn describe_position(&self) -> Position;

    /// The span of input between `start` (an offset produced by an earlier `position()`) and the
    /// reader's current position.
    fn span_from(&self, start: usize) -> Self::Span;
}

/// The lexeme regex used to preview the "next token" in string diagnostics: a bracket/quote, a
/// run of word characters, a run of punctuation, or a run of whitespace.
fn next_token_regex() -> &'static regex::Regex {
    static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r#"[()\[\]{}"']|\w+|[^\w\s()\[\]{}"']+|\s+"#).expect("static pattern")
    })
}

/// A cursor over a `&str`, advancing by Unicode scalar value.
#[derive(Clone)]
pub struct StrReader {
    source: Rc<str>,
    position: usize,
}

impl StrReader {
    /// Builds a reader positioned at the start of `source`.
    pub fn new(source: &str) -> Self {
        StrReader { source: Rc::from(source), position: 0 }
    }

    /// The remainder of the source from the current position onward.
    pub fn as_str(&self) -> &str {
        &self.source[self.position..]
    }

    /// Line/column/line-text/caret info for the current position, used by error rendering.
    ///
    /// A source that does not end in a newline is treated as if it did, so the last line is
    /// always addressable.
    pub fn current_line(&self) -> (usize, usize, String, String) {
        let pos = self.describe_position();
        (pos.line, pos.col, pos.line_text.clone().unwrap_or_default(), pos.caret_line())
    }
}

/// Equality holds when two readers share the same underlying allocation (not merely equal
/// contents) and sit at the same position - the notion the packrat memo key relies on.
impl PartialEq for StrReader {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.source, &other.source) && self.position == other.position
    }
}

impl Eq for StrReader {}

impl std::hash::Hash for StrReader {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.source) as *const u8 as usize).hash(state);
        self.position.hash(state);
    }
}

impl Reader for StrReader {
    type Item = char;
    type Span = String;
    type Source = str;

    fn position(&self) -> usize {
        self.position
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn first(&self) -> Option<char> {
        self.as_str().chars().next()
    }

    fn rest(&self) -> Self {
        let width = self.first().map_or(0, char::len_utf8);
        StrReader { source: self.source.clone(), position: self.position + width }
    }

    fn drop(&self, n: usize) -> Self {
        let mut new_pos = self.position;
        let mut remaining = self.as_str().chars();
        for _ in 0..n {
            match remaining.next() {
                Some(c) => new_pos += c.len_utf8(),
                None => break,
            }
        }
        StrReader { source: self.source.clone(), position: new_pos }
    }

    fn next_token(&self) -> String {
        match next_token_regex().find(self.as_str()) {
            Some(m) => m.as_str().to_string(),
            None => "end of source".to_string(),
        }
    }

    fn describe_position(&self) -> Position {
        let mut line = 1usize;
        let mut col = 1usize;
        let mut line_start = 0usize;
        for (idx, ch) in self.source.char_indices() {
            if idx >= self.position {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
                line_start = idx + 1;
            } else {
                col += 1;
            }
        }
        let line_end = self.source[line_start..]
            .find('\n')
            .map_or(self.source.len(), |rel| line_start + rel);
        Position {
            offset: self.position,
            line,
            col,
            line_text: Some(self.source[line_start..line_end].to_string()),
        }
    }

    fn span_from(&self, start: usize) -> String {
        self.source[start..self.position].to_string()
    }
}

/// A cursor over an arbitrary `&[T]`.
#[derive(Clone)]
pub struct SliceReader<T> {
    source: Rc<[T]>,
    position: usize,
}

impl<T: Clone> SliceReader<T> {
    /// Builds a reader positioned at the start of `source`.
    pub fn new(source: &[T]) -> Self
    where
        T: Clone,
    {
        SliceReader { source: Rc::from(source), position: 0 }
    }
}

/// Equality holds when two readers share the same underlying allocation (not merely equal
/// contents) and sit at the same position - mirrors [`StrReader`]'s impl.
impl<T> PartialEq for SliceReader<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.source, &other.source) && self.position == other.position
    }
}

impl<T> Eq for SliceReader<T> {}

impl<T> std::hash::Hash for SliceReader<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.source) as *const T as usize).hash(state);
        self.position.hash(state);
    }
}

impl<T: Clone + fmt::Display> Reader for SliceReader<T> {
    type Item = T;
    type Span = Vec<T>;
    type Source = [T];

    fn position(&self) -> usize {
        self.position
    }

    fn source(&self) -> &[T] {
        &self.source
    }

    fn first(&self) -> Option<T> {
        self.source.get(self.position).cloned()
    }

    fn rest(&self) -> Self {
        SliceReader { source: self.source.clone(), position: self.position + 1 }
    }

    fn drop(&self, n: usize) -> Self {
        SliceReader { source: self.source.clone(), position: (self.position + n).min(self.source.len()) }
    }

    fn next_token(&self) -> String {
        match self.first() {
            Some(item) => item.to_string(),
            None => "end of source".to_string(),
        }
    }

    fn describe_position(&self) -> Position {
        Position { offset: self.position, line: 0, col: 0, line_text: None }
    }

    fn span_from(&self, start: usize) -> Vec<T> {
        self.source[start..self.position].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_reader_advances_by_char_not_byte() {
        let r = StrReader::new("é and é");
        assert_eq!(r.first(), Some('é'));
        let r2 = r.rest();
        assert_eq!(r2.position(), 'é'.len_utf8());
        assert_eq!(r2.first(), Some(' '));
    }

    #[test]
    fn str_reader_drop_counts_chars() {
        let r = StrReader::new("abc");
        let dropped = r.drop(2);
        assert_eq!(dropped.as_str(), "c");
    }

    #[test]
    fn line_tracking_across_newlines() {
        let r = StrReader::new("one\ntwo\nthree").drop(5);
        let pos = r.describe_position();
        assert_eq!(pos.line, 2);
        assert_eq!(pos.col, 2);
        assert_eq!(pos.line_text.as_deref(), Some("two"));
    }

    #[test]
    fn slice_reader_walks_elements() {
        let data = [1, 2, 3];
        let r = SliceReader::new(&data);
        assert_eq!(r.first(), Some(1));
        assert_eq!(r.drop(3).finished(), true);
    }

    #[test]
    fn source_exposes_the_whole_input_regardless_of_position() {
        let r = StrReader::new("hello world").drop(6);
        assert_eq!(r.source(), "hello world");
        assert_eq!(r.as_str(), "world");

        let data = [1, 2, 3];
        let r = SliceReader::new(&data).drop(1);
        assert_eq!(r.source(), &[1, 2, 3]);
    }

    #[test]
    fn equality_and_hash_are_keyed_on_source_identity_and_position_not_contents() {
        let a = StrReader::new("abc");
        let b = a.rest();
        assert_ne!(a, b, "different position, same allocation");
        assert_eq!(a.clone(), a.clone(), "same allocation, same position");

        let c = StrReader::new("abc");
        assert_ne!(a, c, "equal contents but a distinct allocation");

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut h1 = DefaultHasher::new();
        let mut h2 = DefaultHasher::new();
        a.hash(&mut h1);
        a.clone().hash(&mut h2);
        assert_eq!(h1.finish(), h2.finish());
    }
}
