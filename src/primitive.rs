//! Leaf parsers: the terminals every grammar eventually bottoms out at.
//!
//! `lit`/`reg` operate on [`StrReader`](crate::reader::StrReader) sources; `any`/`eof`/`success`/
//! `failure` are generic over any [`Reader`] and also work over [`SliceReader`](crate::reader::SliceReader)
//! token streams. `elem` is the `SliceReader` counterpart of `lit`: matching one token by equality.

use regex::Regex;

use crate::error::RecursionError;
use crate::parser::{Continue, Parser};
use crate::reader::{Reader, StrReader};

/// Matches `pattern` literally at the current position, consuming no surrounding whitespace.
///
/// Fails with `expected = "'pattern'"`. Use [`lit_ws`] when the grammar needs whitespace
/// skipped around terminals (the usual case for anything but the tightest lexical rules).
pub fn lit(pattern: impl Into<String>) -> Parser<StrReader, String> {
    let pattern = pattern.into();
    let repr = format!("{pattern:?}");
    let expected = format!("'{pattern}'");
    Parser::new(repr, move |state, reader: StrReader| {
        if reader.as_str().starts_with(pattern.as_str()) {
            Ok(Some(Continue { remainder: reader.drop(pattern.chars().count()), value: pattern.clone() }))
        } else {
            state.register_failure(&expected, &reader.describe_position());
            Ok(None)
        }
    })
}

/// Like [`lit`], but consumes `ws` before and after the pattern. `ws` must be an infallible
/// parser (built from [`Parser::opt`]/`rep`/[`rep`][crate::combinator::rep]) - a `ws` that can
/// itself fail would make a successful literal match look like a failure.
pub fn lit_ws(pattern: impl Into<String>, ws: &Parser<StrReader, ()>) -> Parser<StrReader, String> {
    let pattern = pattern.into();
    let repr = format!("{pattern:?}");
    let expected = format!("'{pattern}'");
    let ws = ws.clone();
    Parser::new(repr, move |state, reader: StrReader| {
        let Some(after_leading) = ws.consume(state, reader)?.map(|c| c.remainder) else {
            unreachable!("whitespace parser must be infallible");
        };
        if after_leading.as_str().starts_with(pattern.as_str()) {
            let matched = after_leading.drop(pattern.chars().count());
            let Some(after_trailing) = ws.consume(state, matched)?.map(|c| c.remainder) else {
                unreachable!("whitespace parser must be infallible");
            };
            Ok(Some(Continue { remainder: after_trailing, value: pattern.clone() }))
        } else {
            state.register_failure(&expected, &after_leading.describe_position());
            Ok(None)
        }
    })
}

fn anchored(pattern: &str) -> Regex {
    Regex::new(&format!("^(?:{pattern})")).expect("invalid regex pattern passed to reg()")
}

/// Matches `pattern` as an anchored regular expression at the current position, consuming no
/// surrounding whitespace. Fails with `expected = "r'pattern'"`.
pub fn reg(pattern: impl AsRef<str>) -> Parser<StrReader, String> {
    let pattern = pattern.as_ref().to_string();
    let compiled = anchored(&pattern);
    let repr = format!("reg({pattern:?})");
    let expected = format!("r'{pattern}'");
    Parser::new(repr, move |state, reader: StrReader| match compiled.find(reader.as_str()) {
        Some(m) => {
            let text = m.as_str().to_string();
            Ok(Some(Continue { remainder: reader.drop(text.chars().count()), value: text }))
        }
        None => {
            state.register_failure(&expected, &reader.describe_position());
            Ok(None)
        }
    })
}

/// Like [`reg`], but consumes `ws` before and after the match.
pub fn reg_ws(pattern: impl AsRef<str>, ws: &Parser<StrReader, ()>) -> Parser<StrReader, String> {
    let pattern = pattern.as_ref().to_string();
    let compiled = anchored(&pattern);
    let repr = format!("reg({pattern:?})");
    let expected = format!("r'{pattern}'");
    let ws = ws.clone();
    Parser::new(repr, move |state, reader: StrReader| {
        let Some(after_leading) = ws.consume(state, reader)?.map(|c| c.remainder) else {
            unreachable!("whitespace parser must be infallible");
        };
        match compiled.find(after_leading.as_str()) {
            Some(m) => {
                let text = m.as_str().to_string();
                let matched = after_leading.drop(text.chars().count());
                let Some(after_trailing) = ws.consume(state, matched)?.map(|c| c.remainder) else {
                    unreachable!("whitespace parser must be infallible");
                };
                Ok(Some(Continue { remainder: after_trailing, value: text }))
            }
            None => {
                state.register_failure(&expected, &after_leading.describe_position());
                Ok(None)
            }
        }
    })
}

/// Matches exactly one `item` by equality against a [`SliceReader`](crate::reader::SliceReader)
/// token stream. The token-sequence counterpart of [`lit`].
pub fn elem<T>(item: T) -> Parser<crate::reader::SliceReader<T>, T>
where
    T: Clone + PartialEq + std::fmt::Display + 'static,
{
    let repr = format!("elem({item})");
    let expected = item.to_string();
    Parser::new(repr, move |state, reader: crate::reader::SliceReader<T>| match reader.first() {
        Some(found) if found == item => Ok(Some(Continue { remainder: reader.rest(), value: found })),
        _ => {
            state.register_failure(&expected, &reader.describe_position());
            Ok(None)
        }
    })
}

/// Succeeds consuming one element of any value, as long as the reader isn't finished. Fails with
/// `expected = "anything"` at end of source.
pub fn any<R>() -> Parser<R, R::Item>
where
    R: Reader + 'static,
    R::Item: 'static,
{
    Parser::new("any()", |state, reader: R| match reader.first() {
        Some(item) => Ok(Some(Continue { remainder: reader.rest(), value: item })),
        None => {
            state.register_failure("anything", &reader.describe_position());
            Ok(None)
        }
    })
}

/// Succeeds with `()` iff the reader is at the end of source; fails with `expected = "end of
/// source"` otherwise.
pub fn eof<R>() -> Parser<R, ()>
where
    R: Reader + 'static,
{
    Parser::new("eof()", |state, reader: R| {
        if reader.finished() {
            Ok(Some(Continue { remainder: reader, value: () }))
        } else {
            state.register_failure("end of source", &reader.describe_position());
            Ok(None)
        }
    })
}

/// Always succeeds without consuming input, producing a clone of `value`.
pub fn success<R, O>(value: O) -> Parser<R, O>
where
    R: Reader + 'static,
    O: Clone + 'static,
{
    Parser::new("success(..)", move |_state, reader: R| {
        Ok(Some(Continue { remainder: reader, value: value.clone() }))
    })
}

/// Always fails, registering `msg` as the expected description at the current position. Never
/// returns a [`RecursionError`]; the fatal channel is reserved for stalled repetition.
pub fn failure<R, O>(msg: impl Into<String>) -> Parser<R, O>
where
    R: Reader + 'static,
    O: Clone + 'static,
{
    let msg = msg.into();
    Parser::new(format!("failure({msg:?})"), move |state, reader: R| -> Result<Option<Continue<R, O>>, RecursionError> {
        state.register_failure(&msg, &reader.describe_position());
        Ok(None)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::SliceReader;

    #[test]
    fn lit_matches_prefix_and_advances_by_chars() {
        let p = lit("foo");
        let parsed = p.parse("foobar").unwrap().into_result().unwrap();
        assert_eq!(parsed, "foo");
    }

    #[test]
    fn lit_records_expected_on_mismatch() {
        let p = lit("foo") >> eof();
        let err = p.parse("bar").unwrap().into_result().unwrap_err();
        assert_eq!(err.expected(), &["'foo'".to_string()]);
    }

    #[test]
    fn reg_matches_anchored_at_position() {
        let p = reg(r"[0-9]+");
        let parsed = p.parse("42").unwrap().into_result().unwrap();
        assert_eq!(parsed, "42");
    }

    #[test]
    fn any_consumes_one_item_and_fails_at_end() {
        let data = [1, 2];
        let r = SliceReader::new(&data);
        let mut state = crate::state::State::new();
        let outcome = any::<SliceReader<i32>>().consume(&mut state, r).unwrap().unwrap();
        assert_eq!(outcome.value, 1);
    }

    #[test]
    fn eof_succeeds_only_at_end_of_source() {
        assert!(eof::<StrReader>().parse("").unwrap().is_success());
        assert!(!(lit("a") >> eof()).parse("ab").unwrap().is_success());
    }

    #[test]
    fn elem_matches_by_equality() {
        let data = ["a", "b"];
        let p = elem("a");
        let parsed = p.parse(&data).unwrap().into_result().unwrap();
        assert_eq!(parsed, "a");
    }
}
