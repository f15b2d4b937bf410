//! Free-function combinators: alternatives, repetition and the scanning `until`.
//!
//! Everything here is expressed in terms of [`Parser::consume`] and returns a plain `Parser`, so
//! combinators compose with the operator overloads in [`crate::parser`] without any special
//! casing - `rep(a) & b` and `first(vec![a, b]) & c` are ordinary sequences.

use crate::error::RecursionError;
use crate::parser::{Continue, Parser};
use crate::reader::Reader;

/// Tries each parser in `parsers` in order and returns the first success. This is what `|` binds
/// to; see [`longest`] for the other alternative strategy.
pub fn first<R, O>(parsers: Vec<Parser<R, O>>) -> Parser<R, O>
where
    R: Reader + 'static,
    O: Clone + 'static,
{
    let repr = parsers.iter().map(Parser::child_repr).collect::<Vec<_>>().join(" | ");
    Parser::new(repr, move |state, reader: R| {
        for p in &parsers {
            if let Some(c) = p.consume(state, reader.clone())? {
                return Ok(Some(c));
            }
        }
        Ok(None)
    })
}

/// Tries every parser in `parsers` and keeps whichever consumed the most input; ties favor the
/// earlier alternative.
pub fn longest<R, O>(parsers: Vec<Parser<R, O>>) -> Parser<R, O>
where
    R: Reader + 'static,
    O: Clone + 'static,
{
    let repr = format!("longest({})", parsers.iter().map(Parser::child_repr).collect::<Vec<_>>().join(", "));
    Parser::new(repr, move |state, reader: R| {
        let mut best: Option<Continue<R, O>> = None;
        for p in &parsers {
            if let Some(c) = p.consume(state, reader.clone())? {
                let keep = match &best {
                    None => true,
                    Some(b) => c.remainder.position() > b.remainder.position(),
                };
                if keep {
                    best = Some(c);
                }
            }
        }
        Ok(best)
    })
}

/// Sequences same-typed `parsers` left to right, returning every value as a flat `Vec<O>` on full
/// success. Unlike chaining [`Parser::and`]/`&` - which nests, `(a & b) & c` is `((O, O), O)` - this
/// always produces one `Vec` element per parser regardless of how the caller would have grouped
/// them, so it's the combinator to reach for when a grammar wants a flat homogeneous sequence
/// instead of a nested tuple.
pub fn seq<R, O>(parsers: Vec<Parser<R, O>>) -> Parser<R, Vec<O>>
where
    R: Reader + 'static,
    O: Clone + 'static,
{
    let repr = format!("seq({})", parsers.iter().map(Parser::child_repr).collect::<Vec<_>>().join(", "));
    Parser::new(repr, move |state, reader: R| {
        let mut output = Vec::with_capacity(parsers.len());
        let mut current = reader;
        for p in &parsers {
            match p.consume(state, current)? {
                Some(c) => {
                    output.push(c.value);
                    current = c.remainder;
                }
                None => return Ok(None),
            }
        }
        Ok(Some(Continue { remainder: current, value: output }))
    })
}

/// Applies `p` repeatedly, collecting successes into a `Vec`, until it fails, hits `max`
/// (exclusive upper bound on iteration count, `None` for unbounded), or stalls.
///
/// A stall - `p` succeeding without advancing the reader, with more iterations still to run - is
/// a grammar bug, not an input error: it would otherwise loop forever, so it raises a fatal
/// [`RecursionError`] instead of quietly returning an incomplete (or infinite) result.
pub fn rep<R, O>(p: &Parser<R, O>, min: usize, max: Option<usize>) -> Parser<R, Vec<O>>
where
    R: Reader + 'static,
    O: Clone + 'static,
{
    let inner = p.clone();
    let repr = format!("rep({}, {min}, {max:?})", inner.child_repr());
    Parser::new(repr.clone(), move |state, reader: R| {
        let mut output = Vec::new();
        let mut current = reader;
        loop {
            if let Some(max) = max {
                if output.len() >= max {
                    break;
                }
            }
            let start = current.position();
            match inner.consume(state, current.clone())? {
                Some(c) => {
                    let advanced = c.remainder.position() != start;
                    output.push(c.value);
                    current = c.remainder;
                    if !advanced {
                        let would_loop_again = max.map_or(true, |m| output.len() < m);
                        if would_loop_again {
                            return Err(RecursionError {
                                repr: repr.clone(),
                                position: current.describe_position(),
                            });
                        }
                        break;
                    }
                }
                None => break,
            }
        }
        if output.len() >= min {
            Ok(Some(Continue { remainder: current, value: output }))
        } else {
            Ok(None)
        }
    })
}

/// `rep(p, 1, None)`: one or more.
pub fn rep1<R, O>(p: &Parser<R, O>) -> Parser<R, Vec<O>>
where
    R: Reader + 'static,
    O: Clone + 'static,
{
    rep(p, 1, None)
}

/// Like [`rep`], but requires `sep` between consecutive `p`s. If `sep` succeeds but the following
/// `p` fails, the reader rewinds to just before `sep` and the already-collected values are kept.
pub fn repsep<R, O, S>(p: &Parser<R, O>, sep: &Parser<R, S>, min: usize, max: Option<usize>) -> Parser<R, Vec<O>>
where
    R: Reader + 'static,
    O: Clone + 'static,
    S: Clone + 'static,
{
    let item = p.clone();
    let sep = sep.clone();
    let repr = format!("repsep({}, {}, {min}, {max:?})", item.child_repr(), sep.child_repr());
    Parser::new(repr.clone(), move |state, reader: R| {
        let mut output = Vec::new();
        let mut current = match item.consume(state, reader.clone())? {
            Some(c) => {
                output.push(c.value);
                c.remainder
            }
            None => reader,
        };
        if !output.is_empty() {
            loop {
                if let Some(max) = max {
                    if output.len() >= max {
                        break;
                    }
                }
                let before_sep = current.clone();
                match sep.consume(state, current.clone())? {
                    Some(sc) => match item.consume(state, sc.remainder)? {
                        Some(ic) => {
                            let advanced = ic.remainder.position() != before_sep.position();
                            output.push(ic.value);
                            current = ic.remainder;
                            if !advanced {
                                let would_loop_again = max.map_or(true, |m| output.len() < m);
                                if would_loop_again {
                                    return Err(RecursionError {
                                        repr: repr.clone(),
                                        position: current.describe_position(),
                                    });
                                }
                                break;
                            }
                        }
                        None => {
                            current = before_sep;
                            break;
                        }
                    },
                    None => break,
                }
            }
        }
        if output.len() >= min {
            Ok(Some(Continue { remainder: current, value: output }))
        } else {
            Ok(None)
        }
    })
}

/// `repsep(p, sep, 1, None)`: one or more, separator-delimited.
pub fn rep1sep<R, O, S>(p: &Parser<R, O>, sep: &Parser<R, S>) -> Parser<R, Vec<O>>
where
    R: Reader + 'static,
    O: Clone + 'static,
    S: Clone + 'static,
{
    repsep(p, sep, 1, None)
}

/// Succeeds only when `p` also succeeds, testing its value against `predicate`. Free-function
/// form of [`Parser::pred`], for call sites that prefer `pred(p, ..)` over `p.pred(..)`.
pub fn pred<R, O, F>(p: &Parser<R, O>, description: impl Into<String>, predicate: F) -> Parser<R, O>
where
    R: Reader + 'static,
    O: Clone + 'static,
    F: Fn(&O) -> bool + 'static,
{
    p.pred(description, predicate)
}

/// Advances one element at a time until `p` succeeds at the current position (without consuming
/// `p`'s match), returning the span of input skipped over. Surfaces `p`'s failure if end of
/// source is reached first. A typical use pairs `until(t).then_skip(t)` to consume the delimiter
/// too.
pub fn until<R, O>(p: &Parser<R, O>) -> Parser<R, R::Span>
where
    R: Reader + 'static,
    O: Clone + 'static,
{
    let inner = p.clone();
    let repr = format!("until({})", inner.inline_repr());
    Parser::new(repr, move |state, reader: R| {
        let start = reader.position();
        let mut current = reader;
        loop {
            if inner.consume(state, current.clone())?.is_some() {
                return Ok(Some(Continue { remainder: current.clone(), value: current.span_from(start) }));
            }
            if current.finished() {
                return Ok(None);
            }
            current = current.rest();
        }
    })
}

#[cfg(feature = "debug")]
/// Wraps `p` so every [`Parser::consume`] call prints a trace line. Compiles to `p` itself when
/// the `debug` feature is off.
pub fn debug<R, O>(p: &Parser<R, O>) -> Parser<R, O>
where
    R: Reader + 'static,
    O: Clone + std::fmt::Debug + 'static,
{
    crate::trace::wrap(p)
}

#[cfg(not(feature = "debug"))]
/// Wraps `p` so every [`Parser::consume`] call prints a trace line. Compiles to `p` itself when
/// the `debug` feature is off.
pub fn debug<R, O>(p: &Parser<R, O>) -> Parser<R, O>
where
    R: Reader + 'static,
    O: Clone + 'static,
{
    p.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::lit;

    #[test]
    fn first_takes_earliest_success() {
        let p = first(vec![lit("a"), lit("ab")]);
        assert_eq!(p.parse("ab").unwrap().into_result().unwrap(), "a".to_string());
    }

    #[test]
    fn longest_prefers_more_consumed_input() {
        let p = longest(vec![lit("a"), lit("ab")]);
        let p = p << crate::primitive::eof();
        assert_eq!(p.parse("ab").unwrap().into_result().unwrap(), "ab".to_string());
    }

    #[test]
    fn seq_flattens_regardless_of_how_the_parsers_were_grouped() {
        let p = seq(vec![lit("a"), lit("b"), lit("c")]) << crate::primitive::eof();
        assert_eq!(p.parse("abc").unwrap().into_result().unwrap(), vec!["a", "b", "c"]);
        assert!(!p.parse("ab").unwrap().is_success());
    }

    #[test]
    fn and_nests_instead_of_flattening() {
        let p = (lit("a") & lit("b")) & lit("c");
        let ((a, b), c) = p.parse("abc").unwrap().into_result().unwrap();
        assert_eq!((a, b, c), ("a".to_string(), "b".to_string(), "c".to_string()));
    }

    #[test]
    fn rep_collects_zero_or_more() {
        let p = rep(&lit("a"), 0, None) << crate::primitive::eof();
        assert_eq!(p.parse("aaa").unwrap().into_result().unwrap(), vec!["a", "a", "a"]);
        assert_eq!(p.parse("").unwrap().into_result().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn rep_of_always_succeeding_inner_stalls_with_recursion_error() {
        let p = rep(&lit("a").opt(), 0, None);
        let err = p.parse("aab").unwrap_err();
        assert_eq!(err.position().offset, 2);
    }

    #[test]
    fn rep1sep_collects_with_trailing_separator_rewind() {
        let p = rep1sep(&reg_digit(), &lit(","));
        assert_eq!(p.parse("1,2,3").unwrap().into_result().unwrap(), vec!["1", "2", "3"]);
        assert_eq!(p.parse("1,2,").unwrap().into_result().unwrap(), vec!["1", "2"]);
        assert!(!p.parse("").unwrap().is_success());
    }

    #[test]
    fn repsep_of_always_succeeding_item_and_separator_stalls_with_recursion_error() {
        let p = repsep(&lit("a").opt(), &lit(",").opt(), 0, None);
        let err = p.parse("a").unwrap_err();
        assert_eq!(err.position().offset, 1);
    }

    fn reg_digit() -> Parser<crate::reader::StrReader, String> {
        crate::primitive::reg(r"[0-9]+")
    }

    #[test]
    fn until_returns_skipped_span_without_consuming_delimiter() {
        let p = until(&lit("STOP"));
        let (span, _) = (p.clone() & lit("STOP")).parse("helloSTOP").unwrap().into_result().unwrap();
        assert_eq!(span, "hello");
    }
}
