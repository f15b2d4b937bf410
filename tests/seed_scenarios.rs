//! The six end-to-end grammars used throughout design and review: literal-plus-whitespace,
//! sequence-with-farthest-tracking, alternatives-with-farthest-tracking, separator-delimited
//! repetition, a left-recursion stall, and a monadic-bind heredoc.

use husk::prelude::*;
use husk::{rep, rep1sep};

fn whitespace() -> Parser<StrReader, ()> {
    rep(&lit(" "), 0, None).map(|_| ())
}

#[test]
fn literal_with_surrounding_whitespace() {
    let ws = whitespace();
    let p = lit_ws("100", &ws).map(|_| 100.0_f64);

    assert_eq!(p.parse("   100    ").unwrap().into_result().unwrap(), 100.0);
    assert_eq!(p.parse("100").unwrap().into_result().unwrap(), 100.0);

    let err = p.parse("").unwrap().into_result().unwrap_err();
    assert!(err.to_string().starts_with("Expected '100' but found end of source"));
}

#[test]
fn sequence_discards_nothing_and_tracks_farthest_failure() {
    let ws = whitespace();
    let hello = lit_ws("Hello", &ws);
    let world = lit_ws("world", &ws);
    let hw = hello & world;

    assert_eq!(
        hw.parse("Hello world").unwrap().into_result().unwrap(),
        ("Hello".to_string(), "world".to_string())
    );

    let err = hw.parse("Hello David").unwrap().into_result().unwrap_err();
    assert!(err.expected().contains(&"'world'".to_string()));
    assert_eq!(err.farthest().offset, 6);
}

#[test]
fn alternatives_track_the_farthest_failure_across_every_branch() {
    let name = husk::reg("[a-z]+");
    let fn_like = name.clone() << lit("(");
    let idx_like = name.clone() << lit("[");
    let any = (fn_like | idx_like | name) << eof();

    let err = any.parse("func{var}").unwrap().into_result().unwrap_err();
    assert_eq!(err.expected(), &["'('".to_string(), "'['".to_string(), "end of source".to_string()]);
    assert_eq!(err.farthest().offset, 4);
}

#[test]
fn rep1sep_collects_comma_separated_integers() {
    let int = husk::reg(r"\d+").map(|s| s.parse::<i64>().unwrap());
    let p = rep1sep(&int, &lit(","));

    assert_eq!(p.parse("1,2,3").unwrap().into_result().unwrap(), vec![1, 2, 3]);
    assert_eq!(p.parse("1,2,").unwrap().into_result().unwrap(), vec![1, 2]);
    assert!(!p.parse("").unwrap().is_success());
}

#[test]
fn rep_of_an_always_succeeding_inner_parser_stalls() {
    let p = rep(&lit("a").opt(), 0, None);
    let err = p.parse("aab").unwrap_err();
    assert_eq!(err.position().offset, 2);
}

#[test]
fn monadic_bind_implements_a_heredoc() {
    let tag = husk::reg("[A-Za-z]+");
    let heredoc = tag.bind(|t: String| {
        let close = lit(t);
        lit("\n").skip_then(&(husk::until(&close).then_skip(&close)))
    });

    let result = heredoc.parse("EOF\nAnything at all\nEOF").unwrap().into_result().unwrap();
    assert_eq!(result, "Anything at all\n");
}
