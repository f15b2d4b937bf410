//! Property-based checks for the invariants and laws every grammar in this crate must satisfy,
//! regardless of which specific parsers are composed.

use proptest::prelude::*;

use husk::prelude::*;
use husk::rep;

fn digits() -> Parser<StrReader, String> {
    husk::reg(r"[0-9]+")
}

proptest! {
    /// A successful match never reports consuming past the end of the source, and a failure's
    /// farthest position never exceeds the source length.
    #[test]
    fn success_never_overruns_the_source(n in "[0-9]{1,12}") {
        let p = digits();
        match p.parse(&n).unwrap() {
            Parsed::Success(matched) => prop_assert_eq!(matched, n),
            Parsed::Failure(_) => prop_assert!(false, "a run of digits must match reg([0-9]+)"),
        }
    }

    /// Re-parsing the same input through freshly-built (unmemoized-between-calls) grammars of the
    /// same shape gives the same observable result - memoization is an implementation detail of a
    /// single `parse` call, not something that leaks across calls or changes the answer.
    #[test]
    fn repeated_parses_of_the_same_grammar_agree(n in "[0-9]{0,8}") {
        let p = digits();
        let once = p.parse(&n).unwrap();
        let again = p.parse(&n).unwrap();
        prop_assert_eq!(once, again);
    }

    /// `expected` never contains a duplicate description, regardless of how many branches
    /// registered the same failure at the farthest position.
    #[test]
    fn expected_list_has_no_duplicates(_seed in 0u8..8) {
        let alternatives = husk::first(vec![lit("a"), lit("a"), lit("a")]);
        let err = alternatives.parse("b").unwrap().into_result().unwrap_err();
        let mut seen = std::collections::HashSet::new();
        for item in err.expected() {
            prop_assert!(seen.insert(item.clone()), "duplicate expected entry: {item}");
        }
    }

    /// `rep(p, min, max)` never returns fewer than `min` or more than `max` items when it
    /// succeeds.
    #[test]
    fn rep_respects_its_min_and_max_bounds(min in 0usize..5, extra in 0usize..5, input_len in 0usize..10) {
        let max = min + extra;
        let p = rep(&lit("a"), min, Some(max));
        let input: String = "a".repeat(input_len);
        if let Parsed::Success(values) = p.parse(&input).unwrap() {
            prop_assert!(values.len() >= min);
            prop_assert!(values.len() <= max);
        }
    }

    /// A successful sequence preserves left-to-right order: `(a & b)`'s value is exactly
    /// `(a's value, b's value)`, never swapped or interleaved.
    #[test]
    fn sequence_preserves_left_to_right_order(a in "[a-z]{1,4}", b in "[a-z]{1,4}") {
        prop_assume!(a != b);
        let pa = lit(a.clone());
        let pb = lit(b.clone());
        let combined = format!("{a}{b}");
        let (got_a, got_b) = (pa & pb).parse(&combined).unwrap().into_result().unwrap();
        prop_assert_eq!(got_a, a);
        prop_assert_eq!(got_b, b);
    }

    /// `opt(p)` always succeeds: `Some(v)` when `p` would, `None` when it wouldn't.
    #[test]
    fn opt_always_succeeds(n in "[0-9]{0,6}") {
        let p = digits().opt();
        let outcome = p.parse(&n).unwrap().into_result().unwrap();
        if n.is_empty() {
            prop_assert_eq!(outcome, None);
        } else {
            prop_assert_eq!(outcome, Some(n));
        }
    }

    /// `(a & b) & c` and `a & (b & c)` agree on success/failure and on total input consumed, but
    /// nest in the shape their grouping implies rather than flattening into a common tuple - `&`
    /// is a binary operator, not a variadic one. `seq(vec![a, b, c])` is what actually flattens.
    #[test]
    fn and_chains_nest_by_grouping_while_seq_flattens(a in "[a-z]{1,3}", b in "[a-z]{1,3}", c in "[a-z]{1,3}") {
        prop_assume!(a != b && b != c && a != c);
        let combined = format!("{a}{b}{c}");

        let left_nested = (lit(a.clone()) & lit(b.clone())) & lit(c.clone());
        let ((got_a, got_b), got_c) = left_nested.parse(&combined).unwrap().into_result().unwrap();
        prop_assert_eq!((got_a, got_b, got_c), (a.clone(), b.clone(), c.clone()));

        let right_nested = lit(a.clone()) & (lit(b.clone()) & lit(c.clone()));
        let (got_a, (got_b, got_c)) = right_nested.parse(&combined).unwrap().into_result().unwrap();
        prop_assert_eq!((got_a, got_b, got_c), (a.clone(), b.clone(), c.clone()));

        let flat = husk::seq(vec![lit(a.clone()), lit(b.clone()), lit(c.clone())]);
        let got = flat.parse(&combined).unwrap().into_result().unwrap();
        prop_assert_eq!(got, vec![a, b, c]);
    }
}
