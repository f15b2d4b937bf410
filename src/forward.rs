//! Forward declarations for recursive and mutually-recursive grammars.
//!
//! `Parser` itself carries the forward machinery (see `Parser::fwd`/`Parser::define` in
//! [`crate::parser`]); this module is just the free-function spelling used at call sites, so a
//! recursive rule reads as `let expr = fwd(); expr.define(...);` instead of `Parser::fwd()`.

use crate::parser::Parser;
use crate::reader::Reader;

/// Builds an empty forward declaration of type `Parser<R, O>`. Using it before calling
/// [`Parser::define`] on it panics; see [`Parser::fwd`] for the full contract.
pub fn fwd<R, O>() -> Parser<R, O>
where
    R: Reader + 'static,
    O: Clone + 'static,
{
    Parser::fwd()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{eof, lit};
    use crate::reader::StrReader;

    #[test]
    fn forward_resolves_after_define() {
        let p: Parser<StrReader, String> = fwd();
        p.define(lit("x"));
        assert_eq!(p.parse("x").unwrap().into_result().unwrap(), "x".to_string());
    }

    #[test]
    #[should_panic(expected = "used before being defined")]
    fn forward_panics_if_used_before_define() {
        let p: Parser<StrReader, String> = fwd();
        let _ = (p << eof()).parse("x");
    }

    #[test]
    fn mutually_recursive_forwards_support_cycles() {
        // even_count("a" a*) ::= "" | "a" odd_count
        // odd_count ::= "a" even_count
        let even: Parser<StrReader, usize> = fwd();
        let odd: Parser<StrReader, usize> = fwd();
        even.define((lit("a").skip_then(&odd)).map(|n| n + 1).or(&crate::primitive::success(0)));
        odd.define(lit("a").skip_then(&even).map(|n| n + 1));
        assert_eq!((even.clone() << eof()).parse("aaaa").unwrap().into_result().unwrap(), 4);
        assert_eq!((even << eof()).parse("aaa").unwrap().into_result().unwrap(), 3);
    }
}
