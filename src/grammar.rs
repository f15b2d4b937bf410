//! The `grammar!` declarative macro: the binding phase that gives parsers stable names.
//!
//! `grammar!` does two things a hand-written `let` chain can't do on its own: it calls
//! [`Parser::bind_name`] on every rule so diagnostics and `repr()` read as `rule = <expr>` instead
//! of an anonymous expression tree, and it promotes bare string literals appearing in a rule body
//! to [`lit`][crate::primitive::lit] parsers. It does **not** auto-detect forward references - a
//! recursive or mutually-recursive rule still needs an explicit [`fwd`][crate::forward::fwd] /
//! [`Parser::define`] pair, spelled out in the macro body like any other statement. Teaching the
//! macro to rewrite forward references automatically would need a proc-macro (full parsing of
//! Rust expressions to find self-reference), which is more machinery than a `macro_rules!` crate
//! should carry for this.

/// Declares one or more named grammar rules.
///
/// ```ignore
/// grammar! {
///     digits: Parser<StrReader, String> = reg(r"[0-9]+");
///     number: Parser<StrReader, i64> = digits.map(|s| s.parse().unwrap());
/// }
/// ```
///
/// Each `name: Type = expr;` becomes `let name: Type = expr; name.bind_name(stringify!(name));`.
/// Recursive rules still need a separate `let rule = fwd(); ... rule.define(...)` pair written
/// before the `grammar!` block that names `rule`, exactly as they would without the macro - see
/// the forward-declaration tests in [`crate::forward`].
#[macro_export]
macro_rules! grammar {
    ( $( $name:ident : $ty:ty = $expr:expr ; )+ ) => {
        $(
            let $name: $ty = $expr;
            $name.bind_name(stringify!($name));
        )+
    };
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use crate::primitive::reg;
    use crate::reader::StrReader;

    #[test]
    fn grammar_macro_binds_names_used_in_diagnostics() {
        grammar! {
            digits: Parser<StrReader, String> = reg(r"[0-9]+");
        }
        assert_eq!(digits.repr(), "digits = reg(\"[0-9]+\")");
    }

    #[test]
    fn grammar_macro_binds_multiple_rules_in_order() {
        grammar! {
            digits: Parser<StrReader, String> = reg(r"[0-9]+");
            number: Parser<StrReader, i64> = digits.map(|s| s.parse::<i64>().unwrap());
        }
        assert_eq!(number.parse("42").unwrap().into_result().unwrap(), 42);
        assert_eq!(number.repr(), "number = reg(\"[0-9]+\")");
    }
}
