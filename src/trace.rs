//! Colourized, terminal-aware `consume` tracing, gated behind the `debug` feature.
//!
//! Mirrors how the teacher crate wires `anstream`/`anstyle` together: styles are applied via
//! [`anstyle::Style::render`]/`render_reset` rather than `{:#}` `Display` formatting, and output
//! goes through `anstream::AutoStream` so colour is stripped automatically when the destination
//! isn't a real terminal (checked with `is_terminal_polyfill`, with `terminal_size` available to
//! size-aware renderers that want it).

#![cfg(feature = "debug")]

use std::fmt;
use std::io::Write as _;

use anstyle::{AnsiColor, Style};

use crate::parser::{Continue, Parser};
use crate::reader::Reader;

fn rule_style() -> Style {
    Style::new().fg_color(Some(AnsiColor::Cyan.into())).bold()
}

fn ok_style() -> Style {
    Style::new().fg_color(Some(AnsiColor::Green.into()))
}

fn fail_style() -> Style {
    Style::new().fg_color(Some(AnsiColor::Red.into()))
}

fn stream() -> anstream::AutoStream<std::io::Stderr> {
    use is_terminal_polyfill::IsTerminal as _;
    // `terminal_size` is consulted for parity with the teacher's own debug feature, which sizes
    // its trace indentation to the viewport; this crate only needs the tty check itself.
    let is_tty = std::io::stderr().is_terminal() && terminal_size::terminal_size().is_some();
    let choice = if is_tty { anstream::ColorChoice::Always } else { anstream::ColorChoice::Never };
    anstream::AutoStream::new(std::io::stderr(), choice)
}

/// Wraps `p` so every call prints the upcoming token, the parser's `repr()`, and the outcome.
pub fn wrap<R, O>(p: &Parser<R, O>) -> Parser<R, O>
where
    R: Reader + 'static,
    O: Clone + fmt::Debug + 'static,
{
    let inner = p.clone();
    let repr = inner.inline_repr();
    Parser::new(repr.clone(), move |state, reader: R| {
        let mut out = stream();
        let rule = rule_style();
        let _ = writeln!(out, "{}{repr}{} @ {:?}", rule.render(), rule.render_reset(), reader.next_token());
        let result = inner.consume(state, reader);
        match &result {
            Ok(Some(Continue { value, .. })) => {
                let ok = ok_style();
                let _ = writeln!(out, "  {}-> {value:?}{}", ok.render(), ok.render_reset());
            }
            Ok(None) => {
                let fail = fail_style();
                let _ = writeln!(out, "  {}-> no match{}", fail.render(), fail.render_reset());
            }
            Err(e) => {
                let fail = fail_style();
                let _ = writeln!(out, "  {}-> fatal: {e}{}", fail.render(), fail.render_reset());
            }
        }
        result
    })
}
