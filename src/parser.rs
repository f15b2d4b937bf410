//! The [`Parser`] type: a memoized recognizer and the combinator methods that compose it.
//!
//! Every grammar is, in the end, a tree of `Parser` values. `Parser<R, O>` wraps a boxed closure
//! plus the bookkeeping needed for packrat memoization and for diagnostics (a stable identity, a
//! canonical [`repr`][Parser::repr], and the name/protected flag assigned during
//! [grammar binding][crate::grammar]). It is deliberately a single concrete struct, not a trait
//! implemented by a family of combinator types - that's what lets `|`, `&`, `>>` and `<<` be real
//! operator overloads (see the `ops` impls at the bottom of this file) without running into Rust's
//! orphan rules, the same trick the `pom` and `combine` crates use.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::{BitAnd, BitOr, Shl, Shr};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{ParseError, Parsed, RecursionError};
use crate::reader::Reader;
use crate::state::{MemoEntry, State};

/// A stable identity for a parser node, used as half of the packrat memo key and to recognize a
/// forward declaration's own wrapper across rebinding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParserId(usize);

impl ParserId {
    fn fresh() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        ParserId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// The internal carrier for "matched, here's the leftover input and the value" - never exposed
/// past the engine boundary, and never held onto beyond a single `consume` step.
pub(crate) struct Continue<R, O> {
    pub(crate) remainder: R,
    pub(crate) value: O,
}

impl<R: Clone, O: Clone> Clone for Continue<R, O> {
    fn clone(&self) -> Self {
        Continue { remainder: self.remainder.clone(), value: self.value.clone() }
    }
}

pub(crate) type ConsumeResult<R, O> = Result<Option<Continue<R, O>>, RecursionError>;

struct Inner<R, O> {
    id: ParserId,
    repr: String,
    name: RefCell<Option<Rc<str>>>,
    protected: Cell<bool>,
    func: Box<dyn Fn(&mut State, R) -> ConsumeResult<R, O>>,
    /// `Some` only for parsers built by [`Parser::fwd`] - the cell `define` writes into.
    forward: Option<Rc<RefCell<Option<Parser<R, O>>>>>,
}

/// A composable, memoized recognizer over a [`Reader`] of `R`, producing a value of type `O` on
/// success.
///
/// `Parser` is cheap to clone (an `Rc` bump) and is the unit every combinator in this crate both
/// takes and returns, so grammars read as ordinary expressions built out of `lit`, `reg`, `opt`,
/// `rep`, and the operators below.
pub struct Parser<R, O> {
    inner: Rc<Inner<R, O>>,
}

impl<R, O> Clone for Parser<R, O> {
    fn clone(&self) -> Self {
        Parser { inner: self.inner.clone() }
    }
}

impl<R: Reader + 'static, O: Clone + 'static> Parser<R, O> {
    /// Builds a new primitive or combinator parser from its concrete recognition logic.
    ///
    /// `repr` is the canonical textual form used in diagnostics and in `RecursionError` messages
    /// (e.g. `"rep(p)"`, `"a | b | c"`); combinator constructors in this crate compute it from
    /// their children's own `repr()`.
    pub fn new<F>(repr: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut State, R) -> ConsumeResult<R, O> + 'static,
    {
        Parser {
            inner: Rc::new(Inner {
                id: ParserId::fresh(),
                repr: repr.into(),
                name: RefCell::new(None),
                protected: Cell::new(false),
                func: Box::new(func),
                forward: None,
            }),
        }
    }

    /// Builds an empty forward declaration: a parser that panics if invoked before [`Self::define`]
    /// is called on it, and otherwise delegates every `consume` to whatever `define` bound. Exists
    /// to let mutually- or self-referential grammars be written as ordinary `Parser` values - `a`
    /// can mention `b` and `b` can mention `a` because both start life as forwards.
    pub fn fwd() -> Self {
        let cell: Rc<RefCell<Option<Parser<R, O>>>> = Rc::new(RefCell::new(None));
        let for_func = cell.clone();
        Parser {
            inner: Rc::new(Inner {
                id: ParserId::fresh(),
                repr: "<forward>".to_string(),
                name: RefCell::new(None),
                protected: Cell::new(false),
                func: Box::new(move |state, reader| {
                    let bound = for_func
                        .borrow()
                        .clone()
                        .unwrap_or_else(|| panic!("forward declaration used before being defined"));
                    bound.consume(state, reader)
                }),
                forward: Some(cell),
            }),
        }
    }

    /// Binds a forward declaration (built with [`Self::fwd`]) to its real definition.
    ///
    /// Panics if called on a parser that wasn't built by `fwd` - that is a programming error, not
    /// a parse failure, the same class of bug `fwd`'s own "used before defined" panic guards.
    pub fn define(&self, target: Parser<R, O>) {
        let cell = self
            .inner
            .forward
            .as_ref()
            .unwrap_or_else(|| panic!("define() called on a parser that wasn't built by fwd()"));
        *cell.borrow_mut() = Some(target);
    }

    /// This parser's stable identity, used as a packrat memo key.
    pub fn id(&self) -> ParserId {
        self.inner.id
    }

    /// The diagnostic name assigned during grammar binding, if any.
    pub fn name(&self) -> Option<Rc<str>> {
        self.inner.name.borrow().clone()
    }

    /// Whether this parser was bound to a name during grammar binding.
    ///
    /// Composite combinators consult this (via [`Self::child_repr`]) to decide how to render this
    /// parser inside a parent's `repr()`: a protected (named) child contributes its bare name, an
    /// unprotected one contributes its full expansion.
    pub fn protected(&self) -> bool {
        self.inner.protected.get()
    }

    /// Assigns a diagnostic name and marks the parser protected. Called by the [`grammar!`]
    /// macro - exposed publicly (if undocumented-looking) only because macro expansion happens in
    /// the caller's crate.
    #[doc(hidden)]
    pub fn bind_name(&self, name: impl Into<Rc<str>>) {
        *self.inner.name.borrow_mut() = Some(name.into());
        self.inner.protected.set(true);
    }

    /// The canonical textual form used in diagnostics: `name = <expr>` once named, `<expr>`
    /// otherwise.
    pub fn repr(&self) -> String {
        match self.name() {
            Some(name) => format!("{name} = {}", self.inner.repr),
            None => self.inner.repr.clone(),
        }
    }

    /// The unwrapped expression form, ignoring any assigned name - used by combinators composing
    /// a larger repr out of a child's, so `rep(name)` doesn't read as `rep(name = <expr>)`.
    pub(crate) fn inline_repr(&self) -> String {
        self.inner.repr.clone()
    }

    /// The form a parent combinator's composite repr should embed for this child: the bare name
    /// once this parser is protected (bound by [`grammar!`][crate::grammar]), its full expansion
    /// otherwise. This is what keeps `a = x & y; b = a & z` reprinting as `"b = a & z"` rather than
    /// `"b = (x & y) & z"` - naming a sub-parser protects its shape from its parents' reprs.
    pub(crate) fn child_repr(&self) -> String {
        if self.protected() {
            if let Some(name) = self.name() {
                return name.to_string();
            }
        }
        self.inline_repr()
    }

    /// Runs this parser at `reader`, consulting and updating the packrat memo in `state`.
    ///
    /// A fatal [`RecursionError`] is never memoized: it aborts the whole parse, so there is
    /// nothing to cache.
    pub(crate) fn consume(&self, state: &mut State, reader: R) -> ConsumeResult<R, O> {
        let key = (self.inner.id.0, reader.position());
        if let Some(entry) = state.memo.get(&key) {
            return match entry {
                MemoEntry::InProgress => Ok(None),
                MemoEntry::Done(boxed) => Ok(boxed
                    .downcast_ref::<Option<Continue<R, O>>>()
                    .expect("memo slot type mismatch: parser identity collided")
                    .clone()),
            };
        }
        state.memo.insert(key, MemoEntry::InProgress);
        let result = (self.inner.func)(state, reader)?;
        state.memo.insert(key, MemoEntry::Done(Box::new(result.clone())));
        Ok(result)
    }

    fn parse_reader(&self, reader: R) -> Result<Parsed<O>, RecursionError> {
        let augmented = self.clone().then_skip(&crate::primitive::eof());
        let mut state = State::new();
        let outcome = augmented.consume(&mut state, reader)?;
        Ok(match outcome {
            Some(c) => Parsed::Success(c.value),
            None => Parsed::Failure(ParseError {
                farthest: state.farthest.unwrap_or_else(crate::reader::Position::start),
                expected: state.expected,
            }),
        })
    }

    /// Maps the parsed value through `f` on success; leaves failures untouched.
    pub fn map<O2, F>(&self, f: F) -> Parser<R, O2>
    where
        O2: Clone + 'static,
        F: Fn(O) -> O2 + 'static,
    {
        let this = self.clone();
        Parser::new(this.inline_repr(), move |state, reader| {
            Ok(this.consume(state, reader)?.map(|c| Continue { remainder: c.remainder, value: f(c.value) }))
        })
    }

    /// Monadic bind: runs this parser, then uses its value to build the *next* parser to run over
    /// the remainder. The mechanism behind context-sensitive grammars (e.g. "parse a tag, then
    /// parse until that same tag reappears").
    pub fn bind<O2, F>(&self, f: F) -> Parser<R, O2>
    where
        O2: Clone + 'static,
        F: Fn(O) -> Parser<R, O2> + 'static,
    {
        let this = self.clone();
        Parser::new(format!("{}.bind(..)", this.inline_repr()), move |state, reader| {
            match this.consume(state, reader)? {
                Some(c) => f(c.value).consume(state, c.remainder),
                None => Ok(None),
            }
        })
    }

    /// First-match alternative: tries `self`, then `other` if `self` fails. This is what `|`
    /// binds to.
    pub fn or(&self, other: &Parser<R, O>) -> Parser<R, O> {
        crate::combinator::first(vec![self.clone(), other.clone()])
    }

    /// Longest-match alternative: tries both, keeps whichever consumed more (ties favor `self`).
    pub fn or_longest(&self, other: &Parser<R, O>) -> Parser<R, O> {
        crate::combinator::longest(vec![self.clone(), other.clone()])
    }

    /// Sequences `self` then `other`, returning both values as a tuple. This is what `&` binds to.
    pub fn and<O2>(&self, other: &Parser<R, O2>) -> Parser<R, (O, O2)>
    where
        O2: Clone + 'static,
    {
        let left = self.clone();
        let right = other.clone();
        let repr = format!("{} & {}", left.child_repr(), right.child_repr());
        Parser::new(repr, move |state, reader| {
            match left.consume(state, reader)? {
                Some(lc) => Ok(right
                    .consume(state, lc.remainder)?
                    .map(|rc| Continue { remainder: rc.remainder, value: (lc.value, rc.value) })),
                None => Ok(None),
            }
        })
    }

    /// Sequences `self` then `other`, keeping only `self`'s value. This is what `<<` binds to.
    pub fn then_skip<O2>(&self, other: &Parser<R, O2>) -> Parser<R, O>
    where
        O2: Clone + 'static,
    {
        let left = self.clone();
        let right = other.clone();
        let repr = format!("{} << {}", left.child_repr(), right.child_repr());
        Parser::new(repr, move |state, reader| {
            match left.consume(state, reader)? {
                Some(lc) => Ok(right
                    .consume(state, lc.remainder)?
                    .map(|rc| Continue { remainder: rc.remainder, value: lc.value.clone() })),
                None => Ok(None),
            }
        })
    }

    /// Sequences `self` then `other`, keeping only `other`'s value. This is what `>>` binds to.
    pub fn skip_then<O2>(&self, other: &Parser<R, O2>) -> Parser<R, O2>
    where
        O2: Clone + 'static,
    {
        let left = self.clone();
        let right = other.clone();
        let repr = format!("{} >> {}", left.child_repr(), right.child_repr());
        Parser::new(repr, move |state, reader| match left.consume(state, reader)? {
            Some(lc) => right.consume(state, lc.remainder),
            None => Ok(None),
        })
    }

    /// Wraps `self` so failure is recoverable as `None` instead of propagating - always succeeds.
    pub fn opt(&self) -> Parser<R, Option<O>> {
        let this = self.clone();
        let repr = format!("opt({})", this.inline_repr());
        Parser::new(repr, move |state, reader| {
            match this.consume(state, reader.clone())? {
                Some(c) => Ok(Some(Continue { remainder: c.remainder, value: Some(c.value) })),
                None => Ok(Some(Continue { remainder: reader, value: None })),
            }
        })
    }

    /// Succeeds only when `self` succeeds *and* the value satisfies `predicate`; otherwise
    /// registers `description` as the expected failure at the remainder position.
    pub fn pred<F>(&self, description: impl Into<String>, predicate: F) -> Parser<R, O>
    where
        F: Fn(&O) -> bool + 'static,
    {
        let this = self.clone();
        let description = description.into();
        let repr = format!("pred({}, {description:?})", this.inline_repr());
        Parser::new(repr, move |state, reader| match this.consume(state, reader)? {
            Some(c) => {
                if predicate(&c.value) {
                    Ok(Some(c))
                } else {
                    state.register_failure(&description, &c.remainder.describe_position());
                    Ok(None)
                }
            }
            None => Ok(None),
        })
    }
}

impl<O: Clone + 'static> Parser<crate::reader::StrReader, O> {
    /// Parses `source` to completion (as-if sequenced with `eof()`), returning the recoverable
    /// [`Parsed`] outcome or propagating a fatal [`RecursionError`].
    pub fn parse(&self, source: &str) -> Result<Parsed<O>, RecursionError> {
        self.parse_reader(crate::reader::StrReader::new(source))
    }
}

impl<T, O> Parser<crate::reader::SliceReader<T>, O>
where
    T: Clone + fmt::Display + 'static,
    O: Clone + 'static,
{
    /// Parses `source` to completion (as-if sequenced with `eof()`), returning the recoverable
    /// [`Parsed`] outcome or propagating a fatal [`RecursionError`].
    pub fn parse(&self, source: &[T]) -> Result<Parsed<O>, RecursionError> {
        self.parse_reader(crate::reader::SliceReader::new(source))
    }
}

impl<R: Reader + 'static, O: Clone + 'static> BitOr for Parser<R, O> {
    type Output = Parser<R, O>;
    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(&rhs)
    }
}

impl<R: Reader + 'static, O1: Clone + 'static, O2: Clone + 'static> BitAnd<Parser<R, O2>> for Parser<R, O1> {
    type Output = Parser<R, (O1, O2)>;
    fn bitand(self, rhs: Parser<R, O2>) -> Self::Output {
        self.and(&rhs)
    }
}

impl<R: Reader + 'static, O: Clone + 'static, O2: Clone + 'static> Shr<Parser<R, O2>> for Parser<R, O> {
    type Output = Parser<R, O2>;
    fn shr(self, rhs: Parser<R, O2>) -> Self::Output {
        self.skip_then(&rhs)
    }
}

impl<R: Reader + 'static, O: Clone + 'static, O2: Clone + 'static> Shl<Parser<R, O2>> for Parser<R, O> {
    type Output = Parser<R, O>;
    fn shl(self, rhs: Parser<R, O2>) -> Self::Output {
        self.then_skip(&rhs)
    }
}
