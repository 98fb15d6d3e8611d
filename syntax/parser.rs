//! Parse a stream of tokens with [nom](https://crates.io/crates/nom).
//!
//! Combinators report failures as a [`SyntaxError`] that remembers
//! where it happened and what was expected there; the statement loop
//! turns those into [`Diagnostic`]s and carries on.

use std::fmt;

use nom::{
    error::{ErrorKind, ParseError},
    Err, IResult, InputLength, Parser,
};
use thiserror::Error;

use crate::{Literal, Position, Program, Source, Token, Tokens};

/// An input stream to a parser.
pub type Input<'a, T, S> = Tokens<'a, Token<T, S>>;

/// The result of a token parser.
pub type PResult<'a, T, S, O> = IResult<Input<'a, T, S>, O, SyntaxError<Input<'a, T, S>>>;

/// A parser, generic over the source annotation so that tests
/// can feed it tokens without positions.
pub trait Parse<S: Source> {
    /// The lexical (input) token type being parsed.
    type Token: Clone;

    /// Parse a whole program, recovering from statement-level errors.
    /// Only a parse that cannot make progress is fatal.
    fn parse_program(&self, tokens: &[Token<Self::Token, S>]) -> Result<Program, FatalError>;

    /// Parse a single query body, e.g., `p(X), not q(X).`
    fn parse_query(&self, tokens: &[Token<Self::Token, S>]) -> Result<Vec<Literal>, Diagnostic>;
}

/// What a parser wanted when it failed. Closed, so that every
/// diagnostic has one of a known set of messages.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Expectation {
    Token,
    Dot,
    LParen,
    RParen,
    RBracket,
    LBrace,
    RBrace,
    Term,
    Head,
    Body,
    Rule,
    Statement,
    List,
    Directive,
    DirectiveKind,
    IncludePath,
    ModelCount,
    Predicate,
    Operator,
    Expression,
    NonAssociative,
    DoubleNegation,
    EndOfQuery,
}

impl Expectation {
    pub fn message(&self) -> &'static str {
        use Expectation::*;
        match self {
            Token => "expected token",
            Dot => "expected `.`",
            LParen => "expected `(`",
            RParen => "expected `)`",
            RBracket => "expected `]`",
            LBrace => "expected `{`",
            RBrace => "expected `}`",
            Term => "expected term",
            Head => "expected predicate as rule head",
            Body => "expected rule body",
            Rule => "expected `:-` or `.` after rule head",
            Statement => "expected statement",
            List => "malformed list",
            Directive => "malformed directive",
            DirectiveKind => "unknown directive",
            IncludePath => "expected quoted include path",
            ModelCount => "expected model count",
            Predicate => "expected predicate",
            Operator => "expected operator",
            Expression => "malformed expression",
            NonAssociative => "operator is not associative",
            DoubleNegation => "double negation",
            EndOfQuery => "expected end of query",
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A nom error that keeps the input where parsing failed
/// together with what was expected there.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntaxError<I> {
    pub input: I,
    pub expected: Expectation,
}

impl<I> SyntaxError<I> {
    pub fn new(input: I, expected: Expectation) -> Self {
        Self { input, expected }
    }
}

impl<I: InputLength> ParseError<I> for SyntaxError<I> {
    fn from_error_kind(input: I, _kind: ErrorKind) -> Self {
        Self::new(input, Expectation::Token)
    }

    fn append(_input: I, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    /// Of two alternatives, report the one that got further;
    /// on a tie, the more specific one.
    fn or(self, other: Self) -> Self {
        use std::cmp::Ordering::*;
        match self.input.input_len().cmp(&other.input.input_len()) {
            Less => self,
            Greater => other,
            Equal if other.expected == Expectation::Token => self,
            Equal => other,
        }
    }
}

/// Construct a recoverable error.
pub(crate) fn error<I, O>(input: I, expected: Expectation) -> IResult<I, O, SyntaxError<I>> {
    Err(Err::Error(SyntaxError::new(input, expected)))
}

/// Construct an unrecoverable (committed) error.
pub(crate) fn failure<I, O>(input: I, expected: Expectation) -> IResult<I, O, SyntaxError<I>> {
    Err(Err::Failure(SyntaxError::new(input, expected)))
}

/// Label the errors of `parser` that occur right where it starts.
/// Deeper errors already say more, and failures are left alone.
pub fn expect<'a, T, S, O, P>(
    expected: Expectation,
    mut parser: P,
) -> impl FnMut(Input<'a, T, S>) -> PResult<'a, T, S, O>
where
    T: Clone + 'a,
    S: Clone + 'a,
    P: Parser<Input<'a, T, S>, O, SyntaxError<Input<'a, T, S>>>,
{
    move |input: Input<'a, T, S>| match parser.parse(input) {
        Err(Err::Error(e)) if e.input.start == input.start => error(input, expected),
        result => result,
    }
}

/// Produce a parser combinator that recognizes a literal token.
#[macro_export]
macro_rules! parse_token {
    ($vis:vis $function:ident<$ty: ty>, $tag: expr) => {
        $vis fn $function<'a, S: Clone>(
            input: $crate::parser::Input<'a, $ty, S>,
        ) -> $crate::parser::PResult<'a, $ty, S, $crate::parser::Input<'a, $ty, S>> {
            ::nom::combinator::verify(
                ::nom::bytes::complete::take(1_usize),
                |t: &$crate::parser::Input<'a, $ty, S>| t.tok[0].token == $tag,
            )(input)
        }
    };
}

/// A structured syntax error report: where, what was found there,
/// and what should have been.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub position: Option<Position>,
    pub found: Option<String>,
    pub expected: Expectation,
}

impl Diagnostic {
    pub fn new(position: Option<Position>, found: impl Into<String>, expected: Expectation) -> Self {
        Self {
            position,
            found: Some(found.into()),
            expected,
        }
    }

    /// Input ran out while `expected` was still wanted.
    pub fn end_of_file(expected: Expectation) -> Self {
        Self {
            position: None,
            found: None,
            expected,
        }
    }

    pub fn is_end_of_file(&self) -> bool {
        self.found.is_none()
    }
}

impl<'a, T, S> From<SyntaxError<Input<'a, T, S>>> for Diagnostic
where
    T: Clone + fmt::Display,
    S: Source,
{
    fn from(e: SyntaxError<Input<'a, T, S>>) -> Self {
        match e.input.peek() {
            None => Self::end_of_file(e.expected),
            Some(token) => Self::new(token.source.position(), token.token.to_string(), e.expected),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.position, &self.found) {
            (_, None) => f.write_str("unexpected end of file"),
            (Some(position), Some(found)) => {
                f.write_fmt(format_args!("{position}: {}, found `{found}`", self.expected))
            }
            (None, Some(found)) => f.write_fmt(format_args!("{}, found `{found}`", self.expected)),
        }
    }
}

impl std::error::Error for Diagnostic {}

/// Conditions under which no program can be produced at all.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum FatalError {
    #[error("parser made no progress at token {offset}")]
    NoProgress { offset: usize },
    #[error("parser asked for more input than it was given")]
    Incomplete,
}
