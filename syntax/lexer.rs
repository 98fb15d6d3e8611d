//! Tokenize a string representation of a program.
//!
//! The parser only ever sees [`Token`]s; anything that can classify
//! text into them (this module's lexers, an editor, a macro) will do.

use std::fmt;
use std::sync::Arc;

use nom::{
    branch::alt,
    bytes::complete::{escaped, tag, take_until},
    character::complete::{
        alpha1, alphanumeric1, char, digit1, hex_digit1, multispace1, none_of, not_line_ending,
        one_of, satisfy,
    },
    combinator::{map, map_res, opt, recognize},
    error::ParseError,
    multi::{many0, many0_count, many1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult, Parser,
};
use thiserror::Error;

use crate::Symbol;

/// Where a token came from: source id, line, and column (both 1-based).
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Position {
    pub source: Arc<str>,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(source: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self {
            source: source.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}:{}:{}", self.source, self.line, self.column))
    }
}

/// Source information attached to a token. Tests use `()`.
pub trait Source: Clone {
    fn position(&self) -> Option<Position>;
}

impl Source for Position {
    fn position(&self) -> Option<Position> {
        Some(self.clone())
    }
}

impl Source for () {
    fn position(&self) -> Option<Position> {
        None
    }
}

/// A token with source information.
#[derive(Clone, Debug, PartialEq)]
pub struct Token<T: Clone, S: Clone> {
    pub token: T,
    pub source: S,
}

impl<T: Clone, S: Clone> Token<T, S> {
    pub fn new(token: T, source: S) -> Self {
        Self { token, source }
    }

    /// Replace the source annotation.
    pub fn relocate<R: Clone>(self, source: R) -> Token<T, R> {
        Token::new(self.token, source)
    }
}

/// Things that may go wrong while tokenizing.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum LexError {
    #[error("{position}: unrecognized input `{text}`")]
    Unrecognized { position: Position, text: String },
}

/// A lexer, a.k.a. lexical analyzer, tokenizer.
pub trait Lex {
    type Token: Clone;

    /// Tokenize the text of the named source.
    fn lex(source: &str, text: &str) -> Result<Vec<Token<Self::Token, Position>>, LexError>;
}

/// Map byte offsets in a text to line & column positions.
pub(crate) struct LineIndex<'a> {
    source: Arc<str>,
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub(crate) fn new(source: &str, text: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            source: Arc::from(source),
            text,
            starts,
        }
    }

    /// Position of the first character of `rest`, a suffix of the text.
    pub(crate) fn locate(&self, rest: &str) -> Position {
        let offset = self.text.len() - rest.len();
        let line = self.starts.partition_point(|&start| start <= offset);
        let start = self.starts[line - 1];
        let column = self.text[start..offset].chars().count() + 1;
        Position {
            source: Arc::clone(&self.source),
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
        }
    }
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('%'), not_line_ending))(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

/// Whitespace and comments.
pub(crate) fn space(input: &str) -> IResult<&str, &str> {
    recognize(many0_count(alt((multispace1, line_comment, block_comment))))(input)
}

/// A lower-case name: constant, predicate, or function symbol.
pub(crate) fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_lowercase()),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

/// An upper-case or underscore name: a variable.
pub(crate) fn variable(input: &str) -> IResult<&str, Symbol> {
    let (input, name) = recognize(pair(
        alt((satisfy(|c| c.is_ascii_uppercase()), char('_'))),
        many0_count(alt((alpha1, digit1, tag("_")))),
    ))(input)?;
    Ok((input, Symbol::from(name)))
}

/// A single-quoted atom, e.g., `'hello world'`.
pub(crate) fn quoted_atom(input: &str) -> IResult<&str, Symbol> {
    map(
        delimited(char('\''), recognize(many0_count(none_of("'"))), char('\'')),
        Symbol::from,
    )(input)
}

/// A double-quoted string, returned verbatim (quotes and escapes intact).
pub(crate) fn string(input: &str) -> IResult<&str, String> {
    map(
        recognize(delimited(
            char('"'),
            opt(escaped(none_of(r#"\""#), '\\', one_of(r#"\"nrt"#))),
            char('"'),
        )),
        String::from,
    )(input)
}

#[allow(clippy::from_str_radix_10)]
fn decimal(input: &str) -> IResult<&str, i64> {
    map_res(
        recognize(many1(terminated(digit1, many0(char('_'))))),
        |digits: &str| i64::from_str_radix(&digits.replace('_', ""), 10),
    )(input)
}

fn hexadecimal(input: &str) -> IResult<&str, i64> {
    map_res(
        preceded(
            alt((tag("0x"), tag("0X"))),
            recognize(many1(terminated(hex_digit1, many0(char('_'))))),
        ),
        |digits: &str| i64::from_str_radix(&digits.replace('_', ""), 16),
    )(input)
}

pub(crate) fn integer(input: &str) -> IResult<&str, i64> {
    alt((hexadecimal, decimal))(input)
}

/// A float needs digits on both sides of the point, so that
/// the terminator in `p(1).` is never mistaken for one.
pub(crate) fn float(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((
            digit1,
            char('.'),
            digit1,
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        str::parse,
    )(input)
}

/// A rational like `1r3` (numerator, denominator).
pub(crate) fn rational(input: &str) -> IResult<&str, (i64, i64)> {
    map_res(
        tuple((digit1, char('r'), digit1)),
        |(n, _, d): (&str, char, &str)| -> Result<(i64, i64), std::num::ParseIntError> {
            Ok((n.parse()?, d.parse()?))
        },
    )(input)
}

pub(crate) fn token<I, O, E, F>(mut parser: F) -> impl FnMut(I) -> IResult<I, Token<O, I>, E>
where
    I: Clone,
    O: Clone,
    E: ParseError<I>,
    F: Parser<I, O, E>,
{
    move |input: I| {
        let i = input.clone();
        let (input, t) = parser.parse(input)?;
        Ok((input, Token::new(t, i)))
    }
}

/// Define a parser combinator for a token denoted by a tag.
#[macro_export]
macro_rules! lex_token {
    ($function: ident<$ty: ty>, $tag: literal, $token: expr) => {
        pub(crate) fn $function(input: &str) -> IResult<&str, $crate::Token<$ty, &str>> {
            $crate::lexer::token(::nom::combinator::map(
                ::nom::bytes::complete::tag($tag),
                |_| $token,
            ))(input)
        }
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn name() {
        assert!(super::name("").is_err(), "empty");
        assert!(super::name("Foo").is_err(), "upper case");
        assert!(super::name("_foo").is_err(), "underscore");
        assert_eq!(super::name("foo_12 x"), Ok((" x", "foo_12")));
    }

    #[test]
    fn variable() {
        assert!(super::variable("x").is_err(), "lower case");
        assert_eq!(super::variable("X1"), Ok(("", Symbol::from("X1"))));
        assert_eq!(super::variable("_"), Ok(("", Symbol::from("_"))));
        assert_eq!(super::variable("_Foo)"), Ok((")", Symbol::from("_Foo"))));
    }

    #[test]
    fn string() {
        assert!(super::string(r#""#).is_err(), "empty");
        assert!(super::string(r#""foo"#).is_err(), "unterminated string");
        assert_eq!(super::string(r#""""#), Ok(("", String::from(r#""""#))));
        assert_eq!(
            super::string(r#""a.lp"."#),
            Ok((".", String::from(r#""a.lp""#))),
            "terminator inside a string"
        );
        assert_eq!(
            super::string(r#""say \"hi\"""#),
            Ok(("", String::from(r#""say \"hi\"""#))),
            "backslash escapes"
        );
    }

    #[test]
    fn numbers() {
        assert!(super::integer("X").is_err(), "invalid");
        assert!(super::integer("12_345_678_901_234_567_890").is_err(), "big");
        assert_eq!(super::integer("123_456"), Ok(("", 123_456)));
        assert_eq!(super::integer("0x1234_abcd"), Ok(("", 0x1234_abcd)));
        assert!(super::float("1.").is_err(), "no fraction");
        assert_eq!(super::float("1.5)"), Ok((")", 1.5)));
        assert_eq!(super::float("2.5e3"), Ok(("", 2500.0)));
        assert_eq!(super::rational("1r3"), Ok(("", (1, 3))));
    }

    #[test]
    fn space() {
        assert_eq!(super::space("  % comment\n  p"), Ok(("p", "  % comment\n  ")));
        assert_eq!(super::space("/* a\nb */p"), Ok(("p", "/* a\nb */")));
        assert_eq!(super::space("p"), Ok(("p", "")));
    }

    #[test]
    fn locate() {
        let text = "p.\n  q.";
        let index = LineIndex::new("test.lp", text);
        assert_eq!(index.locate(text), Position::new("test.lp", 1, 1));
        assert_eq!(index.locate(&text[5..]), Position::new("test.lp", 2, 3));
    }
}
