//! ASP parser: rules, constraints, queries, and directives.
//!
//! A program is a sequence of *units*, each terminated by a `.` token.
//! A unit that fails to parse is reported and skipped through its
//! terminator, and parsing resumes with the next one.

use gavotte_tracer::{trace, Trace};
use nom::{
    branch::alt,
    combinator::{cut, eof, map, opt},
    multi::many0,
    sequence::preceded,
    Err, Slice,
};

use super::expression::{
    comma, dot, expression, lbrace, lparen, not, pound, query, r#if, rbrace, rparen, Context,
    Input, PResult,
};
use crate::parser::{error, expect, failure, Expectation};
use crate::{
    AspToken, Diagnostic, Directive, FatalError, Literal, OperatorTable, Parse, ParseScope,
    Program, Rule, Source, Symbol, Token, Tokens,
};

/// ASP parser.
#[derive(Clone, Debug)]
pub struct AspParser {
    trace: Trace,
    operators: OperatorTable,
}

impl Default for AspParser {
    fn default() -> Self {
        Self::new(Trace::none())
    }
}

impl AspParser {
    pub fn new(trace: Trace) -> Self {
        Self {
            trace,
            operators: OperatorTable::standard(),
        }
    }

    pub fn with_operators(self, operators: OperatorTable) -> Self {
        Self { operators, ..self }
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }
}

impl<S: Source> Parse<S> for AspParser {
    type Token = AspToken;

    fn parse_program(&self, tokens: &[Token<AspToken, S>]) -> Result<Program, FatalError> {
        trace!(self.trace, Parse, "Parsing {} tokens", tokens.len());
        let scope = ParseScope::new();
        let cx = Context {
            operators: &self.operators,
            scope: &scope,
        };
        let mut program = Program::new();
        let mut input = Tokens::new(tokens);
        while !input.is_empty() {
            scope.reset(variables(input.tok, true));
            match unit(cx, input) {
                Ok((rest, _)) if rest.start == input.start => {
                    return Err(FatalError::NoProgress {
                        offset: input.start,
                    });
                }
                Ok((rest, Unit::Statement(rule))) => {
                    trace!(self.trace, Parse, "Parsed rule: {}", rule);
                    program.statements.push(rule);
                    input = rest;
                }
                Ok((rest, Unit::Directive(directive))) => {
                    trace!(self.trace, Parse, "Parsed directive: {}", directive);
                    program.directives.push(directive);
                    input = rest;
                }
                Err(Err::Error(e) | Err::Failure(e)) => {
                    let diagnostic = Diagnostic::from(e);
                    let rest = input.skip_past(|t| t.token == AspToken::Dot);
                    trace!(
                        self.trace,
                        Recover,
                        "Syntax error: {}; skipping tokens {}..{}",
                        diagnostic,
                        input.start,
                        rest.start
                    );
                    program.report(diagnostic);
                    input = rest;
                }
                Err(Err::Incomplete(_)) => return Err(FatalError::Incomplete),
            }
        }
        trace!(
            self.trace,
            Parse,
            "Parsed {} statements, {} directives, {} errors",
            program.statements.len(),
            program.directives.len(),
            program.errors
        );
        Ok(program)
    }

    fn parse_query(&self, tokens: &[Token<AspToken, S>]) -> Result<Vec<Literal>, Diagnostic> {
        let scope = ParseScope::new();
        scope.reset(variables(tokens, false));
        let cx = Context {
            operators: &self.operators,
            scope: &scope,
        };
        match lone_query(cx, Tokens::new(tokens)) {
            Ok((_, goals)) => Ok(goals),
            Err(Err::Error(e) | Err::Failure(e)) => Err(Diagnostic::from(e)),
            Err(Err::Incomplete(_)) => Err(Diagnostic::end_of_file(Expectation::Body)),
        }
    }
}

/// The named variables of the unit at the front of `tokens`,
/// or of all of them if `unit` is false.
fn variables<S: Clone>(
    tokens: &[Token<AspToken, S>],
    unit: bool,
) -> impl Iterator<Item = &Symbol> {
    tokens
        .iter()
        .take_while(move |t| !unit || t.token != AspToken::Dot)
        .filter_map(|t| match &t.token {
            AspToken::Variable(name) => Some(name),
            _ => None,
        })
}

/// What one `.`-terminated unit of a program parses into.
enum Unit {
    Statement(Rule),
    Directive(Directive),
}

fn unit<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Unit> {
    expect(
        Expectation::Statement,
        alt((
            map(|i| directive(cx, i), Unit::Directive),
            map(|i| query_statement(cx, i), Unit::Directive),
            map(|i| constraint(cx, i), Unit::Statement),
            map(|i| rule(cx, i), Unit::Statement),
        )),
    )(input)
}

/// `p :- q, not r.` or the fact `p.`
fn rule<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Rule> {
    let (rest, head) = expression(cx, input)?;
    if !head.is_predicate() {
        return failure(input, Expectation::Head);
    }
    match r#if(rest) {
        Ok((rest, _)) => {
            let (rest, body) = cut(expect(Expectation::Body, |i| body(cx, i)))(rest)?;
            let (rest, _) = cut(expect(Expectation::Dot, dot))(rest)?;
            Ok((rest, Rule::new(head, body)))
        }
        Err(_) => {
            let (rest, _) = cut(expect(Expectation::Rule, dot))(rest)?;
            Ok((rest, Rule::fact(head)))
        }
    }
}

/// A headless rule `:- p, q.`
fn constraint<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Rule> {
    let (input, _) = r#if(input)?;
    let (input, body) = cut(expect(Expectation::Body, |i| body(cx, i)))(input)?;
    let (input, _) = cut(expect(Expectation::Dot, dot))(input)?;
    Ok((input, Rule::constraint(body)))
}

/// `?- goals.` means `#compute 1 { goals }.`
fn query_statement<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Directive> {
    let (input, _) = query(input)?;
    let (input, goals) = cut(expect(Expectation::Body, |i| body(cx, i)))(input)?;
    let (input, _) = cut(expect(Expectation::Dot, dot))(input)?;
    Ok((input, Directive::query(goals)))
}

/// A query on its own, with or without its `?-`.
fn lone_query<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Vec<Literal>> {
    let (input, _) = opt(query)(input)?;
    let (input, goals) = expect(Expectation::Body, |i| body(cx, i))(input)?;
    let (input, _) = cut(expect(Expectation::Dot, dot))(input)?;
    let (input, _) = cut(expect(Expectation::EndOfQuery, eof))(input)?;
    Ok((input, goals))
}

fn body<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Vec<Literal>> {
    let (input, first) = literal(cx, input)?;
    let (input, mut rest) = many0(preceded(comma, cut(|i| literal(cx, i))))(input)?;
    rest.insert(0, first);
    Ok((input, rest))
}

fn literal<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Literal> {
    match not(input) {
        Ok((rest, _)) => map(cut(|i| expression(cx, i)), Literal::Negative)(rest),
        Err(_) => map(|i| expression(cx, i), Literal::Positive)(input),
    }
}

/// `#kind ... .`
fn directive<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Directive> {
    let (input, _) = pound(input)?;
    let Some(Token {
        token: AspToken::Identifier(kind),
        ..
    }) = input.peek()
    else {
        return failure(input, Expectation::Directive);
    };
    let rest = input.slice(1..);
    let goals = |i: Input<'a, S>| cut(expect(Expectation::Body, |i| body(cx, i)))(i);
    let (rest, directive) = match kind.name() {
        "include" => include(rest)?,
        "table" => map(goals, Directive::Table)(rest)?,
        "show" => map(goals, Directive::Show)(rest)?,
        "pred" => map(goals, Directive::Pred)(rest)?,
        "compute" => compute(cx, rest)?,
        "abducible" => abducible(cx, rest)?,
        _ => return failure(input, Expectation::DirectiveKind),
    };
    let (rest, _) = cut(expect(Expectation::Dot, dot))(rest)?;
    Ok((rest, directive))
}

/// `"path"` or `("path")`.
fn include<'a, S: Clone>(input: Input<'a, S>) -> PResult<'a, S, Directive> {
    let (input, open) = opt(lparen)(input)?;
    let (input, path) = cut(path)(input)?;
    let input = match open {
        Some(_) => cut(expect(Expectation::RParen, rparen))(input)?.0,
        None => input,
    };
    Ok((input, Directive::Include(path)))
}

fn path<'a, S: Clone>(input: Input<'a, S>) -> PResult<'a, S, String> {
    match input.peek() {
        Some(Token {
            token: AspToken::String(quoted),
            ..
        }) => {
            let unquoted = quoted.strip_prefix('"').unwrap_or(quoted);
            let unquoted = unquoted.strip_suffix('"').unwrap_or(unquoted);
            Ok((input.slice(1..), String::from(unquoted)))
        }
        _ => error(input, Expectation::IncludePath),
    }
}

/// `n { goals }`
fn compute<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Directive> {
    let (input, count) = cut(model_count)(input)?;
    let (input, _) = cut(expect(Expectation::LBrace, lbrace))(input)?;
    let (input, goals) = cut(expect(Expectation::Body, |i| body(cx, i)))(input)?;
    let (input, _) = cut(expect(Expectation::RBrace, rbrace))(input)?;
    Ok((input, Directive::Compute(count, goals)))
}

fn model_count<'a, S: Clone>(input: Input<'a, S>) -> PResult<'a, S, u64> {
    match input.peek().map(|t| &t.token) {
        Some(AspToken::Integer(n)) => match u64::try_from(*n) {
            Ok(n) => Ok((input.slice(1..), n)),
            Err(_) => error(input, Expectation::ModelCount),
        },
        _ => error(input, Expectation::ModelCount),
    }
}

fn abducible<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Directive> {
    let (rest, term) = cut(expect(Expectation::Predicate, |i| expression(cx, i)))(input)?;
    if term.is_predicate() {
        Ok((rest, Directive::Abducible(term)))
    } else {
        failure(input, Expectation::Predicate)
    }
}
