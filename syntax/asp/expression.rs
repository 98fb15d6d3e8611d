//! Terms and infix expressions.
//!
//! An expression is read in two passes. The first flattens it into a
//! run of operands and operators, with explicit markers around each
//! parenthesized sub-run. The second resolves the run with a
//! shunting-yard reduction driven by the [`OperatorTable`]'s comparator.

use nom::{
    combinator::{cut, opt},
    multi::many0,
    sequence::preceded,
    Err, Slice,
};

use crate::parser::{error, expect, failure, Expectation, SyntaxError};
use crate::{
    parse_token, Application, AspToken, BinOp, OperatorEntry, OperatorTable, ParseScope, Reduce,
    Term,
};

pub(super) type Input<'a, S> = crate::parser::Input<'a, AspToken, S>;
pub(super) type PResult<'a, S, O> = crate::parser::PResult<'a, AspToken, S, O>;

/// Define a parser combinator that recognizes a single token.
macro_rules! parse_asp_token {
    ($function: ident, $token: ident) => {
        parse_token!(pub(super) $function<AspToken>, AspToken::$token);
    };
}

parse_asp_token!(dot, Dot);
parse_asp_token!(comma, Comma);
parse_asp_token!(bar, Bar);
parse_asp_token!(lparen, LParen);
parse_asp_token!(rparen, RParen);
parse_asp_token!(lbracket, LBracket);
parse_asp_token!(rbracket, RBracket);
parse_asp_token!(lbrace, LBrace);
parse_asp_token!(rbrace, RBrace);
parse_asp_token!(pound, Pound);
parse_asp_token!(r#if, If);
parse_asp_token!(query, Query);
parse_asp_token!(not, Not);

/// What every term parser needs besides its input.
#[derive(Clone, Copy)]
pub(super) struct Context<'p> {
    pub operators: &'p OperatorTable,
    pub scope: &'p ParseScope,
}

/// One element of a flattened expression.
enum Item<'a, S: Clone> {
    Operand(Term),
    Operator(OperatorEntry, Input<'a, S>),
    Open,
    Close,
}

/// The reduction's operator stack.
enum Pending<'a, S: Clone> {
    Open,
    Operator(OperatorEntry, Input<'a, S>),
}

/// A complete infix expression, e.g., `X + 1 =< max(Y, 2)`.
pub(super) fn expression<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Term> {
    let mut run = Vec::new();
    let (rest, ()) = flatten(cx, input, &mut run, u16::MAX)?;
    let term = reduce(cx.operators, input, run)?;
    Ok((rest, term))
}

/// Comma-separated expressions, e.g., arguments or list elements.
pub(super) fn terms<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Vec<Term>> {
    let (input, first) = expression(cx, input)?;
    let (input, mut rest) = many0(preceded(
        comma,
        cut(|i: Input<'a, S>| expression(cx, i)),
    ))(input)?;
    rest.insert(0, first);
    Ok((input, rest))
}

/// Flatten operands joined by operators of priority at most `bound`.
fn flatten<'a, S: Clone>(
    cx: Context,
    input: Input<'a, S>,
    run: &mut Vec<Item<'a, S>>,
    bound: u16,
) -> PResult<'a, S, ()> {
    let (mut input, ()) = unit(cx, input, run)?;
    while let Ok((rest, entry)) = infix(cx, input) {
        if entry.priority > bound {
            break;
        }
        run.push(Item::Operator(entry, input));
        input = match unit(cx, rest, run) {
            Ok((rest, ())) => rest,
            Err(Err::Error(e)) => return Err(Err::Failure(e)),
            Err(e) => return Err(e),
        };
    }
    Ok((input, ()))
}

/// An operand: a parenthesized sub-run or a leaf.
fn unit<'a, S: Clone>(
    cx: Context,
    input: Input<'a, S>,
    run: &mut Vec<Item<'a, S>>,
) -> PResult<'a, S, ()> {
    match lparen(input) {
        Ok((input, _)) => {
            run.push(Item::Open);
            let (input, ()) = flatten(cx, input, run, u16::MAX)?;
            let (input, _) = cut(expect(Expectation::RParen, rparen))(input)?;
            run.push(Item::Close);
            Ok((input, ()))
        }
        Err(_) => {
            let (input, term) = leaf(cx, input)?;
            run.push(Item::Operand(term));
            Ok((input, ()))
        }
    }
}

fn infix<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, OperatorEntry> {
    match input
        .peek()
        .and_then(|t| t.token.symbol())
        .and_then(|symbol| cx.operators.lookup(symbol))
    {
        Some(entry) => Ok((input.slice(1..), *entry)),
        None => error(input, Expectation::Operator),
    }
}

type Failed<'a, S> = Err<SyntaxError<Input<'a, S>>>;

fn combine<'a, S: Clone>(
    op: BinOp,
    operands: &mut Vec<Term>,
    start: Input<'a, S>,
) -> Result<(), Failed<'a, S>> {
    match (operands.pop(), operands.pop()) {
        (Some(y), Some(x)) => {
            operands.push(Term::binary(op, x, y));
            Ok(())
        }
        _ => Err(Err::Failure(SyntaxError::new(start, Expectation::Expression))),
    }
}

/// Resolve a flattened run, as though it were wrapped in parentheses.
fn reduce<'a, S: Clone>(
    operators: &OperatorTable,
    start: Input<'a, S>,
    run: Vec<Item<'a, S>>,
) -> Result<Term, Failed<'a, S>> {
    let comparator = operators.comparator();
    let mut operands = Vec::new();
    let mut pending = vec![Pending::Open];
    for item in run.into_iter().chain(std::iter::once(Item::Close)) {
        match item {
            Item::Operand(term) => operands.push(term),
            Item::Open => pending.push(Pending::Open),
            Item::Operator(incoming, at) => {
                while let Some(&Pending::Operator(top, _)) = pending.last() {
                    match comparator.reduce(&top, &incoming) {
                        Reduce::Pop => {
                            pending.pop();
                            combine(top.op, &mut operands, start)?;
                        }
                        Reduce::Push => break,
                        Reduce::Conflict => {
                            return Err(Err::Failure(SyntaxError::new(
                                at,
                                Expectation::NonAssociative,
                            )))
                        }
                    }
                }
                pending.push(Pending::Operator(incoming, at));
            }
            Item::Close => loop {
                match pending.pop() {
                    Some(Pending::Operator(top, _)) => combine(top.op, &mut operands, start)?,
                    Some(Pending::Open) => break,
                    None => return Err(Err::Failure(SyntaxError::new(start, Expectation::Expression))),
                }
            },
        }
    }
    match (pending.is_empty(), operands.pop(), operands.is_empty()) {
        (true, Some(term), true) => Ok(term),
        _ => Err(Err::Failure(SyntaxError::new(start, Expectation::Expression))),
    }
}

/// A term without infix operators at its top level.
fn leaf<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Term> {
    let Some(token) = input.peek() else {
        return error(input, Expectation::Term);
    };
    let rest = input.slice(1..);
    match &token.token {
        AspToken::Integer(i) => Ok((rest, Term::Integer(*i))),
        AspToken::Float(x) => Ok((rest, Term::Float(*x))),
        AspToken::Rational(n, d) => Ok((rest, Term::Rational(*n, *d))),
        AspToken::Variable(name) => Ok((rest, Term::Variable(name.clone()))),
        AspToken::Underscore => Ok((rest, Term::Variable(cx.scope.fresh()))),
        AspToken::Identifier(name) => predicate(cx, rest, name.name(), false),
        AspToken::Builtin(name) => {
            let (rest, arguments) = opt(|i| arguments(cx, i))(rest)?;
            Ok((rest, Term::BuiltinCall(name.clone(), arguments.unwrap_or_default())))
        }
        AspToken::LBracket => list(cx, rest),
        AspToken::Dash => negated(cx, rest),
        _ => error(input, Expectation::Term),
    }
}

/// A predicate, with `name` and `negated` already read.
fn predicate<'a, S: Clone>(
    cx: Context,
    input: Input<'a, S>,
    name: &str,
    negated: bool,
) -> PResult<'a, S, Term> {
    let (input, arguments) = opt(|i| arguments(cx, i))(input)?;
    Ok((
        input,
        Term::Predicate(Application::user(name, arguments.unwrap_or_default(), negated)),
    ))
}

/// `(t1, ..., tn)`; `()` is an empty list of arguments.
fn arguments<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Vec<Term>> {
    let (input, _) = lparen(input)?;
    if let Ok((input, _)) = rparen(input) {
        return Ok((input, Vec::new()));
    }
    let (input, arguments) = cut(|i| terms(cx, i))(input)?;
    let (input, _) = cut(expect(Expectation::RParen, rparen))(input)?;
    Ok((input, arguments))
}

/// Prefix `-` takes an operand joined by operators up to this priority,
/// so `-X ^ 2` is `-(X ^ 2)` but `-X * 2` is `(-X) * 2`.
const MINUS_PRIORITY: u16 = 200;

/// Whatever follows a prefix `-`: a negative number, a classically
/// negated predicate, or the arithmetic negation of anything else.
fn negated<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Term> {
    let Some(token) = input.peek() else {
        return failure(input, Expectation::Term);
    };
    let rest = input.slice(1..);
    match &token.token {
        AspToken::Integer(i) => match i.checked_neg() {
            Some(i) => Ok((rest, Term::Integer(i))),
            None => failure(input, Expectation::Term),
        },
        AspToken::Float(x) => Ok((rest, Term::Float(-x))),
        AspToken::Rational(n, d) => match n.checked_neg() {
            Some(n) => Ok((rest, Term::Rational(n, *d))),
            None => failure(input, Expectation::Term),
        },
        AspToken::Identifier(name) => predicate(cx, rest, name.name(), true),
        AspToken::Dash => failure(input, Expectation::DoubleNegation),
        AspToken::LParen => {
            let (rest, inner) = cut(|i| expression(cx, i))(rest)?;
            let (rest, _) = cut(expect(Expectation::RParen, rparen))(rest)?;
            Ok((rest, Term::minus(inner)))
        }
        _ => {
            let mut run = Vec::new();
            let (rest, ()) = cut(|i| flatten(cx, i, &mut run, MINUS_PRIORITY))(input)?;
            let term = reduce(cx.operators, input, run)?;
            Ok((rest, Term::minus(term)))
        }
    }
}

/// The rest of a list after its `[`.
fn list<'a, S: Clone>(cx: Context, input: Input<'a, S>) -> PResult<'a, S, Term> {
    if let Ok((input, _)) = rbracket(input) {
        return Ok((input, Term::ListEmpty));
    }
    let (input, elements) = cut(|i| terms(cx, i))(input)?;
    let (input, tail) = match opt(preceded(bar, cut(|i| expression(cx, i))))(input) {
        // A parenthesized conjunction as the tail, e.g., `[1 | (a, b)]`.
        Err(Err::Failure(e)) if e.expected == Expectation::RParen && comma(e.input).is_ok() => {
            return failure(e.input, Expectation::List);
        }
        result => result?,
    };
    if tail.is_some() && comma(input).is_ok() {
        return failure(input, Expectation::List);
    }
    let (input, _) = cut(expect(Expectation::RBracket, rbracket))(input)?;
    Ok((input, Term::list(elements, tail.unwrap_or(Term::ListEmpty))))
}

#[cfg(test)]
mod test {
    use crate::*;

    use super::*;

    macro_rules! tok {
        ($t: literal) => {
            Token::new(AspToken::Integer($t), ())
        };
        ($t: ident) => {
            Token::new(AspToken::$t, ())
        };
        ([$s: ident]) => {
            Token::new(AspToken::Identifier(sym!($s)), ())
        };
        ({$s: ident}) => {
            Token::new(AspToken::Variable(sym!($s)), ())
        };
    }

    macro_rules! toks {
        [$($t: tt),* $(,)?] => {
            vec![$(tok!($t)),*]
        };
    }

    fn parse_with(operators: &OperatorTable, tokens: &[Token<AspToken, ()>]) -> Result<Term, Expectation> {
        let scope = ParseScope::new();
        let cx = Context {
            operators,
            scope: &scope,
        };
        match expression(cx, Tokens::new(tokens)) {
            Ok((rest, term)) => {
                assert!(rest.is_empty(), "leftover tokens {rest:?}");
                Ok(term)
            }
            Err(Err::Error(e) | Err::Failure(e)) => Err(e.expected),
            Err(Err::Incomplete(_)) => unreachable!(),
        }
    }

    fn parse(tokens: &[Token<AspToken, ()>]) -> Result<Term, Expectation> {
        parse_with(&OperatorTable::standard(), tokens)
    }

    #[test]
    fn leaves() {
        assert_eq!(parse(&toks![1]), Ok(Term::Integer(1)));
        assert_eq!(parse(&toks![{X}]), Ok(var!(X)));
        assert_eq!(parse(&toks![[p]]), Ok(atom!(p)));
        assert_eq!(
            parse(&[Token::new(AspToken::Float(0.5), ())]),
            Ok(Term::Float(0.5))
        );
        assert_eq!(parse(&toks![Dot]), Err(Expectation::Term));
    }

    #[test]
    fn predicates() {
        assert_eq!(parse(&toks![[p]]).map(|t| t.to_string()), Ok("p_0".into()));
        assert_eq!(
            parse(&toks![[p], LParen, 1, Comma, {X}, RParen]).map(|t| t.to_string()),
            Ok("p_2(1, X)".into())
        );
        assert_eq!(
            parse(&toks![[p], LParen, RParen]).map(|t| t.to_string()),
            Ok("p_0".into())
        );
        assert_eq!(
            parse(&toks![Dash, [p], LParen, {X}, RParen]).map(|t| t.to_string()),
            Ok("n_p_1(X)".into())
        );
        assert_eq!(
            parse(&toks![[p], LParen, 1, Comma, RParen]),
            Err(Expectation::Term)
        );
        assert_eq!(parse(&toks![[p], LParen, 1, Dot]), Err(Expectation::RParen));
    }

    #[test]
    fn priorities() {
        assert_eq!(
            parse(&toks![1, Plus, 2, Star, 3]),
            Ok(binary!(1, Add, binary!(2, Mul, 3)))
        );
        assert_eq!(
            parse(&toks![1, Star, 2, Plus, 3]),
            Ok(binary!(binary!(1, Mul, 2), Add, 3))
        );
        assert_eq!(
            parse(&toks![LParen, 1, Plus, 2, RParen, Star, 3]),
            Ok(binary!(binary!(1, Add, 2), Mul, 3))
        );
        assert_eq!(
            parse(&toks![{X}, Is, {Y}, Plus, 1]),
            Ok(binary!(var!(X), Is, binary!(var!(Y), Add, 1)))
        );
        assert_eq!(
            parse(&toks![{X}, Plus, 1, Leq, 2, Mod, 3]),
            Ok(binary!(binary!(var!(X), Add, 1), Leq, binary!(2, Mod, 3)))
        );
    }

    #[test]
    fn associativity() {
        assert_eq!(
            parse(&toks![1, Dash, 2, Dash, 3]),
            Ok(binary!(binary!(1, Sub, 2), Sub, 3))
        );
        assert_eq!(
            parse(&toks![2, Caret, 3, Caret, 4]),
            Ok(binary!(2, Exp, binary!(3, Exp, 4)))
        );
        assert_eq!(parse(&toks![1, Eq, 2, Eq, 3]), Err(Expectation::NonAssociative));
        assert_eq!(parse(&toks![1, Lt, 2, Gt, 3]), Err(Expectation::NonAssociative));
        assert_eq!(
            parse(&toks![2, StarStar, 3, StarStar, 4]),
            Err(Expectation::NonAssociative)
        );
        assert_eq!(
            parse(&toks![LParen, 1, Eq, 2, RParen, Eq, 3]),
            Ok(binary!(binary!(1, Unify, 2), Unify, 3))
        );
    }

    #[test]
    fn uniform_comparator() {
        let uniform = OperatorTable::standard().with_comparator(Comparator::Uniform);
        assert_eq!(
            parse_with(&uniform, &toks![2, Caret, 3, Caret, 4]),
            Ok(binary!(binary!(2, Exp, 3), Exp, 4))
        );
        assert_eq!(
            parse_with(&uniform, &toks![1, Eq, 2, Eq, 3]),
            Ok(binary!(binary!(1, Unify, 2), Unify, 3))
        );
        assert_eq!(
            parse_with(&uniform, &toks![1, Plus, 2, Star, 3]),
            Ok(binary!(1, Add, binary!(2, Mul, 3)))
        );
    }

    #[test]
    fn negation() {
        assert_eq!(parse(&toks![Dash, 1]), Ok(Term::Integer(-1)));
        assert_eq!(
            parse(&toks![1, Dash, Dash, 1]),
            Ok(binary!(1, Sub, Term::Integer(-1)))
        );
        assert_eq!(parse(&toks![Dash, {X}]), Ok(Term::minus(var!(X))));
        assert_eq!(
            parse(&toks![Dash, LParen, {X}, Plus, 1, RParen]),
            Ok(Term::minus(binary!(var!(X), Add, 1)))
        );
        assert_eq!(parse(&toks![Dash, Dash, [p]]), Err(Expectation::DoubleNegation));
        assert_eq!(parse(&toks![Dash, Dot]), Err(Expectation::Term));
    }

    #[test]
    fn negation_binds_tighter_than_products() {
        assert_eq!(
            parse(&toks![Dash, {Y}, Caret, 2]),
            Ok(Term::minus(binary!(var!(Y), Exp, 2)))
        );
        assert_eq!(
            parse(&toks![Dash, {Y}, Star, 2]),
            Ok(binary!(Term::minus(var!(Y)), Mul, 2))
        );
        assert_eq!(
            parse(&toks![Dash, {Y}, Caret, 2, Plus, 1]),
            Ok(binary!(Term::minus(binary!(var!(Y), Exp, 2)), Add, 1))
        );
    }

    #[test]
    fn negation_overflow() {
        let min = [tok!(Dash), Token::new(AspToken::Integer(i64::MIN), ())];
        assert_eq!(parse(&min), Err(Expectation::Term));
        let min = [tok!(Dash), Token::new(AspToken::Rational(i64::MIN, 3), ())];
        assert_eq!(parse(&min), Err(Expectation::Term));
        let max = [tok!(Dash), Token::new(AspToken::Integer(i64::MAX), ())];
        assert_eq!(parse(&max), Ok(Term::Integer(-i64::MAX)));
    }

    #[test]
    fn lists() {
        assert_eq!(parse(&toks![LBracket, RBracket]), Ok(Term::ListEmpty));
        assert_eq!(
            parse(&toks![LBracket, 1, Comma, 2, Bar, {X}, RBracket]),
            Ok(list!([1, 2] | var!(X)))
        );
        assert_eq!(
            parse(&toks![LBracket, 1, Plus, 2, RBracket]),
            Ok(list!([binary!(1, Add, 2)]))
        );
        assert_eq!(
            parse(&toks![LBracket, LBracket, RBracket, Comma, 3, RBracket]),
            Ok(list!([Term::ListEmpty, 3]))
        );
        assert_eq!(
            parse(&toks![LBracket, 1, Bar, {X}, Comma, {Y}, RBracket]),
            Err(Expectation::List)
        );
        assert_eq!(parse(&toks![LBracket, 1, Dot]), Err(Expectation::RBracket));
        assert_eq!(
            parse(&toks![LBracket, 1, Bar, LParen, [a], Comma, [b], RParen, RBracket]),
            Err(Expectation::List)
        );
        assert_eq!(
            parse(&toks![LBracket, 1, Bar, LParen, {X}, RParen, RBracket]),
            Ok(list!([1] | var!(X)))
        );
    }

    #[test]
    fn anonymous_variables() {
        let scope = ParseScope::new();
        let operators = OperatorTable::standard();
        let cx = Context {
            operators: &operators,
            scope: &scope,
        };
        let tokens = toks![[p], LParen, Underscore, Comma, Underscore, RParen];
        let (_, term) = expression(cx, Tokens::new(&tokens)).unwrap();
        assert_eq!(term, atom!(p(var!(_V0), var!(_V1))));
        assert_eq!(scope.minted(), 2);
    }

    #[test]
    fn builtins() {
        let tokens = vec![
            Token::new(AspToken::Builtin(sym!(abs)), ()),
            tok!(LParen),
            tok!({X}),
            tok!(RParen),
        ];
        assert_eq!(
            parse(&tokens),
            Ok(Term::BuiltinCall(sym!(abs), vec![var!(X)]))
        );
        let tokens = vec![Token::new(AspToken::Builtin(sym!(nl)), ())];
        assert_eq!(parse(&tokens), Ok(Term::BuiltinCall(sym!(nl), vec![])));
    }
}
