//! Syntactic elements of an ASP language in the Prolog tradition:
//! rules, facts, integrity constraints, queries, and directives.
//!
//! Text is first classified into tokens (see [`AspLexer`]), then
//! the tokens are parsed into a [`Program`] (see [`AspParser`]).
//! Predicate identity is always a name *and* an arity, so `p` and
//! `p(1)` name distinct relations; see [`Functor`].

mod asp;
mod lexer;
mod names;
mod operators;
mod parser;
mod scope;
mod tokens;

use std::fmt;

pub use asp::{AspLexer, AspParser, AspToken};
pub use lexer::{Lex, LexError, Position, Source, Token};
pub use names::{is_hidden, ESCAPE_PREFIX, FALSITY, NEGATION_PREFIX, RESERVED_PREFIXES};
pub use operators::{Assoc, Comparator, OperatorEntry, OperatorTable, Reduce};
pub use parser::{Diagnostic, Expectation, FatalError, Parse, SyntaxError};
pub use scope::ParseScope;
pub use tokens::Tokens;

/// Uninterpreted element that names a predicate, function, or variable.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: String) -> Self {
        Symbol(name)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(String::from(s))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The identity of a predicate or function symbol: its (already
/// prefixed) name together with its arity. The canonical string
/// form `name_arity` exists only for display; comparisons always
/// use the structured pair.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Functor {
    pub name: Symbol,
    pub arity: usize,
}

impl Functor {
    pub fn new(name: Symbol, arity: usize) -> Self {
        Self { name, arity }
    }

    /// The synthetic head of an integrity constraint.
    pub fn falsity() -> Self {
        Self::new(Symbol::from(FALSITY), 0)
    }

    /// Name and arity joined into a single relation name.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Functor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}_{}", self.name, self.arity))
    }
}

/// A functor applied to a tuple of terms.
/// If the arity is 0, the arguments are elided when displayed.
#[derive(Clone, Debug, PartialEq)]
pub struct Application {
    pub functor: Functor,
    pub arguments: Vec<Term>,
}

impl Application {
    /// The arity comes from the arguments, so it is always consistent.
    pub fn new(name: Symbol, arguments: impl IntoIterator<Item = Term>) -> Self {
        let arguments: Vec<Term> = arguments.into_iter().collect();
        Self {
            functor: Functor::new(name, arguments.len()),
            arguments,
        }
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Application {
            functor,
            arguments,
        } = self;
        if arguments.is_empty() {
            functor.fmt(f)
        } else {
            f.write_fmt(format_args!("{}({})", functor, comma_separated(arguments)))
        }
    }
}

/// Binary (infix) operations. Relative priorities and associativity
/// live in an [`OperatorTable`], not here.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum BinOp {
    Unify,
    NotUnify,
    Identical,
    NotIdentical,
    Lt,
    Gt,
    Leq,
    Geq,
    ArithEq,
    ArithNe,
    Is,
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Rem,
    Pow,
    Exp,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        use BinOp::*;
        match self {
            Unify => "=",
            NotUnify => "\\=",
            Identical => "==",
            NotIdentical => "\\==",
            Lt => "<",
            Gt => ">",
            Leq => "=<",
            Geq => ">=",
            ArithEq => "=:=",
            ArithNe => "=\\=",
            Is => "is",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            IntDiv => "//",
            Mod => "mod",
            Rem => "rem",
            Pow => "**",
            Exp => "^",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Interpreted element: a predicate (or function) application,
/// a variable, a number, a list, a builtin call, or an operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    Predicate(Application),
    Variable(Symbol),
    Integer(i64),
    Float(f64),
    Rational(i64, i64),
    ListCons(Box<Term>, Box<Term>),
    ListEmpty,
    BuiltinCall(Symbol, Vec<Term>),
    Binary(BinOp, Box<Term>, Box<Term>),
    Minus(Box<Term>),
}

impl Term {
    /// Boxing constructor.
    pub fn binary(op: BinOp, x: Term, y: Term) -> Self {
        Self::Binary(op, Box::new(x), Box::new(y))
    }

    /// Boxing constructor.
    pub fn cons(head: Term, tail: Term) -> Self {
        Self::ListCons(Box::new(head), Box::new(tail))
    }

    /// Boxing constructor.
    pub fn minus(x: Term) -> Self {
        Self::Minus(Box::new(x))
    }

    /// Right-nested conses of `elements` ending in `tail`.
    pub fn list(elements: impl IntoIterator<Item = Term>, tail: Term) -> Self {
        let elements: Vec<Term> = elements.into_iter().collect();
        elements
            .into_iter()
            .rev()
            .fold(tail, |tail, head| Term::cons(head, tail))
    }

    pub fn falsity() -> Self {
        Self::Predicate(Application {
            functor: Functor::falsity(),
            arguments: Vec::new(),
        })
    }

    pub fn functor(&self) -> Option<&Functor> {
        match self {
            Self::Predicate(app) => Some(&app.functor),
            _ => None,
        }
    }

    pub fn is_predicate(&self) -> bool {
        self.functor().is_some()
    }
}

impl From<i64> for Term {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<Application> for Term {
    fn from(app: Application) -> Self {
        Self::Predicate(app)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Term::*;
        match self {
            Predicate(app) => app.fmt(f),
            Variable(x) => x.fmt(f),
            Integer(i) => i.fmt(f),
            Float(x) => f.write_fmt(format_args!("{x:?}")),
            Rational(n, d) => f.write_fmt(format_args!("{n}r{d}")),
            ListEmpty => f.write_str("[]"),
            ListCons(head, tail) => {
                f.write_fmt(format_args!("[{head}"))?;
                let mut tail: &Term = tail;
                while let ListCons(head, rest) = tail {
                    f.write_fmt(format_args!(", {head}"))?;
                    tail = &**rest;
                }
                match tail {
                    ListEmpty => f.write_str("]"),
                    tail => f.write_fmt(format_args!(" | {tail}]")),
                }
            }
            BuiltinCall(name, args) if args.is_empty() => name.fmt(f),
            BuiltinCall(name, args) => {
                f.write_fmt(format_args!("{}({})", name, comma_separated(args)))
            }
            Binary(op, x, y) => f.write_fmt(format_args!("{op}({x}, {y})")),
            Minus(x) => f.write_fmt(format_args!("-({x})")),
        }
    }
}

/// A term or its negation as failure. Classical negation is
/// not a connective here: it is part of the predicate's name.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Positive(Term),
    Negative(Term),
}

impl Literal {
    pub fn term(&self) -> &Term {
        match self {
            Self::Positive(term) | Self::Negative(term) => term,
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Positive(..))
    }

    pub fn is_negative(&self) -> bool {
        !self.is_positive()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive(term) => term.fmt(f),
            Self::Negative(term) => f.write_fmt(format_args!("not {term}")),
        }
    }
}

/// A normal rule: one head and a conjunctive body.
/// Facts have an empty body; integrity constraints have
/// the synthetic [`Functor::falsity`] head.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub head: Term,
    pub body: Vec<Literal>,
}

impl Rule {
    pub fn new(head: Term, body: impl IntoIterator<Item = Literal>) -> Self {
        Self {
            head,
            body: body.into_iter().collect(),
        }
    }

    pub fn fact(head: Term) -> Self {
        Self::new(head, [])
    }

    pub fn constraint(body: impl IntoIterator<Item = Literal>) -> Self {
        Self::new(Term::falsity(), body)
    }

    pub fn is_fact(&self) -> bool {
        self.body.is_empty()
    }

    pub fn is_constraint(&self) -> bool {
        self.head.functor() == Some(&Functor::falsity())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = comma_separated(&self.body);
        match (self.is_constraint(), self.is_fact()) {
            (true, _) => f.write_fmt(format_args!(":- {body}.")),
            (false, true) => f.write_fmt(format_args!("{}.", self.head)),
            (false, false) => f.write_fmt(format_args!("{} :- {body}.", self.head)),
        }
    }
}

/// Top-level instructions that are not rules.
/// A query `?- goals.` is represented as `Compute(1, goals)`.
#[derive(Clone, Debug, PartialEq)]
pub enum Directive {
    Include(String),
    Table(Vec<Literal>),
    Show(Vec<Literal>),
    Pred(Vec<Literal>),
    Compute(u64, Vec<Literal>),
    Abducible(Term),
}

impl Directive {
    pub fn query(goals: impl IntoIterator<Item = Literal>) -> Self {
        Self::Compute(1, goals.into_iter().collect())
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Directive::*;
        match self {
            Include(path) => f.write_fmt(format_args!("#include \"{path}\".")),
            Table(goals) => f.write_fmt(format_args!("#table {}.", comma_separated(goals))),
            Show(goals) => f.write_fmt(format_args!("#show {}.", comma_separated(goals))),
            Pred(goals) => f.write_fmt(format_args!("#pred {}.", comma_separated(goals))),
            Compute(n, goals) => f.write_fmt(format_args!(
                "#compute {n} {{ {} }}.",
                comma_separated(goals)
            )),
            Abducible(term) => f.write_fmt(format_args!("#abducible {term}.")),
        }
    }
}

/// The result of parsing a token stream: every statement and directive
/// that parsed, in order, plus one diagnostic per unit that did not.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Rule>,
    pub directives: Vec<Directive>,
    pub diagnostics: Vec<Diagnostic>,
    pub errors: usize,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed unit.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
        self.errors += 1;
    }

    /// Splice another program (e.g., an included file) onto this one.
    pub fn append(&mut self, other: Program) {
        self.statements.extend(other.statements);
        self.directives.extend(other.directives);
        self.diagnostics.extend(other.diagnostics);
        self.errors += other.errors;
    }

    /// Paths named by `#include` directives, in order.
    pub fn includes(&self) -> impl Iterator<Item = &str> {
        self.directives.iter().filter_map(|d| match d {
            Directive::Include(path) => Some(path.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.statements {
            writeln!(f, "{rule}")?;
        }
        for directive in &self.directives {
            writeln!(f, "{directive}")?;
        }
        Ok(())
    }
}

fn comma_separated<T: fmt::Display>(elements: &[T]) -> String {
    elements
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// These constructor macros make tests involving syntactic elements
/// much more readable. They are *not* intended as a public interface;
/// they're exported (behind the `macros` feature) only because cargo
/// can't share test code across crates.
#[cfg(any(test, feature = "macros"))]
mod macros {
    #[macro_export]
    macro_rules! sym {
        ($name: ident) => {
            $crate::Symbol::from(stringify!($name))
        };
    }

    /// A predicate term with a raw (already canonical) name.
    #[macro_export]
    macro_rules! atom {
        ($pred: ident) => {
            $crate::Term::Predicate($crate::Application::new($crate::sym!($pred), []))
        };
        ($pred: ident($($arg: expr),* $(,)?)) => {
            $crate::Term::Predicate($crate::Application::new(
                $crate::sym!($pred),
                [$($crate::Term::from($arg)),*],
            ))
        };
    }

    #[macro_export]
    macro_rules! var {
        ($name: ident) => {
            $crate::Term::Variable($crate::sym!($name))
        };
    }

    #[macro_export]
    macro_rules! binary {
        ($l: expr, $op: ident, $r: expr) => {
            $crate::Term::binary($crate::BinOp::$op, $crate::Term::from($l), $crate::Term::from($r))
        };
    }

    #[macro_export]
    macro_rules! list {
        ([$($elt: expr),* $(,)?]) => {
            $crate::Term::list([$($crate::Term::from($elt)),*], $crate::Term::ListEmpty)
        };
        ([$($elt: expr),* $(,)?] | $tail: expr) => {
            $crate::Term::list([$($crate::Term::from($elt)),*], $crate::Term::from($tail))
        };
    }

    #[macro_export]
    macro_rules! pos {
        ($term: expr) => {
            $crate::Literal::Positive($term)
        };
    }

    #[macro_export]
    macro_rules! neg {
        ($term: expr) => {
            $crate::Literal::Negative($term)
        };
    }

    #[macro_export]
    macro_rules! rule {
        ($head: expr) => {
            $crate::Rule::fact($head)
        };
        ($head: expr, [$($body: expr),* $(,)?]) => {
            $crate::Rule::new($head, [$($body),*])
        };
    }
}
