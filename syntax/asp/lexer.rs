//! ASP tokens and tokenizer.

use std::fmt;

use nom::{
    branch::alt,
    combinator::map,
    multi::many0,
    sequence::{preceded, terminated},
    IResult,
};

use crate::lexer::{
    float, integer, name, quoted_atom, rational, space, string, token, variable, LineIndex,
};
use crate::{lex_token, Lex, LexError, Position, Symbol, Token};

/// Names the lexer classifies as builtin calls rather than predicates.
pub const BUILTINS: [&str; 6] = ["write", "writeln", "nl", "abs", "min", "max"];

/// Lexical element of an ASP program.
#[derive(Clone, Debug, PartialEq)]
pub enum AspToken {
    Identifier(Symbol),
    Variable(Symbol),
    Underscore,
    Integer(i64),
    Float(f64),
    Rational(i64, i64),
    /// Verbatim, quotes included.
    String(String),
    Builtin(Symbol),
    Dot,
    Comma,
    Bar,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Pound,
    If,
    Query,
    Not,
    Plus,
    Dash,
    Star,
    Slash,
    SlashSlash,
    StarStar,
    Caret,
    Eq,
    NotUnify,
    EqEq,
    NotEqEq,
    Lt,
    Gt,
    Leq,
    Geq,
    ArithEq,
    ArithNe,
    Is,
    Mod,
    Rem,
}

impl AspToken {
    /// The surface text of a fixed token.
    pub fn symbol(&self) -> Option<&'static str> {
        use AspToken::*;
        Some(match self {
            Identifier(_) | Variable(_) | Integer(_) | Float(_) | Rational(..) | String(_)
            | Builtin(_) => return None,
            Underscore => "_",
            Dot => ".",
            Comma => ",",
            Bar => "|",
            LParen => "(",
            RParen => ")",
            LBracket => "[",
            RBracket => "]",
            LBrace => "{",
            RBrace => "}",
            Pound => "#",
            If => ":-",
            Query => "?-",
            Not => "not",
            Plus => "+",
            Dash => "-",
            Star => "*",
            Slash => "/",
            SlashSlash => "//",
            StarStar => "**",
            Caret => "^",
            Eq => "=",
            NotUnify => "\\=",
            EqEq => "==",
            NotEqEq => "\\==",
            Lt => "<",
            Gt => ">",
            Leq => "=<",
            Geq => ">=",
            ArithEq => "=:=",
            ArithNe => "=\\=",
            Is => "is",
            Mod => "mod",
            Rem => "rem",
        })
    }
}

impl fmt::Display for AspToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AspToken::*;
        match self {
            Identifier(s) | Variable(s) | Builtin(s) => s.fmt(f),
            Integer(i) => i.fmt(f),
            Float(x) => f.write_fmt(format_args!("{x:?}")),
            Rational(n, d) => f.write_fmt(format_args!("{n}r{d}")),
            String(s) => f.write_str(s),
            fixed => f.write_str(fixed.symbol().unwrap_or_default()),
        }
    }
}

macro_rules! asp_token {
    ($function: ident, $tag: literal, $token: ident) => {
        lex_token!($function<AspToken>, $tag, AspToken::$token);
    };
}

asp_token!(dot, ".", Dot);
asp_token!(comma, ",", Comma);
asp_token!(bar, "|", Bar);
asp_token!(lparen, "(", LParen);
asp_token!(rparen, ")", RParen);
asp_token!(lbracket, "[", LBracket);
asp_token!(rbracket, "]", RBracket);
asp_token!(lbrace, "{", LBrace);
asp_token!(rbrace, "}", RBrace);
asp_token!(pound, "#", Pound);
asp_token!(r#if, ":-", If);
asp_token!(query, "?-", Query);
asp_token!(plus, "+", Plus);
asp_token!(dash, "-", Dash);
asp_token!(star_star, "**", StarStar);
asp_token!(star, "*", Star);
asp_token!(slash_slash, "//", SlashSlash);
asp_token!(slash, "/", Slash);
asp_token!(caret, "^", Caret);
asp_token!(arith_eq, "=:=", ArithEq);
asp_token!(arith_ne, "=\\=", ArithNe);
asp_token!(leq, "=<", Leq);
asp_token!(eq_eq, "==", EqEq);
asp_token!(eq, "=", Eq);
asp_token!(not_eq_eq, "\\==", NotEqEq);
asp_token!(not_unify, "\\=", NotUnify);
asp_token!(geq, ">=", Geq);
asp_token!(gt, ">", Gt);
asp_token!(lt, "<", Lt);

/// Lower-case words: keywords, builtins, and plain identifiers.
fn word(input: &str) -> IResult<&str, Token<AspToken, &str>> {
    token(map(name, |word| match word {
        "not" => AspToken::Not,
        "is" => AspToken::Is,
        "mod" => AspToken::Mod,
        "rem" => AspToken::Rem,
        _ if BUILTINS.contains(&word) => AspToken::Builtin(Symbol::from(word)),
        _ => AspToken::Identifier(Symbol::from(word)),
    }))(input)
}

fn var(input: &str) -> IResult<&str, Token<AspToken, &str>> {
    token(map(variable, |v| match v.name() {
        "_" => AspToken::Underscore,
        _ => AspToken::Variable(v),
    }))(input)
}

fn number(input: &str) -> IResult<&str, Token<AspToken, &str>> {
    alt((
        token(map(rational, |(n, d)| AspToken::Rational(n, d))),
        token(map(float, AspToken::Float)),
        token(map(integer, AspToken::Integer)),
    ))(input)
}

/// One token. Longer operators are tried before their prefixes.
fn lexeme(input: &str) -> IResult<&str, Token<AspToken, &str>> {
    alt((
        number,
        word,
        var,
        token(map(quoted_atom, AspToken::Identifier)),
        token(map(string, AspToken::String)),
        alt((r#if, query, dot, comma, bar, pound)),
        alt((lparen, rparen, lbracket, rbracket, lbrace, rbrace)),
        alt((plus, dash, star_star, star, slash_slash, slash, caret)),
        alt((
            arith_eq, arith_ne, leq, eq_eq, eq, not_eq_eq, not_unify, geq, gt, lt,
        )),
    ))(input)
}

/// ASP lexer.
pub struct AspLexer;

impl Lex for AspLexer {
    type Token = AspToken;

    fn lex(source: &str, text: &str) -> Result<Vec<Token<AspToken, Position>>, LexError> {
        let index = LineIndex::new(source, text);
        let (rest, tokens) =
            terminated(many0(preceded(space, lexeme)), space)(text).unwrap_or((text, Vec::new()));
        if !rest.is_empty() {
            return Err(LexError::Unrecognized {
                position: index.locate(rest),
                text: rest.chars().take_while(|c| !c.is_whitespace()).collect(),
            });
        }
        Ok(tokens
            .into_iter()
            .map(|t| {
                let position = index.locate(t.source);
                t.relocate(position)
            })
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use AspToken::*;

    fn lex(text: &str) -> Vec<AspToken> {
        AspLexer::lex("test.lp", text)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    fn id(s: &str) -> AspToken {
        Identifier(Symbol::from(s))
    }

    #[test]
    fn nothing() {
        assert_eq!(lex(""), vec![]);
        assert_eq!(lex("  % just a comment\n"), vec![]);
    }

    #[test]
    fn rule() {
        assert_eq!(
            lex("p(X, _) :- not q(1.5, 1r3, 0x10), X =< -2."),
            vec![
                id("p"),
                LParen,
                Variable(Symbol::from("X")),
                Comma,
                Underscore,
                RParen,
                If,
                Not,
                id("q"),
                LParen,
                Float(1.5),
                Comma,
                Rational(1, 3),
                Comma,
                Integer(16),
                RParen,
                Comma,
                Variable(Symbol::from("X")),
                Leq,
                Dash,
                Integer(2),
                Dot,
            ]
        );
    }

    #[test]
    fn operators() {
        assert_eq!(
            lex("=:= =\\= == \\== \\= = =< >= < > // / ** * ^ + - is mod rem"),
            vec![
                ArithEq, ArithNe, EqEq, NotEqEq, NotUnify, Eq, Leq, Geq, Lt, Gt, SlashSlash,
                Slash, StarStar, Star, Caret, Plus, Dash, Is, Mod, Rem,
            ]
        );
        assert_eq!(lex("X=Y"), vec![Variable(Symbol::from("X")), Eq, Variable(Symbol::from("Y"))]);
    }

    #[test]
    fn words() {
        assert_eq!(
            lex("nothing not abs write isa"),
            vec![
                id("nothing"),
                Not,
                Builtin(Symbol::from("abs")),
                Builtin(Symbol::from("write")),
                id("isa"),
            ]
        );
    }

    #[test]
    fn directives() {
        assert_eq!(
            lex("#include \"a.lp\". ?- 'Hello world'. /* done */"),
            vec![
                Pound,
                id("include"),
                String(std::string::String::from("\"a.lp\"")),
                Dot,
                Query,
                id("Hello world"),
                Dot,
            ]
        );
    }

    #[test]
    fn positions() {
        let tokens = AspLexer::lex("test.lp", "p.\n  q(X).").unwrap();
        assert_eq!(tokens[0].source, Position::new("test.lp", 1, 1));
        assert_eq!(tokens[1].source, Position::new("test.lp", 1, 2));
        assert_eq!(tokens[2].source, Position::new("test.lp", 2, 3));
        assert_eq!(tokens[4].source, Position::new("test.lp", 2, 5));
    }

    #[test]
    fn unrecognized() {
        assert_eq!(
            AspLexer::lex("test.lp", "p :- @q.\n"),
            Err(LexError::Unrecognized {
                position: Position::new("test.lp", 1, 6),
                text: std::string::String::from("@q."),
            })
        );
    }

    #[test]
    fn display() {
        assert_eq!(If.to_string(), ":-");
        assert_eq!(ArithNe.to_string(), "=\\=");
        assert_eq!(id("p").to_string(), "p");
        assert_eq!(Float(2.0).to_string(), "2.0");
    }
}
