//! Lexer & parser for rules, constraints, queries, and directives
//! written in the Prolog style: `head :- body.`, `?- goals.`, `#show p.`

mod expression;
pub mod lexer;
pub mod parser;

pub use lexer::{AspLexer, AspToken};
pub use parser::AspParser;
