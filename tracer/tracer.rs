//! A trivial tracing facility.
//!
//! Levels are bits; a trace point fires when its level intersects
//! the caller's mask, and writes one line to standard error.

use bitmask_enum::bitmask;

#[bitmask]
pub enum Trace {
    Lex,
    Parse,
    Recover,
    Include,
}

impl Trace {
    /// Every level at once.
    pub fn everything() -> Self {
        Trace::Lex | Trace::Parse | Trace::Recover | Trace::Include
    }

    /// Select levels by name from a comma-separated list,
    /// e.g., `"parse,recover"`. Unknown names are ignored;
    /// `"all"` selects every level.
    pub fn from_names(names: &str) -> Self {
        names
            .split(',')
            .map(str::trim)
            .fold(Trace::none(), |trace, name| {
                trace
                    | match name.to_ascii_lowercase().as_str() {
                        "all" => Trace::everything(),
                        "lex" => Trace::Lex,
                        "parse" => Trace::Parse,
                        "recover" => Trace::Recover,
                        "include" => Trace::Include,
                        _ => Trace::none(),
                    }
            })
    }
}

#[macro_export]
macro_rules! trace {
    ($trace:expr, $level:ident, $fmt:literal $(,)? $($arg:expr),* $(,)?) => {
        if $trace.intersects($crate::Trace::$level) {
            eprintln!($fmt, $($arg),*);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_names() {
        assert!(Trace::from_names("").is_none());
        assert!(Trace::from_names("bogus").is_none());
        assert_eq!(Trace::from_names("parse"), Trace::Parse);
        assert_eq!(
            Trace::from_names("Parse, recover"),
            Trace::Parse | Trace::Recover
        );
        assert_eq!(Trace::from_names("all"), Trace::everything());
        assert!(Trace::from_names("lex").intersects(Trace::Lex));
        assert!(!Trace::from_names("lex").intersects(Trace::Parse));
    }
}
