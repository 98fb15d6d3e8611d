//! Predicate naming conventions.
//!
//! Downstream passes generate predicates of their own (duals, checks,
//! negations) and mark hidden ones with a leading underscore. User names
//! that could collide with any of those are escaped with [`ESCAPE_PREFIX`]
//! before anything else happens to them, so the two namespaces never meet.

use crate::{Application, Functor, Symbol, Term};

/// Marks a classically negated predicate: `-p` is `n_p`.
pub const NEGATION_PREFIX: &str = "n_";

/// Prepended to user names that look internal.
pub const ESCAPE_PREFIX: &str = "o_";

/// Prefixes reserved for predicates generated downstream.
pub const RESERVED_PREFIXES: [&str; 4] = ["not_", "chk_", "dual_", "forall_"];

/// Name of the head of an integrity constraint.
pub const FALSITY: &str = "_false";

/// Internal atoms start with an underscore; printers hide them.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('_')
}

fn looks_internal(name: &str) -> bool {
    is_hidden(name)
        || name.starts_with(NEGATION_PREFIX)
        || name.starts_with(ESCAPE_PREFIX)
        || RESERVED_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Rewrite a user-written name: escape it if it looks internal,
/// then mark classical negation.
pub(crate) fn user_name(name: &str, negated: bool) -> Symbol {
    let mut rewritten = String::new();
    if negated {
        rewritten.push_str(NEGATION_PREFIX);
    }
    if looks_internal(name) {
        rewritten.push_str(ESCAPE_PREFIX);
    }
    rewritten.push_str(name);
    Symbol::new(rewritten)
}

impl Functor {
    /// The functor of a user-written predicate with `arity` arguments.
    pub fn user(name: &str, arity: usize, negated: bool) -> Self {
        Functor::new(user_name(name, negated), arity)
    }
}

impl Application {
    /// A user-written predicate applied to `arguments`.
    pub fn user(name: &str, arguments: Vec<Term>, negated: bool) -> Self {
        Self {
            functor: Functor::user(name, arguments.len(), negated),
            arguments,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn canonical(name: &str, arity: usize, negated: bool) -> String {
        Functor::user(name, arity, negated).canonical()
    }

    #[test]
    fn arity() {
        assert_eq!(canonical("p", 0, false), "p_0");
        assert_eq!(canonical("p", 1, false), "p_1");
    }

    #[test]
    fn classical_negation() {
        assert_eq!(canonical("p", 2, true), "n_p_2");
        assert_ne!(Functor::user("p", 2, true), Functor::user("p", 2, false));
    }

    #[test]
    fn escapes() {
        assert_eq!(canonical("_p", 0, false), "o__p_0");
        assert_eq!(canonical("n_p", 0, false), "o_n_p_0");
        assert_eq!(canonical("o_p", 1, false), "o_o_p_1");
        assert_eq!(canonical("dual_p", 0, false), "o_dual_p_0");
        assert_eq!(canonical("chk_q", 0, false), "o_chk_q_0");
        assert_eq!(canonical("notable", 0, false), "notable_0");
        // Escaping happens before negation.
        assert_eq!(canonical("n_p", 0, true), "n_o_n_p_0");
        // A user's `n_p` never aliases `-p`.
        assert_ne!(Functor::user("n_p", 0, false), Functor::user("p", 0, true));
    }

    #[test]
    fn falsity_is_unreachable_from_user_names() {
        assert_ne!(Functor::user(FALSITY, 0, false), Functor::falsity());
        assert!(is_hidden(Functor::falsity().name.name()));
    }
}
