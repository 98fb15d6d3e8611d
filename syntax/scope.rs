//! Fresh names for anonymous variables.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

use crate::Symbol;

/// Counter behind the names given to `_` markers.
///
/// One scope belongs to one parse job and is reset at the start of
/// every statement, so generated names are small and unique only
/// within their statement. It is shared by reference with the
/// combinators of a single parse, never between parses.
///
/// Names the statement already spells out are reserved before it is
/// parsed, and minting skips them; so `p(_V0, _)` gets `_V1` for its `_`.
#[derive(Debug, Default)]
pub struct ParseScope {
    next: Cell<usize>,
    reserved: RefCell<BTreeSet<Symbol>>,
}

impl ParseScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new statement that uses the variables `names`.
    pub fn reset<'a>(&self, names: impl IntoIterator<Item = &'a Symbol>) {
        self.next.set(0);
        let mut reserved = self.reserved.borrow_mut();
        reserved.clear();
        reserved.extend(names.into_iter().cloned());
    }

    /// Mint a variable name not yet used in the current statement.
    pub fn fresh(&self) -> Symbol {
        let reserved = self.reserved.borrow();
        loop {
            let n = self.next.get();
            self.next.set(n + 1);
            let name = Symbol::new(format!("_V{n}"));
            if !reserved.contains(&name) {
                return name;
            }
        }
    }

    /// How many names the current statement has used or skipped.
    pub fn minted(&self) -> usize {
        self.next.get()
    }
}
