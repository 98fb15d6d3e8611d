//! Infix operator priorities and associativity.
//!
//! Priorities follow the Prolog convention: a *lower* number binds
//! *tighter*, so `*` (400) groups before `+` (500).

use crate::BinOp;

/// How a chain of equal-priority operators nests.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Assoc {
    /// `a = b = c` is an error.
    Non,
    /// `a - b - c` is `(a - b) - c`.
    Left,
    /// `a ^ b ^ c` is `a ^ (b ^ c)`.
    Right,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OperatorEntry {
    pub op: BinOp,
    pub assoc: Assoc,
    pub priority: u16,
}

impl OperatorEntry {
    pub const fn new(op: BinOp, assoc: Assoc, priority: u16) -> Self {
        Self {
            op,
            assoc,
            priority,
        }
    }

    pub fn symbol(&self) -> &'static str {
        self.op.symbol()
    }
}

/// What the shunting-yard should do with the operator on top of its
/// stack when another operator arrives.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reduce {
    /// Combine the top operator with its operands first.
    Pop,
    /// Leave it; the incoming operator binds tighter.
    Push,
    /// Neither grouping is allowed.
    Conflict,
}

/// The reduction test.
///
/// `Uniform` is a single non-strict priority test applied to every
/// operator: it folds every equal-priority chain to the left, so it
/// cannot express right associativity and never rejects anything.
/// `ClassAware` consults the associativity class on ties.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Comparator {
    #[default]
    ClassAware,
    Uniform,
}

impl Comparator {
    pub fn reduce(self, top: &OperatorEntry, incoming: &OperatorEntry) -> Reduce {
        use std::cmp::Ordering::*;
        match self {
            Comparator::Uniform if top.priority <= incoming.priority => Reduce::Pop,
            Comparator::Uniform => Reduce::Push,
            Comparator::ClassAware => match top.priority.cmp(&incoming.priority) {
                Less => Reduce::Pop,
                Greater => Reduce::Push,
                // On a tie, the left grouping needs an incoming operator that
                // accepts an equal-priority left operand, and the right one
                // needs a top operator that accepts an equal-priority right one.
                Equal => match (top.assoc, incoming.assoc) {
                    (_, Assoc::Left) => Reduce::Pop,
                    (Assoc::Right, _) => Reduce::Push,
                    _ => Reduce::Conflict,
                },
            },
        }
    }
}

const STANDARD: [OperatorEntry; 20] = {
    use Assoc::*;
    use BinOp::*;
    [
        OperatorEntry::new(Unify, Non, 700),
        OperatorEntry::new(NotUnify, Non, 700),
        OperatorEntry::new(Identical, Non, 700),
        OperatorEntry::new(NotIdentical, Non, 700),
        OperatorEntry::new(Lt, Non, 700),
        OperatorEntry::new(Gt, Non, 700),
        OperatorEntry::new(Leq, Non, 700),
        OperatorEntry::new(Geq, Non, 700),
        OperatorEntry::new(ArithEq, Non, 700),
        OperatorEntry::new(ArithNe, Non, 700),
        OperatorEntry::new(Is, Non, 700),
        OperatorEntry::new(Add, Left, 500),
        OperatorEntry::new(Sub, Left, 500),
        OperatorEntry::new(Mul, Left, 400),
        OperatorEntry::new(Div, Left, 400),
        OperatorEntry::new(IntDiv, Left, 400),
        OperatorEntry::new(Mod, Left, 400),
        OperatorEntry::new(Rem, Left, 400),
        OperatorEntry::new(Pow, Non, 200),
        OperatorEntry::new(Exp, Right, 200),
    ]
};

/// Symbol-indexed operator definitions plus the comparator that
/// resolves them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OperatorTable {
    entries: Vec<OperatorEntry>,
    comparator: Comparator,
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl OperatorTable {
    pub fn new(entries: impl IntoIterator<Item = OperatorEntry>, comparator: Comparator) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            comparator,
        }
    }

    /// The Prolog-style table with class-aware comparisons.
    pub fn standard() -> Self {
        Self::new(STANDARD, Comparator::ClassAware)
    }

    pub fn with_comparator(self, comparator: Comparator) -> Self {
        Self { comparator, ..self }
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    /// Find the entry for an infix symbol, e.g., `"+"` or `"mod"`.
    pub fn lookup(&self, symbol: &str) -> Option<&OperatorEntry> {
        self.entries.iter().find(|entry| entry.symbol() == symbol)
    }

    pub fn entries(&self) -> &[OperatorEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(symbol: &str) -> OperatorEntry {
        *OperatorTable::standard().lookup(symbol).unwrap()
    }

    #[test]
    fn lookup() {
        let table = OperatorTable::standard();
        assert_eq!(table.lookup("+").map(|e| e.priority), Some(500));
        assert_eq!(table.lookup("mod").map(|e| e.op), Some(BinOp::Mod));
        assert_eq!(table.lookup("^").map(|e| e.assoc), Some(Assoc::Right));
        assert_eq!(table.lookup(","), None);
        assert_eq!(table.lookup(":-"), None);
    }

    #[test]
    fn class_aware() {
        let c = Comparator::ClassAware;
        assert_eq!(c.reduce(&entry("*"), &entry("+")), Reduce::Pop);
        assert_eq!(c.reduce(&entry("+"), &entry("*")), Reduce::Push);
        assert_eq!(c.reduce(&entry("-"), &entry("-")), Reduce::Pop);
        assert_eq!(c.reduce(&entry("^"), &entry("^")), Reduce::Push);
        assert_eq!(c.reduce(&entry("="), &entry("=")), Reduce::Conflict);
        assert_eq!(c.reduce(&entry("="), &entry("<")), Reduce::Conflict);
        assert_eq!(c.reduce(&entry("**"), &entry("^")), Reduce::Conflict);
        assert_eq!(c.reduce(&entry("^"), &entry("**")), Reduce::Push);
    }

    #[test]
    fn uniform() {
        let c = Comparator::Uniform;
        assert_eq!(c.reduce(&entry("*"), &entry("+")), Reduce::Pop);
        assert_eq!(c.reduce(&entry("+"), &entry("*")), Reduce::Push);
        assert_eq!(c.reduce(&entry("^"), &entry("^")), Reduce::Pop);
        assert_eq!(c.reduce(&entry("="), &entry("=")), Reduce::Pop);
    }

    #[test]
    fn with_comparator() {
        let table = OperatorTable::standard().with_comparator(Comparator::Uniform);
        assert_eq!(table.comparator(), Comparator::Uniform);
        assert_eq!(table.entries().len(), 20);
    }
}
