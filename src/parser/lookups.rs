use std::{cell::RefCell, collections::HashMap, rc::Rc};

use tracing::debug;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Arity {
    Unary,
    Binary,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct OperatorEntry {
    pub symbol: char,
    pub precedence: u32,
    pub arity: Arity,
}

impl OperatorEntry {
    pub fn binary(symbol: char, precedence: u32) -> Self {
        OperatorEntry {
            symbol,
            precedence,
            arity: Arity::Binary,
        }
    }

    pub fn unary(symbol: char) -> Self {
        OperatorEntry {
            symbol,
            precedence: 0,
            arity: Arity::Unary,
        }
    }
}

pub const DEFAULT_BINARY_PRECEDENCE: u32 = 30;
pub const MIN_PRECEDENCE: u32 = 1;
pub const MAX_PRECEDENCE: u32 = 100;

pub const BUILTIN_OPERATORS: &[OperatorEntry] = &[
    OperatorEntry {
        symbol: '=',
        precedence: 2,
        arity: Arity::Binary,
    },
    OperatorEntry {
        symbol: '<',
        precedence: 10,
        arity: Arity::Binary,
    },
    OperatorEntry {
        symbol: '+',
        precedence: 20,
        arity: Arity::Binary,
    },
    OperatorEntry {
        symbol: '-',
        precedence: 20,
        arity: Arity::Binary,
    },
    OperatorEntry {
        symbol: '*',
        precedence: 40,
        arity: Arity::Binary,
    },
];

/// Operator precedences as seen by the parser and the code generator.
///
/// Only overrides and user declarations are stored; the built-in table
/// answers for any symbol without an override.
#[derive(Debug, Default, Clone)]
pub struct OperatorRegistry {
    overrides: HashMap<(char, Arity), OperatorEntry>,
}

pub type SharedOperators = Rc<RefCell<OperatorRegistry>>;

impl OperatorRegistry {
    pub fn new() -> Self {
        OperatorRegistry {
            overrides: HashMap::new(),
        }
    }

    pub fn shared() -> SharedOperators {
        Rc::new(RefCell::new(OperatorRegistry::new()))
    }

    pub fn get(&self, symbol: char, arity: Arity) -> Option<OperatorEntry> {
        self.overrides.get(&(symbol, arity)).copied().or_else(|| {
            BUILTIN_OPERATORS
                .iter()
                .find(|entry| entry.symbol == symbol && entry.arity == arity)
                .copied()
        })
    }

    /// Binary precedence of `symbol`, or `None` when it is not a binary
    /// operator. An entry with precedence 0 does not count.
    pub fn precedence(&self, symbol: char) -> Option<u32> {
        self.get(symbol, Arity::Binary)
            .map(|entry| entry.precedence)
            .filter(|precedence| *precedence > 0)
    }

    /// Records `entry`, returning the override it replaced so the caller can
    /// put it back with [`OperatorRegistry::restore`].
    pub fn install(&mut self, entry: OperatorEntry) -> Option<OperatorEntry> {
        debug!(symbol = %entry.symbol, precedence = entry.precedence, arity = ?entry.arity, "install operator");
        self.overrides.insert((entry.symbol, entry.arity), entry)
    }

    pub fn restore(&mut self, symbol: char, arity: Arity, previous: Option<OperatorEntry>) {
        debug!(symbol = %symbol, arity = ?arity, previous = ?previous, "restore operator");
        match previous {
            Some(entry) => {
                self.overrides.insert((symbol, arity), entry);
            }
            None => {
                self.overrides.remove(&(symbol, arity));
            }
        }
    }
}

/// An operator installation that is undone on drop unless committed.
pub struct OperatorInstall {
    operators: SharedOperators,
    symbol: char,
    arity: Arity,
    previous: Option<OperatorEntry>,
    committed: bool,
}

impl OperatorInstall {
    pub fn new(operators: &SharedOperators, entry: OperatorEntry) -> Self {
        let previous = operators.borrow_mut().install(entry);
        OperatorInstall {
            operators: Rc::clone(operators),
            symbol: entry.symbol,
            arity: entry.arity,
            previous,
            committed: false,
        }
    }

    /// Keeps the installation for the rest of the session.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for OperatorInstall {
    fn drop(&mut self) {
        if !self.committed {
            self.operators
                .borrow_mut()
                .restore(self.symbol, self.arity, self.previous);
        }
    }
}
