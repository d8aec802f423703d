//! Decides whether a context-free grammar is LL(1) and/or SLR(1) and runs the
//! matching table-driven parser over input strings.
//!
//! ```rust
//! use grammar_class::{Analysis, GrammarConfig, read_grammar};
//!
//! // S → S a | b : left recursive, so SLR(1) but not LL(1)
//! let grammar = read_grammar("S -> Sa b", &GrammarConfig::default()).unwrap();
//! let analysis = Analysis::new(grammar);
//!
//! assert!(!analysis.check_ll1());
//! let tables = analysis.slr1().unwrap();
//! assert!(tables.accepts_str("baa"));
//! assert!(!tables.accepts_str("ab"));
//! ```
//!
//! Every stage is a pure function of the previous one: [`Grammar`] →
//! [`FirstSets`] / [`FollowSets`] → [`Ll1Table`], or [`AugmentedGrammar`] →
//! [`Automaton`] → [`Slr1Tables`]. Nothing is shared mutably, so separate
//! analyses may run on separate threads.

#![no_std]
extern crate alloc;

pub mod config;
pub mod error;
pub mod grammar;
pub mod ll1;
pub mod lr0;
pub mod reader;
pub mod sets;
pub mod slr1;
pub mod symbol;

pub use config::GrammarConfig;
pub use error::{
    Conflict, ConflictReport, GrammarError, InvariantViolation, ParseError, Rejection,
};
pub use grammar::{AugmentedGrammar, Grammar, GrammarBuilder, ProdId, Production, Rule};
pub use ll1::Ll1Table;
pub use lr0::{Automaton, ItemState, Lr0Item, StateId};
pub use reader::{read_grammar, tokenize};
pub use sets::{FirstSets, FollowSets};
pub use slr1::{Action, Slr1Tables};
pub use symbol::{Name, Symbol};

/// Builds the LL(1) table, or reports every conflicting cell.
pub fn analyze_ll1(grammar: &Grammar) -> Result<Ll1Table, ConflictReport> {
    Analysis::new(grammar.clone()).ll1()
}

/// Builds the SLR(1) tables, or reports every conflicting cell.
pub fn analyze_slr1(grammar: &Grammar) -> Result<Slr1Tables, ConflictReport> {
    Analysis::new(grammar.clone()).slr1()
}

pub fn parse_ll1(table: &Ll1Table, input: &str) -> bool {
    table.accepts_str(input)
}

pub fn parse_slr1(tables: &Slr1Tables, input: &str) -> bool {
    tables.accepts_str(input)
}

/// Which table-driven parsers a grammar admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GrammarClass {
    pub ll1: bool,
    pub slr1: bool,
}

/// A grammar with its FIRST and FOLLOW sets, computed once.
#[derive(Debug, Clone)]
pub struct Analysis {
    grammar: Grammar,
    first: FirstSets,
    follow: FollowSets,
}

impl Analysis {
    pub fn new(grammar: Grammar) -> Self {
        let first = FirstSets::compute(&grammar);
        let follow = FollowSets::compute(&grammar, &first);
        Self {
            grammar,
            first,
            follow,
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn first(&self) -> &FirstSets {
        &self.first
    }

    pub fn follow(&self) -> &FollowSets {
        &self.follow
    }

    pub fn ll1(&self) -> Result<Ll1Table, ConflictReport> {
        Ll1Table::build(&self.grammar, &self.first, &self.follow)
    }

    pub fn slr1(&self) -> Result<Slr1Tables, ConflictReport> {
        let augmented = self.grammar.augmented();
        let automaton = Automaton::build(&augmented);
        Slr1Tables::build(&automaton, &augmented, &self.follow)
    }

    pub fn check_ll1(&self) -> bool {
        self.ll1().is_ok()
    }

    pub fn check_slr1(&self) -> bool {
        self.slr1().is_ok()
    }

    pub fn class(&self) -> GrammarClass {
        GrammarClass {
            ll1: self.check_ll1(),
            slr1: self.check_slr1(),
        }
    }
}
