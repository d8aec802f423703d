use crate::grammar::ProdId;
use crate::lr0::StateId;
use crate::slr1::Action;
use crate::symbol::{Name, Symbol};
use alloc::string::String;
use alloc::vec::Vec;
use thiserror::Error;

/// The grammar cannot be analysed at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("start nonterminal `{0}` has no rule")]
    MissingStart(Name),

    #[error("nonterminal `{0}` is referenced but has no rule")]
    UndefinedNonterminal(Name),

    #[error("rule `{0}` has no alternatives")]
    EmptyRule(Name),

    #[error("rule `{0}` uses the end-of-input marker")]
    EndMarkerInRule(Name),

    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },
}

/// Two entries claim the same parsing table cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Error)]
pub enum Conflict {
    #[error("LL(1) cell ({nonterminal}, {lookahead}) claimed by productions {existing} and {incoming}")]
    Ll1 {
        nonterminal: Name,
        lookahead: Symbol,
        existing: ProdId,
        incoming: ProdId,
    },

    #[error("SLR(1) cell ({state}, {lookahead}) claimed by {existing} and {incoming}")]
    Slr1 {
        state: StateId,
        lookahead: Symbol,
        existing: Action,
        incoming: Action,
    },
}

/// Every conflicting cell found while building a table, sorted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} conflicting table cells", .conflicts.len())]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
}

impl ConflictReport {
    pub(crate) fn check(mut conflicts: Vec<Conflict>) -> Result<(), ConflictReport> {
        if conflicts.is_empty() {
            return Ok(());
        }
        conflicts.sort();
        conflicts.dedup();
        Err(ConflictReport { conflicts })
    }
}

/// The input string is not in the language. An expected outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("expected `{expected}` but found `{found}` at position {position}")]
    Mismatch {
        expected: Symbol,
        found: Symbol,
        position: usize,
    },

    #[error("no production of `{nonterminal}` starts with `{lookahead}` at position {position}")]
    NoRule {
        nonterminal: Name,
        lookahead: Symbol,
        position: usize,
    },

    #[error("no action in state {state} on `{lookahead}` at position {position}")]
    NoAction {
        state: StateId,
        lookahead: Symbol,
        position: usize,
    },

    #[error("input continues after the end marker at position {position}")]
    TrailingInput { position: usize },
}

/// The tables contradict what their construction guarantees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("no goto from state {state} on `{nonterminal}` after a reduction")]
    MissingGoto { state: StateId, nonterminal: Name },

    #[error("table refers to missing production {production} of `{nonterminal}`")]
    MissingProduction { nonterminal: Name, production: ProdId },

    #[error("parse stack underflow at `{nonterminal}`")]
    StackUnderflow { nonterminal: Name },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Collapses a parse outcome into a membership verdict.
///
/// Invariant violations are reported loudly instead of passing for a plain
/// rejection.
pub(crate) fn verdict(result: Result<(), ParseError>) -> bool {
    match result {
        Ok(()) => true,
        Err(ParseError::Rejected(reason)) => {
            log::debug!("{reason}");
            false
        }
        Err(ParseError::Invariant(violation)) => {
            log::error!("{violation}");
            if cfg!(debug_assertions) {
                panic!("{violation}");
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_is_a_plain_no() {
        let rejected = Rejection::TrailingInput { position: 1 };
        assert!(!verdict(Err(rejected.into())));
        assert!(verdict(Ok(())));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "parse stack underflow at `S`")]
    fn invariant_violation_panics_in_debug_builds() {
        let violation = InvariantViolation::StackUnderflow {
            nonterminal: "S".into(),
        };
        verdict(Err(violation.into()));
    }
}
