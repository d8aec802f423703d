//! SLR(1) action/goto tables derived from the LR(0) automaton and FOLLOW
//! sets, and the shift-reduce parser that runs them.

use crate::error::{Conflict, ConflictReport, InvariantViolation, ParseError, Rejection, verdict};
use crate::grammar::{AugmentedGrammar, ProdId};
use crate::lr0::{Automaton, StateId};
use crate::reader::tokenize;
use crate::sets::FollowSets;
use crate::symbol::{Name, Symbol, end_terminated};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

/// LR parsing action
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Shift to state
    Shift(StateId),
    /// Reduce using production `production` of `nonterminal`
    Reduce { nonterminal: Name, production: ProdId },
    /// Accept (successful parse)
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "shift {state}"),
            Action::Reduce {
                nonterminal,
                production,
            } => write!(f, "reduce {nonterminal}#{production}"),
            Action::Accept => f.write_str("accept"),
        }
    }
}

/// Conflict-free SLR(1) tables, indexed by state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slr1Tables {
    grammar: AugmentedGrammar,
    action: Vec<HashMap<Symbol, Action>>,
    goto: Vec<HashMap<Name, StateId>>,
}

impl Slr1Tables {
    /// Shifts and gotos come from the automaton's transitions; every complete
    /// item `A → α·` reduces on FOLLOW(A); `S' → S·` accepts on `$`. A cell
    /// that would receive two different actions is a conflict, accept
    /// included.
    pub fn build(
        automaton: &Automaton,
        grammar: &AugmentedGrammar,
        follow: &FollowSets,
    ) -> Result<Self, ConflictReport> {
        let mut action: Vec<HashMap<Symbol, Action>> = vec![HashMap::new(); automaton.len()];
        let mut goto: Vec<HashMap<Name, StateId>> = vec![HashMap::new(); automaton.len()];
        let mut conflicts = Vec::new();

        for (from, symbol, to) in automaton.transitions() {
            match symbol {
                Symbol::Nonterminal(nt) => {
                    goto[from].insert(nt.clone(), to);
                }
                _ => {
                    action[from].insert(symbol.clone(), Action::Shift(to));
                }
            }
        }

        let mut set = |state: StateId, lookahead: &Symbol, incoming: Action| {
            match action[state].entry(lookahead.clone()) {
                Entry::Vacant(cell) => {
                    cell.insert(incoming);
                }
                Entry::Occupied(cell) if *cell.get() != incoming => {
                    log::debug!(
                        "SLR(1) conflict in state {state} on `{lookahead}`: {} vs {incoming}",
                        cell.get()
                    );
                    conflicts.push(Conflict::Slr1 {
                        state,
                        lookahead: lookahead.clone(),
                        existing: cell.get().clone(),
                        incoming,
                    });
                }
                Entry::Occupied(_) => {}
            }
        };

        let augmented_start = grammar.start();
        for (state, items) in automaton.states().iter().enumerate() {
            for item in items {
                if !item.is_complete(grammar) {
                    continue;
                }
                if item.nonterminal == *augmented_start {
                    set(state, &Symbol::Eof, Action::Accept);
                    continue;
                }
                for lookahead in follow.get(&item.nonterminal).into_iter().flatten() {
                    set(
                        state,
                        lookahead,
                        Action::Reduce {
                            nonterminal: item.nonterminal.clone(),
                            production: item.production,
                        },
                    );
                }
            }
        }

        ConflictReport::check(conflicts)?;
        log::debug!(
            "SLR(1) tables built: {} states, {} actions",
            action.len(),
            action.iter().map(HashMap::len).sum::<usize>()
        );
        Ok(Slr1Tables {
            grammar: grammar.clone(),
            action,
            goto,
        })
    }

    pub fn grammar(&self) -> &AugmentedGrammar {
        &self.grammar
    }

    pub fn states(&self) -> usize {
        self.action.len()
    }

    pub fn action(&self, state: StateId, lookahead: &Symbol) -> Option<&Action> {
        self.action.get(state)?.get(lookahead)
    }

    pub fn goto(&self, state: StateId, nonterminal: &str) -> Option<StateId> {
        self.goto.get(state)?.get(nonterminal).copied()
    }

    /// Shift-reduce parse of `input`; `$` is appended when missing.
    pub fn parse(&self, input: &[Symbol]) -> Result<(), ParseError> {
        let input = end_terminated(input);
        // (symbol, state) pairs; the bottom entry carries no symbol
        let mut stack: Vec<(Option<Symbol>, StateId)> = vec![(None, 0)];
        let mut position = 0;

        loop {
            let state = match stack.last() {
                Some(&(_, state)) => state,
                None => {
                    return Err(InvariantViolation::StackUnderflow {
                        nonterminal: self.grammar.start().clone(),
                    }
                    .into());
                }
            };
            let current = input.get(position).cloned().unwrap_or(Symbol::Eof);
            log::trace!("SLR(1) state {state}, lookahead `{current}` at {position}");

            match self.action(state, &current) {
                None => {
                    return Err(Rejection::NoAction {
                        state,
                        lookahead: current,
                        position,
                    }
                    .into());
                }
                Some(Action::Shift(next)) => {
                    stack.push((Some(current), *next));
                    position += 1;
                }
                Some(Action::Reduce {
                    nonterminal,
                    production,
                }) => {
                    let prod = self
                        .grammar
                        .production(nonterminal, *production)
                        .ok_or_else(|| InvariantViolation::MissingProduction {
                            nonterminal: nonterminal.clone(),
                            production: *production,
                        })?;
                    // the bottom entry must survive the pop
                    if prod.len() >= stack.len() {
                        return Err(InvariantViolation::StackUnderflow {
                            nonterminal: nonterminal.clone(),
                        }
                        .into());
                    }
                    stack.truncate(stack.len() - prod.len());
                    let exposed = stack[stack.len() - 1].1;
                    let next = self.goto(exposed, nonterminal).ok_or_else(|| {
                        InvariantViolation::MissingGoto {
                            state: exposed,
                            nonterminal: nonterminal.clone(),
                        }
                    })?;
                    stack.push((Some(Symbol::Nonterminal(nonterminal.clone())), next));
                }
                Some(Action::Accept) => {
                    return if position + 1 == input.len() {
                        Ok(())
                    } else {
                        Err(Rejection::TrailingInput {
                            position: position + 1,
                        }
                        .into())
                    };
                }
            }
        }
    }

    pub fn accepts(&self, input: &[Symbol]) -> bool {
        verdict(self.parse(input))
    }

    /// Tokenizes `input` one character per terminal, then parses it.
    pub fn accepts_str(&self, input: &str) -> bool {
        self.accepts(&tokenize(input, self.grammar.config()))
    }
}
