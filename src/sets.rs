//! FIRST / FOLLOW fixed points.
//!
//! FIRST is computed for every symbol by repeated passes over the
//! productions until no set grows. FOLLOW is seeded in one pass (the
//! FIRST(β) contributions plus the "FOLLOW(A) ⊆ FOLLOW(B)" edges for nullable
//! tails) and then closed over those edges with a worklist.

use crate::grammar::Grammar;
use crate::symbol::{Name, Symbol};
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use hashbrown::{HashMap, HashSet};

pub type SymbolSet = HashSet<Symbol>;

/// FIRST(X) for every terminal, nonterminal, ε and `$`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirstSets {
    sets: HashMap<Symbol, SymbolSet>,
}

impl FirstSets {
    pub fn compute(grammar: &Grammar) -> Self {
        let mut sets: HashMap<Symbol, SymbolSet> = HashMap::new();
        for t in grammar.terminals() {
            let t = Symbol::Terminal(t.clone());
            sets.insert(t.clone(), core::iter::once(t).collect());
        }
        sets.insert(Symbol::Epsilon, core::iter::once(Symbol::Epsilon).collect());
        sets.insert(Symbol::Eof, core::iter::once(Symbol::Eof).collect());
        for nt in grammar.nonterminals() {
            sets.insert(Symbol::Nonterminal(nt.clone()), SymbolSet::new());
        }

        let mut first = FirstSets { sets };
        let mut passes = 0usize;
        loop {
            passes += 1;
            let mut changed = false;
            for (lhs, _, prod) in grammar.iter_productions() {
                let found = first.of_sequence(prod.symbols());
                let target = first
                    .sets
                    .entry(Symbol::Nonterminal(lhs.clone()))
                    .or_default();
                for sym in found {
                    changed |= target.insert(sym);
                }
            }
            if !changed {
                break;
            }
        }
        log::debug!("FIRST sets converged after {passes} passes");
        first
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&SymbolSet> {
        self.sets.get(symbol)
    }

    /// FIRST of a symbol sequence; `{ε}` for the empty sequence.
    pub fn of_sequence(&self, symbols: &[Symbol]) -> SymbolSet {
        let mut result = SymbolSet::new();
        for sym in symbols {
            let first = match sym {
                Symbol::Terminal(_) | Symbol::Eof => {
                    result.insert(sym.clone());
                    return result;
                }
                Symbol::Epsilon => continue,
                Symbol::Nonterminal(_) => match self.sets.get(sym) {
                    Some(first) => first,
                    // undefined nonterminal derives nothing
                    None => return result,
                },
            };
            result.extend(first.iter().filter(|s| **s != Symbol::Epsilon).cloned());
            if !first.contains(&Symbol::Epsilon) {
                return result;
            }
        }
        result.insert(Symbol::Epsilon);
        result
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &SymbolSet)> {
        self.sets.iter()
    }
}

/// FOLLOW(A) for every nonterminal. Never contains ε.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FollowSets {
    sets: HashMap<Name, SymbolSet>,
}

impl FollowSets {
    pub fn compute(grammar: &Grammar, first: &FirstSets) -> Self {
        let mut sets: HashMap<Name, SymbolSet> = grammar
            .nonterminals()
            .map(|nt| (nt.clone(), SymbolSet::new()))
            .collect();
        sets.entry(grammar.start().clone())
            .or_default()
            .insert(Symbol::Eof);

        // lhs -> nonterminals whose FOLLOW includes FOLLOW(lhs)
        let mut edges: HashMap<Name, HashSet<Name>> = HashMap::new();
        for (lhs, _, prod) in grammar.iter_productions() {
            let body = prod.body();
            for (i, sym) in body.iter().enumerate() {
                let Symbol::Nonterminal(id) = sym else {
                    continue;
                };
                let tail = first.of_sequence(&body[i + 1..]);
                let spot = sets.entry(id.clone()).or_default();
                spot.extend(tail.iter().filter(|s| **s != Symbol::Epsilon).cloned());
                if id != lhs && tail.contains(&Symbol::Epsilon) {
                    edges.entry(lhs.clone()).or_default().insert(id.clone());
                }
            }
        }

        let mut follow = FollowSets { sets };
        follow.propagate(&edges);
        follow
    }

    fn propagate(&mut self, edges: &HashMap<Name, HashSet<Name>>) {
        let mut queue: VecDeque<Name> = self.sets.keys().cloned().collect();
        let mut in_queue: HashSet<Name> = queue.iter().cloned().collect();

        while let Some(u) = queue.pop_front() {
            in_queue.remove(&u);
            let Some(dests) = edges.get(&u) else {
                continue;
            };
            let src: Vec<Symbol> = self.sets[&u].iter().cloned().collect();

            for v in dests {
                let dest = self.sets.entry(v.clone()).or_default();
                let mut grew = false;
                for sym in &src {
                    grew |= dest.insert(sym.clone());
                }
                // if FOLLOW(v) grew, (re)-enqueue v exactly once
                if grew && in_queue.insert(v.clone()) {
                    queue.push_back(v.clone());
                }
            }
        }
    }

    pub fn get(&self, nonterminal: &str) -> Option<&SymbolSet> {
        self.sets.get(nonterminal)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &SymbolSet)> {
        self.sets.iter()
    }
}
