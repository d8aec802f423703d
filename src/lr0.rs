//! Canonical collection of LR(0) item sets over an augmented grammar.

use crate::grammar::{AugmentedGrammar, Grammar, ProdId};
use crate::symbol::{Name, Symbol};
use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec::Vec;
use hashbrown::HashMap;

/// Index of a state in the canonical collection.
pub type StateId = usize;

/// "This production has been recognized up to the dot."
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lr0Item {
    pub nonterminal: Name,
    pub production: ProdId,
    pub dot: usize,
}

impl Lr0Item {
    pub fn new(nonterminal: impl Into<Name>, production: ProdId, dot: usize) -> Self {
        Self {
            nonterminal: nonterminal.into(),
            production,
            dot,
        }
    }

    /// Symbol right after the dot, if any.
    pub fn next_symbol<'g>(&self, grammar: &'g Grammar) -> Option<&'g Symbol> {
        grammar
            .production(&self.nonterminal, self.production)?
            .body()
            .get(self.dot)
    }

    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        grammar
            .production(&self.nonterminal, self.production)
            .is_some_and(|p| self.dot >= p.len())
    }

    fn advance(&self) -> Self {
        Self {
            nonterminal: self.nonterminal.clone(),
            production: self.production,
            dot: self.dot + 1,
        }
    }
}

/// Item set; identity is its content.
pub type ItemState = BTreeSet<Lr0Item>;

/// Least item set containing `items` that is closed under "dot before X
/// adds X → ·γ for every production of X".
pub fn closure(items: ItemState, grammar: &Grammar) -> ItemState {
    let mut result = items;
    let mut pending: Vec<Lr0Item> = result.iter().cloned().collect();

    while let Some(item) = pending.pop() {
        let Some(Symbol::Nonterminal(x)) = item.next_symbol(grammar) else {
            continue;
        };
        for (j, _) in grammar.productions(x) {
            let new_item = Lr0Item::new(x.clone(), j, 0);
            if result.insert(new_item.clone()) {
                pending.push(new_item);
            }
        }
    }
    result
}

/// Items of `state` with the dot moved past `symbol`, before closure.
pub fn advance(state: &ItemState, symbol: &Symbol, grammar: &Grammar) -> ItemState {
    state
        .iter()
        .filter(|item| item.next_symbol(grammar) == Some(symbol))
        .map(Lr0Item::advance)
        .collect()
}

/// States in discovery order plus the GOTO function over all symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    states: Vec<ItemState>,
    transitions: HashMap<(StateId, Symbol), StateId>,
}

impl Automaton {
    /// State 0 is `closure({S' → ·S})`; states are expanded breadth first and
    /// deduplicated by exact item-set equality.
    pub fn build(grammar: &AugmentedGrammar) -> Self {
        let start = Lr0Item::new(grammar.start().clone(), 0, 0);
        let initial = closure(core::iter::once(start).collect(), grammar);

        let mut states = alloc::vec![initial.clone()];
        let mut index: HashMap<ItemState, StateId> = HashMap::new();
        index.insert(initial, 0);
        let mut transitions = HashMap::new();
        let mut queue: VecDeque<StateId> = core::iter::once(0).collect();

        while let Some(from) = queue.pop_front() {
            let symbols: BTreeSet<&Symbol> = states[from]
                .iter()
                .filter_map(|item| item.next_symbol(grammar))
                .filter(|sym| **sym != Symbol::Epsilon)
                .collect();

            let mut found = Vec::with_capacity(symbols.len());
            for symbol in symbols {
                let target = closure(advance(&states[from], symbol, grammar), grammar);
                found.push((symbol.clone(), target));
            }

            for (symbol, target) in found {
                let to = match index.get(&target) {
                    Some(&to) => to,
                    None => {
                        let to = states.len();
                        states.push(target.clone());
                        index.insert(target, to);
                        queue.push_back(to);
                        to
                    }
                };
                transitions.insert((from, symbol), to);
            }
        }

        log::debug!(
            "LR(0) automaton: {} states, {} transitions",
            states.len(),
            transitions.len()
        );
        Automaton {
            states,
            transitions,
        }
    }

    pub fn states(&self) -> &[ItemState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn goto(&self, state: StateId, symbol: &Symbol) -> Option<StateId> {
        self.transitions.get(&(state, symbol.clone())).copied()
    }

    pub fn transitions(&self) -> impl Iterator<Item = (StateId, &Symbol, StateId)> {
        self.transitions
            .iter()
            .map(|((from, symbol), to)| (*from, symbol, *to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GrammarConfig;
    use pretty_assertions::assert_eq;

    fn items(xs: &[(&str, ProdId, usize)]) -> ItemState {
        xs.iter().map(|&(nt, p, d)| Lr0Item::new(nt, p, d)).collect()
    }

    // S → S a | b
    fn left_recursive() -> AugmentedGrammar {
        Grammar::builder(GrammarConfig::default())
            .alternatives("S", &["Sa", "b"])
            .build()
            .unwrap()
            .augmented()
    }

    #[test]
    fn closure_of_start_item() {
        let g = left_recursive();
        let state = closure(items(&[("S'", 0, 0)]), &g);
        assert_eq!(state, items(&[("S'", 0, 0), ("S", 0, 0), ("S", 1, 0)]));
    }

    #[test]
    fn closure_keeps_seed_and_stops_at_terminals() {
        let g = left_recursive();
        let state = closure(items(&[("S", 0, 1)]), &g);
        assert_eq!(state, items(&[("S", 0, 1)]));
    }

    #[test]
    fn canonical_collection() {
        let g = left_recursive();
        let automaton = Automaton::build(&g);

        // terminals sort before nonterminals, so `b` is explored first
        assert_eq!(
            automaton.states(),
            &[
                items(&[("S'", 0, 0), ("S", 0, 0), ("S", 1, 0)]),
                items(&[("S", 1, 1)]),
                items(&[("S'", 0, 1), ("S", 0, 1)]),
                items(&[("S", 0, 2)]),
            ]
        );
        assert_eq!(automaton.goto(0, &Symbol::terminal("b")), Some(1));
        assert_eq!(automaton.goto(0, &Symbol::nonterminal("S")), Some(2));
        assert_eq!(automaton.goto(2, &Symbol::terminal("a")), Some(3));
        assert_eq!(automaton.goto(1, &Symbol::terminal("a")), None);
        assert_eq!(automaton.transitions().count(), 3);
    }

    #[test]
    fn identical_item_sets_are_shared() {
        // S → a S | b : every `a` leads back into the same state
        let g = Grammar::builder(GrammarConfig::default())
            .alternatives("S", &["aS", "b"])
            .build()
            .unwrap()
            .augmented();
        let automaton = Automaton::build(&g);

        let after_a = automaton.goto(0, &Symbol::terminal("a")).unwrap();
        assert_eq!(automaton.goto(after_a, &Symbol::terminal("a")), Some(after_a));
        assert_eq!(
            automaton.goto(0, &Symbol::terminal("b")),
            automaton.goto(after_a, &Symbol::terminal("b"))
        );
        let distinct: BTreeSet<_> = automaton.states().iter().collect();
        assert_eq!(distinct.len(), automaton.len());
    }

    #[test]
    fn epsilon_items_are_complete() {
        // S → a S | e
        let g = Grammar::builder(GrammarConfig::default())
            .alternatives("S", &["aS", "e"])
            .build()
            .unwrap()
            .augmented();
        let item = Lr0Item::new("S", 1, 0);
        assert!(item.is_complete(&g));
        assert_eq!(item.next_symbol(&g), None);

        let automaton = Automaton::build(&g);
        assert!(automaton.states()[0].contains(&item));
    }
}
