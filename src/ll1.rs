//! LL(1) predictive table and the stack-driven parser that runs it.

use crate::error::{Conflict, ConflictReport, InvariantViolation, ParseError, Rejection, verdict};
use crate::grammar::{Grammar, ProdId};
use crate::reader::tokenize;
use crate::sets::{FirstSets, FollowSets};
use crate::symbol::{Name, Symbol, end_terminated};
use alloc::vec;
use alloc::vec::Vec;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

/// `(nonterminal, lookahead)` to a **single** production index.
pub type ProdTable = HashMap<Name, HashMap<Symbol, ProdId>>;

/// Conflict-free LL(1) table together with the grammar it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ll1Table {
    grammar: Grammar,
    table: ProdTable,
}

impl Ll1Table {
    /// Fills `table[A][t]` for every `t` in FIRST(α) \ {ε} and, when α is
    /// nullable, for every `t` in FOLLOW(A). A cell claimed by two different
    /// productions is a conflict; all of them are reported.
    pub fn build(
        grammar: &Grammar,
        first: &FirstSets,
        follow: &FollowSets,
    ) -> Result<Self, ConflictReport> {
        let mut table = ProdTable::new();
        let mut conflicts = Vec::new();

        for rule in grammar.rules() {
            let row = table.entry(rule.lhs.clone()).or_default();
            for (i, prod) in rule.productions.iter().enumerate() {
                let first_p = first.of_sequence(prod.symbols());
                let mut lookaheads: Vec<&Symbol> = first_p
                    .iter()
                    .filter(|s| **s != Symbol::Epsilon)
                    .collect();
                if first_p.contains(&Symbol::Epsilon) {
                    lookaheads.extend(follow.get(&rule.lhs).into_iter().flatten());
                }

                for lookahead in lookaheads {
                    match row.entry(lookahead.clone()) {
                        Entry::Vacant(cell) => {
                            cell.insert(i);
                        }
                        Entry::Occupied(cell) if *cell.get() != i => {
                            log::debug!(
                                "LL(1) conflict at ({}, {lookahead}): {} vs {i}",
                                rule.lhs,
                                cell.get()
                            );
                            conflicts.push(Conflict::Ll1 {
                                nonterminal: rule.lhs.clone(),
                                lookahead: lookahead.clone(),
                                existing: *cell.get(),
                                incoming: i,
                            });
                        }
                        Entry::Occupied(_) => {}
                    }
                }
            }
        }

        ConflictReport::check(conflicts)?;
        log::debug!(
            "LL(1) table built with {} entries",
            table.values().map(HashMap::len).sum::<usize>()
        );
        Ok(Ll1Table {
            grammar: grammar.clone(),
            table,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn get(&self, nonterminal: &str, lookahead: &Symbol) -> Option<ProdId> {
        self.table.get(nonterminal)?.get(lookahead).copied()
    }

    pub fn table(&self) -> &ProdTable {
        &self.table
    }

    /// Predictive parse of `input`; `$` is appended when missing.
    pub fn parse(&self, input: &[Symbol]) -> Result<(), ParseError> {
        let input = end_terminated(input);
        let start = self.grammar.start();
        let mut stack = vec![Symbol::Eof, Symbol::Nonterminal(start.clone())];
        let mut position = 0;

        while let Some(top) = stack.pop() {
            let current = input.get(position).cloned().unwrap_or(Symbol::Eof);
            log::trace!("LL(1) top `{top}`, lookahead `{current}` at {position}");

            match top {
                Symbol::Nonterminal(nonterminal) => {
                    let Some(id) = self.get(&nonterminal, &current) else {
                        return Err(Rejection::NoRule {
                            nonterminal,
                            lookahead: current,
                            position,
                        }
                        .into());
                    };
                    let prod = self
                        .grammar
                        .production(&nonterminal, id)
                        .ok_or_else(|| InvariantViolation::MissingProduction {
                            nonterminal: nonterminal.clone(),
                            production: id,
                        })?;
                    stack.extend(prod.body().iter().rev().cloned());
                }
                Symbol::Epsilon => {}
                expected => {
                    if expected != current {
                        return Err(Rejection::Mismatch {
                            expected,
                            found: current,
                            position,
                        }
                        .into());
                    }
                    position += 1;
                    if expected == Symbol::Eof {
                        return if position == input.len() {
                            Ok(())
                        } else {
                            Err(Rejection::TrailingInput { position }.into())
                        };
                    }
                }
            }
        }

        Err(InvariantViolation::StackUnderflow {
            nonterminal: start.clone(),
        }
        .into())
    }

    pub fn accepts(&self, input: &[Symbol]) -> bool {
        verdict(self.parse(input))
    }

    /// Tokenizes `input` one character per terminal, then parses it.
    pub fn accepts_str(&self, input: &str) -> bool {
        self.accepts(&tokenize(input, self.grammar.config()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GrammarConfig;
    use pretty_assertions::assert_eq;

    fn build(grammar: &Grammar) -> Result<Ll1Table, ConflictReport> {
        let first = FirstSets::compute(grammar);
        let follow = FollowSets::compute(grammar, &first);
        Ll1Table::build(grammar, &first, &follow)
    }

    fn grammar(rules: &[(&str, &[&str])]) -> Grammar {
        rules
            .iter()
            .fold(Grammar::builder(GrammarConfig::default()), |b, (lhs, alts)| {
                b.alternatives(*lhs, alts)
            })
            .build()
            .unwrap()
    }

    fn t(name: &str) -> Symbol {
        Symbol::terminal(name)
    }

    #[test]
    fn simple_table() {
        // S → aA | bB ; A → a ; B → b
        let g = grammar(&[("S", &["aA", "bB"]), ("A", &["a"]), ("B", &["b"])]);
        let table = build(&g).unwrap();

        assert_eq!(table.get("S", &t("a")), Some(0));
        assert_eq!(table.get("S", &t("b")), Some(1));
        assert_eq!(table.get("A", &t("a")), Some(0));
        assert_eq!(table.get("B", &t("b")), Some(0));
        assert_eq!(table.get("A", &t("b")), None);
        assert_eq!(table.get("S", &Symbol::Eof), None);
    }

    #[test]
    fn epsilon_uses_follow() {
        // S → aS | e
        let g = grammar(&[("S", &["aS", "e"])]);
        let table = build(&g).unwrap();
        assert_eq!(table.get("S", &t("a")), Some(0));
        assert_eq!(table.get("S", &Symbol::Eof), Some(1));
    }

    #[test]
    fn construction_is_deterministic() {
        let g = grammar(&[
            ("S", &["TA"]),
            ("A", &["+TA", "e"]),
            ("T", &["FB"]),
            ("B", &["*FB", "e"]),
            ("F", &["(S)", "i"]),
        ]);
        assert_eq!(build(&g).unwrap(), build(&g).unwrap());
    }

    /// FIRST/FIRST:  S → a A | a B
    #[test]
    fn detects_first_first_conflict() {
        let g = grammar(&[("S", &["aA", "aB"]), ("A", &["x"]), ("B", &["y"])]);
        let err = build(&g).expect_err("should hit FIRST/FIRST clash");
        assert_eq!(
            err.conflicts,
            vec![Conflict::Ll1 {
                nonterminal: "S".into(),
                lookahead: t("a"),
                existing: 0,
                incoming: 1,
            }]
        );
    }

    /// FIRST/FOLLOW:  A derives 'x' and ε, and 'x' also follows A in S → A x
    #[test]
    fn detects_first_follow_conflict() {
        let g = grammar(&[("S", &["Ax", "y"]), ("A", &["x", "e"])]);
        let err = build(&g).expect_err("should hit FIRST/FOLLOW clash");
        assert!(
            err.conflicts.iter().any(|c| matches!(
                c,
                Conflict::Ll1 { nonterminal, lookahead, .. }
                    if &**nonterminal == "A" && *lookahead == t("x")
            )),
            "expected FIRST/FOLLOW conflict on 'x' for A"
        );
    }

    #[test]
    fn first_follow_without_epsilon_is_fine() {
        let g = grammar(&[("S", &["Ax", "y"]), ("A", &["x"])]);
        build(&g).unwrap();
    }

    #[test]
    fn left_recursion_is_not_ll1() {
        let g = grammar(&[("S", &["Sa", "b"])]);
        let err = build(&g).unwrap_err();
        assert!(err.conflicts.iter().all(|c| matches!(c, Conflict::Ll1 { .. })));
        assert!(!err.conflicts.is_empty());
    }

    #[test]
    fn parse_simple() {
        let g = grammar(&[("S", &["aA", "bB"]), ("A", &["a"]), ("B", &["b"])]);
        let table = build(&g).unwrap();

        assert!(table.accepts_str("aa"));
        assert!(table.accepts_str("bb"));
        assert!(table.accepts_str("aa$"));
        assert!(!table.accepts_str("ab"));
        assert!(!table.accepts_str(""));
        assert!(!table.accepts_str("aab"));
    }

    #[test]
    fn rejection_reasons() {
        let g = grammar(&[("S", &["aA", "bB"]), ("A", &["a"]), ("B", &["b"])]);
        let table = build(&g).unwrap();

        assert_eq!(
            table.parse(&[t("a"), t("b")]),
            Err(ParseError::Rejected(Rejection::NoRule {
                nonterminal: "A".into(),
                lookahead: t("b"),
                position: 1,
            }))
        );
        assert_eq!(
            table.parse(&[t("a"), t("a"), t("a")]),
            Err(ParseError::Rejected(Rejection::Mismatch {
                expected: Symbol::Eof,
                found: t("a"),
                position: 2,
            }))
        );
        assert_eq!(
            table.parse(&[t("a"), t("a"), Symbol::Eof, t("a"), Symbol::Eof]),
            Err(ParseError::Rejected(Rejection::TrailingInput { position: 3 }))
        );
    }

    #[test]
    fn nullable_start_accepts_empty_input() {
        // S → aSb | e
        let g = grammar(&[("S", &["aSb", "e"])]);
        let table = build(&g).unwrap();
        assert!(table.accepts_str(""));
        assert!(table.accepts_str("aabb"));
        assert!(!table.accepts_str("aab"));
        assert!(!table.accepts_str("ba"));
    }

    #[test]
    fn expression_grammar() {
        let g = grammar(&[
            ("S", &["TA"]),
            ("A", &["+TA", "e"]),
            ("T", &["FB"]),
            ("B", &["*FB", "e"]),
            ("F", &["(S)", "i"]),
        ]);
        let table = build(&g).unwrap();
        assert!(table.accepts_str("i+i*i"));
        assert!(table.accepts_str("(i+i)*i"));
        assert!(!table.accepts_str("i+"));
        assert!(!table.accepts_str("(i"));
    }
}
