//! Grammar model: ordered rules, explicit symbol classification and the
//! augmented grammar used by the LR(0) automaton.

use crate::config::GrammarConfig;
use crate::error::GrammarError;
use crate::symbol::{Name, Symbol};
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Deref;
use either::Either;
use hashbrown::{HashMap, HashSet};

/// Index of a production among the alternatives of its nonterminal.
pub type ProdId = usize;

/// Right-hand side of a rule.
///
/// An empty derivation is stored as the singleton `[Epsilon]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production(Arc<[Symbol]>);

impl Production {
    /// Drops ε inside longer bodies; an empty body becomes `[Epsilon]`.
    pub fn new(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let body: Vec<Symbol> = symbols
            .into_iter()
            .filter(|s| *s != Symbol::Epsilon)
            .collect();
        if body.is_empty() {
            Self::epsilon()
        } else {
            Production(body.into())
        }
    }

    pub fn epsilon() -> Self {
        Production(Arc::from([Symbol::Epsilon]))
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(&*self.0, [Symbol::Epsilon])
    }

    /// Symbols as written, `[Epsilon]` included.
    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    /// Symbols actually derived; empty for an epsilon production.
    pub fn body(&self) -> &[Symbol] {
        if self.is_epsilon() { &[] } else { &self.0[..] }
    }

    pub fn len(&self) -> usize {
        self.body().len()
    }

    pub fn is_empty(&self) -> bool {
        self.body().is_empty()
    }
}

/// A nonterminal together with its ordered alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub lhs: Name,
    pub productions: Vec<Production>,
}

/// Immutable context-free grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    config: GrammarConfig,
    /// in order of first definition
    rules: Vec<Rule>,
    index: HashMap<Name, usize>,
    terminals: HashSet<Name>,
}

impl Grammar {
    pub fn builder(config: GrammarConfig) -> GrammarBuilder {
        GrammarBuilder::new(config)
    }

    pub fn config(&self) -> &GrammarConfig {
        &self.config
    }

    pub fn start(&self) -> &Name {
        &self.config.start
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = &Name> {
        self.rules.iter().map(|r| &r.lhs)
    }

    pub fn terminals(&self) -> &HashSet<Name> {
        &self.terminals
    }

    pub fn is_nonterminal(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|&i| &self.rules[i])
    }

    /// Alternatives of `name` with their indices; nothing for unknown names.
    pub fn productions(&self, name: &str) -> impl Iterator<Item = (ProdId, &Production)> {
        match self.rule(name) {
            None => Either::Left(core::iter::empty()),
            Some(rule) => Either::Right(rule.productions.iter().enumerate()),
        }
    }

    pub fn production(&self, name: &str, id: ProdId) -> Option<&Production> {
        self.rule(name)?.productions.get(id)
    }

    /// Every (lhs, production index, production) triple in rule order.
    pub fn iter_productions(&self) -> impl Iterator<Item = (&Name, ProdId, &Production)> {
        self.rules.iter().flat_map(|r| {
            r.productions
                .iter()
                .enumerate()
                .map(move |(i, p)| (&r.lhs, i, p))
        })
    }

    /// Extends the grammar with a fresh start `S'` and the single production
    /// `S' → S`. The original grammar is left untouched.
    pub fn augmented(&self) -> AugmentedGrammar {
        let original_start = self.start().clone();
        let mut fresh = String::from(&*original_start);
        loop {
            fresh.push('\'');
            if !self.is_nonterminal(&fresh) && !self.terminals.contains(fresh.as_str()) {
                break;
            }
        }
        let fresh: Name = fresh.into();

        let start_prod = Production::new([Symbol::Nonterminal(original_start.clone())]);
        let mut rules = Vec::with_capacity(self.rules.len() + 1);
        rules.push(Rule {
            lhs: fresh.clone(),
            productions: alloc::vec![start_prod],
        });
        rules.extend(self.rules.iter().cloned());
        let index = rules
            .iter()
            .enumerate()
            .map(|(i, r)| (r.lhs.clone(), i))
            .collect();

        AugmentedGrammar {
            grammar: Grammar {
                config: self.config.clone().with_start(fresh),
                rules,
                index,
                terminals: self.terminals.clone(),
            },
            original_start,
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            write!(f, "{} ->", rule.lhs)?;
            for prod in &rule.productions {
                f.write_str(" ")?;
                if prod.is_epsilon() {
                    write!(f, "{}", self.config.epsilon)?;
                    continue;
                }
                for sym in prod.body() {
                    write!(f, "{sym}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Grammar extended with `S' → S`; only the LR(0) automaton consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentedGrammar {
    grammar: Grammar,
    original_start: Name,
}

impl AugmentedGrammar {
    pub fn original_start(&self) -> &Name {
        &self.original_start
    }
}

impl Deref for AugmentedGrammar {
    type Target = Grammar;

    fn deref(&self) -> &Grammar {
        &self.grammar
    }
}

/// Collects rules and classifies their symbols once, at [`GrammarBuilder::build`].
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    config: GrammarConfig,
    rules: Vec<(Name, Vec<Vec<Symbol>>)>,
}

impl GrammarBuilder {
    pub fn new(config: GrammarConfig) -> Self {
        Self {
            config,
            rules: Vec::new(),
        }
    }

    /// Adds alternatives to `lhs`. Repeating a left-hand side appends.
    ///
    /// A `Terminal` whose name turns out to be a rule is resolved to that
    /// rule; a `Nonterminal` must name one.
    pub fn rule<A, I>(mut self, lhs: impl Into<Name>, alternatives: A) -> Self
    where
        A: IntoIterator<Item = I>,
        I: IntoIterator<Item = Symbol>,
    {
        let lhs = lhs.into();
        let alts = alternatives
            .into_iter()
            .map(|alt| alt.into_iter().collect::<Vec<Symbol>>())
            .collect::<Vec<_>>();
        match self.rules.iter_mut().find(|(name, _)| *name == lhs) {
            Some((_, existing)) => existing.extend(alts),
            None => self.rules.push((lhs, alts)),
        }
        self
    }

    /// One-character convention: uppercase letters are nonterminals, the
    /// configured epsilon char is ε, the end marker is `$`, anything else is
    /// a terminal.
    pub fn alternatives(self, lhs: impl Into<Name>, alternatives: &[&str]) -> Self {
        let alts = alternatives
            .iter()
            .map(|alt| {
                alt.chars()
                    .map(|c| classify_char(c, &self.config))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        self.rule(lhs, alts)
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        let GrammarBuilder { config, rules } = self;

        let index: HashMap<Name, usize> = rules
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();
        if !index.contains_key(&*config.start) {
            return Err(GrammarError::MissingStart(config.start.clone()));
        }

        let mut terminals = HashSet::new();
        let mut built = Vec::with_capacity(rules.len());
        for (lhs, alts) in rules {
            if alts.is_empty() {
                return Err(GrammarError::EmptyRule(lhs));
            }
            let mut productions = Vec::with_capacity(alts.len());
            for alt in alts {
                let mut symbols = Vec::with_capacity(alt.len());
                for sym in alt {
                    let sym = match sym {
                        Symbol::Terminal(name) if index.contains_key(&name) => {
                            Symbol::Nonterminal(name)
                        }
                        Symbol::Terminal(name) => {
                            terminals.insert(name.clone());
                            Symbol::Terminal(name)
                        }
                        Symbol::Nonterminal(name) if !index.contains_key(&name) => {
                            return Err(GrammarError::UndefinedNonterminal(name));
                        }
                        Symbol::Eof => return Err(GrammarError::EndMarkerInRule(lhs)),
                        other => other,
                    };
                    symbols.push(sym);
                }
                productions.push(Production::new(symbols));
            }
            built.push(Rule { lhs, productions });
        }

        log::debug!(
            "grammar built: {} nonterminals, {} terminals",
            built.len(),
            terminals.len()
        );
        Ok(Grammar {
            config,
            rules: built,
            index,
            terminals,
        })
    }
}

pub(crate) fn classify_char(c: char, config: &GrammarConfig) -> Symbol {
    let mut buf = [0u8; 4];
    let name: &str = c.encode_utf8(&mut buf);
    if c == config.epsilon {
        Symbol::Epsilon
    } else if c == config.end_marker {
        Symbol::Eof
    } else if c.is_uppercase() {
        Symbol::nonterminal(name)
    } else {
        Symbol::terminal(name)
    }
}
