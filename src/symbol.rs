use alloc::borrow::Cow;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

/// Shared, cheaply cloned symbol name.
pub type Name = Arc<str>;

/// Grammar symbol domain.
///
/// Classification is explicit: a name is a terminal or a nonterminal because
/// the grammar said so, never because of how it is spelled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// real token coming from the input
    Terminal(Name),
    /// names a rule of the grammar
    Nonterminal(Name),
    /// ε  (empty string) – appears in FIRST sets and epsilon productions
    Epsilon,
    /// synthetic end‑of‑input symbol ($)
    Eof,
}

impl Symbol {
    pub fn terminal(name: impl Into<Name>) -> Self {
        Symbol::Terminal(name.into())
    }

    pub fn nonterminal(name: impl Into<Name>) -> Self {
        Symbol::Nonterminal(name.into())
    }

    /// True for symbols that can appear in the input: terminals and `$`.
    pub fn is_input(&self) -> bool {
        matches!(self, Symbol::Terminal(_) | Symbol::Eof)
    }

    pub fn as_nonterminal(&self) -> Option<&Name> {
        match self {
            Symbol::Nonterminal(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(name) | Symbol::Nonterminal(name) => f.write_str(name),
            Symbol::Epsilon => f.write_str("ε"),
            Symbol::Eof => f.write_str("$"),
        }
    }
}

/// Appends `$` unless the input already ends with it; empty input becomes
/// exactly `$`.
pub fn end_terminated(input: &[Symbol]) -> Cow<'_, [Symbol]> {
    if input.last() == Some(&Symbol::Eof) {
        Cow::Borrowed(input)
    } else {
        let mut owned = Vec::with_capacity(input.len() + 1);
        owned.extend_from_slice(input);
        owned.push(Symbol::Eof);
        Cow::Owned(owned)
    }
}
