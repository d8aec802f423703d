use crate::symbol::Name;

/// Conventions shared by the grammar, its loader and the input tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarConfig {
    /// Name of the start nonterminal.
    pub start: Name,

    /// Character that spells an empty alternative in the text format.
    pub epsilon: char,

    /// End-of-input marker; may terminate an input string.
    pub end_marker: char,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            start: Name::from("S"),
            epsilon: 'e',
            end_marker: '$',
        }
    }
}

impl GrammarConfig {
    pub fn with_start(mut self, start: impl Into<Name>) -> Self {
        self.start = start.into();
        self
    }

    pub fn with_epsilon(mut self, epsilon: char) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_end_marker(mut self, end_marker: char) -> Self {
        self.end_marker = end_marker;
        self
    }
}
