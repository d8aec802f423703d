//! Text format used by the command line:
//!
//! ```text
//! 3
//! S -> aA bB
//! A -> a
//! B -> b
//! ```
//!
//! The leading count is optional. Every alternative is a space-free string of
//! one-character symbols: uppercase letters name rules, the epsilon char
//! (default `e`) is ε, anything else is a terminal.

use crate::config::GrammarConfig;
use crate::error::GrammarError;
use crate::grammar::{Grammar, classify_char};
use crate::symbol::Symbol;
use alloc::format;
use alloc::string::ToString;
use alloc::vec::Vec;

pub fn read_grammar(text: &str, config: &GrammarConfig) -> Result<Grammar, GrammarError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .peekable();

    let expected = match lines.next_if(|(_, first)| first.bytes().all(|b| b.is_ascii_digit())) {
        Some((line, count)) => Some(count.parse::<usize>().map_err(|e| GrammarError::Syntax {
            line,
            reason: e.to_string(),
        })?),
        None => None,
    };

    let mut builder = Grammar::builder(config.clone());
    let mut seen = 0usize;
    for (line, rule) in lines {
        if expected.is_some_and(|n| seen == n) {
            break;
        }
        let (lhs, alternatives) = parse_rule(line, rule, config)?;
        builder = builder.rule(lhs, alternatives);
        seen += 1;
    }

    if let Some(n) = expected {
        if seen < n {
            return Err(GrammarError::Syntax {
                line: text.lines().count(),
                reason: format!("expected {n} rules, found {seen}"),
            });
        }
    }
    builder.build()
}

fn parse_rule<'a>(
    line: usize,
    text: &'a str,
    config: &GrammarConfig,
) -> Result<(&'a str, Vec<Vec<Symbol>>), GrammarError> {
    let syntax = |reason: &str| GrammarError::Syntax {
        line,
        reason: reason.to_string(),
    };

    let (lhs, rhs) = text.split_once("->").ok_or_else(|| syntax("missing `->`"))?;
    let lhs = lhs.trim();
    if lhs.is_empty() || lhs.contains(char::is_whitespace) {
        return Err(syntax("left-hand side must be a single name"));
    }

    let alternatives: Vec<Vec<Symbol>> = rhs
        .split_whitespace()
        .map(|alt| alt.chars().map(|c| classify_char(c, config)).collect())
        .collect();
    if alternatives.is_empty() {
        return Err(syntax("rule has no alternatives"));
    }
    Ok((lhs, alternatives))
}

/// One terminal per character; the end marker becomes `$`.
pub fn tokenize(input: &str, config: &GrammarConfig) -> Vec<Symbol> {
    input
        .chars()
        .map(|c| {
            if c == config.end_marker {
                Symbol::Eof
            } else {
                let mut buf = [0u8; 4];
                Symbol::terminal(&*c.encode_utf8(&mut buf))
            }
        })
        .collect()
}
