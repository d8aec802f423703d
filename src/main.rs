use clap::{Parser, ValueEnum};
use grammar_class::{Analysis, GrammarConfig, Ll1Table, Slr1Tables, read_grammar};
use std::error::Error;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const PROMPT: &str = "Select a parser (T: for LL(1), B: for SLR(1), Q: quit):";

#[derive(Parser)]
#[command(name = "grammar_class")]
#[command(about = "Classify a grammar as LL(1) / SLR(1) and test strings against it")]
struct Cli {
    /// Read the grammar from a file instead of stdin
    #[arg(short, long)]
    grammar: Option<PathBuf>,

    /// Start nonterminal
    #[arg(short, long, default_value = "S")]
    start: String,

    /// Character that spells an empty alternative
    #[arg(short, long, default_value_t = 'e')]
    epsilon: char,

    /// Skip the selection prompt when the grammar qualifies for both parsers
    #[arg(short, long, value_enum)]
    parser: Option<ParserKind>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ParserKind {
    Ll1,
    Slr1,
}

enum Selected<'a> {
    Ll1(&'a Ll1Table),
    Slr1(&'a Slr1Tables),
}

impl Selected<'_> {
    fn accepts(&self, input: &str) -> bool {
        match self {
            Selected::Ll1(table) => table.accepts_str(input),
            Selected::Slr1(tables) => tables.accepts_str(input),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let config = GrammarConfig::default()
        .with_start(cli.start.as_str())
        .with_epsilon(cli.epsilon);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let text = match &cli.grammar {
        Some(path) => fs::read_to_string(path)?,
        None => read_counted(&mut lines)?,
    };
    let grammar = read_grammar(&text, &config)?;
    log::info!("grammar:\n{grammar}");

    let analysis = Analysis::new(grammar);
    let ll1 = analysis.ll1();
    let slr1 = analysis.slr1();
    if let Err(report) = &ll1 {
        log::info!("not LL(1): {report}");
    }
    if let Err(report) = &slr1 {
        log::info!("not SLR(1): {report}");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli.parser, ll1.ok().as_ref(), slr1.ok().as_ref(), &mut lines, &mut out)?;
    Ok(())
}

/// Reports the class and drives the sessions it allows.
fn run(
    requested: Option<ParserKind>,
    ll1: Option<&Ll1Table>,
    slr1: Option<&Slr1Tables>,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    out: &mut impl Write,
) -> io::Result<()> {
    match (ll1, slr1) {
        (Some(ll1), Some(slr1)) => match requested {
            Some(ParserKind::Ll1) => session(&Selected::Ll1(ll1), lines, out),
            Some(ParserKind::Slr1) => session(&Selected::Slr1(slr1), lines, out),
            None => select(ll1, slr1, lines, out),
        },
        (Some(ll1), None) => {
            if requested == Some(ParserKind::Slr1) {
                log::warn!("--parser slr1 ignored: grammar is not SLR(1)");
            }
            writeln!(out, "Grammar is LL(1).")?;
            session(&Selected::Ll1(ll1), lines, out)
        }
        (None, Some(slr1)) => {
            if requested == Some(ParserKind::Ll1) {
                log::warn!("--parser ll1 ignored: grammar is not LL(1)");
            }
            writeln!(out, "Grammar is SLR(1).")?;
            session(&Selected::Slr1(slr1), lines, out)
        }
        (None, None) => {
            if requested.is_some() {
                log::warn!("--parser ignored: grammar is neither LL(1) nor SLR(1)");
            }
            writeln!(out, "Grammar is neither LL(1) nor SLR(1).")
        }
    }
}

/// Prompts until `Q` or end of input; `T` and `B` each run one session.
fn select(
    ll1: &Ll1Table,
    slr1: &Slr1Tables,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "{PROMPT}")?;
    out.flush()?;
    while let Some(choice) = lines.next() {
        let selected = match choice?.trim().to_uppercase().as_str() {
            "T" => Selected::Ll1(ll1),
            "B" => Selected::Slr1(slr1),
            "Q" => break,
            _ => continue,
        };
        session(&selected, &mut *lines, &mut *out)?;
        writeln!(out, "{PROMPT}")?;
        out.flush()?;
    }
    Ok(())
}

/// Reads the count line and that many rule lines.
fn read_counted(
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<String, Box<dyn Error>> {
    let count_line = lines.next().ok_or("missing rule count")??;
    let count: usize = count_line.trim().parse()?;
    let mut text = String::new();
    text.push_str(count_line.trim());
    text.push('\n');
    for _ in 0..count {
        let rule = lines.next().ok_or("grammar ended before the rule count was reached")??;
        text.push_str(&rule);
        text.push('\n');
    }
    Ok(text)
}

/// One string per line until a blank line or end of input.
fn session(
    parser: &Selected<'_>,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    out: &mut impl Write,
) -> io::Result<()> {
    for line in lines {
        let line = line?;
        let input = line.trim_end_matches('\r');
        if input.is_empty() {
            break;
        }
        writeln!(out, "{}", if parser.accepts(input) { "yes" } else { "no" })?;
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grammar_class::Analysis;
    use pretty_assertions::assert_eq;

    fn input(text: &str) -> impl Iterator<Item = io::Result<String>> {
        text.split('\n')
            .map(|line| Ok(line.to_string()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn analysis(text: &str) -> Analysis {
        Analysis::new(read_grammar(text, &GrammarConfig::default()).unwrap())
    }

    fn run_with(text: &str, requested: Option<ParserKind>, stdin: &str) -> String {
        let analysis = analysis(text);
        let ll1 = analysis.ll1().ok();
        let slr1 = analysis.slr1().ok();
        let mut out = Vec::new();
        run(requested, ll1.as_ref(), slr1.as_ref(), &mut input(stdin), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn session_stops_at_blank_line() {
        let analysis = analysis("S -> aA bB\nA -> a\nB -> b");
        let table = analysis.ll1().unwrap();
        let mut lines = input("aa\nab\n\nzz\n");
        let mut out = Vec::new();
        session(&Selected::Ll1(&table), &mut lines, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "yes\nno\n");
        // the line after the blank one is left for the caller
        assert_eq!(lines.next().unwrap().unwrap(), "zz");
    }

    #[test]
    fn session_trims_carriage_returns_and_ends_at_eof() {
        let analysis = analysis("S -> Sa b");
        let tables = analysis.slr1().unwrap();
        let mut out = Vec::new();
        session(&Selected::Slr1(&tables), &mut input("ba\r\nab\r\nb"), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "yes\nno\nyes\n");
    }

    #[test]
    fn prompt_repeats_until_quit() {
        let out = run_with("S -> aA bB\nA -> a\nB -> b", None, "x\nT\naa\n\nB\nab\n\nQ\nT\naa\n");
        assert_eq!(
            out,
            format!("{PROMPT}\nyes\n{PROMPT}\nno\n{PROMPT}\n")
        );
    }

    #[test]
    fn prompt_ends_at_eof() {
        let out = run_with("S -> aA bB\nA -> a\nB -> b", None, "t\nbb");
        assert_eq!(out, format!("{PROMPT}\nyes\n{PROMPT}\n"));
    }

    #[test]
    fn requested_parser_skips_prompt() {
        let out = run_with("S -> aA bB\nA -> a\nB -> b", Some(ParserKind::Slr1), "bb\n");
        assert_eq!(out, "yes\n");
    }

    #[test]
    fn single_class_runs_its_parser() {
        assert_eq!(run_with("S -> Sa b", None, "baa\na\n"), "Grammar is SLR(1).\nyes\nno\n");
        // an unavailable --parser choice falls back to the parser that exists
        assert_eq!(
            run_with("S -> AaAb BbBa\nA -> e\nB -> e", Some(ParserKind::Slr1), "ab\n"),
            "Grammar is LL(1).\nyes\n"
        );
        assert_eq!(
            run_with("S -> iStS iS a", None, "a\n"),
            "Grammar is neither LL(1) nor SLR(1).\n"
        );
    }

    #[test]
    fn counted_grammar_reads_exactly_n_rules() {
        let mut lines = input("2\nS -> aA\nA -> a\naa\n");
        assert_eq!(read_counted(&mut lines).unwrap(), "2\nS -> aA\nA -> a\n");
        assert_eq!(lines.next().unwrap().unwrap(), "aa");
    }

    #[test]
    fn counted_grammar_too_short() {
        let err = read_counted(&mut input("3\nS -> aA\nA -> a")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "grammar ended before the rule count was reached"
        );
        assert!(read_counted(&mut input("")).is_err());
        assert!(read_counted(&mut input("two\nS -> a")).is_err());
    }
}
