//! Tab completion for the console prompt

use rustyline::completion::Completer;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper, Result as RustylineResult};
use tablegate_core::parser::{NAMESPACE, VERBS};

const SLASH_COMMANDS: [&str; 5] = ["/help", "/whoami", "/permissions", "/dialect", "/exit"];
const STATEMENT_KEYWORDS: [&str; 4] = ["SELECT", "INSERT", "UPDATE", "DELETE"];

#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleHelper;

impl ConsoleHelper {
    /// Candidates for the word ending at `pos`, and where that word starts.
    fn candidates(line: &str, pos: usize) -> (usize, Vec<String>) {
        let before = &line[..pos];
        let start = before.rfind(char::is_whitespace).map_or(0, |i| i + 1);
        let word = &before[start..];
        let preceding: Vec<&str> = before[..start].split_whitespace().collect();

        let pool: Vec<&str> = match preceding.as_slice() {
            [] if word.starts_with('/') => SLASH_COMMANDS.to_vec(),
            [] => {
                let mut pool = vec![NAMESPACE];
                pool.extend(STATEMENT_KEYWORDS);
                pool
            }
            ["/dialect"] => vec!["statement", "verb"],
            [namespace] if namespace.eq_ignore_ascii_case(NAMESPACE) => {
                VERBS.iter().map(|(verb, _)| *verb).collect()
            }
            _ => Vec::new(),
        };

        let matches = pool
            .into_iter()
            .filter(|candidate| {
                candidate
                    .to_ascii_lowercase()
                    .starts_with(&word.to_ascii_lowercase())
            })
            .map(str::to_string)
            .collect();
        (start, matches)
    }
}

impl Completer for ConsoleHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> RustylineResult<(usize, Vec<Self::Candidate>)> {
        Ok(Self::candidates(line, pos))
    }
}

impl Hinter for ConsoleHelper {
    type Hint = String;
}

impl Highlighter for ConsoleHelper {}

impl Validator for ConsoleHelper {}

impl Helper for ConsoleHelper {}
