//! Console output for verdicts and store results

use serde_json::Value;
use tablegate_core::{ExecutionError, ExecutionOutcome, Verdict};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// One line describing the verdict.
///
/// An allowed command is about to run, so it reads "executing".
pub fn format_verdict(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Allowed { permission } => format!(
            "  {GREEN}✓{RESET} authorized, executing {DIM}('{}' granted){RESET}",
            permission
        ),
        Verdict::Indeterminate { .. } => format!("  {YELLOW}!{RESET} {}", verdict),
        _ => format!("  {RED}✗{RESET} {}", verdict),
    }
}

/// Items as pretty JSON, or the acknowledged operation.
pub fn format_outcome(outcome: &ExecutionOutcome) -> String {
    match outcome {
        ExecutionOutcome::Items { items } if items.is_empty() => {
            format!("\n  {DIM}No items found.{RESET}\n")
        }
        ExecutionOutcome::Items { items } => {
            let mut output = String::from("\n");
            for item in items {
                output.push_str(&indent_lines(&pretty(item), "  "));
                output.push('\n');
            }
            let noun = if items.len() == 1 { "item" } else { "items" };
            output.push_str(&format!("\n  {DIM}{} {}{RESET}\n", items.len(), noun));
            output
        }
        ExecutionOutcome::Acknowledged { operation } => {
            format!("\n  {GREEN}✓{RESET} {} completed\n", operation)
        }
    }
}

/// A store failure after authorization succeeded.
pub fn format_execution_error(err: &ExecutionError) -> String {
    format!("  {RED}✗{RESET} store error: {}", err)
}

/// Indent each line of `text`.
pub fn indent_lines(text: &str, indent: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", indent, line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
