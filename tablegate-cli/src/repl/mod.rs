//! Interactive console

mod commands;
mod input;
mod login;
mod render;

use crate::error::CliError;
use commands::{handle_slash_command, CommandType};
use input::ConsoleHelper;
use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::{CompletionType, Editor};
use std::sync::Arc;
use tablegate_core::{CommandAuthorizer, Dialect, Principal, StorageExecutor, Verdict};

pub use commands::{format_permissions, format_whoami, help};
pub use login::{login, prompt_credentials, read_input, read_password};
pub use render::{format_execution_error, format_outcome, format_verdict, indent_lines};

/// What the loop should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Print this and read the next line.
    Output(String),
    /// Nothing to print.
    Silent,
    /// Leave the console.
    Exit,
}

/// One logged-in console session.
///
/// Holds the authenticated principal for the whole session; every store
/// command goes through the authorizer before it reaches the executor.
pub struct Console {
    authorizer: Arc<CommandAuthorizer>,
    executor: Arc<dyn StorageExecutor>,
    principal: Principal,
    dialect: Dialect,
}

impl Console {
    pub fn new(
        authorizer: Arc<CommandAuthorizer>,
        executor: Arc<dyn StorageExecutor>,
        principal: Principal,
    ) -> Self {
        Self {
            authorizer,
            executor,
            principal,
            dialect: Dialect::default(),
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn set_dialect(&mut self, dialect: Dialect) {
        self.dialect = dialect;
    }

    pub fn authorizer(&self) -> &CommandAuthorizer {
        &self.authorizer
    }

    /// `user@role $ `, using the first role.
    pub fn prompt(&self) -> String {
        format!(
            "{}@{} $ ",
            self.principal.username(),
            self.principal.primary_role().unwrap_or("unknown")
        )
    }

    /// Handle one input line.
    pub async fn handle_line(&mut self, line: &str) -> Step {
        match CommandType::parse(line) {
            CommandType::Empty => Step::Silent,
            CommandType::Exit => Step::Exit,
            CommandType::Slash { command, args } => {
                handle_slash_command(self, command, &args).await
            }
            CommandType::Command(text) => Step::Output(self.run_command(text).await),
        }
    }

    /// Authorize `text` and, if allowed, execute it.
    ///
    /// Full detail is shown for denials and malformed commands.
    pub async fn run_command(&self, text: &str) -> String {
        let result = self
            .authorizer
            .authorize(&self.principal, self.dialect, text)
            .await;
        let mut output = format_verdict(&Verdict::of(&result));

        let Ok(authorized) = result else {
            return output;
        };
        let Ok(permitted) = authorized.permit() else {
            return output;
        };

        output.push('\n');
        match self.executor.execute(&permitted).await {
            Ok(outcome) => output.push_str(&format_outcome(&outcome)),
            Err(err) => {
                log::warn!("{} failed: {}", permitted.command(), err);
                output.push_str(&format_execution_error(&err));
            }
        }
        output
    }
}

/// Format the welcome banner header
pub fn format_welcome_header() -> String {
    format!("tablegate v{}", env!("CARGO_PKG_VERSION"))
}

/// Format the login confirmation
pub fn format_login_banner(principal: &Principal) -> String {
    let roles = if principal.roles().is_empty() {
        "(none)".to_string()
    } else {
        principal.roles().join(", ")
    };
    format!(
        "Authenticated as {} with roles: {}",
        principal.username(),
        roles
    )
}

/// Format the tip line shown at startup
pub fn format_tip() -> &'static str {
    "Type /help for commands, 'exit' or Ctrl+D to leave"
}

/// Run the console until the user leaves.
///
/// Provides:
/// - Up/down arrow history, persisted across sessions
/// - Ctrl+R reverse search
/// - Tab completion of slash commands and verbs
///
/// # Errors
///
/// Returns `CliError::Readline` if the terminal cannot be driven. Failing
/// commands are printed and do not end the session.
pub async fn run_console(mut console: Console) -> Result<(), CliError> {
    println!("\n{}", format_login_banner(console.principal()));
    println!("{}\n", format_tip());

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .auto_add_history(false)
        .build();
    let mut rl: Editor<ConsoleHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(ConsoleHelper));

    let history_path = dirs::cache_dir()
        .map(|p| p.join("tablegate/history.txt"))
        .unwrap_or_else(|| ".tablegate/history.txt".into());

    if history_path.exists() {
        rl.load_history(&history_path).ok();
    }

    loop {
        match rl.readline(&console.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    rl.add_history_entry(trimmed)?;
                }

                match console.handle_line(trimmed).await {
                    Step::Output(text) => println!("{}", text),
                    Step::Silent => {}
                    Step::Exit => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C - just continue
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    rl.save_history(&history_path)?;

    println!("\nGoodbye.\n");
    Ok(())
}
