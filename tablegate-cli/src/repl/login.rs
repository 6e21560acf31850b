//! Login prompts

use crate::error::CliError;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{stdout, BufRead, IsTerminal, Write};
use tablegate_core::{Authenticator, Principal};

/// Check credentials, turning a mismatch into [`CliError::LoginFailed`].
pub async fn login(
    authenticator: &dyn Authenticator,
    username: &str,
    password: &str,
) -> Result<Principal, CliError> {
    match authenticator.authenticate(username, password).await? {
        Some(principal) => {
            log::info!("{} logged in", principal);
            Ok(principal)
        }
        None => Err(CliError::LoginFailed),
    }
}

/// Ask for username and password on the terminal.
pub fn prompt_credentials() -> Result<(String, String), CliError> {
    print!("Username: ");
    stdout().flush()?;
    let username = read_input().trim().to_string();
    let password = read_password("Password: ")?;
    Ok((username, password))
}

/// Read a line of input
pub fn read_input() -> String {
    let stdin = std::io::stdin();
    let mut line = String::new();
    let _ = stdin.lock().read_line(&mut line);
    line
}

/// Read a line without echoing it.
///
/// Falls back to a plain read when stdin is not a terminal.
pub fn read_password(prompt: &str) -> Result<String, CliError> {
    print!("{}", prompt);
    stdout().flush()?;

    if !std::io::stdin().is_terminal() {
        return Ok(read_input().trim_end_matches(['\r', '\n']).to_string());
    }

    terminal::enable_raw_mode()?;
    let result = read_hidden();
    terminal::disable_raw_mode()?;
    println!();
    result
}

fn read_hidden() -> Result<String, CliError> {
    let mut password = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Enter => return Ok(password),
            KeyCode::Backspace => {
                password.pop();
            }
            KeyCode::Char('c') | KeyCode::Char('d')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                return Err(CliError::Io(std::io::Error::new(
                    std::io::ErrorKind::Interrupted,
                    "login cancelled",
                )));
            }
            KeyCode::Char(c) => password.push(c),
            _ => {}
        }
    }
}
