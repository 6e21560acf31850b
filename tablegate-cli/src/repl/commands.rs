use super::{Console, Step};
use std::str::FromStr;
use tablegate_core::{Dialect, PermissionSet, Principal};

/// Classify an input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandType<'a> {
    /// Blank line
    Empty,
    /// `exit` or `quit`
    Exit,
    /// Slash command with name and arguments
    Slash {
        command: &'a str,
        args: Vec<&'a str>,
    },
    /// A store command to authorize
    Command(&'a str),
}

impl<'a> CommandType<'a> {
    /// Parse an input line into a command type
    pub fn parse(input: &'a str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return Self::Empty;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            return Self::Exit;
        }

        if input.starts_with('/') {
            let parts: Vec<&str> = input.split_whitespace().collect();
            if !parts.is_empty() {
                return Self::Slash {
                    command: parts[0],
                    args: parts[1..].to_vec(),
                };
            }
        }

        Self::Command(input)
    }
}

/// Handle a slash command
pub async fn handle_slash_command(console: &mut Console, command: &str, args: &[&str]) -> Step {
    match command {
        "/exit" | "/quit" => Step::Exit,
        "/help" => Step::Output(help::full_text()),
        "/whoami" => Step::Output(format_whoami(console.principal(), console.dialect())),
        "/permissions" => {
            let principal = console.principal().clone();
            match console.authorizer().permissions(&principal).await {
                Ok(permissions) => Step::Output(format_permissions(&permissions)),
                Err(err) => Step::Output(format!("could not resolve permissions: {}", err)),
            }
        }
        "/dialect" => Step::Output(update_dialect(console, args)),
        _ => Step::Output(format!(
            "Unknown command: {}. Type /help for available commands.",
            command
        )),
    }
}

fn update_dialect(console: &mut Console, args: &[&str]) -> String {
    let Some(name) = args.first() else {
        return format!("Dialect: {}", console.dialect());
    };

    match Dialect::from_str(name) {
        Ok(dialect) => {
            console.set_dialect(dialect);
            format!("Dialect set to {}", dialect)
        }
        Err(_) => format!("Unknown dialect: {} (statement|verb)", name),
    }
}

/// Help text sections for the console
pub mod help {
    /// Header for the help display
    pub const HEADER: &str = "\nAvailable Commands:\n";

    /// Store commands section
    pub const STORE_COMMANDS: &str = "\
Store Commands (statement dialect):
  SELECT * FROM customer WHERE id = '1'
  INSERT INTO customer VALUE {'id': '2'}
  UPDATE customer SET name = 'Ada' WHERE id = '1'
  DELETE FROM customer WHERE id = '1'

Store Commands (verb dialect):
  dynamodb get-item --table-name customer --key '{\"id\":{\"S\":\"1\"}}'
  dynamodb scan --table-name customer
";

    /// Session commands section
    pub const SESSION: &str = "\
Session:
  /help               Show this help message
  /whoami             Show user, roles and dialect
  /permissions        Show effective permissions
  /dialect [name]     Show or set the dialect (statement|verb)
";

    /// Exit commands section
    pub const EXIT: &str = "\
Exit:
  exit, quit, /exit   Leave the console
  Ctrl+D              Leave the console
";

    /// Keyboard shortcuts section
    pub const KEYBOARD: &str = "\
Keyboard Shortcuts:
  Up/Down             Navigate command history
  Ctrl+R              Reverse search history
  Tab                 Complete slash commands and verbs
";

    /// Get the complete help text
    pub fn full_text() -> String {
        format!("{}{}\n{}\n{}\n{}", HEADER, STORE_COMMANDS, SESSION, EXIT, KEYBOARD)
    }
}

/// `/whoami` output
pub fn format_whoami(principal: &Principal, dialect: Dialect) -> String {
    let roles = if principal.roles().is_empty() {
        "(none)".to_string()
    } else {
        principal.roles().join(", ")
    };
    format!(
        "\n  User:    {}\n  Roles:   {}\n  Dialect: {}\n",
        principal.username(),
        roles,
        dialect
    )
}

/// `/permissions` output
pub fn format_permissions(permissions: &PermissionSet) -> String {
    let mut output = String::from("\nEffective Permissions:\n\n");

    if permissions.is_empty() {
        output.push_str("  No permissions granted\n");
    } else {
        for permission in permissions.iter() {
            output.push_str(&format!("  {}\n", permission));
        }
    }

    if permissions.ignored() > 0 {
        output.push_str(&format!(
            "\n  ({} malformed entries ignored)\n",
            permissions.ignored()
        ));
    }

    output
}
