//! Command-line interface for session-gate.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Subcommand to run against the persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in with an email and password.
    Login { email: String, password: String },
    /// End the session and forget the persisted token.
    Logout,
    /// Print the current session.
    Status,
    /// Run the route guard for a path.
    Navigate { path: String },
    /// List the demo accounts.
    Accounts,
}

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Token storage file (overrides config file).
    pub storage: Option<PathBuf>,
    /// Keep the session in memory only.
    pub memory: bool,
    /// Simulated verifier latency in milliseconds.
    pub latency_ms: Option<u64>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
    /// Subcommand; `status` when omitted.
    pub command: Option<Command>,
}

impl Args {
    /// The subcommand to run.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Status)
    }
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut positional: Vec<String> = Vec::new();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('s') | Long("storage") => {
                result.storage = Some(parser.value()?.parse()?);
            }
            Long("memory") => {
                result.memory = true;
            }
            Long("latency") => {
                let value: String = parser.value()?.parse()?;
                result.latency_ms = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("latency", value))?,
                );
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                positional.push(val.string()?);
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    if !positional.is_empty() {
        result.command = Some(parse_command(positional)?);
    }

    Ok(result)
}

fn parse_command(words: Vec<String>) -> Result<Command, ArgsError> {
    let mut words = words.into_iter();
    let name = words.next().unwrap_or_default();
    let rest: Vec<String> = words.collect();

    let command = match (name.as_str(), rest.as_slice()) {
        ("login", [email, password]) => Command::Login {
            email: email.clone(),
            password: password.clone(),
        },
        ("login", _) => return Err(ArgsError::Usage("login <EMAIL> <PASSWORD>")),
        ("logout", []) => Command::Logout,
        ("status", []) => Command::Status,
        ("accounts", []) => Command::Accounts,
        ("navigate", [path]) => Command::Navigate { path: path.clone() },
        ("navigate", _) => return Err(ArgsError::Usage("navigate <PATH>")),
        ("logout" | "status" | "accounts", [extra, ..]) => {
            return Err(ArgsError::UnexpectedArgument(extra.clone()))
        }
        _ => return Err(ArgsError::UnknownCommand(name)),
    };

    Ok(command)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"session-gate {version}
Client-side session management: login, token persistence, route guarding

USAGE:
    session-gate [OPTIONS] [COMMAND]

COMMANDS:
    login <EMAIL> <PASSWORD>  Log in and persist the session token
    logout                    End the session and clear the persisted token
    status                    Print the current session (default)
    navigate <PATH>           Show where the route guard sends PATH
    accounts                  List the demo accounts

OPTIONS:
    -c, --config <FILE>     Path to configuration file (JSON)
    -s, --storage <FILE>    Token storage file
        --memory            Keep the session in memory only
        --latency <MS>      Simulated verifier latency in milliseconds
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    SESSION_GATE_STORAGE_PATH     Token storage file (overrides config)
    SESSION_GATE_STORAGE_BACKEND  file or memory (overrides config)
    SESSION_GATE_LATENCY_MS       Verifier latency (overrides config)
    SESSION_GATE_LOG_LEVEL        Log level (overrides config)
    RUST_LOG                      Alternative log level setting

EXAMPLES:
    session-gate login admin@example.com password
    session-gate navigate /dashboard
    session-gate logout
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("session-gate {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    /// Lexopt parsing error.
    #[error("{0}")]
    Lexopt(#[from] lexopt::Error),
    /// Invalid argument value.
    #[error("invalid value for --{0}: '{1}'")]
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    #[error("unexpected argument: '{0}'")]
    UnexpectedArgument(String),
    /// Unknown subcommand.
    #[error("unknown command: '{0}'")]
    UnknownCommand(String),
    /// Subcommand with the wrong arguments.
    #[error("usage: session-gate {0}")]
    Usage(&'static str),
}
