//! session-gate binary entry point.
//!
//! Drives one session against the configured token storage, so that
//! consecutive invocations behave like reloads of the same application.

use std::process::ExitCode;

use serde_json::json;
use session_gate::cli::{self, Command};
use session_gate::config::Config;
use session_gate::{logging, SessionAccessor};
use tracing::{debug, error};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run 'session-gate --help' for usage.");
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::try_init_with_level(config.log_filter()).ok();
    debug!(storage = %config.storage.path.display(), "configuration loaded");

    let session = config.session_handle();

    match args.command() {
        Command::Login { email, password } => {
            let ok = session.login(&email, &password).await;
            print_json(&json!({ "success": ok, "session": session.session() }));
            if !ok {
                return ExitCode::FAILURE;
            }
        }
        Command::Logout => {
            session.logout();
            print_json(&json!({ "session": session.session() }));
        }
        Command::Status => {
            print_json(&json!({
                "session": session.session(),
                "persistent": !session.is_degraded(),
            }));
        }
        Command::Navigate { path } => {
            let guard = config.route_guard();
            let table = config.route_table();
            match table.navigate(&guard, &path, &session.session()) {
                Ok(nav) => print_json(&json!({
                    "requested": path,
                    "destination": nav.destination,
                    "redirects": nav.redirects,
                })),
                Err(e) => {
                    error!(error = %e, "navigation failed");
                    eprintln!("error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
        Command::Accounts => {
            let accounts: Vec<_> = config
                .verifier()
                .accounts()
                .iter()
                .map(|a| {
                    json!({
                        "email": a.email,
                        "password": a.password,
                        "role": a.user.role,
                        "name": a.user.display_name(),
                    })
                })
                .collect();
            print_json(&json!(accounts));
        }
    }

    ExitCode::SUCCESS
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("error: {}", e),
    }
}
