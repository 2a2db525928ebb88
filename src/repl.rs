//! Line based connect form on stdin.

use log::{error, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::lifecycle::AppEvent;
use crate::runtime::RuntimeHandle;

const HELP: &str = "Available commands: domain <host>, room <name>, name <display name>, join, status, quit, help";

#[derive(Debug, PartialEq, Eq)]
pub enum ReplCommand {
    Send(AppEvent),
    Help,
    Nothing,
}

pub fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    let (command, argument) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let required = |usage: &str| -> Result<String, String> {
        if argument.is_empty() {
            Err(format!("Usage: {usage}"))
        } else {
            Ok(argument.to_string())
        }
    };

    let event = match command {
        "" => return Ok(ReplCommand::Nothing),
        "help" => return Ok(ReplCommand::Help),
        "domain" => AppEvent::SetDomain(required("domain <host>")?),
        "room" => AppEvent::SetRoom(required("room <name>")?),
        "name" => AppEvent::SetName(required("name <display name>")?),
        "join" | "connect" => AppEvent::Connect,
        "status" => AppEvent::Status,
        "quit" | "exit" => AppEvent::Quit,
        _ => return Err(format!("Unknown command: {line}")),
    };

    Ok(ReplCommand::Send(event))
}

/// Reads commands from stdin until it closes or the runtime stops.
pub async fn start_repl<S>(handle: RuntimeHandle<S>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_command(&line) {
                Ok(ReplCommand::Send(event)) => {
                    if !handle.send(event) {
                        break;
                    }
                }
                Ok(ReplCommand::Help) => println!("{HELP}"),
                Ok(ReplCommand::Nothing) => {}
                Err(message) => println!("{message}"),
            },
            Ok(None) => {
                info!("stdin closed, no more commands");
                break;
            }
            Err(err) => {
                error!("Error reading stdin: {}", err);
                break;
            }
        }
    }
}
