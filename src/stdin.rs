//! Line commands on stdin: the manual toggle control

use tokio::sync::mpsc;

use dartbridge_app::Message;
use dartbridge_core::prelude::*;

/// A parsed stdin line
#[derive(Debug, Clone)]
pub enum StdinCommand {
    Send(Message),
    Empty,
    Unknown(String),
}

/// Map a line to a bridge message
pub fn parse_command(line: &str) -> StdinCommand {
    let trimmed = line.trim();
    let msg = match trimmed.to_ascii_lowercase().as_str() {
        "" => return StdinCommand::Empty,
        "t" | "toggle" => Message::Toggle,
        "on" | "enable" => Message::SetEnabled(true),
        "off" | "disable" => Message::SetEnabled(false),
        "r" | "refresh" => Message::RefreshToggle,
        "q" | "quit" => Message::Quit,
        _ => return StdinCommand::Unknown(trimmed.to_string()),
    };
    StdinCommand::Send(msg)
}

/// Read stdin until EOF or quit, forwarding commands (blocking; run on a thread)
pub fn spawn_stdin_reader_blocking(msg_tx: mpsc::Sender<Message>) {
    use std::io::BufRead;

    let stdin = std::io::stdin();
    let reader = stdin.lock();

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };

        match parse_command(&line) {
            StdinCommand::Send(msg) => {
                info!("Stdin: {:?}", msg);
                let quit = matches!(msg, Message::Quit);
                if msg_tx.blocking_send(msg).is_err() {
                    warn!("{}", Error::channel_send("engine is no longer listening"));
                    break;
                }
                if quit {
                    break;
                }
            }
            StdinCommand::Empty => {}
            StdinCommand::Unknown(cmd) => {
                warn!("Unknown stdin command: {}", cmd);
                eprintln!("commands: t|toggle, on|enable, off|disable, r|refresh, q|quit");
            }
        }
    }

    info!("Stdin reader exiting");
}
