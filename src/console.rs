//! Line-oriented terminal front end.
//!
//! Reads one command per line, forwards it to the [`RewardController`] and
//! prints the resulting notifications and state. No business rules live here.

use crate::action::ActionKind;
use crate::config::Config;
use crate::contract::RewardContract;
use crate::controller::{ConfirmPrompt, RewardController, SubmissionStatus};
use crate::error::RewardError;
use crate::gateway::EthersGateway;
use crate::notifications::{NotificationLog, NotificationSink};
use crate::operation_log::{self, OperationRecord};
use anyhow::{anyhow, Result};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tokio::runtime::Builder;

pub const HELP: &str = "\
Commands:
  connect              connect the wallet
  disconnect           disconnect the wallet
  select <action>      add | remove | change | distribute
  input <text>         set the pending input (address or percentage)
  submit               submit the selected action
  status               show wallet and action state
  log                  show the operation log
  help                 show this help
  quit                 exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect,
    Disconnect,
    Select(ActionKind),
    Input(String),
    Submit,
    Status,
    Log,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        if trimmed.trim().is_empty() {
            return Ok(None);
        }
        let (word, rest) = match trimmed.split_once(' ') {
            Some((word, rest)) => (word, rest),
            None => (trimmed, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "connect" => Command::Connect,
            "disconnect" => Command::Disconnect,
            "select" => {
                let kind = rest
                    .trim()
                    .parse::<ActionKind>()
                    .map_err(|e| anyhow!("{} (expected add, remove, change or distribute)", e))?;
                Command::Select(kind)
            }
            // Everything after the first space is kept verbatim
            "input" => Command::Input(rest.to_string()),
            "submit" => Command::Submit,
            "status" => Command::Status,
            "log" => Command::Log,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(anyhow!("unknown command '{}', try 'help'", other)),
        };
        Ok(Some(command))
    }
}

/// Asks yes/no questions on stdin.
pub struct StdinPrompt;

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        print!("{} [y/N] ", message);
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Render the wallet and action state.
pub fn render_status(controller: &RewardController) -> String {
    let session = controller.session();
    let mut out = String::new();
    match (session.account(), session.balance(), session.network_label()) {
        (Some(account), Some(balance), Some(network)) => {
            out.push_str(&format!("Connected Wallet: {:?}\n", account));
            out.push_str(&format!("Balance: {} ETH\n", balance));
            out.push_str(&format!("Network: {}\n", network));
        }
        _ => out.push_str("Wallet not connected\n"),
    }
    match controller.selection() {
        Some(kind) => {
            out.push_str(&format!("Action: {}\n", kind.button_label()));
            if let Some(hint) = kind.input_hint() {
                out.push_str(&format!("{}: {}\n", hint, controller.pending_input()));
            }
        }
        None => out.push_str("Action: none\n"),
    }
    let status = match controller.status() {
        SubmissionStatus::Idle => "idle",
        SubmissionStatus::InFlight => "processing...",
        SubmissionStatus::Succeeded => "succeeded",
        SubmissionStatus::Failed => "failed",
    };
    out.push_str(&format!("Status: {}", status));
    out
}

fn flush_notifications(log: &NotificationLog, chain_id: Option<u64>) {
    for entry in log.drain() {
        println!("[{}] {}", entry.time_ago(), entry.message());
        if let Some(record) = OperationRecord::from_notification(&entry.notification, chain_id) {
            if let Err(e) = operation_log::append_record(&record) {
                tracing::warn!("Failed to write operation log: {}", e);
            }
        }
    }
}

/// Run the console until `quit` or end of input.
pub fn launch(config: Config) -> Result<()> {
    let runtime = Builder::new_multi_thread().enable_all().build()?;

    let gateway = Arc::new(EthersGateway::from_config(&config)?);
    let contract = RewardContract::new(config.contract_address)?;
    let log = Arc::new(NotificationLog::new());
    let sink: Arc<dyn NotificationSink> = log.clone();
    let mut controller = RewardController::new(gateway, contract, sink, Box::new(StdinPrompt))
        .with_runtime(runtime.handle().clone());

    println!("Reward Console v{}", env!("CARGO_PKG_VERSION"));
    println!("Contract: {:?}", config.contract_address);
    println!("{}", HELP);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        // Captured before the command so a disconnect still logs the chain
        let chain_id = controller.session().chain_id();
        let result: Result<(), RewardError> = match command {
            Command::Connect => runtime.block_on(controller.connect()),
            Command::Disconnect => controller.disconnect(),
            Command::Select(kind) => controller.select_action(kind),
            Command::Input(text) => controller.set_pending_input(text),
            Command::Submit => match controller.submit() {
                Ok(()) => {
                    println!("Processing...");
                    runtime.block_on(controller.wait_for_submission());
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Command::Status => {
                println!("{}", render_status(&controller));
                Ok(())
            }
            Command::Log => {
                match operation_log::read_log() {
                    Ok(records) if records.is_empty() => println!("Operation log is empty"),
                    Ok(records) => {
                        for r in records {
                            println!(
                                "{} {:?} {} {}",
                                r.timestamp.to_rfc3339(),
                                r.outcome,
                                r.method,
                                r.tx_hash.or(r.detail).unwrap_or_default()
                            );
                        }
                    }
                    Err(e) => println!("Failed to read operation log: {}", e),
                }
                Ok(())
            }
            Command::Help => {
                println!("{}", HELP);
                Ok(())
            }
            Command::Quit => break,
        };

        let chain_id = controller.session().chain_id().or(chain_id);
        flush_notifications(&log, chain_id);
        // Everything but a declined confirmation was reported as a notification
        match result {
            Err(RewardError::UserRejected) => println!("Cancelled."),
            Err(e) => tracing::debug!("Command refused: {}", e),
            Ok(()) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::FakeGateway;
    use ethers::types::Address;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("connect").unwrap(), Some(Command::Connect));
        assert_eq!(Command::parse("DISCONNECT\n").unwrap(), Some(Command::Disconnect));
        assert_eq!(Command::parse("submit").unwrap(), Some(Command::Submit));
        assert_eq!(Command::parse("exit").unwrap(), Some(Command::Quit));
        assert_eq!(Command::parse("?").unwrap(), Some(Command::Help));
    }

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(Command::parse("   \n").unwrap(), None);
        assert_eq!(Command::parse("").unwrap(), None);
    }

    #[test]
    fn test_parse_select() {
        assert_eq!(
            Command::parse("select distribute").unwrap(),
            Some(Command::Select(ActionKind::Distribute))
        );
        assert!(Command::parse("select withdraw").is_err());
        assert!(Command::parse("select").is_err());
    }

    #[test]
    fn test_parse_input_keeps_text_verbatim() {
        assert_eq!(
            Command::parse("input  10 \n").unwrap(),
            Some(Command::Input(" 10 ".into()))
        );
        assert_eq!(Command::parse("input").unwrap(), Some(Command::Input(String::new())));
    }

    #[test]
    fn test_parse_unknown_command() {
        let err = Command::parse("withdraw all").unwrap_err();
        assert!(err.to_string().contains("unknown command 'withdraw'"));
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("n"));
        assert!(!is_yes(""));
    }

    #[tokio::test]
    async fn test_render_status() {
        let contract = RewardContract::new(Address::repeat_byte(0x11)).unwrap();
        let mut controller = RewardController::new(
            Arc::new(FakeGateway::new()),
            contract,
            Arc::new(NotificationLog::new()),
            Box::new(StdinPrompt),
        );
        assert!(render_status(&controller).starts_with("Wallet not connected"));

        controller.connect().await.unwrap();
        controller.select_action(ActionKind::Change).unwrap();
        controller.set_pending_input("10").unwrap();
        let status = render_status(&controller);
        assert!(status.contains("Balance: 1.5 ETH"));
        assert!(status.contains("Network: Polygon Mainnet"));
        assert!(status.contains("Action: Change Reward Percentage"));
        assert!(status.contains("Enter new reward percentage: 10"));
        assert!(status.ends_with("Status: idle"));
    }
}
