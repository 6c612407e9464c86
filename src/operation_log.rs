use crate::action::ActionKind;
use crate::notifications::Notification;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Log file name
const OPERATION_LOG_FILE: &str = "operation_log.jsonl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Succeeded,
    Failed,
}

/// One submitted contract call and how it ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub timestamp: DateTime<Utc>,
    pub chain_id: Option<u64>,
    pub action: ActionKind,
    pub method: String,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl OperationRecord {
    /// Build a record from a transaction outcome; `None` for other events.
    pub fn from_notification(notification: &Notification, chain_id: Option<u64>) -> Option<Self> {
        let (action, outcome, tx_hash, detail) = match notification {
            Notification::TransactionSuccess { action, tx_hash } => {
                (*action, Outcome::Succeeded, Some(format!("{:?}", tx_hash)), None)
            }
            Notification::TransactionFailure { action, detail } => {
                (*action, Outcome::Failed, None, Some(detail.clone()))
            }
            _ => return None,
        };
        Some(Self {
            timestamp: Utc::now(),
            chain_id,
            action,
            method: action.method_name().to_string(),
            outcome,
            tx_hash,
            detail,
        })
    }
}

/// Get the directory where app data is stored
fn app_data_dir() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        let app_dir = config_dir.join("reward-console");
        if !app_dir.exists() {
            let _ = fs::create_dir_all(&app_dir);
        }
        app_dir
    } else {
        // Fall back to current directory
        PathBuf::from(".")
    }
}

/// Get the full path to the operation log file
pub fn log_path() -> PathBuf {
    app_data_dir().join(OPERATION_LOG_FILE)
}

/// Append a record to the default log.
pub fn append_record(record: &OperationRecord) -> Result<()> {
    append_record_to(&log_path(), record)
}

/// Append a record as one JSON line to `path`.
pub fn append_record_to(path: &Path, record: &OperationRecord) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let line = serde_json::to_string(record)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open operation log {:?}", path))?;
    writeln!(file, "{}", line)?;
    Ok(())
}

/// Read every record from the default log.
pub fn read_log() -> Result<Vec<OperationRecord>> {
    read_log_from(&log_path())
}

/// Read every record from `path`; a missing file is an empty log. Blank
/// lines are skipped.
pub fn read_log_from(path: &Path) -> Result<Vec<OperationRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Malformed operation log entry on line {}", i + 1))
        })
        .collect()
}
