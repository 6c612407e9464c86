//! Notification events and the sink the controller reports them to.

use crate::action::ActionKind;
use crate::utils::short_hex;
use ethers::types::{Address, TxHash};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Outcome events reported by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    Connected { account: Address, network: String },
    Disconnected,
    ProviderUnavailable,
    ConnectionFailed { detail: String },
    ValidationError { message: String },
    /// An intent refused by a state guard (not connected, nothing selected).
    ActionRejected { message: String },
    TransactionSuccess { action: ActionKind, tx_hash: TxHash },
    TransactionFailure { action: ActionKind, detail: String },
}

impl Notification {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notification::ProviderUnavailable
                | Notification::ConnectionFailed { .. }
                | Notification::ValidationError { .. }
                | Notification::ActionRejected { .. }
                | Notification::TransactionFailure { .. }
        )
    }

    /// Text shown to the user.
    pub fn message(&self) -> String {
        match self {
            Notification::Connected { account, network } => format!(
                "Wallet connected successfully! {} on {}",
                short_hex(&format!("{:?}", account)),
                network
            ),
            Notification::Disconnected => "Wallet disconnected.".to_string(),
            Notification::ProviderUnavailable => {
                "No wallet provider found. Configure an RPC endpoint to use this app.".to_string()
            }
            Notification::ConnectionFailed { detail } => {
                format!("Failed to connect wallet: {}", detail)
            }
            Notification::ValidationError { message } => format!("Validation error: {}", message),
            Notification::ActionRejected { message } => message.clone(),
            Notification::TransactionSuccess { action, tx_hash } => {
                format!("{} (tx {:?})", action.success_message(), tx_hash)
            }
            Notification::TransactionFailure { action, detail } => {
                format!("Failed to {}: {}", action.button_label().to_lowercase(), detail)
            }
        }
    }
}

/// Receiver of controller outcome events (toast surface, log, ...).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// A notification entry with message and timestamp
#[derive(Debug, Clone)]
pub struct NotificationEntry {
    pub notification: Notification,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl NotificationEntry {
    pub fn new(notification: Notification) -> Self {
        Self {
            notification,
            timestamp: chrono::Local::now(),
        }
    }

    pub fn message(&self) -> String {
        self.notification.message()
    }

    pub fn time_ago(&self) -> String {
        let now = chrono::Local::now();
        let duration = now.signed_duration_since(self.timestamp);
        if duration.num_seconds() < 60 {
            "just now".to_string()
        } else if duration.num_minutes() < 60 {
            format!("{}m ago", duration.num_minutes())
        } else if duration.num_hours() < 24 {
            format!("{}h ago", duration.num_hours())
        } else {
            self.timestamp.format("%m/%d %H:%M").to_string()
        }
    }
}

/// In-memory sink keeping every entry until it is drained.
#[derive(Default)]
pub struct NotificationLog {
    entries: Mutex<VecDeque<NotificationEntry>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return all pending entries, oldest first.
    pub fn drain(&self) -> Vec<NotificationEntry> {
        match self.entries.lock() {
            Ok(mut entries) => entries.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }

    /// Notifications currently held, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        match self.entries.lock() {
            Ok(entries) => entries.iter().map(|e| e.notification.clone()).collect(),
            Err(poisoned) => poisoned
                .into_inner()
                .iter()
                .map(|e| e.notification.clone())
                .collect(),
        }
    }
}

impl NotificationSink for NotificationLog {
    fn notify(&self, notification: Notification) {
        if notification.is_error() {
            tracing::warn!("{}", notification.message());
        } else {
            tracing::info!("{}", notification.message());
        }
        let entry = NotificationEntry::new(notification);
        match self.entries.lock() {
            Ok(mut entries) => entries.push_back(entry),
            Err(poisoned) => poisoned.into_inner().push_back(entry),
        }
    }
}
