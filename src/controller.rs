//! Session and action-submission controller.
//!
//! Owns the wallet [`SessionState`] and the action state machine
//! (selection × pending input × submission status). A renderer forwards user
//! intents to the methods here and re-reads the accessors afterwards; every
//! outcome is also reported to the [`NotificationSink`].
//!
//! ```text
//! none/idle --select--> kind/idle --input--> kind/idle
//! kind/idle --submit(valid)--> kind/in-flight --resolve--> none/idle
//! kind/idle --submit(invalid)--> kind/idle
//! ```

use crate::action::{ActionKind, DISTRIBUTE_CONFIRMATION};
use crate::async_job::AsyncJob;
use crate::contract::RewardContract;
use crate::error::{RewardError, RewardResult};
use crate::gateway::{ProviderGateway, SubmissionReceipt};
use crate::network::network_label;
use crate::notifications::{Notification, NotificationSink};
use crate::session::{ConnectedSession, SessionState};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

/// Yes/no question put to the user before an irreversible action.
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

struct InFlightSubmission {
    action: ActionKind,
    job: AsyncJob<SubmissionReceipt>,
}

pub struct RewardController {
    gateway: Arc<dyn ProviderGateway>,
    contract: RewardContract,
    sink: Arc<dyn NotificationSink>,
    prompt: Box<dyn ConfirmPrompt + Send>,
    session: SessionState,
    selection: Option<ActionKind>,
    pending_input: String,
    status: SubmissionStatus,
    in_flight: Option<InFlightSubmission>,
    runtime: Option<Handle>,
}

impl RewardController {
    /// Build a controller. Submissions run on the tokio runtime current at
    /// this point, if any; see [`with_runtime`](RewardController::with_runtime).
    pub fn new(
        gateway: Arc<dyn ProviderGateway>,
        contract: RewardContract,
        sink: Arc<dyn NotificationSink>,
        prompt: Box<dyn ConfirmPrompt + Send>,
    ) -> Self {
        Self {
            gateway,
            contract,
            sink,
            prompt,
            session: SessionState::new(),
            selection: None,
            pending_input: String::new(),
            status: SubmissionStatus::Idle,
            in_flight: None,
            runtime: Handle::try_current().ok(),
        }
    }

    /// Run submissions on `runtime`, so `submit` works from threads outside
    /// any runtime context.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn selection(&self) -> Option<ActionKind> {
        self.selection
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn is_in_flight(&self) -> bool {
        self.status == SubmissionStatus::InFlight
    }

    /// Request wallet access and open the session.
    pub async fn connect(&mut self) -> RewardResult<()> {
        if self.session.is_connected() {
            return Err(self.reject(RewardError::AlreadyConnected));
        }

        let connection = match self.gateway.connect().await {
            Ok(connection) => connection,
            Err(RewardError::ProviderUnavailable) => {
                self.sink.notify(Notification::ProviderUnavailable);
                return Err(RewardError::ProviderUnavailable);
            }
            Err(e) => {
                warn!("Failed to connect wallet: {}", e);
                self.sink.notify(Notification::ConnectionFailed {
                    detail: e.to_string(),
                });
                return Err(e);
            }
        };

        let network = network_label(connection.chain_id).to_string();
        self.session.open(ConnectedSession {
            provider: self.gateway.clone(),
            account: connection.account,
            balance: connection.balance,
            chain_id: connection.chain_id,
            network_label: network.clone(),
            contract: self.contract.clone(),
        })?;
        self.reset_action();

        self.sink.notify(Notification::Connected {
            account: connection.account,
            network,
        });
        Ok(())
    }

    /// Close the session. Refused while a submission is in flight.
    pub fn disconnect(&mut self) -> RewardResult<()> {
        if self.is_in_flight() {
            return Err(self.reject(RewardError::SubmissionInFlight));
        }
        if let Err(e) = self.session.close() {
            return Err(self.reject(e));
        }
        self.reset_action();
        self.sink.notify(Notification::Disconnected);
        Ok(())
    }

    /// Make `kind` the active action, discarding any pending input.
    pub fn select_action(&mut self, kind: ActionKind) -> RewardResult<()> {
        if self.is_in_flight() {
            debug!("Ignoring selection of {} while a submission is in flight", kind);
            return Err(self.reject(RewardError::SubmissionInFlight));
        }
        if !self.session.is_connected() {
            return Err(self.reject(RewardError::NotConnected));
        }
        self.selection = Some(kind);
        self.pending_input.clear();
        self.status = SubmissionStatus::Idle;
        debug!("Selected action {}", kind);
        Ok(())
    }

    /// Replace the pending input verbatim.
    pub fn set_pending_input(&mut self, text: impl Into<String>) -> RewardResult<()> {
        if self.is_in_flight() {
            return Err(self.reject(RewardError::SubmissionInFlight));
        }
        if self.selection.is_none() {
            return Err(self.reject(RewardError::NoActionSelected));
        }
        self.pending_input = text.into();
        Ok(())
    }

    /// Validate the pending input and dispatch the selected contract call.
    ///
    /// `Ok` means the call is in flight; resolve it with [`poll`] or
    /// [`wait_for_submission`]. A value that passes validation but cannot be
    /// encoded for the contract completes at once as a failed submission.
    ///
    /// [`poll`]: RewardController::poll
    /// [`wait_for_submission`]: RewardController::wait_for_submission
    pub fn submit(&mut self) -> RewardResult<()> {
        if self.is_in_flight() {
            warn!("Submission rejected: another submission is in flight");
            return Err(self.reject(RewardError::SubmissionInFlight));
        }

        let (Some(provider), Some(contract), Some(from)) = (
            self.session.provider().cloned(),
            self.session.contract().cloned(),
            self.session.account(),
        ) else {
            self.sink.notify(Notification::ActionRejected {
                message: "Contract is not loaded.".to_string(),
            });
            return Err(RewardError::NotConnected);
        };

        let Some(action) = self.selection else {
            self.sink.notify(Notification::ActionRejected {
                message: "No valid action selected.".to_string(),
            });
            return Err(RewardError::NoActionSelected);
        };

        let args = match action.call_args(&self.pending_input) {
            Ok(args) => args,
            Err(e) if e.is_validation() => {
                self.sink.notify(Notification::ValidationError {
                    message: e.to_string(),
                });
                return Err(e);
            }
            Err(e) => {
                self.complete(action, Err(e.clone()));
                return Err(e);
            }
        };

        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            warn!("Cannot send {}: no tokio runtime", action.method_name());
            return Err(self.reject(RewardError::NoRuntime));
        };

        if action.requires_confirmation() && !self.prompt.confirm(DISTRIBUTE_CONFIRMATION) {
            info!("{} declined at confirmation", action);
            return Err(RewardError::UserRejected);
        }

        info!("Submitting {} from {:?}", action.method_name(), from);
        let job = AsyncJob::spawn_on(&runtime, async move {
            provider
                .send(&contract, action.method_name(), args, from)
                .await
        });
        self.in_flight = Some(InFlightSubmission { action, job });
        self.status = SubmissionStatus::InFlight;
        Ok(())
    }

    /// Resolve the in-flight submission if it has finished.
    ///
    /// Returns the terminal status (`Succeeded` or `Failed`) once, after
    /// which the controller is back at none/idle.
    pub fn poll(&mut self) -> Option<SubmissionStatus> {
        let in_flight = self.in_flight.as_mut()?;
        let result = in_flight.job.poll()?;
        let action = in_flight.action;
        Some(self.complete(action, result))
    }

    /// Wait for the in-flight submission, if any, and resolve it.
    pub async fn wait_for_submission(&mut self) -> Option<SubmissionStatus> {
        let in_flight = self.in_flight.as_mut()?;
        let result = in_flight.job.wait().await?;
        let action = in_flight.action;
        Some(self.complete(action, result))
    }

    fn complete(
        &mut self,
        action: ActionKind,
        result: RewardResult<SubmissionReceipt>,
    ) -> SubmissionStatus {
        self.in_flight = None;
        let terminal = match result {
            Ok(receipt) => {
                self.status = SubmissionStatus::Succeeded;
                info!(
                    "{} confirmed in block {:?}: {:?}",
                    action.method_name(),
                    receipt.block_number,
                    receipt.tx_hash
                );
                self.sink.notify(Notification::TransactionSuccess {
                    action,
                    tx_hash: receipt.tx_hash,
                });
                SubmissionStatus::Succeeded
            }
            Err(e) => {
                self.status = SubmissionStatus::Failed;
                warn!("{} failed: {}", action.method_name(), e);
                self.sink.notify(Notification::TransactionFailure {
                    action,
                    detail: e.to_string(),
                });
                SubmissionStatus::Failed
            }
        };
        // Always back to none/idle, success or not
        self.reset_action();
        terminal
    }

    /// Report a refused intent to the sink and hand the error back.
    fn reject(&self, error: RewardError) -> RewardError {
        debug!("Refused: {}", error);
        self.sink.notify(Notification::ActionRejected {
            message: error.to_string(),
        });
        error
    }

    fn reset_action(&mut self) {
        self.selection = None;
        self.pending_input.clear();
        self.status = SubmissionStatus::Idle;
    }
}
