//! Error taxonomy for the session and action controller.

use thiserror::Error;

/// Every failure the controller can report to a renderer.
///
/// The first four variants are the outcomes a user can run into during normal
/// use; the remaining ones are state guards that keep the action state machine
/// consistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewardError {
    /// No wallet provider is reachable (none configured or endpoint down).
    #[error("no wallet provider available")]
    ProviderUnavailable,
    /// The user declined account access or a confirmation prompt.
    #[error("request rejected by user")]
    UserRejected,
    /// Malformed input, caught before any network call.
    #[error("{0}")]
    Validation(String),
    /// The transaction was rejected by the provider or reverted on chain.
    #[error("transaction failed: {0}")]
    Transaction(String),
    /// A provider query other than a transaction failed.
    #[error("provider request failed: {0}")]
    Provider(String),
    /// Calldata could not be encoded for the bound contract.
    #[error("contract call encoding failed: {0}")]
    Contract(String),
    #[error("wallet is not connected")]
    NotConnected,
    #[error("wallet is already connected")]
    AlreadyConnected,
    #[error("no action selected")]
    NoActionSelected,
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    /// No tokio runtime to run the send on.
    #[error("no async runtime available to send the transaction")]
    NoRuntime,
}

impl RewardError {
    pub fn invalid_address() -> Self {
        RewardError::Validation("invalid address".to_string())
    }

    pub fn invalid_percentage() -> Self {
        RewardError::Validation("invalid percentage".to_string())
    }

    /// True for input errors, which leave the action state untouched.
    pub fn is_validation(&self) -> bool {
        matches!(self, RewardError::Validation(_))
    }
}

pub type RewardResult<T> = Result<T, RewardError>;
