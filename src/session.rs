//! The single wallet session record.
//!
//! A session is either fully connected or fully absent: every field lives in
//! one [`ConnectedSession`] behind a single `Option`, so replacing or clearing
//! it is atomic from a reader's point of view.

use crate::contract::RewardContract;
use crate::error::{RewardError, RewardResult};
use crate::gateway::ProviderHandle;
use ethers::types::Address;
use tracing::info;

#[derive(Clone)]
pub struct ConnectedSession {
    pub provider: ProviderHandle,
    pub account: Address,
    pub balance: String,
    pub chain_id: u64,
    pub network_label: String,
    pub contract: RewardContract,
}

impl std::fmt::Debug for ConnectedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectedSession")
            .field("account", &self.account)
            .field("balance", &self.balance)
            .field("chain_id", &self.chain_id)
            .field("network_label", &self.network_label)
            .field("contract", &self.contract.address())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    current: Option<ConnectedSession>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disconnected -> connected. Refused while a session is open.
    pub fn open(&mut self, session: ConnectedSession) -> RewardResult<()> {
        if self.current.is_some() {
            return Err(RewardError::AlreadyConnected);
        }
        info!(
            "Session opened for {:?} on {} (chain {})",
            session.account, session.network_label, session.chain_id
        );
        self.current = Some(session);
        Ok(())
    }

    /// Connected -> disconnected. Refused when nothing is open.
    pub fn close(&mut self) -> RewardResult<()> {
        match self.current.take() {
            Some(session) => {
                info!("Session closed for {:?}", session.account);
                Ok(())
            }
            None => Err(RewardError::NotConnected),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&ConnectedSession> {
        self.current.as_ref()
    }

    pub fn provider(&self) -> Option<&ProviderHandle> {
        self.current.as_ref().map(|s| &s.provider)
    }

    pub fn account(&self) -> Option<Address> {
        self.current.as_ref().map(|s| s.account)
    }

    pub fn balance(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.balance.as_str())
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.current.as_ref().map(|s| s.chain_id)
    }

    pub fn network_label(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.network_label.as_str())
    }

    pub fn contract(&self) -> Option<&RewardContract> {
        self.current.as_ref().map(|s| &s.contract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::FakeGateway;
    use std::sync::Arc;

    fn connected(account: Address, label: &str) -> ConnectedSession {
        ConnectedSession {
            provider: Arc::new(FakeGateway::new()),
            account,
            balance: "1.5".into(),
            chain_id: 137,
            network_label: label.into(),
            contract: RewardContract::new(Address::repeat_byte(0x11)).unwrap(),
        }
    }

    fn assert_all_absent(state: &SessionState) {
        assert!(!state.is_connected());
        assert!(state.provider().is_none());
        assert!(state.account().is_none());
        assert!(state.balance().is_none());
        assert!(state.chain_id().is_none());
        assert!(state.network_label().is_none());
        assert!(state.contract().is_none());
    }

    #[test]
    fn test_new_session_is_disconnected() {
        assert_all_absent(&SessionState::new());
    }

    #[test]
    fn test_open_sets_every_field() {
        let mut state = SessionState::new();
        let account = Address::repeat_byte(0xab);
        state.open(connected(account, "Polygon Mainnet")).unwrap();

        assert!(state.is_connected());
        assert!(state.provider().is_some());
        assert_eq!(state.account(), Some(account));
        assert_eq!(state.balance(), Some("1.5"));
        assert_eq!(state.chain_id(), Some(137));
        assert_eq!(state.network_label(), Some("Polygon Mainnet"));
        assert_eq!(
            state.contract().map(|c| c.address()),
            Some(Address::repeat_byte(0x11))
        );
    }

    #[test]
    fn test_close_clears_every_field() {
        let mut state = SessionState::new();
        state.open(connected(Address::repeat_byte(0xab), "Polygon Mainnet")).unwrap();
        state.close().unwrap();
        assert_all_absent(&state);
    }

    #[test]
    fn test_open_while_connected_is_refused() {
        let mut state = SessionState::new();
        let first = Address::repeat_byte(0x01);
        state.open(connected(first, "Polygon Mainnet")).unwrap();

        let err = state
            .open(connected(Address::repeat_byte(0x02), "Ethereum Mainnet"))
            .unwrap_err();
        assert_eq!(err, RewardError::AlreadyConnected);
        // The original session is untouched
        assert_eq!(state.account(), Some(first));
        assert_eq!(state.network_label(), Some("Polygon Mainnet"));
    }

    #[test]
    fn test_close_while_disconnected_is_refused() {
        let mut state = SessionState::new();
        assert_eq!(state.close(), Err(RewardError::NotConnected));
        assert_all_absent(&state);
    }

    #[test]
    fn test_reopen_after_close() {
        let mut state = SessionState::new();
        state.open(connected(Address::repeat_byte(0x01), "Polygon Mainnet")).unwrap();
        state.close().unwrap();
        state.open(connected(Address::repeat_byte(0x02), "Mumbai Testnet")).unwrap();
        assert_eq!(state.account(), Some(Address::repeat_byte(0x02)));
        assert_eq!(state.network_label(), Some("Mumbai Testnet"));
    }
}
