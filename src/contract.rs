//! Binding to the deployed reward contract: its address plus the ABI of the
//! methods this crate calls.

use crate::action::ActionKind;
use crate::error::{RewardError, RewardResult};
use ethers::abi::{parse_abi, Abi, Token};
use ethers::prelude::*;
use std::sync::Arc;

/// Human-readable signatures of the reward contract's privileged methods.
pub const REWARD_CONTRACT_ABI: &[&str] = &[
    "function addRewardAddress(address account)",
    "function removeRewardAddress(address account)",
    "function changeRewardPercentage(uint256 percentage)",
    "function distributeRewards()",
];

/// Typed handle to the reward contract. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RewardContract {
    address: Address,
    abi: Arc<Abi>,
}

impl RewardContract {
    pub fn new(address: Address) -> RewardResult<Self> {
        let abi = parse_abi(REWARD_CONTRACT_ABI)
            .map_err(|e| RewardError::Contract(format!("invalid ABI: {}", e)))?;
        let contract = Self {
            address,
            abi: Arc::new(abi),
        };
        // Every action must map onto a bound method
        if let Some(kind) = ActionKind::ALL
            .into_iter()
            .find(|kind| !contract.has_method(kind.method_name()))
        {
            return Err(RewardError::Contract(format!(
                "ABI has no method '{}'",
                kind.method_name()
            )));
        }
        Ok(contract)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.abi.function(method).is_ok()
    }

    /// Encode calldata for `method` with positional `args`.
    pub fn encode_call(&self, method: &str, args: &[Token]) -> RewardResult<Bytes> {
        let function = self
            .abi
            .function(method)
            .map_err(|_| RewardError::Contract(format!("unknown method '{}'", method)))?;
        let data = function
            .encode_input(args)
            .map_err(|e| RewardError::Contract(format!("{}: {}", method, e)))?;
        Ok(data.into())
    }
}
