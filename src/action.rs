//! The privileged reward-contract actions a user can submit.

use crate::error::{RewardError, RewardResult};
use crate::validation::{percentage_argument, validate_address};
use ethers::abi::Token;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prompt shown before a distribution is submitted.
pub const DISTRIBUTE_CONFIRMATION: &str =
    "Are you sure you want to distribute rewards to all eligible addresses?";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Add,
    Remove,
    Change,
    Distribute,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Add,
        ActionKind::Remove,
        ActionKind::Change,
        ActionKind::Distribute,
    ];

    /// Contract method invoked for this action.
    pub fn method_name(&self) -> &'static str {
        match self {
            ActionKind::Add => "addRewardAddress",
            ActionKind::Remove => "removeRewardAddress",
            ActionKind::Change => "changeRewardPercentage",
            ActionKind::Distribute => "distributeRewards",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Add => "add",
            ActionKind::Remove => "remove",
            ActionKind::Change => "change",
            ActionKind::Distribute => "distribute",
        }
    }

    pub fn button_label(&self) -> &'static str {
        match self {
            ActionKind::Add => "Add Reward Address",
            ActionKind::Remove => "Remove Reward Address",
            ActionKind::Change => "Change Reward Percentage",
            ActionKind::Distribute => "Distribute Rewards",
        }
    }

    /// Hint for the pending input field, `None` when the action takes no input.
    pub fn input_hint(&self) -> Option<&'static str> {
        match self {
            ActionKind::Add | ActionKind::Remove => Some("Enter address"),
            ActionKind::Change => Some("Enter new reward percentage"),
            ActionKind::Distribute => None,
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            ActionKind::Add => "Reward address added successfully.",
            ActionKind::Remove => "Reward address removed successfully.",
            ActionKind::Change => "Reward percentage updated successfully.",
            ActionKind::Distribute => "Rewards distributed successfully.",
        }
    }

    pub fn requires_confirmation(&self) -> bool {
        matches!(self, ActionKind::Distribute)
    }

    /// Validate the pending input and turn it into positional call arguments.
    ///
    /// Malformed input is a `Validation` error; a well-formed value the
    /// contract cannot take is a `Contract` error.
    pub fn call_args(&self, input: &str) -> RewardResult<Vec<Token>> {
        match self {
            ActionKind::Add | ActionKind::Remove => {
                Ok(vec![Token::Address(validate_address(input)?)])
            }
            ActionKind::Change => Ok(vec![Token::Uint(percentage_argument(input)?)]),
            ActionKind::Distribute => Ok(Vec::new()),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = RewardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RewardError::UnknownAction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::U256;

    #[test]
    fn test_method_names() {
        assert_eq!(ActionKind::Add.method_name(), "addRewardAddress");
        assert_eq!(ActionKind::Remove.method_name(), "removeRewardAddress");
        assert_eq!(ActionKind::Change.method_name(), "changeRewardPercentage");
        assert_eq!(ActionKind::Distribute.method_name(), "distributeRewards");
    }

    #[test]
    fn test_from_str_round_trips_names() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
        assert_eq!("Distribute".parse::<ActionKind>().unwrap(), ActionKind::Distribute);
    }

    #[test]
    fn test_from_str_unknown() {
        assert_eq!(
            "withdraw".parse::<ActionKind>(),
            Err(RewardError::UnknownAction("withdraw".into()))
        );
    }

    #[test]
    fn test_only_distribute_requires_confirmation() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.requires_confirmation(), kind == ActionKind::Distribute);
        }
    }

    #[test]
    fn test_call_args_change() {
        assert_eq!(
            ActionKind::Change.call_args("10").unwrap(),
            vec![Token::Uint(U256::from(10u64))]
        );
        assert_eq!(
            ActionKind::Change.call_args("1e2").unwrap(),
            vec![Token::Uint(U256::from(100u64))]
        );
        assert!(matches!(
            ActionKind::Change.call_args("10.5"),
            Err(RewardError::Contract(_))
        ));
    }

    #[test]
    fn test_call_args_distribute_ignores_input() {
        assert!(ActionKind::Distribute.call_args("whatever").unwrap().is_empty());
    }

    #[test]
    fn test_call_args_address_validation() {
        assert_eq!(
            ActionKind::Remove.call_args("not-an-address"),
            Err(RewardError::invalid_address())
        );
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&ActionKind::Change).unwrap(), "\"change\"");
    }
}
