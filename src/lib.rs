//! Reward Console: wallet session and action-submission controller for an
//! EVM reward-distribution contract.
//!
//! ## Module Structure
//!
//! - `controller` - session + action state machine, the crate's core
//! - `gateway` - provider gateway trait and the ethers-rs implementation
//! - `session` - the all-or-nothing wallet session record
//! - `network` - chain id to network label
//! - `action` / `validation` - the four contract actions and their input rules
//! - `contract` - reward contract ABI binding
//! - `notifications` / `operation_log` - outcome reporting
//! - `console` - terminal front end
//!
//! ## Usage
//!
//! ```no_run
//! use reward_console::config::Config;
//! use reward_console::console;
//!
//! let config = Config::from_env().expect("REWARD_CONTRACT_ADDRESS must be set");
//! console::launch(config).expect("Console failed");
//! ```

pub mod action;
pub mod async_job;
pub mod config;
pub mod console;
pub mod contract;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod network;
pub mod notifications;
pub mod operation_log;
pub mod session;
pub mod utils;
pub mod validation;

pub use action::ActionKind;
pub use controller::{ConfirmPrompt, RewardController, SubmissionStatus};
pub use error::{RewardError, RewardResult};
pub use gateway::{EthersGateway, ProviderGateway};
pub use notifications::{Notification, NotificationSink};
