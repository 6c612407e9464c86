use anyhow::{anyhow, Context, Result};
use ethers::providers::{Http, Provider};
use ethers::types::Address;
use std::env;
use std::time::Duration;
use url::Url;

pub const RPC_URL_VAR: &str = "REWARD_RPC_URL";
pub const CONTRACT_ADDRESS_VAR: &str = "REWARD_CONTRACT_ADDRESS";
pub const SIGNER_KEY_VAR: &str = "REWARD_SIGNER_KEY";
pub const CONFIRMATION_TIMEOUT_VAR: &str = "REWARD_CONFIRMATION_TIMEOUT_SECS";
pub const CONFIRMATIONS_VAR: &str = "REWARD_CONFIRMATIONS";

pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 90;
pub const DEFAULT_CONFIRMATIONS: usize = 1;

#[derive(Clone)]
pub struct Config {
    /// JSON-RPC endpoint; `None` means no wallet provider is available
    pub rpc_url: Option<String>,
    pub contract_address: Address,
    /// Hex private key for local signing. Without it the node signs.
    pub signer_key: Option<String>,
    pub confirmation_timeout_secs: u64,
    pub confirmations: usize,
}

impl Config {
    pub fn new(rpc_url: Option<String>, contract_address: Address) -> Self {
        Self {
            rpc_url,
            contract_address,
            signer_key: None,
            confirmation_timeout_secs: DEFAULT_CONFIRMATION_TIMEOUT_SECS,
            confirmations: DEFAULT_CONFIRMATIONS,
        }
    }

    /// Load from the process environment (call `dotenvy::dotenv()` first to
    /// pick up a `.env` file).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let contract_address = get(CONTRACT_ADDRESS_VAR)
            .ok_or_else(|| anyhow!("{} is not set", CONTRACT_ADDRESS_VAR))?
            .parse::<Address>()
            .map_err(|_| anyhow!("{} is not a valid address", CONTRACT_ADDRESS_VAR))?;

        let rpc_url = get(RPC_URL_VAR);
        if let Some(url) = &rpc_url {
            Url::parse(url).with_context(|| format!("{} is not a valid URL", RPC_URL_VAR))?;
        }

        let confirmation_timeout_secs = match get(CONFIRMATION_TIMEOUT_VAR) {
            Some(v) => v
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", CONFIRMATION_TIMEOUT_VAR))?,
            None => DEFAULT_CONFIRMATION_TIMEOUT_SECS,
        };

        let confirmations = match get(CONFIRMATIONS_VAR) {
            Some(v) => v
                .parse()
                .with_context(|| format!("{} must be a whole number", CONFIRMATIONS_VAR))?,
            None => DEFAULT_CONFIRMATIONS,
        };

        Ok(Self {
            rpc_url,
            contract_address,
            signer_key: get(SIGNER_KEY_VAR),
            confirmation_timeout_secs,
            confirmations,
        })
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    /// Build the JSON-RPC provider, or `None` when no endpoint is configured.
    pub fn get_provider(&self) -> Result<Option<Provider<Http>>> {
        match &self.rpc_url {
            Some(rpc_url) => {
                let url = Url::parse(rpc_url)?;
                Ok(Some(Provider::<Http>::try_from(url.as_str())?))
            }
            None => Ok(None),
        }
    }
}

// The signing key is never printed.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("rpc_url", &self.rpc_url)
            .field("contract_address", &self.contract_address)
            .field("signer_key", &self.signer_key.as_ref().map(|_| "<redacted>"))
            .field("confirmation_timeout_secs", &self.confirmation_timeout_secs)
            .field("confirmations", &self.confirmations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const CONTRACT: &str = "0x1111111111111111111111111111111111111111";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_minimal() {
        let config = Config::from_lookup(lookup(&[(CONTRACT_ADDRESS_VAR, CONTRACT)])).unwrap();
        assert_eq!(config.contract_address, CONTRACT.parse::<Address>().unwrap());
        assert!(config.rpc_url.is_none());
        assert!(config.signer_key.is_none());
        assert_eq!(config.confirmation_timeout_secs, DEFAULT_CONFIRMATION_TIMEOUT_SECS);
        assert_eq!(config.confirmations, DEFAULT_CONFIRMATIONS);
    }

    #[test]
    fn test_from_lookup_full() {
        let config = Config::from_lookup(lookup(&[
            (CONTRACT_ADDRESS_VAR, CONTRACT),
            (RPC_URL_VAR, "http://localhost:8545"),
            (SIGNER_KEY_VAR, "0xabc"),
            (CONFIRMATION_TIMEOUT_VAR, "30"),
            (CONFIRMATIONS_VAR, "2"),
        ]))
        .unwrap();
        assert_eq!(config.rpc_url.as_deref(), Some("http://localhost:8545"));
        assert_eq!(config.signer_key.as_deref(), Some("0xabc"));
        assert_eq!(config.confirmation_timeout(), Duration::from_secs(30));
        assert_eq!(config.confirmations, 2);
    }

    #[test]
    fn test_from_lookup_blank_rpc_is_unset() {
        let config = Config::from_lookup(lookup(&[
            (CONTRACT_ADDRESS_VAR, CONTRACT),
            (RPC_URL_VAR, "   "),
        ]))
        .unwrap();
        assert!(config.rpc_url.is_none());
    }

    #[test]
    fn test_from_lookup_missing_contract() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains(CONTRACT_ADDRESS_VAR));
    }

    #[test]
    fn test_from_lookup_invalid_contract() {
        let err = Config::from_lookup(lookup(&[(CONTRACT_ADDRESS_VAR, "0x1234")])).unwrap_err();
        assert!(err.to_string().contains("not a valid address"));
    }

    #[test]
    fn test_from_lookup_invalid_url() {
        let err = Config::from_lookup(lookup(&[
            (CONTRACT_ADDRESS_VAR, CONTRACT),
            (RPC_URL_VAR, "not a url"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(RPC_URL_VAR));
    }

    #[test]
    fn test_get_provider_none_without_rpc() {
        let config = Config::new(None, Address::zero());
        assert!(config.get_provider().unwrap().is_none());
    }

    #[test]
    fn test_get_provider_with_rpc() {
        let config = Config::new(Some("http://localhost:8545".into()), Address::zero());
        assert!(config.get_provider().unwrap().is_some());
    }

    #[test]
    fn test_debug_redacts_signer_key() {
        let mut config = Config::new(None, Address::zero());
        config.signer_key = Some("deadbeef".into());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("deadbeef"));
        assert!(debug.contains("<redacted>"));
    }
}
