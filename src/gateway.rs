//! Provider gateway: the controller's only route to the wallet and the chain.
//!
//! [`ProviderGateway`] is injected into the controller so tests can swap in a
//! fake. [`EthersGateway`] talks JSON-RPC through ethers-rs, signing either
//! with a locally configured key or through the node's own accounts.

use crate::config::Config;
use crate::contract::RewardContract;
use crate::error::{RewardError, RewardResult};
use crate::utils;
use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::abi::Token;
use ethers::prelude::*;
use ethers::providers::{Http, JsonRpcClient, Provider, RpcError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// JSON-RPC code for a request the user declined in their wallet (EIP-1193).
const USER_REJECTED_CODE: i64 = 4001;
/// JSON-RPC code for an unimplemented method.
const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// What a successful `connect` learns about the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub account: Address,
    /// Balance in ether display units, e.g. "1.5"
    pub balance: String,
    pub chain_id: u64,
}

/// A mined contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Request account access and snapshot balance and chain id.
    async fn connect(&self) -> RewardResult<Connection>;

    /// Invoke `method` on `contract` as a transaction from `from`, resolving
    /// once it is mined.
    async fn send(
        &self,
        contract: &RewardContract,
        method: &str,
        args: Vec<Token>,
        from: Address,
    ) -> RewardResult<SubmissionReceipt>;

    /// Current balance in ether display units.
    async fn query_balance(&self, address: Address) -> RewardResult<String>;
}

/// Shared handle to the gateway a session was opened with.
pub type ProviderHandle = Arc<dyn ProviderGateway>;

/// Gateway over any ethers JSON-RPC transport; HTTP in production.
pub struct EthersGateway<P = Http> {
    provider: Option<Provider<P>>,
    signer: Option<LocalWallet>,
    confirmations: usize,
    confirmation_timeout: Duration,
}

impl EthersGateway<Http> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = config.get_provider()?;
        let signer = match &config.signer_key {
            Some(key) => Some(
                key.trim_start_matches("0x")
                    .parse::<LocalWallet>()
                    .context("signing key is not a valid private key")?,
            ),
            None => None,
        };
        if provider.is_none() {
            warn!("No RPC endpoint configured; connect will report no provider");
        }
        Ok(Self {
            provider,
            signer,
            confirmations: config.confirmations,
            confirmation_timeout: config.confirmation_timeout(),
        })
    }
}

impl<P: JsonRpcClient + Clone + 'static> EthersGateway<P> {
    pub fn new(provider: Option<Provider<P>>, signer: Option<LocalWallet>) -> Self {
        Self {
            provider,
            signer,
            confirmations: crate::config::DEFAULT_CONFIRMATIONS,
            confirmation_timeout: Duration::from_secs(crate::config::DEFAULT_CONFIRMATION_TIMEOUT_SECS),
        }
    }

    fn provider(&self) -> RewardResult<&Provider<P>> {
        self.provider.as_ref().ok_or(RewardError::ProviderUnavailable)
    }

    /// Accounts the wallet authorizes. A local signer authorizes exactly its
    /// own address.
    async fn request_accounts(&self, provider: &Provider<P>) -> RewardResult<Vec<Address>> {
        if let Some(signer) = &self.signer {
            return Ok(vec![signer.address()]);
        }

        match provider.request::<_, Vec<Address>>("eth_requestAccounts", ()).await {
            Ok(accounts) => Ok(accounts),
            Err(e) => match RpcError::as_error_response(&e).map(|r| r.code) {
                Some(USER_REJECTED_CODE) => Err(RewardError::UserRejected),
                Some(METHOD_NOT_FOUND_CODE) => {
                    debug!("eth_requestAccounts unsupported, falling back to eth_accounts");
                    provider
                        .get_accounts()
                        .await
                        .map_err(|e| RewardError::Provider(e.to_string()))
                }
                _ => Err(RewardError::Provider(e.to_string())),
            },
        }
    }

    async fn submit_with<M: Middleware>(
        &self,
        client: &M,
        tx: TransactionRequest,
    ) -> RewardResult<SubmissionReceipt> {
        let pending = client
            .send_transaction(tx, None)
            .await
            .map_err(|e| RewardError::Transaction(e.to_string()))?;
        let tx_hash = *pending;
        info!("Transaction sent: {:?}", tx_hash);

        let receipt = tokio::time::timeout(
            self.confirmation_timeout,
            pending.confirmations(self.confirmations),
        )
        .await
        .map_err(|_| {
            RewardError::Transaction(format!(
                "timed out after {}s waiting for {:?}",
                self.confirmation_timeout.as_secs(),
                tx_hash
            ))
        })?
        .map_err(|e| RewardError::Transaction(e.to_string()))?
        .ok_or_else(|| RewardError::Transaction(format!("transaction {:?} was dropped", tx_hash)))?;

        if receipt.status == Some(U64::zero()) {
            return Err(RewardError::Transaction("transaction reverted".to_string()));
        }

        Ok(SubmissionReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number.map(|b| b.as_u64()),
        })
    }
}

#[async_trait]
impl<P: JsonRpcClient + Clone + 'static> ProviderGateway for EthersGateway<P> {
    async fn connect(&self) -> RewardResult<Connection> {
        let provider = self.provider()?;

        let chain_id = provider.get_chainid().await.map_err(|e| {
            warn!("Provider unreachable: {}", e);
            RewardError::ProviderUnavailable
        })?;

        let accounts = self.request_accounts(provider).await?;
        let account = *accounts.first().ok_or(RewardError::UserRejected)?;
        let balance = self.query_balance(account).await?;

        info!("Connected {:?} on chain {}", account, chain_id);
        Ok(Connection {
            account,
            balance,
            chain_id: chain_id.as_u64(),
        })
    }

    async fn send(
        &self,
        contract: &RewardContract,
        method: &str,
        args: Vec<Token>,
        from: Address,
    ) -> RewardResult<SubmissionReceipt> {
        let provider = self.provider()?;
        let calldata = contract.encode_call(method, &args)?;
        let tx = TransactionRequest::new()
            .to(contract.address())
            .from(from)
            .data(calldata);

        info!("Calling {} on {:?} from {:?}", method, contract.address(), from);

        match &self.signer {
            Some(signer) => {
                let client = SignerMiddleware::new_with_provider_chain(provider.clone(), signer.clone())
                    .await
                    .map_err(|e| RewardError::Transaction(e.to_string()))?;
                self.submit_with(&client, tx).await
            }
            None => self.submit_with(provider, tx).await,
        }
    }

    async fn query_balance(&self, address: Address) -> RewardResult<String> {
        let provider = self.provider()?;
        let wei = provider
            .get_balance(address, None)
            .await
            .map_err(|e| RewardError::Provider(e.to_string()))?;
        Ok(utils::display_ether(wei))
    }
}
