//! Chain id to network label resolution.

/// Label returned for any chain id missing from [`KNOWN_NETWORKS`].
pub const UNKNOWN_NETWORK: &str = "Unknown Network";

/// A network the console can name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnownNetwork {
    pub chain_id: u64,
    pub label: &'static str,
}

impl KnownNetwork {
    pub const fn new(chain_id: u64, label: &'static str) -> Self {
        Self { chain_id, label }
    }
}

pub const KNOWN_NETWORKS: &[KnownNetwork] = &[
    KnownNetwork::new(1, "Ethereum Mainnet"),
    KnownNetwork::new(3, "Ropsten Testnet"),
    KnownNetwork::new(4, "Rinkeby Testnet"),
    KnownNetwork::new(5, "Goerli Testnet"),
    KnownNetwork::new(42, "Kovan Testnet"),
    KnownNetwork::new(137, "Polygon Mainnet"),
    KnownNetwork::new(80001, "Mumbai Testnet"),
];

/// Find a known network by chain ID
pub fn find_network_by_chain_id(chain_id: u64) -> Option<&'static KnownNetwork> {
    KNOWN_NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

/// Human-readable label for a chain id. Total: unknown ids map to
/// [`UNKNOWN_NETWORK`].
pub fn network_label(chain_id: u64) -> &'static str {
    find_network_by_chain_id(chain_id)
        .map(|n| n.label)
        .unwrap_or(UNKNOWN_NETWORK)
}
