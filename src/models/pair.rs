use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// A DEX pool created when a graduated asset's liquidity is deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexPair {
    pub id: String,
    pub asset: String,
    pub creator: Address,
    pub pair_address: Address,
    pub token_amount: U256,
    pub usdc_amount: U256,
    pub liquidity_tokens: U256,
    pub deployed_at: u64,
    pub deployment_tx: B256,
}
