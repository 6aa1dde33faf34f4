use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// A launched bonding-curve token, keyed by its contract address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub address: Address,
    /// Participant key of the creator
    pub creator: String,
    pub name: String,
    pub symbol: String,
    pub created_at: u64,
    pub creation_fee: U256,

    pub graduated: bool,
    pub graduated_at: Option<u64>,
    pub trading_paused: bool,
    pub circuit_breaker_active: bool,
    pub circuit_breaker_triggered_at: Option<u64>,
    pub circuit_breaker_duration: Option<U256>,
    pub volatility_move_count: U256,

    pub real_usdc_reserves: U256,
    pub real_token_supply: U256,
    pub virtual_usdc: U256,
    pub virtual_tokens: U256,
    pub price: U256,
    pub last_price_update: u64,
    pub max_supply: U256,
    pub graduation_threshold: U256,
    pub creator_allocation: U256,

    pub liquidity_usdc: Option<U256>,
    pub liquidity_tokens: Option<U256>,
    pub liquidity_deployed: bool,
    pub liquidity_deployment_tx: Option<B256>,
    /// DexPair key once liquidity is deployed
    pub dex_pair: Option<String>,
    pub dex_pair_address: Option<Address>,

    /// Number of holdings of this asset with a nonzero balance
    pub total_holders: u64,
}

impl Asset {
    /// A freshly observed asset with every numeric field at zero.
    pub fn new(
        address: Address,
        creator: String,
        name: String,
        symbol: String,
        created_at: u64,
    ) -> Self {
        Self {
            id: super::address_key(&address),
            address,
            creator,
            name,
            symbol,
            created_at,
            creation_fee: U256::ZERO,
            graduated: false,
            graduated_at: None,
            trading_paused: false,
            circuit_breaker_active: false,
            circuit_breaker_triggered_at: None,
            circuit_breaker_duration: None,
            volatility_move_count: U256::ZERO,
            real_usdc_reserves: U256::ZERO,
            real_token_supply: U256::ZERO,
            virtual_usdc: U256::ZERO,
            virtual_tokens: U256::ZERO,
            price: U256::ZERO,
            last_price_update: 0,
            max_supply: U256::ZERO,
            graduation_threshold: U256::ZERO,
            creator_allocation: U256::ZERO,
            liquidity_usdc: None,
            liquidity_tokens: None,
            liquidity_deployed: false,
            liquidity_deployment_tx: None,
            dex_pair: None,
            dex_pair_address: None,
            total_holders: 0,
        }
    }
}
