use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// A song NFT listed on the Opus contract, keyed by decimal token id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub artist: String,
    pub price: U256,
    pub referral_pct: U256,
    pub created_at: u64,
}
