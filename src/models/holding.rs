use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Mirror of an on-chain balance for one (participant, asset) pair.
///
/// Only used to detect zero-crossings; rows are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub participant: String,
    pub asset: String,
    pub balance: U256,
}

impl Holding {
    pub fn key_for(participant: &str, asset: &str) -> String {
        format!("{}-{}", participant, asset)
    }

    pub fn new(participant: &str, asset: &str) -> Self {
        Self {
            id: Self::key_for(participant, asset),
            participant: participant.to_string(),
            asset: asset.to_string(),
            balance: U256::ZERO,
        }
    }
}
