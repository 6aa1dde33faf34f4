//! One identity per address or member id. Roles are optional sub-records that
//! are attached the first time the identity acts in that role.

use alloy::primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub first_seen_at: u64,
    pub creator: Option<CreatorRole>,
    pub artist: Option<RewardRole>,
    pub referrer: Option<RewardRole>,
    pub buyer: Option<MemberRole>,
    pub blacklisted: bool,
    pub whitelisted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorRole {
    /// Timestamp of the first token this creator launched
    pub created_at: u64,
    pub total_fees_collected: U256,
    pub tokens_created: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardRole {
    /// Accrued minus claimed. Signed: a claim is never clamped.
    pub rewards: I256,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRole {
    pub address: Address,
}

impl Participant {
    pub fn new(id: impl Into<String>, first_seen_at: u64) -> Self {
        Self {
            id: id.into(),
            first_seen_at,
            creator: None,
            artist: None,
            referrer: None,
            buyer: None,
            blacklisted: false,
            whitelisted: false,
        }
    }

    pub fn creator_role(&mut self) -> &mut CreatorRole {
        self.creator.get_or_insert_with(|| CreatorRole {
            created_at: 0,
            total_fees_collected: U256::ZERO,
            tokens_created: 0,
        })
    }

    pub fn artist_role(&mut self) -> &mut RewardRole {
        self.artist.get_or_insert_with(RewardRole::empty)
    }

    pub fn referrer_role(&mut self) -> &mut RewardRole {
        self.referrer.get_or_insert_with(RewardRole::empty)
    }

    pub fn buyer_role(&mut self) -> &mut MemberRole {
        self.buyer.get_or_insert(MemberRole {
            address: Address::ZERO,
        })
    }
}

impl RewardRole {
    pub fn empty() -> Self {
        Self {
            rewards: I256::ZERO,
            address: Address::ZERO,
        }
    }
}
