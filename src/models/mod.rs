//! Persisted entity model.
//!
//! Every entity is a plain serde struct with a string `id`. The [`Entity`]
//! union is what the store persists; handlers work with the concrete types
//! through the [`Record`] trait.

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod activity;
pub mod aggregate;
pub mod asset;
pub mod cursor;
pub mod holding;
pub mod intent;
pub mod pair;
pub mod participant;
pub mod song;

pub use activity::{
    AccessList, AccessListChange, Approval, BotDetection, ConfigChange, ConfigScope,
    EmergencyWithdrawal, FeeReceipt, FeeWithdrawal, PauseChange, PauseSubject, ProtectionEvent,
    ProtectionEventType, Reward, RewardDistribution, SongPurchase, Trade, TradeSide,
};
pub use aggregate::{Dex, Launcher, Protocol, SINGLETON_KEY};
pub use asset::Asset;
pub use cursor::Cursor;
pub use holding::Holding;
pub use intent::WhaleIntent;
pub use pair::DexPair;
pub use participant::{CreatorRole, MemberRole, Participant, RewardRole};
pub use song::Song;

/// Key for entities addressed by a chain address (lowercase 0x hex).
pub fn address_key(address: &Address) -> String {
    format!("{:?}", address)
}

/// Key for members identified by a 32-byte id.
pub fn member_key(member_id: &B256) -> String {
    format!("{:?}", member_id)
}

/// Key for append-only records: `txHash-logIndex`.
pub fn log_key(tx_hash: &B256, log_index: u64) -> String {
    format!("{:?}-{}", tx_hash, log_index)
}

/// A persisted entity type that can be loaded and saved by key.
pub trait Record: Sized {
    const KIND: EntityKind;

    fn key(&self) -> &str;

    fn into_entity(self) -> Entity;

    fn from_entity(entity: Entity) -> Result<Self, Entity>;
}

macro_rules! entity_kinds {
    ($($variant:ident($ty:ty) => $name:literal),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum EntityKind {
            $($variant),*
        }

        impl EntityKind {
            pub const ALL: &'static [EntityKind] = &[$(EntityKind::$variant),*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(EntityKind::$variant => $name),*
                }
            }

            pub fn parse(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(EntityKind::$variant),)*
                    _ => None,
                }
            }
        }

        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type", content = "value")]
        pub enum Entity {
            $($variant($ty)),*
        }

        impl Entity {
            pub fn kind(&self) -> EntityKind {
                match self {
                    $(Entity::$variant(_) => EntityKind::$variant),*
                }
            }

            pub fn key(&self) -> &str {
                match self {
                    $(Entity::$variant(inner) => inner.id.as_str()),*
                }
            }
        }

        $(
            impl Record for $ty {
                const KIND: EntityKind = EntityKind::$variant;

                fn key(&self) -> &str {
                    &self.id
                }

                fn into_entity(self) -> Entity {
                    Entity::$variant(self)
                }

                fn from_entity(entity: Entity) -> Result<Self, Entity> {
                    match entity {
                        Entity::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

entity_kinds! {
    Asset(Asset) => "Asset",
    Participant(Participant) => "Participant",
    Holding(Holding) => "Holding",
    Launcher(Launcher) => "Launcher",
    Dex(Dex) => "Dex",
    Protocol(Protocol) => "Protocol",
    DexPair(DexPair) => "DexPair",
    Song(Song) => "Song",
    WhaleIntent(WhaleIntent) => "WhaleIntent",
    Trade(Trade) => "Trade",
    FeeReceipt(FeeReceipt) => "FeeReceipt",
    FeeWithdrawal(FeeWithdrawal) => "FeeWithdrawal",
    EmergencyWithdrawal(EmergencyWithdrawal) => "EmergencyWithdrawal",
    Approval(Approval) => "Approval",
    BotDetection(BotDetection) => "BotDetection",
    AccessListChange(AccessListChange) => "AccessListChange",
    ProtectionEvent(ProtectionEvent) => "ProtectionEvent",
    Reward(Reward) => "Reward",
    RewardDistribution(RewardDistribution) => "RewardDistribution",
    SongPurchase(SongPurchase) => "SongPurchase",
    PauseChange(PauseChange) => "PauseChange",
    ConfigChange(ConfigChange) => "ConfigChange",
    Cursor(Cursor) => "Cursor",
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(*kind));
        }
        assert_eq!(EntityKind::parse("Token"), None);
    }

    #[test]
    fn test_keys_are_lowercase_hex() {
        let address = Address::repeat_byte(0xAB);
        assert_eq!(
            address_key(&address),
            "0xabababababababababababababababababababab"
        );

        let tx = B256::repeat_byte(0x01);
        assert_eq!(
            log_key(&tx, 7),
            format!("0x{}-7", "01".repeat(32))
        );
    }

    #[test]
    fn test_from_entity_rejects_other_kinds() {
        let holding = Holding::new("0xc", "0xa");
        let entity = holding.into_entity();
        assert_eq!(entity.kind(), EntityKind::Holding);
        assert!(Asset::from_entity(entity).is_err());
    }
}
