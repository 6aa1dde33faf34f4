use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::events::Position;

/// Resume point of the engine.
///
/// Written last in every committed batch, so its position never runs ahead
/// of the entity writes it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub id: String,
    pub position: Option<Position>,
    /// Coin instances registered by creation events
    pub tracked_coins: Vec<Address>,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            id: super::SINGLETON_KEY.to_string(),
            position: None,
            tracked_coins: Vec::new(),
        }
    }
}

impl Cursor {
    /// True if `position` has already been committed.
    pub fn covers(&self, position: Position) -> bool {
        self.position.is_some_and(|committed| position <= committed)
    }
}
