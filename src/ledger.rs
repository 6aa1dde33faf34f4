//! Derived-counter discipline.
//!
//! Counters move only by deltas derived from an observed transition:
//! holder counts from zero-crossings of a reconciled balance, totals from a
//! record that is new in this batch. Nothing here rescans entities.

use alloy::primitives::{I256, U256};
use tracing::warn;

use crate::models::Asset;

/// Transition of a balance relative to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    /// zero -> nonzero
    Entered,
    /// nonzero -> zero
    Exited,
    Unchanged,
}

pub fn crossing(old: U256, new: U256) -> Crossing {
    match (old.is_zero(), new.is_zero()) {
        (true, false) => Crossing::Entered,
        (false, true) => Crossing::Exited,
        _ => Crossing::Unchanged,
    }
}

/// Apply a zero-crossing to the asset's holder count.
///
/// Returns false if an exit was observed while the count was already zero,
/// which means an earlier update was skipped.
pub fn apply_holder_crossing(asset: &mut Asset, crossing: Crossing) -> bool {
    match crossing {
        Crossing::Entered => {
            asset.total_holders += 1;
            true
        }
        Crossing::Exited => match asset.total_holders.checked_sub(1) {
            Some(count) => {
                asset.total_holders = count;
                true
            }
            None => {
                warn!(asset = %asset.id, "Holder exit observed with totalHolders already zero");
                false
            }
        },
        Crossing::Unchanged => true,
    }
}

pub fn add(total: &mut U256, delta: U256) {
    *total = total.saturating_add(delta);
}

fn signed(amount: U256) -> I256 {
    I256::try_from(amount).unwrap_or(I256::MAX)
}

pub fn accrue(balance: &mut I256, amount: U256) {
    *balance = balance.saturating_add(signed(amount));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Covered,
    /// The claim exceeded the accrued balance by `shortfall`
    Overdrawn { shortfall: U256 },
}

/// Debit a claim. The balance is not floored; an overdraw is reported so
/// the caller can surface it.
pub fn claim(balance: &mut I256, amount: U256) -> ClaimOutcome {
    let before = *balance;
    *balance = before.saturating_sub(signed(amount));

    if balance.is_negative() {
        let shortfall = balance.unsigned_abs();
        // Only the part not already negative before this claim is new
        let prior_debt = if before.is_negative() {
            before.unsigned_abs()
        } else {
            U256::ZERO
        };
        ClaimOutcome::Overdrawn {
            shortfall: shortfall.saturating_sub(prior_debt),
        }
    } else {
        ClaimOutcome::Covered
    }
}
