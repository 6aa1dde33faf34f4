//! Raw log -> [`ChainEvent`] decoding.
//!
//! The emitting address decides which ABI is tried (see `router`), so two
//! families may share an event name without ambiguity.

use alloy::primitives::{B256, LogData, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;

use super::abi::{
    ICarbonCoin, ICarbonCoinConfig, ICarbonCoinDex, ICarbonCoinLauncher, ICarbonCoinProtection,
    ICarbonOpus,
};
use super::{ChainEvent, EventPayload, SourceKind};
use crate::error::SourceError;

/// Decode an RPC log emitted by a contract of family `kind`.
///
/// Returns `Ok(None)` for logs whose signature is not one the family emits.
pub fn decode_log(kind: SourceKind, log: &Log) -> Result<Option<ChainEvent>, SourceError> {
    let Some(payload) = decode_payload(kind, &log.inner.data)? else {
        return Ok(None);
    };

    let block_number = log.block_number.ok_or(SourceError::IncompleteLog {
        block: None,
        field: "blockNumber",
    })?;
    let tx_hash = log.transaction_hash.ok_or(SourceError::IncompleteLog {
        block: Some(block_number),
        field: "transactionHash",
    })?;
    let log_index = log.log_index.ok_or(SourceError::IncompleteLog {
        block: Some(block_number),
        field: "logIndex",
    })?;
    // Filled from the block header by the source when the node omits it
    let block_timestamp = log.block_timestamp.ok_or(SourceError::IncompleteLog {
        block: Some(block_number),
        field: "blockTimestamp",
    })?;

    Ok(Some(ChainEvent {
        tx_hash,
        log_index,
        block_number,
        block_timestamp,
        address: log.inner.address,
        payload,
    }))
}

pub fn decode_payload(kind: SourceKind, data: &LogData) -> Result<Option<EventPayload>, SourceError> {
    let Some(topic0) = data.topics().first().copied() else {
        return Ok(None);
    };

    match kind {
        SourceKind::Launcher => decode_launcher(topic0, data),
        SourceKind::Coin => decode_coin(topic0, data),
        SourceKind::Protection => decode_protection(topic0, data),
        SourceKind::Dex => decode_dex(topic0, data),
        SourceKind::Opus => decode_opus(topic0, data),
        SourceKind::Config => decode_config(topic0, data),
    }
}

fn event<E: SolEvent>(data: &LogData) -> Result<E, SourceError> {
    E::decode_log_data(data, true).map_err(|e| SourceError::Decode {
        event: E::SIGNATURE,
        message: e.to_string(),
    })
}

/// Chain timestamps are uint256 on the wire.
fn ts(value: U256) -> u64 {
    value.saturating_to()
}

fn decode_launcher(topic0: B256, data: &LogData) -> Result<Option<EventPayload>, SourceError> {
    use ICarbonCoinLauncher as L;

    let payload = if topic0 == L::TokenCreated::SIGNATURE_HASH {
        let e = event::<L::TokenCreated>(data)?;
        EventPayload::TokenCreated {
            token: e.tokenAddress,
            creator: e.creator,
            name: e.name,
            symbol: e.symbol,
            creation_fee: e.creationFee,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == L::TokenGraduated::SIGNATURE_HASH {
        let e = event::<L::TokenGraduated>(data)?;
        EventPayload::TokenGraduated {
            token: e.tokenAddress,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == L::FeesWithdrawn::SIGNATURE_HASH {
        let e = event::<L::FeesWithdrawn>(data)?;
        EventPayload::FeesWithdrawn {
            to: e.to,
            amount: e.amount,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == L::FeeReceived::SIGNATURE_HASH {
        let e = event::<L::FeeReceived>(data)?;
        EventPayload::FeeReceived {
            from: e.from,
            amount: e.amount,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == L::LauncherPaused::SIGNATURE_HASH {
        let e = event::<L::LauncherPaused>(data)?;
        EventPayload::LauncherPaused {
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == L::LauncherUnpaused::SIGNATURE_HASH {
        let e = event::<L::LauncherUnpaused>(data)?;
        EventPayload::LauncherUnpaused {
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == L::MaxTokensPerCreatorUpdated::SIGNATURE_HASH {
        let e = event::<L::MaxTokensPerCreatorUpdated>(data)?;
        EventPayload::MaxTokensPerCreatorUpdated { new_max: e.newMax }
    } else if topic0 == L::OwnershipTransferred::SIGNATURE_HASH {
        let e = event::<L::OwnershipTransferred>(data)?;
        EventPayload::LauncherOwnershipTransferred {
            new_owner: e.newOwner,
        }
    } else if topic0 == L::ControllerUpdated::SIGNATURE_HASH {
        let e = event::<L::ControllerUpdated>(data)?;
        EventPayload::LauncherControllerUpdated {
            new_controller: e.newController,
        }
    } else {
        return Ok(None);
    };

    Ok(Some(payload))
}

fn decode_coin(topic0: B256, data: &LogData) -> Result<Option<EventPayload>, SourceError> {
    use ICarbonCoin as C;

    let payload = if topic0 == C::Transfer::SIGNATURE_HASH {
        let e = event::<C::Transfer>(data)?;
        EventPayload::Transfer {
            from: e.from,
            to: e.to,
            value: e.value,
        }
    } else if topic0 == C::TokenDeployed::SIGNATURE_HASH {
        let e = event::<C::TokenDeployed>(data)?;
        EventPayload::TokenDeployed {
            token: e.token,
            max_supply: e.maxSupply,
            graduation_threshold: e.graduationThreshold,
        }
    } else if topic0 == C::TokensPurchased::SIGNATURE_HASH {
        let e = event::<C::TokensPurchased>(data)?;
        EventPayload::TokensPurchased {
            buyer: e.buyer,
            usdc_amount: e.usdcAmount,
            tokens_out: e.tokensOut,
            new_price: e.newPrice,
            real_usdc_reserves: e.realUsdcReserves,
            real_token_supply: e.realTokenSupply,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == C::TokensSold::SIGNATURE_HASH {
        let e = event::<C::TokensSold>(data)?;
        EventPayload::TokensSold {
            seller: e.seller,
            tokens_in: e.tokensIn,
            usdc_out: e.usdcOut,
            new_price: e.newPrice,
            real_usdc_reserves: e.realUsdcReserves,
            real_token_supply: e.realTokenSupply,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == C::Graduated::SIGNATURE_HASH {
        let e = event::<C::Graduated>(data)?;
        EventPayload::Graduated {
            token: e.token,
            liquidity_usdc: e.liquidityUsdc,
            liquidity_tokens: e.liquidityTokens,
            final_price: e.finalPrice,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == C::PriceUpdate::SIGNATURE_HASH {
        let e = event::<C::PriceUpdate>(data)?;
        EventPayload::PriceUpdate {
            price: e.price,
            usdc_reserves: e.usdcReserves,
            token_supply: e.tokenSupply,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == C::TradingPaused::SIGNATURE_HASH {
        let e = event::<C::TradingPaused>(data)?;
        EventPayload::TradingPaused {
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == C::TradingUnpaused::SIGNATURE_HASH {
        let e = event::<C::TradingUnpaused>(data)?;
        EventPayload::TradingUnpaused {
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == C::EmergencyWithdraw::SIGNATURE_HASH {
        let e = event::<C::EmergencyWithdraw>(data)?;
        EventPayload::EmergencyWithdraw {
            to: e.to,
            amount: e.amount,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == C::LiquiditySnapshot::SIGNATURE_HASH {
        let e = event::<C::LiquiditySnapshot>(data)?;
        EventPayload::LiquiditySnapshot {
            usdc_supply: e.usdcSupply,
            token_supply: e.tokenSupply,
            liquidity: e.liquidity,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == C::CreatorReserveMinted::SIGNATURE_HASH {
        let e = event::<C::CreatorReserveMinted>(data)?;
        EventPayload::CreatorReserveMinted {
            creator: e.creator,
            amount: e.amount,
        }
    } else if topic0 == C::Approval::SIGNATURE_HASH {
        let e = event::<C::Approval>(data)?;
        EventPayload::Approval {
            owner: e.owner,
            spender: e.spender,
            value: e.value,
        }
    } else {
        return Ok(None);
    };

    Ok(Some(payload))
}

fn decode_protection(topic0: B256, data: &LogData) -> Result<Option<EventPayload>, SourceError> {
    use ICarbonCoinProtection as P;

    let payload = if topic0 == P::BotDetected::SIGNATURE_HASH {
        let e = event::<P::BotDetected>(data)?;
        EventPayload::BotDetected {
            token: e.token,
            user: e.user,
            reason: e.reason,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == P::AddressBlacklisted::SIGNATURE_HASH {
        let e = event::<P::AddressBlacklisted>(data)?;
        EventPayload::AddressBlacklisted {
            token: e.token,
            user: e.user,
            blacklisted: e.blacklisted,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == P::AddressWhitelisted::SIGNATURE_HASH {
        let e = event::<P::AddressWhitelisted>(data)?;
        EventPayload::AddressWhitelisted {
            token: e.token,
            user: e.user,
            whitelisted: e.whitelisted,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == P::CircuitBreakerTriggered::SIGNATURE_HASH {
        let e = event::<P::CircuitBreakerTriggered>(data)?;
        EventPayload::CircuitBreakerTriggered {
            token: e.token,
            reason: e.reason,
            duration: e.duration,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == P::CircuitBreakerReset::SIGNATURE_HASH {
        let e = event::<P::CircuitBreakerReset>(data)?;
        EventPayload::CircuitBreakerReset {
            token: e.token,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == P::VolatilityWarning::SIGNATURE_HASH {
        let e = event::<P::VolatilityWarning>(data)?;
        EventPayload::VolatilityWarning {
            token: e.token,
            move_count: e.moveCount,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == P::HighPriceImpact::SIGNATURE_HASH {
        let e = event::<P::HighPriceImpact>(data)?;
        EventPayload::HighPriceImpact {
            token: e.token,
            trader: e.trader,
            impact: e.impact,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == P::WhaleIntentRegistered::SIGNATURE_HASH {
        let e = event::<P::WhaleIntentRegistered>(data)?;
        EventPayload::WhaleIntentRegistered {
            token: e.token,
            trader: e.trader,
            amount: e.amount,
            is_buy: e.isBuy,
            execute_after: e.executeAfter,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == P::WhaleTradeExecuted::SIGNATURE_HASH {
        let e = event::<P::WhaleTradeExecuted>(data)?;
        EventPayload::WhaleTradeExecuted {
            token: e.token,
            trader: e.trader,
            amount: e.amount,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == P::WhaleIntentCancelled::SIGNATURE_HASH {
        let e = event::<P::WhaleIntentCancelled>(data)?;
        EventPayload::WhaleIntentCancelled {
            token: e.token,
            trader: e.trader,
            timestamp: ts(e.timestamp),
        }
    } else {
        return Ok(None);
    };

    Ok(Some(payload))
}

fn decode_dex(topic0: B256, data: &LogData) -> Result<Option<EventPayload>, SourceError> {
    use ICarbonCoinDex as D;

    let payload = if topic0 == D::LiquidityDeployed::SIGNATURE_HASH {
        let e = event::<D::LiquidityDeployed>(data)?;
        EventPayload::LiquidityDeployed {
            token: e.token,
            pair: e.pair,
            creator: e.creator,
            token_amount: e.tokenAmount,
            usdc_amount: e.usdcAmount,
            liquidity: e.liquidity,
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == D::DexPaused::SIGNATURE_HASH {
        let e = event::<D::DexPaused>(data)?;
        EventPayload::DexPaused {
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == D::DexUnpaused::SIGNATURE_HASH {
        let e = event::<D::DexUnpaused>(data)?;
        EventPayload::DexUnpaused {
            timestamp: ts(e.timestamp),
        }
    } else if topic0 == D::ConfigUpdated::SIGNATURE_HASH {
        let e = event::<D::ConfigUpdated>(data)?;
        EventPayload::DexConfigUpdated {
            new_config: e.newConfig,
            timestamp: ts(e.timestamp),
        }
    } else {
        return Ok(None);
    };

    Ok(Some(payload))
}

fn decode_opus(topic0: B256, data: &LogData) -> Result<Option<EventPayload>, SourceError> {
    use ICarbonOpus as O;

    let payload = if topic0 == O::SongCreated::SIGNATURE_HASH {
        let e = event::<O::SongCreated>(data)?;
        EventPayload::SongCreated {
            token_id: e.tokenId,
            artist: e.artist,
            price: e.price,
            referral_pct: e.referralPct,
        }
    } else if topic0 == O::SongPurchased::SIGNATURE_HASH {
        let e = event::<O::SongPurchased>(data)?;
        EventPayload::SongPurchased {
            token_id: e.tokenId,
            buyer: e.buyer,
            referrer: e.referrer,
            price: e.price,
        }
    } else if topic0 == O::SongPriceUpdated::SIGNATURE_HASH {
        let e = event::<O::SongPriceUpdated>(data)?;
        EventPayload::SongPriceUpdated {
            token_id: e.tokenId,
            new_price: e.newPrice,
        }
    } else if topic0 == O::SongPriceScaled::SIGNATURE_HASH {
        let e = event::<O::SongPriceScaled>(data)?;
        EventPayload::SongPriceScaled {
            token_id: e.tokenId,
            new_price: e.newPrice,
        }
    } else if topic0 == O::SongReferralPctUpdated::SIGNATURE_HASH {
        let e = event::<O::SongReferralPctUpdated>(data)?;
        EventPayload::SongReferralPctUpdated {
            token_id: e.tokenId,
            new_pct: e.newPct,
        }
    } else if topic0 == O::RewardsDistributed::SIGNATURE_HASH {
        let e = event::<O::RewardsDistributed>(data)?;
        EventPayload::RewardsDistributed {
            artist: e.artist,
            referrer: e.referrer,
            artist_amount: e.artistAmount,
            referrer_amount: e.referrerAmount,
            protocol_fee: e.protocolFee,
        }
    } else if topic0 == O::RewardsClaimed::SIGNATURE_HASH {
        let e = event::<O::RewardsClaimed>(data)?;
        EventPayload::RewardsClaimed {
            member_id: e.memberId,
            amount: e.amount,
        }
    } else if topic0 == O::OwnershipTransferred::SIGNATURE_HASH {
        let e = event::<O::OwnershipTransferred>(data)?;
        EventPayload::ProtocolOwnershipTransferred {
            new_owner: e.newOwner,
        }
    } else if topic0 == O::ProtocolFeeUpdated::SIGNATURE_HASH {
        let e = event::<O::ProtocolFeeUpdated>(data)?;
        EventPayload::ProtocolFeeUpdated { new_fee: e.newFee }
    } else if topic0 == O::ControllerUpdated::SIGNATURE_HASH {
        let e = event::<O::ControllerUpdated>(data)?;
        EventPayload::ProtocolControllerUpdated {
            new_controller: e.newController,
        }
    } else if topic0 == O::MemberAddressUpdated::SIGNATURE_HASH {
        let e = event::<O::MemberAddressUpdated>(data)?;
        EventPayload::MemberAddressUpdated {
            member_id: e.memberId,
            new_address: e.newAddress,
        }
    } else {
        return Ok(None);
    };

    Ok(Some(payload))
}

fn decode_config(topic0: B256, data: &LogData) -> Result<Option<EventPayload>, SourceError> {
    use ICarbonCoinConfig as K;

    if topic0 != K::DefaultConfigUpdated::SIGNATURE_HASH {
        return Ok(None);
    }
    let e = event::<K::DefaultConfigUpdated>(data)?;
    Ok(Some(EventPayload::DefaultConfigUpdated {
        config_type: e.configType,
        timestamp: ts(e.timestamp),
    }))
}
