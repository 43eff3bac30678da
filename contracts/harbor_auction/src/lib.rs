#![no_std]

//! # Harbor Auction Contract
//!
//! Sells confiscated keeper collateral for the canonical token at a price
//! that decays linearly from full canonical value to zero over a fixed
//! duration. Lots are created by the keeper registry when it sweeps its
//! confiscation accumulators; any buyer may partially drain a lot, with no
//! per-buyer limit.

mod events;
mod types;

use harbor_errors::ContractError;
use soroban_sdk::{contract, contractimpl, token::TokenClient, Address, Env};
use types::DataKey;

pub use types::Lot;


/// Fixed-point scale for prices and canonical amounts (18 decimals).
pub const PRECISION: i128 = 1_000_000_000_000_000_000;

// ─── Helpers ───────────────────────────────────────────────────────────────

fn require_admin(e: &Env, caller: &Address) -> Result<(), ContractError> {
    caller.require_auth();
    let stored: Address = e
        .storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(ContractError::NotInitialized)?;
    if stored != *caller {
        return Err(ContractError::NotAdmin);
    }
    Ok(())
}

fn require_registry(e: &Env, caller: &Address) -> Result<(), ContractError> {
    caller.require_auth();
    let stored: Address = e
        .storage()
        .instance()
        .get(&DataKey::Registry)
        .ok_or(ContractError::NotInitialized)?;
    if stored != *caller {
        return Err(ContractError::NotRegistry);
    }
    Ok(())
}

fn load_lot(e: &Env, asset: &Address) -> Result<Lot, ContractError> {
    e.storage()
        .persistent()
        .get(&DataKey::Lot(asset.clone()))
        .ok_or(ContractError::NoActiveLot)
}

/// Linear decay: `PRECISION` at `start`, 0 at `start + duration` and after.
fn price_at(lot: &Lot, now: u64) -> Result<i128, ContractError> {
    if now < lot.start {
        return Err(ContractError::AuctionNotStarted);
    }
    let elapsed = now - lot.start;
    if elapsed >= lot.duration {
        return Ok(0);
    }
    let decayed = PRECISION
        .checked_mul(elapsed as i128)
        .ok_or(ContractError::Overflow)?
        / lot.duration as i128;
    Ok(PRECISION - decayed)
}

// ─── Contract ──────────────────────────────────────────────────────────────

#[contract]
pub struct CollateralAuction;

#[contractimpl]
impl CollateralAuction {
    /// One-time initialization.
    ///
    /// * `registry` - the keeper registry allowed to create lots
    /// * `canonical_token` - the token buyers pay with
    /// * `beneficiary` - receives all auction proceeds
    /// * `duration_secs` - decay duration applied to every lot
    pub fn initialize(
        e: Env,
        admin: Address,
        registry: Address,
        canonical_token: Address,
        beneficiary: Address,
        duration_secs: u64,
    ) -> Result<(), ContractError> {
        if e.storage().instance().has(&DataKey::Admin) {
            return Err(ContractError::AlreadyInitialized);
        }
        if duration_secs == 0 {
            return Err(ContractError::AmountMustBePositive);
        }
        e.storage().instance().set(&DataKey::Admin, &admin);
        e.storage().instance().set(&DataKey::Registry, &registry);
        e.storage()
            .instance()
            .set(&DataKey::CanonicalToken, &canonical_token);
        e.storage()
            .instance()
            .set(&DataKey::Beneficiary, &beneficiary);
        e.storage().instance().set(&DataKey::Duration, &duration_secs);
        Ok(())
    }

    /// Update the decay duration applied to lots created from now on.
    pub fn set_duration(e: Env, admin: Address, duration_secs: u64) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        if duration_secs == 0 {
            return Err(ContractError::AmountMustBePositive);
        }
        e.storage().instance().set(&DataKey::Duration, &duration_secs);
        Ok(())
    }

    /// Record a confiscated lot. Registry-only; the registry transfers the
    /// asset to this contract before calling.
    ///
    /// An existing lot for the same asset is topped up and its decay clock
    /// restarted.
    pub fn create_lot(
        e: Env,
        registry: Address,
        asset: Address,
        raw_amount: i128,
        scale: i128,
    ) -> Result<(), ContractError> {
        require_registry(&e, &registry)?;
        if raw_amount <= 0 || scale <= 0 {
            return Err(ContractError::AmountMustBePositive);
        }

        let duration: u64 = e
            .storage()
            .instance()
            .get(&DataKey::Duration)
            .ok_or(ContractError::NotInitialized)?;
        let remaining = match e
            .storage()
            .persistent()
            .get::<_, Lot>(&DataKey::Lot(asset.clone()))
        {
            Some(old) => old
                .remaining
                .checked_add(raw_amount)
                .ok_or(ContractError::Overflow)?,
            None => raw_amount,
        };
        let lot = Lot {
            start: e.ledger().timestamp(),
            duration,
            remaining,
            scale,
        };
        e.storage()
            .persistent()
            .set(&DataKey::Lot(asset.clone()), &lot);

        events::emit_lot_created(&e, &asset, raw_amount, remaining);
        Ok(())
    }

    /// Current discount price for `asset` as a PRECISION-scaled fraction of
    /// canonical value: `PRECISION` at the start of the decay, 0 at and after
    /// its end.
    pub fn discount_price(e: Env, asset: Address) -> Result<i128, ContractError> {
        let lot = load_lot(&e, &asset)?;
        price_at(&lot, e.ledger().timestamp())
    }

    /// Buy `raw_amount` of a confiscated asset at the current discount.
    ///
    /// Cost is `to_canonical(raw_amount) * price / PRECISION`, paid in the
    /// canonical token to the beneficiary. Returns the cost.
    pub fn buy(
        e: Env,
        buyer: Address,
        asset: Address,
        raw_amount: i128,
    ) -> Result<i128, ContractError> {
        buyer.require_auth();
        if raw_amount <= 0 {
            return Err(ContractError::AmountMustBePositive);
        }

        let mut lot = load_lot(&e, &asset)?;
        if raw_amount > lot.remaining {
            return Err(ContractError::LotExhausted);
        }
        let price = price_at(&lot, e.ledger().timestamp())?;
        let canonical = raw_amount
            .checked_mul(lot.scale)
            .ok_or(ContractError::Overflow)?;
        let cost = canonical
            .checked_mul(price)
            .ok_or(ContractError::Overflow)?
            / PRECISION;

        // CEI: shrink the lot before any transfer.
        lot.remaining -= raw_amount;
        e.storage()
            .persistent()
            .set(&DataKey::Lot(asset.clone()), &lot);

        let canonical_token: Address = e
            .storage()
            .instance()
            .get(&DataKey::CanonicalToken)
            .ok_or(ContractError::NotInitialized)?;
        let beneficiary: Address = e
            .storage()
            .instance()
            .get(&DataKey::Beneficiary)
            .ok_or(ContractError::NotInitialized)?;
        let contract = e.current_contract_address();

        if cost > 0 {
            TokenClient::new(&e, &canonical_token).transfer(&buyer, &beneficiary, &cost);
        }
        TokenClient::new(&e, &asset).transfer(&contract, &buyer, &raw_amount);

        events::emit_auction_buy(&e, &buyer, &asset, raw_amount, cost, lot.remaining);
        Ok(cost)
    }

    /// The active lot for `asset`, if any.
    pub fn lot(e: Env, asset: Address) -> Result<Lot, ContractError> {
        load_lot(&e, &asset)
    }
}
