#![no_std]

//! # Harbor Vesting Contract
//!
//! Linear unlock of a token allocation between two timestamps. An optional
//! up-front portion is claimable immediately; the remainder vests second by
//! second from `start` to `end`.
//!
//! Paused accounts freeze vesting at the pause instant. On unpause the gap
//! is excised: both `start` and `end` shift forward by the pause duration,
//! so paused time never counts toward the unlock.

mod types;

use harbor_errors::ContractError;
use soroban_sdk::{contract, contractimpl, token::TokenClient, Address, Env, Symbol};
use types::DataKey;

pub use types::Vesting;


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

fn load_vesting(e: &Env, user: &Address) -> Result<Vesting, ContractError> {
    e.storage()
        .persistent()
        .get(&DataKey::Vesting(user.clone()))
        .ok_or(ContractError::VestingNotFound)
}

fn store_vesting(e: &Env, user: &Address, v: &Vesting) {
    e.storage()
        .persistent()
        .set(&DataKey::Vesting(user.clone()), v);
}

/// Amount unlocked at `now`, respecting a pause freeze.
fn vested_at(v: &Vesting, now: u64) -> i128 {
    let effective = if v.paused_at > 0 { v.paused_at } else { now };
    if effective <= v.start {
        return v.initial;
    }
    if effective >= v.end {
        return v.total;
    }
    let span = (v.end - v.start) as i128;
    let elapsed = (effective - v.start) as i128;
    v.initial + (v.total - v.initial) * elapsed / span
}

// ─── Contract ──────────────────────────────────────────────────────────────

#[contract]
pub struct VestingSchedule;

#[contractimpl]
impl VestingSchedule {
    /// One-time initialization. Stores `admin` and the vested token.
    pub fn initialize(e: Env, admin: Address, token: Address) -> Result<(), ContractError> {
        if e.storage().instance().has(&DataKey::Admin) {
            return Err(ContractError::AlreadyInitialized);
        }
        e.storage().instance().set(&DataKey::Admin, &admin);
        e.storage().instance().set(&DataKey::Token, &token);
        Ok(())
    }

    /// Create a vesting schedule for `user` and pull the full allocation
    /// from the admin. One schedule per beneficiary.
    pub fn add_vesting(
        e: Env,
        admin: Address,
        user: Address,
        start: u64,
        end: u64,
        total: i128,
        initial_claimable: i128,
    ) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        if total <= 0 {
            return Err(ContractError::AmountMustBePositive);
        }
        if initial_claimable > total || initial_claimable < 0 || end <= start {
            return Err(ContractError::InvalidVestingParams);
        }
        if e.storage()
            .persistent()
            .has(&DataKey::Vesting(user.clone()))
        {
            return Err(ContractError::VestingAlreadyExists);
        }

        let v = Vesting {
            start,
            end,
            total,
            initial: initial_claimable,
            claimed: 0,
            paused_at: 0,
        };
        store_vesting(&e, &user, &v);

        let token: Address = e
            .storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(ContractError::NotInitialized)?;
        let contract = e.current_contract_address();
        TokenClient::new(&e, &token).transfer_from(&contract, &admin, &contract, &total);

        e.events().publish(
            (Symbol::new(&e, "vesting_added"), user),
            (start, end, total, initial_claimable),
        );
        Ok(())
    }

    /// Claim everything vested so far and not yet claimed.
    /// Returns the amount paid out.
    pub fn claim(e: Env, user: Address) -> Result<i128, ContractError> {
        user.require_auth();
        let mut v = load_vesting(&e, &user)?;

        let vested = vested_at(&v, e.ledger().timestamp());
        let claimable = vested - v.claimed;
        if claimable <= 0 {
            return Err(ContractError::NothingClaimable);
        }

        // CEI: record the claim before the transfer.
        v.claimed += claimable;
        store_vesting(&e, &user, &v);

        let token: Address = e
            .storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(ContractError::NotInitialized)?;
        let contract = e.current_contract_address();
        TokenClient::new(&e, &token).transfer(&contract, &user, &claimable);

        e.events()
            .publish((Symbol::new(&e, "vesting_claimed"), user), (claimable, v.claimed));
        Ok(claimable)
    }

    /// Freeze vesting for `user` at the current instant.
    pub fn pause(e: Env, admin: Address, user: Address) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        let mut v = load_vesting(&e, &user)?;
        if v.paused_at > 0 {
            return Err(ContractError::AlreadyPaused);
        }
        v.paused_at = e.ledger().timestamp();
        store_vesting(&e, &user, &v);
        e.events()
            .publish((Symbol::new(&e, "vesting_paused"), user), v.paused_at);
        Ok(())
    }

    /// Resume vesting, shifting the schedule forward by the pause duration
    /// so the paused gap never unlocks anything.
    pub fn unpause(e: Env, admin: Address, user: Address) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        let mut v = load_vesting(&e, &user)?;
        if v.paused_at == 0 {
            return Err(ContractError::NotPaused);
        }
        let gap = e.ledger().timestamp() - v.paused_at;
        v.start = v.start.saturating_add(gap);
        v.end = v.end.saturating_add(gap);
        v.paused_at = 0;
        store_vesting(&e, &user, &v);
        e.events()
            .publish((Symbol::new(&e, "vesting_unpaused"), user), gap);
        Ok(())
    }

    /// The schedule for `user`.
    pub fn vesting(e: Env, user: Address) -> Result<Vesting, ContractError> {
        load_vesting(&e, &user)
    }

    /// Amount vested (claimed or not) for `user` at the current instant.
    pub fn vested(e: Env, user: Address) -> Result<i128, ContractError> {
        let v = load_vesting(&e, &user)?;
        Ok(vested_at(&v, e.ledger().timestamp()))
    }
}
