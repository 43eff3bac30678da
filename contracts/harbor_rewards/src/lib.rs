#![no_std]

//! # Harbor Reward Accrual
//!
//! A dividend-per-share staking pool paying out a fixed per-second emission
//! over a bounded schedule. Every state-changing call settles the global
//! accumulator first, then pays the caller's pending reward, then applies
//! the stake delta, so nobody ever earns on amounts not yet staked and
//! leaving stakers are paid exactly up to their exit instant.
//!
//! When a validator key is configured, every `stake`/`unstake`/`claim` must
//! carry a fresh validator-signed online proof for the staker. The
//! accusation protocol rides on the same proofs: anyone may bond an
//! accusation against a staker, and the target clears it by presenting a
//! proof signed after the accusation opened.

mod events;
mod types;

use harbor_attest as attest;
use harbor_errors::ContractError;
use soroban_sdk::token::TokenClient;
use soroban_sdk::{contract, contractimpl, Address, BytesN, Env};
use types::DataKey;

pub use harbor_attest::{AttestSig, OnlineProof};
pub use types::{Accusation, PoolState, StakeRecord};

#[cfg(test)]
mod test_accusation;

/// Fixed-point scale for dividend-per-share arithmetic (18 decimals).
pub const PRECISION: i128 = 1_000_000_000_000_000_000;

// ─── Helpers ───────────────────────────────────────────────────────────────

fn require_admin(e: &Env, caller: &Address) -> Result<(), ContractError> {
    caller.require_auth();
    let admin: Address = e
        .storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(ContractError::NotInitialized)?;
    if admin != *caller {
        return Err(ContractError::NotAdmin);
    }
    Ok(())
}

fn token(e: &Env) -> Result<Address, ContractError> {
    e.storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(ContractError::NotInitialized)
}

fn load_pool(e: &Env) -> Result<PoolState, ContractError> {
    e.storage()
        .instance()
        .get(&DataKey::Pool)
        .ok_or(ContractError::NotInitialized)
}

fn save_pool(e: &Env, pool: &PoolState) {
    e.storage().instance().set(&DataKey::Pool, pool);
}

fn load_stake(e: &Env, staker: &Address) -> Option<StakeRecord> {
    e.storage().persistent().get(&DataKey::Stake(staker.clone()))
}

fn penalty_debt(e: &Env, staker: &Address) -> i128 {
    e.storage()
        .persistent()
        .get(&DataKey::Penalty(staker.clone()))
        .unwrap_or(0)
}

/// Roll the global accumulator forward to `min(now, end)`.
fn settle_pool(e: &Env, pool: &mut PoolState) -> Result<(), ContractError> {
    let now = e.ledger().timestamp();
    let upto = now.min(pool.end);
    if upto <= pool.last_ts {
        return Ok(());
    }
    if pool.total_stakes > 0 {
        let elapsed = (upto - pool.last_ts) as i128;
        let emitted = elapsed
            .checked_mul(pool.rate)
            .and_then(|v| v.checked_mul(PRECISION))
            .ok_or(ContractError::Overflow)?;
        pool.dps = pool
            .dps
            .checked_add(emitted / pool.total_stakes)
            .ok_or(ContractError::Overflow)?;
    }
    pool.last_ts = upto;
    Ok(())
}

/// Reward accrued by `record` since it was last settled, before any penalty
/// debt is deducted.
fn pending(pool: &PoolState, record: &StakeRecord) -> Result<i128, ContractError> {
    (pool.dps - record.settled_dps)
        .checked_mul(record.amount)
        .map(|v| v / PRECISION)
        .ok_or(ContractError::Overflow)
}

/// Pay `record`'s pending reward net of penalty debt and mark it settled.
/// Returns the amount transferred.
fn settle_and_pay(
    e: &Env,
    staker: &Address,
    pool: &PoolState,
    record: &mut StakeRecord,
) -> Result<i128, ContractError> {
    let mut owed = pending(pool, record)?;
    record.settled_dps = pool.dps;

    let mut debt_applied = 0i128;
    if owed > 0 {
        let debt = penalty_debt(e, staker);
        if debt > 0 {
            debt_applied = debt.min(owed);
            owed -= debt_applied;
            let remaining = debt - debt_applied;
            let key = DataKey::Penalty(staker.clone());
            if remaining > 0 {
                e.storage().persistent().set(&key, &remaining);
            } else {
                e.storage().persistent().remove(&key);
            }
        }
    }
    if owed > 0 {
        let token = token(e)?;
        TokenClient::new(e, &token).transfer(&e.current_contract_address(), staker, &owed);
    }
    if owed > 0 || debt_applied > 0 {
        events::emit_reward_paid(e, staker, owed, debt_applied);
    }
    Ok(owed)
}

/// Enforce the liveness gate when a validator key is configured.
fn check_liveness(
    e: &Env,
    staker: &Address,
    proof: &Option<OnlineProof>,
) -> Result<(), ContractError> {
    let validator: Option<BytesN<65>> = e
        .storage()
        .instance()
        .get(&DataKey::Validator)
        .ok_or(ContractError::NotInitialized)?;
    let Some(validator) = validator else {
        return Ok(());
    };
    let proof = proof.as_ref().ok_or(ContractError::ProofRequired)?;
    if proof.keeper != *staker {
        return Err(ContractError::InvalidSignature);
    }
    let tolerance: u64 = e
        .storage()
        .instance()
        .get(&DataKey::ProofTolerance)
        .ok_or(ContractError::NotInitialized)?;
    let now = e.ledger().timestamp();
    if now.saturating_sub(proof.timestamp) > tolerance {
        return Err(ContractError::ProofExpired);
    }
    let message = attest::online_proof_message(e, &proof.keeper, proof.timestamp);
    attest::verify_single(e, &message, &proof.sig, &validator)
}

fn require_no_accusation(e: &Env, staker: &Address) -> Result<(), ContractError> {
    if e.storage()
        .persistent()
        .has(&DataKey::Accusation(staker.clone()))
    {
        return Err(ContractError::OngoingAccusation);
    }
    Ok(())
}

// ─── Contract ──────────────────────────────────────────────────────────────

#[contract]
pub struct RewardAccrual;

#[contractimpl]
impl RewardAccrual {
    /// One-time initialization. Pulls the full reward reserve for the
    /// schedule (`rate * (end - start)`) from the admin up front.
    ///
    /// `validator` of `None` disables the liveness gate entirely; with it
    /// disabled, accusations can still be opened but never appealed.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        e: Env,
        admin: Address,
        token: Address,
        rate: i128,
        start: u64,
        end: u64,
        validator: Option<BytesN<65>>,
        proof_tolerance: u64,
        accusation_penalty: i128,
        appeal_window: u64,
    ) -> Result<(), ContractError> {
        if e.storage().instance().has(&DataKey::Admin) {
            return Err(ContractError::AlreadyInitialized);
        }
        if end <= start || rate <= 0 {
            return Err(ContractError::InvalidSchedule);
        }
        if accusation_penalty <= 0 {
            return Err(ContractError::AmountMustBePositive);
        }
        admin.require_auth();

        let storage = e.storage().instance();
        storage.set(&DataKey::Admin, &admin);
        storage.set(&DataKey::Token, &token);
        storage.set(&DataKey::Validator, &validator);
        storage.set(&DataKey::ProofTolerance, &proof_tolerance);
        storage.set(&DataKey::AccusationPenalty, &accusation_penalty);
        storage.set(&DataKey::AppealWindow, &appeal_window);
        save_pool(
            &e,
            &PoolState {
                total_stakes: 0,
                dps: 0,
                last_ts: start,
                rate,
                start,
                end,
            },
        );

        let reserve = rate
            .checked_mul((end - start) as i128)
            .ok_or(ContractError::Overflow)?;
        TokenClient::new(&e, &token).transfer(&admin, &e.current_contract_address(), &reserve);
        Ok(())
    }

    /// Rotate or disable the liveness validator key.
    pub fn set_validator(
        e: Env,
        admin: Address,
        validator: Option<BytesN<65>>,
    ) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        e.storage().instance().set(&DataKey::Validator, &validator);
        Ok(())
    }

    /// Change the emission rate for the rest of the schedule. Settles the
    /// pool first, then tops up or refunds the reward reserve for the
    /// remaining duration at the rate delta.
    pub fn update_rate(e: Env, admin: Address, new_rate: i128) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        if new_rate <= 0 {
            return Err(ContractError::InvalidSchedule);
        }
        let mut pool = load_pool(&e)?;
        settle_pool(&e, &mut pool)?;

        let now = e.ledger().timestamp();
        let remaining = pool.end.saturating_sub(now.max(pool.start)) as i128;
        let delta = remaining
            .checked_mul(new_rate - pool.rate)
            .ok_or(ContractError::Overflow)?;
        let old_rate = pool.rate;
        pool.rate = new_rate;
        save_pool(&e, &pool);

        let token = token(&e)?;
        let contract = e.current_contract_address();
        if delta > 0 {
            TokenClient::new(&e, &token).transfer(&admin, &contract, &delta);
        } else if delta < 0 {
            TokenClient::new(&e, &token).transfer(&contract, &admin, &(-delta));
        }
        events::emit_rate_updated(&e, old_rate, new_rate);
        Ok(())
    }

    // ─── Staking ───────────────────────────────────────────────────────

    /// Add to the caller's stake. Settles and pays pending reward first.
    pub fn stake(
        e: Env,
        staker: Address,
        amount: i128,
        proof: Option<OnlineProof>,
    ) -> Result<(), ContractError> {
        staker.require_auth();
        if amount <= 0 {
            return Err(ContractError::AmountMustBePositive);
        }
        require_no_accusation(&e, &staker)?;
        check_liveness(&e, &staker, &proof)?;

        let mut pool = load_pool(&e)?;
        settle_pool(&e, &mut pool)?;
        let mut record = load_stake(&e, &staker).unwrap_or(StakeRecord {
            amount: 0,
            settled_dps: pool.dps,
        });
        settle_and_pay(&e, &staker, &pool, &mut record)?;

        record.amount += amount;
        pool.total_stakes += amount;
        e.storage()
            .persistent()
            .set(&DataKey::Stake(staker.clone()), &record);
        save_pool(&e, &pool);

        let token = token(&e)?;
        TokenClient::new(&e, &token).transfer(&staker, &e.current_contract_address(), &amount);
        events::emit_staked(&e, &staker, amount, record.amount);
        Ok(())
    }

    /// Withdraw part or all of the caller's stake, paying pending reward up
    /// to this exact instant.
    pub fn unstake(
        e: Env,
        staker: Address,
        amount: i128,
        proof: Option<OnlineProof>,
    ) -> Result<(), ContractError> {
        staker.require_auth();
        if amount <= 0 {
            return Err(ContractError::AmountMustBePositive);
        }
        require_no_accusation(&e, &staker)?;
        check_liveness(&e, &staker, &proof)?;

        let mut pool = load_pool(&e)?;
        settle_pool(&e, &mut pool)?;
        let mut record = load_stake(&e, &staker).ok_or(ContractError::NothingStaked)?;
        if record.amount < amount {
            return Err(ContractError::InsufficientStake);
        }
        settle_and_pay(&e, &staker, &pool, &mut record)?;

        record.amount -= amount;
        pool.total_stakes -= amount;
        let key = DataKey::Stake(staker.clone());
        if record.amount == 0 {
            e.storage().persistent().remove(&key);
        } else {
            e.storage().persistent().set(&key, &record);
        }
        save_pool(&e, &pool);

        let token = token(&e)?;
        TokenClient::new(&e, &token).transfer(&e.current_contract_address(), &staker, &amount);
        events::emit_unstaked(&e, &staker, amount, record.amount);
        Ok(())
    }

    /// Pay out the caller's pending reward. Returns the amount transferred
    /// after any penalty debt deduction.
    pub fn claim(
        e: Env,
        staker: Address,
        proof: Option<OnlineProof>,
    ) -> Result<i128, ContractError> {
        staker.require_auth();
        require_no_accusation(&e, &staker)?;
        check_liveness(&e, &staker, &proof)?;

        let mut pool = load_pool(&e)?;
        settle_pool(&e, &mut pool)?;
        let mut record = load_stake(&e, &staker).ok_or(ContractError::NothingStaked)?;
        let paid = settle_and_pay(&e, &staker, &pool, &mut record)?;
        e.storage()
            .persistent()
            .set(&DataKey::Stake(staker.clone()), &record);
        save_pool(&e, &pool);
        Ok(paid)
    }

    // ─── Accusation protocol ───────────────────────────────────────────

    /// Open an accusation against a staker, posting a bond equal to the
    /// accusation penalty. The target's staking operations are frozen until
    /// the accusation resolves.
    pub fn accuse(e: Env, accuser: Address, target: Address) -> Result<(), ContractError> {
        accuser.require_auth();
        let record = load_stake(&e, &target).ok_or(ContractError::NothingStaked)?;
        if record.amount == 0 {
            return Err(ContractError::NothingStaked);
        }
        require_no_accusation(&e, &target)?;

        let bond: i128 = e
            .storage()
            .instance()
            .get(&DataKey::AccusationPenalty)
            .ok_or(ContractError::NotInitialized)?;
        let window: u64 = e
            .storage()
            .instance()
            .get(&DataKey::AppealWindow)
            .ok_or(ContractError::NotInitialized)?;
        let now = e.ledger().timestamp();
        let accusation = Accusation {
            accuser: accuser.clone(),
            bond,
            opened_at: now,
            deadline: now.saturating_add(window),
        };
        e.storage()
            .persistent()
            .set(&DataKey::Accusation(target.clone()), &accusation);

        let token = token(&e)?;
        TokenClient::new(&e, &token).transfer(&accuser, &e.current_contract_address(), &bond);
        events::emit_accused(&e, &target, &accuser, accusation.deadline);
        Ok(())
    }

    /// Clear an accusation with a liveness proof signed after it opened.
    /// Anyone may submit; the proof itself is the authentication. The
    /// accuser's bond is forfeited to the target.
    pub fn appeal(e: Env, proof: OnlineProof) -> Result<(), ContractError> {
        let target = proof.keeper.clone();
        let accusation: Accusation = e
            .storage()
            .persistent()
            .get(&DataKey::Accusation(target.clone()))
            .ok_or(ContractError::NoAccusation)?;
        let now = e.ledger().timestamp();
        if now > accusation.deadline {
            return Err(ContractError::LateForAppeal);
        }
        if proof.timestamp <= accusation.opened_at {
            return Err(ContractError::StaleProof);
        }
        let validator: Option<BytesN<65>> = e
            .storage()
            .instance()
            .get(&DataKey::Validator)
            .ok_or(ContractError::NotInitialized)?;
        let validator = validator.ok_or(ContractError::ProofRequired)?;
        let message = attest::online_proof_message(&e, &target, proof.timestamp);
        attest::verify_single(&e, &message, &proof.sig, &validator)?;

        e.storage()
            .persistent()
            .remove(&DataKey::Accusation(target.clone()));
        let token = token(&e)?;
        TokenClient::new(&e, &token).transfer(
            &e.current_contract_address(),
            &target,
            &accusation.bond,
        );
        events::emit_accuse_lose(&e, &target, accusation.bond);
        Ok(())
    }

    /// Resolve an unappealed accusation after the window closes: the target
    /// is force-unstaked and the penalty recovered from their pending
    /// reward, then their stake, with any shortfall recorded as debt
    /// against future rewards. The accuser receives their bond back plus
    /// whatever portion of the penalty was recovered.
    pub fn win_accusation(
        e: Env,
        caller: Address,
        target: Address,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        let accusation: Accusation = e
            .storage()
            .persistent()
            .get(&DataKey::Accusation(target.clone()))
            .ok_or(ContractError::NoAccusation)?;
        if caller != accusation.accuser {
            return Err(ContractError::NotAccuser);
        }
        if e.ledger().timestamp() <= accusation.deadline {
            return Err(ContractError::AppealWindowOpen);
        }

        let mut pool = load_pool(&e)?;
        settle_pool(&e, &mut pool)?;
        let record = load_stake(&e, &target).ok_or(ContractError::NothingStaked)?;
        let reward = pending(&pool, &record)?;
        let penalty = accusation.bond;

        let (accuser_share, target_share, debt) = if reward >= penalty {
            // Reward alone covers the penalty; the stake is untouched and
            // no lasting debt remains.
            (accusation.bond + penalty, (reward - penalty) + record.amount, 0)
        } else {
            let from_stake = (penalty - reward).min(record.amount);
            (
                accusation.bond + reward + from_stake,
                record.amount - from_stake,
                penalty - reward - from_stake,
            )
        };

        pool.total_stakes -= record.amount;
        save_pool(&e, &pool);
        e.storage()
            .persistent()
            .remove(&DataKey::Stake(target.clone()));
        e.storage()
            .persistent()
            .remove(&DataKey::Accusation(target.clone()));
        if debt > 0 {
            let key = DataKey::Penalty(target.clone());
            let total = penalty_debt(&e, &target) + debt;
            e.storage().persistent().set(&key, &total);
        }

        let token = token(&e)?;
        let contract = e.current_contract_address();
        let client = TokenClient::new(&e, &token);
        client.transfer(&contract, &caller, &accuser_share);
        if target_share > 0 {
            client.transfer(&contract, &target, &target_share);
        }
        events::emit_accuse_win(&e, &target, accuser_share, debt);
        Ok(())
    }

    // ─── Views ─────────────────────────────────────────────────────────

    pub fn pool(e: Env) -> Result<PoolState, ContractError> {
        load_pool(&e)
    }

    pub fn stake_of(e: Env, staker: Address) -> Result<StakeRecord, ContractError> {
        load_stake(&e, &staker).ok_or(ContractError::NothingStaked)
    }

    /// Reward accrued but not yet paid, before penalty-debt deduction.
    pub fn pending_reward(e: Env, staker: Address) -> Result<i128, ContractError> {
        let mut pool = load_pool(&e)?;
        settle_pool(&e, &mut pool)?;
        let record = load_stake(&e, &staker).ok_or(ContractError::NothingStaked)?;
        pending(&pool, &record)
    }

    pub fn accusation_of(e: Env, target: Address) -> Result<Accusation, ContractError> {
        e.storage()
            .persistent()
            .get(&DataKey::Accusation(target))
            .ok_or(ContractError::NoAccusation)
    }

    pub fn penalty_of(e: Env, staker: Address) -> i128 {
        penalty_debt(&e, &staker)
    }

    /// The prehash a validator signs to vouch that `keeper` is online at
    /// `timestamp`.
    pub fn liveness_digest(e: Env, keeper: Address, timestamp: u64) -> BytesN<32> {
        attest::digest(&e, &attest::online_proof_message(&e, &keeper, timestamp))
    }
}
