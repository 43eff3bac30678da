use soroban_sdk::{Address, Env, Symbol};

/// Emitted on every stake increase.
///
/// # Topics
/// * `Symbol` - "staked"
/// * `Address` - The staker
///
/// # Data
/// * `i128` - Amount added
/// * `i128` - The staker's new total
pub fn emit_staked(e: &Env, staker: &Address, amount: i128, total: i128) {
    let topics = (Symbol::new(e, "staked"), staker.clone());
    e.events().publish(topics, (amount, total));
}

/// Emitted on every stake decrease.
pub fn emit_unstaked(e: &Env, staker: &Address, amount: i128, remaining: i128) {
    let topics = (Symbol::new(e, "unstaked"), staker.clone());
    e.events().publish(topics, (amount, remaining));
}

/// Emitted whenever pending reward is paid out, including the implicit
/// payout inside stake/unstake settlement.
///
/// # Topics
/// * `Symbol` - "reward_paid"
/// * `Address` - The staker
///
/// # Data
/// * `i128` - Amount transferred after penalty-debt deduction
/// * `i128` - Penalty debt applied, zero for debt-free stakers
pub fn emit_reward_paid(e: &Env, staker: &Address, paid: i128, debt_applied: i128) {
    let topics = (Symbol::new(e, "reward_paid"), staker.clone());
    e.events().publish(topics, (paid, debt_applied));
}

/// Emitted when the emission rate changes.
pub fn emit_rate_updated(e: &Env, old_rate: i128, new_rate: i128) {
    e.events()
        .publish((Symbol::new(e, "rate_updated"),), (old_rate, new_rate));
}

/// Emitted when an accusation opens against a staker.
///
/// # Topics
/// * `Symbol` - "accused"
/// * `Address` - The target
///
/// # Data
/// * `Address` - The accuser
/// * `u64` - Appeal deadline timestamp
pub fn emit_accused(e: &Env, target: &Address, accuser: &Address, deadline: u64) {
    let topics = (Symbol::new(e, "accused"), target.clone());
    e.events().publish(topics, (accuser.clone(), deadline));
}

/// Emitted when a target clears an accusation with a fresh liveness proof.
/// The accuser's bond goes to the target.
pub fn emit_accuse_lose(e: &Env, target: &Address, bond: i128) {
    let topics = (Symbol::new(e, "accuse_lose"), target.clone());
    e.events().publish(topics, bond);
}

/// Emitted when an accusation is won and the target force-unstaked.
///
/// # Topics
/// * `Symbol` - "accuse_win"
/// * `Address` - The target
///
/// # Data
/// * `i128` - Total paid to the accuser (bond plus penalty recovered)
/// * `i128` - Residual penalty recorded as the target's debt
pub fn emit_accuse_win(e: &Env, target: &Address, accuser_paid: i128, debt: i128) {
    let topics = (Symbol::new(e, "accuse_win"), target.clone());
    e.events().publish(topics, (accuser_paid, debt));
}
