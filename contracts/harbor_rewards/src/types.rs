use soroban_sdk::{contracttype, Address};

/// Global accrual state of the reward pool.
///
/// `dps` is the cumulative dividend-per-share, scaled by `PRECISION`. It only
/// ever grows, and only while `last_ts` lies inside the `[start, end]`
/// schedule window.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolState {
    pub total_stakes: i128,
    pub dps: i128,
    pub last_ts: u64,
    /// Reward tokens emitted per second across the whole pool.
    pub rate: i128,
    pub start: u64,
    pub end: u64,
}

/// One staker's position.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeRecord {
    pub amount: i128,
    /// The pool `dps` up to which this staker has been paid.
    pub settled_dps: i128,
}

/// An open accusation of keeper unresponsiveness.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Accusation {
    pub accuser: Address,
    /// Bond posted by the accuser, equal to the accusation penalty.
    pub bond: i128,
    pub opened_at: u64,
    /// Appeals are accepted up to and including this timestamp.
    pub deadline: u64,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Token,
    Pool,
    Validator,
    ProofTolerance,
    AccusationPenalty,
    AppealWindow,
    Stake(Address),
    Accusation(Address),
    /// Outstanding penalty debt deducted from future reward payouts.
    Penalty(Address),
}
