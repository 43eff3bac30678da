use soroban_sdk::{contracttype, Address};

/// A per-beneficiary vesting schedule.
///
/// `initial` unlocks immediately at `start`; the remainder unlocks linearly
/// until `end`. `paused_at` is zero when the schedule is running, otherwise
/// the ledger timestamp at which it was frozen.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vesting {
    pub start: u64,
    pub end: u64,
    pub total: i128,
    pub initial: i128,
    pub claimed: i128,
    pub paused_at: u64,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Token,
    Vesting(Address),
}
