use soroban_sdk::{contracttype, Address};

/// One active lot of confiscated collateral, per asset.
///
/// The price decays linearly from 1.0 to 0.0 of canonical value over
/// `duration` seconds starting at `start`. Buyers may partially drain the
/// lot; a fresh confiscation of the same asset tops `remaining` up and
/// restarts the decay.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Lot {
    /// Ledger timestamp when the decay started.
    pub start: u64,
    /// Decay duration in seconds.
    pub duration: u64,
    /// Raw asset units still for sale.
    pub remaining: i128,
    /// Raw-to-canonical multiplier captured at confiscation time.
    pub scale: i128,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Contract admin address. Stored in `instance()`.
    Admin,
    /// Keeper registry trusted to create lots. Stored in `instance()`.
    Registry,
    /// Canonical token buyers pay with. Stored in `instance()`.
    CanonicalToken,
    /// Address that receives auction proceeds. Stored in `instance()`.
    Beneficiary,
    /// Decay duration applied to new lots, in seconds. Stored in `instance()`.
    Duration,
    /// Active lot per asset. Stored in `persistent()`.
    Lot(Address),
}
