use soroban_sdk::{contracttype, Address};

// ─── Keeper state ──────────────────────────────────────────────────────────

/// Collateral record for one keeper.
///
/// A keeper holds exactly one asset type at a time; `amount` is always in
/// canonical 18-decimal units regardless of the deposited asset. Records are
/// never removed: `amount == 0` is a tombstone meaning the keeper is
/// logically absent.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Keeper {
    /// The collateral asset this keeper deposited.
    pub asset: Address,
    /// Collateral in canonical units. 0 = tombstone.
    pub amount: i128,
    /// Number of custody groups currently referencing this keeper.
    /// Nonzero blocks deletion and asset swaps.
    pub ref_count: u32,
    /// Ledger timestamp of the first deposit (reset when re-joining from a
    /// tombstone). Drives the early-exit fee holding period.
    pub joined_at: u64,
}

// ─── Fee configuration ─────────────────────────────────────────────────────

/// Early-exit fee charged when a keeper deletes their record before the
/// minimum holding period has elapsed.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExitFeeConfig {
    /// Fee in basis points (100 bps = 1 %). 0 disables the fee.
    pub fee_bps: u32,
    /// Holding period in seconds after which the fee drops to zero.
    pub min_holding_secs: u64,
}

// ─── Storage keys ──────────────────────────────────────────────────────────

/// Small bounded config lives in `instance()`; per-keeper and per-asset
/// records live in `persistent()` so the instance footprint stays flat.
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Contract admin address. Stored in `instance()`.
    Admin,
    /// Canonical (wrapped-BTC) token address. Stored in `instance()`.
    CanonicalToken,
    /// Custody contract trusted to adjust ref counts. Stored in `instance()`.
    Custodian,
    /// Auction contract that receives confiscated lots. Stored in `instance()`.
    Auction,
    /// Early-exit fee parameters (`ExitFeeConfig`). Stored in `instance()`.
    ExitFee,
    /// Canonical-token shortfall still to be settled. Stored in `instance()`.
    Overissued,
    /// Raw-to-canonical multiplier per registered asset. Stored in `persistent()`.
    AssetScale(Address),
    /// Per-keeper collateral record. Stored in `persistent()`.
    Keeper(Address),
    /// Per-keeper attestation public key (secp256k1, uncompressed).
    /// Stored in `persistent()`.
    AttestKey(Address),
    /// Confiscated raw amount per asset, pending sweep. Stored in `persistent()`.
    Confiscation(Address),
    /// Accrued early-exit fees per asset, in raw units. Stored in `persistent()`.
    AccruedFees(Address),
}
