use harbor_attest::AttestSig;
use soroban_sdk::{contracttype, Address, BytesN, String, Vec};

/// A set of keepers jointly controlling one BTC address.
///
/// `nonce` counts custody cycles and strictly increases; the receipt for the
/// current cycle is derived from `(btc_address, nonce)`. Balances and
/// capacity are in satoshi.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Group {
    pub keepers: Vec<Address>,
    /// Signatures needed to attest a deposit, `1..=keepers.len()`.
    pub required: u32,
    pub max_capacity: i128,
    pub current_balance: i128,
    pub nonce: u64,
    /// New mint requests are refused until this ledger timestamp.
    pub cooldown_until: u64,
}

/// Lifecycle of one deposit/withdrawal cycle.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReceiptStatus {
    Available,
    DepositRequested,
    DepositReceived,
    WithdrawRequested,
}

/// The record of one custody cycle for a group.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Receipt {
    pub status: ReceiptStatus,
    pub recipient: Address,
    /// Deposit amount in satoshi.
    pub amount: i128,
    /// BTC transaction id, zero until the deposit is attested.
    pub tx_id: BytesN<32>,
    /// Block height of the attested transaction, zero until attested.
    pub height: u64,
    /// Destination for the withdrawal, empty until a burn is requested.
    pub withdraw_address: String,
    /// Timestamp of the pending request, used for grace-period expiry.
    pub requested_at: u64,
}

/// One keeper's signature over a receipt attestation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeeperSig {
    pub keeper: Address,
    pub sig: AttestSig,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Registry,
    CanonicalToken,
    MinCollateral,
    MintGrace,
    BurnGrace,
    NonceCooldown,
    BurnVerifier,
    AllowExit,
    Exiting(Address),
    Group(String),
    Receipt(BytesN<32>),
}
