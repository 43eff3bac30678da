#![no_std]

//! # Harbor Attestation Library
//!
//! Builds the domain-separated messages that off-chain observers sign, and
//! verifies recoverable secp256k1 signatures against the keys keepers and
//! validators registered on-chain.
//!
//! Messages are `#[contracttype]` structs serialized to XDR and hashed with
//! keccak256. Every message embeds a protocol domain tag and the ledger
//! network id, so a signature produced for one network or message kind can
//! never be replayed against another.
//!
//! Signature recovery is the Soroban host primitive
//! (`env.crypto().secp256k1_recover`); this crate only decides what gets
//! hashed and whether the recovered key matches the claimed one. Threshold
//! counting and group-membership checks belong to the calling contract.

use harbor_errors::ContractError;
use soroban_sdk::{
    contracttype, xdr::ToXdr, Address, Bytes, BytesN, Env, Symbol, Vec,
};

/// Protocol domain tag mixed into every signed message.
const DOMAIN_TAG: &str = "HARBOR_V1";

// ─── Signature material ────────────────────────────────────────────────────

/// A recoverable secp256k1 signature as submitted by an off-chain signer.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttestSig {
    /// 64-byte compact ECDSA signature (r || s), low-S form.
    pub signature: BytesN<64>,
    /// Recovery id in `0..=3` as produced by the signer.
    pub recovery_id: u32,
}

/// A validator-signed statement that `keeper` was reachable at `timestamp`.
///
/// Anyone may submit a proof on a keeper's behalf; the signature binds the
/// exact `(keeper, timestamp)` pair, so a proof can never be transplanted
/// onto another keeper or another instant.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OnlineProof {
    pub keeper: Address,
    pub timestamp: u64,
    pub sig: AttestSig,
}

// ─── Signed message layouts ────────────────────────────────────────────────

/// The statement keepers sign to attest a deposit or withdrawal receipt.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
struct ReceiptStatement {
    domain: Symbol,
    network: BytesN<32>,
    receipt_id: BytesN<32>,
    tx_id: BytesN<32>,
    height: u64,
}

/// The statement a validator signs to prove a keeper is online.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
struct OnlineStatement {
    domain: Symbol,
    network: BytesN<32>,
    keeper: Address,
    timestamp: u64,
}

/// Serialized message a keeper signs over a receipt custody event.
pub fn receipt_message(
    e: &Env,
    receipt_id: &BytesN<32>,
    tx_id: &BytesN<32>,
    height: u64,
) -> Bytes {
    ReceiptStatement {
        domain: Symbol::new(e, DOMAIN_TAG),
        network: e.ledger().network_id().into(),
        receipt_id: receipt_id.clone(),
        tx_id: tx_id.clone(),
        height,
    }
    .to_xdr(e)
}

/// Serialized message a validator signs to vouch that `keeper` is online.
pub fn online_proof_message(e: &Env, keeper: &Address, timestamp: u64) -> Bytes {
    OnlineStatement {
        domain: Symbol::new(e, DOMAIN_TAG),
        network: e.ledger().network_id().into(),
        keeper: keeper.clone(),
        timestamp,
    }
    .to_xdr(e)
}

// ─── Verification ──────────────────────────────────────────────────────────

/// The 32-byte keccak256 prehash off-chain signers must sign.
pub fn digest(e: &Env, message: &Bytes) -> BytesN<32> {
    e.crypto().keccak256(message).to_bytes()
}

/// Recover the uncompressed 65-byte public key that produced `sig` over
/// `message`. A malformed signature traps in the host rather than returning.
pub fn recover(e: &Env, message: &Bytes, sig: &AttestSig) -> BytesN<65> {
    let hash = e.crypto().keccak256(message);
    e.crypto()
        .secp256k1_recover(&hash, &sig.signature, sig.recovery_id)
}

/// Verify that `sig` over `message` recovers to exactly `expected` key.
pub fn verify_single(
    e: &Env,
    message: &Bytes,
    sig: &AttestSig,
    expected: &BytesN<65>,
) -> Result<(), ContractError> {
    if recover(e, message, sig) != *expected {
        return Err(ContractError::InvalidSignature);
    }
    Ok(())
}

/// Reject a claimed signer set containing the same address twice. A single
/// keeper must never be able to satisfy a threshold alone.
pub fn check_distinct(signers: &Vec<Address>) -> Result<(), ContractError> {
    for i in 0..signers.len() {
        let a = signers.get_unchecked(i);
        for j in (i + 1)..signers.len() {
            if a == signers.get_unchecked(j) {
                return Err(ContractError::DuplicateSigner);
            }
        }
    }
    Ok(())
}

/// Enforce that the validated signer count meets the caller's threshold.
pub fn require_threshold(count: u32, required: u32) -> Result<(), ContractError> {
    if count < required {
        return Err(ContractError::NotEnoughSignatures);
    }
    Ok(())
}

mod test_attest;
