#![cfg(test)]

extern crate std;

use crate::{
    check_distinct, digest, online_proof_message, receipt_message, require_threshold,
    verify_single, AttestSig,
};
use harbor_errors::ContractError;
use k256::ecdsa::SigningKey;
use soroban_sdk::testutils::Address as _;
use soroban_sdk::{contract, contractimpl, vec, Address, BytesN, Env};

/// Empty contract so library calls can run inside a contract frame.
#[contract]
struct Shim;

#[contractimpl]
impl Shim {}

fn shim(e: &Env) -> Address {
    e.register(Shim, ())
}

/// Deterministic secp256k1 keypair from a one-byte seed.
/// Returns the signing key and the uncompressed 65-byte public key.
fn keypair(e: &Env, seed: u8) -> (SigningKey, BytesN<65>) {
    let mut bytes = [0u8; 32];
    bytes[31] = seed;
    let sk = SigningKey::from_bytes((&bytes).into()).unwrap();
    let vk = sk.verifying_key().to_encoded_point(false);
    let mut pk = [0u8; 65];
    pk.copy_from_slice(vk.as_bytes());
    (sk, BytesN::from_array(e, &pk))
}

/// Sign a 32-byte prehash, producing the on-chain signature form.
fn sign(e: &Env, sk: &SigningKey, prehash: &BytesN<32>) -> AttestSig {
    let (sig, rid) = sk.sign_prehash_recoverable(&prehash.to_array()).unwrap();
    let sig_bytes: [u8; 64] = sig.to_bytes().into();
    AttestSig {
        signature: BytesN::from_array(e, &sig_bytes),
        recovery_id: rid.to_byte() as u32,
    }
}

#[test]
fn test_receipt_digest_is_deterministic() {
    let e = Env::default();
    let cid = shim(&e);
    e.as_contract(&cid, || {
        let receipt_id = BytesN::from_array(&e, &[1u8; 32]);
        let tx_id = BytesN::from_array(&e, &[2u8; 32]);
        let a = digest(&e, &receipt_message(&e, &receipt_id, &tx_id, 700_000));
        let b = digest(&e, &receipt_message(&e, &receipt_id, &tx_id, 700_000));
        assert_eq!(a, b);
    });
}

#[test]
fn test_receipt_digest_binds_every_field() {
    let e = Env::default();
    let cid = shim(&e);
    e.as_contract(&cid, || {
        let receipt_id = BytesN::from_array(&e, &[1u8; 32]);
        let tx_id = BytesN::from_array(&e, &[2u8; 32]);
        let base = digest(&e, &receipt_message(&e, &receipt_id, &tx_id, 700_000));

        let other_receipt = BytesN::from_array(&e, &[9u8; 32]);
        assert_ne!(
            base,
            digest(&e, &receipt_message(&e, &other_receipt, &tx_id, 700_000))
        );
        let other_tx = BytesN::from_array(&e, &[9u8; 32]);
        assert_ne!(
            base,
            digest(&e, &receipt_message(&e, &receipt_id, &other_tx, 700_000))
        );
        assert_ne!(
            base,
            digest(&e, &receipt_message(&e, &receipt_id, &tx_id, 700_001))
        );
    });
}

#[test]
fn test_receipt_and_online_messages_are_domain_separated() {
    let e = Env::default();
    let cid = shim(&e);
    e.as_contract(&cid, || {
        let keeper = Address::generate(&e);
        let receipt_id = BytesN::from_array(&e, &[1u8; 32]);
        let tx_id = BytesN::from_array(&e, &[2u8; 32]);
        let receipt = digest(&e, &receipt_message(&e, &receipt_id, &tx_id, 5));
        let online = digest(&e, &online_proof_message(&e, &keeper, 5));
        assert_ne!(receipt, online);
    });
}

#[test]
fn test_verify_single_accepts_matching_key() {
    let e = Env::default();
    let cid = shim(&e);
    e.as_contract(&cid, || {
        let (sk, pk) = keypair(&e, 7);
        let receipt_id = BytesN::from_array(&e, &[3u8; 32]);
        let tx_id = BytesN::from_array(&e, &[4u8; 32]);
        let msg = receipt_message(&e, &receipt_id, &tx_id, 123);
        let sig = sign(&e, &sk, &digest(&e, &msg));
        assert_eq!(verify_single(&e, &msg, &sig, &pk), Ok(()));
    });
}

#[test]
fn test_verify_single_rejects_wrong_key() {
    let e = Env::default();
    let cid = shim(&e);
    e.as_contract(&cid, || {
        let (sk, _pk) = keypair(&e, 7);
        let (_other_sk, other_pk) = keypair(&e, 8);
        let receipt_id = BytesN::from_array(&e, &[3u8; 32]);
        let tx_id = BytesN::from_array(&e, &[4u8; 32]);
        let msg = receipt_message(&e, &receipt_id, &tx_id, 123);
        let sig = sign(&e, &sk, &digest(&e, &msg));
        assert_eq!(
            verify_single(&e, &msg, &sig, &other_pk),
            Err(ContractError::InvalidSignature)
        );
    });
}

#[test]
fn test_verify_single_rejects_tampered_message() {
    let e = Env::default();
    let cid = shim(&e);
    e.as_contract(&cid, || {
        let (sk, pk) = keypair(&e, 7);
        let receipt_id = BytesN::from_array(&e, &[3u8; 32]);
        let tx_id = BytesN::from_array(&e, &[4u8; 32]);
        let msg = receipt_message(&e, &receipt_id, &tx_id, 123);
        let sig = sign(&e, &sk, &digest(&e, &msg));
        // Same signature presented against a message with a different height.
        let tampered = receipt_message(&e, &receipt_id, &tx_id, 124);
        assert_eq!(
            verify_single(&e, &tampered, &sig, &pk),
            Err(ContractError::InvalidSignature)
        );
    });
}

#[test]
fn test_online_proof_signature_binds_keeper() {
    let e = Env::default();
    let cid = shim(&e);
    e.as_contract(&cid, || {
        let (validator_sk, validator_pk) = keypair(&e, 42);
        let keeper = Address::generate(&e);
        let impostor = Address::generate(&e);

        let msg = online_proof_message(&e, &keeper, 1_000);
        let sig = sign(&e, &validator_sk, &digest(&e, &msg));
        assert_eq!(verify_single(&e, &msg, &sig, &validator_pk), Ok(()));

        // The same proof does not hold for another keeper.
        let transplanted = online_proof_message(&e, &impostor, 1_000);
        assert_eq!(
            verify_single(&e, &transplanted, &sig, &validator_pk),
            Err(ContractError::InvalidSignature)
        );
    });
}

#[test]
fn test_check_distinct_accepts_unique_signers() {
    let e = Env::default();
    let a = Address::generate(&e);
    let b = Address::generate(&e);
    let c = Address::generate(&e);
    assert_eq!(check_distinct(&vec![&e, a, b, c]), Ok(()));
}

#[test]
fn test_check_distinct_rejects_duplicates() {
    let e = Env::default();
    let a = Address::generate(&e);
    let b = Address::generate(&e);
    assert_eq!(
        check_distinct(&vec![&e, a.clone(), b, a]),
        Err(ContractError::DuplicateSigner)
    );
}

#[test]
fn test_require_threshold() {
    assert_eq!(require_threshold(3, 3), Ok(()));
    assert_eq!(require_threshold(4, 3), Ok(()));
    assert_eq!(
        require_threshold(2, 3),
        Err(ContractError::NotEnoughSignatures)
    );
}
