//! Shared test helpers for custody state machine tests.

#![cfg(test)]

extern crate std;

use crate::{CustodyStateMachine, CustodyStateMachineClient, KeeperSig};
use harbor_attest::AttestSig;
use harbor_registry::{KeeperRegistry, KeeperRegistryClient};
use k256::ecdsa::SigningKey;
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::token::{StellarAssetClient, TokenClient};
use soroban_sdk::{Address, BytesN, Env, String, Vec};

/// Canonical fixed-point scale (18 decimals).
pub const PRECISION: i128 = 1_000_000_000_000_000_000;

/// Scale for the 8-decimal collateral asset keepers post.
pub const SCALE_8: i128 = 10_000_000_000;

/// Minimum collateral per group member, in canonical units.
pub const MIN_COLLATERAL: i128 = PRECISION;

pub const ONE_HOUR: u64 = 3_600;
pub const ONE_DAY: u64 = 86_400;

/// Base ledger timestamp for all scenarios.
pub const T0: u64 = 1_000_000;

pub struct Setup<'a> {
    pub admin: Address,
    pub verifier: Address,
    pub canonical: Address,
    pub asset: Address,
    pub registry_id: Address,
    pub registry: KeeperRegistryClient<'a>,
    pub contract_id: Address,
    pub client: CustodyStateMachineClient<'a>,
}

/// Deploys the registry and custody contracts wired together, with the
/// custody contract as both registry custodian and canonical token admin.
pub fn setup(e: &Env) -> Setup<'_> {
    e.mock_all_auths();
    e.ledger().with_mut(|li| li.timestamp = T0);

    let admin = Address::generate(e);
    let verifier = Address::generate(e);
    let canonical = e
        .register_stellar_asset_contract_v2(admin.clone())
        .address();
    let asset = e
        .register_stellar_asset_contract_v2(admin.clone())
        .address();

    let registry_id = e.register(KeeperRegistry, ());
    let registry = KeeperRegistryClient::new(e, &registry_id);
    registry.initialize(&admin, &canonical);
    registry.register_asset(&admin, &asset, &SCALE_8);

    let contract_id = e.register(CustodyStateMachine, ());
    let client = CustodyStateMachineClient::new(e, &contract_id);
    client.initialize(
        &admin,
        &registry_id,
        &canonical,
        &MIN_COLLATERAL,
        &ONE_DAY,
        &ONE_DAY,
        &ONE_HOUR,
        &verifier,
    );
    registry.set_custodian(&admin, &contract_id);
    // Custody mints the canonical token on verified deposits.
    StellarAssetClient::new(e, &canonical).set_admin(&contract_id);

    Setup {
        admin,
        verifier,
        canonical,
        asset,
        registry_id,
        registry,
        contract_id,
        client,
    }
}

pub fn at(e: &Env, ts: u64) {
    e.ledger().with_mut(|li| li.timestamp = ts);
}

pub fn tx(e: &Env, byte: u8) -> BytesN<32> {
    BytesN::from_array(e, &[byte; 32])
}

/// Deterministic secp256k1 keypair from a one-byte seed.
pub fn keypair(e: &Env, seed: u8) -> (SigningKey, BytesN<65>) {
    let mut bytes = [0u8; 32];
    bytes[31] = seed;
    let sk = SigningKey::from_bytes((&bytes).into()).unwrap();
    let vk = sk.verifying_key().to_encoded_point(false);
    let mut pk = [0u8; 65];
    pk.copy_from_slice(vk.as_bytes());
    (sk, BytesN::from_array(e, &pk))
}

/// Sign a 32-byte prehash, producing the on-chain signature form.
pub fn sign(e: &Env, sk: &SigningKey, prehash: &BytesN<32>) -> AttestSig {
    let (sig, rid) = sk.sign_prehash_recoverable(&prehash.to_array()).unwrap();
    let sig_bytes: [u8; 64] = sig.to_bytes().into();
    AttestSig {
        signature: BytesN::from_array(e, &sig_bytes),
        recovery_id: rid.to_byte() as u32,
    }
}

/// A collateralized keeper holding 2 canonical units, registered with a real
/// attestation key derived from `seed`.
pub fn new_keeper(e: &Env, s: &Setup, seed: u8) -> (Address, SigningKey) {
    let (sk, pk) = keypair(e, seed);
    let keeper = Address::generate(e);
    let raw = 200_000_000;
    StellarAssetClient::new(e, &s.asset).mint(&keeper, &raw);
    let expiry = e.ledger().sequence().saturating_add(10_000);
    TokenClient::new(e, &s.asset).approve(&keeper, &s.registry_id, &raw, &expiry);
    s.registry.add_keeper(&keeper, &s.asset, &raw, &pk);
    (keeper, sk)
}

/// A deployed group plus the signing keys of its members, in order.
pub struct TestGroup {
    pub btc: String,
    pub required: u32,
    pub members: std::vec::Vec<(Address, SigningKey)>,
}

impl TestGroup {
    pub fn addresses(&self, e: &Env) -> Vec<Address> {
        let mut out = Vec::new(e);
        for (addr, _) in &self.members {
            out.push_back(addr.clone());
        }
        out
    }
}

/// Create `n` fresh keepers and a group over them.
pub fn make_group(e: &Env, s: &Setup, n: u32, required: u32, capacity_sats: i128) -> TestGroup {
    let mut members = std::vec::Vec::new();
    for i in 0..n {
        members.push(new_keeper(e, s, 10 + i as u8));
    }
    let group = TestGroup {
        btc: String::from_str(e, "bc1qharborgroup0001"),
        required,
        members,
    };
    s.client
        .add_group(&s.admin, &group.btc, &group.addresses(e), &required, &capacity_sats);
    group
}

/// Signatures from the first `count` members over the working deposit.
pub fn attest_sigs(
    e: &Env,
    s: &Setup,
    g: &TestGroup,
    tx_id: &BytesN<32>,
    height: u64,
    count: usize,
) -> Vec<KeeperSig> {
    let prehash = s.client.mint_digest(&g.btc, tx_id, &height);
    let mut out = Vec::new(e);
    for (addr, sk) in g.members.iter().take(count) {
        out.push_back(KeeperSig {
            keeper: addr.clone(),
            sig: sign(e, sk, &prehash),
        });
    }
    out
}

/// Run a full request+verify deposit cycle, leaving the working receipt in
/// `DepositReceived` with canonical tokens minted to `recipient`.
pub fn minted_deposit(e: &Env, s: &Setup, g: &TestGroup, recipient: &Address, sats: i128) {
    let nonce = s.client.group(&g.btc).nonce + 1;
    s.client.request_mint(recipient, &g.btc, &nonce, &sats);
    let tx_id = tx(e, nonce as u8);
    let sigs = attest_sigs(e, s, g, &tx_id, 700_000, g.required as usize);
    s.client.verify_mint(&g.btc, &tx_id, &700_000, &sigs);
}
