#![no_std]

//! # Harbor Custody State Machine
//!
//! Groups of keepers jointly custody a BTC address. Each deposit/withdrawal
//! cycle is tracked as a receipt that moves through a strict state machine:
//!
//! ```text
//! Available --request_mint--> DepositRequested --verify_mint--> DepositReceived
//! DepositRequested --revoke_mint / mint grace expiry--> Available
//! DepositReceived --request_burn--> WithdrawRequested --verify_burn--> Available
//! WithdrawRequested --recover_burn (grace expiry)--> DepositReceived
//! ```
//!
//! Deposits are attested by a threshold of the group's keepers; their
//! signatures are checked against the attestation keys held by the keeper
//! registry. A verified deposit mints canonical tokens to the recipient; a
//! verified withdrawal burns the escrowed tokens permanently.
//!
//! Submission is permissionless where the payload carries its own proof:
//! `verify_mint` authenticates signers, never the caller.

mod events;
mod types;

use harbor_attest as attest;
use harbor_errors::ContractError;
use harbor_registry::KeeperRegistryClient;
use soroban_sdk::token::{StellarAssetClient, TokenClient};
use soroban_sdk::xdr::ToXdr;
use soroban_sdk::{
    contract, contractimpl, contracttype, Address, BytesN, Env, String, TryFromVal, Val, Vec,
};
use types::DataKey;

pub use harbor_attest::AttestSig;
pub use types::{Group, KeeperSig, Receipt, ReceiptStatus};

#[cfg(test)]
mod test_helpers;

/// Multiplier from satoshi (8 decimals) to canonical token units (18).
pub const SATOSHI_SCALE: i128 = 10_000_000_000;

/// Preimage of a receipt id: one custody cycle of one group.
#[contracttype]
#[derive(Clone)]
struct ReceiptRef {
    btc_address: String,
    nonce: u64,
}

fn receipt_id(e: &Env, btc_address: &String, nonce: u64) -> BytesN<32> {
    let preimage = ReceiptRef {
        btc_address: btc_address.clone(),
        nonce,
    }
    .to_xdr(e);
    e.crypto().keccak256(&preimage).to_bytes()
}

// ─── Storage helpers ───────────────────────────────────────────────────────

fn instance_get<V: TryFromVal<Env, Val>>(e: &Env, key: &DataKey) -> Result<V, ContractError> {
    e.storage()
        .instance()
        .get(key)
        .ok_or(ContractError::NotInitialized)
}

fn require_admin(e: &Env, caller: &Address) -> Result<(), ContractError> {
    caller.require_auth();
    let admin: Address = instance_get(e, &DataKey::Admin)?;
    if admin != *caller {
        return Err(ContractError::NotAdmin);
    }
    Ok(())
}

fn load_group(e: &Env, btc_address: &String) -> Result<Group, ContractError> {
    e.storage()
        .persistent()
        .get(&DataKey::Group(btc_address.clone()))
        .ok_or(ContractError::GroupNotFound)
}

fn save_group(e: &Env, btc_address: &String, group: &Group) {
    e.storage()
        .persistent()
        .set(&DataKey::Group(btc_address.clone()), group);
}

fn save_receipt(e: &Env, id: &BytesN<32>, receipt: &Receipt) {
    e.storage()
        .persistent()
        .set(&DataKey::Receipt(id.clone()), receipt);
}

/// The receipt of the group's current cycle, if any cycle has opened.
fn working_receipt(e: &Env, btc_address: &String, group: &Group) -> Option<(BytesN<32>, Receipt)> {
    if group.nonce == 0 {
        return None;
    }
    let id = receipt_id(e, btc_address, group.nonce);
    let receipt = e.storage().persistent().get(&DataKey::Receipt(id.clone()))?;
    Some((id, receipt))
}

// ─── State transitions shared by direct and forced paths ───────────────────

/// Burn the withdrawal escrow and close the cycle. The receipt must already
/// be `WithdrawRequested`. Starts the group's nonce cooldown.
fn settle_burn(
    e: &Env,
    btc_address: &String,
    group: &mut Group,
    id: &BytesN<32>,
    receipt: &mut Receipt,
    forced: bool,
) -> Result<(), ContractError> {
    let escrowed = receipt
        .amount
        .checked_mul(SATOSHI_SCALE)
        .ok_or(ContractError::Overflow)?;
    group.current_balance = group
        .current_balance
        .checked_sub(receipt.amount)
        .ok_or(ContractError::Underflow)?;
    let cooldown: u64 = instance_get(e, &DataKey::NonceCooldown)?;
    group.cooldown_until = e.ledger().timestamp().saturating_add(cooldown);
    receipt.status = ReceiptStatus::Available;
    save_group(e, btc_address, group);
    save_receipt(e, id, receipt);

    let canonical: Address = instance_get(e, &DataKey::CanonicalToken)?;
    TokenClient::new(e, &canonical).burn(&e.current_contract_address(), &escrowed);
    events::emit_burn_verified(e, id, escrowed, forced);
    Ok(())
}

/// Open a new cycle for `group`. Caller has already verified the working
/// receipt is clear; the forced path skips the cooldown gate.
fn admit_request(
    e: &Env,
    btc_address: &String,
    group: &mut Group,
    recipient: &Address,
    nonce: u64,
    amount: i128,
    enforce_cooldown: bool,
) -> Result<BytesN<32>, ContractError> {
    if amount <= 0 {
        return Err(ContractError::AmountMustBePositive);
    }
    if nonce != group.nonce + 1 {
        return Err(ContractError::InvalidNonce);
    }
    let now = e.ledger().timestamp();
    if enforce_cooldown && now < group.cooldown_until {
        return Err(ContractError::GroupInCooldown);
    }
    let projected = group
        .current_balance
        .checked_add(amount)
        .ok_or(ContractError::Overflow)?;
    if projected > group.max_capacity {
        return Err(ContractError::CapacityExceeded);
    }

    group.nonce = nonce;
    save_group(e, btc_address, group);

    let id = receipt_id(e, btc_address, nonce);
    let receipt = Receipt {
        status: ReceiptStatus::DepositRequested,
        recipient: recipient.clone(),
        amount,
        tx_id: BytesN::from_array(e, &[0u8; 32]),
        height: 0,
        withdraw_address: String::from_str(e, ""),
        requested_at: now,
    };
    save_receipt(e, &id, &receipt);
    events::emit_mint_requested(e, btc_address, &id, recipient, amount);
    Ok(id)
}

// ─── Contract ──────────────────────────────────────────────────────────────

#[contract]
pub struct CustodyStateMachine;

#[contractimpl]
impl CustodyStateMachine {
    /// One-time initialization.
    ///
    /// `min_collateral` is in canonical units and gates group membership at
    /// `add_group` time only. `mint_grace` and `burn_grace` bound how long a
    /// pending request can block its group; `nonce_cooldown` delays the next
    /// cycle after a confirmed withdrawal.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        e: Env,
        admin: Address,
        registry: Address,
        canonical_token: Address,
        min_collateral: i128,
        mint_grace: u64,
        burn_grace: u64,
        nonce_cooldown: u64,
        burn_verifier: Address,
    ) -> Result<(), ContractError> {
        if e.storage().instance().has(&DataKey::Admin) {
            return Err(ContractError::AlreadyInitialized);
        }
        let storage = e.storage().instance();
        storage.set(&DataKey::Admin, &admin);
        storage.set(&DataKey::Registry, &registry);
        storage.set(&DataKey::CanonicalToken, &canonical_token);
        storage.set(&DataKey::MinCollateral, &min_collateral);
        storage.set(&DataKey::MintGrace, &mint_grace);
        storage.set(&DataKey::BurnGrace, &burn_grace);
        storage.set(&DataKey::NonceCooldown, &nonce_cooldown);
        storage.set(&DataKey::BurnVerifier, &burn_verifier);
        storage.set(&DataKey::AllowExit, &false);
        Ok(())
    }

    pub fn set_burn_verifier(
        e: Env,
        admin: Address,
        verifier: Address,
    ) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        e.storage().instance().set(&DataKey::BurnVerifier, &verifier);
        Ok(())
    }

    pub fn set_min_collateral(e: Env, admin: Address, amount: i128) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        e.storage().instance().set(&DataKey::MinCollateral, &amount);
        Ok(())
    }

    /// Global switch allowing exiting keepers to dissolve their own groups.
    pub fn set_allow_exit(e: Env, admin: Address, allowed: bool) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        e.storage().instance().set(&DataKey::AllowExit, &allowed);
        Ok(())
    }

    /// Flip the caller's exit intent. Returns the new state.
    pub fn toggle_exit(e: Env, keeper: Address) -> Result<bool, ContractError> {
        keeper.require_auth();
        let key = DataKey::Exiting(keeper.clone());
        let exiting = !e.storage().persistent().get(&key).unwrap_or(false);
        e.storage().persistent().set(&key, &exiting);
        events::emit_exit_toggled(&e, &keeper, exiting);
        Ok(exiting)
    }

    // ─── Group lifecycle ───────────────────────────────────────────────

    /// Create a group of keepers for a fresh BTC address.
    ///
    /// Every member must hold at least the configured minimum collateral in
    /// the registry at creation time; this is not re-checked afterwards.
    /// Registry reference counts pin the members until the group dissolves.
    pub fn add_group(
        e: Env,
        admin: Address,
        btc_address: String,
        keepers: Vec<Address>,
        required: u32,
        max_capacity: i128,
    ) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        if e.storage()
            .persistent()
            .has(&DataKey::Group(btc_address.clone()))
        {
            return Err(ContractError::GroupAlreadyExists);
        }
        if required == 0 || required > keepers.len() {
            return Err(ContractError::InvalidThreshold);
        }
        if max_capacity <= 0 {
            return Err(ContractError::AmountMustBePositive);
        }
        attest::check_distinct(&keepers)?;

        let min: i128 = instance_get(&e, &DataKey::MinCollateral)?;
        let registry_addr: Address = instance_get(&e, &DataKey::Registry)?;
        let registry = KeeperRegistryClient::new(&e, &registry_addr);
        let contract = e.current_contract_address();
        for keeper in keepers.iter() {
            if registry.collateral_of(&keeper) < min {
                return Err(ContractError::InsufficientCollateral);
            }
            registry.inc_ref(&contract, &keeper);
        }

        let group = Group {
            keepers: keepers.clone(),
            required,
            max_capacity,
            current_balance: 0,
            nonce: 0,
            cooldown_until: 0,
        };
        save_group(&e, &btc_address, &group);
        events::emit_group_added(&e, &btc_address, &keepers, required);
        Ok(())
    }

    /// Dissolve an empty group and release its members' registry references.
    ///
    /// The admin may always do this. A member keeper may do it themselves
    /// once the global exit switch is on and they have toggled their exit
    /// intent. Either way the group must hold no balance and no in-flight
    /// receipt.
    pub fn delete_group(e: Env, caller: Address, btc_address: String) -> Result<(), ContractError> {
        caller.require_auth();
        let group = load_group(&e, &btc_address)?;

        let admin: Address = instance_get(&e, &DataKey::Admin)?;
        if caller != admin {
            let allow_exit: bool = instance_get(&e, &DataKey::AllowExit)?;
            let exiting: bool = e
                .storage()
                .persistent()
                .get(&DataKey::Exiting(caller.clone()))
                .unwrap_or(false);
            if !allow_exit || !exiting || !group.keepers.contains(&caller) {
                return Err(ContractError::ExitNotAllowed);
            }
        }

        if group.current_balance != 0 {
            return Err(ContractError::GroupNotEmpty);
        }
        if let Some((_, receipt)) = working_receipt(&e, &btc_address, &group) {
            if receipt.status != ReceiptStatus::Available {
                return Err(ContractError::ReceiptInFlight);
            }
        }

        e.storage()
            .persistent()
            .remove(&DataKey::Group(btc_address.clone()));

        let registry_addr: Address = instance_get(&e, &DataKey::Registry)?;
        let registry = KeeperRegistryClient::new(&e, &registry_addr);
        let contract = e.current_contract_address();
        for keeper in group.keepers.iter() {
            registry.dec_ref(&contract, &keeper);
        }
        events::emit_group_deleted(&e, &btc_address);
        Ok(())
    }

    // ─── Deposit cycle ─────────────────────────────────────────────────

    /// Open a deposit cycle. `nonce` must be exactly the group's next nonce
    /// and the previous cycle must have fully closed.
    pub fn request_mint(
        e: Env,
        recipient: Address,
        btc_address: String,
        nonce: u64,
        amount: i128,
    ) -> Result<BytesN<32>, ContractError> {
        recipient.require_auth();
        let mut group = load_group(&e, &btc_address)?;
        if let Some((_, receipt)) = working_receipt(&e, &btc_address, &group) {
            if receipt.status != ReceiptStatus::Available {
                return Err(ContractError::ReceiptInFlight);
            }
        }
        admit_request(&e, &btc_address, &mut group, &recipient, nonce, amount, true)
    }

    /// Attest the working deposit with a threshold of keeper signatures and
    /// mint canonical tokens to the recipient.
    ///
    /// Callable by anyone; only the embedded signers are authenticated. Each
    /// signature must recover to the attestation key the registry holds for
    /// that keeper, every signer must currently be a group member, and no
    /// signer may appear twice.
    pub fn verify_mint(
        e: Env,
        btc_address: String,
        tx_id: BytesN<32>,
        height: u64,
        sigs: Vec<KeeperSig>,
    ) -> Result<(), ContractError> {
        let mut group = load_group(&e, &btc_address)?;
        let (id, mut receipt) =
            working_receipt(&e, &btc_address, &group).ok_or(ContractError::ReceiptNotFound)?;
        if receipt.status != ReceiptStatus::DepositRequested {
            return Err(ContractError::WrongReceiptStatus);
        }

        let mut signers: Vec<Address> = Vec::new(&e);
        for ks in sigs.iter() {
            signers.push_back(ks.keeper.clone());
        }
        attest::check_distinct(&signers)?;
        for signer in signers.iter() {
            if !group.keepers.contains(&signer) {
                return Err(ContractError::KeeperNotInGroup);
            }
        }
        attest::require_threshold(sigs.len(), group.required)?;

        let registry_addr: Address = instance_get(&e, &DataKey::Registry)?;
        let registry = KeeperRegistryClient::new(&e, &registry_addr);
        let message = attest::receipt_message(&e, &id, &tx_id, height);
        for ks in sigs.iter() {
            let key = registry.attest_key_of(&ks.keeper);
            attest::verify_single(&e, &message, &ks.sig, &key)?;
        }

        group.current_balance = group
            .current_balance
            .checked_add(receipt.amount)
            .ok_or(ContractError::Overflow)?;
        receipt.status = ReceiptStatus::DepositReceived;
        receipt.tx_id = tx_id.clone();
        receipt.height = height;
        save_group(&e, &btc_address, &group);
        save_receipt(&e, &id, &receipt);

        let minted = receipt
            .amount
            .checked_mul(SATOSHI_SCALE)
            .ok_or(ContractError::Overflow)?;
        let canonical: Address = instance_get(&e, &DataKey::CanonicalToken)?;
        StellarAssetClient::new(&e, &canonical).mint(&receipt.recipient, &minted);
        events::emit_mint_verified(&e, &id, &tx_id, minted);
        Ok(())
    }

    /// Withdraw a pending deposit request, reopening the cycle slot.
    pub fn revoke_mint(e: Env, caller: Address, btc_address: String) -> Result<(), ContractError> {
        caller.require_auth();
        let group = load_group(&e, &btc_address)?;
        let (id, mut receipt) =
            working_receipt(&e, &btc_address, &group).ok_or(ContractError::ReceiptNotFound)?;
        if receipt.status != ReceiptStatus::DepositRequested {
            return Err(ContractError::WrongReceiptStatus);
        }
        if caller != receipt.recipient {
            return Err(ContractError::NotRecipient);
        }
        receipt.status = ReceiptStatus::Available;
        save_receipt(&e, &id, &receipt);
        events::emit_mint_revoked(&e, &id, false);
        Ok(())
    }

    // ─── Withdrawal cycle ──────────────────────────────────────────────

    /// Open a withdrawal: escrow the recipient's canonical tokens and record
    /// the destination BTC address.
    pub fn request_burn(
        e: Env,
        caller: Address,
        btc_address: String,
        withdraw_address: String,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        let group = load_group(&e, &btc_address)?;
        let (id, mut receipt) =
            working_receipt(&e, &btc_address, &group).ok_or(ContractError::ReceiptNotFound)?;
        if receipt.status != ReceiptStatus::DepositReceived {
            return Err(ContractError::WrongReceiptStatus);
        }
        if caller != receipt.recipient {
            return Err(ContractError::NotRecipient);
        }

        let escrow = receipt
            .amount
            .checked_mul(SATOSHI_SCALE)
            .ok_or(ContractError::Overflow)?;
        receipt.status = ReceiptStatus::WithdrawRequested;
        receipt.withdraw_address = withdraw_address.clone();
        receipt.requested_at = e.ledger().timestamp();
        save_receipt(&e, &id, &receipt);

        let canonical: Address = instance_get(&e, &DataKey::CanonicalToken)?;
        TokenClient::new(&e, &canonical).transfer(&caller, &e.current_contract_address(), &escrow);
        events::emit_burn_requested(&e, &id, &withdraw_address, escrow);
        Ok(())
    }

    /// Confirm the withdrawal happened on the BTC side: burn the escrow and
    /// close the cycle. Callable by the configured verifier or any member
    /// keeper of the group.
    pub fn verify_burn(e: Env, caller: Address, btc_address: String) -> Result<(), ContractError> {
        caller.require_auth();
        let mut group = load_group(&e, &btc_address)?;
        let (id, mut receipt) =
            working_receipt(&e, &btc_address, &group).ok_or(ContractError::ReceiptNotFound)?;
        if receipt.status != ReceiptStatus::WithdrawRequested {
            return Err(ContractError::WrongReceiptStatus);
        }
        let verifier: Address = instance_get(&e, &DataKey::BurnVerifier)?;
        if caller != verifier && !group.keepers.contains(&caller) {
            return Err(ContractError::NotVerifier);
        }
        settle_burn(&e, &btc_address, &mut group, &id, &mut receipt, false)
    }

    /// Roll back a withdrawal nobody confirmed: refund the escrow and return
    /// the receipt to `DepositReceived`. Admin-only, and only after the burn
    /// grace period has elapsed.
    pub fn recover_burn(e: Env, admin: Address, btc_address: String) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        let group = load_group(&e, &btc_address)?;
        let (id, mut receipt) =
            working_receipt(&e, &btc_address, &group).ok_or(ContractError::ReceiptNotFound)?;
        if receipt.status != ReceiptStatus::WithdrawRequested {
            return Err(ContractError::WrongReceiptStatus);
        }
        let grace: u64 = instance_get(&e, &DataKey::BurnGrace)?;
        if e.ledger().timestamp() <= receipt.requested_at.saturating_add(grace) {
            return Err(ContractError::GracePeriodNotElapsed);
        }

        let escrow = receipt
            .amount
            .checked_mul(SATOSHI_SCALE)
            .ok_or(ContractError::Overflow)?;
        receipt.status = ReceiptStatus::DepositReceived;
        save_receipt(&e, &id, &receipt);

        let canonical: Address = instance_get(&e, &DataKey::CanonicalToken)?;
        TokenClient::new(&e, &canonical).transfer(
            &e.current_contract_address(),
            &receipt.recipient,
            &escrow,
        );
        events::emit_burn_recovered(&e, &id, escrow);
        Ok(())
    }

    // ─── Forced override ───────────────────────────────────────────────

    /// Open a deposit cycle over a stale working receipt.
    ///
    /// A `DepositRequested` receipt past its mint grace is auto-revoked; a
    /// `WithdrawRequested` receipt past its burn grace is auto-verified as
    /// if confirmed. A receipt still inside its grace window fails with
    /// `GracePeriodNotElapsed`, and a `DepositReceived` receipt can never be
    /// overridden. Skips the nonce cooldown gate: this path exists to
    /// unstick abandoned groups.
    pub fn force_request_mint(
        e: Env,
        recipient: Address,
        btc_address: String,
        nonce: u64,
        amount: i128,
    ) -> Result<BytesN<32>, ContractError> {
        recipient.require_auth();
        let mut group = load_group(&e, &btc_address)?;
        let now = e.ledger().timestamp();

        if let Some((id, mut receipt)) = working_receipt(&e, &btc_address, &group) {
            match receipt.status {
                ReceiptStatus::Available => {}
                ReceiptStatus::DepositRequested => {
                    let grace: u64 = instance_get(&e, &DataKey::MintGrace)?;
                    if now <= receipt.requested_at.saturating_add(grace) {
                        return Err(ContractError::GracePeriodNotElapsed);
                    }
                    receipt.status = ReceiptStatus::Available;
                    save_receipt(&e, &id, &receipt);
                    events::emit_mint_revoked(&e, &id, true);
                }
                ReceiptStatus::WithdrawRequested => {
                    let grace: u64 = instance_get(&e, &DataKey::BurnGrace)?;
                    if now <= receipt.requested_at.saturating_add(grace) {
                        return Err(ContractError::GracePeriodNotElapsed);
                    }
                    settle_burn(&e, &btc_address, &mut group, &id, &mut receipt, true)?;
                }
                ReceiptStatus::DepositReceived => {
                    return Err(ContractError::ReceiptInFlight);
                }
            }
        }

        admit_request(
            &e,
            &btc_address,
            &mut group,
            &recipient,
            nonce,
            amount,
            false,
        )
    }

    // ─── Views ─────────────────────────────────────────────────────────

    pub fn group(e: Env, btc_address: String) -> Result<Group, ContractError> {
        load_group(&e, &btc_address)
    }

    pub fn receipt(e: Env, id: BytesN<32>) -> Result<Receipt, ContractError> {
        e.storage()
            .persistent()
            .get(&DataKey::Receipt(id))
            .ok_or(ContractError::ReceiptNotFound)
    }

    /// The group's current cycle receipt.
    pub fn working_receipt(e: Env, btc_address: String) -> Result<Receipt, ContractError> {
        let group = load_group(&e, &btc_address)?;
        working_receipt(&e, &btc_address, &group)
            .map(|(_, receipt)| receipt)
            .ok_or(ContractError::ReceiptNotFound)
    }

    /// Id of the group's current cycle receipt.
    pub fn working_receipt_id(e: Env, btc_address: String) -> Result<BytesN<32>, ContractError> {
        let group = load_group(&e, &btc_address)?;
        if group.nonce == 0 {
            return Err(ContractError::ReceiptNotFound);
        }
        Ok(receipt_id(&e, &btc_address, group.nonce))
    }

    /// The prehash keepers must sign to attest the working deposit.
    pub fn mint_digest(
        e: Env,
        btc_address: String,
        tx_id: BytesN<32>,
        height: u64,
    ) -> Result<BytesN<32>, ContractError> {
        let group = load_group(&e, &btc_address)?;
        let (id, _) =
            working_receipt(&e, &btc_address, &group).ok_or(ContractError::ReceiptNotFound)?;
        Ok(attest::digest(&e, &attest::receipt_message(&e, &id, &tx_id, height)))
    }

    pub fn is_exiting(e: Env, keeper: Address) -> bool {
        e.storage()
            .persistent()
            .get(&DataKey::Exiting(keeper))
            .unwrap_or(false)
    }
}
