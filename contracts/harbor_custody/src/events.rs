use soroban_sdk::{Address, BytesN, Env, String, Symbol, Vec};

/// Emitted when a keeper group is created.
///
/// # Topics
/// * `Symbol` - "group_added"
/// * `String` - The group's BTC address
///
/// # Data
/// * `Vec<Address>` - The member keepers
/// * `u32` - Signatures required to attest a deposit
pub fn emit_group_added(e: &Env, btc_address: &String, keepers: &Vec<Address>, required: u32) {
    let topics = (Symbol::new(e, "group_added"), btc_address.clone());
    e.events().publish(topics, (keepers.clone(), required));
}

/// Emitted when a group is dissolved.
pub fn emit_group_deleted(e: &Env, btc_address: &String) {
    e.events()
        .publish((Symbol::new(e, "group_deleted"),), btc_address.clone());
}

/// Emitted when a new deposit cycle opens.
///
/// # Topics
/// * `Symbol` - "mint_requested"
/// * `String` - The group's BTC address
///
/// # Data
/// * `BytesN<32>` - The receipt id
/// * `Address` - The recipient
/// * `i128` - Requested amount in satoshi
pub fn emit_mint_requested(
    e: &Env,
    btc_address: &String,
    receipt_id: &BytesN<32>,
    recipient: &Address,
    amount: i128,
) {
    let topics = (Symbol::new(e, "mint_requested"), btc_address.clone());
    e.events()
        .publish(topics, (receipt_id.clone(), recipient.clone(), amount));
}

/// Emitted when a deposit is attested and canonical tokens are minted.
///
/// # Topics
/// * `Symbol` - "mint_verified"
/// * `BytesN<32>` - The receipt id
///
/// # Data
/// * `BytesN<32>` - The attested BTC transaction id
/// * `i128` - Canonical tokens minted to the recipient
pub fn emit_mint_verified(e: &Env, receipt_id: &BytesN<32>, tx_id: &BytesN<32>, minted: i128) {
    let topics = (Symbol::new(e, "mint_verified"), receipt_id.clone());
    e.events().publish(topics, (tx_id.clone(), minted));
}

/// Emitted when a pending deposit request is withdrawn or expires.
pub fn emit_mint_revoked(e: &Env, receipt_id: &BytesN<32>, forced: bool) {
    let topics = (Symbol::new(e, "mint_revoked"), receipt_id.clone());
    e.events().publish(topics, forced);
}

/// Emitted when a withdrawal cycle opens and canonical tokens are escrowed.
///
/// # Topics
/// * `Symbol` - "burn_requested"
/// * `BytesN<32>` - The receipt id
///
/// # Data
/// * `String` - The withdrawal destination address
/// * `i128` - Canonical tokens escrowed
pub fn emit_burn_requested(
    e: &Env,
    receipt_id: &BytesN<32>,
    withdraw_address: &String,
    escrowed: i128,
) {
    let topics = (Symbol::new(e, "burn_requested"), receipt_id.clone());
    e.events().publish(topics, (withdraw_address.clone(), escrowed));
}

/// Emitted when a withdrawal is confirmed and the escrow is burned.
pub fn emit_burn_verified(e: &Env, receipt_id: &BytesN<32>, burned: i128, forced: bool) {
    let topics = (Symbol::new(e, "burn_verified"), receipt_id.clone());
    e.events().publish(topics, (burned, forced));
}

/// Emitted when a stuck withdrawal is rolled back and the escrow refunded.
pub fn emit_burn_recovered(e: &Env, receipt_id: &BytesN<32>, refunded: i128) {
    let topics = (Symbol::new(e, "burn_recovered"), receipt_id.clone());
    e.events().publish(topics, refunded);
}

/// Emitted when a keeper flips their exit intent.
pub fn emit_exit_toggled(e: &Env, keeper: &Address, exiting: bool) {
    let topics = (Symbol::new(e, "exit_toggled"), keeper.clone());
    e.events().publish(topics, exiting);
}
