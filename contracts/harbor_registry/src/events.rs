use soroban_sdk::{Address, Env, Symbol, Vec};

/// Emitted when a keeper deposits collateral (first time or top-up).
///
/// # Topics
/// * `Symbol` - "keeper_added"
/// * `Address` - The keeper
///
/// # Data
/// * `Address` - The collateral asset
/// * `i128` - The new total collateral in canonical units
pub fn emit_keeper_added(e: &Env, keeper: &Address, asset: &Address, total: i128) {
    let topics = (Symbol::new(e, "keeper_added"), keeper.clone());
    e.events().publish(topics, (asset.clone(), total));
}

/// Emitted when a keeper exits and their collateral is refunded.
///
/// # Topics
/// * `Symbol` - "keeper_deleted"
/// * `Address` - The keeper
///
/// # Data
/// * `i128` - Raw asset amount refunded
/// * `i128` - Early-exit fee withheld, in canonical units
pub fn emit_keeper_deleted(e: &Env, keeper: &Address, refunded_raw: i128, fee: i128) {
    let topics = (Symbol::new(e, "keeper_deleted"), keeper.clone());
    e.events().publish(topics, (refunded_raw, fee));
}

/// Emitted when a keeper swaps their collateral to a different asset.
///
/// # Topics
/// * `Symbol` - "asset_swapped"
/// * `Address` - The keeper
///
/// # Data
/// * `Address` - The new asset
/// * `i128` - The new collateral in canonical units
pub fn emit_asset_swapped(e: &Env, keeper: &Address, new_asset: &Address, new_amount: i128) {
    let topics = (Symbol::new(e, "asset_swapped"), keeper.clone());
    e.events().publish(topics, (new_asset.clone(), new_amount));
}

/// Emitted once per privileged batch import of keeper collateral.
///
/// # Topics
/// * `Symbol` - "keepers_imported"
///
/// # Data
/// * `Address` - The asset credited
/// * `i128` - Aggregate canonical amount divided across the batch
/// * `Vec<Address>` - The credited keepers
pub fn emit_keepers_imported(e: &Env, asset: &Address, total: i128, keepers: &Vec<Address>) {
    e.events().publish(
        (Symbol::new(e, "keepers_imported"),),
        (asset.clone(), total, keepers.clone()),
    );
}

/// Emitted per keeper punished in a `punish_keepers` batch.
///
/// # Topics
/// * `Symbol` - "keeper_punished"
/// * `Address` - The keeper
///
/// # Data
/// * `i128` - Canonical collateral seized
/// * `i128` - Portion burned directly against the overissue total
pub fn emit_keeper_punished(e: &Env, keeper: &Address, seized: i128, burned: i128) {
    let topics = (Symbol::new(e, "keeper_punished"), keeper.clone());
    e.events().publish(topics, (seized, burned));
}

/// Emitted when a confiscation accumulator is swept to the auction.
///
/// # Topics
/// * `Symbol` - "confiscated"
/// * `Address` - The asset
///
/// # Data
/// * `i128` - Raw amount swept into the new lot
pub fn emit_confiscated(e: &Env, asset: &Address, raw_amount: i128) {
    let topics = (Symbol::new(e, "confiscated"), asset.clone());
    e.events().publish(topics, raw_amount);
}

/// Emitted when canonical tokens are burned against the overissue total.
///
/// # Topics
/// * `Symbol` - "overissue_offset"
/// * `Address` - The caller who burned tokens
///
/// # Data
/// * `i128` - Amount burned
/// * `i128` - Overissued total remaining afterwards
pub fn emit_overissue_offset(e: &Env, caller: &Address, burned: i128, remaining: i128) {
    let topics = (Symbol::new(e, "overissue_offset"), caller.clone());
    e.events().publish(topics, (burned, remaining));
}

/// Emitted when an asset is registered or its scale updated.
pub fn emit_asset_registered(e: &Env, asset: &Address, scale: i128) {
    let topics = (Symbol::new(e, "asset_registered"), asset.clone());
    e.events().publish(topics, scale);
}

/// Emitted when a keeper rotates their attestation key.
pub fn emit_attest_key_set(e: &Env, keeper: &Address) {
    e.events()
        .publish((Symbol::new(e, "attest_key_set"),), keeper.clone());
}

/// Emitted when accrued early-exit fees are collected.
pub fn emit_fees_collected(e: &Env, asset: &Address, recipient: &Address, amount: i128) {
    e.events().publish(
        (Symbol::new(e, "fees_collected"),),
        (asset.clone(), recipient.clone(), amount),
    );
}
