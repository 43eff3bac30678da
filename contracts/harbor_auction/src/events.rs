use soroban_sdk::{Address, Env, Symbol};

/// Emitted when a confiscation sweep creates or tops up a lot.
///
/// # Topics
/// * `Symbol` - "lot_created"
/// * `Address` - The asset on sale
///
/// # Data
/// * `i128` - Raw amount added
/// * `i128` - Total raw amount now remaining in the lot
pub fn emit_lot_created(e: &Env, asset: &Address, added: i128, remaining: i128) {
    let topics = (Symbol::new(e, "lot_created"), asset.clone());
    e.events().publish(topics, (added, remaining));
}

/// Emitted on every purchase from a lot.
///
/// # Topics
/// * `Symbol` - "auction_buy"
/// * `Address` - The buyer
///
/// # Data
/// * `Address` - The asset bought
/// * `i128` - Raw amount released to the buyer
/// * `i128` - Canonical cost paid
/// * `i128` - Raw amount remaining in the lot afterwards
pub fn emit_auction_buy(
    e: &Env,
    buyer: &Address,
    asset: &Address,
    raw_amount: i128,
    cost: i128,
    remaining: i128,
) {
    let topics = (Symbol::new(e, "auction_buy"), buyer.clone());
    e.events()
        .publish(topics, (asset.clone(), raw_amount, cost, remaining));
}
