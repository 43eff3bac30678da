//! Keeper collateral lifecycle tests: add, delete, swap, import, refcounts.

#![cfg(test)]

extern crate std;

use crate::test_helpers::*;
use harbor_errors::ContractError;
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::token::TokenClient;
use soroban_sdk::{vec, Address, Env};

// ═══════════════════════════════════════════════════════════════════
// 1. Initialization and asset registration
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_initialize_twice_fails() {
    let e = Env::default();
    let s = setup(&e);
    assert_eq!(
        s.client.try_initialize(&s.admin, &s.canonical),
        Err(Ok(ContractError::AlreadyInitialized))
    );
}

#[test]
fn test_register_asset_twice_fails() {
    let e = Env::default();
    let s = setup(&e);
    assert_eq!(
        s.client.try_register_asset(&s.admin, &s.asset, &SCALE_8),
        Err(Ok(ContractError::AssetAlreadyRegistered))
    );
}

#[test]
fn test_register_asset_requires_admin() {
    let e = Env::default();
    let s = setup(&e);
    let intruder = Address::generate(&e);
    let other = Address::generate(&e);
    assert_eq!(
        s.client.try_register_asset(&intruder, &other, &SCALE_8),
        Err(Ok(ContractError::NotAdmin))
    );
}

#[test]
fn test_set_asset_scale_updates_rate() {
    let e = Env::default();
    let s = setup(&e);
    s.client.set_asset_scale(&s.admin, &s.asset, &(SCALE_8 * 10));
    assert_eq!(s.client.asset_scale_of(&s.asset), SCALE_8 * 10);
}

#[test]
fn test_unknown_asset_fails() {
    let e = Env::default();
    let s = setup(&e);
    let unknown = Address::generate(&e);
    assert_eq!(
        s.client.try_asset_scale_of(&unknown),
        Err(Ok(ContractError::UnknownAsset))
    );
    let keeper = Address::generate(&e);
    assert_eq!(
        s.client
            .try_add_keeper(&keeper, &unknown, &100, &attest_key(&e, 1)),
        Err(Ok(ContractError::UnknownAsset))
    );
}

// ═══════════════════════════════════════════════════════════════════
// 2. add_keeper
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_add_keeper_converts_to_canonical() {
    let e = Env::default();
    let s = setup(&e);
    let keeper = new_keeper(&e, &s, 5_000_000_000); // 50 units of an 8-dec asset
    assert_eq!(s.client.collateral_of(&keeper), 5_000_000_000 * SCALE_8);
    let rec = s.client.keeper(&keeper);
    assert_eq!(rec.asset, s.asset);
    assert_eq!(rec.ref_count, 0);
    assert_eq!(rec.joined_at, 1_000_000);
}

#[test]
fn test_add_keeper_top_up_same_asset() {
    let e = Env::default();
    let s = setup(&e);
    let keeper = new_keeper(&e, &s, 1_000);
    fund(&e, &s, &s.asset, &keeper, 500);
    s.client
        .add_keeper(&keeper, &s.asset, &500, &attest_key(&e, 1));
    assert_eq!(s.client.collateral_of(&keeper), 1_500 * SCALE_8);
}

#[test]
fn test_add_keeper_different_asset_fails() {
    let e = Env::default();
    let s = setup(&e);
    let keeper = new_keeper(&e, &s, 1_000);
    fund(&e, &s, &s.canonical, &keeper, 500);
    assert_eq!(
        s.client
            .try_add_keeper(&keeper, &s.canonical, &500, &attest_key(&e, 1)),
        Err(Ok(ContractError::AssetMismatch))
    );
}

#[test]
fn test_add_keeper_zero_amount_fails() {
    let e = Env::default();
    let s = setup(&e);
    let keeper = Address::generate(&e);
    assert_eq!(
        s.client
            .try_add_keeper(&keeper, &s.asset, &0, &attest_key(&e, 1)),
        Err(Ok(ContractError::AmountMustBePositive))
    );
}

// ═══════════════════════════════════════════════════════════════════
// 3. delete_keeper and the early-exit fee
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_delete_keeper_full_refund_after_holding_period() {
    let e = Env::default();
    let s = setup(&e);
    s.client.set_exit_fee(&s.admin, &250, &ONE_WEEK);
    let keeper = new_keeper(&e, &s, 10_000);

    e.ledger()
        .with_mut(|li| li.timestamp = 1_000_000 + ONE_WEEK);
    let refunded = s.client.delete_keeper(&keeper);
    assert_eq!(refunded, 10_000);
    assert_eq!(TokenClient::new(&e, &s.asset).balance(&keeper), 10_000);
    // Tombstone: record survives with zero amount.
    assert_eq!(s.client.keeper(&keeper).amount, 0);
}

#[test]
fn test_delete_keeper_early_exit_fee() {
    let e = Env::default();
    let s = setup(&e);
    s.client.set_exit_fee(&s.admin, &250, &ONE_WEEK); // 2.5 %
    let keeper = new_keeper(&e, &s, 10_000);

    e.ledger().with_mut(|li| li.timestamp = 1_000_000 + ONE_DAY);
    let refunded = s.client.delete_keeper(&keeper);
    assert_eq!(refunded, 9_750);
    assert_eq!(s.client.accrued_fees(&s.asset), 250);

    // Admin can collect the fee.
    let treasury = Address::generate(&e);
    assert_eq!(s.client.collect_fees(&s.admin, &s.asset, &treasury), 250);
    assert_eq!(TokenClient::new(&e, &s.asset).balance(&treasury), 250);
    assert_eq!(
        s.client.try_collect_fees(&s.admin, &s.asset, &treasury),
        Err(Ok(ContractError::NoFeesAccrued))
    );
}

#[test]
fn test_delete_keeper_blocked_by_ref_count() {
    let e = Env::default();
    let s = setup(&e);
    let custodian = Address::generate(&e);
    s.client.set_custodian(&s.admin, &custodian);

    let keeper = new_keeper(&e, &s, 1_000);
    s.client.inc_ref(&custodian, &keeper);
    assert_eq!(
        s.client.try_delete_keeper(&keeper),
        Err(Ok(ContractError::KeeperInUse))
    );
    s.client.dec_ref(&custodian, &keeper);
    s.client.delete_keeper(&keeper);
}

#[test]
fn test_delete_missing_keeper_fails() {
    let e = Env::default();
    let s = setup(&e);
    let nobody = Address::generate(&e);
    assert_eq!(
        s.client.try_delete_keeper(&nobody),
        Err(Ok(ContractError::KeeperNotFound))
    );
}

// ═══════════════════════════════════════════════════════════════════
// 4. swap_asset
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_swap_asset_refunds_old_and_pulls_new() {
    let e = Env::default();
    let s = setup(&e);
    let keeper = new_keeper(&e, &s, 1_000);
    let old_canonical = s.client.collateral_of(&keeper);

    // Swap into the canonical token at an equal canonical amount.
    fund(&e, &s, &s.canonical, &keeper, old_canonical);
    s.client.swap_asset(&keeper, &s.canonical, &old_canonical);

    let rec = s.client.keeper(&keeper);
    assert_eq!(rec.asset, s.canonical);
    assert_eq!(rec.amount, old_canonical);
    // Old asset fully refunded.
    assert_eq!(TokenClient::new(&e, &s.asset).balance(&keeper), 1_000);
}

#[test]
fn test_swap_asset_cannot_reduce() {
    let e = Env::default();
    let s = setup(&e);
    let keeper = new_keeper(&e, &s, 1_000);
    let smaller = s.client.collateral_of(&keeper) - 1;
    fund(&e, &s, &s.canonical, &keeper, smaller);
    assert_eq!(
        s.client.try_swap_asset(&keeper, &s.canonical, &smaller),
        Err(Ok(ContractError::CannotReduceAmount))
    );
}

#[test]
fn test_swap_asset_blocked_by_ref_count() {
    let e = Env::default();
    let s = setup(&e);
    let custodian = Address::generate(&e);
    s.client.set_custodian(&s.admin, &custodian);
    let keeper = new_keeper(&e, &s, 1_000);
    s.client.inc_ref(&custodian, &keeper);
    fund(&e, &s, &s.canonical, &keeper, DEFAULT_MINT);
    assert_eq!(
        s.client.try_swap_asset(&keeper, &s.canonical, &DEFAULT_MINT),
        Err(Ok(ContractError::KeeperInUse))
    );
}

// ═══════════════════════════════════════════════════════════════════
// 5. import_keepers
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_import_keepers_divides_with_remainder_to_first() {
    let e = Env::default();
    let s = setup(&e);
    let a = Address::generate(&e);
    let b = Address::generate(&e);
    let c = Address::generate(&e);

    fund(&e, &s, &s.asset, &s.admin, 1_000);
    s.client.import_keepers(
        &s.admin,
        &s.asset,
        &1_000,
        &vec![&e, a.clone(), b.clone(), c.clone()],
    );

    let total = 1_000 * SCALE_8;
    let share = total / 3;
    let rem = total % 3;
    assert_eq!(s.client.collateral_of(&a), share + rem);
    assert_eq!(s.client.collateral_of(&b), share);
    assert_eq!(s.client.collateral_of(&c), share);
    // The aggregate is conserved exactly.
    assert_eq!(
        s.client.collateral_of(&a) + s.client.collateral_of(&b) + s.client.collateral_of(&c),
        total
    );
}

#[test]
fn test_import_keepers_requires_admin() {
    let e = Env::default();
    let s = setup(&e);
    let intruder = Address::generate(&e);
    let a = Address::generate(&e);
    assert_eq!(
        s.client
            .try_import_keepers(&intruder, &s.asset, &100, &vec![&e, a]),
        Err(Ok(ContractError::NotAdmin))
    );
}

#[test]
fn test_imported_keeper_has_no_attest_key() {
    let e = Env::default();
    let s = setup(&e);
    let a = Address::generate(&e);
    fund(&e, &s, &s.asset, &s.admin, 100);
    s.client
        .import_keepers(&s.admin, &s.asset, &100, &vec![&e, a.clone()]);
    assert_eq!(
        s.client.try_attest_key_of(&a),
        Err(Ok(ContractError::KeeperNotFound))
    );
    s.client.set_attest_key(&a, &attest_key(&e, 9));
    assert_eq!(s.client.attest_key_of(&a), attest_key(&e, 9));
}

// ═══════════════════════════════════════════════════════════════════
// 6. Custodian hooks
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_ref_hooks_custodian_only() {
    let e = Env::default();
    let s = setup(&e);
    let custodian = Address::generate(&e);
    let intruder = Address::generate(&e);
    s.client.set_custodian(&s.admin, &custodian);
    let keeper = new_keeper(&e, &s, 1_000);

    assert_eq!(
        s.client.try_inc_ref(&intruder, &keeper),
        Err(Ok(ContractError::NotCustodian))
    );
    s.client.inc_ref(&custodian, &keeper);
    s.client.inc_ref(&custodian, &keeper);
    assert_eq!(s.client.keeper(&keeper).ref_count, 2);
    s.client.dec_ref(&custodian, &keeper);
    assert_eq!(s.client.keeper(&keeper).ref_count, 1);
}

// ═══════════════════════════════════════════════════════════════════
// 7. Conservation across a mixed op sequence
// ═══════════════════════════════════════════════════════════════════

/// Sum of live canonical collateral plus refunds always equals deposits.
#[test]
fn test_collateral_conservation() {
    let e = Env::default();
    let s = setup(&e);
    let a = new_keeper(&e, &s, 10_000);
    let b = new_keeper(&e, &s, 4_000);
    fund(&e, &s, &s.asset, &a, 6_000);
    s.client.add_keeper(&a, &s.asset, &6_000, &attest_key(&e, 1));

    let deposited = (10_000 + 4_000 + 6_000) * SCALE_8;
    assert_eq!(
        s.client.collateral_of(&a) + s.client.collateral_of(&b),
        deposited
    );

    let refunded_raw = s.client.delete_keeper(&b);
    assert_eq!(
        s.client.collateral_of(&a) + s.client.collateral_of(&b) + refunded_raw * SCALE_8,
        deposited
    );
    // Contract token balance matches live collateral.
    assert_eq!(
        TokenClient::new(&e, &s.asset).balance(&s.contract_id) * SCALE_8,
        s.client.collateral_of(&a)
    );
}
