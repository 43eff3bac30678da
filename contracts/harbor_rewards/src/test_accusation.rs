//! Accusation protocol tests: bonds, appeals, forced unstaking, debt.

#![cfg(test)]

extern crate std;

use crate::test_helpers::*;
use harbor_errors::ContractError;
use soroban_sdk::testutils::Address as _;
use soroban_sdk::token::TokenClient;
use soroban_sdk::{Address, Env};

fn balance(e: &Env, s: &Setup, who: &Address) -> i128 {
    TokenClient::new(e, &s.token).balance(who)
}

#[test]
fn test_accuse_posts_bond_and_freezes_target() {
    let e = Env::default();
    let s = setup(&e, true);
    let target = staker(&e, &s, 10 * PENALTY);
    let accuser = staker(&e, &s, 10 * PENALTY);
    s.client.stake(&target, &100, &fresh_proof(&e, &s, &target));

    s.client.accuse(&accuser, &target);
    assert_eq!(balance(&e, &s, &accuser), 10 * PENALTY - PENALTY);

    let accusation = s.client.accusation_of(&target);
    assert_eq!(accusation.accuser, accuser);
    assert_eq!(accusation.bond, PENALTY);
    assert_eq!(accusation.deadline, T0 + APPEAL_WINDOW);

    // The target's pool operations are frozen while it stands.
    assert_eq!(
        s.client
            .try_claim(&target, &fresh_proof(&e, &s, &target)),
        Err(Ok(ContractError::OngoingAccusation))
    );
    assert_eq!(
        s.client
            .try_stake(&target, &1, &fresh_proof(&e, &s, &target)),
        Err(Ok(ContractError::OngoingAccusation))
    );
    assert_eq!(
        s.client
            .try_unstake(&target, &1, &fresh_proof(&e, &s, &target)),
        Err(Ok(ContractError::OngoingAccusation))
    );
}

#[test]
fn test_accuse_requires_staked_target() {
    let e = Env::default();
    let s = setup(&e, true);
    let accuser = staker(&e, &s, 10 * PENALTY);
    let idle = Address::generate(&e);
    assert_eq!(
        s.client.try_accuse(&accuser, &idle),
        Err(Ok(ContractError::NothingStaked))
    );
}

#[test]
fn test_only_one_open_accusation_per_target() {
    let e = Env::default();
    let s = setup(&e, true);
    let target = staker(&e, &s, 10 * PENALTY);
    let accuser = staker(&e, &s, 10 * PENALTY);
    s.client.stake(&target, &100, &fresh_proof(&e, &s, &target));
    s.client.accuse(&accuser, &target);
    assert_eq!(
        s.client.try_accuse(&accuser, &target),
        Err(Ok(ContractError::OngoingAccusation))
    );
}

#[test]
fn test_appeal_with_fresh_proof_wins_the_bond() {
    let e = Env::default();
    let s = setup(&e, true);
    let target = staker(&e, &s, 10 * PENALTY);
    let accuser = staker(&e, &s, 10 * PENALTY);
    s.client.stake(&target, &100, &fresh_proof(&e, &s, &target));
    s.client.accuse(&accuser, &target);

    // A proof signed after the accusation opened clears it.
    at(&e, T0 + 100);
    let before = balance(&e, &s, &target);
    s.client.appeal(&proof(&e, &s, &target, T0 + 50));

    assert_eq!(balance(&e, &s, &target), before + PENALTY);
    assert_eq!(
        s.client.try_accusation_of(&target),
        Err(Ok(ContractError::NoAccusation))
    );
    // Unfrozen: the target can operate again.
    s.client.claim(&target, &fresh_proof(&e, &s, &target));
}

#[test]
fn test_appeal_rejects_proof_predating_accusation() {
    let e = Env::default();
    let s = setup(&e, true);
    let target = staker(&e, &s, 10 * PENALTY);
    let accuser = staker(&e, &s, 10 * PENALTY);
    s.client.stake(&target, &100, &fresh_proof(&e, &s, &target));
    at(&e, T0 + 500);
    s.client.accuse(&accuser, &target);

    assert_eq!(
        s.client.try_appeal(&proof(&e, &s, &target, T0 + 500)),
        Err(Ok(ContractError::StaleProof))
    );
}

#[test]
fn test_appeal_after_window_fails() {
    let e = Env::default();
    let s = setup(&e, true);
    let target = staker(&e, &s, 10 * PENALTY);
    let accuser = staker(&e, &s, 10 * PENALTY);
    s.client.stake(&target, &100, &fresh_proof(&e, &s, &target));
    s.client.accuse(&accuser, &target);

    at(&e, T0 + APPEAL_WINDOW + 1);
    assert_eq!(
        s.client.try_appeal(&proof(&e, &s, &target, T0 + 100)),
        Err(Ok(ContractError::LateForAppeal))
    );
}

#[test]
fn test_win_accusation_gating() {
    let e = Env::default();
    let s = setup(&e, true);
    let target = staker(&e, &s, 10 * PENALTY);
    let accuser = staker(&e, &s, 10 * PENALTY);
    let stranger = Address::generate(&e);
    s.client.stake(&target, &100, &fresh_proof(&e, &s, &target));
    s.client.accuse(&accuser, &target);

    assert_eq!(
        s.client.try_win_accusation(&accuser, &target),
        Err(Ok(ContractError::AppealWindowOpen))
    );
    at(&e, T0 + APPEAL_WINDOW + 1);
    assert_eq!(
        s.client.try_win_accusation(&stranger, &target),
        Err(Ok(ContractError::NotAccuser))
    );
}

#[test]
fn test_win_covered_by_reward_leaves_no_debt() {
    let e = Env::default();
    let s = setup(&e, true);
    let target = staker(&e, &s, 10 * PENALTY);
    let accuser = staker(&e, &s, 10 * PENALTY);
    // Sole staker: accrues RATE per second, so the appeal window alone
    // earns far more than the penalty.
    s.client.stake(&target, &100, &fresh_proof(&e, &s, &target));
    s.client.accuse(&accuser, &target);

    at(&e, T0 + APPEAL_WINDOW + 1);
    let accuser_before = balance(&e, &s, &accuser);
    let target_before = balance(&e, &s, &target);
    s.client.win_accusation(&accuser, &target);

    let reward = RATE * (APPEAL_WINDOW + 1) as i128;
    assert!(reward >= PENALTY);
    // Accuser: bond back plus the penalty out of the target's reward.
    assert_eq!(balance(&e, &s, &accuser), accuser_before + PENALTY + PENALTY);
    // Target: rest of the reward plus their whole stake.
    assert_eq!(
        balance(&e, &s, &target),
        target_before + (reward - PENALTY) + 100
    );
    assert_eq!(s.client.penalty_of(&target), 0);
    assert_eq!(s.client.pool().total_stakes, 0);
    assert_eq!(
        s.client.try_stake_of(&target),
        Err(Ok(ContractError::NothingStaked))
    );
}

#[test]
fn test_win_shortfall_takes_stake_then_records_debt() {
    let e = Env::default();
    let s = setup(&e, true);
    let target = staker(&e, &s, 10 * PENALTY);
    let accuser = staker(&e, &s, 10 * PENALTY);
    let bystander = staker(&e, &s, 100 * PENALTY);
    // Dilute the pool so the target's reward share stays tiny, and keep
    // their stake below the penalty.
    let small = PENALTY / 10;
    s.client
        .stake(&bystander, &(1_000_000 * 100), &fresh_proof(&e, &s, &bystander));
    s.client.stake(&target, &small, &fresh_proof(&e, &s, &target));
    s.client.accuse(&accuser, &target);

    at(&e, T0 + APPEAL_WINDOW + 1);
    let reward = s.client.pending_reward(&target);
    assert!(reward < PENALTY);

    let accuser_before = balance(&e, &s, &accuser);
    let target_before = balance(&e, &s, &target);
    s.client.win_accusation(&accuser, &target);

    // The whole stake goes toward the penalty; the rest becomes debt.
    assert_eq!(
        balance(&e, &s, &accuser),
        accuser_before + PENALTY + reward + small
    );
    assert_eq!(balance(&e, &s, &target), target_before);
    assert_eq!(s.client.penalty_of(&target), PENALTY - reward - small);
}

#[test]
fn test_penalty_debt_is_deducted_from_future_rewards() {
    let e = Env::default();
    let s = setup(&e, true);
    let target = staker(&e, &s, 10 * PENALTY);
    let accuser = staker(&e, &s, 10 * PENALTY);
    let bystander = staker(&e, &s, 100 * PENALTY);
    s.client
        .stake(&bystander, &(1_000_000 * 100), &fresh_proof(&e, &s, &bystander));
    s.client
        .stake(&target, &(PENALTY / 10), &fresh_proof(&e, &s, &target));
    s.client.accuse(&accuser, &target);
    at(&e, T0 + APPEAL_WINDOW + 1);
    s.client.win_accusation(&accuser, &target);
    let debt = s.client.penalty_of(&target);
    assert!(debt > 0);

    // The target re-stakes big and accrues more than the debt; the first
    // payout is docked by exactly the outstanding amount.
    let now = T0 + APPEAL_WINDOW + 1;
    s.client
        .unstake(&bystander, &(1_000_000 * 100), &fresh_proof(&e, &s, &bystander));
    s.client
        .stake(&target, &100, &fresh_proof(&e, &s, &target));
    at(&e, T_END);
    let reward = RATE * (T_END - now) as i128;
    assert!(reward > debt);
    assert_eq!(
        s.client.claim(&target, &fresh_proof(&e, &s, &target)),
        reward - debt
    );
    assert_eq!(s.client.penalty_of(&target), 0);
}
