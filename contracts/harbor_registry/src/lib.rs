#![no_std]

//! # Harbor Keeper Registry
//!
//! Owns the keeper collateral lifecycle: deposit, exit, asset swap, batch
//! import, punishment, confiscation, and overissue accounting. Collateral is
//! tracked internally in canonical 18-decimal units regardless of the
//! deposited asset; conversion happens only at the asset boundary.
//!
//! The custody contract is the registry's one trusted peer: it bumps a
//! keeper's `ref_count` when the keeper joins a group and drops it when the
//! group is deleted. A nonzero `ref_count` blocks deletion and swaps.

mod events;
mod math;
mod rate;
mod types;

use harbor_auction::CollateralAuctionClient;
use harbor_errors::ContractError;
use soroban_sdk::{contract, contractimpl, token::TokenClient, Address, BytesN, Env, Vec};

use math::{add_i128, bps, sub_i128};
use types::DataKey;

pub use types::{ExitFeeConfig, Keeper};


#[cfg(test)]
mod test_registry;


// ─── Helpers ───────────────────────────────────────────────────────────────

fn require_admin(e: &Env, caller: &Address) -> Result<(), ContractError> {
    caller.require_auth();
    let stored: Address = e
        .storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(ContractError::NotInitialized)?;
    if stored != *caller {
        return Err(ContractError::NotAdmin);
    }
    Ok(())
}

fn require_custodian(e: &Env, caller: &Address) -> Result<(), ContractError> {
    caller.require_auth();
    let stored: Address = e
        .storage()
        .instance()
        .get(&DataKey::Custodian)
        .ok_or(ContractError::NotInitialized)?;
    if stored != *caller {
        return Err(ContractError::NotCustodian);
    }
    Ok(())
}

fn canonical_token(e: &Env) -> Result<Address, ContractError> {
    e.storage()
        .instance()
        .get(&DataKey::CanonicalToken)
        .ok_or(ContractError::NotInitialized)
}

fn load_keeper(e: &Env, addr: &Address) -> Option<Keeper> {
    e.storage().persistent().get(&DataKey::Keeper(addr.clone()))
}

fn store_keeper(e: &Env, addr: &Address, keeper: &Keeper) {
    e.storage()
        .persistent()
        .set(&DataKey::Keeper(addr.clone()), keeper);
}

/// Load a keeper that must be logically present (`amount > 0`).
fn load_live_keeper(e: &Env, addr: &Address) -> Result<Keeper, ContractError> {
    match load_keeper(e, addr) {
        Some(k) if k.amount > 0 => Ok(k),
        _ => Err(ContractError::KeeperNotFound),
    }
}

fn confiscation_of(e: &Env, asset: &Address) -> i128 {
    e.storage()
        .persistent()
        .get(&DataKey::Confiscation(asset.clone()))
        .unwrap_or(0)
}

fn set_confiscation(e: &Env, asset: &Address, amount: i128) {
    e.storage()
        .persistent()
        .set(&DataKey::Confiscation(asset.clone()), &amount);
}

fn overissued_total(e: &Env) -> i128 {
    e.storage().instance().get(&DataKey::Overissued).unwrap_or(0)
}

fn set_overissued(e: &Env, total: i128) {
    e.storage().instance().set(&DataKey::Overissued, &total);
}

// ─── Contract ──────────────────────────────────────────────────────────────

#[contract]
pub struct KeeperRegistry;

#[contractimpl]
impl KeeperRegistry {
    // ── Admin setup ────────────────────────────────────────────────────────

    /// One-time initialization. Stores `admin` and the canonical token.
    pub fn initialize(e: Env, admin: Address, canonical_token: Address) -> Result<(), ContractError> {
        if e.storage().instance().has(&DataKey::Admin) {
            return Err(ContractError::AlreadyInitialized);
        }
        e.storage().instance().set(&DataKey::Admin, &admin);
        e.storage()
            .instance()
            .set(&DataKey::CanonicalToken, &canonical_token);
        Ok(())
    }

    /// Register the custody contract trusted to adjust keeper ref counts.
    pub fn set_custodian(e: Env, admin: Address, custodian: Address) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        e.storage().instance().set(&DataKey::Custodian, &custodian);
        Ok(())
    }

    /// Register the auction contract that receives confiscated lots.
    pub fn set_auction(e: Env, admin: Address, auction: Address) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        e.storage().instance().set(&DataKey::Auction, &auction);
        Ok(())
    }

    /// Configure the early-exit fee. The fee applies to `delete_keeper`
    /// only while the keeper's holding period is still running.
    pub fn set_exit_fee(
        e: Env,
        admin: Address,
        fee_bps: u32,
        min_holding_secs: u64,
    ) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        if fee_bps > 10_000 {
            return Err(ContractError::InvalidFeeBps);
        }
        let cfg = ExitFeeConfig {
            fee_bps,
            min_holding_secs,
        };
        e.storage().instance().set(&DataKey::ExitFee, &cfg);
        Ok(())
    }

    /// Register a new collateral asset with its raw-to-canonical multiplier.
    /// The asset set is append-only; assets are never removed.
    pub fn register_asset(
        e: Env,
        admin: Address,
        asset: Address,
        scale: i128,
    ) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        if scale <= 0 {
            return Err(ContractError::InvalidAssetScale);
        }
        let key = DataKey::AssetScale(asset.clone());
        if e.storage().persistent().has(&key) {
            return Err(ContractError::AssetAlreadyRegistered);
        }
        e.storage().persistent().set(&key, &scale);
        events::emit_asset_registered(&e, &asset, scale);
        Ok(())
    }

    /// Update the conversion rate of an already-registered asset.
    pub fn set_asset_scale(
        e: Env,
        admin: Address,
        asset: Address,
        scale: i128,
    ) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        if scale <= 0 {
            return Err(ContractError::InvalidAssetScale);
        }
        let key = DataKey::AssetScale(asset.clone());
        if !e.storage().persistent().has(&key) {
            return Err(ContractError::UnknownAsset);
        }
        e.storage().persistent().set(&key, &scale);
        events::emit_asset_registered(&e, &asset, scale);
        Ok(())
    }

    // ── Keeper lifecycle ───────────────────────────────────────────────────

    /// Deposit collateral and become (or top up as) a keeper.
    ///
    /// A keeper holds exactly one asset type at a time: topping up with a
    /// different asset fails with `AssetMismatch` (use `swap_asset`). The
    /// caller must have approved this contract for `raw_amount`.
    ///
    /// Returns the keeper's new total collateral in canonical units.
    pub fn add_keeper(
        e: Env,
        keeper: Address,
        asset: Address,
        raw_amount: i128,
        attest_key: BytesN<65>,
    ) -> Result<i128, ContractError> {
        keeper.require_auth();
        if raw_amount <= 0 {
            return Err(ContractError::AmountMustBePositive);
        }
        let canonical = rate::to_canonical(&e, &asset, raw_amount)?;

        let now = e.ledger().timestamp();
        let record = match load_keeper(&e, &keeper) {
            Some(mut k) if k.amount > 0 => {
                if k.asset != asset {
                    return Err(ContractError::AssetMismatch);
                }
                k.amount = add_i128(k.amount, canonical)?;
                k
            }
            // Fresh keeper, or re-joining over a tombstone. A punished
            // keeper may still carry group references.
            Some(k) => Keeper {
                asset: asset.clone(),
                amount: canonical,
                ref_count: k.ref_count,
                joined_at: now,
            },
            None => Keeper {
                asset: asset.clone(),
                amount: canonical,
                ref_count: 0,
                joined_at: now,
            },
        };

        let contract = e.current_contract_address();
        TokenClient::new(&e, &asset).transfer_from(&contract, &keeper, &contract, &raw_amount);

        store_keeper(&e, &keeper, &record);
        e.storage()
            .persistent()
            .set(&DataKey::AttestKey(keeper.clone()), &attest_key);

        events::emit_keeper_added(&e, &keeper, &asset, record.amount);
        Ok(record.amount)
    }

    /// Rotate the secp256k1 key this keeper signs attestations with.
    pub fn set_attest_key(
        e: Env,
        keeper: Address,
        attest_key: BytesN<65>,
    ) -> Result<(), ContractError> {
        keeper.require_auth();
        load_live_keeper(&e, &keeper)?;
        e.storage()
            .persistent()
            .set(&DataKey::AttestKey(keeper.clone()), &attest_key);
        events::emit_attest_key_set(&e, &keeper);
        Ok(())
    }

    /// Exit the keeper set, refunding remaining collateral in the keeper's
    /// asset. Blocked while any group still references the keeper.
    ///
    /// An early-exit fee (basis points) is withheld if the minimum holding
    /// period has not elapsed; the fee accrues per-asset in the contract.
    ///
    /// Returns the raw asset amount refunded.
    pub fn delete_keeper(e: Env, keeper: Address) -> Result<i128, ContractError> {
        keeper.require_auth();
        let mut record = load_live_keeper(&e, &keeper)?;
        if record.ref_count > 0 {
            return Err(ContractError::KeeperInUse);
        }

        let now = e.ledger().timestamp();
        let fee = match e
            .storage()
            .instance()
            .get::<_, ExitFeeConfig>(&DataKey::ExitFee)
        {
            Some(cfg) if now < record.joined_at.saturating_add(cfg.min_holding_secs) => {
                bps(record.amount, cfg.fee_bps)?
            }
            _ => 0,
        };

        let refund_canonical = sub_i128(record.amount, fee)?;
        let refund_raw = rate::from_canonical(&e, &record.asset, refund_canonical)?;
        let fee_raw = rate::from_canonical(&e, &record.asset, fee)?;

        // CEI: tombstone the record before the refund transfer.
        let asset = record.asset.clone();
        record.amount = 0;
        store_keeper(&e, &keeper, &record);
        if fee_raw > 0 {
            let accrued: i128 = e
                .storage()
                .persistent()
                .get(&DataKey::AccruedFees(asset.clone()))
                .unwrap_or(0);
            e.storage()
                .persistent()
                .set(&DataKey::AccruedFees(asset.clone()), &add_i128(accrued, fee_raw)?);
        }

        let contract = e.current_contract_address();
        TokenClient::new(&e, &asset).transfer(&contract, &keeper, &refund_raw);

        events::emit_keeper_deleted(&e, &keeper, refund_raw, fee);
        Ok(refund_raw)
    }

    /// Replace the keeper's collateral with a different asset, atomically
    /// refunding the old asset and pulling the new one. The new canonical
    /// amount must not be lower than the old.
    pub fn swap_asset(
        e: Env,
        keeper: Address,
        new_asset: Address,
        new_raw_amount: i128,
    ) -> Result<(), ContractError> {
        keeper.require_auth();
        let mut record = load_live_keeper(&e, &keeper)?;
        if record.ref_count > 0 {
            return Err(ContractError::KeeperInUse);
        }
        if new_raw_amount <= 0 {
            return Err(ContractError::AmountMustBePositive);
        }

        let new_canonical = rate::to_canonical(&e, &new_asset, new_raw_amount)?;
        if new_canonical < record.amount {
            return Err(ContractError::CannotReduceAmount);
        }
        let old_asset = record.asset.clone();
        let old_raw = rate::from_canonical(&e, &old_asset, record.amount)?;

        record.asset = new_asset.clone();
        record.amount = new_canonical;
        store_keeper(&e, &keeper, &record);

        let contract = e.current_contract_address();
        TokenClient::new(&e, &new_asset).transfer_from(
            &contract,
            &keeper,
            &contract,
            &new_raw_amount,
        );
        TokenClient::new(&e, &old_asset).transfer(&contract, &keeper, &old_raw);

        events::emit_asset_swapped(&e, &keeper, &new_asset, new_canonical);
        Ok(())
    }

    /// Privileged batch credit used to migrate collateral into several
    /// keepers at once (e.g. re-seeding after an auction). The aggregate is
    /// pulled from the admin and divided per address; the truncation
    /// remainder goes to the first keeper so the total is conserved.
    ///
    /// Imported keepers have no attestation key yet; they must call
    /// `set_attest_key` before joining a group.
    pub fn import_keepers(
        e: Env,
        admin: Address,
        asset: Address,
        raw_amount: i128,
        keepers: Vec<Address>,
    ) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        if raw_amount <= 0 || keepers.is_empty() {
            return Err(ContractError::AmountMustBePositive);
        }
        let canonical = rate::to_canonical(&e, &asset, raw_amount)?;
        let n = keepers.len() as i128;
        let share = canonical / n;
        let remainder = canonical % n;

        let now = e.ledger().timestamp();
        for (i, addr) in keepers.iter().enumerate() {
            let credit = if i == 0 { share + remainder } else { share };
            let record = match load_keeper(&e, &addr) {
                Some(mut k) if k.amount > 0 => {
                    if k.asset != asset {
                        return Err(ContractError::AssetMismatch);
                    }
                    k.amount = add_i128(k.amount, credit)?;
                    k
                }
                Some(k) => Keeper {
                    asset: asset.clone(),
                    amount: credit,
                    ref_count: k.ref_count,
                    joined_at: now,
                },
                None => Keeper {
                    asset: asset.clone(),
                    amount: credit,
                    ref_count: 0,
                    joined_at: now,
                },
            };
            store_keeper(&e, &addr, &record);
        }

        let contract = e.current_contract_address();
        TokenClient::new(&e, &asset).transfer_from(&contract, &admin, &contract, &raw_amount);

        events::emit_keepers_imported(&e, &asset, canonical, &keepers);
        Ok(())
    }

    // ── Punishment and confiscation ────────────────────────────────────────

    /// Slash the listed keepers, seizing all their collateral, and record
    /// `overissue` canonical units of minted-but-unbacked supply.
    ///
    /// Canonical-token collateral settles the overissue directly: it is
    /// burned against the running total, in the order keepers are listed,
    /// and only the excess joins the canonical confiscation accumulator.
    /// Other assets accumulate in raw units per asset until `confiscate`
    /// sweeps them to the auction.
    pub fn punish_keepers(
        e: Env,
        admin: Address,
        keepers: Vec<Address>,
        overissue: i128,
    ) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        if overissue < 0 {
            return Err(ContractError::AmountMustBePositive);
        }
        let canonical_asset = canonical_token(&e)?;
        let contract = e.current_contract_address();
        let mut overissued = add_i128(overissued_total(&e), overissue)?;

        // Canonical-asset keepers settle overissue first, in listed order.
        for addr in keepers.iter() {
            let mut record = load_live_keeper(&e, &addr)?;
            if record.asset != canonical_asset {
                continue;
            }
            let seized = record.amount;
            let burned = seized.min(overissued);
            if burned > 0 {
                TokenClient::new(&e, &canonical_asset).burn(&contract, &burned);
                overissued -= burned;
            }
            let excess = seized - burned;
            if excess > 0 {
                set_confiscation(
                    &e,
                    &canonical_asset,
                    add_i128(confiscation_of(&e, &canonical_asset), excess)?,
                );
            }
            record.amount = 0;
            store_keeper(&e, &addr, &record);
            events::emit_keeper_punished(&e, &addr, seized, burned);
        }

        for addr in keepers.iter() {
            let mut record = match load_keeper(&e, &addr) {
                Some(k) if k.amount > 0 => k,
                // Already zeroed by the canonical pass.
                _ => continue,
            };
            let seized = record.amount;
            let raw = rate::from_canonical(&e, &record.asset, seized)?;
            set_confiscation(
                &e,
                &record.asset,
                add_i128(confiscation_of(&e, &record.asset), raw)?,
            );
            record.amount = 0;
            store_keeper(&e, &addr, &record);
            events::emit_keeper_punished(&e, &addr, seized, 0);
        }

        set_overissued(&e, overissued);
        Ok(())
    }

    /// Sweep each asset's confiscation accumulator to the auction contract,
    /// creating (or topping up) its lot, and reset the accumulator.
    pub fn confiscate(e: Env, admin: Address, assets: Vec<Address>) -> Result<(), ContractError> {
        require_admin(&e, &admin)?;
        let auction: Address = e
            .storage()
            .instance()
            .get(&DataKey::Auction)
            .ok_or(ContractError::NotInitialized)?;
        let contract = e.current_contract_address();

        for asset in assets.iter() {
            let amount = confiscation_of(&e, &asset);
            if amount == 0 {
                return Err(ContractError::NothingToConfiscate);
            }
            let scale = rate::asset_scale(&e, &asset)?;

            set_confiscation(&e, &asset, 0);
            TokenClient::new(&e, &asset).transfer(&contract, &auction, &amount);
            CollateralAuctionClient::new(&e, &auction).create_lot(
                &contract,
                &asset,
                &amount,
                &scale,
            );
            events::emit_confiscated(&e, &asset, amount);
        }
        Ok(())
    }

    /// Burn canonical tokens from the caller against the overissued total.
    /// Permissionless. Returns the amount actually burned
    /// (`min(amount, total)`).
    pub fn offset_overissue(e: Env, caller: Address, amount: i128) -> Result<i128, ContractError> {
        caller.require_auth();
        if amount <= 0 {
            return Err(ContractError::AmountMustBePositive);
        }
        let total = overissued_total(&e);
        if total == 0 {
            return Err(ContractError::NothingOverissued);
        }
        let burned = amount.min(total);

        let contract = e.current_contract_address();
        TokenClient::new(&e, &canonical_token(&e)?).burn_from(&contract, &caller, &burned);
        let remaining = total - burned;
        set_overissued(&e, remaining);

        events::emit_overissue_offset(&e, &caller, burned, remaining);
        Ok(burned)
    }

    // ── Custodian hooks ────────────────────────────────────────────────────

    /// Bump a keeper's group reference count. Custody contract only.
    pub fn inc_ref(e: Env, custodian: Address, keeper: Address) -> Result<(), ContractError> {
        require_custodian(&e, &custodian)?;
        let mut record = load_live_keeper(&e, &keeper)?;
        record.ref_count += 1;
        store_keeper(&e, &keeper, &record);
        Ok(())
    }

    /// Drop a keeper's group reference count. Custody contract only.
    pub fn dec_ref(e: Env, custodian: Address, keeper: Address) -> Result<(), ContractError> {
        require_custodian(&e, &custodian)?;
        // Punished keepers are tombstones but may still hold references.
        let mut record = load_keeper(&e, &keeper).ok_or(ContractError::KeeperNotFound)?;
        if record.ref_count == 0 {
            return Err(ContractError::Underflow);
        }
        record.ref_count -= 1;
        store_keeper(&e, &keeper, &record);
        Ok(())
    }

    // ── Fees ───────────────────────────────────────────────────────────────

    /// Collect accrued early-exit fees for one asset.
    pub fn collect_fees(
        e: Env,
        admin: Address,
        asset: Address,
        recipient: Address,
    ) -> Result<i128, ContractError> {
        require_admin(&e, &admin)?;
        let accrued: i128 = e
            .storage()
            .persistent()
            .get(&DataKey::AccruedFees(asset.clone()))
            .unwrap_or(0);
        if accrued == 0 {
            return Err(ContractError::NoFeesAccrued);
        }
        e.storage()
            .persistent()
            .set(&DataKey::AccruedFees(asset.clone()), &0_i128);

        let contract = e.current_contract_address();
        TokenClient::new(&e, &asset).transfer(&contract, &recipient, &accrued);

        events::emit_fees_collected(&e, &asset, &recipient, accrued);
        Ok(accrued)
    }

    // ── Views ──────────────────────────────────────────────────────────────

    /// Full keeper record, tombstones included.
    pub fn keeper(e: Env, addr: Address) -> Result<Keeper, ContractError> {
        load_keeper(&e, &addr).ok_or(ContractError::KeeperNotFound)
    }

    /// Canonical collateral of a keeper; 0 when absent or tombstoned.
    pub fn collateral_of(e: Env, addr: Address) -> i128 {
        load_keeper(&e, &addr).map(|k| k.amount).unwrap_or(0)
    }

    /// The attestation key of a live keeper.
    pub fn attest_key_of(e: Env, addr: Address) -> Result<BytesN<65>, ContractError> {
        load_live_keeper(&e, &addr)?;
        e.storage()
            .persistent()
            .get(&DataKey::AttestKey(addr))
            .ok_or(ContractError::KeeperNotFound)
    }

    /// Raw-to-canonical multiplier of a registered asset.
    pub fn asset_scale_of(e: Env, asset: Address) -> Result<i128, ContractError> {
        rate::asset_scale(&e, &asset)
    }

    /// Canonical-token shortfall still outstanding.
    pub fn overissued(e: Env) -> i128 {
        overissued_total(&e)
    }

    /// Confiscated raw amount pending sweep for `asset`.
    pub fn confiscation(e: Env, asset: Address) -> i128 {
        confiscation_of(&e, &asset)
    }

    /// Accrued early-exit fees for `asset`, in raw units.
    pub fn accrued_fees(e: Env, asset: Address) -> i128 {
        e.storage()
            .persistent()
            .get(&DataKey::AccruedFees(asset))
            .unwrap_or(0)
    }
}
