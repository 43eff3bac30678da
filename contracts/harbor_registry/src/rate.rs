//! Rate conversion between heterogeneous asset units and the canonical
//! 18-decimal accounting unit.
//!
//! Each registered asset carries a positive `scale` multiplier (raw units ×
//! scale = canonical units). For the power-of-ten scales the protocol
//! actually configures, `to_canonical` and `from_canonical` are exact
//! inverses; both round toward zero.

use harbor_errors::ContractError;
use soroban_sdk::{Address, Env};

use crate::math::{div_i128, mul_i128};
use crate::types::DataKey;

/// Read the raw-to-canonical multiplier for `asset`.
pub fn asset_scale(e: &Env, asset: &Address) -> Result<i128, ContractError> {
    e.storage()
        .persistent()
        .get(&DataKey::AssetScale(asset.clone()))
        .ok_or(ContractError::UnknownAsset)
}

/// Convert a raw asset amount into canonical units.
pub fn to_canonical(e: &Env, asset: &Address, raw: i128) -> Result<i128, ContractError> {
    mul_i128(raw, asset_scale(e, asset)?)
}

/// Convert a canonical amount back into raw asset units, truncating any
/// sub-unit remainder toward zero.
pub fn from_canonical(e: &Env, asset: &Address, canonical: i128) -> Result<i128, ContractError> {
    div_i128(canonical, asset_scale(e, asset)?)
}
