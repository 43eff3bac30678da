#![no_std]

use soroban_sdk::contracterror;

/// @title  ErrorCategory
/// @notice Groups errors by domain for monitoring, alerting, and dashboards.
/// @dev    Off-chain consumers should switch on this value first, then on the
///         specific `ContractError` code for fine-grained handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Contract setup and initialization errors (codes 1-99).
    Initialization,
    /// Caller identity and permission errors (codes 100-199).
    Authorization,
    /// Keeper collateral lifecycle errors (codes 200-299).
    Collateral,
    /// Group and receipt state-machine errors (codes 300-399).
    Custody,
    /// Signature and liveness-proof errors (codes 400-499).
    Attestation,
    /// Reward accrual and accusation errors (codes 500-599).
    Rewards,
    /// Confiscated-collateral auction errors (codes 600-699).
    Auction,
    /// Vesting schedule errors (codes 700-799).
    Vesting,
    /// Safe-math errors (codes 800-899).
    Arithmetic,
}

/// @title  ContractError
/// @notice Canonical error enum shared by all Harbor smart contracts.
/// @dev    Codes are wire-stable. Never renumber a variant after deployment.
///         Append new variants at the end of their category block only.
///         Use the ErrorExt trait to retrieve the category and description.
///
/// Error Code Layout:
///   1  -  99  : Initialization
///   100 - 199 : Authorization
///   200 - 299 : Collateral (keeper registry)
///   300 - 399 : Custody (groups and receipts)
///   400 - 499 : Attestation (signatures, liveness proofs)
///   500 - 599 : Rewards and accusations
///   600 - 699 : Auction
///   700 - 799 : Vesting
///   800 - 899 : Arithmetic
#[contracterror(export = false)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum ContractError {
    // --- Initialization (1-99) ---
    /// Contract has not been initialized yet.
    /// Contracts: registry, custody, rewards, auction, vesting
    NotInitialized = 1,

    /// Contract has already been initialized and cannot be re-initialized.
    /// Contracts: registry, custody, rewards, auction, vesting
    AlreadyInitialized = 2,

    // --- Authorization (100-199) ---
    /// Caller is not the admin.
    /// Contracts: registry, custody, rewards, auction, vesting
    NotAdmin = 100,

    /// Caller is not the registered custody contract.
    /// Contracts: registry
    NotCustodian = 101,

    /// Caller is neither the burn verifier nor a member keeper of the group.
    /// Contracts: custody
    NotVerifier = 102,

    /// Caller is not the recipient recorded on the receipt.
    /// Contracts: custody
    NotRecipient = 103,

    /// Caller is not the accuser of the open accusation.
    /// Contracts: rewards
    NotAccuser = 104,

    /// Caller is not the registered keeper-registry contract.
    /// Contracts: auction
    NotRegistry = 105,

    // --- Collateral (200-299) ---
    /// Asset is not registered with the rate converter.
    /// Contracts: registry, auction
    UnknownAsset = 200,

    /// Asset has already been registered; use set_asset_scale to change rates.
    /// Contracts: registry
    AssetAlreadyRegistered = 201,

    /// Keeper already holds collateral in a different asset.
    /// Contracts: registry
    AssetMismatch = 202,

    /// No keeper record with nonzero collateral exists for this address.
    /// Contracts: registry, custody
    KeeperNotFound = 203,

    /// Keeper is still referenced by one or more custody groups.
    /// Contracts: registry
    KeeperInUse = 204,

    /// A collateral swap may not reduce the canonical amount.
    /// Contracts: registry
    CannotReduceAmount = 205,

    /// Amount argument must be strictly positive (> 0).
    /// Contracts: registry, custody, rewards, auction, vesting
    AmountMustBePositive = 206,

    /// No confiscated collateral is accumulated for this asset.
    /// Contracts: registry
    NothingToConfiscate = 207,

    /// There is no outstanding overissued amount to offset.
    /// Contracts: registry
    NothingOverissued = 208,

    /// No protocol fees are accrued for this asset.
    /// Contracts: registry
    NoFeesAccrued = 209,

    /// Asset scale must be a positive power-of-ten multiplier.
    /// Contracts: registry
    InvalidAssetScale = 210,

    /// Fee basis-points value must be in the range 0-10000.
    /// Contracts: registry
    InvalidFeeBps = 211,

    // --- Custody (300-399) ---
    /// No group exists for the given BTC address.
    /// Contracts: custody
    GroupNotFound = 300,

    /// A group already exists for the given BTC address.
    /// Contracts: custody
    GroupAlreadyExists = 301,

    /// Group still custodies a nonzero BTC balance.
    /// Contracts: custody
    GroupNotEmpty = 302,

    /// The group's working receipt is mid-flight; the operation must wait.
    /// Contracts: custody
    ReceiptInFlight = 303,

    /// Receipt nonce must be exactly the group nonce plus one.
    /// Contracts: custody
    InvalidNonce = 304,

    /// Receipt is not in the state required for this transition.
    /// Contracts: custody
    WrongReceiptStatus = 305,

    /// Deposit would push the group balance past its maximum capacity.
    /// Contracts: custody
    CapacityExceeded = 306,

    /// The group is in its post-withdrawal cooldown window.
    /// Contracts: custody
    GroupInCooldown = 307,

    /// The stale receipt's grace period has not elapsed yet.
    /// Contracts: custody
    GracePeriodNotElapsed = 308,

    /// A signer in the attestation set is not a member of the group.
    /// Contracts: custody
    KeeperNotInGroup = 309,

    /// Keeper collateral is below the minimum required to join a group.
    /// Contracts: custody
    InsufficientCollateral = 310,

    /// Group signature threshold must satisfy 0 < required <= member count.
    /// Contracts: custody
    InvalidThreshold = 311,

    /// Self-exit group deletion is not enabled or the caller is not exiting.
    /// Contracts: custody
    ExitNotAllowed = 312,

    /// No receipt exists for the given receipt id.
    /// Contracts: custody
    ReceiptNotFound = 313,

    // --- Attestation (400-499) ---
    /// Signature does not recover to the expected key.
    /// Contracts: custody, rewards
    InvalidSignature = 400,

    /// The same signer appears more than once in the attestation set.
    /// Contracts: custody
    DuplicateSigner = 401,

    /// Fewer valid signatures than the group's required threshold.
    /// Contracts: custody
    NotEnoughSignatures = 402,

    /// The liveness proof timestamp is outside the tolerance window.
    /// Contracts: rewards
    ProofExpired = 403,

    /// A liveness proof is required for this pool but none was supplied.
    /// Contracts: rewards
    ProofRequired = 404,

    /// The liveness proof predates the accusation it is meant to answer.
    /// Contracts: rewards
    StaleProof = 405,

    // --- Rewards / accusations (500-599) ---
    /// Staked amount is insufficient for the requested operation.
    /// Contracts: rewards
    InsufficientStake = 500,

    /// The target has no stake and cannot be accused.
    /// Contracts: rewards
    NothingStaked = 501,

    /// An accusation is already open against this keeper.
    /// Contracts: rewards
    OngoingAccusation = 502,

    /// No open accusation exists for this keeper.
    /// Contracts: rewards
    NoAccusation = 503,

    /// The appeal window has elapsed; the appeal is too late.
    /// Contracts: rewards
    LateForAppeal = 504,

    /// The appeal window is still open; the accusation cannot be won yet.
    /// Contracts: rewards
    AppealWindowOpen = 505,

    /// Reward schedule bounds are invalid (end must be after start).
    /// Contracts: rewards
    InvalidSchedule = 506,

    // --- Auction (600-699) ---
    /// The auction for this asset has not started.
    /// Contracts: auction
    AuctionNotStarted = 600,

    /// No active lot exists for this asset.
    /// Contracts: auction
    NoActiveLot = 601,

    /// The requested amount exceeds what remains in the lot.
    /// Contracts: auction
    LotExhausted = 602,

    // --- Vesting (700-799) ---
    /// A vesting schedule already exists for this beneficiary.
    /// Contracts: vesting
    VestingAlreadyExists = 700,

    /// No vesting schedule exists for this beneficiary.
    /// Contracts: vesting
    VestingNotFound = 701,

    /// Vesting parameters are invalid (initial > total, or end <= start).
    /// Contracts: vesting
    InvalidVestingParams = 702,

    /// Nothing is claimable at the current time.
    /// Contracts: vesting
    NothingClaimable = 703,

    /// The vesting schedule is already paused.
    /// Contracts: vesting
    AlreadyPaused = 704,

    /// The vesting schedule is not paused.
    /// Contracts: vesting
    NotPaused = 705,

    // --- Arithmetic (800-899) ---
    /// Integer overflow detected during a checked arithmetic operation.
    Overflow = 800,

    /// Integer underflow detected during a checked arithmetic operation.
    Underflow = 801,

    /// Division by zero detected during a checked arithmetic operation.
    DivisionByZero = 802,
}

/// @title  ErrorExt
/// @notice Provides category() and description() on every ContractError variant.
/// @dev    Use this for structured logging, monitoring, and off-chain display.
pub trait ErrorExt {
    /// @return The ErrorCategory bucket this error belongs to.
    fn category(&self) -> ErrorCategory;

    /// @return A static string description safe for logging or display.
    fn description(&self) -> &'static str;
}

impl ErrorExt for ContractError {
    fn category(&self) -> ErrorCategory {
        match self {
            ContractError::NotInitialized | ContractError::AlreadyInitialized => {
                ErrorCategory::Initialization
            }

            ContractError::NotAdmin
            | ContractError::NotCustodian
            | ContractError::NotVerifier
            | ContractError::NotRecipient
            | ContractError::NotAccuser
            | ContractError::NotRegistry => ErrorCategory::Authorization,

            ContractError::UnknownAsset
            | ContractError::AssetAlreadyRegistered
            | ContractError::AssetMismatch
            | ContractError::KeeperNotFound
            | ContractError::KeeperInUse
            | ContractError::CannotReduceAmount
            | ContractError::AmountMustBePositive
            | ContractError::NothingToConfiscate
            | ContractError::NothingOverissued
            | ContractError::NoFeesAccrued
            | ContractError::InvalidAssetScale
            | ContractError::InvalidFeeBps => ErrorCategory::Collateral,

            ContractError::GroupNotFound
            | ContractError::GroupAlreadyExists
            | ContractError::GroupNotEmpty
            | ContractError::ReceiptInFlight
            | ContractError::InvalidNonce
            | ContractError::WrongReceiptStatus
            | ContractError::CapacityExceeded
            | ContractError::GroupInCooldown
            | ContractError::GracePeriodNotElapsed
            | ContractError::KeeperNotInGroup
            | ContractError::InsufficientCollateral
            | ContractError::InvalidThreshold
            | ContractError::ExitNotAllowed
            | ContractError::ReceiptNotFound => ErrorCategory::Custody,

            ContractError::InvalidSignature
            | ContractError::DuplicateSigner
            | ContractError::NotEnoughSignatures
            | ContractError::ProofExpired
            | ContractError::ProofRequired
            | ContractError::StaleProof => ErrorCategory::Attestation,

            ContractError::InsufficientStake
            | ContractError::NothingStaked
            | ContractError::OngoingAccusation
            | ContractError::NoAccusation
            | ContractError::LateForAppeal
            | ContractError::AppealWindowOpen
            | ContractError::InvalidSchedule => ErrorCategory::Rewards,

            ContractError::AuctionNotStarted
            | ContractError::NoActiveLot
            | ContractError::LotExhausted => ErrorCategory::Auction,

            ContractError::VestingAlreadyExists
            | ContractError::VestingNotFound
            | ContractError::InvalidVestingParams
            | ContractError::NothingClaimable
            | ContractError::AlreadyPaused
            | ContractError::NotPaused => ErrorCategory::Vesting,

            ContractError::Overflow
            | ContractError::Underflow
            | ContractError::DivisionByZero => ErrorCategory::Arithmetic,
        }
    }

    fn description(&self) -> &'static str {
        match self {
            ContractError::NotInitialized => "Contract has not been initialized",
            ContractError::AlreadyInitialized => "Contract has already been initialized",
            ContractError::NotAdmin => "Caller is not the admin",
            ContractError::NotCustodian => "Caller is not the custody contract",
            ContractError::NotVerifier => "Caller is neither the burn verifier nor a group keeper",
            ContractError::NotRecipient => "Caller is not the receipt recipient",
            ContractError::NotAccuser => "Caller is not the accuser of this accusation",
            ContractError::NotRegistry => "Caller is not the keeper registry",
            ContractError::UnknownAsset => "Asset is not registered with the rate converter",
            ContractError::AssetAlreadyRegistered => "Asset has already been registered",
            ContractError::AssetMismatch => "Keeper already holds collateral in a different asset",
            ContractError::KeeperNotFound => "No keeper with nonzero collateral at this address",
            ContractError::KeeperInUse => "Keeper is still referenced by custody groups",
            ContractError::CannotReduceAmount => "Swap may not reduce the canonical amount",
            ContractError::AmountMustBePositive => "Amount must be strictly positive (> 0)",
            ContractError::NothingToConfiscate => "No confiscated collateral for this asset",
            ContractError::NothingOverissued => "No outstanding overissued amount",
            ContractError::NoFeesAccrued => "No protocol fees accrued for this asset",
            ContractError::InvalidAssetScale => "Asset scale must be a positive multiplier",
            ContractError::InvalidFeeBps => "Fee bps must be in range 0-10000",
            ContractError::GroupNotFound => "No group for the given BTC address",
            ContractError::GroupAlreadyExists => "A group already exists for this BTC address",
            ContractError::GroupNotEmpty => "Group still custodies a nonzero balance",
            ContractError::ReceiptInFlight => "The working receipt is mid-flight",
            ContractError::InvalidNonce => "Nonce must be the group nonce plus one",
            ContractError::WrongReceiptStatus => "Receipt is in the wrong state for this transition",
            ContractError::CapacityExceeded => "Deposit exceeds the group's maximum capacity",
            ContractError::GroupInCooldown => "Group is in its post-withdrawal cooldown",
            ContractError::GracePeriodNotElapsed => "Stale-receipt grace period has not elapsed",
            ContractError::KeeperNotInGroup => "Signer is not a member of the group",
            ContractError::InsufficientCollateral => "Keeper collateral below the group minimum",
            ContractError::InvalidThreshold => "Threshold must satisfy 0 < required <= members",
            ContractError::ExitNotAllowed => "Self-exit deletion is not enabled for this caller",
            ContractError::ReceiptNotFound => "No receipt for the given id",
            ContractError::InvalidSignature => "Signature does not recover to the expected key",
            ContractError::DuplicateSigner => "Duplicate signer in the attestation set",
            ContractError::NotEnoughSignatures => "Fewer valid signatures than required",
            ContractError::ProofExpired => "Liveness proof is outside the tolerance window",
            ContractError::ProofRequired => "A liveness proof is required for this pool",
            ContractError::StaleProof => "Liveness proof predates the accusation",
            ContractError::InsufficientStake => "Staked amount is insufficient",
            ContractError::NothingStaked => "Target has no stake",
            ContractError::OngoingAccusation => "An accusation is already open for this keeper",
            ContractError::NoAccusation => "No open accusation for this keeper",
            ContractError::LateForAppeal => "The appeal window has elapsed",
            ContractError::AppealWindowOpen => "The appeal window is still open",
            ContractError::InvalidSchedule => "Reward schedule end must be after start",
            ContractError::AuctionNotStarted => "The auction has not started",
            ContractError::NoActiveLot => "No active lot for this asset",
            ContractError::LotExhausted => "Requested amount exceeds the remaining lot",
            ContractError::VestingAlreadyExists => "A vesting schedule already exists",
            ContractError::VestingNotFound => "No vesting schedule for this beneficiary",
            ContractError::InvalidVestingParams => "Vesting parameters are invalid",
            ContractError::NothingClaimable => "Nothing is claimable at the current time",
            ContractError::AlreadyPaused => "Vesting schedule is already paused",
            ContractError::NotPaused => "Vesting schedule is not paused",
            ContractError::Overflow => "Integer overflow in checked arithmetic",
            ContractError::Underflow => "Integer underflow in checked arithmetic",
            ContractError::DivisionByZero => "Division by zero in checked arithmetic",
        }
    }
}
