pub const ONE_NEAR: u128 = 1_000_000_000_000_000_000_000_000;
pub const TGAS: u64 = 1_000_000_000_000;

pub const ONE_WEEK_NS: u64 = 7 * 24 * 60 * 60 * 1_000_000_000;

pub const DEFAULT_MIN_STAKE: u128 = ONE_NEAR; // 1 NEAR
pub const DEFAULT_MIN_UNSTAKE_DELAY_NS: u64 = ONE_WEEK_NS;
pub const DEFAULT_MAX_UNSTAKE_DELAY_NS: u64 = 12 * ONE_WEEK_NS;
pub const DEFAULT_MAX_DEPOSIT: u128 = 2 * ONE_NEAR; // 2 NEAR
pub const DEFAULT_MIN_RELAY_BALANCE: u128 = ONE_NEAR / 10; // 0.1 NEAR

pub const DEFAULT_GAS_OVERHEAD: u64 = 5 * TGAS;
pub const DEFAULT_GAS_RESERVE: u64 = 10 * TGAS;
pub const DEFAULT_PRE_RELAYED_CALL_MAX_GAS: u64 = 10 * TGAS;
pub const DEFAULT_POST_RELAYED_CALL_MAX_GAS: u64 = 10 * TGAS;

// Sponsor status codes 1..=10 are reserved for the hub.
pub const MAX_RESERVED_STATUS_CODE: u32 = 10;

pub const FEE_DENOMINATOR: u64 = 100; // fee is a percentage
