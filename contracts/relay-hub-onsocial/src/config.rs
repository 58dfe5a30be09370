//! Hub parameters. Every field has a default so partial JSON is accepted.

use borsh::{BorshDeserialize, BorshSerialize};
use near_sdk::json_types::U128;
use serde::{Deserialize, Serialize};

use crate::HubError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct HubConfig {
    #[serde(default = "defaults::min_stake")]
    pub min_stake: U128,

    #[serde(default = "defaults::min_unstake_delay")]
    pub min_unstake_delay: u64,

    #[serde(default = "defaults::max_unstake_delay")]
    pub max_unstake_delay: u64,

    #[serde(default = "defaults::max_deposit")]
    pub max_deposit: U128,

    /// Native balance a relay must hold to register.
    #[serde(default = "defaults::min_relay_balance")]
    pub min_relay_balance: U128,

    /// Gas billed for hub bookkeeping on every relayed call.
    #[serde(default = "defaults::gas_overhead")]
    pub gas_overhead: u64,

    #[serde(default = "defaults::gas_reserve")]
    pub gas_reserve: u64,

    #[serde(default = "defaults::pre_relayed_call_max_gas")]
    pub pre_relayed_call_max_gas: u64,

    #[serde(default = "defaults::post_relayed_call_max_gas")]
    pub post_relayed_call_max_gas: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            min_stake: defaults::min_stake(),
            min_unstake_delay: defaults::min_unstake_delay(),
            max_unstake_delay: defaults::max_unstake_delay(),
            max_deposit: defaults::max_deposit(),
            min_relay_balance: defaults::min_relay_balance(),
            gas_overhead: defaults::gas_overhead(),
            gas_reserve: defaults::gas_reserve(),
            pre_relayed_call_max_gas: defaults::pre_relayed_call_max_gas(),
            post_relayed_call_max_gas: defaults::post_relayed_call_max_gas(),
        }
    }
}

impl HubConfig {
    pub fn from_json(json: &str) -> Result<Self, HubError> {
        let config: Self = near_sdk::serde_json::from_str(json)
            .map_err(|e| HubError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HubError> {
        if self.min_stake.0 == 0 {
            return Err(HubError::InvalidConfig("min_stake must be positive".into()));
        }
        if self.min_unstake_delay > self.max_unstake_delay {
            return Err(HubError::InvalidConfig(
                "min_unstake_delay exceeds max_unstake_delay".into(),
            ));
        }
        if self.max_deposit.0 == 0 {
            return Err(HubError::InvalidConfig("max_deposit must be positive".into()));
        }
        Ok(())
    }
}

mod defaults {
    use near_sdk::json_types::U128;

    use crate::constants::*;

    pub fn min_stake() -> U128 {
        U128(DEFAULT_MIN_STAKE)
    }

    pub fn min_unstake_delay() -> u64 {
        DEFAULT_MIN_UNSTAKE_DELAY_NS
    }

    pub fn max_unstake_delay() -> u64 {
        DEFAULT_MAX_UNSTAKE_DELAY_NS
    }

    pub fn max_deposit() -> U128 {
        U128(DEFAULT_MAX_DEPOSIT)
    }

    pub fn min_relay_balance() -> U128 {
        U128(DEFAULT_MIN_RELAY_BALANCE)
    }

    pub fn gas_overhead() -> u64 {
        DEFAULT_GAS_OVERHEAD
    }

    pub fn gas_reserve() -> u64 {
        DEFAULT_GAS_RESERVE
    }

    pub fn pre_relayed_call_max_gas() -> u64 {
        DEFAULT_PRE_RELAYED_CALL_MAX_GAS
    }

    pub fn post_relayed_call_max_gas() -> u64 {
        DEFAULT_POST_RELAYED_CALL_MAX_GAS
    }
}
