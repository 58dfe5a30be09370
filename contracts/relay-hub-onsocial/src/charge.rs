use primitive_types::U256;

use crate::RelayHub;
use crate::constants::FEE_DENOMINATOR;

/// `gas * gas_price * (100 + fee) / 100`, saturating at `u128::MAX`.
pub fn calculate_charge(gas: u64, gas_price: u128, transaction_fee: u32) -> u128 {
    let multiplier = U256::from(FEE_DENOMINATOR) + U256::from(transaction_fee);
    let charge = U256::from(gas) * U256::from(gas_price) * multiplier / U256::from(FEE_DENOMINATOR);
    if charge > U256::from(u128::MAX) {
        u128::MAX
    } else {
        charge.as_u128()
    }
}

/// Upper bound a sponsor can be billed for a request.
pub fn max_possible_charge(gas_limit: u64, gas_price: u128, transaction_fee: u32) -> u128 {
    calculate_charge(gas_limit, gas_price, transaction_fee)
}

impl RelayHub {
    /// Gas that must remain for `relay_call` to run a request with `gas_limit`.
    pub fn required_gas(&self, gas_limit: u64) -> u64 {
        self.config
            .gas_reserve
            .saturating_add(self.config.pre_relayed_call_max_gas)
            .saturating_add(self.config.post_relayed_call_max_gas)
            .saturating_add(gas_limit)
            .saturating_add(self.config.gas_overhead)
    }
}
