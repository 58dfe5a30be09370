//! Host runtime primitives the hub needs: value transfer, gas metering,
//! clock, per-account nonces, and nested atomic checkpoints.

use std::collections::BTreeMap;

use near_sdk::AccountId;

use crate::HubError;

/// Handle returned by [`Ledger::checkpoint`]. Checkpoints nest; resolving one
/// also resolves every checkpoint taken after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

pub trait Ledger {
    fn hub_account(&self) -> &AccountId;
    fn block_timestamp(&self) -> u64;

    fn account_balance(&self, account_id: &AccountId) -> u128;
    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: u128) -> Result<(), HubError>;
    fn burn(&mut self, from: &AccountId, amount: u128) -> Result<(), HubError>;

    /// Gas attached to the outer transaction.
    fn prepaid_gas(&self) -> u64;
    fn used_gas(&self) -> u64;
    fn use_gas(&mut self, gas: u64);
    /// Gas price the outer transaction pays.
    fn gas_price(&self) -> u128;

    fn account_nonce(&self, account_id: &AccountId) -> u64;
    fn increment_nonce(&mut self, account_id: &AccountId);

    fn checkpoint(&mut self) -> Checkpoint;
    /// Undo value and nonce changes and logs since `checkpoint`. Gas stays consumed.
    fn rollback(&mut self, checkpoint: Checkpoint);
    fn commit(&mut self, checkpoint: Checkpoint);

    fn log_str(&mut self, line: &str);
}

#[derive(Debug, Clone)]
struct Snapshot {
    balances: BTreeMap<AccountId, u128>,
    nonces: BTreeMap<AccountId, u64>,
    logs_len: usize,
    burned: u128,
}

/// Host-independent [`Ledger`] backed by in-memory maps.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    hub_account: AccountId,
    block_timestamp: u64,
    balances: BTreeMap<AccountId, u128>,
    nonces: BTreeMap<AccountId, u64>,
    prepaid_gas: u64,
    used_gas: u64,
    gas_price: u128,
    logs: Vec<String>,
    checkpoints: Vec<Snapshot>,
    burned: u128,
}

impl InMemoryLedger {
    pub fn new(hub_account: AccountId) -> Self {
        Self {
            hub_account,
            block_timestamp: 0,
            balances: BTreeMap::new(),
            nonces: BTreeMap::new(),
            prepaid_gas: 0,
            used_gas: 0,
            gas_price: 0,
            logs: Vec::new(),
            checkpoints: Vec::new(),
            burned: 0,
        }
    }

    pub fn set_balance(&mut self, account_id: &AccountId, amount: u128) {
        if amount == 0 {
            self.balances.remove(account_id);
        } else {
            self.balances.insert(account_id.clone(), amount);
        }
    }

    pub fn set_block_timestamp(&mut self, timestamp: u64) {
        self.block_timestamp = timestamp;
    }

    pub fn advance_time(&mut self, nanos: u64) {
        self.block_timestamp = self.block_timestamp.saturating_add(nanos);
    }

    /// Start a new outer transaction with fresh gas accounting.
    pub fn begin_transaction(&mut self, prepaid_gas: u64, gas_price: u128) {
        self.prepaid_gas = prepaid_gas;
        self.gas_price = gas_price;
        self.used_gas = 0;
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn burned(&self) -> u128 {
        self.burned
    }

    fn debit(&mut self, account_id: &AccountId, amount: u128) -> Result<(), HubError> {
        let balance = self.account_balance(account_id);
        let remaining = balance
            .checked_sub(amount)
            .ok_or(HubError::InsufficientFunds)?;
        self.set_balance(account_id, remaining);
        Ok(())
    }
}

impl Ledger for InMemoryLedger {
    fn hub_account(&self) -> &AccountId {
        &self.hub_account
    }

    fn block_timestamp(&self) -> u64 {
        self.block_timestamp
    }

    fn account_balance(&self, account_id: &AccountId) -> u128 {
        self.balances.get(account_id).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: u128) -> Result<(), HubError> {
        let credited = self
            .account_balance(to)
            .checked_add(amount)
            .ok_or_else(|| HubError::InvalidInput("balance overflow".into()))?;
        if from == to {
            return if self.account_balance(from) >= amount {
                Ok(())
            } else {
                Err(HubError::InsufficientFunds)
            };
        }
        self.debit(from, amount)?;
        self.set_balance(to, credited);
        Ok(())
    }

    fn burn(&mut self, from: &AccountId, amount: u128) -> Result<(), HubError> {
        self.debit(from, amount)?;
        self.burned = self.burned.saturating_add(amount);
        Ok(())
    }

    fn prepaid_gas(&self) -> u64 {
        self.prepaid_gas
    }

    fn used_gas(&self) -> u64 {
        self.used_gas
    }

    fn use_gas(&mut self, gas: u64) {
        self.used_gas = self.used_gas.saturating_add(gas);
    }

    fn gas_price(&self) -> u128 {
        self.gas_price
    }

    fn account_nonce(&self, account_id: &AccountId) -> u64 {
        self.nonces.get(account_id).copied().unwrap_or(0)
    }

    fn increment_nonce(&mut self, account_id: &AccountId) {
        let nonce = self.nonces.entry(account_id.clone()).or_insert(0);
        *nonce = nonce.saturating_add(1);
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.checkpoints.push(Snapshot {
            balances: self.balances.clone(),
            nonces: self.nonces.clone(),
            logs_len: self.logs.len(),
            burned: self.burned,
        });
        Checkpoint(self.checkpoints.len() - 1)
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        let Some(snapshot) = self.checkpoints.drain(checkpoint.0..).next() else {
            return;
        };
        self.balances = snapshot.balances;
        self.nonces = snapshot.nonces;
        self.logs.truncate(snapshot.logs_len);
        self.burned = snapshot.burned;
    }

    fn commit(&mut self, checkpoint: Checkpoint) {
        self.checkpoints.truncate(checkpoint.0);
    }

    fn log_str(&mut self, line: &str) {
        self.logs.push(line.to_string());
    }
}
