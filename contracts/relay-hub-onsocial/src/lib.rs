//! OnSocial relay hub.
//!
//! Relays pay gas on behalf of users and recover the cost, plus a fee, from
//! sponsor deposits held by the hub. Relays back their service with stake that
//! only unlocks after a delay and is slashed if they reuse a transaction nonce.
//!
//! The hub is runtime-agnostic. Value transfer, gas metering, the clock and
//! atomic checkpoints are supplied by the host through [`Ledger`], and sponsor
//! and target contracts are reached through [`RelayContracts`].

use std::collections::BTreeMap;

use near_sdk::AccountId;

mod balance;
mod charge;
mod config;
pub mod constants;
mod contracts;
mod errors;
pub mod events;
mod executor;
mod ledger;
mod penalize;
mod registry;
mod state_versions;
mod types;
mod validator;


pub use charge::{calculate_charge, max_possible_charge};
pub use config::HubConfig;
pub use contracts::{
    AcceptResponse, CallError, ContractSet, HubContext, HubView, RelayContracts, RelaySponsor,
    RelayTarget, RelayedCall, encode_relayed_calldata, relayed_sender,
};
pub use errors::HubError;
pub use events::HubEvent;
pub use ledger::{Checkpoint, InMemoryLedger, Ledger};
pub use penalize::RelayTransaction;
pub use types::*;

#[derive(Debug, Clone)]
pub struct RelayHub {
    pub version: String,
    pub(crate) config: HubConfig,
    pub(crate) relays: BTreeMap<AccountId, Relay>,
    /// Sponsor and relay-owner balances held by the hub.
    pub(crate) balances: BTreeMap<AccountId, u128>,
    pub(crate) events: Vec<HubEvent>,
}

impl Default for RelayHub {
    fn default() -> Self {
        Self::from_parts(HubConfig::default(), BTreeMap::new(), BTreeMap::new())
    }
}

impl RelayHub {
    pub fn new(config: HubConfig) -> Result<Self, HubError> {
        config.validate()?;
        Ok(Self::from_parts(config, BTreeMap::new(), BTreeMap::new()))
    }

    pub(crate) fn from_parts(
        config: HubConfig,
        relays: BTreeMap<AccountId, Relay>,
        balances: BTreeMap<AccountId, u128>,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config,
            relays,
            balances,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Events emitted by committed operations since this instance was created.
    pub fn events(&self) -> &[HubEvent] {
        &self.events
    }
}

/// Copy of the hub's mutable state, restored when an atomic section aborts.
pub(crate) struct HubSnapshot {
    relays: BTreeMap<AccountId, Relay>,
    balances: BTreeMap<AccountId, u128>,
    events_len: usize,
}

impl RelayHub {
    pub(crate) fn snapshot(&self) -> HubSnapshot {
        HubSnapshot {
            relays: self.relays.clone(),
            balances: self.balances.clone(),
            events_len: self.events.len(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: HubSnapshot) {
        self.relays = snapshot.relays;
        self.balances = snapshot.balances;
        self.events.truncate(snapshot.events_len);
    }
}
