//! Seams to the sponsor and target contracts a relayed call runs against.

use std::collections::BTreeMap;

use near_sdk::AccountId;

use crate::{HubError, Ledger, RelayHub, RelayView};

/// Revert raised by a hook or target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallError(pub String);

impl CallError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "call reverted: {}", self.0)
    }
}

impl std::error::Error for CallError {}

impl From<HubError> for CallError {
    fn from(error: HubError) -> Self {
        Self(error.to_string())
    }
}

/// Sponsor decision on a request. `status` 0 accepts; values above 10 are
/// sponsor-defined rejection reasons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptResponse {
    pub status: u32,
    pub context: Vec<u8>,
}

impl AcceptResponse {
    pub fn accept(context: Vec<u8>) -> Self {
        Self { status: 0, context }
    }

    pub fn reject(status: u32) -> Self {
        Self {
            status,
            context: Vec::new(),
        }
    }
}

/// Request fields as seen by the sponsor hooks.
#[derive(Debug, Clone, Copy)]
pub struct RelayedCall<'a> {
    pub relay: &'a AccountId,
    pub sender: &'a AccountId,
    pub encoded_function: &'a [u8],
    pub transaction_fee: u32,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub nonce: u64,
    pub approval_data: &'a [u8],
    pub max_possible_charge: u128,
}

/// Read-only handle passed to the accept hook.
pub struct HubView<'a> {
    hub: &'a RelayHub,
    ledger: &'a dyn Ledger,
}

impl<'a> HubView<'a> {
    pub(crate) fn new(hub: &'a RelayHub, ledger: &'a dyn Ledger) -> Self {
        Self { hub, ledger }
    }

    pub fn balance_of(&self, account_id: &AccountId) -> u128 {
        self.hub.balance_of(account_id)
    }

    pub fn get_relay(&self, relay: &AccountId) -> RelayView {
        self.hub.get_relay(relay)
    }

    pub fn account_nonce(&self, account_id: &AccountId) -> u64 {
        self.ledger.account_nonce(account_id)
    }

    pub fn block_timestamp(&self) -> u64 {
        self.ledger.block_timestamp()
    }
}

/// Handle a hook or target uses to call back into the hub. Every mutating
/// call acts as `contract_id`.
pub struct HubContext<'a> {
    hub: &'a mut RelayHub,
    ledger: &'a mut dyn Ledger,
    contract_id: AccountId,
}

impl<'a> HubContext<'a> {
    pub(crate) fn new(
        hub: &'a mut RelayHub,
        ledger: &'a mut dyn Ledger,
        contract_id: AccountId,
    ) -> Self {
        Self {
            hub,
            ledger,
            contract_id,
        }
    }

    pub fn contract_id(&self) -> &AccountId {
        &self.contract_id
    }

    /// Deposit from this contract's native balance into `sponsor`'s hub balance.
    pub fn deposit_for(&mut self, sponsor: &AccountId, amount: u128) -> Result<(), HubError> {
        self.hub
            .deposit_for(&mut *self.ledger, &self.contract_id, sponsor, amount)
    }

    pub fn withdraw(&mut self, amount: u128, destination: &AccountId) -> Result<(), HubError> {
        self.hub
            .withdraw(&mut *self.ledger, &self.contract_id, amount, destination)
    }

    pub fn balance_of(&self, account_id: &AccountId) -> u128 {
        self.hub.balance_of(account_id)
    }

    /// Stake for `relay` with this contract as owner.
    pub fn stake(&mut self, relay: &AccountId, value: u128, unstake_delay: u64) -> Result<(), HubError> {
        self.hub
            .stake(&mut *self.ledger, &self.contract_id, relay, value, unstake_delay)
    }

    pub fn remove_relay_by_owner(&mut self, relay: &AccountId) -> Result<(), HubError> {
        self.hub
            .remove_relay_by_owner(&mut *self.ledger, &self.contract_id, relay)
    }

    pub fn unstake(&mut self, relay: &AccountId) -> Result<u128, HubError> {
        self.hub.unstake(&mut *self.ledger, &self.contract_id, relay)
    }

    pub fn get_relay(&self, relay: &AccountId) -> RelayView {
        self.hub.get_relay(relay)
    }

    pub fn native_balance(&self) -> u128 {
        self.ledger.account_balance(&self.contract_id)
    }

    pub fn block_timestamp(&self) -> u64 {
        self.ledger.block_timestamp()
    }

    pub fn account_nonce(&self, account_id: &AccountId) -> u64 {
        self.ledger.account_nonce(account_id)
    }

    /// Advance `sender`'s nonce once the relayed call has been accepted by the target.
    pub fn increment_nonce(&mut self, sender: &AccountId) {
        self.ledger.increment_nonce(sender);
    }

    pub fn use_gas(&mut self, gas: u64) {
        self.ledger.use_gas(gas);
    }
}

pub trait RelaySponsor {
    fn accept_relayed_call(
        &self,
        view: &HubView<'_>,
        call: &RelayedCall<'_>,
    ) -> Result<AcceptResponse, CallError>;

    fn pre_relayed_call(
        &mut self,
        cx: &mut HubContext<'_>,
        context: &[u8],
        call: &RelayedCall<'_>,
    ) -> Result<Vec<u8>, CallError>;

    /// `actual_charge` is an upper-bound estimate; the final charge is settled after this returns.
    fn post_relayed_call(
        &mut self,
        cx: &mut HubContext<'_>,
        context: &[u8],
        success: bool,
        actual_charge: u128,
        pre_return: &[u8],
    ) -> Result<(), CallError>;
}

pub trait RelayTarget {
    /// `calldata` is the encoded function with the relayed sender appended,
    /// see [`relayed_sender`].
    fn call(&mut self, cx: &mut HubContext<'_>, calldata: &[u8]) -> Result<Vec<u8>, CallError>;
}

/// Resolves account ids to the contracts a relayed call can reach.
pub trait RelayContracts {
    fn sponsor(&self, account_id: &AccountId) -> Option<&dyn RelaySponsor>;
    fn sponsor_mut(&mut self, account_id: &AccountId) -> Option<&mut dyn RelaySponsor>;
    fn target_mut(&mut self, account_id: &AccountId) -> Option<&mut dyn RelayTarget>;
}

#[derive(Default)]
pub struct ContractSet {
    sponsors: BTreeMap<AccountId, Box<dyn RelaySponsor>>,
    targets: BTreeMap<AccountId, Box<dyn RelayTarget>>,
}

impl ContractSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_sponsor(&mut self, account_id: AccountId, sponsor: impl RelaySponsor + 'static) {
        self.sponsors.insert(account_id, Box::new(sponsor));
    }

    pub fn insert_target(&mut self, account_id: AccountId, target: impl RelayTarget + 'static) {
        self.targets.insert(account_id, Box::new(target));
    }
}

impl RelayContracts for ContractSet {
    fn sponsor(&self, account_id: &AccountId) -> Option<&dyn RelaySponsor> {
        let sponsor = self.sponsors.get(account_id)?;
        Some(&**sponsor)
    }

    fn sponsor_mut(&mut self, account_id: &AccountId) -> Option<&mut dyn RelaySponsor> {
        let sponsor = self.sponsors.get_mut(account_id)?;
        Some(&mut **sponsor)
    }

    fn target_mut(&mut self, account_id: &AccountId) -> Option<&mut dyn RelayTarget> {
        let target = self.targets.get_mut(account_id)?;
        Some(&mut **target)
    }
}

/// `encoded_function || sender || len(sender)`.
pub fn encode_relayed_calldata(encoded_function: &[u8], sender: &AccountId) -> Vec<u8> {
    let sender = sender.as_str().as_bytes();
    let mut calldata = Vec::with_capacity(encoded_function.len() + sender.len() + 1);
    calldata.extend_from_slice(encoded_function);
    calldata.extend_from_slice(sender);
    // Account ids are at most 64 bytes.
    calldata.push(sender.len() as u8);
    calldata
}

/// Split calldata built by the hub into the encoded function and the original sender.
pub fn relayed_sender(calldata: &[u8]) -> Option<(&[u8], AccountId)> {
    let (&len, rest) = calldata.split_last()?;
    let split = rest.len().checked_sub(len as usize)?;
    let (encoded_function, sender) = rest.split_at(split);
    let sender = std::str::from_utf8(sender).ok()?.parse().ok()?;
    Some((encoded_function, sender))
}
