//! `relay_call`: the nested pre-hook → target → post-hook sequence, its
//! balance-integrity checks, and settlement.

use near_sdk::AccountId;

use crate::{
    CallError, CanRelay, HubContext, HubError, HubEvent, Ledger, PreconditionCheck,
    RelayCallOutcome, RelayCallStatus, RelayContracts, RelayHub, RelayRequest, RelayState,
    encode_relayed_calldata, max_possible_charge, calculate_charge,
};

/// Bill `used` gas against `cap`. Returns false when the sub-call ran over.
fn bill(billed: &mut u64, used: u64, cap: u64) -> bool {
    *billed = billed.saturating_add(used.min(cap));
    used <= cap
}

impl RelayHub {
    /// Execute `request` on behalf of `caller`, which must be the relay named in it.
    ///
    /// Returns `Err` only for hard aborts, which leave no trace. Precondition
    /// rejections return `Rejected` with no charge. Once the hooks run, the
    /// sponsor is always billed and the relay owner credited, whatever the status.
    pub fn relay_call(
        &mut self,
        ledger: &mut dyn Ledger,
        contracts: &mut dyn RelayContracts,
        caller: &AccountId,
        request: &RelayRequest,
    ) -> Result<RelayCallOutcome, HubError> {
        if caller != &request.relay {
            return Err(HubError::InvalidCaller);
        }
        let relay_owner = match self.relays.get(caller) {
            Some(relay) if relay.state == RelayState::Registered => {
                relay.owner.clone().ok_or(HubError::UnknownRelay)?
            }
            _ => return Err(HubError::UnknownRelay),
        };
        if ledger.gas_price() < request.gas_price {
            return Err(HubError::InvalidGasPrice);
        }
        let remaining_gas = ledger.prepaid_gas().saturating_sub(ledger.used_gas());
        if remaining_gas < self.required_gas(request.gas_limit) {
            return Err(HubError::InsufficientGas);
        }

        let max_charge = max_possible_charge(
            request.gas_limit,
            request.gas_price,
            request.transaction_fee,
        );
        let precondition = if self.balance_of(&request.sponsor) < max_charge {
            CanRelay::rejected(PreconditionCheck::SponsorBalanceTooLow)
        } else {
            self.can_relay(&*ledger, &*contracts, request)
        };
        let context = match precondition {
            CanRelay::Accepted { context } => context,
            CanRelay::Rejected { reason } => {
                self.emit(
                    ledger,
                    HubEvent::CanRelayFailed {
                        relay: request.relay.clone(),
                        sender: request.sender.clone(),
                        sponsor: request.sponsor.clone(),
                        reason,
                    },
                );
                return Ok(RelayCallOutcome::Rejected { reason });
            }
        };

        let mut billed_gas = 0u64;
        let snapshot = self.snapshot();
        let checkpoint = ledger.checkpoint();
        let status = match self.recipient_calls(
            ledger,
            contracts,
            request,
            &context,
            max_charge,
            &mut billed_gas,
        ) {
            Ok(status) => {
                ledger.commit(checkpoint);
                status
            }
            Err(status) => {
                ledger.rollback(checkpoint);
                self.restore(snapshot);
                status
            }
        };

        let chargeable_gas = billed_gas.saturating_add(self.config.gas_overhead);
        let charge = calculate_charge(chargeable_gas, request.gas_price, request.transaction_fee)
            .min(max_charge);
        self.charge(&request.sponsor, charge)?;
        self.credit(&relay_owner, charge);

        self.emit(
            ledger,
            HubEvent::TransactionRelayed {
                relay: request.relay.clone(),
                sender: request.sender.clone(),
                sponsor: request.sponsor.clone(),
                status,
                charge,
            },
        );
        Ok(RelayCallOutcome::Relayed { status, charge })
    }

    /// The atomic section. `Err` carries the status the whole section reverts with.
    fn recipient_calls(
        &mut self,
        ledger: &mut dyn Ledger,
        contracts: &mut dyn RelayContracts,
        request: &RelayRequest,
        context: &[u8],
        max_charge: u128,
        billed_gas: &mut u64,
    ) -> Result<RelayCallStatus, RelayCallStatus> {
        let call = request.relayed_call(max_charge);
        let sponsor_id = &request.sponsor;
        let balance_before = self.balance_of(sponsor_id);

        let pre_cap = self.config.pre_relayed_call_max_gas;
        let gas_before = ledger.used_gas();
        let pre_result = match contracts.sponsor_mut(sponsor_id) {
            Some(sponsor) => sponsor.pre_relayed_call(
                &mut HubContext::new(self, &mut *ledger, sponsor_id.clone()),
                context,
                &call,
            ),
            None => Err(CallError::new("sponsor not found")),
        };
        let within_cap = bill(billed_gas, ledger.used_gas().saturating_sub(gas_before), pre_cap);
        let pre_return = match pre_result {
            Ok(value) if within_cap => value,
            _ => return Err(RelayCallStatus::PreRelayedFailed),
        };
        if self.balance_of(sponsor_id) != balance_before {
            return Err(RelayCallStatus::RecipientBalanceChanged);
        }

        let success = self.target_call(ledger, contracts, request, billed_gas);
        if self.balance_of(sponsor_id) != balance_before {
            return Err(RelayCallStatus::RecipientBalanceChanged);
        }

        let post_cap = self.config.post_relayed_call_max_gas;
        let estimated_gas = billed_gas
            .saturating_add(post_cap)
            .saturating_add(self.config.gas_overhead);
        let estimated_charge =
            calculate_charge(estimated_gas, request.gas_price, request.transaction_fee)
                .min(max_charge);
        let gas_before = ledger.used_gas();
        let post_result = match contracts.sponsor_mut(sponsor_id) {
            Some(sponsor) => sponsor.post_relayed_call(
                &mut HubContext::new(self, &mut *ledger, sponsor_id.clone()),
                context,
                success,
                estimated_charge,
                &pre_return,
            ),
            None => Err(CallError::new("sponsor not found")),
        };
        let within_cap = bill(billed_gas, ledger.used_gas().saturating_sub(gas_before), post_cap);
        if post_result.is_err() || !within_cap {
            return Err(RelayCallStatus::PostRelayedFailed);
        }
        if self.balance_of(sponsor_id) != balance_before {
            return Err(RelayCallStatus::RecipientBalanceChanged);
        }

        Ok(if success {
            RelayCallStatus::Ok
        } else {
            RelayCallStatus::RelayedCallFailed
        })
    }

    /// Run the target under its own checkpoint so a revert only undoes the target.
    fn target_call(
        &mut self,
        ledger: &mut dyn Ledger,
        contracts: &mut dyn RelayContracts,
        request: &RelayRequest,
        billed_gas: &mut u64,
    ) -> bool {
        let calldata = encode_relayed_calldata(&request.encoded_function, &request.sender);
        let snapshot = self.snapshot();
        let checkpoint = ledger.checkpoint();
        let gas_before = ledger.used_gas();
        let result = match contracts.target_mut(&request.target) {
            Some(target) => target.call(
                &mut HubContext::new(self, &mut *ledger, request.target.clone()),
                &calldata,
            ),
            None => Err(CallError::new("target not found")),
        };
        let within_cap = bill(
            billed_gas,
            ledger.used_gas().saturating_sub(gas_before),
            request.gas_limit,
        );

        let success = result.is_ok() && within_cap;
        if success {
            ledger.commit(checkpoint);
        } else {
            ledger.rollback(checkpoint);
            self.restore(snapshot);
        }
        success
    }
}
