use onsocial_relay_types::recover_signer;

use crate::{
    CanRelay, HubView, Ledger, PreconditionCheck, RelayContracts, RelayHub, RelayRequest,
    RelayedCall, max_possible_charge,
};

impl RelayRequest {
    pub(crate) fn relayed_call(&self, max_possible_charge: u128) -> RelayedCall<'_> {
        RelayedCall {
            relay: &self.relay,
            sender: &self.sender,
            encoded_function: &self.encoded_function,
            transaction_fee: self.transaction_fee,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            nonce: self.sender_nonce,
            approval_data: &self.approval_data,
            max_possible_charge,
        }
    }
}

impl RelayHub {
    /// Check signature, nonce and sponsor acceptance, in that order. Never mutates.
    pub fn can_relay(
        &self,
        ledger: &dyn Ledger,
        contracts: &dyn RelayContracts,
        request: &RelayRequest,
    ) -> CanRelay {
        let message = request.signing_message(ledger.hub_account());
        match recover_signer(&message, &request.signature) {
            Ok(signer) if signer == request.sender.as_str() => {}
            _ => return CanRelay::rejected(PreconditionCheck::WrongSignature),
        }

        if ledger.account_nonce(&request.sender) != request.sender_nonce {
            return CanRelay::rejected(PreconditionCheck::WrongNonce);
        }

        let Some(sponsor) = contracts.sponsor(&request.sponsor) else {
            return CanRelay::rejected(PreconditionCheck::AcceptRelayedCallReverted);
        };
        let max_charge = max_possible_charge(
            request.gas_limit,
            request.gas_price,
            request.transaction_fee,
        );
        let view = HubView::new(self, ledger);
        match sponsor.accept_relayed_call(&view, &request.relayed_call(max_charge)) {
            Ok(response) => CanRelay::from_sponsor_status(response.status, response.context),
            Err(_) => CanRelay::rejected(PreconditionCheck::AcceptRelayedCallReverted),
        }
    }
}
