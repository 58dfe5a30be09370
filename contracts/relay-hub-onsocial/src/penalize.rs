//! Slashing a relay that signed two different transactions with one nonce.

use near_sdk::AccountId;
use onsocial_relay_types::{
    RELAY_TRANSACTION_DOMAIN, RelayTransactionFields, build_relay_transaction_payload,
    build_signing_message, recover_signer,
};

use crate::{HubError, HubEvent, Ledger, Relay, RelayHub, RelayState};

/// A transaction signed by a relay's key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTransaction {
    pub nonce: u64,
    pub receiver: AccountId,
    pub data: Vec<u8>,
}

impl RelayTransaction {
    pub fn signing_message(&self, relay_hub: &AccountId) -> Vec<u8> {
        let payload = build_relay_transaction_payload(&RelayTransactionFields {
            nonce: self.nonce,
            receiver: self.receiver.as_str(),
            data: &self.data,
        });
        build_signing_message(RELAY_TRANSACTION_DOMAIN, relay_hub.as_str(), &payload)
    }
}

impl RelayHub {
    /// Confiscate the signer's stake: half is burned, the rest paid to `reporter`.
    /// Returns the reporter's reward.
    pub fn penalize_repeated_nonce(
        &mut self,
        ledger: &mut dyn Ledger,
        reporter: &AccountId,
        first: &RelayTransaction,
        first_signature: &[u8],
        second: &RelayTransaction,
        second_signature: &[u8],
    ) -> Result<u128, HubError> {
        if first == second {
            return Err(HubError::InvalidInput("transactions are identical".into()));
        }
        if first.nonce != second.nonce {
            return Err(HubError::InvalidInput("nonces differ".into()));
        }
        let hub = ledger.hub_account().clone();
        let first_signer = recover_signer(&first.signing_message(&hub), first_signature)
            .map_err(|e| HubError::InvalidInput(e.to_string()))?;
        let second_signer = recover_signer(&second.signing_message(&hub), second_signature)
            .map_err(|e| HubError::InvalidInput(e.to_string()))?;
        if first_signer != second_signer {
            return Err(HubError::InvalidInput("different signers".into()));
        }
        let relay: AccountId = first_signer
            .parse()
            .map_err(|_| HubError::InvalidInput("signer is not an account id".into()))?;

        self.penalize(ledger, &relay, reporter)
    }

    fn penalize(
        &mut self,
        ledger: &mut dyn Ledger,
        relay: &AccountId,
        reporter: &AccountId,
    ) -> Result<u128, HubError> {
        let current = self.relays.get(relay).ok_or(HubError::InvalidState)?;
        let slashable = matches!(
            current.state,
            RelayState::Staked | RelayState::Registered | RelayState::Removed
        );
        if !slashable || current.total_stake == 0 {
            return Err(HubError::InvalidState);
        }
        let amount = current.total_stake;
        let burned = amount / 2;
        let reward = amount - burned;

        let hub = ledger.hub_account().clone();
        let checkpoint = ledger.checkpoint();
        let moved = ledger
            .burn(&hub, burned)
            .and_then(|()| ledger.transfer(&hub, reporter, reward));
        match moved {
            Ok(()) => ledger.commit(checkpoint),
            Err(error) => {
                ledger.rollback(checkpoint);
                return Err(error);
            }
        }

        let next = Relay {
            owner: current.owner.clone(),
            unstake_delay: current.unstake_delay,
            state: RelayState::Penalized,
            ..Relay::default()
        };
        self.relays.insert(relay.clone(), next);
        self.emit(
            ledger,
            HubEvent::Penalized {
                relay: relay.clone(),
                sender: reporter.clone(),
                amount: reward,
            },
        );
        Ok(reward)
    }
}
