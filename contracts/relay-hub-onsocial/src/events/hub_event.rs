use near_sdk::AccountId;

use super::{BALANCE_UPDATE, EventBuilder, RELAY_CALL, RELAY_UPDATE};
use crate::{Ledger, RelayCallStatus, RelayHub};

/// Typed record of every event the hub emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    Staked {
        relay: AccountId,
        stake: u128,
        unstake_delay: u64,
    },
    RelayAdded {
        relay: AccountId,
        owner: AccountId,
        transaction_fee: u32,
        stake: u128,
        unstake_delay: u64,
        url: String,
    },
    RelayRemoved {
        relay: AccountId,
        unstake_time: u64,
    },
    Unstaked {
        relay: AccountId,
        stake: u128,
    },
    Penalized {
        relay: AccountId,
        sender: AccountId,
        amount: u128,
    },
    Deposited {
        sponsor: AccountId,
        from: AccountId,
        amount: u128,
    },
    Withdrawn {
        account: AccountId,
        dest: AccountId,
        amount: u128,
    },
    CanRelayFailed {
        relay: AccountId,
        sender: AccountId,
        sponsor: AccountId,
        reason: u32,
    },
    TransactionRelayed {
        relay: AccountId,
        sender: AccountId,
        sponsor: AccountId,
        status: RelayCallStatus,
        charge: u128,
    },
}

impl HubEvent {
    pub fn to_log_line(&self) -> String {
        let builder = match self {
            Self::Staked {
                relay,
                stake,
                unstake_delay,
            } => EventBuilder::new(RELAY_UPDATE, "staked", relay)
                .field("stake", *stake)
                .field("unstake_delay", *unstake_delay),
            Self::RelayAdded {
                relay,
                owner,
                transaction_fee,
                stake,
                unstake_delay,
                url,
            } => EventBuilder::new(RELAY_UPDATE, "relay_added", relay)
                .field("owner", owner)
                .field("transaction_fee", *transaction_fee)
                .field("stake", *stake)
                .field("unstake_delay", *unstake_delay)
                .field_opt("url", (!url.is_empty()).then_some(url.as_str())),
            Self::RelayRemoved {
                relay,
                unstake_time,
            } => EventBuilder::new(RELAY_UPDATE, "relay_removed", relay)
                .field("unstake_time", *unstake_time),
            Self::Unstaked { relay, stake } => {
                EventBuilder::new(RELAY_UPDATE, "unstaked", relay).field("stake", *stake)
            }
            Self::Penalized {
                relay,
                sender,
                amount,
            } => EventBuilder::new(RELAY_UPDATE, "penalized", sender)
                .field("relay", relay)
                .field("amount", *amount),
            Self::Deposited {
                sponsor,
                from,
                amount,
            } => EventBuilder::new(BALANCE_UPDATE, "deposited", from)
                .field("sponsor", sponsor)
                .field("amount", *amount),
            Self::Withdrawn {
                account,
                dest,
                amount,
            } => EventBuilder::new(BALANCE_UPDATE, "withdrawn", account)
                .field("dest", dest)
                .field("amount", *amount),
            Self::CanRelayFailed {
                relay,
                sender,
                sponsor,
                reason,
            } => EventBuilder::new(RELAY_CALL, "can_relay_failed", relay)
                .field("sender", sender)
                .field("sponsor", sponsor)
                .field("reason", *reason),
            Self::TransactionRelayed {
                relay,
                sender,
                sponsor,
                status,
                charge,
            } => EventBuilder::new(RELAY_CALL, "transaction_relayed", relay)
                .field("sender", sender)
                .field("sponsor", sponsor)
                .field("status", status.as_str())
                .field("status_code", status.code())
                .field("charge", *charge),
        };
        builder.build()
    }
}

impl RelayHub {
    pub(crate) fn emit(&mut self, ledger: &mut dyn Ledger, event: HubEvent) {
        ledger.log_str(&event.to_log_line());
        self.events.push(event);
    }
}
