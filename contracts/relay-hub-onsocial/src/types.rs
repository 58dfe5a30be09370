use near_sdk::json_types::U128;
use near_sdk::{AccountId, near};
use near_sdk_macros::NearSchema;
use onsocial_relay_types::{
    RELAY_REQUEST_DOMAIN, RelayRequestFields, build_relay_request_payload, build_signing_message,
};

use crate::constants::MAX_RESERVED_STATUS_CODE;

#[near(serializers = [borsh, json])]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RelayState {
    #[default]
    Unknown,
    Staked,
    Registered,
    Removed,
    /// Stake was slashed for nonce reuse. Terminal.
    Penalized,
}

/// Present only while the relay is `Registered`.
#[near(serializers = [borsh])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub transaction_fee: u32,
    pub url: String,
}

#[near(serializers = [borsh])]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Relay {
    pub owner: Option<AccountId>,
    pub total_stake: u128,
    pub unstake_delay: u64,
    pub state: RelayState,
    /// Earliest unstake time, set on removal.
    pub unstake_time: u64,
    pub registration: Option<Registration>,
}

impl Relay {
    pub fn is_owned_by(&self, account_id: &AccountId) -> bool {
        self.owner.as_ref() == Some(account_id)
    }
}

#[derive(NearSchema, serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[abi(json)]
pub struct RelayView {
    pub total_stake: U128,
    pub unstake_delay: u64,
    pub unstake_time: u64,
    pub owner: Option<AccountId>,
    pub state: RelayState,
}

impl From<&Relay> for RelayView {
    fn from(relay: &Relay) -> Self {
        Self {
            total_stake: U128(relay.total_stake),
            unstake_delay: relay.unstake_delay,
            unstake_time: relay.unstake_time,
            owner: relay.owner.clone(),
            state: relay.state,
        }
    }
}

/// A sender-signed request for a relay to execute `encoded_function` on `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayRequest {
    pub sender: AccountId,
    pub target: AccountId,
    pub encoded_function: Vec<u8>,
    pub transaction_fee: u32,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub sender_nonce: u64,
    pub relay: AccountId,
    pub sponsor: AccountId,
    pub signature: Vec<u8>,
    /// Opaque to the hub, forwarded to the sponsor's accept hook.
    pub approval_data: Vec<u8>,
}

impl RelayRequest {
    /// Bytes the sender signs. Binds every field plus the hub identity.
    pub fn signing_message(&self, relay_hub: &AccountId) -> Vec<u8> {
        let payload = build_relay_request_payload(&RelayRequestFields {
            sender: self.sender.as_str(),
            target: self.target.as_str(),
            encoded_function: &self.encoded_function,
            transaction_fee: self.transaction_fee,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            nonce: self.sender_nonce,
            relay_hub: relay_hub.as_str(),
            relay: self.relay.as_str(),
            sponsor: self.sponsor.as_str(),
        });
        build_signing_message(RELAY_REQUEST_DOMAIN, relay_hub.as_str(), &payload)
    }
}

#[near(serializers = [json])]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayCallStatus {
    Ok,
    RelayedCallFailed,
    PreRelayedFailed,
    PostRelayedFailed,
    RecipientBalanceChanged,
}

impl RelayCallStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::RelayedCallFailed => 1,
            Self::PreRelayedFailed => 2,
            Self::PostRelayedFailed => 3,
            Self::RecipientBalanceChanged => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::RelayedCallFailed => "relayed_call_failed",
            Self::PreRelayedFailed => "pre_relayed_failed",
            Self::PostRelayedFailed => "post_relayed_failed",
            Self::RecipientBalanceChanged => "recipient_balance_changed",
        }
    }
}

/// Hub-reserved rejection reasons. Sponsor codes above 10 pass through as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreconditionCheck {
    Ok,
    WrongSignature,
    WrongNonce,
    AcceptRelayedCallReverted,
    InvalidRecipientStatusCode,
    SponsorBalanceTooLow,
}

impl PreconditionCheck {
    pub fn code(self) -> u32 {
        match self {
            Self::Ok => 0,
            Self::WrongSignature => 1,
            Self::WrongNonce => 2,
            Self::AcceptRelayedCallReverted => 3,
            Self::InvalidRecipientStatusCode => 4,
            Self::SponsorBalanceTooLow => 5,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::WrongSignature),
            2 => Some(Self::WrongNonce),
            3 => Some(Self::AcceptRelayedCallReverted),
            4 => Some(Self::InvalidRecipientStatusCode),
            5 => Some(Self::SponsorBalanceTooLow),
            _ => None,
        }
    }
}

/// Result of the read-only precondition check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CanRelay {
    Accepted { context: Vec<u8> },
    Rejected { reason: u32 },
}

impl CanRelay {
    pub(crate) fn rejected(check: PreconditionCheck) -> Self {
        Self::Rejected {
            reason: check.code(),
        }
    }

    /// Map a sponsor's accept status into an outcome.
    pub(crate) fn from_sponsor_status(status: u32, context: Vec<u8>) -> Self {
        match status {
            0 => Self::Accepted { context },
            s if s > MAX_RESERVED_STATUS_CODE => Self::Rejected { reason: s },
            _ => Self::rejected(PreconditionCheck::InvalidRecipientStatusCode),
        }
    }

    pub fn reason(&self) -> u32 {
        match self {
            Self::Accepted { .. } => PreconditionCheck::Ok.code(),
            Self::Rejected { reason } => *reason,
        }
    }
}

/// Non-aborting result of `relay_call`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayCallOutcome {
    /// Preconditions failed, nothing executed or charged.
    Rejected { reason: u32 },
    Relayed { status: RelayCallStatus, charge: u128 },
}
