use near_sdk::FunctionError;

/// Hard failures. Any of these aborts the operation with no state change.
#[derive(Debug, Clone, PartialEq, Eq, FunctionError)]
pub enum HubError {
    NotOwner,
    InvalidCaller,
    InvalidState,
    BelowMinimum,
    AboveMaximum,
    DelayDecreased,
    AlreadyRemoved,
    NotDue,
    NotPendingUnstake,
    DepositTooLarge,
    InsufficientFunds,
    UnknownRelay,
    RelayBalanceTooLow,
    InvalidGasPrice,
    InsufficientGas,
    InvalidInput(String),
    InvalidConfig(String),
    InvalidStateBytes(String),
}

impl std::fmt::Display for HubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOwner => write!(f, "Not owner"),
            Self::InvalidCaller => write!(f, "Caller is not the designated relay"),
            Self::InvalidState => write!(f, "Relay is in the wrong state"),
            Self::BelowMinimum => write!(f, "Stake or unstake delay below minimum"),
            Self::AboveMaximum => write!(f, "Unstake delay above maximum"),
            Self::DelayDecreased => write!(f, "Unstake delay cannot be decreased"),
            Self::AlreadyRemoved => write!(f, "Relay already removed"),
            Self::NotDue => write!(f, "Unstake delay has not elapsed"),
            Self::NotPendingUnstake => write!(f, "Relay is not pending unstake"),
            Self::DepositTooLarge => write!(f, "Deposit exceeds maximum"),
            Self::InsufficientFunds => write!(f, "Insufficient funds"),
            Self::UnknownRelay => write!(f, "Unknown relay"),
            Self::RelayBalanceTooLow => write!(f, "Relay balance below minimum"),
            Self::InvalidGasPrice => write!(f, "Transaction gas price below requested"),
            Self::InsufficientGas => write!(f, "Not enough gas left for the relayed call"),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Self::InvalidConfig(msg) => write!(f, "Invalid config: {msg}"),
            Self::InvalidStateBytes(msg) => write!(f, "Invalid state bytes: {msg}"),
        }
    }
}

impl std::error::Error for HubError {}
