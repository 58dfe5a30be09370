/// Failure to decode or verify a signature envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    InvalidInput(String),
    SignatureInvalid,
}

impl std::fmt::Display for SignatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::SignatureInvalid => write!(f, "invalid ed25519 signature"),
        }
    }
}

impl std::error::Error for SignatureError {}
