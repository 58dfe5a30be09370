//! Signing scheme for OnSocial relay requests and relay transactions.
//! No NEAR SDK dependency, usable on-chain and off-chain.

mod crypto;
mod error;
mod message;

pub use crypto::{
    SIGNATURE_ENVELOPE_LEN, ed25519_public_key_bytes, ed25519_signature_bytes,
    implicit_account_id, message_digest, recover_signer, sign_message,
};
pub use error::SignatureError;
pub use message::{
    RELAY_REQUEST_DOMAIN, RELAY_TRANSACTION_DOMAIN, RelayRequestFields, RelayTransactionFields,
    build_relay_request_payload, build_relay_transaction_payload, build_signing_message,
};
