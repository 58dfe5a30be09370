//! Ed25519 signature envelopes and signer recovery.
//!
//! An envelope is `public_key (32) || signature (64)`. The signer's identity is
//! the implicit account id of the embedded key, so verification recovers the
//! signer instead of checking against a caller-supplied key.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::SignatureError;

pub const SIGNATURE_ENVELOPE_LEN: usize = 96;

/// Extract 32 raw ed25519 public key bytes.
/// Accepts 32-byte (raw) or 33-byte (curve-type prefix + key) input.
pub fn ed25519_public_key_bytes(pk_raw: &[u8]) -> Result<[u8; 32], SignatureError> {
    let raw = match pk_raw.len() {
        32 => pk_raw,
        33 => &pk_raw[1..],
        _ => return Err(SignatureError::InvalidInput("ed25519 public key length".into())),
    };
    raw.try_into()
        .map_err(|_| SignatureError::InvalidInput("ed25519 public key length".into()))
}

/// Extract 64 raw ed25519 signature bytes.
pub fn ed25519_signature_bytes(signature: &[u8]) -> Result<[u8; 64], SignatureError> {
    signature
        .try_into()
        .map_err(|_| SignatureError::InvalidInput("ed25519 signature length".into()))
}

/// Lowercase hex of the public key, i.e. the NEAR implicit account id.
pub fn implicit_account_id(public_key: &[u8; 32]) -> String {
    hex::encode(public_key)
}

pub fn message_digest(message: &[u8]) -> [u8; 32] {
    Sha256::digest(message).into()
}

/// Verify `envelope` over `message` and return the signer's account id.
pub fn recover_signer(message: &[u8], envelope: &[u8]) -> Result<String, SignatureError> {
    if envelope.len() != SIGNATURE_ENVELOPE_LEN {
        return Err(SignatureError::InvalidInput(format!(
            "signature envelope must be {SIGNATURE_ENVELOPE_LEN} bytes, got {}",
            envelope.len()
        )));
    }
    let (pk_raw, sig_raw) = envelope.split_at(32);
    let pk_bytes = ed25519_public_key_bytes(pk_raw)?;
    let sig_bytes = ed25519_signature_bytes(sig_raw)?;

    let verifying_key = VerifyingKey::from_bytes(&pk_bytes)
        .map_err(|_| SignatureError::InvalidInput("ed25519 public key".into()))?;
    let signature = Signature::from_bytes(&sig_bytes);
    verifying_key
        .verify_strict(&message_digest(message), &signature)
        .map_err(|_| SignatureError::SignatureInvalid)?;

    Ok(implicit_account_id(&pk_bytes))
}

/// Produce an envelope for `message` signed by `signing_key`.
pub fn sign_message(signing_key: &SigningKey, message: &[u8]) -> Vec<u8> {
    let signature = signing_key.sign(&message_digest(message));
    let mut envelope = Vec::with_capacity(SIGNATURE_ENVELOPE_LEN);
    envelope.extend_from_slice(signing_key.verifying_key().as_bytes());
    envelope.extend_from_slice(&signature.to_bytes());
    envelope
}
