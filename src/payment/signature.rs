//! HMAC-SHA256 signatures
//!
//! Two independent keys are in play:
//! - the gateway key secret signs `order_id|gateway_payment_id` for client
//!   confirmations
//! - the webhook secret signs the raw webhook body
//!
//! Signatures travel as lowercase hex. Comparison is constant-time via
//! [`Mac::verify_slice`]; undecodable hex is a mismatch, never an error.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq)]
pub enum SignatureError {
    #[error("Signing secret must not be empty")]
    EmptySecret,
}

/// Keyed HMAC-SHA256 signer/verifier
#[derive(Clone)]
pub struct HmacSigner {
    mac: HmacSha256,
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HmacSigner(***)")
    }
}

impl HmacSigner {
    pub fn new(secret: &str) -> Result<Self, SignatureError> {
        if secret.is_empty() {
            return Err(SignatureError::EmptySecret);
        }
        let mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
            .map_err(|_| SignatureError::EmptySecret)?;
        Ok(Self { mac })
    }

    /// Hex-encoded HMAC of `message`
    pub fn sign(&self, message: &[u8]) -> String {
        let mut mac = self.mac.clone();
        mac.update(message);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time check of a hex signature over `message`
    pub fn verify(&self, message: &[u8], signature_hex: &str) -> bool {
        let Ok(expected) = hex::decode(signature_hex.trim()) else {
            return false;
        };
        let mut mac = self.mac.clone();
        mac.update(message);
        mac.verify_slice(&expected).is_ok()
    }
}

/// Message signed by the gateway for a client-side payment confirmation
pub fn payment_message(order_id: &str, gateway_payment_id: &str) -> String {
    format!("{}|{}", order_id, gateway_payment_id)
}

/// Verifies client confirmations with the gateway key secret
#[derive(Debug, Clone)]
pub struct PaymentSignatureVerifier {
    signer: HmacSigner,
}

impl PaymentSignatureVerifier {
    pub fn new(key_secret: &str) -> Result<Self, SignatureError> {
        Ok(Self {
            signer: HmacSigner::new(key_secret)?,
        })
    }

    /// Expected signature for an order/payment pair
    pub fn expected(&self, order_id: &str, gateway_payment_id: &str) -> String {
        self.signer
            .sign(payment_message(order_id, gateway_payment_id).as_bytes())
    }

    pub fn verify(&self, order_id: &str, gateway_payment_id: &str, signature: &str) -> bool {
        self.signer.verify(
            payment_message(order_id, gateway_payment_id).as_bytes(),
            signature,
        )
    }
}

/// Verifies webhook bodies with the webhook secret
#[derive(Debug, Clone)]
pub struct WebhookSignatureVerifier {
    signer: HmacSigner,
}

impl WebhookSignatureVerifier {
    pub fn new(webhook_secret: &str) -> Result<Self, SignatureError> {
        Ok(Self {
            signer: HmacSigner::new(webhook_secret)?,
        })
    }

    pub fn sign(&self, body: &[u8]) -> String {
        self.signer.sign(body)
    }

    pub fn verify(&self, body: &[u8], signature: &str) -> bool {
        self.signer.verify(body, signature)
    }
}
