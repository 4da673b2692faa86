use crate::error::DecodeError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Signature check applied to a token before its payload is trusted
///
/// `signing_input` is `header.payload` exactly as received and `signature`
/// is the third segment (empty when the token has only two).
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, signing_input: &str, signature: &str) -> Result<(), DecodeError>;

    /// Name for logs
    fn name(&self) -> &'static str;
}

/// Accepts every token. The payload's structure is trusted, its origin is not.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unverified;

impl TokenVerifier for Unverified {
    fn verify(&self, _signing_input: &str, _signature: &str) -> Result<(), DecodeError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "unverified"
    }
}

/// HMAC-SHA256 (JWT `HS256`) signature check with a shared secret
pub struct Hs256Verifier {
    secret: Vec<u8>,
}

impl Hs256Verifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Base64url signature of `signing_input`, without padding
    pub fn sign(&self, signing_input: &str) -> Result<String, DecodeError> {
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    fn mac(&self) -> Result<Hmac<Sha256>, DecodeError> {
        Hmac::<Sha256>::new_from_slice(&self.secret)
            .map_err(|err| DecodeError::Signature(err.to_string()))
    }
}

impl std::fmt::Debug for Hs256Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hs256Verifier").finish_non_exhaustive()
    }
}

impl TokenVerifier for Hs256Verifier {
    fn verify(&self, signing_input: &str, signature: &str) -> Result<(), DecodeError> {
        if signature.is_empty() {
            return Err(DecodeError::Signature("token is unsigned".to_string()));
        }

        let expected = URL_SAFE_NO_PAD
            .decode(signature.trim_end_matches('='))
            .map_err(|err| DecodeError::Signature(format!("malformed signature: {err}")))?;

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&expected)
            .map_err(|_| DecodeError::Signature("signature mismatch".to_string()))
    }

    fn name(&self) -> &'static str {
        "hs256"
    }
}
