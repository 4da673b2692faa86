//! Signed token payload decoding
//!
//! The metadata endpoint answers with a `header.payload.signature` token.
//! Only the payload segment is consumed. Whether the signature is checked
//! depends on the [`TokenVerifier`] the decoder is built with; the default
//! [`Unverified`] accepts any signature.

mod verifier;

pub use verifier::{Hs256Verifier, TokenVerifier, Unverified};

use crate::error::DecodeError;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use std::sync::Arc;

/// Extracts payload text from signed tokens
#[derive(Clone)]
pub struct TokenDecoder {
    verifier: Arc<dyn TokenVerifier>,
}

impl TokenDecoder {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// Decoder that performs no signature verification
    pub fn unverified() -> Self {
        Self::new(Arc::new(Unverified))
    }

    pub fn verifier_name(&self) -> &'static str {
        self.verifier.name()
    }

    /// Verify `token` with the configured strategy and return its payload as text
    pub fn decode(&self, token: &str) -> Result<String, DecodeError> {
        let token = token.trim();
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() < 2 {
            return Err(DecodeError::MissingPayload(segments.len()));
        }

        let signature = segments.get(2).copied().unwrap_or_default();
        let signing_input_len = segments[0].len() + 1 + segments[1].len();
        self.verifier
            .verify(&token[..signing_input_len], signature)?;

        decode_segment(segments[1])
    }
}

impl Default for TokenDecoder {
    fn default() -> Self {
        Self::unverified()
    }
}

/// Decode the payload segment of `token` without any signature check
pub fn decode_payload(token: &str) -> Result<String, DecodeError> {
    TokenDecoder::unverified().decode(token)
}

/// Restore `=` padding, base64-decode and read the bytes as UTF-8.
///
/// The standard alphabet is tried first; the URL-safe alphabet used by JWTs
/// is accepted as a fallback.
fn decode_segment(segment: &str) -> Result<String, DecodeError> {
    let padded = pad_base64(segment);
    let bytes = STANDARD
        .decode(padded.as_bytes())
        .or_else(|err| URL_SAFE.decode(padded.as_bytes()).map_err(|_| err))?;
    Ok(String::from_utf8(bytes)?)
}

/// Pad with `=` to a multiple of 4 characters (0 to 3 added)
fn pad_base64(segment: &str) -> String {
    let pad = (4 - segment.len() % 4) % 4;
    let mut padded = String::with_capacity(segment.len() + pad);
    padded.push_str(segment);
    padded.extend(std::iter::repeat('=').take(pad));
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
    use proptest::prelude::*;

    const PAYLOAD: &str = r#"{"environments":{"production":{"id":"P1","version":"v2"}}}"#;

    #[test]
    fn test_pad_base64() {
        assert_eq!(pad_base64("abcd"), "abcd");
        assert_eq!(pad_base64("abcde"), "abcde===");
        assert_eq!(pad_base64("abcdef"), "abcdef==");
        assert_eq!(pad_base64("abcdefg"), "abcdefg=");
        assert_eq!(pad_base64(""), "");
    }

    #[test]
    fn test_decode_padded_payload() {
        let token = format!("header.{}.signature", STANDARD.encode(PAYLOAD));
        assert_eq!(decode_payload(&token).unwrap(), PAYLOAD);
    }

    #[test]
    fn test_decode_unpadded_payload() {
        for payload in [PAYLOAD, "a", "ab", "abc", "{}", "héllo wörld ✓"] {
            let token = format!("header.{}.signature", STANDARD_NO_PAD.encode(payload));
            assert_eq!(decode_payload(&token).unwrap(), payload);
        }
    }

    #[test]
    fn test_decode_url_safe_payload() {
        // bytes c3 bf 3f end in a 63 sextet
        let payload = "ÿ?";
        let encoded = URL_SAFE_NO_PAD.encode(payload);
        assert_eq!(encoded, "w78_");

        let token = format!("h.{encoded}.s");
        assert_eq!(decode_payload(&token).unwrap(), payload);
    }

    #[test]
    fn test_two_segment_token() {
        let token = format!("header.{}", STANDARD.encode(PAYLOAD));
        assert_eq!(decode_payload(&token).unwrap(), PAYLOAD);
    }

    #[test]
    fn test_trailing_newline_is_ignored() {
        let token = format!("header.{}.sig\n", STANDARD.encode(PAYLOAD));
        assert_eq!(decode_payload(&token).unwrap(), PAYLOAD);
    }

    #[test]
    fn test_token_without_dots() {
        let err = decode_payload("no-dots-here").unwrap_err();
        assert!(matches!(err, DecodeError::MissingPayload(1)));
    }

    #[test]
    fn test_invalid_base64_payload() {
        let err = decode_payload("header.!!!not*base64!!!.sig").unwrap_err();
        assert!(matches!(err, DecodeError::Base64(_)));
    }

    #[test]
    fn test_invalid_utf8_payload() {
        let token = format!("header.{}.sig", STANDARD.encode([0xff, 0xfe, 0xfd]));
        let err = decode_payload(&token).unwrap_err();
        assert!(matches!(err, DecodeError::Utf8(_)));
    }

    proptest! {
        #[test]
        fn json_payloads_roundtrip(text in "\\PC*", number in any::<i64>()) {
            let payload = serde_json::json!({ "text": text, "number": number }).to_string();

            let padded = format!("header.{}.signature", STANDARD.encode(&payload));
            prop_assert_eq!(decode_payload(&padded).unwrap(), payload.clone());

            let unpadded = format!("header.{}.signature", STANDARD_NO_PAD.encode(&payload));
            prop_assert_eq!(decode_payload(&unpadded).unwrap(), payload);
        }

        #[test]
        fn arbitrary_text_roundtrips_unpadded(text in "\\PC*") {
            let token = format!("h.{}.s", STANDARD_NO_PAD.encode(&text));
            prop_assert_eq!(decode_payload(&token).unwrap(), text);
        }
    }
}
