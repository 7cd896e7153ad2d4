use base64::{
    Engine as _,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};

use crate::models::session::Claims;

/// URL-safe base64 that accepts payloads with or without `=` padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes the claims from the payload (middle) segment of a signed token.
///
/// The signature is not checked; the server stays the authority on whether
/// the token is valid. Any malformed input yields `None`.
pub fn decode_claims(token: &str) -> Option<Claims> {
    let mut segments = token.trim().split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() || payload.is_empty() {
        return None;
    }

    let bytes = match PAYLOAD_ENGINE.decode(payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("Token payload is not base64url: {}", e);
            return None;
        }
    };

    match sonic_rs::from_slice::<Claims>(&bytes) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!("Token payload is not a claims object: {}", e);
            None
        }
    }
}
