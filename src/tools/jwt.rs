//! JWT token utilities

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

/// Decoded token claims.
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Standard alphabet that accepts the payload segment with or without padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Returns the JWT token's payload claims.
///
/// Returns `None` for anything that is not a three segment token whose middle
/// segment is base64url encoded UTF-8 JSON object. Callers must treat `None`
/// as "cannot verify".
pub fn decode(token: &str) -> Option<Claims> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let fixed = parts[1].replace('-', "+").replace('_', "/");
    let bytes = PAYLOAD_ENGINE.decode(fixed).ok()?;
    let text = String::from_utf8(bytes).ok()?;

    match serde_json::from_str(&text).ok()? {
        serde_json::Value::Object(claims) => Some(claims),
        _ => None,
    }
}

/// Returns the numeric `exp` claim of the token, if any.
///
/// An `exp` of zero counts as absent.
pub fn expires_at(token: &str) -> Option<f64> {
    decode(token)?
        .get("exp")
        .and_then(|v| v.as_f64())
        .filter(|exp| *exp != 0.0)
}

/// Checks whether the token is expired relative to `now_secs`.
///
/// Undecodable tokens and tokens without a numeric `exp` are expired. No
/// clock skew is applied: a token whose `exp` equals `now_secs` is still valid.
pub fn is_expired_at(token: &str, now_secs: i64) -> bool {
    match expires_at(token) {
        Some(exp) => exp < now_secs as f64,
        None => true,
    }
}

/// Checks whether the token is expired against the current wall clock.
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, chrono::Utc::now().timestamp())
}


#[cfg(test)]
mod tests {
    use super::test_tokens::*;
    use super::*;

    #[test]
    fn test_decode_valid() {
        let token = token_with_payload(&serde_json::json!({ "sub": "42", "exp": 1700000000 }));
        let claims = decode(&token).unwrap();
        assert_eq!(claims["sub"], "42");
        assert_eq!(claims["exp"], 1700000000);
    }

    #[test]
    fn test_decode_utf8_payload() {
        let token = token_with_payload(&serde_json::json!({ "name": "관리자", "exp": 1 }));
        let claims = decode(&token).unwrap();
        assert_eq!(claims["name"], "관리자");
    }

    #[test]
    fn test_decode_padded_segment() {
        let token = "h.eyJleHAiOjF9.s";
        assert!(decode(token).is_some());
        let padded = "h.eyJleHAiOjEwfQ==.s";
        assert_eq!(decode(padded).unwrap()["exp"], 10);
    }

    #[test]
    fn test_decode_wrong_segment_count() {
        for token in ["", "abc", "a.b", "a.b.c.d"] {
            assert!(decode(token).is_none(), "{token}");
            assert!(is_expired(token), "{token}");
        }
    }

    #[test]
    fn test_decode_invalid_base64_and_json() {
        assert!(decode("h.!!!.s").is_none());
        // "not json" base64url encoded
        assert!(decode("h.bm90IGpzb24.s").is_none());
        // "[1,2]" is JSON but not a claims object
        assert!(decode("h.WzEsMl0.s").is_none());
    }

    #[test]
    fn test_is_expired_boundary() {
        let now = 1_700_000_000;
        assert!(is_expired_at(&token_expiring_at(now - 1), now));
        assert!(!is_expired_at(&token_expiring_at(now), now));
        assert!(!is_expired_at(&token_expiring_at(now + 60), now));
    }

    #[test]
    fn test_missing_or_non_numeric_exp_is_expired() {
        let now = 1_700_000_000;
        let no_exp = token_with_payload(&serde_json::json!({ "sub": "1" }));
        let text_exp = token_with_payload(&serde_json::json!({ "exp": "soon" }));
        let zero_exp = token_with_payload(&serde_json::json!({ "exp": 0 }));
        assert!(is_expired_at(&no_exp, now));
        assert!(is_expired_at(&text_exp, now));
        assert!(is_expired_at(&zero_exp, now));
    }

    #[test]
    fn test_is_expired_wall_clock() {
        let future = chrono::Utc::now().timestamp() + 3600;
        assert!(!is_expired(&token_expiring_at(future)));
        assert!(is_expired(&token_expiring_at(1)));
    }
}
