use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use subtle::ConstantTimeEq;

/// Generates a cryptographically random `OAuth2` state parameter.
///
/// Returns a 22-character URL-safe string (16 random bytes → base64url).
#[must_use]
pub fn generate_state() -> String {
    let random_bytes: [u8; 16] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Compares the state echoed by the provider with the one stored in the cookie.
///
/// Length is not secret and may short-circuit; equal-length inputs are compared
/// in constant time.
#[must_use]
pub fn states_match(received: &str, stored: &str) -> bool {
    let (received, stored) = (received.as_bytes(), stored.as_bytes());
    if received.len() != stored.len() {
        return false;
    }
    received.ct_eq(stored).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_length() {
        let state = generate_state();
        assert_eq!(state.len(), 22);
    }

    #[test]
    fn test_state_url_safe() {
        let state = generate_state();
        assert!(
            state
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "state should be URL-safe: {state}"
        );
    }

    #[test]
    fn test_state_uniqueness() {
        let s1 = generate_state();
        let s2 = generate_state();
        assert_ne!(s1, s2, "states should be unique");
    }

    #[test]
    fn test_states_match_identical() {
        let state = generate_state();
        assert!(states_match(&state, &state.clone()));
    }

    #[test]
    fn test_states_match_rejects_length_mismatch() {
        assert!(!states_match("abc", "abcd"));
        assert!(!states_match("", "a"));
    }

    #[test]
    fn test_states_match_rejects_every_single_byte_mutation() {
        let state = generate_state();
        for i in 0..state.len() {
            let mut bytes = state.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let mutated = String::from_utf8(bytes).unwrap();
            assert!(!states_match(&mutated, &state), "mutation at {i} accepted");
        }
    }
}
