use derive_more::{From, Into};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Paid subscription tier a visitor can ask to check out after signing in.
///
/// This is the only place tier validity is decided. Anything that does not
/// parse into a `Tier` is treated as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Bench,
    Rookie,
    Mvp,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Bench, Tier::Rookie, Tier::Mvp];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bench => "bench",
            Self::Rookie => "rookie",
            Self::Mvp => "mvp",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| Error::InvalidTier(s.to_owned()))
    }
}

/// Opaque session credential minted by the upstream API.
///
/// `Debug` is redacted so the value never reaches the logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl SessionToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_tiers() {
        assert_eq!("bench".parse::<Tier>().unwrap(), Tier::Bench);
        assert_eq!("rookie".parse::<Tier>().unwrap(), Tier::Rookie);
        assert_eq!("mvp".parse::<Tier>().unwrap(), Tier::Mvp);
    }

    #[test]
    fn invalid_tiers() {
        assert!("bogus".parse::<Tier>().is_err());
        assert!("MVP".parse::<Tier>().is_err());
        assert!(" mvp".parse::<Tier>().is_err());
        assert!("".parse::<Tier>().is_err());
    }

    #[test]
    fn tier_display_matches_wire_value() {
        for tier in Tier::ALL {
            assert_eq!(tier.to_string().parse::<Tier>().unwrap(), tier);
        }
    }

    #[test]
    fn session_token_debug_is_redacted() {
        let token = SessionToken::from("jwt-secret".to_string());
        assert!(!format!("{token:?}").contains("jwt-secret"));
        assert_eq!(token.as_str(), "jwt-secret");
    }
}
