use crate::error::{BroadcastError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static CHANNEL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)C[A-Z0-9]{10}$").expect("channel id pattern"));

static CHANNEL_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([a-z0-9][a-z0-9_-]*)$").expect("channel name pattern"));

/// How a channel is referred to in a channel list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelIdentifier {
    /// `C0123456789`, stored uppercase
    Id(String),
    /// `#general`, stored without the hash
    Name(String),
}

impl FromStr for ChannelIdentifier {
    type Err = BroadcastError;

    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if CHANNEL_ID_RE.is_match(raw) {
            return Ok(ChannelIdentifier::Id(raw.to_ascii_uppercase()));
        }
        if let Some(caps) = CHANNEL_NAME_RE.captures(raw) {
            return Ok(ChannelIdentifier::Name(caps[1].to_string()));
        }
        Err(BroadcastError::InvalidIdentifier(raw.to_string()))
    }
}

impl fmt::Display for ChannelIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelIdentifier::Id(id) => f.write_str(id),
            ChannelIdentifier::Name(name) => write!(f, "#{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_normalizes_case() {
        let id: ChannelIdentifier = "c1234567abc".parse().unwrap();
        assert_eq!(id, ChannelIdentifier::Id("C1234567ABC".to_string()));
        assert_eq!(id.to_string(), "C1234567ABC");
    }

    #[test]
    fn test_parse_name() {
        let name: ChannelIdentifier = "#dev-ops_2".parse().unwrap();
        assert_eq!(name, ChannelIdentifier::Name("dev-ops_2".to_string()));
        assert_eq!(name.to_string(), "#dev-ops_2");
    }

    #[test]
    fn test_rejects_malformed() {
        for raw in ["general", "#General", "C123", "C12345678901", "#", "U1234567890"] {
            assert!(
                raw.parse::<ChannelIdentifier>().is_err(),
                "{raw} should be rejected"
            );
        }
    }
}
