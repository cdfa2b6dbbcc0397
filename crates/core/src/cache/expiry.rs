//! Expiration types.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{CacheError, Result};

/// A validated time-to-live in whole seconds.
///
/// Always at least one second: sub-second durations round up and a zero
/// duration is rejected, since the store treats a zero expiry as an error
/// (combined write) or as an immediate delete (separate expire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ttl(u64);

impl Ttl {
    /// Creates a TTL from a whole number of seconds.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidTtl` if `seconds` is zero.
    pub fn from_secs(seconds: u64) -> Result<Self> {
        if seconds == 0 {
            return Err(CacheError::InvalidTtl(
                "expiration must be at least one second".to_string(),
            ));
        }
        Ok(Self(seconds))
    }

    /// Creates a TTL from a duration, rounding sub-second remainders up.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidTtl` if `duration` is zero.
    pub fn from_duration(duration: Duration) -> Result<Self> {
        let whole = duration.as_secs();
        let seconds = if duration.subsec_nanos() > 0 {
            whole.saturating_add(1)
        } else {
            whole
        };
        Self::from_secs(seconds)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl TryFrom<Duration> for Ttl {
    type Error = CacheError;

    fn try_from(duration: Duration) -> Result<Self> {
        Self::from_duration(duration)
    }
}

/// Observable expiration state of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "seconds", rename_all = "snake_case")]
pub enum KeyTtl {
    /// The key does not exist.
    Missing,
    /// The key exists without an expiration.
    Persistent,
    /// The key expires after the given duration.
    Expires(#[serde(with = "duration_secs")] Duration),
}

impl KeyTtl {
    /// Maps a Redis `TTL` reply: `-2` missing, `-1` persistent, otherwise seconds left.
    pub fn from_reply(reply: i64) -> Self {
        match reply {
            -2 => KeyTtl::Missing,
            n if n < 0 => KeyTtl::Persistent,
            n => KeyTtl::Expires(Duration::from_secs(n.unsigned_abs())),
        }
    }
}

impl fmt::Display for KeyTtl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyTtl::Missing => f.write_str("missing"),
            KeyTtl::Persistent => f.write_str("persistent"),
            KeyTtl::Expires(d) => write!(f, "expires in {}s", d.as_secs()),
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// How a value and its expiration are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryMode {
    /// One combined command (`SET key value EX n`).
    #[default]
    Atomic,
    /// A value write followed by a separate expiration write. A failure
    /// between the two leaves the key without a TTL.
    Separate,
}

impl FromStr for ExpiryMode {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atomic" => Ok(ExpiryMode::Atomic),
            "separate" => Ok(ExpiryMode::Separate),
            other => Err(CacheError::InvalidValue(format!(
                "unknown expiry mode '{}' (expected 'atomic' or 'separate')",
                other
            ))),
        }
    }
}

impl fmt::Display for ExpiryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryMode::Atomic => f.write_str("atomic"),
            ExpiryMode::Separate => f.write_str("separate"),
        }
    }
}

/// Connection state as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl From<bool> for ConnectionState {
    fn from(connected: bool) -> Self {
        if connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connected => f.write_str("connected"),
            ConnectionState::Disconnected => f.write_str("disconnected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_rejects_zero() {
        assert!(matches!(Ttl::from_secs(0), Err(CacheError::InvalidTtl(_))));
        assert!(matches!(
            Ttl::from_duration(Duration::ZERO),
            Err(CacheError::InvalidTtl(_))
        ));
    }

    #[test]
    fn test_ttl_rounds_sub_second_up() {
        let ttl = Ttl::from_duration(Duration::from_millis(200)).unwrap();
        assert_eq!(ttl.as_secs(), 1);

        let ttl = Ttl::from_duration(Duration::from_millis(60_001)).unwrap();
        assert_eq!(ttl.as_secs(), 61);
    }

    #[test]
    fn test_ttl_whole_seconds_unchanged() {
        let ttl = Ttl::try_from(Duration::from_secs(60)).unwrap();
        assert_eq!(ttl.as_secs(), 60);
        assert_eq!(ttl.as_duration(), Duration::from_secs(60));
    }

    #[test]
    fn test_key_ttl_from_reply() {
        assert_eq!(KeyTtl::from_reply(-2), KeyTtl::Missing);
        assert_eq!(KeyTtl::from_reply(-1), KeyTtl::Persistent);
        assert_eq!(
            KeyTtl::from_reply(30),
            KeyTtl::Expires(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_key_ttl_json() {
        let json = serde_json::to_string(&KeyTtl::Expires(Duration::from_secs(9))).unwrap();
        assert_eq!(json, r#"{"state":"expires","seconds":9}"#);

        let json = serde_json::to_string(&KeyTtl::Missing).unwrap();
        assert_eq!(json, r#"{"state":"missing"}"#);
    }

    #[test]
    fn test_expiry_mode_from_str() {
        assert_eq!("atomic".parse::<ExpiryMode>().unwrap(), ExpiryMode::Atomic);
        assert_eq!(
            " Separate ".parse::<ExpiryMode>().unwrap(),
            ExpiryMode::Separate
        );
        assert!("both".parse::<ExpiryMode>().is_err());
        assert_eq!(ExpiryMode::default(), ExpiryMode::Atomic);
    }

    #[test]
    fn test_connection_state_from_bool() {
        assert_eq!(ConnectionState::from(true), ConnectionState::Connected);
        assert_eq!(ConnectionState::from(false), ConnectionState::Disconnected);
        assert!(ConnectionState::Connected.is_connected());
        assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
    }
}
