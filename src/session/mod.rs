//! Session module - per-chat routing state

pub mod store;

pub use store::SessionStore;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Opaque identifier of one chat participant or conversation.
///
/// Transports hand out either numeric chat ids or strings; both map onto the
/// same key space, so `SessionId::from(42)` equals `SessionId::from("42")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for SessionId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for SessionId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// Which provider(s) a session's messages go to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoutingMode {
    SingleBackend(String),
    AllBackends,
}

impl RoutingMode {
    /// Wire key for the all-providers mode
    pub const ALL: &'static str = "all";

    pub fn single(provider: impl Into<String>) -> Self {
        RoutingMode::SingleBackend(provider.into())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, RoutingMode::AllBackends)
    }
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingMode::SingleBackend(id) => f.write_str(id),
            RoutingMode::AllBackends => f.write_str(Self::ALL),
        }
    }
}

impl FromStr for RoutingMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        match key {
            "" => Err(AppError::InvalidRequest("routing mode cannot be empty".to_string())),
            // `both_ai` is the selection key older chat keyboards send
            "all" | "both_ai" => Ok(RoutingMode::AllBackends),
            id => Ok(RoutingMode::SingleBackend(id.to_string())),
        }
    }
}

impl Serialize for RoutingMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RoutingMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
