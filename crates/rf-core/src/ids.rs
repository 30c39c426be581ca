use core::fmt;
use std::borrow::Borrow;

/// Stable identifier of a train (e.g. `T001`).
///
/// - cheap to compare and hash
/// - borrows as `str` so maps keyed by `TrainId` can be queried with `&str`
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TrainId(String);

impl TrainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrainId({})", self.0)
    }
}

impl fmt::Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TrainId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TrainId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrainId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TrainId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for TrainId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TrainId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
