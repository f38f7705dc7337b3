use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier correlating a media object with its code-image object.
///
/// A fresh random (v4) UUID is minted per ingested upload. Its textual form is
/// the lowercase hyphenated UUID, which is embedded verbatim in both storage
/// keys and in the public play link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn generate() -> Self {
        ItemId(Uuid::new_v4())
    }

    /// Parse an untrusted path segment.
    ///
    /// Only the canonical hyphenated form is accepted so that the textual
    /// identifier round-trips exactly into the key names produced at upload
    /// time. Anything else cannot name an uploaded item.
    pub fn parse(raw: &str) -> Option<Self> {
        let uuid = Uuid::try_parse(raw).ok()?;
        let id = ItemId(uuid);
        (id.to_string() == raw).then_some(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
