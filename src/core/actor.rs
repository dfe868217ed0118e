//! Identities attached to transitions: who did it, and to what.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Open key/value bag used for custom properties and attribute snapshots.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// The identity a transition is attributed to.
///
/// `kind` distinguishes actor families (a user, a service account, a
/// scheduled job) so that definitions can build role-specific tables.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub kind: String,
    pub id: String,
}

impl Actor {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Reference to a persisted entity row.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: String,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_displays_kind_and_id() {
        assert_eq!(Actor::new("user", "42").to_string(), "user:42");
    }

    #[test]
    fn entity_ref_displays_kind_and_id() {
        assert_eq!(EntityRef::new("order", "7").to_string(), "order#7");
    }
}
