use crate::error::ModelError;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Server-assigned identifier of a listable element.
///
/// Jellyfin hands these out as 32 character hex strings, but the client
/// treats them as opaque.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ModelError::EmptyId);
        }
        Ok(ElementId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for ElementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ElementId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementId::new(s)
    }
}

impl TryFrom<String> for ElementId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ElementId::new(value)
    }
}

impl From<ElementId> for String {
    fn from(id: ElementId) -> Self {
        id.0
    }
}

/// `deserialize_with` helper for optional ids. Servers send `""` for items
/// they have not assigned an id to; those decode as `None`.
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<ElementId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| ElementId::new(raw).ok()))
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key an element occupies inside an identity keyed collection.
///
/// Elements without a server id never collide with each other: each one is
/// handed a collection-local ordinal instead of sharing a sentinel slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKey {
    Id(ElementId),
    Anonymous(u64),
}

impl ElementKey {
    pub fn id(&self) -> Option<&ElementId> {
        match self {
            ElementKey::Id(id) => Some(id),
            ElementKey::Anonymous(_) => None,
        }
    }
}

impl From<ElementId> for ElementKey {
    fn from(id: ElementId) -> Self {
        ElementKey::Id(id)
    }
}
