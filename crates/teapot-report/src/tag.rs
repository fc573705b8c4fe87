//! Gadget type tags.
//!
//! A tag names the gadget class plus the secret/attacker tag combination
//! that produced an event, e.g. `"KASPER_MDS 0x11"`. The vocabulary is open:
//! classification happens downstream, so tags are kept as opaque strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// An opaque, cheaply clonable gadget type tag
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeTag(Arc<str>);

impl TypeTag {
    /// Tag text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(tag: &str) -> Self {
        Self(Arc::from(tag))
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self(Arc::from(tag)))
    }
}

/// Deduplicates tag storage across the events of a collection run
#[derive(Debug, Default)]
pub struct TagInterner {
    tags: HashSet<Arc<str>>,
}

impl TagInterner {
    /// Create an empty interner
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared tag for `text`, allocating it on first sight
    pub fn intern(&mut self, text: &str) -> TypeTag {
        if let Some(existing) = self.tags.get(text) {
            return TypeTag(Arc::clone(existing));
        }
        let tag: Arc<str> = Arc::from(text);
        self.tags.insert(Arc::clone(&tag));
        TypeTag(tag)
    }

    /// Number of distinct tags seen
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }
}
