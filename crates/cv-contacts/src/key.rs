//! Layer keys.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Name of a contact layer (`"h"`, `"s"`, `"work"`, …).
///
/// Every edge carries the key of the layer it came from, so cloning must be
/// cheap: the string is shared behind an `Arc`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LayerKey(Arc<str>);

impl LayerKey {
    pub fn new(name: &str) -> Self {
        LayerKey(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LayerKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LayerKey {
    fn from(s: &str) -> Self {
        LayerKey::new(s)
    }
}

impl From<String> for LayerKey {
    fn from(s: String) -> Self {
        LayerKey(Arc::from(s))
    }
}

impl PartialEq<str> for LayerKey {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for LayerKey {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
