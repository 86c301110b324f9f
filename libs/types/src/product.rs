//! Tradable product identifiers
//!
//! Products are fixed at session creation by the configuration; the engine
//! only ever sees identifiers drawn from that set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Product identifier (e.g. "bread", "cheese")
///
/// Plain identifier newtype. Equality is case-sensitive; configurations are
/// expected to supply canonical lowercase names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Product(String);

impl Product {
    /// Create a new Product from a name
    ///
    /// # Panics
    /// Panics if the name is empty
    pub fn new(name: impl Into<String>) -> Self {
        let s = name.into();
        assert!(!s.is_empty(), "Product name must not be empty");
        Self(s)
    }

    /// Try to create a Product, returning None if the name is empty
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let s = name.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Get the name string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Product {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
