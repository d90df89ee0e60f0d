//! Opaque identity handle that can be attached to a client.
//!
//! Key material is handled elsewhere; the query client only stores the
//! handle and hands it back.

use std::fmt;

/// An account identity, identified by its `aleo1…` address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Account {
    address: String,
}

impl Account {
    /// Wrap an address. The address is not validated.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}
