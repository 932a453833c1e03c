//! Opaque handle to transport-hosted media.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A reference to a photo or file hosted by the chat transport.
///
/// The value is opaque to us: product photos and payment receipts are stored
/// and re-sent by handle only, never downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(String);

impl MediaRef {
    /// Wrap a transport-assigned media handle.
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Returns the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `MediaRef` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MediaRef {
    fn from(handle: String) -> Self {
        Self(handle)
    }
}
