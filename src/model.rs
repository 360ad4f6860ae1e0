//! Value types passed between the client API and the storage layers.

use std::fmt;

use bytes::Bytes;

/// Immutable byte sequence used for keys and values.
///
/// Constructing a `Slice` from borrowed data copies it, so every holder owns
/// its bytes independently. Clones are cheap (reference counted).
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Slice {
    contents: Bytes,
}

impl Slice {
    /// Create a slice by copying the given bytes
    pub fn new(contents: &[u8]) -> Self {
        Self {
            contents: Bytes::copy_from_slice(contents),
        }
    }

    /// The empty slice
    pub fn empty() -> Self {
        Self::default()
    }

    /// Raw byte access
    pub fn as_bytes(&self) -> &[u8] {
        &self.contents
    }

    /// Lossy string view (for logging and tests)
    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.contents).into_owned()
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

impl fmt::Debug for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slice({:?})", String::from_utf8_lossy(&self.contents))
    }
}

impl AsRef<[u8]> for Slice {
    fn as_ref(&self) -> &[u8] {
        &self.contents
    }
}

impl From<&[u8]> for Slice {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl<const N: usize> From<&[u8; N]> for Slice {
    fn from(value: &[u8; N]) -> Self {
        Self::new(value)
    }
}

impl From<Vec<u8>> for Slice {
    fn from(value: Vec<u8>) -> Self {
        Self {
            contents: Bytes::from(value),
        }
    }
}

impl From<&str> for Slice {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for Slice {
    fn from(value: String) -> Self {
        Self::from(value.into_bytes())
    }
}

/// A key together with its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValuePair {
    pub key: Slice,
    pub value: Slice,
}

impl KeyValuePair {
    pub fn new(key: impl Into<Slice>, value: impl Into<Slice>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Combined byte size of key and value
    pub fn size(&self) -> usize {
        self.key.len() + self.value.len()
    }
}

/// Outcome of a point lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetResult {
    pub key: Slice,
    pub value: Slice,
    pub exists: bool,
}

impl GetResult {
    /// A lookup that found `value` for `key`
    pub fn found(key: Slice, value: Slice) -> Self {
        Self {
            key,
            value,
            exists: true,
        }
    }

    /// A lookup that found nothing for `key`
    pub fn missing(key: Slice) -> Self {
        Self {
            key,
            value: Slice::empty(),
            exists: false,
        }
    }
}
