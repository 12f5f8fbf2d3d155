//! Classified image references.

use std::fmt;

/// An image reference after classification by the normalizer.
///
/// The first three variants are usable as-is; only `StoragePath` needs a
/// round-trip to the storage backend before it can be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageReference {
    /// Absolute `http://` or `https://` URL.
    DirectUrl(String),
    /// Inline `data:` URI, possibly percent-encoded.
    DataUri(String),
    /// Path relative to the app origin (`/assets/...`).
    RelativePath(String),
    /// Storage-internal object path, bucket stripped.
    StoragePath(String),
}

impl ImageReference {
    /// Returns true if the reference can be displayed without any I/O.
    #[must_use]
    pub const fn is_immediate(&self) -> bool {
        !matches!(self, Self::StoragePath(_))
    }

    /// Returns the carried string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::DirectUrl(s) | Self::DataUri(s) | Self::RelativePath(s) | Self::StoragePath(s) => {
                s
            }
        }
    }

    /// Returns the storage path, if this is one.
    #[must_use]
    pub fn storage_path(&self) -> Option<&str> {
        match self {
            Self::StoragePath(path) => Some(path),
            _ => None,
        }
    }

    /// Short name of the reference kind, used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DirectUrl(_) => "direct_url",
            Self::DataUri(_) => "data_uri",
            Self::RelativePath(_) => "relative_path",
            Self::StoragePath(_) => "storage_path",
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.as_str())
    }
}
