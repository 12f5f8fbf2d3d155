use std::borrow::Cow;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use tracing::trace;

use crate::domain::entities::ImageReference;
use crate::domain::errors::ImageError;

const GS_SCHEME: &str = "gs://";
const HTTP_SCHEME: &str = "http://";
const HTTPS_SCHEME: &str = "https://";

/// Classifies raw image reference strings.
pub struct ReferenceNormalizer;

impl ReferenceNormalizer {
    /// Classifies `reference`, extracting the storage path when it needs
    /// resolution.
    #[must_use]
    pub fn normalize(reference: &str) -> ImageReference {
        if Self::is_direct_url(reference) {
            return ImageReference::DirectUrl(reference.to_string());
        }
        if Self::is_data_uri(reference) {
            return ImageReference::DataUri(reference.to_string());
        }
        if reference.starts_with('/') {
            return ImageReference::RelativePath(reference.to_string());
        }
        ImageReference::StoragePath(Self::storage_path(reference))
    }

    /// Returns true if `reference` can be displayed without resolution.
    #[must_use]
    pub fn is_immediate(reference: &str) -> bool {
        Self::is_direct_url(reference)
            || Self::is_data_uri(reference)
            || reference.starts_with('/')
    }

    /// Returns true for `http://` and `https://` URLs.
    #[must_use]
    pub fn is_direct_url(reference: &str) -> bool {
        [HTTP_SCHEME, HTTPS_SCHEME].iter().any(|scheme| {
            reference
                .get(..scheme.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
        })
    }

    /// Returns true for `data:` URIs, including percent-encoded ones.
    #[must_use]
    pub fn is_data_uri(reference: &str) -> bool {
        let trimmed = reference.trim();
        if has_data_scheme(trimmed) {
            return true;
        }
        if !trimmed.contains('%') {
            return false;
        }
        percent_decode_str(trimmed)
            .decode_utf8()
            .is_ok_and(|decoded| has_data_scheme(decoded.trim()))
    }

    /// Extracts the storage-internal path from a storage reference.
    ///
    /// Handles `gs://bucket/path`, download URLs carrying `/o/<encoded>?`
    /// and bare paths. Never fails: an undecodable segment is returned raw.
    #[must_use]
    pub fn storage_path(reference: &str) -> String {
        static OBJECT_SEGMENT_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"/o/([^?]+)\?").unwrap());

        let reference = reference.trim();

        if let Some(rest) = reference.strip_prefix(GS_SCHEME) {
            return rest
                .split_once('/')
                .map(|(_bucket, path)| path.to_string())
                .unwrap_or_default();
        }

        if let Some(segment) = OBJECT_SEGMENT_RE
            .captures(reference)
            .and_then(|caps| caps.get(1))
        {
            let raw = segment.as_str();
            return match decode_segment(raw) {
                Ok(decoded) => decoded.into_owned(),
                Err(e) => {
                    trace!(error = %e, "Using raw object segment");
                    raw.to_string()
                }
            };
        }

        reference.to_string()
    }
}

fn has_data_scheme(s: &str) -> bool {
    s.get(..5)
        .is_some_and(|head| head.eq_ignore_ascii_case("data:"))
}

/// Strict percent-decoding: rejects `%` not followed by two hex digits and
/// sequences that decode to invalid UTF-8.
fn decode_segment(raw: &str) -> Result<Cow<'_, str>, ImageError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while let Some(offset) = bytes[i..].iter().position(|&b| b == b'%') {
        let at = i + offset;
        let well_formed = bytes
            .get(at + 1..at + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !well_formed {
            return Err(ImageError::NormalizationAmbiguous {
                segment: raw.to_string(),
                reason: format!("malformed escape at byte {at}"),
            });
        }
        i = at + 3;
    }

    percent_decode_str(raw)
        .decode_utf8()
        .map_err(|e| ImageError::NormalizationAmbiguous {
            segment: raw.to_string(),
            reason: e.to_string(),
        })
}
