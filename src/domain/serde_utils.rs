//! Serde utilities for backend documents.

use serde::{Deserialize, Deserializer};

/// Deserializes `null` as the type's default value.
///
/// # Errors
///
/// Returns an error if the value is present but not a `T`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Module to handle document ids that might be strings or numbers.
pub mod lenient_id {
    use serde::de::{self, Visitor};
    use serde::Deserializer;
    use std::fmt;

    /// Deserializes an optional id from a string, an integer or `null`.
    /// Empty strings are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is of any other type.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LenientIdVisitor;

        impl<'de> Visitor<'de> for LenientIdVisitor {
            type Value = Option<String>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, an integer or null")
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_any(self)
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Some(value.to_string()))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Some(value.to_string()))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if value.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(value.to_string()))
                }
            }
        }

        deserializer.deserialize_option(LenientIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Doc {
        #[serde(default, deserialize_with = "super::lenient_id::deserialize")]
        id: Option<String>,
        #[serde(default, deserialize_with = "super::null_as_default")]
        tags: Vec<String>,
    }

    #[test]
    fn test_lenient_id_variants() {
        let doc: Doc = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(doc.id.as_deref(), Some("abc"));

        let doc: Doc = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(doc.id.as_deref(), Some("42"));

        let doc: Doc = serde_json::from_str(r#"{"id": null}"#).unwrap();
        assert!(doc.id.is_none());

        let doc: Doc = serde_json::from_str(r#"{"id": ""}"#).unwrap();
        assert!(doc.id.is_none());

        let doc: Doc = serde_json::from_str("{}").unwrap();
        assert!(doc.id.is_none());
    }

    #[test]
    fn test_null_list_is_empty() {
        let doc: Doc = serde_json::from_str(r#"{"tags": null}"#).unwrap();
        assert!(doc.tags.is_empty());

        let doc: Doc = serde_json::from_str(r#"{"tags": ["a"]}"#).unwrap();
        assert_eq!(doc.tags, vec!["a".to_string()]);
    }
}
