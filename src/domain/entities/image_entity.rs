//! Image-bearing records (events, users, trybes).

use serde::{Deserialize, Serialize};

use crate::domain::serde_utils;

/// Read-only view over a record that carries image references.
///
/// Every accessor defaults to "absent" so record types only implement the
/// fields they actually have.
pub trait ImageEntity {
    /// Record identifier, used to look up overrides.
    fn id(&self) -> Option<&str>;

    /// URL resolved and attached by an earlier pass.
    fn resolved_image(&self) -> Option<&str> {
        None
    }

    /// Primary image field.
    fn image(&self) -> Option<&str> {
        None
    }

    /// Gallery images; only the first is a candidate.
    fn gallery_images(&self) -> &[String] {
        &[]
    }

    /// Secondary photo list; only the first is a candidate.
    fn photos(&self) -> &[String] {
        &[]
    }

    /// Owner or host image.
    fn owner_image(&self) -> Option<&str> {
        None
    }
}

/// Image fields of a backend document.
///
/// Accepts numeric ids, `null` lists and the several field names the
/// backend uses for the same image (see `RawEntityImages`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawEntityImages")]
pub struct EntityImages {
    /// Document id.
    pub id: Option<String>,
    /// Previously resolved URL.
    pub resolved_image: Option<String>,
    /// Primary image.
    pub image: Option<String>,
    /// Gallery images.
    pub gallery_images: Vec<String>,
    /// Photos.
    pub photos: Vec<String>,
    /// Host or owner image.
    pub owner_image: Option<String>,
}

/// Wire shape of a backend document. Events, users and trybes name the
/// same image differently, and a document may carry several of the names
/// at once; each is read separately and merged in a fixed order.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawEntityImages {
    #[serde(deserialize_with = "serde_utils::lenient_id::deserialize")]
    id: Option<String>,
    resolved_image: Option<String>,
    image: Option<String>,
    image_url: Option<String>,
    cover_image: Option<String>,
    #[serde(rename = "photoURL")]
    photo_url: Option<String>,
    profile_image: Option<String>,
    #[serde(deserialize_with = "serde_utils::null_as_default")]
    gallery_images: Vec<String>,
    #[serde(deserialize_with = "serde_utils::null_as_default")]
    images: Vec<String>,
    #[serde(deserialize_with = "serde_utils::null_as_default")]
    photos: Vec<String>,
    owner_image: Option<String>,
    host_image: Option<String>,
    #[serde(rename = "hostPhotoURL")]
    host_photo_url: Option<String>,
}

/// First value that is present and not blank.
fn first_present<const N: usize>(values: [Option<String>; N]) -> Option<String> {
    values
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

impl From<RawEntityImages> for EntityImages {
    fn from(raw: RawEntityImages) -> Self {
        let gallery_images = if raw.gallery_images.is_empty() {
            raw.images
        } else {
            raw.gallery_images
        };

        Self {
            id: raw.id,
            resolved_image: raw.resolved_image,
            image: first_present([
                raw.image,
                raw.image_url,
                raw.cover_image,
                raw.photo_url,
                raw.profile_image,
            ]),
            gallery_images,
            photos: raw.photos,
            owner_image: first_present([raw.owner_image, raw.host_image, raw.host_photo_url]),
        }
    }
}

impl EntityImages {
    /// Creates a record with only an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Sets the primary image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Sets the resolved hint.
    #[must_use]
    pub fn with_resolved_image(mut self, url: impl Into<String>) -> Self {
        self.resolved_image = Some(url.into());
        self
    }

    /// Sets the gallery images.
    #[must_use]
    pub fn with_gallery_images(mut self, images: Vec<String>) -> Self {
        self.gallery_images = images;
        self
    }

    /// Sets the photos.
    #[must_use]
    pub fn with_photos(mut self, photos: Vec<String>) -> Self {
        self.photos = photos;
        self
    }

    /// Sets the owner image.
    #[must_use]
    pub fn with_owner_image(mut self, image: impl Into<String>) -> Self {
        self.owner_image = Some(image.into());
        self
    }
}

impl ImageEntity for EntityImages {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn resolved_image(&self) -> Option<&str> {
        self.resolved_image.as_deref()
    }

    fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    fn gallery_images(&self) -> &[String] {
        &self.gallery_images
    }

    fn photos(&self) -> &[String] {
        &self.photos
    }

    fn owner_image(&self) -> Option<&str> {
        self.owner_image.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_document() {
        let json = r#"{
            "id": 42,
            "imageUrl": "events/42/cover.jpg",
            "galleryImages": null,
            "photos": ["events/42/a.jpg"],
            "hostImage": "users/7/avatar.jpg",
            "title": "ignored"
        }"#;

        let entity: EntityImages = serde_json::from_str(json).unwrap();

        assert_eq!(entity.id(), Some("42"));
        assert_eq!(entity.image(), Some("events/42/cover.jpg"));
        assert!(entity.gallery_images().is_empty());
        assert_eq!(entity.photos(), ["events/42/a.jpg".to_string()]);
        assert_eq!(entity.owner_image(), Some("users/7/avatar.jpg"));
    }

    #[test]
    fn test_user_and_trybe_aliases() {
        let user: EntityImages =
            serde_json::from_str(r#"{"id": "u1", "photoURL": "users/u1/avatar.jpg"}"#).unwrap();
        assert_eq!(user.image(), Some("users/u1/avatar.jpg"));

        let trybe: EntityImages = serde_json::from_str(
            r#"{"id": "t1", "images": ["trybes/t1/a.jpg"], "hostPhotoURL": "users/9/b.jpg"}"#,
        )
        .unwrap();
        assert_eq!(trybe.gallery_images(), ["trybes/t1/a.jpg".to_string()]);
        assert_eq!(trybe.owner_image(), Some("users/9/b.jpg"));
    }

    #[test]
    fn test_several_names_for_one_image() {
        let user: EntityImages = serde_json::from_str(
            r#"{"id":"u1","photoURL":"users/u1/a.jpg","profileImage":"users/u1/b.jpg"}"#,
        )
        .unwrap();
        assert_eq!(user.image(), Some("users/u1/a.jpg"));

        let event: EntityImages = serde_json::from_str(
            r#"{"id":"e1","image":"","imageUrl":"events/e1/a.jpg","coverImage":"events/e1/b.jpg",
                "hostImage":"users/2/a.jpg","hostPhotoURL":"users/2/b.jpg"}"#,
        )
        .unwrap();
        assert_eq!(event.image(), Some("events/e1/a.jpg"));
        assert_eq!(event.owner_image(), Some("users/2/a.jpg"));
    }

    #[test]
    fn test_gallery_falls_back_to_images() {
        let trybe: EntityImages = serde_json::from_str(
            r#"{"galleryImages":[],"images":["trybes/1/a.jpg"]}"#,
        )
        .unwrap();
        assert_eq!(trybe.gallery_images(), ["trybes/1/a.jpg".to_string()]);

        let trybe: EntityImages = serde_json::from_str(
            r#"{"galleryImages":["trybes/1/g.jpg"],"images":["trybes/1/a.jpg"]}"#,
        )
        .unwrap();
        assert_eq!(trybe.gallery_images(), ["trybes/1/g.jpg".to_string()]);
    }

    #[test]
    fn test_builder() {
        let entity = EntityImages::new("1")
            .with_image("a")
            .with_photos(vec!["b".into()]);
        assert_eq!(entity.id(), Some("1"));
        assert_eq!(entity.image(), Some("a"));
        assert_eq!(entity.resolved_image(), None);
    }
}
