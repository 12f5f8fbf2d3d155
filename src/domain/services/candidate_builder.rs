use std::collections::{HashMap, HashSet};

use crate::domain::entities::ImageEntity;

/// Builds the ordered candidate list for one image slot.
pub struct CandidateBuilder;

impl CandidateBuilder {
    /// Collects image references from `entity`, most preferred first.
    ///
    /// Order: override for the entity id, resolved hint, primary image,
    /// first gallery image, first photo, owner image. Blank values are
    /// dropped and the first occurrence of each value wins. For the two
    /// lists, "first" means the first entry not already chosen.
    #[must_use]
    pub fn build<E>(entity: &E, overrides_by_id: Option<&HashMap<String, String>>) -> Vec<String>
    where
        E: ImageEntity + ?Sized,
    {
        let override_url = entity
            .id()
            .zip(overrides_by_id)
            .and_then(|(id, overrides)| overrides.get(id))
            .map(String::as_str);

        let mut candidates = Self::dedup(
            [override_url, entity.resolved_image(), entity.image()]
                .into_iter()
                .flatten(),
        );

        for list in [entity.gallery_images(), entity.photos()] {
            if let Some(next) = list
                .iter()
                .find(|r| !r.trim().is_empty() && !candidates.contains(*r))
            {
                candidates.push(next.clone());
            }
        }

        if let Some(owner) = entity.owner_image()
            && !owner.trim().is_empty()
            && !candidates.iter().any(|c| c == owner)
        {
            candidates.push(owner.to_string());
        }

        candidates
    }

    /// Stable de-duplication dropping blank entries.
    #[must_use]
    pub fn dedup<'a, I>(references: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        references
            .into_iter()
            .filter(|r| !r.trim().is_empty())
            .filter(|r| seen.insert(*r))
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EntityImages;

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let entity = EntityImages::new("1")
            .with_image("a")
            .with_photos(vec!["a".into(), "b".into()]);

        assert_eq!(CandidateBuilder::build(&entity, None), vec!["a", "b"]);

        let entity = EntityImages::new("1")
            .with_image("a")
            .with_gallery_images(vec!["b".into()])
            .with_photos(vec!["a".into()]);

        assert_eq!(CandidateBuilder::build(&entity, None), vec!["a", "b"]);
    }

    #[test]
    fn test_only_one_entry_per_list() {
        let entity = EntityImages::new("1")
            .with_image("a")
            .with_photos(vec!["b".into(), "c".into()]);

        assert_eq!(CandidateBuilder::build(&entity, None), vec!["a", "b"]);
    }

    #[test]
    fn test_full_precedence_order() {
        let entity = EntityImages::new("42")
            .with_resolved_image("resolved")
            .with_image("image")
            .with_gallery_images(vec!["gallery".into(), "gallery2".into()])
            .with_photos(vec!["photo".into()])
            .with_owner_image("owner");
        let overrides = HashMap::from([("42".to_string(), "override".to_string())]);

        assert_eq!(
            CandidateBuilder::build(&entity, Some(&overrides)),
            vec!["override", "resolved", "image", "gallery", "photo", "owner"]
        );
    }

    #[test]
    fn test_override_wins_over_image() {
        let entity = EntityImages::new("42").with_image("events/42/cover.jpg");
        let overrides = HashMap::from([(
            "42".to_string(),
            "https://override/x.jpg".to_string(),
        )]);

        let candidates = CandidateBuilder::build(&entity, Some(&overrides));
        assert_eq!(candidates[0], "https://override/x.jpg");
        assert_eq!(candidates[1], "events/42/cover.jpg");
    }

    #[test]
    fn test_override_for_other_id_ignored() {
        let entity = EntityImages::new("42").with_image("a");
        let overrides = HashMap::from([("7".to_string(), "x".to_string())]);

        assert_eq!(CandidateBuilder::build(&entity, Some(&overrides)), vec!["a"]);
    }

    #[test]
    fn test_blank_values_dropped() {
        let entity = EntityImages::new("1")
            .with_image("")
            .with_gallery_images(vec!["  ".into()])
            .with_owner_image("owner");
        let overrides = HashMap::from([("1".to_string(), String::new())]);

        assert_eq!(
            CandidateBuilder::build(&entity, Some(&overrides)),
            vec!["owner"]
        );
    }

    #[test]
    fn test_no_images() {
        let entity = EntityImages::default();
        assert!(CandidateBuilder::build(&entity, None).is_empty());
    }
}
