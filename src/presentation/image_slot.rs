//! Display state for one image slot (a card cover, an avatar, ...).

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::domain::entities::ResolutionOutcome;
use crate::domain::ports::{FallbackTracer, ImageResolverPort, NoopFallbackTracer};

/// Default static placeholder asset.
pub const DEFAULT_FALLBACK_IMAGE: &str = "/assets/placeholder-event.png";

/// Lifecycle of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    /// Resolving or loading; a neutral placeholder is shown.
    #[default]
    Pending,
    /// The resolved image rendered.
    Loaded,
    /// The static fallback is shown. Terminal until the candidates change.
    Fallback,
}

/// What the renderer should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayUrl {
    /// Current slot state.
    pub state: SlotState,
    /// Source to load. While `Pending` this is the resolved URL once known
    /// (the placeholder stays visible until it loads).
    pub url: Option<String>,
}

/// Per-slot settings.
#[derive(Debug, Clone)]
pub struct SlotConfig {
    /// Static asset shown on failure.
    pub fallback_url: String,
    /// Hosts that should never reach a view (sample or demo images).
    pub suspicious_hosts: Vec<String>,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            fallback_url: DEFAULT_FALLBACK_IMAGE.to_string(),
            suspicious_hosts: Vec::new(),
        }
    }
}

/// State machine for one displayed image.
pub struct ImageSlot {
    context: String,
    candidates: Vec<String>,
    generation: u64,
    state: SlotState,
    resolved_url: Option<String>,
    alive: bool,
    config: SlotConfig,
    tracer: Arc<dyn FallbackTracer>,
}

impl ImageSlot {
    /// Creates a pending slot. `context` names the consuming view in
    /// diagnostics.
    #[must_use]
    pub fn new(context: impl Into<String>, candidates: Vec<String>, config: SlotConfig) -> Self {
        Self {
            context: context.into(),
            candidates,
            generation: 0,
            state: SlotState::Pending,
            resolved_url: None,
            alive: true,
            config,
            tracer: Arc::new(NoopFallbackTracer),
        }
    }

    /// Sets the diagnostics hook.
    #[must_use]
    pub fn with_tracer(mut self, tracer: Arc<dyn FallbackTracer>) -> Self {
        self.tracer = tracer;
        self
    }

    /// Replaces the candidates, restarting resolution.
    ///
    /// Returns false (and keeps the current state) if nothing changed.
    pub fn set_candidates(&mut self, candidates: Vec<String>) -> bool {
        if candidates == self.candidates {
            return false;
        }
        self.candidates = candidates;
        self.generation += 1;
        self.state = SlotState::Pending;
        self.resolved_url = None;
        trace!(context = %self.context, generation = self.generation, "Image slot reset");
        true
    }

    /// Current candidates.
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Identifies the current candidate list; results for older
    /// generations are discarded.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SlotState {
        self.state
    }

    /// Returns false once the slot has been torn down.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Returns what to render.
    #[must_use]
    pub fn display(&self) -> DisplayUrl {
        let url = match self.state {
            SlotState::Pending | SlotState::Loaded => self.resolved_url.clone(),
            SlotState::Fallback => Some(self.config.fallback_url.clone()),
        };
        DisplayUrl {
            state: self.state,
            url,
        }
    }

    /// Applies a resolver result computed for `generation`.
    ///
    /// Returns false when the result is stale (different generation, slot
    /// torn down, or already settled).
    pub fn apply_outcome(&mut self, generation: u64, outcome: ResolutionOutcome) -> bool {
        if !self.accepts(generation) {
            trace!(context = %self.context, generation, "Discarding stale resolution");
            return false;
        }
        match outcome.into_url() {
            Some(url) => self.resolved_url = Some(url),
            None => self.enter_fallback(),
        }
        true
    }

    /// Marks the resolved image as rendered.
    pub fn on_load(&mut self, generation: u64) {
        if self.accepts(generation) && self.resolved_url.is_some() {
            self.state = SlotState::Loaded;
        }
    }

    /// Handles a render-time load error for the source shown at
    /// `generation`.
    ///
    /// The first error swaps to the fallback; errors after that (the
    /// fallback asset itself failing) are ignored, as are errors from a
    /// source replaced since.
    pub fn on_load_error(&mut self, generation: u64) {
        if !self.alive || generation != self.generation || self.state == SlotState::Fallback {
            trace!(context = %self.context, generation, "Ignoring load error");
            return;
        }
        self.enter_fallback();
    }

    /// Tears the slot down; later results are discarded.
    pub fn detach(&mut self) {
        self.alive = false;
    }

    fn accepts(&self, generation: u64) -> bool {
        self.alive && generation == self.generation && self.state == SlotState::Pending
    }

    fn enter_fallback(&mut self) {
        self.state = SlotState::Fallback;
        let source = self
            .resolved_url
            .as_deref()
            .or_else(|| self.candidates.first().map(String::as_str));
        debug!(context = %self.context, source = ?source, "Image slot fell back");

        if let Some(url) = source
            && is_suspicious_host(url, &self.config.suspicious_hosts)
        {
            self.tracer.suspicious_fallback(&self.context, url);
        }
    }
}

impl std::fmt::Debug for ImageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSlot")
            .field("context", &self.context)
            .field("candidates", &self.candidates)
            .field("generation", &self.generation)
            .field("state", &self.state)
            .field("resolved_url", &self.resolved_url)
            .field("alive", &self.alive)
            .finish_non_exhaustive()
    }
}

fn is_suspicious_host(url: &str, hosts: &[String]) -> bool {
    let Some(host) = url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
    else {
        return false;
    };
    hosts.iter().any(|h| {
        let h = h.to_ascii_lowercase();
        host == h || host.ends_with(&format!(".{h}"))
    })
}

/// Shared handle to a slot, for resolving in the background.
#[derive(Debug, Clone)]
pub struct SlotHandle {
    slot: Arc<Mutex<ImageSlot>>,
}

impl SlotHandle {
    /// Wraps a slot.
    #[must_use]
    pub fn new(slot: ImageSlot) -> Self {
        Self {
            slot: Arc::new(Mutex::new(slot)),
        }
    }

    /// Resolves the slot's current candidates and applies the result if
    /// the slot is still alive and unchanged. Returns whether it applied.
    pub async fn resolve(&self, resolver: &dyn ImageResolverPort) -> bool {
        let (generation, candidates) = {
            let slot = self.slot.lock();
            if !slot.is_alive() {
                return false;
            }
            (slot.generation(), slot.candidates().to_vec())
        };

        let outcome = resolver.resolve(&candidates).await;

        self.slot.lock().apply_outcome(generation, outcome)
    }

    /// Returns what to render.
    #[must_use]
    pub fn display(&self) -> DisplayUrl {
        self.slot.lock().display()
    }

    /// Runs `f` with exclusive access to the slot.
    pub fn with<R>(&self, f: impl FnOnce(&mut ImageSlot) -> R) -> R {
        f(&mut *self.slot.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::{FixedResolver, RecordingTracer};

    fn slot(candidates: &[&str]) -> ImageSlot {
        ImageSlot::new(
            "event_card",
            candidates.iter().map(|s| (*s).to_string()).collect(),
            SlotConfig::default(),
        )
    }

    #[test]
    fn test_pending_shows_placeholder() {
        let slot = slot(&["events/1.jpg"]);
        assert_eq!(
            slot.display(),
            DisplayUrl {
                state: SlotState::Pending,
                url: None
            }
        );
    }

    #[test]
    fn test_resolved_then_loaded() {
        let mut slot = slot(&["events/1.jpg"]);
        let generation = slot.generation();

        assert!(slot.apply_outcome(generation, ResolutionOutcome::Resolved("https://cdn/1.jpg".into())));
        assert_eq!(slot.state(), SlotState::Pending);
        assert_eq!(slot.display().url.as_deref(), Some("https://cdn/1.jpg"));

        slot.on_load(generation);
        assert_eq!(slot.state(), SlotState::Loaded);
        assert_eq!(slot.display().url.as_deref(), Some("https://cdn/1.jpg"));
    }

    #[test]
    fn test_failed_outcome_falls_back() {
        let mut slot = slot(&["bad"]);
        slot.apply_outcome(0, ResolutionOutcome::Failed);

        assert_eq!(
            slot.display(),
            DisplayUrl {
                state: SlotState::Fallback,
                url: Some(DEFAULT_FALLBACK_IMAGE.to_string())
            }
        );
    }

    #[test]
    fn test_at_most_one_fallback() {
        let tracer = Arc::new(RecordingTracer::new());
        let config = SlotConfig {
            suspicious_hosts: vec!["picsum.photos".into()],
            ..SlotConfig::default()
        };
        let mut slot = ImageSlot::new("profile", vec!["https://picsum.photos/200".into()], config)
            .with_tracer(tracer.clone());

        slot.apply_outcome(0, ResolutionOutcome::Immediate("https://picsum.photos/200".into()));
        slot.on_load_error(0);
        slot.on_load_error(0);
        slot.on_load_error(0);

        assert_eq!(slot.state(), SlotState::Fallback);
        assert_eq!(tracer.reports().len(), 1);
        // a late resolution cannot leave the fallback
        assert!(!slot.apply_outcome(0, ResolutionOutcome::Immediate("https://x".into())));
        slot.on_load(0);
        assert_eq!(slot.state(), SlotState::Fallback);
    }

    #[test]
    fn test_load_error_before_resolution_falls_back() {
        let mut slot = slot(&["events/1.jpg"]);
        slot.on_load_error(0);
        assert_eq!(slot.state(), SlotState::Fallback);
    }

    #[test]
    fn test_new_candidates_reset_to_pending() {
        let mut slot = slot(&["a"]);
        slot.apply_outcome(0, ResolutionOutcome::Failed);
        assert_eq!(slot.state(), SlotState::Fallback);

        assert!(!slot.set_candidates(vec!["a".into()]));
        assert_eq!(slot.state(), SlotState::Fallback);

        assert!(slot.set_candidates(vec!["b".into()]));
        assert_eq!(slot.state(), SlotState::Pending);
        assert_eq!(slot.generation(), 1);
        assert_eq!(slot.display().url, None);
    }

    #[test]
    fn test_load_error_from_replaced_source_ignored() {
        let mut slot = slot(&["a.jpg"]);
        slot.apply_outcome(0, ResolutionOutcome::Resolved("https://cdn/a.jpg".into()));
        assert!(slot.set_candidates(vec!["b.jpg".into()]));

        slot.on_load_error(0);
        assert_eq!(slot.state(), SlotState::Pending);
        assert_eq!(slot.display().url, None);

        slot.on_load_error(1);
        assert_eq!(slot.state(), SlotState::Fallback);
    }

    #[test]
    fn test_stale_generation_discarded() {
        let mut slot = slot(&["a"]);
        let old = slot.generation();
        slot.set_candidates(vec!["b".into()]);

        assert!(!slot.apply_outcome(old, ResolutionOutcome::Resolved("https://a".into())));
        assert_eq!(slot.display().url, None);
    }

    #[test]
    fn test_detached_slot_ignores_everything() {
        let mut slot = slot(&["a"]);
        slot.detach();

        assert!(!slot.apply_outcome(0, ResolutionOutcome::Resolved("https://a".into())));
        slot.on_load_error(0);
        assert_eq!(slot.state(), SlotState::Pending);
    }

    #[test]
    fn test_suspicious_host_matching() {
        let hosts = vec!["unsplash.com".to_string()];
        assert!(is_suspicious_host("https://images.unsplash.com/p.jpg", &hosts));
        assert!(is_suspicious_host("https://UNSPLASH.com/p.jpg", &hosts));
        assert!(!is_suspicious_host("https://notunsplash.com/p.jpg", &hosts));
        assert!(!is_suspicious_host("/assets/p.png", &hosts));
    }

    #[test]
    fn test_regular_fallback_not_traced() {
        let tracer = Arc::new(RecordingTracer::new());
        let config = SlotConfig {
            suspicious_hosts: vec!["picsum.photos".into()],
            ..SlotConfig::default()
        };
        let mut slot = ImageSlot::new("chat", vec!["https://cdn/x.jpg".into()], config)
            .with_tracer(tracer.clone());

        slot.on_load_error(0);
        assert!(tracer.reports().is_empty());
    }

    #[tokio::test]
    async fn test_handle_applies_result() {
        let handle = SlotHandle::new(slot(&["events/1.jpg"]));
        let resolver = FixedResolver::new(ResolutionOutcome::Resolved("https://cdn/1.jpg".into()));

        assert!(handle.resolve(&resolver).await);
        assert_eq!(handle.display().url.as_deref(), Some("https://cdn/1.jpg"));
    }

    #[test]
    fn test_handle_discards_after_teardown() {
        let handle = SlotHandle::new(slot(&["events/1.jpg"]));
        handle.with(ImageSlot::detach);
        let resolver = FixedResolver::new(ResolutionOutcome::Resolved("https://cdn/1.jpg".into()));

        assert!(!tokio_test::block_on(handle.resolve(&resolver)));
        assert_eq!(resolver.calls(), 0);
        assert_eq!(handle.display().url, None);
    }

    struct SwappingResolver {
        handle: SlotHandle,
    }

    #[async_trait::async_trait]
    impl ImageResolverPort for SwappingResolver {
        async fn resolve(&self, _candidates: &[String]) -> ResolutionOutcome {
            self.handle.with(|slot| slot.set_candidates(vec!["b".into()]));
            ResolutionOutcome::Failed
        }
    }

    #[tokio::test]
    async fn test_handle_discards_when_candidates_change_mid_flight() {
        let handle = SlotHandle::new(slot(&["a"]));
        let resolver = SwappingResolver {
            handle: handle.clone(),
        };

        assert!(!handle.resolve(&resolver).await);
        assert_eq!(handle.display().state, SlotState::Pending);
        assert_eq!(handle.with(|slot| slot.generation()), 1);
    }
}
