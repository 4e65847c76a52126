//! Viewport adapter that turns scroll reports into a near-end signal.
//!
//! The loader only needs to know that the end of the rendered list is close.
//! [`ProximityTrigger`] converts viewport reports into that signal with
//! intersection-observer semantics: it fires when the end comes into range,
//! and fires again only once the list has grown while the end is still in
//! range.

use crate::runtime::handle::{LoaderHandle, RuntimeError, TriggerOutcome};

/// Items of look-ahead before the end of the list.
pub const DEFAULT_MARGIN_ITEMS: usize = 6;

/// Edge-triggered near-end detector over viewport reports.
#[derive(Debug, Clone)]
pub struct ProximityTrigger {
    margin: usize,
    fired_at_len: Option<usize>,
}

impl Default for ProximityTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN_ITEMS)
    }
}

impl ProximityTrigger {
    /// Fires when the last visible index is within `margin` of the end.
    pub fn new(margin: usize) -> Self {
        Self {
            margin,
            fired_at_len: None,
        }
    }

    /// Records a viewport report and returns whether the near-end signal fires.
    ///
    /// `last_visible` is the index of the last rendered item on screen, or
    /// `None` when nothing is visible yet.
    pub fn observe(&mut self, rendered_len: usize, last_visible: Option<usize>) -> bool {
        if !self.is_near(rendered_len, last_visible) {
            self.fired_at_len = None;
            return false;
        }
        if self.fired_at_len == Some(rendered_len) {
            return false;
        }
        self.fired_at_len = Some(rendered_len);
        true
    }

    /// Observes a report and forwards a fire to the loader.
    pub async fn pulse(
        &mut self,
        handle: &LoaderHandle,
        rendered_len: usize,
        last_visible: Option<usize>,
    ) -> Result<Option<TriggerOutcome>, RuntimeError> {
        if !self.observe(rendered_len, last_visible) {
            return Ok(None);
        }
        handle.near_end().await.map(Some)
    }

    fn is_near(&self, rendered_len: usize, last_visible: Option<usize>) -> bool {
        let seen = last_visible.map_or(0, |idx| idx + 1);
        rendered_len.saturating_sub(seen) <= self.margin
    }
}
