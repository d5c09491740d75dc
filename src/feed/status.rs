use std::collections::{HashMap, HashSet};

use alloy_primitives::Address;

use crate::common::StatusEvent;

/// What the news feed should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState<'a> {
    /// Nothing received from the subscription yet.
    Loading,
    /// Transport failed before any data arrived.
    Failed(&'a str),
    Ready(&'a [StatusEvent]),
}

/// Keeps, per user, only the event that appears last in `events`. Retained
/// events stay in their input order.
pub fn filter_latest_per_user(events: &[StatusEvent]) -> Vec<StatusEvent> {
    let mut last_index: HashMap<Address, usize> = HashMap::with_capacity(events.len());
    for (index, event) in events.iter().enumerate() {
        last_index.insert(event.user, index);
    }

    events
        .iter()
        .enumerate()
        .filter(|(index, event)| last_index.get(&event.user) == Some(index))
        .map(|(_, event)| event.clone())
        .collect()
}

/// Accumulates subscription pushes in emission order.
#[derive(Debug, Default)]
pub struct StatusFeed {
    events: Vec<StatusEvent>,
    seen_ids: HashSet<String>,
    latest: Vec<StatusEvent>,
    received_any: bool,
    last_error: Option<String>,
}

impl StatusFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one pushed batch. A batch whose events all carry a log position
    /// is put back into emission order first; duplicates by status id are
    /// dropped.
    pub fn apply_batch(&mut self, mut batch: Vec<StatusEvent>) {
        self.received_any = true;
        self.last_error = None;

        if batch.iter().all(|event| event.position.is_some()) {
            batch.sort_by_key(|event| event.position);
        }

        let before = self.events.len();
        for event in batch {
            if self.seen_ids.insert(event.status_id.to_decimal_string()) {
                self.events.push(event);
            }
        }

        if self.events.len() != before {
            self.latest = filter_latest_per_user(&self.events);
            log::debug!(
                "Status feed: {} events, {} users",
                self.events.len(),
                self.latest.len()
            );
        }
    }

    pub fn apply_failure(&mut self, error: String) {
        log::warn!("Status subscription failed: {error}");
        self.last_error = Some(error);
    }

    pub fn state(&self) -> FeedState<'_> {
        if self.received_any {
            return FeedState::Ready(&self.latest);
        }
        match &self.last_error {
            Some(error) => FeedState::Failed(error),
            None => FeedState::Loading,
        }
    }

    /// Number of raw events observed, before per-user filtering.
    pub fn observed(&self) -> usize {
        self.events.len()
    }
}
