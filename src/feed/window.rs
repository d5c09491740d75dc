/// Items revealed per "more" click.
pub const FEED_PAGE_SIZE: usize = 10;

/// Count of feed items currently visible. Only grows until `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedWindow {
    visible: usize,
}

impl Default for FeedWindow {
    fn default() -> Self {
        Self {
            visible: FEED_PAGE_SIZE,
        }
    }
}

impl FeedWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn grow(&mut self) {
        self.visible += FEED_PAGE_SIZE;
    }

    pub fn reset(&mut self) {
        self.visible = FEED_PAGE_SIZE;
    }

    /// Whether a "more" control should be offered for `total` items.
    pub fn has_more(&self, total: usize) -> bool {
        self.visible < total
    }
}

/// First `window` items; a larger window only appends.
pub fn paginate<T>(items: &[T], window: usize) -> &[T] {
    &items[..window.min(items.len())]
}
