use std::time::{Duration, Instant};

use alloy_primitives::{Address, TxHash};
use chrono::{DateTime, Utc};

use crate::common::{PeerSelection, StatusEvent, short_address};
use crate::config::Chain;
use crate::crypto::DemoReport;
use crate::feed::chat::{Composer, HistoryState};
use crate::feed::status::StatusFeed;
use crate::feed::window::FeedWindow;

const MAX_ACTIVITY_EVENTS: usize = 100;
/// Splash shown when the news feed is opened.
const NEWS_FEED_SPLASH: Duration = Duration::from_secs(1);

/// Sự kiện hiển thị trong activity panel
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    NewsFeed,
    Chat,
    Demo,
}

/// Trạng thái cục bộ của UI.
pub struct AppState {
    pub address: Address,
    pub chain: Chain,
    pub connected_chain: Option<u64>,
    pub view: View,
    pub contacts: Vec<Address>,
    pub peer_input: String,
    pub peer: PeerSelection,
    pub history: HistoryState,
    pub composer: Composer,
    pub status_feed: StatusFeed,
    pub window: FeedWindow,
    pub splash_until: Option<Instant>,
    pub demo: Option<Result<DemoReport, String>>,
    pub activity: Vec<ActivityEvent>,
}

impl AppState {
    pub fn new(address: Address, chain: Chain, contacts: Vec<Address>) -> Self {
        Self {
            address,
            chain,
            connected_chain: None,
            view: View::NewsFeed,
            contacts,
            peer_input: String::new(),
            peer: PeerSelection::Unselected,
            history: HistoryState::Unselected,
            composer: Composer::new(),
            status_feed: StatusFeed::new(),
            window: FeedWindow::new(),
            splash_until: Some(Instant::now() + NEWS_FEED_SPLASH),
            demo: None,
            activity: Vec::new(),
        }
    }

    /// Called when the news feed becomes the visible view.
    pub fn mount_news_feed(&mut self) {
        self.status_feed = StatusFeed::new();
        self.window.reset();
        self.splash_until = Some(Instant::now() + NEWS_FEED_SPLASH);
    }

    /// Called when the news feed stops being visible; pending timers go too.
    pub fn unmount_news_feed(&mut self) {
        self.splash_until = None;
    }

    pub fn splash_active(&self) -> bool {
        self.splash_until
            .is_some_and(|deadline| Instant::now() < deadline)
    }

    /// Switches the chat partner. Returns whether a history read is needed.
    pub fn select_peer(&mut self, peer: PeerSelection) -> bool {
        self.peer = peer;
        self.composer = Composer::new();
        match peer {
            PeerSelection::Unselected => {
                self.history = HistoryState::Unselected;
                false
            }
            PeerSelection::Peer(address) => {
                self.history = HistoryState::Loading;
                if !self.contacts.contains(&address) {
                    self.contacts.push(address);
                }
                true
            }
        }
    }

    /// Re-reads the open chat. The composer keeps its draft and placeholder.
    pub fn refresh_history(&mut self) -> Option<PeerSelection> {
        self.peer.address()?;
        self.history = HistoryState::Loading;
        Some(self.peer)
    }

    pub fn apply_history(&mut self, peer: PeerSelection, history: HistoryState) {
        if peer != self.peer {
            log::debug!("Dropping stale history for {peer}");
            return;
        }
        match &history {
            HistoryState::Loaded(messages) => self.add_activity(
                "HISTORY_LOADED",
                format!("{} messages with {peer}", messages.len()),
            ),
            HistoryState::Failed(error) => {
                self.add_activity("HISTORY_FAILED", error.clone())
            }
            HistoryState::Unselected | HistoryState::Loading => {}
        }
        self.history = history;
    }

    /// Settles the composer the message was sent from. A result for a chat
    /// that has since been closed only lands in the activity log.
    pub fn apply_send_result(&mut self, peer: Address, result: Result<TxHash, String>) {
        if self.peer == PeerSelection::Peer(peer) && self.composer.is_pending() {
            self.composer.finish();
        } else {
            log::debug!("Send result for {peer} arrived after the chat changed");
        }
        match result {
            Ok(tx_hash) => self.add_activity(
                "MESSAGE_SENT",
                format!("to {}: {tx_hash}", short_address(&peer)),
            ),
            Err(error) => self.add_activity("SEND_FAILED", error),
        }
    }

    pub fn apply_status_batch(&mut self, batch: Vec<StatusEvent>) {
        if !batch.is_empty() {
            self.add_activity("STATUS_BATCH", format!("{} new status events", batch.len()));
        }
        self.status_feed.apply_batch(batch);
    }

    pub fn apply_status_failure(&mut self, error: String) {
        self.add_activity("STATUS_FAILED", error.clone());
        self.status_feed.apply_failure(error);
    }

    pub fn set_connected_chain(&mut self, chain_id: u64) {
        self.connected_chain = Some(chain_id);
        self.add_activity("CHAIN_CONNECTED", format!("chain id {chain_id}"));
    }

    pub fn add_activity(&mut self, event_type: &'static str, message: String) {
        self.activity.push(ActivityEvent {
            timestamp: Utc::now(),
            event_type,
            message,
        });

        // Giữ tối đa 100 events để không chiếm quá nhiều bộ nhớ
        if self.activity.len() > MAX_ACTIVITY_EVENTS {
            self.activity.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ChainUint, ChatMessage};
    use alloy_primitives::U256;

    fn state() -> AppState {
        AppState::new(Address::repeat_byte(0x11), Chain::Mumbai, Vec::new())
    }

    #[test]
    fn selecting_sentinel_needs_no_read() {
        let mut state = state();
        assert!(!state.select_peer(PeerSelection::Unselected));
        assert_eq!(state.history, HistoryState::Unselected);

        let peer = PeerSelection::Peer(Address::repeat_byte(0x22));
        assert!(state.select_peer(peer));
        assert_eq!(state.history, HistoryState::Loading);
        assert_eq!(state.contacts, [Address::repeat_byte(0x22)]);
    }

    #[test]
    fn stale_history_is_ignored() {
        let mut state = state();
        let first = PeerSelection::Peer(Address::repeat_byte(0x22));
        let second = PeerSelection::Peer(Address::repeat_byte(0x33));
        state.select_peer(first);
        state.select_peer(second);

        let message = ChatMessage {
            sender: Address::repeat_byte(0x22),
            receiver: Address::repeat_byte(0x11),
            timestamp: ChainUint::from_u256(U256::from(1u8)),
            message: "late".to_string(),
            original_index: 0,
        };
        state.apply_history(first, HistoryState::Loaded(vec![message]));
        assert_eq!(state.history, HistoryState::Loading);
    }

    #[test]
    fn send_result_clears_composer_either_way() {
        let mut state = state();
        state.select_peer(PeerSelection::Peer(Address::repeat_byte(0x22)));
        state.composer.input = "hello".to_string();
        assert!(state.composer.submit().is_some());

        state.apply_send_result(Address::repeat_byte(0x22), Err("reverted".to_string()));
        assert_eq!(state.composer.input, "");
        assert!(!state.composer.is_pending());
        assert_eq!(state.activity.last().map(|e| e.event_type), Some("SEND_FAILED"));
    }

    #[test]
    fn late_send_result_keeps_next_chat_draft() {
        let mut state = state();
        state.select_peer(PeerSelection::Peer(Address::repeat_byte(0x22)));
        state.composer.input = "hello".to_string();
        assert!(state.composer.submit().is_some());

        state.select_peer(PeerSelection::Peer(Address::repeat_byte(0x33)));
        state.composer.input = "draft for 0x33".to_string();
        state.apply_send_result(Address::repeat_byte(0x22), Ok(TxHash::repeat_byte(0xab)));

        assert_eq!(state.composer.input, "draft for 0x33");
        assert_eq!(state.activity.last().map(|e| e.event_type), Some("MESSAGE_SENT"));

        // Back on the first chat with a fresh draft: still nothing pending to settle.
        state.select_peer(PeerSelection::Peer(Address::repeat_byte(0x22)));
        state.composer.input = "second".to_string();
        state.apply_send_result(Address::repeat_byte(0x22), Err("late".to_string()));
        assert_eq!(state.composer.input, "second");
    }

    #[test]
    fn refresh_keeps_draft_and_prompt() {
        let mut state = state();
        assert_eq!(state.refresh_history(), None);

        let peer = PeerSelection::Peer(Address::repeat_byte(0x22));
        state.select_peer(peer);
        assert_eq!(state.composer.submit(), None);
        state.composer.input = "half typed".to_string();

        assert_eq!(state.refresh_history(), Some(peer));
        assert_eq!(state.history, HistoryState::Loading);
        assert_eq!(state.composer.input, "half typed");
        assert_eq!(state.composer.placeholder(), crate::feed::chat::EMPTY_MESSAGE_PROMPT);
    }

    #[test]
    fn unmount_cancels_splash_timer() {
        let mut state = state();
        assert!(state.splash_active());
        state.unmount_news_feed();
        assert!(!state.splash_active());
    }

    #[test]
    fn remount_resets_feed_window() {
        let mut state = state();
        state.window.grow();
        state.unmount_news_feed();
        state.mount_news_feed();
        assert_eq!(state.window.visible(), crate::feed::window::FEED_PAGE_SIZE);
        assert!(state.splash_active());
    }

    #[test]
    fn activity_log_is_bounded() {
        let mut state = state();
        for i in 0..150 {
            state.add_activity("TEST", format!("event {i}"));
        }
        assert_eq!(state.activity.len(), MAX_ACTIVITY_EVENTS);
        assert_eq!(state.activity[0].message, "event 50");
    }
}
