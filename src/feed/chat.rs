use std::cmp::Ordering;

use alloy_primitives::TxHash;

use crate::common::{ChainContext, ChainUint, ChatMessage, PeerSelection, RawChatTuple};
use crate::gateway::ContractGateway;

use super::FeedError;

pub const DEFAULT_PLACEHOLDER: &str = "Type a message...";
pub const EMPTY_MESSAGE_PROMPT: &str = "You need to typing your message!!!";

/// What the chat pane should draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryState {
    /// No peer chosen; the pane asks the user to pick one.
    Unselected,
    Loading,
    Loaded(Vec<ChatMessage>),
    Failed(String),
}

/// Reads the conversation with `peer`. The unselected sentinel returns
/// without touching the gateway.
pub async fn load_history<G>(gateway: &G, ctx: &ChainContext, peer: &PeerSelection) -> HistoryState
where
    G: ContractGateway + ?Sized,
{
    let PeerSelection::Peer(peer) = peer else {
        return HistoryState::Unselected;
    };

    match gateway.read_chat_history(ctx, *peer).await {
        Ok(raw) => {
            log::debug!("Loaded {} chat messages with {peer}", raw.len());
            HistoryState::Loaded(normalize_and_sort(raw))
        }
        Err(err) => {
            log::error!("contract read failure: {err}");
            HistoryState::Failed(err.to_string())
        }
    }
}

/// Maps contract tuples positionally and sorts them newest first by the
/// full-width timestamp. Unparsable timestamps sort last; equal keys keep
/// their original order.
pub fn normalize_and_sort(raw: Vec<RawChatTuple>) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = raw
        .into_iter()
        .enumerate()
        .map(|(original_index, (sender, receiver, timestamp, message))| {
            let timestamp = ChainUint::from_hex(timestamp);
            if let Err(err) = timestamp.decode_timestamp() {
                log::warn!("chat message #{original_index}: {err}");
            }
            ChatMessage {
                sender,
                receiver,
                timestamp,
                message,
                original_index,
            }
        })
        .collect();

    messages.sort_by(|a, b| newest_first(&a.timestamp, &b.timestamp));
    messages
}

fn newest_first(a: &ChainUint, b: &ChainUint) -> Ordering {
    // `None < Some(_)`, so reversing puts malformed values at the end.
    b.value().cmp(&a.value())
}

/// Input box state for the chat pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composer {
    pub input: String,
    placeholder: &'static str,
    pending: bool,
}

impl Default for Composer {
    fn default() -> Self {
        Self {
            input: String::new(),
            placeholder: DEFAULT_PLACEHOLDER,
            pending: false,
        }
    }
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Hands out the body to send. An empty input switches the placeholder to
    /// a prompt and leaves the input as it is.
    pub fn submit(&mut self) -> Option<String> {
        if self.pending {
            return None;
        }
        if self.input.is_empty() {
            self.placeholder = EMPTY_MESSAGE_PROMPT;
            return None;
        }
        self.pending = true;
        Some(self.input.clone())
    }

    /// Called once the write settled, whatever its outcome.
    pub fn finish(&mut self) {
        self.input.clear();
        self.pending = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing to send; the composer now shows a prompt.
    Prompted,
    NoPeer,
    Sent(TxHash),
    Failed(String),
}

/// Submits one `sendMessage` write. Failures are logged, never retried.
pub async fn write_message<G>(
    gateway: &G,
    ctx: &ChainContext,
    peer: &PeerSelection,
    body: &str,
) -> Result<TxHash, FeedError>
where
    G: ContractGateway + ?Sized,
{
    let PeerSelection::Peer(peer) = peer else {
        return Err(FeedError::NoPeerSelected);
    };
    if body.is_empty() {
        return Err(FeedError::EmptyMessage);
    }

    match gateway.send_message(ctx, *peer, body).await {
        Ok(tx_hash) => {
            log::info!("sendMessage to {peer} submitted: {tx_hash}");
            Ok(tx_hash)
        }
        Err(err) => {
            log::error!("contract call failure: {err}");
            Err(err.into())
        }
    }
}

/// Sends what the composer holds and clears it afterwards.
pub async fn send_message<G>(
    gateway: &G,
    ctx: &ChainContext,
    peer: &PeerSelection,
    composer: &mut Composer,
) -> SendOutcome
where
    G: ContractGateway + ?Sized,
{
    if *peer == PeerSelection::Unselected {
        return SendOutcome::NoPeer;
    }
    let Some(body) = composer.submit() else {
        return SendOutcome::Prompted;
    };

    let result = write_message(gateway, ctx, peer, &body).await;
    composer.finish();

    match result {
        Ok(tx_hash) => SendOutcome::Sent(tx_hash),
        Err(err) => SendOutcome::Failed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockGateway;
    use alloy_primitives::Address;

    fn ctx() -> ChainContext {
        ChainContext {
            self_address: Address::repeat_byte(0x11),
            chat_contract: Address::repeat_byte(0xcc),
            status_contract: Address::repeat_byte(0x55),
        }
    }

    fn peer() -> PeerSelection {
        PeerSelection::Peer(Address::repeat_byte(0x22))
    }

    fn tuple(timestamp: &str, body: &str) -> RawChatTuple {
        (
            Address::repeat_byte(0x11),
            Address::repeat_byte(0x22),
            timestamp.to_string(),
            body.to_string(),
        )
    }

    fn timestamps(messages: &[ChatMessage]) -> Vec<&str> {
        messages.iter().map(|m| m.timestamp.raw()).collect()
    }

    #[test]
    fn sorts_by_numeric_value_not_text() {
        let sorted = normalize_and_sort(vec![
            tuple("0x5", "five"),
            tuple("0x1f4", "five hundred"),
            tuple("0xa", "ten"),
        ]);

        assert_eq!(timestamps(&sorted), ["0x1f4", "0xa", "0x5"]);
        let indexes: Vec<_> = sorted.iter().map(|m| m.original_index).collect();
        assert_eq!(indexes, [1, 2, 0]);
    }

    #[test]
    fn compares_full_width_values() {
        // Equal in their low 64 bits; only the high limbs differ.
        let low = "0x10000000000000001";
        let high = "0x20000000000000001";
        let huge = "0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff00";

        let sorted = normalize_and_sort(vec![tuple(low, "a"), tuple(huge, "b"), tuple(high, "c")]);
        assert_eq!(timestamps(&sorted), [huge, high, low]);
    }

    #[test]
    fn malformed_timestamps_sort_last_in_original_order() {
        let sorted = normalize_and_sort(vec![
            tuple("garbage", "x"),
            tuple("0x1", "one"),
            tuple("", "y"),
            tuple("0x2", "two"),
        ]);

        assert_eq!(timestamps(&sorted), ["0x2", "0x1", "garbage", ""]);
    }

    #[test]
    fn maps_tuple_fields_by_position() {
        let sorted = normalize_and_sort(vec![tuple("0x1", "hi")]);
        let message = &sorted[0];
        assert_eq!(message.sender, Address::repeat_byte(0x11));
        assert_eq!(message.receiver, Address::repeat_byte(0x22));
        assert_eq!(message.message, "hi");
        assert_eq!(message.original_index, 0);
    }

    #[tokio::test]
    async fn unselected_peer_issues_no_read() {
        let gateway = MockGateway::with_history(vec![tuple("0x1", "hi")]);
        let state = load_history(&gateway, &ctx(), &PeerSelection::Unselected).await;

        assert_eq!(state, HistoryState::Unselected);
        assert_eq!(gateway.reads(), 0);
    }

    #[tokio::test]
    async fn loads_and_sorts_history() {
        let gateway = MockGateway::with_history(vec![tuple("0x1", "old"), tuple("0x2", "new")]);
        let HistoryState::Loaded(messages) = load_history(&gateway, &ctx(), &peer()).await else {
            panic!("history should load");
        };

        assert_eq!(gateway.reads(), 1);
        assert_eq!(messages[0].message, "new");
    }

    #[tokio::test]
    async fn read_failure_is_distinct_from_loading() {
        let gateway = MockGateway::failing_reads();
        let state = load_history(&gateway, &ctx(), &peer()).await;
        assert!(matches!(state, HistoryState::Failed(_)));
    }

    #[tokio::test]
    async fn empty_body_prompts_without_writing() {
        let gateway = MockGateway::default();
        let mut composer = Composer::new();

        let outcome = send_message(&gateway, &ctx(), &peer(), &mut composer).await;

        assert_eq!(outcome, SendOutcome::Prompted);
        assert_eq!(gateway.writes(), 0);
        assert_eq!(composer.input, "");
        assert_eq!(composer.placeholder(), EMPTY_MESSAGE_PROMPT);
    }

    #[tokio::test]
    async fn sends_once_and_clears_input() {
        let gateway = MockGateway::default();
        let mut composer = Composer::new();
        composer.input = "hello".to_string();

        let outcome = send_message(&gateway, &ctx(), &peer(), &mut composer).await;

        assert!(matches!(outcome, SendOutcome::Sent(_)));
        assert_eq!(gateway.writes(), 1);
        assert_eq!(
            gateway.sent.lock().unwrap().as_slice(),
            &[(Address::repeat_byte(0x22), "hello".to_string())]
        );
        assert_eq!(composer.input, "");
        assert!(!composer.is_pending());
    }

    #[tokio::test]
    async fn whitespace_body_is_sent_as_is() {
        let gateway = MockGateway::default();
        let mut composer = Composer::new();
        composer.input = " ".to_string();

        let outcome = send_message(&gateway, &ctx(), &peer(), &mut composer).await;

        assert!(matches!(outcome, SendOutcome::Sent(_)));
        assert_eq!(gateway.writes(), 1);
        assert_eq!(
            gateway.sent.lock().unwrap().as_slice(),
            &[(Address::repeat_byte(0x22), " ".to_string())]
        );
        assert_eq!(composer.placeholder(), DEFAULT_PLACEHOLDER);
    }

    #[tokio::test]
    async fn failed_send_still_clears_input() {
        let gateway = MockGateway::failing_writes();
        let mut composer = Composer::new();
        composer.input = "hello".to_string();

        let outcome = send_message(&gateway, &ctx(), &peer(), &mut composer).await;

        assert!(matches!(outcome, SendOutcome::Failed(_)));
        assert_eq!(gateway.writes(), 1);
        assert_eq!(composer.input, "");
    }

    #[tokio::test]
    async fn write_without_peer_is_rejected_locally() {
        let gateway = MockGateway::default();
        let result = write_message(&gateway, &ctx(), &PeerSelection::Unselected, "hello").await;

        assert!(matches!(result, Err(FeedError::NoPeerSelected)));
        assert_eq!(gateway.writes(), 0);
    }

    #[test]
    fn pending_composer_ignores_second_submit() {
        let mut composer = Composer::new();
        composer.input = "hello".to_string();
        assert_eq!(composer.submit().as_deref(), Some("hello"));
        assert_eq!(composer.submit(), None);
        composer.finish();
        assert_eq!(composer.placeholder(), DEFAULT_PLACEHOLDER);
    }
}
