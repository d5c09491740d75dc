use alloy_primitives::{Address, TxHash};

use super::types::{PeerSelection, StatusEvent};
use crate::feed::chat::HistoryState;

/// Sự kiện từ worker gửi lên UI.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    ChainConnected(u64),
    HistoryLoaded {
        peer: PeerSelection,
        state: HistoryState,
    },
    MessageSent {
        peer: Address,
        result: Result<TxHash, String>,
    },
    StatusBatch(Vec<StatusEvent>),
    StatusFailed(String),
}
