use alloy_primitives::Address;

use super::types::PeerSelection;

/// Lệnh UI gửi xuống worker giao tiếp với contract.
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Đọc toàn bộ lịch sử chat với peer đang chọn
    LoadHistory { peer: PeerSelection },
    /// Gửi tin nhắn qua contract (transaction)
    SendMessage { peer: Address, body: String },
    /// Bắt đầu subscribe sự kiện `StatusUpdated`
    SubscribeStatus,
    /// Hủy subscription khi view news feed bị đóng
    UnsubscribeStatus,
}
