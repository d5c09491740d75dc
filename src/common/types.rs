use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};

use crate::feed::FeedError;

/// Sentinel the sidebar uses while no chat partner is chosen.
pub const UNSELECTED_PEER: &str = "unselected_wallet_@";

/// A `uint256` as received from the chain: the raw hex text plus its
/// full-width decoded value. Decoding never goes through a machine integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainUint {
    raw: String,
    value: Option<U256>,
}

impl ChainUint {
    pub fn from_hex(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let value = parse_hex_u256(&raw);
        Self { raw, value }
    }

    pub fn from_u256(value: U256) -> Self {
        Self {
            raw: format!("{value:#x}"),
            value: Some(value),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Decoded value, or `None` when the raw text is not valid hex.
    pub fn value(&self) -> Option<U256> {
        self.value
    }

    /// Value as a unix timestamp, or the error logged for unparsable ones.
    pub fn decode_timestamp(&self) -> Result<U256, FeedError> {
        self.value
            .ok_or_else(|| FeedError::MalformedTimestamp(self.raw.clone()))
    }

    /// Decimal rendering used for stable list keys; falls back to the raw text.
    pub fn to_decimal_string(&self) -> String {
        match self.value {
            Some(value) => value.to_string(),
            None => self.raw.clone(),
        }
    }

    /// Interprets the value as unix seconds.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        let seconds = u64::try_from(self.value?).ok()?;
        DateTime::from_timestamp(i64::try_from(seconds).ok()?, 0)
    }
}

impl fmt::Display for ChainUint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_hex_u256(raw: &str) -> Option<U256> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    U256::from_str_radix(digits, 16).ok()
}

/// Positional tuple returned by `getAllChatMessagesWithInfo`:
/// (sender, receiver, timestamp hex, message body).
pub type RawChatTuple = (Address, Address, String, String);

/// Một tin nhắn chat đã được chuẩn hóa từ contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Address,
    pub receiver: Address,
    pub timestamp: ChainUint,
    pub message: String,
    /// Position in the unsorted contract response, used as a stable UI key.
    pub original_index: usize,
}

/// Where a log was emitted, when the transport reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventPosition {
    pub block_number: u64,
    pub log_index: u64,
}

/// One `StatusUpdated` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub user: Address,
    pub new_status: String,
    pub timestamp: ChainUint,
    pub status_id: ChainUint,
    pub position: Option<EventPosition>,
}

/// The chat partner picked in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeerSelection {
    #[default]
    Unselected,
    Peer(Address),
}

impl PeerSelection {
    pub fn address(&self) -> Option<Address> {
        match self {
            PeerSelection::Unselected => None,
            PeerSelection::Peer(address) => Some(*address),
        }
    }
}

impl FromStr for PeerSelection {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == UNSELECTED_PEER {
            return Ok(PeerSelection::Unselected);
        }
        s.parse::<Address>()
            .map(PeerSelection::Peer)
            .map_err(|_| FeedError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for PeerSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerSelection::Unselected => f.write_str(UNSELECTED_PEER),
            PeerSelection::Peer(address) => write!(f, "{address}"),
        }
    }
}

/// Wallet and contract addresses every adapter call runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainContext {
    pub self_address: Address,
    pub chat_contract: Address,
    pub status_contract: Address,
}

/// `0x1234…abcd` form used in lists.
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}
