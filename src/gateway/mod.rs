//! Contract gateway: the only place that talks to the chain.
//!
//! Adapters receive a `ContractGateway` plus an explicit [`ChainContext`]
//! instead of looking either up from ambient state, so they can be driven by
//! [`JsonRpcGateway`] in the app and by an in-memory mock in tests.

pub mod abi;
#[cfg(test)]
pub mod mock;
pub mod rpc;

use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use thiserror::Error;

use crate::common::{ChainContext, RawChatTuple, StatusEvent};

pub use rpc::JsonRpcGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("rpc response carried neither result nor error")]
    EmptyResponse,
    #[error("abi decoding failed: {0}")]
    Abi(#[from] alloy_sol_types::Error),
    #[error("invalid quantity `{0}`")]
    InvalidQuantity(String),
}

/// One `eth_getLogs` window worth of status events.
#[derive(Debug, Clone, Default)]
pub struct StatusPage {
    pub events: Vec<StatusEvent>,
    /// First block the next fetch should start from.
    pub next_block: u64,
    /// The window reached the chain head; nothing older is left to scan.
    pub caught_up: bool,
}

#[async_trait]
pub trait ContractGateway: Send + Sync {
    async fn chain_id(&self) -> Result<u64, GatewayError>;

    /// `getAllChatMessagesWithInfo(self, peer)` on the chat contract.
    async fn read_chat_history(
        &self,
        ctx: &ChainContext,
        peer: Address,
    ) -> Result<Vec<RawChatTuple>, GatewayError>;

    /// `sendMessage(peer, body)` submitted from `ctx.self_address`.
    async fn send_message(
        &self,
        ctx: &ChainContext,
        peer: Address,
        body: &str,
    ) -> Result<TxHash, GatewayError>;

    /// `StatusUpdated` logs from `from_block`, at most one block window past it.
    async fn fetch_status_events(
        &self,
        ctx: &ChainContext,
        from_block: u64,
    ) -> Result<StatusPage, GatewayError>;
}
