use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, B256, Bytes, TxHash};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::common::{ChainContext, EventPosition, RawChatTuple};

use super::abi;
use super::{ContractGateway, GatewayError, StatusPage};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
/// Hosted endpoints refuse `eth_getLogs` over wide block ranges.
pub const DEFAULT_LOG_SPAN: u64 = 2_000;

/// Ethereum JSON-RPC over HTTP. Writes go through `eth_sendTransaction`, so
/// the endpoint (or the wallet behind it) does the signing.
pub struct JsonRpcGateway {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
    log_span: u64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    topics: Vec<B256>,
    data: Bytes,
    block_number: Option<String>,
    log_index: Option<String>,
}

impl JsonRpcGateway {
    pub fn new(url: impl Into<String>) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
            log_span: DEFAULT_LOG_SPAN,
        })
    }

    /// Caps the number of blocks one `eth_getLogs` call may cover.
    pub fn with_log_span(mut self, span: u64) -> Self {
        self.log_span = span.max(1);
        self
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, GatewayError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        log::debug!("rpc #{id} -> {method}");

        let response: RpcResponse<T> = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(GatewayError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        response.result.ok_or(GatewayError::EmptyResponse)
    }

    async fn block_number(&self) -> Result<u64, GatewayError> {
        let raw: String = self.request("eth_blockNumber", json!([])).await?;
        parse_quantity(&raw)
    }
}

#[async_trait]
impl ContractGateway for JsonRpcGateway {
    async fn chain_id(&self) -> Result<u64, GatewayError> {
        let raw: String = self.request("eth_chainId", json!([])).await?;
        parse_quantity(&raw)
    }

    async fn read_chat_history(
        &self,
        ctx: &ChainContext,
        peer: Address,
    ) -> Result<Vec<RawChatTuple>, GatewayError> {
        let call = json!({
            "from": ctx.self_address,
            "to": ctx.chat_contract,
            "data": abi::encode_history_call(ctx.self_address, peer),
        });
        let output: Bytes = self.request("eth_call", json!([call, "latest"])).await?;
        abi::decode_history_return(&output)
    }

    async fn send_message(
        &self,
        ctx: &ChainContext,
        peer: Address,
        body: &str,
    ) -> Result<TxHash, GatewayError> {
        let tx = json!({
            "from": ctx.self_address,
            "to": ctx.chat_contract,
            "data": abi::encode_send_call(peer, body),
        });
        self.request("eth_sendTransaction", json!([tx])).await
    }

    async fn fetch_status_events(
        &self,
        ctx: &ChainContext,
        from_block: u64,
    ) -> Result<StatusPage, GatewayError> {
        let head = self.block_number().await?;
        let Some((from, to)) = log_range(from_block, head, self.log_span) else {
            return Ok(StatusPage {
                events: Vec::new(),
                next_block: from_block,
                caught_up: true,
            });
        };

        let filter = json!({
            "address": ctx.status_contract,
            "topics": [abi::status_topic()],
            "fromBlock": format!("{from:#x}"),
            "toBlock": format!("{to:#x}"),
        });
        let logs: Vec<RpcLog> = self.request("eth_getLogs", json!([filter])).await?;

        let mut events = Vec::with_capacity(logs.len());
        for log in logs {
            let position = match (&log.block_number, &log.log_index) {
                (Some(block), Some(index)) => Some(EventPosition {
                    block_number: parse_quantity(block)?,
                    log_index: parse_quantity(index)?,
                }),
                _ => None,
            };
            match abi::decode_status_log(&log.topics, &log.data, position) {
                Ok(event) => events.push(event),
                Err(err) => log::warn!("Skipping undecodable StatusUpdated log: {err}"),
            }
        }

        log::debug!("eth_getLogs {from}..={to} (head {head}): {} events", events.len());
        Ok(StatusPage {
            events,
            next_block: to.saturating_add(1),
            caught_up: to == head,
        })
    }
}

/// Inclusive block range for the next log fetch, at most `span` blocks wide.
/// `None` once `from` is past the head.
pub fn log_range(from: u64, head: u64, span: u64) -> Option<(u64, u64)> {
    if from > head {
        return None;
    }
    let to = from.saturating_add(span.max(1) - 1).min(head);
    Some((from, to))
}

/// Parses a JSON-RPC hex quantity such as `0x1b4`.
pub fn parse_quantity(raw: &str) -> Result<u64, GatewayError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| GatewayError::InvalidQuantity(raw.to_string()))?;
    u64::from_str_radix(digits, 16).map_err(|_| GatewayError::InvalidQuantity(raw.to_string()))
}
