use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;

use crate::common::{ChainContext, RawChatTuple};

use super::{ContractGateway, GatewayError, StatusPage};

/// In-memory gateway that records how often it was called.
#[derive(Default)]
pub struct MockGateway {
    pub history: Vec<RawChatTuple>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub status_pages: Mutex<VecDeque<StatusPage>>,
    pub sent: Mutex<Vec<(Address, String)>>,
    /// `from_block` of every status fetch, in call order.
    pub status_requests: Mutex<Vec<u64>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    status_fetches: AtomicUsize,
}

impl MockGateway {
    pub fn with_history(history: Vec<RawChatTuple>) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    pub fn with_status_pages(pages: Vec<StatusPage>) -> Self {
        Self {
            status_pages: Mutex::new(pages.into()),
            ..Self::default()
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn status_fetches(&self) -> usize {
        self.status_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContractGateway for MockGateway {
    async fn chain_id(&self) -> Result<u64, GatewayError> {
        Ok(80_001)
    }

    async fn read_chat_history(
        &self,
        _ctx: &ChainContext,
        _peer: Address,
    ) -> Result<Vec<RawChatTuple>, GatewayError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(GatewayError::Rpc {
                code: -32000,
                message: "execution reverted".to_string(),
            });
        }
        Ok(self.history.clone())
    }

    async fn send_message(
        &self,
        _ctx: &ChainContext,
        peer: Address,
        body: &str,
    ) -> Result<TxHash, GatewayError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(GatewayError::Rpc {
                code: 4001,
                message: "user rejected transaction".to_string(),
            });
        }
        self.sent.lock().unwrap().push((peer, body.to_string()));
        Ok(TxHash::repeat_byte(0xab))
    }

    async fn fetch_status_events(
        &self,
        _ctx: &ChainContext,
        from_block: u64,
    ) -> Result<StatusPage, GatewayError> {
        self.status_fetches.fetch_add(1, Ordering::SeqCst);
        self.status_requests.lock().unwrap().push(from_block);
        let page = self.status_pages.lock().unwrap().pop_front();
        Ok(page.unwrap_or(StatusPage {
            events: Vec::new(),
            next_block: from_block,
            caught_up: true,
        }))
    }
}
