//! Adapters that shape contract data into what the UI renders.

pub mod chat;
pub mod status;
pub mod subscription;
pub mod window;

use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed timestamp `{0}`")]
    MalformedTimestamp(String),
    #[error("invalid address `{0}`")]
    InvalidAddress(String),
    #[error("no peer selected")]
    NoPeerSelected,
    #[error("message body is empty")]
    EmptyMessage,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
