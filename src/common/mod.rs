pub mod commands;
pub mod events;
pub mod types;

pub use commands::NetworkCommand;
pub use events::NetworkEvent;
pub use types::{
    ChainContext, ChainUint, ChatMessage, EventPosition, PeerSelection, RawChatTuple,
    StatusEvent, short_address,
};
