use alloy_primitives::{Address, B256, Bytes};
use alloy_sol_types::{SolCall, SolEvent, sol};

use crate::common::{ChainUint, EventPosition, RawChatTuple, StatusEvent};

use super::GatewayError;

sol! {
    struct ChatEntry {
        address sender;
        address receiver;
        uint256 timestamp;
        string message;
    }

    function getAllChatMessagesWithInfo(address user1, address user2)
        external
        view
        returns (ChatEntry[] memory);

    function sendMessage(address receiver, string calldata message) external;

    event StatusUpdated(address indexed user, string newStatus, uint256 timestamp, uint256 statusId);
}

pub fn encode_history_call(self_address: Address, peer: Address) -> Bytes {
    getAllChatMessagesWithInfoCall {
        user1: self_address,
        user2: peer,
    }
    .abi_encode()
    .into()
}

pub fn decode_history_return(data: &[u8]) -> Result<Vec<RawChatTuple>, GatewayError> {
    let decoded = getAllChatMessagesWithInfoCall::abi_decode_returns(data, true)?;
    Ok(decoded
        ._0
        .into_iter()
        .map(|entry| {
            (
                entry.sender,
                entry.receiver,
                format!("{:#x}", entry.timestamp),
                entry.message,
            )
        })
        .collect())
}

pub fn encode_send_call(peer: Address, body: &str) -> Bytes {
    sendMessageCall {
        receiver: peer,
        message: body.to_string(),
    }
    .abi_encode()
    .into()
}

pub fn status_topic() -> B256 {
    StatusUpdated::SIGNATURE_HASH
}

pub fn decode_status_log(
    topics: &[B256],
    data: &[u8],
    position: Option<EventPosition>,
) -> Result<StatusEvent, GatewayError> {
    let event = StatusUpdated::decode_raw_log(topics.iter().copied(), data, true)?;
    Ok(StatusEvent {
        user: event.user,
        new_status: event.newStatus,
        timestamp: ChainUint::from_u256(event.timestamp),
        status_id: ChainUint::from_u256(event.statusId),
        position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{U256, address};

    const ALICE: Address = address!("Ad2a2F9132d475963453641a3680833c4A1Cd523");
    const BOB: Address = address!("00000000000000000000000000000000000000b0");

    #[test]
    fn history_call_uses_selector() {
        let data = encode_history_call(ALICE, BOB);
        assert_eq!(&data[..4], getAllChatMessagesWithInfoCall::SELECTOR.as_slice());
        assert_eq!(data.len(), 4 + 32 * 2);
    }

    #[test]
    fn history_return_keeps_position_and_hex_timestamp() {
        let entries = vec![
            ChatEntry {
                sender: ALICE,
                receiver: BOB,
                timestamp: U256::from(0x1f4u64),
                message: "gm".to_string(),
            },
            ChatEntry {
                sender: BOB,
                receiver: ALICE,
                timestamp: U256::from(5u64),
                message: "gn".to_string(),
            },
        ];
        let encoded = getAllChatMessagesWithInfoCall::abi_encode_returns(&(entries,));

        let tuples = decode_history_return(&encoded).unwrap();
        assert_eq!(tuples.len(), 2);
        assert_eq!(tuples[0], (ALICE, BOB, "0x1f4".to_string(), "gm".to_string()));
        assert_eq!(tuples[1].2, "0x5");
    }

    #[test]
    fn decodes_status_log() {
        let log = StatusUpdated {
            user: ALICE,
            newStatus: "shipping".to_string(),
            timestamp: U256::from(1_705_046_720u64),
            statusId: U256::from(7u64),
        }
        .encode_log_data();
        assert_eq!(log.topics()[0], status_topic());

        let position = Some(EventPosition {
            block_number: 12,
            log_index: 3,
        });
        let event = decode_status_log(log.topics(), &log.data, position).unwrap();
        assert_eq!(event.user, ALICE);
        assert_eq!(event.new_status, "shipping");
        assert_eq!(event.status_id.to_decimal_string(), "7");
        assert_eq!(event.timestamp.raw(), "0x65a0f2c0");
        assert_eq!(event.position, position);
    }

    #[test]
    fn rejects_log_with_foreign_topic() {
        let result = decode_status_log(&[B256::ZERO], &[], None);
        assert!(matches!(result, Err(GatewayError::Abi(_))));
    }
}
