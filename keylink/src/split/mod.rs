//! Wireless link between the dongle and the two keyboard halves.

use crate::ble::Uuid128;
use crate::event::{KeyEventKind, KeyMatrixEvent};

pub mod central;

/// Number of keyboard halves served by the dongle.
pub const NUM_PEERS: usize = 2;

/// Size of one key event notification on the wire.
pub const SPLIT_MESSAGE_SIZE: usize = 4;

/// uuid: 6e400001-b5a3-f393-e0a9-e50e24dcca9e
pub const SPLIT_SERVICE_UUID: Uuid128 = Uuid128([
    0x9e, 0xca, 0xdc, 0x24, 0x0e, 0xe5, 0xa9, 0xe0, 0x93, 0xf3, 0xa3, 0xb5, 0x01, 0x00, 0x40, 0x6e,
]);

/// uuid: 6e400002-b5a3-f393-e0a9-e50e24dcca9e
pub const SPLIT_CHARACTERISTIC_UUID: Uuid128 = Uuid128([
    0x9e, 0xca, 0xdc, 0x24, 0x0e, 0xe5, 0xa9, 0xe0, 0x93, 0xf3, 0xa3, 0xb5, 0x02, 0x00, 0x40, 0x6e,
]);

/// Value written to a client characteristic configuration descriptor to
/// enable notifications.
pub const CCC_ENABLE_NOTIFICATIONS: u16 = 0x0001;

/// Role of a keyboard half, keyed by its advertised name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeerRole {
    Left,
    Right,
}

impl PeerRole {
    pub(crate) const fn index(self) -> usize {
        match self {
            PeerRole::Left => 0,
            PeerRole::Right => 1,
        }
    }
}

/// Decode a key event notification.
///
/// Payloads of any other length are not split traffic and yield `None`. A
/// zero kind byte is a press, anything else a release.
pub(crate) fn decode_key_event(data: &[u8]) -> Option<KeyMatrixEvent> {
    if data.len() != SPLIT_MESSAGE_SIZE {
        return None;
    }
    let kind = if data[0] == 0 {
        KeyEventKind::Press
    } else {
        KeyEventKind::Release
    };
    Some(KeyMatrixEvent {
        kind,
        row: data[1],
        col: data[2],
        side: data[3],
    })
}
