//! Wire-level types and the driver seam for the BLE central role.
//!
//! The dongle core is written against [`BleCentral`] only. Firmware provides
//! an implementation over the vendor BLE host; tests drive the connection
//! manager with a scripted fake.

use heapless::Vec;

pub(crate) mod advertise;

/// Upper bound of a legacy advertising payload.
pub const ADV_DATA_MAX_SIZE: usize = 31;

/// Upper bound of a notification payload accepted from a peer.
pub const NOTIFICATION_MAX_SIZE: usize = 16;

/// Address of a peer device as reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerAddr {
    /// Address type, public or random, as the controller encodes it
    pub kind: u8,
    pub addr: [u8; 6],
}

/// Handle of an established link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnHandle(pub u16);

/// 128-bit UUID in little-endian byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Uuid128(pub [u8; 16]);

/// Attribute handle range of a discovered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandleRange {
    pub start: u16,
    pub end: u16,
}

/// Status of a completed GATT operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GattStatus {
    Success,
    /// ATT error code
    Error(u16),
}

/// Asynchronous completion or report from the controller.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Advertising report seen while scanning.
    AdvReport {
        addr: PeerAddr,
        data: Vec<u8, ADV_DATA_MAX_SIZE>,
    },
    /// Link established after a connect request.
    Connected { handle: ConnHandle, addr: PeerAddr },
    /// A connect request gave up without establishing a link.
    ConnectFailed { addr: PeerAddr },
    /// Link closed, for any reason.
    Disconnected { handle: ConnHandle },
    /// Primary service discovery finished. `None` when the service is absent.
    ServiceDiscovered {
        handle: ConnHandle,
        range: Option<HandleRange>,
    },
    /// Characteristic discovery finished. `None` when nothing matched in the
    /// requested range.
    CharacteristicDiscovered {
        handle: ConnHandle,
        value_handle: Option<u16>,
    },
    /// A GATT write completed.
    WriteResponse {
        handle: ConnHandle,
        status: GattStatus,
    },
    /// Notification received on a subscribed characteristic.
    Notification {
        handle: ConnHandle,
        value_handle: u16,
        data: Vec<u8, NOTIFICATION_MAX_SIZE>,
    },
}

/// Errors reported synchronously by [`BleCentral`] commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// The radio is busy with a conflicting operation
    Busy,
    /// The link the command addressed is gone
    Disconnected,
    /// Controller-specific failure code
    Controller(u8),
}

/// Driver seam for the BLE central role.
///
/// Commands are fire and forget: a synchronous `Err` means the controller
/// rejected the command, everything else comes back through
/// [`next_event`](BleCentral::next_event).
pub trait BleCentral {
    /// Start scanning. Interval and window are in 0.625 ms units.
    async fn start_scan(&mut self, interval: u16, window: u16) -> Result<(), LinkError>;
    async fn stop_scan(&mut self) -> Result<(), LinkError>;
    async fn connect(&mut self, addr: PeerAddr) -> Result<(), LinkError>;
    /// Discover the primary service with the given UUID.
    async fn discover_service(&mut self, conn: ConnHandle, service: Uuid128) -> Result<(), LinkError>;
    /// Discover a characteristic by UUID inside a service's handle range.
    async fn discover_characteristic(
        &mut self,
        conn: ConnHandle,
        range: HandleRange,
        characteristic: Uuid128,
    ) -> Result<(), LinkError>;
    /// Write a client characteristic configuration descriptor.
    async fn write_cccd(&mut self, conn: ConnHandle, cccd_handle: u16, value: u16) -> Result<(), LinkError>;
    /// Wait for the next link event.
    ///
    /// Must be cancellation safe, the control loop polls this in a select.
    async fn next_event(&mut self) -> LinkEvent;
}
