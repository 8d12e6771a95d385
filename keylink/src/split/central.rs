//! Peer connection manager for the two keyboard halves.
//!
//! Both halves advertise a fixed complete local name. The manager scans,
//! claims a half by name, then walks the link through service discovery,
//! characteristic discovery and notification enablement. Key event
//! notifications on a ready link are decoded and forwarded to
//! [`KEY_EVENT_CHANNEL`].

use crate::ble::advertise::complete_local_name;
use crate::ble::{BleCentral, ConnHandle, GattStatus, HandleRange, LinkEvent, PeerAddr};
use crate::channel::KEY_EVENT_CHANNEL;
use crate::config::LinkConfig;
use crate::split::{
    CCC_ENABLE_NOTIFICATIONS, NUM_PEERS, PeerRole, SPLIT_CHARACTERISTIC_UUID, SPLIT_SERVICE_UUID,
    decode_key_event,
};

/// Connection negotiation progress of one peer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeerState {
    /// No peer assigned to this role
    Idle,
    /// Connect request issued, waiting for the link
    WaitConnect,
    /// Looking for the split service
    WaitServiceDiscovery,
    /// Looking for the notifying characteristic
    WaitCharacteristicDiscovery,
    /// CCC write issued, waiting for its completion
    WaitEnableNotifications,
    /// Notification stream live
    Ready,
}

/// Per-role connection record.
struct PeerSlot {
    role: PeerRole,
    state: PeerState,
    addr: Option<PeerAddr>,
    handle: Option<ConnHandle>,
    value_handle: Option<u16>,
}

impl PeerSlot {
    const fn new(role: PeerRole) -> Self {
        Self {
            role,
            state: PeerState::Idle,
            addr: None,
            handle: None,
            value_handle: None,
        }
    }

    fn reset(&mut self) {
        self.state = PeerState::Idle;
        self.addr = None;
        self.handle = None;
        self.value_handle = None;
    }
}

/// Two independent per-role state machines sharing one scanner.
pub struct PeerManager<'a, C: BleCentral> {
    central: C,
    config: LinkConfig<'a>,
    slots: [PeerSlot; NUM_PEERS],
    scanning: bool,
}

impl<'a, C: BleCentral> PeerManager<'a, C> {
    pub fn new(central: C, config: LinkConfig<'a>) -> Self {
        Self {
            central,
            config,
            slots: [PeerSlot::new(PeerRole::Left), PeerSlot::new(PeerRole::Right)],
            scanning: false,
        }
    }

    /// Connection progress of the given role.
    pub fn peer_state(&self, role: PeerRole) -> PeerState {
        self.slots[role.index()].state
    }

    /// Start looking for the halves. Called once before the control loop.
    pub async fn start(&mut self) {
        self.resume_scan().await;
    }

    /// Wait for the next event from the controller.
    pub async fn next_event(&mut self) -> LinkEvent {
        self.central.next_event().await
    }

    /// Advance the state machines with one controller event.
    pub async fn process(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::AdvReport { addr, data } => self.on_adv_report(addr, &data).await,
            LinkEvent::Connected { handle, addr } => self.on_connected(handle, addr).await,
            LinkEvent::ConnectFailed { addr } => self.on_connect_failed(addr).await,
            LinkEvent::Disconnected { handle } => self.on_disconnected(handle).await,
            LinkEvent::ServiceDiscovered { handle, range } => {
                self.on_service_discovered(handle, range).await
            }
            LinkEvent::CharacteristicDiscovered {
                handle,
                value_handle,
            } => self.on_characteristic_discovered(handle, value_handle).await,
            LinkEvent::WriteResponse { handle, status } => {
                self.on_write_response(handle, status).await
            }
            LinkEvent::Notification {
                handle,
                value_handle,
                data,
            } => self.on_notification(handle, value_handle, &data),
        }
    }

    async fn on_adv_report(&mut self, addr: PeerAddr, data: &[u8]) {
        let Some(name) = complete_local_name(data) else {
            return;
        };
        let role = if name == self.config.left_name.as_bytes() {
            PeerRole::Left
        } else if name == self.config.right_name.as_bytes() {
            PeerRole::Right
        } else {
            return;
        };
        let idx = role.index();
        if self.slots[idx].state != PeerState::Idle {
            return;
        }
        info!("Found {:?} half: {:?}", role, addr);
        self.slots[idx].state = PeerState::WaitConnect;
        self.slots[idx].addr = Some(addr);
        // Scanning and connecting are mutually exclusive on the radio
        self.stop_scan().await;
        if let Err(e) = self.central.connect(addr).await {
            error!("Connect request for {:?} half failed: {:?}", role, e);
            self.fail_slot(idx).await;
        }
    }

    async fn on_connected(&mut self, handle: ConnHandle, addr: PeerAddr) {
        let Some(idx) = self
            .slots
            .iter()
            .position(|s| s.state == PeerState::WaitConnect && s.addr == Some(addr))
        else {
            warn!("Connection from unexpected address: {:?}", addr);
            return;
        };
        let role = self.slots[idx].role;
        info!("{:?} half connected", role);
        self.slots[idx].handle = Some(handle);
        self.slots[idx].state = PeerState::WaitServiceDiscovery;
        // The other half may still be out there
        self.resume_scan_if_unassigned().await;
        if let Err(e) = self.central.discover_service(handle, SPLIT_SERVICE_UUID).await {
            error!("Service discovery request for {:?} half failed: {:?}", role, e);
            self.fail_slot(idx).await;
        }
    }

    async fn on_connect_failed(&mut self, addr: PeerAddr) {
        let Some(idx) = self
            .slots
            .iter()
            .position(|s| s.state == PeerState::WaitConnect && s.addr == Some(addr))
        else {
            return;
        };
        error!("Connecting to {:?} half failed", self.slots[idx].role);
        self.fail_slot(idx).await;
    }

    async fn on_disconnected(&mut self, handle: ConnHandle) {
        let Some(idx) = self.slot_by_handle(handle) else {
            return;
        };
        info!("{:?} half disconnected", self.slots[idx].role);
        self.fail_slot(idx).await;
    }

    async fn on_service_discovered(&mut self, handle: ConnHandle, range: Option<HandleRange>) {
        let Some(idx) = self.slot_by_handle(handle) else {
            return;
        };
        if self.slots[idx].state != PeerState::WaitServiceDiscovery {
            return;
        }
        let role = self.slots[idx].role;
        let Some(range) = range else {
            error!("Split service not found on {:?} half", role);
            self.fail_slot(idx).await;
            return;
        };
        self.slots[idx].state = PeerState::WaitCharacteristicDiscovery;
        if let Err(e) = self
            .central
            .discover_characteristic(handle, range, SPLIT_CHARACTERISTIC_UUID)
            .await
        {
            error!(
                "Characteristic discovery request for {:?} half failed: {:?}",
                role, e
            );
            self.fail_slot(idx).await;
        }
    }

    async fn on_characteristic_discovered(&mut self, handle: ConnHandle, value_handle: Option<u16>) {
        let Some(idx) = self.slot_by_handle(handle) else {
            return;
        };
        if self.slots[idx].state != PeerState::WaitCharacteristicDiscovery {
            return;
        }
        let role = self.slots[idx].role;
        let Some(value_handle) = value_handle else {
            error!("Split characteristic not found on {:?} half", role);
            self.fail_slot(idx).await;
            return;
        };
        self.slots[idx].value_handle = Some(value_handle);
        // The CCC descriptor is assumed to sit right after the value handle.
        // This matches the peer firmware's attribute table, it is not a
        // general GATT guarantee.
        let cccd_handle = value_handle + 1;
        self.slots[idx].state = PeerState::WaitEnableNotifications;
        if let Err(e) = self
            .central
            .write_cccd(handle, cccd_handle, CCC_ENABLE_NOTIFICATIONS)
            .await
        {
            error!("Enabling notifications on {:?} half failed: {:?}", role, e);
            self.fail_slot(idx).await;
        }
    }

    async fn on_write_response(&mut self, handle: ConnHandle, status: GattStatus) {
        let Some(idx) = self.slot_by_handle(handle) else {
            return;
        };
        if self.slots[idx].state != PeerState::WaitEnableNotifications {
            return;
        }
        let role = self.slots[idx].role;
        match status {
            GattStatus::Success => {
                info!("{:?} half ready", role);
                self.slots[idx].state = PeerState::Ready;
            }
            GattStatus::Error(code) => {
                error!("Enabling notifications on {:?} half rejected: {}", role, code);
                self.fail_slot(idx).await;
            }
        }
    }

    fn on_notification(&mut self, handle: ConnHandle, value_handle: u16, data: &[u8]) {
        let Some(idx) = self.slot_by_handle(handle) else {
            return;
        };
        let slot = &self.slots[idx];
        if slot.state != PeerState::Ready || slot.value_handle != Some(value_handle) {
            return;
        }
        let Some(event) = decode_key_event(data) else {
            return;
        };
        trace!("Key event from {:?} half: {:?}", slot.role, event);
        if KEY_EVENT_CHANNEL.try_send(event).is_err() {
            warn!("Key event channel full, dropping event");
        }
    }

    fn slot_by_handle(&self, handle: ConnHandle) -> Option<usize> {
        self.slots.iter().position(|s| s.handle == Some(handle))
    }

    /// Reset a slot to idle and bring the scanner back.
    async fn fail_slot(&mut self, idx: usize) {
        self.slots[idx].reset();
        self.resume_scan().await;
    }

    async fn stop_scan(&mut self) {
        if self.scanning {
            if let Err(e) = self.central.stop_scan().await {
                warn!("Stop scan failed: {:?}", e);
            }
            self.scanning = false;
        }
    }

    /// Restart scanning, even when bookkeeping says a scan is already running.
    async fn resume_scan(&mut self) {
        match self
            .central
            .start_scan(self.config.scan_interval, self.config.scan_window)
            .await
        {
            Ok(()) => {
                self.scanning = true;
                info!("Scanning for keyboard halves");
            }
            Err(e) => {
                self.scanning = false;
                warn!("Start scan failed: {:?}", e);
            }
        }
    }

    async fn resume_scan_if_unassigned(&mut self) {
        if self.slots.iter().any(|s| s.state == PeerState::Idle) {
            self.resume_scan().await;
        }
    }
}
