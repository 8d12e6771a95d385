pub mod test_block_on;

use core::future::poll_fn;
use core::task::Poll;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use keylink::ble::{
    ADV_DATA_MAX_SIZE, BleCentral, ConnHandle, GattStatus, HandleRange, LinkError, LinkEvent,
    NOTIFICATION_MAX_SIZE, PeerAddr, Uuid128,
};
use keylink::descriptor::KeyboardReport;
use keylink::event::{KeyEventKind, KeyMatrixEvent};
use keylink::hid::{HidError, HidWriterTrait, Report};
use usbd_hid::descriptor::MouseReport;

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub const KC_LCTRL: u8 = 1 << 0;
pub const KC_LSHIFT: u8 = 1 << 1;

pub const LEFT_ADDR: PeerAddr = PeerAddr {
    kind: 0,
    addr: [0x01, 0x22, 0x33, 0x44, 0x55, 0x66],
};
pub const RIGHT_ADDR: PeerAddr = PeerAddr {
    kind: 0,
    addr: [0x02, 0x22, 0x33, 0x44, 0x55, 0x66],
};

/// Handle range reported for the discovered split service.
pub const SERVICE_RANGE: HandleRange = HandleRange {
    start: 0x0001,
    end: 0xffff,
};

/// One command the connection manager issued to the fake controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartScan { interval: u16, window: u16 },
    StopScan,
    Connect(PeerAddr),
    DiscoverService(ConnHandle, Uuid128),
    DiscoverCharacteristic(ConnHandle, HandleRange, Uuid128),
    WriteCccd(ConnHandle, u16, u16),
}

#[derive(Default)]
struct FakeCentralState {
    commands: Vec<Command>,
    events: VecDeque<LinkEvent>,
    fail_connect: bool,
    fail_write_cccd: bool,
}

/// Scripted [`BleCentral`]: records every command and plays events back from
/// a queue. `next_event` stays pending while the queue is empty, so events
/// pushed later are picked up on the next poll. Clones share the same state.
#[derive(Clone, Default)]
pub struct FakeCentral {
    state: Rc<RefCell<FakeCentralState>>,
}

impl FakeCentral {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_event(&self, event: LinkEvent) {
        self.state.borrow_mut().events.push_back(event);
    }

    /// Everything the manager asked the controller to do so far, in order.
    pub fn commands(&self) -> Vec<Command> {
        self.state.borrow().commands.clone()
    }

    /// Make connect requests fail synchronously.
    pub fn set_fail_connect(&self, fail: bool) {
        self.state.borrow_mut().fail_connect = fail;
    }

    /// Make CCC write requests fail synchronously.
    pub fn set_fail_write_cccd(&self, fail: bool) {
        self.state.borrow_mut().fail_write_cccd = fail;
    }
}

impl BleCentral for FakeCentral {
    async fn start_scan(&mut self, interval: u16, window: u16) -> Result<(), LinkError> {
        self.state
            .borrow_mut()
            .commands
            .push(Command::StartScan { interval, window });
        Ok(())
    }

    async fn stop_scan(&mut self) -> Result<(), LinkError> {
        self.state.borrow_mut().commands.push(Command::StopScan);
        Ok(())
    }

    async fn connect(&mut self, addr: PeerAddr) -> Result<(), LinkError> {
        let mut state = self.state.borrow_mut();
        state.commands.push(Command::Connect(addr));
        if state.fail_connect {
            Err(LinkError::Busy)
        } else {
            Ok(())
        }
    }

    async fn discover_service(&mut self, conn: ConnHandle, service: Uuid128) -> Result<(), LinkError> {
        self.state
            .borrow_mut()
            .commands
            .push(Command::DiscoverService(conn, service));
        Ok(())
    }

    async fn discover_characteristic(
        &mut self,
        conn: ConnHandle,
        range: HandleRange,
        characteristic: Uuid128,
    ) -> Result<(), LinkError> {
        self.state
            .borrow_mut()
            .commands
            .push(Command::DiscoverCharacteristic(conn, range, characteristic));
        Ok(())
    }

    async fn write_cccd(&mut self, conn: ConnHandle, cccd_handle: u16, value: u16) -> Result<(), LinkError> {
        let mut state = self.state.borrow_mut();
        state.commands.push(Command::WriteCccd(conn, cccd_handle, value));
        if state.fail_write_cccd {
            Err(LinkError::Busy)
        } else {
            Ok(())
        }
    }

    async fn next_event(&mut self) -> LinkEvent {
        poll_fn(|_cx| match self.state.borrow_mut().events.pop_front() {
            Some(event) => Poll::Ready(event),
            None => Poll::Pending,
        })
        .await
    }
}

#[derive(Default)]
struct FakeHidState {
    keyboard_reports: Vec<KeyboardReport>,
    mouse_reports: Vec<MouseReport>,
    ready: bool,
    wake_requests: usize,
}

/// HID transport fake: records every flushed report, with a settable ready
/// flag and a counter standing in for remote wakeup requests.
#[derive(Clone)]
pub struct FakeHidTransport {
    state: Rc<RefCell<FakeHidState>>,
}

impl FakeHidTransport {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(FakeHidState {
                ready: true,
                ..Default::default()
            })),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.state.borrow_mut().ready = ready;
    }

    pub fn keyboard_reports(&self) -> Vec<KeyboardReport> {
        self.state.borrow().keyboard_reports.clone()
    }

    pub fn mouse_reports(&self) -> Vec<MouseReport> {
        self.state.borrow().mouse_reports.clone()
    }

    pub fn wake_requests(&self) -> usize {
        self.state.borrow().wake_requests
    }
}

impl HidWriterTrait for FakeHidTransport {
    type ReportType = Report;

    async fn write_report(&mut self, report: Report) -> Result<usize, HidError> {
        let mut state = self.state.borrow_mut();
        match report {
            Report::KeyboardReport(r) => {
                state.keyboard_reports.push(r);
                Ok(8)
            }
            Report::MouseReport(r) => {
                state.mouse_reports.push(r);
                Ok(5)
            }
        }
    }

    fn ready(&self) -> bool {
        self.state.borrow().ready
    }

    fn wake_host(&mut self) {
        self.state.borrow_mut().wake_requests += 1;
    }
}

/// Legacy advertising payload carrying flags and a complete local name.
pub fn adv_report(addr: PeerAddr, name: &str) -> LinkEvent {
    let mut data: heapless::Vec<u8, ADV_DATA_MAX_SIZE> = heapless::Vec::new();
    data.extend_from_slice(&[0x02, 0x01, 0x06]).unwrap();
    data.push(name.len() as u8 + 1).unwrap();
    data.push(0x09).unwrap();
    data.extend_from_slice(name.as_bytes()).unwrap();
    LinkEvent::AdvReport { addr, data }
}

/// Notification event with the given raw payload.
pub fn notification(handle: ConnHandle, value_handle: u16, payload: &[u8]) -> LinkEvent {
    let data: heapless::Vec<u8, NOTIFICATION_MAX_SIZE> =
        heapless::Vec::from_slice(payload).unwrap();
    LinkEvent::Notification {
        handle,
        value_handle,
        data,
    }
}

/// Event sequence that walks one half from advertisement to ready.
pub fn negotiation_events(
    addr: PeerAddr,
    name: &str,
    handle: ConnHandle,
    value_handle: u16,
) -> Vec<LinkEvent> {
    vec![
        adv_report(addr, name),
        LinkEvent::Connected { handle, addr },
        LinkEvent::ServiceDiscovered {
            handle,
            range: Some(SERVICE_RANGE),
        },
        LinkEvent::CharacteristicDiscovered {
            handle,
            value_handle: Some(value_handle),
        },
        LinkEvent::WriteResponse {
            handle,
            status: GattStatus::Success,
        },
    ]
}

pub fn press(side: u8, row: u8, col: u8) -> KeyMatrixEvent {
    KeyMatrixEvent {
        kind: KeyEventKind::Press,
        row,
        col,
        side,
    }
}

pub fn release(side: u8, row: u8, col: u8) -> KeyMatrixEvent {
    KeyMatrixEvent {
        kind: KeyEventKind::Release,
        row,
        col,
        side,
    }
}

pub fn kb_report(modifier: u8, keycodes: [u8; 6]) -> KeyboardReport {
    KeyboardReport {
        modifier,
        reserved: 0,
        leds: 0,
        keycodes,
    }
}

pub fn mouse_report(buttons: u8, x: i8, y: i8) -> MouseReport {
    MouseReport {
        buttons,
        x,
        y,
        wheel: 0,
        pan: 0,
    }
}
