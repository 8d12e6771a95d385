//! Top-level control loop: peer link events in, HID reports out.

use embassy_futures::join::join;
use embassy_futures::select::{Either, select};
use embassy_time::{Instant, Timer};
use embassy_usb::driver::Driver;

use crate::action::KeyAction;
use crate::ble::BleCentral;
use crate::channel::KEY_EVENT_CHANNEL;
use crate::config::{DongleConfig, LinkConfig};
use crate::descriptor::{CompositeReport, KeyboardReport};
use crate::hid::{HidWriterTrait, Report};
use crate::keyboard::Keyboard;
use crate::keyboard_macro::{MacroSequence, NUM_MACROS};
use crate::keymap::KeyMap;
use crate::reporter::ReportMultiplexer;
use crate::split::central::PeerManager;
use crate::usb::{UsbKeyboardWriter, add_usb_writer, new_usb_builder, usb_task};

/// The assembled dongle core: connection manager, interpreter and report
/// multiplexer, driven by one cooperative loop.
pub struct Dongle<
    'a,
    C: BleCentral,
    W: HidWriterTrait<ReportType = Report>,
    const SIDES: usize,
    const ROW: usize,
    const COL: usize,
    const NUM_LAYER: usize,
> {
    peer_manager: PeerManager<'a, C>,
    keyboard: Keyboard<SIDES, ROW, COL, NUM_LAYER>,
    reporter: ReportMultiplexer<W>,
}

impl<
    'a,
    C: BleCentral,
    W: HidWriterTrait<ReportType = Report>,
    const SIDES: usize,
    const ROW: usize,
    const COL: usize,
    const NUM_LAYER: usize,
> Dongle<'a, C, W, SIDES, ROW, COL, NUM_LAYER>
{
    pub fn new(
        central: C,
        writer: W,
        keyboard: Keyboard<SIDES, ROW, COL, NUM_LAYER>,
        link_config: LinkConfig<'a>,
    ) -> Self {
        Self {
            peer_manager: PeerManager::new(central, link_config),
            keyboard,
            reporter: ReportMultiplexer::new(writer),
        }
    }

    /// Run the control loop forever.
    ///
    /// Each iteration waits for the next link event or the 1 ms tick,
    /// whichever comes first, then drains pending key events, advances the
    /// time-driven behaviors and flushes dirty reports.
    pub async fn run(&mut self) -> ! {
        self.peer_manager.start().await;
        loop {
            match select(self.peer_manager.next_event(), Timer::after_millis(1)).await {
                Either::First(event) => self.peer_manager.process(event).await,
                Either::Second(_) => (),
            }
            let now = Instant::now();
            while let Ok(event) = KEY_EVENT_CHANNEL.try_receive() {
                self.keyboard.process_event(event, now);
            }
            self.keyboard.tick(now);
            self.reporter.flush(&mut self.keyboard).await;
        }
    }
}

/// Assemble the whole dongle over the given USB driver and BLE central and
/// run it. Never returns.
pub async fn run_dongle<
    'd: 'static,
    D: Driver<'d>,
    C: BleCentral,
    const SIDES: usize,
    const ROW: usize,
    const COL: usize,
    const NUM_LAYER: usize,
>(
    usb_driver: D,
    central: C,
    default_keymap: [[[[KeyAction; COL]; ROW]; SIDES]; NUM_LAYER],
    macros: [MacroSequence; NUM_MACROS],
    config: DongleConfig<'d>,
) {
    let mut builder = new_usb_builder(usb_driver, config.usb);
    let mut keyboard_writer = add_usb_writer!(&mut builder, KeyboardReport, 8);
    let mut other_writer = add_usb_writer!(&mut builder, CompositeReport, 9);
    let mut usb_device = builder.build();

    let keyboard = Keyboard::new(KeyMap::new(default_keymap), macros, config.behavior);
    let writer = UsbKeyboardWriter::new(&mut keyboard_writer, &mut other_writer);
    let mut dongle = Dongle::new(central, writer, keyboard, config.link);

    join(usb_task(&mut usb_device), dongle.run()).await;
}
