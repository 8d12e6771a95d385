use core::sync::atomic::{AtomicU8, Ordering};

use embassy_futures::select::{select, Either};
use embassy_sync::signal::Signal;
use embassy_usb::class::hid::{HidWriter, ReportId, RequestHandler};
use embassy_usb::control::OutResponse;
use embassy_usb::driver::Driver;
use embassy_usb::{Builder, Handler, UsbDevice};
use static_cell::StaticCell;
use usbd_hid::descriptor::AsInputReport;

use crate::config::UsbConfig;
use crate::descriptor::CompositeReportType;
use crate::hid::{HidError, HidWriterTrait, Report};
use crate::RawMutex;

pub mod descriptor;

/// Signaled by the report multiplexer when a report becomes pending while
/// the host has the bus suspended.
pub(crate) static USB_REMOTE_WAKEUP: Signal<RawMutex, ()> = Signal::new();

/// Written by the USB device handler, read by the report readiness gate.
pub(crate) static USB_STATE: AtomicU8 = AtomicU8::new(UsbState::Disabled as u8);

/// USB state
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum UsbState {
    // Disconnected
    Disabled = 0x0,
    // Connected, but NOT ready
    Enabled = 0x1,
    // Connected, ready to use
    Configured = 0x2,
    // Bus suspended by the host
    Suspended = 0x3,
}

impl From<u8> for UsbState {
    fn from(state: u8) -> Self {
        match state {
            1 => UsbState::Enabled,
            2 => UsbState::Configured,
            3 => UsbState::Suspended,
            _ => UsbState::Disabled,
        }
    }
}

pub(crate) fn usb_state() -> UsbState {
    UsbState::from(USB_STATE.load(Ordering::Acquire))
}

fn set_usb_state(state: UsbState) {
    USB_STATE.store(state as u8, Ordering::Release);
}

/// The two USB HID writers of the composite device: the boot keyboard
/// endpoint and the shared endpoint carrying the mouse behind a report id.
pub(crate) struct UsbKeyboardWriter<'a, 'd, D: Driver<'d>> {
    pub(crate) keyboard_writer: &'a mut HidWriter<'d, D, 8>,
    pub(crate) other_writer: &'a mut HidWriter<'d, D, 9>,
}

impl<'a, 'd, D: Driver<'d>> UsbKeyboardWriter<'a, 'd, D> {
    pub(crate) fn new(
        keyboard_writer: &'a mut HidWriter<'d, D, 8>,
        other_writer: &'a mut HidWriter<'d, D, 9>,
    ) -> Self {
        Self {
            keyboard_writer,
            other_writer,
        }
    }
}

impl<'d, D: Driver<'d>> HidWriterTrait for UsbKeyboardWriter<'_, 'd, D> {
    type ReportType = Report;

    async fn write_report(&mut self, report: Self::ReportType) -> Result<usize, HidError> {
        match report {
            Report::KeyboardReport(keyboard_report) => {
                self.keyboard_writer
                    .write_serialize(&keyboard_report)
                    .await
                    .map_err(HidError::UsbEndpointError)?;
                Ok(8)
            }
            Report::MouseReport(mouse_report) => {
                let mut buf: [u8; 9] = [0; 9];
                buf[0] = CompositeReportType::Mouse as u8;
                let n = mouse_report
                    .serialize(&mut buf[1..])
                    .map_err(|_| HidError::ReportSerializeError)?;
                self.other_writer
                    .write(&buf[0..n + 1])
                    .await
                    .map_err(HidError::UsbEndpointError)?;
                Ok(n)
            }
        }
    }

    fn ready(&self) -> bool {
        usb_state() == UsbState::Configured
    }

    fn wake_host(&mut self) {
        USB_REMOTE_WAKEUP.signal(());
    }
}

pub(crate) fn new_usb_builder<'d, D: Driver<'d>>(
    driver: D,
    usb_config: UsbConfig<'d>,
) -> Builder<'d, D> {
    // Create embassy-usb Config
    let mut config = embassy_usb::Config::new(usb_config.vid, usb_config.pid);
    config.manufacturer = Some(usb_config.manufacturer);
    config.product = Some(usb_config.product_name);
    config.serial_number = Some(usb_config.serial_number);
    config.max_power = 450;
    config.supports_remote_wakeup = true;

    // Required for windows compatibility.
    config.max_packet_size_0 = 64;
    config.device_class = 0xEF;
    config.device_sub_class = 0x02;
    config.device_protocol = 0x01;
    config.composite_with_iads = true;

    const USB_BUF_SIZE: usize = 128;

    // Create embassy-usb DeviceBuilder using the driver and config.
    static CONFIG_DESC: StaticCell<[u8; USB_BUF_SIZE]> = StaticCell::new();
    static BOS_DESC: StaticCell<[u8; 16]> = StaticCell::new();
    static MSOS_DESC: StaticCell<[u8; 16]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; USB_BUF_SIZE]> = StaticCell::new();

    // UsbDevice builder
    let mut builder = Builder::new(
        driver,
        config,
        &mut CONFIG_DESC.init([0; USB_BUF_SIZE])[..],
        &mut BOS_DESC.init([0; 16])[..],
        &mut MSOS_DESC.init([0; 16])[..],
        &mut CONTROL_BUF.init([0; USB_BUF_SIZE])[..],
    );

    static DEVICE_HANDLER: StaticCell<UsbDeviceHandler> = StaticCell::new();
    builder.handler(DEVICE_HANDLER.init(UsbDeviceHandler::new()));

    builder
}

macro_rules! add_usb_writer {
    ($usb_builder:expr, $descriptor:ty, $n:expr) => {{
        // Initialize hid writer
        // Current implementation requires the static STATE, so we need to use the paste crate to generate the static variable name.
        use usbd_hid::descriptor::SerializedDescriptor;
        paste::paste! {
            static [<$descriptor:snake:upper _STATE>]: ::static_cell::StaticCell<::embassy_usb::class::hid::State> = ::static_cell::StaticCell::new();
            static [<$descriptor:snake:upper _HANDLER>]: ::static_cell::StaticCell<$crate::usb::UsbRequestHandler> = ::static_cell::StaticCell::new();
        }

        let state = paste::paste! { [<$descriptor:snake:upper _STATE>].init(::embassy_usb::class::hid::State::new()) };
        let request_handler = paste::paste! { [<$descriptor:snake:upper _HANDLER>].init($crate::usb::UsbRequestHandler {}) };

        let hid_config = ::embassy_usb::class::hid::Config {
            report_descriptor: <$descriptor>::desc(),
            request_handler: Some(request_handler),
            poll_ms: 1,
            max_packet_size: 64,
            hid_subclass: ::embassy_usb::class::hid::HidSubclass::No,
            hid_boot_protocol: ::embassy_usb::class::hid::HidBootProtocol::None,
        };

        let rw: ::embassy_usb::class::hid::HidWriter<_, $n> = ::embassy_usb::class::hid::HidWriter::new($usb_builder, state, hid_config);
        rw
    }};
}

pub(crate) use add_usb_writer;

pub(crate) struct UsbRequestHandler {}

impl RequestHandler for UsbRequestHandler {
    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        info!("Set report for {:?}: {:?}", id, data);
        OutResponse::Accepted
    }
}

pub(crate) struct UsbDeviceHandler {}

impl UsbDeviceHandler {
    fn new() -> Self {
        UsbDeviceHandler {}
    }
}

impl Handler for UsbDeviceHandler {
    fn enabled(&mut self, enabled: bool) {
        if enabled {
            info!("Device enabled");
            set_usb_state(UsbState::Enabled);
        } else {
            info!("Device disabled");
            set_usb_state(UsbState::Disabled);
        }
    }

    fn reset(&mut self) {
        info!("Bus reset, the Vbus current limit is 100mA");
        set_usb_state(UsbState::Enabled);
    }

    fn addressed(&mut self, addr: u8) {
        info!("USB address set to: {}", addr);
    }

    fn configured(&mut self, configured: bool) {
        if configured {
            info!("Device configured, it may now draw up to the configured current from Vbus.");
            set_usb_state(UsbState::Configured);
        } else {
            info!("Device is no longer configured, the Vbus current limit is 100mA.");
            set_usb_state(UsbState::Enabled);
        }
    }

    fn suspended(&mut self, suspended: bool) {
        if suspended {
            info!("Device suspended, the Vbus current limit is 500µA (or 2.5mA for high-power devices with remote wakeup enabled).");
            if usb_state() == UsbState::Configured {
                set_usb_state(UsbState::Suspended);
            }
        } else {
            info!("Device resumed, the Vbus current limit is back to the configured current.");
            if usb_state() == UsbState::Suspended {
                set_usb_state(UsbState::Configured);
            }
        }
    }

    fn remote_wakeup_enabled(&mut self, enabled: bool) {
        info!("Remote wakeup enabled state: {}", enabled);
    }
}

/// Run the USB device, parking it across host suspend. A remote wakeup
/// request from the report path races the host's own resume.
pub(crate) async fn usb_task<'d, D: Driver<'d>>(usb_device: &mut UsbDevice<'d, D>) -> ! {
    loop {
        usb_device.run_until_suspend().await;
        match select(usb_device.wait_resume(), USB_REMOTE_WAKEUP.wait()).await {
            Either::First(_) => (),
            Either::Second(_) => {
                if let Err(e) = usb_device.remote_wakeup().await {
                    warn!("Remote wakeup failed: {:?}", e);
                }
            }
        }
    }
}
