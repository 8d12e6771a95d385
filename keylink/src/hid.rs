//! Traits and types for HID message reporting.

use embassy_usb::driver::EndpointError;
use usbd_hid::descriptor::{AsInputReport, BufferOverflow, MouseReport};

use crate::usb::descriptor::KeyboardReport;

/// HID reports the dongle sends to the host.
#[derive(Debug)]
pub enum Report {
    /// Normal keyboard hid report
    KeyboardReport(KeyboardReport),
    /// Mouse hid report
    MouseReport(MouseReport),
}

impl AsInputReport for Report {
    fn serialize(&self, buffer: &mut [u8]) -> Result<usize, BufferOverflow> {
        match self {
            Report::KeyboardReport(report) => report.serialize(buffer),
            Report::MouseReport(report) => report.serialize(buffer),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidError {
    UsbEndpointError(EndpointError),
    ReportSerializeError,
}

/// Writer half of a HID transport.
///
/// The report multiplexer is written only against this trait. Firmware
/// implements it over the USB endpoints, tests over an in-memory fake.
pub trait HidWriterTrait {
    /// The report type accepted by this transport.
    type ReportType: AsInputReport;

    /// Write a report to the host, return the number of bytes written if success.
    async fn write_report(&mut self, report: Self::ReportType) -> Result<usize, HidError>;

    /// Whether the host is currently accepting reports.
    fn ready(&self) -> bool {
        true
    }

    /// Ask a suspended host to resume.
    fn wake_host(&mut self) {}
}
