//! Report multiplexer: drains dirty reports into the HID transport.

use crate::hid::{HidWriterTrait, Report};
use crate::keyboard::Keyboard;

/// Flushes the interpreter's output reports to the host, keyboard before
/// mouse, once per control loop iteration.
///
/// A write error is logged and the report is acked anyway; the next state
/// change marks it dirty again.
pub struct ReportMultiplexer<W: HidWriterTrait<ReportType = Report>> {
    writer: W,
}

impl<W: HidWriterTrait<ReportType = Report>> ReportMultiplexer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub async fn flush<const SIDES: usize, const ROW: usize, const COL: usize, const NUM_LAYER: usize>(
        &mut self,
        keyboard: &mut Keyboard<SIDES, ROW, COL, NUM_LAYER>,
    ) {
        if !self.writer.ready() {
            // A report becoming pending while the host sleeps is the remote
            // wakeup trigger.
            if keyboard.pending_keyboard_report().is_some()
                || keyboard.pending_mouse_report().is_some()
            {
                self.writer.wake_host();
            }
            return;
        }

        if let Some(report) = keyboard.pending_keyboard_report() {
            if let Err(e) = self.writer.write_report(Report::KeyboardReport(report)).await {
                error!("Keyboard report write error: {:?}", e);
            }
            keyboard.ack_keyboard_flush();
        }

        if let Some(report) = keyboard.pending_mouse_report() {
            if let Err(e) = self.writer.write_report(Report::MouseReport(report)).await {
                error!("Mouse report write error: {:?}", e);
            }
            keyboard.ack_mouse_flush();
        }
    }
}
