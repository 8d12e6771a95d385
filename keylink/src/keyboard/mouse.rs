//! Mouse emulation state: accumulated movement, held buttons, auto click.

use embassy_time::{Duration, Instant};
use usbd_hid::descriptor::MouseReport;

use crate::keycode::MouseButtons;

/// Mouse report state. Movement deltas are a per-flush pulse and are zeroed
/// once sent; buttons are level state and persist across flushes.
pub(crate) struct MouseState {
    pub(crate) x: i8,
    pub(crate) y: i8,
    pub(crate) buttons: MouseButtons,
    pub(crate) dirty: bool,
}

impl MouseState {
    pub(crate) fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            buttons: MouseButtons::new(),
            dirty: false,
        }
    }

    pub(crate) fn report(&self) -> MouseReport {
        MouseReport {
            buttons: self.buttons.into_bits(),
            x: self.x,
            y: self.y,
            wheel: 0,
            pan: 0,
        }
    }

    /// Consume a successful flush: movement is one-shot, buttons stay held.
    pub(crate) fn finish_flush(&mut self) {
        self.x = 0;
        self.y = 0;
        self.dirty = false;
    }
}

/// While active, presses and releases the left button once per interval,
/// regardless of what the real input is doing to the button state.
pub(crate) struct AutoClicker {
    pub(crate) active: bool,
    interval: Duration,
    /// Press edge of the most recent click
    pub(crate) last_click: Option<Instant>,
    /// The press half of a click is in the report, release pending
    pub(crate) pressed: bool,
}

impl AutoClicker {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            active: false,
            interval,
            last_click: None,
            pressed: false,
        }
    }

    /// Flip the active flag, returning the new state. Deactivation forgets
    /// the click history so a later activation clicks right away.
    pub(crate) fn toggle(&mut self) -> bool {
        self.active = !self.active;
        if !self.active {
            self.last_click = None;
        }
        self.active
    }

    /// True when the next click's press half should be emitted.
    pub(crate) fn due(&self, now: Instant) -> bool {
        self.active
            && !self.pressed
            && self
                .last_click
                .is_none_or(|t| now.duration_since(t) >= self.interval)
    }
}
