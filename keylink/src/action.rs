//! Key behaviors bound to keymap positions.

use crate::keycode::{Keycode, MouseButtons};

/// Direction of a one-shot mouse movement pulse.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MouseDir {
    Up,
    Down,
    Left,
    Right,
}

/// KeyAction is the behavior bound to one (layer, side, row, col) position of
/// the keymap. The interpreter dispatches on the variant, so layer selects,
/// macro triggers and mouse emulation cannot collide with regular HID usage
/// ids the way range-partitioned raw bytes would.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// No action. The event is dropped.
    No,
    /// A regular HID keycode, held in the keyboard report while pressed.
    Key(Keycode),
    /// Momentary layer select: the layer is active from press until any
    /// layer key's release.
    Layer(u8),
    /// Arm the macro with this id on press.
    Macro(u8),
    /// Hold a mouse button while pressed.
    MouseButton(MouseButtons),
    /// One-shot mouse movement pulse on press.
    MouseMove(MouseDir),
    /// Flip the auto clicker on press.
    AutoClickToggle,
}
