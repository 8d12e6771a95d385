//! Key event interpreter: turns peer key matrix events into HID report state.

use embassy_time::Instant;
use usbd_hid::descriptor::MouseReport;

use crate::action::{KeyAction, MouseDir};
use crate::config::BehaviorConfig;
use crate::event::KeyMatrixEvent;
use crate::keyboard_macro::{MacroPlayer, MacroSequence, NUM_MACROS};
use crate::keycode::{Keycode, MouseButtons};
use crate::keymap::KeyMap;
use crate::usb::descriptor::KeyboardReport;

mod mouse;

use mouse::{AutoClicker, MouseState};

/// All interpreter state: the keymap with its active layer, macro playback,
/// mouse emulation, and the two output reports with their dirty flags.
///
/// Events are fed in through [`process_event`](Self::process_event); the
/// time-driven behaviors (macro playback and auto click) advance in
/// [`tick`](Self::tick), called once per control loop iteration. Both take
/// `now` from the caller so the pulse deadlines stay testable.
pub struct Keyboard<const SIDES: usize, const ROW: usize, const COL: usize, const NUM_LAYER: usize> {
    keymap: KeyMap<SIDES, ROW, COL, NUM_LAYER>,
    behavior: BehaviorConfig,
    macros: [MacroSequence; NUM_MACROS],
    macro_player: MacroPlayer,
    mouse: MouseState,
    auto_clicker: AutoClicker,
    /// Live keyboard report
    report: KeyboardReport,
    /// The keyboard report changed since its last flush
    report_dirty: bool,
}

impl<const SIDES: usize, const ROW: usize, const COL: usize, const NUM_LAYER: usize>
    Keyboard<SIDES, ROW, COL, NUM_LAYER>
{
    pub fn new(
        keymap: KeyMap<SIDES, ROW, COL, NUM_LAYER>,
        macros: [MacroSequence; NUM_MACROS],
        behavior: BehaviorConfig,
    ) -> Self {
        Self {
            keymap,
            macros,
            macro_player: MacroPlayer::new(),
            mouse: MouseState::new(),
            auto_clicker: AutoClicker::new(behavior.auto_click_interval),
            behavior,
            report: KeyboardReport::default(),
            report_dirty: false,
        }
    }

    /// Resolve one key matrix event against the active layer and apply it.
    pub fn process_event(&mut self, event: KeyMatrixEvent, now: Instant) {
        let action = self.keymap.get_action(event);
        debug!(
            "Processing event: side {} row {} col {} {:?} -> {:?}",
            event.side, event.row, event.col, event.kind, action
        );
        match action {
            KeyAction::No => (),
            KeyAction::Layer(layer) => self.process_action_layer(layer, event.is_pressed()),
            KeyAction::Macro(id) => {
                if event.is_pressed() {
                    self.arm_macro(id, now);
                }
            }
            KeyAction::MouseButton(buttons) => {
                self.process_action_mouse_button(buttons, event.is_pressed())
            }
            KeyAction::MouseMove(dir) => {
                if event.is_pressed() {
                    self.process_action_mouse_move(dir);
                }
            }
            KeyAction::AutoClickToggle => {
                if event.is_pressed() {
                    self.toggle_auto_click();
                }
            }
            KeyAction::Key(key) => self.process_action_keycode(key, event.is_pressed()),
        }
    }

    /// Advance the time-driven behaviors one step.
    pub fn tick(&mut self, now: Instant) {
        self.tick_macro(now);
        self.tick_auto_click(now);
    }

    /// Layer selection is momentary and non-nesting: the release of any
    /// layer key drops back to layer 0, whichever layer is active.
    fn process_action_layer(&mut self, layer: u8, pressed: bool) {
        if pressed {
            self.keymap.set_layer(layer);
        } else {
            self.keymap.reset_layer();
        }
    }

    fn arm_macro(&mut self, id: u8, now: Instant) {
        match self.macros.get(id as usize) {
            Some(sequence) if !sequence.is_empty() => {
                debug!("Arming macro {}", id);
                if self.macro_player.arm(id, now) {
                    // The superseded macro's synthetic press is still in the
                    // report; release it before the new playback starts.
                    self.clear_keyboard_report();
                }
            }
            Some(_) => debug!("Ignoring trigger of empty macro slot {}", id),
            None => warn!("Ignoring trigger of nonexistent macro {}", id),
        }
    }

    fn process_action_mouse_button(&mut self, buttons: MouseButtons, pressed: bool) {
        if pressed {
            self.mouse.buttons |= buttons;
        } else {
            self.mouse.buttons &= !buttons;
        }
        self.mouse.dirty = true;
    }

    /// Movement keys pulse a fixed delta on press; the delta is zeroed again
    /// when the report is flushed.
    fn process_action_mouse_move(&mut self, dir: MouseDir) {
        let step = self.behavior.mouse_move_step;
        match dir {
            MouseDir::Up => self.mouse.y = -step,
            MouseDir::Down => self.mouse.y = step,
            MouseDir::Left => self.mouse.x = -step,
            MouseDir::Right => self.mouse.x = step,
        }
        self.mouse.dirty = true;
    }

    fn toggle_auto_click(&mut self) {
        let active = self.auto_clicker.toggle();
        info!("Auto click {}", if active { "enabled" } else { "disabled" });
        if !active && self.auto_clicker.pressed {
            // A click pulse is mid dwell; emit its release half so the
            // button is not left stuck.
            self.auto_clicker.pressed = false;
            self.mouse.buttons &= !MouseButtons::LEFT;
            self.mouse.dirty = true;
        }
    }

    fn process_action_keycode(&mut self, key: Keycode, pressed: bool) {
        if key.is_modifier() {
            if pressed {
                self.report.modifier |= key.as_modifier_bit();
            } else {
                self.report.modifier &= !key.as_modifier_bit();
            }
        } else if pressed {
            self.register_keycode(key);
        } else {
            self.unregister_keycode(key);
        }
        self.report_dirty = true;
    }

    /// Put a keycode into the first free report slot. Codes already present
    /// are not duplicated; a full report drops the new code.
    fn register_keycode(&mut self, key: Keycode) {
        let code = key as u8;
        if self.report.keycodes.contains(&code) {
            return;
        }
        match self.report.keycodes.iter_mut().find(|slot| **slot == 0) {
            Some(slot) => *slot = code,
            None => warn!("Keyboard report full, dropping {:?}", key),
        }
    }

    fn unregister_keycode(&mut self, key: Keycode) {
        let code = key as u8;
        if let Some(slot) = self.report.keycodes.iter_mut().find(|slot| **slot == code) {
            *slot = 0;
        }
    }

    fn clear_keyboard_report(&mut self) {
        self.report = KeyboardReport::default();
        self.report_dirty = true;
    }

    /// Macro playback, one phase per call.
    ///
    /// A step is a synthetic press-then-release pulse that replaces the whole
    /// live report, including keys the user is really holding. The release
    /// half fires only once the dwell has elapsed and the press has actually
    /// been flushed, so the host always sees the press first. Pacing is
    /// press-to-press: `last_emit` is stamped at the press edge only.
    fn tick_macro(&mut self, now: Instant) {
        let Some(id) = self.macro_player.active else {
            return;
        };

        if self.macro_player.pressed {
            if !self.report_dirty
                && now.duration_since(self.macro_player.last_emit) >= self.behavior.pulse_dwell
            {
                self.clear_keyboard_report();
                self.macro_player.pressed = false;
                self.macro_player.cursor += 1;
                if self.macros[id as usize].step(self.macro_player.cursor).is_none() {
                    debug!("Macro {} finished", id);
                    self.macro_player.clear();
                }
            }
            return;
        }

        if now.duration_since(self.macro_player.last_emit) < self.behavior.macro_key_delay {
            return;
        }
        match self.macros[id as usize].step(self.macro_player.cursor) {
            Some(step) => {
                self.report = KeyboardReport::default();
                self.report.modifier = step.modifiers.into_bits();
                self.report.keycodes[0] = step.keycode as u8;
                self.report_dirty = true;
                self.macro_player.pressed = true;
                self.macro_player.last_emit = now;
            }
            None => self.macro_player.clear(),
        }
    }

    /// Auto click, one phase per call. Presses the left button once per
    /// interval and releases it after the dwell, regardless of what real
    /// input is doing to the button in between (last write wins).
    fn tick_auto_click(&mut self, now: Instant) {
        if self.auto_clicker.pressed {
            if !self.mouse.dirty
                && self
                    .auto_clicker
                    .last_click
                    .is_some_and(|t| now.duration_since(t) >= self.behavior.pulse_dwell)
            {
                self.mouse.buttons &= !MouseButtons::LEFT;
                self.mouse.dirty = true;
                self.auto_clicker.pressed = false;
            }
            return;
        }
        if self.auto_clicker.due(now) {
            self.mouse.buttons |= MouseButtons::LEFT;
            self.mouse.dirty = true;
            self.auto_clicker.pressed = true;
            self.auto_clicker.last_click = Some(now);
        }
    }

    /// Fresh copy of the keyboard report if it needs flushing.
    pub(crate) fn pending_keyboard_report(&self) -> Option<KeyboardReport> {
        self.report_dirty.then(|| KeyboardReport {
            modifier: self.report.modifier,
            reserved: 0,
            leds: 0,
            keycodes: self.report.keycodes,
        })
    }

    pub(crate) fn ack_keyboard_flush(&mut self) {
        self.report_dirty = false;
    }

    /// Fresh copy of the mouse report if it needs flushing.
    pub(crate) fn pending_mouse_report(&self) -> Option<MouseReport> {
        self.mouse.dirty.then(|| self.mouse.report())
    }

    pub(crate) fn ack_mouse_flush(&mut self) {
        self.mouse.finish_flush();
    }
}
