//! Macro sequences played back over time from a single trigger key.

use embassy_time::Instant;
use heapless::Vec;

use crate::keycode::{HidModifiers, Keycode};

/// Number of macro slots addressable from the keymap.
pub const NUM_MACROS: usize = 16;
/// Longest macro sequence.
pub const MACRO_MAX_STEPS: usize = 32;

/// One macro step: a keycode pressed together with a modifier set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacroStep {
    pub keycode: Keycode,
    pub modifiers: HidModifiers,
}

impl MacroStep {
    pub const fn key(keycode: Keycode) -> Self {
        Self {
            keycode,
            modifiers: HidModifiers::new(),
        }
    }

    pub const fn with_modifiers(keycode: Keycode, modifiers: HidModifiers) -> Self {
        Self { keycode, modifiers }
    }
}

/// A fixed, ordered key sequence emitted step by step from one trigger press.
#[derive(Debug, Clone, Default)]
pub struct MacroSequence {
    steps: Vec<MacroStep, MACRO_MAX_STEPS>,
}

impl MacroSequence {
    pub fn from_steps(steps: &[MacroStep]) -> Self {
        let mut sequence = Self::default();
        for step in steps {
            if sequence.steps.push(*step).is_err() {
                warn!("Macro sequence truncated at {} steps", MACRO_MAX_STEPS);
                break;
            }
        }
        sequence
    }

    /// A sequence that types the given keycodes without modifiers.
    pub fn from_keycodes(keycodes: &[Keycode]) -> Self {
        let mut sequence = Self::default();
        for keycode in keycodes {
            if sequence.steps.push(MacroStep::key(*keycode)).is_err() {
                warn!("Macro sequence truncated at {} steps", MACRO_MAX_STEPS);
                break;
            }
        }
        sequence
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub(crate) fn step(&self, cursor: usize) -> Option<MacroStep> {
        self.steps.get(cursor).copied()
    }
}

/// Playback bookkeeping. At most one macro plays at a time; arming another
/// one supersedes whatever is in flight.
pub(crate) struct MacroPlayer {
    /// Macro id being played
    pub(crate) active: Option<u8>,
    /// Next step to emit
    pub(crate) cursor: usize,
    /// When the previous step's press was emitted
    pub(crate) last_emit: Instant,
    /// The current step's synthetic press is in the report, release pending
    pub(crate) pressed: bool,
}

impl MacroPlayer {
    pub(crate) fn new() -> Self {
        Self {
            active: None,
            cursor: 0,
            last_emit: Instant::MIN,
            pressed: false,
        }
    }

    /// Start playing `id` from the beginning. Returns `true` if a synthetic
    /// press of the superseded macro is still in the report and must be
    /// released by the caller.
    pub(crate) fn arm(&mut self, id: u8, now: Instant) -> bool {
        let interrupted = self.pressed;
        self.active = Some(id);
        self.cursor = 0;
        self.last_emit = now;
        self.pressed = false;
        interrupted
    }

    pub(crate) fn clear(&mut self) {
        self.active = None;
        self.cursor = 0;
        self.pressed = false;
    }
}
