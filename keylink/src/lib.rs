//! KeyLink is the dongle core of a two half wireless keyboard: it owns the
//! BLE central that links both halves, interprets their key matrix events
//! through a layered keymap, and multiplexes the resulting keyboard and
//! mouse reports onto a composite USB HID device.
//!
//! The crate is hardware agnostic. Firmware supplies an
//! [`embassy_usb::driver::Driver`] for the USB side and a [`ble::BleCentral`]
//! implementation for the radio, then calls [`run_dongle`] with its keymap,
//! macro table and configuration.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![allow(async_fn_in_trait)]

// Logging macros, declared first so every module sees them
#[macro_use]
mod fmt;

pub mod action;
pub mod ble;
pub mod channel;
pub mod config;
pub mod dongle;
pub mod event;
pub mod hid;
pub mod keyboard;
pub mod keyboard_macro;
pub mod keycode;
pub mod keymap;
pub mod layout;
pub mod layout_macro;
pub mod reporter;
pub mod split;
pub mod usb;

pub use dongle::{Dongle, run_dongle};
pub use usb::descriptor;

/// Raw mutex type used by the crate's shared statics.
pub type RawMutex = embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

/// Capacity of [`channel::KEY_EVENT_CHANNEL`].
pub const EVENT_CHANNEL_SIZE: usize = 16;
