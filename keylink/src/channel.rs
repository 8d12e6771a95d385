//! Exposed channels which share data between the link side and the interpreter

use embassy_sync::channel::Channel;

use crate::event::KeyMatrixEvent;
use crate::{EVENT_CHANNEL_SIZE, RawMutex};

/// Channel carrying decoded key events from the peer links to the interpreter
pub static KEY_EVENT_CHANNEL: Channel<RawMutex, KeyMatrixEvent, EVENT_CHANNEL_SIZE> = Channel::new();
