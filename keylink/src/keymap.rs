//! Keymap is the mapping from a physical key position to its behavior, per
//! layer. The dongle aggregates two halves, so positions are addressed as
//! (side, row, col) and the table is `[layer][side][row][col]`.

use crate::action::KeyAction;
use crate::event::KeyMatrixEvent;

/// Keymap state for the whole device: the per-layer action tables of both
/// halves plus the single active layer.
///
/// Layer selection is momentary and non-stacking: exactly one layer is active
/// at any time, and releasing any layer key drops back to layer 0.
pub struct KeyMap<const SIDES: usize, const ROW: usize, const COL: usize, const NUM_LAYER: usize> {
    /// Action tables, `layers[layer][side][row][col]`
    layers: [[[[KeyAction; COL]; ROW]; SIDES]; NUM_LAYER],
    /// Currently active layer
    current_layer: u8,
}

impl<const SIDES: usize, const ROW: usize, const COL: usize, const NUM_LAYER: usize>
    KeyMap<SIDES, ROW, COL, NUM_LAYER>
{
    pub fn new(layers: [[[[KeyAction; COL]; ROW]; SIDES]; NUM_LAYER]) -> Self {
        Self {
            layers,
            current_layer: 0,
        }
    }

    /// Resolve an event's position to its action on the active layer.
    /// Out-of-range positions resolve to `KeyAction::No`.
    pub fn get_action(&self, event: KeyMatrixEvent) -> KeyAction {
        if event.side as usize >= SIDES || event.row as usize >= ROW || event.col as usize >= COL {
            error!(
                "Invalid peer key position: side {} row {} col {}",
                event.side, event.row, event.col
            );
            return KeyAction::No;
        }
        self.layers[self.current_layer as usize][event.side as usize][event.row as usize]
            [event.col as usize]
    }

    /// Activate `layer`. Indices beyond the table are ignored.
    pub fn set_layer(&mut self, layer: u8) {
        if layer as usize >= NUM_LAYER {
            error!("Ignoring switch to nonexistent layer {}", layer);
            return;
        }
        self.current_layer = layer;
    }

    /// Drop back to the base layer.
    pub fn reset_layer(&mut self) {
        self.current_layer = 0;
    }

    pub fn current_layer(&self) -> u8 {
        self.current_layer
    }
}
