/// Edge of a key state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyEventKind {
    Press,
    Release,
}

/// A single debounced key state change on one half's matrix, as carried in a
/// peer notification. `side` comes from the payload itself and is what the
/// keymap lookup uses; it is not cross-checked against the delivering peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyMatrixEvent {
    pub kind: KeyEventKind,
    pub row: u8,
    pub col: u8,
    pub side: u8,
}

impl KeyMatrixEvent {
    pub fn is_pressed(&self) -> bool {
        self.kind == KeyEventKind::Press
    }
}
