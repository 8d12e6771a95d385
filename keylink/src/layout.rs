//! Default keymap and macro table, ported from the stock layout of the
//! keyboard halves this dongle ships with.

use crate::action::KeyAction;
use crate::keyboard_macro::{MacroSequence, MacroStep, NUM_MACROS};
use crate::keycode::{HidModifiers, Keycode};
use crate::{a, ac, k, layer, m, mb, mo, mv};

pub const NUM_SIDES: usize = 2;
pub const NUM_ROWS: usize = 5;
pub const NUM_COLS: usize = 7;
pub const NUM_LAYERS: usize = 4;

/// The stock four-layer layout, indexed `[layer][side][row][col]`.
///
/// Layer 0 is the base QWERTY map, layer 1 (held from left (4,3)) carries
/// function keys and navigation, layer 2 (held from right (4,3)) carries
/// macros and mouse emulation on the left half, layer 3 numbers and symbols.
#[rustfmt::skip]
pub const fn get_default_keymap() -> [[[[KeyAction; NUM_COLS]; NUM_ROWS]; NUM_SIDES]; NUM_LAYERS] {
    [
        // Layer 0: base QWERTY
        [
            // Left half
            layer!([
                [k!(Escape),   k!(Kc1),  k!(Kc2),  k!(Kc3), k!(Kc4),   k!(Kc5), a!(No)],
                [k!(Tab),      k!(Q),    k!(W),    k!(E),   k!(R),     k!(T),   a!(No)],
                [k!(CapsLock), k!(A),    k!(S),    k!(D),   k!(F),     k!(G),   a!(No)],
                [k!(LShift),   k!(Z),    k!(X),    k!(C),   k!(V),     k!(B),   a!(No)],
                [k!(LCtrl),    k!(LGui), k!(LAlt), mo!(1),  k!(Space), a!(No),  a!(No)]
            ]),
            // Right half
            layer!([
                [a!(No), k!(Kc6), k!(Kc7),   k!(Kc8),   k!(Kc9),  k!(Kc0),       k!(Backspace)],
                [a!(No), k!(Y),   k!(U),     k!(I),     k!(O),    k!(P),         k!(LeftBracket)],
                [a!(No), k!(H),   k!(J),     k!(K),     k!(L),    k!(Semicolon), k!(Quote)],
                [a!(No), k!(N),   k!(M),     k!(Comma), k!(Dot),  k!(Slash),     k!(RShift)],
                [a!(No), a!(No),  k!(Space), mo!(2),    k!(RAlt), k!(RCtrl),     a!(No)]
            ]),
        ],
        // Layer 1: function keys and navigation
        [
            // Left half
            layer!([
                [a!(No), k!(F1), k!(F2), k!(F3), k!(F4), k!(F5), a!(No)],
                [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
                [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
                [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
                // The selector key maps to itself so its release is still
                // resolved as a layer action while this layer is active
                [a!(No), a!(No), a!(No), mo!(1), a!(No), a!(No), a!(No)]
            ]),
            // Right half
            layer!([
                [a!(No), k!(F6),   k!(F7),     k!(F8),   k!(F9),       k!(F10), k!(F11)],
                [a!(No), k!(Home), k!(PageUp), k!(Up),   k!(PageDown), k!(End), k!(F12)],
                [a!(No), a!(No),   k!(Left),   k!(Down), k!(Right),    a!(No),  k!(Enter)],
                [a!(No), a!(No),   a!(No),     a!(No),   a!(No),       a!(No),  a!(No)],
                [a!(No), a!(No),   a!(No),     a!(No),   a!(No),       a!(No),  a!(No)]
            ]),
        ],
        // Layer 2: macros and mouse emulation
        [
            // Left half
            layer!([
                [a!(No), m!(0),     m!(1),    m!(2),     a!(No), a!(No), a!(No)],
                [a!(No), mb!(LEFT), mv!(Up),  mb!(RIGHT), a!(No), a!(No), a!(No)],
                [a!(No), mv!(Left), mv!(Down), mv!(Right), a!(No), a!(No), a!(No)],
                [a!(No), a!(No),    a!(No),   a!(No),    a!(No), a!(No), a!(No)],
                [a!(No), a!(No),    a!(No),   a!(No),    ac!(),  a!(No), a!(No)]
            ]),
            // Right half
            layer!([
                [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
                [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
                [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
                [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
                [a!(No), a!(No), a!(No), mo!(2), a!(No), a!(No), a!(No)]
            ]),
        ],
        // Layer 3: numbers and symbols
        [
            // Left half
            layer!([
                [k!(Grave), k!(F1), k!(F2), k!(F3), k!(F4), k!(F5), a!(No)],
                [a!(No),    a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
                [a!(No),    a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
                [a!(No),    a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
                [a!(No),    a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)]
            ]),
            // Right half
            layer!([
                [a!(No), k!(F6),    k!(F7),   k!(F8),          k!(F9),           k!(F10),      k!(Delete)],
                [a!(No), k!(Minus), k!(Equal), k!(LeftBracket), k!(RightBracket), k!(Backslash), a!(No)],
                [a!(No), a!(No),    a!(No),   a!(No),          a!(No),           a!(No),       a!(No)],
                [a!(No), a!(No),    a!(No),   a!(No),          a!(No),           a!(No),       a!(No)],
                [a!(No), a!(No),    a!(No),   mo!(3),          a!(No),           a!(No),       a!(No)]
            ]),
        ],
    ]
}

/// The stock macro table. Slots 2 and up are empty; triggering an empty slot
/// does nothing.
pub fn get_default_macros() -> [MacroSequence; NUM_MACROS] {
    let mut macros: [MacroSequence; NUM_MACROS] = core::array::from_fn(|_| MacroSequence::default());
    // Macro 0 types "hello"
    macros[0] = MacroSequence::from_keycodes(&[Keycode::H, Keycode::E, Keycode::L, Keycode::L, Keycode::O]);
    // Macro 1 sends Ctrl+C
    macros[1] = MacroSequence::from_steps(&[MacroStep::with_modifiers(Keycode::C, HidModifiers::LCTRL)]);
    macros
}
