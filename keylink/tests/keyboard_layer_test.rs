pub mod common;

use embassy_futures::block_on;
use embassy_time::Instant;
use keylink::config::BehaviorConfig;
use keylink::keyboard::Keyboard;
use keylink::keyboard_macro::MacroSequence;
use keylink::keycode::Keycode;
use keylink::keymap::KeyMap;
use keylink::layout;
use keylink::reporter::ReportMultiplexer;
use keylink::{k, layer, mo};

use crate::common::{FakeHidTransport, kb_report, press, release};

fn create_default_keyboard() -> Keyboard<2, 5, 7, 4> {
    Keyboard::new(
        KeyMap::new(layout::get_default_keymap()),
        layout::get_default_macros(),
        BehaviorConfig::default(),
    )
}

/// One-row keyboard with a selector for layer 1 and layer 2 on every layer.
fn create_two_selector_keyboard() -> Keyboard<1, 1, 3, 3> {
    let keymap = KeyMap::new([
        layer!([[[mo!(1), mo!(2), k!(A)]]]),
        layer!([[[mo!(1), mo!(2), k!(B)]]]),
        layer!([[[mo!(1), mo!(2), k!(C)]]]),
    ]);
    Keyboard::new(
        keymap,
        core::array::from_fn(|_| MacroSequence::default()),
        BehaviorConfig::default(),
    )
}

#[test]
fn test_momentary_layer_remaps_and_returns() {
    block_on(async {
        let transport = FakeHidTransport::new();
        let mut reporter = ReportMultiplexer::new(transport.clone());
        let mut keyboard = create_default_keyboard();
        let now = Instant::from_ticks(0);

        // Base layer: right (1,3) is the letter I
        keyboard.process_event(press(1, 1, 3), now);
        reporter.flush(&mut keyboard).await;
        keyboard.process_event(release(1, 1, 3), now);
        reporter.flush(&mut keyboard).await;

        // With the left layer key held the same position is arrow up
        keyboard.process_event(press(0, 4, 3), now);
        keyboard.process_event(press(1, 1, 3), now);
        reporter.flush(&mut keyboard).await;
        keyboard.process_event(release(1, 1, 3), now);
        reporter.flush(&mut keyboard).await;
        keyboard.process_event(release(0, 4, 3), now);

        // And back on the base layer afterwards
        keyboard.process_event(press(1, 1, 3), now);
        reporter.flush(&mut keyboard).await;

        let i = Keycode::I as u8;
        let up = Keycode::Up as u8;
        assert_eq!(
            transport.keyboard_reports(),
            vec![
                kb_report(0, [i, 0, 0, 0, 0, 0]),
                kb_report(0, [0; 6]),
                kb_report(0, [up, 0, 0, 0, 0, 0]),
                kb_report(0, [0; 6]),
                kb_report(0, [i, 0, 0, 0, 0, 0]),
            ]
        );
    });
}

#[test]
fn test_releasing_any_selector_returns_to_base() {
    block_on(async {
        let transport = FakeHidTransport::new();
        let mut reporter = ReportMultiplexer::new(transport.clone());
        let mut keyboard = create_two_selector_keyboard();
        let now = Instant::from_ticks(0);

        keyboard.process_event(press(0, 0, 0), now);
        keyboard.process_event(press(0, 0, 2), now);
        reporter.flush(&mut keyboard).await;
        keyboard.process_event(release(0, 0, 2), now);
        reporter.flush(&mut keyboard).await;

        // Switch layers while the first selector is still held
        keyboard.process_event(press(0, 0, 1), now);
        keyboard.process_event(press(0, 0, 2), now);
        reporter.flush(&mut keyboard).await;
        keyboard.process_event(release(0, 0, 2), now);
        reporter.flush(&mut keyboard).await;

        // Releasing the first selector drops to the base layer even though
        // the second selector is still held
        keyboard.process_event(release(0, 0, 0), now);
        keyboard.process_event(press(0, 0, 2), now);
        reporter.flush(&mut keyboard).await;

        let (a, b, c) = (Keycode::A as u8, Keycode::B as u8, Keycode::C as u8);
        assert_eq!(
            transport.keyboard_reports(),
            vec![
                kb_report(0, [b, 0, 0, 0, 0, 0]),
                kb_report(0, [0; 6]),
                kb_report(0, [c, 0, 0, 0, 0, 0]),
                kb_report(0, [0; 6]),
                kb_report(0, [a, 0, 0, 0, 0, 0]),
            ]
        );
    });
}

#[test]
fn test_release_resolves_on_the_active_layer() {
    block_on(async {
        let transport = FakeHidTransport::new();
        let mut reporter = ReportMultiplexer::new(transport.clone());
        let mut keyboard = create_two_selector_keyboard();
        let now = Instant::from_ticks(0);

        // B is pressed on layer 1, but its release arrives after the layer
        // key was let go. The release resolves to A on the base layer, so B
        // stays latched in the report. Faithful to the per-event lookup,
        // matrix halves are expected to send releases before layer changes.
        keyboard.process_event(press(0, 0, 0), now);
        keyboard.process_event(press(0, 0, 2), now);
        reporter.flush(&mut keyboard).await;
        keyboard.process_event(release(0, 0, 0), now);
        keyboard.process_event(release(0, 0, 2), now);
        reporter.flush(&mut keyboard).await;

        let b = Keycode::B as u8;
        assert_eq!(
            transport.keyboard_reports(),
            vec![
                kb_report(0, [b, 0, 0, 0, 0, 0]),
                kb_report(0, [b, 0, 0, 0, 0, 0]),
            ]
        );
    });
}
