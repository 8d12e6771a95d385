/// Create a layer in keymap
#[macro_export]
macro_rules! layer {
    ([$([$($x: expr), +]), +]) => {
        [$([$($x), +]),+]
    };
}

/// Create a normal key. For example, `k!(A)` represents `KeyAction::Key(Keycode::A)`
#[macro_export]
macro_rules! k {
    ($k: ident) => {
        $crate::action::KeyAction::Key($crate::keycode::Keycode::$k)
    };
}

/// Create a normal action: `KeyAction`
#[macro_export]
macro_rules! a {
    ($a: ident) => {
        $crate::action::KeyAction::$a
    };
}

/// Create a momentary layer select action. For example, `mo!(1)` activates layer 1 while held.
#[macro_export]
macro_rules! mo {
    ($x: literal) => {
        $crate::action::KeyAction::Layer($x)
    };
}

/// Create a macro trigger action, `m!(0)` plays macro 0.
#[macro_export]
macro_rules! m {
    ($x: literal) => {
        $crate::action::KeyAction::Macro($x)
    };
}

/// Create a mouse button action. For example, `mb!(LEFT)` holds the left button.
#[macro_export]
macro_rules! mb {
    ($b: ident) => {
        $crate::action::KeyAction::MouseButton($crate::keycode::MouseButtons::$b)
    };
}

/// Create a mouse movement action. For example, `mv!(Up)` pulses the cursor upwards.
#[macro_export]
macro_rules! mv {
    ($d: ident) => {
        $crate::action::KeyAction::MouseMove($crate::action::MouseDir::$d)
    };
}

/// Create the auto click toggle action
#[macro_export]
macro_rules! ac {
    () => {
        $crate::action::KeyAction::AutoClickToggle
    };
}
