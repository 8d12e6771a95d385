use embassy_time::Duration;

/// Top-level config for the dongle.
///
/// Groups the three tunable areas: the USB device identity presented to the
/// host, the BLE link parameters used when hunting for the two halves, and
/// the timing knobs of the key processing pipeline.
pub struct DongleConfig<'a> {
    pub usb: UsbConfig<'a>,
    pub link: LinkConfig<'a>,
    pub behavior: BehaviorConfig,
}

impl Default for DongleConfig<'_> {
    fn default() -> Self {
        Self {
            usb: UsbConfig::default(),
            link: LinkConfig::default(),
            behavior: BehaviorConfig::default(),
        }
    }
}

/// Configurations for usb
#[derive(Clone, Copy, Debug)]
pub struct UsbConfig<'a> {
    /// Vender id
    pub vid: u16,
    /// Product id
    pub pid: u16,
    /// Manufacturer
    pub manufacturer: &'a str,
    /// Product name
    pub product_name: &'a str,
    /// Serial number
    pub serial_number: &'a str,
}

impl Default for UsbConfig<'_> {
    fn default() -> Self {
        Self {
            vid: 0xc0de,
            pid: 0xcafe,
            manufacturer: "KeyLink",
            product_name: "KeyLink Dongle",
            serial_number: "0001",
        }
    }
}

/// Configurations for the BLE links to the two keyboard halves
#[derive(Clone, Copy, Debug)]
pub struct LinkConfig<'a> {
    /// Scan interval, in 0.625ms units
    pub scan_interval: u16,
    /// Scan window, in 0.625ms units
    pub scan_window: u16,
    /// Advertised name of the left half
    pub left_name: &'a str,
    /// Advertised name of the right half
    pub right_name: &'a str,
}

impl Default for LinkConfig<'_> {
    fn default() -> Self {
        Self {
            scan_interval: 0x0030,
            scan_window: 0x0030,
            left_name: "KB_Left",
            right_name: "KB_Right",
        }
    }
}

/// Timing knobs of the key processing pipeline
#[derive(Clone, Copy, Debug)]
pub struct BehaviorConfig {
    /// Delay between consecutive macro key pulses
    pub macro_key_delay: Duration,
    /// How long a synthetic press is held before its release is emitted
    pub pulse_dwell: Duration,
    /// Delay between consecutive auto-click pulses
    pub auto_click_interval: Duration,
    /// Cursor movement per mouse-move key press, in report units
    pub mouse_move_step: i8,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            macro_key_delay: Duration::from_millis(50),
            pulse_dwell: Duration::from_millis(20),
            auto_click_interval: Duration::from_millis(100),
            mouse_move_step: 10,
        }
    }
}
