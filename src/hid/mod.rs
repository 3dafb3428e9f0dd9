//! HID keyboard reports sent by the BLE remote.

pub mod keyboard;

#[cfg(test)]
mod tests;

pub use keyboard::{KeyUsage, KeyboardReport, KEYBOARD_REPORT_SIZE};

/// Reports making up one key send: key-down, then key-up.
pub fn key_stroke(usage: KeyUsage) -> [KeyboardReport; 2] {
    [KeyboardReport::press(usage), KeyboardReport::empty()]
}

/// Key mapped to a directional button in control mode.
pub fn arrow_for(up: bool) -> KeyUsage {
    if up {
        KeyUsage::ArrowUp
    } else {
        KeyUsage::ArrowDown
    }
}
