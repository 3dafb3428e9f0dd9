//! BLE HID keyboard input report (boot protocol compatible).
//!
//! Layout (8 bytes):
//! ```text
//! Byte 0: Modifier keys (bitfield) - unused by the remote, always 0x00
//! Byte 1: Reserved (0x00)
//! Byte 2: Primary key code (USB HID usage), 0x00 when idle
//! Byte 3-7: Remaining key-array slots, always 0x00
//! ```

/// Keyboard report size in bytes.
pub const KEYBOARD_REPORT_SIZE: usize = 8;

/// Report ID of the single input report in [`KEYBOARD_REPORT_DESCRIPTOR`].
pub const KEYBOARD_REPORT_ID: u8 = 1;

/// Value of the Report Reference descriptor (0x2908) on the input report
/// characteristic: report ID, then report type 1 (input).
pub const INPUT_REPORT_REFERENCE: [u8; 2] = [KEYBOARD_REPORT_ID, 0x01];

/// Keyboard usages the remote can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum KeyUsage {
    Space = 0x2C,
    ArrowDown = 0x51,
    ArrowUp = 0x52,
}

impl KeyUsage {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Standard HID boot-protocol keyboard report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    /// Modifier key bitfield.
    pub modifier: u8,
    /// Reserved byte (always 0x00).
    pub reserved: u8,
    /// Key-array slots; only the first is ever used.
    pub keycodes: [u8; 6],
}

impl KeyboardReport {
    /// Create an empty (all-keys-released) report.
    pub const fn empty() -> Self {
        Self {
            modifier: 0,
            reserved: 0,
            keycodes: [0; 6],
        }
    }

    /// Report with `usage` as the only pressed key.
    pub const fn press(usage: KeyUsage) -> Self {
        let mut report = Self::empty();
        report.keycodes[0] = usage.code();
        report
    }

    /// Serialise into a byte slice for notification.
    /// Returns the number of bytes written (8, or 0 if `buf` is too short).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < KEYBOARD_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.modifier;
        buf[1] = self.reserved;
        buf[2..8].copy_from_slice(&self.keycodes);
        KEYBOARD_REPORT_SIZE
    }

    pub fn to_bytes(&self) -> [u8; KEYBOARD_REPORT_SIZE] {
        let mut out = [0u8; KEYBOARD_REPORT_SIZE];
        self.serialize(&mut out);
        out
    }

    /// Returns `true` if no keys are pressed (release event).
    pub fn is_empty(&self) -> bool {
        self.modifier == 0 && self.keycodes.iter().all(|&k| k == 0)
    }
}

// HID report descriptor for a boot-protocol keyboard

/// HID Report Map for the remote's keyboard.
///
/// Declares, under report ID 1:
///   - 8 modifier key bits (input)
///   - 1 reserved byte
///   - 5 LED indicators (output, unused here)
///   - 6 key code bytes (input, usages 0x00..=0x65)
pub const KEYBOARD_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    0x85, KEYBOARD_REPORT_ID, //   Report ID
    //
    //   - Modifier keys (8 bits) -
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0, //   Usage Minimum (Left Control)
    0x29, 0xE7, //   Usage Maximum (Right GUI)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    //   - Reserved byte -
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant)
    //
    //   - LED output (5 bits + 3 padding) -
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (Num Lock)
    0x29, 0x05, //   Usage Maximum (Kana)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant)
    //
    //   - Key codes (6 bytes) -
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x65, //   Logical Maximum (101)
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0x65, //   Usage Maximum (101)
    0x81, 0x00, //   Input (Data, Array)
    //
    0xC0, // End Collection
];

/// Length of [`KEYBOARD_REPORT_DESCRIPTOR`], for fixed-size GATT values.
pub const KEYBOARD_REPORT_DESCRIPTOR_LEN: usize = 65;
