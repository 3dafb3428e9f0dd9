//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

// Device identity

/// GAP device name, also the title of the BLE screens.
pub const DEVICE_NAME: &str = "AETHER 32";

/// Manufacturer Name String characteristic value.
pub const MANUFACTURER: &str = "Aether32";

/// PnP ID: vendor ID source (0x02 = USB-IF), vendor, product, version.
pub const PNP_VENDOR_ID_SOURCE: u8 = 0x02;
pub const PNP_VENDOR_ID: u16 = 0xE502;
pub const PNP_PRODUCT_ID: u16 = 0xA111;
pub const PNP_PRODUCT_VERSION: u16 = 0x0210;

/// HID Information: country code and flags (0x01 = RemoteWake).
pub const HID_COUNTRY_CODE: u8 = 0x00;
pub const HID_INFO_FLAGS: u8 = 0x01;

/// Preferred connection interval range (in 1.25 ms units) advertised to
/// the central. 6 = 7.5 ms, 0x12 = 22.5 ms.
pub const BLE_CONN_INTERVAL_MIN: u16 = 0x06;
pub const BLE_CONN_INTERVAL_MAX: u16 = 0x12;

// Session menu

/// Tick period of the top-level session menu (ms).
pub const MENU_TICK_MS: u64 = 30;

// BLE-HID session timing (ms)

/// Tick period while waiting for a central.
pub const BLE_WAIT_TICK_MS: u64 = 30;

/// Minimum interval between "Waiting..." screen refreshes.
pub const BLE_WAIT_REFRESH_MS: u64 = 400;

/// How long the "Connected!" banner stays up before control mode.
pub const BLE_CONNECTED_BANNER_MS: u64 = 700;

/// Tick period in control mode.
pub const BLE_CONTROL_TICK_MS: u64 = 15;

/// Key-down to key-up delay for one HID key send.
pub const HID_PRESS_MS: u64 = 15;

/// Settle time after the key-up report.
pub const HID_RELEASE_MS: u64 = 8;

/// Gap between the two Space sends of a "like".
pub const LIKE_GAP_MS: u64 = 50;

/// Ok must be held this long in control mode to leave the session.
pub const BLE_EXIT_HOLD_MS: u64 = 1000;

/// How long a fatal bring-up error stays on screen.
pub const ERROR_SCREEN_MS: u64 = 1200;

// Peer-link session timing (ms)

/// Tick period in the select and connected screens.
pub const PEER_TICK_MS: u64 = 20;

/// Tick period while waiting for Ok after an empty scan.
pub const PEER_EMPTY_WAIT_TICK_MS: u64 = 60;

/// Ok must be held this long to leave the peer-link session.
pub const PEER_EXIT_HOLD_MS: u64 = 900;

/// Dwell times of the peer-link notices.
pub const NOTICE_SCANNING_MS: u64 = 500;
pub const NOTICE_NO_PEERS_MS: u64 = 1200;
pub const NOTICE_EXIT_HINT_MS: u64 = 600;
pub const NOTICE_CONNECTING_MS: u64 = 500;
pub const NOTICE_CONNECTED_MS: u64 = 800;
pub const NOTICE_FAILED_MS: u64 = 800;

/// Button sampling period while a notice is on screen.
pub const NOTICE_TICK_MS: u64 = 20;

// Peer-link discovery

/// Maximum number of selectable peers kept from one scan.
pub const PEER_CAPACITY: usize = 8;

/// Maximum display-name length of a peer.
pub const PEER_NAME_LEN: usize = 32;

/// Maximum number of raw scan records a transport reports per scan.
pub const SCAN_RESULTS_MAX: usize = 32;

/// A scanned name qualifies as a peer when it contains any of these.
pub const PEER_NAME_FILTERS: &[&str] = &["ESP32", "ESPNOW"];

/// Number of remote switches carried in a payload frame.
pub const SWITCH_COUNT: usize = 4;

// Audible feedback (Hz, ms)

pub const TONE_BLE_CONNECTED: (u16, u16) = (1800, 80);
pub const TONE_ARROW_KEY: (u16, u16) = (1200, 20);
pub const TONE_LIKE: (u16, u16) = (1900, 20);
pub const TONE_CANCEL: (u16, u16) = (1000, 80);
pub const TONE_LONG_PRESS_EXIT: (u16, u16) = (700, 80);
pub const TONE_DISCONNECTED: (u16, u16) = (700, 80);
pub const TONE_INFO: (u16, u16) = (1500, 40);
pub const TONE_NAVIGATE: (u16, u16) = (1000, 30);
pub const TONE_TOGGLE: (u16, u16) = (1800, 40);

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Button UP      → P0.11
//   Button DOWN    → P0.12
//   Button OK      → P0.24
//   Buzzer (PWM0)  → P0.13
//   I²C SDA        → P0.26
//   I²C SCL        → P0.27
