//! nRF52840 board support.
//!
//! Implements the library's hardware traits on top of Embassy and the
//! S140 SoftDevice:
//!
//! - [`buttons`]: three active-low GPIO buttons
//! - [`buzzer`]: piezo on PWM0, played by a background task
//! - [`display`]: SSD1306 128×64 over TWIM0
//! - [`clock`]: embassy-time
//! - [`hid_server`]: GATT HID keyboard + advertising task
//! - [`peer_radio`]: peer link over BLE advertising + receive task

pub mod buttons;
pub mod buzzer;
pub mod clock;
pub mod display;
pub mod hid_server;
pub mod peer_radio;
