//! Aether remote: firmware logic for a three-button handheld remote.
//!
//! The remote has two personalities, picked from a small menu:
//!
//! - **BLE Remote**: a Bluetooth LE HID keyboard that sends Arrow-Up,
//!   Arrow-Down and a double Space ("like").
//! - **Peer Remote**: finds nearby peers on a connectionless 2.4 GHz link
//!   and drives four on/off switches on the chosen one.
//!
//! Everything in this crate is hardware-independent and builds on the host,
//! so the state machines are tested with `cargo test --lib`. The embedded
//! binary (`main.rs`, `embedded` feature) only supplies the board: buttons,
//! OLED, buzzer, clock and the two radio transports.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod hid;
pub mod input;
pub mod peer;
pub mod selector;
pub mod session;
pub mod ui;

#[cfg(test)]
mod mock;

pub use error::Error;
pub use selector::SessionSelector;
pub use session::{ExitReason, Panel, RemoteSession, Session};
