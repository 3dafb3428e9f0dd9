//! User interface contract - OLED display + buzzer.
//!
//! Sessions describe *what* to show as a [`View`]; a [`DisplaySink`] owns
//! the pixel layout. Sinks keep no state between calls, so every tick
//! simply presents a complete view again.
//!
//! ## Components
//!
//! - **Display**: SSD1306 128×64 OLED via I²C, rendered by [`display::OledSink`]
//! - **Buzzer**: piezo on a PWM channel, fire-and-forget tones

pub mod display;

use crate::error::Error;
use crate::peer::Peer;

/// Screens a session can ask the sink to present.
#[derive(Clone, Copy, Debug)]
pub enum View<'a> {
    /// Centered single line of text.
    Message(&'a str),
    /// BLE title, Bluetooth glyph and a one-line status.
    BleStatus { status: &'a str },
    /// BLE control-mode help screen.
    BleControl,
    /// Top-level session menu.
    Menu {
        entries: &'a [&'a str],
        selected: usize,
    },
    /// Inverted status bar over a bounded peer list with a cursor.
    PeerList {
        title: &'a str,
        peers: &'a [Peer],
        selected: usize,
    },
    /// Inverted status bar over the four-cell toggle grid.
    SwitchGrid {
        title: &'a str,
        switches: &'a [bool],
        focused: usize,
    },
}

/// Anything that can put a [`View`] on screen.
pub trait DisplaySink {
    /// Render `view` and present it.
    fn show(&mut self, view: &View<'_>) -> Result<(), Error>;
}

/// Audible feedback.
pub trait Buzzer {
    /// Start a tone; returns without waiting for it to finish.
    fn beep(&mut self, freq_hz: u16, duration_ms: u16);
}
