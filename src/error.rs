//! Unified error type for aether-remote.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Transport bring-up
    /// The radio / BLE service could not be brought up.
    TransportInit,

    /// Advertising could not be started.
    Advertise,

    /// A network scan failed.
    Scan,

    // Peer-link traffic
    /// The transport refused to register the peer address.
    PeerRegister,

    /// The transport rejected an outgoing frame or report.
    Send,

    /// A report was sent while no central is connected.
    NotConnected,

    // UI / Display
    /// Drawing to or flushing the display failed.
    Display,
}

impl Error {
    /// Short message shown on the error screen.
    pub fn message(&self) -> &'static str {
        match self {
            Error::TransportInit => "Link Init Error",
            Error::Advertise => "Advertise Error",
            Error::Scan => "Scan Error",
            Error::PeerRegister => "Peer Error",
            Error::Send => "Send Error",
            Error::NotConnected => "Not Connected",
            Error::Display => "Display Error",
        }
    }
}
