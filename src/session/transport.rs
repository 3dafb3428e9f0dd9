//! Transport seams between the session loops and the radio stacks.
//!
//! Both radios are black boxes to the sessions. Their callback contexts
//! may only touch a [`ConnectionFlag`] or an [`InboundSlot`].

use core::sync::atomic::{AtomicBool, Ordering};

use heapless::Vec;

use crate::config;
use crate::error::Error;
use crate::hid::keyboard::KEYBOARD_REPORT_DESCRIPTOR;
use crate::hid::KeyboardReport;
use crate::peer::{InboundSlot, MacAddress, ScanRecord};

/// GAP appearance value for a HID keyboard.
pub const APPEARANCE_KEYBOARD: u16 = 0x03C1;

/// 16-bit UUID of the HID service.
pub const HID_SERVICE_UUID16: u16 = 0x1812;

/// Records returned by one peer-link scan.
pub type ScanResults = Vec<ScanRecord, { config::SCAN_RESULTS_MAX }>;

/// Everything a BLE stack needs to publish the remote's HID service.
#[derive(Clone, Copy, Debug)]
pub struct HidIdentity {
    pub device_name: &'static str,
    pub manufacturer: &'static str,
    pub appearance: u16,
    pub report_map: &'static [u8],
    /// Vendor ID source, vendor ID, product ID, product version.
    pub pnp_id: (u8, u16, u16, u16),
    /// bcdHID 1.11, country code, flags.
    pub hid_info: [u8; 4],
    pub conn_interval: (u16, u16),
}

impl HidIdentity {
    pub const fn remote() -> Self {
        Self {
            device_name: config::DEVICE_NAME,
            manufacturer: config::MANUFACTURER,
            appearance: APPEARANCE_KEYBOARD,
            report_map: KEYBOARD_REPORT_DESCRIPTOR,
            pnp_id: (
                config::PNP_VENDOR_ID_SOURCE,
                config::PNP_VENDOR_ID,
                config::PNP_PRODUCT_ID,
                config::PNP_PRODUCT_VERSION,
            ),
            hid_info: [0x11, 0x01, config::HID_COUNTRY_CODE, config::HID_INFO_FLAGS],
            conn_interval: (config::BLE_CONN_INTERVAL_MIN, config::BLE_CONN_INTERVAL_MAX),
        }
    }

    /// PnP ID characteristic value (little-endian fields).
    pub fn pnp_id_bytes(&self) -> [u8; 7] {
        let (source, vendor, product, version) = self.pnp_id;
        let [v0, v1] = vendor.to_le_bytes();
        let [p0, p1] = product.to_le_bytes();
        let [r0, r1] = version.to_le_bytes();
        [source, v0, v1, p0, p1, r0, r1]
    }
}

/// Connection state written by the BLE stack's callbacks and read by the
/// session loop.
pub struct ConnectionFlag(AtomicBool);

impl ConnectionFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn set(&self, connected: bool) {
        self.0.store(connected, Ordering::Release);
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for ConnectionFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// BLE peripheral publishing a HID keyboard.
#[allow(async_fn_in_trait)]
pub trait HidTransport {
    /// Register the HID service described by `identity` and start
    /// advertising as a keyboard.
    async fn start(&mut self, identity: &HidIdentity) -> Result<(), Error>;

    /// Whether a central is currently connected.
    fn is_connected(&self) -> bool;

    /// Failure raised by the stack after [`start`](Self::start) returned,
    /// such as advertising that never came up. Taking it clears it.
    fn take_fault(&self) -> Option<Error> {
        None
    }

    /// Notify one input report. No acknowledgement exists at this layer.
    async fn send_report(&mut self, report: &KeyboardReport) -> Result<(), Error>;

    /// Stop advertising, drop any link and release the service handles.
    async fn stop(&mut self);
}

/// Connectionless 2.4 GHz datagram link addressed by MAC.
#[allow(async_fn_in_trait)]
pub trait PeerLinkTransport {
    /// Bring the link up, tearing down any previous instance first.
    async fn init(&mut self) -> Result<(), Error>;

    /// Report the networks currently in range, in discovery order.
    async fn scan(&mut self) -> Result<ScanResults, Error>;

    /// Make `mac` a valid send destination.
    fn register_peer(&mut self, mac: &MacAddress) -> Result<(), Error>;

    /// Hand a frame to the radio. `Ok` means accepted, not delivered.
    async fn send(&mut self, mac: &MacAddress, frame: &[u8]) -> Result<(), Error>;

    /// Slot the receive callback stages frames into.
    fn inbound(&self) -> &InboundSlot;

    /// Tear the link down and power the radio off.
    async fn shutdown(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pnp_id_is_little_endian() {
        let id = HidIdentity::remote();
        assert_eq!(id.pnp_id_bytes(), [0x02, 0x02, 0xE5, 0x11, 0xA1, 0x10, 0x02]);
    }

    #[test]
    fn remote_identity_is_a_keyboard() {
        let id = HidIdentity::remote();
        assert_eq!(id.appearance, 0x03C1);
        assert_eq!(id.device_name, "AETHER 32");
        assert_eq!(id.hid_info, [0x11, 0x01, 0x00, 0x01]);
        assert_eq!(id.report_map.len(), 65);
    }

    #[test]
    fn connection_flag_round_trips() {
        let flag = ConnectionFlag::new();
        assert!(!flag.get());
        flag.set(true);
        assert!(flag.get());
        flag.set(false);
        assert!(!flag.get());
    }
}
