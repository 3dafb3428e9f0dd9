//! Peer-link data model: discovered peers, the switch payload and the
//! inbound frame hand-off between the radio callback and the tick loop.

pub mod adv;
pub mod inbound;

use crate::config::{PEER_CAPACITY, PEER_NAME_FILTERS, PEER_NAME_LEN, SWITCH_COUNT};
use heapless::{String, Vec};

pub use inbound::InboundSlot;

/// Display name of a peer, truncated to [`PEER_NAME_LEN`] bytes.
pub type PeerName = String<PEER_NAME_LEN>;

/// Peers kept from one scan, in scan order.
pub type PeerList = Vec<Peer, PEER_CAPACITY>;

/// 6-byte link-layer address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const fn bytes(&self) -> [u8; 6] {
        self.0
    }
}

/// One network reported by the transport's scan.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanRecord {
    pub bssid: MacAddress,
    pub ssid: PeerName,
    pub rssi: i8,
}

impl ScanRecord {
    pub fn new(bssid: MacAddress, ssid: &str, rssi: i8) -> Self {
        Self {
            bssid,
            ssid: truncate_name(ssid),
            rssi,
        }
    }
}

/// A selectable remote peer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Peer {
    pub mac: MacAddress,
    pub ssid: PeerName,
    pub rssi: i8,
    /// Set once a probe to this peer has been accepted by the transport.
    pub online: bool,
}

impl From<&ScanRecord> for Peer {
    fn from(record: &ScanRecord) -> Self {
        Self {
            mac: record.bssid,
            ssid: record.ssid.clone(),
            rssi: record.rssi,
            online: false,
        }
    }
}

/// Copy `name` into a [`PeerName`], dropping whatever does not fit.
pub fn truncate_name(name: &str) -> PeerName {
    let mut out = PeerName::new();
    for c in name.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Whether a scanned name belongs to a peer-link device.
pub fn is_peer_name(name: &str) -> bool {
    PEER_NAME_FILTERS.iter().any(|prefix| name.contains(prefix))
}

/// Keep the first [`PEER_CAPACITY`] matching records, in scan order.
///
/// Names are not deduplicated and the list is not re-sorted by signal.
pub fn collect_peers<'a, I>(records: I) -> PeerList
where
    I: IntoIterator<Item = &'a ScanRecord>,
{
    let mut peers = PeerList::new();
    for record in records {
        if !is_peer_name(&record.ssid) {
            continue;
        }
        if peers.push(Peer::from(record)).is_err() {
            break;
        }
    }
    peers
}

/// Wire size of a switch frame: one byte per switch, no header.
pub const SWITCH_FRAME_SIZE: usize = SWITCH_COUNT;

/// Last-known and desired state of the four remote switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchPayload {
    pub switches: [bool; SWITCH_COUNT],
}

impl SwitchPayload {
    /// All switches off; also the connect probe frame.
    pub const fn zeroed() -> Self {
        Self {
            switches: [false; SWITCH_COUNT],
        }
    }

    pub const fn new(switches: [bool; SWITCH_COUNT]) -> Self {
        Self { switches }
    }

    /// Flip one switch. Out-of-range indices are ignored.
    pub fn toggle(&mut self, index: usize) {
        if let Some(s) = self.switches.get_mut(index) {
            *s = !*s;
        }
    }

    pub fn to_frame(&self) -> [u8; SWITCH_FRAME_SIZE] {
        self.switches.map(u8::from)
    }

    /// Decode a received frame. Anything but exactly
    /// [`SWITCH_FRAME_SIZE`] bytes is rejected.
    pub fn from_frame(data: &[u8]) -> Option<Self> {
        let bytes: [u8; SWITCH_FRAME_SIZE] = data.try_into().ok()?;
        Some(Self {
            switches: bytes.map(|b| b != 0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ScanRecord {
        ScanRecord::new(MacAddress([1, 2, 3, 4, 5, 6]), name, -60)
    }

    #[test]
    fn filter_keeps_matching_names_in_scan_order() {
        let scan = [record("ESP32-A"), record("Other"), record("ESPNOW-B")];
        let peers = collect_peers(&scan);
        let names: std::vec::Vec<&str> = peers.iter().map(|p| p.ssid.as_str()).collect();
        assert_eq!(names, ["ESP32-A", "ESPNOW-B"]);
        assert!(peers.iter().all(|p| !p.online));
    }

    #[test]
    fn filter_matches_anywhere_in_name() {
        assert!(is_peer_name("Lamp-ESP32"));
        assert!(is_peer_name("my_ESPNOW_node"));
        assert!(!is_peer_name("esp32"));
        assert!(!is_peer_name(""));
    }

    #[test]
    fn filter_caps_at_capacity_and_keeps_duplicates() {
        let scan: std::vec::Vec<ScanRecord> = (0..12).map(|_| record("ESP32-Same")).collect();
        let peers = collect_peers(&scan);
        assert_eq!(peers.len(), PEER_CAPACITY);
        assert!(peers.iter().all(|p| p.ssid == "ESP32-Same"));
    }

    #[test]
    fn long_names_are_truncated() {
        let long = "ESP32-".repeat(8);
        let r = record(&long);
        assert_eq!(r.ssid.len(), PEER_NAME_LEN);
        assert!(r.ssid.starts_with("ESP32-"));
    }

    #[test]
    fn payload_frame_is_one_byte_per_switch() {
        let p = SwitchPayload::new([false, true, false, true]);
        assert_eq!(p.to_frame(), [0, 1, 0, 1]);
        assert_eq!(SwitchPayload::zeroed().to_frame(), [0; 4]);
    }

    #[test]
    fn payload_rejects_wrong_frame_sizes() {
        assert_eq!(SwitchPayload::from_frame(&[]), None);
        assert_eq!(SwitchPayload::from_frame(&[1, 1, 1]), None);
        assert_eq!(SwitchPayload::from_frame(&[1, 1, 1, 1, 1]), None);
        assert_eq!(
            SwitchPayload::from_frame(&[0, 2, 0, 1]),
            Some(SwitchPayload::new([false, true, false, true]))
        );
    }

    #[test]
    fn toggle_flips_only_target_switch() {
        let mut p = SwitchPayload::zeroed();
        p.toggle(1);
        assert_eq!(p.switches, [false, true, false, false]);
        p.toggle(1);
        assert_eq!(p, SwitchPayload::zeroed());
        p.toggle(9);
        assert_eq!(p, SwitchPayload::zeroed());
    }
}
