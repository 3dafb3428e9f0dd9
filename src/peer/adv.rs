//! Advertising-data codec for the peer link.
//!
//! On the nRF52840 the peer link rides on BLE advertising: peers announce
//! themselves with a local name, and switch frames travel as
//! manufacturer-specific data addressed to one MAC.
//!
//! ```text
//! [len] [0xFF] [company lo] [company hi] [dest MAC × 6] [frame …]
//! ```

use super::{truncate_name, MacAddress, PeerName};

/// AD type: shortened local name.
const AD_SHORT_NAME: u8 = 0x08;
/// AD type: complete local name.
const AD_COMPLETE_NAME: u8 = 0x09;
/// AD type: manufacturer-specific data.
const AD_MANUFACTURER: u8 = 0xFF;

/// Company identifier reserved for testing by the Bluetooth SIG.
pub const LINK_COMPANY_ID: u16 = 0xFFFF;

/// Largest advertising payload of a legacy advertisement.
pub const ADV_DATA_MAX: usize = 31;

/// Bytes in front of the frame inside the manufacturer AD structure.
const FRAME_HEADER: usize = 2 + 2 + 6;

/// Walk the AD structures of `data`, yielding `(ad_type, value)`.
///
/// Stops at the first zero-length or truncated structure.
fn ad_structures(data: &[u8]) -> impl Iterator<Item = (u8, &[u8])> {
    let mut i = 0;
    core::iter::from_fn(move || {
        let len = *data.get(i)? as usize;
        if len == 0 || i + len >= data.len() {
            return None;
        }
        let ad_type = data[i + 1];
        let value = &data[i + 2..i + 1 + len];
        i += len + 1;
        Some((ad_type, value))
    })
}

/// Complete or shortened local name, if the advertisement carries one.
pub fn extract_device_name(data: &[u8]) -> Option<PeerName> {
    ad_structures(data)
        .find(|&(ad_type, _)| ad_type == AD_SHORT_NAME || ad_type == AD_COMPLETE_NAME)
        .map(|(_, value)| {
            let text = core::str::from_utf8(value).unwrap_or("?");
            truncate_name(text)
        })
}

/// Build the advertising payload carrying `frame` to `dest`.
///
/// Returns the number of bytes written, or `None` if it does not fit in
/// `buf` or in one legacy advertisement.
pub fn encode_frame(dest: &MacAddress, frame: &[u8], buf: &mut [u8]) -> Option<usize> {
    let total = FRAME_HEADER + frame.len();
    if total > ADV_DATA_MAX || total > buf.len() {
        return None;
    }
    let [c0, c1] = LINK_COMPANY_ID.to_le_bytes();
    buf[0] = (total - 1) as u8;
    buf[1] = AD_MANUFACTURER;
    buf[2] = c0;
    buf[3] = c1;
    buf[4..10].copy_from_slice(&dest.bytes());
    buf[FRAME_HEADER..total].copy_from_slice(frame);
    Some(total)
}

/// Frame bytes of an advertisement addressed to `own`, if any.
///
/// The frame length is not checked here.
pub fn decode_frame<'a>(data: &'a [u8], own: &MacAddress) -> Option<&'a [u8]> {
    let company = LINK_COMPANY_ID.to_le_bytes();
    ad_structures(data)
        .filter(|&(ad_type, _)| ad_type == AD_MANUFACTURER)
        .find_map(|(_, value)| {
            let (head, frame) = value.split_at_checked(FRAME_HEADER - 2)?;
            (head[..2] == company && head[2..] == own.bytes()).then_some(frame)
        })
}
