//! Unit tests for the remote's keyboard reports.

use super::keyboard::{
    KeyUsage, KeyboardReport, INPUT_REPORT_REFERENCE, KEYBOARD_REPORT_DESCRIPTOR,
    KEYBOARD_REPORT_DESCRIPTOR_LEN, KEYBOARD_REPORT_ID,
};
use super::{arrow_for, key_stroke};

#[test]
fn keyboard_report_empty() {
    let report = KeyboardReport::empty();
    assert!(report.is_empty());
    assert_eq!(report.to_bytes(), [0u8; 8]);
}

#[test]
fn press_puts_usage_in_byte_two_only() {
    let bytes = KeyboardReport::press(KeyUsage::ArrowUp).to_bytes();
    assert_eq!(bytes, [0x00, 0x00, 0x52, 0x00, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn usages_match_hid_keyboard_page() {
    assert_eq!(KeyUsage::ArrowUp.code(), 0x52);
    assert_eq!(KeyUsage::ArrowDown.code(), 0x51);
    assert_eq!(KeyUsage::Space.code(), 0x2C);
    assert_eq!(arrow_for(true), KeyUsage::ArrowUp);
    assert_eq!(arrow_for(false), KeyUsage::ArrowDown);
}

#[test]
fn key_stroke_is_press_then_release() {
    let [down, up] = key_stroke(KeyUsage::Space);
    assert_eq!(down.keycodes[0], 0x2C);
    assert!(!down.is_empty());
    assert!(up.is_empty());
    // Same layout, only the key code differs.
    assert_eq!(down.modifier, up.modifier);
    assert_eq!(down.reserved, up.reserved);
}

#[test]
fn keyboard_report_serialize_buffer_too_small() {
    let report = KeyboardReport::press(KeyUsage::Space);
    let mut buf = [0u8; 4];
    assert_eq!(report.serialize(&mut buf), 0);
    assert_eq!(buf, [0u8; 4]);
}

#[test]
fn descriptor_declares_report_id_one_and_closes_collection() {
    assert_eq!(KEYBOARD_REPORT_DESCRIPTOR.len(), KEYBOARD_REPORT_DESCRIPTOR_LEN);
    assert_eq!(&KEYBOARD_REPORT_DESCRIPTOR[..4], &[0x05, 0x01, 0x09, 0x06]);
    assert_eq!(&KEYBOARD_REPORT_DESCRIPTOR[6..8], &[0x85, 0x01]);
    assert_eq!(KEYBOARD_REPORT_DESCRIPTOR[7], KEYBOARD_REPORT_ID);
    assert_eq!(KEYBOARD_REPORT_DESCRIPTOR.last(), Some(&0xC0));
}

#[test]
fn report_reference_points_at_the_declared_input_report() {
    assert_eq!(INPUT_REPORT_REFERENCE, [KEYBOARD_REPORT_ID, 0x01]);
    assert_eq!(KEYBOARD_REPORT_DESCRIPTOR[7], INPUT_REPORT_REFERENCE[0]);
}
