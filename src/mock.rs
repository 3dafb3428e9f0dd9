//! Host-side stand-ins for the board: a virtual clock, scripted buttons
//! and recording display, buzzer and transports.

use std::cell::{Cell, RefCell};
use std::format;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use crate::error::Error;
use crate::hid::KeyboardReport;
use crate::input::{ButtonId, ButtonInput, RawButtons};
use crate::peer::{InboundSlot, MacAddress, ScanRecord};
use crate::session::{Clock, HidIdentity, HidTransport, Panel, PeerLinkTransport, ScanResults};
use crate::ui::{Buzzer, DisplaySink, View};

/// A run that gets this far in virtual time is stuck in a wait.
const TIME_LIMIT_MS: u64 = 120_000;

pub type Time = Rc<Cell<u64>>;

pub struct MockClock {
    time: Time,
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.time.get()
    }

    async fn sleep_ms(&mut self, ms: u64) {
        let next = self.time.get() + ms;
        assert!(next < TIME_LIMIT_MS, "virtual clock ran past {} ms", TIME_LIMIT_MS);
        self.time.set(next);
    }
}

/// Buttons held during half-open `[from, to)` windows of virtual time.
pub struct ScriptedButtons {
    time: Time,
    presses: Vec<(ButtonId, u64, u64)>,
}

impl ButtonInput for ScriptedButtons {
    fn read(&mut self) -> RawButtons {
        let now = self.time.get();
        let held = |id| {
            self.presses
                .iter()
                .any(|&(b, from, to)| b == id && from <= now && now < to)
        };
        RawButtons {
            up: held(ButtonId::Up),
            down: held(ButtonId::Down),
            ok: held(ButtonId::Ok),
        }
    }
}

/// Keeps a one-line summary of every presented view.
#[derive(Default)]
pub struct RecordingDisplay {
    pub views: Rc<RefCell<Vec<String>>>,
}

impl DisplaySink for RecordingDisplay {
    fn show(&mut self, view: &View<'_>) -> Result<(), Error> {
        let line = match view {
            View::Message(m) => format!("message:{m}"),
            View::BleStatus { status } => format!("ble:{status}"),
            View::BleControl => "ble-control".into(),
            View::Menu { selected, .. } => format!("menu:{selected}"),
            View::PeerList { peers, selected, .. } => format!("peers:{}:{selected}", peers.len()),
            View::SwitchGrid {
                switches, focused, ..
            } => format!("switches:{switches:?}:{focused}"),
        };
        self.views.borrow_mut().push(line);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingBuzzer {
    pub tones: Rc<RefCell<Vec<(u16, u16)>>>,
}

impl Buzzer for RecordingBuzzer {
    fn beep(&mut self, freq_hz: u16, duration_ms: u16) {
        self.tones.borrow_mut().push((freq_hz, duration_ms));
    }
}

pub type TestPanel = Panel<ScriptedButtons, RecordingDisplay, RecordingBuzzer, MockClock>;

/// Handles kept by a test after the panel is handed to a session.
pub struct Probe {
    pub time: Time,
    pub views: Rc<RefCell<Vec<String>>>,
    pub tones: Rc<RefCell<Vec<(u16, u16)>>>,
}

impl Probe {
    pub fn saw(&self, view: &str) -> bool {
        self.views.borrow().iter().any(|v| v == view)
    }

    pub fn last_tone(&self) -> Option<(u16, u16)> {
        self.tones.borrow().last().copied()
    }
}

pub fn panel(presses: &[(ButtonId, u64, u64)]) -> (TestPanel, Probe) {
    panel_at(0, presses)
}

pub fn panel_at(start_ms: u64, presses: &[(ButtonId, u64, u64)]) -> (TestPanel, Probe) {
    let time: Time = Rc::new(Cell::new(start_ms));
    let display = RecordingDisplay::default();
    let buzzer = RecordingBuzzer::default();
    let probe = Probe {
        time: time.clone(),
        views: display.views.clone(),
        tones: buzzer.tones.clone(),
    };
    let buttons = ScriptedButtons {
        time: time.clone(),
        presses: presses.to_vec(),
    };
    let panel = Panel::new(buttons, display, buzzer, MockClock { time });
    (panel, probe)
}

// BLE

#[derive(Default)]
pub struct HidLog {
    pub starts: usize,
    pub stops: usize,
    pub identity: Option<HidIdentity>,
    pub reports: Vec<[u8; 8]>,
}

pub struct MockHid {
    time: Time,
    pub log: Rc<RefCell<HidLog>>,
    /// Central present during `[connect_at, disconnect_at)`.
    pub connect_at: Option<u64>,
    pub disconnect_at: Option<u64>,
    pub fail_start: bool,
    /// Advertising breaks down from this time on.
    pub advertise_fails_at: Option<u64>,
}

impl MockHid {
    pub fn new(probe: &Probe) -> Self {
        Self {
            time: probe.time.clone(),
            log: Rc::default(),
            connect_at: None,
            disconnect_at: None,
            fail_start: false,
            advertise_fails_at: None,
        }
    }
}

impl HidTransport for MockHid {
    async fn start(&mut self, identity: &HidIdentity) -> Result<(), Error> {
        let mut log = self.log.borrow_mut();
        log.starts += 1;
        log.identity = Some(*identity);
        if self.fail_start {
            Err(Error::TransportInit)
        } else {
            Ok(())
        }
    }

    fn is_connected(&self) -> bool {
        let now = self.time.get();
        let after_connect = self.connect_at.is_some_and(|t| now >= t);
        let before_disconnect = self.disconnect_at.map_or(true, |t| now < t);
        after_connect && before_disconnect
    }

    fn take_fault(&self) -> Option<Error> {
        let now = self.time.get();
        self.advertise_fails_at
            .filter(|&t| now >= t)
            .map(|_| Error::Advertise)
    }

    async fn send_report(&mut self, report: &KeyboardReport) -> Result<(), Error> {
        self.log.borrow_mut().reports.push(report.to_bytes());
        Ok(())
    }

    async fn stop(&mut self) {
        self.log.borrow_mut().stops += 1;
    }
}

// Peer link

#[derive(Default)]
pub struct PeerLog {
    pub inits: usize,
    pub scans: usize,
    pub shutdowns: usize,
    pub registered: Vec<MacAddress>,
    /// Every send attempt, accepted or not.
    pub sends: Vec<(MacAddress, Vec<u8>)>,
}

pub struct MockPeerLink {
    time: Time,
    pub log: Rc<RefCell<PeerLog>>,
    pub records: Vec<ScanRecord>,
    pub fail_init: bool,
    /// Number of upcoming sends to refuse.
    pub refuse_sends: usize,
    /// Frames "received" by the radio at a given time.
    pub frames: RefCell<Vec<(u64, Vec<u8>)>>,
    slot: InboundSlot,
}

impl MockPeerLink {
    pub fn new(probe: &Probe, names: &[&str]) -> Self {
        let records = names
            .iter()
            .enumerate()
            .map(|(i, name)| ScanRecord::new(mac(i as u8 + 1), name, -40 - i as i8))
            .collect();
        Self {
            time: probe.time.clone(),
            log: Rc::default(),
            records,
            fail_init: false,
            refuse_sends: 0,
            frames: RefCell::new(Vec::new()),
            slot: InboundSlot::new(),
        }
    }
}

pub fn mac(n: u8) -> MacAddress {
    MacAddress([0x24, 0x6F, 0x28, 0, 0, n])
}

impl PeerLinkTransport for MockPeerLink {
    async fn init(&mut self) -> Result<(), Error> {
        self.log.borrow_mut().inits += 1;
        if self.fail_init {
            Err(Error::TransportInit)
        } else {
            Ok(())
        }
    }

    async fn scan(&mut self) -> Result<ScanResults, Error> {
        self.log.borrow_mut().scans += 1;
        let mut out = ScanResults::new();
        for r in &self.records {
            let _ = out.push(r.clone());
        }
        Ok(out)
    }

    fn register_peer(&mut self, mac: &MacAddress) -> Result<(), Error> {
        self.log.borrow_mut().registered.push(*mac);
        Ok(())
    }

    async fn send(&mut self, mac: &MacAddress, frame: &[u8]) -> Result<(), Error> {
        self.log.borrow_mut().sends.push((*mac, frame.to_vec()));
        if self.refuse_sends > 0 {
            self.refuse_sends -= 1;
            return Err(Error::Send);
        }
        Ok(())
    }

    fn inbound(&self) -> &InboundSlot {
        // Play the receive callback for every frame that is due.
        let now = self.time.get();
        self.frames.borrow_mut().retain(|(at, data)| {
            if *at <= now {
                self.slot.offer(data);
                false
            } else {
                true
            }
        });
        &self.slot
    }

    async fn shutdown(&mut self) {
        self.log.borrow_mut().shutdowns += 1;
    }
}
