//! Remote sessions.
//!
//! A session owns the CPU from launch until it returns: one cooperative
//! loop that samples the buttons, reacts, redraws and sleeps a fixed tick.
//! Two event sources run outside that loop (connection changes on BLE,
//! received frames on the peer link); they only flip a flag or stage a
//! frame, which the loop picks up on its next tick.
//!
//! Every exit path, including a failed bring-up, tears the transport down
//! and clears the button shadows before returning.

pub mod ble_hid;
pub mod peer_link;
pub mod transport;


use crate::config;
use crate::error::Error;
use crate::input::{ButtonInput, ButtonState, Debouncer};
use crate::ui::{Buzzer, DisplaySink, View};

pub use ble_hid::{BleHidSession, BleState};
pub use peer_link::{PeerLinkSession, PeerState};
pub use transport::{ConnectionFlag, HidIdentity, HidTransport, PeerLinkTransport, ScanResults};

/// Monotonic time and tick pacing.
#[allow(async_fn_in_trait)]
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;

    /// Suspend the session loop for `ms` milliseconds.
    async fn sleep_ms(&mut self, ms: u64);
}

/// Front panel of the handheld: buttons, display, buzzer and time.
pub struct Panel<B, D, Z, C> {
    pub buttons: Debouncer<B>,
    pub display: D,
    pub buzzer: Z,
    pub clock: C,
}

impl<B, D, Z, C> Panel<B, D, Z, C>
where
    B: ButtonInput,
    D: DisplaySink,
    Z: Buzzer,
    C: Clock,
{
    pub fn new(buttons: B, display: D, buzzer: Z, clock: C) -> Self {
        Self {
            buttons: Debouncer::new(buttons),
            display,
            buzzer,
            clock,
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Take this tick's button sample.
    pub fn sample(&mut self) -> ButtonState {
        let now = self.clock.now_ms();
        self.buttons.sample(now)
    }

    /// Present a view. Display trouble is logged, never fatal.
    pub fn show(&mut self, view: &View<'_>) {
        if let Err(e) = self.display.show(view) {
            warn!("display: {}", e);
        }
    }

    pub fn beep(&mut self, (freq_hz, duration_ms): (u16, u16)) {
        self.buzzer.beep(freq_hz, duration_ms);
    }

    pub async fn sleep(&mut self, ms: u64) {
        self.clock.sleep_ms(ms).await;
    }

    /// Centered message with the info chirp, held for `dwell_ms`.
    ///
    /// The buttons keep being sampled while the message is up, so a release
    /// during the dwell ends the running hold and a new press starts a fresh
    /// one. Edges seen here are consumed.
    pub async fn notice(&mut self, message: &str, dwell_ms: u64) {
        self.show(&View::Message(message));
        self.beep(config::TONE_INFO);
        let until = self.now() + dwell_ms;
        let mut now = self.now();
        while now < until {
            self.sample();
            self.sleep(config::NOTICE_TICK_MS.min(until - now)).await;
            now = self.now();
        }
    }
}

/// Why a session returned to the selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExitReason {
    /// Ok tapped while waiting for a central.
    Cancelled,
    /// Ok held past the session's exit threshold.
    LongPress,
    /// The connected central went away.
    Disconnected,
    /// The scan found nothing and the user dismissed the result.
    NoPeers,
}

impl ExitReason {
    /// Confirmation tone played once the session is torn down.
    pub fn tone(&self) -> Option<(u16, u16)> {
        match self {
            ExitReason::Cancelled => Some(config::TONE_CANCEL),
            ExitReason::LongPress => Some(config::TONE_LONG_PRESS_EXIT),
            ExitReason::Disconnected => Some(config::TONE_DISCONNECTED),
            ExitReason::NoPeers => None,
        }
    }
}

/// Uniform entry point the selector drives.
///
/// `Err` means the transport could not be brought up or failed before a
/// link formed; the error has already been shown and the transport is down
/// again.
#[allow(async_fn_in_trait)]
pub trait Session {
    /// Menu label.
    fn title(&self) -> &'static str;

    async fn run<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>) -> Result<ExitReason, Error>
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock;
}

/// One of the two remote personalities.
pub enum RemoteSession<H, P> {
    BleHid(BleHidSession<H>),
    PeerLink(PeerLinkSession<P>),
}

impl<H, P> Session for RemoteSession<H, P>
where
    H: HidTransport,
    P: PeerLinkTransport,
{
    fn title(&self) -> &'static str {
        match self {
            RemoteSession::BleHid(s) => s.title(),
            RemoteSession::PeerLink(s) => s.title(),
        }
    }

    async fn run<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>) -> Result<ExitReason, Error>
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        match self {
            RemoteSession::BleHid(s) => s.run(panel).await,
            RemoteSession::PeerLink(s) => s.run(panel).await,
        }
    }
}
