//! BLE-HID remote: a keyboard that only knows Arrow-Up, Arrow-Down and
//! Space.
//!
//! ```text
//! Init → Advertising → Waiting ──(central connects)──→ Control → Exited
//!                         └──(Ok tap)──→ Exited          │
//!                                   (Ok held ≥ 1 s / central gone)
//! ```

use super::transport::{HidIdentity, HidTransport};
use super::{Clock, ExitReason, Panel, Session};
use crate::config;
use crate::error::Error;
use crate::hid::{self, KeyUsage};
use crate::input::ButtonInput;
use crate::ui::{Buzzer, DisplaySink, View};

/// Where the BLE session currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleState {
    Init,
    Advertising,
    Waiting,
    Control,
    Exited,
}

/// BLE-HID session over a [`HidTransport`].
pub struct BleHidSession<T> {
    transport: T,
    state: BleState,
    reached_control: bool,
}

impl<T: HidTransport> BleHidSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: BleState::Init,
            reached_control: false,
        }
    }

    pub fn state(&self) -> BleState {
        self.state
    }

    /// Whether the last run got as far as control mode.
    pub fn reached_control(&self) -> bool {
        self.reached_control
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn enter(&mut self, next: BleState) {
        info!("ble: {} -> {}", self.state, next);
        if next == BleState::Control {
            self.reached_control = true;
        }
        self.state = next;
    }

    async fn drive<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>) -> Result<ExitReason, Error>
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        self.enter(BleState::Waiting);
        if let Some(reason) = self.wait_for_central(panel).await? {
            return Ok(reason);
        }

        info!("ble: central connected");
        panel.beep(config::TONE_BLE_CONNECTED);
        panel.show(&View::BleStatus {
            status: "Connected!",
        });
        if let Some(reason) = self.hold_banner(panel).await {
            return Ok(reason);
        }

        self.enter(BleState::Control);
        Ok(self.control(panel).await)
    }

    /// Poll until a central shows up or the user taps Ok. A stack fault
    /// while advertising ends the session like a failed bring-up.
    async fn wait_for_central<B, D, Z, C>(
        &mut self,
        panel: &mut Panel<B, D, Z, C>,
    ) -> Result<Option<ExitReason>, Error>
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        let mut last_refresh: Option<u64> = None;
        loop {
            let buttons = panel.sample();
            if buttons.ok.edge() {
                info!("ble: cancelled while waiting");
                return Ok(Some(ExitReason::Cancelled));
            }
            if let Some(e) = self.transport.take_fault() {
                return Err(e);
            }
            if self.transport.is_connected() {
                return Ok(None);
            }

            let now = panel.now();
            let due = last_refresh.map_or(true, |t| now.saturating_sub(t) >= config::BLE_WAIT_REFRESH_MS);
            if due {
                panel.show(&View::BleStatus {
                    status: "Waiting...",
                });
                last_refresh = Some(now);
            }
            panel.sleep(config::BLE_WAIT_TICK_MS).await;
        }
    }

    /// Keep the "Connected!" banner up, still sampling and still honouring
    /// a disconnect.
    async fn hold_banner<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>) -> Option<ExitReason>
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        let until = panel.now() + config::BLE_CONNECTED_BANNER_MS;
        while panel.now() < until {
            panel.sample();
            if !self.transport.is_connected() {
                return Some(ExitReason::Disconnected);
            }
            panel.sleep(config::BLE_WAIT_TICK_MS).await;
        }
        None
    }

    async fn control<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>) -> ExitReason
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        panel.show(&View::BleControl);
        loop {
            if !self.transport.is_connected() {
                info!("ble: central disconnected");
                return ExitReason::Disconnected;
            }

            let buttons = panel.sample();
            let now = panel.now();

            for (button, up) in [(buttons.up, true), (buttons.down, false)] {
                if button.edge() {
                    self.send_key(panel, hid::arrow_for(up)).await;
                    panel.beep(config::TONE_ARROW_KEY);
                }
            }
            if buttons.ok.edge() {
                // "Like" is a double tap of Space.
                self.send_key(panel, KeyUsage::Space).await;
                panel.sleep(config::LIKE_GAP_MS).await;
                self.send_key(panel, KeyUsage::Space).await;
                panel.beep(config::TONE_LIKE);
            }

            if buttons.ok.held_at_least(now, config::BLE_EXIT_HOLD_MS) {
                info!("ble: long press, leaving");
                return ExitReason::LongPress;
            }

            panel.show(&View::BleControl);
            panel.sleep(config::BLE_CONTROL_TICK_MS).await;
        }
    }

    /// Key-down, wait, key-up, wait. Fire-and-forget.
    async fn send_key<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>, usage: KeyUsage)
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        debug!("ble: key {}", usage);
        let [press, release] = hid::key_stroke(usage);

        if let Err(e) = self.transport.send_report(&press).await {
            warn!("ble: key-down dropped: {}", e);
        }
        panel.sleep(config::HID_PRESS_MS).await;

        if let Err(e) = self.transport.send_report(&release).await {
            warn!("ble: key-up dropped: {}", e);
        }
        panel.sleep(config::HID_RELEASE_MS).await;
    }

    /// Show `e`, take the transport down and keep the error on screen.
    async fn fail<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>, e: Error) -> Result<ExitReason, Error>
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        panel.show(&View::Message(e.message()));
        panel.beep(config::TONE_INFO);
        self.teardown(panel).await;
        panel.sleep(config::ERROR_SCREEN_MS).await;
        Err(e)
    }

    async fn teardown<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>)
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        self.transport.stop().await;
        panel.buttons.reset();
        self.enter(BleState::Exited);
    }
}

impl<T: HidTransport> Session for BleHidSession<T> {
    fn title(&self) -> &'static str {
        "BLE Remote"
    }

    async fn run<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>) -> Result<ExitReason, Error>
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        self.state = BleState::Init;
        self.reached_control = false;
        panel.buttons.resync();

        info!("ble: starting HID service");
        if let Err(e) = self.transport.start(&HidIdentity::remote()).await {
            error!("ble: bring-up failed: {}", e);
            return self.fail(panel, e).await;
        }
        self.enter(BleState::Advertising);

        let reason = match self.drive(panel).await {
            Ok(reason) => reason,
            Err(e) => {
                error!("ble: link failed while waiting: {}", e);
                return self.fail(panel, e).await;
            }
        };

        self.teardown(panel).await;
        if let Some(tone) = reason.tone() {
            panel.beep(tone);
        }
        info!("ble: exited ({})", reason);
        Ok(reason)
    }
}
