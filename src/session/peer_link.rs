//! Peer-link remote: find a peer on the 2.4 GHz link and drive its four
//! switches.
//!
//! ```text
//! Scan ──(no peers, Ok)──→ Exited
//!  └─→ Select ──(Ok)──→ Connecting ──(sent)──→ Connected
//!        ↑                  └──(refused)──→ Failed ─┐
//!        └──────────────────────────────────────────┘
//! Select / Connected ──(Ok held ≥ 900 ms)──→ Exited
//! ```
//!
//! The link has no delivery confirmation: "connected" means the radio
//! accepted the probe frame, and toggles are last-writer-wins.

use super::transport::{PeerLinkTransport, ScanResults};
use super::{Clock, ExitReason, Panel, Session};
use crate::config;
use crate::error::Error;
use crate::input::navigation::navigate;
use crate::input::ButtonInput;
use crate::peer::{collect_peers, MacAddress, PeerList, SwitchPayload};
use crate::ui::{Buzzer, DisplaySink, View};

/// Where the peer-link session currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeerState {
    Scan,
    Select,
    Connecting,
    Connected,
    Failed,
    Exited,
}

/// The states [`PeerLinkSession::drive`] moves between. Leaving is a
/// [`Step::Exit`], never a phase.
#[derive(Clone, Copy)]
enum Phase {
    Scan,
    Select,
    Connecting,
    Connected,
    Failed,
}

impl From<Phase> for PeerState {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Scan => PeerState::Scan,
            Phase::Select => PeerState::Select,
            Phase::Connecting => PeerState::Connecting,
            Phase::Connected => PeerState::Connected,
            Phase::Failed => PeerState::Failed,
        }
    }
}

enum Step {
    Go(Phase),
    Exit(ExitReason),
}

const SELECT_TITLE: &str = "Select Device (OK:Connect)";

/// Peer-link session over a [`PeerLinkTransport`].
pub struct PeerLinkSession<T> {
    transport: T,
    state: PeerState,
    peers: PeerList,
    selected: usize,
    payload: SwitchPayload,
    focused: usize,
}

impl<T: PeerLinkTransport> PeerLinkSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: PeerState::Scan,
            peers: PeerList::new(),
            selected: 0,
            payload: SwitchPayload::zeroed(),
            focused: 0,
        }
    }

    pub fn state(&self) -> PeerState {
        self.state
    }

    pub fn peers(&self) -> &PeerList {
        &self.peers
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn payload(&self) -> SwitchPayload {
        self.payload
    }

    pub fn focused(&self) -> usize {
        self.focused
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn enter(&mut self, next: PeerState) {
        info!("peer: {} -> {}", self.state, next);
        self.state = next;
    }

    fn selected_mac(&self) -> Option<MacAddress> {
        self.peers.get(self.selected).map(|p| p.mac)
    }

    /// Adopt the newest frame staged by the receive callback, if any.
    fn drain_inbound(&mut self) {
        if let Some(payload) = self.transport.inbound().take() {
            debug!("peer: remote state {}", payload.switches);
            self.payload = payload;
        }
    }

    async fn drive<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>) -> ExitReason
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        let mut phase = Phase::Scan;
        loop {
            let step = match phase {
                Phase::Scan => self.scan(panel).await,
                Phase::Select => self.select(panel).await,
                Phase::Connecting => self.connect(panel).await,
                Phase::Failed => {
                    panel.notice("Conn. Failed!", config::NOTICE_FAILED_MS).await;
                    Step::Go(Phase::Select)
                }
                Phase::Connected => self.connected(panel).await,
            };
            match step {
                Step::Go(next) => {
                    phase = next;
                    self.enter(next.into());
                }
                Step::Exit(reason) => return reason,
            }
        }
    }

    async fn scan<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>) -> Step
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        panel.notice("Scanning...", config::NOTICE_SCANNING_MS).await;
        let records = match self.transport.scan().await {
            Ok(records) => records,
            Err(e) => {
                warn!("peer: scan failed: {}", e);
                ScanResults::new()
            }
        };
        self.peers = collect_peers(&records);
        info!("peer: {} of {} networks are peers", self.peers.len(), records.len());

        if self.peers.is_empty() {
            panel.notice("No Peers Found!", config::NOTICE_NO_PEERS_MS).await;
            panel.notice("Press OK: Exit", config::NOTICE_EXIT_HINT_MS).await;
            wait_for_ok_release(panel).await;
            return Step::Exit(ExitReason::NoPeers);
        }

        self.selected = 0;
        Step::Go(Phase::Select)
    }

    async fn select<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>) -> Step
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        loop {
            self.drain_inbound();
            let buttons = panel.sample();
            let now = panel.now();

            if let Some(next) = navigate(self.selected, self.peers.len(), &buttons) {
                self.selected = next;
                panel.beep(config::TONE_NAVIGATE);
            }
            panel.show(&View::PeerList {
                title: SELECT_TITLE,
                peers: &self.peers,
                selected: self.selected,
            });

            if buttons.ok.edge() {
                return Step::Go(Phase::Connecting);
            }
            if buttons.ok.held_at_least(now, config::PEER_EXIT_HOLD_MS) {
                return Step::Exit(ExitReason::LongPress);
            }
            panel.sleep(config::PEER_TICK_MS).await;
        }
    }

    async fn connect<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>) -> Step
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        panel.notice("Connecting...", config::NOTICE_CONNECTING_MS).await;
        let Some(mac) = self.selected_mac() else {
            return Step::Go(Phase::Select);
        };

        let probe = SwitchPayload::zeroed().to_frame();
        let result = match self.transport.register_peer(&mac) {
            Ok(()) => self.transport.send(&mac, &probe).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                if let Some(peer) = self.peers.get_mut(self.selected) {
                    peer.online = true;
                }
                panel.notice("Connected!", config::NOTICE_CONNECTED_MS).await;
                Step::Go(Phase::Connected)
            }
            Err(e) => {
                warn!("peer: probe to {} refused: {}", mac, e);
                Step::Go(Phase::Failed)
            }
        }
    }

    async fn connected<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>) -> Step
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        let Some(mac) = self.selected_mac() else {
            return Step::Go(Phase::Select);
        };

        loop {
            self.drain_inbound();
            let buttons = panel.sample();
            let now = panel.now();

            if buttons.ok.edge() {
                self.toggle_focused(panel, &mac).await;
            }
            if let Some(next) = navigate(self.focused, config::SWITCH_COUNT, &buttons) {
                self.focused = next;
                panel.beep(config::TONE_NAVIGATE);
            }
            if buttons.ok.held_at_least(now, config::PEER_EXIT_HOLD_MS) {
                return Step::Exit(ExitReason::LongPress);
            }

            let title = self
                .peers
                .get(self.selected)
                .map(|p| p.ssid.as_str())
                .unwrap_or_default();
            panel.show(&View::SwitchGrid {
                title,
                switches: &self.payload.switches,
                focused: self.focused,
            });
            panel.sleep(config::PEER_TICK_MS).await;
        }
    }

    /// Flip the focused switch and push the whole payload to the peer.
    ///
    /// If the radio refuses the frame the flip is undone, so the local copy
    /// keeps matching what the peer last accepted.
    async fn toggle_focused<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>, mac: &MacAddress)
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        self.payload.toggle(self.focused);
        let frame = self.payload.to_frame();
        match self.transport.send(mac, &frame).await {
            Ok(()) => panel.beep(config::TONE_TOGGLE),
            Err(e) => {
                warn!("peer: toggle send failed: {}", e);
                self.payload.toggle(self.focused);
                panel.notice("Send Failed!", config::NOTICE_FAILED_MS).await;
            }
        }
    }

    async fn teardown<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>)
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        self.transport.shutdown().await;
        panel.buttons.reset();
        self.enter(PeerState::Exited);
    }
}

/// Block until Ok is pressed and let go again. Up and Down are ignored.
async fn wait_for_ok_release<B, D, Z, C>(panel: &mut Panel<B, D, Z, C>)
where
    B: ButtonInput,
    D: DisplaySink,
    Z: Buzzer,
    C: Clock,
{
    loop {
        if panel.sample().ok.edge() {
            break;
        }
        panel.sleep(config::PEER_EMPTY_WAIT_TICK_MS).await;
    }
    while panel.sample().ok.current {
        panel.sleep(config::PEER_EMPTY_WAIT_TICK_MS).await;
    }
}

impl<T: PeerLinkTransport> Session for PeerLinkSession<T> {
    fn title(&self) -> &'static str {
        "Peer Remote"
    }

    async fn run<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>) -> Result<ExitReason, Error>
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        self.state = PeerState::Scan;
        self.peers.clear();
        self.selected = 0;
        self.payload = SwitchPayload::zeroed();
        self.focused = 0;
        panel.buttons.resync();

        if let Err(e) = self.transport.init().await {
            error!("peer: link bring-up failed: {}", e);
            panel.notice(e.message(), config::ERROR_SCREEN_MS).await;
            self.teardown(panel).await;
            return Err(e);
        }
        self.transport.inbound().clear();

        let reason = self.drive(panel).await;

        self.teardown(panel).await;
        if let Some(tone) = reason.tone() {
            panel.beep(tone);
        }
        info!("peer: exited ({})", reason);
        Ok(reason)
    }
}
