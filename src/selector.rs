//! Top-level session menu.
//!
//! Lists the two remote personalities and runs the chosen one to
//! completion. Sessions never overlap: the selector holds both, but only
//! ever awaits one at a time, so the radio always has a single owner.

use crate::config;
use crate::error::Error;
use crate::input::navigation::navigate;
use crate::input::ButtonInput;
use crate::session::{
    BleHidSession, Clock, ExitReason, HidTransport, Panel, PeerLinkSession, PeerLinkTransport,
    RemoteSession, Session,
};
use crate::ui::{Buzzer, DisplaySink, View};

/// Number of menu entries.
pub const SESSION_COUNT: usize = 2;

/// Menu over the BLE-HID and peer-link sessions.
pub struct SessionSelector<H, P> {
    sessions: [RemoteSession<H, P>; SESSION_COUNT],
    selected: usize,
}

impl<H, P> SessionSelector<H, P>
where
    H: HidTransport,
    P: PeerLinkTransport,
{
    pub fn new(hid: H, link: P) -> Self {
        Self {
            sessions: [
                RemoteSession::BleHid(BleHidSession::new(hid)),
                RemoteSession::PeerLink(PeerLinkSession::new(link)),
            ],
            selected: 0,
        }
    }

    /// Highlighted menu entry.
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn session(&self, index: usize) -> Option<&RemoteSession<H, P>> {
        self.sessions.get(index)
    }

    fn titles(&self) -> [&'static str; SESSION_COUNT] {
        [self.sessions[0].title(), self.sessions[1].title()]
    }

    /// Show the menu until Ok launches an entry, run that session and
    /// return how it ended.
    ///
    /// The cursor stays on the launched entry for the next call.
    pub async fn run_once<B, D, Z, C>(&mut self, panel: &mut Panel<B, D, Z, C>) -> Result<ExitReason, Error>
    where
        B: ButtonInput,
        D: DisplaySink,
        Z: Buzzer,
        C: Clock,
    {
        let titles = self.titles();
        panel.buttons.resync();

        loop {
            let buttons = panel.sample();
            if let Some(next) = navigate(self.selected, SESSION_COUNT, &buttons) {
                self.selected = next;
                panel.beep(config::TONE_NAVIGATE);
            }
            panel.show(&View::Menu {
                entries: &titles,
                selected: self.selected,
            });
            if buttons.ok.edge() {
                break;
            }
            panel.sleep(config::MENU_TICK_MS).await;
        }

        let session = &mut self.sessions[self.selected];
        info!("menu: launching {}", session.title());
        let result = session.run(panel).await;
        match &result {
            Ok(reason) => info!("menu: session ended ({})", reason),
            Err(e) => warn!("menu: session failed ({})", e),
        }

        // The press that ended the session may still be held.
        panel.buttons.resync();
        result
    }
}
