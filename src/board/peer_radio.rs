//! Peer link over connectionless BLE advertising.
//!
//! - **Discovery**: an active scan collects named advertisers; the session
//!   filters them by name.
//! - **Send**: a short burst of non-connectable adverts carrying the frame
//!   as manufacturer data addressed to the peer's MAC.
//! - **Receive**: [`peer_rx_task`] scans passively while the link is up
//!   and stages frames addressed to us in [`INBOUND`].
//!
//! Like the radio it replaces, the link has no acknowledgement: a send
//! succeeds once the advertising burst went out.
//!
//! Shutting the link down stops every scan and advert it started. The
//! SoftDevice itself stays enabled because the BLE keyboard shares it.

use core::sync::atomic::{AtomicBool, Ordering};

use aether_remote::config;
use aether_remote::error::Error;
use aether_remote::peer::adv::{decode_frame, encode_frame, extract_device_name, ADV_DATA_MAX};
use aether_remote::peer::{InboundSlot, MacAddress, ScanRecord};
use aether_remote::session::{PeerLinkTransport, ScanResults};
use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;
use heapless::Vec;
use nrf_softdevice::ble::{central, get_address, peripheral, ScanError};
use nrf_softdevice::Softdevice;

/// Discovery window (10 ms units).
const DISCOVERY_TIMEOUT: u16 = 300;

/// Adverts per frame burst.
const SEND_BURST: u8 = 3;

/// Interval between adverts of a burst (0.625 ms units).
const SEND_INTERVAL: u32 = 32;

static INBOUND: InboundSlot = InboundSlot::new();
static RX_RUN: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static RX_HALT: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static RX_ACTIVE: AtomicBool = AtomicBool::new(false);

/// [`PeerLinkTransport`] handle used by the peer-link session.
pub struct PeerRadio {
    sd: &'static Softdevice,
    peers: Vec<MacAddress, { config::PEER_CAPACITY }>,
    up: bool,
}

impl PeerRadio {
    pub fn new(sd: &'static Softdevice) -> Self {
        Self {
            sd,
            peers: Vec::new(),
            up: false,
        }
    }

    /// Stop the receive scan and wait until the scanner is free.
    async fn halt_rx(&self) {
        RX_RUN.reset();
        RX_HALT.signal(());
        while RX_ACTIVE.load(Ordering::Acquire) {
            Timer::after_millis(2).await;
        }
    }

    fn resume_rx(&self) {
        RX_HALT.reset();
        RX_RUN.signal(());
    }
}

impl PeerLinkTransport for PeerRadio {
    async fn init(&mut self) -> Result<(), Error> {
        if self.up {
            self.shutdown().await;
        }
        self.peers.clear();
        INBOUND.clear();
        self.up = true;
        self.resume_rx();
        info!("peer-link: up as {}", MacAddress(get_address(self.sd).bytes()));
        Ok(())
    }

    async fn scan(&mut self) -> Result<ScanResults, Error> {
        self.halt_rx().await;

        let config = central::ScanConfig {
            active: true,
            timeout: DISCOVERY_TIMEOUT,
            ..Default::default()
        };
        let mut found = ScanResults::new();
        let result = central::scan(self.sd, &config, |params| {
            // SAFETY: the SoftDevice keeps the report buffer alive for the
            // duration of the callback.
            let data =
                unsafe { core::slice::from_raw_parts(params.data.p_data, params.data.len as usize) };
            let Some(name) = extract_device_name(data) else {
                return None;
            };
            let mac = MacAddress(params.peer_addr.addr);
            if found.iter().any(|r| r.bssid == mac) {
                return None;
            }
            if found.push(ScanRecord::new(mac, &name, params.rssi)).is_err() {
                return Some(());
            }
            None
        })
        .await;

        self.resume_rx();
        match result {
            Ok(()) | Err(ScanError::Timeout) => {
                info!("peer-link: scan saw {} named advertisers", found.len());
                Ok(found)
            }
            Err(e) => {
                warn!("peer-link: scan failed: {:?}", e);
                Err(Error::Scan)
            }
        }
    }

    fn register_peer(&mut self, mac: &MacAddress) -> Result<(), Error> {
        if self.peers.contains(mac) {
            return Ok(());
        }
        self.peers.push(*mac).map_err(|_| Error::PeerRegister)
    }

    async fn send(&mut self, mac: &MacAddress, frame: &[u8]) -> Result<(), Error> {
        if !self.up || !self.peers.contains(mac) {
            return Err(Error::Send);
        }
        let mut buf = [0u8; ADV_DATA_MAX];
        let len = encode_frame(mac, frame, &mut buf).ok_or(Error::Send)?;

        let adv = peripheral::NonconnectableAdvertisement::NonscannableUndirected {
            adv_data: &buf[..len],
        };
        let config = peripheral::Config {
            interval: SEND_INTERVAL,
            max_events: Some(SEND_BURST),
            ..Default::default()
        };
        match peripheral::advertise(self.sd, adv, &config).await {
            Ok(()) | Err(peripheral::AdvertiseError::Timeout) => {
                debug!("peer-link: sent {} bytes to {}", len, mac);
                Ok(())
            }
            Err(e) => {
                warn!("peer-link: send failed: {:?}", e);
                Err(Error::Send)
            }
        }
    }

    fn inbound(&self) -> &InboundSlot {
        &INBOUND
    }

    async fn shutdown(&mut self) {
        self.halt_rx().await;
        self.peers.clear();
        INBOUND.clear();
        self.up = false;
        info!("peer-link: down");
    }
}

/// Passive scan that stages frames addressed to this device.
#[embassy_executor::task]
pub async fn peer_rx_task(sd: &'static Softdevice) -> ! {
    let own = MacAddress(get_address(sd).bytes());
    let config = central::ScanConfig {
        active: false,
        ..Default::default()
    };

    loop {
        RX_RUN.wait().await;
        RX_ACTIVE.store(true, Ordering::Release);

        let listen = central::scan(sd, &config, |params| {
            // SAFETY: see `PeerRadio::scan`.
            let data =
                unsafe { core::slice::from_raw_parts(params.data.p_data, params.data.len as usize) };
            if let Some(frame) = decode_frame(data, &own) {
                INBOUND.offer(frame);
            }
            None::<()>
        });
        match select(listen, RX_HALT.wait()).await {
            Either::First(Err(e)) => warn!("peer-link: receive scan ended: {:?}", e),
            Either::First(Ok(())) | Either::Second(()) => {}
        }

        RX_ACTIVE.store(false, Ordering::Release);
    }
}
