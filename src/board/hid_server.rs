//! BLE HID keyboard on the S140 SoftDevice (Peripheral role).
//!
//! The GATT table is registered once at boot; SoftDevice services cannot
//! be removed again. A session "starts" the keyboard by filling in the
//! characteristic values and waking [`hid_link_task`], which advertises,
//! serves one central, and goes back to sleep when the session stops it.
//!
//! The task is the only writer of [`CONNECTED`]; the session loop only
//! reads it.

use core::cell::RefCell;

use aether_remote::error::Error;
use aether_remote::hid::keyboard::{INPUT_REPORT_REFERENCE, KEYBOARD_REPORT_DESCRIPTOR_LEN, KEYBOARD_REPORT_SIZE};
use aether_remote::hid::KeyboardReport;
use aether_remote::session::{ConnectionFlag, HidIdentity, HidTransport};
use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;
use heapless::Vec;
use nrf_softdevice::ble::advertisement_builder::{
    AdvertisementDataType, Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload,
    ServiceList, ServiceUuid16,
};
use nrf_softdevice::ble::{gatt_server, peripheral, Connection};
use nrf_softdevice::{raw, Softdevice};

/// Supervision timeout requested from the central (10 ms units).
const CONN_SUP_TIMEOUT: u16 = 400;

/// Advertising interval (0.625 ms units).
const ADV_INTERVAL: u32 = 50;

/// Device Information service (0x180A).
#[nrf_softdevice::gatt_service(uuid = "180a")]
pub struct DeviceInformationService {
    #[characteristic(uuid = "2a29", read)]
    pub manufacturer_name: Vec<u8, 16>,

    #[characteristic(uuid = "2a50", read)]
    pub pnp_id: [u8; 7],
}

/// HID service (0x1812) with a single boot-keyboard input report.
#[nrf_softdevice::gatt_service(uuid = "1812")]
pub struct HidService {
    #[characteristic(uuid = "2a4a", read)]
    pub hid_info: [u8; 4],

    #[characteristic(uuid = "2a4b", read)]
    pub report_map: [u8; KEYBOARD_REPORT_DESCRIPTOR_LEN],

    #[characteristic(uuid = "2a4c", write_without_response)]
    pub hid_control: u8,

    /// 0 = Boot Protocol, 1 = Report Protocol.
    #[characteristic(uuid = "2a4e", read, write_without_response)]
    pub protocol_mode: u8,

    #[characteristic(uuid = "2a4d", read, notify)]
    #[descriptor(uuid = "2908", value = "INPUT_REPORT_REFERENCE")]
    pub input_report: [u8; KEYBOARD_REPORT_SIZE],
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub dis: DeviceInformationService,
    pub hid: HidService,
}

static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .services_16(ServiceList::Complete, &[ServiceUuid16::HUMAN_INTERFACE_DEVICE])
    .raw(AdvertisementDataType::APPEARANCE, &[0xC1, 0x03])
    .build();

static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .full_name(aether_remote::config::DEVICE_NAME)
    .build();

static CONNECTED: ConnectionFlag = ConnectionFlag::new();
static CONNECTION: Mutex<CriticalSectionRawMutex, RefCell<Option<Connection>>> =
    Mutex::new(RefCell::new(None));
static START: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static STOP: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static ADV_FAULT: Signal<CriticalSectionRawMutex, Error> = Signal::new();

/// [`HidTransport`] handle used by the BLE-HID session.
pub struct BleHid {
    server: &'static Server,
}

impl BleHid {
    pub fn new(server: &'static Server) -> Self {
        Self { server }
    }

    fn publish(&self, identity: &HidIdentity) -> Result<(), Error> {
        let manufacturer =
            Vec::from_slice(identity.manufacturer.as_bytes()).map_err(|_| Error::TransportInit)?;
        let report_map: [u8; KEYBOARD_REPORT_DESCRIPTOR_LEN] =
            identity.report_map.try_into().map_err(|_| Error::TransportInit)?;

        let dis = &self.server.dis;
        let hid = &self.server.hid;
        dis.manufacturer_name_set(&manufacturer).map_err(|_| Error::TransportInit)?;
        dis.pnp_id_set(&identity.pnp_id_bytes()).map_err(|_| Error::TransportInit)?;
        hid.hid_info_set(&identity.hid_info).map_err(|_| Error::TransportInit)?;
        hid.report_map_set(&report_map).map_err(|_| Error::TransportInit)?;
        hid.protocol_mode_set(&1).map_err(|_| Error::TransportInit)?;
        hid.input_report_set(&KeyboardReport::empty().to_bytes())
            .map_err(|_| Error::TransportInit)?;

        let (min, max) = identity.conn_interval;
        let ppcp = raw::ble_gap_conn_params_t {
            min_conn_interval: min,
            max_conn_interval: max,
            slave_latency: 0,
            conn_sup_timeout: CONN_SUP_TIMEOUT,
        };
        // SAFETY: plain SoftDevice calls with stack-owned arguments.
        let ret = unsafe { raw::sd_ble_gap_ppcp_set(&ppcp) };
        if ret != raw::NRF_SUCCESS {
            warn!("hid: ppcp_set failed ({})", ret);
            return Err(Error::TransportInit);
        }
        let ret = unsafe { raw::sd_ble_gap_appearance_set(identity.appearance) };
        if ret != raw::NRF_SUCCESS {
            warn!("hid: appearance_set failed ({})", ret);
            return Err(Error::TransportInit);
        }
        Ok(())
    }
}

impl HidTransport for BleHid {
    async fn start(&mut self, identity: &HidIdentity) -> Result<(), Error> {
        self.publish(identity)?;
        STOP.reset();
        ADV_FAULT.reset();
        START.signal(());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        CONNECTED.get()
    }

    fn take_fault(&self) -> Option<Error> {
        ADV_FAULT.try_take()
    }

    async fn send_report(&mut self, report: &KeyboardReport) -> Result<(), Error> {
        let conn = CONNECTION
            .lock(|c| c.borrow().clone())
            .ok_or(Error::NotConnected)?;
        self.server
            .hid
            .input_report_notify(&conn, &report.to_bytes())
            .map_err(|_| Error::Send)
    }

    async fn stop(&mut self) {
        START.reset();
        STOP.signal(());
        while CONNECTED.get() {
            Timer::after_millis(5).await;
        }
        info!("hid: stopped");
    }
}

/// Advertise and serve one central per session.
#[embassy_executor::task]
pub async fn hid_link_task(sd: &'static Softdevice, server: &'static Server) -> ! {
    let config = peripheral::Config {
        interval: ADV_INTERVAL,
        ..Default::default()
    };

    loop {
        START.wait().await;
        info!("hid: advertising");

        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &ADV_DATA,
            scan_data: &SCAN_DATA,
        };
        let conn = match select(peripheral::advertise_connectable(sd, adv, &config), STOP.wait()).await {
            Either::First(Ok(conn)) => conn,
            Either::First(Err(e)) => {
                warn!("hid: advertising failed: {:?}", e);
                ADV_FAULT.signal(Error::Advertise);
                continue;
            }
            Either::Second(()) => {
                info!("hid: advertising stopped");
                continue;
            }
        };

        info!("hid: central connected");
        CONNECTION.lock(|c| c.replace(Some(conn.clone())));
        CONNECTED.set(true);

        let serve = gatt_server::run(&conn, server, |event| match event {
            ServerEvent::Hid(HidServiceEvent::InputReportCccdWrite { notifications }) => {
                debug!("hid: notifications {}", notifications);
            }
            ServerEvent::Hid(HidServiceEvent::ProtocolModeWrite(mode)) => {
                debug!("hid: protocol mode {}", mode);
            }
            ServerEvent::Hid(HidServiceEvent::HidControlWrite(op)) => {
                debug!("hid: control point {}", op);
            }
            _ => {}
        });
        match select(serve, STOP.wait()).await {
            Either::First(_) => info!("hid: central disconnected"),
            Either::Second(()) => {
                if conn.disconnect().is_err() {
                    warn!("hid: disconnect failed");
                }
            }
        }

        CONNECTION.lock(|c| c.replace(None));
        CONNECTED.set(false);
    }
}
