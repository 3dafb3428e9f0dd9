//! Aether remote firmware - nRF52840 + SoftDevice S140.
//!
//! Boots the SoftDevice, registers the HID GATT table, spawns the radio and
//! buzzer tasks, then hands the front panel to the session menu forever.
//!
//! Build: `cargo build --release --features embedded --target thumbv7em-none-eabihf`

#![no_std]
#![no_main]

mod board;

use core::mem;

use aether_remote::config;
use aether_remote::session::Panel;
use aether_remote::ui::display::OledSink;
use aether_remote::SessionSelector;
use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_nrf::gpio::Pin;
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::pwm::SimplePwm;
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use nrf_softdevice::{raw, Softdevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use board::buttons::PanelButtons;
use board::buzzer::{buzzer_task, PwmBuzzer};
use board::clock::EmbassyClock;
use board::hid_server::{hid_link_task, BleHid, Server};
use board::peer_radio::{peer_rx_task, PeerRadio};

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

static SERVER: StaticCell<Server> = StaticCell::new();

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 64 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: config::DEVICE_NAME.as_ptr() as _,
            current_len: config::DEVICE_NAME.len() as u16,
            max_len: config::DEVICE_NAME.len() as u16,
            // SAFETY: all-zero is "no access" for the write permission.
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("aether-remote starting");

    // SoftDevice reserves interrupt priorities 0, 1 and 4.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(nrf_config);
    interrupt::SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0.set_priority(Priority::P3);

    let sd = Softdevice::enable(&softdevice_config());
    let server = SERVER.init(unwrap!(Server::new(sd)));
    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(hid_link_task(sd, server)));
    unwrap!(spawner.spawn(peer_rx_task(sd)));

    let pwm = SimplePwm::new_1ch(p.PWM0, p.P0_13);
    unwrap!(spawner.spawn(buzzer_task(pwm)));

    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let display = OledSink::new(board::display::init(i2c));

    let buttons = PanelButtons::new(p.P0_11.degrade(), p.P0_12.degrade(), p.P0_24.degrade());
    let mut panel = Panel::new(buttons, display, PwmBuzzer, EmbassyClock);
    let mut selector = SessionSelector::new(BleHid::new(server), PeerRadio::new(sd));

    info!("aether-remote ready");
    loop {
        match selector.run_once(&mut panel).await {
            Ok(reason) => info!("session ended: {}", reason),
            Err(e) => warn!("session aborted: {}", e),
        }
    }
}
