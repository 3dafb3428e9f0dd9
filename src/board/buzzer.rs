//! Piezo buzzer on PWM0.
//!
//! [`PwmBuzzer::beep`] only queues the tone; [`buzzer_task`] plays queued
//! tones one after another. A full queue drops the new tone.

use aether_remote::ui::Buzzer;
use defmt::{debug, warn};
use embassy_nrf::peripherals::PWM0;
use embassy_nrf::pwm::{Prescaler, SimplePwm};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Timer;

const TONE_QUEUE: usize = 4;

/// PWM base clock with `Prescaler::Div16`.
const PWM_CLOCK_HZ: u32 = 1_000_000;

static TONES: Channel<CriticalSectionRawMutex, (u16, u16), TONE_QUEUE> = Channel::new();

/// Handle the sessions beep through.
pub struct PwmBuzzer;

impl Buzzer for PwmBuzzer {
    fn beep(&mut self, freq_hz: u16, duration_ms: u16) {
        if TONES.try_send((freq_hz, duration_ms)).is_err() {
            warn!("buzzer: queue full, dropping {} Hz", freq_hz);
        }
    }
}

#[embassy_executor::task]
pub async fn buzzer_task(mut pwm: SimplePwm<'static, PWM0>) -> ! {
    pwm.set_prescaler(Prescaler::Div16);
    loop {
        let (freq_hz, duration_ms) = TONES.receive().await;
        debug!("buzzer: {} Hz for {} ms", freq_hz, duration_ms);

        let top = (PWM_CLOCK_HZ / u32::from(freq_hz.max(1))).clamp(2, 0x7FFF) as u16;
        pwm.set_max_duty(top);
        pwm.enable();
        pwm.set_duty(0, top / 2);
        Timer::after_millis(u64::from(duration_ms)).await;
        pwm.set_duty(0, 0);
        pwm.disable();
    }
}
