use aether_remote::session::Clock;
use embassy_time::{Instant, Timer};

/// Session clock backed by the RTC1 time driver.
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    async fn sleep_ms(&mut self, ms: u64) {
        Timer::after_millis(ms).await;
    }
}
