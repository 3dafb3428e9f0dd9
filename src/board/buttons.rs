//! GPIO button levels.
//!
//! Three physical buttons, active-low with internal pull-up. The switches
//! are RC-debounced on the board, so a plain level read per tick is enough.

use aether_remote::input::{ButtonInput, RawButtons};
use embassy_nrf::gpio::{AnyPin, Input, Pull};

pub struct PanelButtons {
    up: Input<'static>,
    down: Input<'static>,
    ok: Input<'static>,
}

impl PanelButtons {
    pub fn new(up: AnyPin, down: AnyPin, ok: AnyPin) -> Self {
        Self {
            up: Input::new(up, Pull::Up),
            down: Input::new(down, Pull::Up),
            ok: Input::new(ok, Pull::Up),
        }
    }
}

impl ButtonInput for PanelButtons {
    fn read(&mut self) -> RawButtons {
        RawButtons {
            up: self.up.is_low(),
            down: self.down.is_low(),
            ok: self.ok.is_low(),
        }
    }
}
