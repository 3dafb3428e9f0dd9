//! Three-button input surface.
//!
//! Buttons (active-low with internal pull-up on the board):
//!   - UP   - previous item / "Arrow-Up"
//!   - DOWN - next item / "Arrow-Down"
//!   - OK   - confirm, toggle, "like"; hold to leave a session
//!
//! The raw reader is assumed to be debounced already. [`Debouncer`] only
//! turns consecutive samples into edges and hold durations, so it must be
//! sampled once per tick, including while a session is just waiting.

pub mod navigation;

/// One raw read of the three buttons (`true` = pressed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawButtons {
    pub up: bool,
    pub down: bool,
    pub ok: bool,
}

/// Source of raw button levels.
pub trait ButtonInput {
    /// Refresh and return the current levels of all three buttons.
    fn read(&mut self) -> RawButtons;
}

/// Logical button names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonId {
    Up,
    Down,
    Ok,
}

/// Sampled state of a single button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Button {
    /// Level read this tick.
    pub current: bool,
    /// Level read on the previous tick.
    pub previous: bool,
    /// Timestamp (ms) of the first pressed tick of the current press.
    pub held_since: Option<u64>,
}

impl Button {
    /// Rising transition between the previous and the current tick.
    pub fn edge(&self) -> bool {
        self.current && !self.previous
    }

    /// How long the button has been held continuously, if it is held.
    pub fn held_for(&self, now_ms: u64) -> Option<u64> {
        self.held_since.map(|t| now_ms.saturating_sub(t))
    }

    /// `true` once a continuous press has lasted at least `threshold_ms`.
    pub fn held_at_least(&self, now_ms: u64, threshold_ms: u64) -> bool {
        self.held_for(now_ms).is_some_and(|d| d >= threshold_ms)
    }

    fn advance(&mut self, level: bool, now_ms: u64) {
        self.previous = self.current;
        self.current = level;
        if !level {
            self.held_since = None;
        } else if self.edge() {
            self.held_since = Some(now_ms);
        }
    }
}

/// Snapshot of all three buttons for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState {
    pub up: Button,
    pub down: Button,
    pub ok: Button,
}

/// Edge and hold-timer tracker over a [`ButtonInput`].
///
/// Owns the previous-state shadow, so exactly one session may sample it at
/// a time.
pub struct Debouncer<B> {
    input: B,
    state: ButtonState,
}

impl<B: ButtonInput> Debouncer<B> {
    pub fn new(input: B) -> Self {
        Self {
            input,
            state: ButtonState::default(),
        }
    }

    /// Read the buttons once and advance edges and hold timers.
    pub fn sample(&mut self, now_ms: u64) -> ButtonState {
        let raw = self.input.read();
        self.state.up.advance(raw.up, now_ms);
        self.state.down.advance(raw.down, now_ms);
        self.state.ok.advance(raw.ok, now_ms);
        self.state
    }

    /// Drop all shadows and hold timers, then seed the previous levels from
    /// a fresh read.
    ///
    /// A button still held from whatever launched the caller therefore
    /// yields neither an edge nor a hold timer until it is released and
    /// pressed again.
    pub fn resync(&mut self) {
        let raw = self.input.read();
        self.state = ButtonState::default();
        self.state.up.current = raw.up;
        self.state.down.current = raw.down;
        self.state.ok.current = raw.ok;
    }

    /// Clear every shadow to released.
    pub fn reset(&mut self) {
        self.state = ButtonState::default();
    }

    /// Last sampled state, without reading the buttons.
    pub fn state(&self) -> ButtonState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Script {
        levels: std::vec::Vec<RawButtons>,
        at: usize,
    }

    impl ButtonInput for Script {
        fn read(&mut self) -> RawButtons {
            let r = self.levels.get(self.at).copied().unwrap_or_default();
            self.at += 1;
            r
        }
    }

    fn ok(pressed: bool) -> RawButtons {
        RawButtons {
            ok: pressed,
            ..Default::default()
        }
    }

    fn debouncer(levels: &[RawButtons]) -> Debouncer<Script> {
        Debouncer::new(Script {
            levels: levels.to_vec(),
            at: 0,
        })
    }

    #[test]
    fn held_button_yields_single_edge() {
        let mut d = debouncer(&[ok(true); 10]);
        let edges = (0..10u64).filter(|t| d.sample(t * 10).ok.edge()).count();
        assert_eq!(edges, 1);
    }

    #[test]
    fn edge_needs_released_previous_tick() {
        let levels = [ok(false), ok(true), ok(false), ok(true), ok(true)];
        let mut d = debouncer(&levels);
        let edges: std::vec::Vec<bool> = (0..5u64).map(|t| d.sample(t).ok.edge()).collect();
        assert_eq!(edges, [false, true, false, true, false]);
    }

    #[test]
    fn hold_timer_starts_on_first_pressed_tick_and_clears_on_release() {
        let levels = [ok(false), ok(true), ok(true), ok(false), ok(true)];
        let mut d = debouncer(&levels);

        assert_eq!(d.sample(0).ok.held_since, None);
        assert_eq!(d.sample(100).ok.held_since, Some(100));
        let s = d.sample(600);
        assert_eq!(s.ok.held_since, Some(100));
        assert_eq!(s.ok.held_for(600), Some(500));
        assert_eq!(d.sample(700).ok.held_since, None);
        assert_eq!(d.sample(800).ok.held_since, Some(800));
    }

    #[test]
    fn hold_threshold_is_inclusive() {
        let mut d = debouncer(&[ok(true); 3]);
        d.sample(0);
        assert!(!d.sample(899).ok.held_at_least(899, 900));
        assert!(d.sample(900).ok.held_at_least(900, 900));
    }

    #[test]
    fn resync_suppresses_edge_from_held_button() {
        let mut d = debouncer(&[ok(true), ok(true), ok(false), ok(true)]);
        d.resync();
        let s = d.sample(10);
        assert!(!s.ok.edge());
        assert_eq!(s.ok.held_since, None);
        assert!(!d.sample(20).ok.edge());
        assert!(d.sample(30).ok.edge());
    }

    #[test]
    fn reset_clears_shadows() {
        let mut d = debouncer(&[ok(true), ok(true)]);
        d.sample(0);
        d.reset();
        assert_eq!(d.state(), ButtonState::default());
        assert!(d.sample(5).ok.edge());
    }
}
