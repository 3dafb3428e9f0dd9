//! Hand-off of received switch frames from the radio callback to the
//! session loop.
//!
//! The callback may preempt the loop, so the whole payload is copied in
//! and out under a critical section. A reader never sees half of one
//! frame and half of another.

use core::cell::Cell;

use embassy_sync::blocking_mutex::CriticalSectionMutex;

use super::SwitchPayload;

/// Single-slot mailbox holding the newest well-formed frame.
pub struct InboundSlot {
    latest: CriticalSectionMutex<Cell<Option<SwitchPayload>>>,
}

impl InboundSlot {
    pub const fn new() -> Self {
        Self {
            latest: CriticalSectionMutex::new(Cell::new(None)),
        }
    }

    /// Callback side: stage `data` if it is a valid switch frame.
    ///
    /// Returns `false` (and leaves the slot untouched) on a size mismatch.
    /// Never blocks beyond the critical section.
    pub fn offer(&self, data: &[u8]) -> bool {
        match SwitchPayload::from_frame(data) {
            Some(payload) => {
                self.latest.lock(|slot| slot.set(Some(payload)));
                true
            }
            None => {
                debug!("peer-link: dropped {}-byte frame", data.len());
                false
            }
        }
    }

    /// Loop side: take the newest staged frame, if any.
    pub fn take(&self) -> Option<SwitchPayload> {
        self.latest.lock(|slot| slot.take())
    }

    pub fn clear(&self) {
        self.latest.lock(|slot| slot.set(None));
    }
}

impl Default for InboundSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_valid_frame_wins() {
        let slot = InboundSlot::new();
        assert!(slot.offer(&[1, 0, 0, 0]));
        assert!(slot.offer(&[0, 0, 1, 1]));
        assert_eq!(
            slot.take(),
            Some(SwitchPayload::new([false, false, true, true]))
        );
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn wrong_size_leaves_slot_unchanged() {
        let slot = InboundSlot::new();
        assert!(slot.offer(&[1, 1, 1, 1]));
        assert!(!slot.offer(&[0, 0, 0]));
        assert!(!slot.offer(&[0; 8]));
        assert_eq!(slot.take(), Some(SwitchPayload::new([true; 4])));
    }

    #[test]
    fn clear_discards_pending_frame() {
        let slot = InboundSlot::new();
        slot.offer(&[1, 0, 1, 0]);
        slot.clear();
        assert_eq!(slot.take(), None);
    }
}
