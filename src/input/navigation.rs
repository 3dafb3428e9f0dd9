//! Cursor movement shared by the menu, the peer list and the switch row.
//!
//! Movement saturates at both ends; there is no wraparound.

use super::ButtonState;

/// Move selection cursor one item up.
pub fn select_prev(selected: usize) -> usize {
    selected.saturating_sub(1)
}

/// Move selection cursor one item down if another item exists.
pub fn select_next(selected: usize, item_count: usize) -> usize {
    if selected + 1 < item_count {
        selected + 1
    } else {
        selected
    }
}

/// Apply this tick's Up/Down edges to a cursor over `item_count` items.
///
/// Returns the new position only when the cursor actually moved.
pub fn navigate(selected: usize, item_count: usize, buttons: &ButtonState) -> Option<usize> {
    let mut next = selected;
    if buttons.up.edge() {
        next = select_prev(next);
    }
    if buttons.down.edge() {
        next = select_next(next, item_count);
    }
    (next != selected).then_some(next)
}
