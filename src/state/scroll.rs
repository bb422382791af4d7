//! Scroll State Module - clamped scroll operations on list nodes.
//!
//! The scroll offset lives on the list node as a reactive signal; the
//! virtualization layer re-derives the visible window whenever it changes.
//! All operations clamp to `[0, content_height - viewport_height]`.
//!
//! `scroll_into_view` implements the nearest-edge policy: move the minimum
//! distance needed for the row to be fully visible, and do nothing when it
//! already is. Each actual adjustment request is counted per row.

use tracing::trace;

use crate::engine::arrays;

// =============================================================================
// SCROLL STATE ACCESS
// =============================================================================

/// Maximum scroll offset for a list node.
pub fn max_scroll(list: usize) -> u32 {
    let content = arrays::get_content_height(list);
    let viewport = arrays::get_viewport_height(list);
    content.saturating_sub(viewport)
}

/// Current scroll offset of a list node. Reactive.
pub fn get_scroll_offset(list: usize) -> u32 {
    arrays::scroll_signal(list).get()
}

// =============================================================================
// SCROLL OPERATIONS
// =============================================================================

/// Set the scroll offset of a list node, clamped to the valid range.
pub fn set_scroll_offset(list: usize, offset: u32) {
    let clamped = offset.min(max_scroll(list));
    arrays::scroll_signal(list).set(clamped);
}

/// Scroll by a delta amount.
///
/// Returns `true` if scrolling occurred, `false` if already at a boundary.
pub fn scroll_by(list: usize, delta: i64) -> bool {
    let scroll = arrays::scroll_signal(list);
    let current = scroll.get();
    let max = max_scroll(list) as i64;
    let next = (current as i64 + delta).clamp(0, max) as u32;
    if next == current {
        return false;
    }
    scroll.set(next);
    true
}

// =============================================================================
// SCROLL INTO VIEW
// =============================================================================

/// Bring a row into the list's visible window, nearest-edge.
///
/// - Row above the window: align its top with the window top.
/// - Row below the window: align its bottom with the window bottom.
/// - Row already fully visible: no movement, no call counted.
pub fn scroll_into_view(list: usize, row: usize) {
    let row_top = arrays::get_offset(row);
    let row_bottom = row_top + arrays::get_height(row);
    let viewport = arrays::get_viewport_height(list);

    let scroll = arrays::scroll_signal(list);
    let window_top = scroll.get();
    let window_bottom = window_top + viewport;

    let target = if row_top < window_top {
        row_top
    } else if row_bottom > window_bottom {
        row_bottom.saturating_sub(viewport)
    } else {
        return;
    };

    trace!(list, row, target, "scroll into view");
    arrays::bump_scroll_into_view(row);
    scroll.set(target.min(max_scroll(list)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{allocate_node, reset_registry};

    /// List with the given viewport/content heights and one row at an offset.
    fn list_with_row(viewport: u32, content: u32, row_offset: u32, row_height: u32) -> (usize, usize) {
        let list = allocate_node(None);
        arrays::set_viewport_height(list, viewport);
        arrays::set_content_height(list, content);
        let row = allocate_node(None);
        arrays::set_parent(row, Some(list));
        arrays::set_offset(row, row_offset);
        arrays::set_height(row, row_height);
        (list, row)
    }

    fn setup() {
        reset_registry();
    }

    #[test]
    fn test_set_scroll_offset_clamps() {
        setup();
        let (list, _) = list_with_row(5, 20, 0, 1);
        set_scroll_offset(list, 9);
        assert_eq!(get_scroll_offset(list), 9);
        set_scroll_offset(list, 100);
        assert_eq!(get_scroll_offset(list), 15, "clamped to content - viewport");
    }

    #[test]
    fn test_scroll_by_boundaries() {
        setup();
        let (list, _) = list_with_row(5, 8, 0, 1);
        assert!(scroll_by(list, 2));
        assert_eq!(get_scroll_offset(list), 2);
        assert!(scroll_by(list, 100));
        assert_eq!(get_scroll_offset(list), 3);
        assert!(!scroll_by(list, 1), "at max boundary");
        assert!(scroll_by(list, -100));
        assert_eq!(get_scroll_offset(list), 0);
        assert!(!scroll_by(list, -1), "at zero boundary");
    }

    #[test]
    fn test_scroll_into_view_above_window() {
        setup();
        let (list, row) = list_with_row(5, 50, 3, 1);
        set_scroll_offset(list, 10);
        scroll_into_view(list, row);
        assert_eq!(get_scroll_offset(list), 3, "row top aligned to window top");
        assert_eq!(arrays::get_scroll_into_view_calls(row), 1);
    }

    #[test]
    fn test_scroll_into_view_below_window() {
        setup();
        let (list, row) = list_with_row(5, 50, 12, 1);
        set_scroll_offset(list, 0);
        scroll_into_view(list, row);
        // Row bottom (13) aligned to window bottom: offset 13 - 5 = 8.
        assert_eq!(get_scroll_offset(list), 8);
    }

    #[test]
    fn test_scroll_into_view_visible_is_noop() {
        setup();
        let (list, row) = list_with_row(5, 50, 2, 1);
        set_scroll_offset(list, 1);
        scroll_into_view(list, row);
        assert_eq!(get_scroll_offset(list), 1, "fully visible row must not move");
        assert_eq!(arrays::get_scroll_into_view_calls(row), 0);
    }
}
