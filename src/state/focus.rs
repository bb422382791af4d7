//! Focus System - node focus state and callbacks.
//!
//! Tracks which node holds input focus:
//! - `focused_index` signal (currently focused node, -1 if none)
//! - focus/blur callbacks fired on transitions
//!
//! The interaction layer uses this to hand focus to the text input on any
//! pointer-down inside the widget, and to drop it on the escape fallback.

use std::cell::RefCell;
use std::collections::HashMap;

use spark_signals::{signal, Signal};

// =============================================================================
// FOCUSED INDEX SIGNAL
// =============================================================================

thread_local! {
    static FOCUSED_INDEX: Signal<i32> = signal(-1);
}

/// Get the currently focused node index (-1 if none). Reactive.
pub fn get_focused_index() -> i32 {
    FOCUSED_INDEX.with(|s| s.get())
}

/// Check if any node is focused.
pub fn has_focus() -> bool {
    get_focused_index() >= 0
}

/// Check if a specific node is focused.
pub fn is_focused(index: usize) -> bool {
    get_focused_index() == index as i32
}

// =============================================================================
// FOCUS CALLBACKS
// =============================================================================

/// Callbacks fired when focus changes.
#[derive(Default)]
pub struct FocusCallbacks {
    pub on_focus: Option<Box<dyn Fn()>>,
    pub on_blur: Option<Box<dyn Fn()>>,
}

thread_local! {
    static FOCUS_CALLBACK_REGISTRY: RefCell<HashMap<usize, Vec<FocusCallbacks>>> =
        RefCell::new(HashMap::new());
}

/// Register focus callbacks for a node.
/// Returns a cleanup function to unregister.
pub fn register_callbacks(index: usize, callbacks: FocusCallbacks) -> impl FnOnce() {
    let callback_id = FOCUS_CALLBACK_REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let list = reg.entry(index).or_default();
        let id = list.len();
        list.push(callbacks);
        id
    });

    move || {
        FOCUS_CALLBACK_REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(list) = reg.get_mut(&index) {
                if callback_id < list.len() {
                    // Mark removed; positions must stay stable for other IDs.
                    list[callback_id].on_focus = None;
                    list[callback_id].on_blur = None;
                }
                if list
                    .iter()
                    .all(|cb| cb.on_focus.is_none() && cb.on_blur.is_none())
                {
                    reg.remove(&index);
                }
            }
        });
    }
}

fn set_focus_with_callbacks(new_index: i32) {
    let old_index = get_focused_index();
    if old_index == new_index {
        return;
    }

    if old_index >= 0 {
        fire(old_index as usize, |cb| cb.on_blur.as_deref());
    }

    FOCUSED_INDEX.with(|s| s.set(new_index));

    if new_index >= 0 {
        fire(new_index as usize, |cb| cb.on_focus.as_deref());
    }
}

fn fire(index: usize, pick: impl Fn(&FocusCallbacks) -> Option<&dyn Fn()>) {
    FOCUS_CALLBACK_REGISTRY.with(|reg| {
        let reg = reg.borrow();
        if let Some(callbacks) = reg.get(&index) {
            for cb in callbacks {
                if let Some(f) = pick(cb) {
                    f();
                }
            }
        }
    });
}

// =============================================================================
// FOCUS OPERATIONS
// =============================================================================

/// Focus a node, firing blur/focus callbacks on the transition.
pub fn focus(index: usize) {
    set_focus_with_callbacks(index as i32);
}

/// Remove focus entirely.
pub fn blur() {
    set_focus_with_callbacks(-1);
}

/// Reset focus state. Test helper.
pub fn reset_focus_state() {
    FOCUSED_INDEX.with(|s| s.set(-1));
    FOCUS_CALLBACK_REGISTRY.with(|reg| reg.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup() {
        reset_focus_state();
    }

    #[test]
    fn test_focus_and_blur() {
        setup();
        assert!(!has_focus());
        focus(3);
        assert!(is_focused(3));
        blur();
        assert!(!has_focus());
    }

    #[test]
    fn test_callbacks_fire_on_transition() {
        setup();
        let focused = Rc::new(Cell::new(0u32));
        let blurred = Rc::new(Cell::new(0u32));
        let focused_clone = focused.clone();
        let blurred_clone = blurred.clone();

        let _cleanup = register_callbacks(1, FocusCallbacks {
            on_focus: Some(Box::new(move || focused_clone.set(focused_clone.get() + 1))),
            on_blur: Some(Box::new(move || blurred_clone.set(blurred_clone.get() + 1))),
        });

        focus(1);
        assert_eq!((focused.get(), blurred.get()), (1, 0));

        // Re-focusing the same node is a no-op.
        focus(1);
        assert_eq!((focused.get(), blurred.get()), (1, 0));

        blur();
        assert_eq!((focused.get(), blurred.get()), (1, 1));
    }

    #[test]
    fn test_cleanup_unregisters() {
        setup();
        let focused = Rc::new(Cell::new(0u32));
        let focused_clone = focused.clone();

        let cleanup = register_callbacks(2, FocusCallbacks {
            on_focus: Some(Box::new(move || focused_clone.set(focused_clone.get() + 1))),
            on_blur: None,
        });
        cleanup();

        focus(2);
        assert_eq!(focused.get(), 0, "unregistered callback must not fire");
    }
}
