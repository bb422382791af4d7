//! Mouse Module - pointer event types and bubbling dispatch.
//!
//! Pointer events target a node and bubble toward the root. A handler
//! returning `true` consumes the event (stop propagation); otherwise the
//! parent's handler runs next. Mouse-down and click are dispatched through
//! separate handler columns since the interaction layer treats them
//! differently (focus handoff happens on mouse-down, activation on click).

use spark_signals::{signal, Signal};

use super::keyboard::Modifiers;
use crate::engine::arrays;

// =============================================================================
// TYPES
// =============================================================================

/// Mouse action type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseAction {
    Down,
    Up,
    Move,
    Scroll,
}

/// Mouse button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    #[default]
    None,
}

/// Mouse event.
#[derive(Clone, Debug, PartialEq)]
pub struct MouseEvent {
    /// Action type (down, up, move, scroll).
    pub action: MouseAction,
    /// Button pressed.
    pub button: MouseButton,
    /// X coordinate (0-indexed cells).
    pub x: u16,
    /// Y coordinate (0-indexed cells).
    pub y: u16,
    /// Modifier keys state.
    pub modifiers: Modifiers,
}

impl MouseEvent {
    /// Create a new mouse event.
    pub fn new(action: MouseAction, button: MouseButton, x: u16, y: u16) -> Self {
        Self {
            action,
            button,
            x,
            y,
            modifiers: Modifiers::default(),
        }
    }

    /// Create a left-button mouse down event.
    pub fn down(x: u16, y: u16) -> Self {
        Self::new(MouseAction::Down, MouseButton::Left, x, y)
    }

    /// Create a left-button click (up on same node) event.
    pub fn click(x: u16, y: u16) -> Self {
        Self::new(MouseAction::Up, MouseButton::Left, x, y)
    }

    /// Convert a crossterm mouse event.
    pub fn from_crossterm(event: &crossterm::event::MouseEvent) -> Self {
        use crossterm::event::{KeyModifiers, MouseButton as CtButton, MouseEventKind};

        let (action, button) = match event.kind {
            MouseEventKind::Down(b) => (MouseAction::Down, convert_button(b)),
            MouseEventKind::Up(b) => (MouseAction::Up, convert_button(b)),
            MouseEventKind::Drag(b) => (MouseAction::Move, convert_button(b)),
            MouseEventKind::Moved => (MouseAction::Move, MouseButton::None),
            MouseEventKind::ScrollDown
            | MouseEventKind::ScrollUp
            | MouseEventKind::ScrollLeft
            | MouseEventKind::ScrollRight => (MouseAction::Scroll, MouseButton::None),
        };

        fn convert_button(b: CtButton) -> MouseButton {
            match b {
                CtButton::Left => MouseButton::Left,
                CtButton::Middle => MouseButton::Middle,
                CtButton::Right => MouseButton::Right,
            }
        }

        Self {
            action,
            button,
            x: event.column,
            y: event.row,
            modifiers: Modifiers {
                ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
                alt: event.modifiers.contains(KeyModifiers::ALT),
                shift: event.modifiers.contains(KeyModifiers::SHIFT),
                meta: event.modifiers.contains(KeyModifiers::SUPER),
            },
        }
    }
}

// =============================================================================
// STATE
// =============================================================================

thread_local! {
    static LAST_EVENT: Signal<Option<MouseEvent>> = signal(None);
}

/// Get the last dispatched mouse event (reactive).
pub fn last_event() -> Option<MouseEvent> {
    LAST_EVENT.with(|s| s.get())
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Dispatch a mouse-down event starting at `target`, bubbling to ancestors.
///
/// Returns whether any handler consumed the event.
pub fn dispatch_mouse_down(target: usize, event: &MouseEvent) -> bool {
    LAST_EVENT.with(|s| s.set(Some(event.clone())));
    bubble(target, event, arrays::get_mouse_down_handler)
}

/// Dispatch a click event starting at `target`, bubbling to ancestors.
pub fn dispatch_click(target: usize, event: &MouseEvent) -> bool {
    LAST_EVENT.with(|s| s.set(Some(event.clone())));
    bubble(target, event, arrays::get_click_handler)
}

fn bubble(
    target: usize,
    event: &MouseEvent,
    lookup: impl Fn(usize) -> Option<arrays::MouseHandler>,
) -> bool {
    let mut current = Some(target);
    while let Some(index) = current {
        if let Some(handler) = lookup(index) {
            if handler(event) {
                return true;
            }
        }
        current = arrays::get_parent(index);
    }
    false
}

/// Reset mouse state. Test helper.
pub fn reset_mouse_state() {
    LAST_EVENT.with(|s| s.set(None));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{allocate_node, reset_registry};
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup() {
        reset_registry();
        reset_mouse_state();
    }

    #[test]
    fn test_mouse_down_bubbles() {
        setup();
        let outer = allocate_node(None);
        let inner = allocate_node(None);
        arrays::set_parent(inner, Some(outer));

        let order: Rc<std::cell::RefCell<Vec<&'static str>>> = Rc::new(Default::default());
        let order_inner = order.clone();
        let order_outer = order.clone();
        arrays::set_mouse_down_handler(inner, Rc::new(move |_| {
            order_inner.borrow_mut().push("inner");
            false
        }));
        arrays::set_mouse_down_handler(outer, Rc::new(move |_| {
            order_outer.borrow_mut().push("outer");
            false
        }));

        dispatch_mouse_down(inner, &MouseEvent::down(0, 0));
        assert_eq!(*order.borrow(), vec!["inner", "outer"]);
    }

    #[test]
    fn test_consuming_handler_stops_bubbling() {
        setup();
        let outer = allocate_node(None);
        let inner = allocate_node(None);
        arrays::set_parent(inner, Some(outer));

        let outer_hit = Rc::new(Cell::new(false));
        let outer_hit_clone = outer_hit.clone();
        arrays::set_mouse_down_handler(inner, Rc::new(|_| true));
        arrays::set_mouse_down_handler(outer, Rc::new(move |_| {
            outer_hit_clone.set(true);
            false
        }));

        assert!(dispatch_mouse_down(inner, &MouseEvent::down(0, 0)));
        assert!(!outer_hit.get());
    }

    #[test]
    fn test_from_crossterm_conversion() {
        use crossterm::event::{
            KeyModifiers, MouseButton as CtButton, MouseEvent as CtEvent, MouseEventKind,
        };

        let ev = MouseEvent::from_crossterm(&CtEvent {
            kind: MouseEventKind::Down(CtButton::Left),
            column: 4,
            row: 2,
            modifiers: KeyModifiers::SHIFT,
        });
        assert_eq!(ev.action, MouseAction::Down);
        assert_eq!(ev.button, MouseButton::Left);
        assert_eq!((ev.x, ev.y), (4, 2));
        assert!(ev.modifiers.shift);

        let ev = MouseEvent::from_crossterm(&CtEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(ev.action, MouseAction::Scroll);
        assert_eq!(ev.button, MouseButton::None);
    }

    #[test]
    fn test_click_uses_separate_handler_column() {
        setup();
        let node = allocate_node(None);

        let clicked = Rc::new(Cell::new(false));
        let clicked_clone = clicked.clone();
        arrays::set_click_handler(node, Rc::new(move |_| {
            clicked_clone.set(true);
            true
        }));

        // Mouse-down must not trigger the click handler.
        dispatch_mouse_down(node, &MouseEvent::down(0, 0));
        assert!(!clicked.get());

        dispatch_click(node, &MouseEvent::click(0, 0));
        assert!(clicked.get());
    }
}
