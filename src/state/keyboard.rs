//! Keyboard Module - keyboard event types and bubbling dispatch.
//!
//! Events use browser-style key names ("a", "Enter", "ArrowDown") so
//! handlers match on strings rather than terminal escape details. Raw
//! terminal input arrives as crossterm events and is converted with
//! [`KeyboardEvent::from_crossterm`].
//!
//! Dispatch walks the node tree from the target upward, offering the event
//! to each node's key handler until one consumes it.

use spark_signals::{signal, Signal};

use crate::engine::arrays;

// =============================================================================
// TYPES
// =============================================================================

/// Keyboard modifier state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

/// Key event state (press, repeat, release).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key that was pressed (e.g., "a", "Enter", "ArrowUp").
    pub key: String,
    /// Modifier keys state.
    pub modifiers: Modifiers,
    /// Press/repeat/release state.
    pub state: KeyState,
}

impl KeyboardEvent {
    /// Create a simple key press event.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            state: KeyState::Press,
        }
    }

    /// The typed character, when the key names a single printable char.
    pub fn char(&self) -> Option<char> {
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }

    /// Convert a crossterm key event.
    pub fn from_crossterm(event: &crossterm::event::KeyEvent) -> Self {
        use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};

        let key = match event.code {
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Esc => "Escape".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "Tab".to_string(),
            KeyCode::Up => "ArrowUp".to_string(),
            KeyCode::Down => "ArrowDown".to_string(),
            KeyCode::Left => "ArrowLeft".to_string(),
            KeyCode::Right => "ArrowRight".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            other => format!("{:?}", other),
        };

        let shift = event.modifiers.contains(KeyModifiers::SHIFT)
            || matches!(event.code, KeyCode::BackTab);

        Self {
            key,
            modifiers: Modifiers {
                ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
                alt: event.modifiers.contains(KeyModifiers::ALT),
                shift,
                meta: event.modifiers.contains(KeyModifiers::SUPER),
            },
            state: match event.kind {
                KeyEventKind::Press => KeyState::Press,
                KeyEventKind::Repeat => KeyState::Repeat,
                KeyEventKind::Release => KeyState::Release,
            },
        }
    }
}

// =============================================================================
// STATE
// =============================================================================

thread_local! {
    static LAST_EVENT: Signal<Option<KeyboardEvent>> = signal(None);
}

/// Get the last dispatched keyboard event (reactive).
pub fn last_event() -> Option<KeyboardEvent> {
    LAST_EVENT.with(|s| s.get())
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Dispatch a keyboard event starting at `target`, bubbling to ancestors.
///
/// Each node's key handler may consume the event by returning `true`,
/// which stops propagation. Returns whether the event was consumed.
/// Only press and repeat events reach handlers.
pub fn dispatch(target: usize, event: &KeyboardEvent) -> bool {
    LAST_EVENT.with(|s| s.set(Some(event.clone())));

    if event.state == KeyState::Release {
        return false;
    }

    let mut current = Some(target);
    while let Some(index) = current {
        if let Some(handler) = arrays::get_key_handler(index) {
            if handler(event) {
                return true;
            }
        }
        current = arrays::get_parent(index);
    }
    false
}

/// Dispatch to the node currently holding focus, if any.
pub fn dispatch_to_focused(event: &KeyboardEvent) -> bool {
    let focused = super::focus::get_focused_index();
    if focused < 0 {
        return false;
    }
    dispatch(focused as usize, event)
}

/// Reset keyboard state. Test helper.
pub fn reset_keyboard_state() {
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
        reset_keyboard_state();
    }

    #[test]
    fn test_dispatch_bubbles_to_parent() {
        setup();
        let parent = allocate_node(None);
        let child = allocate_node(None);
        arrays::set_parent(child, Some(parent));

        let hit = Rc::new(Cell::new(false));
        let hit_clone = hit.clone();
        arrays::set_key_handler(parent, Rc::new(move |_| {
            hit_clone.set(true);
            true
        }));

        assert!(dispatch(child, &KeyboardEvent::new("Enter")));
        assert!(hit.get(), "parent handler should receive bubbled event");
    }

    #[test]
    fn test_consumed_event_stops_bubbling() {
        setup();
        let parent = allocate_node(None);
        let child = allocate_node(None);
        arrays::set_parent(child, Some(parent));

        let parent_hit = Rc::new(Cell::new(false));
        let parent_hit_clone = parent_hit.clone();
        arrays::set_key_handler(parent, Rc::new(move |_| {
            parent_hit_clone.set(true);
            false
        }));
        arrays::set_key_handler(child, Rc::new(|_| true));

        assert!(dispatch(child, &KeyboardEvent::new("a")));
        assert!(!parent_hit.get(), "consumed event must not reach parent");
    }

    #[test]
    fn test_release_events_skip_handlers() {
        setup();
        let node = allocate_node(None);
        arrays::set_key_handler(node, Rc::new(|_| true));

        let mut event = KeyboardEvent::new("a");
        event.state = KeyState::Release;
        assert!(!dispatch(node, &event));
    }

    #[test]
    fn test_char_extraction() {
        assert_eq!(KeyboardEvent::new("x").char(), Some('x'));
        assert_eq!(KeyboardEvent::new("Enter").char(), None);
        assert_eq!(KeyboardEvent::new("Escape").char(), None);
    }

    #[test]
    fn test_from_crossterm_names() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

        let ev = KeyboardEvent::from_crossterm(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(ev.key, "Escape");

        let ev = KeyboardEvent::from_crossterm(&KeyEvent::new(
            KeyCode::Char('q'),
            KeyModifiers::CONTROL,
        ));
        assert_eq!(ev.key, "q");
        assert!(ev.modifiers.ctrl);

        let ev = KeyboardEvent::from_crossterm(&KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        assert_eq!(ev.key, "ArrowDown");
    }

    #[test]
    fn test_dispatch_to_focused_targets_focus_holder() {
        setup();
        crate::state::focus::reset_focus_state();
        let node = allocate_node(None);

        let hit = Rc::new(Cell::new(false));
        let hit_clone = hit.clone();
        arrays::set_key_handler(node, Rc::new(move |_| {
            hit_clone.set(true);
            true
        }));

        assert!(!dispatch_to_focused(&KeyboardEvent::new("a")), "no focus, no dispatch");
        crate::state::focus::focus(node);
        assert!(dispatch_to_focused(&KeyboardEvent::new("a")));
        assert!(hit.get());
    }

    #[test]
    fn test_last_event_updates() {
        setup();
        let node = allocate_node(None);
        dispatch(node, &KeyboardEvent::new("Enter"));
        assert_eq!(last_event().map(|e| e.key), Some("Enter".to_string()));
    }
}
