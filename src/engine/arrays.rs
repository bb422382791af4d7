//! Node arrays - columnar per-node state.
//!
//! Nodes are indices into parallel columns rather than objects. Each column
//! covers one concern:
//! - identity: kind, parent
//! - contract surface: string attributes (`data-*` hooks), text content
//! - geometry: offset/height for rows and spacers, viewport/content height
//!   and a reactive scroll-offset signal for list nodes
//! - interaction: mouse-down/click/key handlers, focus-follow call counter
//!
//! Columns are thread-local; the registry grows them via [`ensure_capacity`]
//! and clears slots via [`clear_at`] when a node is released.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::state::keyboard::KeyboardEvent;
use crate::state::mouse::MouseEvent;
use crate::types::RowFlags;

// =============================================================================
// TYPES
// =============================================================================

/// What a node renders as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeKind {
    /// Unallocated slot.
    #[default]
    Empty,
    /// Outer widget container.
    Container,
    /// Always-visible control (value area + input).
    Control,
    /// Text input showing the filter text.
    Input,
    /// One committed value chip (multiple mode).
    ValueChip,
    /// Single-mode value label / placeholder.
    Label,
    /// Scroll container for the option list.
    List,
    /// Full-height spacer inside the list.
    Spacer,
    /// One materialized option row.
    OptionRow,
    /// Empty/loading placeholder message.
    Message,
}

/// Text content of a node: fixed or derived on demand.
#[derive(Clone)]
pub enum TextContent {
    Static(String),
    Getter(Rc<dyn Fn() -> String>),
}

/// Mouse handler. Return `true` to consume the event (stop propagation).
pub type MouseHandler = Rc<dyn Fn(&MouseEvent) -> bool>;

/// Keyboard handler. Return `true` to consume the event.
pub type KeyHandler = Rc<dyn Fn(&KeyboardEvent) -> bool>;

// =============================================================================
// COLUMNS
// =============================================================================

thread_local! {
    static KIND: RefCell<Vec<NodeKind>> = RefCell::new(Vec::new());
    static PARENT: RefCell<Vec<Option<usize>>> = RefCell::new(Vec::new());
    static ATTRS: RefCell<Vec<HashMap<String, String>>> = RefCell::new(Vec::new());
    static TEXT: RefCell<Vec<Option<TextContent>>> = RefCell::new(Vec::new());

    /// Vertical offset of rows/spacers within their list, in cells.
    static OFFSET: RefCell<Vec<u32>> = RefCell::new(Vec::new());
    /// Height of rows/spacers, in cells.
    static HEIGHT: RefCell<Vec<u32>> = RefCell::new(Vec::new());
    /// Viewport height of list nodes, in cells.
    static VIEWPORT: RefCell<Vec<u32>> = RefCell::new(Vec::new());
    /// Total logical content height of list nodes (spacer height).
    static CONTENT_HEIGHT: RefCell<Vec<u32>> = RefCell::new(Vec::new());
    /// Reactive scroll offset of list nodes.
    static SCROLL: RefCell<Vec<Option<Signal<u32>>>> = RefCell::new(Vec::new());

    static FLAGS: RefCell<Vec<RowFlags>> = RefCell::new(Vec::new());
    static SCROLL_INTO_VIEW_CALLS: RefCell<Vec<u32>> = RefCell::new(Vec::new());

    static ON_MOUSE_DOWN: RefCell<Vec<Option<MouseHandler>>> = RefCell::new(Vec::new());
    static ON_CLICK: RefCell<Vec<Option<MouseHandler>>> = RefCell::new(Vec::new());
    static ON_KEY: RefCell<Vec<Option<KeyHandler>>> = RefCell::new(Vec::new());
}

/// Grow every column so `index` is addressable.
pub fn ensure_capacity(index: usize) {
    let len = index + 1;
    KIND.with(|c| grow(&mut c.borrow_mut(), len));
    PARENT.with(|c| grow(&mut c.borrow_mut(), len));
    ATTRS.with(|c| grow(&mut c.borrow_mut(), len));
    TEXT.with(|c| grow(&mut c.borrow_mut(), len));
    OFFSET.with(|c| grow(&mut c.borrow_mut(), len));
    HEIGHT.with(|c| grow(&mut c.borrow_mut(), len));
    VIEWPORT.with(|c| grow(&mut c.borrow_mut(), len));
    CONTENT_HEIGHT.with(|c| grow(&mut c.borrow_mut(), len));
    SCROLL.with(|c| grow(&mut c.borrow_mut(), len));
    FLAGS.with(|c| grow(&mut c.borrow_mut(), len));
    SCROLL_INTO_VIEW_CALLS.with(|c| grow(&mut c.borrow_mut(), len));
    ON_MOUSE_DOWN.with(|c| grow(&mut c.borrow_mut(), len));
    ON_CLICK.with(|c| grow(&mut c.borrow_mut(), len));
    ON_KEY.with(|c| grow(&mut c.borrow_mut(), len));
}

fn grow<T: Default>(col: &mut Vec<T>, len: usize) {
    if col.len() < len {
        col.resize_with(len, T::default);
    }
}

/// Clear all column values at one index (node released).
pub fn clear_at(index: usize) {
    KIND.with(|c| set_slot(&mut c.borrow_mut(), index, NodeKind::Empty));
    PARENT.with(|c| set_slot(&mut c.borrow_mut(), index, None));
    ATTRS.with(|c| set_slot(&mut c.borrow_mut(), index, HashMap::new()));
    TEXT.with(|c| set_slot(&mut c.borrow_mut(), index, None));
    OFFSET.with(|c| set_slot(&mut c.borrow_mut(), index, 0));
    HEIGHT.with(|c| set_slot(&mut c.borrow_mut(), index, 0));
    VIEWPORT.with(|c| set_slot(&mut c.borrow_mut(), index, 0));
    CONTENT_HEIGHT.with(|c| set_slot(&mut c.borrow_mut(), index, 0));
    SCROLL.with(|c| set_slot(&mut c.borrow_mut(), index, None));
    FLAGS.with(|c| set_slot(&mut c.borrow_mut(), index, RowFlags::empty()));
    SCROLL_INTO_VIEW_CALLS.with(|c| set_slot(&mut c.borrow_mut(), index, 0));
    ON_MOUSE_DOWN.with(|c| set_slot(&mut c.borrow_mut(), index, None));
    ON_CLICK.with(|c| set_slot(&mut c.borrow_mut(), index, None));
    ON_KEY.with(|c| set_slot(&mut c.borrow_mut(), index, None));
}

fn set_slot<T>(col: &mut Vec<T>, index: usize, value: T) {
    if index < col.len() {
        col[index] = value;
    }
}

/// Drop all columns (registry auto-reset when the tree empties).
pub fn reset() {
    KIND.with(|c| c.borrow_mut().clear());
    PARENT.with(|c| c.borrow_mut().clear());
    ATTRS.with(|c| c.borrow_mut().clear());
    TEXT.with(|c| c.borrow_mut().clear());
    OFFSET.with(|c| c.borrow_mut().clear());
    HEIGHT.with(|c| c.borrow_mut().clear());
    VIEWPORT.with(|c| c.borrow_mut().clear());
    CONTENT_HEIGHT.with(|c| c.borrow_mut().clear());
    SCROLL.with(|c| c.borrow_mut().clear());
    FLAGS.with(|c| c.borrow_mut().clear());
    SCROLL_INTO_VIEW_CALLS.with(|c| c.borrow_mut().clear());
    ON_MOUSE_DOWN.with(|c| c.borrow_mut().clear());
    ON_CLICK.with(|c| c.borrow_mut().clear());
    ON_KEY.with(|c| c.borrow_mut().clear());
}

// =============================================================================
// IDENTITY
// =============================================================================

pub fn set_kind(index: usize, kind: NodeKind) {
    KIND.with(|c| set_slot(&mut c.borrow_mut(), index, kind));
}

pub fn get_kind(index: usize) -> NodeKind {
    KIND.with(|c| c.borrow().get(index).copied().unwrap_or_default())
}

pub fn set_parent(index: usize, parent: Option<usize>) {
    PARENT.with(|c| set_slot(&mut c.borrow_mut(), index, parent));
}

pub fn get_parent(index: usize) -> Option<usize> {
    PARENT.with(|c| c.borrow().get(index).copied().flatten())
}

// =============================================================================
// ATTRIBUTES - the external styling/testing contract surface
// =============================================================================

/// Set an attribute. Boolean `data-*` hooks use an empty value and rely on
/// presence/absence.
pub fn set_attr(index: usize, name: &str, value: &str) {
    ATTRS.with(|c| {
        if let Some(map) = c.borrow_mut().get_mut(index) {
            map.insert(name.to_string(), value.to_string());
        }
    });
}

pub fn remove_attr(index: usize, name: &str) {
    ATTRS.with(|c| {
        if let Some(map) = c.borrow_mut().get_mut(index) {
            map.remove(name);
        }
    });
}

pub fn get_attr(index: usize, name: &str) -> Option<String> {
    ATTRS.with(|c| c.borrow().get(index).and_then(|m| m.get(name).cloned()))
}

pub fn has_attr(index: usize, name: &str) -> bool {
    ATTRS.with(|c| {
        c.borrow()
            .get(index)
            .map(|m| m.contains_key(name))
            .unwrap_or(false)
    })
}

// =============================================================================
// TEXT CONTENT
// =============================================================================

pub fn set_text(index: usize, content: impl Into<String>) {
    TEXT.with(|c| set_slot(&mut c.borrow_mut(), index, Some(TextContent::Static(content.into()))));
}

pub fn set_text_getter(index: usize, getter: impl Fn() -> String + 'static) {
    TEXT.with(|c| set_slot(&mut c.borrow_mut(), index, Some(TextContent::Getter(Rc::new(getter)))));
}

/// Evaluate the node's text. Getter-backed content reflects live state.
pub fn get_text(index: usize) -> String {
    let content = TEXT.with(|c| c.borrow().get(index).cloned().flatten());
    match content {
        Some(TextContent::Static(s)) => s,
        Some(TextContent::Getter(f)) => f(),
        None => String::new(),
    }
}

// =============================================================================
// GEOMETRY
// =============================================================================

pub fn set_offset(index: usize, offset: u32) {
    OFFSET.with(|c| set_slot(&mut c.borrow_mut(), index, offset));
}

pub fn get_offset(index: usize) -> u32 {
    OFFSET.with(|c| c.borrow().get(index).copied().unwrap_or(0))
}

pub fn set_height(index: usize, height: u32) {
    HEIGHT.with(|c| set_slot(&mut c.borrow_mut(), index, height));
}

pub fn get_height(index: usize) -> u32 {
    HEIGHT.with(|c| c.borrow().get(index).copied().unwrap_or(0))
}

pub fn set_viewport_height(index: usize, height: u32) {
    VIEWPORT.with(|c| set_slot(&mut c.borrow_mut(), index, height));
}

pub fn get_viewport_height(index: usize) -> u32 {
    VIEWPORT.with(|c| c.borrow().get(index).copied().unwrap_or(0))
}

pub fn set_content_height(index: usize, height: u32) {
    CONTENT_HEIGHT.with(|c| set_slot(&mut c.borrow_mut(), index, height));
}

pub fn get_content_height(index: usize) -> u32 {
    CONTENT_HEIGHT.with(|c| c.borrow().get(index).copied().unwrap_or(0))
}

/// Attach the list node's reactive scroll offset.
pub fn set_scroll_signal(index: usize, scroll: Signal<u32>) {
    SCROLL.with(|c| set_slot(&mut c.borrow_mut(), index, Some(scroll)));
}

/// The list node's scroll signal, creating one lazily for bare nodes.
pub fn scroll_signal(index: usize) -> Signal<u32> {
    let existing = SCROLL.with(|c| c.borrow().get(index).cloned().flatten());
    match existing {
        Some(s) => s,
        None => {
            let s = signal(0u32);
            set_scroll_signal(index, s.clone());
            s
        }
    }
}

// =============================================================================
// ROW STATE
// =============================================================================

pub fn set_flags(index: usize, flags: RowFlags) {
    FLAGS.with(|c| set_slot(&mut c.borrow_mut(), index, flags));
}

pub fn get_flags(index: usize) -> RowFlags {
    FLAGS.with(|c| c.borrow().get(index).copied().unwrap_or_default())
}

/// Count one focus-follow scroll request against a row.
pub fn bump_scroll_into_view(index: usize) {
    SCROLL_INTO_VIEW_CALLS.with(|c| {
        if let Some(n) = c.borrow_mut().get_mut(index) {
            *n += 1;
        }
    });
}

pub fn get_scroll_into_view_calls(index: usize) -> u32 {
    SCROLL_INTO_VIEW_CALLS.with(|c| c.borrow().get(index).copied().unwrap_or(0))
}

// =============================================================================
// EVENT HANDLERS
// =============================================================================

pub fn set_mouse_down_handler(index: usize, handler: MouseHandler) {
    ON_MOUSE_DOWN.with(|c| set_slot(&mut c.borrow_mut(), index, Some(handler)));
}

pub fn get_mouse_down_handler(index: usize) -> Option<MouseHandler> {
    ON_MOUSE_DOWN.with(|c| c.borrow().get(index).cloned().flatten())
}

pub fn set_click_handler(index: usize, handler: MouseHandler) {
    ON_CLICK.with(|c| set_slot(&mut c.borrow_mut(), index, Some(handler)));
}

pub fn get_click_handler(index: usize) -> Option<MouseHandler> {
    ON_CLICK.with(|c| c.borrow().get(index).cloned().flatten())
}

pub fn set_key_handler(index: usize, handler: KeyHandler) {
    ON_KEY.with(|c| set_slot(&mut c.borrow_mut(), index, Some(handler)));
}

pub fn get_key_handler(index: usize) -> Option<KeyHandler> {
    ON_KEY.with(|c| c.borrow().get(index).cloned().flatten())
}

// =============================================================================
// QUERIES
// =============================================================================

/// All live node indices of one kind, ascending.
pub fn nodes_of_kind(kind: NodeKind) -> Vec<usize> {
    KIND.with(|c| {
        c.borrow()
            .iter()
            .enumerate()
            .filter(|(_, k)| **k == kind)
            .map(|(i, _)| i)
            .collect()
    })
}

/// Direct children of a node, ascending.
pub fn children_of(index: usize) -> Vec<usize> {
    PARENT.with(|c| {
        c.borrow()
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == Some(index))
            .map(|(i, _)| i)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() {
        reset();
    }

    #[test]
    fn test_attrs_presence() {
        setup();
        ensure_capacity(0);
        assert!(!has_attr(0, "data-disabled"));
        set_attr(0, "data-disabled", "");
        assert!(has_attr(0, "data-disabled"));
        remove_attr(0, "data-disabled");
        assert!(!has_attr(0, "data-disabled"));
    }

    #[test]
    fn test_text_getter_reflects_live_state() {
        setup();
        ensure_capacity(0);
        let source = std::rc::Rc::new(std::cell::RefCell::new("a".to_string()));
        let source_clone = source.clone();
        set_text_getter(0, move || source_clone.borrow().clone());
        assert_eq!(get_text(0), "a");
        *source.borrow_mut() = "b".to_string();
        assert_eq!(get_text(0), "b");
    }

    #[test]
    fn test_clear_at_resets_slot() {
        setup();
        ensure_capacity(1);
        set_kind(1, NodeKind::OptionRow);
        set_offset(1, 12);
        set_attr(1, "data-focused", "");
        clear_at(1);
        assert_eq!(get_kind(1), NodeKind::Empty);
        assert_eq!(get_offset(1), 0);
        assert!(!has_attr(1, "data-focused"));
    }

    #[test]
    fn test_children_and_kind_queries() {
        setup();
        ensure_capacity(3);
        set_kind(0, NodeKind::List);
        set_kind(1, NodeKind::OptionRow);
        set_kind(2, NodeKind::OptionRow);
        set_parent(1, Some(0));
        set_parent(2, Some(0));
        assert_eq!(children_of(0), vec![1, 2]);
        assert_eq!(nodes_of_kind(NodeKind::OptionRow), vec![1, 2]);
    }

    #[test]
    fn test_scroll_signal_lazy_creation() {
        setup();
        ensure_capacity(0);
        let s = scroll_signal(0);
        s.set(7);
        // Second lookup returns the same signal.
        assert_eq!(scroll_signal(0).get(), 7);
    }
}
