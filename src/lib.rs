//! # tui-select
//!
//! Reactive select (dropdown) component for terminal UIs, with option-list
//! virtualization.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! fine-grained reactivity.
//!
//! ## Architecture
//!
//! The widget renders into a retained node tree using a parallel-arrays
//! architecture: nodes are indices into columnar arrays (kind, parent,
//! attributes, text, geometry, handlers) rather than objects. State lives in
//! a [`SelectionEngine`]; the renderers are thin reactive projections of it:
//!
//! ```text
//! SelectionEngine signals → effects → node tree (attrs, text, rows) → events back in
//! ```
//!
//! Only the option rows intersecting the list viewport (plus overscan) exist
//! as nodes; a full-height spacer keeps the scroll range correct for the
//! entire filtered option count.
//!
//! ## Modules
//!
//! - [`types`] - Core types (SelectOption, PropValue, RowFlags, Cleanup)
//! - [`engine`] - Node registry and columnar node state
//! - [`state`] - Keyboard/mouse dispatch, focus, scroll operations
//! - [`select`] - The widget: engine, context bridge, virtual list, shell

pub mod engine;
pub mod select;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::{Cleanup, PropValue, RowFlags, SelectOption};

pub use engine::{
    allocate_node, get_current_parent_index, get_node_id, get_node_index, is_live, live_count,
    live_indices, on_destroy, pop_parent_context, push_parent_context, release_node,
    reset_registry, KeyHandler, MouseHandler, NodeKind,
};

pub use state::{
    blur, focus, get_focused_index, has_focus, is_focused, FocusCallbacks, KeyState,
    KeyboardEvent, Modifiers, MouseAction, MouseButton, MouseEvent,
};

pub use select::{
    compute_window, provide_engine, select, try_use_engine, use_engine, ContextError, ListProps,
    SelectCore, SelectHandle, SelectProps, SelectionEngine, VirtualRow,
};
