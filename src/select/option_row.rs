//! Option Row Renderer - one materialized row of the virtual window.
//!
//! A row is addressed by its position in the *filtered* option list. Its
//! label is a getter over the engine, so a filter change that shifts which
//! option sits at this position updates the existing row instead of
//! recreating it. Attributes and flags are written by [`sync`], which the
//! list's reconciliation effect calls on every run; the signal reads inside
//! it become that effect's dependencies.
//!
//! Focus-follow: the slot remembers whether its option was focused on the
//! previous sync. On the transition from unfocused to focused the row asks
//! the list to scroll it into view (nearest edge) exactly once. A state that
//! stays focused across syncs requests nothing further.

use std::rc::Rc;

use tracing::debug;

use crate::engine::arrays::{self, NodeKind};
use crate::engine::{allocate_node, release_node};
use crate::select::selection::SelectionEngine;
use crate::select::virtual_list::VirtualRow;
use crate::state::scroll;
use crate::types::RowFlags;

/// A materialized row and its focus-transition memory.
pub(crate) struct RowSlot {
    node: usize,
    index: usize,
    was_focused: bool,
}

impl RowSlot {
    pub(crate) fn node(&self) -> usize {
        self.node
    }
}

/// Materialize one option row inside `list` at the window position `row`.
pub(crate) fn mount(engine: Rc<dyn SelectionEngine>, list: usize, row: VirtualRow) -> RowSlot {
    let node = allocate_node(None);
    arrays::set_kind(node, NodeKind::OptionRow);
    arrays::set_parent(node, Some(list));
    arrays::set_offset(node, row.offset);
    arrays::set_height(node, row.size);

    let index = row.index;

    let text_engine = engine.clone();
    arrays::set_text_getter(node, move || {
        text_engine
            .options()
            .get(index)
            .map(|o| o.label.clone())
            .unwrap_or_default()
    });

    // Picks are forwarded verbatim; the engine enforces the disabled no-op.
    arrays::set_click_handler(
        node,
        Rc::new(move |_event| {
            if let Some(option) = engine.options().get(index) {
                engine.pick_option(option);
            }
            true
        }),
    );

    RowSlot {
        node,
        index,
        was_focused: false,
    }
}

/// Bring the row's attributes and flags in line with the engine's state.
///
/// Called from inside the list's reconciliation effect.
pub(crate) fn sync(engine: &dyn SelectionEngine, list: usize, slot: &mut RowSlot) {
    let options = engine.options();
    let Some(option) = options.get(slot.index) else {
        // The window outran the options for a frame; reconciliation drops
        // this row on its next pass.
        debug!(index = slot.index, "row position past current options");
        arrays::set_flags(slot.node, RowFlags::empty());
        return;
    };

    let mut flags = RowFlags::empty();
    if engine.is_option_disabled(option) {
        flags.insert(RowFlags::DISABLED);
        arrays::set_attr(slot.node, "data-disabled", "");
    } else {
        arrays::remove_attr(slot.node, "data-disabled");
    }

    let focused = engine.is_option_focused(option);
    if focused {
        flags.insert(RowFlags::FOCUSED);
        arrays::set_attr(slot.node, "data-focused", "");
    } else {
        arrays::remove_attr(slot.node, "data-focused");
    }
    arrays::set_flags(slot.node, flags);

    if focused && !slot.was_focused {
        scroll::scroll_into_view(list, slot.node);
    }
    slot.was_focused = focused;
}

/// Tear the row down and release its node.
pub(crate) fn unmount(slot: RowSlot) {
    release_node(slot.node);
}
