//! Virtualized List Renderer - windowed materialization of the option list.
//!
//! Only the rows whose cell range intersects the viewport (plus a small
//! overscan) exist as nodes; a spacer spanning `count x row_height` keeps the
//! scroll range honest no matter how few rows are materialized.
//!
//! One reconciliation effect, created at mount, drives the whole renderer:
//! it resolves the mode (closed / loading / empty / rows), swaps branch
//! nodes when the mode changed, and inside the rows branch re-derives the
//! window and diffs it against the materialized slots, keyed by row
//! position. Kept slots are re-synced on every run so their attributes and
//! flags follow the engine.
//!
//! The window and the options it indexes into come from separate reactive
//! reads, so one recomputation can briefly hold positions past the current
//! option count. Those positions are dropped here without rendering; the
//! next run sees consistent inputs.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use spark_signals::{effect, effect_scope, on_scope_dispose, signal};
use tracing::{debug, trace};

use crate::engine::arrays::{self, NodeKind};
use crate::engine::{allocate_node, get_current_parent_index, release_node};
use crate::select::option_row::{self, RowSlot};
use crate::select::selection::SelectionEngine;
use crate::types::{Cleanup, PropValue, SelectOption};

pub const DEFAULT_ROW_HEIGHT: u32 = 1;
pub const DEFAULT_OVERSCAN: u32 = 1;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 8;

// =============================================================================
// WINDOWING
// =============================================================================

/// One row of the virtual window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VirtualRow {
    /// Position in the filtered option list.
    pub index: usize,
    /// Top edge within the list content, in cells.
    pub offset: u32,
    /// Row height in cells.
    pub size: u32,
    /// Reconciliation key (the position; labels may repeat, positions not).
    pub key: usize,
}

/// Rows whose cell range `[index * row_height, +row_height)` intersects the
/// viewport `[scroll_offset, +viewport_height)`, extended by `overscan` rows
/// on both sides and clamped to `[0, count)`.
///
/// Degenerate inputs (no options, collapsed viewport, zero row height)
/// produce an empty window.
pub fn compute_window(
    count: usize,
    scroll_offset: u32,
    viewport_height: u32,
    row_height: u32,
    overscan: u32,
) -> Vec<VirtualRow> {
    if count == 0 || viewport_height == 0 || row_height == 0 {
        return Vec::new();
    }

    let first_visible = (scroll_offset / row_height) as usize;
    // Last visible row, exclusive: ceiling of the viewport bottom edge.
    let last_visible = ((scroll_offset + viewport_height).div_ceil(row_height)) as usize;

    let first = first_visible.saturating_sub(overscan as usize);
    let last = (last_visible + overscan as usize).min(count);

    (first..last)
        .map(|index| VirtualRow {
            index,
            offset: index as u32 * row_height,
            size: row_height,
            key: index,
        })
        .collect()
}

/// Drop window rows whose position has no option behind it.
///
/// The mismatch lasts one recomputation at most; it is recovered here, not
/// reported.
pub fn live_rows(window: &[VirtualRow], options: &[SelectOption]) -> Vec<VirtualRow> {
    window
        .iter()
        .filter(|row| {
            if row.index < options.len() {
                true
            } else {
                debug!(index = row.index, count = options.len(), "dropping stale window row");
                false
            }
        })
        .copied()
        .collect()
}

// =============================================================================
// LIST RENDERER
// =============================================================================

/// Props for [`option_list`].
#[derive(Clone)]
pub struct ListProps {
    /// Visible height of the list, in cells.
    pub viewport_height: PropValue<u32>,
    /// Height of every row, in cells.
    pub row_height: u32,
    /// Extra rows materialized beyond each viewport edge.
    pub overscan: u32,
    /// While true, an open list shows the loading message instead of rows.
    pub loading: PropValue<bool>,
    /// Message shown when the filter matches nothing.
    pub empty_message: String,
    /// Message shown while loading.
    pub loading_message: String,
}

impl Default for ListProps {
    fn default() -> Self {
        Self {
            viewport_height: PropValue::Static(DEFAULT_VIEWPORT_HEIGHT),
            row_height: DEFAULT_ROW_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
            loading: PropValue::Static(false),
            empty_message: "No options".to_string(),
            loading_message: "Loading...".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListMode {
    Closed,
    Loading,
    Empty,
    Rows,
}

/// Branch nodes and row slots owned by the reconciliation effect.
#[derive(Default)]
struct ListState {
    mode: Option<ListMode>,
    list: Option<usize>,
    spacer: Option<usize>,
    message: Option<usize>,
    rows: HashMap<usize, RowSlot>,
}

impl ListState {
    fn teardown_branch(&mut self) {
        for (_, slot) in self.rows.drain() {
            option_row::unmount(slot);
        }
        if let Some(message) = self.message.take() {
            release_node(message);
        }
        if let Some(list) = self.list.take() {
            release_node(list);
        }
        self.spacer = None;
    }
}

/// Render the option list for `engine`.
///
/// Closed lists render nothing at all. Open lists render a message node
/// (loading or empty) or a List node holding the spacer and the
/// materialized window rows.
pub fn option_list(engine: Rc<dyn SelectionEngine>, props: ListProps) -> Cleanup {
    let parent_index = get_current_parent_index();
    let scroll = signal(0u32);
    let scope = effect_scope(false);

    let state: Rc<RefCell<ListState>> = Rc::new(RefCell::new(ListState::default()));
    let state_for_effect = state.clone();
    let state_for_dispose = state;

    let filter_engine = engine.clone();
    let filter_scroll = scroll.clone();

    scope.run(move || {
        // Any filter change forces the window back to the top; the initial
        // run only records the starting value.
        let prev_filter: RefCell<Option<String>> = RefCell::new(None);
        let _filter_effect = effect(move || {
            let current = filter_engine.input_value();
            let mut prev = prev_filter.borrow_mut();
            if let Some(previous) = prev.as_ref() {
                if *previous != current {
                    trace!(filter = %current, "filter changed, scroll reset");
                    filter_scroll.set(0);
                }
            }
            *prev = Some(current);
        });

        // Branch switching and window reconciliation in one flat effect.
        // Effects cannot be created while another effect is running, so
        // everything the renderer reacts to is read here.
        let _list_effect = effect(move || {
            let mode = if !engine.is_open() {
                ListMode::Closed
            } else if props.loading.get() {
                ListMode::Loading
            } else if engine.options().is_empty() {
                ListMode::Empty
            } else {
                ListMode::Rows
            };

            let mut state = state_for_effect.borrow_mut();
            if state.mode != Some(mode) {
                state.mode = Some(mode);
                trace!(?mode, "list mode");
                state.teardown_branch();

                match mode {
                    ListMode::Closed => {}
                    ListMode::Loading => {
                        state.message = Some(message_node(parent_index, &props.loading_message));
                    }
                    ListMode::Empty => {
                        state.message = Some(message_node(parent_index, &props.empty_message));
                    }
                    ListMode::Rows => {
                        let list = allocate_node(None);
                        arrays::set_kind(list, NodeKind::List);
                        arrays::set_parent(list, parent_index);
                        arrays::set_scroll_signal(list, scroll.clone());

                        let spacer = allocate_node(None);
                        arrays::set_kind(spacer, NodeKind::Spacer);
                        arrays::set_parent(spacer, Some(list));

                        state.list = Some(list);
                        state.spacer = Some(spacer);
                    }
                }
            }

            let (Some(list), Some(spacer)) = (state.list, state.spacer) else {
                return;
            };

            // The spacer spans count x row_height for the current filtered
            // count, whatever subset of rows is materialized.
            let options = engine.options();
            let count = options.len() as u32;
            let row_height = props.row_height;
            let viewport = props.viewport_height.get();
            arrays::set_viewport_height(list, viewport);
            arrays::set_content_height(list, count * row_height);
            arrays::set_height(spacer, count * row_height);

            // Shrinking the options can strand the offset past the new
            // maximum; the window is derived from the clamped value here and
            // the signal is pulled back below, once node churn is done.
            let raw_offset = scroll.get();
            let offset = raw_offset.min((count * row_height).saturating_sub(viewport));

            let window = compute_window(options.len(), offset, viewport, row_height, props.overscan);
            let live = live_rows(&window, &options);
            let keep: HashSet<usize> = live.iter().map(|row| row.key).collect();

            let departed: Vec<usize> = state
                .rows
                .keys()
                .filter(|key| !keep.contains(key))
                .copied()
                .collect();
            for key in departed {
                if let Some(slot) = state.rows.remove(&key) {
                    option_row::unmount(slot);
                }
            }

            for row in &live {
                if !state.rows.contains_key(&row.key) {
                    state
                        .rows
                        .insert(row.key, option_row::mount(engine.clone(), list, *row));
                }
            }

            // Scroll writes come after every allocation and release: a write
            // to a signal this effect reads defers a settling re-run to the
            // end of the current flush.
            if offset != raw_offset {
                trace!(raw_offset, offset, "scroll clamped to shrunken content");
                scroll.set(offset);
            }
            for row in &live {
                if let Some(slot) = state.rows.get_mut(&row.key) {
                    option_row::sync(&*engine, list, slot);
                }
            }
        });

        on_scope_dispose(move || {
            state_for_dispose.borrow_mut().teardown_branch();
        });
    });

    Box::new(move || {
        scope.stop();
    })
}

fn message_node(parent: Option<usize>, text: &str) -> usize {
    let node = allocate_node(None);
    arrays::set_kind(node, NodeKind::Message);
    arrays::set_parent(node, parent);
    arrays::set_text(node, text);
    node
}
