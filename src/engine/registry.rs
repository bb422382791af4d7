//! Node registry - index allocation for the node tree.
//!
//! Manages the lifecycle of node indices:
//! - ID ↔ index bidirectional mapping
//! - free index pool for O(1) reuse
//! - ReactiveSet for live indices (effects react to add/remove)
//! - parent context stack for nested node creation

use std::cell::RefCell;
use std::collections::HashMap;

use spark_signals::{batch, ReactiveSet};

use super::arrays;

// =============================================================================
// Registry State
// =============================================================================

thread_local! {
    /// Map node ID to array index.
    static ID_TO_INDEX: RefCell<HashMap<String, usize>> = RefCell::new(HashMap::new());

    /// Map array index to node ID.
    static INDEX_TO_ID: RefCell<HashMap<usize, String>> = RefCell::new(HashMap::new());

    /// Set of currently live indices. ReactiveSet so effects that iterate
    /// the tree automatically react when nodes are added or removed.
    /// Mutation requires `&mut`, hence the RefCell.
    static LIVE_INDICES: RefCell<ReactiveSet<usize>> = RefCell::new(ReactiveSet::new());

    /// Pool of freed indices for reuse.
    static FREE_INDICES: RefCell<Vec<usize>> = RefCell::new(Vec::new());

    /// Next index to allocate if the pool is empty.
    static NEXT_INDEX: RefCell<usize> = const { RefCell::new(0) };

    /// Counter for generating unique IDs.
    static ID_COUNTER: RefCell<usize> = const { RefCell::new(0) };

    /// Stack of parent indices for nested node creation.
    static PARENT_STACK: RefCell<Vec<usize>> = RefCell::new(Vec::new());

    /// Destroy callbacks registered per index.
    static DESTROY_CALLBACKS: RefCell<HashMap<usize, Vec<Box<dyn FnOnce()>>>> =
        RefCell::new(HashMap::new());
}

// =============================================================================
// Parent Context Stack
// =============================================================================

/// Current parent index, or None at the root.
pub fn get_current_parent_index() -> Option<usize> {
    PARENT_STACK.with(|stack| stack.borrow().last().copied())
}

/// Push a parent index onto the stack.
pub fn push_parent_context(index: usize) {
    PARENT_STACK.with(|stack| stack.borrow_mut().push(index));
}

/// Pop a parent index from the stack.
pub fn pop_parent_context() {
    PARENT_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });
}

// =============================================================================
// Index Allocation
// =============================================================================

/// Allocate an index for a new node.
///
/// If `id` is not provided, one is generated. Allocating an existing ID
/// returns its current index.
pub fn allocate_node(id: Option<&str>) -> usize {
    let node_id = match id {
        Some(id) => id.to_string(),
        None => ID_COUNTER.with(|counter| {
            let mut counter = counter.borrow_mut();
            let id = format!("n{}", *counter);
            *counter += 1;
            id
        }),
    };

    let existing = ID_TO_INDEX.with(|map| map.borrow().get(&node_id).copied());
    if let Some(index) = existing {
        return index;
    }

    // Reuse a free index or allocate a new one.
    let index = FREE_INDICES.with(|free| {
        let mut free = free.borrow_mut();
        if let Some(index) = free.pop() {
            index
        } else {
            NEXT_INDEX.with(|next| {
                let mut next = next.borrow_mut();
                let index = *next;
                *next += 1;
                index
            })
        }
    });

    ID_TO_INDEX.with(|map| {
        map.borrow_mut().insert(node_id.clone(), index);
    });
    INDEX_TO_ID.with(|map| {
        map.borrow_mut().insert(index, node_id);
    });
    // Batched so subscribers run after the set borrow is released.
    batch(|| {
        LIVE_INDICES.with(|set| {
            set.borrow_mut().insert(index);
        });
    });

    arrays::ensure_capacity(index);

    index
}

/// Release an index back to the pool.
///
/// Also recursively releases all children.
pub fn release_node(index: usize) {
    let id = INDEX_TO_ID.with(|map| map.borrow().get(&index).cloned());
    let Some(id) = id else { return };

    // Collect children first to avoid modifying while iterating.
    let children: Vec<usize> = LIVE_INDICES.with(|set| {
        set.borrow()
            .iter()
            .copied()
            .filter(|&child| arrays::get_parent(child) == Some(index))
            .collect()
    });
    for child in children {
        release_node(child);
    }

    run_destroy_callbacks(index);

    ID_TO_INDEX.with(|map| {
        map.borrow_mut().remove(&id);
    });
    INDEX_TO_ID.with(|map| {
        map.borrow_mut().remove(&index);
    });
    batch(|| {
        LIVE_INDICES.with(|set| {
            set.borrow_mut().remove(&index);
        });
    });

    arrays::clear_at(index);

    FREE_INDICES.with(|free| {
        free.borrow_mut().push(index);
    });

    // When the tree empties, reset all columns to free memory.
    let is_empty = LIVE_INDICES.with(|set| set.borrow().is_empty());
    if is_empty {
        arrays::reset();
        FREE_INDICES.with(|free| free.borrow_mut().clear());
        NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    }
}

// =============================================================================
// Destroy Callbacks
// =============================================================================

/// Register a callback to run when the node is released.
pub fn on_destroy(index: usize, callback: impl FnOnce() + 'static) {
    DESTROY_CALLBACKS.with(|map| {
        map.borrow_mut()
            .entry(index)
            .or_default()
            .push(Box::new(callback));
    });
}

fn run_destroy_callbacks(index: usize) {
    let callbacks = DESTROY_CALLBACKS.with(|map| map.borrow_mut().remove(&index));
    if let Some(callbacks) = callbacks {
        for callback in callbacks {
            callback();
        }
    }
}

// =============================================================================
// Lookups
// =============================================================================

/// Index for a node ID, if allocated.
pub fn get_node_index(id: &str) -> Option<usize> {
    ID_TO_INDEX.with(|map| map.borrow().get(id).copied())
}

/// ID for a node index, if allocated.
pub fn get_node_id(index: usize) -> Option<String> {
    INDEX_TO_ID.with(|map| map.borrow().get(&index).cloned())
}

/// Whether an index is currently live. Reactive.
pub fn is_live(index: usize) -> bool {
    LIVE_INDICES.with(|set| set.borrow().contains(&index))
}

/// All live indices. Reactive: effects that call this re-run on add/remove.
pub fn live_indices() -> Vec<usize> {
    LIVE_INDICES.with(|set| set.borrow().iter().copied().collect())
}

/// Number of live nodes.
pub fn live_count() -> usize {
    live_indices().len()
}

// =============================================================================
// Reset (tests)
// =============================================================================

/// Reset the registry and all node columns. Test helper.
pub fn reset_registry() {
    for index in live_indices() {
        // Drop callbacks without running them; the tree is being torn down.
        DESTROY_CALLBACKS.with(|map| {
            map.borrow_mut().remove(&index);
        });
        batch(|| {
            LIVE_INDICES.with(|set| {
                set.borrow_mut().remove(&index);
            });
        });
    }
    ID_TO_INDEX.with(|map| map.borrow_mut().clear());
    INDEX_TO_ID.with(|map| map.borrow_mut().clear());
    FREE_INDICES.with(|free| free.borrow_mut().clear());
    NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    ID_COUNTER.with(|counter| *counter.borrow_mut() = 0);
    PARENT_STACK.with(|stack| stack.borrow_mut().clear());
    DESTROY_CALLBACKS.with(|map| map.borrow_mut().clear());
    arrays::reset();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::arrays::NodeKind;

    fn setup() {
        reset_registry();
    }

    #[test]
    fn test_allocate_generates_ids() {
        setup();
        let a = allocate_node(None);
        let b = allocate_node(None);
        assert_ne!(a, b);
        assert_ne!(get_node_id(a), get_node_id(b));
    }

    #[test]
    fn test_allocate_same_id_returns_same_index() {
        setup();
        let a = allocate_node(Some("widget"));
        let b = allocate_node(Some("widget"));
        assert_eq!(a, b);
        assert_eq!(live_count(), 1);
    }

    #[test]
    fn test_release_recycles_index() {
        setup();
        let a = allocate_node(None);
        let _keep = allocate_node(None);
        release_node(a);
        let c = allocate_node(None);
        assert_eq!(c, a, "freed index should be reused");
    }

    #[test]
    fn test_release_is_recursive() {
        setup();
        let parent = allocate_node(Some("parent"));
        push_parent_context(parent);
        let child = allocate_node(None);
        arrays::set_parent(child, Some(parent));
        pop_parent_context();

        assert_eq!(live_count(), 2);
        release_node(parent);
        assert_eq!(live_count(), 0);
        assert!(!is_live(child));
    }

    #[test]
    fn test_destroy_callbacks_run_on_release() {
        setup();
        let fired = std::rc::Rc::new(std::cell::Cell::new(false));
        let fired_clone = fired.clone();

        let index = allocate_node(None);
        let _keep = allocate_node(None);
        on_destroy(index, move || fired_clone.set(true));
        release_node(index);
        assert!(fired.get(), "destroy callback should run on release");
    }

    #[test]
    fn test_parent_context_stack() {
        setup();
        assert_eq!(get_current_parent_index(), None);
        let index = allocate_node(None);
        push_parent_context(index);
        assert_eq!(get_current_parent_index(), Some(index));
        pop_parent_context();
        assert_eq!(get_current_parent_index(), None);
    }

    #[test]
    fn test_live_set_is_reactive() {
        setup();
        let seen = std::rc::Rc::new(std::cell::Cell::new(0usize));
        let seen_clone = seen.clone();
        let _dispose = spark_signals::effect(move || {
            seen_clone.set(live_count());
        });
        assert_eq!(seen.get(), 0);

        let a = allocate_node(None);
        let _keep = allocate_node(None);
        assert_eq!(seen.get(), 2, "effect re-runs on allocation");
        release_node(a);
        assert_eq!(seen.get(), 1, "effect re-runs on release");
    }

    #[test]
    fn test_auto_reset_when_tree_empties() {
        setup();
        let a = allocate_node(None);
        arrays::set_kind(a, NodeKind::Container);
        release_node(a);
        // Columns were reset wholesale; fresh allocation starts from zero.
        let b = allocate_node(None);
        assert_eq!(b, 0);
        assert_eq!(arrays::get_kind(b), NodeKind::Empty);
    }
}
