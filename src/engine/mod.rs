//! Node tree engine - registry and columnar node state.
//!
//! Renderers materialize into a retained node tree: each node is an index
//! into parallel columns (kind, parent, attributes, text, geometry,
//! handlers). The registry manages index lifecycle; `arrays` holds the
//! per-node state the interaction and virtualization layers read and write.

pub mod arrays;
pub mod registry;

pub use arrays::{KeyHandler, MouseHandler, NodeKind, TextContent};
pub use registry::{
    allocate_node, get_current_parent_index, get_node_id, get_node_index, is_live, live_count,
    live_indices, on_destroy, pop_parent_context, push_parent_context, release_node,
    reset_registry,
};
