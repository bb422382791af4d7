//! Interaction state - keyboard, mouse, focus, and scroll.
//!
//! Raw terminal events are converted into crate event types here and
//! dispatched through the node tree with bubbling and stop-propagation.

pub mod focus;
pub mod keyboard;
pub mod mouse;
pub mod scroll;

pub use focus::{blur, focus, get_focused_index, has_focus, is_focused, FocusCallbacks};
pub use keyboard::{KeyState, KeyboardEvent, Modifiers};
pub use mouse::{MouseAction, MouseButton, MouseEvent};
