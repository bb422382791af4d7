//! Select widget - a filterable dropdown with a virtualized option list.
//!
//! [`select`] composes the pieces: the interaction shell (container, control,
//! committed-value area, text input), the virtualized option list, and one
//! [`SelectionEngine`] handle shared through the Context Bridge for the
//! duration of the instance's construction. Inside the crate the handle is
//! passed explicitly; the bridge exists for custom renderers composed at the
//! widget boundary.

pub mod context;
pub(crate) mod option_row;
pub mod selection;
pub mod shell;
pub mod virtual_list;

use std::rc::Rc;

pub use context::{provide_engine, try_use_engine, use_engine, ContextError};
pub use selection::{SelectCore, SelectionEngine};
pub use virtual_list::{compute_window, ListProps, VirtualRow};

use crate::engine::{pop_parent_context, push_parent_context};
use crate::types::Cleanup;

/// Props for [`select`].
pub struct SelectProps {
    /// The selection state engine driving this instance.
    pub engine: Rc<dyn SelectionEngine>,
    /// Text shown in single mode while nothing is committed.
    pub placeholder: String,
    /// Option list configuration.
    pub list: ListProps,
}

impl SelectProps {
    pub fn new(engine: Rc<dyn SelectionEngine>) -> Self {
        Self {
            engine,
            placeholder: "Select...".to_string(),
            list: ListProps::default(),
        }
    }
}

/// A mounted select widget.
///
/// Holds the shell's node indices for event routing and tears the whole
/// instance down on [`SelectHandle::unmount`] or drop.
pub struct SelectHandle {
    pub container: usize,
    pub control: usize,
    pub input: usize,
    cleanup: Option<Cleanup>,
}

impl SelectHandle {
    /// Unmount the widget, releasing its nodes and effects.
    pub fn unmount(mut self) {
        self.run_cleanup();
    }

    fn run_cleanup(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

impl Drop for SelectHandle {
    fn drop(&mut self) {
        self.run_cleanup();
    }
}

/// Mount a select widget under the current parent context.
pub fn select(props: SelectProps) -> SelectHandle {
    let SelectProps {
        engine,
        placeholder,
        list,
    } = props;

    provide_engine(engine, move || {
        // Widget boundary: resolve the handle through the bridge, exactly
        // as an externally composed renderer would.
        let engine = use_engine();

        let (nodes, shell_cleanup) = shell::interaction_shell(engine.clone(), placeholder);

        push_parent_context(nodes.container);
        let list_cleanup = virtual_list::option_list(engine, list);
        pop_parent_context();

        SelectHandle {
            container: nodes.container,
            control: nodes.control,
            input: nodes.input,
            cleanup: Some(Box::new(move || {
                list_cleanup();
                shell_cleanup();
            })),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::arrays::{self, NodeKind};
    use crate::engine::{live_count, reset_registry};
    use crate::state::focus::reset_focus_state;
    use crate::state::keyboard::{self, KeyboardEvent};
    use crate::state::mouse::{self, MouseEvent};
    use crate::types::SelectOption;

    fn setup() {
        reset_registry();
        reset_focus_state();
    }

    fn countries() -> Vec<SelectOption> {
        ["Norway", "Sweden", "Denmark", "Finland", "Iceland"]
            .into_iter()
            .map(SelectOption::labeled)
            .collect()
    }

    #[test]
    fn test_select_mounts_shell_without_list() {
        setup();
        let core = Rc::new(SelectCore::new(countries()));
        let handle = select(SelectProps::new(core));

        assert_eq!(arrays::get_kind(handle.container), NodeKind::Container);
        assert_eq!(arrays::get_kind(handle.input), NodeKind::Input);
        assert!(arrays::nodes_of_kind(NodeKind::List).is_empty());
        assert!(arrays::nodes_of_kind(NodeKind::OptionRow).is_empty());
    }

    #[test]
    fn test_full_flow_type_navigate_commit() {
        setup();
        let core = Rc::new(SelectCore::new(countries()));
        let handle = select(SelectProps::new(core.clone()));

        mouse::dispatch_mouse_down(handle.container, &MouseEvent::down(0, 0));
        assert!(core.is_open());

        for key in ["e", "n"] {
            keyboard::dispatch(handle.input, &KeyboardEvent::new(key));
        }
        // "en" matches Sweden and Denmark.
        assert_eq!(core.options().len(), 2);
        assert_eq!(arrays::nodes_of_kind(NodeKind::OptionRow).len(), 2);

        keyboard::dispatch(handle.input, &KeyboardEvent::new("ArrowDown"));
        keyboard::dispatch(handle.input, &KeyboardEvent::new("ArrowDown"));
        keyboard::dispatch(handle.input, &KeyboardEvent::new("Enter"));

        let value = core.value();
        assert_eq!(value.len(), 1);
        assert_eq!(value[0].key, "Denmark");
        assert!(!core.is_open());
        assert!(arrays::nodes_of_kind(NodeKind::OptionRow).is_empty());

        let label = arrays::nodes_of_kind(NodeKind::Label)[0];
        assert_eq!(arrays::get_text(label), "Denmark");
    }

    #[test]
    fn test_two_instances_stay_isolated() {
        setup();
        let first = Rc::new(SelectCore::new(countries()));
        let second = Rc::new(SelectCore::new(countries()).with_multiple());

        let first_handle = select(SelectProps::new(first.clone()));
        let second_handle = select(SelectProps::new(second.clone()));
        assert_ne!(first_handle.container, second_handle.container);

        mouse::dispatch_mouse_down(first_handle.container, &MouseEvent::down(0, 0));
        assert!(first.is_open());
        assert!(!second.is_open());

        second.set_value(vec![SelectOption::labeled("Norway")]);
        assert!(second.has_value());
        assert!(!first.has_value());

        // The bridge is scoped to construction; nothing lingers afterwards.
        assert!(try_use_engine().is_err());
    }

    #[test]
    fn test_unmount_releases_every_node() {
        setup();
        let core = Rc::new(SelectCore::new(countries()));
        let handle = select(SelectProps::new(core.clone()));
        mouse::dispatch_mouse_down(handle.container, &MouseEvent::down(0, 0));
        assert!(live_count() > 0);

        handle.unmount();
        assert_eq!(live_count(), 0);
    }

    #[test]
    fn test_drop_unmounts_too() {
        setup();
        let core = Rc::new(SelectCore::new(countries()));
        {
            let _handle = select(SelectProps::new(core));
            assert!(live_count() > 0);
        }
        assert_eq!(live_count(), 0);
    }
}
