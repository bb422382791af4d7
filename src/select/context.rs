//! Context Bridge - shared engine handle per widget instance.
//!
//! One select widget owns one engine handle. During the synchronous
//! construction of that widget's subtree the handle is available to every
//! descendant renderer through [`use_engine`], so custom renderers do not
//! need the handle threaded through each call.
//!
//! The bridge is strictly scoped to the widget-instance boundary: handles
//! are pushed for the duration of one `provide_engine` call and popped
//! afterwards, so two widget instances can never observe each other's
//! engine. There is no default engine; using the accessor outside an
//! instance is a composition bug and fails fast.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use super::selection::SelectionEngine;

/// Context lookup failure. Indicates a structural composition bug, not a
/// runtime condition.
#[derive(Debug, Error)]
pub enum ContextError {
    /// The accessor ran outside a select widget instance.
    #[error(
        "no enclosing select widget instance: the engine handle is only available \
         to renderers created inside `select()`"
    )]
    MissingContext,
}

thread_local! {
    static ENGINE_STACK: RefCell<Vec<Rc<dyn SelectionEngine>>> = RefCell::new(Vec::new());
}

/// Make `engine` the ambient handle while `f` builds one widget instance.
///
/// Nesting is supported; the innermost instance wins, mirroring the node
/// tree's parent-context stack.
pub fn provide_engine<R>(engine: Rc<dyn SelectionEngine>, f: impl FnOnce() -> R) -> R {
    ENGINE_STACK.with(|stack| stack.borrow_mut().push(engine));
    let result = f();
    ENGINE_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });
    result
}

/// The engine handle of the nearest enclosing widget instance.
pub fn try_use_engine() -> Result<Rc<dyn SelectionEngine>, ContextError> {
    ENGINE_STACK
        .with(|stack| stack.borrow().last().cloned())
        .ok_or(ContextError::MissingContext)
}

/// The engine handle of the nearest enclosing widget instance.
///
/// # Panics
///
/// Panics when called outside a widget instance. There is deliberately no
/// fallback engine; see [`try_use_engine`] for the fallible form.
pub fn use_engine() -> Rc<dyn SelectionEngine> {
    match try_use_engine() {
        Ok(engine) => engine,
        Err(err) => panic!("{err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::selection::SelectCore;
    use crate::types::SelectOption;

    fn engine() -> Rc<dyn SelectionEngine> {
        Rc::new(SelectCore::new(vec![SelectOption::labeled("a")]))
    }

    #[test]
    fn test_handle_available_inside_instance() {
        let result = provide_engine(engine(), || try_use_engine().is_ok());
        assert!(result);
    }

    #[test]
    fn test_missing_context_outside_instance() {
        assert!(matches!(
            try_use_engine(),
            Err(ContextError::MissingContext)
        ));
    }

    #[test]
    #[should_panic(expected = "no enclosing select widget instance")]
    fn test_use_engine_panics_outside_instance() {
        let _ = use_engine();
    }

    #[test]
    fn test_handle_popped_after_instance() {
        provide_engine(engine(), || {});
        assert!(try_use_engine().is_err());
    }

    #[test]
    fn test_nested_instances_resolve_innermost() {
        let outer = engine();
        let inner: Rc<dyn SelectionEngine> =
            Rc::new(SelectCore::new(vec![SelectOption::labeled("inner")]));
        let inner_for_check = inner.clone();

        provide_engine(outer, || {
            provide_engine(inner, move || {
                let resolved = use_engine();
                assert!(Rc::ptr_eq(&resolved, &inner_for_check));
            });
        });
    }
}
