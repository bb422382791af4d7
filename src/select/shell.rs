//! Interaction Shell - container, control, input, and committed-value area.
//!
//! The shell owns plumbing, never semantics. Every interaction is forwarded
//! to the engine verbatim; the shell's only own behaviors are focus handoff
//! (any pointer-down inside the widget lands focus on the text input) and
//! the escape fallback (blur the input when the engine leaves an Escape
//! unhandled). The fallback must not run when the engine handled the key:
//! a first Escape closes the list, only a second one drops focus.
//!
//! The input is fully controlled. Its displayed text is a getter over the
//! engine's filter text; keystrokes are translated into `on_input` calls and
//! whatever the engine stores afterwards is what shows.

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{effect, effect_scope, on_scope_dispose};
use tracing::trace;

use crate::engine::arrays::{self, NodeKind};
use crate::engine::{allocate_node, get_current_parent_index, release_node};
use crate::select::selection::SelectionEngine;
use crate::state::focus::{self, FocusCallbacks};
use crate::types::Cleanup;

/// Node indices of the always-visible shell.
pub struct ShellNodes {
    pub container: usize,
    pub control: usize,
    pub input: usize,
}

/// Build the shell for one widget instance.
pub fn interaction_shell(
    engine: Rc<dyn SelectionEngine>,
    placeholder: String,
) -> (ShellNodes, Cleanup) {
    let container = allocate_node(None);
    arrays::set_kind(container, NodeKind::Container);
    arrays::set_parent(container, get_current_parent_index());

    let control = allocate_node(None);
    arrays::set_kind(control, NodeKind::Control);
    arrays::set_parent(control, Some(container));

    let input = allocate_node(None);
    arrays::set_kind(input, NodeKind::Input);
    arrays::set_parent(input, Some(control));

    set_static_attrs(&*engine, container, control, input);

    // Controlled input: the engine's filter text is the only source.
    let text_engine = engine.clone();
    arrays::set_text_getter(input, move || text_engine.input_value());

    // Pointer-down anywhere in the widget hands focus to the input. The
    // input's own handler consumes the event so a press on the input never
    // also reaches the container's toggle.
    let container_engine = engine.clone();
    arrays::set_mouse_down_handler(
        container,
        Rc::new(move |event| {
            container_engine.on_mouse_down(event);
            focus::focus(input);
            false
        }),
    );
    arrays::set_mouse_down_handler(
        input,
        Rc::new(move |_event| {
            focus::focus(input);
            true
        }),
    );

    let click_engine = engine.clone();
    arrays::set_click_handler(
        container,
        Rc::new(move |event| {
            click_engine.on_click(event);
            false
        }),
    );

    // The engine sees every key first; shell fallbacks only run on keys the
    // engine left unhandled.
    let key_engine = engine.clone();
    arrays::set_key_handler(
        input,
        Rc::new(move |event| {
            if key_engine.on_key_down(event) {
                return true;
            }
            match event.key.as_str() {
                "Escape" => {
                    trace!("escape fallback, dropping focus");
                    focus::blur();
                    true
                }
                "Backspace" => {
                    let mut text = key_engine.input_value();
                    text.pop();
                    key_engine.on_input(&text);
                    true
                }
                _ => match event.char() {
                    Some(c) => {
                        let mut text = key_engine.input_value();
                        text.push(c);
                        key_engine.on_input(&text);
                        true
                    }
                    None => false,
                },
            }
        }),
    );

    let focus_in_engine = engine.clone();
    let focus_out_engine = engine.clone();
    let unregister_focus = focus::register_callbacks(
        input,
        FocusCallbacks {
            on_focus: Some(Box::new(move || focus_in_engine.on_focus_in())),
            on_blur: Some(Box::new(move || focus_out_engine.on_focus_out())),
        },
    );

    let scope = effect_scope(false);
    let attrs_engine = engine.clone();
    scope.run(move || {
        let _attrs_effect = effect(move || {
            set_bool_attr(control, "data-has-value", attrs_engine.has_value());
            set_bool_attr(input, "data-is-active", attrs_engine.is_active());
        });

        if engine.multiple() {
            value_chips(engine, control);
        } else {
            value_label(engine, control, placeholder);
        }
    });

    let nodes = ShellNodes {
        container,
        control,
        input,
    };
    let cleanup = Box::new(move || {
        scope.stop();
        unregister_focus();
        release_node(container);
    });
    (nodes, cleanup)
}

fn set_static_attrs(
    engine: &dyn SelectionEngine,
    container: usize,
    control: usize,
    input: usize,
) {
    set_bool_attr(container, "data-disabled", engine.disabled());
    set_bool_attr(control, "data-disabled", engine.disabled());
    set_bool_attr(control, "data-multiple", engine.multiple());
    set_bool_attr(input, "data-multiple", engine.multiple());
    arrays::set_attr(input, "type", "text");
    arrays::set_attr(input, "autocomplete", "off");
    arrays::set_attr(input, "autocapitalize", "none");
    arrays::set_attr(input, "size", "1");
}

/// Boolean contract attributes are present with an empty value when true
/// and absent when false.
fn set_bool_attr(index: usize, name: &str, on: bool) {
    if on {
        arrays::set_attr(index, name, "");
    } else {
        arrays::remove_attr(index, name);
    }
}

/// Single mode: one label showing the committed option or the placeholder.
fn value_label(engine: Rc<dyn SelectionEngine>, control: usize, placeholder: String) {
    let label = allocate_node(None);
    arrays::set_kind(label, NodeKind::Label);
    arrays::set_parent(label, Some(control));
    arrays::set_text_getter(label, move || {
        engine
            .value()
            .first()
            .map(|o| o.label.clone())
            .unwrap_or_else(|| placeholder.clone())
    });
}

/// Multiple mode: one chip per committed option, rebuilt when the value
/// changes. A chip's pointer-down removes its own position from the value,
/// preserving the order of everything else.
fn value_chips(engine: Rc<dyn SelectionEngine>, control: usize) {
    let chips: Rc<RefCell<Vec<Cleanup>>> = Rc::new(RefCell::new(Vec::new()));
    let chips_effect = chips.clone();
    let chips_dispose = chips.clone();

    let _chips_effect = effect(move || {
        let value = engine.value();

        for cleanup in chips_effect.borrow_mut().drain(..) {
            cleanup();
        }

        for (position, option) in value.iter().enumerate() {
            let chip = allocate_node(None);
            arrays::set_kind(chip, NodeKind::ValueChip);
            arrays::set_parent(chip, Some(control));
            arrays::set_text(chip, option.label.clone());

            let remove_engine = engine.clone();
            arrays::set_mouse_down_handler(
                chip,
                Rc::new(move |_event| {
                    let mut value = remove_engine.value();
                    if position < value.len() {
                        value.remove(position);
                        remove_engine.set_value(value);
                    }
                    true
                }),
            );

            chips_effect
                .borrow_mut()
                .push(Box::new(move || release_node(chip)));
        }
    });

    on_scope_dispose(move || {
        for cleanup in chips_dispose.borrow_mut().drain(..) {
            cleanup();
        }
    });
}
