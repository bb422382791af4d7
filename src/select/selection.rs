//! Selection State Engine - the behavioral contract behind the widget.
//!
//! The renderers never own selection state. They consume an engine handle
//! that answers every query reactively (reads inside effects subscribe) and
//! receives every interaction verbatim. [`SelectionEngine`] is the contract;
//! [`SelectCore`] is the signal-backed implementation the crate ships.
//!
//! Split of responsibility with the shell: the engine decides semantics
//! (what a key does, whether a pick is allowed), the shell decides plumbing
//! (where focus goes, which node consumes the event).

use spark_signals::{signal, Signal};
use tracing::{debug, trace};

use crate::state::keyboard::KeyboardEvent;
use crate::state::mouse::MouseEvent;
use crate::types::SelectOption;

// =============================================================================
// ENGINE CONTRACT
// =============================================================================

/// Selection state engine consumed by the renderers as `Rc<dyn SelectionEngine>`.
///
/// Query methods are reactive. Interaction methods mutate engine state;
/// `on_key_down` additionally reports whether the engine handled the key so
/// the shell knows when its fallbacks may run.
pub trait SelectionEngine {
    /// Options currently visible in the list (already filtered).
    fn options(&self) -> Vec<SelectOption>;

    /// Committed value. Zero or one entry in single mode, any number in
    /// multiple mode, insertion-ordered.
    fn value(&self) -> Vec<SelectOption>;

    /// Replace the committed value wholesale.
    fn set_value(&self, value: Vec<SelectOption>);

    /// Current filter text.
    fn input_value(&self) -> String;

    /// Whether the option list is open.
    fn is_open(&self) -> bool;

    /// Whether the widget is active (its input holds focus).
    fn is_active(&self) -> bool;

    fn has_value(&self) -> bool;

    fn has_input_value(&self) -> bool;

    fn is_option_disabled(&self, option: &SelectOption) -> bool;

    fn is_option_focused(&self, option: &SelectOption) -> bool;

    /// Attempt to commit an option. Must be a no-op for disabled options.
    fn pick_option(&self, option: &SelectOption);

    /// The filter text changed. The engine owns the text; the input renders
    /// whatever `input_value` says afterwards.
    fn on_input(&self, text: &str);

    /// A key reached the widget. Returns `true` when the engine handled it.
    fn on_key_down(&self, event: &KeyboardEvent) -> bool;

    fn on_click(&self, event: &MouseEvent);

    fn on_mouse_down(&self, event: &MouseEvent);

    fn on_focus_in(&self);

    fn on_focus_out(&self);

    fn multiple(&self) -> bool;

    fn disabled(&self) -> bool;
}

// =============================================================================
// SELECT CORE - signal-backed reference engine
// =============================================================================

/// Signal-backed [`SelectionEngine`].
///
/// Filtering is case-insensitive substring match on the label. Keyboard
/// focus moves over the filtered list and skips disabled options. Single
/// mode commits replace the value and close the list; multiple mode toggles
/// membership in insertion order and keeps the list open.
pub struct SelectCore {
    all_options: Signal<Vec<SelectOption>>,
    input: Signal<String>,
    open: Signal<bool>,
    active: Signal<bool>,
    value: Signal<Vec<SelectOption>>,
    focused_key: Signal<Option<String>>,
    disabled_keys: Signal<Vec<String>>,
    multiple: bool,
    disabled: bool,
}

impl SelectCore {
    pub fn new(options: Vec<SelectOption>) -> Self {
        Self {
            all_options: signal(options),
            input: signal(String::new()),
            open: signal(false),
            active: signal(false),
            value: signal(Vec::new()),
            focused_key: signal(None),
            disabled_keys: signal(Vec::new()),
            multiple: false,
            disabled: false,
        }
    }

    /// Switch to multiple mode (toggle membership, list stays open).
    pub fn with_multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Disable the whole widget.
    pub fn with_disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Replace the full (unfiltered) option set.
    pub fn set_options(&self, options: Vec<SelectOption>) {
        self.all_options.set(options);
    }

    /// Mark one option key disabled or enabled.
    pub fn set_option_disabled(&self, key: &str, disabled: bool) {
        let mut keys = self.disabled_keys.get();
        let present = keys.iter().any(|k| k == key);
        if disabled && !present {
            keys.push(key.to_string());
        } else if !disabled && present {
            keys.retain(|k| k != key);
        } else {
            return;
        }
        self.disabled_keys.set(keys);
    }

    fn is_key_disabled(&self, key: &str) -> bool {
        self.disabled_keys.get().iter().any(|k| k == key)
    }

    /// Position of the focused option within the filtered list, if any.
    fn focused_position(&self, filtered: &[SelectOption]) -> Option<usize> {
        let focused = self.focused_key.get()?;
        filtered.iter().position(|o| o.key == focused)
    }

    /// Move keyboard focus by `step` over the filtered list, skipping
    /// disabled options. Stops at the list edges rather than wrapping.
    fn move_focus(&self, step: i64) {
        let filtered = self.options();
        if filtered.is_empty() {
            return;
        }

        let start = match self.focused_position(&filtered) {
            Some(pos) => pos as i64 + step,
            // Nothing focused yet: enter from the edge the motion points at.
            None if step > 0 => 0,
            None => filtered.len() as i64 - 1,
        };

        let mut candidate = start;
        while candidate >= 0 && candidate < filtered.len() as i64 {
            let option = &filtered[candidate as usize];
            if !self.is_key_disabled(&option.key) {
                self.focused_key.set(Some(option.key.clone()));
                return;
            }
            candidate += step.signum();
        }
    }

    /// Focus the first (`step > 0`) or last enabled option.
    fn focus_edge(&self, step: i64) {
        self.focused_key.set(None);
        self.move_focus(step);
    }

    fn set_open(&self, open: bool) {
        trace!(open, "list open state");
        self.open.set(open);
    }
}

impl SelectionEngine for SelectCore {
    fn options(&self) -> Vec<SelectOption> {
        let needle = self.input.get().to_lowercase();
        let all = self.all_options.get();
        if needle.is_empty() {
            return all;
        }
        all.into_iter()
            .filter(|o| o.label.to_lowercase().contains(&needle))
            .collect()
    }

    fn value(&self) -> Vec<SelectOption> {
        self.value.get()
    }

    fn set_value(&self, value: Vec<SelectOption>) {
        self.value.set(value);
    }

    fn input_value(&self) -> String {
        self.input.get()
    }

    fn is_open(&self) -> bool {
        self.open.get()
    }

    fn is_active(&self) -> bool {
        self.active.get()
    }

    fn has_value(&self) -> bool {
        !self.value.get().is_empty()
    }

    fn has_input_value(&self) -> bool {
        !self.input.get().is_empty()
    }

    fn is_option_disabled(&self, option: &SelectOption) -> bool {
        self.is_key_disabled(&option.key)
    }

    fn is_option_focused(&self, option: &SelectOption) -> bool {
        self.focused_key.get().as_deref() == Some(option.key.as_str())
    }

    fn pick_option(&self, option: &SelectOption) {
        if self.disabled || self.is_key_disabled(&option.key) {
            trace!(key = %option.key, "pick ignored for disabled option");
            return;
        }

        debug!(key = %option.key, multiple = self.multiple, "pick option");
        self.focused_key.set(Some(option.key.clone()));

        if self.multiple {
            let mut value = self.value.get();
            if value.iter().any(|o| o.key == option.key) {
                value.retain(|o| o.key != option.key);
            } else {
                value.push(option.clone());
            }
            self.value.set(value);
        } else {
            self.value.set(vec![option.clone()]);
            self.input.set(String::new());
            self.set_open(false);
        }
    }

    fn on_input(&self, text: &str) {
        if self.disabled {
            return;
        }
        self.input.set(text.to_string());
        if !self.open.get() {
            self.set_open(true);
        }
    }

    fn on_key_down(&self, event: &KeyboardEvent) -> bool {
        if self.disabled {
            return false;
        }

        match event.key.as_str() {
            "ArrowDown" => {
                if self.open.get() {
                    self.move_focus(1);
                } else {
                    self.set_open(true);
                    self.focus_edge(1);
                }
                true
            }
            "ArrowUp" => {
                if self.open.get() {
                    self.move_focus(-1);
                } else {
                    self.set_open(true);
                    self.focus_edge(-1);
                }
                true
            }
            "Home" if self.open.get() => {
                self.focus_edge(1);
                true
            }
            "End" if self.open.get() => {
                self.focus_edge(-1);
                true
            }
            "Enter" => {
                if !self.open.get() {
                    self.set_open(true);
                    return true;
                }
                let filtered = self.options();
                if let Some(pos) = self.focused_position(&filtered) {
                    self.pick_option(&filtered[pos]);
                }
                true
            }
            // Escape only counts as handled while the list is open; a
            // closed widget leaves it to whoever dispatched the event.
            "Escape" => {
                if self.open.get() {
                    self.set_open(false);
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    fn on_click(&self, _event: &MouseEvent) {
        trace!("click");
    }

    fn on_mouse_down(&self, _event: &MouseEvent) {
        if self.disabled {
            return;
        }
        let open = !self.open.get();
        trace!(open, "mouse down toggles list");
        self.set_open(open);
    }

    fn on_focus_in(&self) {
        self.active.set(true);
    }

    fn on_focus_out(&self) {
        self.active.set(false);
        self.set_open(false);
    }

    fn multiple(&self) -> bool {
        self.multiple
    }

    fn disabled(&self) -> bool {
        self.disabled
    }
}
