//! Core types - options, reactive prop values, row flags, cleanup.
//!
//! These types define the interface between the select component and its
//! callers. Props support static values, signals, and getters so every
//! renderer input can be reactive without forcing it to be.

use std::rc::Rc;

use spark_signals::Signal;

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by renderers.
///
/// Call this to unmount the rendered subtree and release resources.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Select Option
// =============================================================================

/// One selectable item in the dropdown list.
///
/// The component only needs identity (`key`) for disabled/focused lookup and
/// a display label. Anything richer lives with the caller; the renderers hold
/// no private copy beyond transient references while rendering a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    /// Unique identity within one option list.
    pub key: String,
    /// Text shown in the option row and the committed-value area.
    pub label: String,
}

impl SelectOption {
    /// Create an option with distinct key and label.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }

    /// Create an option whose label doubles as its key.
    pub fn labeled(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            key: label.clone(),
            label,
        }
    }
}

// =============================================================================
// Row Flags
// =============================================================================

bitflags::bitflags! {
    /// Visual state of one option row, mirrored into `data-*` attributes.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct RowFlags: u8 {
        /// Row is keyboard-focused.
        const FOCUSED  = 1 << 0;
        /// Row cannot be picked.
        const DISABLED = 1 << 1;
    }
}

// =============================================================================
// Prop Value - Reactive property wrapper
// =============================================================================

/// A property value that can be static, a signal, or a getter.
///
/// When read inside an effect, the Signal and Getter variants establish
/// reactive dependencies; Static values never do.
#[derive(Clone)]
pub enum PropValue<T: Clone + PartialEq + 'static> {
    /// Static value (not reactive).
    Static(T),
    /// Reactive signal (changes propagate automatically).
    Signal(Signal<T>),
    /// Getter function (called each time the value is needed).
    Getter(Rc<dyn Fn() -> T>),
}

impl<T: Clone + PartialEq + 'static> PropValue<T> {
    /// Get the current value.
    pub fn get(&self) -> T {
        match self {
            PropValue::Static(v) => v.clone(),
            PropValue::Signal(s) => s.get(),
            PropValue::Getter(f) => f(),
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for PropValue<T> {
    fn default() -> Self {
        PropValue::Static(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> From<T> for PropValue<T> {
    fn from(value: T) -> Self {
        PropValue::Static(value)
    }
}

impl<T: Clone + PartialEq + 'static> From<Signal<T>> for PropValue<T> {
    fn from(signal: Signal<T>) -> Self {
        PropValue::Signal(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_signals::signal;

    #[test]
    fn test_prop_value_static() {
        let prop: PropValue<u32> = 7u32.into();
        assert_eq!(prop.get(), 7);
    }

    #[test]
    fn test_prop_value_signal_tracks_updates() {
        let s = signal(1u32);
        let prop: PropValue<u32> = s.clone().into();
        assert_eq!(prop.get(), 1);
        s.set(5);
        assert_eq!(prop.get(), 5);
    }

    #[test]
    fn test_prop_value_getter() {
        let prop: PropValue<String> = PropValue::Getter(Rc::new(|| "dyn".to_string()));
        assert_eq!(prop.get(), "dyn");
    }

    #[test]
    fn test_row_flags() {
        let mut flags = RowFlags::default();
        assert!(flags.is_empty());
        flags.insert(RowFlags::FOCUSED);
        assert!(flags.contains(RowFlags::FOCUSED));
        assert!(!flags.contains(RowFlags::DISABLED));
    }

    #[test]
    fn test_labeled_option_uses_label_as_key() {
        let o = SelectOption::labeled("Sweden");
        assert_eq!(o.key, "Sweden");
        assert_eq!(o.label, "Sweden");
    }
}
