//! Invoker controls: the external inputs and buttons that open a picker and
//! receive its committed date.
//!
//! Controls are shared with the host (`Rc`) and mutated through `&self`, the
//! same way toolkit widgets are. The picker never owns or destroys them.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use chrono::NaiveDate;
use datepick_core::LocaleInfo;
use datepick_core::calendar::{format_iso, parse_iso};
use datepick_core::date_format::parse_loose;
use tracing::debug;

/// Notifications a value control emits after its value is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Change,
    Input,
}

/// A control holding a string value (a date input or a plain text input).
pub trait ValueControl {
    fn value(&self) -> String;
    fn set_value(&self, value: &str);
    /// Whether the control's value is a canonical `YYYY-MM-DD` date.
    fn is_date_type(&self) -> bool;
    fn min(&self) -> Option<String>;
    fn max(&self) -> Option<String>;
    /// Notify listeners that the value changed.
    fn dispatch(&self, event: ControlEvent);
}

/// A control that shows text (a button or label).
pub trait TextControl {
    fn text(&self) -> String;
    fn set_text(&self, text: &str);
}

/// Handle to the control that invoked a picker.
#[derive(Clone)]
pub enum Invoker {
    Value(Rc<dyn ValueControl>),
    Text(Rc<dyn TextControl>),
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invoker::Value(c) => write!(f, "Invoker::Value({:?})", c.value()),
            Invoker::Text(c) => write!(f, "Invoker::Text({:?})", c.text()),
        }
    }
}

impl Invoker {
    /// The date the control currently holds, if any can be read from it.
    pub fn initial_date(&self, locale: &LocaleInfo) -> Option<NaiveDate> {
        let (raw, parsed) = match self {
            Invoker::Value(control) => {
                let value = control.value();
                let parsed = if control.is_date_type() {
                    parse_iso(&value)
                } else {
                    parse_loose(&value, locale.display_format())
                };
                (value, parsed)
            }
            Invoker::Text(control) => {
                let text = control.text();
                let parsed = parse_loose(&text, locale.display_format());
                (text, parsed)
            }
        };

        match parsed {
            Ok(date) => Some(date),
            Err(e) => {
                if !raw.trim().is_empty() {
                    debug!("Invoker value not usable as a date: {}", e);
                }
                None
            }
        }
    }

    /// Declared inclusive bounds (value controls only).
    pub fn bounds(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let Invoker::Value(control) = self else {
            return (None, None);
        };

        let parse = |attr: Option<String>, name: &str| {
            let value = attr.filter(|v| !v.trim().is_empty())?;
            match parse_iso(&value) {
                Ok(date) => Some(date),
                Err(e) => {
                    debug!("Ignoring invoker {} bound: {}", name, e);
                    None
                }
            }
        };

        (parse(control.min(), "min"), parse(control.max(), "max"))
    }

    /// Write a committed date back to the control.
    ///
    /// Value controls get the canonical ISO value followed by one `Change`
    /// and one `Input` notification; text controls get the locale display
    /// text.
    pub fn commit(&self, date: NaiveDate, locale: &LocaleInfo) {
        match self {
            Invoker::Value(control) => {
                control.set_value(&format_iso(date));
                control.dispatch(ControlEvent::Change);
                control.dispatch(ControlEvent::Input);
            }
            Invoker::Text(control) => {
                control.set_text(&locale.display_format().format(date));
            }
        }
    }
}

/// Kind of an [`InputControl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Holds canonical `YYYY-MM-DD` values.
    Date,
    /// Holds free-form text.
    Text,
}

type EventCallback = Box<dyn Fn(ControlEvent, &str)>;

/// In-memory input control for hosts without a native one, and for tests.
pub struct InputControl {
    kind: InputKind,
    value: RefCell<String>,
    min: Option<String>,
    max: Option<String>,
    callbacks: RefCell<Vec<EventCallback>>,
}

impl InputControl {
    pub fn new(kind: InputKind, value: &str) -> Rc<Self> {
        Rc::new(Self {
            kind,
            value: RefCell::new(value.to_string()),
            min: None,
            max: None,
            callbacks: RefCell::new(Vec::new()),
        })
    }

    /// Create a control with declared `min`/`max` attributes.
    pub fn with_bounds(
        kind: InputKind,
        value: &str,
        min: Option<&str>,
        max: Option<&str>,
    ) -> Rc<Self> {
        Rc::new(Self {
            kind,
            value: RefCell::new(value.to_string()),
            min: min.map(str::to_string),
            max: max.map(str::to_string),
            callbacks: RefCell::new(Vec::new()),
        })
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    /// Register a listener for change/input notifications.
    pub fn connect<F>(&self, callback: F)
    where
        F: Fn(ControlEvent, &str) + 'static,
    {
        self.callbacks.borrow_mut().push(Box::new(callback));
    }
}

impl ValueControl for InputControl {
    fn value(&self) -> String {
        self.value.borrow().clone()
    }

    fn set_value(&self, value: &str) {
        *self.value.borrow_mut() = value.to_string();
    }

    fn is_date_type(&self) -> bool {
        self.kind == InputKind::Date
    }

    fn min(&self) -> Option<String> {
        self.min.clone()
    }

    fn max(&self) -> Option<String> {
        self.max.clone()
    }

    fn dispatch(&self, event: ControlEvent) {
        let value = self.value();
        for callback in self.callbacks.borrow().iter() {
            callback(event, &value);
        }
    }
}

/// In-memory text-bearing control (button or label).
#[derive(Debug, Default)]
pub struct ButtonControl {
    text: RefCell<String>,
}

impl ButtonControl {
    pub fn new(text: &str) -> Rc<Self> {
        Rc::new(Self {
            text: RefCell::new(text.to_string()),
        })
    }
}

impl TextControl for ButtonControl {
    fn text(&self) -> String {
        self.text.borrow().clone()
    }

    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }
}

/// Identifier of a control registered in a [`ControlRegistry`].
pub type ControlId = u64;

struct RegisteredControl {
    id: ControlId,
    invoker: Invoker,
    /// Element id of the dialog this control opens, if any.
    dialog: Option<String>,
}

/// The host's set of invoker-capable controls and the focused one.
///
/// Stands in for the document: a picker looks up its invoker here when it
/// opens.
#[derive(Default)]
pub struct ControlRegistry {
    controls: Vec<RegisteredControl>,
    focused: Cell<Option<ControlId>>,
    next_id: Cell<ControlId>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a control, optionally linked to the dialog with `dialog_id`.
    pub fn register(&mut self, invoker: Invoker, dialog_id: Option<&str>) -> ControlId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.controls.push(RegisteredControl {
            id,
            invoker,
            dialog: dialog_id.map(str::to_string),
        });
        id
    }

    pub fn unregister(&mut self, id: ControlId) {
        self.controls.retain(|c| c.id != id);
        if self.focused.get() == Some(id) {
            self.focused.set(None);
        }
    }

    pub fn focus(&self, id: ControlId) {
        if self.controls.iter().any(|c| c.id == id) {
            self.focused.set(Some(id));
        }
    }

    pub fn blur(&self) {
        self.focused.set(None);
    }

    pub fn focused(&self) -> Option<ControlId> {
        self.focused.get()
    }

    /// Find the invoker for the dialog with element id `dialog_id`.
    ///
    /// The focused control wins if it is linked to this dialog; otherwise
    /// the first linked control in registration order is used.
    pub fn find_invoker(&self, dialog_id: &str) -> Option<Invoker> {
        let linked = |c: &&RegisteredControl| c.dialog.as_deref() == Some(dialog_id);

        let focused = self.focused.get().and_then(|id| {
            self.controls
                .iter()
                .filter(linked)
                .find(|c| c.id == id)
        });

        focused
            .or_else(|| self.controls.iter().find(linked))
            .map(|c| c.invoker.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Locale;
    use datepick_core::FirstDayPreference;

    fn locale() -> LocaleInfo {
        LocaleInfo::new(Locale::en_US, "en_US", FirstDayPreference::Auto)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_initial_date_from_date_input() {
        let input = InputControl::new(InputKind::Date, "2025-03-15");
        let invoker = Invoker::Value(input);
        assert_eq!(invoker.initial_date(&locale()), Some(ymd(2025, 3, 15)));
    }

    #[test]
    fn test_initial_date_date_input_rejects_non_iso() {
        let input = InputControl::new(InputKind::Date, "March 15, 2025");
        let invoker = Invoker::Value(input);
        assert_eq!(invoker.initial_date(&locale()), None);
    }

    #[test]
    fn test_initial_date_from_text_input_loose() {
        let input = InputControl::new(InputKind::Text, "03/15/2025");
        let invoker = Invoker::Value(input);
        assert_eq!(invoker.initial_date(&locale()), Some(ymd(2025, 3, 15)));
    }

    #[test]
    fn test_initial_date_from_button_text() {
        let button = ButtonControl::new("March 15, 2025");
        let invoker = Invoker::Text(button);
        assert_eq!(invoker.initial_date(&locale()), Some(ymd(2025, 3, 15)));

        let button = ButtonControl::new("Pick a date");
        assert_eq!(Invoker::Text(button).initial_date(&locale()), None);
    }

    #[test]
    fn test_bounds() {
        let input = InputControl::with_bounds(
            InputKind::Date,
            "",
            Some("2025-01-01"),
            Some("not a date"),
        );
        let invoker = Invoker::Value(input);
        assert_eq!(invoker.bounds(), (Some(ymd(2025, 1, 1)), None));

        let button = ButtonControl::new("");
        assert_eq!(Invoker::Text(button).bounds(), (None, None));
    }

    #[test]
    fn test_commit_value_control_notifies_once_each() {
        let input = InputControl::new(InputKind::Date, "");
        let events = Rc::new(RefCell::new(Vec::new()));
        {
            let events = events.clone();
            input.connect(move |event, value| {
                events.borrow_mut().push((event, value.to_string()));
            });
        }

        Invoker::Value(input.clone()).commit(ymd(2025, 4, 2), &locale());

        assert_eq!(input.value(), "2025-04-02");
        assert_eq!(
            *events.borrow(),
            vec![
                (ControlEvent::Change, "2025-04-02".to_string()),
                (ControlEvent::Input, "2025-04-02".to_string()),
            ]
        );
    }

    #[test]
    fn test_commit_text_control_uses_display_format() {
        let button = ButtonControl::new("Pick");
        Invoker::Text(button.clone()).commit(ymd(2025, 4, 2), &locale());
        assert_eq!(button.text(), "04/02/2025");
    }

    #[test]
    fn test_find_invoker_prefers_focused_linked_control() {
        let mut registry = ControlRegistry::new();
        let first = InputControl::new(InputKind::Date, "2025-01-01");
        let second = InputControl::new(InputKind::Date, "2025-02-02");
        registry.register(Invoker::Value(first), Some("dp"));
        let second_id = registry.register(Invoker::Value(second), Some("dp"));

        let found = registry.find_invoker("dp").unwrap();
        assert_eq!(found.initial_date(&locale()), Some(ymd(2025, 1, 1)));

        registry.focus(second_id);
        let found = registry.find_invoker("dp").unwrap();
        assert_eq!(found.initial_date(&locale()), Some(ymd(2025, 2, 2)));
    }

    #[test]
    fn test_find_invoker_ignores_focused_control_for_other_dialog() {
        let mut registry = ControlRegistry::new();
        let other = registry.register(
            Invoker::Value(InputControl::new(InputKind::Date, "2025-05-05")),
            Some("other"),
        );
        registry.register(
            Invoker::Value(InputControl::new(InputKind::Date, "2025-06-06")),
            Some("dp"),
        );
        registry.focus(other);

        let found = registry.find_invoker("dp").unwrap();
        assert_eq!(found.initial_date(&locale()), Some(ymd(2025, 6, 6)));
    }

    #[test]
    fn test_find_invoker_none_when_unlinked() {
        let mut registry = ControlRegistry::new();
        registry.register(Invoker::Text(ButtonControl::new("x")), None);
        assert!(registry.find_invoker("dp").is_none());
    }

    #[test]
    fn test_unregister_clears_focus() {
        let mut registry = ControlRegistry::new();
        let id = registry.register(Invoker::Text(ButtonControl::new("x")), Some("dp"));
        registry.focus(id);
        registry.unregister(id);
        assert_eq!(registry.focused(), None);
        assert!(registry.find_invoker("dp").is_none());
    }
}
