//! datepick - headless date picker dialog engine
//!
//! The engine keeps per-dialog picker state, renders a view model of the
//! calendar grid, headers and selector lists, and synchronizes the chosen
//! date with the control that opened the picker. Hosts own the widgets and
//! forward their events to a [`DatePicker`].

pub mod animation;
pub mod invoker;
pub mod navigation;
pub mod picker;
pub mod render;
pub mod state;
pub mod styles;
pub mod view_mode;

pub use invoker::{ButtonControl, ControlRegistry, InputControl, InputKind, Invoker};
pub use navigation::{ClickTarget, Key, KeyEvent, NavOutcome, PagingGroup};
pub use picker::{DatePicker, DialogLayout};
pub use render::PickerView;
pub use state::{BoundsViolation, DialogId, PickerState};
pub use view_mode::ViewMode;
