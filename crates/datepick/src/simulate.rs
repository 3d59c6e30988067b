//! Scripted picker sessions for the `simulate` subcommand.

use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;

use datepick::animation::Tick;
use datepick::invoker::{TextControl, ValueControl};
use datepick::{
    ButtonControl, ClickTarget, ControlRegistry, DatePicker, DialogId, DialogLayout, InputControl,
    InputKind, Invoker, Key, KeyEvent, NavOutcome, PagingGroup, PickerView,
};

/// Kind of invoker control to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ControlKind {
    /// Date input holding `YYYY-MM-DD` values
    Date,
    /// Free-form text input
    Text,
    /// Button showing the date as text
    Button,
}

/// One scripted interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Click(ClickTarget),
    Key(KeyEvent),
    Blur(String),
    Frame,
    TransitionEnd,
    /// Tick animations until they finish.
    Settle,
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };

        let paging = |group, forward| Step::Click(ClickTarget::Paging { group, forward });
        let step = match (name, arg) {
            ("day", Some(iso)) => Step::Click(ClickTarget::Day(iso.to_string())),
            ("next-month", None) => paging(PagingGroup::Month, true),
            ("prev-month", None) => paging(PagingGroup::Month, false),
            ("next-year", None) => paging(PagingGroup::Year, true),
            ("prev-year", None) => paging(PagingGroup::Year, false),
            ("month-label", None) => Step::Click(ClickTarget::MonthLabel),
            ("year-label", None) => Step::Click(ClickTarget::YearLabel),
            ("toggle-input", None) => Step::Click(ClickTarget::InputModeToggle),
            ("month", Some(m)) => Step::Click(ClickTarget::MonthEntry(
                m.parse().with_context(|| format!("invalid month '{}'", m))?,
            )),
            ("year", Some(y)) => Step::Click(ClickTarget::YearEntry(
                y.parse().with_context(|| format!("invalid year '{}'", y))?,
            )),
            ("key", Some(key)) => Step::Key(parse_key(key)?),
            ("blur", Some(text)) => Step::Blur(text.to_string()),
            ("frame", None) => Step::Frame,
            ("transition-end", None) => Step::TransitionEnd,
            ("settle", None) => Step::Settle,
            _ => bail!("unknown step '{}'", s),
        };
        Ok(step)
    }
}

fn parse_key(spec: &str) -> Result<KeyEvent> {
    let (shift, name) = match spec.strip_prefix("shift+") {
        Some(rest) => (true, rest),
        None => (false, spec),
    };
    let key = match name {
        "Enter" => Key::Enter,
        "Space" => Key::Space,
        "PageUp" => Key::PageUp,
        "PageDown" => Key::PageDown,
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => return Err(anyhow!("unknown key '{}'", name)),
            }
        }
    };
    let event = KeyEvent::new(key);
    Ok(if shift { event.with_shift() } else { event })
}

/// Invoker setup for a session.
#[derive(Debug, Clone)]
pub struct Session {
    pub kind: ControlKind,
    pub value: String,
    pub min: Option<String>,
    pub max: Option<String>,
}

/// Outcome of one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: String,
    pub outcome: Option<NavOutcome>,
}

/// Everything a session produced.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub steps: Vec<StepReport>,
    pub view: Option<PickerView>,
    pub committed: bool,
    pub invoker_value: String,
}

type ValueReader = Box<dyn Fn() -> String>;

const DIALOG: &str = "datepicker";
const SETTLE_STEP: Duration = Duration::from_millis(16);
const SETTLE_LIMIT: usize = 1000;

/// Run `steps` against a fresh dialog, then close it with `close_result`.
pub fn run(
    picker: &mut DatePicker,
    session: &Session,
    steps: &[(String, Step)],
    close_result: &str,
) -> Result<SessionReport> {
    let id = picker
        .initialize(DialogLayout::new(DIALOG))
        .context("dialog could not be initialized")?;

    let mut controls = ControlRegistry::new();
    let (invoker, read_value): (Invoker, ValueReader) = match session.kind {
        ControlKind::Date | ControlKind::Text => {
            let kind = if session.kind == ControlKind::Date {
                InputKind::Date
            } else {
                InputKind::Text
            };
            let input = InputControl::with_bounds(
                kind,
                &session.value,
                session.min.as_deref(),
                session.max.as_deref(),
            );
            let reader = input.clone();
            (
                Invoker::Value(input),
                Box::new(move || reader.value()) as ValueReader,
            )
        }
        ControlKind::Button => {
            let button = ButtonControl::new(&session.value);
            let reader = button.clone();
            (
                Invoker::Text(button),
                Box::new(move || reader.text()) as ValueReader,
            )
        }
    };
    let control = controls.register(invoker, Some(DIALOG));
    controls.focus(control);

    if !picker.before_open(id, &controls) {
        bail!("picker did not open");
    }

    let mut reports = Vec::with_capacity(steps.len());
    for (label, step) in steps {
        let outcome = apply(picker, id, step);
        reports.push(StepReport {
            step: label.clone(),
            outcome,
        });
    }

    let view = picker.view(id);
    let committed = picker.on_close(id, close_result);
    Ok(SessionReport {
        steps: reports,
        view,
        committed,
        invoker_value: read_value(),
    })
}

fn apply(picker: &mut DatePicker, id: DialogId, step: &Step) -> Option<NavOutcome> {
    match step {
        Step::Click(target) => Some(picker.click(id, target)),
        Step::Key(event) => Some(picker.key(id, *event).outcome),
        Step::Blur(text) => Some(picker.blur_text_input(id, text)),
        Step::Frame => {
            picker.animation_frame(id);
            None
        }
        Step::TransitionEnd => {
            picker.transition_end(id);
            None
        }
        Step::Settle => {
            let start = Instant::now();
            picker.animation_frame(id);
            for i in 0..SETTLE_LIMIT {
                let now = start + SETTLE_STEP * i as u32;
                if picker.tick(id, now) == Tick::Done {
                    break;
                }
            }
            picker.list_transition_end(id);
            picker.transition_end(id);
            None
        }
    }
}
