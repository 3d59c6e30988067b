//! Tick-driven animation tasks.
//!
//! Nothing here blocks or owns a timer. The host calls `tick(now)` from its
//! frame loop; each task computes its progress from elapsed time and reports
//! whether it wants another tick. Dropping a task (or no longer ticking it)
//! cancels it.

use std::time::{Duration, Instant};

use crate::state::BoundsViolation;
use crate::styles::slide;

/// Whether a task wants to be ticked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Done,
}

/// Ease-in-out curve on `[0, 1]`.
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear progress of a task started at `start`, clamped to `[0, 1]`.
fn progress(start: Instant, now: Instant, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(start).as_secs_f64();
    (elapsed / duration.as_secs_f64()).min(1.0)
}

/// Scrolls a selector list toward its checked entry.
///
/// The start time is taken from the first tick.
#[derive(Debug, Clone)]
pub struct ScrollAnimation {
    start: Option<Instant>,
    duration: Duration,
    distance: f64,
    offset: f64,
    finished: bool,
}

impl ScrollAnimation {
    pub fn new(distance: f64, duration: Duration) -> Self {
        Self {
            start: None,
            duration,
            distance,
            offset: 0.0,
            finished: false,
        }
    }

    pub fn tick(&mut self, now: Instant) -> Tick {
        if self.finished {
            return Tick::Done;
        }
        let start = *self.start.get_or_insert(now);
        let p = progress(start, now, self.duration);
        self.offset = self.distance * p;
        if p < 1.0 {
            Tick::Continue
        } else {
            self.finished = true;
            Tick::Done
        }
    }

    /// Jump to the final offset (the list finished resizing). Later ticks
    /// keep it there.
    pub fn finish(&mut self) {
        self.offset = self.distance;
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Current scroll offset in pixels.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }
}

/// Short horizontal shake signalling a rejected navigation.
#[derive(Debug, Clone)]
pub struct ShakeAnimation {
    start: Option<Instant>,
    duration: Duration,
    amplitude: f64,
    offset: f64,
}

impl ShakeAnimation {
    /// Shake right when below the minimum, left when above the maximum.
    pub fn new(violation: BoundsViolation, offset_px: f64, duration: Duration) -> Self {
        let amplitude = match violation {
            BoundsViolation::BelowMin => offset_px,
            BoundsViolation::AboveMax => -offset_px,
        };
        Self {
            start: None,
            duration,
            amplitude,
            offset: 0.0,
        }
    }

    /// Out to the amplitude at the midpoint and back to rest.
    pub fn tick(&mut self, now: Instant) -> Tick {
        let start = *self.start.get_or_insert(now);
        let p = progress(start, now, self.duration);
        let eased = ease_in_out(p);
        self.offset = self.amplitude * (1.0 - (2.0 * eased - 1.0).abs());
        if p < 1.0 {
            Tick::Continue
        } else {
            self.offset = 0.0;
            Tick::Done
        }
    }

    /// Current horizontal translation in pixels.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }
}

/// Direction of a month slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    /// Next month: the new layer enters from the right.
    Forward,
    /// Previous month: the new layer enters from the left.
    Backward,
}

impl SlideDirection {
    pub fn from_amount(amount: i32) -> Option<Self> {
        match amount.signum() {
            1 => Some(Self::Forward),
            -1 => Some(Self::Backward),
            _ => None,
        }
    }
}

/// Phase of an in-flight month slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlidePhase {
    /// New layer placed off-screen with transitions disabled.
    Staged,
    /// Both layers moving; waiting for the transition-end notification.
    Sliding,
}

/// Month slide bookkeeping. The renderer owns at most one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSlide {
    pub direction: SlideDirection,
    pub phase: SlidePhase,
    /// Layer that leaves the view and is removed at the end.
    pub outgoing: u64,
}

impl MonthSlide {
    pub fn new(direction: SlideDirection, outgoing: u64) -> Self {
        Self {
            direction,
            phase: SlidePhase::Staged,
            outgoing,
        }
    }

    /// Classes the calendars container carries during this phase.
    pub fn container_classes(&self) -> Vec<&'static str> {
        match (self.phase, self.direction) {
            (SlidePhase::Staged, SlideDirection::Forward) => {
                vec![slide::NO_TRANSITION, slide::START_LEFT]
            }
            (SlidePhase::Staged, SlideDirection::Backward) => {
                vec![slide::NO_TRANSITION, slide::START_RIGHT]
            }
            (SlidePhase::Sliding, SlideDirection::Forward) => vec![slide::MOVE_LEFT],
            (SlidePhase::Sliding, SlideDirection::Backward) => vec![slide::MOVE_RIGHT],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_ease_in_out_endpoints() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert_eq!(ease_in_out(0.5), 0.5);
        assert_eq!(ease_in_out(2.0), 1.0);
    }

    #[test]
    fn test_scroll_progresses_and_stops() {
        let t0 = Instant::now();
        let mut scroll = ScrollAnimation::new(100.0, ms(200));

        assert_eq!(scroll.tick(t0), Tick::Continue);
        assert_eq!(scroll.offset(), 0.0);

        assert_eq!(scroll.tick(t0 + ms(100)), Tick::Continue);
        assert!((scroll.offset() - 50.0).abs() < 1e-6);

        assert_eq!(scroll.tick(t0 + ms(250)), Tick::Done);
        assert_eq!(scroll.offset(), 100.0);
    }

    #[test]
    fn test_scroll_finish_jumps_to_end() {
        let mut scroll = ScrollAnimation::new(42.0, ms(300));
        scroll.finish();
        assert_eq!(scroll.offset(), 42.0);
        assert!(scroll.is_finished());
    }

    #[test]
    fn test_tick_after_finish_keeps_final_offset() {
        let mut scroll = ScrollAnimation::new(42.0, ms(300));
        let t0 = Instant::now();
        assert_eq!(scroll.tick(t0), Tick::Continue);
        scroll.finish();
        assert_eq!(scroll.tick(t0 + ms(30)), Tick::Done);
        assert_eq!(scroll.offset(), 42.0);
    }

    #[test]
    fn test_zero_duration_completes_on_first_tick() {
        let mut scroll = ScrollAnimation::new(10.0, Duration::ZERO);
        assert_eq!(scroll.tick(Instant::now()), Tick::Done);
        assert_eq!(scroll.offset(), 10.0);
    }

    #[test]
    fn test_shake_direction_and_rest() {
        let t0 = Instant::now();
        let mut shake = ShakeAnimation::new(BoundsViolation::AboveMax, 8.0, ms(500));
        assert_eq!(shake.amplitude(), -8.0);

        shake.tick(t0);
        assert_eq!(shake.tick(t0 + ms(250)), Tick::Continue);
        assert!((shake.offset() + 8.0).abs() < 1e-6);

        assert_eq!(shake.tick(t0 + ms(500)), Tick::Done);
        assert_eq!(shake.offset(), 0.0);

        let shake = ShakeAnimation::new(BoundsViolation::BelowMin, 8.0, ms(500));
        assert_eq!(shake.amplitude(), 8.0);
    }

    #[test]
    fn test_slide_direction_from_amount() {
        assert_eq!(SlideDirection::from_amount(1), Some(SlideDirection::Forward));
        assert_eq!(SlideDirection::from_amount(-1), Some(SlideDirection::Backward));
        assert_eq!(SlideDirection::from_amount(0), None);
    }

    #[test]
    fn test_slide_container_classes() {
        let mut forward = MonthSlide::new(SlideDirection::Forward, 1);
        assert_eq!(
            forward.container_classes(),
            vec![slide::NO_TRANSITION, slide::START_LEFT]
        );
        forward.phase = SlidePhase::Sliding;
        assert_eq!(forward.container_classes(), vec![slide::MOVE_LEFT]);

        let backward = MonthSlide::new(SlideDirection::Backward, 1);
        assert_eq!(
            backward.container_classes(),
            vec![slide::NO_TRANSITION, slide::START_RIGHT]
        );
    }
}
