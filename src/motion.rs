use std::time::{
    Duration,
    Instant,
};

/// Shared timing for slot transitions, so a vacated slot resizes in lockstep
/// with the incoming slot's materialization.
pub const SLOT_TRANSITION: Duration = Duration::from_millis(300);

/// Extra entrance delay applied while the chat panel is closed, so slot
/// entrances do not compete with a concurrently running panel animation.
pub const CLOSED_PANEL_ENTRANCE_DELAY: Duration = Duration::from_millis(150);

/// Cubic ease-in-out over `t` in `0..=1`.
pub fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

/// A single animated scalar: eased interpolation from `from` to `to`,
/// starting at `start` after `delay`. Purely a function of the clock passed
/// in, which keeps it testable without sleeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    from: f64,
    to: f64,
    start: Instant,
    delay: Duration,
    duration: Duration,
}

impl Motion {
    pub fn new(from: f64, to: f64, start: Instant, delay: Duration, duration: Duration) -> Self {
        Self {
            from,
            to,
            start,
            delay,
            duration,
        }
    }

    /// A motion that is already settled at `value`.
    pub fn settled(value: f64, now: Instant) -> Self {
        Self::new(value, value, now, Duration::ZERO, SLOT_TRANSITION)
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    /// Redirect toward `to`, continuing from the current interpolated value
    /// so there is no visual jump. A no-op when already heading there.
    pub fn retarget(&mut self, to: f64, now: Instant, delay: Duration) {
        if (self.to - to).abs() < f64::EPSILON {
            return;
        }
        *self = Self::new(self.value_at(now), to, now, delay, self.duration);
    }

    pub fn value_at(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.start);
        let Some(active) = elapsed.checked_sub(self.delay) else {
            return self.from;
        };
        if self.duration.is_zero() {
            return self.to;
        }
        let t = (active.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * ease_in_out(t)
    }

    pub fn is_settled_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.delay + self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_is_anchored_and_symmetric() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(0.5), 0.5);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!(ease_in_out(0.25) < 0.25);
        assert!(ease_in_out(0.75) > 0.75);
    }

    #[test]
    fn motion_holds_its_start_value_through_the_delay() {
        let start = Instant::now();
        let motion = Motion::new(0.0, 1.0, start, CLOSED_PANEL_ENTRANCE_DELAY, SLOT_TRANSITION);

        assert_eq!(motion.value_at(start), 0.0);
        assert_eq!(motion.value_at(start + Duration::from_millis(149)), 0.0);
        assert!(motion.value_at(start + Duration::from_millis(200)) > 0.0);
    }

    #[test]
    fn motion_reaches_its_target_after_delay_plus_duration() {
        let start = Instant::now();
        let motion = Motion::new(0.0, 1.0, start, CLOSED_PANEL_ENTRANCE_DELAY, SLOT_TRANSITION);

        let end = start + CLOSED_PANEL_ENTRANCE_DELAY + SLOT_TRANSITION;
        assert_eq!(motion.value_at(end), 1.0);
        assert!(motion.is_settled_at(end));
        assert!(!motion.is_settled_at(start + SLOT_TRANSITION));
    }

    #[test]
    fn retarget_continues_from_the_current_value() {
        let start = Instant::now();
        let mut motion = Motion::new(0.0, 1.0, start, Duration::ZERO, SLOT_TRANSITION);

        let midway = start + SLOT_TRANSITION / 2;
        let value_midway = motion.value_at(midway);
        motion.retarget(0.0, midway, Duration::ZERO);

        assert_eq!(motion.value_at(midway), value_midway);
        assert_eq!(motion.target(), 0.0);
        assert_eq!(motion.value_at(midway + SLOT_TRANSITION), 0.0);
    }

    #[test]
    fn retarget_to_the_same_target_is_a_no_op() {
        let start = Instant::now();
        let mut motion = Motion::new(0.0, 1.0, start, Duration::ZERO, SLOT_TRANSITION);
        let copy = motion;

        motion.retarget(1.0, start + Duration::from_millis(10), Duration::ZERO);
        assert_eq!(motion, copy);
    }

    #[test]
    fn settled_motions_report_their_value_forever() {
        let now = Instant::now();
        let motion = Motion::settled(0.65, now);
        assert_eq!(motion.value_at(now), 0.65);
        assert_eq!(motion.value_at(now + Duration::from_secs(60)), 0.65);
        assert!(motion.is_settled_at(now + SLOT_TRANSITION));
    }
}
