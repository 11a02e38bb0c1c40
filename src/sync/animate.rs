//! Animated scroll interpolation
//!
//! Sync targets are approached with a short ease-out animation instead of a
//! hard jump. An animation always lands exactly on its target: the last step
//! reports the target value itself, never an eased approximation of it.

use std::time::Instant;

/// One sample of an in-flight animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Scroll offset to apply this frame
    pub value: f32,
    /// Whether the animation is complete after this step
    pub finished: bool,
}

/// An in-flight animated scroll toward a fixed target.
#[derive(Debug, Clone)]
pub struct ScrollAnimation {
    /// Scroll offset the animation started from
    start: f32,
    /// Scroll offset the animation ends at
    target: f32,
    /// When the animation started
    started: Instant,
    /// Animation duration in seconds
    duration: f32,
}

impl ScrollAnimation {
    /// Start an animation from `start` to `target`.
    ///
    /// A non-positive duration completes on the first step.
    pub fn new(start: f32, target: f32, duration: f32) -> Self {
        Self {
            start,
            target,
            started: Instant::now(),
            duration,
        }
    }

    /// The scroll offset this animation ends at.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Sample the animation at the current time.
    ///
    /// Intermediate steps use ease-out quad for smooth deceleration; the
    /// final step carries the exact target value.
    pub fn step(&self) -> Step {
        if self.start == self.target {
            return Step {
                value: self.target,
                finished: true,
            };
        }

        let progress = if self.duration <= 0.0 {
            1.0
        } else {
            (self.started.elapsed().as_secs_f32() / self.duration).min(1.0)
        };

        if progress >= 1.0 {
            return Step {
                value: self.target,
                finished: true,
            };
        }

        // Ease-out quad for smooth deceleration
        let eased = 1.0 - (1.0 - progress).powi(2);
        Step {
            value: self.start + (self.target - self.start) * eased,
            finished: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_zero_duration_finishes_on_first_step() {
        let animation = ScrollAnimation::new(0.0, 10.0, 0.0);
        let step = animation.step();
        assert!(step.finished);
        assert_eq!(step.value, 10.0);
    }

    #[test]
    fn test_final_step_is_exactly_the_target() {
        let animation = ScrollAnimation::new(0.0, 123.456, 0.01);
        sleep(Duration::from_millis(50));

        let step = animation.step();
        assert!(step.finished);
        assert_eq!(step.value, 123.456);
    }

    #[test]
    fn test_intermediate_step_stays_between_endpoints() {
        // Long duration so the first step is guaranteed to be mid-flight
        let animation = ScrollAnimation::new(0.0, 100.0, 60.0);
        let step = animation.step();

        assert!(!step.finished);
        assert!(step.value >= 0.0);
        assert!(step.value < 100.0);
    }

    #[test]
    fn test_steps_are_monotonic() {
        let animation = ScrollAnimation::new(0.0, 100.0, 60.0);
        let first = animation.step();
        sleep(Duration::from_millis(20));
        let second = animation.step();

        assert!(second.value >= first.value);
        assert!(!second.finished);
    }

    #[test]
    fn test_distinct_intermediate_values() {
        let animation = ScrollAnimation::new(0.0, 100.0, 1.0);
        let mut values = Vec::new();
        loop {
            let step = animation.step();
            values.push(step.value);
            if step.finished {
                break;
            }
            sleep(Duration::from_millis(50));
        }

        assert_eq!(*values.last().unwrap(), 100.0);
        let intermediates: Vec<f32> = values[..values.len() - 1].to_vec();
        let mut distinct = intermediates.clone();
        distinct.dedup();
        assert!(distinct.len() > 1, "samples: {:?}", values);
    }

    #[test]
    fn test_descending_animation() {
        let animation = ScrollAnimation::new(200.0, 50.0, 60.0);
        let step = animation.step();

        assert!(!step.finished);
        assert!(step.value <= 200.0);
        assert!(step.value > 50.0);
    }

    #[test]
    fn test_equal_start_and_target_finishes_immediately() {
        let animation = ScrollAnimation::new(42.0, 42.0, 60.0);
        let step = animation.step();
        assert!(step.finished);
        assert_eq!(step.value, 42.0);
    }

    #[test]
    fn test_target_accessor() {
        let animation = ScrollAnimation::new(0.0, 77.0, 0.15);
        assert_eq!(animation.target(), 77.0);
    }
}
