#![forbid(unsafe_code)]

//! Time-based animation primitives for collapse/expand transitions.
//!
//! An [`Animation`] is ticked with elapsed time and exposes a progress value
//! in `[0.0, 1.0]`. [`Tween`] is the only concrete animation the panel group
//! needs: a fixed-duration interpolation shaped by an [`EasingFn`].
//!
//! Progress is intentionally `f64`: it only selects *how far along* the
//! transition is. The sizes it scales are exact decimals, and the final frame
//! always snaps to the exact target.

mod easing;

use std::time::Duration;

pub use easing::{Easing, EasingFn, ease_in, ease_in_out, ease_out, linear};

/// Default collapse/expand duration.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(300);

/// Frame interval used when a host drives animations at 60 fps.
pub const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Something that progresses over time.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation reached its end.
    fn is_complete(&self) -> bool;

    /// Eased progress in `[0.0, 1.0]`.
    fn value(&self) -> f64;

    /// Return to the initial state.
    fn reset(&mut self);
}

/// Fixed-duration eased interpolation.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    duration: Duration,
    elapsed: Duration,
    easing: EasingFn,
}

impl Tween {
    /// A linear tween. A zero duration completes immediately.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
            easing: linear,
        }
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Raw (un-eased) progress.
    #[must_use]
    pub fn linear_progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Jump to an absolute elapsed time (clamped to the duration).
    pub fn seek(&mut self, elapsed: Duration) {
        self.elapsed = elapsed.min(self.duration);
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f64 {
        if self.is_complete() {
            return 1.0;
        }
        (self.easing)(self.linear_progress()).clamp(0.0, 1.0)
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_is_complete_immediately() {
        let tween = Tween::new(Duration::ZERO);
        assert!(tween.is_complete());
        assert_eq!(tween.value(), 1.0);
    }

    #[test]
    fn linear_tween_progresses_proportionally() {
        let mut tween = Tween::new(Duration::from_millis(300));
        tween.tick(Duration::from_millis(150));
        assert!((tween.value() - 0.5).abs() < 1e-9);
        assert!(!tween.is_complete());
        tween.tick(Duration::from_millis(500));
        assert!(tween.is_complete());
        assert_eq!(tween.elapsed(), Duration::from_millis(300));
    }

    #[test]
    fn easing_shapes_progress() {
        let mut tween = Tween::new(Duration::from_millis(100)).easing(ease_in);
        tween.tick(Duration::from_millis(50));
        assert!(tween.value() < 0.5);
        tween.reset();
        assert_eq!(tween.value(), 0.0);
    }

    #[test]
    fn seek_clamps_to_duration() {
        let mut tween = Tween::new(Duration::from_millis(100));
        tween.seek(Duration::from_secs(5));
        assert!(tween.is_complete());
    }
}
