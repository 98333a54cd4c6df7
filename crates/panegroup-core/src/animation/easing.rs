//! Easing curves mapping linear progress `t ∈ [0, 1]` to eased progress.

use serde::{Deserialize, Serialize};

/// An easing curve. Must map `0.0 -> 0.0` and `1.0 -> 1.0`.
pub type EasingFn = fn(f64) -> f64;

#[must_use]
pub fn linear(t: f64) -> f64 {
    t
}

/// Quadratic ease-in.
#[must_use]
pub fn ease_in(t: f64) -> f64 {
    t * t
}

/// Quadratic ease-out.
#[must_use]
pub fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out.
#[must_use]
pub fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Named easing curve, for configuration files and snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    #[must_use]
    pub const fn curve(self) -> EasingFn {
        match self {
            Self::Linear => linear,
            Self::EaseIn => ease_in,
            Self::EaseOut => ease_out,
            Self::EaseInOut => ease_in_out,
        }
    }
}
