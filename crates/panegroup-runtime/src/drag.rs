//! Drag input normalization.
//!
//! Pointer moves and keyboard arrows both end up as a single signed delta
//! along the group's axis. Positive deltas move a handle towards the end of
//! the group (right or down).
//!
//! # Keyboard
//!
//! | Key                         | Horizontal | Vertical |
//! |-----------------------------|------------|----------|
//! | `ArrowLeft` / `ArrowRight`  | `∓step`    | ignored  |
//! | `ArrowUp` / `ArrowDown`     | ignored    | `∓step`  |
//! | `Enter`                     | toggle     | toggle   |
//!
//! Holding Shift multiplies the step by [`DragSettings::shift_multiplier`].

use panegroup_core::Decimal;
use panegroup_layout::Orientation;
use serde::{Deserialize, Serialize};

/// Keys a focused handle reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Enter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyInput {
    pub key: Key,
    pub shift: bool,
}

impl KeyInput {
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    #[must_use]
    pub const fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Raw input delivered with a `DragHandle` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragInput {
    /// Pointer movement since the previous event, in pixels.
    Pointer { dx: Decimal, dy: Decimal },
    Key(KeyInput),
}

impl DragInput {
    /// Pointer movement from integer pixel offsets.
    #[must_use]
    pub fn pointer(dx: impl Into<Decimal>, dy: impl Into<Decimal>) -> Self {
        Self::Pointer {
            dx: dx.into(),
            dy: dy.into(),
        }
    }

    #[must_use]
    pub const fn key(key: Key) -> Self {
        Self::Key(KeyInput::new(key))
    }
}

/// What an input asks the machine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragAction {
    Move(Decimal),
    ToggleCollapse,
    Ignore,
}

/// Keyboard step configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragSettings {
    /// Pixels per arrow press.
    pub keyboard_step: Decimal,
    /// Multiplier applied while Shift is held.
    pub shift_multiplier: Decimal,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            keyboard_step: Decimal::ONE,
            shift_multiplier: Decimal::from(15),
        }
    }
}

impl DragSettings {
    /// Map `input` onto the axis of `orientation`.
    #[must_use]
    pub fn resolve(&self, input: DragInput, orientation: Orientation) -> DragAction {
        match input {
            DragInput::Pointer { dx, dy } => {
                let delta = match orientation {
                    Orientation::Horizontal => dx,
                    Orientation::Vertical => dy,
                };
                if delta.is_zero() {
                    DragAction::Ignore
                } else {
                    DragAction::Move(delta)
                }
            }
            DragInput::Key(KeyInput { key, shift }) => {
                let sign = match (key, orientation) {
                    (Key::Enter, _) => return DragAction::ToggleCollapse,
                    (Key::ArrowLeft, Orientation::Horizontal)
                    | (Key::ArrowUp, Orientation::Vertical) => Decimal::NEGATIVE_ONE,
                    (Key::ArrowRight, Orientation::Horizontal)
                    | (Key::ArrowDown, Orientation::Vertical) => Decimal::ONE,
                    _ => return DragAction::Ignore,
                };
                let step = if shift {
                    self.keyboard_step * self.shift_multiplier
                } else {
                    self.keyboard_step
                };
                DragAction::Move(sign * step)
            }
        }
    }
}

/// Turns absolute pointer positions into per-move [`DragInput`]s.
///
/// Hosts usually receive absolute client coordinates; the machine wants the
/// movement since the last event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerDragSession {
    last_x: Decimal,
    last_y: Decimal,
}

impl PointerDragSession {
    #[must_use]
    pub fn start(x: impl Into<Decimal>, y: impl Into<Decimal>) -> Self {
        Self {
            last_x: x.into(),
            last_y: y.into(),
        }
    }

    /// Movement since the previous position.
    pub fn move_to(&mut self, x: impl Into<Decimal>, y: impl Into<Decimal>) -> DragInput {
        let (x, y) = (x.into(), y.into());
        let input = DragInput::Pointer {
            dx: x - self.last_x,
            dy: y - self.last_y,
        };
        self.last_x = x;
        self.last_y = y;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> DragSettings {
        DragSettings::default()
    }

    #[test]
    fn arrows_follow_the_axis() {
        let s = settings();
        assert_eq!(
            s.resolve(DragInput::key(Key::ArrowRight), Orientation::Horizontal),
            DragAction::Move(Decimal::ONE)
        );
        assert_eq!(
            s.resolve(DragInput::key(Key::ArrowLeft), Orientation::Horizontal),
            DragAction::Move(Decimal::NEGATIVE_ONE)
        );
        assert_eq!(
            s.resolve(DragInput::key(Key::ArrowUp), Orientation::Vertical),
            DragAction::Move(Decimal::NEGATIVE_ONE)
        );
    }

    #[test]
    fn off_axis_arrows_are_ignored() {
        let s = settings();
        assert_eq!(
            s.resolve(DragInput::key(Key::ArrowUp), Orientation::Horizontal),
            DragAction::Ignore
        );
        assert_eq!(
            s.resolve(DragInput::key(Key::ArrowRight), Orientation::Vertical),
            DragAction::Ignore
        );
    }

    #[test]
    fn shift_scales_by_fifteen() {
        let input = DragInput::Key(KeyInput::new(Key::ArrowDown).with_shift());
        assert_eq!(
            settings().resolve(input, Orientation::Vertical),
            DragAction::Move(Decimal::from(15))
        );
    }

    #[test]
    fn enter_toggles() {
        assert_eq!(
            settings().resolve(DragInput::key(Key::Enter), Orientation::Vertical),
            DragAction::ToggleCollapse
        );
    }

    #[test]
    fn pointer_uses_axis_component() {
        let s = settings();
        let input = DragInput::pointer(7, -3);
        assert_eq!(
            s.resolve(input, Orientation::Horizontal),
            DragAction::Move(Decimal::from(7))
        );
        assert_eq!(
            s.resolve(input, Orientation::Vertical),
            DragAction::Move(Decimal::from(-3))
        );
        assert_eq!(
            s.resolve(DragInput::pointer(0, 9), Orientation::Horizontal),
            DragAction::Ignore
        );
    }

    #[test]
    fn pointer_session_reports_relative_moves() {
        let mut session = PointerDragSession::start(100, 40);
        assert_eq!(session.move_to(110, 40), DragInput::pointer(10, 0));
        assert_eq!(session.move_to(104, 45), DragInput::pointer(-6, 5));
    }
}
