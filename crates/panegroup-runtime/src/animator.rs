//! Collapse/expand transitions.
//!
//! The animator is single-flight per machine: starting a transition cancels
//! the one in flight, whichever panel it belonged to. Each frame turns the
//! eased progress into the growth still owed to the panel, so the deltas of
//! a completed transition always sum to exactly `target - from`, whatever
//! the frame timing was.

use std::time::Duration;

use panegroup_core::animation::{Animation, FRAME_INTERVAL, Tween};
use panegroup_core::cancellation::{CancellationSource, CancellationToken};
use panegroup_core::{Decimal, PIXEL_DECIMAL_PLACES};
use panegroup_layout::{CollapseAnimation, ItemId};
use rust_decimal::prelude::FromPrimitive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollapseAction {
    Collapse,
    Expand,
}

impl CollapseAction {
    /// Collapsed flag once the action completes.
    #[must_use]
    pub const fn collapses(self) -> bool {
        matches!(self, Self::Collapse)
    }

    #[must_use]
    pub const fn from_collapsed(collapsed: bool) -> Self {
        if collapsed {
            Self::Collapse
        } else {
            Self::Expand
        }
    }
}

/// Parameters of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub panel: ItemId,
    pub action: CollapseAction,
    pub controlled: bool,
    /// Panel size when the transition starts.
    pub from: Decimal,
    /// Exact panel size at the end.
    pub target: Decimal,
    pub animation: CollapseAnimation,
}

/// An in-flight transition.
#[derive(Debug)]
pub struct Transition {
    pub plan: TransitionPlan,
    total: Decimal,
    applied: Decimal,
    tween: Tween,
    started_at: Option<Duration>,
    source: CancellationSource,
}

impl Transition {
    fn new(plan: TransitionPlan) -> Self {
        let tween = Tween::new(Duration::from_millis(plan.animation.duration_ms))
            .easing(plan.animation.easing.curve());
        Self {
            total: plan.target - plan.from,
            applied: Decimal::ZERO,
            tween,
            started_at: None,
            source: CancellationSource::new(),
            plan,
        }
    }

    /// Signed panel growth of the whole transition.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    /// Growth already handed out.
    #[must_use]
    pub const fn applied(&self) -> Decimal {
        self.applied
    }

    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.source.token()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.source.is_cancelled()
    }
}

/// Output of one animation frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameStep {
    pub panel: ItemId,
    /// Panel growth for this frame; negative while collapsing.
    pub delta: Decimal,
    /// The transition reached its end; call [`Animator::finish`].
    pub done: bool,
}

#[derive(Debug, Default)]
pub struct Animator {
    active: Option<Transition>,
}

impl Animator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin `plan`, cancelling and returning any transition in flight.
    pub fn start(&mut self, plan: TransitionPlan) -> Option<Transition> {
        let previous = self.cancel();
        self.active = Some(Transition::new(plan));
        previous
    }

    /// Cancel the transition in flight, leaving sizes where they are.
    pub fn cancel(&mut self) -> Option<Transition> {
        let previous = self.active.take()?;
        previous.source.cancel();
        Some(previous)
    }

    #[must_use]
    pub fn active(&self) -> Option<&Transition> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Advance to `now`.
    ///
    /// The first frame of a transition counts as one [`FRAME_INTERVAL`] of
    /// progress. Returns `None` when nothing is running.
    pub fn frame(&mut self, now: Duration) -> Option<FrameStep> {
        if self.active.as_ref().is_some_and(Transition::is_cancelled) {
            self.active = None;
        }
        let transition = self.active.as_mut()?;
        let start = *transition
            .started_at
            .get_or_insert_with(|| now.saturating_sub(FRAME_INTERVAL));
        transition.tween.seek(now.saturating_sub(start));

        let done = transition.tween.is_complete();
        let offset = if done {
            transition.total
        } else {
            let progress = Decimal::from_f64(transition.tween.value()).unwrap_or(Decimal::ONE);
            (transition.total * progress).round_dp(PIXEL_DECIMAL_PLACES)
        };
        let delta = offset - transition.applied;
        transition.applied = offset;
        Some(FrameStep {
            panel: transition.plan.panel.clone(),
            delta,
            done,
        })
    }

    /// Take the completed (or abandoned) transition.
    pub fn finish(&mut self) -> Option<Transition> {
        self.active.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panegroup_core::animation::Easing;
    use proptest::prelude::*;

    fn plan(action: CollapseAction, from: i64, target: i64, duration_ms: u64) -> TransitionPlan {
        TransitionPlan {
            panel: ItemId::new("p"),
            action,
            controlled: false,
            from: Decimal::from(from),
            target: Decimal::from(target),
            animation: CollapseAnimation {
                duration_ms,
                easing: Easing::EaseInOut,
            },
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn deltas_sum_to_exact_total() {
        let mut animator = Animator::new();
        animator.start(plan(CollapseAction::Collapse, 245, 60, 300));
        assert_eq!(animator.active().map(Transition::total), Some(Decimal::from(-185)));

        let mut sum = Decimal::ZERO;
        let mut frames = 0;
        for now in (1000..=1400).step_by(17) {
            let step = animator.frame(ms(now)).expect("running");
            sum += step.delta;
            frames += 1;
            if step.done {
                break;
            }
        }
        assert!(frames > 10);
        assert_eq!(sum, Decimal::from(-185));
        assert!(animator.finish().is_some());
        assert!(animator.frame(ms(2000)).is_none());
    }

    #[test]
    fn first_frame_makes_progress() {
        let mut animator = Animator::new();
        animator.start(plan(CollapseAction::Expand, 60, 200, 300));
        let step = animator.frame(ms(500)).expect("running");
        assert!(!step.done);
        assert!(step.delta > Decimal::ZERO);
    }

    #[test]
    fn zero_duration_completes_on_first_frame() {
        let mut animator = Animator::new();
        animator.start(plan(CollapseAction::Collapse, 100, 40, 0));
        let step = animator.frame(Duration::ZERO).expect("running");
        assert!(step.done);
        assert_eq!(step.delta, Decimal::from(-60));
    }

    #[test]
    fn starting_again_cancels_previous() {
        let mut animator = Animator::new();
        animator.start(plan(CollapseAction::Collapse, 100, 40, 300));
        let token = animator.active().map(Transition::token).expect("token");
        let previous = animator
            .start(plan(CollapseAction::Expand, 70, 100, 300))
            .expect("previous");
        assert_eq!(previous.plan.action, CollapseAction::Collapse);
        assert!(token.is_cancelled());
        assert_eq!(
            animator.active().map(|t| t.plan.action),
            Some(CollapseAction::Expand)
        );
    }

    #[test]
    fn cancel_stops_frames() {
        let mut animator = Animator::new();
        animator.start(plan(CollapseAction::Collapse, 100, 40, 300));
        assert!(animator.cancel().is_some());
        assert!(!animator.is_running());
        assert!(animator.frame(ms(10)).is_none());
    }

    #[test]
    fn action_maps_to_flag() {
        assert!(CollapseAction::Collapse.collapses());
        assert_eq!(CollapseAction::from_collapsed(false), CollapseAction::Expand);
    }

    fn easing() -> impl Strategy<Value = Easing> {
        prop_oneof![
            Just(Easing::Linear),
            Just(Easing::EaseIn),
            Just(Easing::EaseOut),
            Just(Easing::EaseInOut),
        ]
    }

    proptest! {
        #[test]
        fn any_frame_timing_sums_to_total(
            from in 0i64..800,
            target in 0i64..800,
            duration_ms in 0u64..600,
            easing in easing(),
            gaps in proptest::collection::vec(1u64..60, 1..64),
        ) {
            let mut animator = Animator::new();
            let mut plan = plan(CollapseAction::Expand, from, target, duration_ms);
            plan.animation.easing = easing;
            animator.start(plan);

            let mut now = 10_000;
            let mut sum = Decimal::ZERO;
            let mut done = false;
            for gap in gaps.iter().copied().cycle().take(2_000) {
                let step = animator.frame(ms(now)).expect("running");
                sum += step.delta;
                if step.done {
                    done = true;
                    break;
                }
                now += gap;
            }
            prop_assert!(done);
            prop_assert_eq!(sum, Decimal::from(target - from));
        }
    }
}
