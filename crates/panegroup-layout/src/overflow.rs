//! Overflow resolution and space redistribution.
//!
//! [`redistribute`] is the shared alternating walk used whenever space has to
//! be handed to (or taken from) the items around a position: constraint
//! enforcement, dynamic insert/remove and overflow resolution.
//!
//! [`resolve_overflow`] runs when the container cannot hold the minimum
//! footprint of the group. It collapses collapsible panels in document order
//! until the minimums fit, then settles the remaining difference around the
//! last collapsed panel.
//!
//! # Failure Modes
//!
//! With nothing left to collapse the panels stay at their minimums and the
//! excess is reported through [`OverflowReport::unresolved`]; sizes never go
//! below a minimum to make room.

use panegroup_core::Decimal;

use crate::context::{CollapseNotice, GroupContext, LayoutPatch, static_space};
use crate::engine::{UpdateMode, limits, total_pixels};
use crate::item::{Item, ItemId};

/// Result of an overflow pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverflowReport {
    /// Panels collapsed to make room, in order.
    pub collapsed: Vec<ItemId>,
    /// Pixels by which the items still exceed the container.
    pub unresolved: Decimal,
}

impl OverflowReport {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.unresolved.is_zero()
    }
}

/// Hand `amount` pixels to the panels around a position.
///
/// Positive amounts grow panels up to their max, negative amounts shrink
/// them down to their min. The walk alternates between `left_start`
/// (descending) and `right_start` (ascending), left first, and lets each
/// visited panel take as much as it can. Handles and collapsed panels are
/// skipped.
///
/// Returns the magnitude nobody could absorb.
pub fn redistribute(
    items: &mut [Item],
    container: Decimal,
    left_start: Option<usize>,
    right_start: usize,
    amount: Decimal,
) -> Decimal {
    let static_space = static_space(items, container);
    let grow = amount > Decimal::ZERO;
    let mut remaining = amount.abs();
    let mut left = left_start.filter(|&index| index < items.len());
    let mut right = right_start;

    while remaining > Decimal::ZERO && (left.is_some() || right < items.len()) {
        if let Some(index) = left {
            remaining = absorb(items, index, container, static_space, grow, remaining);
            left = index.checked_sub(1);
        }
        if right < items.len() && remaining > Decimal::ZERO {
            remaining = absorb(items, right, container, static_space, grow, remaining);
            right += 1;
        }
    }
    remaining
}

fn absorb(
    items: &mut [Item],
    index: usize,
    container: Decimal,
    static_space: Decimal,
    grow: bool,
    remaining: Decimal,
) -> Decimal {
    let Some(panel) = items[index].as_panel_mut() else {
        return remaining;
    };
    if panel.is_collapsed() {
        return remaining;
    }
    let px = panel.pixels(container, static_space);
    let (lo, hi) = limits(panel, container, static_space, UpdateMode::Drag);
    let capacity = (if grow { hi - px } else { px - lo }).max(Decimal::ZERO);
    let take = remaining.min(capacity);
    if take.is_zero() {
        return remaining;
    }
    panel.set_pixels(if grow { px + take } else { px - take });
    remaining - take
}

/// Fit a prepared (pixel-valued) group into its container.
///
/// Returns a patch with the new items and one notice per collapsed panel,
/// and a report of what could not be resolved. An unmeasured group, or one
/// whose minimum footprint already fits, yields an empty patch.
#[must_use]
pub fn resolve_overflow(ctx: &GroupContext) -> (LayoutPatch, OverflowReport) {
    let mut report = OverflowReport::default();
    let container = ctx.axis_size();
    if !ctx.is_measured() || ctx.min_footprint() <= container {
        return (LayoutPatch::default(), report);
    }

    let mut work = ctx.clone();
    let mut notices = Vec::new();
    let mut anchor = None;
    while work.min_footprint() > container {
        let Some(index) = work.items.iter().position(|item| {
            item.as_panel()
                .is_some_and(|panel| panel.collapsible && !panel.collapsed)
        }) else {
            break;
        };
        let static_space = work.static_space();
        if let Some(panel) = work.items[index].as_panel_mut() {
            let px = panel.pixels(container, static_space);
            panel.size_before_collapse = Some(px);
            panel.collapsed = true;
            panel.set_pixels(panel.collapsed_px(container));
            report.collapsed.push(panel.id.clone());
            notices.push(CollapseNotice {
                panel: panel.id.clone(),
                collapsed: true,
                controlled: false,
            });
        }
        anchor = Some(index);
    }

    let amount = container - total_pixels(&work.items, container);
    let (left, right) = match anchor {
        Some(index) => (index.checked_sub(1), index + 1),
        None => (None, 0),
    };
    let leftover = redistribute(&mut work.items, container, left, right, amount);
    if amount < Decimal::ZERO {
        report.unresolved = leftover;
    }

    let patch = LayoutPatch {
        items: Some(work.items),
        drag_overshoot: None,
        notices,
    };
    (patch, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Size;
    use crate::item::{Handle, Panel};
    use panegroup_core::Unit;

    fn px(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn sized(panel: Panel, value: i64) -> Item {
        let mut panel = panel;
        panel.current_value = Some(Unit::px(value));
        Item::Panel(panel)
    }

    #[test]
    fn redistribute_walks_left_first() {
        let mut items = vec![
            sized(Panel::new("a"), 100),
            Item::from(Handle::new("h1", 10)),
            sized(Panel::new("b"), 100),
            Item::from(Handle::new("h2", 10)),
            sized(Panel::new("c"), 100),
        ];
        let unresolved = redistribute(&mut items, px(320), Some(1), 3, px(-30));
        assert!(unresolved.is_zero());
        assert_eq!(items[0].pixels(px(320), px(20)), px(70));
        assert_eq!(items[4].pixels(px(320), px(20)), px(100));
    }

    #[test]
    fn redistribute_respects_minimums() {
        let mut items = vec![
            sized(Panel::new("a").with_min(Unit::px(90)), 100),
            Item::from(Handle::new("h", 10)),
            sized(Panel::new("b").with_min(Unit::px(80)), 100),
        ];
        let unresolved = redistribute(&mut items, px(210), None, 0, px(-50));
        assert_eq!(unresolved, px(20));
        assert_eq!(items[0].pixels(px(210), px(10)), px(90));
        assert_eq!(items[2].pixels(px(210), px(10)), px(80));
    }

    #[test]
    fn overflow_collapses_first_collapsible_panel() {
        let ctx = GroupContext::new("g")
            .with_size(Size::new(300, 100))
            .with_items([
                sized(Panel::new("a").with_min(Unit::px(200)), 200),
                Item::from(Handle::new("h", 10)),
                sized(
                    Panel::new("b")
                        .with_min(Unit::px(200))
                        .with_collapsed_size(Unit::px(60)),
                    200,
                ),
            ]);
        let (patch, report) = resolve_overflow(&ctx);
        assert!(report.is_resolved());
        assert_eq!(report.collapsed, vec![ItemId::from("b")]);
        assert_eq!(patch.notices.len(), 1);

        let mut ctx = ctx;
        ctx.apply(patch);
        assert_eq!(ctx.pixel_sizes(), vec![px(230), px(10), px(60)]);
        let b = ctx.panel("b").expect("panel b");
        assert!(b.collapsed);
        assert_eq!(b.size_before_collapse, Some(px(200)));
    }

    #[test]
    fn overflow_without_collapsible_keeps_minimums() {
        let ctx = GroupContext::new("g")
            .with_size(Size::new(300, 100))
            .with_items([
                sized(Panel::new("a").with_min(Unit::px(200)), 200),
                Item::from(Handle::new("h", 10)),
                sized(Panel::new("b").with_min(Unit::px(200)), 200),
            ]);
        let (patch, report) = resolve_overflow(&ctx);
        assert_eq!(report.unresolved, px(110));
        assert!(report.collapsed.is_empty());
        let mut ctx = ctx;
        ctx.apply(patch);
        assert_eq!(ctx.pixel_sizes(), vec![px(200), px(10), px(200)]);
    }

    #[test]
    fn fitting_group_is_left_alone() {
        let ctx = GroupContext::new("g")
            .with_size(Size::new(500, 100))
            .with_items([sized(Panel::new("a"), 500)]);
        let (patch, report) = resolve_overflow(&ctx);
        assert!(patch.is_empty());
        assert!(report.is_resolved());
    }
}
