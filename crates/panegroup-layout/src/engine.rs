//! Three-phase layout pipeline: prepare, update, commit.
//!
//! - [`prepare`] turns every stored size into pixels for the duration of an
//!   interaction.
//! - [`update`] is the constraint solver: it moves one handle by a signed
//!   delta, growing the panels on one side and shrinking the other.
//! - [`commit`] converts pixels back to their resting representation.
//!
//! Every function reads a [`GroupContext`] and returns new items or a
//! [`LayoutPatch`]; the context itself is only changed by whoever owns it.
//!
//! # Sign convention
//!
//! A positive delta moves the handle towards the end of the group: panels
//! before the handle grow, panels after it shrink. A negative delta does the
//! opposite.
//!
//! # Collapse buffer
//!
//! While dragging, a collapsible panel only collapses (or expands) once the
//! pointer has overshot its limit by [`COLLAPSE_BUFFER`] pixels. Until then
//! the excess accumulates in `drag_overshoot`, and moving back first unwinds
//! that accumulator before any panel moves. Programmatic updates
//! ([`UpdateMode::Programmatic`]) skip the buffer and never flip
//! `collapsed`, so every panel stays inside its drag limits. Only
//! [`resize_panel_by`] lets the one panel it resizes range over
//! `[collapsed_size, max]`, which is what collapse/expand transitions use.

use panegroup_core::{Decimal, PIXEL_DECIMAL_PLACES, Unit};

use crate::context::{CollapseNotice, GroupContext, LayoutPatch, static_space};
use crate::error::{LayoutError, Result};
use crate::item::{Item, ItemId, Panel};
use crate::overflow::redistribute;

/// Overshoot needed before a drag collapses or expands a panel.
pub const COLLAPSE_BUFFER: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Largest sum residue folded into a panel after decimal conversions.
pub const ROUNDING_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// How [`update`] treats collapsible panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UpdateMode {
    /// Interactive drag: collapse buffer, overshoot tracking, collapse flips.
    #[default]
    Drag,
    /// Imperative move: no buffer, no flips, no overshoot. A panel targeted
    /// by [`resize_panel_by`] also gets its relaxed collapse range.
    Programmatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Before,
    After,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Pixel range a panel may occupy.
///
/// Collapsed panels are pinned to their collapsed size while dragging, and an
/// open collapsible panel never goes below it. In programmatic mode a
/// collapsible panel ranges from its collapsed size to its max.
#[must_use]
pub fn limits(
    panel: &Panel,
    container: Decimal,
    static_space: Decimal,
    mode: UpdateMode,
) -> (Decimal, Decimal) {
    let min = panel.min.to_pixels(container, static_space);
    let max = panel.max.to_pixels(container, static_space).max(min);
    let collapsed = panel.collapsed_px(container);
    match mode {
        UpdateMode::Programmatic if panel.collapsible => (collapsed.min(min), max.max(collapsed)),
        _ if panel.is_collapsed() => (collapsed, collapsed),
        _ if panel.collapsible => {
            let floor = min.max(collapsed);
            (floor, max.max(floor))
        }
        _ => (min, max),
    }
}

/// Sum of item pixel sizes.
#[must_use]
pub fn total_pixels(items: &[Item], container: Decimal) -> Decimal {
    let static_space = static_space(items, container);
    items
        .iter()
        .map(|item| item.pixels(container, static_space))
        .sum()
}

fn resting_pixels(panel: &Panel, container: Decimal, static_space: Decimal) -> Option<Decimal> {
    if panel.is_collapsed() {
        return Some(panel.collapsed_px(container));
    }
    if let Some(seen) = panel.last_known_size {
        return Some(seen);
    }
    panel
        .current_value
        .or(panel.default_size)
        .map(|unit| unit.to_pixels(container, static_space))
}

/// Fold a sub-tolerance sum residue into one panel.
fn fold_residue(items: &mut [Item], container: Decimal, preferred: Option<usize>) {
    let residue = container - total_pixels(items, container);
    if residue.is_zero() || residue.abs() > ROUNDING_TOLERANCE {
        return;
    }
    let open = |item: &Item| item.as_panel().is_some_and(|panel| !panel.is_static());
    let target = preferred
        .filter(|&index| items.get(index).is_some_and(open))
        .or_else(|| items.iter().rposition(open));
    let Some(index) = target else {
        return;
    };
    let static_space = static_space(items, container);
    if let Some(panel) = items[index].as_panel_mut() {
        let px = panel.pixels(container, static_space);
        panel.set_pixels(px + residue);
    }
}

// ---------------------------------------------------------------------------
// Prepare / initialize / enforce
// ---------------------------------------------------------------------------

/// Convert every panel to pixels.
///
/// The last observed size wins over the stored value, collapsed panels use
/// their collapsed size. Calling it twice yields the same pixels.
#[must_use]
pub fn prepare(ctx: &GroupContext) -> Vec<Item> {
    let container = ctx.axis_size();
    let static_space = ctx.static_space();
    let mut items = ctx.items.clone();
    for panel in items.iter_mut().filter_map(Item::as_panel_mut) {
        let px = resting_pixels(panel, container, static_space)
            .unwrap_or_else(|| panel.min.to_pixels(container, static_space));
        panel.set_pixels(px);
    }
    if ctx.is_measured() {
        fold_residue(&mut items, container, None);
    }
    items
}

/// Full layout pass for a measured group.
///
/// Collapsed panels take their collapsed size, panels with a size (observed,
/// stored or default) keep it, and the rest share what is left equally with
/// the last one taking the remainder. Constraints are then enforced and any
/// leftover difference is handed out in document order.
#[must_use]
pub fn initialize(ctx: &GroupContext) -> Vec<Item> {
    let container = ctx.axis_size();
    let static_space = ctx.static_space();
    let mut items = ctx.items.clone();
    let mut used = Decimal::ZERO;
    let mut flexible = Vec::new();

    for (index, item) in items.iter_mut().enumerate() {
        match item {
            Item::Handle(handle) => used += handle.size,
            Item::Panel(panel) => match resting_pixels(panel, container, static_space) {
                Some(px) => {
                    panel.set_pixels(px);
                    used += px;
                }
                None => flexible.push(index),
            },
        }
    }

    if !flexible.is_empty() {
        let free = (container - used).max(Decimal::ZERO);
        let count = Decimal::from(flexible.len());
        let share = (free / count).round_dp(PIXEL_DECIMAL_PLACES);
        let last = flexible.len() - 1;
        for (n, &index) in flexible.iter().enumerate() {
            let px = if n == last {
                free - share * Decimal::from(last)
            } else {
                share
            };
            if let Some(panel) = items[index].as_panel_mut() {
                panel.set_pixels(px);
            }
        }
    }

    clamp_in_place(&mut items, container);
    let leftover = container - total_pixels(&items, container);
    if !leftover.is_zero() {
        redistribute(&mut items, container, None, 0, leftover);
    }
    items
}

/// Clamp every open panel into `[min, max]`, handing each difference to its
/// neighbours.
#[must_use]
pub fn enforce_constraints(ctx: &GroupContext) -> Vec<Item> {
    let mut items = ctx.items.clone();
    clamp_in_place(&mut items, ctx.axis_size());
    items
}

fn clamp_in_place(items: &mut [Item], container: Decimal) {
    for index in 0..items.len() {
        let static_space = static_space(items, container);
        let Some(panel) = items[index].as_panel_mut() else {
            continue;
        };
        if panel.is_collapsed() {
            continue;
        }
        let px = panel.pixels(container, static_space);
        let (lo, hi) = limits(panel, container, static_space, UpdateMode::Drag);
        let clamped = px.clamp(lo, hi);
        if clamped == px {
            continue;
        }
        panel.set_pixels(clamped);
        redistribute(items, container, index.checked_sub(1), index + 1, px - clamped);
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// Move `handle_id` by `delta` pixels.
///
/// Dragging past a limit is never an error: whatever cannot be applied
/// accumulates in the overshoot (drag mode) or is dropped (programmatic).
pub fn update(
    ctx: &GroupContext,
    handle_id: &str,
    delta: Decimal,
    mode: UpdateMode,
) -> Result<LayoutPatch> {
    solve(ctx, handle_id, delta, mode, None)
}

/// [`update`] where `focus`, in programmatic mode, gets the relaxed
/// collapse range; every other panel keeps its drag limits.
fn solve(
    ctx: &GroupContext,
    handle_id: &str,
    delta: Decimal,
    mode: UpdateMode,
    focus: Option<usize>,
) -> Result<LayoutPatch> {
    let handle = ctx
        .items
        .iter()
        .position(|item| item.is_handle() && item.id().as_str() == handle_id)
        .ok_or_else(|| LayoutError::UnknownHandle {
            id: ItemId::new(handle_id),
        })?;
    if delta.is_zero() {
        return Ok(LayoutPatch::default());
    }
    let mut solver = Solver::new(ctx, handle, mode, focus);
    solver.run(delta);
    Ok(solver.finish())
}

struct Solver {
    items: Vec<Item>,
    container: Decimal,
    measured: bool,
    handle: usize,
    mode: UpdateMode,
    focus: Option<usize>,
    overshoot: Decimal,
    start_overshoot: Decimal,
    notices: Vec<CollapseNotice>,
    changed: bool,
    last_shrunk: Option<usize>,
}

impl Solver {
    fn new(ctx: &GroupContext, handle: usize, mode: UpdateMode, focus: Option<usize>) -> Self {
        Self {
            items: ctx.items.clone(),
            container: ctx.axis_size(),
            measured: ctx.is_measured(),
            handle,
            mode,
            focus,
            overshoot: ctx.drag_overshoot,
            start_overshoot: ctx.drag_overshoot,
            notices: Vec::new(),
            changed: false,
            last_shrunk: None,
        }
    }

    fn drag(&self) -> bool {
        self.mode == UpdateMode::Drag
    }

    fn static_space(&self) -> Decimal {
        static_space(&self.items, self.container)
    }

    fn panel(&self, index: usize) -> Option<&Panel> {
        self.items.get(index).and_then(Item::as_panel)
    }

    fn px(&self, index: usize) -> Decimal {
        let static_space = self.static_space();
        self.items[index].pixels(self.container, static_space)
    }

    fn set_px(&mut self, index: usize, value: Decimal) {
        if let Some(panel) = self.items[index].as_panel_mut() {
            panel.set_pixels(value);
            self.changed = true;
        }
    }

    fn limits(&self, index: usize, static_space: Decimal) -> (Decimal, Decimal) {
        let mode = match self.focus {
            Some(focus) if focus == index => self.mode,
            _ => UpdateMode::Drag,
        };
        self.panel(index).map_or((Decimal::ZERO, Decimal::ZERO), |panel| {
            limits(panel, self.container, static_space, mode)
        })
    }

    /// Panel indices on one side of the handle, nearest first.
    fn side(&self, side: Side) -> Vec<usize> {
        let panel_at = |index: &usize| self.items[*index].is_panel();
        match side {
            Side::Before => (0..self.handle).rev().filter(panel_at).collect(),
            Side::After => (self.handle + 1..self.items.len()).filter(panel_at).collect(),
        }
    }

    fn run(&mut self, delta: Decimal) {
        let delta = if self.drag() {
            self.unwind_overshoot(delta)
        } else {
            delta
        };
        if delta.is_zero() {
            return;
        }
        let forward = delta > Decimal::ZERO;
        let signed = |amount: Decimal| if forward { amount } else { -amount };
        let (grow_side, shrink_side) = if forward {
            (Side::Before, Side::After)
        } else {
            (Side::After, Side::Before)
        };

        let mut remaining = delta.abs();
        while remaining > Decimal::ZERO {
            let Some(grow) = self.grow_target(grow_side) else {
                break;
            };
            if self.drag() && self.panel(grow).is_some_and(Panel::is_collapsed) {
                self.expand_through_buffer(grow, shrink_side, signed(remaining));
                return;
            }
            let Some(shrink) = self.shrink_target(shrink_side) else {
                break;
            };

            let static_space = self.static_space();
            let (lo, _) = self.limits(shrink, static_space);
            let (_, hi) = self.limits(grow, static_space);
            let shrink_px = self.px(shrink);
            let grow_px = self.px(grow);
            let spare = shrink_px - lo;
            if spare <= Decimal::ZERO {
                self.collapse_through_buffer(shrink, grow_side, signed(remaining));
                return;
            }
            let applied = remaining.min(spare).min(hi - grow_px);
            if applied <= Decimal::ZERO {
                break;
            }
            self.set_px(shrink, shrink_px - applied);
            self.set_px(grow, grow_px + applied);
            self.last_shrunk = Some(shrink);
            remaining -= applied;
        }

        if self.drag() && remaining > Decimal::ZERO {
            self.overshoot += signed(remaining);
        }
    }

    /// Movement against the overshoot consumes it before anything moves.
    fn unwind_overshoot(&mut self, delta: Decimal) -> Decimal {
        let overshoot = self.overshoot;
        if overshoot > Decimal::ZERO && delta < Decimal::ZERO {
            let take = (-delta).min(overshoot);
            self.overshoot -= take;
            delta + take
        } else if overshoot < Decimal::ZERO && delta > Decimal::ZERO {
            let take = delta.min(-overshoot);
            self.overshoot += take;
            delta - take
        } else {
            delta
        }
    }

    /// Nearest panel that can grow. A collapsed panel always qualifies while
    /// dragging since it may expand through the buffer.
    fn grow_target(&self, side: Side) -> Option<usize> {
        let static_space = self.static_space();
        self.side(side).into_iter().find(|&index| {
            let Some(panel) = self.panel(index) else {
                return false;
            };
            if self.drag() && panel.is_collapsed() {
                return true;
            }
            let (_, hi) = self.limits(index, static_space);
            hi > self.px(index)
        })
    }

    /// Nearest panel that can give space: one above its floor, or (while
    /// dragging) an open collapsible panel sitting at its minimum.
    fn shrink_target(&self, side: Side) -> Option<usize> {
        let static_space = self.static_space();
        self.side(side).into_iter().find(|&index| {
            let Some(panel) = self.panel(index) else {
                return false;
            };
            if self.drag() && panel.is_collapsed() {
                return false;
            }
            let (lo, _) = self.limits(index, static_space);
            self.px(index) > lo || (self.drag() && panel.collapsible)
        })
    }

    /// Total a side can give (`grow == false`) or take (`grow == true`).
    fn capacity(&self, side: Side, static_space: Decimal, grow: bool) -> Decimal {
        self.side(side)
            .into_iter()
            .filter(|&index| self.panel(index).is_some_and(|panel| !panel.is_collapsed()))
            .map(|index| {
                let px = self.items[index].pixels(self.container, static_space);
                let (lo, hi) = self.limits(index, static_space);
                (if grow { hi - px } else { px - lo }).max(Decimal::ZERO)
            })
            .sum()
    }

    /// Move `amount` across one side, nearest panel first.
    fn spread(&mut self, side: Side, static_space: Decimal, amount: Decimal, grow: bool) {
        let mut remaining = amount;
        for index in self.side(side) {
            if remaining <= Decimal::ZERO {
                break;
            }
            if self.panel(index).is_none_or(Panel::is_collapsed) {
                continue;
            }
            let px = self.items[index].pixels(self.container, static_space);
            let (lo, hi) = self.limits(index, static_space);
            let capacity = (if grow { hi - px } else { px - lo }).max(Decimal::ZERO);
            let take = remaining.min(capacity);
            if take.is_zero() {
                continue;
            }
            self.set_px(index, if grow { px + take } else { px - take });
            if !grow && self.last_shrunk.is_none() {
                self.last_shrunk = Some(index);
            }
            remaining -= take;
        }
    }

    fn expand_through_buffer(&mut self, index: usize, shrink_side: Side, amount: Decimal) {
        self.overshoot += amount;
        if self.overshoot.abs() < COLLAPSE_BUFFER {
            return;
        }
        let Some(panel) = self.panel(index) else {
            return;
        };
        let collapsed_px = panel.collapsed_px(self.container);
        let controlled = panel.collapse_controlled;
        let id = panel.id.clone();
        // Limits of the panel once it is open again.
        let open_static = self.static_space() - collapsed_px;
        let min = panel.min.to_pixels(self.container, open_static);
        let max = panel.max.to_pixels(self.container, open_static).max(min);
        let target = (collapsed_px + self.overshoot.abs()).max(min).min(max);
        let needed = target - collapsed_px;
        if needed <= Decimal::ZERO {
            return;
        }

        let static_space = self.static_space();
        if self.capacity(shrink_side, static_space, false) < needed {
            return;
        }
        if controlled {
            self.notices.push(CollapseNotice {
                panel: id,
                collapsed: false,
                controlled: true,
            });
            return;
        }
        self.spread(shrink_side, static_space, needed, false);
        if let Some(panel) = self.items[index].as_panel_mut() {
            panel.collapsed = false;
            panel.set_pixels(target);
        }
        self.changed = true;
        self.overshoot = Decimal::ZERO;
        self.notices.push(CollapseNotice {
            panel: id,
            collapsed: false,
            controlled: false,
        });
    }

    fn collapse_through_buffer(&mut self, index: usize, grow_side: Side, amount: Decimal) {
        self.overshoot += amount;
        if self.overshoot.abs() < COLLAPSE_BUFFER {
            return;
        }
        let Some(panel) = self.panel(index) else {
            return;
        };
        let collapsed_px = panel.collapsed_px(self.container);
        let controlled = panel.collapse_controlled;
        let id = panel.id.clone();
        let px = self.px(index);
        let freed = (px - collapsed_px).max(Decimal::ZERO);
        // Room on the grow side once this panel counts as static space.
        let collapsed_static = self.static_space() + collapsed_px;
        if self.capacity(grow_side, collapsed_static, true) < freed {
            return;
        }
        if controlled {
            self.notices.push(CollapseNotice {
                panel: id,
                collapsed: true,
                controlled: true,
            });
            return;
        }
        if let Some(panel) = self.items[index].as_panel_mut() {
            panel.size_before_collapse = Some(px);
            panel.collapsed = true;
            panel.set_pixels(collapsed_px);
        }
        self.changed = true;
        self.spread(grow_side, collapsed_static, freed, true);
        self.overshoot = Decimal::ZERO;
        self.notices.push(CollapseNotice {
            panel: id,
            collapsed: true,
            controlled: false,
        });
    }

    fn finish(mut self) -> LayoutPatch {
        if self.changed && self.measured {
            fold_residue(&mut self.items, self.container, self.last_shrunk);
        }
        LayoutPatch {
            items: self.changed.then_some(self.items),
            drag_overshoot: (self.overshoot != self.start_overshoot).then_some(self.overshoot),
            notices: self.notices,
        }
    }
}

/// Replay `delta` as one-pixel steps plus the fractional remainder, so a
/// large jump behaves exactly like an interactive drag of the same length.
///
/// The number of unit steps is bounded by the axis size plus the collapse
/// buffer; anything beyond that is applied as one final step. Replay stops
/// early once a step asks a consumer for a controlled collapse decision.
pub fn apply_delta_stepwise(
    ctx: &GroupContext,
    handle_id: &str,
    delta: Decimal,
    mode: UpdateMode,
) -> Result<LayoutPatch> {
    replay(ctx, handle_id, delta, mode, None)
}

fn replay(
    ctx: &GroupContext,
    handle_id: &str,
    delta: Decimal,
    mode: UpdateMode,
    focus: Option<usize>,
) -> Result<LayoutPatch> {
    let mut work = ctx.clone();
    let mut notices = Vec::new();
    let magnitude = delta.abs();
    let step_cap = ctx.axis_size().ceil() + COLLAPSE_BUFFER + Decimal::ONE;
    let steps = magnitude.trunc().min(step_cap);
    let step = if delta > Decimal::ZERO {
        Decimal::ONE
    } else {
        Decimal::NEGATIVE_ONE
    };

    let mut done = Decimal::ZERO;
    let mut stopped = false;
    while done < steps {
        let patch = solve(&work, handle_id, step, mode, focus)?;
        let controlled = patch.notices.iter().any(|notice| notice.controlled);
        let idle = patch.is_empty();
        notices.extend(work.apply(patch));
        done += Decimal::ONE;
        if controlled {
            stopped = true;
            break;
        }
        if idle && mode == UpdateMode::Programmatic {
            break;
        }
    }

    let rest = magnitude - done;
    if !stopped && rest > Decimal::ZERO && done == steps {
        let patch = solve(&work, handle_id, rest * step, mode, focus)?;
        notices.extend(work.apply(patch));
    }
    // Validate the handle even when there was nothing to replay.
    if steps.is_zero() && rest.is_zero() {
        solve(&work, handle_id, Decimal::ZERO, mode, focus)?;
    }

    Ok(LayoutPatch {
        items: (work.items != ctx.items).then_some(work.items),
        drag_overshoot: (work.drag_overshoot != ctx.drag_overshoot).then_some(work.drag_overshoot),
        notices,
    })
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Convert live pixel sizes to their resting representation.
///
/// Open panels store a percentage of the dynamic space, collapsed panels
/// store their collapsed size and static-at-rest panels keep pixels.
/// Last-observed sizes are cleared and the overshoot resets.
#[must_use]
pub fn commit(ctx: &GroupContext) -> LayoutPatch {
    let container = ctx.axis_size();
    let static_space = ctx.static_space();
    let measured = ctx.is_measured();
    let mut items = ctx.items.clone();
    for panel in items.iter_mut().filter_map(Item::as_panel_mut) {
        panel.last_known_size = None;
        if !measured {
            continue;
        }
        if panel.is_collapsed() {
            panel.current_value = Some(Unit::Pixel(panel.collapsed_px(container)));
            continue;
        }
        let Some(value) = panel.current_value else {
            continue;
        };
        let px = value.to_pixels(container, static_space);
        panel.current_value = Some(if panel.static_at_rest {
            Unit::Pixel(px)
        } else {
            Unit::Pixel(px).as_percent_unit(container, static_space)
        });
    }
    LayoutPatch {
        items: Some(items),
        drag_overshoot: Some(Decimal::ZERO),
        notices: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Panel-targeted helpers
// ---------------------------------------------------------------------------

/// Handle through which `panel_id` is resized, and the delta sign that grows
/// the panel.
///
/// Prefers the handle after the panel (a positive delta grows it), falling
/// back to the handle before it.
pub fn resize_handle(ctx: &GroupContext, panel_id: &str) -> Result<(ItemId, Decimal)> {
    let index = ctx
        .items
        .iter()
        .position(|item| item.is_panel() && item.id().as_str() == panel_id)
        .ok_or_else(|| LayoutError::UnknownPanel {
            id: ItemId::new(panel_id),
        })?;
    let items = &ctx.items;
    let after = (index + 1..items.len())
        .find(|&i| items[i].is_handle())
        .filter(|&i| items[i + 1..].iter().any(Item::is_panel));
    if let Some(handle) = after {
        return Ok((items[handle].id().clone(), Decimal::ONE));
    }
    let before = (0..index)
        .rev()
        .find(|&i| items[i].is_handle())
        .filter(|&i| items[..i].iter().any(Item::is_panel));
    match before {
        Some(handle) => Ok((items[handle].id().clone(), Decimal::NEGATIVE_ONE)),
        None => Err(LayoutError::NoAdjacentHandle {
            id: ItemId::new(panel_id),
        }),
    }
}

/// Grow (positive `delta`) or shrink a prepared panel through its
/// [`resize_handle`], replayed stepwise in programmatic mode.
///
/// Only the panel itself may range over `[collapsed_size, max]`; the
/// panels giving or taking the space keep their drag limits.
pub fn resize_panel_by(
    ctx: &GroupContext,
    panel_id: &str,
    delta: Decimal,
) -> Result<LayoutPatch> {
    let (handle, grow_sign) = resize_handle(ctx, panel_id)?;
    replay(
        ctx,
        handle.as_str(),
        delta * grow_sign,
        UpdateMode::Programmatic,
        ctx.index_of(panel_id),
    )
}

/// Programmatically resize a prepared panel to `target` pixels.
pub fn resize_panel(ctx: &GroupContext, panel_id: &str, target: Decimal) -> Result<LayoutPatch> {
    let index = ctx.index_of(panel_id).ok_or_else(|| LayoutError::UnknownPanel {
        id: ItemId::new(panel_id),
    })?;
    let current = ctx.pixel_size(index).unwrap_or(Decimal::ZERO);
    resize_panel_by(ctx, panel_id, target - current)
}
