//! Track-sizing descriptor.
//!
//! [`build_template`] renders one space-separated token per item, in order.
//! It is a pure function of the context and byte-stable, so hosts can
//! snapshot-test it and recompute it after every notification.
//!
//! | State | Token |
//! |-------|-------|
//! | handle | `10px` |
//! | measured panel | its resolved size, `245px` |
//! | unmeasured, collapsed | collapsed size |
//! | unmeasured, pixel value | `180px` |
//! | unmeasured, percent value | `minmax(min, min(calc(P% - Spx), max))` |
//! | unmeasured, first fill panel without a value | `minmax(default, 1fr)` |
//! | unmeasured, default only | `200px` |
//! | otherwise | `minmax(min, max)` |
//!
//! Only one panel per render uses `1fr`; it absorbs rounding in the host.

use panegroup_core::{Decimal, FILL_LITERAL, PIXEL_DECIMAL_PLACES, SizeExpr, Unit};

use crate::context::GroupContext;
use crate::item::{Item, Panel};

/// Upper bound literal for a `max` expression.
fn max_literal(max: SizeExpr) -> String {
    match max {
        SizeExpr::Fill => "100%".to_string(),
        SizeExpr::Size(unit) => unit.to_string(),
    }
}

fn pixel_literal(value: Decimal) -> String {
    Unit::Pixel(value.round_dp(PIXEL_DECIMAL_PLACES)).to_string()
}

/// Render the descriptor for `ctx`.
#[must_use]
pub fn build_template(ctx: &GroupContext) -> String {
    let container = ctx.axis_size();
    let static_space = ctx.static_space();
    let measured = ctx.is_measured();
    let mut fill_taken = false;

    ctx.items
        .iter()
        .map(|item| match item {
            Item::Handle(handle) => pixel_literal(handle.size),
            Item::Panel(panel) => match panel.current_value {
                Some(value) if measured => pixel_literal(value.to_pixels(container, static_space)),
                _ => unmeasured_token(panel, static_space, &mut fill_taken),
            },
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn unmeasured_token(panel: &Panel, static_space: Decimal, fill_taken: &mut bool) -> String {
    if panel.is_collapsed() {
        return panel.collapsed_size.to_string();
    }
    match panel.current_value {
        Some(Unit::Pixel(value)) => pixel_literal(value),
        Some(Unit::Percent(fraction)) => {
            let percent = (fraction * Decimal::ONE_HUNDRED).normalize();
            let offset = (fraction * static_space)
                .round_dp(PIXEL_DECIMAL_PLACES)
                .normalize();
            format!(
                "minmax({}, min(calc({percent}% - {offset}px), {}))",
                panel.min,
                max_literal(panel.max)
            )
        }
        None if panel.max.is_fill() && !*fill_taken => {
            *fill_taken = true;
            let floor = panel.default_size.unwrap_or(panel.min);
            format!("minmax({floor}, {FILL_LITERAL})")
        }
        None => match panel.default_size {
            Some(default_size) => default_size.to_string(),
            None => format!("minmax({}, {})", panel.min, max_literal(panel.max)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Size;
    use crate::engine::{commit, initialize};
    use crate::item::Handle;

    fn pair(a: Panel, b: Panel) -> GroupContext {
        GroupContext::new("g").with_items([
            Item::from(a),
            Item::from(Handle::new("h", 10)),
            Item::from(b),
        ])
    }

    #[test]
    fn unmeasured_collapsed_layout() {
        let ctx = pair(
            Panel::new("a").with_min(Unit::px(200)).with_default(Unit::px(200)),
            Panel::new("b")
                .with_min(Unit::px(200))
                .with_collapsed_size(Unit::px(60))
                .collapsed(true),
        );
        assert_eq!(build_template(&ctx), "minmax(200px, 1fr) 10px 60px");
    }

    #[test]
    fn only_one_fill_token_per_render() {
        let ctx = pair(Panel::new("a"), Panel::new("b"));
        assert_eq!(build_template(&ctx), "minmax(0px, 1fr) 10px minmax(0px, 100%)");
    }

    #[test]
    fn default_and_bounded_tokens() {
        let ctx = pair(
            Panel::new("a").with_max(Unit::px(300)).with_default(Unit::pct(30)),
            Panel::new("b").with_min(Unit::px(50)).with_max(Unit::pct(80)),
        );
        assert_eq!(build_template(&ctx), "30% 10px minmax(50px, 80%)");
    }

    #[test]
    fn unmeasured_percent_values_subtract_static_share() {
        let mut ctx = pair(Panel::new("a"), Panel::new("b").with_max(Unit::px(400)));
        for panel in ctx.items.iter_mut().filter_map(Item::as_panel_mut) {
            panel.current_value = Some(Unit::pct(50));
        }
        assert_eq!(
            build_template(&ctx),
            "minmax(0px, min(calc(50% - 5px), 100%)) 10px minmax(0px, min(calc(50% - 5px), 400px))"
        );
    }

    #[test]
    fn measured_layout_emits_pixels() {
        let mut ctx = pair(Panel::new("a"), Panel::new("b")).with_size(Size::new(500, 200));
        ctx.items = initialize(&ctx);
        assert_eq!(build_template(&ctx), "245px 10px 245px");
        ctx.apply(commit(&ctx));
        assert_eq!(build_template(&ctx), "245px 10px 245px");
    }

    #[test]
    fn template_is_stable_across_calls() {
        let mut ctx = pair(Panel::new("a"), Panel::new("b")).with_size(Size::new(333, 200));
        ctx.items = initialize(&ctx);
        ctx.apply(commit(&ctx));
        assert_eq!(build_template(&ctx), build_template(&ctx.clone()));
    }
}
