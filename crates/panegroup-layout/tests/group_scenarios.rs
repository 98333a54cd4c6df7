//! End-to-end layout scenarios through the public pipeline:
//! initialize → prepare → drag → commit → template.

use panegroup_core::{Decimal, Unit};
use panegroup_layout::{
    GroupContext, Handle, Item, Panel, Size, UpdateMode, apply_delta_stepwise, build_template,
    commit, initialize, insert_dynamic, prepare, remove, resolve_overflow,
};

fn px(value: i64) -> Decimal {
    Decimal::from(value)
}

fn group(width: i64, items: Vec<Item>) -> GroupContext {
    GroupContext::new("scenario")
        .with_size(Size::new(width, 200))
        .with_items(items)
}

/// Measure, lay out and settle like a host's first resize callback.
fn mount(mut ctx: GroupContext) -> GroupContext {
    ctx.items = initialize(&ctx);
    let (patch, _) = resolve_overflow(&ctx);
    ctx.apply(patch);
    ctx.apply(commit(&ctx));
    ctx
}

fn drag(ctx: &mut GroupContext, handle: &str, delta: i64) {
    ctx.items = prepare(ctx);
    let patch = apply_delta_stepwise(ctx, handle, px(delta), UpdateMode::Drag).expect("handle");
    ctx.apply(patch);
    ctx.apply(commit(ctx));
}

fn resize(ctx: &mut GroupContext, width: i64) {
    ctx.size = Size::new(width, 200);
    ctx.items = initialize(ctx);
    let (patch, _) = resolve_overflow(ctx);
    ctx.apply(patch);
    ctx.apply(commit(ctx));
}

#[test]
fn two_panels_split_and_drag() {
    let mut ctx = mount(group(
        500,
        vec![
            Panel::new("a").into(),
            Handle::new("h", 10).into(),
            Panel::new("b").into(),
        ],
    ));
    assert_eq!(build_template(&ctx), "245px 10px 245px");

    drag(&mut ctx, "h", 10);
    assert_eq!(build_template(&ctx), "255px 10px 235px");
}

#[test]
fn collapsed_panel_before_measurement() {
    let ctx = group(
        0,
        vec![
            Panel::new("a")
                .try_min("200px")
                .and_then(|p| p.try_default("200px"))
                .expect("literals")
                .into(),
            Handle::new("h", 10).into(),
            Panel::new("b")
                .try_min("200px")
                .and_then(|p| p.try_collapsed_size("60px"))
                .expect("literals")
                .collapsed(true)
                .into(),
        ],
    );
    assert_eq!(build_template(&ctx), "minmax(200px, 1fr) 10px 60px");
}

#[test]
fn dynamic_panel_insert_and_remove_round_trip() {
    let mut ctx = mount(group(
        500,
        vec![
            Panel::new("a").into(),
            Handle::new("h1", 10).into(),
            Panel::new("b").into(),
        ],
    ));

    for item in [
        Item::from(Handle::new("h2", 10)),
        Item::from(Panel::new("c").with_min(Unit::px(100))),
    ] {
        ctx.items = prepare(&ctx);
        let (items, registration) = insert_dynamic(&ctx, item);
        assert!(!registration.replaced);
        ctx.items = items;
        ctx.apply(commit(&ctx));
    }
    assert_eq!(build_template(&ctx), "245px 10px 135px 10px 100px");

    for id in ["c", "h2"] {
        ctx.items = prepare(&ctx);
        ctx.items = remove(&ctx, id).expect("registered");
        ctx.apply(commit(&ctx));
    }
    assert_eq!(build_template(&ctx), "245px 10px 245px");
}

#[test]
fn shrinking_container_auto_collapses() {
    let mut ctx = mount(group(
        500,
        vec![
            Panel::new("a").with_min(Unit::px(200)).into(),
            Handle::new("h", 10).into(),
            Panel::new("b")
                .with_min(Unit::px(200))
                .with_collapsed_size(Unit::px(60))
                .into(),
        ],
    ));
    assert_eq!(build_template(&ctx), "245px 10px 245px");

    resize(&mut ctx, 300);
    assert!(ctx.panel("b").expect("b").collapsed);
    assert_eq!(build_template(&ctx), "230px 10px 60px");
}

#[test]
fn growing_container_scales_percentages() {
    let mut ctx = mount(group(
        500,
        vec![
            Panel::new("a").into(),
            Handle::new("h", 10).into(),
            Panel::new("b").into(),
        ],
    ));
    drag(&mut ctx, "h", -45);
    assert_eq!(build_template(&ctx), "200px 10px 290px");

    resize(&mut ctx, 990);
    assert_eq!(build_template(&ctx), "400px 10px 580px");
}

#[test]
fn vertical_group_uses_height() {
    let mut ctx = group(
        0,
        vec![
            Panel::new("top").into(),
            Handle::new("h", 4).into(),
            Panel::new("bottom").into(),
        ],
    )
    .with_orientation(panegroup_layout::Orientation::Vertical);
    ctx.size = Size::new(1000, 104);
    let ctx = mount(ctx);
    assert_eq!(build_template(&ctx), "50px 4px 50px");
}
