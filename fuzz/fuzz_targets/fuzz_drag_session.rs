#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use panegroup_core::{Decimal, Unit};
use panegroup_layout::{
    GroupContext, Handle, Item, Panel, Size, UpdateMode, apply_delta_stepwise, commit, initialize,
    prepare,
};

#[derive(Debug, Arbitrary)]
struct PanelSpec {
    min: u8,
    collapsed: Option<u8>,
    max: Option<u16>,
}

#[derive(Debug, Arbitrary)]
struct Session {
    width: u16,
    panels: Vec<PanelSpec>,
    drags: Vec<(u8, i16)>,
}

fuzz_target!(|session: Session| {
    let count = session.panels.len().clamp(2, 6);
    let width = i64::from(session.width % 1600) + 200;

    let mut items = Vec::new();
    for (index, spec) in session.panels.iter().take(count).enumerate() {
        if index > 0 {
            items.push(Item::from(Handle::new(format!("h{index}"), 4)));
        }
        let mut panel = Panel::new(format!("p{index}")).with_min(Unit::px(i64::from(spec.min % 80)));
        if let Some(collapsed) = spec.collapsed {
            panel = panel.with_collapsed_size(Unit::px(i64::from(collapsed % 40)));
        }
        if let Some(max) = spec.max.filter(|_| index + 1 < count) {
            panel = panel.with_max(Unit::px(i64::from(max % 600) + 100));
        }
        items.push(Item::from(panel));
    }
    if items.len() < 3 {
        return;
    }

    let mut ctx = GroupContext::new("fuzz")
        .with_size(Size::new(width, 100))
        .with_items(items);
    ctx.items = initialize(&ctx);
    ctx.apply(commit(&ctx));

    let handles = count - 1;
    for (pick, delta) in session.drags.iter().take(32) {
        let handle = format!("h{}", usize::from(*pick) % handles + 1);
        ctx.items = prepare(&ctx);
        let patch = apply_delta_stepwise(&ctx, &handle, Decimal::from(*delta), UpdateMode::Drag)
            .expect("handle exists");
        ctx.apply(patch);
        ctx.apply(commit(&ctx));
    }
    // Drags move space between panels and never change the total.
    let total = ctx.total_pixels().round_dp(6);
    let min_footprint = ctx.min_footprint();
    assert!(total == ctx.axis_size() || min_footprint > ctx.axis_size());
});
