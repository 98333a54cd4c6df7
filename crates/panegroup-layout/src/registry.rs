//! Item registration and document ordering.
//!
//! Items can arrive out of document order (conditionally rendered panels
//! mount late), so each carries an `order`. Items registered without one get
//! the lowest unused slot. Registering an id that is already present replaces
//! the item in place instead of appending a duplicate.
//!
//! On a measured group, [`insert_dynamic`] makes room for a new item by taking
//! space from its neighbours and [`remove`] hands the freed space back the
//! same way, so an insert followed by a remove restores the previous layout.

use panegroup_core::Decimal;
use rustc_hash::FxHashSet;

use crate::context::GroupContext;
use crate::error::{LayoutError, Result};
use crate::item::{Item, ItemId, PanelConstraints};
use crate::overflow::redistribute;

/// Where a registered item landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub index: usize,
    /// An item with the same id was replaced.
    pub replaced: bool,
}

/// Lowest order slot not used by `items`.
#[must_use]
pub fn next_order(items: &[Item]) -> u32 {
    let used: FxHashSet<u32> = items.iter().filter_map(Item::order).collect();
    (0..=u32::MAX)
        .find(|slot| !used.contains(slot))
        .unwrap_or(u32::MAX)
}

/// Insert or replace `item`, keeping `items` sorted by order.
///
/// A replaced panel keeps its live sizing state (current value, remembered
/// and observed sizes) and its collapsed flag, unless the new registration
/// is collapse-controlled, in which case the consumer's flag is taken.
pub fn register(items: &mut Vec<Item>, item: Item) -> Registration {
    if let Some(index) = items.iter().position(|existing| existing.id() == item.id()) {
        let slot = &mut items[index];
        let previous_order = slot.order();
        let mut item = item;
        if let (Item::Panel(old), Item::Panel(new)) = (&*slot, &mut item) {
            new.current_value = old.current_value;
            new.size_before_collapse = old.size_before_collapse;
            new.last_known_size = old.last_known_size;
            if !new.collapse_controlled {
                new.collapsed = old.collapsed;
            }
        }
        if item.order().is_none() {
            if let Some(order) = previous_order {
                item.set_order(order);
            }
        }
        *slot = item;
        return Registration {
            index,
            replaced: true,
        };
    }

    let mut item = item;
    let order = match item.order() {
        Some(order) => order,
        None => {
            let order = next_order(items);
            item.set_order(order);
            order
        }
    };
    let index = items
        .iter()
        .position(|existing| existing.order().is_some_and(|other| other > order))
        .unwrap_or(items.len());
    items.insert(index, item);
    Registration {
        index,
        replaced: false,
    }
}

/// Register `item` into a prepared, measured group, taking its size from
/// the neighbours. Returns the new items and where the item landed.
#[must_use]
pub fn insert_dynamic(ctx: &GroupContext, item: Item) -> (Vec<Item>, Registration) {
    let container = ctx.axis_size();
    let static_space = ctx.static_space();
    let mut items = ctx.items.clone();
    let registration = register(&mut items, item);
    if registration.replaced || !ctx.is_measured() {
        return (items, registration);
    }

    let index = registration.index;
    let needed = match &mut items[index] {
        Item::Handle(handle) => handle.size,
        Item::Panel(panel) => {
            let px = if panel.is_collapsed() {
                panel.collapsed_px(container)
            } else {
                panel
                    .default_size
                    .unwrap_or(panel.min)
                    .to_pixels(container, static_space)
            };
            panel.set_pixels(px);
            px
        }
    };
    redistribute(
        &mut items,
        container,
        index.checked_sub(1),
        index + 1,
        -needed,
    );
    (items, registration)
}

/// Remove item `id` from a prepared group, giving its space to the
/// neighbours when measured.
pub fn remove(ctx: &GroupContext, id: &str) -> Result<Vec<Item>> {
    let index = ctx.index_of(id).ok_or_else(|| LayoutError::UnknownItem {
        id: ItemId::new(id),
    })?;
    let container = ctx.axis_size();
    let freed = ctx.pixel_size(index).unwrap_or(Decimal::ZERO);
    let mut items = ctx.items.clone();
    items.remove(index);
    if ctx.is_measured() && !freed.is_zero() {
        redistribute(&mut items, container, index.checked_sub(1), index, freed);
    }
    Ok(items)
}

/// Replace the constraints of panel `id`.
pub fn update_constraints(
    items: &mut [Item],
    id: &str,
    constraints: PanelConstraints,
) -> Result<()> {
    let panel = items
        .iter_mut()
        .filter_map(Item::as_panel_mut)
        .find(|panel| panel.id.as_str() == id)
        .ok_or_else(|| LayoutError::UnknownPanel {
            id: ItemId::new(id),
        })?;
    panel.set_constraints(constraints);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Size;
    use crate::engine::{commit, initialize, prepare};
    use crate::item::{Handle, Panel};
    use crate::template::build_template;
    use panegroup_core::Unit;

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|item| item.id().as_str()).collect()
    }

    #[test]
    fn missing_orders_take_lowest_free_slot() {
        let mut items = Vec::new();
        register(&mut items, Panel::new("a").into());
        register(&mut items, Handle::new("h", 4).with_order(2).into());
        register(&mut items, Panel::new("b").into());
        assert_eq!(ids(&items), vec!["a", "b", "h"]);
        assert_eq!(items[1].order(), Some(1));
        assert_eq!(next_order(&items), 3);
    }

    #[test]
    fn explicit_order_inserts_before_larger_orders() {
        let mut items = Vec::new();
        register(&mut items, Panel::new("a").with_order(0).into());
        register(&mut items, Panel::new("c").with_order(4).into());
        let at = register(&mut items, Panel::new("b").with_order(2).into());
        assert_eq!(at.index, 1);
        assert_eq!(ids(&items), vec!["a", "b", "c"]);
    }

    #[test]
    fn re_registering_replaces_in_place() {
        let mut items = Vec::new();
        register(&mut items, Panel::new("a").into());
        register(&mut items, Panel::new("b").with_collapsed_size(Unit::px(40)).into());
        if let Some(b) = items[1].as_panel_mut() {
            b.current_value = Some(Unit::px(120));
            b.collapsed = true;
        }
        let again = register(
            &mut items,
            Panel::new("b")
                .with_collapsed_size(Unit::px(40))
                .with_min(Unit::px(30))
                .into(),
        );
        assert!(again.replaced);
        assert_eq!(items.len(), 2);
        let b = items[1].as_panel().expect("panel");
        assert_eq!(b.min, Unit::px(30));
        assert_eq!(b.current_value, Some(Unit::px(120)));
        assert!(b.collapsed);
        assert_eq!(b.order, Some(1));
    }

    #[test]
    fn controlled_re_registration_takes_new_flag() {
        let mut items = Vec::new();
        register(&mut items, Panel::new("a").with_collapsed_size(Unit::px(40)).into());
        let panel = Panel::new("a")
            .with_collapsed_size(Unit::px(40))
            .controlled(true)
            .collapsed(true);
        register(&mut items, panel.into());
        assert!(items[0].as_panel().expect("panel").collapsed);
    }

    fn measured_pair() -> GroupContext {
        let mut ctx = GroupContext::new("g")
            .with_size(Size::new(500, 200))
            .with_items([
                Item::from(Panel::new("a").with_order(0)),
                Item::from(Handle::new("h1", 10).with_order(1)),
                Item::from(Panel::new("b").with_order(2)),
            ]);
        ctx.items = initialize(&ctx);
        ctx.apply(commit(&ctx));
        ctx
    }

    fn insert(ctx: &mut GroupContext, item: Item) {
        ctx.items = prepare(ctx);
        let (items, _) = insert_dynamic(ctx, item);
        ctx.items = items;
        ctx.apply(commit(ctx));
    }

    fn drop_item(ctx: &mut GroupContext, id: &str) {
        ctx.items = prepare(ctx);
        ctx.items = remove(ctx, id).expect("registered");
        ctx.apply(commit(ctx));
    }

    #[test]
    fn dynamic_insert_then_remove_restores_layout() {
        let mut ctx = measured_pair();
        assert_eq!(build_template(&ctx), "245px 10px 245px");

        insert(&mut ctx, Handle::new("h2", 10).into());
        insert(&mut ctx, Panel::new("c").with_min(Unit::px(100)).into());
        assert_eq!(build_template(&ctx), "245px 10px 135px 10px 100px");

        drop_item(&mut ctx, "c");
        drop_item(&mut ctx, "h2");
        assert_eq!(build_template(&ctx), "245px 10px 245px");
    }

    #[test]
    fn removing_unknown_item_fails() {
        let ctx = measured_pair();
        assert_eq!(
            remove(&ctx, "zzz"),
            Err(LayoutError::UnknownItem { id: ItemId::from("zzz") })
        );
    }

    #[test]
    fn constraints_update_unknown_panel_fails() {
        let mut items = vec![Item::from(Handle::new("h", 10))];
        let err = update_constraints(&mut items, "h", PanelConstraints::default())
            .expect_err("handles have no constraints");
        assert_eq!(err, LayoutError::UnknownPanel { id: ItemId::from("h") });
    }
}
