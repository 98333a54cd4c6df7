//! The group context: aggregate root owned by the machine.
//!
//! # Invariants
//!
//! 1. Items are kept in document order (ascending `order`).
//! 2. After a commit on a measured group, the pixel sizes of all items sum to
//!    [`GroupContext::axis_size`] unless an overflow is left unresolved.
//! 3. A collapsed panel's size equals its collapsed size at rest.
//!
//! The context is only mutated through [`GroupContext::apply`] with a
//! [`LayoutPatch`] produced by the engine, or by the runtime's event
//! handlers.

use panegroup_core::{Decimal, dynamic_space};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::item::{Handle, Item, ItemId, Panel};

/// Axis along which items are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Measured container box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: Decimal,
    pub height: Decimal,
}

impl Size {
    #[must_use]
    pub fn new(width: impl Into<Decimal>, height: impl Into<Decimal>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
        }
    }

    /// Dimension along `orientation`.
    #[must_use]
    pub const fn axis(&self, orientation: Orientation) -> Decimal {
        match orientation {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }
}

/// Where autosaved snapshots go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutosaveStrategy {
    /// Key-value store keyed by group id.
    LocalStorage,
    /// Cookie named after the group id, one year expiry.
    Cookie,
}

/// Request to flip a panel's collapsed state.
///
/// When `controlled` is set nothing was mutated: the consumer owns the flag
/// and must answer with a controlled collapse/expand of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapseNotice {
    pub panel: ItemId,
    pub collapsed: bool,
    pub controlled: bool,
}

/// Partial context update returned by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutPatch {
    pub items: Option<Vec<Item>>,
    pub drag_overshoot: Option<Decimal>,
    pub notices: Vec<CollapseNotice>,
}

impl LayoutPatch {
    #[must_use]
    pub fn items(items: Vec<Item>) -> Self {
        Self {
            items: Some(items),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn overshoot(drag_overshoot: Decimal) -> Self {
        Self {
            drag_overshoot: Some(drag_overshoot),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_none() && self.drag_overshoot.is_none() && self.notices.is_empty()
    }
}

/// Complete state of one panel group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupContext {
    pub group_id: String,
    pub items: Vec<Item>,
    pub size: Size,
    pub orientation: Orientation,
    pub drag_overshoot: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_drag_handle_id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autosave_strategy: Option<AutosaveStrategy>,
}

impl GroupContext {
    #[must_use]
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            items: Vec::new(),
            size: Size::default(),
            orientation: Orientation::default(),
            drag_overshoot: Decimal::ZERO,
            active_drag_handle_id: None,
            autosave_strategy: None,
        }
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.items = items.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_autosave(mut self, strategy: AutosaveStrategy) -> Self {
        self.autosave_strategy = Some(strategy);
        self
    }

    /// Container dimension along the group axis.
    #[must_use]
    pub const fn axis_size(&self) -> Decimal {
        self.size.axis(self.orientation)
    }

    /// Whether the host has reported a non-empty container.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.axis_size() > Decimal::ZERO
    }

    /// Space taken by handles, collapsed panels and static-at-rest panels.
    #[must_use]
    pub fn static_space(&self) -> Decimal {
        static_space(&self.items, self.axis_size())
    }

    #[must_use]
    pub fn dynamic_space(&self) -> Decimal {
        dynamic_space(self.axis_size(), self.static_space())
    }

    /// Pixel size of the item at `index`.
    #[must_use]
    pub fn pixel_size(&self, index: usize) -> Option<Decimal> {
        let container = self.axis_size();
        let static_space = self.static_space();
        self.items
            .get(index)
            .map(|item| item.pixels(container, static_space))
    }

    /// Pixel sizes of all items, in order.
    #[must_use]
    pub fn pixel_sizes(&self) -> Vec<Decimal> {
        let container = self.axis_size();
        let static_space = self.static_space();
        self.items
            .iter()
            .map(|item| item.pixels(container, static_space))
            .collect()
    }

    #[must_use]
    pub fn total_pixels(&self) -> Decimal {
        self.pixel_sizes().into_iter().sum()
    }

    /// Smallest footprint the items can take: handles, collapsed sizes for
    /// collapsed panels, minimums for the rest.
    #[must_use]
    pub fn min_footprint(&self) -> Decimal {
        let container = self.axis_size();
        let static_space = self.static_space();
        self.items
            .iter()
            .map(|item| match item {
                Item::Handle(handle) => handle.size,
                Item::Panel(panel) if panel.is_collapsed() => panel.collapsed_px(container),
                Item::Panel(panel) => panel.min.to_pixels(container, static_space),
            })
            .sum()
    }

    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id().as_str() == id)
    }

    /// Id to index lookup for batch operations.
    #[must_use]
    pub fn index_map(&self) -> FxHashMap<&str, usize> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| (item.id().as_str(), index))
            .collect()
    }

    #[must_use]
    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.items
            .iter()
            .filter_map(Item::as_panel)
            .find(|panel| panel.id.as_str() == id)
    }

    pub fn panel_mut(&mut self, id: &str) -> Option<&mut Panel> {
        self.items
            .iter_mut()
            .filter_map(Item::as_panel_mut)
            .find(|panel| panel.id.as_str() == id)
    }

    #[must_use]
    pub fn handle(&self, id: &str) -> Option<&Handle> {
        self.items
            .iter()
            .filter_map(Item::as_handle)
            .find(|handle| handle.id.as_str() == id)
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.items.iter().filter_map(Item::as_panel)
    }

    /// Apply an engine patch, returning its collapse notices.
    pub fn apply(&mut self, patch: LayoutPatch) -> Vec<CollapseNotice> {
        if let Some(items) = patch.items {
            self.items = items;
        }
        if let Some(overshoot) = patch.drag_overshoot {
            self.drag_overshoot = overshoot;
        }
        patch.notices
    }
}

/// Static space of an item list along an axis of `container` pixels.
#[must_use]
pub fn static_space(items: &[Item], container: Decimal) -> Decimal {
    items
        .iter()
        .map(|item| match item {
            Item::Handle(handle) => handle.size,
            Item::Panel(panel) if panel.is_collapsed() => panel.collapsed_px(container),
            Item::Panel(panel) if panel.is_static() => panel.pixels(container, Decimal::ZERO),
            Item::Panel(_) => Decimal::ZERO,
        })
        .sum()
}
