//! Panels and handles: the items of a group.

use std::borrow::Borrow;
use std::fmt;

use panegroup_core::animation::{DEFAULT_ANIMATION_DURATION, Easing};
use panegroup_core::{Decimal, SizeExpr, Unit, UnitError};
use serde::{Deserialize, Serialize};

/// Host-provided stable item identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Per-panel collapse/expand transition settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollapseAnimation {
    pub duration_ms: u64,
    pub easing: Easing,
}

impl CollapseAnimation {
    /// No animation: collapse/expand completes in the requesting event.
    pub const INSTANT: Self = Self {
        duration_ms: 0,
        easing: Easing::Linear,
    };
}

impl Default for CollapseAnimation {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_ANIMATION_DURATION.as_millis() as u64,
            easing: Easing::Linear,
        }
    }
}

/// Size constraints of a panel, replaceable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelConstraints {
    pub min: Unit,
    pub max: SizeExpr,
    #[serde(default, rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_size: Option<Unit>,
    pub collapsible: bool,
    pub collapsed_size: Unit,
}

impl Default for PanelConstraints {
    fn default() -> Self {
        Self {
            min: Unit::ZERO,
            max: SizeExpr::Fill,
            default_size: None,
            collapsible: false,
            collapsed_size: Unit::ZERO,
        }
    }
}

impl PanelConstraints {
    /// Build from host literals (`"200px"`, `"30%"`, `"1fr"`).
    pub fn parse(
        min: Option<&str>,
        max: Option<&str>,
        default_size: Option<&str>,
        collapsed_size: Option<&str>,
    ) -> Result<Self, UnitError> {
        let mut constraints = Self::default();
        if let Some(min) = min {
            constraints.min = Unit::parse(min)?;
        }
        if let Some(max) = max {
            constraints.max = SizeExpr::parse(max)?;
        }
        constraints.default_size = default_size.map(Unit::parse).transpose()?;
        if let Some(collapsed_size) = collapsed_size {
            constraints.collapsed_size = Unit::parse(collapsed_size)?;
            constraints.collapsible = true;
        }
        Ok(constraints)
    }
}

/// A resizable region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    pub min: Unit,
    pub max: SizeExpr,
    #[serde(default, rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_size: Option<Unit>,
    #[serde(default)]
    pub collapsible: bool,
    #[serde(default)]
    pub collapsed_size: Unit,
    #[serde(default)]
    pub collapsed: bool,
    /// The consumer owns `collapsed`; the engine only requests changes.
    #[serde(default)]
    pub collapse_controlled: bool,
    /// Keep pixels at rest instead of converting to a percentage.
    #[serde(default)]
    pub static_at_rest: bool,
    /// Live size. `None` until the first layout pass.
    #[serde(default)]
    pub current_value: Option<Unit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_before_collapse: Option<Decimal>,
    /// Most recent size the host observed on screen.
    #[serde(default, skip_serializing)]
    pub last_known_size: Option<Decimal>,
    #[serde(default)]
    pub collapse_animation: CollapseAnimation,
}

impl Panel {
    /// Unconstrained panel: `min = 0px`, `max = 1fr`, not collapsible.
    #[must_use]
    pub fn new(id: impl Into<ItemId>) -> Self {
        let constraints = PanelConstraints::default();
        Self {
            id: id.into(),
            order: None,
            min: constraints.min,
            max: constraints.max,
            default_size: None,
            collapsible: false,
            collapsed_size: constraints.collapsed_size,
            collapsed: false,
            collapse_controlled: false,
            static_at_rest: false,
            current_value: None,
            size_before_collapse: None,
            last_known_size: None,
            collapse_animation: CollapseAnimation::default(),
        }
    }

    #[must_use]
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    #[must_use]
    pub fn with_min(mut self, min: Unit) -> Self {
        self.min = min;
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: impl Into<SizeExpr>) -> Self {
        self.max = max.into();
        self
    }

    #[must_use]
    pub fn with_default(mut self, default_size: Unit) -> Self {
        self.default_size = Some(default_size);
        self
    }

    /// Make the panel collapsible down to `collapsed_size`.
    #[must_use]
    pub fn with_collapsed_size(mut self, collapsed_size: Unit) -> Self {
        self.collapsible = true;
        self.collapsed_size = collapsed_size;
        self
    }

    #[must_use]
    pub fn collapsible(mut self, collapsible: bool) -> Self {
        self.collapsible = collapsible;
        self
    }

    /// Initial (or consumer-provided) collapsed state.
    #[must_use]
    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    #[must_use]
    pub fn controlled(mut self, controlled: bool) -> Self {
        self.collapse_controlled = controlled;
        self
    }

    #[must_use]
    pub fn static_at_rest(mut self, static_at_rest: bool) -> Self {
        self.static_at_rest = static_at_rest;
        self
    }

    #[must_use]
    pub fn with_animation(mut self, animation: CollapseAnimation) -> Self {
        self.collapse_animation = animation;
        self
    }

    /// Parse and set `min` from a literal.
    pub fn try_min(self, literal: &str) -> Result<Self, UnitError> {
        Ok(self.with_min(Unit::parse(literal)?))
    }

    /// Parse and set `max` from a literal (`1fr` allowed).
    pub fn try_max(self, literal: &str) -> Result<Self, UnitError> {
        Ok(self.with_max(SizeExpr::parse(literal)?))
    }

    /// Parse and set the default size from a literal.
    pub fn try_default(self, literal: &str) -> Result<Self, UnitError> {
        Ok(self.with_default(Unit::parse(literal)?))
    }

    /// Parse the collapsed size and make the panel collapsible.
    pub fn try_collapsed_size(self, literal: &str) -> Result<Self, UnitError> {
        Ok(self.with_collapsed_size(Unit::parse(literal)?))
    }

    /// Collapsed for layout purposes (a non-collapsible panel never is).
    #[must_use]
    pub const fn is_collapsed(&self) -> bool {
        self.collapsible && self.collapsed
    }

    /// Counted as static space (excluded from percentage math).
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_collapsed() || (self.static_at_rest && matches!(self.current_value, Some(Unit::Pixel(_))))
    }

    #[must_use]
    pub fn constraints(&self) -> PanelConstraints {
        PanelConstraints {
            min: self.min,
            max: self.max,
            default_size: self.default_size,
            collapsible: self.collapsible,
            collapsed_size: self.collapsed_size,
        }
    }

    pub fn set_constraints(&mut self, constraints: PanelConstraints) {
        self.min = constraints.min;
        self.max = constraints.max;
        self.default_size = constraints.default_size;
        self.collapsible = constraints.collapsible;
        self.collapsed_size = constraints.collapsed_size;
        if !self.collapsible {
            self.collapsed = false;
        }
    }

    /// Collapsed size in pixels. Percent collapsed sizes resolve against the
    /// whole container since collapsed panels are themselves static space.
    #[must_use]
    pub fn collapsed_px(&self, container: Decimal) -> Decimal {
        self.collapsed_size.to_pixels(container, Decimal::ZERO)
    }

    /// Live size in pixels.
    #[must_use]
    pub fn pixels(&self, container: Decimal, static_space: Decimal) -> Decimal {
        match self.current_value {
            Some(unit) => unit.to_pixels(container, static_space),
            None if self.is_collapsed() => self.collapsed_px(container),
            None => Decimal::ZERO,
        }
    }

    pub(crate) fn set_pixels(&mut self, value: Decimal) {
        self.current_value = Some(Unit::Pixel(value.max(Decimal::ZERO)));
    }
}

/// A fixed-size divider between panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handle {
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    /// Size along the group axis, in pixels.
    pub size: Decimal,
}

impl Handle {
    #[must_use]
    pub fn new(id: impl Into<ItemId>, size: impl Into<Decimal>) -> Self {
        Self {
            id: id.into(),
            order: None,
            size: size.into(),
        }
    }

    #[must_use]
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }
}

/// One track of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    Panel(Panel),
    Handle(Handle),
}

impl Item {
    #[must_use]
    pub fn id(&self) -> &ItemId {
        match self {
            Self::Panel(panel) => &panel.id,
            Self::Handle(handle) => &handle.id,
        }
    }

    #[must_use]
    pub fn order(&self) -> Option<u32> {
        match self {
            Self::Panel(panel) => panel.order,
            Self::Handle(handle) => handle.order,
        }
    }

    pub(crate) fn set_order(&mut self, order: u32) {
        match self {
            Self::Panel(panel) => panel.order = Some(order),
            Self::Handle(handle) => handle.order = Some(order),
        }
    }

    #[must_use]
    pub const fn is_panel(&self) -> bool {
        matches!(self, Self::Panel(_))
    }

    #[must_use]
    pub const fn is_handle(&self) -> bool {
        matches!(self, Self::Handle(_))
    }

    #[must_use]
    pub fn as_panel(&self) -> Option<&Panel> {
        match self {
            Self::Panel(panel) => Some(panel),
            Self::Handle(_) => None,
        }
    }

    pub fn as_panel_mut(&mut self) -> Option<&mut Panel> {
        match self {
            Self::Panel(panel) => Some(panel),
            Self::Handle(_) => None,
        }
    }

    #[must_use]
    pub fn as_handle(&self) -> Option<&Handle> {
        match self {
            Self::Handle(handle) => Some(handle),
            Self::Panel(_) => None,
        }
    }

    /// Size in pixels along the group axis.
    #[must_use]
    pub fn pixels(&self, container: Decimal, static_space: Decimal) -> Decimal {
        match self {
            Self::Panel(panel) => panel.pixels(container, static_space),
            Self::Handle(handle) => handle.size,
        }
    }
}

impl From<Panel> for Item {
    fn from(panel: Panel) -> Self {
        Self::Panel(panel)
    }
}

impl From<Handle> for Item {
    fn from(handle: Handle) -> Self {
        Self::Handle(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_literals_parse() {
        let panel = Panel::new("side")
            .try_min("200px")
            .and_then(|p| p.try_max("50%"))
            .and_then(|p| p.try_collapsed_size("60px"))
            .expect("valid literals");
        assert_eq!(panel.min, Unit::px(200));
        assert_eq!(panel.max, SizeExpr::Size(Unit::pct(50)));
        assert!(panel.collapsible);
        assert_eq!(panel.collapsed_size, Unit::px(60));
    }

    #[test]
    fn bad_literal_is_invalid_unit() {
        let err = Panel::new("side").try_min("wide").expect_err("must fail");
        assert_eq!(
            err,
            UnitError::InvalidUnit {
                input: "wide".to_string()
            }
        );
    }

    #[test]
    fn collapsed_only_counts_when_collapsible() {
        let panel = Panel::new("p").collapsed(true);
        assert!(!panel.is_collapsed());
        assert!(panel.collapsible(true).is_collapsed());
    }

    #[test]
    fn constraints_parse_marks_collapsible() {
        let constraints =
            PanelConstraints::parse(Some("100px"), Some("1fr"), None, Some("40px")).expect("parse");
        assert!(constraints.collapsible);
        assert_eq!(constraints.collapsed_size, Unit::px(40));
        assert_eq!(constraints.max, SizeExpr::Fill);
    }

    #[test]
    fn items_serialize_with_type_tag() {
        let item = Item::from(Handle::new("h", 10));
        let json = serde_json::to_string(&item).expect("serialize");
        assert_eq!(json, r#"{"type":"handle","id":"h","size":"10"}"#);
    }

    #[test]
    fn last_known_size_is_not_serialized() {
        let mut panel = Panel::new("p");
        panel.last_known_size = Some(Decimal::from(42));
        let json = serde_json::to_string(&panel).expect("serialize");
        assert!(!json.contains("lastKnownSize"));
    }
}
