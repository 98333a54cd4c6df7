//! Inbound events and outbound per-panel callbacks.

use std::collections::BTreeMap;
use std::fmt;

use panegroup_core::{Decimal, Unit};
use panegroup_layout::{Handle, ItemId, Orientation, Panel, PanelConstraints, Size};

use crate::drag::DragInput;

/// Size reported to a panel's resize callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSize {
    pub pixel: Decimal,
    /// Share of the dynamic space, `0..=100`.
    pub percent: Decimal,
}

pub type ResizeCallback = Box<dyn FnMut(PanelSize)>;
pub type CollapseCallback = Box<dyn FnMut(bool)>;

/// Callbacks attached to one panel.
///
/// Replaced wholesale by [`GroupEvent::RebindPanelCallbacks`]; the machine
/// never keeps stale closures around.
#[derive(Default)]
pub struct PanelCallbacks {
    pub on_resize: Option<ResizeCallback>,
    /// Called with the new (or, for controlled panels, requested) collapsed
    /// state.
    pub on_collapse_change: Option<CollapseCallback>,
}

impl PanelCallbacks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_resize(mut self, callback: impl FnMut(PanelSize) + 'static) -> Self {
        self.on_resize = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_collapse_change(mut self, callback: impl FnMut(bool) + 'static) -> Self {
        self.on_collapse_change = Some(Box::new(callback));
        self
    }

    pub(crate) fn resized(&mut self, size: PanelSize) {
        if let Some(callback) = self.on_resize.as_mut() {
            callback(size);
        }
    }

    pub(crate) fn collapse_changed(&mut self, collapsed: bool) {
        if let Some(callback) = self.on_collapse_change.as_mut() {
            callback(collapsed);
        }
    }
}

impl fmt::Debug for PanelCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelCallbacks")
            .field("on_resize", &self.on_resize.is_some())
            .field("on_collapse_change", &self.on_collapse_change.is_some())
            .finish()
    }
}

/// Messages accepted by [`crate::GroupMachine::send`].
#[derive(Debug)]
pub enum GroupEvent {
    RegisterPanel {
        panel: Panel,
        callbacks: PanelCallbacks,
    },
    /// Register a panel after the group is laid out; it takes its space from
    /// its neighbours.
    RegisterDynamicPanel {
        panel: Panel,
        callbacks: PanelCallbacks,
    },
    UnregisterPanel {
        panel: ItemId,
    },
    RegisterPanelHandle {
        handle: Handle,
    },
    UnregisterPanelHandle {
        handle: ItemId,
    },
    RebindPanelCallbacks {
        panel: ItemId,
        callbacks: PanelCallbacks,
    },
    UpdateConstraints {
        panel: ItemId,
        constraints: PanelConstraints,
    },
    /// The container was measured.
    SetSize(Size),
    /// Rendered item sizes along the axis, keyed by id. Keys may name panels
    /// or handles; an unregistered key fails the whole report with
    /// `LayoutError::UnknownItem`.
    SetActualItemsSize(BTreeMap<ItemId, Decimal>),
    SetOrientation(Orientation),
    DragHandleStart {
        handle: ItemId,
    },
    DragHandle {
        handle: ItemId,
        input: DragInput,
    },
    DragHandleEnd {
        handle: ItemId,
    },
    CollapsePanel {
        panel: ItemId,
        controlled: bool,
    },
    ExpandPanel {
        panel: ItemId,
        controlled: bool,
    },
    /// Resize a panel to an exact size within its drag limits.
    SetPanelPixelSize {
        panel: ItemId,
        size: Unit,
    },
    /// Programmatic handle move, replayed stepwise.
    ApplyDelta {
        handle: ItemId,
        delta: Decimal,
    },
    /// Collapse or expand the collapsible panel next to a handle.
    ToggleHandleCollapse {
        handle: ItemId,
    },
    LockGroup,
    UnlockGroup,
}

impl GroupEvent {
    /// Stable event name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RegisterPanel { .. } => "registerPanel",
            Self::RegisterDynamicPanel { .. } => "registerDynamicPanel",
            Self::UnregisterPanel { .. } => "unregisterPanel",
            Self::RegisterPanelHandle { .. } => "registerPanelHandle",
            Self::UnregisterPanelHandle { .. } => "unregisterPanelHandle",
            Self::RebindPanelCallbacks { .. } => "rebindPanelCallbacks",
            Self::UpdateConstraints { .. } => "updateConstraints",
            Self::SetSize(_) => "setSize",
            Self::SetActualItemsSize(_) => "setActualItemsSize",
            Self::SetOrientation(_) => "setOrientation",
            Self::DragHandleStart { .. } => "dragHandleStart",
            Self::DragHandle { .. } => "dragHandle",
            Self::DragHandleEnd { .. } => "dragHandleEnd",
            Self::CollapsePanel { .. } => "collapsePanel",
            Self::ExpandPanel { .. } => "expandPanel",
            Self::SetPanelPixelSize { .. } => "setPanelPixelSize",
            Self::ApplyDelta { .. } => "applyDelta",
            Self::ToggleHandleCollapse { .. } => "toggleHandleCollapse",
            Self::LockGroup => "lockGroup",
            Self::UnlockGroup => "unlockGroup",
        }
    }

    /// Register a panel without callbacks.
    #[must_use]
    pub fn register_panel(panel: Panel) -> Self {
        Self::RegisterPanel {
            panel,
            callbacks: PanelCallbacks::default(),
        }
    }

    #[must_use]
    pub fn register_handle(handle: Handle) -> Self {
        Self::RegisterPanelHandle { handle }
    }

    #[must_use]
    pub fn drag(handle: impl Into<ItemId>, input: DragInput) -> Self {
        Self::DragHandle {
            handle: handle.into(),
            input,
        }
    }

    #[must_use]
    pub fn collapse(panel: impl Into<ItemId>) -> Self {
        Self::CollapsePanel {
            panel: panel.into(),
            controlled: false,
        }
    }

    #[must_use]
    pub fn expand(panel: impl Into<ItemId>) -> Self {
        Self::ExpandPanel {
            panel: panel.into(),
            controlled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn callbacks_fire_when_present() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mut callbacks = PanelCallbacks::new().on_collapse_change(move |collapsed| {
            log.borrow_mut().push(collapsed);
        });
        callbacks.collapse_changed(true);
        callbacks.resized(PanelSize {
            pixel: Decimal::ONE,
            percent: Decimal::ONE,
        });
        assert_eq!(*seen.borrow(), vec![true]);
    }

    #[test]
    fn debug_hides_closures() {
        let callbacks = PanelCallbacks::new().on_resize(|_| {});
        assert_eq!(
            format!("{callbacks:?}"),
            "PanelCallbacks { on_resize: true, on_collapse_change: false }"
        );
    }

    #[test]
    fn event_names_are_camel_case() {
        assert_eq!(GroupEvent::collapse("a").name(), "collapsePanel");
        assert_eq!(GroupEvent::LockGroup.name(), "lockGroup");
    }
}
