//! The panel group state machine.
//!
//! [`GroupMachine`] owns the [`GroupContext`] and is the only thing that
//! mutates it. Hosts feed it [`GroupEvent`]s and frame timestamps; after
//! every processed event it hands the updated context to `on_change` and
//! fires the per-panel callbacks whose panel changed.
//!
//! # States
//!
//! ```text
//!            DragHandleStart                 CollapsePanel / ExpandPanel
//!   Dragging ◀──────────────── Idle ──────────────────────▶ TogglingCollapse
//!      │                        ▲ ▲                                │
//!      └── DragHandleEnd ───────┘ └────── last frame ──────────────┘
//!          (commit, autosave)             (snap, commit, autosave)
//! ```
//!
//! While not idle the items hold pixel sizes; entering `Idle` always
//! commits them back to their resting representation. A container resize or
//! orientation change that arrives mid-interaction is held until the machine
//! is idle again; other layout-affecting events are applied at once and laid
//! out on return to idle.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use panegroup_core::frame::{FrameScheduler, NoopScheduler};
use panegroup_core::{Decimal, PIXEL_DECIMAL_PLACES, Unit};
use panegroup_layout::{
    CollapseAnimation, CollapseNotice, GroupContext, Item, ItemId, LayoutError, Orientation,
    OverflowReport, Panel, Size, UpdateMode, apply_delta_stepwise, build_template, commit,
    initialize, insert_dynamic, limits, prepare, register, remove, resize_handle, resize_panel,
    resize_panel_by, resolve_overflow, snapshot, update_constraints,
};

use crate::animator::{Animator, CollapseAction, TransitionPlan};
use crate::config::{GroupConfig, GroupIdGenerator, SequentialGroupIds};
use crate::drag::{DragAction, DragInput, DragSettings};
use crate::error::Result;
use crate::event::{GroupEvent, PanelCallbacks, PanelSize};
use crate::persistence::SnapshotStore;

/// Where the machine is in an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MachineState {
    #[default]
    Idle,
    Dragging {
        handle: ItemId,
    },
    TogglingCollapse {
        panel: ItemId,
        action: CollapseAction,
    },
}

impl MachineState {
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging { .. } => "dragging",
            Self::TogglingCollapse { .. } => "togglingCollapse",
        }
    }
}

type ChangeCallback = Box<dyn FnMut(&GroupContext)>;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Assembles a [`GroupMachine`] from config and injected capabilities.
pub struct GroupMachineBuilder {
    config: GroupConfig,
    scheduler: Option<Box<dyn FrameScheduler>>,
    store: Option<Box<dyn SnapshotStore>>,
    snapshot: Option<String>,
    ids: Option<Box<dyn GroupIdGenerator>>,
    on_change: Option<ChangeCallback>,
}

impl GroupMachineBuilder {
    #[must_use]
    pub fn new(config: GroupConfig) -> Self {
        Self {
            config,
            scheduler: None,
            store: None,
            snapshot: None,
            ids: None,
            on_change: None,
        }
    }

    /// Frame source for collapse/expand transitions. Defaults to
    /// [`NoopScheduler`], in which case the host polls
    /// [`GroupMachine::is_animating`].
    #[must_use]
    pub fn scheduler(mut self, scheduler: impl FrameScheduler + 'static) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    /// Store used for autosave and the initial load.
    #[must_use]
    pub fn store(mut self, store: impl SnapshotStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Start from a snapshot instead of the store.
    #[must_use]
    pub fn snapshot(mut self, json: impl Into<String>) -> Self {
        self.snapshot = Some(json.into());
        self
    }

    /// Id source when the config has no `group_id`.
    #[must_use]
    pub fn id_generator(mut self, ids: impl GroupIdGenerator + 'static) -> Self {
        self.ids = Some(Box::new(ids));
        self
    }

    #[must_use]
    pub fn on_change(mut self, callback: impl FnMut(&GroupContext) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Build the machine, rehydrating from the snapshot or the store.
    ///
    /// A malformed explicit snapshot is an error. A store that fails to load
    /// is logged and the group starts empty.
    pub fn build(self) -> Result<GroupMachine> {
        let restored = self
            .snapshot
            .as_deref()
            .map(snapshot::decode)
            .transpose()?;
        let group_id = match (&self.config.group_id, &restored) {
            (Some(id), _) => id.clone(),
            (None, Some(ctx)) => ctx.group_id.clone(),
            (None, None) => self
                .ids
                .unwrap_or_else(|| Box::new(SequentialGroupIds::default()))
                .next_id(),
        };

        let restored = match restored {
            Some(ctx) => Some(ctx),
            None => self.store.as_ref().and_then(|store| match store.load(&group_id) {
                Ok(ctx) => ctx,
                Err(err) => {
                    tracing::warn!(
                        target: "panegroup.persistence",
                        group_id = %group_id,
                        error = %err,
                        "stored snapshot could not be loaded; starting empty"
                    );
                    None
                }
            }),
        };

        let ctx = match restored {
            Some(mut ctx) => {
                tracing::debug!(
                    target: "panegroup.persistence",
                    group_id = %group_id,
                    items = ctx.items.len(),
                    "group restored from snapshot"
                );
                ctx.group_id = group_id;
                ctx.active_drag_handle_id = None;
                ctx.drag_overshoot = Decimal::ZERO;
                if self.config.autosave.is_some() {
                    ctx.autosave_strategy = self.config.autosave;
                }
                ctx
            }
            None => {
                let mut ctx =
                    GroupContext::new(group_id).with_orientation(self.config.orientation);
                ctx.autosave_strategy = self.config.autosave;
                ctx
            }
        };

        Ok(GroupMachine {
            ctx,
            state: MachineState::Idle,
            locked: false,
            stale: false,
            deferred_geometry: None,
            drag: self.config.drag,
            callbacks: BTreeMap::new(),
            on_change: self.on_change,
            scheduler: self.scheduler.unwrap_or_else(|| Box::new(NoopScheduler)),
            store: self.store,
            animator: Animator::new(),
            last_overflow: None,
            notices: Vec::new(),
        })
    }
}

impl fmt::Debug for GroupMachineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupMachineBuilder")
            .field("config", &self.config)
            .field("scheduler", &self.scheduler.is_some())
            .field("store", &self.store.is_some())
            .field("snapshot", &self.snapshot.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// Single-owner state machine for one panel group.
pub struct GroupMachine {
    ctx: GroupContext,
    state: MachineState,
    locked: bool,
    /// A layout-affecting event arrived while not idle.
    stale: bool,
    /// Container size and orientation received while not idle.
    deferred_geometry: Option<(Size, Orientation)>,
    drag: DragSettings,
    callbacks: BTreeMap<ItemId, PanelCallbacks>,
    on_change: Option<ChangeCallback>,
    scheduler: Box<dyn FrameScheduler>,
    store: Option<Box<dyn SnapshotStore>>,
    animator: Animator,
    last_overflow: Option<OverflowReport>,
    notices: Vec<CollapseNotice>,
}

impl GroupMachine {
    #[must_use]
    pub fn builder(config: GroupConfig) -> GroupMachineBuilder {
        GroupMachineBuilder::new(config)
    }

    /// Machine with no store, no scheduler and no change callback.
    pub fn new(config: GroupConfig) -> Result<Self> {
        GroupMachineBuilder::new(config).build()
    }

    #[must_use]
    pub fn context(&self) -> &GroupContext {
        &self.ctx
    }

    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.ctx.group_id
    }

    #[must_use]
    pub fn state(&self) -> &MachineState {
        &self.state
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animator.is_running()
    }

    /// Outcome of the last overflow pass that had to do something.
    #[must_use]
    pub fn last_overflow(&self) -> Option<&OverflowReport> {
        self.last_overflow.as_ref()
    }

    /// Track template for the current context.
    #[must_use]
    pub fn template(&self) -> String {
        build_template(&self.ctx)
    }

    /// Context as it would be stored: committed when mid-interaction.
    #[must_use]
    pub fn resting_context(&self) -> GroupContext {
        let mut ctx = self.ctx.clone();
        if !self.state.is_idle() && ctx.is_measured() {
            ctx.apply(commit(&ctx));
            ctx.active_drag_handle_id = None;
        }
        ctx
    }

    /// JSON snapshot of [`resting_context`](Self::resting_context).
    pub fn snapshot(&self) -> Result<String> {
        Ok(snapshot::encode(&self.resting_context())?)
    }

    /// Save to the configured store now. Returns `false` without a store.
    pub fn save(&mut self) -> Result<bool> {
        let ctx = self.resting_context();
        let Some(store) = self.store.as_mut() else {
            return Ok(false);
        };
        store.save(&ctx)?;
        Ok(true)
    }

    /// Process one event.
    ///
    /// While locked every event except [`GroupEvent::UnlockGroup`] is
    /// ignored.
    pub fn send(&mut self, event: GroupEvent) -> Result<()> {
        let name = event.name();
        let _span = tracing::debug_span!(
            "panegroup.event",
            group_id = %self.ctx.group_id,
            event = name
        )
        .entered();

        if self.locked && !matches!(event, GroupEvent::UnlockGroup) {
            tracing::debug!(target: "panegroup.machine", event = name, "group locked; event ignored");
            return Ok(());
        }

        let before = self.panel_sizes();
        let result = self.dispatch(event);
        self.notify(&before);

        match &result {
            Ok(()) => tracing::debug!(
                target: "panegroup.machine",
                event = name,
                state = self.state.name(),
                "event processed"
            ),
            Err(err) => tracing::debug!(
                target: "panegroup.machine",
                event = name,
                error = %err,
                "event rejected"
            ),
        }
        result
    }

    /// Deliver an animation frame at host time `now`.
    ///
    /// Returns whether the machine wants another frame.
    pub fn on_frame(&mut self, now: Duration) -> bool {
        if self.locked || !self.animator.is_running() {
            return false;
        }
        let before = self.panel_sizes();
        let more = match self.advance(now) {
            Ok(more) => more,
            Err(err) => {
                tracing::warn!(
                    target: "panegroup.animator",
                    group_id = %self.ctx.group_id,
                    error = %err,
                    "animation frame failed; transition dropped"
                );
                self.animator.cancel();
                self.settle();
                self.enter_idle();
                false
            }
        };
        self.notify(&before);
        more
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    fn dispatch(&mut self, event: GroupEvent) -> Result<()> {
        match event {
            GroupEvent::RegisterPanel { panel, callbacks } => {
                let dynamic = self.is_laid_out();
                self.register_panel(panel, callbacks, dynamic);
                Ok(())
            }
            GroupEvent::RegisterDynamicPanel { panel, callbacks } => {
                self.register_panel(panel, callbacks, true);
                Ok(())
            }
            GroupEvent::UnregisterPanel { panel } => self.unregister(&panel, true),
            GroupEvent::RegisterPanelHandle { handle } => {
                let dynamic = self.is_laid_out();
                self.register_item(Item::Handle(handle), dynamic);
                Ok(())
            }
            GroupEvent::UnregisterPanelHandle { handle } => self.unregister(&handle, false),
            GroupEvent::RebindPanelCallbacks { panel, callbacks } => {
                self.require_panel(&panel)?;
                self.callbacks.insert(panel, callbacks);
                Ok(())
            }
            GroupEvent::UpdateConstraints { panel, constraints } => {
                update_constraints(&mut self.ctx.items, panel.as_str(), constraints)?;
                self.relayout();
                Ok(())
            }
            GroupEvent::SetSize(size) => {
                let (_, orientation) = self.geometry();
                self.set_geometry(size, orientation);
                Ok(())
            }
            GroupEvent::SetActualItemsSize(sizes) => self.set_actual_sizes(sizes),
            GroupEvent::SetOrientation(orientation) => {
                let (size, _) = self.geometry();
                self.set_geometry(size, orientation);
                Ok(())
            }
            GroupEvent::DragHandleStart { handle } => self.drag_start(&handle),
            GroupEvent::DragHandle { handle, input } => self.drag(&handle, input),
            GroupEvent::DragHandleEnd { handle } => {
                self.require_handle(&handle)?;
                if matches!(self.state, MachineState::Dragging { .. }) {
                    self.finish_drag();
                }
                Ok(())
            }
            GroupEvent::CollapsePanel { panel, controlled } => {
                self.request_toggle(&panel, CollapseAction::Collapse, controlled)
            }
            GroupEvent::ExpandPanel { panel, controlled } => {
                self.request_toggle(&panel, CollapseAction::Expand, controlled)
            }
            GroupEvent::SetPanelPixelSize { panel, size } => self.set_panel_size(&panel, size),
            GroupEvent::ApplyDelta { handle, delta } => self.apply_delta(&handle, delta),
            GroupEvent::ToggleHandleCollapse { handle } => self.toggle_handle(&handle),
            GroupEvent::LockGroup => {
                self.locked = true;
                Ok(())
            }
            GroupEvent::UnlockGroup => {
                self.locked = false;
                self.request_frame();
                Ok(())
            }
        }
    }

    /// Measured with at least one panel already sized.
    fn is_laid_out(&self) -> bool {
        self.ctx.is_measured() && self.ctx.panels().any(|panel| panel.current_value.is_some())
    }

    fn require_panel(&self, id: &ItemId) -> Result<()> {
        match self.ctx.panel(id.as_str()) {
            Some(_) => Ok(()),
            None => Err(LayoutError::UnknownPanel { id: id.clone() }.into()),
        }
    }

    fn require_handle(&self, id: &ItemId) -> Result<()> {
        match self.ctx.handle(id.as_str()) {
            Some(_) => Ok(()),
            None => Err(LayoutError::UnknownHandle { id: id.clone() }.into()),
        }
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    fn register_panel(&mut self, panel: Panel, callbacks: PanelCallbacks, dynamic: bool) {
        self.callbacks.insert(panel.id.clone(), callbacks);
        self.register_item(Item::Panel(panel), dynamic);
    }

    /// Register `item`. A new dynamic item on a laid-out idle group takes its
    /// space from its neighbours; anything else triggers a full layout pass.
    fn register_item(&mut self, item: Item, dynamic: bool) {
        let fresh = self.ctx.index_of(item.id().as_str()).is_none();
        if dynamic && fresh && self.ctx.is_measured() && self.state.is_idle() {
            self.ctx.items = prepare(&self.ctx);
            let (items, registration) = insert_dynamic(&self.ctx, item);
            self.ctx.items = items;
            tracing::debug!(
                target: "panegroup.machine",
                index = registration.index,
                "dynamic item inserted"
            );
            self.settle_overflow();
            self.settle();
            return;
        }
        let registration = register(&mut self.ctx.items, item);
        tracing::debug!(
            target: "panegroup.machine",
            index = registration.index,
            replaced = registration.replaced,
            "item registered"
        );
        self.relayout();
    }

    fn unregister(&mut self, id: &ItemId, panel: bool) -> Result<()> {
        let known = self
            .ctx
            .items
            .iter()
            .any(|item| item.id() == id && item.is_panel() == panel);
        if !known {
            let id = id.clone();
            return Err(if panel {
                LayoutError::UnknownPanel { id }
            } else {
                LayoutError::UnknownHandle { id }
            }
            .into());
        }

        if matches!(&self.state, MachineState::Dragging { handle } if handle == id) {
            self.finish_drag();
        }
        if self.animator.active().is_some_and(|t| t.plan.panel == *id) {
            self.animator.cancel();
            self.settle();
            self.enter_idle();
        }
        if panel {
            self.callbacks.remove(id);
        }

        if self.ctx.is_measured() && self.state.is_idle() {
            self.ctx.items = prepare(&self.ctx);
            self.ctx.items = remove(&self.ctx, id.as_str())?;
            self.settle_overflow();
            self.settle();
        } else {
            self.ctx.items.retain(|item| item.id() != id);
            self.relayout();
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Measurement and layout passes
    // -----------------------------------------------------------------------

    fn set_actual_sizes(&mut self, sizes: BTreeMap<ItemId, Decimal>) -> Result<()> {
        if let Some(id) = sizes.keys().find(|id| self.ctx.index_of(id.as_str()).is_none()) {
            return Err(LayoutError::UnknownItem { id: id.clone() }.into());
        }
        for (id, size) in sizes {
            if let Some(panel) = self.ctx.panel_mut(id.as_str()) {
                panel.last_known_size = Some(size);
            }
        }
        Ok(())
    }

    /// Latest reported container size and orientation.
    fn geometry(&self) -> (Size, Orientation) {
        self.deferred_geometry
            .unwrap_or((self.ctx.size, self.ctx.orientation))
    }

    fn set_geometry(&mut self, size: Size, orientation: Orientation) {
        if !self.state.is_idle() {
            self.deferred_geometry = Some((size, orientation));
            return;
        }
        if size == self.ctx.size && orientation == self.ctx.orientation {
            return;
        }
        self.ctx.size = size;
        self.ctx.orientation = orientation;
        self.forget_observed_sizes();
        self.relayout();
    }

    fn forget_observed_sizes(&mut self) {
        for panel in self.ctx.items.iter_mut().filter_map(Item::as_panel_mut) {
            panel.last_known_size = None;
        }
    }

    /// Full layout pass: initialize, resolve overflow, commit. Deferred until
    /// idle when an interaction is running.
    fn relayout(&mut self) {
        if !self.ctx.is_measured() {
            return;
        }
        if !self.state.is_idle() {
            self.stale = true;
            return;
        }
        self.ctx.items = initialize(&self.ctx);
        self.settle_overflow();
        self.settle();
    }

    fn settle_overflow(&mut self) {
        let (patch, report) = resolve_overflow(&self.ctx);
        self.notices.extend(self.ctx.apply(patch));
        if !report.collapsed.is_empty() {
            tracing::debug!(
                target: "panegroup.overflow",
                group_id = %self.ctx.group_id,
                collapsed = ?report.collapsed,
                "panels collapsed to fit the container"
            );
        }
        if !report.is_resolved() {
            tracing::warn!(
                target: "panegroup.overflow",
                group_id = %self.ctx.group_id,
                unresolved = %report.unresolved,
                "items exceed the container; panels held at their minimums"
            );
        }
        self.last_overflow =
            (!report.collapsed.is_empty() || !report.is_resolved()).then_some(report);
    }

    /// Commit pixel sizes to their resting representation.
    fn settle(&mut self) {
        let patch = commit(&self.ctx);
        self.notices.extend(self.ctx.apply(patch));
    }

    fn enter_idle(&mut self) {
        self.state = MachineState::Idle;
        self.ctx.active_drag_handle_id = None;
        if std::mem::take(&mut self.stale) {
            self.relayout();
        }
        if let Some((size, orientation)) = self.deferred_geometry.take() {
            self.set_geometry(size, orientation);
        }
        self.autosave();
    }

    fn autosave(&mut self) {
        let Some(strategy) = self.ctx.autosave_strategy else {
            return;
        };
        let Some(store) = self.store.as_mut() else {
            tracing::debug!(
                target: "panegroup.persistence",
                ?strategy,
                "autosave requested without a store"
            );
            return;
        };
        match store.save(&self.ctx) {
            Ok(()) => tracing::debug!(
                target: "panegroup.persistence",
                group_id = %self.ctx.group_id,
                ?strategy,
                "snapshot saved"
            ),
            Err(err) => tracing::warn!(
                target: "panegroup.persistence",
                group_id = %self.ctx.group_id,
                ?strategy,
                error = %err,
                "autosave failed"
            ),
        }
    }

    // -----------------------------------------------------------------------
    // Dragging
    // -----------------------------------------------------------------------

    fn drag_start(&mut self, handle: &ItemId) -> Result<()> {
        self.require_handle(handle)?;
        match &self.state {
            MachineState::Dragging { handle: current } if current == handle => return Ok(()),
            MachineState::Dragging { .. } => self.finish_drag(),
            MachineState::TogglingCollapse { .. } => self.complete_transition()?,
            MachineState::Idle => {}
        }
        if !self.ctx.is_measured() {
            tracing::debug!(target: "panegroup.machine", "drag on an unmeasured group ignored");
            return Ok(());
        }
        self.ctx.items = prepare(&self.ctx);
        self.ctx.drag_overshoot = Decimal::ZERO;
        self.ctx.active_drag_handle_id = Some(handle.clone());
        self.state = MachineState::Dragging {
            handle: handle.clone(),
        };
        Ok(())
    }

    fn drag(&mut self, handle: &ItemId, input: DragInput) -> Result<()> {
        self.require_handle(handle)?;
        let delta = match self.drag.resolve(input, self.ctx.orientation) {
            DragAction::Ignore => return Ok(()),
            DragAction::ToggleCollapse => return self.toggle_handle(handle),
            DragAction::Move(delta) => delta,
        };
        if matches!(&self.state, MachineState::Dragging { handle: current } if current == handle) {
            return self.move_handle(handle, delta);
        }

        // Keyboard moves arrive without a drag session: run one.
        self.drag_start(handle)?;
        if !matches!(self.state, MachineState::Dragging { .. }) {
            return Ok(());
        }
        let moved = self.move_handle(handle, delta);
        self.finish_drag();
        moved
    }

    fn move_handle(&mut self, handle: &ItemId, delta: Decimal) -> Result<()> {
        let patch = apply_delta_stepwise(&self.ctx, handle.as_str(), delta, UpdateMode::Drag)?;
        self.notices.extend(self.ctx.apply(patch));
        tracing::trace!(
            target: "panegroup.drag",
            handle = %handle,
            delta = %delta,
            overshoot = %self.ctx.drag_overshoot,
            "handle moved"
        );
        Ok(())
    }

    fn finish_drag(&mut self) {
        self.settle();
        self.enter_idle();
    }

    fn apply_delta(&mut self, handle: &ItemId, delta: Decimal) -> Result<()> {
        self.require_handle(handle)?;
        if !self.ctx.is_measured() {
            return Ok(());
        }
        let one_shot = self.state.is_idle();
        if one_shot {
            self.ctx.items = prepare(&self.ctx);
        }
        let patch =
            apply_delta_stepwise(&self.ctx, handle.as_str(), delta, UpdateMode::Programmatic)?;
        self.notices.extend(self.ctx.apply(patch));
        if one_shot {
            self.settle();
            self.enter_idle();
        }
        Ok(())
    }

    fn set_panel_size(&mut self, id: &ItemId, size: Unit) -> Result<()> {
        self.require_panel(id)?;
        if !self.ctx.is_measured() {
            if let Some(panel) = self.ctx.panel_mut(id.as_str()) {
                panel.current_value = Some(size);
            }
            return Ok(());
        }
        if matches!(self.state, MachineState::TogglingCollapse { .. }) {
            self.complete_transition()?;
        }
        let one_shot = self.state.is_idle();
        if one_shot {
            self.ctx.items = prepare(&self.ctx);
        }

        let container = self.ctx.axis_size();
        let static_space = self.ctx.static_space();
        let target = match self.ctx.panel(id.as_str()) {
            Some(panel) => {
                let (lo, hi) = limits(panel, container, static_space, UpdateMode::Drag);
                size.to_pixels(container, static_space).clamp(lo, hi)
            }
            None => return Ok(()),
        };
        let patch = resize_panel(&self.ctx, id.as_str(), target)?;
        self.notices.extend(self.ctx.apply(patch));

        if one_shot {
            self.settle();
            self.enter_idle();
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Collapse / expand
    // -----------------------------------------------------------------------

    fn toggle_handle(&mut self, handle: &ItemId) -> Result<()> {
        let index = self
            .ctx
            .items
            .iter()
            .position(|item| item.is_handle() && item.id() == handle)
            .ok_or_else(|| LayoutError::UnknownHandle { id: handle.clone() })?;
        let items = &self.ctx.items;
        let before = items[..index].iter().rev().find_map(Item::as_panel);
        let after = items[index + 1..].iter().find_map(Item::as_panel);
        let (panel, collapsed) = [before, after]
            .into_iter()
            .flatten()
            .find(|panel| panel.collapsible)
            .map(|panel| (panel.id.clone(), panel.collapsed))
            .ok_or_else(|| LayoutError::NoCollapsibleNeighbor {
                handle: handle.clone(),
            })?;
        self.request_toggle(&panel, CollapseAction::from_collapsed(!collapsed), false)
    }

    fn request_toggle(
        &mut self,
        id: &ItemId,
        action: CollapseAction,
        controlled: bool,
    ) -> Result<()> {
        let panel = self
            .ctx
            .panel(id.as_str())
            .ok_or_else(|| LayoutError::UnknownPanel { id: id.clone() })?;
        let collapse = action.collapses();

        if !panel.collapsible {
            if controlled {
                tracing::debug!(target: "panegroup.animator", panel = %id, "not collapsible; ignored");
                return Ok(());
            }
            return Err(LayoutError::NotCollapsible { id: id.clone() }.into());
        }
        if panel.collapse_controlled && !controlled {
            self.notices.push(CollapseNotice {
                panel: id.clone(),
                collapsed: collapse,
                controlled: true,
            });
            return Ok(());
        }

        let running = self
            .animator
            .active()
            .filter(|t| t.plan.panel == *id)
            .map(|t| t.plan.action);
        match running {
            Some(current) if current == action => return Ok(()),
            Some(_) => {}
            None if panel.collapsed == collapse => return Ok(()),
            None => {}
        }

        if !self.ctx.is_measured() {
            self.flip_unmeasured(id, collapse, controlled);
            return Ok(());
        }
        if matches!(self.state, MachineState::Dragging { .. }) {
            return self.toggle_now(id, action, controlled);
        }
        self.start_transition(id, action, controlled)
    }

    /// Collapse state change with nothing to animate.
    fn flip_unmeasured(&mut self, id: &ItemId, collapse: bool, controlled: bool) {
        if let Some(panel) = self.ctx.panel_mut(id.as_str()) {
            panel.collapsed = collapse;
            if !collapse {
                panel.current_value = panel.size_before_collapse.map(Unit::Pixel);
            }
        }
        if !controlled {
            self.notices.push(CollapseNotice {
                panel: id.clone(),
                collapsed: collapse,
                controlled: false,
            });
        }
    }

    /// Size a panel should end at after `action`.
    fn target_size(&self, panel: &Panel, action: CollapseAction) -> Decimal {
        let container = self.ctx.axis_size();
        let collapsed_px = panel.collapsed_px(container);
        if action.collapses() {
            return collapsed_px;
        }
        let open_static = self.ctx.static_space()
            - if panel.collapsed {
                collapsed_px
            } else {
                Decimal::ZERO
            };
        let min = panel.min.to_pixels(container, open_static);
        let max = panel.max.to_pixels(container, open_static).max(min);
        panel.size_before_collapse.unwrap_or(min).clamp(min, max)
    }

    fn open_min(&self, panel: &Panel) -> Decimal {
        let container = self.ctx.axis_size();
        let open_static = self.ctx.static_space()
            - if panel.collapsed {
                panel.collapsed_px(container)
            } else {
                Decimal::ZERO
            };
        panel.min.to_pixels(container, open_static)
    }

    fn start_transition(
        &mut self,
        id: &ItemId,
        action: CollapseAction,
        controlled: bool,
    ) -> Result<()> {
        resize_handle(&self.ctx, id.as_str())?;

        // A transition on another panel is cancelled where it stands; one on
        // this panel is reversed from wherever it got to.
        let same_panel = self.animator.active().map(|t| t.plan.panel == *id);
        let reversing = match same_panel {
            Some(true) => self.animator.cancel().map(|t| t.plan.from),
            Some(false) => {
                self.cancel_transition()?;
                None
            }
            None => None,
        };

        let resting = self.ctx.items.clone();
        if self.state.is_idle() {
            self.ctx.items = prepare(&self.ctx);
        }
        let (Some(index), Some(panel)) = (self.ctx.index_of(id.as_str()), self.ctx.panel(id.as_str()))
        else {
            return Ok(());
        };
        let from = self.ctx.pixel_size(index).unwrap_or(Decimal::ZERO);
        let animation = panel.collapse_animation;
        let target = match (action, reversing) {
            (CollapseAction::Expand, Some(origin)) => origin,
            _ => self.target_size(panel, action),
        };

        let target = match self.reachable_target(id, index, action, target)? {
            Some(reached) => reached,
            None => {
                if self.state.is_idle() {
                    self.ctx.items = resting;
                } else {
                    self.settle();
                    self.enter_idle();
                }
                return Ok(());
            }
        };

        tracing::debug!(
            target: "panegroup.animator",
            panel = %id,
            ?action,
            from = %from,
            target = %target,
            duration_ms = animation.duration_ms,
            "transition started"
        );
        self.animator.start(TransitionPlan {
            panel: id.clone(),
            action,
            controlled,
            from,
            target,
            animation,
        });
        self.state = MachineState::TogglingCollapse {
            panel: id.clone(),
            action,
        };

        if animation.duration_ms == 0 {
            self.advance(Duration::ZERO)?;
        } else {
            self.request_frame();
        }
        Ok(())
    }

    /// Ask the host for a frame on behalf of the running transition.
    fn request_frame(&self) {
        if let Some(transition) = self.animator.active() {
            self.scheduler
                .request_frame(&self.ctx.group_id, &transition.token());
        }
    }

    /// Dry-run `action` on a clone of the prepared context.
    ///
    /// An expand ends wherever the neighbours let the panel reach and needs
    /// at least the open minimum; a collapse needs the whole way down to the
    /// collapsed size. `None` means the request cannot apply.
    fn reachable_target(
        &self,
        id: &ItemId,
        index: usize,
        action: CollapseAction,
        target: Decimal,
    ) -> Result<Option<Decimal>> {
        let Some(panel) = self.ctx.panel(id.as_str()) else {
            return Ok(None);
        };
        let min = self.open_min(panel);
        let mut trial = self.ctx.clone();
        trial.apply(resize_panel(&self.ctx, id.as_str(), target)?);
        let reached = trial.pixel_size(index).unwrap_or(Decimal::ZERO);
        let fits = match action {
            CollapseAction::Expand => reached >= min,
            CollapseAction::Collapse => {
                reached.round_dp(PIXEL_DECIMAL_PLACES) == target.round_dp(PIXEL_DECIMAL_PLACES)
            }
        };
        if fits {
            return Ok(Some(reached));
        }
        tracing::debug!(
            target: "panegroup.animator",
            panel = %id,
            ?action,
            reached = %reached,
            target = %target,
            min = %min,
            "no room for the request; ignored"
        );
        Ok(None)
    }

    /// Collapse or expand immediately, without leaving the current state.
    fn toggle_now(&mut self, id: &ItemId, action: CollapseAction, controlled: bool) -> Result<()> {
        let Some(index) = self.ctx.index_of(id.as_str()) else {
            return Ok(());
        };
        let Some(panel) = self.ctx.panel(id.as_str()) else {
            return Ok(());
        };
        let wanted = self.target_size(panel, action);
        let Some(target) = self.reachable_target(id, index, action, wanted)? else {
            return Ok(());
        };
        let plan = TransitionPlan {
            panel: id.clone(),
            action,
            controlled,
            from: self.ctx.pixel_size(index).unwrap_or(Decimal::ZERO),
            target,
            animation: CollapseAnimation::INSTANT,
        };
        self.snap(&plan)?;
        self.ctx.drag_overshoot = Decimal::ZERO;
        Ok(())
    }

    /// Run one animation frame.
    fn advance(&mut self, now: Duration) -> Result<bool> {
        let Some(step) = self.animator.frame(now) else {
            return Ok(false);
        };
        tracing::trace!(
            target: "panegroup.animator",
            panel = %step.panel,
            delta = %step.delta,
            done = step.done,
            "frame"
        );
        if !step.delta.is_zero() {
            let patch = resize_panel_by(&self.ctx, step.panel.as_str(), step.delta)?;
            self.notices.extend(self.ctx.apply(patch));
        }
        if step.done {
            self.complete_transition()?;
            return Ok(false);
        }
        self.request_frame();
        Ok(true)
    }

    /// Stop the running transition where it stands, commit and go idle.
    ///
    /// The panel keeps its collapsed flag. If the animation left it outside
    /// its drag limits it is pulled back to the nearest one first.
    fn cancel_transition(&mut self) -> Result<()> {
        let Some(transition) = self.animator.cancel() else {
            return Ok(());
        };
        let id = transition.plan.panel.as_str();
        let container = self.ctx.axis_size();
        let static_space = self.ctx.static_space();
        if let (Some(index), Some(panel)) = (self.ctx.index_of(id), self.ctx.panel(id)) {
            let px = self.ctx.pixel_size(index).unwrap_or(Decimal::ZERO);
            let (lo, hi) = limits(panel, container, static_space, UpdateMode::Drag);
            let clamped = px.clamp(lo, hi);
            if clamped != px {
                let patch = resize_panel(&self.ctx, id, clamped)?;
                self.notices.extend(self.ctx.apply(patch));
            }
        }
        tracing::debug!(
            target: "panegroup.animator",
            panel = %transition.plan.panel,
            action = ?transition.plan.action,
            "transition cancelled"
        );
        self.settle();
        self.enter_idle();
        Ok(())
    }

    /// Jump the running transition to its end, commit and go idle.
    fn complete_transition(&mut self) -> Result<()> {
        let Some(transition) = self.animator.finish() else {
            return Ok(());
        };
        self.snap(&transition.plan)?;
        tracing::debug!(
            target: "panegroup.animator",
            panel = %transition.plan.panel,
            action = ?transition.plan.action,
            "transition complete"
        );
        self.settle();
        self.enter_idle();
        Ok(())
    }

    /// Put a panel at the exact end size of `plan` and flip its flag.
    fn snap(&mut self, plan: &TransitionPlan) -> Result<()> {
        let id = plan.panel.as_str();
        let Some(index) = self.ctx.index_of(id) else {
            return Ok(());
        };
        if self.ctx.pixel_size(index) != Some(plan.target) {
            let patch = resize_panel(&self.ctx, id, plan.target)?;
            self.notices.extend(self.ctx.apply(patch));
        }
        let collapse = plan.action.collapses();
        let container = self.ctx.axis_size();
        if let Some(panel) = self.ctx.panel_mut(id) {
            if collapse {
                if plan.from > panel.collapsed_px(container) {
                    panel.size_before_collapse = Some(plan.from);
                }
            } else {
                panel.size_before_collapse = None;
            }
            panel.collapsed = collapse;
        }
        if !plan.controlled {
            self.notices.push(CollapseNotice {
                panel: plan.panel.clone(),
                collapsed: collapse,
                controlled: false,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    fn panel_sizes(&self) -> BTreeMap<ItemId, Decimal> {
        if !self.ctx.is_measured() {
            return BTreeMap::new();
        }
        let container = self.ctx.axis_size();
        let static_space = self.ctx.static_space();
        self.ctx
            .panels()
            .map(|panel| (panel.id.clone(), panel.pixels(container, static_space)))
            .collect()
    }

    fn notify(&mut self, before: &BTreeMap<ItemId, Decimal>) {
        for notice in std::mem::take(&mut self.notices) {
            tracing::debug!(
                target: "panegroup.machine",
                panel = %notice.panel,
                collapsed = notice.collapsed,
                controlled = notice.controlled,
                "collapse change"
            );
            if let Some(callbacks) = self.callbacks.get_mut(&notice.panel) {
                callbacks.collapse_changed(notice.collapsed);
            }
        }

        if self.ctx.is_measured() {
            let container = self.ctx.axis_size();
            let static_space = self.ctx.static_space();
            let dynamic = self.ctx.dynamic_space();
            for panel in self.ctx.panels() {
                let pixel = panel.pixels(container, static_space);
                if before.get(&panel.id) == Some(&pixel) {
                    continue;
                }
                let Some(callbacks) = self.callbacks.get_mut(&panel.id) else {
                    continue;
                };
                let percent = if dynamic > Decimal::ZERO {
                    (pixel / dynamic * Decimal::ONE_HUNDRED).round_dp(PIXEL_DECIMAL_PLACES)
                } else {
                    Decimal::ZERO
                };
                callbacks.resized(PanelSize { pixel, percent });
            }
        }

        if let Some(on_change) = self.on_change.as_mut() {
            on_change(&self.ctx);
        }
    }
}

impl fmt::Debug for GroupMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupMachine")
            .field("group_id", &self.ctx.group_id)
            .field("state", &self.state)
            .field("locked", &self.locked)
            .field("items", &self.ctx.items.len())
            .field("animating", &self.animator.is_running())
            .field("store", &self.store.is_some())
            .finish()
    }
}
