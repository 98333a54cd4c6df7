#![forbid(unsafe_code)]

//! Runtime for panel groups: the event machine and everything it talks to.
//!
//! # Role in panegroup
//! `panegroup-layout` computes sizes; this crate decides *when*:
//!
//! - [`GroupMachine`] owns a group's context and processes [`GroupEvent`]s
//!   (registration, measurement, drags, collapse requests, locking).
//! - [`Animator`] turns collapse/expand requests into per-frame panel
//!   deltas, driven by an injected [`FrameScheduler`].
//! - [`SnapshotStore`] backends persist committed layouts for autosave.
//! - [`GroupConfig`] carries orientation, autosave and keyboard settings,
//!   loadable from TOML or JSON.
//!
//! # Example
//!
//! ```
//! use panegroup_runtime::{DragInput, GroupConfig, GroupEvent, GroupMachine};
//! use panegroup_layout::{Handle, Panel, Size};
//!
//! let mut machine = GroupMachine::new(GroupConfig::default().with_group_id("main"))?;
//! machine.send(GroupEvent::register_panel(Panel::new("left")))?;
//! machine.send(GroupEvent::register_handle(Handle::new("handle", 10)))?;
//! machine.send(GroupEvent::register_panel(Panel::new("right")))?;
//! machine.send(GroupEvent::SetSize(Size::new(500, 200)))?;
//! assert_eq!(machine.template(), "245px 10px 245px");
//!
//! machine.send(GroupEvent::drag("handle", DragInput::pointer(10, 0)))?;
//! assert_eq!(machine.template(), "255px 10px 235px");
//! # Ok::<(), panegroup_runtime::GroupError>(())
//! ```
//!
//! [`FrameScheduler`]: panegroup_core::frame::FrameScheduler

pub mod animator;
pub mod config;
pub mod drag;
pub mod error;
pub mod event;
pub mod machine;
pub mod persistence;

pub use animator::{Animator, CollapseAction, FrameStep, Transition, TransitionPlan};
pub use config::{ConfigError, GroupConfig, GroupIdGenerator, SequentialGroupIds};
pub use drag::{DragAction, DragInput, DragSettings, Key, KeyInput, PointerDragSession};
pub use error::{GroupError, Result};
pub use event::{CollapseCallback, GroupEvent, PanelCallbacks, PanelSize, ResizeCallback};
pub use machine::{GroupMachine, GroupMachineBuilder, MachineState};
pub use persistence::{
    COOKIE_MAX_AGE_SECS, CookieJar, CookieStore, FileStore, MemoryCookieJar, MemoryStore,
    SnapshotStore, StorageError, cookie_for,
};
