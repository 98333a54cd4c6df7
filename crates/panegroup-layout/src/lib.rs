#![forbid(unsafe_code)]

//! Layout engine for panel groups.
//!
//! A group is a linear sequence of resizable [`Panel`]s separated by
//! fixed-size [`Handle`]s. This crate holds the pure part of the system:
//! every operation takes a [`GroupContext`] and returns new items or a
//! [`LayoutPatch`], leaving state ownership to the caller
//! (`panegroup-runtime`'s machine).
//!
//! # Pipeline
//!
//! ```text
//!  stored sizes ──prepare──▶ pixels ──update × N──▶ pixels ──commit──▶ stored sizes
//!  (percent/px)                        (drag, animation)                (percent/px)
//! ```
//!
//! # Example
//!
//! ```
//! use panegroup_layout::{GroupContext, Handle, Item, Panel, Size, UpdateMode};
//! use panegroup_layout::{apply_delta_stepwise, build_template, commit, initialize};
//! use panegroup_core::Decimal;
//!
//! let mut ctx = GroupContext::new("main")
//!     .with_size(Size::new(500, 200))
//!     .with_items([
//!         Item::from(Panel::new("left")),
//!         Item::from(Handle::new("handle", 10)),
//!         Item::from(Panel::new("right")),
//!     ]);
//! ctx.items = initialize(&ctx);
//! assert_eq!(build_template(&ctx), "245px 10px 245px");
//!
//! let patch = apply_delta_stepwise(&ctx, "handle", Decimal::from(10), UpdateMode::Drag)?;
//! ctx.apply(patch);
//! ctx.apply(commit(&ctx));
//! assert_eq!(build_template(&ctx), "255px 10px 235px");
//! # Ok::<(), panegroup_layout::LayoutError>(())
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod item;
pub mod overflow;
pub mod registry;
pub mod snapshot;
pub mod template;

pub use context::{
    AutosaveStrategy, CollapseNotice, GroupContext, LayoutPatch, Orientation, Size,
};
pub use engine::{
    COLLAPSE_BUFFER, UpdateMode, apply_delta_stepwise, commit, enforce_constraints, initialize,
    limits, prepare, resize_handle, resize_panel, resize_panel_by, update,
};
pub use error::{LayoutError, Result};
pub use item::{CollapseAnimation, Handle, Item, ItemId, Panel, PanelConstraints};
pub use overflow::{OverflowReport, redistribute, resolve_overflow};
pub use registry::{Registration, insert_dynamic, next_order, register, remove, update_constraints};
pub use snapshot::SnapshotError;
pub use template::build_template;
