#![forbid(unsafe_code)]

//! Resizable panel groups.
//!
//! This crate is the stable surface: it re-exports the unit model from
//! `panegroup-core`, the layout engine from `panegroup-layout` and (with the
//! default `runtime` feature) the event machine from `panegroup-runtime`.
//!
//! ```
//! use panegroup::prelude::*;
//!
//! let mut group = GroupMachine::new(GroupConfig::default().with_group_id("editor"))?;
//! group.send(GroupEvent::register_panel(Panel::new("tree").with_min(Unit::px(120))))?;
//! group.send(GroupEvent::register_handle(Handle::new("split", 4)))?;
//! group.send(GroupEvent::register_panel(Panel::new("code")))?;
//! group.send(GroupEvent::SetSize(Size::new(804, 600)))?;
//! assert_eq!(group.template(), "400px 4px 400px");
//! # Ok::<(), panegroup::Error>(())
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use panegroup_core::animation::{Easing, Tween};
pub use panegroup_core::frame::{FrameLoop, FrameScheduler, ManualScheduler, NoopScheduler};
pub use panegroup_core::{Decimal, SizeExpr, Unit, UnitError};

// --- Layout re-exports -----------------------------------------------------

pub use panegroup_layout::{
    AutosaveStrategy, CollapseAnimation, CollapseNotice, GroupContext, Handle, Item, ItemId,
    LayoutError, LayoutPatch, Orientation, OverflowReport, Panel, PanelConstraints, Size,
    SnapshotError, UpdateMode, build_template,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use panegroup_runtime::{
    ConfigError, CookieJar, CookieStore, DragInput, FileStore, GroupConfig, GroupError,
    GroupEvent, GroupMachine, GroupMachineBuilder, Key, KeyInput, MachineState, MemoryCookieJar,
    MemoryStore, PanelCallbacks, PanelSize, PointerDragSession, SnapshotStore, StorageError,
};

// --- Errors ---------------------------------------------------------------

/// Any error a panegroup API can return.
#[derive(Debug)]
pub enum Error {
    Unit(UnitError),
    Layout(LayoutError),
    Snapshot(SnapshotError),
    #[cfg(feature = "runtime")]
    Group(GroupError),
    #[cfg(feature = "runtime")]
    Config(ConfigError),
    #[cfg(feature = "runtime")]
    Storage(StorageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit(err) => write!(f, "{err}"),
            Self::Layout(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Group(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Config(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unit(err) => Some(err),
            Self::Layout(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Group(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Config(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<UnitError> for Error {
    fn from(err: UnitError) -> Self {
        Self::Unit(err)
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl From<SnapshotError> for Error {
    fn from(err: SnapshotError) -> Self {
        Self::Snapshot(err)
    }
}

#[cfg(feature = "runtime")]
impl From<GroupError> for Error {
    fn from(err: GroupError) -> Self {
        Self::Group(err)
    }
}

#[cfg(feature = "runtime")]
impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(feature = "runtime")]
impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

/// Standard result type for panegroup APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AutosaveStrategy, CollapseAnimation, Decimal, Error, GroupContext, Handle, Orientation,
        Panel, Result, Size, SizeExpr, Unit,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{DragInput, GroupConfig, GroupEvent, GroupMachine, Key, PanelCallbacks};

    pub use crate::{core, layout};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use panegroup_core as core;
pub use panegroup_layout as layout;
#[cfg(feature = "runtime")]
pub use panegroup_runtime as runtime;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn layer_errors_convert_and_keep_their_source() {
        let err: Error = Unit::parse("ten").unwrap_err().into();
        assert!(matches!(err, Error::Unit(_)));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("ten"));
    }

    #[cfg(feature = "runtime")]
    #[test]
    fn machine_errors_surface_through_the_facade() {
        fn collapse_missing() -> Result<()> {
            let mut group = GroupMachine::new(GroupConfig::default())?;
            group.send(GroupEvent::collapse("missing"))?;
            Ok(())
        }
        let err = collapse_missing().unwrap_err();
        assert!(matches!(err, Error::Group(GroupError::Layout(LayoutError::UnknownPanel { .. }))));
    }
}
