//! Errors surfaced by the group machine.

use panegroup_core::UnitError;
use panegroup_layout::{LayoutError, SnapshotError};
use thiserror::Error;

use crate::persistence::StorageError;

/// Failure while processing an event or an explicit request.
///
/// Interactive conditions (dragging past a limit, expanding without room,
/// unresolved overflow) are never errors.
#[derive(Debug, Error)]
pub enum GroupError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error("invalid initial snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, GroupError>;
