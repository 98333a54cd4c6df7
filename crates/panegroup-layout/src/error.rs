//! Layout errors.
//!
//! Only conditions that indicate a host bug (an id that was never
//! registered, a collapse request that cannot apply to the given item) are
//! errors. Dragging past a limit, expanding without room, and overflow with
//! nothing to collapse are absorbed by the engine.

use panegroup_core::UnitError;
use thiserror::Error;

use crate::item::ItemId;

/// Errors surfaced by layout operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("unknown panel {id}")]
    UnknownPanel { id: ItemId },

    #[error("unknown handle {id}")]
    UnknownHandle { id: ItemId },

    /// An id that matches neither a panel nor a handle. Measurement reports
    /// cover both kinds, so an unregistered id there has no kind to report.
    #[error("unknown item {id}")]
    UnknownItem { id: ItemId },

    #[error("handle {handle} has no collapsible neighbouring panel")]
    NoCollapsibleNeighbor { handle: ItemId },

    #[error("panel {id} is not collapsible")]
    NotCollapsible { id: ItemId },

    #[error("panel {id} has no adjacent handle to resize through")]
    NoAdjacentHandle { id: ItemId },

    #[error(transparent)]
    Unit(#[from] UnitError),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
