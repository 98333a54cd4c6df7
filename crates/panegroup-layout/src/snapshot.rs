//! Snapshot codec for [`GroupContext`].
//!
//! Snapshots are JSON with camelCase keys. Decimals are written as strings so
//! they come back with full precision. Observed sizes are never written.
//! Older snapshots wrapped the context in a `{ "context": { ... } }`
//! envelope; [`decode`] unwraps it.

use serde_json::Value;
use thiserror::Error;

use crate::context::GroupContext;

const LEGACY_ENVELOPE_KEY: &str = "context";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Snapshot-ready copy of `ctx` with observed sizes cleared.
#[must_use]
pub fn sanitized(ctx: &GroupContext) -> GroupContext {
    let mut ctx = ctx.clone();
    for panel in ctx.items.iter_mut().filter_map(crate::item::Item::as_panel_mut) {
        panel.last_known_size = None;
    }
    ctx
}

/// Serialize `ctx` to a JSON snapshot.
pub fn encode(ctx: &GroupContext) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(&sanitized(ctx))?)
}

/// Serialize to a JSON value (for stores that embed snapshots).
pub fn encode_value(ctx: &GroupContext) -> Result<Value, SnapshotError> {
    Ok(serde_json::to_value(sanitized(ctx))?)
}

/// Rehydrate a snapshot, accepting the legacy envelope.
pub fn decode(json: &str) -> Result<GroupContext, SnapshotError> {
    decode_value(serde_json::from_str(json)?)
}

pub fn decode_value(mut value: Value) -> Result<GroupContext, SnapshotError> {
    let legacy = value
        .as_object_mut()
        .filter(|object| !object.contains_key("items"))
        .and_then(|object| object.remove(LEGACY_ENVELOPE_KEY));
    if let Some(inner) = legacy {
        value = inner;
    }
    Ok(serde_json::from_value(value)?)
}
