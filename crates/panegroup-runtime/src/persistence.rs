//! Snapshot stores for autosave.
//!
//! A [`SnapshotStore`] keeps one snapshot per group id. Three backends are
//! provided:
//!
//! - [`MemoryStore`]: in-process key-value map (the `localStorage` shape).
//! - [`FileStore`]: one `<group_id>.json` file per group in a directory.
//! - [`CookieStore`]: base64 snapshot in a cookie named after the group,
//!   written through a host [`CookieJar`].
//!
//! File writes go to a temp file first and are renamed into place, so a
//! crash mid-write never leaves a truncated snapshot behind. A missing
//! snapshot is not an error: `load` returns `Ok(None)`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::string::FromUtf8Error;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use panegroup_layout::{GroupContext, SnapshotError, snapshot};
use thiserror::Error;

/// Cookie lifetime: one year.
pub const COOKIE_MAX_AGE_SECS: u64 = 31_536_000;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("snapshot storage i/o: {0}")]
    Io(#[from] io::Error),

    #[error("cookie value is not base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("cookie value is not utf-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Persistent home for group snapshots.
pub trait SnapshotStore {
    /// Snapshot stored for `group_id`, if any.
    fn load(&self, group_id: &str) -> Result<Option<GroupContext>, StorageError>;

    /// Store `ctx` under its group id, replacing any previous snapshot.
    fn save(&mut self, ctx: &GroupContext) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Shared in-memory key-value store. Clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON stored under `group_id`.
    #[must_use]
    pub fn get(&self, group_id: &str) -> Option<String> {
        self.entries.borrow().get(group_id).cloned()
    }

    /// Seed a raw JSON entry (e.g. from a previous session).
    pub fn insert(&self, group_id: impl Into<String>, json: impl Into<String>) {
        self.entries.borrow_mut().insert(group_id.into(), json.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, group_id: &str) -> Result<Option<GroupContext>, StorageError> {
        self.get(group_id)
            .map(|json| snapshot::decode(&json))
            .transpose()
            .map_err(StorageError::from)
    }

    fn save(&mut self, ctx: &GroupContext) -> Result<(), StorageError> {
        let json = snapshot::encode(ctx)?;
        self.insert(ctx.group_id.clone(), json);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// One JSON file per group inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the snapshot of `group_id`. Characters outside
    /// `[A-Za-z0-9_-]` are replaced by `_`.
    #[must_use]
    pub fn path_for(&self, group_id: &str) -> PathBuf {
        let name: String = group_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl SnapshotStore for FileStore {
    fn load(&self, group_id: &str) -> Result<Option<GroupContext>, StorageError> {
        let json = match std::fs::read_to_string(self.path_for(group_id)) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(snapshot::decode(&json)?))
    }

    fn save(&mut self, ctx: &GroupContext) -> Result<(), StorageError> {
        let json = snapshot::encode(ctx)?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&ctx.group_id);
        let temp = path.with_extension("json.tmp");
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Cookie
// ---------------------------------------------------------------------------

/// Host cookie access.
pub trait CookieJar {
    /// Value of cookie `name`.
    fn get(&self, name: &str) -> Option<String>;

    /// Write a full `Set-Cookie` style string (`name=value; attributes`).
    fn set(&mut self, cookie: &str);
}

/// In-memory [`CookieJar`] that records every written cookie string.
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryCookieJar {
    inner: Rc<RefCell<CookieJarState>>,
}

#[derive(Debug, Default)]
struct CookieJarState {
    values: BTreeMap<String, String>,
    written: Vec<String>,
}

impl MemoryCookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cookie strings written so far, oldest first.
    #[must_use]
    pub fn written(&self) -> Vec<String> {
        self.inner.borrow().written.clone()
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.inner.borrow().values.get(name).cloned()
    }

    fn set(&mut self, cookie: &str) {
        let mut state = self.inner.borrow_mut();
        state.written.push(cookie.to_string());
        let pair = cookie.split(';').next().unwrap_or_default();
        if let Some((name, value)) = pair.split_once('=') {
            state
                .values
                .insert(name.trim().to_string(), value.trim().to_string());
        }
    }
}

/// Snapshots stored as base64 cookie values named after the group id.
#[derive(Debug, Clone, Default)]
pub struct CookieStore<J> {
    jar: J,
}

impl<J: CookieJar> CookieStore<J> {
    #[must_use]
    pub fn new(jar: J) -> Self {
        Self { jar }
    }

    #[must_use]
    pub fn jar(&self) -> &J {
        &self.jar
    }
}

/// Cookie string for `ctx`.
pub fn cookie_for(ctx: &GroupContext) -> Result<String, StorageError> {
    let value = STANDARD.encode(snapshot::encode(ctx)?);
    Ok(format!(
        "{}={value}; Max-Age={COOKIE_MAX_AGE_SECS}; Path=/",
        ctx.group_id
    ))
}

impl<J: CookieJar> SnapshotStore for CookieStore<J> {
    fn load(&self, group_id: &str) -> Result<Option<GroupContext>, StorageError> {
        let Some(value) = self.jar.get(group_id) else {
            return Ok(None);
        };
        let json = String::from_utf8(STANDARD.decode(value)?)?;
        Ok(Some(snapshot::decode(&json)?))
    }

    fn save(&mut self, ctx: &GroupContext) -> Result<(), StorageError> {
        let cookie = cookie_for(ctx)?;
        self.jar.set(&cookie);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panegroup_core::Unit;
    use panegroup_layout::{Handle, Item, Panel, Size, build_template, commit, initialize};

    fn committed(id: &str) -> GroupContext {
        let mut ctx = GroupContext::new(id)
            .with_size(Size::new(410, 100))
            .with_items([
                Item::from(Panel::new("nav").with_min(Unit::px(100))),
                Item::from(Handle::new("h", 10)),
                Item::from(Panel::new("body")),
            ]);
        ctx.items = initialize(&ctx);
        ctx.apply(commit(&ctx));
        ctx
    }

    fn assert_restores(store: &mut dyn SnapshotStore, ctx: &GroupContext) {
        assert!(store.load(&ctx.group_id).expect("load").is_none());
        store.save(ctx).expect("save");
        let back = store.load(&ctx.group_id).expect("load").expect("present");
        assert_eq!(build_template(&back), build_template(ctx));
    }

    #[test]
    fn memory_store_round_trips() {
        let ctx = committed("sidebar");
        let mut store = MemoryStore::new();
        assert_restores(&mut store, &ctx);
        assert_eq!(store.len(), 1);
        assert!(store.get("sidebar").expect("json").contains("\"groupId\":\"sidebar\""));
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        writer.save(&committed("g")).expect("save");
        assert!(!store.is_empty());
    }

    #[test]
    fn file_store_round_trips_without_leftover_temp() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = committed("main/split");
        let mut store = FileStore::new(dir.path().join("layouts"));
        assert_restores(&mut store, &ctx);

        let path = store.path_for("main/split");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("main_split.json"));
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn file_store_reports_corrupt_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        std::fs::write(store.path_for("g"), "{ not json").expect("write");
        assert!(matches!(store.load("g"), Err(StorageError::Snapshot(_))));
    }

    #[test]
    fn cookie_store_writes_one_year_cookie() {
        let jar = MemoryCookieJar::new();
        let ctx = committed("editor");
        let mut store = CookieStore::new(jar.clone());
        assert_restores(&mut store, &ctx);

        let written = jar.written();
        assert_eq!(written.len(), 1);
        assert!(written[0].starts_with("editor="));
        assert!(written[0].ends_with("; Max-Age=31536000; Path=/"));
    }

    #[test]
    fn cookie_store_rejects_non_base64() {
        let mut jar = MemoryCookieJar::new();
        jar.set("g=%%%; Path=/");
        let store = CookieStore::new(jar);
        assert!(matches!(store.load("g"), Err(StorageError::Encoding(_))));
    }
}
