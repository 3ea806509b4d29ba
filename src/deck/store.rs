//! Durable, queryable collection of deck sessions.
//!
//! Directory structure:
//! ```text
//! decks_dir/
//! ├── <user_id>_<channel_id>.json
//! └── <user_id>_<channel_id>.json
//! ```
//!
//! Every record lives behind its own `tokio::sync::Mutex`, so two interactions
//! for the same (user, channel) pair are applied one after the other.

use super::session::{ChannelInfo, Session, SessionKey};
use crate::error::StoreError;
use ahash::AHashMap;
use futures::future::join_all;
use serenity::model::id::{ChannelId, UserId};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

pub type SessionHandle = Arc<Mutex<Session>>;

/// Result of a bulk removal: channels whose session was ended, and those that were not.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemoveReport {
    pub succeeded: Vec<ChannelId>,
    pub failed: Vec<ChannelId>,
}

pub struct SessionStore {
    dir: PathBuf,
    sessions: RwLock<AHashMap<SessionKey, SessionHandle>>,
}

impl SessionStore {
    /// Open the store, creating `dir` if needed, and load every readable record in it.
    /// A corrupt record is logged and skipped; it never blocks the others.
    #[instrument(level = "info", skip_all, fields(dir = %dir.as_ref().display()))]
    pub async fn load(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))?;

        let mut sessions = AHashMap::new();
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))?;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(target = "store.load", error = %e, "stopped scanning session directory early");
                    break;
                }
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let session = match read_record(&path).await {
                Ok(session) => session,
                Err(e) => {
                    error!(target = "store.load", error = %e, "skipping unreadable session record");
                    continue;
                }
            };
            let key = session.key();
            if path.file_name().and_then(|n| n.to_str()) != Some(key.file_name().as_str()) {
                warn!(target = "store.load", path = %path.display(), expected = %key.file_name(), "session record has an unexpected file name");
            }
            if sessions.contains_key(&key) {
                warn!(target = "store.load", path = %path.display(), %key, "duplicate session record skipped");
                continue;
            }
            sessions.insert(key, Arc::new(Mutex::new(session)));
        }

        info!(target = "store.load", count = sessions.len(), "loaded deck sessions");
        Ok(Self {
            dir,
            sessions: RwLock::new(sessions),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &SessionKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub async fn get(&self, user_id: UserId, channel_id: ChannelId) -> Option<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(&SessionKey::new(user_id, channel_id))
            .cloned()
    }

    /// All of a user's sessions, ordered by channel id.
    pub async fn get_all(&self, user_id: UserId) -> Vec<SessionHandle> {
        let mut found: Vec<(ChannelId, SessionHandle)> = self
            .sessions
            .read()
            .await
            .iter()
            .filter(|(key, _)| key.user_id == user_id)
            .map(|(key, handle)| (key.channel_id, handle.clone()))
            .collect();
        found.sort_by_key(|(channel_id, _)| *channel_id);
        found.into_iter().map(|(_, handle)| handle).collect()
    }

    /// Channel info for each of a user's sessions, ordered by channel id.
    pub async fn channels(&self, user_id: UserId) -> Vec<ChannelInfo> {
        let mut channels = Vec::new();
        for handle in self.get_all(user_id).await {
            let session = handle.lock().await;
            if !session.is_retired() {
                channels.push(session.channel.clone());
            }
        }
        channels
    }

    /// Insert a new session and write it through to disk.
    ///
    /// When the write fails the record stays in memory (reachable through `get`)
    /// and the error is returned so the caller can treat it as degraded.
    pub async fn create(&self, session: Session) -> Result<SessionHandle, StoreError> {
        let key = session.key();
        let handle = Arc::new(Mutex::new(session));
        // Lock before publishing so nobody observes the record ahead of its first save.
        let guard = handle.lock().await;
        {
            let mut sessions = self.sessions.write().await;
            if sessions.contains_key(&key) {
                return Err(StoreError::AlreadyExists {
                    user_id: key.user_id.get(),
                    channel_id: key.channel_id.get(),
                });
            }
            sessions.insert(key, handle.clone());
        }
        info!(target = "store.create", %key, "created deck session");
        self.save(&guard).await?;
        drop(guard);
        Ok(handle)
    }

    /// Overwrite the session's record with a full snapshot (temp file + rename).
    pub async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let key = session.key();
        if session.is_retired() {
            debug!(target = "store.save", %key, "skipping save of retired session");
            return Ok(());
        }
        let path = self.path_for(&key);
        let data = serde_json::to_vec_pretty(session)?;
        let tmp = path.with_extension("json.tmp");

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?;
        fs::write(&tmp, &data)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::io(&path, e));
        }
        debug!(target = "store.save", %key, bytes = data.len(), "saved deck session");
        Ok(())
    }

    /// Delete the record file, then drop the session from memory.
    ///
    /// `Ok(false)` means there was nothing to remove. When the delete fails the
    /// session stays in memory and the I/O error is returned.
    pub async fn remove(&self, user_id: UserId, channel_id: ChannelId) -> Result<bool, StoreError> {
        let key = SessionKey::new(user_id, channel_id);
        let Some(handle) = self.get(user_id, channel_id).await else {
            warn!(target = "store.remove", %key, "attempted to remove a session that could not be found");
            return Ok(false);
        };
        // Waits for any in-flight mutation of this session.
        let mut session = handle.lock().await;
        if session.is_retired() {
            return Ok(false);
        }
        let path = self.path_for(&key);
        if let Err(e) = fs::remove_file(&path).await {
            error!(target = "store.remove", %key, path = %path.display(), error = %e, "failed to delete session record");
            return Err(StoreError::io(path, e));
        }
        session.retire();
        self.sessions.write().await.remove(&key);
        info!(target = "store.remove", %key, "removed deck session");
        Ok(true)
    }

    /// Drop a session whose game never got going.
    ///
    /// Unlike [`remove`](Self::remove) a missing record file is fine here: the
    /// first save may never have succeeded. A record that exists but cannot be
    /// deleted keeps the session in memory, so `/end` can retry it later.
    pub async fn discard(&self, user_id: UserId, channel_id: ChannelId) -> Result<(), StoreError> {
        let key = SessionKey::new(user_id, channel_id);
        let Some(handle) = self.get(user_id, channel_id).await else {
            return Ok(());
        };
        let mut session = handle.lock().await;
        if session.is_retired() {
            return Ok(());
        }
        let path = self.path_for(&key);
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(target = "store.discard", %key, "session was never written");
            }
            Err(e) => return Err(StoreError::io(path, e)),
        }
        session.retire();
        self.sessions.write().await.remove(&key);
        info!(target = "store.discard", %key, "discarded deck session");
        Ok(())
    }

    /// Delete several of a user's sessions.
    ///
    /// Locks are taken one at a time in channel order, so overlapping bulk
    /// removals queue instead of deadlocking. File deletions then run
    /// concurrently and memory is only updated, for the successful ones,
    /// once every attempt has finished.
    pub async fn remove_multi(&self, user_id: UserId, channel_ids: &[ChannelId]) -> RemoveReport {
        let mut report = RemoveReport::default();
        let mut unique = channel_ids.to_vec();
        unique.sort();
        unique.dedup();

        let mut locked = Vec::with_capacity(unique.len());
        for channel_id in unique {
            let Some(handle) = self.get(user_id, channel_id).await else {
                warn!(target = "store.remove_multi", user_id = %user_id, channel_id = %channel_id, "no session to remove");
                report.failed.push(channel_id);
                continue;
            };
            let guard = handle.lock_owned().await;
            if guard.is_retired() {
                report.failed.push(channel_id);
                continue;
            }
            locked.push((channel_id, guard));
        }

        let deletions = locked.iter().map(|(channel_id, _)| {
            let path = self.path_for(&SessionKey::new(user_id, *channel_id));
            async move { fs::remove_file(&path).await }
        });
        let outcomes = join_all(deletions).await;

        let mut sessions = self.sessions.write().await;
        for ((channel_id, mut guard), result) in locked.into_iter().zip(outcomes) {
            match result {
                Ok(()) => {
                    guard.retire();
                    sessions.remove(&SessionKey::new(user_id, channel_id));
                    report.succeeded.push(channel_id);
                }
                Err(e) => {
                    error!(target = "store.remove_multi", user_id = %user_id, channel_id = %channel_id, error = %e, "failed to delete session record");
                    report.failed.push(channel_id);
                }
            }
        }
        report.failed.sort();
        info!(
            target = "store.remove_multi",
            user_id = %user_id,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "bulk session removal finished"
        );
        report
    }
}

async fn read_record(path: &Path) -> Result<Session, StoreError> {
    let raw = fs::read(path).await.map_err(|e| StoreError::io(path, e))?;
    serde_json::from_slice(&raw).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}
