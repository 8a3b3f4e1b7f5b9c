//! On-disk repository
//!
//! ```text
//! <work_dir>/.reword/
//!   objects/ab/abcdef....json   snapshot records (CAS, canonical JSON)
//!   store.db                    snapshot index, refs, reflog
//! ```
//!
//! A snapshot's id is the SHA-256 of its canonical record, so the CAS digest
//! and the id coincide and every read is verified against the id.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension};

use reword_core::errors::{ExError, ExErrorKind, ExResult, RewordError};
use reword_core::model::digest::{canonical_bytes, decode_snapshot};
use reword_core::model::{Signature, Snapshot, SnapshotDraft, SnapshotId};
use reword_core::revision::{resolve_revision, RevisionSource};
use reword_core::store::{
    qualify_branch, ObjectStore, RefStore, RefTarget, RefUpdate, ReflogEntry, HEAD,
};
use reword_core::traversal::topological_walk;

use crate::cas::FsStore;
use crate::db;
use crate::errors::{from_rusqlite, io_error, not_a_repository, store_write, Result};
use crate::migrations::apply_migrations;

/// Name of the repository directory inside a work directory
pub const REPO_DIR: &str = ".reword";
const OBJECTS_DIR: &str = "objects";
const DB_FILE: &str = "store.db";
const OBJECT_EXT: &str = "json";

pub struct Repository {
    work_dir: PathBuf,
    objects: FsStore,
    conn: Connection,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("work_dir", &self.work_dir)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Create (or reopen) a repository in `work_dir`
    ///
    /// A fresh repository has `HEAD` pointing at an unborn `refs/heads/main`.
    pub fn init(work_dir: impl AsRef<Path>) -> Result<Self> {
        let work_dir = work_dir.as_ref().to_path_buf();
        fs::create_dir_all(work_dir.join(REPO_DIR).join(OBJECTS_DIR))
            .map_err(|e| io_error("init_repository", e))?;
        let repo = Self::open_unchecked(work_dir)?;
        tracing::debug!(path = %repo.repo_dir().display(), "Initialized repository");
        Ok(repo)
    }

    /// Open the repository in `work_dir`
    ///
    /// # Errors
    ///
    /// `NotFound` if `work_dir` holds no repository.
    pub fn open(work_dir: impl AsRef<Path>) -> Result<Self> {
        let work_dir = work_dir.as_ref();
        if !Self::is_repository(work_dir) {
            return Err(not_a_repository(work_dir));
        }
        Self::open_unchecked(work_dir.to_path_buf())
    }

    /// Open the repository in `start` or the nearest parent directory
    ///
    /// # Errors
    ///
    /// `NotFound` if no ancestor holds a repository.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self> {
        let start = start.as_ref();
        match start.ancestors().find(|dir| Self::is_repository(dir)) {
            Some(dir) => Self::open(dir),
            None => Err(not_a_repository(start)),
        }
    }

    fn is_repository(dir: &Path) -> bool {
        dir.join(REPO_DIR).join(DB_FILE).is_file()
    }

    fn open_unchecked(work_dir: PathBuf) -> Result<Self> {
        let repo_dir = work_dir.join(REPO_DIR);
        let mut conn = db::open(repo_dir.join(DB_FILE))?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;

        Ok(Self {
            objects: FsStore::new(repo_dir.join(OBJECTS_DIR)),
            conn,
            work_dir,
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn repo_dir(&self) -> PathBuf {
        self.work_dir.join(REPO_DIR)
    }

    /// Point `HEAD` at a branch or detach it at a snapshot
    pub fn set_head(&mut self, target: &RefTarget) -> Result<()> {
        let (target_id, symbolic) = match target {
            RefTarget::Direct(id) => (Some(id.as_str().to_string()), None),
            RefTarget::Symbolic(name) => (None, Some(qualify_branch(name))),
        };
        self.conn
            .execute(
                "UPDATE refs SET target_id = ?1, symbolic_target = ?2, updated_at = ?3
                 WHERE name = ?4",
                rusqlite::params![target_id, symbolic, Utc::now().timestamp(), HEAD],
            )
            .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Every branch with a target, sorted by name
    pub fn branches(&self) -> Result<Vec<(String, SnapshotId)>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name, target_id FROM refs
                 WHERE name LIKE 'refs/heads/%' AND target_id IS NOT NULL
                 ORDER BY name",
            )
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        rows.into_iter()
            .map(|(name, id)| -> Result<(String, SnapshotId)> { Ok((name, parse_stored_id(&id)?)) })
            .collect()
    }

    fn read_ref_row(&self, name: &str) -> Result<Option<(Option<String>, Option<String>)>> {
        self.conn
            .query_row(
                "SELECT target_id, symbolic_target FROM refs WHERE name = ?1",
                [name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(from_rusqlite)
    }

    fn index_snapshot(
        tx: &rusqlite::Transaction<'_>,
        id: &SnapshotId,
        draft: &SnapshotDraft,
    ) -> Result<()> {
        let parent_ids =
            serde_json::to_string(&draft.parent_ids).map_err(|e| ExError::from(RewordError::from(e)))?;
        let subject = draft.message.lines().next().unwrap_or("");
        tx.execute(
            "INSERT OR IGNORE INTO snapshots
                (snapshot_id, parent_ids, committed_at, subject, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                id.as_str(),
                parent_ids,
                draft.committer.when.timestamp(),
                subject,
                Utc::now().timestamp(),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }
}

fn parse_stored_id(value: &str) -> Result<SnapshotId> {
    SnapshotId::parse(value).map_err(|e| {
        ExError::new(ExErrorKind::CorruptObject)
            .with_op("read_store")
            .with_message(e.to_string())
    })
}

impl RevisionSource for Repository {
    fn lookup_ref(&self, name: &str) -> ExResult<Option<SnapshotId>> {
        self.read_ref(&qualify_branch(name))
    }

    fn ids_with_prefix(&self, prefix: &str) -> ExResult<Vec<SnapshotId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT snapshot_id FROM snapshots WHERE substr(snapshot_id, 1, ?2) = ?1")
            .map_err(from_rusqlite)?;
        let ids = stmt
            .query_map(rusqlite::params![prefix, prefix.len() as i64], |row| {
                row.get::<_, String>(0)
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        ids.iter().map(|id| parse_stored_id(id)).collect()
    }

    fn parent_ids(&self, id: &SnapshotId) -> ExResult<Vec<SnapshotId>> {
        Ok(self.get_snapshot(id)?.parent_ids)
    }
}

impl ObjectStore for Repository {
    fn resolve(&self, revision: &str) -> ExResult<SnapshotId> {
        resolve_revision(self, revision)
    }

    fn get_snapshot(&self, id: &SnapshotId) -> ExResult<Snapshot> {
        let bytes = self
            .objects
            .read(id.as_str(), OBJECT_EXT)
            .map_err(|e| match e.kind() {
                ExErrorKind::NotFound => RewordError::SnapshotNotFound {
                    snapshot_id: id.to_string(),
                }
                .into(),
                _ => e,
            })?;
        Ok(decode_snapshot(id, &bytes)?)
    }

    fn walk_ancestry(&self, start: &SnapshotId) -> ExResult<Vec<SnapshotId>> {
        topological_walk(start, |id| self.get_snapshot(id))
    }

    fn create_snapshot(&mut self, draft: &SnapshotDraft) -> ExResult<SnapshotId> {
        let bytes = canonical_bytes(draft).map_err(|e| store_write(e.into()))?;
        let id = SnapshotId::parse(&reword_core::model::digest::hash_bytes(&bytes))
            .map_err(|e| store_write(e.into()))?;

        let tx = self
            .conn
            .transaction()
            .map_err(|e| store_write(from_rusqlite(e)))?;
        Self::index_snapshot(&tx, &id, draft).map_err(store_write)?;
        let digest = self
            .objects
            .write(&bytes, OBJECT_EXT)
            .map_err(store_write)?;
        tx.commit().map_err(|e| store_write(from_rusqlite(e)))?;

        debug_assert_eq!(digest, id.as_str());
        tracing::debug!(snapshot_id = %id, parents = draft.parent_ids.len(), "Stored snapshot");
        Ok(id)
    }
}

impl RefStore for Repository {
    fn head(&self) -> ExResult<RefTarget> {
        match self.read_ref_row(HEAD)? {
            Some((Some(target), _)) => Ok(RefTarget::Direct(parse_stored_id(&target)?)),
            Some((None, Some(symbolic))) => Ok(RefTarget::Symbolic(symbolic)),
            _ => Err(RewordError::RefNotFound {
                ref_name: HEAD.to_string(),
            }
            .into()),
        }
    }

    fn read_ref(&self, name: &str) -> ExResult<Option<SnapshotId>> {
        let name = qualify_branch(name);
        match self.read_ref_row(&name)? {
            Some((Some(target), _)) => Ok(Some(parse_stored_id(&target)?)),
            Some((None, Some(symbolic))) if symbolic != name => {
                match self.read_ref_row(&symbolic)? {
                    Some((Some(target), _)) => Ok(Some(parse_stored_id(&target)?)),
                    _ => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }

    fn update_ref(&mut self, update: &RefUpdate) -> ExResult<()> {
        let name = qualify_branch(&update.ref_name);
        if !self.objects.contains(update.new_target.as_str(), OBJECT_EXT) {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("update_ref")
                .with_ref_name(name)
                .with_snapshot_id(update.new_target.as_str())
                .with_message("Reference target does not exist"));
        }

        let now = Utc::now().timestamp();
        let tx = self.conn.transaction().map_err(from_rusqlite)?;

        let actual: Option<String> = tx
            .query_row("SELECT target_id FROM refs WHERE name = ?1", [&name], |row| {
                row.get::<_, Option<String>>(0)
            })
            .optional()
            .map_err(from_rusqlite)?
            .flatten();
        let expected = update.expected_old.as_ref().map(|id| id.as_str().to_string());
        if actual != expected {
            return Err(RewordError::RefMoved {
                ref_name: name,
                expected,
                actual,
            }
            .into());
        }

        tx.execute(
            "INSERT INTO refs (name, target_id, symbolic_target, updated_at)
             VALUES (?1, ?2, NULL, ?3)
             ON CONFLICT(name) DO UPDATE SET
                target_id = excluded.target_id,
                symbolic_target = NULL,
                updated_at = excluded.updated_at",
            rusqlite::params![name, update.new_target.as_str(), now],
        )
        .map_err(from_rusqlite)?;

        for entry in update.reflog_entries() {
            tx.execute(
                "INSERT INTO reflog
                    (ref_name, old_id, new_id, identity_name, identity_email, logged_at, message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    qualify_branch(&entry.ref_name),
                    entry.old_target.as_ref().map(|id| id.as_str().to_string()),
                    entry.new_target.as_str(),
                    entry.identity.name,
                    entry.identity.email,
                    entry.identity.when.timestamp(),
                    entry.message,
                ],
            )
            .map_err(from_rusqlite)?;
        }

        tx.commit().map_err(from_rusqlite)?;
        tracing::debug!(ref_name = %name, snapshot_id = %update.new_target, "Updated reference");
        Ok(())
    }

    fn reflog(&self, name: &str) -> ExResult<Vec<ReflogEntry>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT ref_name, old_id, new_id, identity_name, identity_email, logged_at, message
                 FROM reflog WHERE ref_name = ?1 ORDER BY id",
            )
            .map_err(from_rusqlite)?;
        type Row = (String, Option<String>, String, String, String, i64, String);
        let rows = stmt
            .query_map([qualify_branch(name)], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<Row>, _>>()
            .map_err(from_rusqlite)?;

        rows.into_iter()
            .map(|(ref_name, old_id, new_id, who, email, logged_at, message)| -> ExResult<ReflogEntry> {
                let when = Utc.timestamp_opt(logged_at, 0).single().ok_or_else(|| {
                    ExError::new(ExErrorKind::CorruptObject)
                        .with_op("reflog")
                        .with_message(format!("Invalid reflog timestamp {}", logged_at))
                })?;
                Ok(ReflogEntry {
                    ref_name,
                    old_target: old_id.as_deref().map(parse_stored_id).transpose()?,
                    new_target: parse_stored_id(&new_id)?,
                    identity: Signature::new(who, email, when),
                    message,
                })
            })
            .collect()
    }
}
