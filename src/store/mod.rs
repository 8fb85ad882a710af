//! Two-tier snapshot store: in-memory fast path plus a durable disk copy.
//!
//! The memory tier is authoritative while the process is alive. The disk tier
//! survives restarts and is read synchronously before the server accepts
//! requests, so a cold boot never serves empty unless no snapshot was ever
//! written. Disk is overwritten only after a successful full fetch; a failed
//! refresh leaves both tiers untouched and the store keeps serving last-good
//! data, degrading to staleness rather than emptiness.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{error, info, warn};

use crate::models::Snapshot;

/// File name of the durable snapshot inside the data directory.
pub const SNAPSHOT_FILE: &str = "listings.json";

/// Shared snapshot store.
#[derive(Clone)]
pub struct SnapshotStore {
    inner: Arc<Inner>,
}

struct Inner {
    snapshot: RwLock<Snapshot>,
    refreshing: AtomicBool,
    data_dir: PathBuf,
}

/// Clears the refresh-in-progress flag when dropped, so an aborted refresh
/// cannot wedge the store.
pub struct RefreshGuard {
    inner: Arc<Inner>,
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.inner.refreshing.store(false, Ordering::SeqCst);
    }
}

impl SnapshotStore {
    /// Create a store rooted at `data_dir` with an empty memory tier.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                snapshot: RwLock::new(Snapshot::empty()),
                refreshing: AtomicBool::new(false),
                data_dir: data_dir.into(),
            }),
        }
    }

    /// Current snapshot (clone of the memory tier).
    pub fn current(&self) -> Snapshot {
        self.inner.snapshot.read().clone()
    }

    /// Load the disk tier into memory if the memory tier is still empty.
    ///
    /// Returns the number of listings primed. Malformed or missing disk state
    /// is a cache miss, never fatal.
    pub fn prime_from_disk(&self) -> usize {
        if !self.current().is_empty() {
            return 0;
        }
        let disk = self.read_disk();
        if disk.is_empty() {
            return 0;
        }
        let count = disk.count;
        *self.inner.snapshot.write() = disk;
        info!(count, "primed snapshot from disk cache");
        count
    }

    /// Publish a freshly fetched snapshot: the disk write completes (or fails
    /// loggably) before the memory tier is replaced.
    pub fn commit(&self, snapshot: Snapshot) {
        if let Err(err) = self.write_disk(&snapshot) {
            error!(error = %err, "failed to write snapshot to disk");
        }
        *self.inner.snapshot.write() = snapshot;
    }

    /// Claim the refresh-in-progress flag.
    ///
    /// Returns `None` when a refresh is already in flight; the caller treats
    /// that as a no-op rather than queueing or erroring.
    pub fn try_begin_refresh(&self) -> Option<RefreshGuard> {
        if self
            .inner
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Some(RefreshGuard {
                inner: Arc::clone(&self.inner),
            })
        } else {
            None
        }
    }

    /// Whether a refresh currently holds the flag.
    pub fn is_refreshing(&self) -> bool {
        self.inner.refreshing.load(Ordering::SeqCst)
    }

    /// Read the best available disk snapshot.
    ///
    /// Tries the configured data directory first, then the conventional mount
    /// and local fallbacks, accepting the first file that parses to a
    /// non-empty snapshot.
    fn read_disk(&self) -> Snapshot {
        for path in self.disk_candidates() {
            match read_snapshot_file(&path) {
                Some(snapshot) if !snapshot.is_empty() => return snapshot,
                _ => continue,
            }
        }
        Snapshot::empty()
    }

    fn write_disk(&self, snapshot: &Snapshot) -> std::io::Result<()> {
        fs::create_dir_all(&self.inner.data_dir)?;
        let path = self.inner.data_dir.join(SNAPSHOT_FILE);
        let body = serde_json::to_vec_pretty(snapshot)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        fs::write(&path, body)?;
        info!(path = %path.display(), count = snapshot.count, "snapshot written to disk");
        Ok(())
    }

    fn disk_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = vec![self.inner.data_dir.join(SNAPSHOT_FILE)];
        for fallback in [
            PathBuf::from("/data").join(SNAPSHOT_FILE),
            PathBuf::from("data").join(SNAPSHOT_FILE),
        ] {
            if !candidates.contains(&fallback) {
                candidates.push(fallback);
            }
        }
        candidates
    }
}

fn read_snapshot_file(path: &Path) -> Option<Snapshot> {
    if !path.exists() {
        return None;
    }
    let body = match fs::read(path) {
        Ok(body) => body,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read disk snapshot");
            return None;
        }
    };
    match serde_json::from_slice::<Snapshot>(&body) {
        Ok(snapshot) => Some(snapshot.normalized()),
        Err(err) => {
            // Malformed cache is a miss, not a fatal condition
            warn!(path = %path.display(), error = %err, "disk snapshot is malformed, ignoring");
            None
        }
    }
}
