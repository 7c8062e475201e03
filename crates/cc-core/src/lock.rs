use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per project directory. Builds and git operations on the
/// same directory run one at a time; different projects proceed in parallel.
#[derive(Clone, Default)]
pub struct ProjectLocks {
    inner: Arc<Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `dir`. Released when the guard drops.
    ///
    /// Entries nobody holds or waits on are pruned here, so the map only
    /// tracks directories currently in use.
    pub async fn lock(&self, dir: &Path) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.retain(|_, m| Arc::strong_count(m) > 1);
            map.entry(normalize(dir)).or_default().clone()
        };
        mutex.lock_owned().await
    }

    /// Whether `dir` is currently held.
    pub fn is_locked(&self, dir: &Path) -> bool {
        let map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.get(&normalize(dir))
            .is_some_and(|m| m.try_lock().is_err())
    }
}

#[cfg(test)]
impl ProjectLocks {
    fn tracked(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Drop `.` components so `ws/./site` and `ws/site` share a lock.
fn normalize(dir: &Path) -> PathBuf {
    dir.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
