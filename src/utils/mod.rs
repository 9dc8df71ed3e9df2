// Utility functions

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Directory holding one JSON file per session under a data dir.
#[inline]
pub fn sessions_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("sessions")
}

/// Path of a single session's JSON file.
#[inline]
pub fn session_file(data_dir: &Path, session_id: &str) -> PathBuf {
    sessions_dir(data_dir).join(format!("{}.json", session_id))
}

/// Acquire a mutex lock, recovering from poisoning by returning the guard.
/// The protected state may be inconsistent, so use with caution.
pub fn lock_mutex_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Mutex was poisoned, recovering: {}", poisoned);
            poisoned.into_inner()
        }
    }
}

/// Read-lock counterpart of [`lock_mutex_recover`].
pub fn read_lock_recover<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("RwLock was poisoned, recovering read guard: {}", poisoned);
            poisoned.into_inner()
        }
    }
}

/// Write-lock counterpart of [`lock_mutex_recover`].
pub fn write_lock_recover<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("RwLock was poisoned, recovering write guard: {}", poisoned);
            poisoned.into_inner()
        }
    }
}
