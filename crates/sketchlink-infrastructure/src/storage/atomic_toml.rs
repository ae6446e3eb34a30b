//! Atomic TOML file operations.
//!
//! Record files are rewritten in place while the editor may be saving again,
//! so every write goes through a temp file + fsync + rename, and
//! read-modify-write cycles hold an exclusive lock file.

use serde::{Serialize, de::DeserializeOwned};
use sketchlink_core::error::{BridgeError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A handle to a TOML file with atomic replace semantics.
///
/// Provides:
/// - **Atomicity**: Updates are all-or-nothing via tmp file + atomic rename
/// - **Isolation**: `update` holds an exclusive lock for its read-modify-write
/// - **Durability**: Explicit fsync before rename
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a new atomic TOML file handle.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    /// Loads the TOML file and deserializes it.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let data: T = toml::from_str(&content)?;
        Ok(Some(data))
    }

    /// Saves data to the TOML file atomically.
    pub fn save(&self, data: &T) -> Result<()> {
        let toml_string = toml::to_string_pretty(data)?;
        write_bytes_atomic(&self.path, toml_string.as_bytes())
    }

    /// Performs a locked read-modify-write.
    ///
    /// `f` receives the current value (`None` when the file is missing) and
    /// returns the value to store. Returning an error aborts without writing.
    pub fn update<F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(Option<T>) -> Result<T>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let current = self.load()?;
        let updated = f(current)?;
        self.save(&updated)?;

        Ok(updated)
    }
}

/// Writes `bytes` to `path` through a sibling temp file and a rename.
///
/// Creates the parent directory when needed.
pub fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path_for(path)?;
    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(bytes)?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let parent = path
        .parent()
        .ok_or_else(|| BridgeError::io(format!("Path has no parent directory: {}", path.display())))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| BridgeError::io(format!("Path has no file name: {}", path.display())))?;

    Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
}

/// A file lock guard that releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| BridgeError::data_access(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock happens when the handle closes; the lock file itself is best effort
        let _ = fs::remove_file(&self.lock_path);
    }
}
