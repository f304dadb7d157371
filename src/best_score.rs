use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::app_dirs::AppDirs;

/// Persistent home of the all-time best score
pub trait BestScoreStore {
    /// Stored value, or 0 when missing or unreadable
    fn read(&self) -> u32;
    fn write(&mut self, score: u32) -> io::Result<()>;
}

impl<T: BestScoreStore + ?Sized> BestScoreStore for Box<T> {
    fn read(&self) -> u32 {
        (**self).read()
    }

    fn write(&mut self, score: u32) -> io::Result<()> {
        (**self).write(score)
    }
}

/// Best score kept as a bare JSON integer on disk
#[derive(Debug, Clone)]
pub struct FileBestScoreStore {
    path: PathBuf,
}

impl FileBestScoreStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::best_score_path()
                .unwrap_or_else(|| PathBuf::from("neon_click_best.json")),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileBestScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BestScoreStore for FileBestScoreStore {
    fn read(&self) -> u32 {
        fs::read(&self.path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<u32>(&bytes).ok())
            .unwrap_or(0)
    }

    fn write(&mut self, score: u32) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_vec(&score)?;
        fs::write(&self.path, data)
    }
}

/// In-memory store that remembers every write
#[derive(Debug, Clone, Default)]
pub struct MemoryBestScoreStore {
    inner: Rc<RefCell<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    value: u32,
    writes: Vec<u32>,
}

impl MemoryBestScoreStore {
    pub fn new(initial: u32) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryInner {
                value: initial,
                writes: Vec::new(),
            })),
        }
    }

    /// Values written so far, oldest first. Clones share the log.
    pub fn writes(&self) -> Vec<u32> {
        self.inner.borrow().writes.clone()
    }
}

impl BestScoreStore for MemoryBestScoreStore {
    fn read(&self) -> u32 {
        self.inner.borrow().value
    }

    fn write(&mut self, score: u32) -> io::Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.value = score;
        inner.writes.push(score);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_zero() {
        let dir = tempdir().unwrap();
        let store = FileBestScoreStore::with_path(dir.path().join("best.json"));
        assert_eq!(store.read(), 0);
    }

    #[test]
    fn write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("best.json");
        let mut store = FileBestScoreStore::with_path(&path);
        store.write(42).unwrap();

        assert_eq!(store.read(), 42);
        assert_eq!(fs::read_to_string(&path).unwrap(), "42");
    }

    #[test]
    fn corrupt_file_reads_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("best.json");
        fs::write(&path, "not a number").unwrap();
        assert_eq!(FileBestScoreStore::with_path(&path).read(), 0);

        fs::write(&path, "-3").unwrap();
        assert_eq!(FileBestScoreStore::with_path(&path).read(), 0);
    }

    #[test]
    fn memory_store_logs_writes_across_clones() {
        let store = MemoryBestScoreStore::new(5);
        let mut handle = store.clone();
        assert_eq!(handle.read(), 5);

        handle.write(9).unwrap();
        assert_eq!(store.read(), 9);
        assert_eq!(store.writes(), vec![9]);
    }
}
