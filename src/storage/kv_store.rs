use std::{
    cell::RefCell,
    collections::HashMap,
    fs::File,
    io::{ErrorKind, Read, Seek, Write},
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::Result;
use fs4::fs_std::FileExt;
use tracing::{debug, trace};

/// Interface for abstracting storage of values. Mirrors a browser's local storage: synchronous,
/// string keys, string values.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: Deref> KeyValueStore for T
where
    T::Target: KeyValueStore,
{
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.deref().get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.deref().set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.deref().remove(key)
    }
}

/// The main realization of [KeyValueStore]. Each key is a file inside `dir`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn read(path: &Path) -> Result<String, std::io::Error> {
        let mut file = File::open(path)?;
        file.lock_shared()?;
        let mut value = String::new();
        let result = file.read_to_string(&mut value);
        FileExt::unlock(&file)?;
        result.map(|_| value)
    }

    fn write(path: &Path, value: &str) -> Result<(), std::io::Error> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        // Semi-safe acquire-release for a file. Truncation waits for the lock so readers never see
        // a half written value from another process.
        file.lock_exclusive()?;
        let result = (|| {
            file.set_len(0)?;
            file.rewind()?;
            file.write_all(value.as_bytes())?;
            file.flush()
        })();
        FileExt::unlock(&file)?;
        result
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        trace!("Reading {path:?}");
        match Self::read(&path) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)?,
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key);
        debug!("Writing {} bytes into {path:?}", value.len());
        Self::write(&path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)?,
        }
    }
}

/// Store that lives only as long as the process. Used for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.borrow_mut().insert(key.into(), value.into());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{FileStore, KeyValueStore, MemoryStore};

    #[test]
    fn file_store_basic() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path().join("state"))?;

        assert_eq!(store.get("quicknotes.v1.notes")?, None);

        store.set("quicknotes.v1.notes", "[1, 2, 3]")?;
        assert_eq!(store.get("quicknotes.v1.notes")?.as_deref(), Some("[1, 2, 3]"));

        store.set("quicknotes.v1.notes", "[]")?;
        assert_eq!(store.get("quicknotes.v1.notes")?.as_deref(), Some("[]"));

        store.remove("quicknotes.v1.notes")?;
        assert_eq!(store.get("quicknotes.v1.notes")?, None);
        store.remove("quicknotes.v1.notes")?;
        Ok(())
    }

    #[test]
    fn file_store_is_shared_between_instances() -> Result<()> {
        let dir = tempdir()?;
        let first = FileStore::new(dir.path().to_owned())?;
        let second = FileStore::new(dir.path().to_owned())?;

        first.set("key", "value")?;
        assert_eq!(second.get("key")?.as_deref(), Some("value"));
        Ok(())
    }

    #[test]
    fn memory_store_through_reference() -> Result<()> {
        let store = MemoryStore::default();
        let by_ref = &store;
        by_ref.set("a", "1")?;
        assert_eq!(store.get("a")?.as_deref(), Some("1"));
        by_ref.remove("a")?;
        assert_eq!(store.get("a")?, None);
        Ok(())
    }
}
