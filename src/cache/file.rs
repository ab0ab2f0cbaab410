//! Cache persisted as one JSON file per key.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;

use super::{CacheError, CacheStore};

/// Survives process restarts; entries are rewritten atomically.
#[derive(Debug, Clone)]
pub struct FileCache {
    directory: PathBuf,
}

impl FileCache {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.directory.join(format!("{file_name}.json"))
    }

    fn io_error(key: &str, source: std::io::Error) -> CacheError {
        CacheError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl CacheStore for FileCache {
    fn get(&self, key: &str) -> Option<Value> {
        let path = self.path_for(key);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to open cache file");
                return None;
            }
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(value) => Some(value),
            Err(e) => {
                // unreadable entries count as misses and get regenerated
                tracing::warn!(key, path = %path.display(), error = %e, "Ignoring corrupt cache file");
                None
            }
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<(), CacheError> {
        fs::create_dir_all(&self.directory).map_err(|e| Self::io_error(key, e))?;

        let path = self.path_for(key);
        // one temp file per write, so concurrent writers of a key never share it
        let mut tmp = NamedTempFile::new_in(&self.directory).map_err(|e| Self::io_error(key, e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut writer, &value).map_err(|source| CacheError::Serialize {
                key: key.to_string(),
                source,
            })?;
            writer.flush().map_err(|e| Self::io_error(key, e))?;
        }
        tmp.persist(&path).map_err(|e| Self::io_error(key, e.error))?;

        tracing::debug!(key, path = %path.display(), "Cache entry saved");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn clear(&self) -> Result<(), CacheError> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Self::io_error("*", e)),
        };

        for entry in entries {
            let path = entry.map_err(|e| Self::io_error("*", e))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path).map_err(|e| Self::io_error("*", e))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entries_survive_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("admin"));
        assert!(cache.get("admin.routes.name_to_attributes").is_none());

        cache
            .set("admin.routes.name_to_attributes", json!({ "admin": { "dashboardControllerFqcn": "App\\Dash" } }))
            .unwrap();

        let reopened = FileCache::new(dir.path().join("admin"));
        assert_eq!(
            reopened.get("admin.routes.name_to_attributes").unwrap()["admin"]["dashboardControllerFqcn"],
            "App\\Dash"
        );
    }

    #[test]
    fn test_delete_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());

        cache.set("a", json!(1)).unwrap();
        cache.set("b/c", json!(2)).unwrap();
        assert_eq!(cache.get("b/c"), Some(json!(2)));

        cache.delete("a").unwrap();
        cache.delete("a").unwrap();
        assert!(cache.get("a").is_none());

        cache.clear().unwrap();
        assert!(cache.get("b/c").is_none());
    }

    #[test]
    fn test_concurrent_writers_of_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());

        std::thread::scope(|scope| {
            let writers: Vec<_> = (0..4)
                .map(|writer| {
                    let cache = &cache;
                    scope.spawn(move || {
                        (0..200)
                            .filter(|round| {
                                cache
                                    .set("admin.routes.name_to_attributes", json!({ "writer": writer, "round": round }))
                                    .is_err()
                            })
                            .count()
                    })
                })
                .collect();
            let failures: usize = writers.into_iter().map(|w| w.join().unwrap()).sum();
            assert_eq!(failures, 0);
        });

        assert!(cache.get("admin.routes.name_to_attributes").unwrap()["round"].is_number());
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "only the entry itself remains");
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        fs::write(dir.path().join("routes.json"), b"{ not json").unwrap();

        assert!(cache.get("routes").is_none());
    }
}
