//! File-backed development backend.
//!
//! Items live in a single JSON document. Every call reads the document,
//! applies one operation and, for writes, replaces the file atomically:
//!
//! 1. Write the new document to a temporary file in the same directory
//! 2. `fsync` the temporary file
//! 3. Rename the temporary file over the document
//! 4. `fsync` the parent directory so the rename is durable
//!
//! Readers therefore always observe either the old or the new document.
//!
//! Payloads are stored base64-encoded but NOT encrypted. Use this backend only
//! on development hosts that have no platform keychain.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::{status, Outcome, SecureStorageBackend};
use crate::accessibility::Accessibility;
use crate::identity::{ItemDescriptor, StoreIdentity};

const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    version: u32,
    items: Vec<Record>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Record {
    account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_group: Option<String>,
    key: String,
    accessibility: Accessibility,
    data: String,
}

impl Record {
    fn matches_identity(&self, identity: &StoreIdentity) -> bool {
        self.account == identity.account() && self.access_group.as_deref() == identity.access_group()
    }

    fn matches(&self, item: &ItemDescriptor) -> bool {
        self.matches_identity(item.identity()) && self.key == item.key()
    }
}

/// JSON-file implementation of [`SecureStorageBackend`].
///
/// Calls from the same process are serialized by an internal mutex. Separate
/// processes sharing one file are not coordinated.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileBackend {
    /// Opens (or prepares) the document at `path`.
    ///
    /// The parent directory is created if needed; the document itself is
    /// created on the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn new<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path,
            guard: Mutex::new(()),
        })
    }

    /// Returns the path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "store".into(), |name| name.to_string_lossy().into_owned());
        self.path.with_file_name(format!(".{name}.tmp"))
    }

    fn load(&self) -> Result<Document, i32> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Document::default()),
            Err(err) => {
                log::warn!("failed to read {}: {err}", self.path.display());
                return Err(status::INTERNAL_COMPONENT);
            }
        };
        let document: Document = serde_json::from_slice(&bytes).map_err(|err| {
            log::warn!("malformed store document {}: {err}", self.path.display());
            status::DECODE
        })?;
        if document.version != DOCUMENT_VERSION {
            log::warn!(
                "unsupported store document version {} in {}",
                document.version,
                self.path.display()
            );
            return Err(status::DECODE);
        }
        Ok(document)
    }

    fn save(&self, document: &Document) -> Result<(), i32> {
        self.write_atomic(document).map_err(|err| {
            log::warn!("failed to write {}: {err}", self.path.display());
            status::INTERNAL_COMPONENT
        })
    }

    fn write_atomic(&self, document: &Document) -> io::Result<()> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let temp_path = self.temp_path();
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        self.sync_directory()
    }

    #[cfg(unix)]
    fn sync_directory(&self) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        File::open(dir)?.sync_all()
    }

    // Directories cannot be opened as files on Windows; the rename is the
    // durability point there.
    #[cfg(not(unix))]
    #[allow(clippy::unused_self, clippy::unnecessary_wraps)]
    fn sync_directory(&self) -> io::Result<()> {
        Ok(())
    }

    /// Runs `op` against the loaded document while holding the in-process lock.
    fn with_document<T>(
        &self,
        op: impl FnOnce(&mut Document) -> (Outcome<T>, bool),
    ) -> Outcome<T> {
        let Ok(_guard) = self.guard.lock() else {
            return Outcome::Failure(status::INTERNAL_COMPONENT);
        };
        let mut document = match self.load() {
            Ok(document) => document,
            Err(code) => return Outcome::Failure(code),
        };
        let (outcome, dirty) = op(&mut document);
        if dirty {
            if let Err(code) = self.save(&document) {
                return Outcome::Failure(code);
            }
        }
        outcome
    }
}

impl SecureStorageBackend for FileBackend {
    fn fetch(&self, item: &ItemDescriptor) -> Outcome<Vec<u8>> {
        self.with_document(|document| {
            let outcome = match document.items.iter().find(|record| record.matches(item)) {
                Some(record) => STANDARD
                    .decode(&record.data)
                    .map_or(Outcome::Failure(status::DECODE), Outcome::Success),
                None => Outcome::NotFound,
            };
            (outcome, false)
        })
    }

    fn add(&self, item: &ItemDescriptor, data: &[u8], accessibility: Accessibility) -> Outcome {
        self.with_document(|document| {
            if document.items.iter().any(|record| record.matches(item)) {
                return (Outcome::Duplicate, false);
            }
            document.items.push(Record {
                account: item.account().to_string(),
                access_group: item.access_group().map(str::to_string),
                key: item.key().to_string(),
                accessibility,
                data: STANDARD.encode(data),
            });
            (Outcome::Success(()), true)
        })
    }

    fn update(&self, item: &ItemDescriptor, data: &[u8]) -> Outcome {
        self.with_document(|document| {
            match document.items.iter_mut().find(|record| record.matches(item)) {
                Some(record) => {
                    record.data = STANDARD.encode(data);
                    (Outcome::Success(()), true)
                }
                None => (Outcome::NotFound, false),
            }
        })
    }

    fn delete(&self, item: &ItemDescriptor) -> Outcome {
        self.with_document(|document| {
            let before = document.items.len();
            document.items.retain(|record| !record.matches(item));
            if document.items.len() == before {
                (Outcome::NotFound, false)
            } else {
                (Outcome::Success(()), true)
            }
        })
    }

    fn enumerate(&self, identity: &StoreIdentity) -> Outcome<Vec<String>> {
        self.with_document(|document| {
            let keys: Vec<String> = document
                .items
                .iter()
                .filter(|record| record.matches_identity(identity))
                .map(|record| record.key.clone())
                .collect();
            if keys.is_empty() {
                (Outcome::NotFound, false)
            } else {
                (Outcome::Success(keys), false)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> StoreIdentity {
        StoreIdentity::new("alice", None).expect("identity")
    }

    #[test]
    fn test_missing_document_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FileBackend::new(dir.path().join("store.json")).expect("backend");

        assert_eq!(backend.fetch(&identity().descriptor("card")), Outcome::NotFound);
        assert_eq!(backend.enumerate(&identity()), Outcome::NotFound);
        assert!(!backend.path().exists());
    }

    #[test]
    fn test_write_is_synced_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FileBackend::new(dir.path().join("store.json")).expect("backend");
        let item = identity().descriptor("card");

        assert!(backend.add(&item, b"4111", Accessibility::Always).is_success());
        assert!(backend.update(&item, b"4222").is_success());

        assert!(!backend.temp_path().exists());
        backend.sync_directory().expect("sync parent directory");

        // A bare file name syncs the working directory.
        let bare = FileBackend::new("store.json").expect("backend");
        bare.sync_directory().expect("sync working directory");
    }

    #[test]
    fn test_items_persist_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("store.json");
        let item = identity().descriptor("card");

        {
            let backend = FileBackend::new(&path).expect("backend");
            assert!(backend.add(&item, b"4111", Accessibility::Always).is_success());
            assert_eq!(
                backend.add(&item, b"4222", Accessibility::Always),
                Outcome::Duplicate
            );
        }

        let backend = FileBackend::new(&path).expect("backend");
        assert_eq!(backend.fetch(&item), Outcome::Success(b"4111".to_vec()));
        assert!(backend.update(&item, b"4222").is_success());
        assert_eq!(backend.fetch(&item), Outcome::Success(b"4222".to_vec()));
        assert!(backend.delete(&item).is_success());
        assert_eq!(backend.delete(&item), Outcome::NotFound);
    }

    #[test]
    fn test_enumerate_reports_insertion_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FileBackend::new(dir.path().join("store.json")).expect("backend");
        let grouped = StoreIdentity::new("alice", Some("groupA".to_string())).expect("identity");

        for key in ["zeta", "alpha", "mid"] {
            backend.add(&identity().descriptor(key), b"", Accessibility::default());
        }
        backend.add(&grouped.descriptor("other"), b"", Accessibility::default());

        assert_eq!(
            backend.enumerate(&identity()),
            Outcome::Success(vec!["zeta".into(), "alpha".into(), "mid".into()])
        );
        assert_eq!(backend.enumerate(&grouped), Outcome::Success(vec!["other".into()]));
    }

    #[test]
    fn test_corrupted_document_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.json");
        fs::write(&path, b"not json").expect("write");
        let backend = FileBackend::new(&path).expect("backend");

        assert_eq!(
            backend.fetch(&identity().descriptor("card")),
            Outcome::Failure(status::DECODE)
        );
    }
}
