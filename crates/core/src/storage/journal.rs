use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::config::CHANGE_LOG_VERSION;
use crate::errors::CoreError;
use crate::models::change::ChangeEntry;

const VERSION_KEY: &str = "version";

/// The whole change log file: a schema version plus one journal per target
/// file identity (`""` is the unsaved new document).
///
/// Journals are kept as raw JSON until asked for, so a damaged journal for
/// one file does not affect the others.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalDocument {
    /// `None` when the file predates versioning.
    pub version: Option<String>,
    journals: Map<String, Value>,
}

impl Default for JournalDocument {
    fn default() -> Self {
        Self {
            version: Some(CHANGE_LOG_VERSION.to_string()),
            journals: Map::new(),
        }
    }
}

impl JournalDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let root: Value = serde_json::from_slice(bytes)?;
        let Value::Object(mut journals) = root else {
            return Err(CoreError::InvalidFileFormat(
                "Change log root must be an object".into(),
            ));
        };
        let version = match journals.remove(VERSION_KEY) {
            None => None,
            Some(Value::String(v)) => Some(v),
            Some(other) => {
                return Err(CoreError::InvalidFileFormat(format!(
                    "Change log version must be a string, got {other}"
                )))
            }
        };
        Ok(Self { version, journals })
    }

    pub fn to_vec_pretty(&self) -> Result<Vec<u8>, CoreError> {
        let mut root = self.journals.clone();
        root.insert(
            VERSION_KEY.to_string(),
            Value::String(self.version.clone().unwrap_or_else(|| CHANGE_LOG_VERSION.to_string())),
        );
        serde_json::to_vec_pretty(&Value::Object(root))
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize change log: {e}")))
    }

    pub fn is_current_version(&self) -> bool {
        self.version.as_deref().map_or(true, |v| v == CHANGE_LOG_VERSION)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.journals.contains_key(identity)
    }

    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.journals.keys().map(String::as_str)
    }

    /// Decode the journal for `identity`. `None` if there is none.
    pub fn entries(&self, identity: &str) -> Option<Result<Vec<ChangeEntry>, CoreError>> {
        self.journals.get(identity).map(|raw| {
            serde_json::from_value(raw.clone()).map_err(|e| {
                CoreError::Deserialization(format!("Malformed change log for '{identity}': {e}"))
            })
        })
    }

    pub fn set_entries(&mut self, identity: &str, entries: &[ChangeEntry]) -> Result<(), CoreError> {
        let raw = serde_json::to_value(entries)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize change log: {e}")))?;
        self.journals.insert(identity.to_string(), raw);
        Ok(())
    }
}

/// Result of reading the backing store.
#[derive(Debug)]
pub enum JournalRead {
    /// Nothing stored yet.
    Missing,
    /// Present but could not be read or parsed.
    Unreadable(String),
    Found(JournalDocument),
}

/// Persistence seam for the change log.
pub trait JournalStore {
    /// Read the whole document. Never fails: problems are reported as
    /// [`JournalRead::Missing`] or [`JournalRead::Unreadable`].
    fn read_all(&self) -> JournalRead;

    /// Replace the whole document.
    fn write_all(&self, document: &JournalDocument) -> Result<(), CoreError>;

    /// Store one identity's journal, keeping every other identity's.
    /// A missing or unreadable document is replaced by a fresh one.
    fn write_journal(&self, identity: &str, entries: &[ChangeEntry]) -> Result<(), CoreError> {
        let mut document = match self.read_all() {
            JournalRead::Found(doc) => doc,
            JournalRead::Missing | JournalRead::Unreadable(_) => JournalDocument::new(),
        };
        document.set_entries(identity, entries)?;
        self.write_all(&document)
    }
}

/// Change log kept in a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileJournalStore {
    path: PathBuf,
}

impl FileJournalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JournalStore for FileJournalStore {
    fn read_all(&self) -> JournalRead {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return JournalRead::Missing,
            Err(e) => return JournalRead::Unreadable(e.to_string()),
        };
        match JournalDocument::from_slice(&bytes) {
            Ok(doc) => JournalRead::Found(doc),
            Err(e) => JournalRead::Unreadable(e.to_string()),
        }
    }

    fn write_all(&self, document: &JournalDocument) -> Result<(), CoreError> {
        let bytes = document.to_vec_pretty()?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}

/// Change log kept in memory. Clones share the same contents, so a caller
/// can keep a handle after giving one to a [`ChangeLog`](crate::services::change_log::ChangeLog).
#[derive(Debug, Clone, Default)]
pub struct MemoryJournalStore {
    contents: Rc<RefCell<Option<Vec<u8>>>>,
}

impl MemoryJournalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw bytes, as if read from a file.
    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: Rc::new(RefCell::new(Some(bytes.into()))),
        }
    }

    /// Raw bytes of the last write.
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents.borrow().clone()
    }
}

impl JournalStore for MemoryJournalStore {
    fn read_all(&self) -> JournalRead {
        match self.contents.borrow().as_deref() {
            None => JournalRead::Missing,
            Some(bytes) => match JournalDocument::from_slice(bytes) {
                Ok(doc) => JournalRead::Found(doc),
                Err(e) => JournalRead::Unreadable(e.to_string()),
            },
        }
    }

    fn write_all(&self, document: &JournalDocument) -> Result<(), CoreError> {
        let bytes = document.to_vec_pretty()?;
        *self.contents.borrow_mut() = Some(bytes);
        Ok(())
    }
}
