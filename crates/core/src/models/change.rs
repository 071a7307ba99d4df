use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

use super::trade::TradeRecord;

/// Kind tag of a journal entry, as written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Add,
    Edit,
    Delete,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeType::Add => write!(f, "Add"),
            ChangeType::Edit => write!(f, "Edit"),
            ChangeType::Delete => write!(f, "Delete"),
        }
    }
}

/// One user edit against the trade history.
///
/// Each variant carries exactly the records it needs: an edit keeps both
/// sides (sharing one id), a delete keeps the removed record so the entry
/// can be shown and redone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Add { new: TradeRecord },
    Edit { original: TradeRecord, new: TradeRecord },
    Delete { original: TradeRecord },
}

impl Change {
    pub fn add(new: TradeRecord) -> Self {
        Change::Add { new }
    }

    /// Build an edit. Both records must carry the same id.
    pub fn edit(original: TradeRecord, new: TradeRecord) -> Result<Self, CoreError> {
        if original.id != new.id {
            return Err(CoreError::InvalidChange(format!(
                "edit must keep the trade id ({} != {})",
                original.id, new.id
            )));
        }
        Ok(Change::Edit { original, new })
    }

    pub fn delete(original: TradeRecord) -> Self {
        Change::Delete { original }
    }

    pub fn change_type(&self) -> ChangeType {
        match self {
            Change::Add { .. } => ChangeType::Add,
            Change::Edit { .. } => ChangeType::Edit,
            Change::Delete { .. } => ChangeType::Delete,
        }
    }

    /// Id of the trade this change touches.
    pub fn trade_id(&self) -> Uuid {
        match self {
            Change::Add { new } => new.id,
            Change::Edit { original, .. } | Change::Delete { original } => original.id,
        }
    }

    pub fn original_data(&self) -> Option<&TradeRecord> {
        match self {
            Change::Add { .. } => None,
            Change::Edit { original, .. } | Change::Delete { original } => Some(original),
        }
    }

    pub fn new_data(&self) -> Option<&TradeRecord> {
        match self {
            Change::Add { new } | Change::Edit { new, .. } => Some(new),
            Change::Delete { .. } => None,
        }
    }

    /// The change that reverts this one.
    pub fn inverse(&self) -> Change {
        match self {
            Change::Add { new } => Change::Delete {
                original: new.clone(),
            },
            Change::Edit { original, new } => Change::Edit {
                original: new.clone(),
                new: original.clone(),
            },
            Change::Delete { original } => Change::Add {
                new: original.clone(),
            },
        }
    }

    /// Apply this change to a working trade list.
    ///
    /// Records are cloned out of the change, never shared. An edit whose id
    /// is not in `trades` does nothing; a delete removes every record with
    /// the id.
    pub fn fold_into(&self, trades: &mut Vec<TradeRecord>) {
        match self {
            Change::Add { new } => trades.push(new.clone()),
            Change::Edit { original, new } => {
                if let Some(slot) = trades.iter_mut().find(|t| t.id == original.id) {
                    *slot = new.clone();
                }
            }
            Change::Delete { original } => trades.retain(|t| t.id != original.id),
        }
    }
}

/// Logical state of a journal entry, derived from `(applied, undone)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeState {
    /// Not yet committed by a save; folded into every projection.
    Pending,
    /// Committed by a save and still in effect; kept for undo.
    Active,
    /// Was active, then undone; unapplied lazily on the next projection.
    Undone,
    /// Not applied and undone; inert until purged or redone.
    Discarded,
}

/// A change plus its journal bookkeeping flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChangeEntryRow", into = "ChangeEntryRow")]
pub struct ChangeEntry {
    pub change: Change,
    pub applied: bool,
    pub undone: bool,
}

impl ChangeEntry {
    /// A fresh pending entry.
    pub fn pending(change: Change) -> Self {
        Self {
            change,
            applied: false,
            undone: false,
        }
    }

    pub fn state(&self) -> ChangeState {
        match (self.applied, self.undone) {
            (false, false) => ChangeState::Pending,
            (true, false) => ChangeState::Active,
            (true, true) => ChangeState::Undone,
            (false, true) => ChangeState::Discarded,
        }
    }

    pub fn change_type(&self) -> ChangeType {
        self.change.change_type()
    }

    pub fn original_data(&self) -> Option<&TradeRecord> {
        self.change.original_data()
    }

    pub fn new_data(&self) -> Option<&TradeRecord> {
        self.change.new_data()
    }

    /// One-line description for undo/redo confirmation prompts.
    pub fn summary(&self) -> String {
        match &self.change {
            Change::Add { new } => format!("Add: {new}"),
            Change::Edit { original, new } => format!("Edit: {original} -> {new}"),
            Change::Delete { original } => format!("Delete: {original}"),
        }
    }
}

/// On-disk shape of a journal entry.
#[derive(Serialize, Deserialize)]
struct ChangeEntryRow {
    change_type: ChangeType,
    original_data: Option<TradeRecord>,
    new_data: Option<TradeRecord>,
    #[serde(default)]
    applied: bool,
    #[serde(default)]
    undone: bool,
}

impl TryFrom<ChangeEntryRow> for ChangeEntry {
    type Error = CoreError;

    fn try_from(row: ChangeEntryRow) -> Result<Self, Self::Error> {
        let change = match (row.change_type, row.original_data, row.new_data) {
            (ChangeType::Add, _, Some(new)) => Change::add(new),
            (ChangeType::Edit, Some(original), Some(new)) => Change::edit(original, new)?,
            (ChangeType::Delete, Some(original), _) => Change::delete(original),
            (kind, _, _) => {
                return Err(CoreError::InvalidChange(format!(
                    "'{kind}' entry is missing its trade data"
                )))
            }
        };
        Ok(Self {
            change,
            applied: row.applied,
            undone: row.undone,
        })
    }
}

impl From<ChangeEntry> for ChangeEntryRow {
    fn from(entry: ChangeEntry) -> Self {
        let change_type = entry.change.change_type();
        let (original_data, new_data) = match entry.change {
            Change::Add { new } => (None, Some(new)),
            Change::Edit { original, new } => (Some(original), Some(new)),
            Change::Delete { original } => (Some(original), None),
        };
        Self {
            change_type,
            original_data,
            new_data,
            applied: entry.applied,
            undone: entry.undone,
        }
    }
}
