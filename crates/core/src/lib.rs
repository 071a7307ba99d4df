pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use std::path::Path;

use tracing::info;
use uuid::Uuid;

use config::{TrackerConfig, APP_VERSION};
use errors::CoreError;
use models::{
    change::{Change, ChangeEntry},
    position::PositionSummary,
    settings::Settings,
    trade::TradeRecord,
};
use services::{change_log::ChangeLog, position_service::PositionService};
use storage::{
    journal::{FileJournalStore, JournalStore},
    manager::TradeFileManager,
    settings::SettingsStore,
};

/// Window title prefix.
pub const APP_NAME: &str = "Crypto Trades Tracker";

/// What the caller should know right after a document is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOutcome {
    /// The journal holds work that was never saved (e.g. after a crash).
    /// The UI should offer to recover it or call
    /// [`TradesTracker::discard_unapplied_changes`].
    pub has_unapplied_changes: bool,

    /// Saved entries dropped from the journal because the trade file
    /// already contains them.
    pub settled_changes: usize,
}

/// Main entry point for the trades tracker core library.
///
/// One value per open document: it owns the base history loaded from the
/// trade file, the change log layered over it, and the settings. Nothing is
/// global, so independent trackers can coexist.
#[must_use]
pub struct TradesTracker {
    config: TrackerConfig,
    settings: Settings,
    settings_store: SettingsStore,
    /// Target trade file; empty for a document that was never saved.
    file_path: String,
    /// History the journal is replayed onto. Starts as the trade file's
    /// contents and absorbs entries pruned from the journal.
    base_history: Vec<TradeRecord>,
    change_log: ChangeLog,
    position_service: PositionService,
}

impl std::fmt::Debug for TradesTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradesTracker")
            .field("file_path", &self.file_path)
            .field("base_trades", &self.base_history.len())
            .field("change_log", &self.change_log)
            .field("settings", &self.settings)
            .finish()
    }
}

impl TradesTracker {
    /// Create a tracker with an on-disk change log, positioned on a new
    /// unsaved document.
    pub fn new(config: TrackerConfig) -> Result<Self, CoreError> {
        let store = FileJournalStore::new(config.change_log_file.clone());
        Self::with_store(config, Box::new(store))
    }

    /// Like [`new`](Self::new) but with a caller-supplied journal store.
    pub fn with_store(config: TrackerConfig, store: Box<dyn JournalStore>) -> Result<Self, CoreError> {
        let settings_store = SettingsStore::new(config.settings_file.clone());
        let settings = settings_store.load();
        let mut tracker = Self {
            config,
            settings,
            settings_store,
            file_path: String::new(),
            base_history: Vec::new(),
            change_log: ChangeLog::new(store),
            position_service: PositionService::new(),
        };
        tracker.switch_to("", Vec::new())?;
        Ok(tracker)
    }

    // ── Documents ───────────────────────────────────────────────────

    /// Start an empty, unsaved document.
    pub fn new_document(&mut self) -> Result<OpenOutcome, CoreError> {
        let outcome = self.switch_to("", Vec::new())?;
        self.remember_file("")?;
        Ok(outcome)
    }

    /// Open a trade file and its journal.
    pub fn open_file(&mut self, path: &str) -> Result<OpenOutcome, CoreError> {
        let records = TradeFileManager::load_from_file(path)?;
        let outcome = self.switch_to(path, records)?;
        self.remember_file(path)?;
        Ok(outcome)
    }

    /// Reopen the last used file, or the unsaved document if there is none.
    pub fn restore_last_session(&mut self) -> Result<OpenOutcome, CoreError> {
        match self.settings.last_file().map(str::to_owned) {
            Some(path) => self.open_file(&path),
            None => self.switch_to("", Vec::new()),
        }
    }

    /// Save to the current trade file.
    pub fn save(&mut self) -> Result<(), CoreError> {
        if self.file_path.is_empty() {
            return Err(CoreError::NoTargetFile);
        }
        let path = self.file_path.clone();
        self.save_as(&path)
    }

    /// Write the projected history to `path` and commit pending changes.
    ///
    /// The file is written before anything is marked applied, so a failed
    /// write leaves the journal exactly as it was.
    pub fn save_as(&mut self, path: &str) -> Result<(), CoreError> {
        let projected = self.change_log.process(&self.base_history, false)?;
        TradeFileManager::save_to_file(&projected, path)?;

        let projection = self.change_log.project(&self.base_history, true)?;
        for entry in &projection.settled {
            entry.change.fold_into(&mut self.base_history);
        }

        if path != self.file_path {
            self.change_log.rebind(path)?;
            self.file_path = path.to_string();
        }
        self.remember_file(path)?;
        info!(path, trades = projection.history.len(), "Document saved");
        Ok(())
    }

    /// Mark every unsaved change undone (recovery declined, or exit
    /// without saving).
    pub fn discard_unapplied_changes(&mut self) -> Result<(), CoreError> {
        self.change_log.clear_not_applied()
    }

    /// Persist settings before the application exits.
    pub fn close(&mut self) -> Result<(), CoreError> {
        let path = self.file_path.clone();
        self.remember_file(&path)
    }

    // ── Trade Edits ─────────────────────────────────────────────────

    /// Record a new trade. Returns its id.
    pub fn add_trade(&mut self, trade: TradeRecord) -> Result<Uuid, CoreError> {
        let id = trade.id;
        self.change_log.add(Change::add(trade))?;
        Ok(id)
    }

    /// Record several new trades, one journal entry each.
    pub fn add_trades(&mut self, trades: Vec<TradeRecord>) -> Result<Vec<Uuid>, CoreError> {
        let mut ids = Vec::with_capacity(trades.len());
        for trade in trades {
            ids.push(self.add_trade(trade)?);
        }
        Ok(ids)
    }

    /// Replace the trade `id` with `updated` (its id is forced to `id`).
    /// Returns `false`, recording nothing, when no field changed.
    pub fn edit_trade(&mut self, id: Uuid, updated: TradeRecord) -> Result<bool, CoreError> {
        let current = self
            .find_trade(id)?
            .ok_or_else(|| CoreError::TradeNotFound(id.to_string()))?;
        let updated = TradeRecord { id, ..updated };
        if current.same_contents(&updated) {
            return Ok(false);
        }
        self.change_log.add(Change::edit(current, updated)?)?;
        Ok(true)
    }

    pub fn delete_trade(&mut self, id: Uuid) -> Result<(), CoreError> {
        self.delete_trades(&[id])
    }

    /// Delete several trades. All ids are checked first; if any is missing
    /// nothing is recorded.
    pub fn delete_trades(&mut self, ids: &[Uuid]) -> Result<(), CoreError> {
        let history = self.history()?;
        let mut originals = Vec::with_capacity(ids.len());
        for id in ids {
            let original = history
                .iter()
                .find(|t| t.id == *id)
                .cloned()
                .ok_or_else(|| CoreError::TradeNotFound(id.to_string()))?;
            originals.push(original);
        }
        for original in originals {
            self.change_log.add(Change::delete(original))?;
        }
        Ok(())
    }

    // ── Undo / Redo ─────────────────────────────────────────────────

    /// The change the next [`undo`](Self::undo) would revert (for confirmation).
    #[must_use]
    pub fn last_to_undo(&self) -> Option<&ChangeEntry> {
        self.change_log.get_last_to_undo()
    }

    /// The change the next [`redo`](Self::redo) would restore.
    #[must_use]
    pub fn next_to_redo(&self) -> Option<&ChangeEntry> {
        self.change_log.get_next_to_redo()
    }

    /// Undo the most recent change. Returns it, or `None` if there was nothing to undo.
    pub fn undo(&mut self) -> Result<Option<ChangeEntry>, CoreError> {
        let target = self.change_log.get_last_to_undo().cloned();
        Ok(if self.change_log.undo()? { target } else { None })
    }

    /// Redo the earliest undone change. Returns it, or `None` if there was nothing to redo.
    pub fn redo(&mut self) -> Result<Option<ChangeEntry>, CoreError> {
        let target = self.change_log.get_next_to_redo().cloned();
        Ok(if self.change_log.redo()? { target } else { None })
    }

    // ── Views ───────────────────────────────────────────────────────

    /// The effective trade history: base plus every live journal entry.
    pub fn history(&mut self) -> Result<Vec<TradeRecord>, CoreError> {
        self.change_log.process(&self.base_history, false)
    }

    /// Positions aggregated from the effective history.
    pub fn positions(&mut self) -> Result<Vec<PositionSummary>, CoreError> {
        let history = self.history()?;
        Ok(self.position_service.aggregate(&history))
    }

    /// Look a trade up in the effective history.
    pub fn find_trade(&mut self, id: Uuid) -> Result<Option<TradeRecord>, CoreError> {
        Ok(self.history()?.into_iter().find(|t| t.id == id))
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        !self.change_log.all_applied()
    }

    /// `"Crypto Trades Tracker - <version>[ - <file name>][*]"`.
    #[must_use]
    pub fn window_title(&self) -> String {
        let mut title = format!("{APP_NAME} - {APP_VERSION}");
        if let Some(path) = self.file_path() {
            let name = Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string());
            title.push_str(" - ");
            title.push_str(&name);
        }
        if self.has_unsaved_changes() {
            title.push('*');
        }
        title
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// Current trade file, `None` for an unsaved document.
    #[must_use]
    pub fn file_path(&self) -> Option<&str> {
        Some(self.file_path.as_str()).filter(|p| !p.is_empty())
    }

    #[must_use]
    pub fn change_log(&self) -> &ChangeLog {
        &self.change_log
    }

    #[must_use]
    pub fn base_history(&self) -> &[TradeRecord] {
        &self.base_history
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Nothing changes unless the journal for `identity` was loaded.
    fn switch_to(&mut self, identity: &str, base: Vec<TradeRecord>) -> Result<OpenOutcome, CoreError> {
        let settled_changes = self.change_log.load_settled(identity)?;
        self.file_path = identity.to_string();
        self.base_history = base;
        Ok(OpenOutcome {
            has_unapplied_changes: !self.change_log.all_applied(),
            settled_changes,
        })
    }

    fn remember_file(&mut self, path: &str) -> Result<(), CoreError> {
        self.settings.last_used_file = Some(path.to_string());
        self.settings_store.save(&self.settings)
    }
}
