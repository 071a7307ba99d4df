use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::change::{Change, ChangeEntry, ChangeState};
use crate::models::trade::TradeRecord;
use crate::storage::journal::{
    FileJournalStore, JournalDocument, JournalRead, JournalStore, MemoryJournalStore,
};

/// How many committed (active) entries are kept for undo after a projection.
pub const MAX_ACTIVE_CHANGES: usize = 10;

/// Output of [`ChangeLog::project`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// Base history with every live journal entry folded in, in order.
    pub history: Vec<TradeRecord>,

    /// Oldest active entries pruned from the journal by this pass, in
    /// journal order. Their effect is in `history` but will not be re-folded
    /// by later passes, so a caller that keeps its base history in memory
    /// must fold them into it.
    pub settled: Vec<ChangeEntry>,
}

/// Journal of edits layered over an immutable base trade history.
///
/// Entries are never folded into the base itself: every projection starts
/// from a fresh copy of the base and replays the journal. Each mutation is
/// written through to the [`JournalStore`] before returning, keyed by the
/// file identity passed to [`load`](Self::load).
pub struct ChangeLog {
    store: Box<dyn JournalStore>,
    file_identity: String,
    changes: Vec<ChangeEntry>,
}

impl std::fmt::Debug for ChangeLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeLog")
            .field("file_identity", &self.file_identity)
            .field("changes", &self.changes.len())
            .finish()
    }
}

impl ChangeLog {
    /// Empty log for the unsaved document, backed by `store`.
    /// Call [`load`](Self::load) before use.
    pub fn new(store: Box<dyn JournalStore>) -> Self {
        Self {
            store,
            file_identity: String::new(),
            changes: Vec::new(),
        }
    }

    pub fn in_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(FileJournalStore::new(path)))
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryJournalStore::new()))
    }

    // ── Loading ─────────────────────────────────────────────────────

    /// Switch to `file_identity` and load its journal.
    ///
    /// Read problems never fail: a missing, malformed or wrong-version
    /// change log file is recreated holding only this identity, and a
    /// damaged journal for this identity alone is replaced by an empty one.
    /// An identity seen for the first time starts empty and is written out.
    /// If that write fails the log stays on its previous identity.
    pub fn load(&mut self, file_identity: &str) -> Result<(), CoreError> {
        let changes = self.read_changes(file_identity)?;
        self.file_identity = file_identity.to_string();
        self.changes = changes;
        Ok(())
    }

    /// Like [`load`](Self::load), for a trade file that was just read from
    /// disk: its saved entries are settled the way
    /// [`settle_applied`](Self::settle_applied) does. Returns how many.
    pub fn load_settled(&mut self, file_identity: &str) -> Result<usize, CoreError> {
        let mut changes = self.read_changes(file_identity)?;
        let settled = settle(&mut changes);
        if settled > 0 {
            self.store.write_journal(file_identity, &changes)?;
            debug!(identity = file_identity, settled, "Settled saved changes");
        }
        self.file_identity = file_identity.to_string();
        self.changes = changes;
        Ok(settled)
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Record a new pending change.
    ///
    /// Every undone entry is dropped first: a fresh edit ends the redo branch.
    pub fn add(&mut self, change: Change) -> Result<(), CoreError> {
        self.changes.retain(|c| !c.undone);
        debug!(kind = %change.change_type(), trade = %change.trade_id(), "Recording change");
        self.changes.push(ChangeEntry::pending(change));
        self.write_changes()
    }

    /// Fold the journal onto `base_history` and return just the trades.
    ///
    /// Entries pruned by this pass are not reported. With `mark_applied`
    /// set, a caller that replays onto the same base again must use
    /// [`project`](Self::project) and fold [`Projection::settled`] into it.
    pub fn process(
        &mut self,
        base_history: &[TradeRecord],
        mark_applied: bool,
    ) -> Result<Vec<TradeRecord>, CoreError> {
        self.project(base_history, mark_applied).map(|p| p.history)
    }

    /// Fold the journal onto a copy of `base_history`, in journal order.
    ///
    /// - pending entries are folded and get `applied = mark_applied`;
    /// - active entries are folded again;
    /// - undone entries that are still marked applied are unapplied, not folded;
    /// - discarded entries are skipped.
    ///
    /// Afterwards only the newest [`MAX_ACTIVE_CHANGES`] applied entries are
    /// kept, followed by every unapplied one. The journal is then written.
    pub fn project(
        &mut self,
        base_history: &[TradeRecord],
        mark_applied: bool,
    ) -> Result<Projection, CoreError> {
        let mut history = base_history.to_vec();

        for entry in &mut self.changes {
            match entry.state() {
                ChangeState::Pending => {
                    entry.change.fold_into(&mut history);
                    entry.applied = mark_applied;
                }
                ChangeState::Active => entry.change.fold_into(&mut history),
                ChangeState::Undone => entry.applied = false,
                ChangeState::Discarded => {}
            }
        }

        let settled = self.prune();
        debug!(
            base = base_history.len(),
            projected = history.len(),
            journal = self.changes.len(),
            settled = settled.len(),
            mark_applied,
            "Projected trade history"
        );

        self.write_changes()?;
        Ok(Projection { history, settled })
    }

    /// Mark the most recent not-yet-undone entry as undone.
    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, CoreError> {
        let Some(entry) = self.changes.iter_mut().rev().find(|c| !c.undone) else {
            return Ok(false);
        };
        entry.undone = true;
        self.write_changes()?;
        Ok(true)
    }

    /// Clear the undone flag of the earliest undone entry.
    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, CoreError> {
        let Some(entry) = self.changes.iter_mut().find(|c| c.undone) else {
            return Ok(false);
        };
        entry.undone = false;
        self.write_changes()?;
        Ok(true)
    }

    /// Mark every unapplied entry undone. The entries stay in the journal
    /// (and can be redone) until the next [`add`](Self::add) purges them.
    pub fn clear_not_applied(&mut self) -> Result<(), CoreError> {
        for entry in self.changes.iter_mut().filter(|c| !c.applied) {
            entry.undone = true;
        }
        self.write_changes()
    }

    /// Settle the journal against a trade file that already holds every
    /// saved change: active entries are dropped, and a saved entry that was
    /// undone becomes a pending inverse change, so the undo is not lost.
    /// Returns how many entries were settled.
    pub fn settle_applied(&mut self) -> Result<usize, CoreError> {
        let mut changes = self.changes.clone();
        let settled = settle(&mut changes);
        self.store.write_journal(&self.file_identity, &changes)?;
        self.changes = changes;
        if settled > 0 {
            debug!(identity = %self.file_identity, settled, "Settled saved changes");
        }
        Ok(settled)
    }

    /// Move the journal to another identity (save-as). The old identity is
    /// left with an empty journal. Both are written in one go; on failure
    /// the log stays bound to the old identity.
    pub fn rebind(&mut self, file_identity: &str) -> Result<(), CoreError> {
        if file_identity == self.file_identity {
            return self.write_changes();
        }
        let mut document = match self.store.read_all() {
            JournalRead::Found(doc) => doc,
            JournalRead::Missing | JournalRead::Unreadable(_) => JournalDocument::new(),
        };
        document.set_entries(&self.file_identity, &[])?;
        document.set_entries(file_identity, &self.changes)?;
        self.store.write_all(&document)?;
        self.file_identity = file_identity.to_string();
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// The entry [`undo`](Self::undo) would act on.
    pub fn get_last_to_undo(&self) -> Option<&ChangeEntry> {
        self.changes.iter().rev().find(|c| !c.undone)
    }

    /// The entry [`redo`](Self::redo) would act on.
    pub fn get_next_to_redo(&self) -> Option<&ChangeEntry> {
        self.changes.iter().find(|c| c.undone)
    }

    /// True when every entry has `applied != undone`, i.e. none is pending
    /// and none is undone-but-still-applied. Drives the unsaved marker.
    pub fn all_applied(&self) -> bool {
        self.changes.iter().all(|c| c.applied != c.undone)
    }

    pub fn entries(&self) -> &[ChangeEntry] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn count_in_state(&self, state: ChangeState) -> usize {
        self.changes.iter().filter(|c| c.state() == state).count()
    }

    pub fn file_identity(&self) -> &str {
        &self.file_identity
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Keep the newest applied entries plus all unapplied ones; return the
    /// applied entries that fell off the front.
    fn prune(&mut self) -> Vec<ChangeEntry> {
        let (mut applied, unapplied): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.changes).into_iter().partition(|c| c.applied);

        let excess = applied.len().saturating_sub(MAX_ACTIVE_CHANGES);
        let settled: Vec<ChangeEntry> = applied.drain(..excess).collect();

        applied.extend(unapplied);
        self.changes = applied;
        settled
    }

    fn write_changes(&self) -> Result<(), CoreError> {
        self.store.write_journal(&self.file_identity, &self.changes)
    }

    /// Read the journal for `file_identity`, repairing the store as needed.
    fn read_changes(&self, file_identity: &str) -> Result<Vec<ChangeEntry>, CoreError> {
        let document = match self.store.read_all() {
            JournalRead::Found(doc) => doc,
            JournalRead::Missing => {
                debug!(identity = file_identity, "No change log yet, creating one");
                self.reset_store(file_identity)?;
                return Ok(Vec::new());
            }
            JournalRead::Unreadable(reason) => {
                warn!(identity = file_identity, %reason, "Change log unreadable, starting fresh");
                self.reset_store(file_identity)?;
                return Ok(Vec::new());
            }
        };

        if !document.is_current_version() {
            warn!(
                found = document.version.as_deref().unwrap_or(""),
                "Change log version mismatch, starting fresh"
            );
            self.reset_store(file_identity)?;
            return Ok(Vec::new());
        }

        match document.entries(file_identity) {
            Some(Ok(entries)) => {
                info!(identity = file_identity, entries = entries.len(), "Loaded change log");
                Ok(entries)
            }
            Some(Err(e)) => {
                warn!(identity = file_identity, error = %e, "Discarding malformed journal");
                self.store.write_journal(file_identity, &[])?;
                Ok(Vec::new())
            }
            None => {
                self.store.write_journal(file_identity, &[])?;
                Ok(Vec::new())
            }
        }
    }

    /// Replace the whole change log with one holding only an empty journal
    /// for `file_identity`.
    fn reset_store(&self, file_identity: &str) -> Result<(), CoreError> {
        let mut document = JournalDocument::new();
        document.set_entries(file_identity, &[])?;
        self.store.write_all(&document)
    }
}

/// Drop active entries and replace undone saved ones with their pending
/// inverse. Returns how many entries were touched.
fn settle(changes: &mut Vec<ChangeEntry>) -> usize {
    let mut settled = 0;
    let mut kept = Vec::with_capacity(changes.len());
    for entry in changes.drain(..) {
        match entry.state() {
            ChangeState::Active => settled += 1,
            ChangeState::Undone => {
                settled += 1;
                kept.push(ChangeEntry::pending(entry.change.inverse()));
            }
            ChangeState::Pending | ChangeState::Discarded => kept.push(entry),
        }
    }
    *changes = kept;
    settled
}
