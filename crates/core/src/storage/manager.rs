use std::path::Path;

use tracing::info;

use crate::errors::CoreError;
use crate::models::trade::TradeRecord;

use super::format;

/// High-level trade file operations: save/load the base history to/from
/// bytes or files.
pub struct TradeFileManager;

impl TradeFileManager {
    /// Serialize a trade history to the versioned JSON file format.
    pub fn save_to_bytes(records: &[TradeRecord]) -> Result<Vec<u8>, CoreError> {
        format::write_file(records)
    }

    /// Parse a trade history from raw file bytes.
    pub fn load_from_bytes(data: &[u8]) -> Result<Vec<TradeRecord>, CoreError> {
        let file = format::read_file(data)?;
        Ok(file.data)
    }

    /// Write a trade history to disk, replacing the file.
    pub fn save_to_file(records: &[TradeRecord], path: impl AsRef<Path>) -> Result<(), CoreError> {
        let path = path.as_ref();
        let bytes = Self::save_to_bytes(records)?;
        std::fs::write(path, bytes)?;
        info!(path = %path.display(), trades = records.len(), "Saved trade file");
        Ok(())
    }

    /// Read a trade history from disk.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Vec<TradeRecord>, CoreError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let records = Self::load_from_bytes(&bytes)?;
        info!(path = %path.display(), trades = records.len(), "Loaded trade file");
        Ok(records)
    }
}
