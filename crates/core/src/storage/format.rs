use serde::Serialize;
use serde_json::Value;

use crate::config::DATA_FILE_VERSION;
use crate::errors::CoreError;
use crate::models::trade::TradeRecord;

/// Current trade file format version.
pub const CURRENT_VERSION: &str = DATA_FILE_VERSION;

/// Contents of a parsed trade file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeFile {
    /// `None` for legacy files written before versioning.
    pub version: Option<String>,
    pub data: Vec<TradeRecord>,
}

#[derive(Serialize)]
struct TradeFileOut<'a> {
    version: &'a str,
    data: &'a [TradeRecord],
}

/// Write a complete trade file to bytes.
///
/// Layout:
/// ```text
/// { "version": "1",
///   "data": [ [id, pair, side, "YYYY-MM-DD", "quantity", "price"], ... ] }
/// ```
pub fn write_file(records: &[TradeRecord]) -> Result<Vec<u8>, CoreError> {
    serde_json::to_vec_pretty(&TradeFileOut {
        version: CURRENT_VERSION,
        data: records,
    })
    .map_err(|e| CoreError::Serialization(format!("Failed to serialize trades: {e}")))
}

/// Parse a trade file.
///
/// Accepts the versioned object form and, for old files, a bare array of
/// rows. A missing `version` is tolerated; a different one is rejected.
/// A missing or `null` `data` means no trades.
pub fn read_file(bytes: &[u8]) -> Result<TradeFile, CoreError> {
    let root: Value = serde_json::from_slice(bytes)
        .map_err(|e| CoreError::InvalidFileFormat(format!("Not valid JSON: {e}")))?;

    let (version, data) = match root {
        Value::Array(_) => (None, root),
        Value::Object(mut map) => {
            let version = match map.remove("version") {
                None | Some(Value::Null) => None,
                Some(Value::String(v)) => Some(v),
                Some(other) => {
                    return Err(CoreError::InvalidFileFormat(format!(
                        "Version must be a string, got {other}"
                    )))
                }
            };
            (version, map.remove("data").unwrap_or(Value::Null))
        }
        _ => {
            return Err(CoreError::InvalidFileFormat(
                "Expected an object with 'version' and 'data'".into(),
            ))
        }
    };

    if let Some(found) = &version {
        if found != CURRENT_VERSION {
            return Err(CoreError::UnsupportedVersion {
                found: found.clone(),
                expected: CURRENT_VERSION.to_string(),
            });
        }
    }

    let data = match data {
        Value::Null => Vec::new(),
        rows => serde_json::from_value(rows)
            .map_err(|e| CoreError::InvalidFileFormat(format!("Malformed trade rows: {e}")))?,
    };

    Ok(TradeFile { version, data })
}
