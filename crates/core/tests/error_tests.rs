// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use trades_tracker_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn invalid_file_format() {
        let err = CoreError::InvalidFileFormat("bad root".into());
        assert_eq!(err.to_string(), "Invalid file format: bad root");
    }

    #[test]
    fn unsupported_version() {
        let err = CoreError::UnsupportedVersion {
            found: "2".into(),
            expected: "1".into(),
        };
        assert_eq!(err.to_string(), "Unsupported file version: 2 (expected 1)");
    }

    #[test]
    fn serialization() {
        let err = CoreError::Serialization("boom".into());
        assert_eq!(err.to_string(), "Serialization error: boom");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("unexpected EOF".into());
        assert_eq!(err.to_string(), "Deserialization error: unexpected EOF");
    }

    #[test]
    fn file_io() {
        let err = CoreError::FileIO("permission denied".into());
        assert_eq!(err.to_string(), "File I/O error: permission denied");
    }

    #[test]
    fn no_target_file() {
        let err = CoreError::NoTargetFile;
        assert_eq!(
            err.to_string(),
            "No target file — the document has never been saved"
        );
    }

    #[test]
    fn invalid_config() {
        let err = CoreError::InvalidConfig {
            key: "CTT_DATA_DIR".into(),
            message: "must not be empty".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration for CTT_DATA_DIR: must not be empty"
        );
    }

    #[test]
    fn validation_error() {
        let err = CoreError::ValidationError("Pair must not be empty".into());
        assert_eq!(err.to_string(), "Trade validation failed: Pair must not be empty");
    }

    #[test]
    fn trade_not_found() {
        let err = CoreError::TradeNotFound("abc-123".into());
        assert_eq!(err.to_string(), "Trade not found: abc-123");
    }

    #[test]
    fn invalid_change() {
        let err = CoreError::InvalidChange("'Edit' entry is missing its trade data".into());
        assert_eq!(
            err.to_string(),
            "Invalid change entry: 'Edit' entry is missing its trade data"
        );
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod from_impls {
    use super::*;

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let core_err: CoreError = io_err.into();
        match &core_err {
            CoreError::FileIO(msg) => assert!(msg.contains("file not found")),
            other => panic!("Expected FileIO, got {:?}", other),
        }
    }

    #[test]
    fn from_serde_json_syntax_error() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("{{invalid json");
        let core_err: CoreError = result.unwrap_err().into();
        match &core_err {
            CoreError::Deserialization(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected Deserialization, got {:?}", other),
        }
    }

    #[test]
    fn from_serde_json_io_error() {
        struct Broken;
        impl std::io::Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("device gone"))
            }
        }

        let result: Result<serde_json::Value, _> = serde_json::from_reader(Broken);
        let core_err: CoreError = result.unwrap_err().into();
        match &core_err {
            CoreError::FileIO(msg) => assert!(msg.contains("device gone")),
            other => panic!("Expected FileIO, got {:?}", other),
        }
    }

    #[test]
    fn from_chrono_parse_error() {
        let date_err = chrono::NaiveDate::parse_from_str("15/03/2024", "%Y-%m-%d").unwrap_err();
        let core_err: CoreError = date_err.into();
        match &core_err {
            CoreError::ValidationError(msg) => assert!(msg.contains("YYYY-MM-DD")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }
}

// ── Error is std::error::Error ──────────────────────────────────────

mod std_error {
    use super::*;

    #[test]
    fn core_error_implements_error_trait() {
        let err: Box<dyn std::error::Error> = Box::new(CoreError::TradeNotFound("x".into()));
        assert!(err.to_string().contains('x'));
    }

    #[test]
    fn core_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoreError>();
    }
}
