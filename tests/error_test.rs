//! Error cases at the CLI edge

use jurnal_bimbingan::config::Config;
use jurnal_bimbingan::error::JurnalError;
use jurnal_bimbingan::file_store::FileBackend;
use jurnal_common::record::{FormField, SignatureRole, ValidationReport};
use jurnal_common::store::KeyValueBackend;
use jurnal_common::Error;
use tempfile::tempdir;

/// Every variant renders a message
#[test]
fn test_error_display() {
    let errors = vec![
        JurnalError::Config("tes".to_string()),
        JurnalError::FileNotFound("ttd.png".to_string()),
        JurnalError::UnsupportedSignature("ttd.gif".to_string()),
        JurnalError::ImageLoad("rusak".to_string()),
        JurnalError::Task("batal".to_string()),
        JurnalError::Core(Error::NotFound("record:x".to_string())),
    ];

    for err in errors {
        assert!(!err.to_string().is_empty(), "{:?}", err);
    }
}

/// Core errors pass through with their own message
#[test]
fn test_core_error_is_transparent() {
    let report = ValidationReport {
        fields: vec![FormField::StudentName],
        signatures: vec![SignatureRole::Teacher],
    };
    let core = Error::ValidationFailed(report);
    let expected = core.to_string();
    let err: JurnalError = core.into();
    assert_eq!(err.to_string(), expected);
}

/// anyhow context chains are kept in the message
#[test]
fn test_input_error_keeps_context() {
    let source = anyhow::anyhow!("expected value").context("form.json bukan form JSON yang valid");
    let err: JurnalError = source.into();
    let message = err.to_string();
    assert!(message.contains("form.json"));
    assert!(message.contains("expected value"));
}

/// A data file that is not JSON is reported, not overwritten
#[test]
fn test_corrupt_data_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("jurnal.json");
    std::fs::write(&path, "[not json").unwrap();

    let err = FileBackend::open(&path).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[not json");
}

/// Quota exhaustion surfaces as StorageFull
#[test]
fn test_quota_exceeded() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("jurnal.json");
    let config = Config {
        storage_quota_bytes: 16,
        ..Default::default()
    };

    let mut backend = FileBackend::open(&path).unwrap().with_quota(config.storage_quota_bytes);
    let err = backend.set_item("record:big", &"x".repeat(64)).unwrap_err();
    assert!(matches!(err, Error::StorageFull { .. }));
    assert!(err.is_storage());
}
