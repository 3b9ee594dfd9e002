//! Table-driven tests for configuration loading, plus building a service
//! from a config file on disk.

mod common;

use serial_test::serial;

use receipt_parser::config::{load_config, load_config_from_str, SourceConfig};
use receipt_parser::pipeline::NoopProgress;
use receipt_parser::{MergeError, PipelineError, ReceiptError, ReceiptService};

struct ConfigTestCase {
    name: &'static str,
    config_json: &'static str,
    should_succeed: bool,
    expected_error: Option<&'static str>,
}

const CONFIG_TESTS: &[ConfigTestCase] = &[
    ConfigTestCase {
        name: "valid_drive",
        config_json: r#"{
            "version": "1.0",
            "outputDirectory": "outputs",
            "source": {"kind": "drive", "folderId": "1AbC", "accessToken": {"envVar": "DRIVE_TOKEN"}},
            "extraction": {"endpoint": "https://x.cognitiveservices.azure.com", "apiKey": {"envVar": "AZURE_KEY"}}
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_local_with_overrides",
        config_json: r#"{
            "version": "1.0",
            "outputDirectory": "/srv/receipts/out",
            "combinedFileName": "Everything.xlsx",
            "source": {"kind": "local", "root": "/srv/receipts", "folderId": "inbox"},
            "extraction": {
                "endpoint": "https://x.cognitiveservices.azure.com",
                "model": "prebuilt-invoice",
                "apiKey": {"file": "~/.azure-key"},
                "maxSubmitAttempts": 5,
                "pollIntervalSecs": 1,
                "maxPollAttempts": 10
            }
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "unknown_source_kind",
        config_json: r#"{
            "version": "1.0",
            "outputDirectory": "outputs",
            "source": {"kind": "dropbox", "folderId": "x"},
            "extraction": {"endpoint": "https://x", "apiKey": {"value": "k"}}
        }"#,
        should_succeed: false,
        expected_error: Some("parse"),
    },
    ConfigTestCase {
        name: "drive_without_token",
        config_json: r#"{
            "version": "1.0",
            "outputDirectory": "outputs",
            "source": {"kind": "drive", "folderId": "1AbC"},
            "extraction": {"endpoint": "https://x", "apiKey": {"value": "k"}}
        }"#,
        should_succeed: false,
        expected_error: Some("source.accessToken"),
    },
    ConfigTestCase {
        name: "combined_name_collides",
        config_json: r#"{
            "version": "1.0",
            "outputDirectory": "outputs",
            "combinedFileName": "All_parsed.xlsx",
            "source": {"kind": "local", "root": ".", "folderId": "inbox"},
            "extraction": {"endpoint": "https://x", "apiKey": {"value": "k"}}
        }"#,
        should_succeed: false,
        expected_error: Some("collides"),
    },
    ConfigTestCase {
        name: "empty_endpoint",
        config_json: r#"{
            "version": "1.0",
            "outputDirectory": "outputs",
            "source": {"kind": "local", "root": ".", "folderId": "inbox"},
            "extraction": {"endpoint": " ", "apiKey": {"value": "k"}}
        }"#,
        should_succeed: false,
        expected_error: Some("extraction.endpoint"),
    },
    ConfigTestCase {
        name: "wrong_version",
        config_json: r#"{
            "version": "2.0",
            "outputDirectory": "outputs",
            "source": {"kind": "local", "root": ".", "folderId": "inbox"},
            "extraction": {"endpoint": "https://x", "apiKey": {"value": "k"}}
        }"#,
        should_succeed: false,
        expected_error: Some("version"),
    },
];

#[test]
fn test_config_loading_table() {
    for case in CONFIG_TESTS {
        let result = load_config_from_str(case.config_json);

        if case.should_succeed {
            assert!(result.is_ok(), "{}: {:?}", case.name, result.err());
        } else {
            let err = result.err().map(|e| e.to_string()).unwrap_or_default();
            let expected = case.expected_error.unwrap_or_default();
            assert!(
                err.contains(expected),
                "{}: expected error containing '{}', got '{}'",
                case.name,
                expected,
                err
            );
        }
    }
}

#[test]
fn test_local_overrides_are_applied() {
    let case = CONFIG_TESTS
        .iter()
        .find(|c| c.name == "valid_local_with_overrides")
        .unwrap();
    let config = load_config_from_str(case.config_json).unwrap();

    assert_eq!(config.combined_file_name, "Everything.xlsx");
    assert_eq!(config.extraction.max_submit_attempts, 5);
    assert_eq!(config.extraction.default_retry_after_secs, 30);
    assert_eq!(config.extraction.api_version, "2023-07-31");
    assert!(matches!(config.source, SourceConfig::Local(_)));
}

fn write_local_config(harness: &common::TestHarness, api_key_env: &str) -> std::path::PathBuf {
    let config = serde_json::json!({
        "version": "1.0",
        "outputDirectory": harness.root().join("out").to_string_lossy(),
        "source": {
            "kind": "local",
            "root": harness.root().to_string_lossy(),
            "folderId": "inbox"
        },
        "extraction": {
            "endpoint": "https://example.cognitiveservices.azure.com",
            "apiKey": { "envVar": api_key_env }
        }
    });
    let path = harness.root().join("receipt-parser.json");
    std::fs::write(&path, config.to_string()).unwrap();
    path
}

#[test]
#[serial]
fn test_service_from_config_resolves_env_key() {
    let harness = common::TestHarness::new();
    let path = write_local_config(&harness, "RECEIPT_PARSER_IT_KEY");
    std::env::set_var("RECEIPT_PARSER_IT_KEY", "secret");

    let config = load_config(&path).unwrap();
    let service = ReceiptService::from_config(&config);
    std::env::remove_var("RECEIPT_PARSER_IT_KEY");

    let service = service.unwrap();
    assert!(service.list_outputs().unwrap().is_empty());
}

#[test]
#[serial]
fn test_service_from_config_missing_env_key() {
    let harness = common::TestHarness::new();
    let path = write_local_config(&harness, "RECEIPT_PARSER_IT_MISSING_KEY");
    std::env::remove_var("RECEIPT_PARSER_IT_MISSING_KEY");

    let config = load_config(&path).unwrap();
    let err = ReceiptService::from_config(&config).err().unwrap();

    assert!(matches!(err, ReceiptError::Extraction(_)));
    assert!(err.to_string().contains("RECEIPT_PARSER_IT_MISSING_KEY"));
}

#[tokio::test]
#[serial]
async fn test_outputs_only_service_needs_no_credentials() {
    let harness = common::TestHarness::new();
    let path = write_local_config(&harness, "RECEIPT_PARSER_IT_UNSET_KEY");
    std::env::remove_var("RECEIPT_PARSER_IT_UNSET_KEY");
    let config = load_config(&path).unwrap();

    let service = ReceiptService::outputs_only(&config);

    assert!(service.list_outputs().unwrap().is_empty());
    assert!(service.cleanup().unwrap().is_empty());
    assert!(matches!(service.merge(), Err(MergeError::NoOutputsAvailable)));
    assert!(matches!(
        service.run_pipeline(&NoopProgress).await,
        Err(PipelineError::NotConfigured)
    ));
}
