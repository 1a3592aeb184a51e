//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use listing_ai_common::{classify_answer, parse_answer, ClassificationResult};
use listing_ai_rust::config::Config;
use listing_ai_rust::error::ListingAiError;
use listing_ai_rust::oracle::CliBackend;
use listing_ai_rust::ai_provider::AiProvider;
use std::time::Duration;
use tempfile::tempdir;

/// エラーメッセージの表示
#[test]
fn test_error_display() {
    let err = ListingAiError::Navigation("https://example.test/item/1: timeout".into());
    assert_eq!(err.to_string(), "ページ遷移エラー: https://example.test/item/1: timeout");

    let err = ListingAiError::Ledger("broken".into());
    assert!(err.to_string().contains("broken"));

    let err = ListingAiError::MissingApiKey;
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

/// IOエラーからの変換
#[test]
fn test_error_from_io() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: ListingAiError = io.into();

    assert!(matches!(err, ListingAiError::Io(_)));
    assert!(err.to_string().contains("file not found"));
}

/// JSONエラーからの変換
#[test]
fn test_error_from_json() {
    let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
    let err: ListingAiError = json_err.into();
    assert!(matches!(err, ListingAiError::JsonParse(_)));
}

/// 共通クレートのエラーはそのまま表示
#[test]
fn test_error_from_common() {
    let common = listing_ai_common::Error::Parse("bad answer".into());
    let err: ListingAiError = common.into();

    assert!(matches!(err, ListingAiError::Common(_)));
    assert_eq!(err.to_string(), "Parse error: bad answer");
}

/// 形式不正の応答はエラーではなく NotMatch
#[test]
fn test_malformed_answer_is_not_match() {
    for answer in ["", "maybe", "yes", "yes|2.9", "yes||2.4", "no|1|2", "yes|1|2|3"] {
        assert!(parse_answer(answer).is_err(), "{answer:?} should be rejected");
        assert_eq!(classify_answer(answer), ClassificationResult::NotMatch);
    }
}

/// 壊れた設定ファイルは読み込みエラー
#[test]
fn test_config_invalid_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(ListingAiError::JsonParse(_))));
}

/// OpenAIはCLIバックエンドとしては使えない
#[test]
fn test_cli_backend_rejects_openai() {
    let result = CliBackend::new(AiProvider::OpenAi, Duration::from_secs(1));
    assert!(matches!(result, Err(ListingAiError::Config(_))));
}
