use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListingAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`listing-ai config --set-api-key YOUR_KEY` または環境変数 OPENAI_API_KEY で設定してください")]
    MissingApiKey,

    #[error("ログイン情報が設定されていません。環境変数 FB_EMAIL / FB_PASSWORD を設定してください")]
    MissingCredentials,

    #[error("ログインに失敗: {0}")]
    Authentication(String),

    #[error("ページ遷移エラー: {0}")]
    Navigation(String),

    #[error("ブラウザ操作エラー: {0}")]
    Browser(String),

    #[error("WebDriver接続エラー: {0}")]
    WebDriver(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("台帳エラー: {0}")]
    Ledger(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] listing_ai_common::Error),
}

pub type Result<T> = std::result::Result<T, ListingAiError>;
