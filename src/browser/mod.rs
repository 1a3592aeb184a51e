//! ブラウザ操作モジュール
//!
//! - BrowserBackend: ブラウザが提供する操作の最小集合（遷移・要素検索・クリック・入力・HTML取得）
//! - PageSession: 1ページを占有し、ログイン → 出品ごとの描画 → 終了 を制御する
//! - FantocciniBackend: WebDriver経由の実装

mod fantoccini_backend;
mod session;

pub use fantoccini_backend::FantocciniBackend;
pub use session::{Credentials, PageSession, SessionSettings, SessionState};

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 要素セレクタ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Selector {
    pub fn css(s: impl Into<String>) -> Self {
        Selector::Css(s.into())
    }

    pub fn xpath(s: impl Into<String>) -> Self {
        Selector::XPath(s.into())
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Css(s) => write!(f, "css:{}", s),
            Selector::XPath(s) => write!(f, "xpath:{}", s),
        }
    }
}

/// ブラウザバックエンドの操作
///
/// `find` は要素が見つからない場合に `Ok(None)` を返す。
/// `Err` はバックエンド自体の異常（セッション切断など）に限る。
#[async_trait]
pub trait BrowserBackend: Send {
    type Element: Send + Sync;

    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// 最大 `timeout` まで要素の出現を待つ。`Duration::ZERO` なら即時検索
    async fn find(&mut self, selector: &Selector, timeout: Duration) -> Result<Option<Self::Element>>;

    async fn click(&mut self, element: &Self::Element) -> Result<()>;

    async fn fill(&mut self, element: &Self::Element, value: &str) -> Result<()>;

    async fn rendered_markup(&mut self) -> Result<String>;

    /// 描画待ちの固定ウェイト
    async fn pause(&mut self, duration: Duration);

    async fn close(&mut self) -> Result<()>;
}
