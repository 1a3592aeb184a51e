//! 分類API連携モジュール
//!
//! - CompletionBackend: プロンプト → 応答文字列 の1操作だけを持つ外部サービス
//! - Oracle: プロンプト構築と応答パースを担当（バックエンドは呼び出し元が所有）
//!
//! 応答の形式不正は `NotMatch` として扱い、エラーにしない。
//! 通信エラーなどバックエンド自体の失敗だけを `Err` で返す。

mod cli_backend;
mod openai;

pub use cli_backend::CliBackend;
pub use openai::OpenAiBackend;

use crate::error::Result;
use async_trait::async_trait;
use listing_ai_common::{
    build_classification_prompt, classify_answer, normalize_answer, Classification, ListingSnapshot,
};

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// 実行時にプロバイダを選ぶためのボックス化
#[async_trait]
impl CompletionBackend for Box<dyn CompletionBackend> {
    async fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt).await
    }
}

pub struct Oracle<C: CompletionBackend> {
    backend: C,
    category: String,
}

impl<C: CompletionBackend> Oracle<C> {
    pub fn new(backend: C, category: impl Into<String>) -> Self {
        Self {
            backend,
            category: category.into(),
        }
    }

    pub fn backend(&self) -> &C {
        &self.backend
    }

    /// スナップショットを分類
    pub async fn classify(&self, snapshot: &ListingSnapshot) -> Result<Classification> {
        let prompt = build_classification_prompt(&snapshot.details_text, &snapshot.heading_text, &self.category);
        tracing::debug!(prompt_len = prompt.len(), "classification request");

        let raw = self.backend.complete(&prompt).await?;
        let answer = normalize_answer(&raw);
        tracing::debug!(answer = %answer, "classification answer");

        let result = classify_answer(&answer);
        Ok(Classification { result, answer })
    }
}
