//! パイプラインの型定義
//!
//! - ItemId: 出品ID（実行をまたいで安定）
//! - ListingSnapshot: 1回の取得で得た本文・見出し（永続化しない）
//! - ClassificationResult / Classification: 分類APIの判定結果
//! - TargetEnvelope: 目標寸法と許容誤差
//! - MatchedEntry: matched台帳の1行（`ID|応答`）

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 出品ID。比較は文字列の完全一致
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// 出品ページから切り出した2つのテキスト窓
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingSnapshot {
    /// "Details" 〜 "Seller information" 間の本文
    pub details_text: String,
    /// "Buy-and-sell groups" 〜 "Listed" 間の見出し
    pub heading_text: String,
}

/// 分類結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassificationResult {
    NotMatch,
    Match { width_m: f64, height_m: f64 },
    /// 対象カテゴリだが寸法不明（寸法判定は通らない）
    MatchUnknownDims,
}

/// 分類結果と、台帳に残す正規化済みの生応答
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub result: ClassificationResult,
    pub answer: String,
}

/// 目標寸法（メートル）と許容誤差（割合）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetEnvelope {
    pub desired_width: f64,
    pub desired_height: f64,
    pub tolerance: f64,
}

impl Default for TargetEnvelope {
    fn default() -> Self {
        Self {
            desired_width: 2.8,
            desired_height: 2.3,
            tolerance: 0.2,
        }
    }
}

/// matched台帳の1行
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchedEntry {
    pub item_id: ItemId,
    pub answer: String,
}

impl MatchedEntry {
    pub fn new(item_id: ItemId, answer: impl Into<String>) -> Self {
        Self {
            item_id,
            answer: answer.into(),
        }
    }

    /// `ID|応答` 形式の行をパース
    pub fn parse_line(line: &str) -> Result<Self> {
        match line.split_once('|') {
            Some((id, answer)) if !id.is_empty() => Ok(Self::new(ItemId::new(id), answer)),
            _ => Err(Error::Parse(format!("matched行の形式が不正です: {:?}", line))),
        }
    }
}

impl fmt::Display for MatchedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.item_id, self.answer)
    }
}
