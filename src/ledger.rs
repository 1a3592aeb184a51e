//! 出品ID台帳モジュール
//!
//! 種別ごとのディレクトリにタイムスタンプ名のCSVスナップショットを置く:
//!
//! ```text
//! data/
//!   extracted_id/2024-05-01-09-00-00_extracted_id.csv   （外部から供給、読み取り専用）
//!   visited_id/2024-05-01-09-30-12_visited_id.csv
//!   matched_id/2024-05-01-09-30-12_matched_id.csv       （1行 = `ID|応答`）
//! ```
//!
//! - ファイル名の辞書順 = 時系列順。最大のものが最新
//! - 書き込みは毎回、全件を含む新しいファイルを作る（既存ファイルは変更しない）
//! - 単一プロセスからの書き込みのみを想定（ロックなし）

use crate::error::{ListingAiError, Result};
use chrono::NaiveDateTime;
use listing_ai_common::{ItemId, MatchedEntry};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// スナップショット名のタイムスタンプ形式（辞書順 = 時系列順）
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

const SNAPSHOT_EXTENSION: &str = "csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerKind {
    Extracted,
    Visited,
    Matched,
}

impl LedgerKind {
    pub const ALL: [LedgerKind; 3] = [LedgerKind::Extracted, LedgerKind::Visited, LedgerKind::Matched];

    pub fn label(&self) -> &'static str {
        match self {
            LedgerKind::Extracted => "extracted",
            LedgerKind::Visited => "visited",
            LedgerKind::Matched => "matched",
        }
    }

    pub fn dir_name(&self) -> String {
        format!("{}_id", self.label())
    }

    /// スナップショットのファイル名
    pub fn file_name(&self, timestamp: &NaiveDateTime) -> String {
        format!("{}{}", timestamp.format(TIMESTAMP_FORMAT), self.file_suffix())
    }

    fn file_suffix(&self) -> String {
        format!("_{}_id.{}", self.label(), SNAPSHOT_EXTENSION)
    }

    /// この種別のスナップショット名か（先頭のタイムスタンプが解釈でき、種別の接尾辞で終わる）
    pub fn is_snapshot_name(&self, file_name: &str) -> bool {
        file_name
            .strip_suffix(&self.file_suffix())
            .is_some_and(|stamp| NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok())
    }
}

/// 最新スナップショットの概要
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    pub path: PathBuf,
    pub entries: usize,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    root: PathBuf,
}

impl Ledger {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, kind: LedgerKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// スナップショット一覧（ファイル名の昇順）。ディレクトリがなければ空
    ///
    /// `<タイムスタンプ>_<種別>_id.csv` の名前のファイルだけを数える
    pub fn snapshots(&self, kind: LedgerKind) -> Result<Vec<PathBuf>> {
        let dir = self.dir(kind);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.file_name()
                    .map(|name| kind.is_snapshot_name(&name.to_string_lossy()))
                    .unwrap_or(false)
            })
            .collect();

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    pub fn latest_snapshot(&self, kind: LedgerKind) -> Result<Option<PathBuf>> {
        Ok(self.snapshots(kind)?.pop())
    }

    /// 最新スナップショットの全行（空行を除く）。スナップショットがなければ空集合
    pub fn load_latest(&self, kind: LedgerKind) -> Result<BTreeSet<String>> {
        match self.latest_snapshot(kind)? {
            Some(path) => read_snapshot(&path),
            None => Ok(BTreeSet::new()),
        }
    }

    pub fn load_latest_ids(&self, kind: LedgerKind) -> Result<BTreeSet<ItemId>> {
        Ok(self.load_latest(kind)?.into_iter().map(ItemId::from).collect())
    }

    /// matched台帳の最新スナップショットを `ID|応答` として読む。形式不正の行があればエラー
    pub fn load_latest_matched(&self) -> Result<BTreeSet<MatchedEntry>> {
        let mut entries = BTreeSet::new();
        for line in self.load_latest(LedgerKind::Matched)? {
            entries.insert(MatchedEntry::parse_line(&line)?);
        }
        Ok(entries)
    }

    pub fn latest_info(&self, kind: LedgerKind) -> Result<Option<SnapshotInfo>> {
        match self.latest_snapshot(kind)? {
            Some(path) => {
                let entries = read_snapshot(&path)?.len();
                Ok(Some(SnapshotInfo { path, entries }))
            }
            None => Ok(None),
        }
    }

    /// 全件を含む新しいスナップショットを書き込む
    ///
    /// 既存の最新スナップショット以前のタイムスタンプが渡された場合は、
    /// 最新より1秒後の名前に繰り上げる（ファイル名の順序と時系列を一致させるため）。
    /// 同名ファイルがあれば上書きせずエラー。
    pub fn append_snapshot<T: Display>(
        &self,
        kind: LedgerKind,
        entries: &BTreeSet<T>,
        timestamp: NaiveDateTime,
    ) -> Result<PathBuf> {
        let dir = self.dir(kind);
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(kind.file_name(&self.next_timestamp(kind, timestamp)?));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => ListingAiError::Ledger(format!(
                    "スナップショットが既に存在します: {}",
                    path.display()
                )),
                _ => ListingAiError::Io(e),
            })?;

        let mut writer = BufWriter::new(file);
        for entry in entries {
            writeln!(writer, "{}", entry)?;
        }
        writer.flush()?;

        tracing::info!(kind = kind.label(), entries = entries.len(), path = %path.display(), "ledger snapshot written");
        Ok(path)
    }

    fn next_timestamp(&self, kind: LedgerKind, timestamp: NaiveDateTime) -> Result<NaiveDateTime> {
        let candidate = kind.file_name(&timestamp);

        let Some(latest) = self.latest_snapshot(kind)? else {
            return Ok(timestamp);
        };
        let latest_name = latest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if candidate > latest_name {
            return Ok(timestamp);
        }

        let latest_ts = parse_snapshot_timestamp(&latest_name).ok_or_else(|| {
            ListingAiError::Ledger(format!("最新スナップショット名を解釈できません: {}", latest_name))
        })?;
        Ok(latest_ts + chrono::Duration::seconds(1))
    }
}

/// スナップショット名の先頭からタイムスタンプを取り出す
pub fn parse_snapshot_timestamp(file_name: &str) -> Option<NaiveDateTime> {
    let stamp = file_name.split('_').next()?;
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}

fn read_snapshot(path: &Path) -> Result<BTreeSet<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
