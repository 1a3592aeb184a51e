//! 巡回パイプライン
//!
//! 1回の実行:
//! 1. 台帳から extracted / visited / matched の最新スナップショットを読む
//! 2. 未訪問ID = extracted − visited（昇順）
//! 3. ログイン後、IDごとに 描画 → 抽出 → フィルタ → 分類 → 寸法判定 → 通知
//! 4. 全件終了後に visited（と、一致があれば matched）の新スナップショットを書く
//!
//! 結果に関わらず処理したIDはすべて訪問済みになり、同じ実行内で再試行しない。
//! 途中で中断された実行は何も書き込まない。

mod item;

pub use item::{evaluate_markup, ItemOutcome, Pipeline};

use crate::alert::AlertDispatcher;
use crate::browser::{BrowserBackend, Credentials};
use crate::error::Result;
use crate::ledger::{Ledger, LedgerKind};
use crate::oracle::CompletionBackend;
use chrono::NaiveDateTime;
use listing_ai_common::{ItemId, MatchedEntry};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// 実行前に台帳から組み立てる処理計画
#[derive(Debug, Clone, Default)]
pub struct RunPlan {
    pub extracted: BTreeSet<ItemId>,
    pub visited_before: BTreeSet<ItemId>,
    /// matched台帳の行（`ID|応答`）
    pub matched_before: BTreeSet<String>,
    /// 今回処理するID（昇順）
    pub pending: Vec<ItemId>,
}

impl RunPlan {
    pub fn load(ledger: &Ledger) -> Result<Self> {
        Ok(Self::from_sets(
            ledger.load_latest_ids(LedgerKind::Extracted)?,
            ledger.load_latest_ids(LedgerKind::Visited)?,
            ledger.load_latest(LedgerKind::Matched)?,
        ))
    }

    pub fn from_sets(
        extracted: BTreeSet<ItemId>,
        visited_before: BTreeSet<ItemId>,
        matched_before: BTreeSet<String>,
    ) -> Self {
        let pending = pending_ids(&extracted, &visited_before);
        Self {
            extracted,
            visited_before,
            matched_before,
            pending,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// extracted − visited を昇順で返す
pub fn pending_ids(extracted: &BTreeSet<ItemId>, visited: &BTreeSet<ItemId>) -> Vec<ItemId> {
    extracted.difference(visited).cloned().collect()
}

/// 1回の実行結果
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// 今回訪問したID（結果を問わない）
    pub visited: BTreeSet<ItemId>,
    /// 今回一致したID
    pub matched: BTreeSet<MatchedEntry>,
    /// 処理順の結果
    pub outcomes: Vec<(ItemId, ItemOutcome)>,
}

impl RunReport {
    pub fn record(&mut self, item_id: ItemId, outcome: ItemOutcome) {
        if let ItemOutcome::Matched(classification) = &outcome {
            self.matched
                .insert(MatchedEntry::new(item_id.clone(), classification.answer.clone()));
        }
        self.visited.insert(item_id.clone());
        self.outcomes.push((item_id, outcome));
    }

    /// 分類APIを呼んだ件数
    pub fn oracle_calls(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.called_oracle()).count()
    }
}

/// 書き込んだスナップショット
#[derive(Debug, Clone, Default)]
pub struct PersistedSnapshots {
    pub visited: Option<PathBuf>,
    pub matched: Option<PathBuf>,
}

/// 実行結果を台帳に書き込む
///
/// - matched: 今回一致があれば 既存 ∪ 今回
/// - visited: 今回訪問があれば 既存 ∪ 今回
///
/// matched を先に書く。matched の書き込みに失敗した場合は visited も書かないので、
/// 一致した出品が記録されないまま訪問済みになることはない
pub fn persist(
    ledger: &Ledger,
    plan: &RunPlan,
    report: &RunReport,
    timestamp: NaiveDateTime,
) -> Result<PersistedSnapshots> {
    let mut persisted = PersistedSnapshots::default();

    if !report.matched.is_empty() {
        let matched: BTreeSet<String> = plan
            .matched_before
            .iter()
            .cloned()
            .chain(report.matched.iter().map(|m| m.to_string()))
            .collect();
        persisted.matched = Some(ledger.append_snapshot(LedgerKind::Matched, &matched, timestamp)?);
    }

    if !report.visited.is_empty() {
        let visited: BTreeSet<&ItemId> = plan.visited_before.iter().chain(report.visited.iter()).collect();
        persisted.visited = Some(ledger.append_snapshot(LedgerKind::Visited, &visited, timestamp)?);
    }

    Ok(persisted)
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub report: RunReport,
    pub persisted: PersistedSnapshots,
}

/// 1回のバッチ実行（ログイン → 全件処理 → セッション終了 → 台帳書き込み）
///
/// 未訪問IDがなければログインもせずに終わる。ログイン失敗時は何も書き込まない
pub async fn run_batch<B, C, A>(
    ledger: &Ledger,
    plan: &RunPlan,
    pipeline: &mut Pipeline<'_, B, C, A>,
    credentials: &Credentials,
    show_progress: bool,
) -> Result<BatchSummary>
where
    B: BrowserBackend,
    C: CompletionBackend,
    A: AlertDispatcher,
{
    if plan.is_empty() {
        tracing::info!("no pending items");
        return Ok(BatchSummary::default());
    }

    if let Err(e) = pipeline.authenticate(credentials).await {
        pipeline.close().await;
        return Err(e);
    }

    tracing::info!(pending = plan.pending.len(), "batch started");
    let report = pipeline.run(&plan.pending, show_progress).await;
    pipeline.close().await;

    let persisted = persist(ledger, plan, &report, chrono::Local::now().naive_local())?;
    tracing::info!(
        visited = report.visited.len(),
        matched = report.matched.len(),
        oracle_calls = report.oracle_calls(),
        "batch finished"
    );

    Ok(BatchSummary { report, persisted })
}
