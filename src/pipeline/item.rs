//! 出品ごとの処理

use super::RunReport;
use crate::alert::AlertDispatcher;
use crate::browser::{BrowserBackend, Credentials, PageSession};
use crate::error::Result;
use crate::oracle::{CompletionBackend, Oracle};
use indicatif::{ProgressBar, ProgressStyle};
use listing_ai_common::{accepts, extract, CandidateFilter, Classification, FilterDecision, ItemId, TargetEnvelope};

/// 1件の処理結果。どれも「訪問済み」として終端する
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// ページの遷移・取得に失敗
    FetchFailed(String),
    /// "Seller information" がなく抽出不能
    NoSnapshot,
    /// 除外キーワードに該当
    Excluded,
    /// 必須キーワードなし
    NotCandidate,
    /// 分類APIの呼び出しに失敗
    OracleFailed(String),
    /// 分類の結果、対象外または寸法が範囲外・不明
    Rejected(Classification),
    /// 一致（通知済み）
    Matched(Classification),
}

impl ItemOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ItemOutcome::FetchFailed(_) => "fetch_failed",
            ItemOutcome::NoSnapshot => "no_snapshot",
            ItemOutcome::Excluded => "excluded",
            ItemOutcome::NotCandidate => "not_candidate",
            ItemOutcome::OracleFailed(_) => "oracle_failed",
            ItemOutcome::Rejected(_) => "rejected",
            ItemOutcome::Matched(_) => "matched",
        }
    }

    pub fn called_oracle(&self) -> bool {
        matches!(
            self,
            ItemOutcome::OracleFailed(_) | ItemOutcome::Rejected(_) | ItemOutcome::Matched(_)
        )
    }

    pub fn is_match(&self) -> bool {
        matches!(self, ItemOutcome::Matched(_))
    }
}

/// 描画済みHTMLを 抽出 → フィルタ → 分類 → 寸法判定 まで評価する（通知はしない）
///
/// 分類APIはフィルタを通過した場合にだけ呼ぶ
pub async fn evaluate_markup<C: CompletionBackend>(
    markup: &str,
    filter: &CandidateFilter,
    oracle: &Oracle<C>,
    envelope: &TargetEnvelope,
) -> ItemOutcome {
    let Some(snapshot) = extract(markup) else {
        return ItemOutcome::NoSnapshot;
    };

    match filter.gate(&snapshot.details_text, &snapshot.heading_text) {
        FilterDecision::Excluded => return ItemOutcome::Excluded,
        FilterDecision::NotRelevant => return ItemOutcome::NotCandidate,
        FilterDecision::Candidate => {}
    }

    let classification = match oracle.classify(&snapshot).await {
        Ok(c) => c,
        Err(e) => return ItemOutcome::OracleFailed(e.to_string()),
    };

    if accepts(&classification.result, envelope) {
        ItemOutcome::Matched(classification)
    } else {
        ItemOutcome::Rejected(classification)
    }
}

/// 1回の実行で使う部品一式。ページセッションは実行中この構造体が占有する
pub struct Pipeline<'a, B: BrowserBackend, C: CompletionBackend, A: AlertDispatcher> {
    session: &'a mut PageSession<B>,
    oracle: &'a Oracle<C>,
    filter: &'a CandidateFilter,
    envelope: TargetEnvelope,
    alerts: &'a A,
}

impl<'a, B: BrowserBackend, C: CompletionBackend, A: AlertDispatcher> Pipeline<'a, B, C, A> {
    pub fn new(
        session: &'a mut PageSession<B>,
        oracle: &'a Oracle<C>,
        filter: &'a CandidateFilter,
        envelope: TargetEnvelope,
        alerts: &'a A,
    ) -> Self {
        Self {
            session,
            oracle,
            filter,
            envelope,
            alerts,
        }
    }

    /// ログイン。失敗は実行全体の失敗
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        self.session.authenticate(credentials).await
    }

    /// 1件処理。一致すれば通知する
    pub async fn process_item(&mut self, item_id: &ItemId) -> ItemOutcome {
        let outcome = match self.session.render_item(item_id).await {
            Ok(markup) => evaluate_markup(&markup, self.filter, self.oracle, &self.envelope).await,
            Err(e) => ItemOutcome::FetchFailed(e.to_string()),
        };

        match &outcome {
            ItemOutcome::Matched(c) => {
                tracing::info!(item_id = %item_id, answer = %c.answer, "listing matched");
                self.alerts.notify(item_id).await;
            }
            ItemOutcome::FetchFailed(e) | ItemOutcome::OracleFailed(e) => {
                tracing::warn!(item_id = %item_id, outcome = outcome.label(), error = %e, "item skipped");
            }
            ItemOutcome::Rejected(c) => {
                tracing::info!(item_id = %item_id, answer = %c.answer, "classified, not accepted");
            }
            _ => {
                tracing::info!(item_id = %item_id, outcome = outcome.label(), "item filtered");
            }
        }

        outcome
    }

    /// 未訪問IDを順に処理（逐次、再試行なし）
    pub async fn run(&mut self, pending: &[ItemId], show_progress: bool) -> RunReport {
        let progress = if show_progress {
            ProgressBar::new(pending.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template("  {bar:30} {pos}/{len} {msg}") {
            progress.set_style(style);
        }

        let mut report = RunReport::default();
        for item_id in pending {
            progress.set_message(item_id.to_string());
            let outcome = self.process_item(item_id).await;
            report.record(item_id.clone(), outcome);
            progress.inc(1);
        }
        progress.finish_and_clear();

        report
    }

    pub async fn close(&mut self) {
        if let Err(e) = self.session.close().await {
            tracing::warn!(error = %e, "failed to close browser session");
        }
    }
}
