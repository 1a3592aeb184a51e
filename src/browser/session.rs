//! ページセッション制御
//!
//! 状態遷移:
//! `Unauthenticated → Authenticated → (出品ごと: 遷移 → モーダル処理 → 本文展開 → 描画取得) → Closed`
//!
//! ログイン失敗は実行全体の失敗。出品ごとの手順のうち、モーダルと「See more」は
//! 存在しないのが通常ケースなので、見つからなくても失敗にしない。

use super::{BrowserBackend, Selector};
use crate::error::{ListingAiError, Result};
use listing_ai_common::ItemId;
use std::fmt;
use std::time::Duration;

const LOGIN_EMAIL_SELECTOR: &str = "input#email";
const LOGIN_PASSWORD_SELECTOR: &str = "input#pass";
const LOGIN_BUTTON_SELECTOR: &str = r#"button[name="login"]"#;
const CLOSE_BUTTON_SELECTOR: &str = r#"[aria-label="Close"]"#;
const SEE_MORE_XPATH: &str = r#"//text()[contains(., "...")]/following::span[contains(text(), "See more")][1]"#;

/// ログインフォームの要素を待つ上限
const LOGIN_ELEMENT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub login_url: String,
    pub item_url_base: String,
    /// モーダルの出現を待つ上限
    pub interstitial_timeout: Duration,
    /// モーダル処理後の描画待ち
    pub settle: Duration,
    /// ログイン前後の描画待ち
    pub login_settle: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    Closed,
}

pub struct PageSession<B: BrowserBackend> {
    backend: B,
    settings: SessionSettings,
    state: SessionState,
}

impl<B: BrowserBackend> PageSession<B> {
    pub fn new(backend: B, settings: SessionSettings) -> Self {
        Self {
            backend,
            settings,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn item_url(&self, item_id: &ItemId) -> String {
        format!("{}{}", self.settings.item_url_base, item_id)
    }

    /// ログイン（1回の実行で1度だけ）
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        if self.state != SessionState::Unauthenticated {
            return Err(ListingAiError::Authentication(format!(
                "ログインできない状態です: {:?}",
                self.state
            )));
        }

        self.login(credentials).await.map_err(|e| match e {
            ListingAiError::Authentication(_) => e,
            other => ListingAiError::Authentication(other.to_string()),
        })?;

        self.state = SessionState::Authenticated;
        tracing::info!("authenticated");
        Ok(())
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<()> {
        self.backend.navigate(&self.settings.login_url).await?;
        self.backend.pause(self.settings.login_settle).await;

        let email = self.find_required(LOGIN_EMAIL_SELECTOR).await?;
        self.backend.fill(&email, &credentials.email).await?;

        let password = self.find_required(LOGIN_PASSWORD_SELECTOR).await?;
        self.backend.fill(&password, &credentials.password).await?;

        let button = self.find_required(LOGIN_BUTTON_SELECTOR).await?;
        self.backend.click(&button).await?;
        self.backend.pause(self.settings.login_settle).await;
        Ok(())
    }

    async fn find_required(&mut self, css: &str) -> Result<B::Element> {
        self.backend
            .find(&Selector::css(css), LOGIN_ELEMENT_TIMEOUT)
            .await?
            .ok_or_else(|| ListingAiError::Authentication(format!("ログインフォームの要素が見つかりません: {}", css)))
    }

    /// 出品ページを開き、描画済みHTMLを返す
    ///
    /// 遷移とHTML取得の失敗だけがエラー。モーダル・本文展開の有無は問わない
    pub async fn render_item(&mut self, item_id: &ItemId) -> Result<String> {
        if self.state != SessionState::Authenticated {
            return Err(ListingAiError::Browser(format!(
                "未ログインまたは終了済みのセッションです: {:?}",
                self.state
            )));
        }

        let url = self.item_url(item_id);
        self.backend
            .navigate(&url)
            .await
            .map_err(|e| ListingAiError::Navigation(format!("{}: {}", url, e)))?;
        tracing::debug!(item_id = %item_id, url = %url, "navigated");

        self.dismiss_interstitial(item_id).await;
        self.backend.pause(self.settings.settle).await;
        self.expand_truncated_text(item_id).await;

        let markup = self.backend.rendered_markup().await?;
        tracing::debug!(item_id = %item_id, bytes = markup.len(), "rendered");
        Ok(markup)
    }

    /// ブロッキングモーダルの「閉じる」を押す。押せたら true
    async fn dismiss_interstitial(&mut self, item_id: &ItemId) -> bool {
        let selector = Selector::css(CLOSE_BUTTON_SELECTOR);
        match self.backend.find(&selector, self.settings.interstitial_timeout).await {
            Ok(Some(button)) => match self.backend.click(&button).await {
                Ok(()) => {
                    tracing::debug!(item_id = %item_id, "interstitial dismissed");
                    true
                }
                Err(e) => {
                    tracing::warn!(item_id = %item_id, error = %e, "interstitial click failed, continuing");
                    false
                }
            },
            Ok(None) => {
                tracing::debug!(item_id = %item_id, "no interstitial");
                false
            }
            Err(e) => {
                tracing::warn!(item_id = %item_id, error = %e, "interstitial lookup failed, continuing");
                false
            }
        }
    }

    /// 省略された本文の「See more」を押す。押せたら true
    async fn expand_truncated_text(&mut self, item_id: &ItemId) -> bool {
        let selector = Selector::xpath(SEE_MORE_XPATH);
        match self.backend.find(&selector, Duration::ZERO).await {
            Ok(Some(link)) => match self.backend.click(&link).await {
                Ok(()) => {
                    tracing::debug!(item_id = %item_id, "truncated text expanded");
                    true
                }
                Err(e) => {
                    tracing::warn!(item_id = %item_id, error = %e, "see-more click failed, continuing");
                    false
                }
            },
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(item_id = %item_id, error = %e, "see-more lookup failed, continuing");
                false
            }
        }
    }

    pub async fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        self.state = SessionState::Closed;
        self.backend.close().await
    }
}
