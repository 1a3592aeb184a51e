//! テスト用のブラウザ・分類API・通知のフェイク実装

#![allow(dead_code)]

use async_trait::async_trait;
use listing_ai_common::ItemId;
use listing_ai_rust::alert::AlertDispatcher;
use listing_ai_rust::browser::{BrowserBackend, PageSession, Selector, SessionSettings};
use listing_ai_rust::error::{ListingAiError, Result};
use listing_ai_rust::oracle::CompletionBackend;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ITEM_URL_BASE: &str = "https://example.test/item/";
pub const LOGIN_URL: &str = "https://example.test/login";

pub const CLOSE_BUTTON: &str = r#"css:[aria-label="Close"]"#;
pub const LOGIN_FORM: [&str; 3] = ["css:input#email", "css:input#pass", r#"css:button[name="login"]"#];

/// 出品ページのHTMLを組み立てる
pub fn listing_page(heading: &str, details: &str) -> String {
    format!(
        r#"<html><body>
        <span>Buy-and-sell groups</span><h1>{heading}</h1><span>Listed 3 hours ago</span>
        <div>Details</div><p>{details}</p>
        <h2>Seller information</h2><span>Seller</span>
        </body></html>"#
    )
}

/// "Seller information" のないページ
pub fn page_without_seller() -> String {
    "<html><body><div>Details</div><p>hali rug</p></body></html>".to_string()
}

pub fn settings() -> SessionSettings {
    SessionSettings {
        login_url: LOGIN_URL.into(),
        item_url_base: ITEM_URL_BASE.into(),
        interstitial_timeout: Duration::from_millis(5),
        settle: Duration::ZERO,
        login_settle: Duration::ZERO,
    }
}

pub fn item_url(id: &str) -> String {
    format!("{}{}", ITEM_URL_BASE, id)
}

/// 呼び出しを記録するブラウザ
#[derive(Default)]
pub struct FakeBrowser {
    pub pages: HashMap<String, String>,
    pub present: HashSet<String>,
    pub failing_urls: HashSet<String>,
    pub failing_clicks: HashSet<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub current_url: Option<String>,
}

impl FakeBrowser {
    /// ログインフォームが表示されるブラウザ
    pub fn with_login_form() -> Self {
        let mut browser = Self::default();
        browser.present.extend(LOGIN_FORM.iter().map(|s| s.to_string()));
        browser
    }

    pub fn page(mut self, id: &str, markup: String) -> Self {
        self.pages.insert(item_url(id), markup);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("navigate:").map(String::from))
            .collect()
    }

    fn log(&self, entry: String) {
        self.calls.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl BrowserBackend for FakeBrowser {
    type Element = String;

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.log(format!("navigate:{}", url));
        if self.failing_urls.contains(url) {
            return Err(ListingAiError::Navigation(format!("{}: timeout", url)));
        }
        self.current_url = Some(url.to_string());
        Ok(())
    }

    async fn find(&mut self, selector: &Selector, _timeout: Duration) -> Result<Option<String>> {
        let key = selector.to_string();
        self.log(format!("find:{}", key));
        Ok(self.present.contains(&key).then_some(key))
    }

    async fn click(&mut self, element: &String) -> Result<()> {
        self.log(format!("click:{}", element));
        if self.failing_clicks.contains(element) {
            return Err(ListingAiError::Browser("element not interactable".into()));
        }
        Ok(())
    }

    async fn fill(&mut self, element: &String, value: &str) -> Result<()> {
        self.log(format!("fill:{}={}", element, value));
        Ok(())
    }

    async fn rendered_markup(&mut self) -> Result<String> {
        self.log("markup".into());
        let url = self.current_url.clone().unwrap_or_default();
        Ok(self.pages.get(&url).cloned().unwrap_or_else(|| "<html></html>".into()))
    }

    async fn pause(&mut self, _duration: Duration) {}

    async fn close(&mut self) -> Result<()> {
        self.log("close".into());
        Ok(())
    }
}

pub fn session(browser: FakeBrowser) -> PageSession<FakeBrowser> {
    PageSession::new(browser, settings())
}

/// 決まった応答を返す分類API
pub struct FakeOracle {
    answers: Mutex<VecDeque<Result<String>>>,
    default_answer: String,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeOracle {
    pub fn answering(answer: &str) -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            default_answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// 次の呼び出しで返す応答を積む
    pub fn then(self, answer: Result<String>) -> Self {
        self.answers.lock().unwrap().push_back(answer);
        self
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionBackend for FakeOracle {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.answers.lock().unwrap().pop_front() {
            Some(answer) => answer,
            None => Ok(self.default_answer.clone()),
        }
    }
}

/// 通知されたIDを記録する
#[derive(Default)]
pub struct RecordingAlerts {
    pub notified: Mutex<Vec<ItemId>>,
}

impl RecordingAlerts {
    pub fn ids(&self) -> Vec<String> {
        self.notified.lock().unwrap().iter().map(|id| id.to_string()).collect()
    }
}

#[async_trait]
impl AlertDispatcher for RecordingAlerts {
    async fn notify(&self, item_id: &ItemId) {
        self.notified.lock().unwrap().push(item_id.clone());
    }
}
