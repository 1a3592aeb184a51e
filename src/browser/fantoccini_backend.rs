//! WebDriver（fantoccini）によるブラウザバックエンド
//!
//! 事前に chromedriver / geckodriver を起動しておくこと（既定: http://localhost:4444）

use super::{BrowserBackend, Selector};
use crate::error::{ListingAiError, Result};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;

pub struct FantocciniBackend {
    client: Client,
}

impl FantocciniBackend {
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self> {
        let mut chrome_args = vec!["--disable-gpu", "--window-size=1280,1024"];
        let mut firefox_args = Vec::new();
        if headless {
            chrome_args.push("--headless=new");
            firefox_args.push("-headless");
        }

        let mut caps = serde_json::Map::new();
        caps.insert("goog:chromeOptions".into(), json!({ "args": chrome_args }));
        caps.insert("moz:firefoxOptions".into(), json!({ "args": firefox_args }));

        tracing::info!(webdriver_url, headless, "connecting to webdriver");
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .map_err(|e| ListingAiError::WebDriver(format!("{}: {}", webdriver_url, e)))?;

        Ok(Self { client })
    }
}

fn to_locator(selector: &Selector) -> Locator<'_> {
    match selector {
        Selector::Css(css) => Locator::Css(css),
        Selector::XPath(xpath) => Locator::XPath(xpath),
    }
}

/// 要素がないことを示すエラーか（異常ではない）
fn is_absent(error: &CmdError) -> bool {
    matches!(error, CmdError::WaitTimeout) || error.is_no_such_element()
}

fn browser_error(context: &str, error: CmdError) -> ListingAiError {
    ListingAiError::Browser(format!("{}: {}", context, error))
}

#[async_trait]
impl BrowserBackend for FantocciniBackend {
    type Element = Element;

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.client
            .goto(url)
            .await
            .map_err(|e| ListingAiError::Navigation(format!("{}: {}", url, e)))
    }

    async fn find(&mut self, selector: &Selector, timeout: Duration) -> Result<Option<Element>> {
        let locator = to_locator(selector);
        let found = if timeout.is_zero() {
            self.client.find(locator).await
        } else {
            self.client.wait().at_most(timeout).for_element(locator).await
        };

        match found {
            Ok(element) => Ok(Some(element)),
            Err(e) if is_absent(&e) => Ok(None),
            Err(e) => Err(browser_error(&selector.to_string(), e)),
        }
    }

    async fn click(&mut self, element: &Element) -> Result<()> {
        element.click().await.map_err(|e| browser_error("click", e))
    }

    async fn fill(&mut self, element: &Element, value: &str) -> Result<()> {
        element.clear().await.map_err(|e| browser_error("clear", e))?;
        element.send_keys(value).await.map_err(|e| browser_error("send_keys", e))
    }

    async fn rendered_markup(&mut self) -> Result<String> {
        self.client.source().await.map_err(|e| browser_error("source", e))
    }

    async fn pause(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn close(&mut self) -> Result<()> {
        tracing::info!("closing webdriver session");
        self.client.clone().close().await.map_err(|e| browser_error("close", e))
    }
}
