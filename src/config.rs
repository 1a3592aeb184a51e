use crate::browser::{Credentials, SessionSettings};
use crate::error::{ListingAiError, Result};
use listing_ai_common::prompts::DEFAULT_CATEGORY;
use listing_ai_common::{CandidateFilter, TargetEnvelope};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub timeout_seconds: u64,

    pub webdriver_url: String,
    pub headless: bool,
    pub login_url: String,
    pub item_url_base: String,
    pub login_email: Option<String>,
    pub login_password: Option<String>,
    pub interstitial_timeout_ms: u64,
    pub settle_ms: u64,
    pub login_settle_ms: u64,

    pub data_dir: PathBuf,
    pub category: String,
    pub exclude_keywords: Vec<String>,
    pub essential_keywords: Vec<String>,
    pub envelope: TargetEnvelope,

    pub alert_webhook: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let filter = CandidateFilter::default();
        Self {
            api_key: None,
            model: "gpt-3.5-turbo".into(),
            api_base_url: "https://api.openai.com/v1".into(),
            timeout_seconds: 60,
            webdriver_url: "http://localhost:4444".into(),
            headless: true,
            login_url: "https://www.facebook.com/marketplace/melbourne/search?daysSinceListed=1&query=grange".into(),
            item_url_base: "https://www.facebook.com/marketplace/item/".into(),
            login_email: None,
            login_password: None,
            interstitial_timeout_ms: 5000,
            settle_ms: 2000,
            login_settle_ms: 3000,
            data_dir: PathBuf::from("data"),
            category: DEFAULT_CATEGORY.into(),
            exclude_keywords: filter.exclude_keywords,
            essential_keywords: filter.essential_keywords,
            envelope: TargetEnvelope::default(),
            alert_webhook: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスから読み込み。ファイルがなければデフォルト
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ListingAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("listing-ai").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        let env = &self.envelope;
        if !(0.0..1.0).contains(&env.tolerance) {
            return Err(ListingAiError::Config(format!(
                "許容誤差は0以上1未満で指定してください: {}",
                env.tolerance
            )));
        }
        if env.desired_width <= 0.0 || env.desired_height <= 0.0 {
            return Err(ListingAiError::Config(format!(
                "目標寸法は正の値で指定してください: {} x {}",
                env.desired_width, env.desired_height
            )));
        }
        if self.item_url_base.is_empty() {
            return Err(ListingAiError::Config("item_url_base が空です".into()));
        }
        Ok(())
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        for var in ["OPENAI_API_KEY", "CHATGPT_API"] {
            if let Ok(key) = std::env::var(var) {
                if !key.trim().is_empty() {
                    return Ok(key);
                }
            }
        }

        self.api_key.clone().ok_or(ListingAiError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let email = std::env::var("FB_EMAIL").ok().or_else(|| self.login_email.clone());
        let password = std::env::var("FB_PASSWORD").ok().or_else(|| self.login_password.clone());

        match (email, password) {
            (Some(email), Some(password)) => Ok(Credentials { email, password }),
            _ => Err(ListingAiError::MissingCredentials),
        }
    }

    pub fn candidate_filter(&self) -> CandidateFilter {
        CandidateFilter::new(self.exclude_keywords.clone(), self.essential_keywords.clone())
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            login_url: self.login_url.clone(),
            item_url_base: self.item_url_base.clone(),
            interstitial_timeout: Duration::from_millis(self.interstitial_timeout_ms),
            settle: Duration::from_millis(self.settle_ms),
            login_settle: Duration::from_millis(self.login_settle_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
