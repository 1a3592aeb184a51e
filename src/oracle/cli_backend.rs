//! ローカルAI CLI（claude / codex / gemini）バックエンド

use super::CompletionBackend;
use crate::ai_provider::AiProvider;
use crate::error::{ListingAiError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;

pub struct CliBackend {
    provider: AiProvider,
    timeout: Duration,
}

impl CliBackend {
    pub fn new(provider: AiProvider, timeout: Duration) -> Result<Self> {
        if provider.command_name().is_none() {
            return Err(ListingAiError::Config(format!("{:?} はCLIプロバイダではありません", provider)));
        }
        Ok(Self { provider, timeout })
    }
}

#[async_trait]
impl CompletionBackend for CliBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let command = self
            .provider
            .command_name()
            .ok_or_else(|| ListingAiError::Config("CLIコマンドが未定義です".into()))?;

        // Windowsではcmd /c経由
        #[cfg(windows)]
        let mut cmd = {
            let mut c = Command::new("cmd");
            c.arg("/c").arg(command);
            c
        };

        #[cfg(not(windows))]
        let mut cmd = Command::new(command);

        cmd.args(self.provider.cli_args(prompt)).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| ListingAiError::ApiCall(format!("{} CLIがタイムアウトしました ({:?})", command, self.timeout)))?
            .map_err(|e| ListingAiError::ApiCall(format!("{} CLI実行エラー: {}", command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ListingAiError::ApiCall(format!(
                "{} CLI failed (code {:?}): {}",
                command,
                output.status.code(),
                stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
