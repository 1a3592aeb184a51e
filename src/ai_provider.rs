use clap::ValueEnum;

/// 分類に使うAIプロバイダ
///
/// OpenAi はHTTP API、それ以外はローカルのCLIを子プロセスで呼び出す
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum AiProvider {
    #[default]
    #[value(name = "openai")]
    OpenAi,
    Claude,
    Codex,
    Gemini,
}

impl AiProvider {
    pub fn command_name(&self) -> Option<&'static str> {
        match self {
            AiProvider::OpenAi => None,
            AiProvider::Claude => Some("claude"),
            AiProvider::Codex => Some("codex"),
            AiProvider::Gemini => Some("gemini"),
        }
    }

    /// CLI呼び出し時の引数（プロンプトを1引数として渡す）
    pub fn cli_args(&self, prompt: &str) -> Vec<String> {
        match self {
            AiProvider::OpenAi => Vec::new(),
            AiProvider::Claude => vec!["-p".into(), prompt.into(), "--output-format".into(), "text".into()],
            AiProvider::Codex => vec!["exec".into(), prompt.into()],
            AiProvider::Gemini => vec!["-p".into(), prompt.into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names() {
        assert_eq!(AiProvider::OpenAi.command_name(), None);
        assert_eq!(AiProvider::Claude.command_name(), Some("claude"));
    }

    #[test]
    fn test_claude_args() {
        let args = AiProvider::Claude.cli_args("is it a rug?");
        assert_eq!(args, vec!["-p", "is it a rug?", "--output-format", "text"]);
    }

    #[test]
    fn test_value_enum_names() {
        assert_eq!(AiProvider::from_str("openai", true).unwrap(), AiProvider::OpenAi);
        assert_eq!(AiProvider::from_str("gemini", true).unwrap(), AiProvider::Gemini);
    }
}
