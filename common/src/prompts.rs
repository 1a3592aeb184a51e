//! 分類プロンプト生成モジュール
//!
//! - SYSTEM_PROMPT: チャットAPIのシステムメッセージ
//! - DEFAULT_CATEGORY: 判定対象カテゴリの既定値
//! - build_classification_prompt: 本文・見出しを埋め込んだ分類用プロンプト

/// チャットAPIのシステムメッセージ
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// 判定対象カテゴリの既定値
pub const DEFAULT_CATEGORY: &str = "rug or floor runner";

/// 本文と見出しの区切り
pub const FIELD_SEPARATOR: &str = "|||";

/// 分類プロンプト生成
///
/// 応答は `yes|d1|d2`（寸法はメートル、不明なら `na`）または `no` のみを要求する
///
/// # Arguments
/// * `description` - 本文窓のテキスト
/// * `heading` - 見出し窓のテキスト
/// * `category` - 判定対象カテゴリ（例: "rug or floor runner"）
pub fn build_classification_prompt(description: &str, heading: &str, category: &str) -> String {
    format!(
        r#"Based on the following description and title for an item listed on Facebook Marketplace, determine if the item is a {category}. Respond strictly in the format 'yes|d1|d2' if it is a {category}, with 'd1' and 'd2' as the dimensions in meters. If the item is not a {category}, respond with 'no'. If dimensions cannot be determined, use 'na' for 'd1' and 'd2'.

Description: {description}
{FIELD_SEPARATOR}
Title: {heading}

Note: Your response should strictly follow the 'yes|d1|d2' or 'no' format without additional explanations."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_both_fields() {
        let prompt = build_classification_prompt("Wool, 2.9 x 2.4 m", "Hali rug", DEFAULT_CATEGORY);

        assert!(prompt.contains("Description: Wool, 2.9 x 2.4 m"));
        assert!(prompt.contains("Title: Hali rug"));
        assert!(prompt.contains("|||"));
    }

    #[test]
    fn test_prompt_requests_micro_format() {
        let prompt = build_classification_prompt("", "", DEFAULT_CATEGORY);

        assert!(prompt.contains("'yes|d1|d2'"));
        assert!(prompt.contains("'no'"));
        assert!(prompt.contains("'na'"));
    }

    #[test]
    fn test_prompt_uses_category() {
        let prompt = build_classification_prompt("desc", "title", "sofa");

        assert!(prompt.contains("determine if the item is a sofa"));
        assert!(!prompt.contains(DEFAULT_CATEGORY));
    }
}
