//! ローカル候補フィルタ
//!
//! 分類API（高コスト）を呼ぶ前の安価な判定。
//! 除外キーワード → 必須キーワードの順で評価し、両方を通過したものだけが候補になる。

use serde::{Deserialize, Serialize};

/// フィルタ判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// 除外キーワードを含む
    Excluded,
    /// 必須キーワードを含まない
    NotRelevant,
    /// 分類APIに送る
    Candidate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateFilter {
    pub exclude_keywords: Vec<String>,
    pub essential_keywords: Vec<String>,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self {
            exclude_keywords: vec!["abc".into(), "xyz".into()],
            essential_keywords: vec!["hali".into()],
        }
    }
}

impl CandidateFilter {
    pub fn new(exclude_keywords: Vec<String>, essential_keywords: Vec<String>) -> Self {
        Self {
            exclude_keywords,
            essential_keywords,
        }
    }

    /// 本文に除外キーワードが含まれるか（大文字小文字を区別しない）
    pub fn is_excluded(&self, details_text: &str) -> bool {
        contains_any(details_text, &self.exclude_keywords)
    }

    /// 本文または見出しに必須キーワードが含まれるか（大文字小文字を区別しない）
    pub fn is_relevant_candidate(&self, details_text: &str, heading_text: &str) -> bool {
        contains_any(details_text, &self.essential_keywords)
            || contains_any(heading_text, &self.essential_keywords)
    }

    /// 除外判定を先に行い、通過したものだけ必須キーワードを確認
    pub fn gate(&self, details_text: &str, heading_text: &str) -> FilterDecision {
        if self.is_excluded(details_text) {
            FilterDecision::Excluded
        } else if self.is_relevant_candidate(details_text, heading_text) {
            FilterDecision::Candidate
        } else {
            FilterDecision::NotRelevant
        }
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    let text_lower = text.to_lowercase();
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .any(|k| text_lower.contains(&k))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> CandidateFilter {
        CandidateFilter::new(vec!["Broken".into(), "wanted".into()], vec!["hali".into(), "rug".into()])
    }

    #[test]
    fn test_excluded_case_insensitive() {
        assert!(filter().is_excluded("Slightly BROKEN edge"));
        assert!(!filter().is_excluded("Like new"));
    }

    #[test]
    fn test_relevant_in_either_field() {
        let f = filter();
        assert!(f.is_relevant_candidate("Beautiful HALI", ""));
        assert!(f.is_relevant_candidate("", "Persian Rug"));
        assert!(!f.is_relevant_candidate("oak table", "dining set"));
    }

    #[test]
    fn test_gate_exclusion_wins_over_relevance() {
        assert_eq!(filter().gate("wanted: hali rug", "hali"), FilterDecision::Excluded);
    }

    #[test]
    fn test_gate_order() {
        let f = filter();
        assert_eq!(f.gate("hali 2x3", ""), FilterDecision::Candidate);
        assert_eq!(f.gate("oak table", "chair"), FilterDecision::NotRelevant);
    }

    #[test]
    fn test_exclusion_checks_details_only() {
        // 除外キーワードは本文のみが対象
        assert_eq!(filter().gate("hali rug", "broken"), FilterDecision::Candidate);
    }

    #[test]
    fn test_blank_keywords_ignored() {
        let f = CandidateFilter::new(vec!["".into()], vec!["  ".into()]);
        assert!(!f.is_excluded("anything"));
        assert!(!f.is_relevant_candidate("anything", "anything"));
    }

    #[test]
    fn test_default_keywords() {
        let f = CandidateFilter::default();
        assert_eq!(f.gate("Hali runner", ""), FilterDecision::Candidate);
        assert_eq!(f.gate("hali xyz", ""), FilterDecision::Excluded);
    }
}
