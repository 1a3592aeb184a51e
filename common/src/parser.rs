//! 分類API応答パーサー
//!
//! 応答は次のいずれか:
//! - `no`
//! - `yes|<d1>|<d2>`（d1/d2 は小数のメートル値、または `na`）
//!
//! それ以外の形式は不正応答として `NotMatch` 扱いにし、ログだけ残す。
//! 分類APIの不安定さで実行全体を止めないため、ここではエラーを伝播しない。

use crate::error::{Error, Result};
use crate::types::ClassificationResult;

const ANSWER_NO: &str = "no";
const ANSWER_YES: &str = "yes";
const UNKNOWN_DIMENSION: &str = "na";

/// 応答を正規化（前後空白の除去と小文字化）
pub fn normalize_answer(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// 正規化済み応答を厳密にパース
///
/// # Returns
/// * `Ok(ClassificationResult)` - `no` / `yes|d1|d2` のいずれか
/// * `Err(Error::Parse)` - 形式不正
pub fn parse_answer(answer: &str) -> Result<ClassificationResult> {
    if answer == ANSWER_NO {
        return Ok(ClassificationResult::NotMatch);
    }

    let parts: Vec<&str> = answer.split('|').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(Error::Parse(format!(
            "区切り数が不正 ({}個): {:?}",
            parts.len(),
            answer
        )));
    }

    if parts[0] != ANSWER_YES {
        return Err(Error::Parse(format!("先頭がyes/noではありません: {:?}", answer)));
    }

    if parts[1].is_empty() || parts[2].is_empty() {
        return Err(Error::Parse(format!("寸法が欠落しています: {:?}", answer)));
    }

    match (parse_dimension(parts[1]), parse_dimension(parts[2])) {
        (Some(width_m), Some(height_m)) => Ok(ClassificationResult::Match { width_m, height_m }),
        _ => Ok(ClassificationResult::MatchUnknownDims),
    }
}

/// 応答を分類結果に変換。不正応答は `NotMatch` としてログに残す
pub fn classify_answer(answer: &str) -> ClassificationResult {
    match parse_answer(answer) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(answer, error = %e, "malformed classification answer, treating as no match");
            ClassificationResult::NotMatch
        }
    }
}

fn parse_dimension(segment: &str) -> Option<f64> {
    if segment == UNKNOWN_DIMENSION {
        return None;
    }
    segment.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no() {
        assert_eq!(classify_answer("no"), ClassificationResult::NotMatch);
    }

    #[test]
    fn test_yes_with_dimensions() {
        assert_eq!(
            classify_answer("yes|2.5|2.0"),
            ClassificationResult::Match { width_m: 2.5, height_m: 2.0 }
        );
    }

    #[test]
    fn test_yes_with_na() {
        assert_eq!(classify_answer("yes|na|2.0"), ClassificationResult::MatchUnknownDims);
        assert_eq!(classify_answer("yes|na|na"), ClassificationResult::MatchUnknownDims);
    }

    #[test]
    fn test_yes_with_non_numeric_dimension() {
        assert_eq!(classify_answer("yes|2m|1.5"), ClassificationResult::MatchUnknownDims);
        assert_eq!(classify_answer("yes|inf|1.5"), ClassificationResult::MatchUnknownDims);
    }

    #[test]
    fn test_malformed_is_not_match() {
        assert_eq!(classify_answer("maybe"), ClassificationResult::NotMatch);
        assert_eq!(classify_answer("yes|2.5"), ClassificationResult::NotMatch);
        assert_eq!(classify_answer("yes|2.5|2.0|1.0"), ClassificationResult::NotMatch);
        assert_eq!(classify_answer("no|2.5|2.0"), ClassificationResult::NotMatch);
        assert_eq!(classify_answer(""), ClassificationResult::NotMatch);
    }

    #[test]
    fn test_malformed_reports_parse_error() {
        assert!(matches!(parse_answer("maybe"), Err(Error::Parse(_))));
        assert!(matches!(parse_answer("yes||2.0"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_segments_are_trimmed() {
        assert_eq!(
            parse_answer("yes | 3.0 | 2.0").unwrap(),
            ClassificationResult::Match { width_m: 3.0, height_m: 2.0 }
        );
    }

    #[test]
    fn test_normalize_answer() {
        assert_eq!(normalize_answer("  YES|2.9|2.4\n"), "yes|2.9|2.4");
        assert_eq!(classify_answer(&normalize_answer(" No ")), ClassificationResult::NotMatch);
    }
}
