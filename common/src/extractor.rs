//! 出品ページ本文抽出モジュール
//!
//! 描画済みHTMLをテキストノード列に平坦化し、マーカー文字列で区切られた
//! 2つの窓を切り出す:
//! - 本文: "Details" 〜 "Seller information"（両端を含まない）
//! - 見出し: "Buy-and-sell groups" 〜 "Listed"（両端を含まない）
//!
//! 窓の切り出しはテキスト列に対する純粋関数なので、ブラウザなしで検証できる。

use crate::types::ListingSnapshot;
use scraper::Html;

/// 本文窓の開始マーカー
pub const DETAILS_MARKER: &str = "Details";
/// 本文窓の終了マーカー（ページに存在しなければ抽出を中止）
pub const SELLER_MARKER: &str = "Seller information";
/// 見出し窓の開始マーカー
pub const HEADING_START_MARKER: &str = "Buy-and-sell groups";
/// 見出し窓の終了マーカー（なければ末尾まで）
pub const HEADING_END_MARKER: &str = "Listed";

/// テキストを持っていても本文として扱わない要素
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// HTMLを文書順のテキストノード列に平坦化
pub fn text_nodes(markup: &str) -> Vec<String> {
    let document = Html::parse_document(markup);

    document
        .tree
        .root()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let skipped = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|e| SKIPPED_ELEMENTS.contains(&e.name())))
                .unwrap_or(false);
            if skipped {
                None
            } else {
                Some(text.to_string())
            }
        })
        .collect()
}

/// 描画済みHTMLからスナップショットを生成
///
/// "Seller information" がどこにもなければ None（分類不能として扱う）
pub fn extract(markup: &str) -> Option<ListingSnapshot> {
    extract_from_nodes(&text_nodes(markup))
}

/// テキストノード列からスナップショットを生成
pub fn extract_from_nodes<S: AsRef<str>>(nodes: &[S]) -> Option<ListingSnapshot> {
    let details_text = details_window(nodes)?;
    let heading_text = heading_window(nodes);

    Some(ListingSnapshot {
        details_text,
        heading_text,
    })
}

/// 本文窓: 最初の "Details" の後から、その後最初の "Seller information" の手前まで
///
/// "Seller information" が文書中に一度も出なければ None。
/// "Details" がない、または "Details" の後に終了マーカーがない場合は空文字。
pub fn details_window<S: AsRef<str>>(nodes: &[S]) -> Option<String> {
    if !nodes.iter().any(|n| n.as_ref().contains(SELLER_MARKER)) {
        return None;
    }

    let Some(start) = position_of(nodes, DETAILS_MARKER, 0) else {
        return Some(String::new());
    };

    match position_of(nodes, SELLER_MARKER, start + 1) {
        Some(end) => Some(join_fragments(&nodes[start + 1..end])),
        None => Some(String::new()),
    }
}

/// 見出し窓: 最初の "Buy-and-sell groups" の後から、その後最初の "Listed" の手前まで
///
/// 開始マーカーがなければ空文字、終了マーカーがなければ末尾まで。
pub fn heading_window<S: AsRef<str>>(nodes: &[S]) -> String {
    let Some(start) = position_of(nodes, HEADING_START_MARKER, 0) else {
        return String::new();
    };

    let end = position_of(nodes, HEADING_END_MARKER, start + 1).unwrap_or(nodes.len());
    join_fragments(&nodes[start + 1..end])
}

fn position_of<S: AsRef<str>>(nodes: &[S], marker: &str, from: usize) -> Option<usize> {
    nodes
        .iter()
        .skip(from)
        .position(|n| n.as_ref().contains(marker))
        .map(|offset| from + offset)
}

/// 各断片をtrimし、空でないものを半角スペース1つで連結
fn join_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments
        .iter()
        .map(|f| f.as_ref().trim())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_window_between_markers() {
        let nodes = ["x", "Details", "a", "b", "Seller information", "y"];
        assert_eq!(details_window(&nodes).as_deref(), Some("a b"));
    }

    #[test]
    fn test_heading_window_between_markers() {
        let nodes = ["Buy-and-sell groups", "m", "n", "Listed", "z"];
        assert_eq!(heading_window(&nodes), "m n");
    }

    #[test]
    fn test_no_seller_marker_returns_none() {
        let nodes = ["Details", "a", "b", "Buy-and-sell groups", "m"];
        assert!(extract_from_nodes(&nodes).is_none());
    }

    #[test]
    fn test_heading_without_listed_runs_to_end() {
        let nodes = ["Buy-and-sell groups", "m", "n"];
        assert_eq!(heading_window(&nodes), "m n");
    }

    #[test]
    fn test_heading_missing_start_is_empty() {
        let nodes = ["Details", "a", "Seller information"];
        let snapshot = extract_from_nodes(&nodes).unwrap();
        assert_eq!(snapshot.details_text, "a");
        assert_eq!(snapshot.heading_text, "");
    }

    #[test]
    fn test_fragments_are_trimmed_and_blank_skipped() {
        let nodes = ["Details", "  Persian  ", "\n", " wool rug ", "Seller information"];
        assert_eq!(details_window(&nodes).as_deref(), Some("Persian wool rug"));
    }

    #[test]
    fn test_markers_match_as_substrings() {
        let nodes = ["Item Details", "hand knotted", "Seller information and reviews"];
        assert_eq!(details_window(&nodes).as_deref(), Some("hand knotted"));
    }

    #[test]
    fn test_seller_marker_only_before_details_gives_empty() {
        let nodes = ["Seller information", "Details", "a", "b"];
        assert_eq!(details_window(&nodes).as_deref(), Some(""));
    }

    #[test]
    fn test_first_occurrences_win() {
        let nodes = [
            "Buy-and-sell groups", "Hali rug", "Listed", "Buy-and-sell groups", "other", "Listed",
            "Details", "first", "Seller information", "Details", "second", "Seller information",
        ];
        let snapshot = extract_from_nodes(&nodes).unwrap();
        assert_eq!(snapshot.heading_text, "Hali rug");
        assert_eq!(snapshot.details_text, "first");
    }

    #[test]
    fn test_extract_from_html() {
        let html = r#"<html><head><script>var Details = 1;</script></head><body>
            <span>Buy-and-sell groups</span><h1>Vintage hali rug</h1><span>Listed 2 hours ago</span>
            <div>Details</div><p>Size 2.9 x 2.4 m</p><p>Pickup only</p>
            <h2>Seller information</h2><span>Jane</span>
        </body></html>"#;

        let snapshot = extract(html).unwrap();
        assert_eq!(snapshot.heading_text, "Vintage hali rug");
        assert_eq!(snapshot.details_text, "Size 2.9 x 2.4 m Pickup only");
    }

    #[test]
    fn test_extract_from_html_without_seller_section() {
        let html = "<html><body><div>Details</div><p>text</p></body></html>";
        assert!(extract(html).is_none());
    }

    #[test]
    fn test_text_nodes_skip_scripts() {
        let nodes = text_nodes("<html><body><script>x()</script><p>visible</p></body></html>");
        assert!(nodes.iter().any(|n| n == "visible"));
        assert!(!nodes.iter().any(|n| n.contains("x()")));
    }
}
