//! Listing AI Common Library
//!
//! ブラウザやネットワークに依存しない純粋なパイプライン処理:
//! 本文抽出、ローカルフィルタ、分類プロンプト、応答パース、寸法判定

pub mod types;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod prompts;
pub mod parser;
pub mod matcher;

pub use types::{Classification, ClassificationResult, ItemId, ListingSnapshot, MatchedEntry, TargetEnvelope};
pub use error::{Error, Result};
pub use extractor::{extract, extract_from_nodes, text_nodes};
pub use filter::{CandidateFilter, FilterDecision};
pub use prompts::build_classification_prompt;
pub use parser::{classify_answer, normalize_answer, parse_answer};
pub use matcher::accepts;
