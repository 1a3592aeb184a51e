use clap::{Parser, Subcommand};
use crate::ai_provider::AiProvider;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "listing-ai")]
#[command(about = "マーケットプレイス出品監視・AI分類・アラートツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// AIプロバイダ (openai/claude/codex/gemini)
    #[arg(long, value_enum, default_value = "openai", global = true)]
    pub ai_provider: AiProvider,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 未訪問の出品を巡回・分類し、一致を通知
    Run {
        /// 台帳ディレクトリ（省略時は設定値）
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// 進捗バーを表示しない
        #[arg(long)]
        no_progress: bool,
    },

    /// 次回の実行で処理される出品IDを表示
    Pending {
        /// 台帳ディレクトリ（省略時は設定値）
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// 台帳の最新スナップショットを表示
    Ledger {
        /// 台帳ディレクトリ（省略時は設定値）
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// 保存済みHTMLで抽出・フィルタ（・分類）を試す
    Inspect {
        /// 出品ページのHTMLファイル
        #[arg(required = true)]
        file: PathBuf,

        /// 分類APIと寸法判定まで実行
        #[arg(long)]
        classify: bool,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// デフォルト設定ファイルを書き出す
        #[arg(long)]
        init: bool,
    },
}
