use clap::Parser;
use listing_ai_common::{extract, FilterDecision};
use listing_ai_rust::{ai_provider, alert, browser, cli, config, error, ledger, oracle, pipeline};
use ai_provider::AiProvider;
use alert::{AlertDispatcher, ConsoleAlert, WebhookAlert};
use browser::{FantocciniBackend, PageSession};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use ledger::{Ledger, LedgerKind};
use oracle::{CliBackend, CompletionBackend, OpenAiBackend, Oracle};
use pipeline::{evaluate_markup, run_batch, Pipeline, RunPlan};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "info,listing_ai_rust=debug,listing_ai_common=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_oracle(provider: AiProvider, config: &Config) -> Result<Oracle<Box<dyn CompletionBackend>>> {
    let backend: Box<dyn CompletionBackend> = match provider {
        AiProvider::OpenAi => Box::new(
            OpenAiBackend::new(config.get_api_key()?, config.model.clone(), config.request_timeout())?
                .with_base_url(config.api_base_url.clone()),
        ),
        cli_provider => Box::new(CliBackend::new(cli_provider, config.request_timeout())?),
    };
    Ok(Oracle::new(backend, config.category.clone()))
}

fn build_alerts(config: &Config) -> Result<Box<dyn AlertDispatcher>> {
    let alerts: Box<dyn AlertDispatcher> = match &config.alert_webhook {
        Some(url) => Box::new(WebhookAlert::new(url.clone(), config.item_url_base.clone())?),
        None => Box::new(ConsoleAlert::new(config.item_url_base.clone())),
    };
    Ok(alerts)
}

fn mask(secret: &Option<String>) -> &'static str {
    if secret.is_some() { "設定済み" } else { "未設定" }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    let ledger_for = |data_dir: Option<PathBuf>| Ledger::new(data_dir.unwrap_or_else(|| config.data_dir.clone()));

    match cli.command {
        Commands::Run { data_dir, no_progress } => {
            println!("🔎 listing-ai - 出品巡回\n");

            // 1. 台帳読み込み
            println!("[1/3] 台帳を読み込み中...");
            let ledger = ledger_for(data_dir);
            let plan = RunPlan::load(&ledger)?;
            println!(
                "✔ 抽出済み {}件 / 訪問済み {}件 / 未訪問 {}件\n",
                plan.extracted.len(),
                plan.visited_before.len(),
                plan.pending.len()
            );

            if plan.is_empty() {
                println!("✅ 処理対象はありません");
                return Ok(());
            }

            // 2. 巡回・分類
            println!("[2/3] ブラウザで巡回中...");
            let credentials = config.credentials()?;
            let oracle = build_oracle(cli.ai_provider, &config)?;
            let alerts = build_alerts(&config)?;
            let filter = config.candidate_filter();

            let backend = FantocciniBackend::connect(&config.webdriver_url, config.headless).await?;
            let mut session = PageSession::new(backend, config.session_settings());
            let mut pipeline = Pipeline::new(&mut session, &oracle, &filter, config.envelope, &alerts);

            let summary = run_batch(&ledger, &plan, &mut pipeline, &credentials, !no_progress).await?;
            let report = &summary.report;
            println!(
                "✔ 訪問 {}件 / 分類API {}件 / 一致 {}件\n",
                report.visited.len(),
                report.oracle_calls(),
                report.matched.len()
            );

            // 3. 台帳保存
            println!("[3/3] 台帳を保存しました");
            for path in [&summary.persisted.visited, &summary.persisted.matched].into_iter().flatten() {
                println!("  {}", path.display());
            }

            println!("\n✅ 完了");
        }

        Commands::Pending { data_dir } => {
            let plan = RunPlan::load(&ledger_for(data_dir))?;
            for id in &plan.pending {
                println!("{}", id);
            }
            eprintln!("未訪問: {}件", plan.pending.len());
        }

        Commands::Ledger { data_dir } => {
            let ledger = ledger_for(data_dir);
            println!("台帳: {}", ledger.root().display());
            for kind in LedgerKind::ALL {
                match ledger.latest_info(kind)? {
                    Some(info) => println!("  {:<9} {}件  {}", kind.label(), info.entries, info.path.display()),
                    None => println!("  {:<9} スナップショットなし", kind.label()),
                }
            }

            let matched = ledger.load_latest_matched()?;
            if !matched.is_empty() {
                println!("\n一致した出品:");
                for entry in &matched {
                    println!("  {}{}  ({})", config.item_url_base, entry.item_id, entry.answer);
                }
            }
        }

        Commands::Inspect { file, classify } => {
            println!("🔍 listing-ai - ページ検査\n");
            let markup = std::fs::read_to_string(&file)?;

            let Some(snapshot) = extract(&markup) else {
                println!("✖ \"Seller information\" が見つからないため抽出できません");
                return Ok(());
            };
            println!("見出し: {}", snapshot.heading_text);
            println!("本文:   {}\n", snapshot.details_text);

            let filter = config.candidate_filter();
            let decision = filter.gate(&snapshot.details_text, &snapshot.heading_text);
            println!("フィルタ: {:?}", decision);

            if classify && decision == FilterDecision::Candidate {
                let oracle = build_oracle(cli.ai_provider, &config)?;
                let outcome = evaluate_markup(&markup, &filter, &oracle, &config.envelope).await;
                println!("分類結果: {:?}", outcome);
            }
        }

        Commands::Config { set_api_key, show, init } => {
            let mut config = config;

            if init {
                let path = Config::config_path()?;
                if path.exists() {
                    println!("設定ファイルは既に存在します: {}", path.display());
                } else {
                    config.save()?;
                    println!("✔ 設定ファイルを作成しました: {}", path.display());
                }
            }

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  APIキー: {}", mask(&config.api_key));
                println!("  WebDriver: {} (headless: {})", config.webdriver_url, config.headless);
                println!("  ログイン: {} / パスワード {}", config.login_email.as_deref().unwrap_or("未設定"), mask(&config.login_password));
                println!("  台帳: {}", config.data_dir.display());
                println!("  カテゴリ: {}", config.category);
                println!("  除外キーワード: {:?}", config.exclude_keywords);
                println!("  必須キーワード: {:?}", config.essential_keywords);
                println!(
                    "  目標寸法: {} x {} m (±{}%)",
                    config.envelope.desired_width,
                    config.envelope.desired_height,
                    config.envelope.tolerance * 100.0
                );
                println!("  通知: {}", config.alert_webhook.as_deref().unwrap_or("コンソール"));
            }
        }
    }

    Ok(())
}
