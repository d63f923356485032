use clap::Parser;
use movie_catalog::core::ConfigProvider;
use movie_catalog::utils::logger::{self, LogFormat};
use movie_catalog::utils::validation::Validate;
use movie_catalog::{api, AppState, CliConfig, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(LogFormat::from_json_flag(cli.json_logs), cli.verbose);

    tracing::info!("🚀 Starting movie-catalog");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置 (TOML 檔案優先)
    let config: Box<dyn ConfigProvider> = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            let file_config = TomlConfig::from_file(path)?;
            exit_on_invalid(&file_config);
            Box::new(file_config)
        }
        None => {
            exit_on_invalid(&cli);
            Box::new(cli.clone())
        }
    };
    tracing::info!("✅ Configuration validated");

    tracing::info!(
        "📡 Aggregating '{}' with '{}' (policy: {}, max in flight: {})",
        config.ratings_service(),
        config.metadata_service(),
        config.failure_policy(),
        config
            .max_in_flight()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unbounded".to_string())
    );

    // 建立聚合器並啟動 HTTP 服務
    let state = AppState::from_config(config.as_ref())?;
    api::serve(config.bind_address(), state).await?;

    Ok(())
}

fn exit_on_invalid(config: &impl Validate) {
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
