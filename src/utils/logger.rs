use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 日誌輸出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 終端機用的精簡格式
    Compact,
    /// 每行一個 JSON 事件，給日誌收集器使用
    Json,
}

impl LogFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

/// 沒有設定 `RUST_LOG` 時使用的過濾規則
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "movie_catalog=debug,tower_http=debug,info"
    } else {
        "movie_catalog=info,tower_http=info,warn"
    }
}

/// 初始化全域 tracing subscriber，只能呼叫一次
pub fn init_logger(format: LogFormat, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let layer = tracing_subscriber::fmt::layer()
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.with_target(false).compact())
            .init(),
        // JSON 保留 target，方便依模組過濾
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(layer.with_target(true).json())
            .init(),
    }
}
