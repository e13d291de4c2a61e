use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

fn resolve_env_filter() -> tracing_subscriber::EnvFilter {
    if let Ok(level) = std::env::var("COURSEGEN_LOG_LEVEL")
        && let Ok(filter) = tracing_subscriber::EnvFilter::try_new(level)
    {
        return filter;
    }
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

/// Initialize logging once per process.
///
/// Environment variables:
/// - `COURSEGEN_LOG_LEVEL`: level/filter override (`info`, `debug`, etc.).
/// - `COURSEGEN_JSON_LOG_PATH`: optional log file path. If set, logs are
///   JSONL in that file; otherwise logs go to stdout in a compact console
///   format.
/// - `RUST_LOG`: fallback filter override.
pub fn init_observability() {
    INIT.get_or_init(|| {
        let env_filter = resolve_env_filter();
        match std::env::var("COURSEGEN_JSON_LOG_PATH") {
            Ok(path_raw) => init_json(env_filter, std::path::PathBuf::from(path_raw)),
            Err(_) => init_console(env_filter),
        }
    });
}

fn init_console(env_filter: tracing_subscriber::EnvFilter) {
    let console_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stdout);
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}

fn init_json(env_filter: tracing_subscriber::EnvFilter, path: std::path::PathBuf) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let _ = std::fs::create_dir_all(parent);
    }
    let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("coursegen.logs.jsonl");
    let writer = tracing_appender::rolling::never(dir, file_name);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_target(false)
        .with_writer(writer);
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .try_init();
}
