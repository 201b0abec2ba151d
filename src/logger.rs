//! 日志初始化
//!
//! `RUST_LOG` 优先；否则使用命令行 `-v` 或配置文件中的级别。

use tracing_subscriber::EnvFilter;

/// 命令行 `-v` 次数对应的级别
pub fn verbosity_level(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// 构造日志过滤器
pub fn build_filter(configured: &str, verbose: u8) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = verbosity_level(verbose).unwrap_or(configured);
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化全局日志（只生效一次，重复调用忽略）
pub fn init_logging(configured: &str, verbose: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(configured, verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
