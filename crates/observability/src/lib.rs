//! # Observability
//!
//! 可观测性模块：Tracing 初始化 + `metrics` 门面记录。
//!
//! ## 功能
//!
//! - Tracing 初始化 (JSON/Pretty/Compact 格式)
//! - 时间基准 rebase 与记录输出指标
//! - rebase 漂移统计
//!
//! No metrics exporter is installed here; the surrounding process decides
//! whether and where to install a recorder.
//!
//! ## 使用示例
//!
//! Converters hand every `RebaseEvent` to a `DriftAggregator`:
//!
//! ```
//! use contracts::{RebaseEvent, ReferenceTime};
//! use observability::{DriftAggregator, ObservabilityConfig};
//!
//! observability::init_with_config(ObservabilityConfig::for_format("compact")).ok();
//!
//! let mut drift = DriftAggregator::new();
//! drift.update(&RebaseEvent {
//!     diff_ns: -2_500,
//!     total_change_ns: -2_500,
//!     reference_anchor: ReferenceTime::from_nanos(1_700_000_000_000_000_000),
//!     significant: true,
//! });
//! assert_eq!(drift.summary().significant_changes, 1);
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-exports
pub use crate::metrics::{
    record_fused_samples, record_rebase, record_records_discarded, record_records_emitted,
    DriftAggregator, DriftSummary, RunningStats, StatsSummary,
};

/// 初始化 Tracing（默认配置）
///
/// JSON 格式，支持 RUST_LOG 环境变量
pub fn init() -> Result<()> {
    init_with_config(ObservabilityConfig::default())
}

/// Default filter: clock changes are logged at debug by `time_base`
pub const DEFAULT_LOG_DIRECTIVES: &str = "info,time_base=debug";

/// 可观测性配置
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// 日志格式
    pub log_format: LogFormat,
    /// 默认过滤指令 (RUST_LOG 未设置时使用)
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            default_log_level: DEFAULT_LOG_DIRECTIVES.to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Config for a format name ("json", "pretty", "compact"); unknown names fall back to JSON.
    pub fn for_format(name: &str) -> Self {
        Self {
            log_format: LogFormat::from_name(name).unwrap_or_default(),
            ..Self::default()
        }
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON 结构化日志
    #[default]
    Json,
    /// 人类可读格式
    Pretty,
    /// 紧凑单行格式
    Compact,
}

impl LogFormat {
    /// Parse a format name, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// 使用自定义配置初始化
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level));

    match config.log_format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer().pretty();

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer().compact();

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
    }

    tracing::info!(
        log_format = ?config.log_format,
        directives = %config.default_log_level,
        "bridge observability initialized"
    );

    Ok(())
}
