//! Bridge 指标收集模块
//!
//! 记录时间基准 rebase、融合输入与记录输出的运行指标。

use contracts::{RebaseEvent, SensorKind};
use metrics::{counter, gauge, histogram};

/// 记录一次 rebase
///
/// Called by the time base on every rebase, significant or not.
pub fn record_rebase(event: &RebaseEvent) {
    counter!("bridge_time_base_rebase_total").increment(1);

    if event.significant {
        counter!("bridge_time_base_change_total").increment(1);
        histogram!("bridge_time_base_change_ns").record(event.diff_ns.unsigned_abs() as f64);
    }

    gauge!("bridge_time_base_total_change_ns").set(event.total_change_ns as f64);
}

/// 记录融合输入样本
pub fn record_fused_samples(kind: SensorKind, count: usize) {
    if count == 0 {
        return;
    }
    counter!("bridge_fuser_samples_total", "kind" => kind.as_str()).increment(count as u64);
}

/// 记录输出记录数
pub fn record_records_emitted(converter: &'static str, count: usize) {
    counter!("bridge_records_emitted_total", "converter" => converter).increment(count as u64);
}

/// 记录单记录转换丢弃的记录数
pub fn record_records_discarded(converter: &'static str, count: usize) {
    counter!("bridge_records_discarded_total", "converter" => converter).increment(count as u64);
}

/// Rebase 漂移聚合器
///
/// 在内存中聚合 rebase 事件，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DriftAggregator {
    /// rebase 总次数
    pub total_rebases: u64,

    /// 超过阈值的 rebase 次数
    pub significant_changes: u64,

    /// 最近一次累计漂移 (ns)
    pub total_change_ns: i64,

    /// |diff| 统计 (µs)，仅统计超过阈值的事件
    pub change_stats: RunningStats,
}

impl DriftAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, event: &RebaseEvent) {
        self.total_rebases += 1;
        self.total_change_ns = event.total_change_ns;

        if event.significant {
            self.significant_changes += 1;
            self.change_stats
                .push(event.diff_ns.unsigned_abs() as f64 / 1000.0);
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> DriftSummary {
        DriftSummary {
            total_rebases: self.total_rebases,
            significant_changes: self.significant_changes,
            total_change_ns: self.total_change_ns,
            change_us: StatsSummary::from(&self.change_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 漂移摘要
#[derive(Debug, Clone, Default)]
pub struct DriftSummary {
    pub total_rebases: u64,
    pub significant_changes: u64,
    pub total_change_ns: i64,
    pub change_us: StatsSummary,
}

impl std::fmt::Display for DriftSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Time Base Drift Summary ===")?;
        writeln!(f, "Rebases: {}", self.total_rebases)?;
        writeln!(f, "Clock changes: {}", self.significant_changes)?;
        writeln!(f, "Total change: {} ns", self.total_change_ns)?;
        writeln!(f, "Change size (us): {}", self.change_us)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
