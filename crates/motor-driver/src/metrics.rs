//! 性能指标（原子计数器）

use std::sync::atomic::{AtomicU64, Ordering};

/// 控制线程计数器
///
/// 所有计数器使用 Relaxed 内存序，只用于监控，不参与同步。
#[derive(Debug, Default)]
pub struct MotorMetrics {
    /// 控制线程 tick 总数
    pub ticks: AtomicU64,
    /// 已分发的命令总数（含 Quit）
    pub commands_dispatched: AtomicU64,
    /// 已开始的移动
    pub moves_started: AtomicU64,
    /// 到达目标的移动
    pub moves_completed: AtomicU64,
    /// 超时次数
    pub timeouts: AtomicU64,
    /// 暂停次数
    pub pauses: AtomicU64,
    /// 恢复次数
    pub resumes: AtomicU64,
}

/// 计数器快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub ticks: u64,
    pub commands_dispatched: u64,
    pub moves_started: u64,
    pub moves_completed: u64,
    pub timeouts: u64,
    pub pauses: u64,
    pub resumes: u64,
}

impl MotorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// 获取快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            commands_dispatched: self.commands_dispatched.load(Ordering::Relaxed),
            moves_started: self.moves_started.load(Ordering::Relaxed),
            moves_completed: self.moves_completed.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            pauses: self.pauses.load(Ordering::Relaxed),
            resumes: self.resumes.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ticks={} commands={} moves={}/{} timeouts={} pauses={} resumes={}",
            self.ticks,
            self.commands_dispatched,
            self.moves_completed,
            self.moves_started,
            self.timeouts,
            self.pauses,
            self.resumes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot() {
        let metrics = MotorMetrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());

        MotorMetrics::incr(&metrics.ticks);
        MotorMetrics::incr(&metrics.ticks);
        MotorMetrics::incr(&metrics.moves_started);
        MotorMetrics::incr(&metrics.timeouts);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ticks, 2);
        assert_eq!(snapshot.moves_started, 1);
        assert_eq!(snapshot.timeouts, 1);
        assert_eq!(snapshot.moves_completed, 0);
    }

    #[test]
    fn test_snapshot_display() {
        let snapshot = MetricsSnapshot {
            ticks: 10,
            commands_dispatched: 3,
            moves_started: 2,
            moves_completed: 1,
            timeouts: 1,
            pauses: 0,
            resumes: 0,
        };
        assert_eq!(
            snapshot.to_string(),
            "ticks=10 commands=3 moves=1/2 timeouts=1 pauses=0 resumes=0"
        );
    }
}
