//! 位置缓存
//!
//! 控制线程每个 tick 写入一次，调用方无锁读取（ArcSwap::load）。
//! 位置刷新不会被状态读取方阻塞，反之亦然。

use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::Instant;

/// 位置快照
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionState {
    /// 最近一次读取的实际位置
    pub actual: f64,
    /// 当前目标位置
    pub target: f64,
    /// 快照写入时间
    pub updated_at: Instant,
}

impl PositionState {
    /// 距离目标的绝对偏差
    pub fn distance_to_target(&self) -> f64 {
        (self.target - self.actual).abs()
    }
}

/// 位置缓存（单写多读）
#[derive(Debug)]
pub struct PositionCache {
    inner: ArcSwap<PositionState>,
}

impl PositionCache {
    pub fn new(actual: f64, target: f64) -> Self {
        Self {
            inner: ArcSwap::from_pointee(PositionState {
                actual,
                target,
                updated_at: Instant::now(),
            }),
        }
    }

    /// 读取快照（Wait-Free）
    pub fn load(&self) -> PositionState {
        **self.inner.load()
    }

    pub fn actual(&self) -> f64 {
        self.inner.load().actual
    }

    pub fn target(&self) -> f64 {
        self.inner.load().target
    }

    /// 控制线程：写入新快照
    pub(crate) fn store(&self, actual: f64, target: f64) {
        self.inner.store(Arc::new(PositionState {
            actual,
            target,
            updated_at: Instant::now(),
        }));
    }
}

impl Default for PositionCache {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_store_and_load() {
        let cache = PositionCache::default();
        assert_eq!(cache.actual(), 0.0);
        assert_eq!(cache.target(), 0.0);

        let before = cache.load().updated_at;
        cache.store(12.0, 50.0);
        let state = cache.load();
        assert_eq!(state.actual, 12.0);
        assert_eq!(state.target, 50.0);
        assert_eq!(state.distance_to_target(), 38.0);
        assert!(state.updated_at >= before);
    }

    /// 测试并发读取时写入方不会被阻塞
    #[test]
    fn test_concurrent_read() {
        let cache = Arc::new(PositionCache::default());
        let writer = cache.clone();
        let writer_handle = thread::spawn(move || {
            for i in 0..1000 {
                writer.store(i as f64, 1000.0);
                thread::yield_now();
            }
        });

        let mut readers = Vec::new();
        for _ in 0..4 {
            let reader = cache.clone();
            readers.push(thread::spawn(move || {
                for _ in 0..1000 {
                    let state = reader.load();
                    // 快照是整体替换的，不会读到半更新的值
                    assert!(state.target == 0.0 || state.target == 1000.0);
                    assert!(state.actual <= state.target || state.target == 0.0);
                    thread::yield_now();
                }
            }));
        }

        writer_handle.join().unwrap();
        for handle in readers {
            handle.join().unwrap();
        }
        assert_eq!(cache.actual(), 999.0);
    }
}
