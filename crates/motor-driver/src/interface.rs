//! 接口锁
//!
//! 调用方显式持有的粗粒度临界区，用于把"发布 Move + 等待完成"
//! 捆绑成一次对外原子的交互。
//!
//! 与 `Mutex<()>` 不同，这里的锁可以跨任意代码段手动获取/释放
//! （`acquire` / `unlock`）。锁记录持有线程：
//! - 持有线程释放：解锁
//! - 锁空闲时释放：空操作（重复释放是安全的）
//! - 其他线程持有时释放：忽略，既不解锁也不复位状态

use crate::status::StatusCell;
use parking_lot::{Condvar, Mutex};
use std::marker::PhantomData;
use std::thread::{self, ThreadId};
use tracing::{trace, warn};

/// 接口锁原语
#[derive(Debug, Default)]
pub struct InterfaceLock {
    holder: Mutex<Option<ThreadId>>,
    cond: Condvar,
}

impl InterfaceLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 阻塞获取（不可重入）
    pub fn acquire(&self) {
        let mut holder = self.holder.lock();
        self.cond.wait_while(&mut holder, |h| h.is_some());
        *holder = Some(thread::current().id());
    }

    /// 非阻塞获取
    pub fn try_acquire(&self) -> bool {
        let mut holder = self.holder.lock();
        if holder.is_some() {
            return false;
        }
        *holder = Some(thread::current().id());
        true
    }

    /// 释放
    ///
    /// 返回 `false` 表示锁被其他线程持有，本次释放被忽略。
    pub fn unlock(&self) -> bool {
        self.release_with(|| {})
    }

    /// 在内部锁内执行 `on_release` 后解锁
    ///
    /// 当前线程持有锁或锁空闲时执行；其他线程持有时什么都不做并返回 `false`。
    fn release_with(&self, on_release: impl FnOnce()) -> bool {
        let mut holder = self.holder.lock();
        let me = thread::current().id();
        match *holder {
            Some(owner) if owner != me => false,
            Some(_) => {
                on_release();
                *holder = None;
                self.cond.notify_one();
                true
            },
            None => {
                on_release();
                true
            },
        }
    }

    pub fn is_held(&self) -> bool {
        self.holder.lock().is_some()
    }

    /// 当前线程是否持有锁
    pub fn is_held_by_current_thread(&self) -> bool {
        *self.holder.lock() == Some(thread::current().id())
    }
}

/// 显式释放：强制复位状态为 Idle，然后解锁
///
/// 这是除了开始新的 Move/等待周期之外，清除锁存故障的唯一途径。
/// 锁被其他线程持有时不做任何事，避免打断对方进行中的移动。
pub(crate) fn release_with_reset(lock: &InterfaceLock, status: &StatusCell) -> bool {
    let released = lock.release_with(|| status.force_idle());
    if released {
        trace!("Interface released, status reset to Idle");
    } else {
        warn!("Ignoring interface release from a thread that does not hold the lock");
    }
    released
}

/// 作用域接口锁守卫
///
/// Drop 时只解锁，不复位状态：同步接口抛出的故障会保持锁存，
/// 直到调用方显式释放（[`InterfaceGuard::release`] 或
/// [`AsyncMotor::release_interface`](crate::AsyncMotor::release_interface)）。
///
/// 锁按线程记录持有者，守卫不能跨线程移动。
#[must_use = "the interface is unlocked as soon as the guard is dropped"]
pub struct InterfaceGuard<'a> {
    lock: &'a InterfaceLock,
    status: &'a StatusCell,
    released: bool,
    _not_send: PhantomData<*const ()>,
}

impl<'a> InterfaceGuard<'a> {
    pub(crate) fn acquire(lock: &'a InterfaceLock, status: &'a StatusCell) -> Self {
        lock.acquire();
        Self {
            lock,
            status,
            released: false,
            _not_send: PhantomData,
        }
    }

    /// 显式释放（复位状态为 Idle）
    pub fn release(mut self) {
        self.released = true;
        release_with_reset(self.lock, self.status);
    }
}

impl std::fmt::Debug for InterfaceGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceGuard").field("released", &self.released).finish()
    }
}

impl Drop for InterfaceGuard<'_> {
    fn drop(&mut self) {
        // 作用域内已被显式释放、随后被其他线程获取时，这里不会误解锁
        if !self.released {
            self.lock.unlock();
        }
    }
}
