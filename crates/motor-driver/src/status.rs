//! 运动状态机
//!
//! ```text
//!            move 命令          到达阈值内
//!   Idle ───────────────▶ Moving ───────────▶ MoveOk
//!    ▲                      │                   │
//!    │                      │ 超时               │ wait_for_move_done 消费
//!    │                      ▼                   │
//!    │◀──── 显式释放 ──── Error(fault)          │
//!    └──────────────────────────────────────────┘
//! ```
//!
//! 状态只在控制线程中推进。调用方侧只有两种合法的复位：
//! 消费 `MoveOk`，以及显式释放接口锁时强制复位为 `Idle`。

use crate::error::Fault;
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// 对外可观测的运动状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// 空闲，可以接受新的移动请求
    #[default]
    Idle,
    /// 运动中（可能处于暂停保持）
    Moving,
    /// 已到达目标，等待被消费
    MoveOk,
    /// 故障已锁存
    Error(Fault),
}

impl Status {
    /// 是否为终止状态（MoveOk 或 Error）
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Idle | Status::Moving)
    }

    /// 锁存的故障（如果有）
    pub fn fault(self) -> Option<Fault> {
        match self {
            Status::Error(fault) => Some(fault),
            _ => None,
        }
    }
}

/// 状态单元：当前状态 + 唤醒信号
#[derive(Debug, Default)]
pub struct StatusCell {
    status: Mutex<Status>,
    cond: Condvar,
}

impl StatusCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取状态快照
    pub fn get(&self) -> Status {
        *self.status.lock()
    }

    /// 写入状态并唤醒所有等待方
    pub(crate) fn set(&self, status: Status) {
        let mut guard = self.status.lock();
        *guard = status;
        self.cond.notify_all();
    }

    /// 在锁内对状态做一次读-改-写
    ///
    /// 闭包返回 `Some(new)` 时写入并唤醒等待方，返回写入后的状态。
    pub(crate) fn update<F>(&self, f: F) -> Option<Status>
    where
        F: FnOnce(Status) -> Option<Status>,
    {
        let mut guard = self.status.lock();
        let next = f(*guard)?;
        *guard = next;
        self.cond.notify_all();
        Some(next)
    }

    /// 如果故障已锁存，返回该故障
    pub fn check_fault(&self) -> Result<(), Fault> {
        match self.get() {
            Status::Error(fault) => Err(fault),
            _ => Ok(()),
        }
    }

    /// 检查是否可以发起新的移动：先抛出锁存故障，再要求状态为 Idle
    pub fn check_ready_for_move(&self) -> Result<(), Fault> {
        match self.get() {
            Status::Error(fault) => Err(fault),
            Status::Idle => Ok(()),
            _ => Err(Fault::InterfaceSync),
        }
    }

    /// 阻塞等待终止状态
    ///
    /// - `MoveOk`：复位为 `Idle` 并返回 `Ok(())`
    /// - `Error(fault)`：保持锁存，返回 `Err(fault)`
    pub fn await_terminal(&self) -> Result<(), Fault> {
        let mut guard = self.status.lock();
        self.cond.wait_while(&mut guard, |s| !s.is_terminal());
        self.consume_terminal(&mut guard)
    }

    /// 带超时的 [`await_terminal`](Self::await_terminal)
    ///
    /// 超时后状态仍未终止时返回 `Ok(false)`。
    pub fn await_terminal_for(&self, timeout: Duration) -> Result<bool, Fault> {
        let deadline = Instant::now() + timeout;
        let mut guard = self.status.lock();
        while !guard.is_terminal() {
            if self.cond.wait_until(&mut guard, deadline).timed_out() {
                if !guard.is_terminal() {
                    return Ok(false);
                }
                break;
            }
        }
        self.consume_terminal(&mut guard).map(|()| true)
    }

    fn consume_terminal(&self, status: &mut Status) -> Result<(), Fault> {
        match *status {
            Status::MoveOk => {
                *status = Status::Idle;
                self.cond.notify_all();
                Ok(())
            },
            Status::Error(fault) => Err(fault),
            _ => Err(Fault::Unknown),
        }
    }

    /// 强制复位为 Idle（清除锁存故障）
    pub(crate) fn force_idle(&self) {
        self.set(Status::Idle);
    }
}
