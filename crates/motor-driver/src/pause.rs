//! 暂停门
//!
//! 暂停标志与运动状态正交：`Moving` 期间可以处于保持状态。
//! 标志只由控制线程写入，调用方只等待翻转。

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default, Clone, Copy)]
struct GateState {
    paused: bool,
    /// 已分发的 Pause 命令计数
    pause_seq: u64,
    /// 已分发的 Resume 命令计数
    resume_seq: u64,
}

/// 暂停标志 + 唤醒信号
#[derive(Debug, Default)]
pub struct PauseGate {
    state: Mutex<GateState>,
    cond: Condvar,
}

/// 发起暂停/恢复请求前记录的分发序号
#[derive(Debug, Clone, Copy)]
pub(crate) struct PauseTicket {
    pause_seq: u64,
    resume_seq: u64,
}

impl PauseGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 执行器是否处于保持状态
    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    /// 记录当前分发序号（在投递命令之前调用）
    pub(crate) fn ticket(&self) -> PauseTicket {
        let state = self.state.lock();
        PauseTicket {
            pause_seq: state.pause_seq,
            resume_seq: state.resume_seq,
        }
    }

    /// 控制线程：Pause 已分发
    pub(crate) fn mark_paused(&self) {
        let mut state = self.state.lock();
        state.paused = true;
        state.pause_seq += 1;
        self.cond.notify_all();
    }

    /// 控制线程：Resume 已分发
    pub(crate) fn mark_resumed(&self) {
        let mut state = self.state.lock();
        state.paused = false;
        state.resume_seq += 1;
        self.cond.notify_all();
    }

    /// 控制线程：新的 Move 清除暂停标志（不计入 Resume 序号）
    pub(crate) fn clear(&self) {
        let mut state = self.state.lock();
        if state.paused {
            state.paused = false;
            self.cond.notify_all();
        }
    }

    /// 阻塞直到 `paused == true`，或 ticket 之后有 Pause 被分发
    pub(crate) fn wait_paused(&self, ticket: PauseTicket) {
        let mut state = self.state.lock();
        self.cond
            .wait_while(&mut state, |s| !s.paused && s.pause_seq == ticket.pause_seq);
    }

    /// 阻塞直到 `paused == false`，或 ticket 之后有 Resume 被分发
    pub(crate) fn wait_resumed(&self, ticket: PauseTicket) {
        let mut state = self.state.lock();
        self.cond
            .wait_while(&mut state, |s| s.paused && s.resume_seq == ticket.resume_seq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_mark_and_clear() {
        let gate = PauseGate::new();
        assert!(!gate.is_paused());

        gate.mark_paused();
        assert!(gate.is_paused());

        gate.clear();
        assert!(!gate.is_paused());

        gate.mark_paused();
        gate.mark_resumed();
        assert!(!gate.is_paused());
    }

    #[test]
    fn test_wait_paused_returns_after_flip() {
        let gate = Arc::new(PauseGate::new());
        let ticket = gate.ticket();

        let worker = gate.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            worker.mark_paused();
        });

        gate.wait_paused(ticket);
        assert!(gate.is_paused());
        handle.join().unwrap();
    }

    /// 测试 Pause 分发后立即被 Move 清除时，等待方不会被卡住
    #[test]
    fn test_wait_paused_survives_racing_clear() {
        let gate = PauseGate::new();
        let ticket = gate.ticket();

        gate.mark_paused();
        gate.clear();

        // 序号已前进，立即返回
        gate.wait_paused(ticket);
        assert!(!gate.is_paused());
    }

    #[test]
    fn test_wait_resumed_immediate_when_not_paused() {
        let gate = PauseGate::new();
        let ticket = gate.ticket();
        gate.wait_resumed(ticket);
        assert!(!gate.is_paused());
    }
}
