//! 命令类型与单槽邮箱
//!
//! 调用方通过 [`CommandMailbox::publish`] 投递命令，控制线程通过
//! [`CommandMailbox::take_timeout`] 取出。任意时刻最多只有一条未消费的命令。

use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// 控制线程命令
///
/// 邮箱为空（`None`）即表示"无命令"。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// 移动到绝对目标位置
    Move(f64),
    /// 暂停（执行器保持当前位置）
    Pause,
    /// 恢复（向上次记录的目标重新发起移动）
    Resume,
    /// 停止控制线程
    Quit,
}

impl Command {
    /// 命令名称（用于日志）
    pub fn name(&self) -> &'static str {
        match self {
            Command::Move(_) => "move",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Quit => "quit",
        }
    }
}

/// 单槽命令邮箱
///
/// 投递是阻塞的：必须等上一条命令被控制线程取走后才能写入新命令。
#[derive(Debug, Default)]
pub struct CommandMailbox {
    slot: Mutex<Option<Command>>,
    cond: Condvar,
}

impl CommandMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// 投递命令（阻塞直到插槽为空）
    pub fn publish(&self, command: Command) {
        let mut slot = self.slot.lock();
        self.cond.wait_while(&mut slot, |s| s.is_some());
        *slot = Some(command);
        // 发布方和控制线程共用一个条件变量，必须 notify_all
        self.cond.notify_all();
    }

    /// 强制写入命令（不等待插槽为空，覆盖未消费的命令）
    ///
    /// 仅用于析构时投递 `Quit`：控制线程可能已经退出，不能阻塞。
    pub(crate) fn force_publish(&self, command: Command) -> Option<Command> {
        let mut slot = self.slot.lock();
        let dropped = slot.replace(command);
        self.cond.notify_all();
        dropped
    }

    /// 取出命令（控制线程使用）
    ///
    /// 最多等待 `timeout`；有新命令时立即返回。取出后唤醒阻塞的发布方。
    pub fn take_timeout(&self, timeout: Duration) -> Option<Command> {
        let mut slot = self.slot.lock();
        if slot.is_none() {
            let _ = self.cond.wait_while_for(&mut slot, |s| s.is_none(), timeout);
        }
        let command = slot.take();
        if command.is_some() {
            self.cond.notify_all();
        }
        command
    }

    /// 当前是否有未消费的命令
    pub fn is_pending(&self) -> bool {
        self.slot.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_command_name() {
        assert_eq!(Command::Move(1.0).name(), "move");
        assert_eq!(Command::Pause.name(), "pause");
        assert_eq!(Command::Resume.name(), "resume");
        assert_eq!(Command::Quit.name(), "quit");
    }

    #[test]
    fn test_publish_then_take() {
        let mailbox = CommandMailbox::new();
        assert!(!mailbox.is_pending());

        mailbox.publish(Command::Move(12.5));
        assert!(mailbox.is_pending());

        assert_eq!(mailbox.take_timeout(Duration::from_millis(10)), Some(Command::Move(12.5)));
        assert!(!mailbox.is_pending());
    }

    #[test]
    fn test_take_timeout_empty() {
        let mailbox = CommandMailbox::new();
        let start = Instant::now();
        assert_eq!(mailbox.take_timeout(Duration::from_millis(30)), None);
        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    /// 测试 take_timeout 在新命令到达时提前返回
    #[test]
    fn test_take_wakes_on_publish() {
        let mailbox = Arc::new(CommandMailbox::new());
        let publisher = mailbox.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            publisher.publish(Command::Pause);
        });

        let start = Instant::now();
        let command = mailbox.take_timeout(Duration::from_secs(5));
        assert_eq!(command, Some(Command::Pause));
        assert!(start.elapsed() < Duration::from_secs(2));
        handle.join().unwrap();
    }

    /// 测试插槽非空时 publish 阻塞，直到命令被取走
    #[test]
    fn test_publish_blocks_until_empty() {
        let mailbox = Arc::new(CommandMailbox::new());
        mailbox.publish(Command::Move(1.0));

        let publisher = mailbox.clone();
        let handle = thread::spawn(move || {
            publisher.publish(Command::Move(2.0));
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished(), "second publish must wait for an empty slot");

        assert_eq!(mailbox.take_timeout(Duration::from_millis(10)), Some(Command::Move(1.0)));
        handle.join().unwrap();
        assert_eq!(mailbox.take_timeout(Duration::from_millis(10)), Some(Command::Move(2.0)));
    }

    #[test]
    fn test_force_publish_overwrites() {
        let mailbox = CommandMailbox::new();
        mailbox.publish(Command::Move(3.0));
        let dropped = mailbox.force_publish(Command::Quit);
        assert_eq!(dropped, Some(Command::Move(3.0)));
        assert_eq!(mailbox.take_timeout(Duration::from_millis(10)), Some(Command::Quit));
    }
}
