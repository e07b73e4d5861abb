//! 错误类型定义
//!
//! - [`Fault`]：运动故障，锁存在状态机中并抛给等待方
//! - [`MotorError`]：构造/配置等非运动错误

use thiserror::Error;

/// 运动故障
///
/// 故障会锁存为 `Status::Error(fault)`，直到调用方显式释放接口锁
/// （[`AsyncMotor::release_interface`](crate::AsyncMotor::release_interface)）。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    /// 在超时时间内未到达目标位置
    #[error("Move Timeout")]
    Timeout,

    /// 调用方协议错误（状态非 Idle 时发起新的移动请求）
    #[error("Interface Sync Error")]
    InterfaceSync,

    /// 内部状态不一致（保留）
    #[error("Status Error")]
    Status,

    /// 其他意外的终止状态
    #[error("Unknown Error")]
    Unknown,
}

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum MotorError {
    /// 运动故障
    #[error("Motion fault: {0}")]
    Fault(#[from] Fault),

    /// 配置无效
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// 控制线程启动失败
    #[error("Failed to spawn control thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// 控制线程在就绪前退出（例如执行器读取位置时 panic）
    #[error("Control thread exited before reporting ready")]
    WorkerExited,
}
