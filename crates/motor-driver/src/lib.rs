//! 异步电机协调器
//!
//! 本 crate 提供单执行器的异步运动协调功能，包括：
//! - 控制线程管理（独占执行器，固定轮询间隔）
//! - 单槽命令邮箱（Move / Pause / Resume / Quit）
//! - 可观测的运动状态机与故障锁存
//! - 与运动状态正交的暂停/恢复
//! - 调用方显式持有的接口锁（多步请求/等待序列）
//!
//! # 使用场景
//!
//! 多个线程需要对同一个执行器发起移动，并在完成或超时时得到类型化的结果。
//!
//! ```no_run
//! # #[cfg(feature = "sim")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use motor_driver::{AsyncMotor, SimulatedActuator};
//!
//! let motor = AsyncMotor::builder().build(SimulatedActuator::builder().spawn())?;
//! motor.move_to_sync(50.0)?;
//! println!("arrived at {}", motor.actual_position());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "sim"))]
//! # fn main() {}
//! ```

mod actuator;
mod builder;
pub mod command;
mod config;
mod control;
mod error;
pub mod interface;
pub mod metrics;
mod motor;
pub mod pause;
pub mod position;
#[cfg(feature = "sim")]
pub mod sim;
pub mod status;

pub use actuator::Actuator;
pub use builder::AsyncMotorBuilder;
pub use command::{Command, CommandMailbox};
pub use config::MotorConfig;
pub use error::{Fault, MotorError};
pub use interface::{InterfaceGuard, InterfaceLock};
pub use metrics::{MetricsSnapshot, MotorMetrics};
pub use motor::AsyncMotor;
pub use pause::PauseGate;
pub use position::{PositionCache, PositionState};
#[cfg(feature = "sim")]
pub use sim::{SimHandle, SimulatedActuator, SimulatedActuatorBuilder};
pub use status::{Status, StatusCell};
