//! 对外 API 模块
//!
//! 提供 `AsyncMotor` 句柄，封装控制线程与各共享单元。

use crate::actuator::Actuator;
use crate::command::Command;
use crate::config::MotorConfig;
use crate::control::{MotorContext, control_loop};
use crate::error::{Fault, MotorError};
use crate::interface::{InterfaceGuard, release_with_reset};
use crate::metrics::MetricsSnapshot;
use crate::position::PositionState;
use crate::status::Status;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, warn};

/// 在看门狗线程中 join 控制线程，超时后放弃等待
///
/// 返回 `None` 表示超时。
fn join_worker(handle: JoinHandle<()>, timeout: Duration) -> Option<std::thread::Result<()>> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        let _ = tx.send(handle.join());
    });
    rx.recv_timeout(timeout).ok()
}

/// 异步电机协调器（对外 API）
///
/// 一个后台控制线程独占执行器，任意多个调用方线程通过 `&self` 并发调用。
/// `AsyncMotor` 是 `Send + Sync` 的，可放入 `Arc` 在线程间共享。
///
/// # 并发约定
///
/// 单条命令的投递由邮箱串行化，但"发布 + 等待完成"两步并不会自动串行化：
/// 多个调用方并发时，需持有接口锁（同步接口会自动持有）。
///
/// # Example
///
/// ```no_run
/// use motor_driver::{AsyncMotor, Actuator};
///
/// # fn example(actuator: impl Actuator + 'static) -> Result<(), Box<dyn std::error::Error>> {
/// let motor = AsyncMotor::builder().build(actuator)?;
///
/// // 同步移动：自动持有接口锁
/// motor.move_to_sync(50.0)?;
///
/// // 手动持有接口锁的异步流程
/// motor.require_interface();
/// motor.move_to_async(0.0)?;
/// let result = motor.wait_for_move_done();
/// motor.release_interface();
/// result?;
/// # Ok(())
/// # }
/// ```
pub struct AsyncMotor {
    /// 共享状态上下文
    ctx: Arc<MotorContext>,
    /// 控制线程句柄（Drop 时 join）
    worker: Option<JoinHandle<()>>,
    /// 控制参数
    config: MotorConfig,
}

impl AsyncMotor {
    /// 控制线程退出的最长等待时间
    const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

    /// 创建 Builder
    pub fn builder() -> crate::AsyncMotorBuilder {
        crate::AsyncMotorBuilder::new()
    }

    /// 启动控制线程
    ///
    /// 返回前控制线程已经读取了初始位置。
    ///
    /// # 错误
    /// - `MotorError::InvalidConfig`: 配置校验失败
    /// - `MotorError::Spawn`: 控制线程启动失败
    /// - `MotorError::WorkerExited`: 控制线程在就绪前退出
    pub fn new(actuator: Box<dyn Actuator>, config: MotorConfig) -> Result<Self, MotorError> {
        config.validate()?;

        let ctx = Arc::new(MotorContext::new());
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);

        let ctx_clone = ctx.clone();
        let config_clone = config.clone();
        let worker = std::thread::Builder::new()
            .name("motor-control".to_string())
            .spawn(move || {
                control_loop(actuator, ctx_clone, config_clone, Some(ready_tx));
            })?;

        // 控制线程在读到初始位置前 panic 时，ready_tx 被丢弃，recv 返回 Err
        if ready_rx.recv().is_err() {
            error!("Control thread exited before reporting ready");
            if join_worker(worker, Self::JOIN_TIMEOUT).is_none() {
                warn!("Control thread did not finish unwinding within {:?}", Self::JOIN_TIMEOUT);
            }
            return Err(MotorError::WorkerExited);
        }

        Ok(Self {
            ctx,
            worker: Some(worker),
            config,
        })
    }

    /// 控制参数
    pub fn config(&self) -> &MotorConfig {
        &self.config
    }

    // ---------------------------------------------------------------
    // 移动
    // ---------------------------------------------------------------

    /// 异步移动：投递 Move 后立即返回
    ///
    /// # 错误
    /// - `Fault::Unknown`: 控制线程已退出
    /// - 锁存的故障（如 `Fault::Timeout`）
    /// - `Fault::InterfaceSync`: 当前状态不是 `Idle`
    pub fn move_to_async(&self, target: f64) -> Result<(), Fault> {
        self.ensure_running()?;
        self.ctx.status.check_ready_for_move()?;
        debug!("Publishing move to {}", target);
        self.ctx.mailbox.publish(Command::Move(target));
        Ok(())
    }

    /// 异步相对移动（以缓存的实际位置为基准）
    pub fn move_distance_async(&self, distance: f64) -> Result<(), Fault> {
        let current = self.ctx.position.actual();
        self.move_to_async(current + distance)
    }

    /// 同步移动：持有接口锁，投递并等待完成
    ///
    /// 故障保持锁存，需调用 [`release_interface`](Self::release_interface) 清除。
    pub fn move_to_sync(&self, target: f64) -> Result<(), Fault> {
        let _guard = self.interface();
        self.move_to_async(target)?;
        self.wait_for_move_done()
    }

    /// 同步相对移动
    ///
    /// 基准位置在持有接口锁之后读取。
    pub fn move_distance_sync(&self, distance: f64) -> Result<(), Fault> {
        let _guard = self.interface();
        self.move_distance_async(distance)?;
        self.wait_for_move_done()
    }

    /// 等待当前移动完成
    ///
    /// - 到达：状态复位为 `Idle`，返回 `Ok(())`
    /// - 故障：保持锁存并返回该故障
    /// - 控制线程已退出且没有终止状态可消费：`Fault::Unknown`
    pub fn wait_for_move_done(&self) -> Result<(), Fault> {
        if !self.ctx.is_running.load(Ordering::Acquire) && !self.ctx.status.get().is_terminal() {
            return Err(Fault::Unknown);
        }
        self.ctx.status.await_terminal()
    }

    /// 带超时的 [`wait_for_move_done`](Self::wait_for_move_done)
    ///
    /// 超时仍未进入终止状态时返回 `Ok(false)`，状态不变。
    pub fn wait_for_move_done_timeout(&self, timeout: Duration) -> Result<bool, Fault> {
        self.ctx.status.await_terminal_for(timeout)
    }

    // ---------------------------------------------------------------
    // 暂停 / 恢复
    // ---------------------------------------------------------------

    /// 暂停：阻塞直到执行器进入保持状态
    ///
    /// 不改变运动状态，等待完成的调用方会继续等待。
    /// 不要在持有接口锁时从另一个线程调用（等待方已持有接口锁的情况除外）。
    pub fn pause(&self) -> Result<(), Fault> {
        self.ensure_running()?;
        self.ctx.status.check_fault()?;
        let ticket = self.ctx.pause.ticket();
        self.ctx.mailbox.publish(Command::Pause);
        self.ctx.pause.wait_paused(ticket);
        Ok(())
    }

    /// 恢复：阻塞直到保持状态解除
    pub fn resume(&self) -> Result<(), Fault> {
        self.ensure_running()?;
        self.ctx.status.check_fault()?;
        let ticket = self.ctx.pause.ticket();
        self.ctx.mailbox.publish(Command::Resume);
        self.ctx.pause.wait_resumed(ticket);
        Ok(())
    }

    /// 执行器是否处于保持状态
    pub fn is_paused(&self) -> bool {
        self.ctx.pause.is_paused()
    }

    // ---------------------------------------------------------------
    // 状态读取
    // ---------------------------------------------------------------

    /// 最近一次读取的实际位置（无锁）
    pub fn actual_position(&self) -> f64 {
        self.ctx.position.actual()
    }

    /// 当前目标位置（无锁）
    pub fn target_position(&self) -> f64 {
        self.ctx.position.target()
    }

    /// 位置快照（无锁）
    pub fn position_state(&self) -> PositionState {
        self.ctx.position.load()
    }

    /// 运动状态快照
    pub fn status(&self) -> Status {
        self.ctx.status.get()
    }

    /// 计数器快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    /// 控制线程退出后，新的请求不会再被消费
    fn ensure_running(&self) -> Result<(), Fault> {
        if self.ctx.is_running.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(Fault::Unknown)
        }
    }

    /// 控制线程是否存活
    pub fn is_healthy(&self) -> bool {
        self.ctx.is_running.load(Ordering::Acquire)
            && self.worker.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    // ---------------------------------------------------------------
    // 接口锁
    // ---------------------------------------------------------------

    /// 手动获取接口锁（阻塞）
    ///
    /// 必须与 [`release_interface`](Self::release_interface) 配对。
    pub fn require_interface(&self) {
        self.ctx.interface.acquire();
    }

    /// 显式释放接口锁
    ///
    /// 同时把状态强制复位为 `Idle`（清除锁存的故障）。重复调用是安全的。
    /// 锁由其他线程持有时，本次调用被忽略（不解锁、不复位）。
    pub fn release_interface(&self) {
        release_with_reset(&self.ctx.interface, &self.ctx.status);
    }

    /// 作用域获取接口锁
    ///
    /// 守卫 Drop 时只解锁，不复位状态；调用 [`InterfaceGuard::release`] 执行显式释放。
    pub fn interface(&self) -> InterfaceGuard<'_> {
        InterfaceGuard::acquire(&self.ctx.interface, &self.ctx.status)
    }
}

impl std::fmt::Debug for AsyncMotor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncMotor")
            .field("config", &self.config)
            .field("status", &self.status())
            .field("paused", &self.is_paused())
            .field("position", &self.position_state())
            .finish()
    }
}

impl Drop for AsyncMotor {
    fn drop(&mut self) {
        // 不等待插槽为空：可能仍有未消费的命令，控制线程也可能已退出
        if let Some(dropped) = self.ctx.mailbox.force_publish(Command::Quit) {
            warn!("Dropping pending {} command on shutdown", dropped.name());
        }

        if let Some(handle) = self.worker.take() {
            match join_worker(handle, Self::JOIN_TIMEOUT) {
                Some(Ok(())) => {},
                Some(Err(_)) => error!("Control thread panicked"),
                None => error!(
                    "Control thread failed to shut down within {:?}",
                    Self::JOIN_TIMEOUT
                ),
            }
        }
    }
}
