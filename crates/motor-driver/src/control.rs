//! 控制循环模块
//!
//! 后台控制线程独占执行器，每个 tick：
//!
//! 1. 等待新命令（最多一个轮询间隔）
//! 2. 分发至多一条命令
//! 3. 无条件读取实际位置并刷新位置缓存
//! 4. 若状态为 `Moving` 且未暂停：判定到达或超时
//!
//! 超时只是"报告"：执行器不会被打断，只有对外状态变化。

use crate::actuator::Actuator;
use crate::command::{Command, CommandMailbox};
use crate::config::MotorConfig;
use crate::error::Fault;
use crate::interface::InterfaceLock;
use crate::metrics::MotorMetrics;
use crate::pause::PauseGate;
use crate::position::PositionCache;
use crate::status::{Status, StatusCell};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// 共享状态上下文
///
/// 每个可变单元各自加锁、各自唤醒，没有全局锁。
#[derive(Debug, Default)]
pub(crate) struct MotorContext {
    /// 单槽命令邮箱
    pub(crate) mailbox: CommandMailbox,
    /// 运动状态 + 锁存故障
    pub(crate) status: StatusCell,
    /// 暂停标志
    pub(crate) pause: PauseGate,
    /// 实际/目标位置缓存
    pub(crate) position: PositionCache,
    /// 调用方接口锁
    pub(crate) interface: InterfaceLock,
    /// 计数器
    pub(crate) metrics: MotorMetrics,
    /// 控制线程是否在运行
    pub(crate) is_running: AtomicBool,
}

impl MotorContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

/// 单个 tick 的运动判定（纯函数）
///
/// 只在 `Moving` 且未暂停时判定；到达与超时在同一 tick 内互斥，到达优先。
/// 返回 `Some(new_status)` 表示状态需要推进。
pub(crate) fn evaluate_motion(
    status: Status,
    paused: bool,
    target: f64,
    actual: f64,
    elapsed: Duration,
    config: &MotorConfig,
) -> Option<Status> {
    if status != Status::Moving || paused {
        return None;
    }
    if (target - actual).abs() < config.arrival_threshold {
        Some(Status::MoveOk)
    } else if elapsed > config.move_timeout() {
        Some(Status::Error(Fault::Timeout))
    } else {
        None
    }
}

/// 控制线程异常退出时，把故障抛给所有等待方
struct PanicGuard<'a> {
    ctx: &'a MotorContext,
}

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        self.ctx.is_running.store(false, Ordering::Release);
        if std::thread::panicking() {
            error!("Control thread panicked, latching Unknown fault");
            self.ctx.status.set(Status::Error(Fault::Unknown));
        }
    }
}

/// 控制线程循环
///
/// # 参数
/// - `actuator`: 执行器（移动到控制线程，独占）
/// - `ctx`: 共享状态上下文
/// - `config`: 控制参数
/// - `ready_tx`: 初始位置写入缓存后发送就绪信号
pub(crate) fn control_loop(
    mut actuator: Box<dyn Actuator>,
    ctx: Arc<MotorContext>,
    config: MotorConfig,
    ready_tx: Option<Sender<()>>,
) {
    let _guard = PanicGuard { ctx: &*ctx };
    let poll_interval = config.poll_interval();

    // 用初始位置填充缓存，目标默认等于当前位置
    let initial = actuator.read_position();
    let mut target = initial;
    let mut paused = false;
    let mut motion_started = Instant::now();
    ctx.position.store(initial, target);
    ctx.is_running.store(true, Ordering::Release);
    if let Some(tx) = ready_tx {
        let _ = tx.send(());
    }

    info!(
        "Control thread started (poll={:?}, timeout={:?}, threshold={}, position={})",
        poll_interval,
        config.move_timeout(),
        config.arrival_threshold,
        initial
    );

    loop {
        let command = ctx.mailbox.take_timeout(poll_interval);
        let mut quit = false;

        if let Some(command) = command {
            MotorMetrics::incr(&ctx.metrics.commands_dispatched);
            debug!("Dispatching {} command", command.name());

            match command {
                Command::Move(new_target) => {
                    // 新的移动覆盖之前的暂停：总是重新驱动执行器
                    target = new_target;
                    paused = false;
                    actuator.move_to(target);
                    motion_started = Instant::now();
                    ctx.pause.clear();
                    ctx.status.set(Status::Moving);
                    MotorMetrics::incr(&ctx.metrics.moves_started);
                },
                Command::Pause => {
                    actuator.hold();
                    paused = true;
                    ctx.pause.mark_paused();
                    MotorMetrics::incr(&ctx.metrics.pauses);
                },
                Command::Resume => {
                    motion_started = Instant::now();
                    actuator.move_to(target);
                    paused = false;
                    ctx.pause.mark_resumed();
                    MotorMetrics::incr(&ctx.metrics.resumes);
                },
                Command::Quit => {
                    quit = true;
                },
            }
        }

        let actual = actuator.read_position();
        ctx.position.store(actual, target);

        let elapsed = motion_started.elapsed();
        let transition = ctx
            .status
            .update(|status| evaluate_motion(status, paused, target, actual, elapsed, &config));

        match transition {
            Some(Status::MoveOk) => {
                MotorMetrics::incr(&ctx.metrics.moves_completed);
                debug!("Move to {} done (actual={}, elapsed={:?})", target, actual, elapsed);
            },
            Some(Status::Error(fault)) => {
                MotorMetrics::incr(&ctx.metrics.timeouts);
                warn!(
                    "Move to {} failed: {} (actual={}, elapsed={:?})",
                    target, fault, actual, elapsed
                );
            },
            _ => {},
        }

        MotorMetrics::incr(&ctx.metrics.ticks);
        trace!("tick: target={} actual={} paused={}", target, actual, paused);

        if quit {
            break;
        }
    }

    info!("Control thread stopped");
}
