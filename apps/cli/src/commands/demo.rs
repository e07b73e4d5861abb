//! 压力演示命令
//!
//! N 个移动线程交替执行：
//! - `move_to_sync(50)`
//! - 手动持有接口锁：`move_to_async(0)` + 等待完成
//!
//! 一个监督线程不持有接口锁，周期性暂停、检查保持窗口内位置未漂移、再恢复。

use anyhow::Result;
use clap::Args;
use motor_driver::{AsyncMotor, MotorConfig, SimulatedActuator};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const FAR_TARGET: f64 = 50.0;
const HOME_TARGET: f64 = 0.0;

/// 演示命令参数
#[derive(Args, Debug)]
pub struct DemoCommand {
    /// 移动线程数量
    #[arg(long, default_value_t = 10)]
    pub movers: usize,

    /// 运行时长（秒）
    #[arg(long, default_value_t = 10)]
    pub duration_secs: u64,

    /// 每次暂停的保持时长（毫秒）
    #[arg(long, default_value_t = 333)]
    pub pause_ms: u64,

    /// 两次暂停之间的运行时长（毫秒）
    #[arg(long, default_value_t = 222)]
    pub resume_ms: u64,
}

/// 演示期间的共享状态
#[derive(Default)]
struct DemoState {
    stop: AtomicBool,
    failed: AtomicBool,
    round_trips: AtomicU64,
    pause_cycles: AtomicU64,
}

impl DemoState {
    fn fail(&self) {
        self.failed.store(true, Ordering::Release);
        self.stop.store(true, Ordering::Release);
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

impl DemoCommand {
    pub fn execute(&self, config: MotorConfig) -> Result<()> {
        if self.movers == 0 {
            anyhow::bail!("--movers must be at least 1");
        }

        let drift_limit = config.arrival_threshold;
        let settle = config.poll_interval();
        let motor = Arc::new(
            AsyncMotor::builder()
                .config(config)
                .build(SimulatedActuator::builder().spawn())?,
        );
        let state = Arc::new(DemoState::default());

        let ctrlc_state = state.clone();
        ctrlc::set_handler(move || {
            eprintln!("\nReceived interrupt signal. Stopping demo...");
            ctrlc_state.stop.store(true, Ordering::Release);
        })?;

        info!(
            "Starting demo: {} movers, {}s, pause {}ms / resume {}ms",
            self.movers, self.duration_secs, self.pause_ms, self.resume_ms
        );

        let mut handles = Vec::with_capacity(self.movers);
        for index in 0..self.movers {
            let motor = motor.clone();
            let state = state.clone();
            handles.push(
                thread::Builder::new()
                    .name(format!("mover-{}", index))
                    .spawn(move || run_mover(index, &motor, &state))?,
            );
        }

        let supervisor = {
            let motor = motor.clone();
            let state = state.clone();
            let pause = Duration::from_millis(self.pause_ms);
            let resume = Duration::from_millis(self.resume_ms);
            thread::Builder::new()
                .name("supervisor".to_string())
                .spawn(move || run_supervisor(&motor, &state, pause, resume, settle, drift_limit))?
        };

        let deadline = Instant::now() + Duration::from_secs(self.duration_secs);
        while Instant::now() < deadline && !state.stopped() {
            thread::sleep(Duration::from_millis(50));
        }
        state.stop.store(true, Ordering::Release);

        if supervisor.join().is_err() {
            error!("Supervisor thread panicked");
            state.failed.store(true, Ordering::Release);
        }
        for handle in handles {
            if handle.join().is_err() {
                error!("Mover thread panicked");
                state.failed.store(true, Ordering::Release);
            }
        }

        println!("Round trips: {}", state.round_trips.load(Ordering::Relaxed));
        println!("Pause cycles: {}", state.pause_cycles.load(Ordering::Relaxed));
        println!("Metrics: {}", motor.metrics());

        if state.failed.load(Ordering::Acquire) {
            anyhow::bail!("Demo failed, see log for details");
        }
        println!("✅ Demo finished without faults");
        Ok(())
    }
}

fn run_mover(index: usize, motor: &AsyncMotor, state: &DemoState) {
    while !state.stopped() {
        debug!("mover-{}: sync move from {}", index, motor.actual_position());
        if let Err(fault) = motor.move_to_sync(FAR_TARGET) {
            error!("mover-{}: sync move failed: {}", index, fault);
            state.fail();
            return;
        }

        debug!("mover-{}: async move from {}", index, motor.actual_position());
        motor.require_interface();
        let result = motor
            .move_to_async(HOME_TARGET)
            .and_then(|()| motor.wait_for_move_done());
        motor.release_interface();
        if let Err(fault) = result {
            error!("mover-{}: async move failed: {}", index, fault);
            state.fail();
            return;
        }

        state.round_trips.fetch_add(1, Ordering::Relaxed);
    }
}

fn run_supervisor(
    motor: &AsyncMotor,
    state: &DemoState,
    pause: Duration,
    resume: Duration,
    settle: Duration,
    drift_limit: f64,
) {
    while !state.stopped() {
        if let Err(fault) = motor.pause() {
            error!("supervisor: pause failed: {}", fault);
            state.fail();
            return;
        }
        // 等待一个轮询周期，让位置缓存反映保持后的位置
        thread::sleep(settle);
        let before = motor.actual_position();
        thread::sleep(pause);
        let after = motor.actual_position();

        // 暂停期间有新的移动会解除暂停，此时位置变化是预期的
        if motor.is_paused() && (after - before).abs() > drift_limit {
            warn!(
                "supervisor: position drifted while paused: {} -> {}",
                before, after
            );
            state.fail();
        }

        if let Err(fault) = motor.resume() {
            error!("supervisor: resume failed: {}", fault);
            state.fail();
            return;
        }
        state.pause_cycles.fetch_add(1, Ordering::Relaxed);
        thread::sleep(resume);
    }
}
