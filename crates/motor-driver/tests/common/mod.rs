//! 集成测试公共工具

#![allow(dead_code)]

use motor_driver::{AsyncMotor, MotorConfig, SimHandle, SimulatedActuator};
use std::time::Duration;

/// 基准场景配置：轮询 100ms，超时 1000ms，阈值 1
pub fn reference_config() -> MotorConfig {
    MotorConfig {
        poll_interval_ms: 100,
        move_timeout_ms: 1000,
        arrival_threshold: 1.0,
    }
}

/// 基准场景执行器：步进 50ms，剩余距离的 80%，单步上限 4
pub fn reference_sim(frozen: bool) -> SimulatedActuator {
    SimulatedActuator::builder()
        .start_at(0.0)
        .step_interval(Duration::from_millis(50))
        .gain(0.8)
        .max_step(4.0)
        .frozen(frozen)
        .spawn()
}

/// 快速配置（用于多次移动的测试）
pub fn fast_config() -> MotorConfig {
    MotorConfig {
        poll_interval_ms: 5,
        move_timeout_ms: 3000,
        arrival_threshold: 0.5,
    }
}

pub fn fast_sim() -> SimulatedActuator {
    SimulatedActuator::builder()
        .step_interval(Duration::from_millis(2))
        .gain(0.8)
        .max_step(5.0)
        .spawn()
}

/// 构造电机并返回模拟句柄
pub fn motor_with(config: MotorConfig, sim: SimulatedActuator) -> (AsyncMotor, SimHandle) {
    let handle = sim.handle();
    let motor = AsyncMotor::builder()
        .config(config)
        .build(sim)
        .expect("Failed to create motor");
    (motor, handle)
}

/// 轮询等待条件成立（仅测试侧使用）
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}
