//! 移动命令
//!
//! 在模拟执行器上执行一次同步移动

use anyhow::Result;
use clap::Args;
use motor_driver::{AsyncMotor, MotorConfig, SimulatedActuator};
use std::time::Instant;
use tracing::info;

/// 移动命令参数
#[derive(Args, Debug)]
pub struct MoveCommand {
    /// 目标位置（`--relative` 时为相对距离）
    #[arg(short, long, allow_hyphen_values = true)]
    pub target: f64,

    /// 按相对距离移动
    #[arg(short, long)]
    pub relative: bool,

    /// 模拟执行器的起始位置
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub from: f64,
}

impl MoveCommand {
    pub fn execute(&self, config: MotorConfig) -> Result<()> {
        let actuator = SimulatedActuator::builder().start_at(self.from).spawn();
        let motor = AsyncMotor::builder().config(config).build(actuator)?;

        info!(
            "Moving {} {} from {}",
            if self.relative { "by" } else { "to" },
            self.target,
            motor.actual_position()
        );

        let start = Instant::now();
        if self.relative {
            motor.move_distance_sync(self.target)?;
        } else {
            motor.move_to_sync(self.target)?;
        }
        let elapsed = start.elapsed();

        println!(
            "✅ Arrived at {:.3} (target {:.3}) in {} ms",
            motor.actual_position(),
            motor.target_position(),
            elapsed.as_millis()
        );
        Ok(())
    }
}
