//! Builder 模式实现
//!
//! 提供链式构造 `AsyncMotor` 实例的便捷方式。

use crate::actuator::Actuator;
use crate::config::MotorConfig;
use crate::error::MotorError;
use crate::motor::AsyncMotor;
use std::time::Duration;

/// AsyncMotor Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use motor_driver::{AsyncMotorBuilder, Actuator};
/// use std::time::Duration;
///
/// # fn example(actuator: impl Actuator + 'static) -> Result<(), motor_driver::MotorError> {
/// let motor = AsyncMotorBuilder::new()
///     .poll_interval(Duration::from_millis(100))
///     .move_timeout(Duration::from_millis(1000))
///     .arrival_threshold(1.0)
///     .build(actuator)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AsyncMotorBuilder {
    config: MotorConfig,
}

impl AsyncMotorBuilder {
    /// 创建新的 Builder（默认配置）
    pub fn new() -> Self {
        Self::default()
    }

    /// 整体替换配置（例如从 TOML 加载的配置）
    pub fn config(mut self, config: MotorConfig) -> Self {
        self.config = config;
        self
    }

    /// 设置控制线程轮询间隔（毫秒精度，默认 100ms）
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    /// 设置单次运动超时（毫秒精度，默认 1000ms）
    pub fn move_timeout(mut self, timeout: Duration) -> Self {
        self.config.move_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// 设置到达阈值（默认 1.0）
    pub fn arrival_threshold(mut self, threshold: f64) -> Self {
        self.config.arrival_threshold = threshold;
        self
    }

    /// 当前配置
    pub fn current_config(&self) -> &MotorConfig {
        &self.config
    }

    /// 构建 AsyncMotor 实例并启动控制线程
    ///
    /// # Errors
    /// - `MotorError::InvalidConfig`: 配置校验失败
    /// - `MotorError::Spawn`: 控制线程启动失败
    pub fn build(self, actuator: impl Actuator + 'static) -> Result<AsyncMotor, MotorError> {
        AsyncMotor::new(Box::new(actuator), self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = AsyncMotorBuilder::new();
        assert_eq!(builder.current_config(), &MotorConfig::default());
    }

    #[test]
    fn test_builder_chain() {
        let builder = AsyncMotorBuilder::new()
            .poll_interval(Duration::from_millis(20))
            .move_timeout(Duration::from_secs(3))
            .arrival_threshold(0.25);
        let config = builder.current_config();
        assert_eq!(config.poll_interval_ms, 20);
        assert_eq!(config.move_timeout_ms, 3000);
        assert_eq!(config.arrival_threshold, 0.25);
    }

    #[test]
    fn test_builder_config_then_override() {
        let base = MotorConfig {
            poll_interval_ms: 5,
            move_timeout_ms: 50,
            arrival_threshold: 2.0,
        };
        let builder = AsyncMotorBuilder::new().config(base).arrival_threshold(0.1);
        assert_eq!(builder.current_config().poll_interval_ms, 5);
        assert_eq!(builder.current_config().arrival_threshold, 0.1);
    }

    /// 测试亚毫秒轮询间隔被截断为 0，并在 build 时被拒绝
    #[cfg(feature = "sim")]
    #[test]
    fn test_builder_rejects_sub_millisecond_poll() {
        let result = AsyncMotorBuilder::new()
            .poll_interval(Duration::from_micros(500))
            .build(crate::sim::SimulatedActuator::builder().spawn());
        assert!(matches!(result, Err(MotorError::InvalidConfig(_))));
    }
}
