//! 控制参数配置

use crate::error::MotorError;
use std::time::Duration;

/// 控制参数
///
/// # Example
///
/// ```
/// use motor_driver::MotorConfig;
///
/// // 默认配置（100ms 轮询，1000ms 超时，到达阈值 1.0）
/// let config = MotorConfig::default();
/// assert!(config.validate().is_ok());
///
/// let config = MotorConfig {
///     poll_interval_ms: 20,
///     move_timeout_ms: 3000,
///     arrival_threshold: 0.5,
/// };
/// assert_eq!(config.poll_interval().as_millis(), 20);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotorConfig {
    /// 控制线程轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 单次运动（新移动或恢复）允许的最长时间（毫秒）
    pub move_timeout_ms: u64,
    /// 到达阈值：|target - actual| 小于此值视为到达
    pub arrival_threshold: f64,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            move_timeout_ms: 1000,
            arrival_threshold: 1.0,
        }
    }
}

impl MotorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn move_timeout(&self) -> Duration {
        Duration::from_millis(self.move_timeout_ms)
    }

    /// 校验配置
    ///
    /// # 错误
    /// - `MotorError::InvalidConfig`: 轮询间隔为 0、超时为 0，或阈值不是正有限数
    pub fn validate(&self) -> Result<(), MotorError> {
        if self.poll_interval_ms == 0 {
            return Err(MotorError::InvalidConfig(
                "poll_interval_ms must be > 0".to_string(),
            ));
        }
        if self.move_timeout_ms == 0 {
            return Err(MotorError::InvalidConfig(
                "move_timeout_ms must be > 0".to_string(),
            ));
        }
        if !self.arrival_threshold.is_finite() || self.arrival_threshold <= 0.0 {
            return Err(MotorError::InvalidConfig(format!(
                "arrival_threshold must be a positive finite number, got {}",
                self.arrival_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MotorConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.move_timeout(), Duration::from_millis(1000));
        assert_eq!(config.arrival_threshold, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_poll() {
        let config = MotorConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = MotorConfig {
            move_timeout_ms: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(MotorError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        for threshold in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = MotorConfig {
                arrival_threshold: threshold,
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(MotorError::InvalidConfig(_))),
                "threshold {} should be rejected",
                threshold
            );
        }
    }
}
