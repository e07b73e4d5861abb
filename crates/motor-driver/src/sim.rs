//! 模拟执行器
//!
//! 无硬件依赖的 [`Actuator`] 实现，用于测试和 CLI 演示。
//!
//! 后台步进线程每个步进周期把位置向目标推进一步：
//!
//! ```text
//! step = clamp((target - position) * gain, -max_step, +max_step)
//! ```
//!
//! 保持（hold）或冻结（freeze）时位置不变。冻结用于模拟无法到达目标的故障执行器。

use crate::actuator::Actuator;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{error, trace};

/// 单步推进量
pub fn sim_step(position: f64, target: f64, gain: f64, max_step: f64) -> f64 {
    ((target - position) * gain).clamp(-max_step, max_step)
}

#[derive(Debug, Clone, Copy)]
struct SimState {
    position: f64,
    target: f64,
    holding: bool,
    frozen: bool,
}

/// 模拟状态句柄（可克隆，供测试/演示观察和注入故障）
#[derive(Debug, Clone)]
pub struct SimHandle {
    state: Arc<Mutex<SimState>>,
}

impl SimHandle {
    /// 当前位置
    pub fn position(&self) -> f64 {
        self.state.lock().position
    }

    /// 当前目标
    pub fn target(&self) -> f64 {
        self.state.lock().target
    }

    /// 是否处于保持状态
    pub fn is_holding(&self) -> bool {
        self.state.lock().holding
    }

    /// 冻结：位置不再变化（模拟卡死）
    pub fn freeze(&self) {
        self.state.lock().frozen = true;
    }

    /// 解除冻结
    pub fn unfreeze(&self) {
        self.state.lock().frozen = false;
    }

    pub fn is_frozen(&self) -> bool {
        self.state.lock().frozen
    }
}

/// 模拟执行器
pub struct SimulatedActuator {
    handle: SimHandle,
    is_running: Arc<AtomicBool>,
    stepper: Option<JoinHandle<()>>,
}

impl SimulatedActuator {
    /// 创建 Builder
    pub fn builder() -> SimulatedActuatorBuilder {
        SimulatedActuatorBuilder::default()
    }

    /// 获取状态句柄
    pub fn handle(&self) -> SimHandle {
        self.handle.clone()
    }
}

impl std::fmt::Debug for SimulatedActuator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedActuator")
            .field("state", &*self.handle.state.lock())
            .finish()
    }
}

impl Actuator for SimulatedActuator {
    fn read_position(&mut self) -> f64 {
        self.handle.position()
    }

    fn move_to(&mut self, target: f64) {
        let mut state = self.handle.state.lock();
        state.target = target;
        state.holding = false;
    }

    fn hold(&mut self) {
        self.handle.state.lock().holding = true;
    }
}

impl Drop for SimulatedActuator {
    fn drop(&mut self) {
        self.is_running.store(false, Ordering::Release);
        if let Some(handle) = self.stepper.take()
            && handle.join().is_err()
        {
            error!("Simulation stepper thread panicked");
        }
    }
}

/// 模拟执行器 Builder
///
/// 默认参数：起点 0，步进周期 50ms，增益 0.8，单步上限 4.0。
#[derive(Debug, Clone)]
pub struct SimulatedActuatorBuilder {
    start: f64,
    step_interval: Duration,
    gain: f64,
    max_step: f64,
    frozen: bool,
}

impl Default for SimulatedActuatorBuilder {
    fn default() -> Self {
        Self {
            start: 0.0,
            step_interval: Duration::from_millis(50),
            gain: 0.8,
            max_step: 4.0,
            frozen: false,
        }
    }
}

impl SimulatedActuatorBuilder {
    pub fn start_at(mut self, position: f64) -> Self {
        self.start = position;
        self
    }

    pub fn step_interval(mut self, interval: Duration) -> Self {
        self.step_interval = interval;
        self
    }

    pub fn gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    pub fn max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step.abs();
        self
    }

    /// 初始即冻结
    pub fn frozen(mut self, frozen: bool) -> Self {
        self.frozen = frozen;
        self
    }

    /// 启动步进线程
    pub fn spawn(self) -> SimulatedActuator {
        let state = Arc::new(Mutex::new(SimState {
            position: self.start,
            target: self.start,
            holding: false,
            frozen: self.frozen,
        }));
        let is_running = Arc::new(AtomicBool::new(true));

        let state_clone = state.clone();
        let is_running_clone = is_running.clone();
        let stepper = std::thread::spawn(move || {
            while is_running_clone.load(Ordering::Acquire) {
                std::thread::sleep(self.step_interval);
                let mut state = state_clone.lock();
                if state.holding || state.frozen {
                    continue;
                }
                let step = sim_step(state.position, state.target, self.gain, self.max_step);
                state.position += step;
                trace!("sim: position={} target={}", state.position, state.target);
            }
        });

        SimulatedActuator {
            handle: SimHandle { state },
            is_running,
            stepper: Some(stepper),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_step_proportional() {
        assert!((sim_step(0.0, 2.0, 0.8, 4.0) - 1.6).abs() < 1e-12);
        assert!((sim_step(2.0, 0.0, 0.8, 4.0) + 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_sim_step_capped() {
        assert_eq!(sim_step(0.0, 50.0, 0.8, 4.0), 4.0);
        assert_eq!(sim_step(50.0, 0.0, 0.8, 4.0), -4.0);
        assert_eq!(sim_step(10.0, 10.0, 0.8, 4.0), 0.0);
    }

    proptest::proptest! {
        /// 单步不越过目标，且不超过单步上限
        #[test]
        fn sim_step_never_overshoots(
            position in -500.0..500.0f64,
            target in -500.0..500.0f64,
            gain in 0.01..1.0f64,
            max_step in 0.1..10.0f64,
        ) {
            let step = sim_step(position, target, gain, max_step);
            proptest::prop_assert!(step.abs() <= max_step + 1e-12);
            proptest::prop_assert!((target - (position + step)).abs() <= (target - position).abs() + 1e-9);
        }
    }

    #[test]
    fn test_sim_moves_toward_target() {
        let mut sim = SimulatedActuator::builder()
            .step_interval(Duration::from_millis(2))
            .spawn();
        let handle = sim.handle();

        sim.move_to(10.0);
        assert_eq!(handle.target(), 10.0);
        std::thread::sleep(Duration::from_millis(200));
        assert!((sim.read_position() - 10.0).abs() < 0.1);
    }

    #[test]
    fn test_sim_hold_stops_motion() {
        let mut sim = SimulatedActuator::builder()
            .step_interval(Duration::from_millis(5))
            .max_step(0.5)
            .spawn();
        let handle = sim.handle();

        sim.move_to(100.0);
        std::thread::sleep(Duration::from_millis(30));
        sim.hold();
        assert!(handle.is_holding());
        // 等待正在进行的一步结束
        std::thread::sleep(Duration::from_millis(10));
        let before = sim.read_position();
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(sim.read_position(), before);

        // move_to 解除保持
        sim.move_to(100.0);
        assert!(!handle.is_holding());
    }

    #[test]
    fn test_sim_frozen() {
        let mut sim = SimulatedActuator::builder()
            .start_at(3.0)
            .step_interval(Duration::from_millis(2))
            .frozen(true)
            .spawn();
        let handle = sim.handle();
        assert!(handle.is_frozen());

        sim.move_to(50.0);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(sim.read_position(), 3.0);

        handle.unfreeze();
        std::thread::sleep(Duration::from_millis(300));
        assert!((sim.read_position() - 50.0).abs() < 1.0);
    }
}
