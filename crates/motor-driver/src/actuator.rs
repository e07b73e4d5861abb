//! 执行器抽象
//!
//! 由嵌入方实现，构造时注入，之后由控制线程独占使用。

/// 执行器（电机驱动）接口
///
/// 三个操作都只在控制线程中调用，不会并发调用，也不要求可重入。
/// 实现可以阻塞，但 `read_position` 每个 tick 都会调用，应尽快返回。
///
/// 没有"恢复"操作：恢复由控制线程用上次的目标重新调用 [`move_to`](Actuator::move_to) 合成。
pub trait Actuator: Send {
    /// 读取当前位置
    fn read_position(&mut self) -> f64;

    /// 触发向目标位置移动（非阻塞）
    ///
    /// 上一次移动仍在收敛时也可能再次调用（恢复时朝同一目标重新发起）。
    fn move_to(&mut self, target: f64);

    /// 停止并保持当前位置
    fn hold(&mut self);
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn read_position(&mut self) -> f64 {
        (**self).read_position()
    }

    fn move_to(&mut self, target: f64) {
        (**self).move_to(target)
    }

    fn hold(&mut self) {
        (**self).hold()
    }
}
