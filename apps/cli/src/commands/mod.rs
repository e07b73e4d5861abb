//! 命令定义和实现

pub mod config;
pub mod demo;
pub mod r#move;

pub use config::{ConfigCommand, MotorArgs};
pub use demo::DemoCommand;
pub use r#move::MoveCommand;
