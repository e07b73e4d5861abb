//! # Motor CLI
//!
//! 异步电机协调器的命令行工具（基于模拟执行器）。
//!
//! ```bash
//! # 单次同步移动
//! motor-cli move --target 50
//! motor-cli move --target -10 --relative
//!
//! # 并发压力演示：多个移动线程 + 一个暂停/恢复监督线程
//! motor-cli demo --movers 10 --duration-secs 30
//!
//! # 配置管理
//! motor-cli config init motor.toml
//! motor-cli --config motor.toml --timeout-ms 2000 config show
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{ConfigCommand, DemoCommand, MotorArgs, MoveCommand};

/// Motor CLI - 异步电机协调器命令行工具
#[derive(Parser, Debug)]
#[command(name = "motor-cli")]
#[command(about = "Command-line demo for the async motor coordinator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    motor: MotorArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 单次同步移动
    Move {
        #[command(flatten)]
        args: MoveCommand,
    },

    /// 并发移动 + 暂停/恢复压力演示
    Demo {
        #[command(flatten)]
        args: DemoCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("motor_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.motor.resolve()?;

    match cli.command {
        Commands::Move { args } => args.execute(config),
        Commands::Demo { args } => args.execute(config),
        Commands::Config(cmd) => cmd.execute(config),
    }
}
