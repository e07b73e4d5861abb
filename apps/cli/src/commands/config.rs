//! 配置管理命令
//!
//! 配置来源优先级：命令行参数 > `--config` 指定的 TOML 文件 > 默认值

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use motor_driver::MotorConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// 全局控制参数
#[derive(Args, Debug, Clone, Default)]
pub struct MotorArgs {
    /// TOML 配置文件路径
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 轮询间隔（毫秒，覆盖配置文件）
    #[arg(long, global = true)]
    pub poll_ms: Option<u64>,

    /// 运动超时（毫秒，覆盖配置文件）
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// 到达阈值（覆盖配置文件）
    #[arg(long, global = true)]
    pub threshold: Option<f64>,
}

impl MotorArgs {
    /// 合并配置文件与命令行参数，并校验结果
    pub fn resolve(&self) -> Result<MotorConfig> {
        let mut config = match &self.config {
            Some(path) => load(path)?,
            None => MotorConfig::default(),
        };

        if let Some(poll_ms) = self.poll_ms {
            config.poll_interval_ms = poll_ms;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.move_timeout_ms = timeout_ms;
        }
        if let Some(threshold) = self.threshold {
            config.arrival_threshold = threshold;
        }

        config.validate()?;
        Ok(config)
    }
}

/// 从 TOML 文件加载配置（缺省字段取默认值）
pub fn load(path: &Path) -> Result<MotorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 打印生效的配置（TOML）
    Show,

    /// 把默认配置写入文件
    Init {
        /// 目标文件路径
        path: PathBuf,

        /// 覆盖已存在的文件
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(self, config: MotorConfig) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                print!("{}", toml::to_string(&config)?);
                Ok(())
            },
            ConfigCommand::Init { path, force } => Self::init_(&path, force),
        }
    }

    fn init_(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                path.display()
            );
        }

        let content = format!(
            "# Async motor configuration\n\n{}",
            toml::to_string(&MotorConfig::default())?
        );
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        println!("✅ Wrote default config to {}", path.display());
        Ok(())
    }
}
