//! 配置管理命令

use anyhow::{Context, Result};
use clap::Subcommand;
use lazer_tools::{ConfigStore, JsonFileStore};
use std::path::Path;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 打印控制器将要使用的配置（文件缺失或无效时为默认配置）
    Show,

    /// 检查配置文件能否被解析
    Check,
}

impl ConfigCommand {
    pub fn execute(self, config_path: &Path) -> Result<()> {
        let store = JsonFileStore::new(config_path);
        match self {
            ConfigCommand::Show => {
                let config = store.load();
                println!("{}", serde_json::to_string_pretty(&config)?);
            },
            ConfigCommand::Check => {
                let config = store
                    .try_load()
                    .with_context(|| format!("invalid configuration {}", config_path.display()))?;
                println!("配置文件: {}", config_path.display());
                println!(
                    "  X 轴: {}..{}",
                    config.x_range.min_angle, config.x_range.max_angle
                );
                println!(
                    "  Y 轴: {}..{}",
                    config.y_range.min_angle, config.y_range.max_angle
                );
                println!("  周计划: {} 条", config.schedule.len());
                let invalid = super::schedule::invalid_entries(&config.schedule);
                if invalid > 0 {
                    println!("  ⚠️ {} 条计划的开始时间无效，运行时会被跳过", invalid);
                }
            },
        }
        Ok(())
    }
}
