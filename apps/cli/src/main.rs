//! # Lazer CLI
//!
//! 激光逗猫器控制程序的命令行入口。
//!
//! ```bash
//! # 启动控制器（模拟硬件，标准输入模拟按键）+ HTTP 配置接口
//! lazer run --http 0.0.0.0:8080
//!
//! # 只启动 HTTP 配置接口
//! lazer serve
//!
//! # 查看 / 修改配置
//! lazer config show
//! lazer schedule get
//! lazer schedule set schedule.json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use lazer_tools::DEFAULT_CONFIG_PATH;
use std::path::PathBuf;

mod commands;
mod server;
mod simulate;

use commands::{ConfigCommand, RunCommand, ScheduleCommand, ServeCommand};

/// Lazer - 激光逗猫器控制程序
#[derive(Parser, Debug)]
#[command(name = "lazer")]
#[command(about = "Two-axis servo laser pointer controller", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 运行控制器
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 只运行 HTTP 配置接口
    Serve {
        #[command(flatten)]
        args: ServeCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 周计划管理
    #[command(subcommand)]
    Schedule(ScheduleCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in [
        "lazer_cli=info",
        "lazer_driver=info",
        "lazer_tools=info",
        "lazer_io=info",
    ] {
        filter = filter.add_directive(directive.parse()?);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { args } => args.execute(&cli.config).await,
        Commands::Serve { args } => args.execute(&cli.config).await,
        Commands::Config(cmd) => cmd.execute(&cli.config),
        Commands::Schedule(cmd) => cmd.execute(&cli.config),
    }
}
