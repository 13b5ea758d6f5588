//! 命令定义和实现

pub mod config;
pub mod run;
pub mod schedule;
pub mod serve;

pub use config::ConfigCommand;
pub use run::RunCommand;
pub use schedule::ScheduleCommand;
pub use serve::ServeCommand;

use anyhow::{Context, Result};
use lazer_driver::CancelToken;

/// Ctrl+C / SIGTERM 触发取消令牌
pub fn install_signal_handler(cancel: CancelToken) -> Result<()> {
    ctrlc::set_handler(move || {
        eprintln!("\nReceived interrupt signal. Shutting down...");
        cancel.cancel();
    })
    .context("failed to install signal handler")
}

/// 等待取消令牌被触发
pub async fn cancelled(cancel: CancelToken) {
    let rx = cancel.receiver().clone();
    // 发送端在取消时被丢弃，recv 随即返回
    let _ = tokio::task::spawn_blocking(move || {
        let _ = rx.recv();
    })
    .await;
}
