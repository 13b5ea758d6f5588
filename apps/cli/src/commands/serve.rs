//! serve 命令
//!
//! 只运行周计划 HTTP 接口，不启动控制循环。

use anyhow::{Context, Result};
use clap::Args;
use lazer_driver::{CancelToken, LazerBuilder};
use lazer_tools::JsonFileStore;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use super::{cancelled, install_signal_handler};
use crate::server::{self, DEFAULT_HTTP_ADDR};
use crate::simulate;

/// HTTP 接口参数
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// 监听地址
    #[arg(long, default_value = DEFAULT_HTTP_ADDR)]
    pub http: SocketAddr,
}

impl ServeCommand {
    pub async fn execute(&self, config_path: &Path) -> Result<()> {
        let cancel = CancelToken::new();
        install_signal_handler(cancel.clone())?;

        let controller = LazerBuilder::new()
            .servo_sink(simulate::servo_sink())
            .config_store(Arc::new(JsonFileStore::new(config_path)))
            .cancel_token(cancel.clone())
            .build_controller()
            .context("failed to load configuration")?;

        let result = server::serve(self.http, controller, cancelled(cancel.clone())).await;
        cancel.cancel();
        result
    }
}
