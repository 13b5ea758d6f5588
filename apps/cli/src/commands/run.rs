//! run 命令
//!
//! 在模拟硬件上运行控制器。标准输入的每一行模拟一次按键：
//!
//! ```text
//! l 0.3    # 左键按住 0.3 秒后松开
//! r 3      # 右键长按 3 秒
//! ```

use anyhow::{Context, Result, bail};
use clap::Args;
use lazer_driver::{CancelToken, LazerBuilder};
use lazer_io::{ButtonInput, button_channel};
use lazer_protocol::ButtonId;
use lazer_tools::JsonFileStore;
use std::io::BufRead;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{cancelled, install_signal_handler};
use crate::server::{self, DEFAULT_HTTP_ADDR};
use crate::simulate;

/// 运行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// HTTP 配置接口监听地址
    #[arg(long, default_value = DEFAULT_HTTP_ADDR)]
    pub http: SocketAddr,

    /// 不启动 HTTP 配置接口
    #[arg(long)]
    pub no_http: bool,

    /// 随机数种子（复现运动序列）
    #[arg(long)]
    pub seed: Option<u64>,
}

impl RunCommand {
    pub async fn execute(&self, config_path: &Path) -> Result<()> {
        let cancel = CancelToken::new();
        install_signal_handler(cancel.clone())?;

        let (left_input, left) = button_channel(ButtonId::Left);
        let (right_input, right) = button_channel(ButtonId::Right);

        let mut builder = LazerBuilder::new()
            .servo_sink(simulate::servo_sink())
            .buttons(left, right)
            .config_store(Arc::new(JsonFileStore::new(config_path)))
            .cancel_token(cancel.clone());
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        let mut lazer = builder.build().context("failed to start controller")?;
        info!("Controller running with configuration {}", config_path.display());

        std::thread::Builder::new()
            .name("lazer-stdin".into())
            .spawn(move || read_presses(std::io::stdin().lock(), &left_input, &right_input))
            .context("failed to spawn stdin reader")?;

        let served = if self.no_http {
            cancelled(cancel.clone()).await;
            Ok(())
        } else {
            let controller = Arc::clone(lazer.controller());
            server::serve(self.http, controller, cancelled(cancel.clone())).await
        };

        cancel.cancel();
        tokio::task::spawn_blocking(move || lazer.shutdown())
            .await
            .context("shutdown task failed")?;
        served
    }
}

/// 逐行读取按键命令，直到输入结束
fn read_presses(input: impl BufRead, left: &ButtonInput, right: &ButtonInput) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read stdin: {}", e);
                break;
            },
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_press(&line) {
            Ok((ButtonId::Left, hold)) => left.press(hold),
            Ok((ButtonId::Right, hold)) => right.press(hold),
            Err(e) => warn!("{}", e),
        }
    }
    debug!("stdin closed, no more simulated presses");
}

/// 解析 `l <秒>` / `r <秒>`
fn parse_press(line: &str) -> Result<(ButtonId, Duration)> {
    let mut parts = line.split_whitespace();
    let button = match parts.next() {
        Some("l" | "left") => ButtonId::Left,
        Some("r" | "right") => ButtonId::Right,
        other => bail!("unknown button {:?}, expected `l <secs>` or `r <secs>`", other),
    };
    let secs: f64 = match parts.next() {
        Some(s) => s.parse().with_context(|| format!("invalid hold time {s:?}"))?,
        None => bail!("missing hold time"),
    };
    if parts.next().is_some() {
        bail!("unexpected trailing input in {:?}", line);
    }
    let hold = Duration::try_from_secs_f64(secs)
        .with_context(|| format!("hold time out of range: {secs}"))?;
    Ok((button, hold))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_press() {
        assert_eq!(
            parse_press("l 0.3").unwrap(),
            (ButtonId::Left, Duration::from_millis(300))
        );
        assert_eq!(
            parse_press("  right 3 ").unwrap(),
            (ButtonId::Right, Duration::from_secs(3))
        );
    }

    #[test]
    fn test_parse_press_rejects_garbage() {
        assert!(parse_press("x 1").is_err());
        assert!(parse_press("l").is_err());
        assert!(parse_press("l abc").is_err());
        assert!(parse_press("r -1").is_err());
        assert!(parse_press("r 1 2").is_err());
    }

    #[test]
    fn test_read_presses_feeds_debouncer() {
        let (left_input, left) = button_channel(ButtonId::Left);
        let (right_input, right) = button_channel(ButtonId::Right);

        // 每个按键的第一次有效事件被去抖器丢弃
        let script = "r 0.2\nr 0.5\n\nbogus\nl 0.2\nl 3\n";
        read_presses(script.as_bytes(), &left_input, &right_input);

        let right_events: Vec<_> = right.try_iter().collect();
        assert_eq!(right_events.len(), 1);
        assert_eq!(right_events[0].hold, Duration::from_millis(500));

        let left_events: Vec<_> = left.try_iter().collect();
        assert_eq!(left_events.len(), 1);
        assert_eq!(left_events[0].hold, Duration::from_secs(3));
    }
}
