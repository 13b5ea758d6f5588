//! 驱动层错误类型定义

use lazer_io::IoError;
use lazer_protocol::ProtocolError;
use lazer_tools::StoreError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 硬件错误（舵机 / 引脚）
    #[error("Hardware error: {0}")]
    Io(#[from] IoError),

    /// 协议 / 数据格式错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 配置持久化错误
    #[error("Configuration store error: {0}")]
    Store(#[from] StoreError),

    /// 事件通道已关闭
    #[error("Event channel closed")]
    ChannelClosed,

    /// 后台线程创建失败
    #[error("Failed to spawn thread {name}: {source}")]
    ThreadSpawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// 构造失败（缺少必要资源）
    #[error("Construction failed: {0}")]
    Construction(String),
}
