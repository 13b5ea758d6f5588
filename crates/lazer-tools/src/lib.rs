//! # Lazer Tools - 配置持久化与周计划求值
//!
//! **依赖原则**: 只依赖 `lazer-protocol`，不依赖硬件层与驱动层
//!
//! ## 包含模块
//!
//! - `store` - 配置存储（`ConfigStore` trait、JSON 文件、内存）
//! - `schedule` - 周计划求值（纯函数）

pub mod schedule;
pub mod store;

// 重新导出常用类型
pub use schedule::{find_active_entry, entry_window};
pub use store::{ConfigStore, DEFAULT_CONFIG_PATH, JsonFileStore, MemoryStore, StoreError};
