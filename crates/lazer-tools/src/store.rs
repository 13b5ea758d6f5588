//! # 配置存储
//!
//! 持久化 [`Configuration`]。加载容错：文件缺失、不可读或 JSON 无效时返回默认配置
//! （两轴 0..180、空计划）并记录警告，不会让启动失败。

use lazer_protocol::Configuration;
use parking_lot::Mutex;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

/// 默认配置文件（工作目录下）
pub const DEFAULT_CONFIG_PATH: &str = ".lazer.config.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 配置存储
pub trait ConfigStore: Send + Sync {
    /// 加载配置，失败时回退到默认值
    fn load(&self) -> Configuration;

    /// 保存完整配置
    fn save(&self, config: &Configuration) -> Result<(), StoreError>;
}

/// JSON 文件存储
///
/// 保存时先写同目录下的唯一临时文件再 rename，避免写到一半的文件。
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 严格加载：返回具体错误而不是回退
    pub fn try_load(&self) -> Result<Configuration, StoreError> {
        let content = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> Configuration {
        match self.try_load() {
            Ok(config) => {
                info!("Loaded configuration from {}", self.path.display());
                config
            },
            Err(StoreError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                warn!(
                    "Configuration file {} not found, using defaults",
                    self.path.display()
                );
                Configuration::default()
            },
            Err(e) => {
                warn!(
                    "Failed to load configuration from {}: {}, using defaults",
                    self.path.display(),
                    e
                );
                Configuration::default()
            },
        }
    }

    fn save(&self, config: &Configuration) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(config)?;
        let dir = self.dir();
        // 每次保存使用独立的临时文件，并发保存不会互相覆盖半成品
        let mut file = NamedTempFile::new_in(dir).map_err(io_error(dir))?;
        file.write_all(&json).map_err(io_error(file.path()))?;
        file.as_file().sync_all().map_err(io_error(file.path()))?;
        file.persist(&self.path).map_err(|e| io_error(&self.path)(e.error))?;

        debug!("Saved configuration to {}", self.path.display());
        Ok(())
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

/// 内存存储（测试与模拟运行）
#[derive(Debug, Default)]
pub struct MemoryStore {
    config: Mutex<Option<Configuration>>,
    saves: AtomicUsize,
    fail: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Configuration) -> Self {
        Self {
            config: Mutex::new(Some(config)),
            ..Self::default()
        }
    }

    /// 之后的 `save()` 全部失败
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::Release);
    }

    /// 最近一次保存的配置
    pub fn saved(&self) -> Option<Configuration> {
        self.config.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Acquire)
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Configuration {
        self.saved().unwrap_or_default()
    }

    fn save(&self, config: &Configuration) -> Result<(), StoreError> {
        if self.fail.load(Ordering::Acquire) {
            return Err(StoreError::Io {
                path: PathBuf::from("<memory>"),
                source: io::Error::other("simulated save failure"),
            });
        }
        *self.config.lock() = Some(config.clone());
        self.saves.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazer_protocol::AxisRange;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.load(), Configuration::default());

        let config = Configuration {
            x_range: AxisRange::new(20, 160),
            ..Default::default()
        };
        store.save(&config).unwrap();
        assert_eq!(store.load(), config);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_memory_store_failure() {
        let store = MemoryStore::new();
        store.set_fail(true);
        assert!(matches!(
            store.save(&Configuration::default()),
            Err(StoreError::Io { .. })
        ));
        assert_eq!(store.save_count(), 0);
        assert!(store.saved().is_none());
    }

    #[test]
    fn test_temp_file_dir_is_target_dir() {
        let store = JsonFileStore::new("/var/lib/lazer/config.json");
        assert_eq!(store.dir(), Path::new("/var/lib/lazer"));
        assert_eq!(JsonFileStore::new("config.json").dir(), Path::new("."));
        assert_eq!(
            JsonFileStore::default().path(),
            Path::new(DEFAULT_CONFIG_PATH)
        );
    }
}
