//! 周计划命令

use anyhow::{Context, Result};
use clap::Subcommand;
use lazer_protocol::WeeklySchedule;
use lazer_tools::{ConfigStore, JsonFileStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::server::ScheduleSettings;

/// 周计划命令
#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    /// 打印当前周计划（与 `GET /api/get` 相同的格式）
    Get,

    /// 用文件中的周计划替换当前计划（与 `POST /api/save` 相同的格式）
    Set {
        /// JSON 文件：`{"schedule": {...}}`
        file: PathBuf,
    },
}

impl ScheduleCommand {
    pub fn execute(self, config_path: &Path) -> Result<()> {
        let store = JsonFileStore::new(config_path);
        match self {
            ScheduleCommand::Get => {
                let settings = ScheduleSettings {
                    schedule: store.load().schedule,
                };
                println!("{}", serde_json::to_string_pretty(&settings)?);
            },
            ScheduleCommand::Set { file } => {
                let count = replace_schedule(&store, &file)?;
                println!("✅ 已保存 {} 条计划到 {}", count, config_path.display());
            },
        }
        Ok(())
    }
}

/// 读取 `file` 中的周计划，替换 `store` 中的计划并保存，返回计划条数
pub fn replace_schedule(store: &dyn ConfigStore, file: &Path) -> Result<usize> {
    let content =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let settings: ScheduleSettings = serde_json::from_str(&content)
        .with_context(|| format!("invalid schedule in {}", file.display()))?;

    let invalid = invalid_entries(&settings.schedule);
    if invalid > 0 {
        warn!("{} entries have an invalid start time and will be skipped", invalid);
    }

    let mut config = store.load();
    config.schedule = settings.schedule;
    store.save(&config).context("failed to save configuration")?;
    Ok(config.schedule.len())
}

/// 开始时间无法解析的计划条数
pub fn invalid_entries(schedule: &WeeklySchedule) -> usize {
    schedule
        .iter()
        .flat_map(|(_, entries)| entries)
        .filter(|entry| entry.parse_start().is_err())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazer_protocol::{AxisRange, Configuration, OperatingState, Weekday};
    use std::time::Duration;

    #[test]
    fn test_replace_schedule_keeps_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("lazer.json"));
        store
            .save(&Configuration {
                x_range: AxisRange::new(20, 160),
                ..Default::default()
            })
            .unwrap();

        let file = dir.path().join("schedule.json");
        fs::write(
            &file,
            r#"{"schedule":{"0":[{"startTime":"08:00","onDuration":3600000000000,"state":"Slow"}],
                "6":[{"startTime":"25:00","onDuration":60000000000,"state":"Fast"}]}}"#,
        )
        .unwrap();

        assert_eq!(replace_schedule(&store, &file).unwrap(), 2);

        let config = store.try_load().unwrap();
        assert_eq!(config.x_range, AxisRange::new(20, 160));
        let monday = config.schedule.entries(Weekday::Monday);
        assert_eq!(monday[0].on_duration, Duration::from_secs(3600));
        assert_eq!(monday[0].state, OperatingState::Slow);
        assert_eq!(invalid_entries(&config.schedule), 1);
    }

    #[test]
    fn test_replace_schedule_rejects_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("lazer.json"));
        let file = dir.path().join("schedule.json");
        fs::write(&file, r#"{"schedule":{"9":[]}}"#).unwrap();

        assert!(replace_schedule(&store, &file).is_err());
        assert!(store.try_load().is_err());
    }
}
