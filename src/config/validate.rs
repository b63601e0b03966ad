// src/config/validate.rs

use crate::config::model::{ConfigFile, MonitorSection, RawConfigFile};
use crate::errors::{JobmonError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::JobmonError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_monitor_section(&raw.monitor)?;
        Ok(ConfigFile::new_unchecked(raw.monitor))
    }
}

fn validate_monitor_section(monitor: &MonitorSection) -> Result<()> {
    ensure_positive("poll_interval_ms", monitor.poll_interval_ms)?;
    ensure_positive(
        "completion_poll_interval_ms",
        monitor.completion_poll_interval_ms,
    )?;
    ensure_positive("status_timeout_ms", monitor.status_timeout_ms)?;
    ensure_positive("event_batch_size", u64::from(monitor.event_batch_size))?;
    Ok(())
}

fn ensure_positive(key: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(JobmonError::ConfigError(format!(
            "[monitor].{key} must be >= 1 (got 0)"
        )));
    }
    Ok(())
}
