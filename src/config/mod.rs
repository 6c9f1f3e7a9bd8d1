//! Configuration management for the polled-device filesystem.
//!
//! Loading priority:
//! 1. Default values (hardcoded)
//! 2. Main config file
//! 3. Local overrides
//! 4. Environment variables (highest priority)

mod device;
mod monitoring;
mod polling;
mod template;
mod trap;

pub use device::*;
pub use monitoring::*;
pub use polling::*;
pub use template::*;
pub use trap::*;

#[cfg(test)]
mod template_test;

//---
use std::collections::BTreeSet;
use std::path::PathBuf;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::Result;
use crate::SetupError;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Directory receiving the daemon log file
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Scheduler and bring-up parameters
    #[serde(default)]
    pub polling: PollingConfig,
    /// Metrics endpoint settings
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    /// Trap reception settings
    #[serde(default)]
    pub trap: TrapConfig,
    /// Reusable object groups referenced by `reuse` entries
    #[serde(default)]
    pub templates: Vec<TemplateConfig>,
    /// Devices to poll
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            log_dir: default_log_dir(),
            polling: PollingConfig::default(),
            monitoring: MonitoringConfig::default(),
            trap: TrapConfig::default(),
            templates: Vec::new(),
            devices: Vec::new(),
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl Settings {
    /// Load configuration from multiple sources with priority:
    /// 1. Named config file (or `config/snmpfs` when none is given)
    /// 2. Local overrides
    /// 3. Environment variables
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        builder = builder
            .add_source(File::with_name(path.unwrap_or("config/snmpfs")).required(path.is_some()));

        builder = builder.add_source(File::with_name("config/local").required(false));

        builder = builder.add_source(
            Environment::with_prefix("SNMPFS")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Startup validation; any failure here aborts before a session is
    /// opened.
    pub fn validate(&self) -> Result<()> {
        self.monitoring.validate()?;

        let mut template_names = BTreeSet::new();
        for template in &self.templates {
            if !template_names.insert(template.name.as_str()) {
                return Err(SetupError::DuplicateTemplate(template.name.clone()).into());
            }
        }

        let mut device_names = BTreeSet::new();
        for device in &self.devices {
            if !device_names.insert(device.name.as_str()) {
                return Err(SetupError::DuplicateDevice(device.name.clone()).into());
            }
            device.validate()?;
        }

        Ok(())
    }

    /// Devices with their `reuse` entries replaced by template content,
    /// unset intervals defaulted and object names checked for duplicates.
    pub fn resolved_devices(&self) -> Result<Vec<DeviceConfig>> {
        let mut devices = self.devices.clone();
        for device in &mut devices {
            expand_templates(&self.templates, device)?;
        }
        Ok(devices)
    }
}
