//! Configuration file support (logly.toml)
//!
//! Every section is optional and merges field-by-field into a
//! `LoggerConfig::default()`, the same "each present field overrides the
//! default, everything else is left alone" idiom the teacher used for its
//! own `[display]`/`[format]`/`[gpu]` sections.

use crate::config::{
    FileConfig, LoggerConfig, OutputFormat, RateLimitStrategy, RedactionMode,
};
use crate::error::{LoglyError, Result};
use crate::level::Severity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub logly: Option<LoglyConfig>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct LoglyConfig {
    #[serde(default)]
    pub configuration: Option<ConfigurationSection>,
    #[serde(default)]
    pub display: Option<DisplaySection>,
    #[serde(default)]
    pub file: Option<FileSection>,
    #[serde(default)]
    pub security: Option<SecuritySection>,
    #[serde(default)]
    pub rate_limit: Option<RateLimitSection>,
    #[serde(default)]
    pub object_form: Option<ObjectFormSection>,
    #[serde(default)]
    pub sinks: Option<SinksSection>,
    #[serde(default)]
    pub features: Option<FeaturesSection>,
    #[serde(default)]
    pub debug: Option<DebugSection>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ConfigurationSection {
    pub level: Option<String>,
    pub format: Option<String>,
    pub time_format: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct DisplaySection {
    pub color: Option<bool>,
    pub include_time: Option<bool>,
    pub include_level: Option<bool>,
    pub include_caller: Option<bool>,
    pub full_path: Option<bool>,
    pub dynamic_caller: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct FileSection {
    pub path: Option<String>,
    pub max_size_mb: Option<f64>,
    pub max_backups: Option<usize>,
    pub max_age_days: Option<u64>,
    pub compress: Option<bool>,
    pub async_write: Option<bool>,
    pub async_queue_capacity: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct SecuritySection {
    pub mode: Option<String>,
    pub custom_patterns: Option<Vec<String>>,
    pub max_record_bytes: Option<usize>,
    pub field_redaction: Option<bool>,
    pub max_repetition: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct RateLimitSection {
    pub max_messages: Option<u32>,
    pub max_bytes: Option<u64>,
    pub burst_size: Option<u32>,
    pub strategy: Option<String>,
    pub sampling_rate: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ObjectFormSection {
    pub pretty: Option<bool>,
    pub indent: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct SinksSection {
    pub auto_sink: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct FeaturesSection {
    pub enable_callbacks: Option<bool>,
    pub enable_exception_handling: Option<bool>,
    pub enable_version_check: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct DebugSection {
    pub debug_mode: Option<bool>,
    pub debug_log_file: Option<String>,
}

pub struct ConfigFileLoader {
    scan_enabled: bool,
    custom_path: Option<PathBuf>,
}

impl ConfigFileLoader {
    pub fn new() -> Self {
        Self {
            scan_enabled: true,
            custom_path: None,
        }
    }

    pub fn disable_scan(&mut self) {
        self.scan_enabled = false;
    }

    pub fn set_custom_path(&mut self, path: PathBuf) {
        self.custom_path = Some(path);
    }

    pub fn load(&self) -> Result<Option<LoggerConfig>> {
        if !self.scan_enabled && self.custom_path.is_none() {
            return Ok(None);
        }

        let config_path = if let Some(ref path) = self.custom_path {
            if !path.exists() {
                return Err(LoglyError::InvalidConfig(format!(
                    "Custom config file not found: {}",
                    path.display()
                )));
            }
            path.clone()
        } else {
            let default_path = PathBuf::from("logly.toml");
            if !default_path.exists() {
                return Ok(None);
            }
            default_path
        };

        if self.custom_path.is_none() {
            let mut found_configs = Vec::new();
            for name in &["logly.toml", "Logly.toml", "LOGLY.toml"] {
                if Path::new(name).exists() {
                    found_configs.push(name.to_string());
                }
            }
            if found_configs.len() > 1 {
                eprintln!(
                    "⚠️  Warning: Multiple config files found: {:?}. Using: {}",
                    found_configs, found_configs[0]
                );
            }
        }

        let content = fs::read_to_string(&config_path).map_err(|e| {
            LoglyError::InvalidConfig(format!("Failed to read config file: {}", e))
        })?;

        let config_file: ConfigFile = toml::from_str(&content).map_err(|e| {
            LoglyError::InvalidConfig(format!("Failed to parse config file: {}", e))
        })?;

        Ok(Some(self.apply_config(config_file)?))
    }

    fn apply_config(&self, file: ConfigFile) -> Result<LoggerConfig> {
        let mut config = LoggerConfig::default();

        let Some(logly) = file.logly else {
            return Ok(config);
        };

        if let Some(cfg) = logly.configuration {
            if let Some(level_str) = cfg.level {
                config.level = level_str.parse::<Severity>()?;
            }
            if let Some(format_str) = cfg.format {
                config.format = match format_str.to_lowercase().as_str() {
                    "object" | "json" => OutputFormat::Object,
                    _ => OutputFormat::Text,
                };
            }
            if let Some(tf) = cfg.time_format {
                config.time_format = tf;
            }
        }

        if let Some(display) = logly.display {
            if let Some(v) = display.color {
                config.color = v;
            }
            if let Some(v) = display.include_time {
                config.include_time = v;
            }
            if let Some(v) = display.include_level {
                config.include_level = v;
            }
            if let Some(v) = display.include_caller {
                config.include_caller = v;
            }
            if let Some(v) = display.full_path {
                config.full_path = v;
            }
            if let Some(v) = display.dynamic_caller {
                config.dynamic_caller = v;
            }
        }

        if let Some(file_section) = logly.file {
            let path = file_section
                .path
                .ok_or_else(|| LoglyError::InvalidConfig("file.path is required".to_string()))?;
            let mut file_cfg = FileConfig::new(path);
            if let Some(v) = file_section.max_size_mb {
                file_cfg.max_size_mb = v;
            }
            if let Some(v) = file_section.max_backups {
                file_cfg.max_backups = v;
            }
            if let Some(v) = file_section.max_age_days {
                file_cfg.max_age = Some(Duration::from_secs(v * 86_400));
            }
            if let Some(v) = file_section.compress {
                file_cfg.compress = v;
            }
            if let Some(v) = file_section.async_write {
                file_cfg.async_write = v;
            }
            if let Some(v) = file_section.async_queue_capacity {
                file_cfg.async_queue_capacity = v;
            }
            config.file = Some(file_cfg);
        }

        if let Some(security) = logly.security {
            if let Some(mode_str) = security.mode {
                config.security.mode = match mode_str.to_lowercase().as_str() {
                    "disabled" | "off" => RedactionMode::Disabled,
                    "full" => RedactionMode::Full,
                    _ => RedactionMode::Basic,
                };
            }
            if let Some(patterns) = security.custom_patterns {
                config.security.custom_patterns = patterns;
            }
            if let Some(v) = security.max_record_bytes {
                config.security.max_record_bytes = v;
            }
            if let Some(v) = security.field_redaction {
                config.security.field_redaction = v;
            }
            if let Some(v) = security.max_repetition {
                config.security.max_repetition = v;
            }
        }

        if let Some(rl) = logly.rate_limit {
            if let Some(v) = rl.max_messages {
                config.rate_limit.max_messages = v;
            }
            if let Some(v) = rl.max_bytes {
                config.rate_limit.max_bytes = v;
            }
            if let Some(v) = rl.burst_size {
                config.rate_limit.burst_size = v;
            }
            if let Some(strategy_str) = rl.strategy {
                config.rate_limit.strategy = match strategy_str.to_lowercase().as_str() {
                    "sample" => RateLimitStrategy::Sample(config.rate_limit.sampling_rate),
                    "throttle" => RateLimitStrategy::Throttle,
                    _ => RateLimitStrategy::Drop,
                };
            }
            if let Some(v) = rl.sampling_rate {
                config.rate_limit.sampling_rate = v;
                if let RateLimitStrategy::Sample(_) = config.rate_limit.strategy {
                    config.rate_limit.strategy = RateLimitStrategy::Sample(v);
                }
            }
        }

        if let Some(of) = logly.object_form {
            if let Some(v) = of.pretty {
                config.object_form.pretty = v;
            }
            if let Some(v) = of.indent {
                config.object_form.indent = v;
            }
        }

        if let Some(sinks) = logly.sinks {
            if let Some(v) = sinks.auto_sink {
                config.auto_sink = v;
            }
        }

        if let Some(features) = logly.features {
            if let Some(v) = features.enable_callbacks {
                config.enable_callbacks = v;
            }
            if let Some(v) = features.enable_exception_handling {
                config.enable_exception_handling = v;
            }
            if let Some(v) = features.enable_version_check {
                config.enable_version_check = v;
            }
        }

        if let Some(debug) = logly.debug {
            if let Some(v) = debug.debug_mode {
                config.debug_mode = v;
            }
            if let Some(path) = debug.debug_log_file {
                config.debug_log_file = Some(PathBuf::from(path));
            }
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigFileLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let loader = ConfigFileLoader::new();
        let config = loader.apply_config(ConfigFile::default()).unwrap();
        assert_eq!(config.level, Severity::Info);
    }

    #[test]
    fn applies_security_and_rate_limit_sections() {
        let toml_src = r#"
            [logly.configuration]
            level = "warn"

            [logly.security]
            mode = "full"
            max_record_bytes = 1024

            [logly.rate_limit]
            max_messages = 5
            burst_size = 2
            strategy = "sample"
            sampling_rate = 4
        "#;
        let parsed: ConfigFile = toml::from_str(toml_src).unwrap();
        let loader = ConfigFileLoader::new();
        let config = loader.apply_config(parsed).unwrap();
        assert_eq!(config.level, Severity::Warn);
        assert_eq!(config.security.mode, RedactionMode::Full);
        assert_eq!(config.security.max_record_bytes, 1024);
        assert_eq!(config.rate_limit.max_messages, 5);
        assert_eq!(config.rate_limit.burst_size, 2);
        assert!(matches!(
            config.rate_limit.strategy,
            RateLimitStrategy::Sample(4)
        ));
    }
}
