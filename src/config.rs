use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pipeline::PipelineConfig;
use crate::scheduler::BatchConfig;
use crate::transport::RetryPolicy;

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub api: ApiConfig,
    pub throttle: ThrottleConfig,
    pub retry: RetryConfig,
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: 30000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub min_interval_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self { min_interval_ms: 500 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub stage_delay_ms: u64,
    pub category_batch_size: usize,
    pub category_delay_ms: u64,
    pub deadline_ms: Option<u64>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            stage_delay_ms: 500,
            category_batch_size: 1,
            category_delay_ms: 1000,
            deadline_ms: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some(DEFAULT_LOG_LEVEL.to_string()),
            api: ApiConfig::default(),
            throttle: ThrottleConfig::default(),
            retry: RetryConfig::default(),
            pipeline: PipelineSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Log filter used when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &str {
        match self.log_level.as_deref().map(str::trim) {
            Some(level) if !level.is_empty() => level,
            _ => DEFAULT_LOG_LEVEL,
        }
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.throttle.min_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry.max_attempts, Duration::from_millis(self.retry.base_delay_ms))
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            stage_delay: Duration::from_millis(self.pipeline.stage_delay_ms),
            category_batch: BatchConfig::new(
                self.pipeline.category_batch_size,
                Duration::from_millis(self.pipeline.category_delay_ms),
            ),
            deadline: self.pipeline.deadline_ms.map(Duration::from_millis),
        }
    }
}
