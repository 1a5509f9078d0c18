//! Configuration management
//!
//! Handles:
//! - Sampling cadence for every metric and the renderer
//! - Network interface and mesh ping echo settings
//! - Display bus and geometry
//!
//! Every field defaults to the stock dashboard values, so a missing file is
//! the normal case.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub sampling: SamplingConfig,
    pub network: NetworkConfig,
    pub mesh: MeshConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub cpu_interval_secs: u64,
    /// Window the CPU counters are measured over.
    pub cpu_window_ms: u64,
    pub memory_interval_secs: u64,
    pub address_interval_secs: u64,
    pub mesh_interval_secs: u64,
    pub uptime_interval_secs: u64,
    pub render_interval_secs: u64,
    /// Samples kept for the CPU and RAM rolling average.
    pub smoothing_window: usize,
    pub uptime_source: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub interface: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub echo_count: u32,
    pub echo_timeout_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub i2c_bus: PathBuf,
    pub width: u32,
    pub height: u32,
    pub margin_x: i32,
    /// Character budget for the uptime label.
    pub uptime_width: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            cpu_interval_secs: 1,
            cpu_window_ms: 1000,
            memory_interval_secs: 1,
            address_interval_secs: 10,
            mesh_interval_secs: 10,
            uptime_interval_secs: 5,
            render_interval_secs: 5,
            smoothing_window: 10,
            uptime_source: PathBuf::from("/proc/uptime"),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            interface: "eth0".to_string(),
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            echo_count: 4,
            echo_timeout_secs: 1,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            i2c_bus: PathBuf::from("/dev/i2c-1"),
            width: 128,
            height: 64,
            margin_x: 2,
            uptime_width: 14,
        }
    }
}

/// Zero would make `tokio::time::interval` panic.
fn every(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}

impl SamplingConfig {
    pub fn cpu_interval(&self) -> Duration {
        every(self.cpu_interval_secs)
    }

    pub fn cpu_window(&self) -> Duration {
        Duration::from_millis(self.cpu_window_ms)
    }

    pub fn memory_interval(&self) -> Duration {
        every(self.memory_interval_secs)
    }

    pub fn address_interval(&self) -> Duration {
        every(self.address_interval_secs)
    }

    pub fn mesh_interval(&self) -> Duration {
        every(self.mesh_interval_secs)
    }

    pub fn uptime_interval(&self) -> Duration {
        every(self.uptime_interval_secs)
    }

    pub fn render_interval(&self) -> Duration {
        every(self.render_interval_secs)
    }
}

impl DashboardConfig {
    /// Load config from the OS-specific location, or defaults if absent
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;
        Self::load_from(&config_path).await
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: DashboardConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Get OS-specific config file path
    pub fn config_file_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;

        path.push("symbion-oled");
        path.push("config.toml");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.network.interface, "eth0");
        assert_eq!(config.mesh.echo_count, 4);
        assert_eq!(config.mesh.echo_timeout_secs, 1);
        assert_eq!(config.sampling.smoothing_window, 10);
        assert_eq!(config.sampling.address_interval(), Duration::from_secs(10));
        assert_eq!(config.sampling.render_interval(), Duration::from_secs(5));
        assert_eq!((config.display.width, config.display.height), (128, 64));
        assert_eq!(config.display.uptime_width, 14);
    }

    #[test]
    fn test_config_file_path() {
        let path = DashboardConfig::config_file_path().unwrap();
        assert!(path.to_string_lossy().contains("symbion-oled"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let sampling = SamplingConfig {
            uptime_interval_secs: 0,
            ..SamplingConfig::default()
        };
        assert_eq!(sampling.uptime_interval(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load_from(&dir.path().join("absent.toml"))
            .await
            .unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[tokio::test]
    async fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[network]\ninterface = \"wlan0\"\n\n[mesh]\necho_count = 2").unwrap();

        let config = DashboardConfig::load_from(file.path()).await.unwrap();
        assert_eq!(config.network.interface, "wlan0");
        assert_eq!(config.mesh.echo_count, 2);
        assert_eq!(config.mesh.echo_timeout_secs, 1);
        assert_eq!(config.sampling, SamplingConfig::default());
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sampling\ncpu_interval_secs = ").unwrap();

        assert!(DashboardConfig::load_from(file.path()).await.is_err());
    }
}
