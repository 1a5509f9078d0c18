use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use sysinfo::System;
use tracing::debug;

use super::Sampler;
use crate::error::SampleError;

/// Global CPU utilisation over the averaging window, in percent.
pub struct CpuLoad {
    sys: System,
    window: Duration,
}

impl CpuLoad {
    pub fn new(window: Duration) -> Self {
        let mut sys = System::new();
        // Baseline so the first reading covers a full window
        sys.refresh_cpu_usage();
        Self { sys, window }
    }
}

#[async_trait]
impl Sampler for CpuLoad {
    type Value = f64;

    fn name(&self) -> &'static str {
        "cpu"
    }

    async fn sample(&mut self) -> Result<f64, SampleError> {
        tokio::time::sleep(self.window).await;
        self.sys.refresh_cpu_usage();

        let percent = self.sys.global_cpu_info().cpu_usage();
        if !percent.is_finite() {
            return Err(SampleError::Malformed {
                what: "cpu usage",
                detail: percent.to_string(),
            });
        }
        Ok(f64::from(percent).clamp(0.0, 100.0))
    }
}

/// Memory in use ((total - available) / total), in percent.
pub struct MemoryLoad {
    sys: System,
}

impl MemoryLoad {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }
}

impl Default for MemoryLoad {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sampler for MemoryLoad {
    type Value = f64;

    fn name(&self) -> &'static str {
        "memory"
    }

    async fn sample(&mut self) -> Result<f64, SampleError> {
        self.sys.refresh_memory();

        let total = self.sys.total_memory();
        if total == 0 {
            return Err(SampleError::Unavailable("memory statistics"));
        }
        let used = total.saturating_sub(self.sys.available_memory());
        Ok(used as f64 / total as f64 * 100.0)
    }
}

/// Whole seconds since boot, read from a `/proc/uptime` style file.
pub struct Uptime {
    source: PathBuf,
}

impl Uptime {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

#[async_trait]
impl Sampler for Uptime {
    type Value = u64;

    fn name(&self) -> &'static str {
        "uptime"
    }

    async fn sample(&mut self) -> Result<u64, SampleError> {
        let content = tokio::fs::read_to_string(&self.source)
            .await
            .map_err(|e| SampleError::io("uptime", e))?;
        let secs = parse_uptime(&content)?;
        debug!("uptime {}s from {}", secs, self.source.display());
        Ok(secs)
    }
}

/// First field of the file, truncated toward zero.
pub(crate) fn parse_uptime(content: &str) -> Result<u64, SampleError> {
    let field = content
        .split_whitespace()
        .next()
        .ok_or_else(|| SampleError::Malformed {
            what: "uptime",
            detail: "empty".to_string(),
        })?;

    let secs: f64 = field.parse().map_err(|_| SampleError::Malformed {
        what: "uptime",
        detail: field.to_string(),
    })?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(SampleError::Malformed {
            what: "uptime",
            detail: field.to_string(),
        });
    }
    Ok(secs.trunc() as u64)
}
