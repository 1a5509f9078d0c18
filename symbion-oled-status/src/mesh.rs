//! Mesh latency
//!
//! Runs the system `ping` against the mesh overlay address and averages the
//! round-trip times it prints. Any failure (spawn error, non-zero exit,
//! undecodable or unparseable output, no reply) is reported as an error so
//! the store clears the value.

use async_trait::async_trait;
use regex::Regex;
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::process::Command as AsyncCommand;
use tracing::debug;

use crate::config::MeshConfig;
use crate::error::SampleError;
use crate::metrics::Sampler;

/// Tailscale's fixed in-mesh address.
pub const MESH_TARGET: &str = "100.100.100.100";

const PING_PROGRAM: &str = "ping";

pub struct MeshPing {
    program: String,
    echo_count: u32,
    echo_timeout_secs: u32,
}

impl MeshPing {
    pub fn new(config: &MeshConfig) -> Self {
        Self {
            program: PING_PROGRAM.to_string(),
            echo_count: config.echo_count,
            echo_timeout_secs: config.echo_timeout_secs,
        }
    }

    #[cfg(test)]
    fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::new(&MeshConfig::default())
        }
    }

    fn args(&self) -> Vec<String> {
        vec![
            "-c".to_string(),
            self.echo_count.to_string(),
            "-W".to_string(),
            self.echo_timeout_secs.to_string(),
            MESH_TARGET.to_string(),
        ]
    }
}

#[async_trait]
impl Sampler for MeshPing {
    type Value = f64;

    fn name(&self) -> &'static str {
        "mesh-ping"
    }

    async fn sample(&mut self) -> Result<f64, SampleError> {
        debug!("Pinging {} with {}", MESH_TARGET, self.program);

        let output = AsyncCommand::new(&self.program)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SampleError::io("mesh ping", e))?;

        if !output.status.success() {
            return Err(SampleError::PingFailed(output.status.to_string()));
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| SampleError::Malformed {
            what: "ping output",
            detail: e.to_string(),
        })?;
        mean_round_trip(&stdout)
    }
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"time=([\d.]+)\s*ms").expect("valid round-trip pattern"))
}

/// Round-trip times in milliseconds, one per matching line.
///
/// Lines without a `time=<n> ms` field are skipped. A matching field whose
/// number does not parse fails the whole output.
pub fn parse_round_trips(output: &str) -> Result<Vec<f64>, SampleError> {
    output
        .lines()
        .filter_map(|line| time_pattern().captures(line))
        .map(|caps| {
            caps[1].parse::<f64>().map_err(|_| SampleError::Malformed {
                what: "round-trip time",
                detail: caps[1].to_string(),
            })
        })
        .collect()
}

pub fn mean_round_trip(output: &str) -> Result<f64, SampleError> {
    let times = parse_round_trips(output)?;
    if times.is_empty() {
        return Err(SampleError::NoReplies);
    }
    Ok(times.iter().sum::<f64>() / times.len() as f64)
}
