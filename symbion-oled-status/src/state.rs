//! Shared metric store
//!
//! Holds the last published value of every metric. Sampler tasks write
//! through the `apply_*` methods, which carry the failure policy of each
//! metric; the render loop reads a consistent copy with [`MetricStore::snapshot`].

use parking_lot::Mutex;
use std::net::Ipv4Addr;
use std::sync::Arc;

use crate::error::SampleError;

pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// Shown in place of the address when the interface lookup fails.
pub const NO_ADDRESS: &str = "no address";

/// Copy of every field at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub ip: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    /// `None` while the mesh is unreachable.
    pub mesh_ping_ms: Option<f64>,
    pub uptime_secs: u64,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            ip: NO_ADDRESS.to_string(),
            cpu_percent: 0.0,
            memory_percent: 0.0,
            mesh_ping_ms: None,
            uptime_secs: 0,
        }
    }
}

#[derive(Clone, Default)]
pub struct MetricStore {
    inner: Shared<Snapshot>,
}

impl MetricStore {
    pub fn new() -> Self {
        Self {
            inner: new_state(Snapshot::default()),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.lock().clone()
    }

    /// CPU failures keep the previous value.
    pub fn apply_cpu(&self, outcome: Result<f64, SampleError>) {
        if let Ok(percent) = outcome {
            self.inner.lock().cpu_percent = percent;
        }
    }

    /// RAM failures keep the previous value.
    pub fn apply_memory(&self, outcome: Result<f64, SampleError>) {
        if let Ok(percent) = outcome {
            self.inner.lock().memory_percent = percent;
        }
    }

    /// Lookup failures replace the address with [`NO_ADDRESS`].
    pub fn apply_address(&self, outcome: Result<Ipv4Addr, SampleError>) {
        let ip = match outcome {
            Ok(addr) => addr.to_string(),
            Err(_) => NO_ADDRESS.to_string(),
        };
        self.inner.lock().ip = ip;
    }

    /// Ping failures clear the latency.
    pub fn apply_mesh_ping(&self, outcome: Result<f64, SampleError>) {
        self.inner.lock().mesh_ping_ms = outcome.ok();
    }

    /// Read failures reset uptime to zero.
    pub fn apply_uptime(&self, outcome: Result<u64, SampleError>) {
        self.inner.lock().uptime_secs = outcome.unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_defaults() {
        let snap = MetricStore::new().snapshot();
        assert_eq!(snap.ip, NO_ADDRESS);
        assert_eq!(snap.cpu_percent, 0.0);
        assert_eq!(snap.memory_percent, 0.0);
        assert_eq!(snap.mesh_ping_ms, None);
        assert_eq!(snap.uptime_secs, 0);
    }

    #[test]
    fn test_numeric_failures_keep_previous_value() {
        let store = MetricStore::new();
        store.apply_cpu(Ok(42.5));
        store.apply_memory(Ok(61.0));
        store.apply_cpu(Err(SampleError::Unavailable("cpu statistics")));
        store.apply_memory(Err(SampleError::Unavailable("memory statistics")));

        let snap = store.snapshot();
        assert_eq!(snap.cpu_percent, 42.5);
        assert_eq!(snap.memory_percent, 61.0);
    }

    #[test]
    fn test_address_failure_publishes_sentinel() {
        let store = MetricStore::new();
        store.apply_address(Ok(Ipv4Addr::new(192, 168, 1, 20)));
        assert_eq!(store.snapshot().ip, "192.168.1.20");

        store.apply_address(Err(SampleError::NoAddress("eth0".into())));
        assert_eq!(store.snapshot().ip, NO_ADDRESS);
    }

    #[test]
    fn test_ping_failure_clears_latency() {
        let store = MetricStore::new();
        store.apply_mesh_ping(Ok(14.0));
        assert_eq!(store.snapshot().mesh_ping_ms, Some(14.0));

        store.apply_mesh_ping(Err(SampleError::NoReplies));
        assert_eq!(store.snapshot().mesh_ping_ms, None);
    }

    #[test]
    fn test_uptime_failure_resets_to_zero() {
        let store = MetricStore::new();
        store.apply_uptime(Ok(3661));
        assert_eq!(store.snapshot().uptime_secs, 3661);

        store.apply_uptime(Err(SampleError::Malformed {
            what: "uptime",
            detail: "empty".into(),
        }));
        assert_eq!(store.snapshot().uptime_secs, 0);
    }

    #[test]
    fn test_concurrent_writes_are_never_torn() {
        // Each writer only ever publishes values from its own family, so
        // any value mixing two writes would fall outside both sets.
        let store = MetricStore::new();
        let writers: Vec<_> = [1.0f64 / 3.0, 2.0f64 / 7.0]
            .into_iter()
            .map(|base| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..5_000u32 {
                        store.apply_cpu(Ok(base * f64::from(i % 100)));
                        store.apply_uptime(Ok(u64::from(i % 100) * 1_000_003));
                    }
                })
            })
            .collect();

        let reader = {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..5_000 {
                    let snap = store.snapshot();
                    let cpu_ok = (0..100).any(|i| {
                        snap.cpu_percent == (1.0 / 3.0) * f64::from(i)
                            || snap.cpu_percent == (2.0 / 7.0) * f64::from(i)
                    });
                    assert!(cpu_ok, "torn cpu value {}", snap.cpu_percent);
                    assert_eq!(snap.uptime_secs % 1_000_003, 0);
                }
            })
        };

        for w in writers {
            w.join().unwrap();
        }
        reader.join().unwrap();
    }
}
