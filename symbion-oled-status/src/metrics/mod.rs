//! Metric sources for the dashboard
//!
//! Provides:
//! - The [`Sampler`] trait every periodic source implements
//! - A rolling average used to smooth CPU and RAM readings
//! - Host samplers (CPU load, memory load, uptime)
//!
//! The network address and mesh latency samplers live in `network` and
//! `mesh`.

mod system;

pub use system::{CpuLoad, MemoryLoad, Uptime};

use async_trait::async_trait;
use std::collections::VecDeque;

use crate::error::SampleError;

/// One periodic reading.
///
/// `sample` may suspend (the CPU sampler waits for its averaging window,
/// the mesh ping waits for a subprocess); callers run it on its own task.
#[async_trait]
pub trait Sampler: Send + 'static {
    type Value: Send + 'static;

    fn name(&self) -> &'static str;

    async fn sample(&mut self) -> Result<Self::Value, SampleError>;
}

#[async_trait]
impl<V: Send + 'static> Sampler for Box<dyn Sampler<Value = V>> {
    type Value = V;

    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn sample(&mut self) -> Result<V, SampleError> {
        (**self).sample().await
    }
}

/// Fixed-capacity window of the most recent samples.
#[derive(Debug, Clone)]
pub struct RollingAverage {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl RollingAverage {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a sample, evicting the oldest one at capacity, and return the
    /// mean of the window.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
        self.mean()
    }

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Wraps a raw numeric sampler and publishes its rolling mean.
///
/// Failed raw readings leave the window untouched.
pub struct Smoothed<S> {
    inner: S,
    window: RollingAverage,
}

impl<S> Smoothed<S> {
    pub fn new(inner: S, capacity: usize) -> Self {
        Self {
            inner,
            window: RollingAverage::new(capacity),
        }
    }
}

#[async_trait]
impl<S> Sampler for Smoothed<S>
where
    S: Sampler<Value = f64>,
{
    type Value = f64;

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn sample(&mut self) -> Result<f64, SampleError> {
        let raw = self.inner.sample().await?;
        Ok(self.window.push(raw))
    }
}
