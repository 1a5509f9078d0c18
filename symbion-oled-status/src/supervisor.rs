//! Task supervisor
//!
//! Owns one task per metric source plus the render loop in a single
//! `JoinSet`. Sources never finish on their own; the first task that ends
//! (normally the renderer after a display failure) ends the supervisor.

use anyhow::{anyhow, Result};
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::display::TextDisplay;
use crate::error::SampleError;
use crate::metrics::{CpuLoad, MemoryLoad, Sampler, Smoothed, Uptime};
use crate::network::InterfaceAddress;
use crate::mesh::MeshPing;
use crate::render::{render_loop, Layout};
use crate::state::MetricStore;

pub type BoxedSampler<V> = Box<dyn Sampler<Value = V>>;

/// The five metric sources.
pub struct Sources {
    pub cpu: BoxedSampler<f64>,
    pub memory: BoxedSampler<f64>,
    pub address: BoxedSampler<Ipv4Addr>,
    pub mesh_ping: BoxedSampler<f64>,
    pub uptime: BoxedSampler<u64>,
}

impl Sources {
    /// Host samplers, CPU and RAM smoothed over the configured window.
    pub fn system(config: &DashboardConfig) -> Self {
        let sampling = &config.sampling;
        Self {
            cpu: Box::new(Smoothed::new(
                CpuLoad::new(sampling.cpu_window()),
                sampling.smoothing_window,
            )),
            memory: Box::new(Smoothed::new(MemoryLoad::new(), sampling.smoothing_window)),
            address: Box::new(InterfaceAddress::new(config.network.interface.clone())),
            mesh_ping: Box::new(MeshPing::new(&config.mesh)),
            uptime: Box::new(Uptime::new(sampling.uptime_source.clone())),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Intervals {
    pub cpu: Duration,
    pub memory: Duration,
    pub address: Duration,
    pub mesh_ping: Duration,
    pub uptime: Duration,
    pub render: Duration,
}

impl Intervals {
    pub fn from_config(config: &DashboardConfig) -> Self {
        let sampling = &config.sampling;
        Self {
            cpu: sampling.cpu_interval(),
            memory: sampling.memory_interval(),
            address: sampling.address_interval(),
            mesh_ping: sampling.mesh_interval(),
            uptime: sampling.uptime_interval(),
            render: sampling.render_interval(),
        }
    }
}

pub struct Supervisor {
    store: MetricStore,
    tasks: JoinSet<(&'static str, Result<()>)>,
}

impl Supervisor {
    pub fn new(store: MetricStore) -> Self {
        Self {
            store,
            tasks: JoinSet::new(),
        }
    }

    /// Spawn a sampling task that publishes each outcome through `publish`.
    pub fn spawn_source<V, P>(&mut self, sampler: BoxedSampler<V>, every: Duration, publish: P)
    where
        V: Send + 'static,
        P: Fn(&MetricStore, Result<V, SampleError>) + Send + 'static,
    {
        let name = sampler.name();
        let store = self.store.clone();
        self.tasks
            .spawn(async move { (name, run_source(sampler, store, every, publish).await) });
    }

    pub fn spawn_renderer<D>(&mut self, display: D, layout: Layout, every: Duration)
    where
        D: TextDisplay + 'static,
    {
        let store = self.store.clone();
        self.tasks
            .spawn(async move { ("render", render_loop(display, store, layout, every).await) });
    }

    /// Wire every source and the renderer.
    pub fn spawn_all<D>(&mut self, sources: Sources, display: D, layout: Layout, intervals: Intervals)
    where
        D: TextDisplay + 'static,
    {
        self.spawn_source(sources.cpu, intervals.cpu, MetricStore::apply_cpu);
        self.spawn_source(sources.memory, intervals.memory, MetricStore::apply_memory);
        self.spawn_source(sources.address, intervals.address, MetricStore::apply_address);
        self.spawn_source(sources.mesh_ping, intervals.mesh_ping, MetricStore::apply_mesh_ping);
        self.spawn_source(sources.uptime, intervals.uptime, MetricStore::apply_uptime);
        self.spawn_renderer(display, layout, intervals.render);
    }

    /// Run until a task ends; the remaining tasks are aborted on return.
    pub async fn run(mut self) -> Result<()> {
        info!("Supervising {} tasks", self.tasks.len());

        match self.tasks.join_next().await {
            None => Err(anyhow!("No tasks to supervise")),
            Some(Ok((name, Ok(())))) => {
                warn!("Task {} exited", name);
                Err(anyhow!("task {} exited unexpectedly", name))
            }
            Some(Ok((name, Err(e)))) => Err(e.context(format!("task {} failed", name))),
            Some(Err(join_err)) => Err(anyhow!("task aborted: {}", join_err)),
        }
    }
}

async fn run_source<V, P>(
    mut sampler: BoxedSampler<V>,
    store: MetricStore,
    every: Duration,
    publish: P,
) -> Result<()>
where
    V: Send + 'static,
    P: Fn(&MetricStore, Result<V, SampleError>),
{
    let name = sampler.name();
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let outcome = sampler.sample().await;
        if let Err(e) = &outcome {
            debug!("{} sample failed: {}", name, e);
        }
        publish(&store, outcome);
    }
}
