//! Symbion OLED status - host dashboard for a 128x64 monochrome panel
//!
//! Samples CPU load, memory load, the primary interface address, mesh
//! latency and uptime on independent schedules, keeps the latest values in
//! a shared [`MetricStore`], and periodically renders them as four lines of
//! text.

pub mod config;
pub mod display;
pub mod error;
pub mod format;
pub mod mesh;
pub mod metrics;
pub mod network;
pub mod render;
pub mod state;
pub mod supervisor;

pub use config::DashboardConfig;
pub use error::SampleError;
pub use state::{MetricStore, Snapshot, NO_ADDRESS};
pub use supervisor::{Intervals, Sources, Supervisor};
