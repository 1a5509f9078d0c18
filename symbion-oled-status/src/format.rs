//! Text helpers for the dashboard layout

use crate::state::Snapshot;

pub const DEFAULT_UPTIME_WIDTH: usize = 14;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Uptime label that fits in `width` characters where possible.
///
/// Uses the coarsest unit range the uptime falls in, then drops the finest
/// unit until the label fits. Units are truncated, never rounded.
pub fn format_uptime(total: u64, width: usize) -> String {
    let s = total % MINUTE;
    let m = (total / MINUTE) % 60;
    let h = (total / HOUR) % 24;
    let d = total / DAY;

    let candidates = if total < MINUTE {
        vec![format!("Uptime: {s}s")]
    } else if total < HOUR {
        vec![format!("Uptime: {m}m {s}s"), format!("Uptime: {m}m")]
    } else if total < DAY {
        vec![
            format!("Uptime: {h}h {m}m {s}s"),
            format!("Uptime: {h}h {m}m"),
            format!("Uptime: {h}h"),
        ]
    } else {
        vec![
            format!("Uptime: {d}d {h}h {m}m"),
            format!("Uptime: {d}d {h}h"),
            format!("Uptime: {d}d"),
        ]
    };

    let last = candidates.len() - 1;
    candidates
        .into_iter()
        .enumerate()
        .find(|(i, label)| label.len() <= width || *i == last)
        .map(|(_, label)| label)
        .unwrap_or_default()
}

/// The four dashboard lines, top to bottom.
pub fn dashboard_lines(snapshot: &Snapshot, uptime_width: usize) -> [String; 4] {
    let mesh = match snapshot.mesh_ping_ms {
        Some(ms) => format!("Tailscale: {ms:.2} ms"),
        None => "Tailscale: DOWN".to_string(),
    };

    [
        format!("IP: {}", snapshot.ip),
        format!(
            "CPU: {:.0}% RAM: {:.0}%",
            snapshot.cpu_percent, snapshot.memory_percent
        ),
        mesh,
        format_uptime(snapshot.uptime_secs, uptime_width),
    ]
}
