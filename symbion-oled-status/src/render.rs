//! Render loop
//!
//! Every tick: snapshot the store, lay out the four dashboard lines, draw
//! them one quarter of the panel height apart and flush. Display errors
//! are not retried; they end the loop.

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::display::TextDisplay;
use crate::format::dashboard_lines;
use crate::state::{MetricStore, Snapshot};

#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub margin_x: i32,
    pub uptime_width: usize,
}

/// Draw one full frame for `snapshot`.
pub fn render_frame<D>(display: &mut D, snapshot: &Snapshot, layout: Layout) -> Result<()>
where
    D: TextDisplay + ?Sized,
{
    let (_, height) = display.dimensions();
    let line_height = (height / 4) as i32;

    display.clear().context("clearing display buffer")?;
    for (row, line) in dashboard_lines(snapshot, layout.uptime_width)
        .iter()
        .enumerate()
    {
        display
            .draw_text(layout.margin_x, line_height * row as i32, line)
            .with_context(|| format!("drawing line {}", row + 1))?;
    }
    display.present().context("flushing display")?;
    Ok(())
}

/// Redraw the dashboard every `every` until the display fails.
pub async fn render_loop<D>(
    mut display: D,
    store: MetricStore,
    layout: Layout,
    every: Duration,
) -> Result<()>
where
    D: TextDisplay,
{
    info!("Render loop started ({:?} interval)", every);

    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let snapshot = store.snapshot();
        render_frame(&mut display, &snapshot, layout)?;
        debug!("Dashboard rendered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::BufferDisplay;
    use anyhow::anyhow;

    const LAYOUT: Layout = Layout {
        margin_x: 2,
        uptime_width: 14,
    };

    struct BrokenBus;

    impl TextDisplay for BrokenBus {
        fn dimensions(&self) -> (u32, u32) {
            (128, 64)
        }
        fn clear(&mut self) -> Result<()> {
            Ok(())
        }
        fn draw_text(&mut self, _x: i32, _y: i32, _text: &str) -> Result<()> {
            Ok(())
        }
        fn present(&mut self) -> Result<()> {
            Err(anyhow!("i2c write NACK"))
        }
    }

    #[test]
    fn test_lines_are_quartered() {
        let mut display = BufferDisplay::new(128, 64);
        let snapshot = Snapshot {
            ip: "10.0.0.7".into(),
            cpu_percent: 3.2,
            memory_percent: 41.0,
            mesh_ping_ms: None,
            uptime_secs: 45,
        };

        render_frame(&mut display, &snapshot, LAYOUT).unwrap();

        let frame = display.last_frame().unwrap();
        let positions: Vec<_> = frame.items.iter().map(|i| (i.x, i.y)).collect();
        assert_eq!(positions, vec![(2, 0), (2, 16), (2, 32), (2, 48)]);
        assert_eq!(
            frame.lines(),
            vec![
                "IP: 10.0.0.7",
                "CPU: 3% RAM: 41%",
                "Tailscale: DOWN",
                "Uptime: 45s"
            ]
        );
    }

    #[test]
    fn test_flush_failure_propagates() {
        let err = render_frame(&mut BrokenBus, &Snapshot::default(), LAYOUT).unwrap_err();
        assert!(format!("{err:#}").contains("i2c write NACK"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_loop_redraws_each_interval() {
        let display = BufferDisplay::new(128, 64);
        let observer = display.clone();
        let store = MetricStore::new();

        let task = tokio::spawn(render_loop(display, store.clone(), LAYOUT, Duration::from_secs(5)));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(observer.frames_presented(), 1);

        store.apply_uptime(Ok(90));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(observer.frames_presented(), 2);
        assert_eq!(observer.last_frame().unwrap().lines()[3], "Uptime: 1m 30s");

        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_loop_stops_on_display_error() {
        let result = render_loop(BrokenBus, MetricStore::new(), LAYOUT, Duration::from_secs(5)).await;
        assert!(result.is_err());
    }
}
