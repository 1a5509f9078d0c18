//! Display devices
//!
//! The dashboard only needs a text surface: clear the buffer, draw strings
//! at pixel positions, push the buffer to the panel.

#[cfg(all(target_os = "linux", feature = "ssd1306"))]
mod panel;

#[cfg(all(target_os = "linux", feature = "ssd1306"))]
pub use panel::Ssd1306Display;

use anyhow::Result;
use tracing::debug;

use crate::state::{new_state, Shared};

pub trait TextDisplay: Send {
    /// Width and height in pixels.
    fn dimensions(&self) -> (u32, u32);

    fn clear(&mut self) -> Result<()>;

    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<()>;

    /// Flush the buffer to the device.
    fn present(&mut self) -> Result<()>;
}

impl<D: TextDisplay + ?Sized> TextDisplay for Box<D> {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<()> {
        (**self).draw_text(x, y, text)
    }

    fn present(&mut self) -> Result<()> {
        (**self).present()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextItem {
    pub x: i32,
    pub y: i32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub items: Vec<TextItem>,
}

impl Frame {
    pub fn lines(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.text.as_str()).collect()
    }
}

#[derive(Debug, Default)]
struct Presented {
    last: Option<Frame>,
    count: usize,
}

/// In-memory display.
///
/// Keeps the last presented frame and a frame counter behind a shared
/// handle, so a clone kept by the caller can inspect what was drawn.
#[derive(Debug, Clone)]
pub struct BufferDisplay {
    width: u32,
    height: u32,
    pending: Frame,
    presented: Shared<Presented>,
}

impl BufferDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pending: Frame::default(),
            presented: new_state(Presented::default()),
        }
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.presented.lock().last.clone()
    }

    pub fn frames_presented(&self) -> usize {
        self.presented.lock().count
    }
}

impl TextDisplay for BufferDisplay {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) -> Result<()> {
        self.pending.items.clear();
        Ok(())
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<()> {
        self.pending.items.push(TextItem {
            x,
            y,
            text: text.to_string(),
        });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        let frame = self.pending.clone();
        debug!("frame: {}", frame.lines().join(" | "));

        let mut presented = self.presented.lock();
        presented.last = Some(frame);
        presented.count += 1;
        Ok(())
    }
}
