use anyhow::{anyhow, Context, Result};
use embedded_graphics::{
    mono_font::{ascii::FONT_6X13, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use linux_embedded_hal::I2cdev;
use ssd1306::{
    mode::BufferedGraphicsMode,
    prelude::{DisplayConfig as _, DisplayRotation, DisplaySize128x64, I2CInterface},
    I2CDisplayInterface, Ssd1306,
};
use tracing::info;

use super::TextDisplay;
use crate::config::DisplayConfig;

type Panel = Ssd1306<
    I2CInterface<I2cdev>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// 128x64 SSD1306 panel on an I2C bus.
pub struct Ssd1306Display {
    panel: Panel,
    text_style: MonoTextStyle<'static, BinaryColor>,
}

impl Ssd1306Display {
    pub fn open(config: &DisplayConfig) -> Result<Self> {
        if (config.width, config.height) != (128, 64) {
            return Err(anyhow!(
                "Unsupported panel size {}x{}, only 128x64 is wired",
                config.width,
                config.height
            ));
        }

        let i2c = I2cdev::new(&config.i2c_bus)
            .with_context(|| format!("opening I2C bus {}", config.i2c_bus.display()))?;
        let interface = I2CDisplayInterface::new(i2c);
        let mut panel = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        panel
            .init()
            .map_err(|e| anyhow!("SSD1306 init failed: {:?}", e))?;

        info!("SSD1306 ready on {}", config.i2c_bus.display());
        Ok(Self {
            panel,
            text_style: MonoTextStyle::new(&FONT_6X13, BinaryColor::On),
        })
    }
}

impl TextDisplay for Ssd1306Display {
    fn dimensions(&self) -> (u32, u32) {
        let size = self.panel.bounding_box().size;
        (size.width, size.height)
    }

    fn clear(&mut self) -> Result<()> {
        self.panel.clear_buffer();
        Ok(())
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<()> {
        Text::with_baseline(text, Point::new(x, y), self.text_style, Baseline::Top)
            .draw(&mut self.panel)
            .map_err(|e| anyhow!("Draw error: {:?}", e))?;
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.panel
            .flush()
            .map_err(|e| anyhow!("SSD1306 flush failed: {:?}", e))
    }
}
