// Action GBA: SSD1306 OLED Driver
//
// 128x64 monochrome framebuffer on the shared I2C bus. Drawing goes into RAM
// through embedded-graphics; `flush` pushes the whole buffer in one pass.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::config::*;
use crate::drivers::imu::{lock, SharedBus};
use crate::hal::Panel;

const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;
const CMD_NOP: u8 = 0xE3;
const CMD_DISPLAY_OFF: u8 = 0xAE;
const CMD_DISPLAY_ON: u8 = 0xAF;
const CMD_COLUMN_ADDR: u8 = 0x21;
const CMD_PAGE_ADDR: u8 = 0x22;

// Bytes of pixel data per I2C transaction (plus the control byte).
const FLUSH_CHUNK: usize = 32;

const INIT_SEQUENCE: &[u8] = &[
    CMD_DISPLAY_OFF,
    0xD5, 0x80, // clock divide ratio / oscillator frequency
    0xA8, 0x3F, // multiplex ratio: 64 rows
    0xD3, 0x00, // display offset
    0x40,       // start line 0
    0x8D, 0x14, // charge pump on
    0x20, 0x00, // horizontal addressing mode
    0xA1,       // segment remap
    0xC8,       // COM scan direction: remapped
    0xDA, 0x12, // COM pins: alternative, no remap
    0x81, 0xCF, // contrast
    0xD9, 0xF1, // pre-charge period
    0xDB, 0x40, // VCOMH deselect level
    0xA4,       // resume to RAM content
    0xA6,       // normal (not inverted)
    CMD_DISPLAY_ON,
];

pub struct OledDisplay {
    bus: SharedBus,
    buffer: [u8; DISPLAY_BUFFER_SIZE],
}

impl OledDisplay {
    pub fn new(bus: SharedBus) -> Self {
        Self {
            bus,
            buffer: [0; DISPLAY_BUFFER_SIZE],
        }
    }

    pub fn is_connected(&self) -> bool {
        match lock(self.bus) {
            Ok(mut bus) => bus
                .write(I2C_ADDR_OLED, &[CONTROL_COMMAND, CMD_NOP], I2C_TIMEOUT_TICKS)
                .is_ok(),
            Err(_) => false,
        }
    }

    pub fn init(&mut self) -> anyhow::Result<()> {
        self.commands(INIT_SEQUENCE)?;
        self.buffer.fill(0);
        self.flush()?;
        log::info!("SSD1306 initialised ({}x{})", SCREEN_WIDTH, SCREEN_HEIGHT);
        Ok(())
    }

    fn commands(&self, cmds: &[u8]) -> anyhow::Result<()> {
        let mut bus = lock(self.bus)?;
        for &cmd in cmds {
            bus.write(I2C_ADDR_OLED, &[CONTROL_COMMAND, cmd], I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }
}

impl OriginDimensions for OledDisplay {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for OledDisplay {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
                continue;
            }
            // Each byte is a vertical strip of 8 pixels within a page.
            let index = (x + (y / 8) * SCREEN_WIDTH) as usize;
            let mask = 1u8 << (y % 8);
            if color.is_on() {
                self.buffer[index] |= mask;
            } else {
                self.buffer[index] &= !mask;
            }
        }
        Ok(())
    }
}

impl Panel for OledDisplay {
    fn flush(&mut self) -> anyhow::Result<()> {
        let last_page = (SCREEN_HEIGHT / 8 - 1) as u8;
        let last_column = (SCREEN_WIDTH - 1) as u8;
        self.commands(&[CMD_COLUMN_ADDR, 0, last_column, CMD_PAGE_ADDR, 0, last_page])?;

        let mut bus = lock(self.bus)?;
        let mut packet = [0u8; FLUSH_CHUNK + 1];
        packet[0] = CONTROL_DATA;
        for chunk in self.buffer.chunks(FLUSH_CHUNK) {
            packet[1..=chunk.len()].copy_from_slice(chunk);
            bus.write(I2C_ADDR_OLED, &packet[..=chunk.len()], I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }
}
