// Action GBA: ADXL345 Accelerometer Driver
//
// Register-level driver over the shared I2C bus.

use std::sync::Mutex;

use anyhow::anyhow;
use esp_idf_hal::i2c::I2cDriver;

use crate::config::*;
use crate::events::Acceleration;

/// Thread-safe handle to the I2C bus shared by the accelerometer and the OLED.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;

// ADXL345 register addresses
const REG_DEVID: u8 = 0x00;
const REG_BW_RATE: u8 = 0x2C;
const REG_POWER_CTL: u8 = 0x2D;
const REG_DATA_FORMAT: u8 = 0x31;
const REG_DATAX0: u8 = 0x32; // Start of 6-byte X/Y/Z burst
const DEVID_EXPECTED: u8 = 0xE5;

const POWER_CTL_MEASURE: u8 = 0x08;
const DATA_FORMAT_FULL_RES_16G: u8 = 0x0B;
const BW_RATE_100HZ: u8 = 0x0A;

pub(crate) fn lock(
    bus: SharedBus,
) -> anyhow::Result<std::sync::MutexGuard<'static, I2cDriver<'static>>> {
    bus.lock().map_err(|_| anyhow!("I2C bus mutex poisoned"))
}

pub struct Adxl345 {
    bus: SharedBus,
}

impl Adxl345 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    /// Verify the device answers with its fixed ID.
    pub fn is_connected(&self) -> bool {
        let Ok(mut bus) = lock(self.bus) else {
            return false;
        };
        let mut buf = [0u8; 1];
        match bus.write_read(I2C_ADDR_ADXL345, &[REG_DEVID], &mut buf, I2C_TIMEOUT_TICKS) {
            Ok(()) => buf[0] == DEVID_EXPECTED,
            Err(_) => false,
        }
    }

    /// 100 Hz output rate, full resolution (+/-16 g), measurement on.
    pub fn init(&self) -> anyhow::Result<()> {
        let mut bus = lock(self.bus)?;

        for (reg, value) in [
            (REG_BW_RATE, BW_RATE_100HZ),
            (REG_DATA_FORMAT, DATA_FORMAT_FULL_RES_16G),
            (REG_POWER_CTL, POWER_CTL_MEASURE),
        ] {
            bus.write(I2C_ADDR_ADXL345, &[reg, value], I2C_TIMEOUT_TICKS)?;
        }

        log::info!("ADXL345 initialised (full resolution, 100 Hz)");
        Ok(())
    }

    /// Burst-read the three axes and convert to m/s^2.
    pub fn read_acceleration(&self) -> anyhow::Result<Acceleration> {
        let mut bus = lock(self.bus)?;
        let mut raw = [0u8; 6];
        bus.write_read(I2C_ADDR_ADXL345, &[REG_DATAX0], &mut raw, I2C_TIMEOUT_TICKS)?;

        let scale = ACCEL_FULL_RES_G_PER_LSB * STANDARD_GRAVITY;
        Ok(Acceleration {
            x: i16::from_le_bytes([raw[0], raw[1]]) as f32 * scale,
            y: i16::from_le_bytes([raw[2], raw[3]]) as f32 * scale,
            z: i16::from_le_bytes([raw[4], raw[5]]) as f32 * scale,
        })
    }
}
