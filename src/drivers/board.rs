// Action GBA: Board Inputs
//
// Encoder channels and push switch on GPIO (internal pull-ups, idle HIGH),
// accelerometer on the shared I2C bus.

use esp_idf_hal::gpio::{AnyIOPin, Input, PinDriver, Pull};

use crate::drivers::imu::Adxl345;
use crate::events::Acceleration;
use crate::hal::SensorSource;

pub struct BoardInputs {
    encoder_a: PinDriver<'static, AnyIOPin, Input>,
    encoder_b: PinDriver<'static, AnyIOPin, Input>,
    button: PinDriver<'static, AnyIOPin, Input>,
    accel: Adxl345,
}

impl BoardInputs {
    pub fn new(
        encoder_a: AnyIOPin,
        encoder_b: AnyIOPin,
        button: AnyIOPin,
        accel: Adxl345,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            encoder_a: pulled_up(encoder_a)?,
            encoder_b: pulled_up(encoder_b)?,
            button: pulled_up(button)?,
            accel,
        })
    }
}

fn pulled_up(pin: AnyIOPin) -> anyhow::Result<PinDriver<'static, AnyIOPin, Input>> {
    let mut driver = PinDriver::input(pin)?;
    driver.set_pull(Pull::Up)?;
    Ok(driver)
}

impl SensorSource for BoardInputs {
    fn encoder_a(&mut self) -> bool {
        self.encoder_a.is_high()
    }

    fn encoder_b(&mut self) -> bool {
        self.encoder_b.is_high()
    }

    fn button_level(&mut self) -> bool {
        self.button.is_high()
    }

    fn read_acceleration(&mut self) -> anyhow::Result<Acceleration> {
        self.accel.read_acceleration()
    }
}
