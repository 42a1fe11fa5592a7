// Action GBA: Firmware Entry Point
//
// Boot sequence:
//   1. Validate the game configuration (fatal if the table is degenerate).
//   2. Bring up the shared I2C bus, the OLED and the accelerometer.
//   3. Configure the encoder and button GPIOs and the status LED.
//   4. Play the intro animation once, ending on the splash screen.
//   5. Run the frame loop forever on the main thread.

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use esp_idf_hal::gpio::IOPin;
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;

    use action_gba::config::*;
    use action_gba::drivers::board::BoardInputs;
    use action_gba::drivers::display::OledDisplay;
    use action_gba::drivers::imu::Adxl345;
    use action_gba::drivers::neopixel::Ws2812;
    use action_gba::drivers::SharedBus;
    use action_gba::lights::Lights;
    use action_gba::tasks::GameLoop;
    use action_gba::ui::OledScreen;

    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("Action GBA firmware starting");

    let config = GameConfig::default();
    config.validate()?;

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;

    // ---- I2C bus (shared between OLED and ADXL345) -------------------------
    let i2c_config = I2cConfig::new().baudrate(I2C_BAUDRATE_KHZ.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6, // D4: SDA
        peripherals.pins.gpio7, // D5: SCL
        &i2c_config,
    )?;
    // Lives for the whole programme; both devices borrow it.
    let i2c_bus: SharedBus = Box::leak(Box::new(Mutex::new(i2c)));

    // ---- Display ----------------------------------------------------------
    let mut oled = OledDisplay::new(i2c_bus);
    if !oled.is_connected() {
        log::warn!("OLED not answering at 0x{:02X}", I2C_ADDR_OLED);
    }
    oled.init()?;
    let mut screen = OledScreen::new(oled, Duration::from_millis(INTRO_FRAME_DELAY_MS));

    // ---- Accelerometer ----------------------------------------------------
    let accel = Adxl345::new(i2c_bus);
    if accel.is_connected() {
        accel.init()?;
    } else {
        // Shake moves will never register, but the rest of the game still works.
        log::warn!("ADXL345 not found at 0x{:02X}", I2C_ADDR_ADXL345);
    }

    // ---- Encoder, button, LED ----------------------------------------------
    let mut inputs = BoardInputs::new(
        peripherals.pins.gpio3.downgrade(), // D1: encoder A (pull-up)
        peripherals.pins.gpio4.downgrade(), // D2: encoder B (pull-up)
        peripherals.pins.gpio9.downgrade(), // D9: push switch (pull-up, active LOW)
        accel,
    )?;
    // D10: WS2812 data line
    let neopixel = Ws2812::new(peripherals.rmt.channel0, peripherals.pins.gpio10)?;
    let mut lights = Lights::new(neopixel, NEOPIXEL_BRIGHTNESS);

    // ---- Game ---------------------------------------------------------------
    let mut game = GameLoop::new(&config, &mut inputs, rand::rng(), Instant::now())?;
    game.boot(&mut screen, &mut lights)?;
    log::info!("Boot complete, entering frame loop");

    game.run(&mut inputs, &mut screen, &mut lights)
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("action-gba is ESP32-C3 firmware; build it with --target riscv32imc-esp-espidf");
}
