pub mod board;
pub mod display;
pub mod imu;
pub mod neopixel;

pub use imu::SharedBus;
