// Action GBA: Collaborator Interfaces
//
// The game logic only talks to hardware through these traits. Firmware
// implements them in `drivers`; tests implement them with scripted fakes.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::DrawTarget;

use crate::events::{Acceleration, Difficulty, IndicatorMode, LevelHud};
use crate::lights::Rgb;

/// Raw signal levels, read once per frame by the gesture interpreter.
pub trait SensorSource {
    /// Encoder channel A level (`true` = high).
    fn encoder_a(&mut self) -> bool;
    /// Encoder channel B level (`true` = high).
    fn encoder_b(&mut self) -> bool;
    /// Raw button line. Active low: `false` means pressed.
    fn button_level(&mut self) -> bool;
    /// One 3-axis sample in m/s^2. Errors are transient bus failures.
    fn read_acceleration(&mut self) -> anyhow::Result<Acceleration>;
}

/// High-level screen commands. Implementations own all pixel work.
pub trait Screen {
    fn show_splash(&mut self) -> anyhow::Result<()>;
    fn show_menu(&mut self, difficulty: Difficulty) -> anyhow::Result<()>;
    fn show_level(&mut self, hud: &LevelHud) -> anyhow::Result<()>;
    fn show_game_over(&mut self) -> anyhow::Result<()>;
    fn show_game_win(&mut self) -> anyhow::Result<()>;
    /// Blocking intro, called once before the frame loop starts.
    fn play_intro_animation(&mut self) -> anyhow::Result<()>;
}

/// Status light driver.
pub trait Indicator {
    fn set_mode(&mut self, mode: IndicatorMode) -> anyhow::Result<()>;
    /// Per-frame hook for animated modes.
    fn tick(&mut self, dt: std::time::Duration) -> anyhow::Result<()>;
}

/// A monochrome framebuffer that can be pushed to the glass.
pub trait Panel: DrawTarget<Color = BinaryColor> {
    fn flush(&mut self) -> anyhow::Result<()>;
}

/// A single RGB pixel output.
pub trait PixelSink {
    fn write(&mut self, color: Rgb) -> anyhow::Result<()>;
}
