// Action GBA: Status Light
//
// One RGB LED. Splash and menu run a colour-wheel rainbow advanced in `tick`;
// every other mode is a static colour written once on mode change.

use std::time::Duration;

use crate::config::RAINBOW_STEPS_PER_SEC;
use crate::events::{IndicatorMode, Move};
use crate::hal::{Indicator, PixelSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn scaled(self, brightness: f32) -> Self {
        let scale = |c: u8| (c as f32 * brightness.clamp(0.0, 1.0)).round() as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

/// Classic 0..=255 colour wheel: red -> green -> blue -> red.
pub fn colorwheel(pos: u8) -> Rgb {
    match pos {
        0..=84 => Rgb::new(255 - pos * 3, pos * 3, 0),
        85..=169 => {
            let p = pos - 85;
            Rgb::new(0, 255 - p * 3, p * 3)
        }
        _ => {
            let p = pos - 170;
            Rgb::new(p * 3, 0, 255 - p * 3)
        }
    }
}

pub fn move_color(mv: Move) -> Rgb {
    match mv {
        Move::RotateRight => Rgb::new(255, 255, 0), // yellow
        Move::RotateLeft  => Rgb::new(0, 255, 255), // cyan
        Move::Press       => Rgb::new(0, 255, 0),   // green
        Move::Shake       => Rgb::new(255, 255, 255),
    }
}

/// Colour for a static mode; `None` for animated ones.
pub fn static_color(mode: IndicatorMode) -> Option<Rgb> {
    match mode {
        IndicatorMode::Splash | IndicatorMode::Menu => None,
        IndicatorMode::Idle => Some(Rgb::OFF),
        IndicatorMode::Playing => Some(Rgb::new(0, 0, 40)),
        IndicatorMode::Move(mv) => Some(move_color(mv)),
        IndicatorMode::GameOver => Some(Rgb::new(200, 0, 0)),
        IndicatorMode::GameWin => Some(Rgb::new(0, 200, 0)),
    }
}

pub struct Lights<P> {
    pixel: P,
    brightness: f32,
    mode: IndicatorMode,
    rainbow_pos: f32,
}

impl<P: PixelSink> Lights<P> {
    pub fn new(pixel: P, brightness: f32) -> Self {
        Self {
            pixel,
            brightness,
            mode: IndicatorMode::Idle,
            rainbow_pos: 0.0,
        }
    }

    pub fn mode(&self) -> IndicatorMode {
        self.mode
    }

    pub fn pixel(&self) -> &P {
        &self.pixel
    }

    fn show(&mut self, color: Rgb) -> anyhow::Result<()> {
        self.pixel.write(color.scaled(self.brightness))
    }
}

impl<P: PixelSink> Indicator for Lights<P> {
    fn set_mode(&mut self, mode: IndicatorMode) -> anyhow::Result<()> {
        self.mode = mode;
        match static_color(mode) {
            Some(color) => self.show(color),
            // The rainbow keeps its position across mode changes.
            None => Ok(()),
        }
    }

    fn tick(&mut self, dt: Duration) -> anyhow::Result<()> {
        if !self.mode.is_animated() {
            return Ok(());
        }
        self.rainbow_pos = (self.rainbow_pos + RAINBOW_STEPS_PER_SEC * dt.as_secs_f32()) % 255.0;
        self.show(colorwheel(self.rainbow_pos as u8))
    }
}
