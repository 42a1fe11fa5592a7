// Action GBA: Screen Layouts
//
// Every screen is a few lines of centred text on the 128x64 OLED. Works on any
// `Panel`, so the layouts are drawn the same way on the device and in tests.

use std::fmt;
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder};

use crate::config::{INTRO_FRAMES, SCREEN_WIDTH};
use crate::events::{Difficulty, LevelHud};
use crate::hal::{Panel, Screen};

const TITLE: &str = "ACTION GBA";
const SUBTITLE: &str = "Press to start";

// Intro slides both lines up from below the glass to their splash rows.
const INTRO_TITLE_START_Y: i32 = 80;
const INTRO_SUBTITLE_START_Y: i32 = 100;
const SPLASH_TITLE_Y: i32 = 20;
const SPLASH_SUBTITLE_Y: i32 = 42;

pub struct OledScreen<P> {
    panel: P,
    intro_frame_delay: Duration,
}

impl<P> OledScreen<P>
where
    P: Panel,
    P::Error: fmt::Debug,
{
    pub fn new(panel: P, intro_frame_delay: Duration) -> Self {
        Self {
            panel,
            intro_frame_delay,
        }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    fn text_style() -> TextStyle {
        TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build()
    }

    /// Clear, draw each `(text, y)` centred horizontally, flush.
    fn draw_lines(&mut self, lines: &[(&str, i32)]) -> anyhow::Result<()> {
        self.panel
            .clear(BinaryColor::Off)
            .map_err(|e| anyhow!("clear failed: {:?}", e))?;

        let character_style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let center_x = SCREEN_WIDTH as i32 / 2;
        for &(text, y) in lines {
            let position = Point::new(center_x, y);
            Text::with_text_style(text, position, character_style, Self::text_style())
                .draw(&mut self.panel)
                .map_err(|e| anyhow!("draw failed: {:?}", e))?;
        }

        self.panel.flush()
    }
}

fn lerp(start: i32, end: i32, ratio: f32) -> i32 {
    start + ((end - start) as f32 * ratio) as i32
}

impl<P> Screen for OledScreen<P>
where
    P: Panel,
    P::Error: fmt::Debug,
{
    fn show_splash(&mut self) -> anyhow::Result<()> {
        self.draw_lines(&[(TITLE, SPLASH_TITLE_Y), (SUBTITLE, SPLASH_SUBTITLE_Y)])
    }

    fn show_menu(&mut self, difficulty: Difficulty) -> anyhow::Result<()> {
        let selected = format!("> {}", difficulty);
        self.draw_lines(&[
            ("Select Difficulty", 12),
            (selected.as_str(), 32),
            ("Press to confirm", 52),
        ])
    }

    fn show_level(&mut self, hud: &LevelHud) -> anyhow::Result<()> {
        let diff = format!("Diff: {}", hud.difficulty);
        let level = format!("Level: {}", hud.level);
        let progress = format!("Move: {}/{}", hud.index + 1, hud.sequence_len);
        let todo = format!("Do: {}", hud.current_move);
        self.draw_lines(&[
            (diff.as_str(), 10),
            (level.as_str(), 22),
            (progress.as_str(), 34),
            (todo.as_str(), 46),
        ])
    }

    fn show_game_over(&mut self) -> anyhow::Result<()> {
        self.draw_lines(&[("GAME OVER", 22), ("Press to retry", 44)])
    }

    fn show_game_win(&mut self) -> anyhow::Result<()> {
        self.draw_lines(&[("YOU WIN!", 22), ("Press to replay", 44)])
    }

    fn play_intro_animation(&mut self) -> anyhow::Result<()> {
        for frame in 0..INTRO_FRAMES {
            let ratio = (frame + 1) as f32 / INTRO_FRAMES as f32;
            let title_y = lerp(INTRO_TITLE_START_Y, SPLASH_TITLE_Y, ratio);
            let subtitle_y = lerp(INTRO_SUBTITLE_START_Y, SPLASH_SUBTITLE_Y, ratio);
            self.draw_lines(&[(TITLE, title_y), (SUBTITLE, subtitle_y)])?;
            thread::sleep(self.intro_frame_delay);
        }
        // Land exactly on the static splash.
        self.show_splash()
    }
}
