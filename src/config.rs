// Action GBA: Hardware & Game Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V)

use std::time::Duration;

use thiserror::Error;

use crate::events::Difficulty;

// ---------------------------------------------------------------------------
// I2C Bus (shared by the accelerometer and the OLED)
// ---------------------------------------------------------------------------
pub const I2C_ADDR_ADXL345: u8 = 0x53;
pub const I2C_ADDR_OLED: u8 = 0x3C;
pub const I2C_BAUDRATE_KHZ: u32 = 400;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Display (SSD1306 OLED)
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;
pub const DISPLAY_BUFFER_SIZE: usize = (SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize) / 8; // 1024
pub const INTRO_FRAMES: u32 = 15;
pub const INTRO_FRAME_DELAY_MS: u64 = 20;                // ~0.3 s in total

// ---------------------------------------------------------------------------
// Indicator (single WS2812)
// ---------------------------------------------------------------------------
pub const NEOPIXEL_BRIGHTNESS: f32 = 0.3;
pub const RAINBOW_STEPS_PER_SEC: f32 = 120.0;            // colour wheel positions per second

// ---------------------------------------------------------------------------
// Frame pacing
// ---------------------------------------------------------------------------
pub const FRAME_INTERVAL_MS: u64 = 10;                   // ~100 Hz poll / update

// ---------------------------------------------------------------------------
// ADXL345 scale factor
// ---------------------------------------------------------------------------
pub const ACCEL_FULL_RES_G_PER_LSB: f32 = 0.0039;         // 3.9 mg/LSB in full resolution
pub const STANDARD_GRAVITY: f32 = 9.806_65;

// ---------------------------------------------------------------------------
// Game rules
// ---------------------------------------------------------------------------

/// Sequence length and time budget for one difficulty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    /// Moves in level 1; every later level adds one.
    pub base_moves: u32,
    /// Time budget for a whole level, split evenly across its moves.
    pub level_time: Duration,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("difficulty {0} produces an empty move sequence")]
    EmptySequence(Difficulty),
    #[error("difficulty {0} has a zero level time")]
    ZeroLevelTime(Difficulty),
    #[error("total level count must be at least 1")]
    NoLevels,
    #[error("shake delta threshold must be positive and finite, got {0}")]
    InvalidShakeThreshold(f32),
}

/// Everything the game logic reads, built once at startup and shared by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub easy: DifficultyProfile,
    pub medium: DifficultyProfile,
    pub hard: DifficultyProfile,
    pub total_levels: u32,
    /// Minimum spacing between two accepted encoder rotations.
    pub rotate_cooldown: Duration,
    /// How long the button must be held in the menu to start a game.
    pub menu_press_hold: Duration,
    /// Input is ignored for this long after a correct move.
    pub action_cooldown: Duration,
    /// Minimum frame-to-frame change in acceleration magnitude (m/s^2).
    pub shake_delta_threshold: f32,
    /// Upper bound for a plausible shake delta. Carried but not applied.
    pub shake_max_delta: f32,
    pub shake_cooldown: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            easy: DifficultyProfile {
                base_moves: 2,
                level_time: Duration::from_secs(60),
            },
            medium: DifficultyProfile {
                base_moves: 4,
                level_time: Duration::from_secs(60),
            },
            hard: DifficultyProfile {
                base_moves: 6,
                level_time: Duration::from_secs(120),
            },
            total_levels: 10,
            rotate_cooldown: Duration::from_millis(500),
            menu_press_hold: Duration::from_millis(200),
            action_cooldown: Duration::from_millis(250),
            shake_delta_threshold: 2.0,
            shake_max_delta: 100.0,
            shake_cooldown: Duration::from_millis(300),
        }
    }
}

impl GameConfig {
    pub fn profile(&self, difficulty: Difficulty) -> &DifficultyProfile {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    /// Reject tables that could ever produce an empty level or a zero per-move budget.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for difficulty in Difficulty::ALL {
            let profile = self.profile(difficulty);
            if profile.base_moves == 0 {
                return Err(ConfigError::EmptySequence(difficulty));
            }
            if profile.level_time.is_zero() {
                return Err(ConfigError::ZeroLevelTime(difficulty));
            }
        }
        if self.total_levels == 0 {
            return Err(ConfigError::NoLevels);
        }
        if !(self.shake_delta_threshold.is_finite() && self.shake_delta_threshold > 0.0) {
            return Err(ConfigError::InvalidShakeThreshold(self.shake_delta_threshold));
        }
        Ok(())
    }
}
